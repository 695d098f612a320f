// Copyright 2025 the Fixpath Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Incremental construction of subpaths.

use crate::error::{PathError, Result};
use crate::fixed::{Fixed, FixedPoint};
use crate::path::{Path, PathProcs, Storage};
use crate::segment::{Curve, SegmentKind, SegmentNotes};

/// Building operations that store segments.
#[derive(Debug)]
pub(crate) struct DefaultProcs;

impl PathProcs for DefaultProcs {
    fn add_point(&self, path: &mut Path, pt: FixedPoint) -> Result<()> {
        path.check_in_bbox(pt)?;
        path.position = pt;
        path.update_moveto();
        Ok(())
    }

    fn add_line(&self, path: &mut Path, pt: FixedPoint, notes: SegmentNotes) -> Result<()> {
        path.check_in_bbox(pt)?;
        path.push_drawing(SegmentKind::Line, pt, notes)
    }

    fn add_gap(&self, path: &mut Path, pt: FixedPoint, notes: SegmentNotes) -> Result<()> {
        path.check_in_bbox(pt)?;
        path.push_drawing(SegmentKind::Gap, pt, notes)
    }

    fn add_dash(
        &self,
        path: &mut Path,
        pt: FixedPoint,
        tangent: FixedPoint,
        notes: SegmentNotes,
    ) -> Result<()> {
        path.check_in_bbox(pt)?;
        path.push_drawing(SegmentKind::Dash { tangent }, pt, notes)
    }

    fn add_curve(&self, path: &mut Path, curve: Curve, notes: SegmentNotes) -> Result<()> {
        path.check_in_bbox(curve.p1)?;
        path.check_in_bbox(curve.p2)?;
        path.check_in_bbox(curve.pt)?;
        let kind = SegmentKind::Curve {
            p1: curve.p1,
            p2: curve.p2,
        };
        path.push_drawing(kind, curve.pt, notes)
    }

    fn close_subpath(&self, path: &mut Path, notes: SegmentNotes) -> Result<()> {
        if !path.state_flags.subpath_open() {
            return Ok(());
        }
        let reopen = path.state_flags.last_is_moveto();
        let position = path.position;
        let store = path.store_mut()?;
        if reopen {
            store.push_subpath(position)?;
        }
        path.position = store.close_current(notes)?;
        path.update_closepath();
        Ok(())
    }

    fn add_lines(&self, path: &mut Path, pts: &[FixedPoint], notes: SegmentNotes) -> Result<()> {
        let valid = pts
            .iter()
            .take_while(|pt| path.check_in_bbox(**pt).is_ok())
            .count();
        if let Some(&last) = pts[..valid].last() {
            path.open_subpath()?;
            path.store_mut()?.push_lines(&pts[..valid], notes)?;
            path.position = last;
            path.update_draw();
        }
        match pts.get(valid) {
            Some(pt) => Err(PathError::OutOfBounds(pt.x, pt.y)),
            None => Ok(()),
        }
    }
}

impl Path {
    /// Starts a subpath at the current position unless a drawing operation already did.
    pub(crate) fn open_subpath(&mut self) -> Result<()> {
        if self.state_flags.is_drawing() {
            return Ok(());
        }
        if !self.state_flags.position_valid() {
            return Err(PathError::NoCurrentPoint);
        }
        let pt = self.position;
        self.store_mut()?.push_subpath(pt)?;
        Ok(())
    }

    fn push_drawing(&mut self, kind: SegmentKind, pt: FixedPoint, notes: SegmentNotes) -> Result<()> {
        self.open_subpath()?;
        self.store_mut()?.push_segment(kind, pt, notes)?;
        self.position = pt;
        self.update_draw();
        Ok(())
    }

    /// Sets the current point (moveto).
    pub fn add_point(&mut self, x: Fixed, y: Fixed) -> Result<()> {
        let procs = self.procs;
        procs.add_point(self, FixedPoint::new(x, y))
    }

    /// Moves the current point by an offset (rmoveto).
    ///
    /// Fails with [`PathError::NoCurrentPoint`] if there is no current point and with
    /// [`PathError::LimitCheck`] if it was clamped or the sum overflows.
    pub fn add_relative_point(&mut self, dx: Fixed, dy: Fixed) -> Result<()> {
        if !self.state_flags.position_in_range() {
            return Err(if self.state_flags.position_valid() {
                PathError::LimitCheck
            } else {
                PathError::NoCurrentPoint
            });
        }
        let pt = self
            .position
            .checked_add(dx, dy)
            .ok_or(PathError::LimitCheck)?;
        let procs = self.procs;
        procs.add_point(self, pt)
    }

    pub fn add_line(&mut self, x: Fixed, y: Fixed) -> Result<()> {
        self.add_line_notes(x, y, SegmentNotes::NONE)
    }

    /// Appends a line from the current point (lineto).
    pub fn add_line_notes(&mut self, x: Fixed, y: Fixed, notes: SegmentNotes) -> Result<()> {
        let procs = self.procs;
        procs.add_line(self, FixedPoint::new(x, y), notes)
    }

    /// Appends a line that moves the current point without being stroked.
    pub fn add_gap_notes(&mut self, x: Fixed, y: Fixed, notes: SegmentNotes) -> Result<()> {
        let procs = self.procs;
        procs.add_gap(self, FixedPoint::new(x, y), notes)
    }

    /// Appends a dash: a short line with the tangent of the curve it was cut from.
    pub fn add_dash_notes(
        &mut self,
        x: Fixed,
        y: Fixed,
        dx: Fixed,
        dy: Fixed,
        notes: SegmentNotes,
    ) -> Result<()> {
        let procs = self.procs;
        procs.add_dash(self, FixedPoint::new(x, y), FixedPoint::new(dx, dy), notes)
    }

    pub fn add_lines(&mut self, pts: &[FixedPoint]) -> Result<()> {
        self.add_lines_notes(pts, SegmentNotes::NONE)
    }

    /// Appends a line to each point in turn.
    ///
    /// On failure the lines before the offending point are kept, as if each had been
    /// added with [`Path::add_line_notes`].
    pub fn add_lines_notes(&mut self, pts: &[FixedPoint], notes: SegmentNotes) -> Result<()> {
        if pts.is_empty() {
            return Ok(());
        }
        let procs = self.procs;
        procs.add_lines(self, pts, notes)
    }

    pub fn add_curve(
        &mut self,
        x1: Fixed,
        y1: Fixed,
        x2: Fixed,
        y2: Fixed,
        x3: Fixed,
        y3: Fixed,
    ) -> Result<()> {
        self.add_curve_notes(
            Curve::new(
                FixedPoint::new(x1, y1),
                FixedPoint::new(x2, y2),
                FixedPoint::new(x3, y3),
            ),
            SegmentNotes::NONE,
        )
    }

    /// Appends a cubic Bezier from the current point (curveto).
    pub fn add_curve_notes(&mut self, curve: Curve, notes: SegmentNotes) -> Result<()> {
        let procs = self.procs;
        procs.add_curve(self, curve, notes)
    }

    /// Appends a single curve approximating an arc of less than a semicircle.
    ///
    /// The arc runs from the current point to `(x3, y3)`, and its tangents meet at
    /// `(xt, yt)`. Both control points lie `fraction` of the way from their endpoint to
    /// the tangent intersection; a fraction of `4/3 / (1 + sqrt(1 + (d/r)^2))` puts the
    /// curve's midpoint on the circle. The curve is marked [`SegmentNotes::FROM_ARC`].
    pub fn add_partial_arc_notes(
        &mut self,
        x3: Fixed,
        y3: Fixed,
        xt: Fixed,
        yt: Fixed,
        fraction: f64,
        notes: SegmentNotes,
    ) -> Result<()> {
        let p0 = self.position;
        let curve = Curve::new(
            FixedPoint::new(
                toward(p0.x, xt, fraction)?,
                toward(p0.y, yt, fraction)?,
            ),
            FixedPoint::new(toward(x3, xt, fraction)?, toward(y3, yt, fraction)?),
            FixedPoint::new(x3, y3),
        );
        self.add_curve_notes(curve, notes | SegmentNotes::FROM_ARC)
    }

    /// Appends a closed rectangle as its own subpath.
    pub fn add_rectangle(&mut self, x0: Fixed, y0: Fixed, x1: Fixed, y1: Fixed) -> Result<()> {
        self.add_point(x0, y0)?;
        self.add_lines(&[
            FixedPoint::new(x0, y1),
            FixedPoint::new(x1, y1),
            FixedPoint::new(x1, y0),
        ])?;
        self.close_subpath()
    }

    pub fn close_subpath(&mut self) -> Result<()> {
        self.close_subpath_notes(SegmentNotes::NONE)
    }

    /// Closes the current subpath (closepath).
    ///
    /// Does nothing if no subpath is open. After a bare moveto, a degenerate subpath is
    /// created at the current point so that the close has something to refer to.
    pub fn close_subpath_notes(&mut self, notes: SegmentNotes) -> Result<()> {
        let procs = self.procs;
        procs.close_subpath(self, notes)
    }

    /// Removes the trailing line of the current subpath and closes it.
    pub fn pop_close_notes(&mut self, notes: SegmentNotes) -> Result<()> {
        if matches!(self.storage, Storage::Accumulator) {
            return Err(PathError::InvalidState("bbox accumulator has no segments"));
        }
        self.store_mut()?.pop_line()?;
        self.close_subpath_notes(notes)
    }

    /// Moves the subpaths of `from` to the end of this path and resets `from`.
    ///
    /// The current point and state flags are taken over from `from`.
    pub fn add_path(&mut self, from: &mut Self) -> Result<()> {
        let src = from.store_mut()?;
        let dst = self.store_mut()?;
        dst.append(src)?;
        self.position = from.position;
        self.state_flags = from.state_flags;
        from.reset();
        Ok(())
    }
}

/// A point `fraction` of the way from `from` to `to`, truncated towards `from`.
fn toward(from: Fixed, to: Fixed, fraction: f64) -> Result<Fixed> {
    let offset = ((to as i64 - from as i64) as f64 * fraction) as i64;
    Fixed::try_from(from as i64 + offset).map_err(|_| PathError::LimitCheck)
}
