// Copyright 2025 the Fixpath Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Conversion between fixed-point paths and floating point `kurbo` paths.

use log::warn;
use peniko::kurbo::{Affine, BezPath, PathEl, Point, QuadBez};

use crate::error::{PathError, Result};
use crate::fixed::{fixed_to_f64, float_to_fixed_clamped, FixedPoint};
use crate::path::{Path, StateFlags};
use crate::segment::{Curve, SegmentKind, SegmentNotes};

/// Converts a device space point, clamping it to the representable range.
///
/// The flag is `true` if either coordinate was clamped.
fn to_fixed(pt: Point) -> Result<(FixedPoint, bool)> {
    let (x, cx) = float_to_fixed_clamped(pt.x).ok_or(PathError::InvalidCoordinate)?;
    let (y, cy) = float_to_fixed_clamped(pt.y).ok_or(PathError::InvalidCoordinate)?;
    if cx || cy {
        warn!("clamped point ({}, {}) to the fixed-point range", pt.x, pt.y);
    }
    Ok((FixedPoint::new(x, y), cx || cy))
}

fn to_point(pt: FixedPoint) -> Point {
    Point::new(fixed_to_f64(pt.x), fixed_to_f64(pt.y))
}

impl Path {
    /// Appends floating point path elements, mapped to device space by `transform`.
    ///
    /// Coordinates outside the fixed-point range are clamped and the resulting current
    /// point is flagged with [`StateFlags::OUTSIDE_RANGE`]. Quadratic segments are raised
    /// to cubics. A NaN coordinate fails with [`PathError::InvalidCoordinate`].
    pub fn append_kurbo<I>(&mut self, elements: I, transform: Affine) -> Result<()>
    where
        I: IntoIterator<Item = PathEl>,
    {
        let mut start = Point::ZERO;
        let mut last = Point::ZERO;
        for el in elements {
            let clamped = match el {
                PathEl::MoveTo(p) => {
                    let p = transform * p;
                    let (pt, clamped) = to_fixed(p)?;
                    self.add_point(pt.x, pt.y)?;
                    start = p;
                    last = p;
                    clamped
                }
                PathEl::LineTo(p) => {
                    let p = transform * p;
                    let (pt, clamped) = to_fixed(p)?;
                    self.add_line(pt.x, pt.y)?;
                    last = p;
                    clamped
                }
                PathEl::QuadTo(p1, p2) => {
                    let cubic = QuadBez::new(last, transform * p1, transform * p2).raise();
                    last = cubic.p3;
                    self.append_cubic(cubic.p1, cubic.p2, cubic.p3)?
                }
                PathEl::CurveTo(p1, p2, p3) => {
                    let p3 = transform * p3;
                    last = p3;
                    self.append_cubic(transform * p1, transform * p2, p3)?
                }
                PathEl::ClosePath => {
                    self.close_subpath()?;
                    last = start;
                    false
                }
            };
            if clamped {
                let flags = self.state_flags();
                self.set_state_flags(flags.union(StateFlags::OUTSIDE_RANGE));
            }
        }
        Ok(())
    }

    fn append_cubic(&mut self, p1: Point, p2: Point, p3: Point) -> Result<bool> {
        let (p1, c1) = to_fixed(p1)?;
        let (p2, c2) = to_fixed(p2)?;
        let (p3, c3) = to_fixed(p3)?;
        self.add_curve_notes(Curve::new(p1, p2, p3), SegmentNotes::NONE)?;
        Ok(c1 || c2 || c3)
    }

    /// Converts the path to device space `kurbo` elements.
    ///
    /// Gaps and dashes become plain lines.
    pub fn to_kurbo(&self) -> BezPath {
        let mut out = BezPath::new();
        for (_, seg) in self.segments() {
            match seg.kind {
                SegmentKind::Start(_) => out.move_to(to_point(seg.pt)),
                SegmentKind::Line | SegmentKind::Gap | SegmentKind::Dash { .. } => {
                    out.line_to(to_point(seg.pt));
                }
                SegmentKind::Curve { p1, p2 } => {
                    out.curve_to(to_point(p1), to_point(p2), to_point(seg.pt));
                }
                SegmentKind::Close(_) => out.close_path(),
            }
        }
        out
    }
}
