// Copyright 2025 the Fixpath Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Curve flattening.
//!
//! A cubic is approximated by `2^k` lines whose end points are computed with exact
//! scaled-integer forward differences. When `k` or the curve's polynomial coefficients
//! are too large for that, the curve is bisected until its pieces fit.

mod accum;
mod estimate;
mod iter;
mod split;

use log::debug;
use smallvec::SmallVec;

pub use estimate::{curve_log2_samples, SamplePolicy, MAX_LOG2_SAMPLES};
pub use iter::{FlattenedIterator, Samples, K_SAMPLE_MAX};
pub use split::split_curve_midpoint;

use crate::error::{PathError, Result};
use crate::fixed::{Fixed, FixedPoint};
use crate::path::Path;
use crate::segment::{Curve, SegmentKind, SegmentNotes};

/// Number of points collected before they are added to the path.
pub const MAX_POINTS: usize = 64;

/// Maximum nesting of midpoint bisections for one curve.
///
/// Every representable curve fits after far fewer splits; reaching this depth means the
/// requested `k` was unreasonable or the arithmetic is broken.
pub const MAX_SPLIT_DEPTH: u32 = 64;

type PointBuf = SmallVec<[FixedPoint; MAX_POINTS]>;

impl Path {
    /// Appends the flattening of `curve`, which starts at the current point.
    ///
    /// The number of lines is chosen from `flatness` with the default [`SamplePolicy`].
    /// The first line carries `notes`; every later line also carries
    /// [`SegmentNotes::NOT_FIRST`].
    pub fn add_flattened_curve(
        &mut self,
        curve: &Curve,
        flatness: Fixed,
        notes: SegmentNotes,
    ) -> Result<()> {
        self.add_flattened_curve_with(curve, flatness, &SamplePolicy::default(), notes)
    }

    fn add_flattened_curve_with(
        &mut self,
        curve: &Curve,
        flatness: Fixed,
        policy: &SamplePolicy,
        notes: SegmentNotes,
    ) -> Result<()> {
        policy.validate()?;
        let p0 = self.current_point()?;
        let k = policy.log2_samples(p0, curve, flatness);
        debug!("flatten curve from {p0:?} to {:?} with k={k}", curve.pt);
        self.subdivide_curve(k, curve, notes)
    }

    /// Appends `curve` as `2^k` lines, bisecting it first if it cannot be sampled directly.
    pub fn subdivide_curve(&mut self, k: u32, curve: &Curve, notes: SegmentNotes) -> Result<()> {
        let mut points = PointBuf::new();
        self.subdivide_rec(k, *curve, notes, 0, &mut points)
    }

    fn subdivide_rec(
        &mut self,
        mut k: u32,
        mut curve: Curve,
        mut notes: SegmentNotes,
        mut depth: u32,
        points: &mut PointBuf,
    ) -> Result<()> {
        loop {
            let p0 = self.current_point()?;
            if let Some(mut iter) = FlattenedIterator::for_curve(p0, &curve, k) {
                return self.emit_samples(&mut iter, notes, points);
            }
            depth += 1;
            if depth > MAX_SPLIT_DEPTH {
                return Err(PathError::internal("curve bisection did not converge"));
            }
            k = k.saturating_sub(1);
            let (first, second) = split_curve_midpoint(p0, &curve);
            debug!("bisect curve at depth {depth}, k={k}");
            self.subdivide_rec(k, first, notes, depth, points)?;
            notes |= SegmentNotes::NOT_FIRST;
            curve = second;
        }
    }

    /// Runs the iterator to its end, adding its lines in batches.
    fn emit_samples(
        &mut self,
        iter: &mut FlattenedIterator,
        mut notes: SegmentNotes,
        points: &mut PointBuf,
    ) -> Result<()> {
        points.clear();
        loop {
            let more = iter.step_forward()?;
            points.push(iter.segment().1);
            if points.len() == MAX_POINTS || !more {
                self.generate_segments(points, notes)?;
                points.clear();
                if !more {
                    return Ok(());
                }
                notes |= SegmentNotes::NOT_FIRST;
            }
        }
    }

    fn generate_segments(&mut self, points: &[FixedPoint], notes: SegmentNotes) -> Result<()> {
        let Some((first, rest)) = points.split_first() else {
            return Ok(());
        };
        if notes.contains(SegmentNotes::NOT_FIRST) {
            return self.add_lines_notes(points, notes);
        }
        self.add_line_notes(first.x, first.y, notes)?;
        self.add_lines_notes(rest, notes | SegmentNotes::NOT_FIRST)
    }

    /// Appends a line, cutting it into four pieces if its ends are too far apart.
    pub fn add_split_line_notes(&mut self, pt: FixedPoint, notes: SegmentNotes) -> Result<()> {
        let p0 = self.current_point()?;
        let mut iter = FlattenedIterator::for_line(p0, pt);
        self.emit_samples(&mut iter, notes, &mut PointBuf::new())
    }

    /// A copy of the path with every curve flattened and long lines split.
    pub fn flattened(&self, flatness: Fixed) -> Result<Self> {
        self.flattened_with(flatness, &SamplePolicy::default())
    }

    /// [`Path::flattened`] with an explicit sample count policy.
    ///
    /// The copy has its own storage. Its current point and state flags are those of this
    /// path; a tracked bounding box is carried over, and becomes conservative if curves
    /// were flattened.
    pub fn flattened_with(&self, flatness: Fixed, policy: &SamplePolicy) -> Result<Self> {
        policy.validate()?;
        let mut out = Self::new();
        for (_, seg) in self.segments() {
            match seg.kind {
                SegmentKind::Start(_) => out.add_point(seg.pt.x, seg.pt.y)?,
                SegmentKind::Line => out.add_split_line_notes(seg.pt, seg.notes)?,
                SegmentKind::Gap => out.add_gap_notes(seg.pt.x, seg.pt.y, seg.notes)?,
                SegmentKind::Dash { tangent } => {
                    out.add_dash_notes(seg.pt.x, seg.pt.y, tangent.x, tangent.y, seg.notes)?;
                }
                SegmentKind::Curve { p1, p2 } => {
                    let curve = Curve::new(p1, p2, seg.pt);
                    out.add_flattened_curve_with(&curve, flatness, policy, seg.notes)?;
                }
                SegmentKind::Close(_) => out.close_subpath_notes(seg.notes)?,
            }
        }
        out.position = self.position;
        out.state_flags = self.state_flags;
        if self.bbox_set {
            out.bbox = self.bbox;
            out.bbox_set = true;
            out.bbox_accurate = self.bbox_accurate && self.curve_count() == 0;
        }
        Ok(out)
    }
}
