// Copyright 2025 the Fixpath Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Path segments and subpath records.
//!
//! Segments live in an arena owned by a [`PathStore`](crate::PathStore) and are linked
//! through [`SegmentIx`] indices instead of pointers.

use core::ops::{BitOr, BitOrAssign};

use crate::fixed::FixedPoint;

/// Index of a segment in its store's arena.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SegmentIx(u32);

impl SegmentIx {
    /// Marks the absence of a link.
    pub const NONE: Self = Self(u32::MAX);

    pub(crate) fn new(index: usize) -> Self {
        debug_assert!(index < u32::MAX as usize);
        Self(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn is_none(self) -> bool {
        self == Self::NONE
    }

    pub fn is_some(self) -> bool {
        self != Self::NONE
    }

    /// Converts to an `Option`, mapping [`SegmentIx::NONE`] to `None`.
    pub fn get(self) -> Option<Self> {
        self.is_some().then_some(self)
    }

    pub(crate) fn offset(self, by: usize) -> Self {
        if self.is_none() {
            self
        } else {
            Self::new(self.index() + by)
        }
    }
}

/// Index of a subpath record in its store.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SubpathIx(pub(crate) u32);

impl SubpathIx {
    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub(crate) fn offset(self, by: usize) -> Self {
        Self(self.0 + by as u32)
    }
}

/// Annotations attached to a segment.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct SegmentNotes(pub u16);

impl SegmentNotes {
    /// No annotation.
    pub const NONE: Self = Self(0);

    /// The segment continues a batch of lines emitted by the same flattening call.
    pub const NOT_FIRST: Self = Self(0x1);

    /// The segment was produced by an arc approximation.
    pub const FROM_ARC: Self = Self(0x2);

    /// The segment starts a dash.
    pub const DASH_HEAD: Self = Self(0x4);

    /// The segment ends a dash.
    pub const DASH_TAIL: Self = Self(0x8);

    /// Returns `true` if every bit of `other` is set.
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for SegmentNotes {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for SegmentNotes {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// The control points and endpoint of a cubic segment.
///
/// The start point is implicit: it is the endpoint of the preceding segment.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Curve {
    pub p1: FixedPoint,
    pub p2: FixedPoint,
    pub pt: FixedPoint,
}

impl Curve {
    pub const fn new(p1: FixedPoint, p2: FixedPoint, pt: FixedPoint) -> Self {
        Self { p1, p2, pt }
    }
}

/// Segment variant.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SegmentKind {
    /// Start of a subpath.
    Start(SubpathIx),
    /// Straight line.
    Line,
    /// Straight line that is not stroked.
    Gap,
    /// Short line produced by dashing, with the tangent of the dashed curve.
    Dash { tangent: FixedPoint },
    /// Cubic Bezier; the segment point is the curve endpoint.
    Curve { p1: FixedPoint, p2: FixedPoint },
    /// Closes the subpath; the segment point is the subpath start.
    Close(SubpathIx),
}

/// A segment in the arena.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Segment {
    pub kind: SegmentKind,
    /// End point of the segment.
    pub pt: FixedPoint,
    pub notes: SegmentNotes,
    pub(crate) prev: SegmentIx,
    pub(crate) next: SegmentIx,
}

impl Segment {
    pub(crate) fn new(kind: SegmentKind, pt: FixedPoint, notes: SegmentNotes) -> Self {
        Self {
            kind,
            pt,
            notes,
            prev: SegmentIx::NONE,
            next: SegmentIx::NONE,
        }
    }

    /// The previous segment in the chain.
    pub fn prev(&self) -> Option<SegmentIx> {
        self.prev.get()
    }

    /// The next segment in the chain.
    pub fn next(&self) -> Option<SegmentIx> {
        self.next.get()
    }

    pub fn is_curve(&self) -> bool {
        matches!(self.kind, SegmentKind::Curve { .. })
    }

    /// The curve data, if this is a curve.
    pub fn curve(&self) -> Option<Curve> {
        match self.kind {
            SegmentKind::Curve { p1, p2 } => Some(Curve::new(p1, p2, self.pt)),
            _ => None,
        }
    }
}

/// Bookkeeping for one subpath.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Subpath {
    /// The subpath's start segment.
    pub(crate) start: SegmentIx,
    /// Most recently appended segment of this subpath.
    pub(crate) last: SegmentIx,
    /// Start point.
    pub pt: FixedPoint,
    pub(crate) curve_count: u32,
    pub(crate) is_closed: bool,
}

impl Subpath {
    pub fn start(&self) -> SegmentIx {
        self.start
    }

    pub fn last(&self) -> SegmentIx {
        self.last
    }

    pub fn curve_count(&self) -> u32 {
        self.curve_count
    }

    pub fn is_closed(&self) -> bool {
        self.is_closed
    }
}
