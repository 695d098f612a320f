// Copyright 2025 the Fixpath Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The segment storage shared between path handles.

use core::iter::Enumerate;
use core::slice;

use log::trace;

use crate::error::{PathError, Result};
use crate::fixed::FixedPoint;
use crate::segment::{Segment, SegmentIx, SegmentKind, SegmentNotes, Subpath, SubpathIx};

/// The subpaths and segments of a path.
///
/// Segments are kept in an arena in chain order: the start segment of each subpath
/// follows the last segment of the previous one, and `prev`/`next` links always point
/// to the neighbouring arena slots. Subpath records are kept in the same order, so the
/// first subpath is the first record and the current subpath is the last one.
///
/// `subpath_count` and `curve_count` are caches of what the chain holds; every mutation
/// keeps them in sync, and [`PathStore::validate`] checks that they are.
#[derive(Debug, Default)]
pub struct PathStore {
    segments: Vec<Segment>,
    subpaths: Vec<Subpath>,
    subpath_count: u32,
    curve_count: u32,
}

/// The store seen through a path that has no segment storage.
pub(crate) static EMPTY: PathStore = PathStore::new();

impl PathStore {
    pub const fn new() -> Self {
        Self {
            segments: Vec::new(),
            subpaths: Vec::new(),
            subpath_count: 0,
            curve_count: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.subpaths.is_empty()
    }

    pub fn subpath_count(&self) -> u32 {
        self.subpath_count
    }

    pub fn curve_count(&self) -> u32 {
        self.curve_count
    }

    /// Number of segments, including subpath starts.
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// The segment at `ix`.
    ///
    /// # Panics
    ///
    /// Panics if `ix` does not belong to this store. See [`PathStore::get_segment`].
    pub fn segment(&self, ix: SegmentIx) -> &Segment {
        &self.segments[ix.index()]
    }

    /// The segment at `ix`, or `None` if there is no such segment.
    pub fn get_segment(&self, ix: SegmentIx) -> Option<&Segment> {
        self.segments.get(ix.get()?.index())
    }

    /// The subpath record at `ix`.
    ///
    /// # Panics
    ///
    /// Panics if `ix` does not belong to this store. See [`PathStore::get_subpath`].
    pub fn subpath(&self, ix: SubpathIx) -> &Subpath {
        &self.subpaths[ix.index()]
    }

    /// The subpath record at `ix`, or `None` if there is no such subpath.
    pub fn get_subpath(&self, ix: SubpathIx) -> Option<&Subpath> {
        self.subpaths.get(ix.index())
    }

    pub fn first_subpath(&self) -> Option<SubpathIx> {
        (!self.subpaths.is_empty()).then_some(SubpathIx(0))
    }

    pub fn current_subpath(&self) -> Option<SubpathIx> {
        self.subpaths
            .len()
            .checked_sub(1)
            .map(|ix| SubpathIx(ix as u32))
    }

    /// The most recently appended segment.
    pub fn last_segment(&self) -> Option<&Segment> {
        let sub = self.current_subpath()?;
        Some(self.segment(self.subpath(sub).last))
    }

    /// Iterates over every segment, following the chain from the first subpath.
    pub fn segments(&self) -> Segments<'_> {
        Segments {
            store: self,
            next: if self.segments.is_empty() {
                SegmentIx::NONE
            } else {
                SegmentIx::new(0)
            },
            end: SegmentIx::NONE,
        }
    }

    /// Iterates over the segments of one subpath, starting with its start segment.
    pub fn subpath_segments(&self, ix: SubpathIx) -> Segments<'_> {
        let sub = self.subpath(ix);
        Segments {
            store: self,
            next: sub.start,
            end: sub.last,
        }
    }

    pub fn subpaths(&self) -> Subpaths<'_> {
        Subpaths {
            inner: self.subpaths.iter().enumerate(),
        }
    }

    /// Opens a new subpath starting at `pt`.
    pub(crate) fn push_subpath(&mut self, pt: FixedPoint) -> Result<SubpathIx> {
        self.segments.try_reserve(1)?;
        self.subpaths.try_reserve(1)?;
        let sub_ix = SubpathIx(self.subpaths.len() as u32);
        let seg_ix = SegmentIx::new(self.segments.len());
        let mut seg = Segment::new(SegmentKind::Start(sub_ix), pt, SegmentNotes::NONE);
        if let Some(prev) = self.segments.last_mut() {
            prev.next = seg_ix;
            seg.prev = SegmentIx::new(seg_ix.index() - 1);
        }
        trace!("[P]{seg:?}");
        self.segments.push(seg);
        self.subpaths.push(Subpath {
            start: seg_ix,
            last: seg_ix,
            pt,
            curve_count: 0,
            is_closed: false,
        });
        self.subpath_count += 1;
        Ok(sub_ix)
    }

    /// Appends a segment to the current subpath.
    pub(crate) fn push_segment(
        &mut self,
        kind: SegmentKind,
        pt: FixedPoint,
        notes: SegmentNotes,
    ) -> Result<SegmentIx> {
        if self.subpaths.is_empty() {
            return Err(PathError::internal("segment appended without an open subpath"));
        }
        self.segments.try_reserve(1)?;
        Ok(self.link(Segment::new(kind, pt, notes)))
    }

    /// Appends a line to the current subpath for each point.
    pub(crate) fn push_lines(&mut self, pts: &[FixedPoint], notes: SegmentNotes) -> Result<()> {
        if self.subpaths.is_empty() {
            return Err(PathError::internal("lines appended without an open subpath"));
        }
        self.segments.try_reserve(pts.len())?;
        for &pt in pts {
            self.link(Segment::new(SegmentKind::Line, pt, notes));
        }
        Ok(())
    }

    /// Links a segment after the current subpath's last segment. Capacity must be reserved.
    fn link(&mut self, mut seg: Segment) -> SegmentIx {
        let ix = SegmentIx::new(self.segments.len());
        let is_curve = seg.is_curve();
        let current = self.subpaths.len() - 1;
        let sub = &mut self.subpaths[current];
        seg.prev = sub.last;
        sub.last = ix;
        if is_curve {
            sub.curve_count += 1;
            self.curve_count += 1;
        }
        self.segments[seg.prev.index()].next = ix;
        trace!("[P]{seg:?}");
        self.segments.push(seg);
        ix
    }

    pub(crate) fn close_current(&mut self, notes: SegmentNotes) -> Result<FixedPoint> {
        let Some(sub_ix) = self.current_subpath() else {
            return Err(PathError::internal("close without an open subpath"));
        };
        let start = self.subpath(sub_ix).pt;
        self.push_segment(SegmentKind::Close(sub_ix), start, notes)?;
        self.subpaths[sub_ix.index()].is_closed = true;
        Ok(start)
    }

    /// Removes the last segment of the current subpath, which must be a line.
    pub(crate) fn pop_line(&mut self) -> Result<()> {
        let Some(sub) = self.subpaths.last_mut() else {
            return Err(PathError::InvalidState("no current subpath"));
        };
        let last = sub.last;
        if self.segments[last.index()].kind != SegmentKind::Line {
            return Err(PathError::InvalidState("last segment is not a line"));
        }
        if let Some(seg) = self.segments.pop() {
            sub.last = seg.prev;
            self.segments[seg.prev.index()].next = SegmentIx::NONE;
            trace!("[P]release {seg:?}");
        }
        Ok(())
    }

    /// Moves all subpaths of `other` to the end of this store, leaving `other` empty.
    pub(crate) fn append(&mut self, other: &mut Self) -> Result<()> {
        if other.subpaths.is_empty() {
            return Ok(());
        }
        self.segments.try_reserve(other.segments.len())?;
        self.subpaths.try_reserve(other.subpaths.len())?;
        let seg_offset = self.segments.len();
        let sub_offset = self.subpaths.len();
        for mut seg in other.segments.drain(..) {
            seg.prev = seg.prev.offset(seg_offset);
            seg.next = seg.next.offset(seg_offset);
            seg.kind = match seg.kind {
                SegmentKind::Start(sub) => SegmentKind::Start(sub.offset(sub_offset)),
                SegmentKind::Close(sub) => SegmentKind::Close(sub.offset(sub_offset)),
                kind => kind,
            };
            self.segments.push(seg);
        }
        for mut sub in other.subpaths.drain(..) {
            sub.start = sub.start.offset(seg_offset);
            sub.last = sub.last.offset(seg_offset);
            self.subpaths.push(sub);
        }
        if seg_offset > 0 {
            let joint = SegmentIx::new(seg_offset);
            self.segments[seg_offset - 1].next = joint;
            self.segments[seg_offset].prev = SegmentIx::new(seg_offset - 1);
        }
        self.subpath_count += other.subpath_count;
        self.curve_count += other.curve_count;
        other.subpath_count = 0;
        other.curve_count = 0;
        Ok(())
    }

    /// Copies the store point for point.
    pub(crate) fn try_clone(&self) -> Result<Self> {
        let mut segments = Vec::new();
        segments.try_reserve_exact(self.segments.len())?;
        segments.extend_from_slice(&self.segments);
        let mut subpaths = Vec::new();
        subpaths.try_reserve_exact(self.subpaths.len())?;
        subpaths.extend_from_slice(&self.subpaths);
        Ok(Self {
            segments,
            subpaths,
            subpath_count: self.subpath_count,
            curve_count: self.curve_count,
        })
    }

    /// Releases every segment, most recent first.
    pub(crate) fn clear(&mut self) {
        while let Some(seg) = self.segments.pop() {
            trace!("[P]release {seg:?}");
        }
        self.subpaths.clear();
        self.subpath_count = 0;
        self.curve_count = 0;
    }

    /// Checks the links and the cached counts against the chain.
    pub fn validate(&self) -> Result<()> {
        let mut subpaths = 0_u32;
        let mut curves = 0_u32;
        let mut current: Option<SubpathIx> = None;
        let mut sub_curves = 0_u32;
        let mut prev = SegmentIx::NONE;
        let mut ix = if self.segments.is_empty() {
            SegmentIx::NONE
        } else {
            SegmentIx::new(0)
        };
        let mut visited = 0_usize;
        let finish_subpath = |sub: Option<SubpathIx>, last: SegmentIx, curves: u32| -> Result<()> {
            if let Some(sub) = sub {
                let record = self.subpath(sub);
                if record.last != last {
                    return Err(PathError::internal("subpath last segment is stale"));
                }
                if record.curve_count != curves {
                    return Err(PathError::internal("subpath curve count is stale"));
                }
            }
            Ok(())
        };
        while let Some(seg_ix) = ix.get() {
            if visited >= self.segments.len() {
                return Err(PathError::internal("segment chain has a cycle"));
            }
            visited += 1;
            let seg = self.segment(seg_ix);
            if seg.prev != prev {
                return Err(PathError::internal("segment back link is inconsistent"));
            }
            match seg.kind {
                SegmentKind::Start(sub) => {
                    finish_subpath(current, prev, sub_curves)?;
                    if sub.index() != subpaths as usize || self.subpath(sub).start != seg_ix {
                        return Err(PathError::internal("subpath start is out of order"));
                    }
                    current = Some(sub);
                    sub_curves = 0;
                    subpaths += 1;
                }
                SegmentKind::Curve { .. } => {
                    curves += 1;
                    sub_curves += 1;
                }
                SegmentKind::Close(sub) => {
                    if Some(sub) != current || !self.subpath(sub).is_closed {
                        return Err(PathError::internal("close segment refers to another subpath"));
                    }
                }
                _ => {
                    if current.is_none() {
                        return Err(PathError::internal("segment outside of a subpath"));
                    }
                }
            }
            prev = seg_ix;
            ix = seg.next;
        }
        finish_subpath(current, prev, sub_curves)?;
        if visited != self.segments.len() || subpaths as usize != self.subpaths.len() {
            return Err(PathError::internal("unreachable segments in store"));
        }
        if subpaths != self.subpath_count {
            return Err(PathError::internal("subpath count is stale"));
        }
        if curves != self.curve_count {
            return Err(PathError::internal("curve count is stale"));
        }
        Ok(())
    }
}

impl Drop for PathStore {
    fn drop(&mut self) {
        self.clear();
    }
}

/// Iterator over a chain of segments.
#[derive(Clone, Debug)]
pub struct Segments<'a> {
    store: &'a PathStore,
    next: SegmentIx,
    end: SegmentIx,
}

impl<'a> Iterator for Segments<'a> {
    type Item = (SegmentIx, &'a Segment);

    fn next(&mut self) -> Option<Self::Item> {
        let ix = self.next.get()?;
        let seg = self.store.segment(ix);
        self.next = if ix == self.end {
            SegmentIx::NONE
        } else {
            seg.next
        };
        Some((ix, seg))
    }
}

/// Iterator over subpath records.
#[derive(Clone, Debug)]
pub struct Subpaths<'a> {
    inner: Enumerate<slice::Iter<'a, Subpath>>,
}

impl<'a> Iterator for Subpaths<'a> {
    type Item = (SubpathIx, &'a Subpath);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .next()
            .map(|(ix, sub)| (SubpathIx(ix as u32), sub))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::Curve;

    fn pt(x: i32, y: i32) -> FixedPoint {
        FixedPoint::new(x, y)
    }

    fn triangle() -> PathStore {
        let mut store = PathStore::new();
        store.push_subpath(pt(0, 0)).unwrap();
        store.push_lines(&[pt(10, 0), pt(10, 10)], SegmentNotes::NONE).unwrap();
        store.close_current(SegmentNotes::NONE).unwrap();
        store
    }

    #[test]
    fn links_follow_appends() {
        let store = triangle();
        store.validate().unwrap();
        let kinds: Vec<_> = store.segments().map(|(_, s)| s.kind).collect();
        assert_eq!(
            kinds,
            [
                SegmentKind::Start(SubpathIx(0)),
                SegmentKind::Line,
                SegmentKind::Line,
                SegmentKind::Close(SubpathIx(0)),
            ]
        );
        let sub = store.subpath(SubpathIx(0));
        assert!(sub.is_closed());
        assert_eq!(sub.last().index(), 3);
        assert_eq!(store.last_segment().unwrap().pt, pt(0, 0));
    }

    #[test]
    fn curve_counts_are_cached() {
        let mut store = triangle();
        store.push_subpath(pt(5, 5)).unwrap();
        let c = Curve::new(pt(6, 6), pt(7, 7), pt(8, 8));
        store
            .push_segment(
                SegmentKind::Curve { p1: c.p1, p2: c.p2 },
                c.pt,
                SegmentNotes::NONE,
            )
            .unwrap();
        assert_eq!(store.curve_count(), 1);
        assert_eq!(store.subpath_count(), 2);
        assert_eq!(store.subpath(SubpathIx(1)).curve_count(), 1);
        assert_eq!(store.subpath_segments(SubpathIx(1)).count(), 2);
        assert_eq!(store.subpath_segments(SubpathIx(0)).count(), 4);
        store.validate().unwrap();
    }

    #[test]
    fn append_relinks_chain() {
        let mut a = triangle();
        let mut b = triangle();
        a.append(&mut b).unwrap();
        assert!(b.is_empty());
        assert_eq!(b.subpath_count(), 0);
        assert_eq!(a.subpath_count(), 2);
        assert_eq!(a.segments().count(), 8);
        a.validate().unwrap();
        let second = a.subpath(SubpathIx(1));
        assert_eq!(second.start().index(), 4);
        assert_eq!(
            a.segment(second.last()).kind,
            SegmentKind::Close(SubpathIx(1))
        );
    }

    #[test]
    fn pop_line_only_removes_lines() {
        let mut store = PathStore::new();
        store.push_subpath(pt(0, 0)).unwrap();
        assert!(store.pop_line().is_err());
        store.push_lines(&[pt(1, 1)], SegmentNotes::NONE).unwrap();
        store.pop_line().unwrap();
        assert_eq!(store.segment_count(), 1);
        store.validate().unwrap();
    }

    #[test]
    fn push_requires_subpath() {
        let mut store = PathStore::new();
        let err = store
            .push_segment(SegmentKind::Line, pt(1, 1), SegmentNotes::NONE)
            .unwrap_err();
        assert!(err.is_internal());
    }

    #[test]
    fn clone_is_deep() {
        let store = triangle();
        let copy = store.try_clone().unwrap();
        drop(store);
        copy.validate().unwrap();
        assert_eq!(copy.segment_count(), 4);
    }

    #[test]
    fn foreign_indices_are_none() {
        let big = triangle();
        let small = PathStore::new();
        let (ix, _) = big.segments().last().unwrap();
        assert!(small.get_segment(ix).is_none());
        assert!(small.get_segment(SegmentIx::NONE).is_none());
        assert!(small.get_subpath(SubpathIx(0)).is_none());
        assert_eq!(big.get_segment(ix).unwrap().kind, SegmentKind::Close(SubpathIx(0)));
        assert!(big.get_subpath(SubpathIx(0)).unwrap().is_closed());
    }

    #[test]
    fn validate_detects_stale_counts() {
        let mut store = triangle();
        store.curve_count = 3;
        assert!(store.validate().unwrap_err().is_internal());
    }
}
