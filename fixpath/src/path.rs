// Copyright 2025 the Fixpath Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The path handle and its storage ownership.

use core::fmt;
use core::mem;
use std::rc::Rc;

use log::debug;

use crate::bbox::BboxProcs;
use crate::builder::DefaultProcs;
use crate::error::{PathError, Result};
use crate::fixed::{FixedPoint, FixedRect};
use crate::segment::{Curve, SegmentNotes};
use crate::store::{self, PathStore, Segments, Subpaths};

/// Flags describing the last operation applied to a path.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct StateFlags(pub u8);

impl StateFlags {
    /// State after newpath.
    pub const NONE: Self = Self(0);

    /// A subpath has been opened by a drawing operation.
    pub const IS_DRAWING: Self = Self(0x1);

    /// The current position is meaningful.
    pub const POSITION_VALID: Self = Self(0x2);

    /// A moveto or drawing operation was not yet followed by a closepath.
    pub const SUBPATH_OPEN: Self = Self(0x4);

    /// The current position was clamped when converted from floating point.
    pub const OUTSIDE_RANGE: Self = Self(0x8);

    /// State after moveto.
    pub const LAST_MOVETO: Self = Self(Self::POSITION_VALID.0 | Self::SUBPATH_OPEN.0);

    /// State after lineto, curveto and the other drawing operations.
    pub const LAST_DRAW: Self =
        Self(Self::IS_DRAWING.0 | Self::POSITION_VALID.0 | Self::SUBPATH_OPEN.0);

    /// State after closepath.
    pub const LAST_CLOSEPATH: Self = Self::POSITION_VALID;

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub const fn is_drawing(self) -> bool {
        self.contains(Self::IS_DRAWING)
    }

    pub const fn position_valid(self) -> bool {
        self.contains(Self::POSITION_VALID)
    }

    pub const fn subpath_open(self) -> bool {
        self.contains(Self::SUBPATH_OPEN)
    }

    pub const fn outside_range(self) -> bool {
        self.contains(Self::OUTSIDE_RANGE)
    }

    /// The position is valid and was not clamped.
    pub const fn position_in_range(self) -> bool {
        self.position_valid() && !self.outside_range()
    }

    /// The last operation was a moveto, so no subpath exists at the position yet.
    pub const fn last_is_moveto(self) -> bool {
        self.subpath_open() && !self.is_drawing()
    }
}

/// How much the tracked bounding box of a path can be trusted.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BboxState {
    /// No bounding box is tracked; [`Path::bbox`] computes one from the segments.
    Unset,
    /// The tracked box contains every point but may be larger.
    Conservative,
    /// The tracked box is the exact union of the points added.
    Exact,
}

/// Operation table behind the building operations of a [`Path`].
///
/// The default implementation stores segments; the bounding box accumulator only
/// tracks the extent of the points it is given.
pub(crate) trait PathProcs: fmt::Debug {
    fn add_point(&self, path: &mut Path, pt: FixedPoint) -> Result<()>;

    fn add_line(&self, path: &mut Path, pt: FixedPoint, notes: SegmentNotes) -> Result<()>;

    fn add_gap(&self, path: &mut Path, pt: FixedPoint, notes: SegmentNotes) -> Result<()>;

    fn add_dash(
        &self,
        path: &mut Path,
        pt: FixedPoint,
        tangent: FixedPoint,
        notes: SegmentNotes,
    ) -> Result<()>;

    fn add_curve(&self, path: &mut Path, curve: Curve, notes: SegmentNotes) -> Result<()>;

    fn close_subpath(&self, path: &mut Path, notes: SegmentNotes) -> Result<()>;

    /// Adds a line to each point, stopping at the first failure.
    fn add_lines(&self, path: &mut Path, pts: &[FixedPoint], notes: SegmentNotes) -> Result<()> {
        for &pt in pts {
            self.add_line(path, pt, notes)?;
        }
        Ok(())
    }

    /// Replaces the state flags, returning the previous ones.
    fn state_flags(&self, path: &mut Path, flags: StateFlags) -> StateFlags {
        mem::replace(&mut path.state_flags, flags)
    }
}

/// Where a path keeps its segments.
#[derive(Debug)]
pub(crate) enum Storage {
    /// Inline storage that may never be shared with another handle.
    Local(PathStore),
    /// Reference-counted storage, copied before mutation while shared.
    Shared(Rc<PathStore>),
    /// A bounding box accumulator never stores segments.
    Accumulator,
    /// The handle has been freed.
    Released,
}

/// A path in fixed-point device space.
///
/// A path is a handle onto a [`PathStore`] together with the state needed to keep
/// building it: the current position, the state flags, and an optional bounding box
/// that added points are validated against or accumulated into.
///
/// Handles created with [`Path::new`] and [`Path::share`] reference the same store
/// until one of them is mutated, at which point the mutating handle takes a private copy.
#[derive(Debug)]
pub struct Path {
    pub(crate) procs: &'static dyn PathProcs,
    pub(crate) storage: Storage,
    pub(crate) position: FixedPoint,
    pub(crate) bbox: FixedRect,
    pub(crate) bbox_set: bool,
    pub(crate) bbox_accurate: bool,
    pub(crate) state_flags: StateFlags,
}

impl Default for Path {
    fn default() -> Self {
        Self::new()
    }
}

impl Path {
    /// Creates an empty path with shareable storage.
    pub fn new() -> Self {
        Self::with_storage(Storage::Shared(Rc::new(PathStore::new())))
    }

    /// Creates an empty path whose storage belongs to this handle alone.
    ///
    /// Calling [`Path::share`] on such a path is an invariant violation.
    pub fn local() -> Self {
        Self::with_storage(Storage::Local(PathStore::new()))
    }

    /// Creates a local path that rejects points outside `rect`.
    pub fn local_rectangle(rect: FixedRect) -> Self {
        let mut path = Self::local();
        path.bbox = rect;
        path.bbox_set = true;
        path.bbox_accurate = true;
        path
    }

    /// Creates a pseudo-path that only accumulates the bounding box of what is added.
    ///
    /// Every point given to it grows the box: move targets, line and dash ends, and
    /// curve control points. The box is the exact union of those points. No segments are
    /// ever stored.
    pub fn bbox_accumulator() -> Self {
        let mut path = Self::with_storage(Storage::Accumulator);
        path.procs = &BboxProcs;
        path.bbox_accurate = true;
        path
    }

    fn with_storage(storage: Storage) -> Self {
        Self {
            procs: &DefaultProcs,
            storage,
            position: FixedPoint::ZERO,
            bbox: FixedRect::EMPTY,
            bbox_set: false,
            bbox_accurate: false,
            state_flags: StateFlags::NONE,
        }
    }

    /// Creates a second handle onto this path's storage.
    ///
    /// The new handle starts with the same position, flags and bounding box.
    pub fn share(&self) -> Result<Self> {
        let storage = match &self.storage {
            Storage::Shared(store) => Storage::Shared(Rc::clone(store)),
            Storage::Local(_) => {
                return Err(PathError::internal("attempt to share local path storage"));
            }
            Storage::Accumulator => {
                return Err(PathError::InvalidState("bbox accumulator has no storage"));
            }
            Storage::Released => return Err(PathError::Released),
        };
        let mut path = Self::with_storage(storage);
        path.copy_state(self);
        debug!("share path storage, {} references", path.ref_count());
        Ok(path)
    }

    /// Empties the path (newpath).
    ///
    /// Shared storage is left to the other handles and replaced by a fresh store;
    /// exclusive storage is cleared in place.
    pub fn reset(&mut self) {
        if matches!(self.storage, Storage::Released) {
            self.storage = Storage::Shared(Rc::new(PathStore::new()));
        }
        match &mut self.storage {
            Storage::Local(store) => store.clear(),
            Storage::Shared(store) => {
                if Rc::strong_count(store) > 1 {
                    *store = Rc::new(PathStore::new());
                } else if let Some(store) = Rc::get_mut(store) {
                    store.clear();
                }
            }
            Storage::Accumulator | Storage::Released => {}
        }
        self.init_contents();
    }

    fn init_contents(&mut self) {
        self.bbox = FixedRect::EMPTY;
        self.bbox_set = false;
        self.bbox_accurate = matches!(self.storage, Storage::Accumulator);
        self.state_flags = StateFlags::NONE;
    }

    /// Makes sure no other handle references this path's storage.
    pub fn unshare(&mut self) -> Result<()> {
        if let Storage::Shared(store) = &mut self.storage {
            if Rc::strong_count(store) > 1 {
                let copy = store.try_clone()?;
                debug!(
                    "unshare path storage: {} segments, {} other references",
                    copy.segment_count(),
                    Rc::strong_count(store) - 1
                );
                *store = Rc::new(copy);
            }
        }
        Ok(())
    }

    /// Exclusive access to the storage, copying it first if it is shared.
    pub(crate) fn store_mut(&mut self) -> Result<&mut PathStore> {
        self.unshare()?;
        match &mut self.storage {
            Storage::Local(store) => Ok(store),
            Storage::Shared(store) => Rc::get_mut(store)
                .ok_or_else(|| PathError::internal("unshared path storage is still aliased")),
            Storage::Accumulator => Err(PathError::internal("bbox accumulator has no storage")),
            Storage::Released => Err(PathError::Released),
        }
    }

    /// Releases this handle's reference to the storage.
    ///
    /// The storage is freed when its last handle lets go. Freeing twice is harmless.
    pub fn free(&mut self) {
        self.storage = Storage::Released;
    }

    /// Makes this path a copy of `from`, sharing storage where possible.
    ///
    /// If `from` has local storage, the storage is moved into a shared buffer that both
    /// handles then reference.
    pub fn assign(&mut self, from: &mut Self) -> Result<()> {
        let shared = match mem::replace(&mut from.storage, Storage::Released) {
            Storage::Local(store) => {
                debug!("promote local path storage to shared");
                Rc::new(store)
            }
            Storage::Shared(store) => store,
            Storage::Accumulator => {
                from.storage = Storage::Accumulator;
                return Err(PathError::InvalidState("bbox accumulator has no storage"));
            }
            Storage::Released => return Err(PathError::Released),
        };
        from.storage = Storage::Shared(Rc::clone(&shared));
        self.storage = Storage::Shared(shared);
        self.copy_state(from);
        Ok(())
    }

    /// Makes this path a copy of `from` and frees `from`.
    ///
    /// Two local paths swap their stores, so nothing is copied or promoted.
    pub fn assign_and_free(&mut self, mut from: Self) -> Result<()> {
        let result = if self.is_local() && from.is_local() {
            mem::swap(&mut self.storage, &mut from.storage);
            self.copy_state(&from);
            Ok(())
        } else {
            self.assign(&mut from)
        };
        from.free();
        result
    }

    fn copy_state(&mut self, from: &Self) {
        self.procs = from.procs;
        self.position = from.position;
        self.bbox = from.bbox;
        self.bbox_set = from.bbox_set;
        self.bbox_accurate = from.bbox_accurate;
        self.state_flags = from.state_flags;
    }

    /// Fails if a bounding box is tracked and the point lies outside it.
    pub(crate) fn check_in_bbox(&self, pt: FixedPoint) -> Result<()> {
        if self.bbox_set && !self.bbox.contains(pt.x, pt.y) {
            return Err(PathError::OutOfBounds(pt.x, pt.y));
        }
        Ok(())
    }

    pub(crate) fn update_moveto(&mut self) {
        self.state_flags = StateFlags::LAST_MOVETO;
    }

    pub(crate) fn update_draw(&mut self) {
        self.state_flags = StateFlags::LAST_DRAW;
    }

    pub(crate) fn update_closepath(&mut self) {
        self.state_flags = StateFlags::LAST_CLOSEPATH;
    }

    /// The current point, if there is one.
    pub fn current_point(&self) -> Result<FixedPoint> {
        if !self.state_flags.position_valid() {
            return Err(PathError::NoCurrentPoint);
        }
        Ok(self.position)
    }

    /// The current position, whether or not it is valid.
    pub fn position(&self) -> FixedPoint {
        self.position
    }

    /// The bounding box of the path.
    ///
    /// A tracked box is returned as is. Otherwise the box is computed from every stored
    /// point, control points included; an empty path yields its current point.
    pub fn bbox(&self) -> Result<FixedRect> {
        if self.bbox_set {
            return Ok(self.bbox);
        }
        let store = self.store();
        if store.is_empty() {
            return self.current_point().map(FixedRect::from_point);
        }
        let mut rect = FixedRect::EMPTY;
        for (_, seg) in store.segments() {
            if let Some(curve) = seg.curve() {
                rect.add_point(curve.p1.x, curve.p1.y);
                rect.add_point(curve.p2.x, curve.p2.y);
            }
            rect.add_point(seg.pt.x, seg.pt.y);
        }
        if self.state_flags.position_valid() {
            rect.add_point(self.position.x, self.position.y);
        }
        Ok(rect)
    }

    pub fn bbox_state(&self) -> BboxState {
        match (self.bbox_set, self.bbox_accurate) {
            (false, _) => BboxState::Unset,
            (true, false) => BboxState::Conservative,
            (true, true) => BboxState::Exact,
        }
    }

    /// The storage, or an empty store for accumulators and released handles.
    pub fn store(&self) -> &PathStore {
        match &self.storage {
            Storage::Local(store) => store,
            Storage::Shared(store) => &**store,
            Storage::Accumulator | Storage::Released => &store::EMPTY,
        }
    }

    pub fn subpath_count(&self) -> u32 {
        self.store().subpath_count()
    }

    pub fn curve_count(&self) -> u32 {
        self.store().curve_count()
    }

    pub fn segments(&self) -> Segments<'_> {
        self.store().segments()
    }

    pub fn subpaths(&self) -> Subpaths<'_> {
        self.store().subpaths()
    }

    /// Returns `true` if the path has no segments.
    pub fn is_empty(&self) -> bool {
        self.store().is_empty()
    }

    /// Returns `true` if another handle references the same storage.
    pub fn is_shared(&self) -> bool {
        self.ref_count() > 1
    }

    /// Number of handles referencing this path's storage.
    ///
    /// Local storage always has one reference; accumulators and freed handles have none.
    pub fn ref_count(&self) -> usize {
        match &self.storage {
            Storage::Local(_) => 1,
            Storage::Shared(store) => Rc::strong_count(store),
            Storage::Accumulator | Storage::Released => 0,
        }
    }

    pub fn is_local(&self) -> bool {
        matches!(self.storage, Storage::Local(_))
    }

    pub fn is_released(&self) -> bool {
        matches!(self.storage, Storage::Released)
    }

    pub fn is_bbox_accumulator(&self) -> bool {
        matches!(self.storage, Storage::Accumulator)
    }

    pub fn state_flags(&mut self) -> StateFlags {
        let procs = self.procs;
        let flags = procs.state_flags(self, StateFlags::NONE);
        procs.state_flags(self, flags);
        flags
    }

    pub fn set_state_flags(&mut self, flags: StateFlags) {
        let procs = self.procs;
        procs.state_flags(self, flags);
    }

    /// Returns `true` if a drawing operation opened the current subpath.
    pub fn is_drawing(&self) -> bool {
        self.state_flags.is_drawing()
    }
}
