// Copyright 2025 the Fixpath Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bounding box accumulation without segment storage.

use crate::error::Result;
use crate::fixed::{FixedPoint, FixedRect};
use crate::path::{Path, PathProcs, StateFlags};
use crate::segment::{Curve, SegmentNotes};

/// Building operations that only grow the bounding box.
#[derive(Debug)]
pub(crate) struct BboxProcs;

fn grow(path: &mut Path, pt: FixedPoint) {
    if path.bbox_set {
        path.bbox.add_point(pt.x, pt.y);
    } else {
        path.bbox = FixedRect::from_point(pt);
        path.bbox_set = true;
    }
}

fn move_to(path: &mut Path, pt: FixedPoint) {
    path.position = pt;
    path.state_flags = path.state_flags.union(StateFlags::POSITION_VALID);
}

impl PathProcs for BboxProcs {
    fn add_point(&self, path: &mut Path, pt: FixedPoint) -> Result<()> {
        grow(path, pt);
        move_to(path, pt);
        Ok(())
    }

    fn add_line(&self, path: &mut Path, pt: FixedPoint, _notes: SegmentNotes) -> Result<()> {
        grow(path, pt);
        move_to(path, pt);
        Ok(())
    }

    fn add_gap(&self, path: &mut Path, pt: FixedPoint, _notes: SegmentNotes) -> Result<()> {
        grow(path, pt);
        move_to(path, pt);
        Ok(())
    }

    fn add_dash(
        &self,
        path: &mut Path,
        pt: FixedPoint,
        _tangent: FixedPoint,
        _notes: SegmentNotes,
    ) -> Result<()> {
        grow(path, pt);
        move_to(path, pt);
        Ok(())
    }

    fn add_curve(&self, path: &mut Path, curve: Curve, _notes: SegmentNotes) -> Result<()> {
        grow(path, curve.p1);
        grow(path, curve.p2);
        grow(path, curve.pt);
        move_to(path, curve.pt);
        Ok(())
    }

    fn close_subpath(&self, _path: &mut Path, _notes: SegmentNotes) -> Result<()> {
        Ok(())
    }
}
