// Copyright 2025 the Fixpath Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable listing of a path, for debugging.

use core::fmt;

use crate::fixed::{fixed_to_f64, FixedPoint};
use crate::path::Path;
use crate::segment::SegmentKind;

struct Px(FixedPoint);

impl fmt::Display for Px {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4} {:.4}", fixed_to_f64(self.0.x), fixed_to_f64(self.0.y))
    }
}

/// Lists the path state followed by one PostScript-like line per segment.
///
/// The format is meant for reading, not parsing, and may change.
impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            " % state_flags={} subpaths={} curves={} point=({})",
            self.state_flags.0,
            self.subpath_count(),
            self.curve_count(),
            Px(self.position),
        )?;
        writeln!(
            f,
            " % box=({}),({}) {:?} refs={}",
            Px(self.bbox.p),
            Px(self.bbox.q),
            self.bbox_state(),
            self.ref_count(),
        )?;
        let store = self.store();
        for (ix, seg) in store.segments() {
            let tag = format!("#{}:{}", ix.index(), seg.notes.0);
            match seg.kind {
                SegmentKind::Start(sub) => {
                    let sub = store.subpath(sub);
                    writeln!(
                        f,
                        "   {} moveto\t% {tag} #curves={} last={}",
                        Px(seg.pt),
                        sub.curve_count(),
                        sub.last().index(),
                    )?;
                }
                SegmentKind::Line => writeln!(f, "   {} lineto\t% {tag}", Px(seg.pt))?,
                SegmentKind::Gap => writeln!(f, "   {} gapto\t% {tag}", Px(seg.pt))?,
                SegmentKind::Dash { tangent } => {
                    writeln!(f, "   {} {} dash\t% {tag}", Px(seg.pt), Px(tangent))?;
                }
                SegmentKind::Curve { p1, p2 } => writeln!(
                    f,
                    "   {} {} {} curveto\t% {tag}",
                    Px(p1),
                    Px(p2),
                    Px(seg.pt)
                )?,
                SegmentKind::Close(sub) => {
                    writeln!(f, "   closepath\t% {tag} sub={}", sub.index())?;
                }
            }
        }
        Ok(())
    }
}
