// Copyright 2025 the Fixpath Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fixpath is the path geometry core of a PostScript-style imaging pipeline.
//!
//! It provides two things:
//!
//! - [`Path`], a handle onto a reference-counted, copy-on-write [`PathStore`] of
//!   subpaths and segments in fixed-point device coordinates, with bounding box tracking.
//!   Paths that descend from the same saved graphics state share their storage until one
//!   of them is mutated.
//! - The [`flatten`] module, which turns cubic Bezier curves into polylines with
//!   deterministic, overflow-safe scaled-integer forward differences, falling back to
//!   midpoint bisection when the curve coefficients would not fit.
//!
//! Everything here runs synchronously on the caller's thread. Shared storage uses
//! non-atomic reference counts, so a [`Path`] is neither `Send` nor `Sync`.
//!
//! # Usage
//!
//! ```
//! use fixpath::{int_to_fixed, Path, FIXED_1};
//!
//! # fn main() -> Result<(), fixpath::PathError> {
//! let mut path = Path::new();
//! path.add_point(0, 0)?;
//! path.add_curve(0, int_to_fixed(100), int_to_fixed(100), int_to_fixed(100), int_to_fixed(100), 0)?;
//! path.close_subpath()?;
//!
//! // A saved graphics state shares the storage instead of copying it.
//! let saved = path.share()?;
//! assert_eq!(saved.ref_count(), 2);
//!
//! // Replace the curve by a polyline with a flatness of one pixel.
//! let flat = path.flattened(FIXED_1)?;
//! assert_eq!(flat.curve_count(), 0);
//! # Ok(())
//! # }
//! ```
//!
//! # Logging
//!
//! The crate logs through the [`log`] facade and never installs a logger. Segment
//! allocation and release are traced at `trace` level, storage sharing and flattening
//! decisions at `debug` level.

// LINEBENDER LINT SET - lib.rs - v3
// See https://linebender.org/wiki/canonical-lints/
// These lints shouldn't apply to examples or tests.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
// These lints shouldn't apply to examples.
#![warn(clippy::print_stdout, clippy::print_stderr)]
// Targeting e.g. 32-bit means structs containing usize can give false positives for 64-bit.
#![cfg_attr(target_pointer_width = "64", warn(clippy::trivially_copy_pass_by_ref))]
// END LINEBENDER LINT SET
#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]
#![allow(
    clippy::cast_possible_truncation,
    reason = "Coordinates are narrowed to `i32` only after their range has been checked."
)]

mod bbox;
mod builder;
mod dump;
mod error;
pub mod fixed;
pub mod flatten;
mod interop;
mod path;
pub mod segment;
mod store;

pub use error::{ErrorKind, PathError, Result};
pub use fixed::{
    fixed_to_f64, float_to_fixed, int_to_fixed, Fixed, FixedPoint, FixedRect, FIXED_1,
    FIXED_SHIFT, MAX_FIXED, MAX_SAFE_DELTA, MIN_FIXED,
};
pub use flatten::{curve_log2_samples, FlattenedIterator, SamplePolicy};
pub use path::{BboxState, Path, StateFlags};
pub use segment::{Curve, Segment, SegmentIx, SegmentKind, SegmentNotes, Subpath, SubpathIx};
pub use store::{PathStore, Segments, Subpaths};

pub use peniko::kurbo;
