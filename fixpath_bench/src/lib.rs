// Copyright 2025 the Fixpath Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

#![allow(missing_docs, reason = "Not needed for benchmarks")]

use fixpath::{int_to_fixed, Curve, FixedPoint};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub mod build;
pub mod flatten;

pub const SEED: [u8; 32] = [0; 32];
pub const CURVE_COUNT: usize = 256;

/// A start point and curves inside a square of `extent` pixels.
pub fn random_curves(extent: i32) -> (FixedPoint, Vec<Curve>) {
    let mut rng = StdRng::from_seed(SEED);
    let mut pt = || {
        FixedPoint::new(
            rng.gen_range(0..=int_to_fixed(extent)),
            rng.gen_range(0..=int_to_fixed(extent)),
        )
    };
    let start = pt();
    let curves = (0..CURVE_COUNT)
        .map(|_| Curve::new(pt(), pt(), pt()))
        .collect();
    (start, curves)
}
