// Copyright 2025 the Fixpath Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Choosing how many lines approximate a curve.

use crate::error::{PathError, Result};
use crate::fixed::{int_to_fixed, Fixed, FixedPoint, FIXED_1};
use crate::segment::Curve;

/// Largest `k` the estimate returns, whatever the policy.
///
/// The conservative estimate for the largest representable curve is 25.
pub const MAX_LOG2_SAMPLES: u32 = 32;

/// Parameters of the sample count estimate.
///
/// For a curve `p0..p3` and a flatness `f`, the curve is approximated by `2^k` lines with
///
/// ```text
/// k = ceil(log2(scale * D / f) / 2)
/// D = max(dist(p0 - 2 p1 + p2), dist(p1 - 2 p2 + p3)),  dist(v) = |v.x| + |v.y|
/// ```
///
/// Curves whose endpoints are less than `short_curve_limit` apart in both directions are
/// estimated with half the flatness, so short shallow curves do not collapse into a
/// single line.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SamplePolicy {
    /// Numerator of `scale`.
    pub scale_num: u32,
    /// Denominator of `scale`.
    pub scale_den: u32,
    /// Endpoint distance below which the flatness is halved.
    pub short_curve_limit: Fixed,
}

impl Default for SamplePolicy {
    fn default() -> Self {
        Self {
            scale_num: 3,
            scale_den: 4,
            short_curve_limit: int_to_fixed(16),
        }
    }
}

impl SamplePolicy {
    /// Fails with [`PathError::InvalidPolicy`] if the scale has a zero denominator.
    pub fn validate(&self) -> Result<()> {
        if self.scale_den == 0 {
            return Err(PathError::InvalidPolicy("scale denominator is zero"));
        }
        Ok(())
    }

    /// Returns `k` such that `2^k` lines approximate the curve from `p0` within `flatness`.
    ///
    /// A flatness of zero asks for the conservative estimate used for glyph outlines: one
    /// more than the number of halvings that bring the endpoint distance down to a pixel.
    ///
    /// The result never exceeds [`MAX_LOG2_SAMPLES`]. A zero scale denominator, which
    /// [`SamplePolicy::validate`] rejects, is read as one.
    pub fn log2_samples(&self, p0: FixedPoint, curve: &Curve, flatness: Fixed) -> u32 {
        let x03 = (curve.pt.x as i64 - p0.x as i64).abs();
        let y03 = (curve.pt.y as i64 - p0.y as i64).abs();
        let mut flat = i64::from(flatness.max(0));
        if flat > 0 && x03.max(y03) < i64::from(self.short_curve_limit) {
            flat = (flat >> 1).max(1);
        }
        if flat == 0 {
            let mut m = x03.max(y03);
            let mut k = 1;
            while m > i64::from(FIXED_1) {
                k += 1;
                m >>= 1;
            }
            return k;
        }
        let d = second_difference(p0, curve);
        let num = i128::from(self.scale_num);
        let den = i128::from(self.scale_den.max(1)) * i128::from(flat);
        // ceil(scale * D / flat)
        let mut q = (i128::from(d) * num + den - 1) / den;
        let mut k = 0;
        while q > 1 && k < MAX_LOG2_SAMPLES {
            k += 1;
            q = (q + 3) >> 2;
        }
        log::trace!("D={d} flat={flat} k={k}");
        k
    }
}

/// The larger of the two second differences of the control polygon, in the L1 norm.
fn second_difference(p0: FixedPoint, curve: &Curve) -> i64 {
    let dist = |a: FixedPoint, b: FixedPoint, c: FixedPoint| {
        let dx = a.x as i64 - 2 * b.x as i64 + c.x as i64;
        let dy = a.y as i64 - 2 * b.y as i64 + c.y as i64;
        dx.abs() + dy.abs()
    };
    dist(p0, curve.p1, curve.p2).max(dist(curve.p1, curve.p2, curve.pt))
}

/// [`SamplePolicy::log2_samples`] with the default policy.
pub fn curve_log2_samples(p0: FixedPoint, curve: &Curve, flatness: Fixed) -> u32 {
    SamplePolicy::default().log2_samples(p0, curve, flatness)
}
