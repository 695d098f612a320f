// Copyright 2025 the Fixpath Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::fixed::FixedPoint;
use crate::segment::Curve;

/// Splits the curve from `p0` at its parametric midpoint.
///
/// This is de Casteljau subdivision at `t = 1/2` with overflow-free midpoints, so it is
/// safe for any representable control points. The first half starts at `p0`; the
/// second starts at the first half's endpoint.
pub fn split_curve_midpoint(p0: FixedPoint, curve: &Curve) -> (Curve, Curve) {
    let p12 = curve.p1.midpoint(curve.p2);
    let a1 = p0.midpoint(curve.p1);
    let b2 = curve.p2.midpoint(curve.pt);
    let a2 = a1.midpoint(p12);
    let b1 = p12.midpoint(b2);
    let mid = a2.midpoint(b1);
    (Curve::new(a1, a2, mid), Curve::new(b1, b2, curve.pt))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixed::{MAX_FIXED, MIN_FIXED};

    #[test]
    fn halves_share_the_midpoint() {
        let p0 = FixedPoint::new(0, 0);
        let curve = Curve::new(
            FixedPoint::new(0, 800),
            FixedPoint::new(800, 800),
            FixedPoint::new(800, 0),
        );
        let (first, second) = split_curve_midpoint(p0, &curve);
        assert_eq!(first.p1, FixedPoint::new(0, 400));
        assert_eq!(first.p2, FixedPoint::new(200, 600));
        assert_eq!(first.pt, FixedPoint::new(400, 600));
        assert_eq!(second.p1, FixedPoint::new(600, 600));
        assert_eq!(second.p2, FixedPoint::new(800, 400));
        assert_eq!(second.pt, curve.pt);
    }

    #[test]
    fn extreme_points_stay_in_range() {
        let p0 = FixedPoint::new(MIN_FIXED, MAX_FIXED);
        let curve = Curve::new(
            FixedPoint::new(MAX_FIXED, MAX_FIXED),
            FixedPoint::new(MIN_FIXED, MIN_FIXED),
            FixedPoint::new(MAX_FIXED, MIN_FIXED),
        );
        let (first, second) = split_curve_midpoint(p0, &curve);
        assert_eq!(first.p1, FixedPoint::new(0, MAX_FIXED));
        assert_eq!(second.p2, FixedPoint::new(0, MIN_FIXED));
        assert_eq!(first.pt, second.p1.midpoint(first.p2));
    }
}
