// Copyright 2025 the Fixpath Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fixed-point scalars, points and rectangles.
//!
//! Device coordinates are signed 32-bit integers with [`FIXED_SHIFT`] fractional bits.

use bytemuck::{Pod, Zeroable};

/// A scaled integer with [`FIXED_SHIFT`] fractional bits.
pub type Fixed = i32;

/// Number of fractional bits in a [`Fixed`].
pub const FIXED_SHIFT: u32 = 8;

/// One device pixel.
pub const FIXED_1: Fixed = 1 << FIXED_SHIFT;

/// Half a device pixel.
pub const FIXED_HALF: Fixed = FIXED_1 >> 1;

/// Largest representable coordinate.
pub const MAX_FIXED: Fixed = i32::MAX;

/// Smallest representable coordinate.
pub const MIN_FIXED: Fixed = i32::MIN;

/// Largest difference between two endpoints that consumers may compute directly.
///
/// Fill and stroke code derive further quantities from endpoint differences, so two bits
/// of headroom are kept below the `i32` limit.
pub const MAX_SAFE_DELTA: i64 = (MAX_FIXED >> 2) as i64;

/// Converts an integer number of pixels, saturating at the representable range.
pub const fn int_to_fixed(v: i32) -> Fixed {
    let wide = (v as i64) << FIXED_SHIFT;
    if wide > MAX_FIXED as i64 {
        MAX_FIXED
    } else if wide < MIN_FIXED as i64 {
        MIN_FIXED
    } else {
        wide as Fixed
    }
}

/// Converts to floating point pixels.
pub fn fixed_to_f64(v: Fixed) -> f64 {
    v as f64 / FIXED_1 as f64
}

/// Converts floating point pixels, rounding to the nearest fixed value.
///
/// Returns `None` for NaN and for values outside the representable range.
pub fn float_to_fixed(v: f64) -> Option<Fixed> {
    let scaled = (v * FIXED_1 as f64).round();
    if scaled.is_nan() || scaled > MAX_FIXED as f64 || scaled < MIN_FIXED as f64 {
        return None;
    }
    Some(scaled as Fixed)
}

/// Converts floating point pixels, clamping to the representable range.
///
/// The flag is `true` if the value had to be clamped. Returns `None` only for NaN.
pub fn float_to_fixed_clamped(v: f64) -> Option<(Fixed, bool)> {
    if v.is_nan() {
        return None;
    }
    Some(match float_to_fixed(v) {
        Some(f) => (f, false),
        None if v > 0.0 => (MAX_FIXED, true),
        None => (MIN_FIXED, true),
    })
}

/// Arithmetic shift right by one.
#[inline]
pub(crate) const fn arith_rshift_1(v: Fixed) -> Fixed {
    v >> 1
}

/// Midpoint of two values that cannot overflow.
///
/// Rounds up when either operand is odd, so repeated bisection never drifts towards zero.
#[inline]
pub const fn midpoint(a: Fixed, b: Fixed) -> Fixed {
    arith_rshift_1(a) + arith_rshift_1(b) + ((a | b) & 1)
}

/// Returns `true` if `v1 - v0` exceeds [`MAX_SAFE_DELTA`] in magnitude.
#[inline]
pub fn diff_overflows(v0: Fixed, v1: Fixed) -> bool {
    (v1 as i64 - v0 as i64).abs() > MAX_SAFE_DELTA
}

/// Returns `true` if `v0 + v1` is not representable.
#[inline]
pub fn sum_overflows(v0: Fixed, v1: Fixed) -> bool {
    v0.checked_add(v1).is_none()
}

/// A point in fixed-point device space.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
#[repr(C)]
pub struct FixedPoint {
    pub x: Fixed,
    pub y: Fixed,
}

impl FixedPoint {
    /// The origin.
    pub const ZERO: Self = Self::new(0, 0);

    /// Creates a new point.
    pub const fn new(x: Fixed, y: Fixed) -> Self {
        Self { x, y }
    }

    /// Creates a point from whole pixels.
    pub const fn from_pixels(x: i32, y: i32) -> Self {
        Self::new(int_to_fixed(x), int_to_fixed(y))
    }

    /// Adds an offset, or `None` on overflow.
    pub fn checked_add(self, dx: Fixed, dy: Fixed) -> Option<Self> {
        Some(Self::new(self.x.checked_add(dx)?, self.y.checked_add(dy)?))
    }

    /// Difference `self - other`, or `None` on overflow.
    pub fn checked_sub(self, other: Self) -> Option<(Fixed, Fixed)> {
        Some((self.x.checked_sub(other.x)?, self.y.checked_sub(other.y)?))
    }

    /// Midpoint, computed without overflow.
    pub const fn midpoint(self, other: Self) -> Self {
        Self::new(midpoint(self.x, other.x), midpoint(self.y, other.y))
    }

    /// Converts to a kurbo point in pixels.
    pub fn to_kurbo(self) -> peniko::kurbo::Point {
        peniko::kurbo::Point::new(fixed_to_f64(self.x), fixed_to_f64(self.y))
    }
}

impl From<(Fixed, Fixed)> for FixedPoint {
    fn from((x, y): (Fixed, Fixed)) -> Self {
        Self::new(x, y)
    }
}

/// An axis-aligned rectangle; `p` is the minimum corner and `q` the maximum.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Pod, Zeroable)]
#[repr(C)]
pub struct FixedRect {
    pub p: FixedPoint,
    pub q: FixedPoint,
}

impl FixedRect {
    /// The empty rectangle, the identity for [`FixedRect::add_point`].
    pub const EMPTY: Self = Self {
        p: FixedPoint::new(MAX_FIXED, MAX_FIXED),
        q: FixedPoint::new(MIN_FIXED, MIN_FIXED),
    };

    /// Creates a rectangle from two corners in any order.
    pub fn from_corners(a: FixedPoint, b: FixedPoint) -> Self {
        Self {
            p: FixedPoint::new(a.x.min(b.x), a.y.min(b.y)),
            q: FixedPoint::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    /// A degenerate rectangle holding a single point.
    pub const fn from_point(pt: FixedPoint) -> Self {
        Self { p: pt, q: pt }
    }

    pub fn is_empty(&self) -> bool {
        self.p.x > self.q.x || self.p.y > self.q.y
    }

    /// Returns `true` if the point lies inside or on the boundary.
    pub fn contains(&self, x: Fixed, y: Fixed) -> bool {
        x >= self.p.x && x <= self.q.x && y >= self.p.y && y <= self.q.y
    }

    /// Grows the rectangle to include a point.
    pub fn add_point(&mut self, x: Fixed, y: Fixed) {
        self.p.x = self.p.x.min(x);
        self.p.y = self.p.y.min(y);
        self.q.x = self.q.x.max(x);
        self.q.y = self.q.y.max(y);
    }

    /// Smallest rectangle containing both.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            p: FixedPoint::new(self.p.x.min(other.p.x), self.p.y.min(other.p.y)),
            q: FixedPoint::new(self.q.x.max(other.q.x), self.q.y.max(other.q.y)),
        }
    }
}

impl Default for FixedRect {
    fn default() -> Self {
        Self::EMPTY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn midpoint_rounds_consistently() {
        assert_eq!(midpoint(0, 0), 0);
        assert_eq!(midpoint(1, 2), 2);
        assert_eq!(midpoint(-3, -4), -3);
        assert_eq!(midpoint(MAX_FIXED, MAX_FIXED), MAX_FIXED);
        assert_eq!(midpoint(MIN_FIXED, MIN_FIXED), MIN_FIXED);
        assert_eq!(midpoint(MIN_FIXED, MAX_FIXED), 0);
    }

    #[test]
    fn diff_overflow_uses_safe_delta() {
        assert!(!diff_overflows(0, int_to_fixed(100)));
        assert!(diff_overflows(0, 1_000_000_000));
        assert!(diff_overflows(MAX_FIXED, MIN_FIXED));
        assert!(!diff_overflows(MAX_FIXED, MAX_FIXED - 1));
    }

    #[test]
    fn sum_overflow() {
        assert!(sum_overflows(MAX_FIXED, 1));
        assert!(!sum_overflows(MAX_FIXED, -1));
        assert!(sum_overflows(MIN_FIXED, -1));
    }

    #[test]
    fn float_conversion() {
        assert_eq!(float_to_fixed(1.0), Some(FIXED_1));
        assert_eq!(float_to_fixed(-0.5), Some(-FIXED_HALF));
        assert_eq!(float_to_fixed(f64::NAN), None);
        assert_eq!(float_to_fixed(1e12), None);
        assert_eq!(float_to_fixed_clamped(1e12), Some((MAX_FIXED, true)));
        assert_eq!(float_to_fixed_clamped(-1e12), Some((MIN_FIXED, true)));
        assert_eq!(float_to_fixed_clamped(2.0), Some((2 * FIXED_1, false)));
        assert_eq!(fixed_to_f64(FIXED_1 + FIXED_HALF), 1.5);
    }

    #[test]
    fn int_conversion_saturates() {
        assert_eq!(int_to_fixed(3), 3 * FIXED_1);
        assert_eq!(int_to_fixed(i32::MAX), MAX_FIXED);
        assert_eq!(int_to_fixed(i32::MIN), MIN_FIXED);
    }

    #[test]
    fn rect_accumulates_points() {
        let mut r = FixedRect::EMPTY;
        assert!(r.is_empty());
        r.add_point(5, -2);
        r.add_point(-1, 7);
        assert_eq!(r, FixedRect::from_corners(FixedPoint::new(5, 7), FixedPoint::new(-1, -2)));
        assert!(r.contains(0, 0));
        assert!(!r.contains(6, 0));
        let u = r.union(&FixedRect::from_point(FixedPoint::new(10, 10)));
        assert!(u.contains(10, 10));
    }

    #[test]
    fn points_cast_to_raw_coordinates() {
        let pts = [FixedPoint::new(1, 2), FixedPoint::new(3, 4)];
        let raw: &[Fixed] = bytemuck::cast_slice(&pts);
        assert_eq!(raw, &[1, 2, 3, 4]);
    }
}
