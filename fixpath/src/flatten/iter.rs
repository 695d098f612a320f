// Copyright 2025 the Fixpath Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Forward-difference sampling of cubic curves.

use log::trace;

use super::accum::Accum;
use crate::error::{PathError, Result};
use crate::fixed::{diff_overflows, Fixed, FixedPoint};
use crate::segment::Curve;

/// Largest `k` for which a curve is sampled directly with `2^k` lines.
pub const K_SAMPLE_MAX: u32 = 10;

/// Coefficients must stay strictly inside this bound so that `6 a` fits in a [`Fixed`].
const MAX_FAST: i64 = (Fixed::MAX / 6) as i64;

fn in_range(v: i64) -> bool {
    v < MAX_FAST && v > -MAX_FAST
}

/// Forward differences along one axis.
///
/// The curve is `a t^3 + b t^2 + c t + d` with `t` stepped by `e = 2^-k`; `pos`, `d1`,
/// `d2` and `d3` are the value and its first three differences, each an integer plus a
/// remainder over `2^(3k)`.
#[derive(Copy, Clone, Debug, Default)]
struct Axis {
    a: Fixed,
    b: Fixed,
    c: Fixed,
    pos: Accum,
    d1: Accum,
    d2: Accum,
    d3: Accum,
}

impl Axis {
    /// Computes the polynomial coefficients, or `None` if they are too large to sample.
    fn new(v0: Fixed, v1: Fixed, v2: Fixed, v3: Fixed) -> Option<Self> {
        let (v0, v1, v2, v3) = (v0 as i64, v1 as i64, v2 as i64, v3 as i64);
        let c = 3 * (v1 - v0);
        let b = 3 * (v2 - v1) - c;
        let a = v3 - v0 - b - c;
        if !(in_range(a) && in_range(b) && in_range(c)) {
            return None;
        }
        Some(Self {
            a: a as Fixed,
            b: b as Fixed,
            c: c as Fixed,
            pos: Accum::new(v0 as Fixed, 0),
            ..Self::default()
        })
    }

    /// A straight run in four equal steps from `v0` to `v1`.
    fn quarters(v0: Fixed, v1: Fixed) -> Self {
        let step = ((((v1 as i64 - v0 as i64) >> 1) + 1) >> 1) as Fixed;
        Self {
            c: step,
            pos: Accum::new(v0, 0),
            d1: Accum::new(step, 0),
            ..Self::default()
        }
    }

    /// Seeds the differences for `2^k` steps, `k > 1`.
    fn init_differences(&mut self, k: u32, rmask: u32) -> Result<()> {
        let (k2, k3) = (2 * k, 3 * k);
        let b2 = self.b << 1;
        let a6 = self.a * 6;
        self.d1 = Accum::new(self.c >> k, ((self.c as u32) << k2) & rmask);
        self.d2 = Accum::new(b2 >> k2, ((b2 as u32) << k) & rmask);
        // b e^2 = (2b e^2) / 2
        self.d1.add(Accum::new(self.d2.int >> 1, ((self.b as u32) << k) & rmask), rmask)?;
        // a e^3
        self.d1.add(Accum::new(self.a >> k3, (self.a as u32) & rmask), rmask)?;
        // 6 a e^3
        self.d3 = Accum::new(a6 >> k3, (a6 as u32) & rmask);
        self.d2.add(self.d3, rmask)
    }

    fn step(&mut self, rmask: u32) -> Result<()> {
        self.pos.add(self.d1, rmask)?;
        self.d1.add(self.d2, rmask)?;
        self.d2.add(self.d3, rmask)
    }

    fn step_back(&mut self, rmask: u32) -> Result<()> {
        self.d2.sub(self.d3, rmask)?;
        self.d1.sub(self.d2, rmask)?;
        self.pos.sub(self.d1, rmask)
    }

    /// `a/8 + b/4 + c/2`: the offset to the value at `t = 1/2`.
    fn half_offset(&self) -> Fixed {
        ((((self.a >> 1) + self.b) >> 1) + self.c) >> 1
    }
}

/// Iterator over the lines that approximate a curve or a long line.
///
/// The iterator stands on one line at a time, available from
/// [`FlattenedIterator::segment`]. [`FlattenedIterator::step_forward`] moves to the next
/// line and returns `false` once it stands on the last one, whose end is always exactly
/// the curve endpoint. After any number of forward steps,
/// [`FlattenedIterator::switch_to_backscan`] followed by
/// [`FlattenedIterator::step_back`] walks the same lines in reverse.
///
/// Immediately after construction the iterator stands on a zero-length line at the
/// start point.
#[derive(Clone, Debug)]
pub struct FlattenedIterator {
    p0: FixedPoint,
    p3: FixedPoint,
    l0: FixedPoint,
    l1: FixedPoint,
    x: Axis,
    y: Axis,
    k: u32,
    /// Lines left to visit going forward.
    i: i32,
    rmask: u32,
    is_curve: bool,
}

impl FlattenedIterator {
    /// Prepares to sample the curve from `p0` with `2^k` lines.
    ///
    /// Returns `None` if `k` exceeds [`K_SAMPLE_MAX`] or the curve is too large for the
    /// differences to be represented; such curves must be split first.
    pub fn for_curve(p0: FixedPoint, curve: &Curve, k: u32) -> Option<Self> {
        if k > K_SAMPLE_MAX {
            return None;
        }
        let mut x = Axis::new(p0.x, curve.p1.x, curve.p2.x, curve.pt.x)?;
        let mut y = Axis::new(p0.y, curve.p1.y, curve.p2.y, curve.pt.y)?;
        let rmask = (1_u32 << (3 * k)) - 1;
        if k > 1 {
            x.init_differences(k, rmask).ok()?;
            y.init_differences(k, rmask).ok()?;
        }
        trace!("sample curve with k={k}: x {x:?}, y {y:?}");
        Some(Self {
            p0,
            p3: curve.pt,
            l0: p0,
            l1: p0,
            x,
            y,
            k,
            i: 1 << k,
            rmask,
            is_curve: true,
        })
    }

    /// Prepares to walk a straight line.
    ///
    /// A line whose endpoint difference exceeds [`MAX_SAFE_DELTA`](crate::MAX_SAFE_DELTA)
    /// in either direction is cut into four pieces, so that consumers can take
    /// differences of each piece's endpoints. Other lines are a single piece.
    pub fn for_line(p0: FixedPoint, p1: FixedPoint) -> Self {
        let long = diff_overflows(p0.x, p1.x) || diff_overflows(p0.y, p1.y);
        let (x, y, k) = if long {
            (Axis::quarters(p0.x, p1.x), Axis::quarters(p0.y, p1.y), 2)
        } else {
            (Axis::default(), Axis::default(), 0)
        };
        Self {
            p0,
            p3: p1,
            l0: p0,
            l1: p0,
            x: Axis {
                pos: Accum::new(p0.x, 0),
                ..x
            },
            y: Axis {
                pos: Accum::new(p0.y, 0),
                ..y
            },
            k,
            i: 1 << k,
            rmask: 0,
            is_curve: false,
        }
    }

    /// The line the iterator stands on.
    pub fn segment(&self) -> (FixedPoint, FixedPoint) {
        (self.l0, self.l1)
    }

    /// `log2` of the number of lines.
    pub fn k(&self) -> u32 {
        self.k
    }

    /// Returns `true` if the iterator samples a curve rather than a line.
    pub fn is_curve(&self) -> bool {
        self.is_curve
    }

    pub fn start(&self) -> FixedPoint {
        self.p0
    }

    pub fn end(&self) -> FixedPoint {
        self.p3
    }

    /// Moves to the next line. Returns `false` when that line is the last one.
    ///
    /// Stepping past the last line is an internal error.
    pub fn step_forward(&mut self) -> Result<bool> {
        if self.i <= 0 {
            return Err(PathError::internal("flattened iterator stepped past its end"));
        }
        self.l0 = self.l1;
        self.i -= 1;
        if self.i == 0 {
            self.l1 = self.p3;
            return Ok(false);
        }
        if self.k <= 1 {
            // The only interior sample is at t = 1/2.
            self.l1 = self
                .l1
                .checked_add(self.x.half_offset(), self.y.half_offset())
                .ok_or_else(|| PathError::internal("curve midpoint overflow"))?;
        } else {
            self.x.step(self.rmask)?;
            self.y.step(self.rmask)?;
            self.l1 = FixedPoint::new(self.x.pos.int, self.y.pos.int);
        }
        Ok(true)
    }

    /// Moves to the previous line. Returns `false` when that line is the first one.
    ///
    /// Only states reached by [`FlattenedIterator::step_forward`] can be walked back, and
    /// [`FlattenedIterator::switch_to_backscan`] must be called once before the first
    /// backward step.
    pub fn step_back(&mut self) -> Result<bool> {
        if self.i >= 1 << self.k {
            return Err(PathError::internal("flattened iterator stepped before its start"));
        }
        self.l1 = self.l0;
        if self.k <= 1 {
            self.i += 1;
            self.l0 = self.p0;
            return Ok(false);
        }
        self.y.step_back(self.rmask)?;
        self.x.step_back(self.rmask)?;
        self.i += 1;
        self.l0 = FixedPoint::new(self.x.pos.int, self.y.pos.int);
        let first = self.i == (1 << self.k) - 1;
        if first && self.l0 != self.p0 {
            return Err(PathError::internal("backward scan did not return to the start"));
        }
        Ok(!first)
    }

    /// Repositions the differences for backward scanning.
    ///
    /// Going forward, the differences stand on the end of the current line except on the
    /// last line; going backward they must stand on its start. `not_first` tells whether
    /// any forward step was taken.
    pub fn switch_to_backscan(&mut self, not_first: bool) -> Result<()> {
        if not_first && self.i > 0 && self.k > 1 {
            self.y.step_back(self.rmask)?;
            self.x.step_back(self.rmask)?;
        }
        Ok(())
    }

    /// Consumes the iterator, yielding the end of every remaining line.
    pub fn samples(self) -> Samples {
        Samples {
            iter: self,
            done: false,
        }
    }
}

/// The end points of the lines of a [`FlattenedIterator`], in order.
///
/// The last item is the exact endpoint. An internal error ends the sequence.
#[derive(Clone, Debug)]
pub struct Samples {
    iter: FlattenedIterator,
    done: bool,
}

impl Iterator for Samples {
    type Item = Result<FixedPoint>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.iter.step_forward() {
            Ok(more) => {
                self.done = !more;
                Some(Ok(self.iter.l1))
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = if self.done { 0 } else { self.iter.i.max(0) as usize };
        (n, Some(n))
    }
}

impl core::iter::FusedIterator for Samples {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixed::{FIXED_1, MAX_FIXED};

    fn px(x: i32, y: i32) -> FixedPoint {
        FixedPoint::from_pixels(x, y)
    }

    fn arch() -> Curve {
        Curve::new(px(0, 100), px(100, 100), px(100, 0))
    }

    /// Evaluates the curve at `i / 2^k` in floating point.
    fn eval(p0: FixedPoint, c: &Curve, k: u32, i: u32) -> (f64, f64) {
        let t = i as f64 / (1 << k) as f64;
        let mt = 1.0 - t;
        let w = [mt * mt * mt, 3.0 * mt * mt * t, 3.0 * mt * t * t, t * t * t];
        let pts = [p0, c.p1, c.p2, c.pt];
        let x = pts.iter().zip(w).map(|(p, w)| p.x as f64 * w).sum();
        let y = pts.iter().zip(w).map(|(p, w)| p.y as f64 * w).sum();
        (x, y)
    }

    #[test]
    fn samples_follow_the_curve() {
        let p0 = px(0, 0);
        let curve = arch();
        for k in 0..=6 {
            let pts: Vec<_> = FlattenedIterator::for_curve(p0, &curve, k)
                .unwrap()
                .samples()
                .collect::<Result<_>>()
                .unwrap();
            assert_eq!(pts.len(), 1 << k);
            assert_eq!(*pts.last().unwrap(), curve.pt);
            for (i, pt) in pts.iter().enumerate() {
                let (x, y) = eval(p0, &curve, k, i as u32 + 1);
                assert!((pt.x as f64 - x).abs() <= 2.0, "k={k} i={i}: {pt:?} vs {x}");
                assert!((pt.y as f64 - y).abs() <= 2.0, "k={k} i={i}: {pt:?} vs {y}");
            }
        }
    }

    #[test]
    fn first_line_starts_at_curve_start() {
        let p0 = px(0, 0);
        let mut iter = FlattenedIterator::for_curve(p0, &arch(), 4).unwrap();
        assert_eq!(iter.segment(), (p0, p0));
        assert!(iter.step_forward().unwrap());
        assert_eq!(iter.segment().0, p0);
    }

    #[test]
    fn stepping_past_the_end_is_internal() {
        let mut iter = FlattenedIterator::for_curve(px(0, 0), &arch(), 1).unwrap();
        assert!(iter.step_forward().unwrap());
        assert!(!iter.step_forward().unwrap());
        assert!(iter.step_forward().unwrap_err().is_internal());
    }

    #[test]
    fn backscan_revisits_lines() {
        let p0 = px(2, 3);
        let curve = Curve::new(px(40, 90), px(-20, 60), px(75, 5));
        for k in 2..=5 {
            let mut iter = FlattenedIterator::for_curve(p0, &curve, k).unwrap();
            let mut forward = Vec::new();
            loop {
                let more = iter.step_forward().unwrap();
                forward.push(iter.segment());
                if !more {
                    break;
                }
            }
            iter.switch_to_backscan(true).unwrap();
            let mut backward = vec![iter.segment()];
            while iter.step_back().unwrap() {
                backward.push(iter.segment());
            }
            backward.push(iter.segment());
            backward.reverse();
            assert_eq!(backward, forward, "k={k}");
        }
    }

    #[test]
    fn backscan_from_the_middle() {
        let p0 = px(0, 0);
        let mut iter = FlattenedIterator::for_curve(p0, &arch(), 3).unwrap();
        let mut forward = Vec::new();
        for _ in 0..3 {
            iter.step_forward().unwrap();
            forward.push(iter.segment());
        }
        iter.switch_to_backscan(true).unwrap();
        assert!(iter.step_back().unwrap());
        assert_eq!(iter.segment(), forward[1]);
        assert!(!iter.step_back().unwrap());
        assert_eq!(iter.segment(), forward[0]);
    }

    #[test]
    fn stepping_back_before_any_step_is_internal() {
        let mut iter = FlattenedIterator::for_curve(px(0, 0), &arch(), 3).unwrap();
        assert!(iter.step_back().unwrap_err().is_internal());
    }

    #[test]
    fn large_curves_are_rejected() {
        let p0 = FixedPoint::ZERO;
        let curve = Curve::new(
            FixedPoint::new(MAX_FIXED / 2, 0),
            FixedPoint::new(MAX_FIXED / 2, MAX_FIXED / 2),
            FixedPoint::new(0, MAX_FIXED / 2),
        );
        assert!(FlattenedIterator::for_curve(p0, &curve, 2).is_none());
        assert!(FlattenedIterator::for_curve(p0, &arch(), K_SAMPLE_MAX + 1).is_none());
        assert!(FlattenedIterator::for_curve(p0, &arch(), K_SAMPLE_MAX).is_some());
    }

    #[test]
    fn short_lines_are_one_piece() {
        let mut iter = FlattenedIterator::for_line(px(0, 0), px(5000, -5000));
        assert!(!iter.is_curve());
        assert!(!iter.step_forward().unwrap());
        assert_eq!(iter.segment(), (px(0, 0), px(5000, -5000)));
    }

    #[test]
    fn long_lines_are_four_pieces() {
        let end = FixedPoint::new(1_000_000_000, 0);
        let pts: Vec<_> = FlattenedIterator::for_line(FixedPoint::ZERO, end)
            .samples()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(
            pts,
            [
                FixedPoint::new(250_000_000, 0),
                FixedPoint::new(500_000_000, 0),
                FixedPoint::new(750_000_000, 0),
                end,
            ]
        );
    }

    #[test]
    fn k_one_uses_the_midpoint() {
        let p0 = px(0, 0);
        let curve = arch();
        let pts: Vec<_> = FlattenedIterator::for_curve(p0, &curve, 1)
            .unwrap()
            .samples()
            .collect::<Result<_>>()
            .unwrap();
        // B(1/2) of the arch is (50, 75) pixels.
        assert_eq!(pts, [FixedPoint::new(50 * FIXED_1, 75 * FIXED_1), curve.pt]);
    }
}
