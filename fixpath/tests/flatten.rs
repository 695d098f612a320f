// Copyright 2025 the Fixpath Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Properties of curve flattening over whole paths.

use fixpath::flatten::{split_curve_midpoint, K_SAMPLE_MAX};
use fixpath::{
    curve_log2_samples, Curve, FixedPoint, FlattenedIterator, Path, PathError, SegmentKind,
    SegmentNotes, FIXED_1, MAX_FIXED, MAX_SAFE_DELTA, MIN_FIXED,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const SEED: [u8; 32] = [7; 32];

fn arch() -> (FixedPoint, Curve) {
    (
        FixedPoint::new(0, 0),
        Curve::new(
            FixedPoint::new(0, 100),
            FixedPoint::new(100, 100),
            FixedPoint::new(100, 0),
        ),
    )
}

fn line_ends(path: &Path) -> Vec<FixedPoint> {
    path.segments()
        .filter(|(_, seg)| seg.kind == SegmentKind::Line)
        .map(|(_, seg)| seg.pt)
        .collect()
}

fn random_point(rng: &mut StdRng, lo: i32, hi: i32) -> FixedPoint {
    FixedPoint::new(rng.gen_range(lo..=hi), rng.gen_range(lo..=hi))
}

#[test]
fn arch_samples_from_start_to_end() {
    let (p0, curve) = arch();
    let k = curve_log2_samples(p0, &curve, 1);
    assert!(k >= 1);

    let iter = FlattenedIterator::for_curve(p0, &curve, k).unwrap();
    assert_eq!(iter.segment().0, p0);
    let samples: Vec<_> = iter.samples().collect::<Result<_, _>>().unwrap();
    assert_eq!(samples.len(), 1 << k);
    assert_eq!(*samples.last().unwrap(), curve.pt);

    let mut path = Path::new();
    path.add_point(p0.x, p0.y).unwrap();
    path.add_flattened_curve(&curve, 1, SegmentNotes::NONE)
        .unwrap();
    let ends = line_ends(&path);
    assert!(ends.len() >= 2);
    assert_eq!(path.subpaths().next().unwrap().1.pt, p0);
    assert_eq!(*ends.last().unwrap(), curve.pt);
}

#[test]
fn long_line_becomes_four_pieces() {
    let mut path = Path::new();
    path.add_point(0, 0).unwrap();
    path.add_split_line_notes(FixedPoint::new(1_000_000_000, 0), SegmentNotes::NONE)
        .unwrap();
    let ends = line_ends(&path);
    assert_eq!(ends.len(), 4);
    let mut prev = FixedPoint::ZERO;
    for pt in ends {
        assert!(i64::from(pt.x - prev.x) <= MAX_SAFE_DELTA);
        assert_eq!(pt.y, 0);
        prev = pt;
    }
    assert_eq!(prev, FixedPoint::new(1_000_000_000, 0));
}

#[test]
fn sample_count_never_grows_with_flatness() {
    let mut rng = StdRng::from_seed(SEED);
    for _ in 0..200 {
        let p0 = random_point(&mut rng, -100_000, 100_000);
        let curve = Curve::new(
            random_point(&mut rng, -100_000, 100_000),
            random_point(&mut rng, -100_000, 100_000),
            random_point(&mut rng, -100_000, 100_000),
        );
        let mut prev = u32::MAX;
        for flatness in [1, 2, 3, 16, FIXED_1 / 2, FIXED_1, 4 * FIXED_1, 100 * FIXED_1] {
            let k = curve_log2_samples(p0, &curve, flatness);
            assert!(k <= prev, "k rose to {k} at flatness {flatness}");
            prev = k;
        }
    }
}

#[test]
fn endpoints_are_exact() {
    let mut rng = StdRng::from_seed(SEED);
    for _ in 0..100 {
        let p0 = random_point(&mut rng, -1_000_000, 1_000_000);
        let curve = Curve::new(
            random_point(&mut rng, -1_000_000, 1_000_000),
            random_point(&mut rng, -1_000_000, 1_000_000),
            random_point(&mut rng, -1_000_000, 1_000_000),
        );
        for k in 0..=K_SAMPLE_MAX {
            let iter = FlattenedIterator::for_curve(p0, &curve, k).unwrap();
            let last = iter.samples().last().unwrap().unwrap();
            assert_eq!(last, curve.pt);
        }
    }
}

#[test]
fn backscan_retraces_forward_steps() {
    let (p0, curve) = arch();
    let curve = Curve::new(
        FixedPoint::new(curve.p1.x * 300, curve.p1.y * 300),
        FixedPoint::new(curve.p2.x * 300, curve.p2.y * 300),
        FixedPoint::new(curve.pt.x * 300, curve.pt.y * 300),
    );
    for k in 2..=6 {
        let mut iter = FlattenedIterator::for_curve(p0, &curve, k).unwrap();
        let mut forward = vec![];
        let stop = (1 << k) / 2;
        for _ in 0..stop {
            iter.step_forward().unwrap();
            forward.push(iter.segment());
        }
        iter.switch_to_backscan(true).unwrap();
        let mut backward = vec![iter.segment()];
        while iter.step_back().unwrap() {
            backward.push(iter.segment());
        }
        backward.push(iter.segment());
        backward.dedup();
        forward.reverse();
        assert_eq!(forward, backward, "k={k}");
        assert_eq!(iter.segment().0, p0);
    }
}

#[test]
fn flattening_is_idempotent() {
    let mut rng = StdRng::from_seed(SEED);
    let mut path = Path::new();
    let start = random_point(&mut rng, 0, 100_000);
    path.add_point(start.x, start.y).unwrap();
    for _ in 0..20 {
        let curve = Curve::new(
            random_point(&mut rng, 0, 100_000),
            random_point(&mut rng, 0, 100_000),
            random_point(&mut rng, 0, 100_000),
        );
        path.add_curve_notes(curve, SegmentNotes::NONE).unwrap();
        let pt = random_point(&mut rng, 0, 100_000);
        path.add_line(pt.x, pt.y).unwrap();
    }
    path.close_subpath().unwrap();

    let once = path.flattened(FIXED_1).unwrap();
    let twice = once.flattened(FIXED_1).unwrap();
    let listing = |p: &Path| {
        p.segments()
            .map(|(_, seg)| (seg.kind, seg.pt, seg.notes))
            .collect::<Vec<_>>()
    };
    assert_eq!(listing(&once), listing(&twice));
    assert_eq!(once.position(), twice.position());
}

#[test]
fn flattened_points_stay_in_the_control_box() {
    let mut rng = StdRng::from_seed(SEED);
    let mut path = Path::new();
    let start = random_point(&mut rng, -500_000, 500_000);
    path.add_point(start.x, start.y).unwrap();
    for _ in 0..50 {
        let curve = Curve::new(
            random_point(&mut rng, -500_000, 500_000),
            random_point(&mut rng, -500_000, 500_000),
            random_point(&mut rng, -500_000, 500_000),
        );
        path.add_curve_notes(curve, SegmentNotes::NONE).unwrap();
    }
    let bbox = path.bbox().unwrap();
    let flat = path.flattened(FIXED_1 / 4).unwrap();
    for (_, seg) in flat.segments() {
        assert!(bbox.contains(seg.pt.x, seg.pt.y), "{:?} outside {bbox:?}", seg.pt);
    }
}

#[test]
fn extreme_curves_terminate() {
    let mut rng = StdRng::from_seed(SEED);
    for _ in 0..16 {
        let mut path = Path::new();
        let start = random_point(&mut rng, MIN_FIXED, MAX_FIXED);
        path.add_point(start.x, start.y).unwrap();
        let curve = Curve::new(
            random_point(&mut rng, MIN_FIXED, MAX_FIXED),
            random_point(&mut rng, MIN_FIXED, MAX_FIXED),
            random_point(&mut rng, MIN_FIXED, MAX_FIXED),
        );
        let flatness = rng.gen_range(FIXED_1..=64 * FIXED_1);
        path.add_flattened_curve(&curve, flatness, SegmentNotes::NONE)
            .unwrap();
        assert_eq!(path.position(), curve.pt);
        assert_eq!(path.curve_count(), 0);
        path.store().validate().unwrap();
    }
}

#[test]
fn degenerate_curves_flatten() {
    let p = FixedPoint::new(12_345, -678);
    let mut path = Path::new();
    path.add_point(p.x, p.y).unwrap();
    path.add_flattened_curve(&Curve::new(p, p, p), FIXED_1, SegmentNotes::NONE)
        .unwrap();
    assert_eq!(line_ends(&path), vec![p]);

    // A curve one unit long still ends exactly at its endpoint.
    let q = FixedPoint::new(p.x + 1, p.y);
    path.add_flattened_curve(&Curve::new(p, q, q), 0, SegmentNotes::NONE)
        .unwrap();
    assert_eq!(path.position(), q);
}

#[test]
fn bisection_halves_join() {
    let mut rng = StdRng::from_seed(SEED);
    for _ in 0..100 {
        let p0 = random_point(&mut rng, MIN_FIXED, MAX_FIXED);
        let curve = Curve::new(
            random_point(&mut rng, MIN_FIXED, MAX_FIXED),
            random_point(&mut rng, MIN_FIXED, MAX_FIXED),
            random_point(&mut rng, MIN_FIXED, MAX_FIXED),
        );
        let (first, second) = split_curve_midpoint(p0, &curve);
        assert_eq!(second.pt, curve.pt);
        assert_eq!(first.pt, first.p2.midpoint(second.p1));
    }
}

#[test]
fn flattening_without_a_current_point_fails() {
    let (_, curve) = arch();
    let mut path = Path::new();
    assert_eq!(
        path.add_flattened_curve(&curve, FIXED_1, SegmentNotes::NONE),
        Err(PathError::NoCurrentPoint)
    );
    assert!(path.is_empty());
}
