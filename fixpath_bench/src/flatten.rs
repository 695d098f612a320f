// Copyright 2025 the Fixpath Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::random_curves;
use criterion::Criterion;
use fixpath::{curve_log2_samples, Path, SegmentNotes, FIXED_1};

pub fn flatten(c: &mut Criterion) {
    let mut g = c.benchmark_group("flatten");

    macro_rules! flatten_single {
        ($name:ident, $extent:expr, $flatness:expr) => {
            let (start, curves) = random_curves($extent);
            g.bench_function(stringify!($name), |b| {
                b.iter(|| {
                    let mut path = Path::new();
                    path.add_point(start.x, start.y).unwrap();
                    for curve in &curves {
                        path.add_flattened_curve(curve, $flatness, SegmentNotes::NONE)
                            .unwrap();
                    }
                    std::hint::black_box(&path);
                })
            });
        };
    }

    flatten_single!(small_fine, 64, FIXED_1 / 4);
    flatten_single!(small_coarse, 64, FIXED_1 * 2);
    flatten_single!(large_fine, 4096, FIXED_1 / 4);
    // Large enough that most curves need bisection.
    flatten_single!(huge, 8_000_000, FIXED_1);
}

pub fn estimate(c: &mut Criterion) {
    let mut g = c.benchmark_group("estimate");
    let (start, curves) = random_curves(1024);

    g.bench_function("log2_samples", |b| {
        b.iter(|| {
            let mut p0 = start;
            let mut total = 0;
            for curve in &curves {
                total += curve_log2_samples(p0, curve, FIXED_1);
                p0 = curve.pt;
            }
            std::hint::black_box(total);
        })
    });
}
