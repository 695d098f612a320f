// Copyright 2025 the Fixpath Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::random_curves;
use criterion::Criterion;
use fixpath::{Path, SegmentNotes};

pub fn build(c: &mut Criterion) {
    let mut g = c.benchmark_group("build");
    let (start, curves) = random_curves(1024);

    g.bench_function("curves", |b| {
        b.iter(|| {
            let mut path = Path::new();
            path.add_point(start.x, start.y).unwrap();
            for curve in &curves {
                path.add_curve_notes(*curve, SegmentNotes::NONE).unwrap();
            }
            path.close_subpath().unwrap();
            std::hint::black_box(&path);
        })
    });

    let mut source = Path::new();
    source.add_point(start.x, start.y).unwrap();
    for curve in &curves {
        source.add_curve_notes(*curve, SegmentNotes::NONE).unwrap();
    }

    // The first mutation of a shared handle copies the whole store.
    g.bench_function("unshare", |b| {
        b.iter(|| {
            let mut copy = source.share().unwrap();
            copy.add_line(start.x, start.y).unwrap();
            std::hint::black_box(&copy);
        })
    });

    g.bench_function("bbox_accumulator", |b| {
        b.iter(|| {
            let mut acc = Path::bbox_accumulator();
            acc.add_point(start.x, start.y).unwrap();
            for curve in &curves {
                acc.add_curve_notes(*curve, SegmentNotes::NONE).unwrap();
            }
            std::hint::black_box(acc.bbox().unwrap());
        })
    });
}
