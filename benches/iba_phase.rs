// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Benchmarks IBA phase-matrix construction across stream counts (spec §2
//! calls this the runtime-dominant step: "these are the hardest parts...
//! they dominate... runtime").

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use num_complex::Complex64;

use smrt::angles::{StreamGrid, StreamScheme};
use smrt::emmodel::{EmModel, EmModelInputs, Iba};
use smrt::microstructure::Exponential;

fn build_iba(npol: usize, m_max: usize) -> Iba {
    Iba::new(EmModelInputs {
        frequency_hz: 37e9,
        frac_volume: 0.3272,
        background_permittivity: Complex64::new(1.0, 0.0),
        inclusion_permittivity: Complex64::new(3.1854, 9.1e-4),
        microstructure: Arc::new(Exponential { corr_length: 3e-4 }),
        npol,
        m_max,
    })
    .unwrap()
}

fn bench_passive_phase(c: &mut Criterion) {
    let mut group = c.benchmark_group("iba_phase_passive_m0");
    for &n_streams in &[8usize, 16, 32, 64] {
        group.bench_with_input(BenchmarkId::from_parameter(n_streams), &n_streams, |b, &n_streams| {
            let grid = StreamGrid::new(n_streams, 0.8, StreamScheme::Gauss, 2, 0).unwrap();
            let iba = build_iba(2, 0);
            b.iter(|| iba.phase(black_box(&grid), 0, 2).unwrap());
        });
    }
    group.finish();
}

fn bench_active_phase(c: &mut Criterion) {
    let mut group = c.benchmark_group("iba_phase_active_m_max_3");
    for &n_streams in &[8usize, 16, 32] {
        group.bench_with_input(BenchmarkId::from_parameter(n_streams), &n_streams, |b, &n_streams| {
            let grid = StreamGrid::new(n_streams, 0.8, StreamScheme::Gauss, 3, 3).unwrap();
            let iba = build_iba(3, 3);
            b.iter(|| iba.phase(black_box(&grid), 3, 3).unwrap());
        });
    }
    group.finish();
}

criterion_group!(benches, bench_passive_phase, bench_active_phase);
criterion_main!(benches);
