/*!
 * CWT benchmarks
 *
 * Forward transform, one- and two-integral inverse, using Criterion.
 */

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use ndarray::Array1;
use rust_cwt::{cwt, icwt, CwtOptions, IcwtOptions, ScaleSpec, WaveletSpec};
use std::f64::consts::PI;
use std::hint::black_box;

fn chirp(n: usize) -> Array1<f64> {
    Array1::from_shape_fn(n, |i| {
        let t = i as f64 / n as f64;
        (2.0 * PI * (5.0 + 60.0 * t) * t).sin()
    })
}

/// Forward CWT across signal lengths
fn benchmark_cwt_forward(c: &mut Criterion) {
    let mut group = c.benchmark_group("cwt_forward");
    let wavelet = WaveletSpec::default();
    let opts = CwtOptions::default();

    for n in [512, 2048, 8192] {
        let x = chirp(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &x, |b, x| {
            b.iter(|| cwt(&black_box(x.view()), &wavelet, &ScaleSpec::Log, &opts))
        });
    }

    group.finish();
}

/// Inverse CWT, both formulas
fn benchmark_icwt(c: &mut Criterion) {
    let mut group = c.benchmark_group("icwt");
    let wavelet = WaveletSpec::default();
    let x = chirp(2048);
    let out = match cwt(&x.view(), &wavelet, &ScaleSpec::Log, &CwtOptions::default()) {
        Ok(out) => out,
        Err(e) => panic!("forward transform failed: {}", e),
    };

    for one_int in [true, false] {
        let opts = IcwtOptions::default()
            .with_one_int(one_int)
            .with_x_mean(out.x_mean);
        let label = if one_int { "one_int" } else { "two_int" };
        group.bench_function(label, |b| {
            b.iter(|| icwt(&black_box(out.wx.view()), &wavelet, &ScaleSpec::Log, &opts))
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_cwt_forward, benchmark_icwt);
criterion_main!(benches);
