//! Benchmarks for waveform evaluation.

use std::hint::black_box;

use cosynth::dsp::Waveform;
use criterion::{BenchmarkId, Criterion};

use crate::BLOCK_SIZES;

pub fn bench_oscillator(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/oscillator");
    let dt = 1.0 / 48_000.0;

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        for (name, wave) in [
            ("sine", Waveform::Sine),
            ("saw", Waveform::Saw),
            ("square", Waveform::Square),
            ("triangle", Waveform::Triangle),
        ] {
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                let mut time = 0.0f64;
                b.iter(|| {
                    for out in buffer.iter_mut() {
                        *out = wave.amplitude_at(black_box(time), black_box(440.0));
                        time += dt;
                    }
                })
            });
        }
    }

    group.finish();
}
