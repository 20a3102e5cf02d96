//! Benchmarks for the sample-counted ADSR envelope.

use std::hint::black_box;

use cosynth::dsp::{Envelope, VoiceShape};
use criterion::{BenchmarkId, Criterion};

use crate::BLOCK_SIZES;

pub fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/envelope");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // Attack long enough that the benchmark never leaves it
        let mut env = Envelope::new(VoiceShape::new(u32::MAX, 500, 0.5, 4000));
        group.bench_with_input(BenchmarkId::new("attack", size), &size, |b, _| {
            b.iter(|| {
                for out in buffer.iter_mut() {
                    *out = env.next_level().unwrap_or(0.0);
                }
                black_box(&buffer);
            })
        });

        // Sustain phase (holding steady)
        let mut env = Envelope::new(VoiceShape::new(1, 1, 0.5, 4000));
        for _ in 0..4 {
            env.next_level();
        }
        group.bench_with_input(BenchmarkId::new("sustain", size), &size, |b, _| {
            b.iter(|| {
                for out in buffer.iter_mut() {
                    *out = env.next_level().unwrap_or(0.0);
                }
                black_box(&buffer);
            })
        });
    }

    group.finish();
}
