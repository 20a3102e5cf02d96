//! Benchmarks for whole scheduler ticks.
//!
//! Voices here never finish on their own, so each iteration keeps rendering
//! the same live run.

use std::hint::black_box;

use cosynth::engine::{from_fn, Command, Scheduler};
use cosynth::sequencing::tone;
use cosynth::synth::{Melody, SineVoice};
use criterion::{BenchmarkId, Criterion};

const SAMPLE_RATE: u32 = 48_000;
const VOICE_COUNTS: &[usize] = &[1, 16, 64, 256];
const BLOCK: usize = 256;

pub fn bench_voices(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/voices");

    for &voices in VOICE_COUNTS {
        let mut scheduler = Scheduler::with_sample_rate(SAMPLE_RATE);
        for n in 0..voices {
            scheduler.spawn(SineVoice::new(tone(n as i32 % 24 - 12, 440.0), 0.01));
        }
        let mut buffer = vec![0.0f32; BLOCK];

        group.bench_with_input(BenchmarkId::new("sustained", voices), &voices, |b, _| {
            b.iter(|| {
                let produced = scheduler.render_block(black_box(&mut buffer));
                black_box(produced).ok();
            })
        });
    }

    group.finish();
}

/// Tasks that sleep one sample between emits, so every tick moves half of
/// them through the wait queue.
pub fn bench_waits(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/waits");
    let one_sample = 1.0 / SAMPLE_RATE as f64;

    for &voices in VOICE_COUNTS {
        let mut scheduler = Scheduler::with_sample_rate(SAMPLE_RATE);
        for n in 0..voices {
            let mut emit = n % 2 == 0;
            scheduler.spawn(from_fn(move |_, _| {
                emit = !emit;
                Some(if emit {
                    Command::Emit(0.001)
                } else {
                    Command::Wait(one_sample)
                })
            }));
        }
        let mut buffer = vec![0.0f32; BLOCK];

        group.bench_with_input(BenchmarkId::new("alternating", voices), &voices, |b, _| {
            b.iter(|| {
                let produced = scheduler.render_block(black_box(&mut buffer));
                black_box(produced).ok();
            })
        });
    }

    group.finish();
}

/// Looping melody: partials are spawned and retired every note.
pub fn bench_melody(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/melody");
    let notes: Vec<(f64, f64)> = [-10, -6, -3, 2].iter().map(|&n| (tone(n, 440.0), 0.01)).collect();

    for partials in [1u32, 5, 16] {
        let mut scheduler = Scheduler::with_sample_rate(SAMPLE_RATE);
        scheduler.spawn(Melody::new(notes.clone()).looping(true).partials(partials));
        let mut buffer = vec![0.0f32; BLOCK];

        group.bench_with_input(BenchmarkId::new("partials", partials), &partials, |b, _| {
            b.iter(|| {
                let produced = scheduler.render_block(black_box(&mut buffer));
                black_box(produced).ok();
            })
        });
    }

    group.finish();
}
