mod voices;

pub use voices::{bench_melody, bench_voices, bench_waits};
