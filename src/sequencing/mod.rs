pub mod scale;

pub use scale::{beat_seconds, random_walk, tone, Scale};
