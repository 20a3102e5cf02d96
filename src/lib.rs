//! Cooperative sample-level synthesis.
//!
//! Voices are small programs that either emit one sample or sleep; the
//! [`engine::Scheduler`] steps every ready program once per frame and sums
//! what they emit. Notes, melodies and control messages in [`synth`] are built
//! out of those programs, and [`io`] sends the frames to a WAV file or the
//! default audio device.

pub mod dsp; // Oscillators and envelopes
pub mod engine; // Tasks, wait queue, scheduler
pub mod io;
pub mod sequencing; // Scales and melody generation
pub mod synth; // Note programs and cross-thread control

/// Largest block the device driver renders in one go.
pub const MAX_BLOCK_SIZE: usize = 2048;
