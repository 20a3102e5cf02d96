//! Per-sample DSP primitives used by note programs.
//!
//! Nothing in here allocates or keeps a clock of its own: a voice calls these
//! once per scheduler tick with its own notion of time.

/// Sample-counted ADSR envelope.
pub mod envelope;
/// Stateless waveform functions.
pub mod oscillator;

pub use envelope::{Envelope, EnvelopeState, VoiceShape};
pub use oscillator::Waveform;
