#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use std::f64::consts::TAU;

/*
Stateless Oscillators
=====================

Every voice owns its own notion of time and asks for one sample per tick, so
the oscillators here keep no phase accumulator. They map an absolute time (in
seconds) and a frequency (in Hz) to a value in [-1, 1]:

    phase = fract(time * frequency)      // position within one cycle, 0..1

    sine      sin(phase * 2π)
    saw       2 * phase - 1
    square    +1 for the first half of the cycle, -1 for the second
    triangle  1 - 4 * |phase - 0.5|, shifted so it starts at 0 like the sine

Time is f64 because a voice may run for minutes: at 44.1 kHz an f32 time
loses sub-sample precision after a few seconds, which audibly detunes
high partials.
*/

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Waveform {
    #[default]
    Sine,
    Saw,
    Square,
    Triangle,
}

impl Waveform {
    /// One sample of this waveform at `time` seconds for `frequency` Hz.
    #[inline]
    pub fn amplitude_at(self, time: f64, frequency: f64) -> f32 {
        match self {
            Waveform::Sine => sine(time, frequency),
            Waveform::Saw => saw(time, frequency),
            Waveform::Square => square(time, frequency),
            Waveform::Triangle => triangle(time, frequency),
        }
    }
}

#[inline]
fn cycle_position(time: f64, frequency: f64) -> f64 {
    (time * frequency).rem_euclid(1.0)
}

#[inline]
pub fn sine(time: f64, frequency: f64) -> f32 {
    (time * frequency * TAU).sin() as f32
}

#[inline]
pub fn saw(time: f64, frequency: f64) -> f32 {
    (2.0 * cycle_position(time, frequency) - 1.0) as f32
}

#[inline]
pub fn square(time: f64, frequency: f64) -> f32 {
    if cycle_position(time, frequency) < 0.5 {
        1.0
    } else {
        -1.0
    }
}

#[inline]
pub fn triangle(time: f64, frequency: f64) -> f32 {
    // Quarter-cycle shift so the wave starts at 0 and rises, like the sine.
    let phase = (cycle_position(time, frequency) + 0.25).rem_euclid(1.0);
    (1.0 - 4.0 * (phase - 0.5).abs()) as f32
}
