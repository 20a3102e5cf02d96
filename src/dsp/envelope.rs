#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
Sample-Counted ADSR
===================

A voice running under the cooperative scheduler advances exactly one sample
per resume, so stage lengths are expressed in samples rather than seconds.

  Level
    1.0 ┐     ╱╲
        │    ╱  ╲___________
    S   │   ╱               ╲
        │  ╱                 ╲
    0.0 └─╱───────────────────╲──→ samples
        attack decay  sustain  release

  attack   i / attack                         for i in 0..attack
  decay    S + (1 - S) * (decay - i) / decay  for i in 0..decay
  sustain  S, held until note_off
  release  R0 * (release - i) / release       for i in 0..release

R0 is the level at the moment note_off arrived. Releasing from the current
level rather than from S means a note released during its attack fades out
from wherever it got to instead of jumping.

Once the release has run its course the envelope is Idle and `next_level`
returns None: the owning voice uses that as its cue to terminate.
*/

/// The current stage of the envelope state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeState {
    Attack,
    Decay,
    Sustain,
    Release,
    Idle,
}

/// Stage lengths (in samples) and sustain level of a linear ADSR.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoiceShape {
    pub attack_samples: u32,
    pub decay_samples: u32,
    pub sustain_level: f32,
    pub release_samples: u32,
}

impl Default for VoiceShape {
    fn default() -> Self {
        Self {
            attack_samples: 400,
            decay_samples: 500,
            sustain_level: 0.5,
            release_samples: 4_000,
        }
    }
}

impl VoiceShape {
    pub fn new(attack_samples: u32, decay_samples: u32, sustain_level: f32, release_samples: u32) -> Self {
        Self {
            attack_samples,
            decay_samples,
            sustain_level: sustain_level.clamp(0.0, 1.0),
            release_samples,
        }
    }
}

pub struct Envelope {
    shape: VoiceShape,
    stage: EnvelopeState,
    /// Samples elapsed in the current stage.
    progress: u32,
    level: f32,
    release_start_level: f32,
}

impl Envelope {
    /// A fresh envelope, gate already high.
    pub fn new(shape: VoiceShape) -> Self {
        Self {
            shape,
            stage: EnvelopeState::Attack,
            progress: 0,
            level: 0.0,
            release_start_level: 0.0,
        }
    }

    /// Gate low: start the release from the current level.
    ///
    /// Ignored once the envelope is already releasing or idle.
    pub fn note_off(&mut self) {
        if matches!(self.stage, EnvelopeState::Release | EnvelopeState::Idle) {
            return;
        }
        self.release_start_level = self.level;
        self.enter(EnvelopeState::Release);
    }

    /// Advance by one sample. Returns `None` once the release has finished.
    pub fn next_level(&mut self) -> Option<f32> {
        loop {
            let shape = self.shape;
            let i = self.progress as f32;
            let level = match self.stage {
                EnvelopeState::Attack if self.progress < shape.attack_samples => {
                    i / shape.attack_samples as f32
                }
                EnvelopeState::Attack => {
                    self.enter(EnvelopeState::Decay);
                    continue;
                }
                EnvelopeState::Decay if self.progress < shape.decay_samples => {
                    let total = shape.decay_samples as f32;
                    shape.sustain_level + (1.0 - shape.sustain_level) * (total - i) / total
                }
                EnvelopeState::Decay => {
                    self.enter(EnvelopeState::Sustain);
                    continue;
                }
                EnvelopeState::Sustain => shape.sustain_level,
                EnvelopeState::Release if self.progress < shape.release_samples => {
                    let total = shape.release_samples as f32;
                    self.release_start_level * (total - i) / total
                }
                EnvelopeState::Release => {
                    self.enter(EnvelopeState::Idle);
                    continue;
                }
                EnvelopeState::Idle => {
                    self.level = 0.0;
                    return None;
                }
            };

            self.progress = self.progress.saturating_add(1);
            self.level = level;
            return Some(level);
        }
    }

    fn enter(&mut self, stage: EnvelopeState) {
        self.stage = stage;
        self.progress = 0;
    }

    pub fn state(&self) -> EnvelopeState {
        self.stage
    }

    /// Level produced by the most recent `next_level` call.
    pub fn level(&self) -> f32 {
        self.level
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(env: &mut Envelope, samples: usize) -> Vec<f32> {
        (0..samples).filter_map(|_| env.next_level()).collect()
    }

    #[test]
    fn attack_ramps_from_zero() {
        let mut env = Envelope::new(VoiceShape::new(4, 2, 0.5, 4));
        assert_eq!(run(&mut env, 4), vec![0.0, 0.25, 0.5, 0.75]);
        assert_eq!(env.state(), EnvelopeState::Attack);
    }

    #[test]
    fn decay_lands_on_sustain() {
        let mut env = Envelope::new(VoiceShape::new(0, 2, 0.5, 4));
        assert_eq!(run(&mut env, 3), vec![1.0, 0.75, 0.5]);
        assert_eq!(env.state(), EnvelopeState::Sustain);
        assert_eq!(run(&mut env, 100).len(), 100, "sustain holds until note_off");
    }

    #[test]
    fn release_from_sustain_reaches_idle() {
        let mut env = Envelope::new(VoiceShape::new(0, 0, 0.5, 4));
        env.next_level();
        env.note_off();
        assert_eq!(run(&mut env, 10), vec![0.5, 0.375, 0.25, 0.125]);
        assert_eq!(env.state(), EnvelopeState::Idle);
        assert_eq!(env.next_level(), None);
    }

    #[test]
    fn note_off_during_attack_releases_from_current_level() {
        let mut env = Envelope::new(VoiceShape::new(10, 10, 0.8, 2));
        run(&mut env, 5);
        assert!((env.level() - 0.4).abs() < 1e-6);
        env.note_off();
        assert_eq!(env.next_level(), Some(0.4));
        assert_eq!(env.next_level(), Some(0.2));
        assert_eq!(env.next_level(), None);
    }

    #[test]
    fn repeated_note_off_is_ignored() {
        let mut env = Envelope::new(VoiceShape::new(0, 0, 1.0, 3));
        env.next_level();
        env.note_off();
        env.next_level();
        env.note_off();
        assert_eq!(run(&mut env, 10).len(), 2);
    }
}
