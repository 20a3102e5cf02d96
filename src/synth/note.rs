use crate::dsp::{Envelope, VoiceShape, Waveform};
use crate::engine::{Command, Context, Program, Resume, TaskEvent, TaskId};

/// One oscillator shaped by an ADSR envelope.
///
/// Runs attack and decay, holds the sustain level until a `NoteOff` arrives,
/// releases, then finishes. A `NoteOff` that arrives before the sustain
/// starts the release right away from the current level.
pub struct SineVoice {
    frequency: f64,
    amplitude: f32,
    waveform: Waveform,
    envelope: Envelope,
    /// Seconds since the voice started; advanced by each resume's `dt`.
    time: f64,
    gain: f32,
    detune: f64,
}

impl SineVoice {
    pub fn new(frequency: f64, amplitude: f32) -> Self {
        Self::with_shape(frequency, amplitude, Waveform::Sine, VoiceShape::default())
    }

    pub fn with_shape(frequency: f64, amplitude: f32, waveform: Waveform, shape: VoiceShape) -> Self {
        Self {
            frequency,
            amplitude,
            waveform,
            envelope: Envelope::new(shape),
            time: 0.0,
            gain: 1.0,
            detune: 1.0,
        }
    }

    /// Start the voice at a phase offset (seconds into the waveform).
    pub fn with_phase(mut self, phase: f64) -> Self {
        self.time = phase;
        self
    }

    fn handle(&mut self, event: &TaskEvent) {
        match *event {
            TaskEvent::NoteOff => self.envelope.note_off(),
            TaskEvent::Gain { level } => self.gain = level,
            TaskEvent::PitchBend { cents } => self.detune = 2f64.powf(cents as f64 / 1200.0),
        }
    }
}

impl Program for SineVoice {
    fn resume(&mut self, resume: Resume<'_>, _cx: &mut Context<'_>) -> Option<Command> {
        self.time += resume.dt();
        for event in resume.events() {
            self.handle(event);
        }

        let level = self.envelope.next_level()?;
        let sample = self.waveform.amplitude_at(self.time, self.frequency * self.detune);
        Some(Command::Emit(self.amplitude * self.gain * level * sample))
    }
}

/// Where a [`PlayNote`] is in its life.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NotePhase {
    Start,
    Holding,
}

/// Plays one note as a stack of harmonic partials.
///
/// On start it spawns one [`SineVoice`] per partial (`frequency * n` for
/// `n = 1..=partials`), sleeps for `duration` seconds, then sends `NoteOff`
/// to every partial and finishes. The partials carry on with their own
/// release after this task is gone.
pub struct PlayNote {
    frequency: f64,
    duration: f64,
    partials: u32,
    partial_amplitude: f32,
    waveform: Waveform,
    shape: VoiceShape,
    voices: Vec<TaskId>,
    phase: NotePhase,
}

impl PlayNote {
    pub const DEFAULT_PARTIALS: u32 = 5;
    pub const DEFAULT_PARTIAL_AMPLITUDE: f32 = 0.06;

    pub fn new(frequency: f64, duration: f64) -> Self {
        Self {
            frequency,
            duration,
            partials: Self::DEFAULT_PARTIALS,
            partial_amplitude: Self::DEFAULT_PARTIAL_AMPLITUDE,
            waveform: Waveform::Sine,
            shape: VoiceShape::default(),
            voices: Vec::new(),
            phase: NotePhase::Start,
        }
    }

    pub fn partials(mut self, partials: u32) -> Self {
        self.partials = partials;
        self
    }

    pub fn partial_amplitude(mut self, amplitude: f32) -> Self {
        self.partial_amplitude = amplitude;
        self
    }

    pub fn waveform(mut self, waveform: Waveform) -> Self {
        self.waveform = waveform;
        self
    }

    pub fn shape(mut self, shape: VoiceShape) -> Self {
        self.shape = shape;
        self
    }

    /// Handles of the spawned partials, lowest first.
    pub fn voices(&self) -> &[TaskId] {
        &self.voices
    }
}

impl Program for PlayNote {
    fn resume(&mut self, _resume: Resume<'_>, cx: &mut Context<'_>) -> Option<Command> {
        match self.phase {
            NotePhase::Start => {
                self.voices = (1..=self.partials)
                    .map(|n| {
                        cx.spawn(SineVoice::with_shape(
                            self.frequency * n as f64,
                            self.partial_amplitude,
                            self.waveform,
                            self.shape,
                        ))
                    })
                    .collect();
                self.phase = NotePhase::Holding;
                Some(Command::Wait(self.duration))
            }
            NotePhase::Holding => {
                for &voice in &self.voices {
                    cx.post_event(voice, TaskEvent::NoteOff);
                }
                None
            }
        }
    }
}
