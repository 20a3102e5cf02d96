use crate::dsp::{VoiceShape, Waveform};
use crate::engine::{Command, Context, Program, Resume, TaskEvent};

use super::note::PlayNote;

/// Plays `(frequency, duration)` notes back to back inside a single task.
///
/// Each note is a [`PlayNote`] driven inline, so the melody's own task sleeps
/// while the partials sound. With `looping` the sequence starts over forever.
/// A `NoteOff` posted to the melody lets the current note finish and then
/// ends it.
pub struct Melody {
    notes: Vec<(f64, f64)>,
    next: usize,
    looping: bool,
    partials: u32,
    waveform: Waveform,
    shape: VoiceShape,
    current: Option<PlayNote>,
    current_started: bool,
}

impl Melody {
    pub fn new(notes: Vec<(f64, f64)>) -> Self {
        Self {
            notes,
            next: 0,
            looping: false,
            partials: PlayNote::DEFAULT_PARTIALS,
            waveform: Waveform::Sine,
            shape: VoiceShape::default(),
            current: None,
            current_started: false,
        }
    }

    pub fn looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    pub fn partials(mut self, partials: u32) -> Self {
        self.partials = partials;
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

    /// Total length of one pass through the notes, in seconds.
    pub fn duration(&self) -> f64 {
        self.notes.iter().map(|&(_, d)| d).sum()
    }

    fn start_next(&mut self) -> bool {
        if self.next >= self.notes.len() {
            if !self.looping || self.notes.is_empty() {
                return false;
            }
            self.next = 0;
        }
        let (frequency, duration) = self.notes[self.next];
        self.next += 1;
        self.current = Some(
            PlayNote::new(frequency, duration)
                .partials(self.partials)
                .waveform(self.waveform)
                .shape(self.shape),
        );
        self.current_started = false;
        true
    }
}

impl Program for Melody {
    fn resume(&mut self, resume: Resume<'_>, cx: &mut Context<'_>) -> Option<Command> {
        if resume.events().contains(&TaskEvent::NoteOff) {
            self.looping = false;
            self.next = self.notes.len();
        }

        loop {
            if let Some(note) = self.current.as_mut() {
                let step = if self.current_started {
                    resume
                } else {
                    self.current_started = true;
                    Resume::Start
                };
                if let Some(command) = note.resume(step, cx) {
                    return Some(command);
                }
                self.current = None;
            }

            if !self.start_next() {
                return None;
            }
        }
    }
}
