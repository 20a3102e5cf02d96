#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Out-of-band control message posted to a running task.
///
/// Delivered at the task's next resume, never in the middle of a step.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TaskEvent {
    /// Begin the release phase.
    NoteOff,
    /// Scale the voice's output amplitude from now on.
    Gain { level: f32 },
    /// Detune the voice, in cents (100 cents = 1 semitone).
    PitchBend { cents: f32 },
}

/// Pending events of one task, in the order they were posted.
#[derive(Debug, Default)]
pub struct Inbox {
    events: Vec<TaskEvent>,
}

impl Inbox {
    pub fn push(&mut self, event: TaskEvent) {
        self.events.push(event);
    }

    pub fn as_slice(&self) -> &[TaskEvent] {
        &self.events
    }

    /// Drop delivered events, keeping the allocation for the next tick.
    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}
