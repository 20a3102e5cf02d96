#[cfg(feature = "rtrb")]
use rtrb::Consumer;

use crate::engine::{Scheduler, TaskEvent, TaskId};

/// Control sent from the driver thread to the thread that owns the scheduler.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum ControlMessage {
    /// Post an event to one task.
    Post { task: TaskId, event: TaskEvent },
    /// Post `NoteOff` to every root task the driver spawned.
    ReleaseAll,
}

pub trait MessageReceiver {
    fn pop(&mut self) -> Option<ControlMessage>;
}

#[cfg(feature = "rtrb")]
impl MessageReceiver for Consumer<ControlMessage> {
    fn pop(&mut self) -> Option<ControlMessage> {
        Consumer::pop(self).ok()
    }
}

/// Drain every pending control message into the scheduler.
///
/// Called between blocks, so events only ever land on a tick boundary.
/// `roots` are the tasks `ReleaseAll` applies to. Returns how many messages
/// were applied.
pub fn apply_messages<R: MessageReceiver + ?Sized>(
    rx: &mut R,
    scheduler: &mut Scheduler,
    roots: &[TaskId],
) -> usize {
    let mut applied = 0;
    while let Some(msg) = rx.pop() {
        match msg {
            ControlMessage::Post { task, event } => {
                scheduler.post_event(task, event);
            }
            ControlMessage::ReleaseAll => {
                for &task in roots {
                    scheduler.post_event(task, TaskEvent::NoteOff);
                }
            }
        }
        applied += 1;
    }
    applied
}

#[cfg(all(test, feature = "rtrb"))]
mod tests {
    use super::*;
    use crate::engine::{from_fn, Command};
    use rtrb::RingBuffer;

    #[test]
    fn messages_reach_task_inbox_at_next_tick() {
        let (mut tx, mut rx) = RingBuffer::<ControlMessage>::new(8);
        let mut scheduler = Scheduler::with_sample_rate(100);
        let voice = scheduler.spawn(from_fn(|resume, _| {
            if resume.events().contains(&TaskEvent::NoteOff) {
                None
            } else {
                Some(Command::Emit(0.5))
            }
        }));

        assert_eq!(scheduler.tick(), Ok(Some(0.5)));
        tx.push(ControlMessage::ReleaseAll).unwrap();
        assert_eq!(apply_messages(&mut rx, &mut scheduler, &[voice]), 1);
        assert_eq!(scheduler.tick(), Ok(None));
    }

    #[test]
    fn post_to_unknown_task_is_ignored() {
        let (mut tx, mut rx) = RingBuffer::<ControlMessage>::new(8);
        let mut scheduler = Scheduler::with_sample_rate(100);
        let ghost = scheduler.spawn(from_fn(|_, _| None));
        scheduler.tick().unwrap();

        tx.push(ControlMessage::Post { task: ghost, event: TaskEvent::NoteOff }).unwrap();
        assert_eq!(apply_messages(&mut rx, &mut scheduler, &[]), 1);
        assert_eq!(scheduler.live_tasks(), 0);
    }
}
