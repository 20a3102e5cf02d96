//! Cooperative, sample-accurate task scheduler.
//!
//! Note programs run as tasks that suspend after every emitted sample or on an
//! explicit wait. The [`Scheduler`] steps each ready task once per tick and
//! sums what they emit into one output frame.

mod context;
mod error;
mod event;
mod scheduler;
mod task;
mod wait_queue;

pub use context::Context;
pub use error::SchedulerError;
pub use event::{Inbox, TaskEvent};
pub use scheduler::{Frames, RunState, Scheduler, SchedulerConfig};
pub use task::{from_fn, Command, FromFn, Program, Resume, Task, TaskId};
pub use wait_queue::WaitQueue;
