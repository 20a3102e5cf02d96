use super::event::TaskEvent;
use super::task::{Program, TaskId};

/// Spawns and posts requested by the running program, applied by the
/// scheduler once the step returns.
#[derive(Default)]
pub(crate) struct Deferred {
    pub(crate) next_id: u64,
    pub(crate) spawned: Vec<(TaskId, Box<dyn Program>)>,
    pub(crate) posted: Vec<(TaskId, TaskEvent)>,
}

impl Deferred {
    pub(crate) fn allocate_id(&mut self) -> TaskId {
        let id = TaskId::from_raw(self.next_id);
        self.next_id += 1;
        id
    }
}

/// Handle a program uses to reach the scheduler from inside a step.
///
/// Spawned tasks join the ready queue of the tick in progress. Posted events
/// land in the target's inbox after the current step returns, so they are
/// seen at the target's next resume.
pub struct Context<'a> {
    task: TaskId,
    clock: u64,
    sample_rate: u32,
    deferred: &'a mut Deferred,
}

impl<'a> Context<'a> {
    pub(crate) fn new(task: TaskId, clock: u64, sample_rate: u32, deferred: &'a mut Deferred) -> Self {
        Self {
            task,
            clock,
            sample_rate,
            deferred,
        }
    }

    /// Start a sibling task and return its handle.
    pub fn spawn<P: Program + 'static>(&mut self, program: P) -> TaskId {
        let id = self.deferred.allocate_id();
        self.deferred.spawned.push((id, Box::new(program)));
        id
    }

    pub fn post_event(&mut self, task: TaskId, event: TaskEvent) {
        self.deferred.posted.push((task, event));
    }

    /// Handle of the task being stepped.
    pub fn current_task(&self) -> TaskId {
        self.task
    }

    /// Sample number of the tick in progress.
    pub fn clock(&self) -> u64 {
        self.clock
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}
