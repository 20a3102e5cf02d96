use std::collections::{HashMap, VecDeque};
use std::iter::FusedIterator;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use super::context::{Context, Deferred};
use super::error::SchedulerError;
use super::event::TaskEvent;
use super::task::{Command, Program, Task, TaskId};
use super::wait_queue::WaitQueue;

/*
Cooperative Sample Scheduler
============================

Every active voice is a task: a program that runs until it either emits one
sample or asks to sleep. The scheduler owns all tasks and advances a sample
clock by exactly one per produced frame.

Vocabulary
----------

  clock      Sample counter for the current run. Starts at 0, +1 per frame.

  ready      Tasks to step in the current tick.

  waiting    Tasks sleeping until a given sample, ordered by
             (deadline, registration order).

  frame      The sum of every sample emitted during one tick.


One Tick
--------

    1. waiting ──(deadline <= clock)──→ ready, earliest registration first
    2. mix = 0
    3. for each task popped from ready:
         finished       → dropped
         Wait(seconds)  → waiting at clock + round(seconds * sample_rate)
         Emit(sample)   → mix += sample, task runs again next tick
    4. ready = tasks that emitted
    5. if ready and waiting are both empty → run drained, no frame
       otherwise                           → yield mix, clock += 1

A wait of 0 seconds is registered at the current clock. The queue is only
drained at the start of a tick, so the task resumes on the next one.

Tasks spawned from inside a step join the ready queue of the tick in progress:
a note that spawns its partials and then sleeps has those partials sounding
in the very same frame.

Mixing is a plain sum, so the order tasks are stepped in does not change the
frame. The only shared state a task touches is its own inbox; the mix
accumulator belongs to the scheduler alone.
*/

/// Scheduler configuration, fixed for a run.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Frames per second.
    pub sample_rate: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self { sample_rate: 44_100 }
    }
}

/// Lifecycle of a scheduler run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// No tick has run since the last spawn into an empty scheduler.
    Idle,
    /// The clock is advancing.
    Running,
    /// Both queues emptied; no more frames.
    Drained,
    /// A protocol violation stopped the run.
    Aborted,
}

pub struct Scheduler {
    config: SchedulerConfig,
    state: RunState,
    clock: u64,
    tasks: HashMap<TaskId, Task>,
    ready: VecDeque<TaskId>,
    next_ready: VecDeque<TaskId>,
    waiting: WaitQueue,
    deferred: Deferred,
}

impl Scheduler {
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            config: SchedulerConfig {
                sample_rate: config.sample_rate.max(1),
            },
            state: RunState::Idle,
            clock: 0,
            tasks: HashMap::new(),
            ready: VecDeque::new(),
            next_ready: VecDeque::new(),
            waiting: WaitQueue::new(),
            deferred: Deferred::default(),
        }
    }

    pub fn with_sample_rate(sample_rate: u32) -> Self {
        Self::new(SchedulerConfig { sample_rate })
    }

    /// Add a task to the ready queue and return its handle.
    ///
    /// Spawning into a drained (or aborted) scheduler starts a new run with
    /// the clock back at zero.
    pub fn spawn<P: Program + 'static>(&mut self, program: P) -> TaskId {
        if matches!(self.state, RunState::Drained | RunState::Aborted) {
            self.clock = 0;
            self.waiting.clear();
            self.state = RunState::Idle;
        }

        let id = self.deferred.allocate_id();
        self.tasks.insert(id, Task::new(id, Box::new(program)));
        self.ready.push_back(id);
        debug!(task = %id, "spawned");
        id
    }

    /// Queue an event for a live task. Returns false if the task has already
    /// finished, in which case the event is dropped.
    pub fn post_event(&mut self, task: TaskId, event: TaskEvent) -> bool {
        match self.tasks.get_mut(&task) {
            Some(t) => {
                t.post_event(event);
                true
            }
            None => false,
        }
    }

    /// Run one tick. `Ok(None)` once the run has drained.
    pub fn tick(&mut self) -> Result<Option<f32>, SchedulerError> {
        match self.state {
            RunState::Drained | RunState::Aborted => return Ok(None),
            RunState::Idle => {
                info!(sample_rate = self.config.sample_rate, tasks = self.tasks.len(), "run started");
                self.state = RunState::Running;
            }
            RunState::Running => {}
        }

        let clock = self.clock;
        while let Some((_, task)) = self.waiting.pop_due(clock) {
            self.ready.push_back(task);
        }

        let dt = self.dt();
        // f64 keeps the sum of f32 samples exact, so the frame does not
        // depend on the order tasks are stepped in.
        let mut mix = 0.0f64;
        while let Some(id) = self.ready.pop_front() {
            let Some(task) = self.tasks.get_mut(&id) else {
                continue;
            };

            let command = {
                let mut cx = Context::new(id, clock, self.config.sample_rate, &mut self.deferred);
                task.execute_step(dt, &mut cx)
            };
            self.apply_deferred();

            match command {
                None => {
                    self.tasks.remove(&id);
                    debug!(task = %id, clock, "finished");
                }
                Some(Command::Wait(seconds)) => {
                    let samples = self.wait_samples(id, seconds)?;
                    self.waiting.push(clock.saturating_add(samples), id);
                }
                Some(Command::Emit(sample)) => {
                    if !sample.is_finite() {
                        return Err(self.abort(id, Command::Emit(sample)));
                    }
                    mix += sample as f64;
                    self.next_ready.push_back(id);
                }
            }
        }

        std::mem::swap(&mut self.ready, &mut self.next_ready);

        if self.ready.is_empty() && self.waiting.is_empty() {
            self.state = RunState::Drained;
            info!(frames = self.clock, "run drained");
            return Ok(None);
        }

        self.clock += 1;
        Ok(Some(mix as f32))
    }

    /// Lazy sequence of output frames, ending when the run drains.
    pub fn frames(&mut self) -> Frames<'_> {
        Frames {
            scheduler: self,
            done: false,
        }
    }

    /// Fill `out` with consecutive frames. Returns how many frames were
    /// produced; the remainder is silence once the run has drained.
    pub fn render_block(&mut self, out: &mut [f32]) -> Result<usize, SchedulerError> {
        for i in 0..out.len() {
            match self.tick()? {
                Some(frame) => out[i] = frame,
                None => {
                    out[i..].fill(0.0);
                    return Ok(i);
                }
            }
        }
        Ok(out.len())
    }

    fn apply_deferred(&mut self) {
        for (id, program) in self.deferred.spawned.drain(..) {
            self.tasks.insert(id, Task::new(id, program));
            self.ready.push_back(id);
            debug!(task = %id, "spawned");
        }
        for (id, event) in self.deferred.posted.drain(..) {
            if let Some(task) = self.tasks.get_mut(&id) {
                task.post_event(event);
            }
        }
    }

    fn wait_samples(&mut self, task: TaskId, seconds: f64) -> Result<u64, SchedulerError> {
        if !seconds.is_finite() || seconds < 0.0 {
            return Err(self.abort(task, Command::Wait(seconds)));
        }
        Ok((seconds * self.config.sample_rate as f64).round() as u64)
    }

    fn abort(&mut self, task: TaskId, command: Command) -> SchedulerError {
        error!(task = %task, ?command, clock = self.clock, "protocol violation, aborting run");
        self.state = RunState::Aborted;
        self.tasks.clear();
        self.ready.clear();
        self.next_ready.clear();
        self.waiting.clear();
        SchedulerError::ProtocolViolation { task, command }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Sample number of the next frame.
    pub fn clock(&self) -> u64 {
        self.clock
    }

    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate
    }

    /// Seconds per sample.
    pub fn dt(&self) -> f64 {
        1.0 / self.config.sample_rate as f64
    }

    pub fn ready_len(&self) -> usize {
        self.ready.len()
    }

    pub fn waiting_len(&self) -> usize {
        self.waiting.len()
    }

    /// Wake schedule of sleeping tasks, earliest first.
    pub fn waiting(&self) -> Vec<(u64, TaskId)> {
        self.waiting.to_sorted_vec()
    }

    pub fn live_tasks(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_live(&self, task: TaskId) -> bool {
        self.tasks.contains_key(&task)
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(SchedulerConfig::default())
    }
}

/// Iterator returned by [`Scheduler::frames`].
///
/// Yields each frame in order; stops after the run drains or after the first
/// error.
pub struct Frames<'a> {
    scheduler: &'a mut Scheduler,
    done: bool,
}

impl Iterator for Frames<'_> {
    type Item = Result<f32, SchedulerError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.scheduler.tick() {
            Ok(Some(frame)) => Some(Ok(frame)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

impl FusedIterator for Frames<'_> {}
