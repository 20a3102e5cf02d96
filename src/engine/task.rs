use std::fmt;

use super::event::{Inbox, TaskEvent};
use super::Context;

/// Opaque handle to a task owned by a [`Scheduler`](super::Scheduler).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

impl TaskId {
    pub(crate) fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task#{}", self.0)
    }
}

/// Suspension request returned by a program each time it is resumed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// Contribute one sample to the current frame, then run again next tick.
    Emit(f32),
    /// Sleep for this many seconds of simulated time.
    Wait(f64),
}

/// What a program is resumed with.
#[derive(Debug, Clone, Copy)]
pub enum Resume<'a> {
    /// First resume: the program starts with no input.
    Start,
    /// Every later resume: the sample period and the events posted since the
    /// previous resume.
    Tick { dt: f64, events: &'a [TaskEvent] },
}

impl<'a> Resume<'a> {
    /// Sample period, or zero on the first resume.
    pub fn dt(&self) -> f64 {
        match self {
            Resume::Start => 0.0,
            Resume::Tick { dt, .. } => *dt,
        }
    }

    pub fn events(&self) -> &'a [TaskEvent] {
        match self {
            Resume::Start => &[],
            Resume::Tick { events, .. } => events,
        }
    }

    pub fn is_start(&self) -> bool {
        matches!(self, Resume::Start)
    }
}

/// A suspendable note program.
///
/// Each call to `resume` runs the program up to its next suspension point.
/// Returning `None` means the program has finished; the scheduler then drops
/// the task. A program must eventually return from `resume`: one that loops
/// forever inside a single step stalls every other voice.
pub trait Program: Send {
    fn resume(&mut self, resume: Resume<'_>, cx: &mut Context<'_>) -> Option<Command>;
}

/// A program backed by a closure, see [`from_fn`].
pub struct FromFn<F>(F);

/// Build a program from a closure.
///
/// ```
/// use cosynth::engine::{from_fn, Command, Scheduler};
///
/// let mut remaining = 3;
/// let mut scheduler = Scheduler::with_sample_rate(8);
/// scheduler.spawn(from_fn(move |_resume, _cx| {
///     remaining -= 1;
///     (remaining >= 0).then_some(Command::Emit(0.25))
/// }));
/// let frames: Vec<f32> = scheduler.frames().map(Result::unwrap).collect();
/// assert_eq!(frames, vec![0.25; 3]);
/// ```
pub fn from_fn<F>(f: F) -> FromFn<F>
where
    F: FnMut(Resume<'_>, &mut Context<'_>) -> Option<Command> + Send,
{
    FromFn(f)
}

impl<F> Program for FromFn<F>
where
    F: FnMut(Resume<'_>, &mut Context<'_>) -> Option<Command> + Send,
{
    fn resume(&mut self, resume: Resume<'_>, cx: &mut Context<'_>) -> Option<Command> {
        (self.0)(resume, cx)
    }
}

impl Program for Box<dyn Program> {
    fn resume(&mut self, resume: Resume<'_>, cx: &mut Context<'_>) -> Option<Command> {
        (**self).resume(resume, cx)
    }
}

/// One running program plus its start flag and pending events.
pub struct Task {
    id: TaskId,
    program: Box<dyn Program>,
    started: bool,
    inbox: Inbox,
}

impl Task {
    pub fn new(id: TaskId, program: Box<dyn Program>) -> Self {
        Self {
            id,
            program,
            started: false,
            inbox: Inbox::default(),
        }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn has_started(&self) -> bool {
        self.started
    }

    pub fn pending_events(&self) -> &[TaskEvent] {
        self.inbox.as_slice()
    }

    /// Run the program up to its next suspension point.
    ///
    /// The first call starts the program with [`Resume::Start`]. Later calls
    /// hand over the inbox, which is cleared afterwards so no event is seen
    /// twice. Events posted before the first call wait for the second.
    pub fn execute_step(&mut self, dt: f64, cx: &mut Context<'_>) -> Option<Command> {
        if !self.started {
            self.started = true;
            return self.program.resume(Resume::Start, cx);
        }

        let command = self.program.resume(
            Resume::Tick {
                dt,
                events: self.inbox.as_slice(),
            },
            cx,
        );
        self.inbox.clear();
        command
    }

    pub fn post_event(&mut self, event: TaskEvent) {
        self.inbox.push(event);
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("id", &self.id)
            .field("started", &self.started)
            .field("pending", &self.inbox.len())
            .finish()
    }
}
