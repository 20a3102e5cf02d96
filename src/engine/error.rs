use super::task::{Command, TaskId};

/// Fatal scheduler errors. Any of these aborts the run.
#[derive(Debug, Clone, PartialEq)]
pub enum SchedulerError {
    /// A program asked for something the scheduler cannot honour: a wait that
    /// is negative or not finite, or a sample that is not finite.
    ProtocolViolation { task: TaskId, command: Command },
}

impl std::fmt::Display for SchedulerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchedulerError::ProtocolViolation { task, command } => {
                write!(f, "protocol violation: {} returned {:?}", task, command)
            }
        }
    }
}

impl std::error::Error for SchedulerError {}
