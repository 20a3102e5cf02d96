// Purpose - frame sinks: audio device and WAV file

pub mod device;
pub mod wav;

use crate::engine::SchedulerError;

/// When a driver stops pulling frames.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RenderLimit {
    /// Until every task has finished.
    UntilDrained,
    /// At most this many seconds of audio, even if tasks are still running.
    Seconds(f64),
}

impl RenderLimit {
    /// Frame budget at `sample_rate`, or `None` for no cap.
    pub fn max_frames(self, sample_rate: u32) -> Option<u64> {
        match self {
            RenderLimit::UntilDrained => None,
            RenderLimit::Seconds(secs) => Some((secs.max(0.0) * sample_rate as f64).round() as u64),
        }
    }
}

/// Errors from writing frames to a sink.
#[derive(Debug)]
pub enum SinkError {
    Scheduler(SchedulerError),
    Wav(hound::Error),
    NoOutputDevice,
    DeviceConfig(cpal::DefaultStreamConfigError),
    BuildStream(cpal::BuildStreamError),
    PlayStream(cpal::PlayStreamError),
    /// The running stream died, e.g. the device was unplugged.
    Stream(cpal::StreamError),
}

impl std::fmt::Display for SinkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SinkError::Scheduler(err) => write!(f, "scheduler failed: {}", err),
            SinkError::Wav(err) => write!(f, "wav output failed: {}", err),
            SinkError::NoOutputDevice => write!(f, "no default output device available"),
            SinkError::DeviceConfig(err) => write!(f, "failed to fetch default output config: {}", err),
            SinkError::BuildStream(err) => write!(f, "failed to build output stream: {}", err),
            SinkError::PlayStream(err) => write!(f, "failed to start output stream: {}", err),
            SinkError::Stream(err) => write!(f, "output stream failed: {}", err),
        }
    }
}

impl std::error::Error for SinkError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SinkError::Scheduler(err) => Some(err),
            SinkError::Wav(err) => Some(err),
            SinkError::NoOutputDevice => None,
            SinkError::DeviceConfig(err) => Some(err),
            SinkError::BuildStream(err) => Some(err),
            SinkError::PlayStream(err) => Some(err),
            SinkError::Stream(err) => Some(err),
        }
    }
}

impl From<SchedulerError> for SinkError {
    fn from(err: SchedulerError) -> Self {
        SinkError::Scheduler(err)
    }
}

impl From<hound::Error> for SinkError {
    fn from(err: hound::Error) -> Self {
        SinkError::Wav(err)
    }
}

impl From<cpal::DefaultStreamConfigError> for SinkError {
    fn from(err: cpal::DefaultStreamConfigError) -> Self {
        SinkError::DeviceConfig(err)
    }
}

impl From<cpal::BuildStreamError> for SinkError {
    fn from(err: cpal::BuildStreamError) -> Self {
        SinkError::BuildStream(err)
    }
}

impl From<cpal::PlayStreamError> for SinkError {
    fn from(err: cpal::PlayStreamError) -> Self {
        SinkError::PlayStream(err)
    }
}

impl From<cpal::StreamError> for SinkError {
    fn from(err: cpal::StreamError) -> Self {
        SinkError::Stream(err)
    }
}
