use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use tracing::{debug, error, info, warn};

use super::{RenderLimit, SinkError};
use crate::engine::{Scheduler, SchedulerError, TaskId};
use crate::synth::{apply_messages, MessageReceiver};
use crate::MAX_BLOCK_SIZE;

/// How often the calling thread checks whether playback has finished.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Extra time to let the device flush its last buffer before the stream drops.
const TAIL: Duration = Duration::from_millis(200);

/// Play a scheduler run on the default output device.
///
/// The scheduler is built at the device's sample rate and handed to `build`,
/// which spawns the root tasks and returns the handles that
/// [`ControlMessage::ReleaseAll`](crate::synth::ControlMessage::ReleaseAll)
/// targets. From then on the scheduler lives on the audio thread; `rx` is
/// drained at the start of every device buffer.
///
/// Blocks until the run drains or `limit` is reached. Returns the number of
/// frames played.
pub fn play<R, F>(rx: R, limit: RenderLimit, build: F) -> Result<u64, SinkError>
where
    R: MessageReceiver + Send + 'static,
    F: FnOnce(&mut Scheduler) -> Vec<TaskId>,
{
    let host = cpal::default_host();
    let device = host.default_output_device().ok_or(SinkError::NoOutputDevice)?;
    let config = device.default_output_config()?;

    let sample_rate = config.sample_rate().0;
    let channels = config.channels() as usize;
    info!(
        device = %device.name().unwrap_or_else(|_| "unknown".to_string()),
        sample_rate,
        channels,
        "opened output device"
    );

    let mut scheduler = Scheduler::with_sample_rate(sample_rate);
    let roots = build(&mut scheduler);
    let max_frames = limit.max_frames(sample_rate);

    let status = Arc::new(PlaybackStatus::default());

    let mut render = BlockRenderer {
        scheduler,
        rx,
        roots,
        max_frames,
        played: 0,
        finished: false,
        render_buf: vec![0.0f32; MAX_BLOCK_SIZE],
    };

    let status_cb = status.clone();
    let status_err = status.clone();

    let stream = device.build_output_stream(
        &config.into(),
        move |data: &mut [f32], _| {
            if let Err(err) = render.fill(data, channels) {
                status_cb.render_failed(err);
            }
            status_cb.report_block(render.played, render.finished);
        },
        move |err| status_err.stream_failed(err),
        None,
    )?;

    stream.play()?;

    while !status.is_done() {
        std::thread::sleep(POLL_INTERVAL);
    }
    std::thread::sleep(TAIL);
    drop(stream);

    let frames = status.finish()?;
    info!(frames, seconds = frames as f64 / sample_rate as f64, "playback finished");
    Ok(frames)
}

/// State shared between the audio callbacks and the thread waiting in
/// [`play`].
#[derive(Debug, Default)]
struct PlaybackStatus {
    done: AtomicBool,
    played: AtomicU64,
    render_error: Mutex<Option<SchedulerError>>,
    stream_error: Mutex<Option<cpal::StreamError>>,
}

impl PlaybackStatus {
    /// Called from the data callback after every buffer.
    fn report_block(&self, played: u64, finished: bool) {
        self.played.store(played, Ordering::Relaxed);
        if finished {
            self.done.store(true, Ordering::Release);
        }
    }

    /// Never blocks: the data callback runs on the real-time thread.
    fn render_failed(&self, err: SchedulerError) {
        if let Ok(mut slot) = self.render_error.try_lock() {
            *slot = Some(err);
        }
    }

    /// A dead stream never calls the data callback again, so this also ends
    /// the wait in [`play`].
    fn stream_failed(&self, err: cpal::StreamError) {
        error!(%err, "audio stream error");
        let mut slot = match self.stream_error.lock() {
            Ok(slot) => slot,
            Err(poisoned) => poisoned.into_inner(),
        };
        slot.get_or_insert(err);
        self.done.store(true, Ordering::Release);
    }

    fn is_done(&self) -> bool {
        self.done.load(Ordering::Acquire)
    }

    /// Frames played, or the first error that stopped playback.
    fn finish(&self) -> Result<u64, SinkError> {
        if let Some(err) = take(&self.stream_error) {
            return Err(err.into());
        }
        if let Some(err) = take(&self.render_error) {
            error!(%err, "render stopped");
            return Err(err.into());
        }
        Ok(self.played.load(Ordering::Relaxed))
    }
}

fn take<T>(slot: &Mutex<Option<T>>) -> Option<T> {
    match slot.lock() {
        Ok(mut slot) => slot.take(),
        Err(poisoned) => poisoned.into_inner().take(),
    }
}

/// Audio-thread state: pulls mono frames from the scheduler in blocks and
/// spreads them across the device's interleaved channels.
struct BlockRenderer<R> {
    scheduler: Scheduler,
    rx: R,
    roots: Vec<TaskId>,
    max_frames: Option<u64>,
    played: u64,
    finished: bool,
    render_buf: Vec<f32>,
}

impl<R: MessageReceiver> BlockRenderer<R> {
    fn fill(&mut self, data: &mut [f32], channels: usize) -> Result<(), SchedulerError> {
        let channels = channels.max(1);
        let total_frames = data.len() / channels;

        if !self.finished {
            let applied = apply_messages(&mut self.rx, &mut self.scheduler, &self.roots);
            if applied > 0 {
                debug!(applied, clock = self.scheduler.clock(), "control messages applied");
            }
        }

        let mut frames_written = 0;
        let mut result = Ok(());
        while frames_written < total_frames {
            let frames_to_render = (total_frames - frames_written).min(MAX_BLOCK_SIZE);
            let block = &mut self.render_buf[..frames_to_render];

            if self.finished {
                block.fill(0.0);
            } else {
                let budget = match self.max_frames {
                    Some(max) => (max.saturating_sub(self.played) as usize).min(frames_to_render),
                    None => frames_to_render,
                };

                let produced = match self.scheduler.render_block(&mut block[..budget]) {
                    Ok(produced) => produced,
                    Err(err) => {
                        result = Err(err);
                        0
                    }
                };
                block[produced..].fill(0.0);
                self.played += produced as u64;

                if result.is_err() || produced < frames_to_render {
                    if produced == budget && budget < frames_to_render {
                        warn!(frames = self.played, "render limit reached with tasks still live");
                    }
                    self.finished = true;
                }
            }

            // Mono to every channel
            let out_off = frames_written * channels;
            for (i, &s) in block.iter().enumerate() {
                for ch in 0..channels {
                    data[out_off + i * channels + ch] = s;
                }
            }

            frames_written += frames_to_render;
        }

        // Leftover samples that don't form a whole frame.
        data[total_frames * channels..].fill(0.0);
        result
    }
}
