use std::io::{Seek, Write};
use std::path::Path;

use hound::{SampleFormat, WavSpec, WavWriter};
use tracing::info;

use super::SinkError;
use crate::engine::SchedulerError;

/// Clip to [-1, 1] and quantise to signed 16-bit, truncating toward zero.
#[inline]
pub fn to_pcm16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16
}

fn spec(sample_rate: u32) -> WavSpec {
    WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    }
}

/// Write frames to a mono 16-bit WAV file. Returns the number of frames
/// written.
///
/// Frames are pulled one at a time; a scheduler error stops the render and is
/// returned after the frames written so far have been flushed.
pub fn write_wav<P, I>(path: P, frames: I, sample_rate: u32) -> Result<u64, SinkError>
where
    P: AsRef<Path>,
    I: IntoIterator<Item = Result<f32, SchedulerError>>,
{
    let path = path.as_ref();
    let writer = WavWriter::create(path, spec(sample_rate))?;
    let written = write_frames(writer, frames)?;
    info!(path = %path.display(), frames = written, sample_rate, "wav written");
    Ok(written)
}

/// Same as [`write_wav`] but into any seekable writer.
pub fn write_wav_to<W, I>(writer: W, frames: I, sample_rate: u32) -> Result<u64, SinkError>
where
    W: Write + Seek,
    I: IntoIterator<Item = Result<f32, SchedulerError>>,
{
    let writer = WavWriter::new(writer, spec(sample_rate))?;
    write_frames(writer, frames)
}

fn write_frames<W, I>(mut writer: WavWriter<W>, frames: I) -> Result<u64, SinkError>
where
    W: Write + Seek,
    I: IntoIterator<Item = Result<f32, SchedulerError>>,
{
    let mut written = 0u64;
    let mut failure = None;
    for frame in frames {
        match frame {
            Ok(sample) => {
                writer.write_sample(to_pcm16(sample))?;
                written += 1;
            }
            Err(err) => {
                failure = Some(err);
                break;
            }
        }
    }
    writer.finalize()?;

    match failure {
        Some(err) => Err(err.into()),
        None => Ok(written),
    }
}
