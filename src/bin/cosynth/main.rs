//! cosynth - procedural melodies on the cooperative sample scheduler
//!
//! Run with: cargo run -- play --seconds 8

mod song;

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result as EyreResult, WrapErr};
use rtrb::RingBuffer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use cosynth::engine::{Scheduler, TaskEvent};
use cosynth::io::{device, wav, RenderLimit};
use cosynth::synth::ControlMessage;

use song::SongArgs;

/// Capacity of the driver-to-audio-thread control ring.
const CONTROL_CAPACITY: usize = 64;

#[derive(Parser)]
#[command(name = "cosynth")]
#[command(about = "Cooperative sample-level synthesizer", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play on the default output device
    Play {
        #[command(flatten)]
        song: SongArgs,
    },
    /// Render to a 16-bit mono WAV file
    Render {
        /// Output WAV file path
        output: PathBuf,

        /// Sample rate in Hz
        #[arg(short = 'r', long, default_value = "44100")]
        sample_rate: u32,

        #[command(flatten)]
        song: SongArgs,
    },
}

fn main() -> EyreResult<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Play { song } => play(&song),
        Commands::Render {
            output,
            sample_rate,
            song,
        } => render(&output, sample_rate, &song),
    }
}

fn limit(song: &SongArgs) -> RenderLimit {
    match song.limit {
        Some(seconds) => RenderLimit::Seconds(seconds),
        None => RenderLimit::UntilDrained,
    }
}

fn play(song: &SongArgs) -> EyreResult<()> {
    let melody = song.melody()?;
    let (mut tx, rx) = RingBuffer::<ControlMessage>::new(CONTROL_CAPACITY);

    if let Some(seconds) = song.seconds {
        std::thread::spawn(move || {
            std::thread::sleep(Duration::from_secs_f64(seconds));
            if tx.push(ControlMessage::ReleaseAll).is_err() {
                warn!("control ring full, release dropped");
            }
        });
    } else {
        info!("playing one pass, press Ctrl+C to stop early");
    }

    device::play(rx, limit(song), move |scheduler| vec![scheduler.spawn(melody)])
        .wrap_err("playback failed")?;
    Ok(())
}

fn render(output: &Path, sample_rate: u32, song: &SongArgs) -> EyreResult<()> {
    let melody = song.melody()?;
    let mut scheduler = Scheduler::with_sample_rate(sample_rate);
    let root = scheduler.spawn(melody);
    let sample_rate = scheduler.sample_rate();

    let release_at = song
        .seconds
        .map(|s| (s * sample_rate as f64).round() as u64)
        .unwrap_or(u64::MAX);
    let max_frames = limit(song).max_frames(sample_rate).unwrap_or(u64::MAX);

    let mut produced = 0u64;
    let frames = std::iter::from_fn(|| {
        if produced == release_at {
            scheduler.post_event(root, TaskEvent::NoteOff);
        }
        if produced >= max_frames {
            return None;
        }
        produced += 1;
        scheduler.tick().transpose()
    });

    wav::write_wav(output, frames, sample_rate)
        .wrap_err_with(|| format!("failed to render {}", output.display()))?;
    Ok(())
}
