//! Melody construction from command-line options

use clap::{Args, ValueEnum};
use color_eyre::eyre::{eyre, Result as EyreResult};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

use cosynth::dsp::Waveform;
use cosynth::sequencing::{beat_seconds, random_walk, tone, Scale};
use cosynth::synth::Melody;

/// Semitones from A4 of the lowest note on the walk ladder (C4).
const LADDER_ROOT: i32 = -9;

/// The three-note figure the arpeggio song loops over.
const ARPEGGIO: [i32; 3] = [-10, -6, -3];

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Song {
    /// Seeded random walk over a scale
    Walk,
    /// Repeating three-note arpeggio
    Arpeggio,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Wave {
    Sine,
    Saw,
    Square,
    Triangle,
}

impl From<Wave> for Waveform {
    fn from(wave: Wave) -> Self {
        match wave {
            Wave::Sine => Waveform::Sine,
            Wave::Saw => Waveform::Saw,
            Wave::Square => Waveform::Square,
            Wave::Triangle => Waveform::Triangle,
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct SongArgs {
    /// What to play
    #[arg(long, value_enum, default_value = "walk")]
    pub song: Song,

    /// Let the melody loop, then release it after this many seconds
    #[arg(short, long)]
    pub seconds: Option<f64>,

    /// Hard stop after this many seconds, even mid-note
    #[arg(long)]
    pub limit: Option<f64>,

    /// Random seed for the walk
    #[arg(long, default_value = "0")]
    pub seed: u64,

    /// Beats per minute
    #[arg(short, long, default_value = "300")]
    pub tempo: f64,

    /// Scale for the walk (major, melodic-minor, whole-tone, ...)
    #[arg(long, default_value = "major")]
    pub scale: Scale,

    /// Mode of the scale, 1 = starting on its first degree
    #[arg(long, default_value = "1")]
    pub mode: usize,

    /// Number of notes in the walk
    #[arg(long, default_value = "32")]
    pub notes: usize,

    /// Octaves spanned by the walk
    #[arg(long, default_value = "2")]
    pub octaves: u32,

    /// Harmonics stacked on each note
    #[arg(long, default_value = "5")]
    pub partials: u32,

    /// Oscillator shape of each partial
    #[arg(long, value_enum, default_value = "sine")]
    pub wave: Wave,
}

impl SongArgs {
    /// Build the melody program. It loops only when `--seconds` asks for a
    /// timed release.
    pub fn melody(&self) -> EyreResult<Melody> {
        if !(self.tempo.is_finite() && self.tempo > 0.0) {
            return Err(eyre!("tempo must be a positive number, got {}", self.tempo));
        }
        if let Some(seconds) = self.seconds {
            if !(seconds.is_finite() && seconds >= 0.0) {
                return Err(eyre!("--seconds must be non-negative, got {}", seconds));
            }
        }

        let beat = beat_seconds(self.tempo);
        let notes = match self.song {
            Song::Walk => {
                let ladder = self.scale.ladder(self.mode, LADDER_ROOT, self.octaves.max(1));
                let mut rng = StdRng::seed_from_u64(self.seed);
                random_walk(&mut rng, &ladder, self.notes, beat)
            }
            Song::Arpeggio => ARPEGGIO.iter().map(|&n| (tone(n, 440.0), beat)).collect(),
        };

        let melody = Melody::new(notes)
            .looping(self.seconds.is_some())
            .partials(self.partials)
            .waveform(self.wave.into());
        info!(
            song = ?self.song,
            scale = ?self.scale,
            seed = self.seed,
            tempo = self.tempo,
            pass_seconds = melody.duration(),
            "melody ready"
        );
        Ok(melody)
    }
}
