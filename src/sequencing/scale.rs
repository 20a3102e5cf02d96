use rand::seq::SliceRandom;
use rand::Rng;

/*
12-TET Scales and Random Walks
==============================

Frequencies are counted in semitones from A4 = 440 Hz:

    tone(n) = 440 * 2^(n / 12)

    n = -9 → C4 (261.63 Hz)   n = 0 → A4   n = 3 → C5   n = 12 → A5

A scale is a list of step sizes that adds up to one octave (12 semitones).
Playing it from its second, third, ... step gives the other modes: major
from the second step is dorian, from the sixth is natural minor.

The random walk moves one scale degree at a time. Each step it keeps its
direction with probability 0.7; when it would leave the ladder of available
degrees it bounces back instead.
*/

/// Probability that the walk reverses direction on a given step.
const TURN_PROBABILITY: f64 = 0.3;

/// Note lengths the walk picks from, in beats.
const RHYTHM: [f64; 5] = [1.0, 1.0, 1.0, 2.0, 0.5];

/// Frequency of the note `semitones` away from `base`.
pub fn tone(semitones: i32, base: f64) -> f64 {
    base * 2f64.powf(semitones as f64 / 12.0)
}

/// Seconds per beat at `bpm`.
pub fn beat_seconds(bpm: f64) -> f64 {
    60.0 / bpm
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scale {
    Major,
    MelodicMinor,
    HarmonicMinor,
    HarmonicMajor,
    Diminished,
    Augmented,
    WholeTone,
    PentatonicMajor,
}

impl Scale {
    pub const ALL: [Scale; 8] = [
        Scale::Major,
        Scale::MelodicMinor,
        Scale::HarmonicMinor,
        Scale::HarmonicMajor,
        Scale::Diminished,
        Scale::Augmented,
        Scale::WholeTone,
        Scale::PentatonicMajor,
    ];

    /// Step sizes in semitones; always sum to 12.
    pub fn intervals(self) -> &'static [i32] {
        match self {
            Scale::Major => &[2, 2, 1, 2, 2, 2, 1],
            Scale::MelodicMinor => &[2, 1, 2, 2, 2, 2, 1],
            Scale::HarmonicMinor => &[2, 1, 2, 2, 1, 3, 1],
            Scale::HarmonicMajor => &[2, 2, 1, 2, 1, 3, 1],
            Scale::Diminished => &[2, 1, 2, 1, 2, 1, 2, 1],
            Scale::Augmented => &[3, 1, 3, 1, 3, 1],
            Scale::WholeTone => &[2, 2, 2, 2, 2, 2],
            Scale::PentatonicMajor => &[2, 2, 3, 2, 3],
        }
    }

    /// Offsets from the root for one octave, starting from `mode` (1-based).
    ///
    /// Modes past the number of steps wrap around.
    pub fn semitones(self, mode: usize) -> Vec<i32> {
        let intervals = self.intervals();
        let start = mode.saturating_sub(1) % intervals.len();
        let mut offset = 0;
        let mut out = Vec::with_capacity(intervals.len());
        for step in intervals.iter().cycle().skip(start).take(intervals.len()) {
            out.push(offset);
            offset += step;
        }
        out
    }

    /// Every degree from `root` up through `octaves` octaves, top root included.
    pub fn ladder(self, mode: usize, root: i32, octaves: u32) -> Vec<i32> {
        let degrees = self.semitones(mode);
        let mut ladder: Vec<i32> = (0..octaves as i32)
            .flat_map(|octave| degrees.iter().map(move |d| root + 12 * octave + d))
            .collect();
        ladder.push(root + 12 * octaves as i32);
        ladder
    }
}

impl std::str::FromStr for Scale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['_', ' '], "-").as_str() {
            "major" => Ok(Scale::Major),
            "melodic-minor" => Ok(Scale::MelodicMinor),
            "harmonic-minor" => Ok(Scale::HarmonicMinor),
            "harmonic-major" => Ok(Scale::HarmonicMajor),
            "diminished" => Ok(Scale::Diminished),
            "augmented" => Ok(Scale::Augmented),
            "whole-tone" => Ok(Scale::WholeTone),
            "pentatonic-major" | "pentatonic" => Ok(Scale::PentatonicMajor),
            other => Err(format!("unknown scale: {other}")),
        }
    }
}

/// Random walk over `ladder` producing `(frequency, seconds)` notes.
///
/// Deterministic for a given RNG state. An empty ladder produces no notes.
pub fn random_walk<R: Rng + ?Sized>(rng: &mut R, ladder: &[i32], steps: usize, beat: f64) -> Vec<(f64, f64)> {
    if ladder.is_empty() {
        return Vec::new();
    }

    let last = ladder.len() as isize - 1;
    let mut index = last / 2;
    let mut direction: isize = 1;
    let mut notes = Vec::with_capacity(steps);

    for _ in 0..steps {
        if rng.gen_bool(TURN_PROBABILITY) {
            direction = -direction;
        }
        index += direction;
        if !(0..=last).contains(&index) {
            index -= 2 * direction;
        }
        let index_in_range = index.clamp(0, last) as usize;
        let beats = RHYTHM.choose(rng).copied().unwrap_or(1.0);
        notes.push((tone(ladder[index_in_range], 440.0), beats * beat));
    }
    notes
}
