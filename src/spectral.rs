//! Spectral summary: a diagnostic classification of the resolved grid.
//!
//! Purely informational; nothing feeds back into the grid.

use crate::core::Grid;

/// Averages are "mutually close" for Full Spectrum when within this many
/// raw component units of each other.
const FULL_SPECTRUM_SPREAD: f64 = 25.0;
/// All three averages must exceed this for Full Spectrum.
const FULL_SPECTRUM_FLOOR: f64 = 200.0;

/// Tuning knobs for [`summarize_with`].
#[derive(Clone, Copy, Debug)]
pub struct SpectralConfig {
    /// A channel dominates when its average exceeds each other channel's
    /// average by this ratio.
    pub dominance_ratio: f64,
}

impl Default for SpectralConfig {
    fn default() -> Self {
        Self {
            dominance_ratio: 1.3,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub enum SpectralClass {
    /// No active cells.
    Off,
    RedDominant,
    GreenDominant,
    BlueDominant,
    FullSpectrum,
    Balanced,
}

impl SpectralClass {
    pub fn label(self) -> &'static str {
        match self {
            Self::Off => "Off",
            Self::RedDominant => "Red-dominant",
            Self::GreenDominant => "Green-dominant",
            Self::BlueDominant => "Blue-dominant",
            Self::FullSpectrum => "Full Spectrum",
            Self::Balanced => "Balanced",
        }
    }
}

/// Aggregate descriptor of a resolved grid.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct SpectralSummary {
    /// Mean R,G,B across active cells only (zeros when none are active).
    pub avg: [f64; 3],
    pub class: SpectralClass,
}

/// Summarize with the default configuration.
pub fn summarize(grid: &Grid) -> SpectralSummary {
    summarize_with(grid, &SpectralConfig::default())
}

/// Average the active cells and classify the dominant channel.
pub fn summarize_with(grid: &Grid, config: &SpectralConfig) -> SpectralSummary {
    let mut sums = [0u64; 3];
    let mut active = 0u64;
    for cell in grid.cells().iter().filter(|c| c.active) {
        sums[0] += u64::from(cell.r);
        sums[1] += u64::from(cell.g);
        sums[2] += u64::from(cell.b);
        active += 1;
    }

    if active == 0 {
        return SpectralSummary {
            avg: [0.0; 3],
            class: SpectralClass::Off,
        };
    }

    let avg = sums.map(|s| s as f64 / active as f64);
    let [r, g, b] = avg;
    let ratio = config.dominance_ratio;

    let class = if r > g * ratio && r > b * ratio {
        SpectralClass::RedDominant
    } else if g > r * ratio && g > b * ratio {
        SpectralClass::GreenDominant
    } else if b > r * ratio && b > g * ratio {
        SpectralClass::BlueDominant
    } else if avg.iter().all(|&c| c > FULL_SPECTRUM_FLOOR)
        && spread(avg) <= FULL_SPECTRUM_SPREAD
    {
        SpectralClass::FullSpectrum
    } else {
        SpectralClass::Balanced
    };

    SpectralSummary { avg, class }
}

fn spread(avg: [f64; 3]) -> f64 {
    let max = avg.iter().copied().fold(f64::MIN, f64::max);
    let min = avg.iter().copied().fold(f64::MAX, f64::min);
    max - min
}
