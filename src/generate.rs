//! The keyframe-generation seam: an external text-to-schedule service,
//! consumed as "given a goal, return candidate keyframes or fail".
//!
//! The core never talks to the network itself; a [`KeyframeGenerator`]
//! implementation does, and [`apply_generated`] is the only path by which
//! its output reaches a schedule. Failures apply nothing.

use crate::{
    core::Grid,
    error::{PhotocycleError, PhotocycleResult},
    schedule::{KeyframeSeed, Schedule},
};

/// Overall light intensity requested from the generator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntensityBand {
    Low,
    Medium,
    High,
}

/// Pulsing behavior requested from the generator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PulsingBand {
    None,
    Slow,
    Fast,
}

/// Structured request handed to the external service.
#[derive(Clone, Debug, serde::Serialize)]
pub struct GenerationRequest {
    pub grid_dim: u8,
    pub cycle_minutes: u32,
    pub plant_type: String,
    pub goal: String,
    pub intensity: IntensityBand,
    pub pulsing: PulsingBand,
}

/// One keyframe-shaped record returned by the service.
#[derive(Clone, Debug, serde::Deserialize)]
pub struct GeneratedKeyframe {
    pub name: String,
    pub time: u32,
    pub grid: Grid,
}

/// External generation capability. Implementations perform exactly one
/// outstanding request at a time; enforcing that is the caller's concern.
pub trait KeyframeGenerator {
    fn generate(&self, req: &GenerationRequest) -> PhotocycleResult<Vec<GeneratedKeyframe>>;
}

/// Apply a generator's output to one day of the schedule.
///
/// The frames wholesale-replace the day's keyframe list (sorted by time,
/// fresh ids, grids normalized to the schedule dimension). Returns the first
/// keyframe's time so the caller can snap the playback cursor to it. Empty
/// output is a generation error and nothing is applied.
pub fn apply_generated(
    schedule: &mut Schedule,
    day: usize,
    frames: Vec<GeneratedKeyframe>,
) -> PhotocycleResult<u32> {
    if frames.is_empty() {
        return Err(PhotocycleError::generation(
            "generator returned no keyframes",
        ));
    }
    let seeds = frames
        .into_iter()
        .map(|f| KeyframeSeed {
            name: f.name,
            time: f.time,
            grid: f.grid,
        })
        .collect();
    schedule
        .replace_day(day, seeds)
        .map_err(|e| PhotocycleError::generation(e.to_string()))
}
