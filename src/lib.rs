//! Photocycle is a cyclic grow-light schedule engine.
//!
//! It maps a continuous playback cursor and a sparse, user-edited set of
//! named keyframes (each a complete grid snapshot plus a timestamp) onto a
//! continuously interpolated per-cell color grid, wrapping cyclically across
//! a fixed-length 24-hour day and across a multi-day schedule.
//!
//! # Pipeline overview
//!
//! 1. **Advance**: [`PlaybackClock`] moves the absolute cursor from injected
//!    real-time deltas (`tick`) or direct scrubbing.
//! 2. **Sample**: [`sampler::sample`] resolves `(day, minute)` against the
//!    [`Schedule`]'s keyframes into a [`Grid`], pure and deterministic.
//! 3. **Observe**: [`frame::encode_frame`] (rate-limited through
//!    [`FrameStreamer`]) and [`spectral::summarize`] both consume the
//!    resolved grid read-only.
//!
//! The key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Pure core**: sampling, encoding and summarizing carry no state across
//!   calls, so store edits take effect on the very next tick.
//! - **No IO in the engine**: the hardware transport lives behind
//!   [`FrameSink`], the generation service behind
//!   [`generate::KeyframeGenerator`].
//! - **Nothing fatal**: invariant violations clamp or refuse; external
//!   failures disconnect and surface, leaving previous state intact.
#![forbid(unsafe_code)]

pub mod clock;
pub mod core;
pub mod error;
pub mod frame;
pub mod generate;
pub mod recipe;
pub mod sampler;
pub mod schedule;
pub mod spectral;

pub use clock::{PlayState, PlaybackClock};
pub use crate::core::{CYCLE_DURATION_MIN, Cell, Daypart, Grid};
pub use error::{PhotocycleError, PhotocycleResult};
pub use frame::{FrameSink, FrameStreamer, InMemorySink, SendOutcome, WriterSink, encode_frame};
pub use recipe::{LoadedRecipe, load_recipe, save_recipe};
pub use sampler::{BoostBands, DaypartBoost, sample};
pub use schedule::{Day, Keyframe, KeyframeId, KeyframeSeed, Schedule};
pub use spectral::{SpectralClass, SpectralSummary, summarize};
