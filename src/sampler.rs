//! Timeline sampler: maps a minute-of-cycle onto an interpolated grid.
//!
//! The sampler is pure and deterministic. Identical `(keyframes, t, dim)`
//! always yields an identical grid; it performs no mutation and carries no
//! state across calls, so store edits are picked up on the very next sample.

use crate::{
    core::{CYCLE_DURATION_MIN, Cell, Daypart, Grid},
    schedule::Keyframe,
};

/// Interpolated grid for query time `t` (minutes into the cycle) against one
/// day's keyframe list.
///
/// The list does not need to be sorted; a stable defensive sort happens
/// here. The list is treated as cyclic: the keyframe after the last is the
/// first, so a query before the first keyframe interpolates from the last
/// keyframe of the previous cycle.
#[tracing::instrument(skip(keyframes), fields(n = keyframes.len()))]
pub fn sample(keyframes: &[Keyframe], t: u32, dim: u8) -> Grid {
    if keyframes.is_empty() {
        return Grid::off(dim);
    }

    let t = t % CYCLE_DURATION_MIN;
    let mut sorted: Vec<&Keyframe> = keyframes.iter().collect();
    sorted.sort_by_key(|k| k.time);

    // Default bracket is (last, first): the wraparound pair, and also the
    // correct answer when t precedes every keyframe's time.
    let mut prev = sorted[sorted.len() - 1];
    let mut next = sorted[0];
    for pair in sorted.windows(2) {
        if t >= pair[0].time && t < pair[1].time {
            prev = pair[0];
            next = pair[1];
            break;
        }
    }

    let factor = cyclic_factor(prev.time, next.time, t);

    let want = usize::from(dim) * usize::from(dim);
    let mut cells = Vec::with_capacity(want);
    for idx in 0..want {
        let a = prev.grid.cell_or_off(idx);
        let b = next.grid.cell_or_off(idx);
        cells.push(Cell::lerp(a, b, factor));
    }
    Grid::from_cells(dim, cells)
}

/// Progress of `t` through the cyclic span from `prev_time` to `next_time`,
/// in `[0, 1)`. Degenerate spans (both keyframes at the same instant) yield
/// zero rather than dividing by it.
fn cyclic_factor(prev_time: u32, next_time: u32, t: u32) -> f64 {
    let span = CYCLE_DURATION_MIN as i64;
    let mut time_diff = next_time as i64 - prev_time as i64;
    if time_diff < 0 {
        time_diff += span;
    }
    let mut time_progress = t as i64 - prev_time as i64;
    if time_progress < 0 {
        time_progress += span;
    }
    if time_diff == 0 {
        0.0
    } else {
        time_progress as f64 / time_diff as f64
    }
}

/// Which dayparts a boost applies to for one channel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BoostBands {
    pub morning: bool,
    pub midday: bool,
    pub evening: bool,
    pub night: bool,
}

impl BoostBands {
    fn enabled(self, part: Daypart) -> bool {
        match part {
            Daypart::Morning => self.morning,
            Daypart::Midday => self.midday,
            Daypart::Evening => self.evening,
            Daypart::Night => self.night,
        }
    }
}

/// Per-channel scheduled boosts keyed by coarse time-of-day bands.
///
/// A pure post-processing pass layered on top of interpolation: when a band
/// is enabled for a channel, that channel is additively brightened by the
/// band's fixed amount, saturating at 255. Channels are independent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DaypartBoost {
    pub r: BoostBands,
    pub g: BoostBands,
    pub b: BoostBands,
}

impl DaypartBoost {
    fn amount(part: Daypart) -> u8 {
        match part {
            Daypart::Morning | Daypart::Midday => 50,
            Daypart::Evening => 30,
            Daypart::Night => 10,
        }
    }

    /// Apply the boosts enabled for the band containing minute `t`.
    pub fn apply(&self, grid: &Grid, t: u32) -> Grid {
        let part = Daypart::from_minute(t);
        let amount = Self::amount(part);
        let cells = grid
            .cells()
            .iter()
            .map(|c| Cell {
                r: if self.r.enabled(part) {
                    c.r.saturating_add(amount)
                } else {
                    c.r
                },
                g: if self.g.enabled(part) {
                    c.g.saturating_add(amount)
                } else {
                    c.g
                },
                b: if self.b.enabled(part) {
                    c.b.saturating_add(amount)
                } else {
                    c.b
                },
                active: c.active,
            })
            .collect();
        Grid::from_cells(grid.dim(), cells)
    }
}
