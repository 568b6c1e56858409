use crate::{
    core::{
        CYCLE_DURATION_MIN, Cell, Grid, MAX_TOTAL_DAYS, MIN_TOTAL_DAYS, clamp_cycle_time,
    },
    error::{PhotocycleError, PhotocycleResult},
};

/// Schedule-scoped keyframe identifier.
///
/// Minted from a monotonic counter owned by the [`Schedule`]; never reused,
/// and unique across all days (duplicating a day re-mints every id).
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct KeyframeId(pub u64);

/// A named, timestamped full-grid snapshot within one cycle.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Keyframe {
    pub id: KeyframeId,
    pub name: String,
    /// Minute-of-cycle in `[0, CYCLE_DURATION_MIN)`.
    pub time: u32,
    pub grid: Grid,
}

/// One cycle's keyframe list, kept sorted by `time` (stable on ties).
///
/// A day is never empty in normal operation; the store refuses deletes that
/// would leave zero keyframes.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Day {
    keyframes: Vec<Keyframe>,
}

impl Day {
    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keyframes
    }

    pub fn keyframe(&self, id: KeyframeId) -> Option<&Keyframe> {
        self.keyframes.iter().find(|k| k.id == id)
    }

    fn sort(&mut self) {
        // Stable: ties keep prior relative order.
        self.keyframes.sort_by_key(|k| k.time);
    }
}

/// Unminted keyframe content, used by bulk-replace paths (recipe load,
/// generated schedules). The store assigns the id.
#[derive(Clone, Debug)]
pub struct KeyframeSeed {
    pub name: String,
    pub time: u32,
    pub grid: Grid,
}

/// The full multi-day schedule: owned mutable state behind a narrow
/// mutation API. All reads used by the sampler/encoder/summary go through
/// immutable accessors.
#[derive(Clone, Debug)]
pub struct Schedule {
    grid_dim: u8,
    days: Vec<Day>,
    next_id: u64,
}

impl Schedule {
    /// New schedule of `total_days` days (clamped to `[1, 14]`), each seeded
    /// with a single midnight keyframe holding an all-off grid so the
    /// non-empty-day invariant holds from birth.
    pub fn new(grid_dim: u8, total_days: usize) -> Self {
        let grid_dim = grid_dim.max(1);
        let total_days = total_days.clamp(MIN_TOTAL_DAYS, MAX_TOTAL_DAYS);
        let mut schedule = Self {
            grid_dim,
            days: Vec::with_capacity(total_days),
            next_id: 0,
        };
        for _ in 0..total_days {
            let id = schedule.mint_id();
            schedule.days.push(Day {
                keyframes: vec![Keyframe {
                    id,
                    name: "Midnight".to_string(),
                    time: 0,
                    grid: Grid::off(grid_dim),
                }],
            });
        }
        schedule
    }

    fn mint_id(&mut self) -> KeyframeId {
        let id = KeyframeId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn grid_dim(&self) -> u8 {
        self.grid_dim
    }

    pub fn total_days(&self) -> usize {
        self.days.len()
    }

    pub fn day(&self, idx: usize) -> Option<&Day> {
        self.days.get(idx)
    }

    pub fn days(&self) -> &[Day] {
        &self.days
    }

    /// Create a keyframe in `day` with a fresh id, keeping the day sorted.
    /// Returns `None` on an unknown day index.
    pub fn add_keyframe(&mut self, day: usize, time: u32, grid: Grid) -> Option<KeyframeId> {
        if day >= self.days.len() {
            return None;
        }
        let id = self.mint_id();
        let grid = grid.resized(self.grid_dim);
        let day = &mut self.days[day];
        day.keyframes.push(Keyframe {
            id,
            name: format!("Keyframe {}", id.0 + 1),
            time: clamp_cycle_time(time),
            grid,
        });
        day.sort();
        Some(id)
    }

    /// Remove a keyframe. Refused (returns `false`) when the keyframe is the
    /// day's last one, or when day/id are unknown.
    pub fn delete_keyframe(&mut self, day: usize, id: KeyframeId) -> bool {
        let Some(day) = self.days.get_mut(day) else {
            return false;
        };
        if day.keyframes.len() <= 1 {
            return false;
        }
        let before = day.keyframes.len();
        day.keyframes.retain(|k| k.id != id);
        day.keyframes.len() < before
    }

    /// Move a keyframe to a new timestamp (clamped into the cycle) and
    /// re-sort. Unknown day/id is a no-op.
    pub fn update_time(&mut self, day: usize, id: KeyframeId, new_time: u32) {
        let Some(day) = self.days.get_mut(day) else {
            return;
        };
        if let Some(kf) = day.keyframes.iter_mut().find(|k| k.id == id) {
            kf.time = clamp_cycle_time(new_time);
            day.sort();
        }
    }

    /// Rename a keyframe. Free text, no uniqueness constraint.
    pub fn update_name(&mut self, day: usize, id: KeyframeId, new_name: impl Into<String>) {
        let Some(day) = self.days.get_mut(day) else {
            return;
        };
        if let Some(kf) = day.keyframes.iter_mut().find(|k| k.id == id) {
            kf.name = new_name.into();
        }
    }

    /// Paint one cell of one keyframe's grid. Out-of-range cell indices and
    /// unknown day/id are no-ops.
    pub fn paint_cell(&mut self, day: usize, id: KeyframeId, cell_idx: usize, cell: Cell) {
        let Some(day) = self.days.get_mut(day) else {
            return;
        };
        if let Some(kf) = day.keyframes.iter_mut().find(|k| k.id == id) {
            kf.grid.set_cell(cell_idx, cell);
        }
    }

    /// Change the grid dimension for every keyframe in every day at once.
    /// Existing cells are kept by flat index; new indices become inactive
    /// black.
    pub fn resize_grid(&mut self, new_dim: u8) {
        let new_dim = new_dim.max(1);
        if new_dim == self.grid_dim {
            return;
        }
        tracing::debug!(old = self.grid_dim, new = new_dim, "resizing schedule grids");
        self.grid_dim = new_dim;
        for day in &mut self.days {
            for kf in &mut day.keyframes {
                kf.grid = kf.grid.resized(new_dim);
            }
        }
    }

    /// Grow or shrink the schedule, clamping `n` to `[1, 14]`.
    ///
    /// Growth duplicates the last existing day into each new slot as a
    /// structurally independent deep copy with fresh ids; shrinking
    /// truncates. Callers owning a cursor or day selection clamp it
    /// themselves afterwards.
    pub fn set_total_days(&mut self, n: usize) {
        let n = n.clamp(MIN_TOTAL_DAYS, MAX_TOTAL_DAYS);
        if n <= self.days.len() {
            self.days.truncate(n);
            return;
        }
        while self.days.len() < n {
            let Some(template) = self.days.last().cloned() else {
                return;
            };
            let copy = self.remint_day(template);
            self.days.push(copy);
        }
    }

    fn remint_day(&mut self, mut day: Day) -> Day {
        for kf in &mut day.keyframes {
            kf.id = self.mint_id();
        }
        day
    }

    /// Wholesale-replace one day's keyframe list from unminted seeds, as the
    /// pattern/AI load path does. Seeds are sorted by time, given fresh ids,
    /// and normalized to the schedule's grid dimension.
    ///
    /// Returns the earliest keyframe's time (for cursor snapping). Empty
    /// input and unknown day indices are refused with nothing applied.
    pub fn replace_day(&mut self, day: usize, seeds: Vec<KeyframeSeed>) -> PhotocycleResult<u32> {
        if seeds.is_empty() {
            return Err(PhotocycleError::validation(
                "a day must keep at least one keyframe",
            ));
        }
        if day >= self.days.len() {
            return Err(PhotocycleError::validation(format!(
                "day index {day} is out of range (schedule has {} days)",
                self.days.len()
            )));
        }
        let dim = self.grid_dim;
        let mut keyframes: Vec<Keyframe> = seeds
            .into_iter()
            .map(|seed| Keyframe {
                id: KeyframeId(0), // minted below
                name: seed.name,
                time: clamp_cycle_time(seed.time),
                grid: seed.grid.resized(dim),
            })
            .collect();
        keyframes.sort_by_key(|k| k.time);
        for kf in &mut keyframes {
            kf.id = self.mint_id();
        }
        let first_time = keyframes[0].time;
        self.days[day].keyframes = keyframes;
        Ok(first_time)
    }

    /// Total length of the full schedule cycle in minutes.
    pub fn total_cycle_min(&self) -> u32 {
        CYCLE_DURATION_MIN * self.days.len() as u32
    }
}

impl Default for Schedule {
    fn default() -> Self {
        Self::new(crate::core::DEFAULT_GRID_DIM, crate::core::DEFAULT_TOTAL_DAYS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_day_schedule() -> Schedule {
        Schedule::new(4, 2)
    }

    #[test]
    fn new_schedule_seeds_every_day() {
        let s = Schedule::new(8, 3);
        assert_eq!(s.total_days(), 3);
        for day in s.days() {
            assert_eq!(day.keyframes().len(), 1);
            assert_eq!(day.keyframes()[0].time, 0);
            assert_eq!(day.keyframes()[0].grid.len(), 64);
        }
    }

    #[test]
    fn total_days_clamped_into_range() {
        let s = Schedule::new(4, 0);
        assert_eq!(s.total_days(), 1);
        let s = Schedule::new(4, 99);
        assert_eq!(s.total_days(), 14);
    }

    #[test]
    fn add_sorts_by_time_and_mints_unique_ids() {
        let mut s = two_day_schedule();
        let b = s.add_keyframe(0, 900, Grid::off(4)).unwrap();
        let a = s.add_keyframe(0, 300, Grid::off(4)).unwrap();
        assert_ne!(a, b);
        let times: Vec<u32> = s.day(0).unwrap().keyframes().iter().map(|k| k.time).collect();
        assert_eq!(times, vec![0, 300, 900]);
    }

    #[test]
    fn add_to_unknown_day_is_refused() {
        let mut s = two_day_schedule();
        assert!(s.add_keyframe(7, 100, Grid::off(4)).is_none());
    }

    #[test]
    fn delete_refused_on_last_keyframe() {
        let mut s = two_day_schedule();
        let only = s.day(0).unwrap().keyframes()[0].id;
        assert!(!s.delete_keyframe(0, only));
        assert_eq!(s.day(0).unwrap().keyframes().len(), 1);

        let extra = s.add_keyframe(0, 100, Grid::off(4)).unwrap();
        assert!(s.delete_keyframe(0, extra));
        assert!(!s.delete_keyframe(0, only));
    }

    #[test]
    fn update_time_clamps_into_cycle() {
        let mut s = two_day_schedule();
        let id = s.add_keyframe(0, 100, Grid::off(4)).unwrap();
        s.update_time(0, id, 99_999);
        assert_eq!(s.day(0).unwrap().keyframe(id).unwrap().time, CYCLE_DURATION_MIN - 1);
    }

    #[test]
    fn unknown_ids_are_noops_not_crashes() {
        let mut s = two_day_schedule();
        let ghost = KeyframeId(12345);
        s.update_time(0, ghost, 10);
        s.update_name(0, ghost, "nope");
        s.paint_cell(0, ghost, 0, Cell::new(1, 1, 1, true));
        assert!(!s.delete_keyframe(0, ghost));
        s.update_time(99, ghost, 10);
    }

    #[test]
    fn resize_round_trip_preserves_low_indices() {
        let mut s = Schedule::new(8, 1);
        let id = s.day(0).unwrap().keyframes()[0].id;
        s.paint_cell(0, id, 5, Cell::new(50, 60, 70, true));
        s.paint_cell(0, id, 40, Cell::new(1, 2, 3, true));

        s.resize_grid(4);
        s.resize_grid(8);
        let grid = &s.day(0).unwrap().keyframe(id).unwrap().grid;
        // Index 5 survives the 8 -> 4 -> 8 trip; index 40 was truncated away
        // and must come back as inactive black, never stale data.
        assert_eq!(grid.cell_or_off(5), Cell::new(50, 60, 70, true));
        assert_eq!(grid.cell_or_off(40), Cell::OFF);
        assert_eq!(grid.len(), 64);
    }

    #[test]
    fn growth_deep_copies_last_day_with_fresh_ids() {
        let mut s = Schedule::new(4, 3);
        let id = s.add_keyframe(2, 600, Grid::off(4)).unwrap();
        s.paint_cell(2, id, 0, Cell::new(9, 9, 9, true));

        s.set_total_days(5);
        assert_eq!(s.total_days(), 5);
        for new_day in 3..5 {
            let day = s.day(new_day).unwrap();
            assert_eq!(day.keyframes().len(), 2);
            assert_eq!(day.keyframes()[1].time, 600);
        }

        // Ids must be unique across the whole schedule.
        let mut all_ids: Vec<KeyframeId> = s
            .days()
            .iter()
            .flat_map(|d| d.keyframes().iter().map(|k| k.id))
            .collect();
        let total = all_ids.len();
        all_ids.sort();
        all_ids.dedup();
        assert_eq!(all_ids.len(), total);

        // Copies are structurally independent.
        let copy_id = s.day(3).unwrap().keyframes()[1].id;
        s.paint_cell(3, copy_id, 0, Cell::new(200, 0, 0, true));
        let original = s.day(2).unwrap().keyframe(id).unwrap();
        assert_eq!(original.grid.cell_or_off(0), Cell::new(9, 9, 9, true));
    }

    #[test]
    fn shrink_truncates() {
        let mut s = Schedule::new(4, 5);
        s.set_total_days(2);
        assert_eq!(s.total_days(), 2);
        s.set_total_days(0);
        assert_eq!(s.total_days(), 1);
    }

    #[test]
    fn replace_day_sorts_seeds_and_reports_first_time() {
        let mut s = two_day_schedule();
        let seeds = vec![
            KeyframeSeed {
                name: "Dusk".into(),
                time: 1200,
                grid: Grid::off(4),
            },
            KeyframeSeed {
                name: "Dawn".into(),
                time: 360,
                grid: Grid::off(8), // wrong dimension, must be normalized
            },
        ];
        let first = s.replace_day(0, seeds).unwrap();
        assert_eq!(first, 360);
        let day = s.day(0).unwrap();
        assert_eq!(day.keyframes()[0].name, "Dawn");
        assert_eq!(day.keyframes()[0].grid.len(), 16);
    }

    #[test]
    fn replace_day_refuses_empty_and_unknown_day() {
        let mut s = two_day_schedule();
        assert!(s.replace_day(0, vec![]).is_err());
        let seed = KeyframeSeed {
            name: "x".into(),
            time: 0,
            grid: Grid::off(4),
        };
        assert!(s.replace_day(9, vec![seed]).is_err());
        // Nothing was applied.
        assert_eq!(s.day(0).unwrap().keyframes().len(), 1);
    }
}
