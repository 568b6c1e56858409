//! Schedule clock: the playback cursor over the multi-day cycle.
//!
//! The clock is an explicit Paused/Playing state machine driven by injected
//! elapsed-real-time deltas, so it can be tested with synthetic deltas and
//! no real scheduler. Stopping playback guarantees no further advancement:
//! ticks while paused are ignored.

use crate::core::{CYCLE_DURATION_MIN, MAX_TOTAL_DAYS, MIN_TOTAL_DAYS};

/// Inclusive range of the user-facing speed setting (0.1x to 1000x realtime).
pub const MIN_ANIMATION_SPEED: u32 = 1;
/// See [`MIN_ANIMATION_SPEED`].
pub const MAX_ANIMATION_SPEED: u32 = 10_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayState {
    Paused,
    Playing,
}

/// Playback cursor over `total_days * CYCLE_DURATION_MIN` minutes.
///
/// The cursor is a single absolute value; day and minute-of-cycle are always
/// derived from it, never stored separately, so they cannot diverge.
#[derive(Clone, Debug)]
pub struct PlaybackClock {
    absolute_min: f64,
    state: PlayState,
    animation_speed: u32,
    total_days: usize,
}

impl PlaybackClock {
    pub fn new(total_days: usize) -> Self {
        Self {
            absolute_min: 0.0,
            state: PlayState::Paused,
            animation_speed: 10, // 1x realtime
            total_days: total_days.clamp(MIN_TOTAL_DAYS, MAX_TOTAL_DAYS),
        }
    }

    pub fn state(&self) -> PlayState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlayState::Playing
    }

    pub fn play(&mut self) {
        self.state = PlayState::Playing;
    }

    /// Stop ticking. The cursor is preserved; there is no reset state.
    pub fn pause(&mut self) {
        self.state = PlayState::Paused;
    }

    pub fn animation_speed(&self) -> u32 {
        self.animation_speed
    }

    /// Set the speed knob, clamped to `[1, 10000]` (0.1x to 1000x).
    pub fn set_animation_speed(&mut self, speed: u32) {
        self.animation_speed = speed.clamp(MIN_ANIMATION_SPEED, MAX_ANIMATION_SPEED);
    }

    /// Advance by one tick's worth of elapsed real milliseconds.
    ///
    /// Simulated minutes advanced = `elapsed_ms * (speed / 10) / 1000`, so a
    /// speed of 10 maps one real second to one simulated minute. Ignored
    /// while paused.
    pub fn tick(&mut self, elapsed_ms: f64) {
        if self.state != PlayState::Playing || !elapsed_ms.is_finite() || elapsed_ms <= 0.0 {
            return;
        }
        let multiplier = f64::from(self.animation_speed) / 10.0;
        self.set_absolute(self.absolute_min + elapsed_ms * multiplier / 1000.0);
    }

    /// Direct cursor set (scrubbing). Permitted in either state and takes
    /// effect immediately, overriding the next tick's base.
    pub fn scrub(&mut self, absolute_min: f64) {
        self.set_absolute(absolute_min);
    }

    /// Snap the cursor to the start of `day`'s cycle. Unknown day indices
    /// are a no-op.
    pub fn select_day(&mut self, day: usize) {
        if day < self.total_days {
            self.absolute_min = day as f64 * f64::from(CYCLE_DURATION_MIN);
        }
    }

    /// Follow a schedule-length change; the cursor re-wraps into the new
    /// range so it never points past the end of the schedule.
    pub fn set_total_days(&mut self, total_days: usize) {
        self.total_days = total_days.clamp(MIN_TOTAL_DAYS, MAX_TOTAL_DAYS);
        self.set_absolute(self.absolute_min);
    }

    pub fn total_days(&self) -> usize {
        self.total_days
    }

    pub fn absolute_time(&self) -> f64 {
        self.absolute_min
    }

    /// Day index the cursor currently sits in.
    pub fn current_day(&self) -> usize {
        let day = (self.absolute_min / f64::from(CYCLE_DURATION_MIN)).floor() as usize;
        day % self.total_days
    }

    /// Minute-of-cycle within the current day, fractional.
    pub fn current_time(&self) -> f64 {
        self.absolute_min.rem_euclid(f64::from(CYCLE_DURATION_MIN))
    }

    fn set_absolute(&mut self, value: f64) {
        let span = f64::from(CYCLE_DURATION_MIN) * self.total_days as f64;
        let wrapped = value.rem_euclid(span);
        self.absolute_min = if wrapped.is_finite() { wrapped } else { 0.0 };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paused_clock_ignores_ticks() {
        let mut clock = PlaybackClock::new(3);
        clock.tick(10_000.0);
        assert_eq!(clock.absolute_time(), 0.0);
    }

    #[test]
    fn one_real_second_is_one_minute_at_default_speed() {
        let mut clock = PlaybackClock::new(3);
        clock.play();
        clock.tick(1000.0);
        assert!((clock.absolute_time() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn speed_scales_advancement() {
        let mut clock = PlaybackClock::new(3);
        clock.play();
        clock.set_animation_speed(100); // 10x
        clock.tick(1000.0);
        assert!((clock.absolute_time() - 10.0).abs() < 1e-9);

        clock.set_animation_speed(0); // clamped to 1 => 0.1x
        assert_eq!(clock.animation_speed(), MIN_ANIMATION_SPEED);
        clock.set_animation_speed(99_999);
        assert_eq!(clock.animation_speed(), MAX_ANIMATION_SPEED);
    }

    #[test]
    fn cursor_wraps_across_the_whole_schedule() {
        let mut clock = PlaybackClock::new(2);
        clock.play();
        clock.set_animation_speed(10_000); // 1000x: 1 real sec = 1000 min
        clock.tick(2880.0 * 1000.0 / 1000.0 + 5000.0); // past 2 full days
        assert!(clock.absolute_time() < 2880.0);
    }

    #[test]
    fn derived_day_and_time_recompute_from_cursor() {
        let mut clock = PlaybackClock::new(3);
        clock.scrub(1440.0 * 2.0 + 90.5);
        assert_eq!(clock.current_day(), 2);
        assert!((clock.current_time() - 90.5).abs() < 1e-9);
    }

    #[test]
    fn scrub_works_in_either_state_and_wraps() {
        let mut clock = PlaybackClock::new(2);
        clock.scrub(3000.0);
        assert!((clock.absolute_time() - (3000.0 - 2880.0)).abs() < 1e-9);
        clock.play();
        clock.scrub(100.0);
        assert!((clock.absolute_time() - 100.0).abs() < 1e-9);

        clock.scrub(-10.0);
        assert!(clock.absolute_time() >= 0.0);
    }

    #[test]
    fn select_day_snaps_to_day_start() {
        let mut clock = PlaybackClock::new(5);
        clock.scrub(200.0);
        clock.select_day(3);
        assert_eq!(clock.absolute_time(), 3.0 * 1440.0);
        assert_eq!(clock.current_day(), 3);
        assert_eq!(clock.current_time(), 0.0);

        clock.select_day(99); // out of range: no-op
        assert_eq!(clock.current_day(), 3);
    }

    #[test]
    fn pause_preserves_cursor() {
        let mut clock = PlaybackClock::new(2);
        clock.play();
        clock.tick(5000.0);
        let at = clock.absolute_time();
        clock.pause();
        clock.tick(5000.0);
        assert_eq!(clock.absolute_time(), at);
    }

    #[test]
    fn shrinking_total_days_rewraps_cursor() {
        let mut clock = PlaybackClock::new(10);
        clock.scrub(9.0 * 1440.0 + 100.0);
        clock.set_total_days(2);
        assert!(clock.absolute_time() < 2.0 * 1440.0);
        assert!((clock.current_time() - 100.0).abs() < 1e-9);
    }
}
