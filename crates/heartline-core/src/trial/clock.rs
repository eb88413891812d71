//! Wall-clock trial countdown with a one-shot end latch.

use chrono::{DateTime, Utc};

use super::model::{TrialPhase, TrialState, TrialTick};
use crate::config::TrialTiming;

/// Countdown state machine for the free trial.
///
/// The clock is armed with the session's connect time and driven externally
/// on a fixed cadence. All arithmetic is wall-clock differences rather than
/// tick counting, so a suspended or slow driver still converges to the
/// correct remaining time on its next tick.
///
/// The `Ended` transition is guarded by a one-shot latch: `just_ended` is
/// reported on exactly one tick per armed cycle, no matter how many ticks
/// observe zero remaining time afterwards. `start` and `stop` both clear
/// the latch.
#[derive(Debug, Clone)]
pub struct TrialClock {
    timing: TrialTiming,
    connected_at: Option<DateTime<Utc>>,
    ended: bool,
}

impl TrialClock {
    pub fn new(timing: TrialTiming) -> Self {
        Self {
            timing,
            connected_at: None,
            ended: false,
        }
    }

    /// Arms the clock for a freshly connected session.
    pub fn start(&mut self, connected_at: DateTime<Utc>) {
        tracing::debug!("[TrialClock] Armed at {}", connected_at.to_rfc3339());
        self.connected_at = Some(connected_at);
        self.ended = false;
    }

    /// Disarms the clock without signaling an end.
    pub fn stop(&mut self) {
        if self.connected_at.is_some() {
            tracing::debug!("[TrialClock] Stopped");
        }
        self.connected_at = None;
        self.ended = false;
    }

    /// Whether the clock is currently armed.
    pub fn is_running(&self) -> bool {
        self.connected_at.is_some()
    }

    /// Recomputes the countdown for the given instant.
    ///
    /// Returns `None` while the clock is not armed. `just_ended` is true on
    /// the single tick that crosses into `Ended`.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Option<TrialTick> {
        let connected_at = self.connected_at?;
        let trial_starts_at = connected_at + self.timing.init_delay();
        let ends_at = trial_starts_at + self.timing.free_trial();

        if now < trial_starts_at {
            let seconds_left = ceil_seconds((trial_starts_at - now).num_milliseconds());
            return Some(TrialTick {
                state: TrialState::new(TrialPhase::Init, seconds_left),
                just_ended: false,
            });
        }

        let seconds_left = ceil_seconds((ends_at - now).num_milliseconds());
        if seconds_left > 0 {
            return Some(TrialTick {
                state: TrialState::new(TrialPhase::Trial, seconds_left),
                just_ended: false,
            });
        }

        let just_ended = !self.ended;
        self.ended = true;
        if just_ended {
            tracing::info!("[TrialClock] Free trial ended");
        }
        Some(TrialTick {
            state: TrialState::new(TrialPhase::Ended, 0),
            just_ended,
        })
    }
}

/// Whole seconds remaining, rounded up, floored at zero.
fn ceil_seconds(remaining_ms: i64) -> u64 {
    if remaining_ms <= 0 {
        0
    } else {
        (remaining_ms as u64).div_ceil(1000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    fn clock() -> (TrialClock, DateTime<Utc>) {
        let mut clock = TrialClock::new(TrialTiming::default());
        let connected_at = Utc::now();
        clock.start(connected_at);
        (clock, connected_at)
    }

    fn at(base: DateTime<Utc>, secs: i64) -> DateTime<Utc> {
        base + TimeDelta::seconds(secs)
    }

    #[test]
    fn test_init_phase_countdown() {
        let (mut clock, t) = clock();

        let tick = clock.tick(at(t, 10)).unwrap();

        assert_eq!(tick.state, TrialState::new(TrialPhase::Init, 15));
        assert!(!tick.just_ended);
    }

    #[test]
    fn test_trial_starts_after_init_delay() {
        let (mut clock, t) = clock();

        let tick = clock.tick(at(t, 25)).unwrap();

        assert_eq!(tick.state, TrialState::new(TrialPhase::Trial, 60));
        assert!(!tick.just_ended);
    }

    #[test]
    fn test_last_trial_second() {
        let (mut clock, t) = clock();

        let tick = clock.tick(at(t, 84)).unwrap();

        assert_eq!(tick.state, TrialState::new(TrialPhase::Trial, 1));
        assert!(!tick.just_ended);
    }

    #[test]
    fn test_end_fires_exactly_once() {
        let (mut clock, t) = clock();

        let ended = clock.tick(at(t, 85)).unwrap();
        assert_eq!(ended.state, TrialState::new(TrialPhase::Ended, 0));
        assert!(ended.just_ended);

        // The latch holds on any later tick
        let later = clock.tick(at(t, 90)).unwrap();
        assert_eq!(later.state, TrialState::new(TrialPhase::Ended, 0));
        assert!(!later.just_ended);
    }

    #[test]
    fn test_fractional_remaining_rounds_up() {
        let (mut clock, t) = clock();

        // 500ms into the tenth second of warm-up: 14.5s left rounds to 15
        let now = at(t, 10) + TimeDelta::milliseconds(500);
        let tick = clock.tick(now).unwrap();

        assert_eq!(tick.state, TrialState::new(TrialPhase::Init, 15));
    }

    #[test]
    fn test_final_millisecond_still_counts_as_one_second() {
        let (mut clock, t) = clock();

        // 1ms short of the end: the ceiling keeps the trial alive
        let now = at(t, 85) - TimeDelta::milliseconds(1);
        let tick = clock.tick(now).unwrap();

        assert_eq!(tick.state, TrialState::new(TrialPhase::Trial, 1));
        assert!(!tick.just_ended);
    }

    #[test]
    fn test_restart_clears_the_latch() {
        let (mut clock, t) = clock();
        assert!(clock.tick(at(t, 85)).unwrap().just_ended);

        clock.stop();
        assert!(clock.tick(at(t, 86)).is_none());

        // A fresh cycle can end again
        let t2 = at(t, 100);
        clock.start(t2);
        assert!(clock.is_running());
        let tick = clock.tick(at(t2, 85)).unwrap();
        assert!(tick.just_ended);
    }

    #[test]
    fn test_unarmed_clock_does_not_tick() {
        let mut clock = TrialClock::new(TrialTiming::default());
        assert!(!clock.is_running());
        assert!(clock.tick(Utc::now()).is_none());
    }

    #[test]
    fn test_late_first_tick_converges() {
        // Driver stalled past the whole window; the first tick it gets
        // still lands on Ended with a single end signal.
        let (mut clock, t) = clock();

        let tick = clock.tick(at(t, 300)).unwrap();

        assert_eq!(tick.state, TrialState::new(TrialPhase::Ended, 0));
        assert!(tick.just_ended);
    }
}
