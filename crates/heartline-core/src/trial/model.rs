//! Trial countdown domain model.

use serde::{Deserialize, Serialize};

/// Phase of the free-trial countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrialPhase {
    /// Agent warm-up window, the trial has not started counting yet.
    Init,
    /// Billable free window, counting down to zero.
    Trial,
    /// The free window ran out. Terminal for the current cycle.
    Ended,
}

/// Countdown state as of the latest tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialState {
    pub phase: TrialPhase,
    /// Whole seconds remaining in the current phase, floored at 0.
    pub seconds_left: u64,
}

impl TrialState {
    pub fn new(phase: TrialPhase, seconds_left: u64) -> Self {
        Self {
            phase,
            seconds_left,
        }
    }

    /// The countdown banner shown over the live session.
    pub fn banner(&self) -> String {
        match self.phase {
            TrialPhase::Init => format!("Initializing... {}s", self.seconds_left),
            TrialPhase::Trial | TrialPhase::Ended => {
                format!("Free trial: {}s left", self.seconds_left)
            }
        }
    }
}

/// Result of a single clock tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrialTick {
    pub state: TrialState,
    /// True on the one tick where the trial transitions into `Ended`.
    pub just_ended: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_banner_per_phase() {
        assert_eq!(
            TrialState::new(TrialPhase::Init, 12).banner(),
            "Initializing... 12s"
        );
        assert_eq!(
            TrialState::new(TrialPhase::Trial, 59).banner(),
            "Free trial: 59s left"
        );
        assert_eq!(
            TrialState::new(TrialPhase::Ended, 0).banner(),
            "Free trial: 0s left"
        );
    }

}
