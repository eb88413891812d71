//! Post-trial suggestion flow.
//!
//! A three-step, forward-only walk through the trial-ended screen:
//! the offer, the suggestion entry form, and the thank-you note.
//! Steps never move backwards; leaving the screen resets to the start.

use serde::{Deserialize, Serialize};

/// The step currently shown on the trial-ended screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowStep {
    /// "Want more free minutes?" with yes / no choices.
    #[default]
    Offer,
    /// Free-text suggestion entry.
    Suggest,
    /// Confirmation after a successful submission.
    Thanks,
}

/// Tracks progress through the suggestion flow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SuggestionFlow {
    step: FlowStep,
}

impl SuggestionFlow {
    /// Creates a flow positioned at the offer step.
    pub fn new() -> Self {
        Self::default()
    }

    /// The current step.
    pub fn step(&self) -> FlowStep {
        self.step
    }

    /// Advances from the offer to the entry form. No-op on other steps.
    pub fn proceed(&mut self) {
        if self.step == FlowStep::Offer {
            self.step = FlowStep::Suggest;
        }
    }

    /// Advances from the entry form to the thank-you note after a
    /// successful submission. No-op on other steps.
    pub fn complete(&mut self) {
        if self.step == FlowStep::Suggest {
            self.step = FlowStep::Thanks;
        }
    }

    /// Returns to the offer step. Called whenever the offer is raised so
    /// a new trial always starts the flow from the beginning.
    pub fn reset(&mut self) {
        self.step = FlowStep::Offer;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flow_starts_at_offer() {
        assert_eq!(SuggestionFlow::new().step(), FlowStep::Offer);
    }

    #[test]
    fn test_flow_walks_forward_through_all_steps() {
        let mut flow = SuggestionFlow::new();
        flow.proceed();
        assert_eq!(flow.step(), FlowStep::Suggest);
        flow.complete();
        assert_eq!(flow.step(), FlowStep::Thanks);
    }

    #[test]
    fn test_complete_is_ignored_on_offer_step() {
        let mut flow = SuggestionFlow::new();
        flow.complete();
        assert_eq!(flow.step(), FlowStep::Offer);
    }

    #[test]
    fn test_proceed_is_ignored_past_the_offer_step() {
        let mut flow = SuggestionFlow::new();
        flow.proceed();
        flow.complete();
        flow.proceed();
        assert_eq!(flow.step(), FlowStep::Thanks);
    }

    #[test]
    fn test_reset_returns_to_offer_from_any_step() {
        let mut flow = SuggestionFlow::new();
        flow.proceed();
        flow.reset();
        assert_eq!(flow.step(), FlowStep::Offer);

        flow.proceed();
        flow.complete();
        flow.reset();
        assert_eq!(flow.step(), FlowStep::Offer);
    }
}
