//! Classification of agent failure reasons into a user-facing notice.

use serde::{Deserialize, Serialize};

/// Substring that marks an agent which timed out while loading models.
const INIT_TIMEOUT_NEEDLE: &str = "did not complete initializing";

/// Extended explanation appended when the failure was an init timeout.
const INIT_TIMEOUT_HINT: &str =
    "The agent is still starting up (loading models). Try again in a moment.";

/// Pointer appended to every failure notice.
const DOCS_POINTER: &str =
    "See the voice agent quickstart: https://docs.livekit.io/agents/start/voice-ai/";

/// A user-facing explanation of an agent failure.
///
/// Built once per failure occurrence from the raw reason strings the agent
/// reported. Order of reasons is preserved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureNotice {
    pub reasons: Vec<String>,
    /// True when any reason indicates the agent ran out of warm-up time.
    pub init_timeout: bool,
}

impl FailureNotice {
    /// Classifies the agent's reported failure reasons.
    pub fn classify(reasons: &[String]) -> Self {
        let init_timeout = reasons
            .iter()
            .any(|r| r.to_lowercase().contains(INIT_TIMEOUT_NEEDLE));
        Self {
            reasons: reasons.to_vec(),
            init_timeout,
        }
    }

    /// Alert title, constant across all failure kinds.
    pub fn title(&self) -> &'static str {
        "Session ended"
    }

    /// Reason text: `None` with no reasons (title carries the alert),
    /// the bare line for one, a bulleted list for several.
    pub fn body(&self) -> Option<String> {
        match self.reasons.len() {
            0 => None,
            1 => Some(self.reasons[0].clone()),
            _ => Some(
                self.reasons
                    .iter()
                    .map(|r| format!("- {}", r))
                    .collect::<Vec<_>>()
                    .join("\n"),
            ),
        }
    }

    /// Warm-up explanation, present only for init timeouts.
    pub fn hint(&self) -> Option<&'static str> {
        self.init_timeout.then_some(INIT_TIMEOUT_HINT)
    }

    /// Full description as display lines, ending with the docs pointer.
    pub fn description_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if let Some(body) = self.body() {
            lines.extend(body.lines().map(str::to_string));
        }
        if let Some(hint) = self.hint() {
            lines.push(hint.to_string());
        }
        lines.push(DOCS_POINTER.to_string());
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reasons(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_init_timeout_detected_case_insensitively() {
        let notice = FailureNotice::classify(&reasons(&[
            "Agent did not complete initializing in time",
        ]));
        assert!(notice.init_timeout);

        let shouting = FailureNotice::classify(&reasons(&["AGENT DID NOT COMPLETE INITIALIZING"]));
        assert!(shouting.init_timeout);
    }

    #[test]
    fn test_unrelated_reasons_are_not_init_timeout() {
        let notice = FailureNotice::classify(&reasons(&["network error", "codec mismatch"]));
        assert!(!notice.init_timeout);
    }

    #[test]
    fn test_single_reason_renders_bare() {
        let notice = FailureNotice::classify(&reasons(&["network error"]));
        assert_eq!(notice.body().as_deref(), Some("network error"));
    }

    #[test]
    fn test_multiple_reasons_render_as_list() {
        let notice = FailureNotice::classify(&reasons(&["network error", "codec mismatch"]));
        assert_eq!(
            notice.body().as_deref(),
            Some("- network error\n- codec mismatch")
        );
    }

    #[test]
    fn test_no_reasons_is_title_only() {
        let notice = FailureNotice::classify(&[]);
        assert_eq!(notice.body(), None);
        assert_eq!(notice.title(), "Session ended");
        // Description still carries the docs pointer
        assert_eq!(notice.description_lines().len(), 1);
    }

    #[test]
    fn test_hint_only_on_init_timeout() {
        let timeout = FailureNotice::classify(&reasons(&[
            "Agent did not complete initializing in time",
        ]));
        assert!(timeout.hint().is_some());

        let other = FailureNotice::classify(&reasons(&["network error"]));
        assert!(other.hint().is_none());
    }

    #[test]
    fn test_description_order() {
        let notice = FailureNotice::classify(&reasons(&[
            "Agent did not complete initializing in time",
        ]));
        let lines = notice.description_lines();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "Agent did not complete initializing in time");
        assert!(lines[1].contains("starting up"));
        assert!(lines[2].contains("quickstart"));
    }
}
