//! Application configuration with product defaults and TOML file overrides.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Trial timing constants.
///
/// The free trial does not start counting until the agent has had time to
/// warm up, so the window the user sees is `init_delay` of "Initializing"
/// followed by `free_trial` of usable conversation.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct TrialTiming {
    /// Seconds between connect and the start of the free trial window.
    #[serde(default = "TrialTiming::default_init_delay_secs")]
    pub init_delay_secs: u64,
    /// Length of the free trial window in seconds.
    #[serde(default = "TrialTiming::default_free_trial_secs")]
    pub free_trial_secs: u64,
}

impl TrialTiming {
    fn default_init_delay_secs() -> u64 {
        25
    }

    fn default_free_trial_secs() -> u64 {
        60
    }

    pub fn init_delay(&self) -> Duration {
        Duration::from_secs(self.init_delay_secs)
    }

    pub fn free_trial(&self) -> Duration {
        Duration::from_secs(self.free_trial_secs)
    }

    /// Total seconds from connect until the trial ends.
    pub fn total_secs(&self) -> u64 {
        self.init_delay_secs + self.free_trial_secs
    }
}

impl Default for TrialTiming {
    fn default() -> Self {
        Self {
            init_delay_secs: Self::default_init_delay_secs(),
            free_trial_secs: Self::default_free_trial_secs(),
        }
    }
}

/// Resolved application configuration.
///
/// Defaults are the shipped product values; a partial `config.toml` may
/// override any field, and the agent name can also come from
/// `HEARTLINE_AGENT_NAME`.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct AppConfig {
    pub company_name: String,
    pub page_title: String,
    pub tagline: String,
    /// Label on the call-to-action that starts a session.
    pub start_prompt: String,
    /// Explicit agent to dispatch the session to, when set.
    pub agent_name: Option<String>,
    #[serde(default)]
    pub timing: TrialTiming,
    /// Seconds the agent gets to finish initializing after connect.
    #[serde(default = "AppConfig::default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Seconds an alert stays on screen before auto-dismissing.
    #[serde(default = "AppConfig::default_toast_ttl_secs")]
    pub toast_ttl_secs: u64,
}

impl AppConfig {
    fn default_connect_timeout_secs() -> u64 {
        45
    }

    fn default_toast_ttl_secs() -> u64 {
        10
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn toast_ttl(&self) -> Duration {
        Duration::from_secs(self.toast_ttl_secs)
    }

    /// Applies a partial file override on top of `self`.
    pub fn merge_file(&mut self, file: AppConfigFile) {
        if let Some(company_name) = file.company_name {
            self.company_name = company_name;
        }
        if let Some(page_title) = file.page_title {
            self.page_title = page_title;
        }
        if let Some(tagline) = file.tagline {
            self.tagline = tagline;
        }
        if let Some(start_prompt) = file.start_prompt {
            self.start_prompt = start_prompt;
        }
        if let Some(agent_name) = file.agent_name {
            self.agent_name = Some(agent_name);
        }
        if let Some(timing) = file.timing {
            self.timing = timing;
        }
        if let Some(secs) = file.connect_timeout_secs {
            self.connect_timeout_secs = secs;
        }
        if let Some(secs) = file.toast_ttl_secs {
            self.toast_ttl_secs = secs;
        }
    }

    /// Parses a partial TOML override and merges it over the defaults.
    ///
    /// # Errors
    ///
    /// Returns a serialization error when the file is not valid TOML for
    /// the override schema. An unreadable file is the caller's concern.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let file: AppConfigFile = toml::from_str(contents)?;
        let mut config = Self::default();
        config.merge_file(file);
        Ok(config)
    }

    /// Applies process environment overrides.
    pub fn apply_env(&mut self) {
        if let Ok(agent_name) = std::env::var("HEARTLINE_AGENT_NAME")
            && !agent_name.trim().is_empty()
        {
            self.agent_name = Some(agent_name);
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            company_name: "Heartline AI".to_string(),
            page_title: "Heartline – Talk to an AI that speaks Urdu & Hindi".to_string(),
            tagline:
                "Real voice conversations. She listens, talks back, and gets you. No typing—just talk."
                    .to_string(),
            start_prompt: "Talk now".to_string(),
            agent_name: None,
            timing: TrialTiming::default(),
            connect_timeout_secs: Self::default_connect_timeout_secs(),
            toast_ttl_secs: Self::default_toast_ttl_secs(),
        }
    }
}

/// Partial configuration as read from `config.toml`.
///
/// Every field is optional so users only write the keys they change.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct AppConfigFile {
    pub company_name: Option<String>,
    pub page_title: Option<String>,
    pub tagline: Option<String>,
    pub start_prompt: Option<String>,
    pub agent_name: Option<String>,
    pub timing: Option<TrialTiming>,
    pub connect_timeout_secs: Option<u64>,
    pub toast_ttl_secs: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_timing() {
        let config = AppConfig::default();
        assert_eq!(config.timing.init_delay_secs, 25);
        assert_eq!(config.timing.free_trial_secs, 60);
        assert_eq!(config.timing.total_secs(), 85);
        assert_eq!(config.connect_timeout_secs, 45);
        assert_eq!(config.toast_ttl_secs, 10);
    }

    #[test]
    fn test_merge_partial_file() {
        let file: AppConfigFile = toml::from_str(
            r#"
            company_name = "Acme Voice"
            connect_timeout_secs = 30

            [timing]
            free_trial_secs = 120
            "#,
        )
        .unwrap();

        let mut config = AppConfig::default();
        config.merge_file(file);

        assert_eq!(config.company_name, "Acme Voice");
        assert_eq!(config.connect_timeout_secs, 30);
        assert_eq!(config.timing.free_trial_secs, 120);
        // Keys omitted from the timing table keep their defaults
        assert_eq!(config.timing.init_delay_secs, 25);
        assert_eq!(config.start_prompt, "Talk now");
    }

    #[test]
    fn test_from_toml_str_rejects_bad_toml() {
        let result = AppConfig::from_toml_str("company_name = [not toml");
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_override_keeps_defaults() {
        let config = AppConfig::from_toml_str("").unwrap();
        assert_eq!(config.company_name, "Heartline AI");
        assert_eq!(config.timing, TrialTiming::default());
    }
}
