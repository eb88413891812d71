//! Unified path management for Heartline files.
//!
//! Everything the client persists lives under one per-user directory,
//! resolved through the platform conventions `dirs` implements.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/heartline/         # Linux; platform equivalent elsewhere
//! ├── config.toml              # Optional configuration overrides
//! ├── profile.toml             # Stored email (the account)
//! └── logs/                    # Client log files
//! ```

use std::path::PathBuf;

use heartline_core::{HeartlineError, Result};

/// Path resolution for the Heartline client.
pub struct HeartlinePaths;

impl HeartlinePaths {
    /// Returns the Heartline configuration directory.
    ///
    /// # Errors
    ///
    /// Returns `HeartlineError::Config` when the platform config directory
    /// cannot be determined.
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("heartline"))
            .ok_or_else(|| HeartlineError::config("Cannot find config directory"))
    }

    /// Returns the path to the configuration override file.
    pub fn config_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Returns the path to the stored profile file.
    pub fn profile_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("profile.toml"))
    }

    /// Returns the path to the logs directory.
    pub fn logs_dir() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("logs"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_dir_ends_with_app_name() {
        let config_dir = HeartlinePaths::config_dir().unwrap();
        assert!(config_dir.ends_with("heartline"));
    }

    #[test]
    fn test_files_live_under_config_dir() {
        let config_dir = HeartlinePaths::config_dir().unwrap();

        let config_file = HeartlinePaths::config_file().unwrap();
        assert!(config_file.ends_with("config.toml"));
        assert!(config_file.starts_with(&config_dir));

        let profile_file = HeartlinePaths::profile_file().unwrap();
        assert!(profile_file.ends_with("profile.toml"));
        assert!(profile_file.starts_with(&config_dir));

        let logs_dir = HeartlinePaths::logs_dir().unwrap();
        assert!(logs_dir.ends_with("logs"));
        assert!(logs_dir.starts_with(&config_dir));
    }
}
