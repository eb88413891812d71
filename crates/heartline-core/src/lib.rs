pub mod agent;
pub mod config;
pub mod error;
pub mod identity;
pub mod session;
pub mod suggestion;
pub mod trial;
pub mod view;

// Re-export common error type
pub use error::{HeartlineError, Result};
