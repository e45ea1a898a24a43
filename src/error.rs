//! Error types.
//!
//! Almost everything in the engine is policy, not failure. What can fail is
//! installing the input monitor on a host without an event source, and
//! loading configuration.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FocusError {
    /// The host has no event source to monitor (headless window).
    #[error("No event source available for input monitoring")]
    NoEventSource,

    /// Failed to read a config file.
    #[error("Failed to read config file: {0}")]
    ConfigRead(#[source] std::io::Error),

    /// Failed to parse a config file.
    #[error("Failed to parse config: {0}")]
    ConfigParse(#[source] toml::de::Error),

    /// A config value parsed but is out of range.
    #[error("Invalid config value for {field}: {reason}")]
    ConfigInvalid {
        field: &'static str,
        reason: String,
    },
}

pub type Result<T, E = FocusError> = std::result::Result<T, E>;
