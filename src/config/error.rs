//! Configuration error types.

use thiserror::Error;

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Port value is outside valid range (1-65535).
    #[error("invalid port '{value}': must be between 1 and 65535")]
    InvalidPort { value: String },

    /// Port string could not be parsed as a number.
    #[error("failed to parse port '{value}': {source}")]
    PortParseError {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },

    /// Bind address string could not be parsed.
    #[error("failed to parse bind address '{value}': {source}")]
    InvalidBindAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },

    /// `PLAGD_ENV` is neither `dev` nor `live`.
    #[error("invalid environment '{value}': expected 'dev' or 'live'")]
    InvalidMode { value: String },

    /// A numeric variable could not be parsed.
    #[error("failed to parse {name}='{value}' as a number")]
    InvalidNumber { name: &'static str, value: String },

    /// A setting parsed but violates an invariant.
    #[error("invalid {name}: {reason}")]
    OutOfRange {
        name: &'static str,
        reason: &'static str,
    },

    /// A variable required by the selected mode was not set.
    #[error("missing required environment variable: {name}")]
    MissingEnvVar { name: &'static str },
}
