//! Unified error types for `ApartmentBuddy`.
//!
//! Ledger failures are split into the caller-facing categories the command layer
//! renders differently: conflicts (`ApartmentExists`), missing records
//! (`ApartmentNotFound`), rejected input (`InvalidArgument`) and persistence
//! failures (the `Ledger*` variants).

use std::path::PathBuf;
use thiserror::Error;

/// Every error the bot can produce.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid or missing configuration
    #[error("Configuration error: {message}")]
    Config {
        /// What was wrong
        message: String,
    },

    /// An apartment with this name is already registered
    #[error("Apartment '{name}' already exists")]
    ApartmentExists {
        /// Name that collided
        name: String,
    },

    /// No apartment with this name is registered
    #[error("Apartment '{name}' not found")]
    ApartmentNotFound {
        /// Name that was looked up
        name: String,
    },

    /// Input rejected before any state change
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Why the input was rejected
        message: String,
    },

    /// The ledger document exists but could not be read
    #[error("Failed to read ledger {path}: {source}")]
    LedgerRead {
        /// Ledger document path
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// A ledger snapshot could not be written; the change is not durable
    #[error("Failed to write ledger {path}: {source}")]
    LedgerWrite {
        /// Ledger document path
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// The ledger document is not valid JSON for the ledger layout
    #[error("Ledger {path} is corrupt: {source}")]
    LedgerParse {
        /// Ledger document path
        path: PathBuf,
        /// Underlying decode error
        source: serde_json::Error,
    },

    /// The ledger document parsed but holds an impossible record
    #[error("Ledger {path} holds an invalid record: {message}")]
    LedgerInvalid {
        /// Ledger document path
        path: PathBuf,
        /// Which record and why
        message: String,
    },

    /// A thread panicked while holding the ledger lock
    #[error("Ledger lock poisoned")]
    LedgerPoisoned,

    /// Transport or decode failure talking to Tebex
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Tebex answered with a status the endpoint does not document as success
    #[error("Tebex returned status {status} for {endpoint}")]
    TebexStatus {
        /// Endpoint path that was called
        endpoint: String,
        /// HTTP status code received
        status: u16,
    },

    /// I/O error outside the ledger
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Required environment variable missing or not unicode
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    /// A ledger operation handed to the blocking pool panicked or was cancelled
    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// Serenity/Poise framework error
    #[error("Discord error: {0}")]
    Discord(Box<poise::serenity_prelude::Error>),
}

impl Error {
    /// Returns true when the error means a ledger change may not have reached disk.
    #[must_use]
    pub const fn is_persistence_failure(&self) -> bool {
        matches!(
            self,
            Self::LedgerRead { .. }
                | Self::LedgerWrite { .. }
                | Self::LedgerParse { .. }
                | Self::LedgerInvalid { .. }
                | Self::LedgerPoisoned
        )
    }
}

impl From<poise::serenity_prelude::Error> for Error {
    fn from(value: poise::serenity_prelude::Error) -> Self {
        Self::Discord(Box::new(value))
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persistence_failures_are_classified() {
        let write = Error::LedgerWrite {
            path: PathBuf::from("data/apartments.json"),
            source: std::io::Error::other("disk full"),
        };
        assert!(write.is_persistence_failure());
        assert!(Error::LedgerPoisoned.is_persistence_failure());

        let not_found = Error::ApartmentNotFound {
            name: "Sakura".to_string(),
        };
        assert!(!not_found.is_persistence_failure());
    }

    #[test]
    fn test_error_messages_name_the_apartment() {
        let exists = Error::ApartmentExists {
            name: "Sakura".to_string(),
        };
        assert_eq!(exists.to_string(), "Apartment 'Sakura' already exists");
    }
}
