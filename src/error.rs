//! Custom error types for tallybook
//!
//! This module defines the error hierarchy for the application using thiserror
//! for ergonomic error definitions. Every error is returned to the caller as a
//! structured result; nothing here is allowed to escape a service boundary as
//! a panic.

use thiserror::Error;

/// The main error type for tallybook operations
#[derive(Error, Debug)]
pub enum LedgerError {
    /// The backing store exists but could not be read
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// A full rewrite of the store failed; the previous on-disk state is intact
    #[error("Store write failed: {0}")]
    StoreWriteFailed(String),

    /// The identifier is not a positive number
    #[error("Invalid transaction ID: {0}")]
    InvalidIdentifier(String),

    /// The identifier is numeric but exceeds the current store length
    #[error("Transaction ID {id} not found (out of range)")]
    OutOfRange { id: String },

    /// No record exists for the request (e.g. mutation against an absent store)
    #[error("Transaction not found: {0}")]
    NotFound(String),

    /// The stored row does not have the minimum required fields
    #[error("Transaction {0} has invalid format")]
    MalformedRecord(String),

    /// The supplied amount is not a valid non-negative decimal
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// A search was requested with no keyword
    #[error("No keyword provided")]
    EmptyQuery,

    /// The store changed between snapshot and commit
    #[error("Store was modified concurrently; retry with a fresh lookup")]
    ConcurrentModification,

    /// History log read/write errors
    #[error("History error: {0}")]
    History(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors outside the store itself
    #[error("I/O error: {0}")]
    Io(String),
}

impl LedgerError {
    /// Check if this is an addressing failure (any of the three kinds)
    pub fn is_addressing(&self) -> bool {
        matches!(
            self,
            Self::InvalidIdentifier(_) | Self::OutOfRange { .. } | Self::NotFound(_)
        )
    }

    /// Check if this is a client input error rather than a store failure
    pub fn is_client_error(&self) -> bool {
        self.is_addressing()
            || matches!(
                self,
                Self::InvalidAmount(_) | Self::EmptyQuery | Self::MalformedRecord(_)
            )
    }
}

impl From<std::io::Error> for LedgerError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        Self::History(err.to_string())
    }
}

/// Result type alias for tallybook operations
pub type LedgerResult<T> = Result<T, LedgerError>;
