//! Position-derived record identifiers
//!
//! A `RecordId` is the externally-visible label for a stored record: the
//! record's ordinal position plus one, displayed as a zero-padded number
//! ("001" for position 0). The identifier is derived, never stored.
//!
//! Identifiers are only valid for the lifetime of one store snapshot. A
//! delete shifts every identifier after the deleted position down by one, so
//! callers must never retain a `RecordId` across a mutating call; the store's
//! version check (see `storage::ledger`) turns stale uses into
//! `ConcurrentModification` failures instead of silent retargeting.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::LedgerError;

/// Externally-visible, position-derived record identifier (1-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct RecordId(u32);

impl RecordId {
    /// Derive the identifier for a 0-based store position
    pub fn from_position(position: usize) -> Self {
        Self(position as u32 + 1)
    }

    /// Parse an identifier from client input
    ///
    /// Accepts "001", "01", "1": any positive integer, with or without
    /// padding. Fails with `InvalidIdentifier` for non-numeric input or zero.
    pub fn parse(s: &str) -> Result<Self, LedgerError> {
        let trimmed = s.trim();
        let value: u32 = trimmed
            .parse()
            .map_err(|_| LedgerError::InvalidIdentifier(s.to_string()))?;
        if value == 0 {
            return Err(LedgerError::InvalidIdentifier(s.to_string()));
        }
        Ok(Self(value))
    }

    /// Resolve to a 0-based position within a store of `store_len` records
    ///
    /// Valid iff `1 <= value <= store_len`; fails with `OutOfRange`
    /// otherwise. The bound is checked against the length of the snapshot in
    /// hand, which is the only state an identifier is meaningful against.
    pub fn position(&self, store_len: usize) -> Result<usize, LedgerError> {
        let value = self.0 as usize;
        if value > store_len {
            return Err(LedgerError::OutOfRange {
                id: self.to_string(),
            });
        }
        Ok(value - 1)
    }

    /// The raw 1-based numeric value
    pub fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:03}", self.0)
    }
}

impl From<RecordId> for String {
    fn from(id: RecordId) -> Self {
        id.to_string()
    }
}

impl TryFrom<String> for RecordId {
    type Error = LedgerError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}
