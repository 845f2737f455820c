//! Core data models for tallybook
//!
//! This module contains the data structures of the ledger domain: records,
//! amounts, position-derived identifiers, and edit-history entries.

pub mod history;
pub mod money;
pub mod record;
pub mod record_id;

pub use history::HistoryEntry;
pub use money::{Money, MoneyParseError};
pub use record::{IdentifiedRecord, Record, RecordKind, RecordPatch};
pub use record_id::RecordId;
