//! Edit-history entry model
//!
//! Every successful edit appends one `HistoryEntry` to the history log,
//! keyed by the identifier the edit resolved. Entries capture the pre-edit
//! record and the applied update set; they are never mutated or pruned.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::record::{Record, RecordPatch};

/// A single edit-history entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// When the edit was applied (UTC)
    pub timestamp: DateTime<Utc>,

    /// Full snapshot of the record before the edit
    pub original: Record,

    /// The partial field-update set that was applied
    pub updated: RecordPatch,
}

impl HistoryEntry {
    /// Create an entry for an edit applied now
    pub fn new(original: Record, updated: RecordPatch) -> Self {
        Self {
            timestamp: Utc::now(),
            original,
            updated,
        }
    }
}
