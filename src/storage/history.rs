//! The history log: append-only record of edits keyed by identifier
//!
//! Persisted as a single JSON document mapping identifier → ordered list of
//! entries (insertion order = chronological order). The log is independent
//! state: no cross-referential integrity with the ledger file is enforced
//! beyond the identifier convention.

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::error::{LedgerError, LedgerResult};
use crate::models::{HistoryEntry, RecordId};

use super::file_io::{read_json, write_json_atomic};

/// File-backed edit-history log
pub struct HistoryLog {
    path: PathBuf,
}

impl HistoryLog {
    /// Create a log over the given backing file
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Load the full mapping; an absent file is an empty log
    pub fn read_all(&self) -> LedgerResult<BTreeMap<String, Vec<HistoryEntry>>> {
        read_json(&self.path).map_err(|e| LedgerError::History(e.to_string()))
    }

    /// The entries for one identifier, oldest first; empty when none exist
    pub fn entries_for(&self, id: RecordId) -> LedgerResult<Vec<HistoryEntry>> {
        let mut all = self.read_all()?;
        Ok(all.remove(&id.to_string()).unwrap_or_default())
    }

    /// Append one entry under an identifier
    ///
    /// Earlier entries are never rewritten or pruned; the whole document is
    /// re-serialized with the new entry in place.
    pub fn append(&self, id: RecordId, entry: HistoryEntry) -> LedgerResult<()> {
        let mut all = self.read_all()?;
        all.entry(id.to_string()).or_default().push(entry);
        write_json_atomic(&self.path, &all).map_err(|e| LedgerError::History(e.to_string()))
    }

    /// The backing file path
    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}
