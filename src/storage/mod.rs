//! Storage layer for tallybook
//!
//! The ledger file and the history log are independent persisted state, each
//! exclusively owned by its component here. Nothing else touches the backing
//! files directly.

pub mod file_io;
pub mod history;
pub mod ledger;

pub use file_io::{read_json, write_atomic, write_json_atomic};
pub use history::HistoryLog;
pub use ledger::{LedgerRow, LedgerSnapshot, LedgerStore};

use crate::config::paths::TallyPaths;
use crate::error::LedgerError;

/// Storage coordinator holding the record store and the history log
pub struct Storage {
    paths: TallyPaths,
    pub ledger: LedgerStore,
    pub history: HistoryLog,
}

impl Storage {
    /// Create a new Storage instance, ensuring directories exist
    pub fn new(paths: TallyPaths) -> Result<Self, LedgerError> {
        paths.ensure_directories()?;

        Ok(Self {
            ledger: LedgerStore::new(paths.transactions_file()),
            history: HistoryLog::new(paths.history_file()),
            paths,
        })
    }

    /// Get the paths configuration
    pub fn paths(&self) -> &TallyPaths {
        &self.paths
    }
}
