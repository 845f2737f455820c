//! The ledger store: the single owner of the record file
//!
//! Records are persisted as plain delimited rows (`kind,description,amount`
//! with an optional fourth date field) in insertion order. Every read is a
//! full load into a [`LedgerSnapshot`]; every mutation is a full rewrite
//! committed atomically against the version the caller's snapshot was taken
//! at. A commit whose base version no longer matches fails with
//! `ConcurrentModification`, so two mutation cycles based on the same
//! snapshot cannot both succeed.
//!
//! Rows that cannot be interpreted as a record are preserved verbatim: they
//! occupy a position (and thus consume an identifier), survive rewrites
//! untouched, and are reported as malformed when targeted by a mutation.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use chrono::NaiveDate;

use crate::error::{LedgerError, LedgerResult};
use crate::models::{IdentifiedRecord, Money, Record, RecordId};

use super::file_io::write_atomic;

/// One stored row: a parsed record, or the raw fields of a row that
/// couldn't be interpreted as one
#[derive(Debug, Clone, PartialEq)]
pub enum LedgerRow {
    Valid(Record),
    Malformed(Vec<String>),
}

impl LedgerRow {
    /// Interpret raw CSV fields
    ///
    /// A row needs at least kind, description, and a non-negative amount.
    /// An unparseable date field degrades to "no date" rather than
    /// poisoning the whole row.
    fn from_fields(fields: Vec<String>) -> Self {
        if fields.len() < 3 {
            return Self::Malformed(fields);
        }

        let kind = match fields[0].parse() {
            Ok(kind) => kind,
            Err(()) => return Self::Malformed(fields),
        };
        let amount = match Money::parse(&fields[2]) {
            Ok(amount) => amount,
            Err(_) => return Self::Malformed(fields),
        };
        let date = fields
            .get(3)
            .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok());

        Self::Valid(Record {
            kind,
            description: fields[1].clone(),
            amount,
            date,
        })
    }

    /// Serialize back to CSV fields; malformed rows round-trip verbatim
    fn to_fields(&self) -> Vec<String> {
        match self {
            Self::Valid(record) => {
                let mut fields = vec![
                    record.kind.to_string(),
                    record.description.clone(),
                    record.amount.to_decimal_string(),
                ];
                if let Some(date) = record.date {
                    fields.push(date.format("%Y-%m-%d").to_string());
                }
                fields
            }
            Self::Malformed(fields) => fields.clone(),
        }
    }

    /// The parsed record, if this row has one
    pub fn record(&self) -> Option<&Record> {
        match self {
            Self::Valid(record) => Some(record),
            Self::Malformed(_) => None,
        }
    }
}

/// A full view of the store at one version
///
/// Identifiers resolved against this snapshot are meaningless against any
/// other; a mutation built from it must present its version at commit time.
#[derive(Debug, Clone)]
pub struct LedgerSnapshot {
    rows: Vec<LedgerRow>,
    version: u64,
    existed: bool,
}

impl LedgerSnapshot {
    /// The version this snapshot was taken at
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Whether the backing file existed when the snapshot was taken
    ///
    /// Absence is a valid empty-store state for reads; mutations report it
    /// as "not found" instead.
    pub fn existed(&self) -> bool {
        self.existed
    }

    /// Number of rows, malformed rows included (they consume identifiers)
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[LedgerRow] {
        &self.rows
    }

    /// Consume the snapshot, yielding its rows for mutation
    pub fn into_rows(self) -> Vec<LedgerRow> {
        self.rows
    }

    /// Resolve an identifier to its position and row within this snapshot
    pub fn resolve(&self, id: RecordId) -> LedgerResult<(usize, &LedgerRow)> {
        let position = id.position(self.len())?;
        Ok((position, &self.rows[position]))
    }

    /// All valid records paired with their snapshot identifiers, store order
    pub fn records(&self) -> impl Iterator<Item = IdentifiedRecord> + '_ {
        self.rows.iter().enumerate().filter_map(|(position, row)| {
            row.record().map(|record| IdentifiedRecord {
                id: RecordId::from_position(position),
                record: record.clone(),
            })
        })
    }
}

/// File-backed record store with optimistic versioning
///
/// The version counter lives behind a mutex guarding every read of the file
/// and every version-check-plus-rewrite, which makes a load→mutate→commit
/// cycle atomic with respect to other endpoints sharing this store value.
pub struct LedgerStore {
    path: PathBuf,
    version: Mutex<u64>,
}

impl LedgerStore {
    /// Create a store over the given backing file
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            version: Mutex::new(0),
        }
    }

    /// Load all rows into a snapshot
    ///
    /// An absent backing file is a valid empty store, not an error; an
    /// unreadable one fails with `StoreUnavailable`.
    pub fn snapshot(&self) -> LedgerResult<LedgerSnapshot> {
        let version = self
            .version
            .lock()
            .map_err(|e| LedgerError::StoreUnavailable(format!("store lock poisoned: {}", e)))?;

        if !self.path.exists() {
            return Ok(LedgerSnapshot {
                rows: Vec::new(),
                version: *version,
                existed: false,
            });
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(&self.path)
            .map_err(|e| LedgerError::StoreUnavailable(e.to_string()))?;

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result.map_err(|e| LedgerError::StoreUnavailable(e.to_string()))?;
            let fields: Vec<String> = record.iter().map(str::to_string).collect();
            rows.push(LedgerRow::from_fields(fields));
        }

        Ok(LedgerSnapshot {
            rows,
            version: *version,
            existed: true,
        })
    }

    /// Append one record to the backing file
    pub fn append(&self, record: &Record) -> LedgerResult<()> {
        let mut version = self
            .version
            .lock()
            .map_err(|e| LedgerError::StoreWriteFailed(format!("store lock poisoned: {}", e)))?;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| LedgerError::StoreWriteFailed(e.to_string()))?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| LedgerError::StoreWriteFailed(e.to_string()))?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_writer(file);

        writer
            .write_record(LedgerRow::Valid(record.clone()).to_fields())
            .map_err(|e| LedgerError::StoreWriteFailed(e.to_string()))?;
        writer
            .flush()
            .map_err(|e| LedgerError::StoreWriteFailed(e.to_string()))?;

        *version += 1;
        Ok(())
    }

    /// Replace the entire sequence, conditional on the caller's base version
    ///
    /// This is a full rewrite serialized to a temporary file and renamed
    /// into place, so a failure leaves the previous on-disk state intact.
    /// Fails with `ConcurrentModification` when the store has moved past
    /// `base_version`; the caller must take a fresh snapshot and re-resolve.
    pub fn commit(&self, rows: Vec<LedgerRow>, base_version: u64) -> LedgerResult<()> {
        let mut version = self
            .version
            .lock()
            .map_err(|e| LedgerError::StoreWriteFailed(format!("store lock poisoned: {}", e)))?;

        if *version != base_version {
            return Err(LedgerError::ConcurrentModification);
        }

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_writer(Vec::new());

        for row in &rows {
            writer
                .write_record(row.to_fields())
                .map_err(|e| LedgerError::StoreWriteFailed(e.to_string()))?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| LedgerError::StoreWriteFailed(e.to_string()))?;

        write_atomic(&self.path, &bytes)
            .map_err(|e| LedgerError::StoreWriteFailed(e.to_string()))?;

        *version += 1;
        Ok(())
    }

    /// The backing file path
    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RecordKind;
    use tempfile::TempDir;

    fn test_store() -> (TempDir, LedgerStore) {
        let temp_dir = TempDir::new().unwrap();
        let store = LedgerStore::new(temp_dir.path().join("transactions.csv"));
        (temp_dir, store)
    }

    fn salary() -> Record {
        Record::with_date(
            RecordKind::Income,
            "salary",
            Money::from_cents(100000),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        )
    }

    fn rent() -> Record {
        Record::with_date(
            RecordKind::Expense,
            "rent",
            Money::from_cents(50000),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        )
    }

    #[test]
    fn test_absent_store_is_empty_not_error() {
        let (_temp, store) = test_store();
        let snapshot = store.snapshot().unwrap();
        assert!(snapshot.is_empty());
        assert!(!snapshot.existed());
    }

    #[test]
    fn test_append_and_snapshot() {
        let (_temp, store) = test_store();
        store.append(&salary()).unwrap();
        store.append(&rent()).unwrap();

        let snapshot = store.snapshot().unwrap();
        assert!(snapshot.existed());
        assert_eq!(snapshot.len(), 2);

        let records: Vec<_> = snapshot.records().collect();
        assert_eq!(records[0].id.to_string(), "001");
        assert_eq!(records[0].record.description, "salary");
        assert_eq!(records[1].id.to_string(), "002");
        assert_eq!(records[1].record.amount.cents(), 50000);
    }

    #[test]
    fn test_commit_rewrites_whole_sequence() {
        let (_temp, store) = test_store();
        store.append(&salary()).unwrap();
        store.append(&rent()).unwrap();

        let snapshot = store.snapshot().unwrap();
        let version = snapshot.version();
        let mut rows = snapshot.into_rows();
        rows.remove(0);
        store.commit(rows, version).unwrap();

        let after = store.snapshot().unwrap();
        assert_eq!(after.len(), 1);
        let records: Vec<_> = after.records().collect();
        assert_eq!(records[0].id.to_string(), "001");
        assert_eq!(records[0].record.description, "rent");
    }

    #[test]
    fn test_commit_with_stale_version_fails() {
        let (_temp, store) = test_store();
        store.append(&salary()).unwrap();
        store.append(&rent()).unwrap();

        // Two cycles read the same snapshot
        let first = store.snapshot().unwrap();
        let second = store.snapshot().unwrap();

        let version = first.version();
        let mut rows = first.into_rows();
        rows.remove(0);
        store.commit(rows, version).unwrap();

        let version = second.version();
        let mut rows = second.into_rows();
        rows.remove(1);
        let err = store.commit(rows, version).unwrap_err();
        assert!(matches!(err, LedgerError::ConcurrentModification));

        // The first commit's result is intact
        let after = store.snapshot().unwrap();
        assert_eq!(after.len(), 1);
        assert_eq!(after.records().next().unwrap().record.description, "rent");
    }

    #[test]
    fn test_append_bumps_version() {
        let (_temp, store) = test_store();
        let before = store.snapshot().unwrap();
        store.append(&salary()).unwrap();
        let err = store.commit(Vec::new(), before.version()).unwrap_err();
        assert!(matches!(err, LedgerError::ConcurrentModification));
    }

    #[test]
    fn test_malformed_rows_preserved_and_skipped() {
        let (_temp, store) = test_store();
        std::fs::write(
            store.path(),
            "income,salary,1000.00,2024-01-01\nexpense,rent\nexpense,groceries,62.50\n",
        )
        .unwrap();

        let snapshot = store.snapshot().unwrap();
        assert_eq!(snapshot.len(), 3);

        // The short row consumes an identifier but yields no record
        let records: Vec<_> = snapshot.records().collect();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id.to_string(), "001");
        assert_eq!(records[1].id.to_string(), "003");

        // A rewrite carries the malformed row through verbatim
        let version = snapshot.version();
        store.commit(snapshot.into_rows(), version).unwrap();
        let content = std::fs::read_to_string(store.path()).unwrap();
        assert!(content.contains("expense,rent\n"));
    }

    #[test]
    fn test_unknown_kind_and_bad_amount_are_malformed() {
        let (_temp, store) = test_store();
        std::fs::write(
            store.path(),
            "transfer,savings,50.00\nexpense,rent,lots\nexpense,rent,-5.00\n",
        )
        .unwrap();

        let snapshot = store.snapshot().unwrap();
        assert_eq!(snapshot.len(), 3);
        assert_eq!(snapshot.records().count(), 0);
    }

    #[test]
    fn test_bad_date_degrades_to_none() {
        let (_temp, store) = test_store();
        std::fs::write(store.path(), "expense,rent,500.00,someday\n").unwrap();

        let snapshot = store.snapshot().unwrap();
        let records: Vec<_> = snapshot.records().collect();
        assert_eq!(records.len(), 1);
        assert!(records[0].record.date.is_none());
    }

    #[test]
    fn test_description_with_comma_round_trips() {
        let (_temp, store) = test_store();
        let record = Record::new(
            RecordKind::Expense,
            "dinner, drinks",
            Money::from_cents(7500),
        );
        store.append(&record).unwrap();

        let snapshot = store.snapshot().unwrap();
        let records: Vec<_> = snapshot.records().collect();
        assert_eq!(records[0].record.description, "dinner, drinks");
    }

    #[test]
    fn test_resolve() {
        let (_temp, store) = test_store();
        store.append(&salary()).unwrap();

        let snapshot = store.snapshot().unwrap();
        let (position, row) = snapshot.resolve(RecordId::parse("001").unwrap()).unwrap();
        assert_eq!(position, 0);
        assert_eq!(row.record().unwrap().description, "salary");

        let err = snapshot.resolve(RecordId::parse("002").unwrap()).unwrap_err();
        assert!(matches!(err, LedgerError::OutOfRange { .. }));
    }
}
