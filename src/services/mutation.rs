//! Mutation service: edit and two-phase delete
//!
//! Every mutation is one load→mutate→commit cycle against a fresh snapshot,
//! committed with the snapshot's version so a concurrent change fails with
//! `ConcurrentModification` instead of silently overwriting it.
//!
//! Delete is two-phase: propose returns the record for confirmation without
//! removing it and registers a pending-deletion entry; confirm consumes that
//! entry exactly once and re-validates against the current store state
//! before committing the removal. Edit applies directly and appends to the
//! history log only after the commit succeeded.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{Local, NaiveDate};

use crate::error::{LedgerError, LedgerResult};
use crate::models::{HistoryEntry, Record, RecordId, RecordPatch};
use crate::storage::{LedgerRow, LedgerSnapshot, Storage};

/// A delete that was proposed but not yet confirmed
#[derive(Debug, Clone)]
struct PendingDelete {
    record: Record,
    base_version: u64,
}

/// Service for ledger mutations
pub struct MutationService {
    storage: Arc<Storage>,
    pending: Mutex<HashMap<String, PendingDelete>>,
}

impl MutationService {
    /// Create a new mutation service
    pub fn new(storage: Arc<Storage>) -> Self {
        Self {
            storage,
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Resolve an identifier against a snapshot for mutation
    ///
    /// An absent store is "not found" here (queries treat it as empty, but
    /// there is nothing to mutate); a malformed row at the position is
    /// reported as such rather than acted on.
    fn resolve_record<'a>(
        snapshot: &'a LedgerSnapshot,
        id: RecordId,
    ) -> LedgerResult<(usize, &'a Record)> {
        if !snapshot.existed() {
            return Err(LedgerError::NotFound("no transactions recorded yet".into()));
        }
        let (position, row) = snapshot.resolve(id)?;
        let record = row
            .record()
            .ok_or_else(|| LedgerError::MalformedRecord(id.to_string()))?;
        Ok((position, record))
    }

    /// Phase one of delete: validate and return the record for confirmation
    ///
    /// The record is NOT removed. A pending-deletion entry (record plus the
    /// snapshot version it was proposed against) is registered for the
    /// identifier, replacing any earlier unconsumed proposal for it.
    pub fn delete_propose(&self, raw_id: &str) -> LedgerResult<Record> {
        let id = RecordId::parse(raw_id)?;
        let snapshot = self.storage.ledger.snapshot()?;
        let (_, record) = Self::resolve_record(&snapshot, id)?;
        let record = record.clone();

        self.pending
            .lock()
            .map_err(|e| LedgerError::Io(format!("pending-delete lock poisoned: {}", e)))?
            .insert(
                id.to_string(),
                PendingDelete {
                    record: record.clone(),
                    base_version: snapshot.version(),
                },
            );

        tracing::info!(id = %id, "delete proposed, awaiting confirmation");
        Ok(record)
    }

    /// Phase two of delete: re-validate against current state and commit
    ///
    /// The pending entry for the identifier is consumed whether or not the
    /// delete goes through. If the store moved past the proposal's version,
    /// the identifier may now name a different record, so the confirm fails
    /// with `ConcurrentModification` instead of deleting whatever shifted
    /// into place. A confirm without a prior propose is still served, by
    /// full re-validation against the current snapshot.
    pub fn delete_confirm(&self, raw_id: &str) -> LedgerResult<()> {
        let id = RecordId::parse(raw_id)?;
        let snapshot = self.storage.ledger.snapshot()?;

        let pending = self
            .pending
            .lock()
            .map_err(|e| LedgerError::Io(format!("pending-delete lock poisoned: {}", e)))?
            .remove(&id.to_string());

        if let Some(pending) = &pending {
            if pending.base_version != snapshot.version() {
                tracing::warn!(
                    id = %id,
                    proposed_at = pending.base_version,
                    current = snapshot.version(),
                    "store moved between propose and confirm"
                );
                return Err(LedgerError::ConcurrentModification);
            }
        }

        let (position, record) = Self::resolve_record(&snapshot, id)?;

        // The identifier must still name the record that was proposed
        if let Some(pending) = &pending {
            if pending.record != *record {
                return Err(LedgerError::ConcurrentModification);
            }
        }

        let version = snapshot.version();
        let mut rows = snapshot.into_rows();
        rows.remove(position);
        self.storage.ledger.commit(rows, version)?;

        tracing::info!(id = %id, "transaction deleted");
        Ok(())
    }

    /// Apply a partial field-update to the record at an identifier
    ///
    /// Uses today's date when the update has no date and the record never
    /// had one. See [`edit_as_of`](Self::edit_as_of).
    pub fn edit(&self, raw_id: &str, patch: RecordPatch) -> LedgerResult<()> {
        self.edit_as_of(raw_id, patch, Local::now().date_naive())
    }

    /// Apply a partial field-update, with an explicit "today"
    ///
    /// The identifier is never mutable; position (and thus sequence length)
    /// is preserved. On success a history entry capturing the pre-edit
    /// record and the applied update set is appended, only after the commit,
    /// so history never records an edit that did not durably apply.
    pub fn edit_as_of(&self, raw_id: &str, patch: RecordPatch, today: NaiveDate) -> LedgerResult<()> {
        let id = RecordId::parse(raw_id)?;
        let snapshot = self.storage.ledger.snapshot()?;
        let (position, record) = Self::resolve_record(&snapshot, id)?;

        let original = record.clone();
        let mut updated = original.clone();
        updated.apply(&patch);
        if updated.date.is_none() {
            updated.date = Some(today);
        }

        let version = snapshot.version();
        let mut rows = snapshot.into_rows();
        rows[position] = LedgerRow::Valid(updated);
        self.storage.ledger.commit(rows, version)?;

        self.storage
            .history
            .append(id, HistoryEntry::new(original, patch))?;

        tracing::info!(id = %id, "transaction updated");
        Ok(())
    }

    /// The edit history for an identifier, oldest first
    ///
    /// An identifier with no recorded edits yields an empty list, not an
    /// error. History is independent state and carries no liveness claim
    /// about the record itself.
    pub fn history(&self, raw_id: &str) -> LedgerResult<Vec<HistoryEntry>> {
        let id = RecordId::parse(raw_id)?;
        self.storage.history.entries_for(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TallyPaths;
    use crate::models::{Money, RecordKind};
    use tempfile::TempDir;

    fn seeded_service() -> (TempDir, Arc<Storage>, MutationService) {
        let temp_dir = TempDir::new().unwrap();
        let paths = TallyPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Arc::new(Storage::new(paths).unwrap());

        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        storage
            .ledger
            .append(&Record::with_date(
                RecordKind::Income,
                "salary",
                Money::from_cents(100000),
                date,
            ))
            .unwrap();
        storage
            .ledger
            .append(&Record::with_date(
                RecordKind::Expense,
                "rent",
                Money::from_cents(50000),
                date,
            ))
            .unwrap();

        let service = MutationService::new(Arc::clone(&storage));
        (temp_dir, storage, service)
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()
    }

    #[test]
    fn test_edit_applies_fields_in_place() {
        let (_temp, storage, service) = seeded_service();

        let patch = RecordPatch {
            amount: Some(Money::from_cents(60000)),
            ..Default::default()
        };
        service.edit_as_of("002", patch, today()).unwrap();

        let snapshot = storage.ledger.snapshot().unwrap();
        assert_eq!(snapshot.len(), 2);
        let records: Vec<_> = snapshot.records().collect();
        assert_eq!(records[1].record.amount.cents(), 60000);
        assert_eq!(records[1].record.description, "rent");
    }

    #[test]
    fn test_edit_appends_history() {
        let (_temp, storage, service) = seeded_service();

        let patch = RecordPatch {
            description: Some("monthly rent".into()),
            ..Default::default()
        };
        service.edit_as_of("002", patch.clone(), today()).unwrap();

        let entries = storage
            .history
            .entries_for(RecordId::parse("002").unwrap())
            .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].original.description, "rent");
        assert_eq!(entries[0].updated, patch);
    }

    #[test]
    fn test_edit_noop_patch_changes_nothing_but_history() {
        let (_temp, storage, service) = seeded_service();

        let before = storage.ledger.snapshot().unwrap();
        service
            .edit_as_of("001", RecordPatch::default(), today())
            .unwrap();
        let after = storage.ledger.snapshot().unwrap();

        assert_eq!(before.rows(), after.rows());
        assert_eq!(service.history("001").unwrap().len(), 1);
    }

    #[test]
    fn test_edit_defaults_missing_date_to_today() {
        let (_temp, storage, service) = seeded_service();
        storage
            .ledger
            .append(&Record::new(
                RecordKind::Expense,
                "groceries",
                Money::from_cents(6250),
            ))
            .unwrap();

        service
            .edit_as_of("003", RecordPatch::default(), today())
            .unwrap();

        let snapshot = storage.ledger.snapshot().unwrap();
        let records: Vec<_> = snapshot.records().collect();
        assert_eq!(records[2].record.date, Some(today()));
    }

    #[test]
    fn test_edit_keeps_existing_date() {
        let (_temp, storage, service) = seeded_service();

        service
            .edit_as_of("001", RecordPatch::default(), today())
            .unwrap();

        let snapshot = storage.ledger.snapshot().unwrap();
        let records: Vec<_> = snapshot.records().collect();
        assert_eq!(
            records[0].record.date,
            Some(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
        );
    }

    #[test]
    fn test_edit_addressing_failures() {
        let (_temp, _storage, service) = seeded_service();

        assert!(matches!(
            service.edit_as_of("abc", RecordPatch::default(), today()),
            Err(LedgerError::InvalidIdentifier(_))
        ));
        assert!(matches!(
            service.edit_as_of("009", RecordPatch::default(), today()),
            Err(LedgerError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_mutation_on_absent_store_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let paths = TallyPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Arc::new(Storage::new(paths).unwrap());
        let service = MutationService::new(storage);

        assert!(matches!(
            service.edit_as_of("001", RecordPatch::default(), today()),
            Err(LedgerError::NotFound(_))
        ));
        assert!(matches!(
            service.delete_propose("001"),
            Err(LedgerError::NotFound(_))
        ));
    }

    #[test]
    fn test_delete_propose_does_not_remove() {
        let (_temp, storage, service) = seeded_service();

        let record = service.delete_propose("001").unwrap();
        assert_eq!(record.description, "salary");
        assert_eq!(storage.ledger.snapshot().unwrap().len(), 2);
    }

    #[test]
    fn test_delete_propose_then_confirm() {
        let (_temp, storage, service) = seeded_service();

        service.delete_propose("001").unwrap();
        service.delete_confirm("001").unwrap();

        let snapshot = storage.ledger.snapshot().unwrap();
        assert_eq!(snapshot.len(), 1);
        // The survivor shifted down to the first identifier
        let records: Vec<_> = snapshot.records().collect();
        assert_eq!(records[0].id.to_string(), "001");
        assert_eq!(records[0].record.description, "rent");
    }

    #[test]
    fn test_confirm_after_concurrent_mutation_fails() {
        let (_temp, _storage, service) = seeded_service();

        // Propose against one snapshot, then the store moves under it
        service.delete_propose("002").unwrap();
        service.delete_propose("001").unwrap();
        service.delete_confirm("001").unwrap();

        // "002" was proposed against the pre-shift store; it must not
        // silently delete whatever now sits at that position
        let err = service.delete_confirm("002").unwrap_err();
        assert!(matches!(err, LedgerError::ConcurrentModification));
    }

    #[test]
    fn test_pre_shift_identifier_fails_after_shrink() {
        let (_temp, _storage, service) = seeded_service();

        service.delete_propose("002").unwrap();
        service.delete_confirm("002").unwrap();

        // A bare confirm with the pre-shift identifier: the store now has a
        // single record, so the position no longer exists
        let err = service.delete_confirm("002").unwrap_err();
        assert!(matches!(err, LedgerError::OutOfRange { .. }));
    }

    #[test]
    fn test_confirm_without_propose_revalidates() {
        let (_temp, storage, service) = seeded_service();

        service.delete_confirm("002").unwrap();
        assert_eq!(storage.ledger.snapshot().unwrap().len(), 1);
    }

    #[test]
    fn test_pending_entry_consumed_once() {
        let (_temp, _storage, service) = seeded_service();

        service.delete_propose("002").unwrap();
        service.delete_confirm("002").unwrap();

        // The second confirm finds no pending entry and re-validates
        // against the shrunken store
        assert!(service.delete_confirm("002").is_err());
    }

    #[test]
    fn test_delete_malformed_record() {
        let (_temp, storage, service) = seeded_service();
        std::fs::write(
            storage.ledger.path(),
            "income,salary,1000.00\nexpense,rent\n",
        )
        .unwrap();

        assert!(matches!(
            service.delete_propose("002"),
            Err(LedgerError::MalformedRecord(_))
        ));
    }

    #[test]
    fn test_history_unknown_id_is_empty() {
        let (_temp, _storage, service) = seeded_service();
        assert!(service.history("001").unwrap().is_empty());
        assert!(matches!(
            service.history("abc"),
            Err(LedgerError::InvalidIdentifier(_))
        ));
    }
}
