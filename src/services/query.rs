//! Query service: read-only operations over ledger snapshots
//!
//! Summary aggregation over a date window, case-insensitive keyword search,
//! and exact-amount filtering. Every operation reads one fresh snapshot and
//! never writes; an absent store is simply zero records.

use std::sync::Arc;

use chrono::{Duration, Local, NaiveDate};

use crate::error::{LedgerError, LedgerResult};
use crate::models::{IdentifiedRecord, Money, Record, RecordKind};
use crate::storage::Storage;

/// The time window a summary is evaluated over
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryWindow {
    /// Every record, dated or not
    All,
    /// Records dated within `[today - days, today]` inclusive;
    /// dateless records are excluded
    DaysBack(u32),
}

impl SummaryWindow {
    /// Parse a window value from client input
    ///
    /// "all" (any case) selects everything; a non-negative integer selects
    /// that many days back. Anything else falls back to `default_days`; the
    /// fallback is logged and visible in the resolved date range of the
    /// result, never a failed query.
    pub fn parse(raw: &str, default_days: u32) -> Self {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case("all") {
            return Self::All;
        }
        match trimmed.parse::<u32>() {
            Ok(days) => Self::DaysBack(days),
            Err(_) => {
                tracing::warn!(window = raw, default_days, "malformed summary window, using default");
                Self::DaysBack(default_days)
            }
        }
    }
}

/// Aggregated totals and the records they were computed from
#[derive(Debug, Clone)]
pub struct Summary {
    /// The resolved date range; `None` means every record was considered
    pub range: Option<(NaiveDate, NaiveDate)>,
    /// Included records, store order
    pub entries: Vec<Record>,
    pub total_income: Money,
    pub total_expense: Money,
}

impl Summary {
    /// Net income in cents: income minus expense, sign of the dominant side
    pub fn net_cents(&self) -> i64 {
        self.total_income.cents() - self.total_expense.cents()
    }
}

/// Service for read-only ledger queries
pub struct QueryService {
    storage: Arc<Storage>,
}

impl QueryService {
    /// Create a new query service
    pub fn new(storage: Arc<Storage>) -> Self {
        Self { storage }
    }

    /// Summarize the ledger over a window ending today
    pub fn summary(&self, window: SummaryWindow) -> LedgerResult<Summary> {
        self.summary_as_of(window, Local::now().date_naive())
    }

    /// Summarize the ledger over a window ending at an explicit date
    ///
    /// Split out from [`summary`](Self::summary) so callers and tests can
    /// evaluate deterministically.
    pub fn summary_as_of(&self, window: SummaryWindow, today: NaiveDate) -> LedgerResult<Summary> {
        let snapshot = self.storage.ledger.snapshot()?;

        let range = match window {
            SummaryWindow::All => None,
            SummaryWindow::DaysBack(days) => Some((today - Duration::days(days as i64), today)),
        };

        let mut entries = Vec::new();
        let mut total_income = Money::zero();
        let mut total_expense = Money::zero();

        for identified in snapshot.records() {
            let record = identified.record;

            if let Some((start, end)) = range {
                match record.date {
                    Some(date) if date >= start && date <= end => {}
                    // Dateless records can't be placed in a window
                    _ => continue,
                }
            }

            match record.kind {
                RecordKind::Income => total_income += record.amount,
                RecordKind::Expense => total_expense += record.amount,
            }
            entries.push(record);
        }

        tracing::debug!(
            included = entries.len(),
            income_cents = total_income.cents(),
            expense_cents = total_expense.cents(),
            "summary computed"
        );

        Ok(Summary {
            range,
            entries,
            total_income,
            total_expense,
        })
    }

    /// Case-insensitive substring search against record descriptions
    ///
    /// An empty or whitespace-only keyword is a client error, not a
    /// zero-result success. Results are in store order.
    pub fn search_by_keyword(&self, keyword: &str) -> LedgerResult<Vec<IdentifiedRecord>> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Err(LedgerError::EmptyQuery);
        }

        let needle = keyword.to_lowercase();
        let snapshot = self.storage.ledger.snapshot()?;

        Ok(snapshot
            .records()
            .filter(|r| r.record.description.to_lowercase().contains(&needle))
            .collect())
    }

    /// Exact-amount filter
    ///
    /// Equality is exact over cents: "10" and "10.00" match the same
    /// records, amounts differing at cent granularity never match.
    pub fn filter_by_amount(&self, amount: &str) -> LedgerResult<Vec<IdentifiedRecord>> {
        let amount =
            Money::parse(amount).map_err(|_| LedgerError::InvalidAmount(amount.to_string()))?;

        let snapshot = self.storage.ledger.snapshot()?;

        Ok(snapshot
            .records()
            .filter(|r| r.record.amount == amount)
            .collect())
    }
}
