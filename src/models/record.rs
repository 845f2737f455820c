//! Ledger record model
//!
//! A record is one row of the ledger: an income or expense with a
//! description, a non-negative amount, and an optional calendar date. Records
//! are stored in insertion order; that order is the only persisted order and
//! the basis of record addressing (see `record_id`).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::money::Money;
use super::record_id::RecordId;

/// The direction of a ledger record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Income,
    Expense,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Income => write!(f, "income"),
            Self::Expense => write!(f, "expense"),
        }
    }
}

impl FromStr for RecordKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            _ => Err(()),
        }
    }
}

/// A single ledger record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Income or expense
    #[serde(rename = "type")]
    pub kind: RecordKind,

    /// Free-text description
    pub description: String,

    /// Non-negative amount; the kind carries the sign
    pub amount: Money,

    /// Calendar date, if one was recorded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}

impl Record {
    /// Create a new record
    pub fn new(kind: RecordKind, description: impl Into<String>, amount: Money) -> Self {
        Self {
            kind,
            description: description.into(),
            amount,
            date: None,
        }
    }

    /// Create a new record with a date
    pub fn with_date(
        kind: RecordKind,
        description: impl Into<String>,
        amount: Money,
        date: NaiveDate,
    ) -> Self {
        Self {
            kind,
            description: description.into(),
            amount,
            date: Some(date),
        }
    }

    /// Apply a partial update, overwriting each supplied field
    pub fn apply(&mut self, patch: &RecordPatch) {
        if let Some(kind) = patch.kind {
            self.kind = kind;
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(amount) = patch.amount {
            self.amount = amount;
        }
        if let Some(date) = patch.date {
            self.date = Some(date);
        }
    }
}

/// A partial field-update set for editing a record
///
/// The identifier itself is never part of a patch; it addresses the record
/// but is not a mutable field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordPatch {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<RecordKind>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Money>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}

impl RecordPatch {
    /// Check whether the patch updates no fields at all
    pub fn is_empty(&self) -> bool {
        self.kind.is_none()
            && self.description.is_none()
            && self.amount.is_none()
            && self.date.is_none()
    }
}

/// A record paired with the identifier it resolved to in one snapshot
///
/// This is the query-result shape: the identifier is only meaningful against
/// the snapshot it was derived from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentifiedRecord {
    pub id: RecordId,

    #[serde(flatten)]
    pub record: Record,
}
