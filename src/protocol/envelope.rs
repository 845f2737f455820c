//! Command and response envelopes
//!
//! Requests are flat JSON objects with a `command` discriminant plus
//! command-specific fields; responses always carry `success` and whichever
//! result fields the command produces. Unknown or missing fields never
//! crash an endpoint; they surface as failure responses.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::LedgerError;
use crate::models::{HistoryEntry, IdentifiedRecord, Record, RecordPatch};

/// An inbound command envelope
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Request {
    pub command: String,

    /// Target record identifier (edit, history, delete)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Partial field-update set (edit)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<RecordPatch>,

    /// Search keyword (search_keyword)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,

    /// Amount to filter on; accepted as string or number (filter_amount)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Value>,

    /// Summary window: "all" or integer days back (summary)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window: Option<String>,

    /// Second-phase delete flag
    #[serde(default)]
    pub confirm: bool,
}

impl Request {
    pub fn summary(window: impl Into<String>) -> Self {
        Self {
            command: "summary".into(),
            window: Some(window.into()),
            ..Default::default()
        }
    }

    pub fn edit(id: impl Into<String>, data: RecordPatch) -> Self {
        Self {
            command: "edit".into(),
            id: Some(id.into()),
            data: Some(data),
            ..Default::default()
        }
    }

    pub fn history(id: impl Into<String>) -> Self {
        Self {
            command: "history".into(),
            id: Some(id.into()),
            ..Default::default()
        }
    }

    pub fn delete(id: impl Into<String>, confirm: bool) -> Self {
        Self {
            command: "delete".into(),
            id: Some(id.into()),
            confirm,
            ..Default::default()
        }
    }

    pub fn search_keyword(keyword: impl Into<String>) -> Self {
        Self {
            command: "search_keyword".into(),
            keyword: Some(keyword.into()),
            ..Default::default()
        }
    }

    pub fn filter_amount(amount: impl Into<String>) -> Self {
        Self {
            command: "filter_amount".into(),
            amount: Some(Value::String(amount.into())),
            ..Default::default()
        }
    }

    pub fn end() -> Self {
        Self {
            command: "end".into(),
            ..Default::default()
        }
    }
}

/// A structured reply envelope
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Response {
    pub success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Rendered report text (summary)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report: Option<String>,

    /// Set when a delete needs a confirming second request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub require_confirmation: Option<bool>,

    /// The record a proposed delete would remove
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction: Option<Record>,

    /// Result count (search_keyword, filter_amount)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,

    /// Matching records (search_keyword, filter_amount)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<IdentifiedRecord>>,

    /// Edit history (history)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history: Option<Vec<HistoryEntry>>,
}

impl Response {
    /// A bare success
    pub fn ok() -> Self {
        Self {
            success: true,
            ..Default::default()
        }
    }

    /// A success with a message
    pub fn ok_message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            ..Default::default()
        }
    }

    /// A failure with a message
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            ..Default::default()
        }
    }

    /// A failure carrying a service error's message
    pub fn from_error(err: &LedgerError) -> Self {
        Self::failure(err.to_string())
    }

    pub fn with_report(mut self, report: String) -> Self {
        self.report = Some(report);
        self
    }

    pub fn with_results(mut self, results: Vec<IdentifiedRecord>) -> Self {
        self.count = Some(results.len());
        self.results = Some(results);
        self
    }

    pub fn with_history(mut self, history: Vec<HistoryEntry>) -> Self {
        self.history = Some(history);
        self
    }

    pub fn confirmation_required(record: Record) -> Self {
        Self {
            success: true,
            require_confirmation: Some(true),
            transaction: Some(record),
            ..Default::default()
        }
    }
}
