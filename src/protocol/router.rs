//! The four service endpoints and the request router
//!
//! Each endpoint mirrors one of the independently-addressable services:
//! summary, edit (+history), delete, and search/filter. An endpoint handles
//! one request at a time to completion (`&mut self`); endpoints are
//! otherwise independent and share nothing but the storage value, whose
//! version check arbitrates conflicting mutations. Every error becomes a
//! failure response; an endpoint keeps serving after any single-request
//! failure.

use std::sync::Arc;

use serde_json::Value;

use crate::config::Settings;
use crate::display::render_summary;
use crate::error::LedgerError;
use crate::services::{MutationService, QueryService, SummaryWindow};
use crate::storage::Storage;

use super::envelope::{Request, Response};

/// Endpoint serving summary reports
pub struct SummaryEndpoint {
    query: QueryService,
    currency_symbol: String,
    default_window_days: u32,
}

impl SummaryEndpoint {
    pub fn new(storage: Arc<Storage>, settings: &Settings) -> Self {
        Self {
            query: QueryService::new(storage),
            currency_symbol: settings.currency_symbol.clone(),
            default_window_days: settings.default_window_days,
        }
    }

    pub fn handle(&mut self, request: &Request) -> Response {
        let raw_window = request.window.as_deref().unwrap_or("all");
        let window = SummaryWindow::parse(raw_window, self.default_window_days);

        match self.query.summary(window) {
            Ok(summary) => {
                tracing::info!(window = raw_window, included = summary.entries.len(), "summary served");
                Response::ok().with_report(render_summary(&summary, &self.currency_symbol))
            }
            Err(err) => Response::from_error(&err),
        }
    }
}

/// Endpoint serving edits and edit-history lookups
pub struct EditEndpoint {
    mutation: MutationService,
}

impl EditEndpoint {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self {
            mutation: MutationService::new(storage),
        }
    }

    pub fn handle(&mut self, request: &Request) -> Response {
        let Some(id) = request.id.as_deref() else {
            return Response::failure("Missing transaction ID");
        };

        match request.command.as_str() {
            "edit" => {
                let Some(data) = request.data.clone() else {
                    return Response::failure("Missing update data");
                };
                match self.mutation.edit(id, data) {
                    Ok(()) => Response::ok_message("Transaction updated successfully!"),
                    Err(err) => Response::from_error(&err),
                }
            }
            _ => match self.mutation.history(id) {
                Ok(entries) => {
                    let mut response = Response::ok().with_history(entries);
                    if response.history.as_ref().is_some_and(|h| h.is_empty()) {
                        response.message = Some("No edit history found".into());
                    }
                    response
                }
                Err(err) => Response::from_error(&err),
            },
        }
    }
}

/// Endpoint serving two-phase deletes
pub struct DeleteEndpoint {
    mutation: MutationService,
}

impl DeleteEndpoint {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self {
            mutation: MutationService::new(storage),
        }
    }

    pub fn handle(&mut self, request: &Request) -> Response {
        let Some(id) = request.id.as_deref() else {
            return Response::failure("Missing transaction ID");
        };

        if !request.confirm {
            match self.mutation.delete_propose(id) {
                Ok(record) => Response::confirmation_required(record),
                Err(err) => Response::from_error(&err),
            }
        } else {
            match self.mutation.delete_confirm(id) {
                Ok(()) => Response::ok_message(format!("Transaction {} deleted successfully", id)),
                Err(err) => Response::from_error(&err),
            }
        }
    }
}

/// Endpoint serving keyword search and exact-amount filtering
pub struct SearchEndpoint {
    query: QueryService,
}

impl SearchEndpoint {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self {
            query: QueryService::new(storage),
        }
    }

    pub fn handle(&mut self, request: &Request) -> Response {
        let result = match request.command.as_str() {
            "search_keyword" => {
                let keyword = request.keyword.as_deref().unwrap_or("");
                self.query.search_by_keyword(keyword)
            }
            _ => match amount_text(request.amount.as_ref()) {
                Some(amount) => self.query.filter_by_amount(&amount),
                None => Err(LedgerError::InvalidAmount("missing".into())),
            },
        };

        match result {
            Ok(results) => {
                tracing::info!(command = %request.command, count = results.len(), "query served");
                Response::ok().with_results(results)
            }
            Err(err) => Response::from_error(&err),
        }
    }
}

/// Normalize the amount field, which arrives as a string or a bare number
fn amount_text(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

/// Dispatches command envelopes to the endpoint that owns them
pub struct Router {
    summary: SummaryEndpoint,
    edit: EditEndpoint,
    delete: DeleteEndpoint,
    search: SearchEndpoint,
    finished: bool,
}

impl Router {
    /// Build the four endpoints over a shared storage value
    pub fn new(storage: Arc<Storage>, settings: &Settings) -> Self {
        Self {
            summary: SummaryEndpoint::new(Arc::clone(&storage), settings),
            edit: EditEndpoint::new(Arc::clone(&storage)),
            delete: DeleteEndpoint::new(Arc::clone(&storage)),
            search: SearchEndpoint::new(storage),
            finished: false,
        }
    }

    /// Route one envelope and return its structured result
    pub fn route(&mut self, request: &Request) -> Response {
        match request.command.as_str() {
            "summary" => self.summary.handle(request),
            "edit" | "history" => self.edit.handle(request),
            "delete" => self.delete.handle(request),
            "search_keyword" | "filter_amount" => self.search.handle(request),
            "end" => {
                self.finished = true;
                tracing::info!("shutdown requested");
                Response::ok_message("Ledger services shutting down")
            }
            other => {
                tracing::warn!(command = other, "unknown command");
                Response::failure("Unknown command")
            }
        }
    }

    /// Whether an `end` envelope has been served
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TallyPaths;
    use crate::models::{Money, Record, RecordKind};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn seeded_router() -> (TempDir, Router) {
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

        let router = Router::new(storage, &Settings::default());
        (temp_dir, router)
    }

    #[test]
    fn test_unknown_command() {
        let (_temp, mut router) = seeded_router();
        let response = router.route(&Request {
            command: "explode".into(),
            ..Default::default()
        });
        assert!(!response.success);
        assert_eq!(response.message.as_deref(), Some("Unknown command"));
        assert!(!router.is_finished());
    }

    #[test]
    fn test_end_acknowledges_and_finishes() {
        let (_temp, mut router) = seeded_router();
        let response = router.route(&Request::end());
        assert!(response.success);
        assert!(router.is_finished());
    }

    #[test]
    fn test_summary_returns_report() {
        let (_temp, mut router) = seeded_router();
        let response = router.route(&Request::summary("all"));
        assert!(response.success);
        let report = response.report.unwrap();
        assert!(report.contains("Total Income"));
        assert!(report.contains("$1000.00"));
    }

    #[test]
    fn test_missing_id_is_failure_not_crash() {
        let (_temp, mut router) = seeded_router();
        let response = router.route(&Request {
            command: "delete".into(),
            ..Default::default()
        });
        assert!(!response.success);

        let response = router.route(&Request {
            command: "edit".into(),
            id: Some("001".into()),
            ..Default::default()
        });
        assert!(!response.success);
        assert_eq!(response.message.as_deref(), Some("Missing update data"));
    }

    #[test]
    fn test_endpoint_serves_after_failure() {
        let (_temp, mut router) = seeded_router();
        let bad = router.route(&Request::search_keyword(""));
        assert!(!bad.success);

        let good = router.route(&Request::search_keyword("rent"));
        assert!(good.success);
        assert_eq!(good.count, Some(1));
    }

    #[test]
    fn test_filter_amount_number_and_string() {
        let (_temp, mut router) = seeded_router();

        let response = router.route(&Request::filter_amount("500"));
        assert_eq!(response.count, Some(1));

        let response = router.route(&Request {
            command: "filter_amount".into(),
            amount: Some(serde_json::json!(500)),
            ..Default::default()
        });
        assert_eq!(response.count, Some(1));

        let response = router.route(&Request {
            command: "filter_amount".into(),
            ..Default::default()
        });
        assert!(!response.success);
    }

    #[test]
    fn test_history_empty_has_notice() {
        let (_temp, mut router) = seeded_router();
        let response = router.route(&Request::history("001"));
        assert!(response.success);
        assert!(response.history.unwrap().is_empty());
        assert_eq!(response.message.as_deref(), Some("No edit history found"));
    }
}
