//! Service layer for tallybook
//!
//! Business logic over the storage layer: read-only queries and the
//! mutation cycle (edit, two-phase delete, history side effects).

pub mod mutation;
pub mod query;

pub use mutation::MutationService;
pub use query::{QueryService, Summary, SummaryWindow};
