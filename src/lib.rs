//! tallybook - Personal-finance ledger served through request/reply endpoints
//!
//! A flat append-only record store (income/expense transactions with a
//! description, a non-negative amount, and an optional date) mutated and
//! queried through four independently-addressable endpoints (summary, edit,
//! delete, search/filter) plus an interactive console client.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `models`: Core data models (records, amounts, identifiers, history)
//! - `storage`: The ledger file and the history log
//! - `services`: Business logic layer (queries and mutations)
//! - `display`: Report rendering
//! - `protocol`: Command envelopes, endpoints, and the router
//! - `client`: The interactive console menu
//!
//! # Consistency model
//!
//! Records are addressed by ordinal position ("001" is the first row), so
//! any delete renumbers everything after it. Every store snapshot carries a
//! version; mutations commit against the version they read, and a commit
//! based on a stale snapshot fails with `ConcurrentModification` rather
//! than silently overwriting a concurrent change.

pub mod client;
pub mod config;
pub mod display;
pub mod error;
pub mod models;
pub mod protocol;
pub mod services;
pub mod storage;

pub use error::{LedgerError, LedgerResult};
