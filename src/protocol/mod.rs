//! Request/reply protocol layer
//!
//! Command envelopes, structured responses, and the router that dispatches
//! each envelope to the endpoint owning its command.

mod envelope;
mod router;

pub use envelope::{Request, Response};
pub use router::{DeleteEndpoint, EditEndpoint, Router, SearchEndpoint, SummaryEndpoint};
