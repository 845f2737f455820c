//! Terminal display formatting

pub mod report;

pub use report::render_summary;
