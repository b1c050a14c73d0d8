//! Library surface of the formatter service, exposed for integration
//! tests.

pub mod config;
pub mod pipeline;

pub use config::FormatterConfig;
pub use pipeline::{Pipeline, RunSummary, UnitOutcome};
