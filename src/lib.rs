//! roundup-rs - multi-agent task roundup over compliance, tracker and scan reports
//!
//! A routing workflow plans which collector agents to run for a query, each
//! collector turns one raw report into structured task items (model-backed
//! with a deterministic fallback), items are merged into a durable CSV store,
//! and a summarizer closes the run.

pub mod config;
pub mod error;
pub mod llm;
pub mod sources;
pub mod store;
pub mod workflow;

pub use error::RoundupError;
pub use workflow::graph::Workflow;
