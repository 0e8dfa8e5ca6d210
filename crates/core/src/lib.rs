//! StockBrief Core - Domain entities, services, and traits.
//!
//! This crate contains the pipeline that turns stored market data into
//! verified answers. It is database-agnostic and defines traits that are
//! implemented by the `storage-sqlite` crate; the completion-backed analyzer
//! lives in the `ai` crate behind [`analysis::AnalyzerTrait`].

pub mod analysis;
pub mod answers;
pub mod constants;
pub mod errors;
pub mod pipeline;
pub mod questions;
pub mod snapshots;
pub mod stocks;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
