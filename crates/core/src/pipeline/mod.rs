//! Pipeline module - drives every symbol from fetch to verified answers.

mod orchestrator;
mod pipeline_model;


pub use orchestrator::PipelineOrchestrator;
pub use pipeline_model::{PipelineConfig, RunReport, SymbolOutcome, SymbolStatus};
