//! Analysis module - the contract between the pipeline and the completion-backed analyzer.

mod analysis_model;
mod analysis_traits;

pub use analysis_model::{AnalysisOutcome, AnalysisRequest, LadderRung, ParseGrammar};
pub use analysis_traits::AnalyzerTrait;
