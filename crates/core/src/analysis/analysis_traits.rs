use crate::analysis::analysis_model::{AnalysisOutcome, AnalysisRequest};
use crate::errors::Result;
use async_trait::async_trait;

/// Turns stored market data into validated answers.
#[async_trait]
pub trait AnalyzerTrait: Send + Sync {
    /// Returns `Err` only for configuration problems (missing or rejected
    /// credentials), which abort the whole run. Every other failure is
    /// expressed as an outcome with rung `Failed`.
    async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisOutcome>;
}
