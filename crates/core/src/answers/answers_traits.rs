use crate::answers::answers_model::Answer;
use crate::errors::Result;
use async_trait::async_trait;
use chrono::NaiveDateTime;

/// Trait for answer repository operations
#[async_trait]
pub trait AnswerRepositoryTrait: Send + Sync {
    fn get_answer(&self, symbol: &str, question_id: i64) -> Result<Option<Answer>>;
    fn list_answers_for_symbol(&self, symbol: &str) -> Result<Vec<Answer>>;
    fn list_answers(&self) -> Result<Vec<Answer>>;
    /// Update the row for (symbol, question_id) if it exists, insert it otherwise.
    /// Both steps run in one write transaction.
    async fn upsert_answer(
        &self,
        symbol: String,
        question_id: i64,
        answer_text: String,
    ) -> Result<Answer>;
    async fn delete_answers_for_symbol(&self, symbol: String) -> Result<usize>;
    /// Delete answers last written before `cutoff`.
    async fn delete_answers_before(&self, cutoff: NaiveDateTime) -> Result<usize>;
}

/// Trait for answer service operations
#[async_trait]
pub trait AnswerServiceTrait: Send + Sync {
    /// Idempotent write. Failures are logged and reported as `false`.
    async fn upsert_answer(&self, symbol: &str, question_id: i64, answer_text: &str) -> bool;
    /// Re-read the row and confirm it holds non-empty text.
    fn verify_answer(&self, symbol: &str, question_id: i64) -> bool;
    fn get_answers(&self, symbol: &str) -> Result<Vec<Answer>>;
    fn get_all_answers(&self) -> Result<Vec<Answer>>;
    async fn delete_for_symbol(&self, symbol: &str) -> Result<usize>;
    async fn prune_answers(&self, older_than_days: i64) -> Result<usize>;
}
