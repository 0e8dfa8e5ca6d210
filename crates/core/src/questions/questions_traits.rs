use crate::errors::Result;
use crate::questions::questions_model::QuestionTemplate;
use async_trait::async_trait;

/// Trait for question repository operations
#[async_trait]
pub trait QuestionRepositoryTrait: Send + Sync {
    /// All questions ordered by id.
    fn list_questions(&self) -> Result<Vec<QuestionTemplate>>;
    fn get_question(&self, question_id: i64) -> Result<Option<QuestionTemplate>>;
    /// Insert a question; the store assigns the id.
    async fn insert_question(&self, text: String) -> Result<QuestionTemplate>;
}

/// Trait for question service operations
#[async_trait]
pub trait QuestionServiceTrait: Send + Sync {
    fn get_questions(&self) -> Result<Vec<QuestionTemplate>>;
    fn get_question(&self, question_id: i64) -> Result<Option<QuestionTemplate>>;
    /// Seed the default questions when none exist. Returns how many were inserted.
    async fn initialize_default_questions(&self) -> Result<usize>;
}
