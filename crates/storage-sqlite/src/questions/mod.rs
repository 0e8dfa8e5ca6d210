//! SQLite storage implementation for question templates.

mod model;
mod repository;

pub use model::{NewQuestionDB, QuestionDB};
pub use repository::QuestionRepository;

// Re-export trait from core for convenience
pub use stockbrief_core::questions::QuestionRepositoryTrait;
