//! SQLite storage implementation for answers.

mod model;
mod repository;

pub use model::AnswerDB;
pub use repository::AnswerRepository;

// Re-export trait from core for convenience
pub use stockbrief_core::answers::AnswerRepositoryTrait;
