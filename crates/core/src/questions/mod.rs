//! Questions module - the fixed question set asked for every symbol.

mod questions_model;
mod questions_service;
mod questions_traits;

pub use questions_model::{QuestionTemplate, DEFAULT_QUESTIONS};
pub use questions_service::QuestionService;
pub use questions_traits::{QuestionRepositoryTrait, QuestionServiceTrait};
