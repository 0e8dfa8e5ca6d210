//! Answers module - one live answer per (symbol, question).

mod answers_model;
mod answers_service;
mod answers_traits;

#[cfg(test)]
mod answers_service_tests;

pub use answers_model::Answer;
pub use answers_service::AnswerService;
pub use answers_traits::{AnswerRepositoryTrait, AnswerServiceTrait};
