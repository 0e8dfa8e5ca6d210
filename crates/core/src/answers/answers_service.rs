use crate::answers::answers_model::Answer;
use crate::answers::answers_traits::{AnswerRepositoryTrait, AnswerServiceTrait};
use crate::errors::Result;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use log::{debug, error, info, warn};
use std::sync::Arc;

pub struct AnswerService {
    answer_repo: Arc<dyn AnswerRepositoryTrait>,
}

impl AnswerService {
    pub fn new(answer_repo: Arc<dyn AnswerRepositoryTrait>) -> Self {
        AnswerService { answer_repo }
    }
}

#[async_trait]
impl AnswerServiceTrait for AnswerService {
    async fn upsert_answer(&self, symbol: &str, question_id: i64, answer_text: &str) -> bool {
        let text = answer_text.trim();
        if text.is_empty() {
            warn!("Skipping empty answer for {} question {}", symbol, question_id);
            return false;
        }

        match self
            .answer_repo
            .upsert_answer(symbol.to_string(), question_id, text.to_string())
            .await
        {
            Ok(_) => {
                debug!("Answer {} for {} written", question_id, symbol);
                true
            }
            Err(e) => {
                error!(
                    "Failed to write answer {} for {}: {}",
                    question_id, symbol, e
                );
                false
            }
        }
    }

    fn verify_answer(&self, symbol: &str, question_id: i64) -> bool {
        match self.answer_repo.get_answer(symbol, question_id) {
            Ok(Some(answer)) if !answer.answer_text.trim().is_empty() => true,
            Ok(_) => {
                error!(
                    "Verification failed: answer {} for {} is missing after write",
                    question_id, symbol
                );
                false
            }
            Err(e) => {
                error!(
                    "Verification read failed for {} question {}: {}",
                    symbol, question_id, e
                );
                false
            }
        }
    }

    fn get_answers(&self, symbol: &str) -> Result<Vec<Answer>> {
        self.answer_repo.list_answers_for_symbol(symbol)
    }

    fn get_all_answers(&self) -> Result<Vec<Answer>> {
        self.answer_repo.list_answers()
    }

    async fn delete_for_symbol(&self, symbol: &str) -> Result<usize> {
        self.answer_repo
            .delete_answers_for_symbol(symbol.to_string())
            .await
    }

    async fn prune_answers(&self, older_than_days: i64) -> Result<usize> {
        let cutoff = (Utc::now() - Duration::days(older_than_days)).naive_utc();
        let removed = self.answer_repo.delete_answers_before(cutoff).await?;
        info!(
            "Pruned {} answers not refreshed in {} days",
            removed, older_than_days
        );
        Ok(removed)
    }
}
