//! Tests for AnswerService write/verify contracts.
//!
//! # Contract Points
//!
//! 1. Upserting the same pair twice leaves exactly one row with the latest text
//! 2. Write failures surface as `false`, never as an error
//! 3. Verification catches writes that reported success but stored nothing
//! 4. Pairs are independent: writing one never touches another

use crate::answers::{Answer, AnswerRepositoryTrait, AnswerService, AnswerServiceTrait};
use crate::errors::{DatabaseError, Error, Result};
use async_trait::async_trait;
use chrono::{Duration, NaiveDateTime, Utc};
use std::sync::{Arc, Mutex};

// =========================================================================
// Mock AnswerRepository
// =========================================================================

#[derive(Clone, Default)]
struct MockAnswerRepository {
    answers: Arc<Mutex<Vec<Answer>>>,
    fail_on_write: Arc<Mutex<bool>>,
    /// Report success without storing anything.
    drop_writes: Arc<Mutex<bool>>,
}

impl MockAnswerRepository {
    fn new() -> Self {
        Self::default()
    }

    fn set_fail_on_write(&self, fail: bool) {
        *self.fail_on_write.lock().unwrap() = fail;
    }

    fn set_drop_writes(&self, drop: bool) {
        *self.drop_writes.lock().unwrap() = drop;
    }

    fn rows_for(&self, symbol: &str, question_id: i64) -> Vec<Answer> {
        self.answers
            .lock()
            .unwrap()
            .iter()
            .filter(|a| a.symbol == symbol && a.question_id == question_id)
            .cloned()
            .collect()
    }

    fn insert_raw(&self, answer: Answer) {
        self.answers.lock().unwrap().push(answer);
    }
}

#[async_trait]
impl AnswerRepositoryTrait for MockAnswerRepository {
    fn get_answer(&self, symbol: &str, question_id: i64) -> Result<Option<Answer>> {
        Ok(self.rows_for(symbol, question_id).into_iter().next())
    }

    fn list_answers_for_symbol(&self, symbol: &str) -> Result<Vec<Answer>> {
        Ok(self
            .answers
            .lock()
            .unwrap()
            .iter()
            .filter(|a| a.symbol == symbol)
            .cloned()
            .collect())
    }

    fn list_answers(&self) -> Result<Vec<Answer>> {
        Ok(self.answers.lock().unwrap().clone())
    }

    async fn upsert_answer(
        &self,
        symbol: String,
        question_id: i64,
        answer_text: String,
    ) -> Result<Answer> {
        if *self.fail_on_write.lock().unwrap() {
            return Err(Error::Database(DatabaseError::QueryFailed(
                "database is locked".into(),
            )));
        }
        let answer = Answer {
            symbol: symbol.clone(),
            question_id,
            answer_text,
            updated_at: Utc::now().naive_utc(),
        };
        if *self.drop_writes.lock().unwrap() {
            return Ok(answer);
        }

        let mut answers = self.answers.lock().unwrap();
        match answers
            .iter_mut()
            .find(|a| a.symbol == symbol && a.question_id == question_id)
        {
            Some(existing) => *existing = answer.clone(),
            None => answers.push(answer.clone()),
        }
        Ok(answer)
    }

    async fn delete_answers_for_symbol(&self, symbol: String) -> Result<usize> {
        let mut answers = self.answers.lock().unwrap();
        let before = answers.len();
        answers.retain(|a| a.symbol != symbol);
        Ok(before - answers.len())
    }

    async fn delete_answers_before(&self, cutoff: NaiveDateTime) -> Result<usize> {
        let mut answers = self.answers.lock().unwrap();
        let before = answers.len();
        answers.retain(|a| a.updated_at >= cutoff);
        Ok(before - answers.len())
    }
}

fn service(repo: &MockAnswerRepository) -> AnswerService {
    AnswerService::new(Arc::new(repo.clone()))
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test]
async fn test_upsert_twice_leaves_one_row() {
    let repo = MockAnswerRepository::new();
    let service = service(&repo);

    assert!(service.upsert_answer("AAPL", 1, "Strong quarter.").await);
    assert!(service.upsert_answer("AAPL", 1, "Strong quarter.").await);

    let rows = repo.rows_for("AAPL", 1);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].answer_text, "Strong quarter.");
}

#[tokio::test]
async fn test_upsert_overwrites_text() {
    let repo = MockAnswerRepository::new();
    let service = service(&repo);

    assert!(service.upsert_answer("AAPL", 2, "Fairly valued.").await);
    assert!(service.upsert_answer("AAPL", 2, "Now looks expensive.").await);

    let rows = repo.rows_for("AAPL", 2);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].answer_text, "Now looks expensive.");
}

#[tokio::test]
async fn test_pairs_are_independent() {
    let repo = MockAnswerRepository::new();
    let service = service(&repo);

    assert!(service.upsert_answer("AAPL", 1, "Apple answer one.").await);
    assert!(service.upsert_answer("MSFT", 1, "Microsoft answer one.").await);
    assert!(service.upsert_answer("AAPL", 2, "Apple answer two.").await);
    assert!(service.upsert_answer("AAPL", 1, "Apple answer one, revised.").await);

    assert_eq!(
        repo.rows_for("MSFT", 1)[0].answer_text,
        "Microsoft answer one."
    );
    assert_eq!(repo.rows_for("AAPL", 2)[0].answer_text, "Apple answer two.");
    assert_eq!(service.get_answers("AAPL").unwrap().len(), 2);
    assert_eq!(service.get_all_answers().unwrap().len(), 3);
}

#[tokio::test]
async fn test_write_failure_returns_false() {
    let repo = MockAnswerRepository::new();
    let service = service(&repo);
    repo.set_fail_on_write(true);

    assert!(!service.upsert_answer("AAPL", 1, "Strong quarter.").await);
    assert!(!service.verify_answer("AAPL", 1));
}

#[tokio::test]
async fn test_empty_text_is_not_written() {
    let repo = MockAnswerRepository::new();
    let service = service(&repo);

    assert!(!service.upsert_answer("AAPL", 1, "   ").await);
    assert!(repo.rows_for("AAPL", 1).is_empty());
}

#[tokio::test]
async fn test_verify_catches_silent_write_failure() {
    let repo = MockAnswerRepository::new();
    let service = service(&repo);
    repo.set_drop_writes(true);

    assert!(service.upsert_answer("AAPL", 3, "Solid balance sheet.").await);
    assert!(!service.verify_answer("AAPL", 3));

    repo.set_drop_writes(false);
    assert!(service.upsert_answer("AAPL", 3, "Solid balance sheet.").await);
    assert!(service.verify_answer("AAPL", 3));
}

#[tokio::test]
async fn test_prune_and_delete() {
    let repo = MockAnswerRepository::new();
    let service = service(&repo);

    repo.insert_raw(Answer {
        symbol: "TSLA".into(),
        question_id: 1,
        answer_text: "Stale answer text.".into(),
        updated_at: (Utc::now() - Duration::days(45)).naive_utc(),
    });
    assert!(service.upsert_answer("TSLA", 2, "Fresh answer text.").await);
    assert!(service.upsert_answer("NFLX", 1, "Another fresh answer.").await);

    assert_eq!(service.prune_answers(30).await.unwrap(), 1);
    assert_eq!(service.delete_for_symbol("TSLA").await.unwrap(), 1);
    assert_eq!(service.get_all_answers().unwrap().len(), 1);
}
