use crate::errors::Result;
use crate::questions::questions_model::{QuestionTemplate, DEFAULT_QUESTIONS};
use crate::questions::questions_traits::{QuestionRepositoryTrait, QuestionServiceTrait};
use async_trait::async_trait;
use log::info;
use std::sync::Arc;

pub struct QuestionService {
    question_repo: Arc<dyn QuestionRepositoryTrait>,
}

impl QuestionService {
    pub fn new(question_repo: Arc<dyn QuestionRepositoryTrait>) -> Self {
        QuestionService { question_repo }
    }
}

#[async_trait]
impl QuestionServiceTrait for QuestionService {
    fn get_questions(&self) -> Result<Vec<QuestionTemplate>> {
        self.question_repo.list_questions()
    }

    fn get_question(&self, question_id: i64) -> Result<Option<QuestionTemplate>> {
        self.question_repo.get_question(question_id)
    }

    async fn initialize_default_questions(&self) -> Result<usize> {
        if !self.question_repo.list_questions()?.is_empty() {
            return Ok(0);
        }

        for text in DEFAULT_QUESTIONS {
            self.question_repo.insert_question(text.to_string()).await?;
        }
        info!("Seeded {} default questions", DEFAULT_QUESTIONS.len());
        Ok(DEFAULT_QUESTIONS.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MockQuestionRepository {
        questions: Mutex<Vec<QuestionTemplate>>,
    }

    #[async_trait]
    impl QuestionRepositoryTrait for MockQuestionRepository {
        fn list_questions(&self) -> Result<Vec<QuestionTemplate>> {
            Ok(self.questions.lock().unwrap().clone())
        }

        fn get_question(&self, question_id: i64) -> Result<Option<QuestionTemplate>> {
            Ok(self
                .questions
                .lock()
                .unwrap()
                .iter()
                .find(|q| q.id == question_id)
                .cloned())
        }

        async fn insert_question(&self, text: String) -> Result<QuestionTemplate> {
            let mut questions = self.questions.lock().unwrap();
            let question = QuestionTemplate::new(questions.len() as i64 + 1, text);
            questions.push(question.clone());
            Ok(question)
        }
    }

    #[tokio::test]
    async fn test_seeds_defaults_once() {
        let repo = Arc::new(MockQuestionRepository::default());
        let service = QuestionService::new(repo.clone());

        assert_eq!(service.initialize_default_questions().await.unwrap(), 5);
        assert_eq!(service.initialize_default_questions().await.unwrap(), 0);

        let questions = service.get_questions().unwrap();
        assert_eq!(questions.len(), 5);
        assert_eq!(questions[0].id, 1);
        assert!(service.get_question(3).unwrap().unwrap().text.contains("strengths"));
        assert!(service.get_question(9).unwrap().is_none());
    }
}
