use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;

use super::model::{NewQuestionDB, QuestionDB};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::{IntoCore, StorageError};
use crate::schema::questions_templates;
use stockbrief_core::errors::Result;
use stockbrief_core::questions::{QuestionRepositoryTrait, QuestionTemplate};

pub struct QuestionRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl QuestionRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        QuestionRepository { pool, writer }
    }
}

#[async_trait]
impl QuestionRepositoryTrait for QuestionRepository {
    fn list_questions(&self) -> Result<Vec<QuestionTemplate>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = questions_templates::table
            .select(QuestionDB::as_select())
            .order(questions_templates::id.asc())
            .load::<QuestionDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(QuestionTemplate::from).collect())
    }

    fn get_question(&self, question_id: i64) -> Result<Option<QuestionTemplate>> {
        let mut conn = get_connection(&self.pool)?;
        questions_templates::table
            .find(question_id)
            .select(QuestionDB::as_select())
            .first::<QuestionDB>(&mut conn)
            .optional()
            .map(|row| row.map(QuestionTemplate::from))
            .into_core()
    }

    async fn insert_question(&self, text: String) -> Result<QuestionTemplate> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<QuestionTemplate> {
                let new_row = NewQuestionDB {
                    question_text: text,
                    created_at: Utc::now().naive_utc(),
                };
                let inserted = diesel::insert_into(questions_templates::table)
                    .values(&new_row)
                    .returning(QuestionDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Ok(inserted.into())
            })
            .await
    }
}
