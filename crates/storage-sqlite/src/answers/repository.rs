use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;

use super::model::AnswerDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::{IntoCore, StorageError};
use crate::schema::answers;
use stockbrief_core::answers::{Answer, AnswerRepositoryTrait};
use stockbrief_core::errors::Result;

pub struct AnswerRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl AnswerRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        AnswerRepository { pool, writer }
    }
}

#[async_trait]
impl AnswerRepositoryTrait for AnswerRepository {
    fn get_answer(&self, symbol: &str, question_id: i64) -> Result<Option<Answer>> {
        let mut conn = get_connection(&self.pool)?;
        answers::table
            .find((symbol, question_id))
            .select(AnswerDB::as_select())
            .first::<AnswerDB>(&mut conn)
            .optional()
            .map(|row| row.map(Answer::from))
            .into_core()
    }

    fn list_answers_for_symbol(&self, symbol: &str) -> Result<Vec<Answer>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = answers::table
            .filter(answers::symbol.eq(symbol))
            .order(answers::question_id.asc())
            .select(AnswerDB::as_select())
            .load::<AnswerDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(Answer::from).collect())
    }

    fn list_answers(&self) -> Result<Vec<Answer>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = answers::table
            .order((answers::symbol.asc(), answers::question_id.asc()))
            .select(AnswerDB::as_select())
            .load::<AnswerDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(Answer::from).collect())
    }

    async fn upsert_answer(
        &self,
        symbol: String,
        question_id: i64,
        answer_text: String,
    ) -> Result<Answer> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Answer> {
                let row = AnswerDB {
                    symbol,
                    question_id,
                    answer_text,
                    updated_at: Utc::now().naive_utc(),
                };

                let updated = diesel::update(answers::table.find((&row.symbol, row.question_id)))
                    .set(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;

                if updated == 0 {
                    diesel::insert_into(answers::table)
                        .values(&row)
                        .execute(conn)
                        .map_err(StorageError::from)?;
                }

                Ok(row.into())
            })
            .await
    }

    async fn delete_answers_for_symbol(&self, symbol: String) -> Result<usize> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                let deleted = diesel::delete(answers::table.filter(answers::symbol.eq(&symbol)))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(deleted)
            })
            .await
    }

    async fn delete_answers_before(&self, cutoff: NaiveDateTime) -> Result<usize> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                let deleted = diesel::delete(answers::table.filter(answers::updated_at.lt(cutoff)))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(deleted)
            })
            .await
    }
}
