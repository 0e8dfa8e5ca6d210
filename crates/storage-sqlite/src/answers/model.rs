use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use stockbrief_core::answers::Answer;

#[derive(
    Queryable,
    Identifiable,
    Insertable,
    AsChangeset,
    Selectable,
    Serialize,
    Deserialize,
    Debug,
    Clone,
)]
#[diesel(table_name = crate::schema::answers)]
#[diesel(primary_key(symbol, question_id))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct AnswerDB {
    pub symbol: String,
    pub question_id: i64,
    pub answer_text: String,
    pub updated_at: NaiveDateTime,
}

impl From<AnswerDB> for Answer {
    fn from(db: AnswerDB) -> Self {
        Self {
            symbol: db.symbol,
            question_id: db.question_id,
            answer_text: db.answer_text,
            updated_at: db.updated_at,
        }
    }
}
