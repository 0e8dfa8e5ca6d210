use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use stockbrief_core::questions::QuestionTemplate;

#[derive(Queryable, Identifiable, Selectable, Serialize, Deserialize, Debug, Clone)]
#[diesel(table_name = crate::schema::questions_templates)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct QuestionDB {
    pub id: i64,
    pub question_text: String,
    pub created_at: NaiveDateTime,
}

/// Insert row; the id is assigned by SQLite.
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::questions_templates)]
pub struct NewQuestionDB {
    pub question_text: String,
    pub created_at: NaiveDateTime,
}

impl From<QuestionDB> for QuestionTemplate {
    fn from(db: QuestionDB) -> Self {
        QuestionTemplate::new(db.id, db.question_text)
    }
}
