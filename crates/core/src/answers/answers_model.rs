//! Answer domain models.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// The current answer for a (symbol, question) pair. A new run overwrites it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub symbol: String,
    pub question_id: i64,
    pub answer_text: String,
    pub updated_at: NaiveDateTime,
}
