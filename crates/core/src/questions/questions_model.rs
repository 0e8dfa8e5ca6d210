//! Question domain models.

use serde::{Deserialize, Serialize};

/// A question asked about every symbol. The id is the join key to answers
/// and never changes once seeded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct QuestionTemplate {
    pub id: i64,
    pub text: String,
}

impl QuestionTemplate {
    pub fn new(id: i64, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
        }
    }
}

/// Questions seeded into an empty database, in display order.
pub const DEFAULT_QUESTIONS: [&str; 5] = [
    "What is the current performance of this stock compared to its recent historical trend?",
    "Is this stock considered overvalued or undervalued based on current analyst targets and earnings data?",
    "What are the key financial strengths or weaknesses of this company based on its latest financial statements?",
    "What do recent insider and institutional activities suggest about confidence in this stock?",
    "How does the stock's volatility and risk profile compare to the broader market?",
];
