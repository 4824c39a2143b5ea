use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::completion::QuestionKey;

/// A question (or sub-question) marked mandatory by the form-definition
/// collaborator. Read-only from this system's perspective.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RequiredQuestionRow {
    pub question_id: i64,
    pub sub_question_id: Option<i64>,
}

impl RequiredQuestionRow {
    #[must_use]
    pub fn key(&self) -> QuestionKey {
        QuestionKey {
            question_id: self.question_id,
            sub_question_id: self.sub_question_id,
        }
    }
}
