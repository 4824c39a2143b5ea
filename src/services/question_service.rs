use std::collections::HashSet;

use sqlx::PgPool;
use thiserror::Error;
use tracing::info;

use crate::completion::QuestionKey;
use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::RequiredQuestionRow;

#[derive(Debug, Error)]
pub enum QuestionError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Database manager error: {0}")]
    DatabaseManager(#[from] DatabaseError),
}

/// Read side of the required-question set owned by the form-definition
/// collaborator. The replace path exists for seeding and sync tooling.
pub struct QuestionService {
    pool: PgPool,
}

impl QuestionService {
    pub async fn new() -> Result<Self, QuestionError> {
        let pool = DatabaseManager::pool().await?;
        Ok(Self { pool })
    }

    pub fn with_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn required_keys(&self) -> Result<HashSet<QuestionKey>, QuestionError> {
        let rows: Vec<RequiredQuestionRow> = sqlx::query_as(
            "SELECT question_id, sub_question_id FROM required_questions",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(RequiredQuestionRow::key).collect())
    }

    /// Replace the required set wholesale inside one transaction.
    pub async fn replace_required(&self, keys: &[QuestionKey]) -> Result<u64, QuestionError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM required_questions").execute(&mut *tx).await?;
        let mut inserted = 0;
        for key in keys {
            inserted += sqlx::query(
                "INSERT INTO required_questions (question_id, sub_question_id) VALUES ($1, $2) \
                 ON CONFLICT (question_id, COALESCE(sub_question_id, -1)) DO NOTHING",
            )
            .bind(key.question_id)
            .bind(key.sub_question_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        }
        tx.commit().await?;
        info!("Replaced required-question set with {} entries", inserted);
        Ok(inserted)
    }
}
