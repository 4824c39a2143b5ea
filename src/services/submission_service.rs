use std::collections::{HashMap, HashSet};

use chrono::Utc;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::completion::QuestionKey;
use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::{ResponseRecord, ReviewDecision, Submission};
use crate::workflow::SubmissionStatus;

#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Database manager error: {0}")]
    DatabaseManager(#[from] DatabaseError),
    #[error("Submission not found: {0}")]
    NotFound(Uuid),
    #[error("Submission is not editable in status {0}")]
    NotEditable(SubmissionStatus),
    #[error("Answer value must not be empty")]
    EmptyValue,
}

const SUBMISSION_COLUMNS: &str = "id, unit_id, period, superseded, status, current_level, \
     created_at, updated_at, submitted_at, last_reviewed_at";

pub struct SubmissionService {
    pool: PgPool,
}

impl SubmissionService {
    pub async fn new() -> Result<Self, SubmissionError> {
        let pool = DatabaseManager::pool().await?;
        Ok(Self { pool })
    }

    pub fn with_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<Submission>, SubmissionError> {
        let row = sqlx::query_as::<_, Submission>(&format!(
            "SELECT {SUBMISSION_COLUMNS} FROM submissions WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// The live (non-superseded) submission for a unit and period.
    pub async fn latest_for_unit(
        &self,
        unit_id: i64,
        period: &str,
    ) -> Result<Option<Submission>, SubmissionError> {
        let row = sqlx::query_as::<_, Submission>(&format!(
            "SELECT {SUBMISSION_COLUMNS} FROM submissions \
             WHERE unit_id = $1 AND period = $2 AND NOT superseded"
        ))
        .bind(unit_id)
        .bind(period)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Fetch the live submission for (unit, period), creating the draft
    /// on first save. The partial unique index makes the insert race
    /// collapse to a single live row.
    pub async fn get_or_create_draft(
        &self,
        unit_id: i64,
        period: &str,
    ) -> Result<Submission, SubmissionError> {
        let inserted = sqlx::query_as::<_, Submission>(&format!(
            "INSERT INTO submissions (id, unit_id, period) VALUES ($1, $2, $3) \
             ON CONFLICT (unit_id, period) WHERE NOT superseded DO NOTHING \
             RETURNING {SUBMISSION_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(unit_id)
        .bind(period)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(submission) = inserted {
            return Ok(submission);
        }
        // Lost the insert race or the row already existed
        self.latest_for_unit(unit_id, period)
            .await?
            .ok_or(SubmissionError::NotFound(Uuid::nil()))
    }

    /// Live submissions for the given units, optionally narrowed to one
    /// period. `units` comes from the caller's resolved scope.
    pub async fn list_for_units(
        &self,
        units: &[i64],
        period: Option<&str>,
    ) -> Result<Vec<Submission>, SubmissionError> {
        let rows = match period {
            Some(period) => {
                sqlx::query_as::<_, Submission>(&format!(
                    "SELECT {SUBMISSION_COLUMNS} FROM submissions \
                     WHERE unit_id = ANY($1) AND period = $2 AND NOT superseded \
                     ORDER BY unit_id"
                ))
                .bind(units)
                .bind(period)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Submission>(&format!(
                    "SELECT {SUBMISSION_COLUMNS} FROM submissions \
                     WHERE unit_id = ANY($1) AND NOT superseded \
                     ORDER BY period, unit_id"
                ))
                .bind(units)
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(rows)
    }

    /// Upsert one answer keyed by (submission, question, sub-question).
    /// Only draft and returned submissions accept edits.
    pub async fn upsert_answer(
        &self,
        submission_id: Uuid,
        question_id: i64,
        sub_question_id: Option<i64>,
        value: &str,
    ) -> Result<ResponseRecord, SubmissionError> {
        if value.trim().is_empty() {
            return Err(SubmissionError::EmptyValue);
        }
        let submission = self
            .get(submission_id)
            .await?
            .ok_or(SubmissionError::NotFound(submission_id))?;
        if !submission.status.is_editable_by_unit() {
            return Err(SubmissionError::NotEditable(submission.status));
        }

        let record = sqlx::query_as::<_, ResponseRecord>(
            "INSERT INTO response_records \
                 (id, submission_id, question_id, sub_question_id, value, answered_at) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             ON CONFLICT (submission_id, question_id, COALESCE(sub_question_id, -1)) \
             DO UPDATE SET value = EXCLUDED.value, answered_at = EXCLUDED.answered_at \
             RETURNING id, submission_id, question_id, sub_question_id, value, answered_at",
        )
        .bind(Uuid::new_v4())
        .bind(submission_id)
        .bind(question_id)
        .bind(sub_question_id)
        .bind(value)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;
        Ok(record)
    }

    pub async fn answers_for(
        &self,
        submission_id: Uuid,
    ) -> Result<Vec<ResponseRecord>, SubmissionError> {
        let rows = sqlx::query_as::<_, ResponseRecord>(
            "SELECT id, submission_id, question_id, sub_question_id, value, answered_at \
             FROM response_records WHERE submission_id = $1 \
             ORDER BY question_id, sub_question_id",
        )
        .bind(submission_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Full audit trail for a submission, oldest decision first.
    pub async fn decisions_for(
        &self,
        submission_id: Uuid,
    ) -> Result<Vec<ReviewDecision>, SubmissionError> {
        let rows = sqlx::query_as::<_, ReviewDecision>(
            "SELECT id, submission_id, reviewer_id, level, outcome, comment, decided_at \
             FROM review_decisions WHERE submission_id = $1 ORDER BY decided_at",
        )
        .bind(submission_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Non-empty answer keys of each unit's live submission for a period,
    /// feeding the completion aggregator.
    pub async fn answered_keys(
        &self,
        units: &[i64],
        period: &str,
    ) -> Result<HashMap<i64, HashSet<QuestionKey>>, SubmissionError> {
        let rows: Vec<(i64, i64, Option<i64>)> = sqlx::query_as(
            "SELECT s.unit_id, r.question_id, r.sub_question_id \
             FROM response_records r \
             JOIN submissions s ON s.id = r.submission_id \
             WHERE s.unit_id = ANY($1) AND s.period = $2 AND NOT s.superseded \
               AND length(trim(r.value)) > 0",
        )
        .bind(units)
        .bind(period)
        .fetch_all(&self.pool)
        .await?;

        let mut answered: HashMap<i64, HashSet<QuestionKey>> = HashMap::new();
        for (unit_id, question_id, sub_question_id) in rows {
            answered
                .entry(unit_id)
                .or_default()
                .insert(QuestionKey { question_id, sub_question_id });
        }
        Ok(answered)
    }
}
