use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::hierarchy::AdminLevel;
use crate::workflow::{ReviewOutcome, SubmissionStatus};

/// One submission per (unit, reporting period). At most one
/// non-superseded row exists per pair, enforced by a partial unique
/// index; superseded rows stay behind as archive.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Submission {
    pub id: Uuid,
    pub unit_id: i64,
    pub period: String,
    pub superseded: bool,
    #[sqlx(try_from = "String")]
    pub status: SubmissionStatus,
    #[sqlx(try_from = "String")]
    pub current_level: AdminLevel,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub last_reviewed_at: Option<DateTime<Utc>>,
}

/// Append-only audit row for one approve/return action.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ReviewDecision {
    pub id: Uuid,
    pub submission_id: Uuid,
    pub reviewer_id: Uuid,
    #[sqlx(try_from = "String")]
    pub level: AdminLevel,
    #[sqlx(try_from = "String")]
    pub outcome: ReviewOutcome,
    pub comment: Option<String>,
    pub decided_at: DateTime<Utc>,
}

/// One answer per (submission, question, sub-question), upserted in place.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ResponseRecord {
    pub id: Uuid,
    pub submission_id: Uuid,
    pub question_id: i64,
    pub sub_question_id: Option<i64>,
    pub value: String,
    pub answered_at: DateTime<Utc>,
}
