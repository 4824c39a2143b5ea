use chrono::Utc;
use sqlx::PgPool;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::config;
use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::{Administrator, ReviewDecision, Submission};
use crate::hierarchy::{AdminLevel, GeographicTree, NodeRef};
use crate::policy::{effective_capabilities, ensure_capability, Capability, PolicyError};
use crate::scope::{resolve_scope, ScopeError};
use crate::workflow::{plan_approve, plan_return, plan_submit, Transition, WorkflowError};

use super::ReviewOutcome;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Database manager error: {0}")]
    DatabaseManager(#[from] DatabaseError),
    #[error(transparent)]
    Scope(#[from] ScopeError),
    #[error(transparent)]
    Policy(#[from] PolicyError),
    #[error(transparent)]
    Workflow(#[from] WorkflowError),
    #[error("Submission not found: {0}")]
    SubmissionNotFound(Uuid),
    #[error("Only unit-level accounts submit; {0} accounts review")]
    SubmitterNotUnit(AdminLevel),
    #[error("Review comment exceeds {max} characters")]
    CommentTooLong { max: usize },
}

const SUBMISSION_COLUMNS: &str = "id, unit_id, period, superseded, status, current_level, \
     created_at, updated_at, submitted_at, last_reviewed_at";

/// Applies workflow transitions to storage.
///
/// Every mutating call re-resolves the caller's scope from its current
/// account row, plans the transition with the pure planners, then applies
/// it under a compare-and-swap on (status, current_level). Concurrent
/// reviewers race; exactly one wins and the loser sees a stale-state
/// error.
pub struct WorkflowEngine {
    pool: PgPool,
}

impl WorkflowEngine {
    pub async fn new() -> Result<Self, EngineError> {
        let pool = DatabaseManager::pool().await?;
        Ok(Self { pool })
    }

    pub fn with_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Submit (or resubmit) a unit's answers into the review chain.
    pub async fn submit(
        &self,
        submission_id: Uuid,
        admin: &Administrator,
        tree: &GeographicTree,
    ) -> Result<Submission, EngineError> {
        let submission = self.fetch(submission_id).await?;

        if admin.level != AdminLevel::Unit {
            return Err(EngineError::SubmitterNotUnit(admin.level));
        }
        let scope = resolve_scope(admin, tree)?;
        scope.authorize_node(tree, NodeRef::Unit(submission.unit_id))?;

        let transition = plan_submit(submission.status)?;

        let now = Utc::now();
        let updated = sqlx::query_as::<_, Submission>(&format!(
            "UPDATE submissions \
             SET status = $4, current_level = $5, submitted_at = $6, updated_at = $6 \
             WHERE id = $1 AND status = $2 AND current_level = $3 \
             RETURNING {SUBMISSION_COLUMNS}"
        ))
        .bind(submission.id)
        .bind(submission.status.as_str())
        .bind(submission.current_level.as_str())
        .bind(transition.status.as_str())
        .bind(transition.level.as_str())
        .bind(now)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(WorkflowError::StaleState)?;

        info!(
            "Submission {} for unit {} entered review at {}",
            updated.id, updated.unit_id, updated.current_level
        );
        Ok(updated)
    }

    /// Approve at the reviewer's level, advancing one level or completing.
    pub async fn approve(
        &self,
        submission_id: Uuid,
        reviewer: &Administrator,
        tree: &GeographicTree,
        comment: Option<&str>,
    ) -> Result<(Submission, ReviewDecision), EngineError> {
        let submission = self.fetch(submission_id).await?;
        self.authorize_review(reviewer, tree, &submission)?;
        check_comment_len(comment)?;

        let transition = plan_approve(submission.status, submission.current_level, reviewer.level)?;
        let (updated, decision) = self
            .apply_review(&submission, transition, reviewer, ReviewOutcome::Approved, comment)
            .await?;

        info!(
            "Submission {} approved at {} by {}; now {}",
            updated.id, decision.level, reviewer.email, updated.status
        );
        Ok((updated, decision))
    }

    /// Return one level down toward the unit. The comment is mandatory.
    pub async fn return_submission(
        &self,
        submission_id: Uuid,
        reviewer: &Administrator,
        tree: &GeographicTree,
        comment: Option<&str>,
    ) -> Result<(Submission, ReviewDecision), EngineError> {
        let submission = self.fetch(submission_id).await?;
        self.authorize_review(reviewer, tree, &submission)?;
        check_comment_len(comment)?;

        let transition =
            plan_return(submission.status, submission.current_level, reviewer.level, comment)?;
        let (updated, decision) = self
            .apply_review(&submission, transition, reviewer, ReviewOutcome::Returned, comment)
            .await?;

        info!(
            "Submission {} returned at {} by {}; now {}",
            updated.id, decision.level, reviewer.email, updated.status
        );
        Ok((updated, decision))
    }

    async fn fetch(&self, id: Uuid) -> Result<Submission, EngineError> {
        sqlx::query_as::<_, Submission>(&format!(
            "SELECT {SUBMISSION_COLUMNS} FROM submissions WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(EngineError::SubmissionNotFound(id))
    }

    fn authorize_review(
        &self,
        reviewer: &Administrator,
        tree: &GeographicTree,
        submission: &Submission,
    ) -> Result<(), EngineError> {
        let scope = resolve_scope(reviewer, tree)?;
        scope.authorize_node(tree, NodeRef::Unit(submission.unit_id))?;
        let capabilities =
            effective_capabilities(reviewer.level, &reviewer.capability_overrides());
        ensure_capability(&capabilities, Capability::ApproveSubmissions)?;
        Ok(())
    }

    /// Compare-and-swap the status/level pair and append the decision row
    /// in one transaction, so neither exists without the other.
    async fn apply_review(
        &self,
        submission: &Submission,
        transition: Transition,
        reviewer: &Administrator,
        outcome: ReviewOutcome,
        comment: Option<&str>,
    ) -> Result<(Submission, ReviewDecision), EngineError> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query_as::<_, Submission>(&format!(
            "UPDATE submissions \
             SET status = $4, current_level = $5, last_reviewed_at = $6, updated_at = $6 \
             WHERE id = $1 AND status = $2 AND current_level = $3 \
             RETURNING {SUBMISSION_COLUMNS}"
        ))
        .bind(submission.id)
        .bind(submission.status.as_str())
        .bind(submission.current_level.as_str())
        .bind(transition.status.as_str())
        .bind(transition.level.as_str())
        .bind(now)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(updated) = updated else {
            tx.rollback().await?;
            return Err(WorkflowError::StaleState.into());
        };

        let decision = sqlx::query_as::<_, ReviewDecision>(
            "INSERT INTO review_decisions \
                 (id, submission_id, reviewer_id, level, outcome, comment, decided_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING id, submission_id, reviewer_id, level, outcome, comment, decided_at",
        )
        .bind(Uuid::new_v4())
        .bind(submission.id)
        .bind(reviewer.id)
        // The decision is recorded at the level the review happened, not
        // the level the submission moved to.
        .bind(submission.current_level.as_str())
        .bind(outcome.as_str())
        .bind(comment)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok((updated, decision))
    }
}

fn check_comment_len(comment: Option<&str>) -> Result<(), EngineError> {
    let max = config::config().survey.review_comment_max_len;
    match comment {
        Some(c) if c.len() > max => Err(EngineError::CommentTooLong { max }),
        _ => Ok(()),
    }
}
