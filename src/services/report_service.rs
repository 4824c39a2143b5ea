use sqlx::PgPool;
use thiserror::Error;

use crate::completion::{compute_completion, UnitStat};
use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::hierarchy::{GeoError, GeographicTree};
use crate::scope::Scope;
use crate::services::question_service::{QuestionError, QuestionService};
use crate::services::submission_service::{SubmissionError, SubmissionService};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Database manager error: {0}")]
    DatabaseManager(#[from] DatabaseError),
    #[error(transparent)]
    Hierarchy(#[from] GeoError),
    #[error(transparent)]
    Submission(#[from] SubmissionError),
    #[error(transparent)]
    Question(#[from] QuestionError),
}

/// Read-only completion reporting over a resolved scope. Performs no
/// writes; empty scopes yield empty reports, not errors.
pub struct ReportService {
    pool: PgPool,
}

impl ReportService {
    pub async fn new() -> Result<Self, ReportError> {
        let pool = DatabaseManager::pool().await?;
        Ok(Self { pool })
    }

    pub fn with_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Per-unit completion for every unit in scope. Units without a live
    /// submission appear with zero answered.
    pub async fn unit_completion(
        &self,
        scope: &Scope,
        tree: &GeographicTree,
        period: &str,
    ) -> Result<Vec<UnitStat>, ReportError> {
        let units = scope.units(tree)?;
        if units.is_empty() {
            return Ok(Vec::new());
        }
        let required = QuestionService::with_pool(self.pool.clone())
            .required_keys()
            .await?;
        let answered = SubmissionService::with_pool(self.pool.clone())
            .answered_keys(&units, period)
            .await?;
        Ok(compute_completion(&units, &answered, &required))
    }
}
