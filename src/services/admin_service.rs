use chrono::Utc;
use serde::Deserialize;
use sqlx::PgPool;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::{AdminStatus, Administrator};
use crate::hierarchy::AdminLevel;

#[derive(Debug, Error)]
pub enum AdminError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Database manager error: {0}")]
    DatabaseManager(#[from] DatabaseError),
    #[error("Administrator already exists: {0}")]
    AlreadyExists(String),
    #[error("Administrator not found: {0}")]
    NotFound(String),
    #[error("Invalid email: {0}")]
    InvalidEmail(String),
    #[error("Password hashing failed")]
    PasswordHash,
}

/// Fields for creating an administrator. The anchor columns must match
/// `level`; the scope resolver rejects inconsistent rows at use time.
#[derive(Debug, Clone, Deserialize)]
pub struct NewAdministrator {
    pub email: String,
    pub password: String,
    pub level: AdminLevel,
    pub region_id: Option<i64>,
    pub division_id: Option<i64>,
    pub district_id: Option<i64>,
    pub unit_id: Option<i64>,
}

/// Partial update applied by a higher-level administrator. Absent fields
/// are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdminUpdate {
    pub level: Option<AdminLevel>,
    pub region_id: Option<Option<i64>>,
    pub division_id: Option<Option<i64>>,
    pub district_id: Option<Option<i64>>,
    pub unit_id: Option<Option<i64>>,
    pub status: Option<AdminStatus>,
    pub can_create_admins: Option<Option<bool>>,
    pub can_manage_admins: Option<Option<bool>>,
    pub can_set_deadlines: Option<Option<bool>>,
    pub can_approve_submissions: Option<Option<bool>>,
    pub can_view_system_logs: Option<Option<bool>>,
}

const ADMIN_COLUMNS: &str = "id, email, password_digest, level, region_id, division_id, \
     district_id, unit_id, can_create_admins, can_manage_admins, can_set_deadlines, \
     can_approve_submissions, can_view_system_logs, status, created_by, updated_by, \
     created_at, updated_at";

pub struct AdminService {
    pool: PgPool,
}

impl AdminService {
    pub async fn new() -> Result<Self, AdminError> {
        let pool = DatabaseManager::pool().await?;
        Ok(Self { pool })
    }

    pub fn with_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<Administrator>, AdminError> {
        let row = sqlx::query_as::<_, Administrator>(&format!(
            "SELECT {ADMIN_COLUMNS} FROM administrators WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<Administrator>, AdminError> {
        let row = sqlx::query_as::<_, Administrator>(&format!(
            "SELECT {ADMIN_COLUMNS} FROM administrators WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn list(&self) -> Result<Vec<Administrator>, AdminError> {
        let rows = sqlx::query_as::<_, Administrator>(&format!(
            "SELECT {ADMIN_COLUMNS} FROM administrators ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Create an administrator. Duplicate emails surface as a conflict,
    /// backed by the unique constraint rather than a racy pre-check.
    pub async fn create(
        &self,
        new: &NewAdministrator,
        created_by: Option<Uuid>,
    ) -> Result<Administrator, AdminError> {
        validate_email(&new.email)?;
        let digest = hash_password(&new.password)?;
        let id = Uuid::new_v4();

        let result = sqlx::query_as::<_, Administrator>(&format!(
            "INSERT INTO administrators \
                 (id, email, password_digest, level, region_id, division_id, district_id, \
                  unit_id, status, created_by, updated_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'active', $9, $9) \
             RETURNING {ADMIN_COLUMNS}"
        ))
        .bind(id)
        .bind(&new.email)
        .bind(&digest)
        .bind(new.level.as_str())
        .bind(new.region_id)
        .bind(new.division_id)
        .bind(new.district_id)
        .bind(new.unit_id)
        .bind(created_by)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(admin) => {
                info!("Created administrator {} at level {}", admin.email, admin.level);
                Ok(admin)
            }
            Err(err) if is_unique_violation(&err) => {
                Err(AdminError::AlreadyExists(new.email.clone()))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Apply a partial update on behalf of `updated_by`.
    pub async fn update(
        &self,
        id: Uuid,
        update: &AdminUpdate,
        updated_by: Uuid,
    ) -> Result<Administrator, AdminError> {
        let current = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| AdminError::NotFound(id.to_string()))?;

        let level = update.level.unwrap_or(current.level);
        let region_id = update.region_id.unwrap_or(current.region_id);
        let division_id = update.division_id.unwrap_or(current.division_id);
        let district_id = update.district_id.unwrap_or(current.district_id);
        let unit_id = update.unit_id.unwrap_or(current.unit_id);
        let status = update.status.unwrap_or(current.status);
        let can_create = update.can_create_admins.unwrap_or(current.can_create_admins);
        let can_manage = update.can_manage_admins.unwrap_or(current.can_manage_admins);
        let can_deadlines = update.can_set_deadlines.unwrap_or(current.can_set_deadlines);
        let can_approve = update
            .can_approve_submissions
            .unwrap_or(current.can_approve_submissions);
        let can_logs = update.can_view_system_logs.unwrap_or(current.can_view_system_logs);

        let admin = sqlx::query_as::<_, Administrator>(&format!(
            "UPDATE administrators SET \
                 level = $2, region_id = $3, division_id = $4, district_id = $5, unit_id = $6, \
                 status = $7, can_create_admins = $8, can_manage_admins = $9, \
                 can_set_deadlines = $10, can_approve_submissions = $11, \
                 can_view_system_logs = $12, updated_by = $13, updated_at = $14 \
             WHERE id = $1 \
             RETURNING {ADMIN_COLUMNS}"
        ))
        .bind(id)
        .bind(level.as_str())
        .bind(region_id)
        .bind(division_id)
        .bind(district_id)
        .bind(unit_id)
        .bind(status.as_str())
        .bind(can_create)
        .bind(can_manage)
        .bind(can_deadlines)
        .bind(can_approve)
        .bind(can_logs)
        .bind(updated_by)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        info!("Updated administrator {}", admin.email);
        Ok(admin)
    }

    /// Self-service password change.
    pub async fn change_password(&self, id: Uuid, password: &str) -> Result<(), AdminError> {
        let digest = hash_password(password)?;
        let result = sqlx::query(
            "UPDATE administrators SET password_digest = $2, updated_by = $1, updated_at = $3 \
             WHERE id = $1",
        )
        .bind(id)
        .bind(&digest)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(AdminError::NotFound(id.to_string()));
        }
        Ok(())
    }

    /// Deactivation is the terminal state; rows are never hard-deleted.
    pub async fn deactivate(&self, id: Uuid, updated_by: Uuid) -> Result<(), AdminError> {
        let result = sqlx::query(
            "UPDATE administrators SET status = 'inactive', updated_by = $2, updated_at = $3 \
             WHERE id = $1",
        )
        .bind(id)
        .bind(updated_by)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(AdminError::NotFound(id.to_string()));
        }
        Ok(())
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db) if db.code().as_deref() == Some("23505")
    )
}

fn validate_email(email: &str) -> Result<(), AdminError> {
    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 || parts[0].is_empty() || !parts[1].contains('.') {
        return Err(AdminError::InvalidEmail(email.to_string()));
    }
    Ok(())
}

/// Hash a password with Argon2id and a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, AdminError> {
    use argon2::password_hash::{rand_core::OsRng, SaltString};
    use argon2::{Argon2, PasswordHasher};

    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AdminError::PasswordHash)
}

/// Verify a password against a stored Argon2 digest. Malformed digests
/// verify as false rather than erroring out of a login attempt.
#[must_use]
pub fn verify_password(password: &str, digest: &str) -> bool {
    use argon2::password_hash::PasswordHash;
    use argon2::{Argon2, PasswordVerifier};

    let Ok(parsed) = PasswordHash::new(digest) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_round_trip() {
        let digest = hash_password("correct horse").unwrap();
        assert!(verify_password("correct horse", &digest));
        assert!(!verify_password("wrong horse", &digest));
    }

    #[test]
    fn malformed_digest_never_verifies() {
        assert!(!verify_password("anything", "not-a-digest"));
    }

    #[test]
    fn email_validation() {
        assert!(validate_email("a@b.example").is_ok());
        assert!(validate_email("missing-at.example").is_err());
        assert!(validate_email("@b.example").is_err());
        assert!(validate_email("a@nodot").is_err());
    }
}
