use sqlx::PgPool;
use tracing::info;

use super::DatabaseError;

/// DDL applied by `census init`. Every statement is idempotent so the
/// command can be re-run against an existing database.
const SCHEMA_STATEMENTS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS regions (
        id BIGINT PRIMARY KEY,
        name TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS divisions (
        id BIGINT PRIMARY KEY,
        name TEXT NOT NULL,
        region_id BIGINT NOT NULL REFERENCES regions(id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS districts (
        id BIGINT PRIMARY KEY,
        name TEXT NOT NULL,
        division_id BIGINT NOT NULL REFERENCES divisions(id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS units (
        id BIGINT PRIMARY KEY,
        name TEXT NOT NULL,
        district_id BIGINT NOT NULL REFERENCES districts(id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS administrators (
        id UUID PRIMARY KEY,
        email TEXT NOT NULL UNIQUE,
        password_digest TEXT NOT NULL,
        level TEXT NOT NULL,
        region_id BIGINT REFERENCES regions(id),
        division_id BIGINT REFERENCES divisions(id),
        district_id BIGINT REFERENCES districts(id),
        unit_id BIGINT REFERENCES units(id),
        can_create_admins BOOLEAN,
        can_manage_admins BOOLEAN,
        can_set_deadlines BOOLEAN,
        can_approve_submissions BOOLEAN,
        can_view_system_logs BOOLEAN,
        status TEXT NOT NULL DEFAULT 'active',
        created_by UUID REFERENCES administrators(id),
        updated_by UUID REFERENCES administrators(id),
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS submissions (
        id UUID PRIMARY KEY,
        unit_id BIGINT NOT NULL REFERENCES units(id),
        period TEXT NOT NULL,
        superseded BOOLEAN NOT NULL DEFAULT FALSE,
        status TEXT NOT NULL DEFAULT 'draft',
        current_level TEXT NOT NULL DEFAULT 'unit',
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        submitted_at TIMESTAMPTZ,
        last_reviewed_at TIMESTAMPTZ
    )
    "#,
    // At most one live submission per (unit, period)
    r#"
    CREATE UNIQUE INDEX IF NOT EXISTS submissions_live_unit_period
        ON submissions (unit_id, period)
        WHERE NOT superseded
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS review_decisions (
        id UUID PRIMARY KEY,
        submission_id UUID NOT NULL REFERENCES submissions(id),
        reviewer_id UUID NOT NULL REFERENCES administrators(id),
        level TEXT NOT NULL,
        outcome TEXT NOT NULL,
        comment TEXT,
        decided_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS review_decisions_submission
        ON review_decisions (submission_id, decided_at)
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS response_records (
        id UUID PRIMARY KEY,
        submission_id UUID NOT NULL REFERENCES submissions(id),
        question_id BIGINT NOT NULL,
        sub_question_id BIGINT,
        value TEXT NOT NULL,
        answered_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    // Upsert target; NULL sub-questions collapse to a sentinel so the
    // (submission, question, sub-question) tuple stays unique
    r#"
    CREATE UNIQUE INDEX IF NOT EXISTS response_records_answer_key
        ON response_records (submission_id, question_id, COALESCE(sub_question_id, -1))
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS required_questions (
        question_id BIGINT NOT NULL,
        sub_question_id BIGINT
    )
    "#,
    r#"
    CREATE UNIQUE INDEX IF NOT EXISTS required_questions_key
        ON required_questions (question_id, COALESCE(sub_question_id, -1))
    "#,
];

/// Create all census tables and indexes if they do not exist yet.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), DatabaseError> {
    for statement in SCHEMA_STATEMENTS {
        sqlx::query(statement).execute(pool).await?;
    }
    info!("Census schema ensured ({} statements)", SCHEMA_STATEMENTS.len());
    Ok(())
}
