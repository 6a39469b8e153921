//! Postgres adapter for the [`Store`] trait.
//!
//! Queries are runtime-built with bound parameters; every owner-scoped
//! statement carries `user_id = $owner` in its WHERE clause.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use uuid::Uuid;

use crate::models::{
    Diagnosis, Feedback, MedicalReport, NewDiagnosis, NewFeedback, NewReport, Profile,
    ReportPatch, Severity, User,
};
use crate::store::{apply_report_patch, Store, StoreError};

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connects and runs embedded migrations.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        tracing::info!("database pool ready");
        Ok(Self { pool })
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(r: UserRow) -> Self {
        User {
            id: r.id,
            email: r.email,
            password_hash: r.password_hash,
            created_at: r.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ProfileRow {
    id: Uuid,
    user_id: Uuid,
    email: String,
    name: Option<String>,
    avatar_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProfileRow> for Profile {
    fn from(r: ProfileRow) -> Self {
        Profile {
            id: r.id,
            user_id: r.user_id,
            email: r.email,
            name: r.name,
            avatar_url: r.avatar_url,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct DiagnosisRow {
    id: Uuid,
    user_id: Uuid,
    condition_name: String,
    confidence_score: f64,
    description: String,
    severity: String,
    advice: String,
    created_at: DateTime<Utc>,
}

impl From<DiagnosisRow> for Diagnosis {
    fn from(r: DiagnosisRow) -> Self {
        Diagnosis {
            id: r.id,
            user_id: r.user_id,
            condition_name: r.condition_name,
            confidence_score: r.confidence_score,
            description: r.description,
            // column carries a CHECK constraint on the enumeration
            severity: r.severity.parse().unwrap_or(Severity::Moderate),
            advice: r.advice,
            created_at: r.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ReportRow {
    id: Uuid,
    user_id: Uuid,
    title: String,
    condition_name: String,
    medications: Vec<String>,
    description: Option<String>,
    start_date: DateTime<Utc>,
    end_date: Option<DateTime<Utc>>,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ReportRow> for MedicalReport {
    fn from(r: ReportRow) -> Self {
        MedicalReport {
            id: r.id,
            user_id: r.user_id,
            title: r.title,
            condition_name: r.condition_name,
            medications: r.medications,
            description: r.description,
            start_date: r.start_date,
            end_date: r.end_date,
            active: r.active,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct FeedbackRow {
    id: Uuid,
    user_id: Uuid,
    diagnosis_id: Uuid,
    is_helpful: bool,
    comments: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<FeedbackRow> for Feedback {
    fn from(r: FeedbackRow) -> Self {
        Feedback {
            id: r.id,
            user_id: r.user_id,
            diagnosis_id: r.diagnosis_id,
            is_helpful: r.is_helpful,
            comments: r.comments,
            created_at: r.created_at,
        }
    }
}

fn map_insert_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(ref db) = err {
        if db.is_unique_violation() {
            return StoreError::DuplicateEmail;
        }
    }
    StoreError::Sqlx(err)
}

#[async_trait]
impl Store for PgStore {
    async fn create_user(&self, email: &str, password_hash: &str) -> Result<User, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            "INSERT INTO users (email, password_hash) VALUES ($1, $2)
             RETURNING id, email, password_hash, created_at",
        )
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(map_insert_error)?;

        Ok(row.into())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, password_hash, created_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, password_hash, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn update_password_hash(
        &self,
        user_id: Uuid,
        password_hash: &str,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query("UPDATE users SET password_hash = $1 WHERE id = $2")
            .bind(password_hash)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn get_profile(&self, owner: Uuid) -> Result<Option<Profile>, StoreError> {
        let row = sqlx::query_as::<_, ProfileRow>(
            "SELECT id, user_id, email, name, avatar_url, created_at, updated_at
             FROM profiles WHERE user_id = $1",
        )
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn upsert_profile(
        &self,
        owner: Uuid,
        email: &str,
        name: Option<&str>,
    ) -> Result<Profile, StoreError> {
        let row = sqlx::query_as::<_, ProfileRow>(
            "INSERT INTO profiles (user_id, email, name) VALUES ($1, $2, $3)
             ON CONFLICT (user_id) DO UPDATE
               SET name = COALESCE(EXCLUDED.name, profiles.name),
                   updated_at = now()
             RETURNING id, user_id, email, name, avatar_url, created_at, updated_at",
        )
        .bind(owner)
        .bind(email)
        .bind(name)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn list_diagnoses(&self, owner: Uuid) -> Result<Vec<Diagnosis>, StoreError> {
        let rows = sqlx::query_as::<_, DiagnosisRow>(
            "SELECT id, user_id, condition_name, confidence_score, description, severity,
                    advice, created_at
             FROM diagnosis_history WHERE user_id = $1
             ORDER BY created_at DESC",
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn create_diagnosis(
        &self,
        owner: Uuid,
        new: NewDiagnosis,
    ) -> Result<Diagnosis, StoreError> {
        let row = sqlx::query_as::<_, DiagnosisRow>(
            "INSERT INTO diagnosis_history
               (user_id, condition_name, confidence_score, description, severity, advice)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING id, user_id, condition_name, confidence_score, description, severity,
                       advice, created_at",
        )
        .bind(owner)
        .bind(&new.condition_name)
        .bind(new.confidence_score)
        .bind(&new.description)
        .bind(new.severity.as_str())
        .bind(&new.advice)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn delete_diagnosis(&self, owner: Uuid, id: Uuid) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM diagnosis_history WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn create_feedback(
        &self,
        owner: Uuid,
        new: NewFeedback,
    ) -> Result<Feedback, StoreError> {
        let row = sqlx::query_as::<_, FeedbackRow>(
            "INSERT INTO user_feedback (user_id, diagnosis_id, is_helpful, comments)
             VALUES ($1, $2, $3, $4)
             RETURNING id, user_id, diagnosis_id, is_helpful, comments, created_at",
        )
        .bind(owner)
        .bind(new.diagnosis_id)
        .bind(new.is_helpful)
        .bind(&new.comments)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn list_reports(&self, owner: Uuid) -> Result<Vec<MedicalReport>, StoreError> {
        let rows = sqlx::query_as::<_, ReportRow>(
            "SELECT id, user_id, title, condition_name, medications, description, start_date,
                    end_date, active, created_at, updated_at
             FROM medical_reports WHERE user_id = $1
             ORDER BY created_at DESC",
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn create_report(
        &self,
        owner: Uuid,
        new: NewReport,
    ) -> Result<MedicalReport, StoreError> {
        let row = sqlx::query_as::<_, ReportRow>(
            "INSERT INTO medical_reports
               (user_id, title, condition_name, medications, description, start_date,
                end_date, active)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING id, user_id, title, condition_name, medications, description,
                       start_date, end_date, active, created_at, updated_at",
        )
        .bind(owner)
        .bind(&new.title)
        .bind(&new.condition_name)
        .bind(&new.medications)
        .bind(&new.description)
        .bind(new.start_date)
        .bind(new.end_date)
        .bind(new.active)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn update_report(
        &self,
        owner: Uuid,
        id: Uuid,
        patch: ReportPatch,
    ) -> Result<Option<MedicalReport>, StoreError> {
        // Read-modify-write: single-record last-write-wins is the
        // documented concurrency model, so no transaction is taken.
        let existing = sqlx::query_as::<_, ReportRow>(
            "SELECT id, user_id, title, condition_name, medications, description, start_date,
                    end_date, active, created_at, updated_at
             FROM medical_reports WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = existing else {
            return Ok(None);
        };

        let mut report: MedicalReport = row.into();
        apply_report_patch(&mut report, patch);

        let row = sqlx::query_as::<_, ReportRow>(
            "UPDATE medical_reports
             SET title = $3, condition_name = $4, medications = $5, description = $6,
                 start_date = $7, end_date = $8, active = $9, updated_at = now()
             WHERE id = $1 AND user_id = $2
             RETURNING id, user_id, title, condition_name, medications, description,
                       start_date, end_date, active, created_at, updated_at",
        )
        .bind(id)
        .bind(owner)
        .bind(&report.title)
        .bind(&report.condition_name)
        .bind(&report.medications)
        .bind(&report.description)
        .bind(report.start_date)
        .bind(report.end_date)
        .bind(report.active)
        .fetch_one(&self.pool)
        .await?;

        Ok(Some(row.into()))
    }

    async fn delete_report(&self, owner: Uuid, id: Uuid) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM medical_reports WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
