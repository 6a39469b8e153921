//! Data-access layer.
//!
//! Every owner-scoped operation takes the authenticated user id as an
//! explicit parameter; there is no way to query these collections
//! without it, so a handler cannot forget the ownership filter.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    Diagnosis, Feedback, MedicalReport, NewDiagnosis, NewFeedback, NewReport, Profile,
    ReportPatch, User,
};

pub mod postgres;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("email already registered")]
    DuplicateEmail,

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error("store error: {0}")]
    Backend(String),
}

#[async_trait]
pub trait Store: Send + Sync {
    // Credential store
    async fn create_user(&self, email: &str, password_hash: &str) -> Result<User, StoreError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;
    /// Returns false when no such user exists.
    async fn update_password_hash(
        &self,
        user_id: Uuid,
        password_hash: &str,
    ) -> Result<bool, StoreError>;

    // Profiles: one per user, upsert semantics. A `None` name leaves
    // any existing name untouched.
    async fn get_profile(&self, owner: Uuid) -> Result<Option<Profile>, StoreError>;
    async fn upsert_profile(
        &self,
        owner: Uuid,
        email: &str,
        name: Option<&str>,
    ) -> Result<Profile, StoreError>;

    // Diagnosis history
    async fn list_diagnoses(&self, owner: Uuid) -> Result<Vec<Diagnosis>, StoreError>;
    async fn create_diagnosis(
        &self,
        owner: Uuid,
        new: NewDiagnosis,
    ) -> Result<Diagnosis, StoreError>;
    /// Idempotent: absent or foreign ids are a no-op.
    async fn delete_diagnosis(&self, owner: Uuid, id: Uuid) -> Result<(), StoreError>;

    // User feedback
    async fn create_feedback(&self, owner: Uuid, new: NewFeedback) -> Result<Feedback, StoreError>;

    // Medical reports
    async fn list_reports(&self, owner: Uuid) -> Result<Vec<MedicalReport>, StoreError>;
    async fn create_report(&self, owner: Uuid, new: NewReport)
        -> Result<MedicalReport, StoreError>;
    /// Returns None when the id is absent or owned by someone else.
    async fn update_report(
        &self,
        owner: Uuid,
        id: Uuid,
        patch: ReportPatch,
    ) -> Result<Option<MedicalReport>, StoreError>;
    /// Idempotent: absent or foreign ids are a no-op.
    async fn delete_report(&self, owner: Uuid, id: Uuid) -> Result<(), StoreError>;
}

/// Applies a partial update to a report in memory. Shared by the
/// Postgres adapter (read-modify-write) and the in-memory test store so
/// both agree on patch semantics.
pub fn apply_report_patch(report: &mut MedicalReport, patch: ReportPatch) {
    if let Some(title) = patch.title {
        report.title = title;
    }
    if let Some(condition_name) = patch.condition_name {
        report.condition_name = condition_name;
    }
    if let Some(medications) = patch.medications {
        report.medications = medications;
    }
    if let Some(description) = patch.description {
        report.description = description;
    }
    if let Some(start_date) = patch.start_date {
        report.start_date = start_date;
    }
    if let Some(end_date) = patch.end_date {
        report.end_date = end_date;
    }
    if let Some(active) = patch.active {
        report.active = active;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn report() -> MedicalReport {
        let now = Utc::now();
        MedicalReport {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: "Allergy plan".into(),
            condition_name: "Pollen allergy".into(),
            medications: vec!["cetirizine".into()],
            description: Some("Seasonal".into()),
            start_date: now,
            end_date: Some(now),
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn empty_patch_changes_nothing() {
        let mut r = report();
        let before = format!("{:?}", r);
        apply_report_patch(&mut r, ReportPatch::default());
        assert_eq!(before, format!("{:?}", r));
    }

    #[test]
    fn explicit_null_clears_end_date() {
        let mut r = report();
        let patch: ReportPatch = serde_json::from_str(r#"{"end_date":null}"#).unwrap();
        apply_report_patch(&mut r, patch);
        assert_eq!(r.end_date, None);
        // untouched fields survive
        assert_eq!(r.title, "Allergy plan");
    }

    #[test]
    fn provided_fields_overwrite() {
        let mut r = report();
        let patch: ReportPatch =
            serde_json::from_str(r#"{"title":"New title","active":false,"medications":[]}"#)
                .unwrap();
        apply_report_patch(&mut r, patch);
        assert_eq!(r.title, "New title");
        assert!(!r.active);
        assert!(r.medications.is_empty());
        assert_eq!(r.condition_name, "Pollen allergy");
    }
}
