//! Test doubles: an in-memory store and a canned chat provider, plus
//! helpers for driving the router in-process.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::ai::{AiGateway, ChatProvider, ProviderError};
use crate::auth::TokenService;
use crate::models::{
    Diagnosis, Feedback, MedicalReport, NewDiagnosis, NewFeedback, NewReport, Profile,
    ReportPatch, User,
};
use crate::routes::AppState;
use crate::store::{apply_report_patch, Store, StoreError};

pub const TEST_SECRET: &str = "test-secret";

/// In-memory [`Store`] with the same owner-scoping and ordering
/// semantics as the Postgres adapter. Records list newest-first by
/// insertion order, which matches `created_at DESC` under a monotonic
/// clock.
#[derive(Default)]
pub struct MemStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    users: Vec<User>,
    profiles: Vec<Profile>,
    diagnoses: Vec<Diagnosis>,
    reports: Vec<MedicalReport>,
    feedback: Vec<Feedback>,
}

#[async_trait]
impl Store for MemStore {
    async fn create_user(&self, email: &str, password_hash: &str) -> Result<User, StoreError> {
        let mut inner = self.inner.lock().await;
        if inner.users.iter().any(|u| u.email == email) {
            return Err(StoreError::DuplicateEmail);
        }
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
        };
        inner.users.push(user.clone());
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner.users.iter().find(|u| u.id == id).cloned())
    }

    async fn update_password_hash(
        &self,
        user_id: Uuid,
        password_hash: &str,
    ) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().await;
        match inner.users.iter_mut().find(|u| u.id == user_id) {
            Some(user) => {
                user.password_hash = password_hash.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn get_profile(&self, owner: Uuid) -> Result<Option<Profile>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner.profiles.iter().find(|p| p.user_id == owner).cloned())
    }

    async fn upsert_profile(
        &self,
        owner: Uuid,
        email: &str,
        name: Option<&str>,
    ) -> Result<Profile, StoreError> {
        let mut inner = self.inner.lock().await;
        if let Some(profile) = inner.profiles.iter_mut().find(|p| p.user_id == owner) {
            if let Some(name) = name {
                profile.name = Some(name.to_string());
            }
            profile.updated_at = Utc::now();
            return Ok(profile.clone());
        }
        let now = Utc::now();
        let profile = Profile {
            id: Uuid::new_v4(),
            user_id: owner,
            email: email.to_string(),
            name: name.map(str::to_string),
            avatar_url: None,
            created_at: now,
            updated_at: now,
        };
        inner.profiles.push(profile.clone());
        Ok(profile)
    }

    async fn list_diagnoses(&self, owner: Uuid) -> Result<Vec<Diagnosis>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .diagnoses
            .iter()
            .rev()
            .filter(|d| d.user_id == owner)
            .cloned()
            .collect())
    }

    async fn create_diagnosis(
        &self,
        owner: Uuid,
        new: NewDiagnosis,
    ) -> Result<Diagnosis, StoreError> {
        let mut inner = self.inner.lock().await;
        let row = Diagnosis {
            id: Uuid::new_v4(),
            user_id: owner,
            condition_name: new.condition_name,
            confidence_score: new.confidence_score,
            description: new.description,
            severity: new.severity,
            advice: new.advice,
            created_at: Utc::now(),
        };
        inner.diagnoses.push(row.clone());
        Ok(row)
    }

    async fn delete_diagnosis(&self, owner: Uuid, id: Uuid) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        inner.diagnoses.retain(|d| !(d.id == id && d.user_id == owner));
        Ok(())
    }

    async fn create_feedback(
        &self,
        owner: Uuid,
        new: NewFeedback,
    ) -> Result<Feedback, StoreError> {
        let mut inner = self.inner.lock().await;
        let row = Feedback {
            id: Uuid::new_v4(),
            user_id: owner,
            diagnosis_id: new.diagnosis_id,
            is_helpful: new.is_helpful,
            comments: new.comments,
            created_at: Utc::now(),
        };
        inner.feedback.push(row.clone());
        Ok(row)
    }

    async fn list_reports(&self, owner: Uuid) -> Result<Vec<MedicalReport>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .reports
            .iter()
            .rev()
            .filter(|r| r.user_id == owner)
            .cloned()
            .collect())
    }

    async fn create_report(
        &self,
        owner: Uuid,
        new: NewReport,
    ) -> Result<MedicalReport, StoreError> {
        let mut inner = self.inner.lock().await;
        let now = Utc::now();
        let row = MedicalReport {
            id: Uuid::new_v4(),
            user_id: owner,
            title: new.title,
            condition_name: new.condition_name,
            medications: new.medications,
            description: new.description,
            start_date: new.start_date,
            end_date: new.end_date,
            active: new.active,
            created_at: now,
            updated_at: now,
        };
        inner.reports.push(row.clone());
        Ok(row)
    }

    async fn update_report(
        &self,
        owner: Uuid,
        id: Uuid,
        patch: ReportPatch,
    ) -> Result<Option<MedicalReport>, StoreError> {
        let mut inner = self.inner.lock().await;
        match inner
            .reports
            .iter_mut()
            .find(|r| r.id == id && r.user_id == owner)
        {
            Some(report) => {
                apply_report_patch(report, patch);
                report.updated_at = Utc::now();
                Ok(Some(report.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete_report(&self, owner: Uuid, id: Uuid) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        inner.reports.retain(|r| !(r.id == id && r.user_id == owner));
        Ok(())
    }
}

impl MemStore {
    /// Total record count across collections, for no-mutation asserts.
    pub async fn record_count(&self) -> usize {
        let inner = self.inner.lock().await;
        inner.users.len()
            + inner.profiles.len()
            + inner.diagnoses.len()
            + inner.reports.len()
            + inner.feedback.len()
    }

    pub async fn profile_count(&self) -> usize {
        self.inner.lock().await.profiles.len()
    }
}

/// Chat provider returning a canned response, or failing when built
/// with [`StubProvider::failing`]. Counts invocations.
pub struct StubProvider {
    response: Option<String>,
    calls: Arc<AtomicUsize>,
}

impl StubProvider {
    pub fn returning(content: &str) -> Self {
        Self {
            response: Some(content.to_string()),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing() -> Self {
        Self {
            response: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl ChatProvider for StubProvider {
    async fn complete_json(
        &self,
        _messages: Vec<Value>,
        _temperature: Option<f32>,
    ) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.response {
            Some(content) => Ok(content.clone()),
            None => Err(ProviderError::EmptyResponse),
        }
    }
}

/// App state over the in-memory store and the given provider.
pub fn test_state(store: Arc<MemStore>, provider: Arc<dyn ChatProvider>) -> AppState {
    AppState {
        store,
        tokens: TokenService::new(TEST_SECRET, 7),
        ai: Arc::new(AiGateway::new(provider)),
        env: "development".to_string(),
    }
}
