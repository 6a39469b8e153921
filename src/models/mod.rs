//! Domain records persisted by the store plus the request/response
//! bodies the API layer accepts.
//!
//! Persisted resources use snake_case wire fields; AI analysis results
//! use camelCase (matching what the provider prompt requests).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Closed severity enumeration for diagnosis results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Mild,
    Moderate,
    Severe,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Mild => "mild",
            Severity::Moderate => "moderate",
            Severity::Severe => "severe",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mild" => Ok(Severity::Mild),
            "moderate" => Ok(Severity::Moderate),
            "severe" => Ok(Severity::Severe),
            _ => Err(()),
        }
    }
}

/// Credential store record. The password hash never leaves the server.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Profile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Diagnosis {
    pub id: Uuid,
    #[serde(skip_serializing)]
    pub user_id: Uuid,
    pub condition_name: String,
    pub confidence_score: f64,
    pub description: String,
    pub severity: Severity,
    pub advice: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MedicalReport {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub condition_name: String,
    pub medications: Vec<String>,
    pub description: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Feedback {
    pub id: Uuid,
    #[serde(skip_serializing)]
    pub user_id: Uuid,
    pub diagnosis_id: Uuid,
    pub is_helpful: bool,
    pub comments: Option<String>,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SigninRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePasswordRequest {
    #[serde(rename = "newPassword")]
    pub new_password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ProfilePatch {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NewDiagnosis {
    pub condition_name: String,
    pub confidence_score: f64,
    pub description: String,
    pub severity: Severity,
    pub advice: String,
}

#[derive(Debug, Deserialize)]
pub struct NewFeedback {
    pub diagnosis_id: Uuid,
    pub is_helpful: bool,
    pub comments: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NewReport {
    pub title: String,
    pub condition_name: String,
    #[serde(default)]
    pub medications: Vec<String>,
    pub description: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub active: bool,
}

/// Partial report update. Absent fields are left untouched; `end_date`
/// and `description` distinguish "absent" from an explicit null so a
/// client can clear them.
#[derive(Debug, Default, Deserialize)]
pub struct ReportPatch {
    pub title: Option<String>,
    pub condition_name: Option<String>,
    pub medications: Option<Vec<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "double_option")]
    pub end_date: Option<Option<DateTime<Utc>>>,
    pub active: Option<bool>,
}

impl ReportPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.condition_name.is_none()
            && self.medications.is_none()
            && self.description.is_none()
            && self.start_date.is_none()
            && self.end_date.is_none()
            && self.active.is_none()
    }
}

/// Deserializes a field that may be absent (outer None), explicitly
/// null (Some(None)), or present (Some(Some(v))).
fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(de).map(Some)
}
