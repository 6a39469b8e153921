//! AI gateway: builds provider prompts for symptom and pill analysis
//! and normalizes whatever comes back into the domain result shapes.
//!
//! Symptom analysis always degrades to a synthetic fallback condition,
//! so a well-formed request never sees an empty list or a 5xx. Pill
//! analysis propagates provider failures as errors (the historical
//! behavior, kept for compatibility).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::Severity;

pub mod provider;

pub use provider::{ChatProvider, OpenAiProvider, ProviderError};

const DEFAULT_DESCRIPTION: &str = "No detailed description available for this condition.";
const DEFAULT_ADVICE: &str = "Please consult with a healthcare professional.";

const FALLBACK_DESCRIPTION_EN: &str = "Our system encountered an error analyzing your symptoms.";
const FALLBACK_ADVICE_EN: &str = "Please try again or consult with a healthcare professional.";
const FALLBACK_DESCRIPTION_HI: &str =
    "हमारी प्रणाली आपके लक्षणों का विश्लेषण करने में त्रुटि का सामना कर रही है।";
const FALLBACK_ADVICE_HI: &str =
    "कृपया फिर से प्रयास करें या स्वास्थ्य देखभाल पेशेवर से परामर्श करें।";

#[derive(Debug, Deserialize)]
pub struct SymptomRequest {
    pub symptoms: Option<Vec<String>>,
    pub description: Option<String>,
    pub language: Option<String>,
}

impl SymptomRequest {
    fn has_input(&self) -> bool {
        let has_symptoms = self.symptoms.as_ref().is_some_and(|s| !s.is_empty());
        let has_description = self.description.as_ref().is_some_and(|d| !d.trim().is_empty());
        has_symptoms || has_description
    }
}

/// A single analyzed condition as returned to the client.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzedCondition {
    pub id: Uuid,
    pub condition_name: String,
    pub confidence_score: f64,
    pub severity: Severity,
    pub description: String,
    pub advice: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct PillRequest {
    pub image: Option<String>,
    #[serde(rename = "pillName")]
    pub pill_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PillAnalysis {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub purpose: String,
    #[serde(default)]
    pub dosage: String,
    #[serde(default)]
    pub instructions: String,
    #[serde(default)]
    pub warnings: Vec<String>,
    #[serde(rename = "imageUrl", skip_serializing_if = "Option::is_none", default)]
    pub image_url: Option<String>,
}

pub struct AiGateway {
    provider: Arc<dyn ChatProvider>,
}

impl AiGateway {
    pub fn new(provider: Arc<dyn ChatProvider>) -> Self {
        Self { provider }
    }

    /// Analyze symptoms. Fails only on empty input; provider and parse
    /// failures degrade to the synthetic fallback condition.
    pub async fn analyze_symptoms(
        &self,
        request: SymptomRequest,
    ) -> Result<Vec<AnalyzedCondition>, ApiError> {
        if !request.has_input() {
            return Err(ApiError::bad_request(
                "Either symptoms or description is required",
            ));
        }

        let language = request
            .language
            .as_deref()
            .unwrap_or("english")
            .to_lowercase();

        let mut conditions = match self
            .provider
            .complete_json(symptom_messages(&request), Some(0.2))
            .await
        {
            Ok(content) => normalize_conditions(&content),
            Err(e) => {
                tracing::error!("analyze-symptoms provider error: {}", e);
                Vec::new()
            }
        };

        if conditions.is_empty() {
            conditions.push(fallback_condition(&language));
        }

        Ok(conditions)
    }

    /// Analyze a pill by image or name. Provider and parse failures
    /// surface as errors here.
    pub async fn analyze_pill(&self, request: PillRequest) -> Result<PillAnalysis, ApiError> {
        if request.image.is_none() && request.pill_name.is_none() {
            return Err(ApiError::bad_request(
                "Either image data or pill name is required",
            ));
        }

        let content = self
            .provider
            .complete_json(pill_messages(&request), None)
            .await
            .map_err(|e| {
                tracing::error!("analyze-pill provider error: {}", e);
                ApiError::internal_server_error("AI error")
            })?;

        let mut analysis: PillAnalysis = serde_json::from_str(&content).map_err(|e| {
            tracing::error!("analyze-pill parse error: {}", e);
            ApiError::internal_server_error("AI error")
        })?;

        // Echo the input image back so the client can render it with
        // the result.
        if request.image.is_some() {
            analysis.image_url = request.image;
        }

        Ok(analysis)
    }
}

fn symptom_messages(request: &SymptomRequest) -> Vec<Value> {
    let system_prompt = "You are an AI medical assistant that analyzes symptoms to suggest \
possible conditions. For each condition, provide:\n\
- conditionName (string)\n\
- confidenceScore (number 1-100)\n\
- severity (\"mild\" | \"moderate\" | \"severe\")\n\
- description (string)\n\
- advice (string)\n\
Respond ONLY as JSON: {\"conditions\":[{...}]}\n\
Detect Hindi/Hinglish and respond in the same language if applicable.";

    let symptoms_text = match &request.symptoms {
        Some(s) if !s.is_empty() => format!("Symptoms reported: {}. ", s.join(", ")),
        _ => String::new(),
    };
    let description_text = match &request.description {
        Some(d) if !d.trim().is_empty() => format!("Patient description: {}. ", d),
        _ => String::new(),
    };

    vec![
        json!({ "role": "system", "content": system_prompt }),
        json!({
            "role": "user",
            "content": format!(
                "{}{}Please analyze these symptoms and provide possible conditions. \
                 Respond in the same language as the input (Hindi, Hinglish, or English).",
                symptoms_text, description_text
            ),
        }),
    ]
}

fn pill_messages(request: &PillRequest) -> Vec<Value> {
    if let Some(image) = &request.image {
        vec![
            json!({
                "role": "system",
                "content": "You are a pharmaceutical expert. Analyze images of medications and \
                            provide JSON {\"name\":\"\",\"purpose\":\"\",\"dosage\":\"\",\
                            \"instructions\":\"\",\"warnings\":[\"...\"]}",
            }),
            json!({
                "role": "user",
                "content": [
                    { "type": "text", "text": "Identify this pill/medication and provide details about it." },
                    { "type": "image_url", "image_url": { "url": image } },
                ],
            }),
        ]
    } else {
        let name = request.pill_name.as_deref().unwrap_or_default();
        vec![
            json!({
                "role": "system",
                "content": "You are a pharmaceutical expert. Provide details about medications \
                            by name as JSON {\"name\":\"\",\"purpose\":\"\",\"dosage\":\"\",\
                            \"instructions\":\"\",\"warnings\":[\"...\"]}",
            }),
            json!({
                "role": "user",
                "content": format!("Provide information about the medication called: {}", name),
            }),
        ]
    }
}

/// Parses provider output and normalizes each condition. Anything that
/// is not a JSON object with a `conditions` array yields an empty set.
fn normalize_conditions(content: &str) -> Vec<AnalyzedCondition> {
    let parsed: Value = match serde_json::from_str(content) {
        Ok(v) => v,
        Err(_) => return Vec::new(),
    };

    let Some(raw) = parsed.get("conditions").and_then(Value::as_array) else {
        return Vec::new();
    };

    let now = Utc::now();
    raw.iter()
        .map(|c| AnalyzedCondition {
            id: Uuid::new_v4(),
            condition_name: c["conditionName"]
                .as_str()
                .unwrap_or("Unknown condition")
                .to_string(),
            confidence_score: c["confidenceScore"].as_f64().unwrap_or(50.0),
            severity: c["severity"]
                .as_str()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Severity::Moderate),
            description: c["description"]
                .as_str()
                .unwrap_or(DEFAULT_DESCRIPTION)
                .to_string(),
            advice: c["advice"].as_str().unwrap_or(DEFAULT_ADVICE).to_string(),
            created_at: now,
        })
        .collect()
}

/// The single synthetic condition returned when analysis produced
/// nothing usable.
fn fallback_condition(language: &str) -> AnalyzedCondition {
    let hindi = language.contains("hindi");
    AnalyzedCondition {
        id: Uuid::new_v4(),
        condition_name: "Analysis Failed".to_string(),
        confidence_score: 0.0,
        severity: Severity::Moderate,
        description: if hindi {
            FALLBACK_DESCRIPTION_HI.to_string()
        } else {
            FALLBACK_DESCRIPTION_EN.to_string()
        },
        advice: if hindi {
            FALLBACK_ADVICE_HI.to_string()
        } else {
            FALLBACK_ADVICE_EN.to_string()
        },
        created_at: Utc::now(),
    }
}
