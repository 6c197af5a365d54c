use serde::{Deserialize, Serialize};

use crate::domain::{Diagnosis, HandlingOption};

pub const DIAGNOSE_PATH: &str = "/api/diagnose";
pub const CHAT_PATH: &str = "/api/chat";
pub const DETAILS_PATH: &str = "/api/details";
/// Multipart field carrying the leaf image.
pub const IMAGE_FIELD: &str = "image";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    pub data: T,
}

/// `data` of a diagnosis response. Deployments disagree on whether the prose is
/// called `description` or `initial_response`, so both are accepted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosisData {
    pub disease_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_response: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handling_options: Option<Vec<HandlingOption>>,
}

impl From<DiagnosisData> for Diagnosis {
    fn from(value: DiagnosisData) -> Self {
        Self {
            disease_name: value.disease_name,
            confidence: value.confidence,
            description: value
                .description
                .or(value.initial_response)
                .unwrap_or_default(),
            handling_options: value.handling_options.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub question: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatData {
    pub answer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailsQuery {
    pub disease_name: String,
    pub info_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailsData {
    pub text: String,
}
