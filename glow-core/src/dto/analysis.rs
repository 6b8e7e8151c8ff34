//! Analysis DTOs

use serde::{Deserialize, Serialize};

use crate::domain::analysis::{Analysis, AnalysisStatus};

/// Body of `POST /api/analysis/create`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAnalysisRequest {
    /// Base64-encoded face photo, required and non-empty
    pub face_photo_base64: String,
    /// Base64-encoded full-body photo
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_photo_base64: Option<String>,
}

impl CreateAnalysisRequest {
    pub fn new(face_photo_base64: impl Into<String>) -> Self {
        Self {
            face_photo_base64: face_photo_base64.into(),
            body_photo_base64: None,
        }
    }

    pub fn with_body_photo(mut self, body_photo_base64: impl Into<String>) -> Self {
        self.body_photo_base64 = Some(body_photo_base64.into());
        self
    }
}

/// Response of `POST /api/analysis/create`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAnalysisResponse {
    pub analysis_id: String,
    pub status: AnalysisStatus,
    /// Human-readable estimate, e.g. "2-3 minutes"
    #[serde(default)]
    pub estimated_time: String,
    #[serde(default)]
    pub message: String,
}

/// Response of `GET /api/analysis/{id}/status`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisStatusResponse {
    pub status: AnalysisStatus,
    /// Server-supplied failure reason, only meaningful when `status` is `failed`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Response of `GET /api/analysis/{id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetAnalysisResponse {
    pub analysis: Analysis,
}

/// Response of `GET /api/analysis/user/all`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserAnalysesResponse {
    pub analyses: Vec<Analysis>,
    pub count: usize,
}

/// Error body the backend sends with 4xx/5xx responses
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}
