//! Analysis domain types

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Lifecycle status of a server-side analysis job
///
/// Status only moves forward: `Pending -> Processing -> {Completed, Failed}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl AnalysisStatus {
    /// Returns true for `Completed` and `Failed`; no transitions leave these.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for AnalysisStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Subscription tier the analysis was produced under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Free,
    Premium,
}

/// Stored analysis record, as returned by `GET /api/analysis/{id}`
///
/// Envelope fields are typed. The analysis sections are large, evolve with the
/// backend's prompts, and are kept as raw JSON. Any field this struct does not
/// name is preserved in `extra`, so re-serializing yields the payload the
/// server sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    #[serde(rename = "_id")]
    pub id: String,
    /// Owner id, or the owner document when the backend populates it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<Value>,
    /// `None` when the photos were not persisted to storage
    pub photos: Option<Photos>,
    pub status: AnalysisStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier: Option<Tier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub larson_analysis: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kibbe_analysis: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archetype_analysis: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub celebrity_matches: Option<Vec<CelebrityMatch>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub integrated_recommendations: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Analysis {
    /// Seasonal color type (`larsonAnalysis.seasonalType.primary`), if present
    pub fn seasonal_type(&self) -> Option<&str> {
        self.larson_analysis
            .as_ref()?
            .pointer("/seasonalType/primary")?
            .as_str()
    }

    /// Kibbe body type (`kibbeAnalysis.kibbeType.result`), if present
    pub fn kibbe_type(&self) -> Option<&str> {
        self.kibbe_analysis
            .as_ref()?
            .pointer("/kibbeType/result")?
            .as_str()
    }
}

/// Uploaded photos attached to an analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Photos {
    pub face_photo: StoredPhoto,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_photo: Option<StoredPhoto>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredPhoto {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<Thumbnail>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thumbnail {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CelebrityMatch {
    pub name: String,
    pub similarity: f64,
    pub match_reason: String,
}
