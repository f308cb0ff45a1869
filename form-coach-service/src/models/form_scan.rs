//! Persisted form-analysis results.

use super::RecordId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

pub const FORM_SCANS_TABLE: &str = "form_scans";

/// A stored scorecard for one video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct FormScan {
    #[sqlx(try_from = "Uuid")]
    pub id: RecordId,
    pub video_url: String,
    /// Validated scorecard exactly as returned by the model.
    pub analysis_data: Json<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

/// Row to insert. The store assigns the id.
#[derive(Debug, Clone, Serialize)]
pub struct NewFormScan {
    pub video_url: String,
    pub analysis_data: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl NewFormScan {
    pub fn new(video_url: impl Into<String>, analysis_data: serde_json::Value) -> Self {
        Self {
            video_url: video_url.into(),
            analysis_data,
            created_at: Utc::now(),
        }
    }

    pub fn into_stored(self, id: RecordId) -> FormScan {
        FormScan {
            id,
            video_url: self.video_url,
            analysis_data: Json(self.analysis_data),
            created_at: self.created_at,
        }
    }
}
