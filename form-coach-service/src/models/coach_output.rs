//! Persisted coaching summaries.

use super::RecordId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const COACH_OUTPUT_TABLE: &str = "coach_output";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct CoachOutput {
    #[sqlx(try_from = "Uuid")]
    pub id: RecordId,
    /// Reference to a form scan; not checked against `form_scans`.
    pub scan_id: String,
    pub coaching_text: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewCoachOutput {
    pub scan_id: String,
    pub coaching_text: String,
    pub created_at: DateTime<Utc>,
}

impl NewCoachOutput {
    pub fn new(scan_id: impl Into<String>, coaching_text: impl Into<String>) -> Self {
        Self {
            scan_id: scan_id.into(),
            coaching_text: coaching_text.into(),
            created_at: Utc::now(),
        }
    }

    pub fn into_stored(self, id: RecordId) -> CoachOutput {
        CoachOutput {
            id,
            scan_id: self.scan_id,
            coaching_text: self.coaching_text,
            created_at: self.created_at,
        }
    }
}
