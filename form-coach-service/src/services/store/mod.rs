//! Persistence backends for form scans and coaching output.

pub mod memory;
pub mod postgres;
pub mod supabase;

use crate::models::{CoachOutput, FormScan, NewCoachOutput, NewFormScan};
use async_trait::async_trait;
use thiserror::Error;

pub use memory::InMemoryStore;
pub use postgres::PgStore;
pub use supabase::{SupabaseConfig, SupabaseStore};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),

    /// Non-2xx from a REST backend; `message` is the backend's own text.
    #[error("Store API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Store returned no row")]
    EmptyResult,

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Text placed in the `details` field of a persistence failure response.
    pub fn details(&self) -> String {
        match self {
            StoreError::Api { message, .. } => message.clone(),
            StoreError::Database(msg) | StoreError::Unavailable(msg) => msg.clone(),
            StoreError::EmptyResult => self.to_string(),
        }
    }
}

/// Row storage for both handlers. Inserts are single-row and never retried.
#[async_trait]
pub trait ScanStore: Send + Sync {
    async fn insert_form_scan(&self, row: NewFormScan) -> Result<FormScan, StoreError>;

    async fn insert_coach_output(&self, row: NewCoachOutput) -> Result<CoachOutput, StoreError>;

    async fn health_check(&self) -> Result<(), StoreError>;
}
