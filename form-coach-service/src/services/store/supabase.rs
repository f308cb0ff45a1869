//! Supabase backend: row inserts through the PostgREST API.

use super::{ScanStore, StoreError};
use crate::models::{
    CoachOutput, FormScan, NewCoachOutput, NewFormScan, COACH_OUTPUT_TABLE, FORM_SCANS_TABLE,
};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use service_core::observability::TracedClientExt;
use std::time::Duration;
use tracing::{error, info, instrument};

#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    /// Project URL, e.g. `https://abc.supabase.co`.
    pub url: String,
    pub anon_key: Secret<String>,
    pub timeout: Duration,
}

pub struct SupabaseStore {
    config: SupabaseConfig,
    client: Client,
}

/// Error body returned by PostgREST.
#[derive(Debug, Deserialize)]
struct PostgrestError {
    message: Option<String>,
}

impl SupabaseStore {
    pub fn new(config: SupabaseConfig) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| StoreError::Unavailable(format!("HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.config.url.trim_end_matches('/'), table)
    }

    /// Insert one row and return the representation PostgREST echoes back.
    async fn insert_row<B, R>(&self, table: &str, body: &B) -> Result<R, StoreError>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let key = self.config.anon_key.expose_secret();

        let response = self
            .client
            .traced_post(&self.table_url(table))
            .header("apikey", key)
            .bearer_auth(key)
            .header("Prefer", "return=representation")
            .json(body)
            .send()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<PostgrestError>(&text)
                .ok()
                .and_then(|e| e.message)
                .unwrap_or(text);

            error!(table = table, status = status.as_u16(), message = %message, "Supabase insert failed");

            return Err(StoreError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let rows: Vec<R> = response
            .json()
            .await
            .map_err(|e| StoreError::Database(format!("Failed to decode inserted row: {}", e)))?;

        rows.into_iter().next().ok_or(StoreError::EmptyResult)
    }
}

#[async_trait]
impl ScanStore for SupabaseStore {
    #[instrument(skip(self, row), fields(video_url = %row.video_url))]
    async fn insert_form_scan(&self, row: NewFormScan) -> Result<FormScan, StoreError> {
        let scan: FormScan = self.insert_row(FORM_SCANS_TABLE, &row).await?;
        info!(scan_id = %scan.id, "Form scan stored");
        Ok(scan)
    }

    #[instrument(skip(self, row), fields(scan_id = %row.scan_id))]
    async fn insert_coach_output(&self, row: NewCoachOutput) -> Result<CoachOutput, StoreError> {
        let output: CoachOutput = self.insert_row(COACH_OUTPUT_TABLE, &row).await?;
        info!(coaching_id = %output.id, "Coaching output stored");
        Ok(output)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        let key = self.config.anon_key.expose_secret();
        let url = format!("{}?select=id&limit=1", self.table_url(FORM_SCANS_TABLE));

        let response = self
            .client
            .traced_get(&url)
            .header("apikey", key)
            .bearer_auth(key)
            .send()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(StoreError::Unavailable(format!(
                "Health check failed: {}",
                response.status()
            )))
        }
    }
}
