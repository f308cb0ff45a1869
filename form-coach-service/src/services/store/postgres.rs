//! Direct Postgres backend.

use super::{ScanStore, StoreError};
use crate::models::{CoachOutput, FormScan, NewCoachOutput, NewFormScan};
use crate::services::metrics;
use async_trait::async_trait;
use service_core::error::AppError;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::types::Json;
use std::time::{Duration, Instant};
use tracing::{info, instrument};

/// Database connection pool wrapper.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Create a new database connection pool.
    #[instrument(skip(database_url), fields(service = "form-coach-service"))]
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self, AppError> {
        info!(
            max_connections = max_connections,
            min_connections = min_connections,
            "Connecting to PostgreSQL"
        );

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .connect(database_url)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to connect: {}", e)))?;

        info!("PostgreSQL connection pool established");

        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Run database migrations.
    #[instrument(skip(self))]
    pub async fn run_migrations(&self) -> Result<(), AppError> {
        info!("Running database migrations");
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Migration failed: {}", e)))?;
        info!("Database migrations completed");
        Ok(())
    }
}

#[async_trait]
impl ScanStore for PgStore {
    #[instrument(skip(self, row), fields(video_url = %row.video_url))]
    async fn insert_form_scan(&self, row: NewFormScan) -> Result<FormScan, StoreError> {
        let start = Instant::now();

        let scan = sqlx::query_as::<_, FormScan>(
            r#"
            INSERT INTO form_scans (video_url, analysis_data, created_at)
            VALUES ($1, $2, $3)
            RETURNING id, video_url, analysis_data, created_at
            "#,
        )
        .bind(&row.video_url)
        .bind(Json(&row.analysis_data))
        .bind(row.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        metrics::record_db_query("insert_form_scan", start.elapsed().as_secs_f64());

        info!(scan_id = %scan.id, "Form scan stored");

        Ok(scan)
    }

    #[instrument(skip(self, row), fields(scan_id = %row.scan_id))]
    async fn insert_coach_output(&self, row: NewCoachOutput) -> Result<CoachOutput, StoreError> {
        let start = Instant::now();

        let output = sqlx::query_as::<_, CoachOutput>(
            r#"
            INSERT INTO coach_output (scan_id, coaching_text, created_at)
            VALUES ($1, $2, $3)
            RETURNING id, scan_id, coaching_text, created_at
            "#,
        )
        .bind(&row.scan_id)
        .bind(&row.coaching_text)
        .bind(row.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        metrics::record_db_query("insert_coach_output", start.elapsed().as_secs_f64());

        info!(coaching_id = %output.id, "Coaching output stored");

        Ok(output)
    }

    #[instrument(skip(self))]
    async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Unavailable(format!("Health check failed: {}", e)))?;
        Ok(())
    }
}
