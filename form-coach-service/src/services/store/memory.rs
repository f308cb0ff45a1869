//! In-process store for local runs and tests.

use super::{ScanStore, StoreError};
use crate::models::{CoachOutput, FormScan, NewCoachOutput, NewFormScan, RecordId};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
pub struct InMemoryStore {
    form_scans: RwLock<Vec<FormScan>>,
    coach_outputs: RwLock<Vec<CoachOutput>>,
    fail_inserts: AtomicBool,
    unavailable: AtomicBool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent insert fail with a database error.
    pub fn set_fail_inserts(&self, fail: bool) {
        self.fail_inserts.store(fail, Ordering::SeqCst);
    }

    /// Make the health check fail.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub async fn form_scans(&self) -> Vec<FormScan> {
        self.form_scans.read().await.clone()
    }

    pub async fn coach_outputs(&self) -> Vec<CoachOutput> {
        self.coach_outputs.read().await.clone()
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(StoreError::Database(
                "insert rejected by in-memory store".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl ScanStore for InMemoryStore {
    async fn insert_form_scan(&self, row: NewFormScan) -> Result<FormScan, StoreError> {
        self.check_writable()?;
        let scan = row.into_stored(RecordId::from(Uuid::new_v4()));
        self.form_scans.write().await.push(scan.clone());
        Ok(scan)
    }

    async fn insert_coach_output(&self, row: NewCoachOutput) -> Result<CoachOutput, StoreError> {
        self.check_writable()?;
        let output = row.into_stored(RecordId::from(Uuid::new_v4()));
        self.coach_outputs.write().await.push(output.clone());
        Ok(output)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("in-memory store marked unavailable".to_string()));
        }
        Ok(())
    }
}
