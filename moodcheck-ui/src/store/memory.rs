//! In-memory store backends
//!
//! Used by the integration tests and for local development without Firebase
//! credentials. Behavior mirrors the remote backend contracts: append-only
//! records returned newest-first, uploads keyed by object name (a duplicate
//! name silently overwrites, matching the remote store), and a single
//! configured teacher credential pair.

use async_trait::async_trait;
use moodcheck_common::{EmotionRecord, Error, NewEmotionRecord, Result};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;
use uuid::Uuid;

use super::{ArtifactStore, AuthProvider, RecordStore};

/// One stored artifact
#[derive(Debug, Clone)]
pub struct StoredArtifact {
    pub name: String,
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// In-memory artifact store
#[derive(Default)]
pub struct MemoryArtifactStore {
    uploads: Mutex<Vec<StoredArtifact>>,
    fail_uploads: AtomicBool,
    calls: AtomicU64,
}

impl MemoryArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent upload fail with a store error
    pub fn fail_uploads(&self, fail: bool) {
        self.fail_uploads.store(fail, Ordering::SeqCst);
    }

    /// Number of upload attempts, including failed ones
    pub fn call_count(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn uploads(&self) -> Vec<StoredArtifact> {
        self.uploads.lock().unwrap().clone()
    }
}

#[async_trait]
impl ArtifactStore for MemoryArtifactStore {
    async fn upload(&self, name: &str, bytes: Vec<u8>, content_type: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(Error::Store("Artifact store unavailable".into()));
        }

        let mut uploads = self.uploads.lock().unwrap();
        match uploads.iter_mut().find(|artifact| artifact.name == name) {
            // Duplicate names overwrite, like the remote bucket
            Some(existing) => {
                existing.bytes = bytes;
                existing.content_type = content_type.to_string();
            }
            None => uploads.push(StoredArtifact {
                name: name.to_string(),
                bytes,
                content_type: content_type.to_string(),
            }),
        }

        Ok(format!("memory://artifacts/{}", name))
    }
}

/// In-memory record store
#[derive(Default)]
pub struct MemoryRecordStore {
    records: Mutex<Vec<EmotionRecord>>,
    fail_appends: AtomicBool,
    fail_reads: AtomicBool,
    append_calls: AtomicU64,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with existing records (for dashboard tests)
    pub fn with_records(records: Vec<EmotionRecord>) -> Self {
        Self {
            records: Mutex::new(records),
            ..Self::default()
        }
    }

    pub fn fail_appends(&self, fail: bool) {
        self.fail_appends.store(fail, Ordering::SeqCst);
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Number of append attempts, including failed ones
    pub fn append_call_count(&self) -> u64 {
        self.append_calls.load(Ordering::SeqCst)
    }

    pub fn records(&self) -> Vec<EmotionRecord> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn append(&self, record: NewEmotionRecord) -> Result<String> {
        self.append_calls.fetch_add(1, Ordering::SeqCst);

        if self.fail_appends.load(Ordering::SeqCst) {
            return Err(Error::Store("Record store unavailable".into()));
        }

        let id = Uuid::new_v4().to_string();
        self.records
            .lock()
            .unwrap()
            .push(record.into_record(id.clone()));
        Ok(id)
    }

    async fn list_all(&self) -> Result<Vec<EmotionRecord>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(Error::Store("Record store unavailable".into()));
        }

        let mut records = self.records.lock().unwrap().clone();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }
}

/// In-memory identity provider with one configured teacher account
pub struct MemoryAuthProvider {
    email: String,
    password: String,
}

impl MemoryAuthProvider {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

#[async_trait]
impl AuthProvider for MemoryAuthProvider {
    async fn sign_in(&self, email: &str, password: &str) -> Result<String> {
        if email == self.email && password == self.password {
            Ok(format!("memory-token-{}", Uuid::new_v4()))
        } else {
            Err(Error::Auth)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_duplicate_artifact_name_overwrites() {
        let store = MemoryArtifactStore::new();
        store
            .upload("drawings/a.jpg", vec![1], "image/jpeg")
            .await
            .unwrap();
        store
            .upload("drawings/a.jpg", vec![2, 2], "image/jpeg")
            .await
            .unwrap();

        let uploads = store.uploads();
        assert_eq!(uploads.len(), 1);
        assert_eq!(uploads[0].bytes, vec![2, 2]);
    }

    #[tokio::test]
    async fn test_distinct_names_are_kept_separately() {
        let store = MemoryArtifactStore::new();
        store
            .upload("drawings/a.jpg", vec![1], "image/jpeg")
            .await
            .unwrap();
        store
            .upload("drawings/b.jpg", vec![2], "image/jpeg")
            .await
            .unwrap();

        assert_eq!(store.uploads().len(), 2);
        assert_eq!(store.call_count(), 2);
    }
}
