//! Backend store abstractions
//!
//! The three remote collaborators (object storage, document store, identity
//! provider) sit behind narrow traits so the submission and dashboard
//! pipelines run unchanged against the Firebase REST backend or the in-memory
//! backend used by tests and local development.

use async_trait::async_trait;
use moodcheck_common::{EmotionRecord, NewEmotionRecord, Result};

pub mod firebase;
pub mod memory;

pub use firebase::{FirebaseAuthClient, FirebaseStorageClient, FirestoreClient};
pub use memory::{MemoryAuthProvider, MemoryRecordStore, MemoryArtifactStore};

/// Durable object storage for drawing artifacts
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Store `bytes` under `name`, publicly readable, and return a stable
    /// directly-fetchable URL. Callers are responsible for choosing a name
    /// that will not silently overwrite an earlier upload.
    async fn upload(&self, name: &str, bytes: Vec<u8>, content_type: &str) -> Result<String>;
}

/// Append-only collection of check-in records
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Persist one record; returns the store-generated id
    async fn append(&self, record: NewEmotionRecord) -> Result<String>;

    /// Every record, newest first by `created_at`. No pagination; the
    /// collection is classroom-scale (tens to low hundreds of records).
    async fn list_all(&self) -> Result<Vec<EmotionRecord>>;
}

/// External identity provider for the teacher account
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Verify an email/password pair; returns an opaque session token.
    /// Every failure cause maps to the single undifferentiated
    /// `Error::Auth` so callers cannot leak which part was wrong.
    async fn sign_in(&self, email: &str, password: &str) -> Result<String>;
}
