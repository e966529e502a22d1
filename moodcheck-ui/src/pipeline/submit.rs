//! Submission pipeline
//!
//! Persists one student check-in: flatten the drawing, upload the JPEG, then
//! append the record. Both validation checks run before any remote call.
//!
//! The two persistence steps are not transactional. When the record append
//! fails after a successful upload, the artifact stays behind with no
//! referencing record; this known gap is logged rather than reconciled.

use chrono::Local;
use moodcheck_common::image::{flatten_to_jpeg, RgbaCanvas};
use moodcheck_common::model::artifact_name;
use moodcheck_common::{Emotion, Error, NewEmotionRecord, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::store::{ArtifactStore, RecordStore};

/// One validated student submission
#[derive(Debug)]
pub struct SubmitRequest {
    pub student_name: String,
    pub emotion: Emotion,
    pub canvas: RgbaCanvas,
}

/// User-visible confirmation of a saved check-in
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitReceipt {
    pub student_name: String,
    pub emotion: String,
    /// "%Y-%m-%d %H:%M:%S" at the moment the record's timestamp was captured
    pub saved_at: String,
    pub drawing_url: String,
}

/// Persist one check-in.
///
/// The timestamp is captured once and reused for the artifact name, `date`,
/// `time`, and `created_at`, so a single record is internally consistent.
pub async fn submit_checkin(
    artifacts: &dyn ArtifactStore,
    records: &dyn RecordStore,
    request: SubmitRequest,
) -> Result<SubmitReceipt> {
    let student_name = request.student_name.trim();
    if student_name.is_empty() {
        return Err(Error::InvalidInput("Student name must not be empty".into()));
    }
    if request.canvas.is_blank() {
        return Err(Error::InvalidInput("Drawing must not be empty".into()));
    }

    let timestamp = Local::now();
    let jpeg = flatten_to_jpeg(&request.canvas)?;

    let drawing_path = artifact_name(student_name, timestamp);
    let drawing_url = artifacts
        .upload(&drawing_path, jpeg, "image/jpeg")
        .await?;

    let record = NewEmotionRecord::new(
        student_name.to_string(),
        request.emotion,
        drawing_url.clone(),
        drawing_path.clone(),
        timestamp,
    );

    if let Err(e) = records.append(record).await {
        // Orphaned artifact: uploaded but never referenced. Accepted gap;
        // no cleanup sweep exists, so leave a trace for manual reconciliation.
        warn!(
            artifact = %drawing_path,
            "Record append failed after upload, artifact orphaned: {}",
            e
        );
        return Err(e);
    }

    info!(student = %student_name, emotion = %request.emotion.label(), "Check-in saved");

    Ok(SubmitReceipt {
        student_name: student_name.to_string(),
        emotion: request.emotion.display(),
        saved_at: timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
        drawing_url,
    })
}
