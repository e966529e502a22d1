//! Student check-in endpoint

use axum::{extract::State, Json};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use moodcheck_common::image::RgbaCanvas;
use moodcheck_common::Emotion;
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::pipeline::submit::{self, SubmitReceipt, SubmitRequest};
use crate::AppState;

/// Raw canvas capture from the drawing surface
#[derive(Debug, Deserialize)]
pub struct CanvasPayload {
    pub width: u32,
    pub height: u32,
    /// Base64-encoded RGBA8 pixel buffer, row-major
    pub pixels: String,
}

/// POST /api/checkin request body
#[derive(Debug, Deserialize)]
pub struct CheckinRequest {
    pub student_name: String,
    /// One of the five emotion labels
    pub emotion: Emotion,
    pub canvas: CanvasPayload,
}

/// POST /api/checkin
///
/// Persists one student check-in. Validation (name presence, non-blank
/// drawing) happens before any remote call; a failure in either store
/// surfaces as one generic error.
pub async fn submit_checkin(
    State(state): State<AppState>,
    Json(request): Json<CheckinRequest>,
) -> ApiResult<Json<SubmitReceipt>> {
    let pixels = BASE64
        .decode(request.canvas.pixels.as_bytes())
        .map_err(|e| ApiError::BadRequest(format!("Canvas payload is not valid base64: {}", e)))?;

    let canvas = RgbaCanvas::new(request.canvas.width, request.canvas.height, pixels)?;

    let receipt = submit::submit_checkin(
        state.artifacts.as_ref(),
        state.records.as_ref(),
        SubmitRequest {
            student_name: request.student_name,
            emotion: request.emotion,
            canvas,
        },
    )
    .await?;

    Ok(Json(receipt))
}
