//! Teacher dashboard endpoint

use axum::{extract::State, Json};

use crate::error::ApiResult;
use crate::pipeline::dashboard::{load_dashboard, Dashboard};
use crate::AppState;

/// GET /api/dashboard
///
/// Full aggregation over every check-in: emotion counts in scale order,
/// positive ratio, the nine newest drawings, and the complete table. A failed
/// read surfaces as a store error; the UI reports it before falling back to
/// an empty view.
pub async fn get_dashboard(State(state): State<AppState>) -> ApiResult<Json<Dashboard>> {
    let dashboard = load_dashboard(state.records.as_ref()).await?;
    Ok(Json(dashboard))
}
