use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};

use crate::errors::AppError;
use crate::jobs::service;
use crate::state::AppState;

/// GET /api/jobs
pub async fn handle_list_jobs(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let jobs = service::list_visible_jobs(state.store.as_ref()).await?;
    Ok(Json(json!({ "success": true, "jobs": jobs })))
}

/// GET /api/jobs/:id
pub async fn handle_get_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let job = service::get_job(state.store.as_ref(), &id).await?;
    Ok(Json(json!({ "success": true, "job": job })))
}
