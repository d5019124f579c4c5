use axum::{
    extract::multipart::{Multipart, MultipartRejection},
    extract::rejection::JsonRejection,
    extract::State,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::auth::{Authenticated, UserActor};
use crate::errors::AppError;
use crate::jobs::service;
use crate::state::AppState;
use crate::storage::StagedUpload;

const USER_NOT_FOUND: &str = "User Not Found";
const RESUME_PREFIX: &str = "resumes";

/// GET /api/users/user
pub async fn handle_get_user(
    State(state): State<AppState>,
    Authenticated(actor): Authenticated<UserActor>,
) -> Result<Json<Value>, AppError> {
    let user = state
        .store
        .find_user(&actor.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(USER_NOT_FOUND.to_string()))?;
    Ok(Json(json!({ "success": true, "user": user })))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApplyRequest {
    pub job_id: String,
}

/// POST /api/users/apply
pub async fn handle_apply(
    State(state): State<AppState>,
    Authenticated(actor): Authenticated<UserActor>,
    body: Result<Json<ApplyRequest>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let Json(req) = body?;
    if req.job_id.trim().is_empty() {
        return Err(AppError::Validation("Job ID required".to_string()));
    }
    service::apply_for_job(state.store.as_ref(), &actor.user_id, &req.job_id).await?;
    Ok(Json(json!({ "success": true, "message": "Applied Successfully" })))
}

/// GET /api/users/applications
pub async fn handle_applications(
    State(state): State<AppState>,
    Authenticated(actor): Authenticated<UserActor>,
) -> Result<Json<Value>, AppError> {
    let applications = service::list_user_applications(state.store.as_ref(), &actor.user_id).await?;
    Ok(Json(json!({ "success": true, "applications": applications })))
}

/// POST /api/users/update-resume
pub async fn handle_update_resume(
    State(state): State<AppState>,
    Authenticated(actor): Authenticated<UserActor>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Value>, AppError> {
    let mut multipart = multipart?;

    let mut staged = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("resume") {
            continue;
        }
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let data = field.bytes().await?;
        if !data.is_empty() {
            staged = Some(StagedUpload::stage(file_name, content_type, data).await?);
        }
    }
    let staged = staged.ok_or_else(|| AppError::Validation("Resume file required".to_string()))?;

    if state.store.find_user(&actor.user_id).await?.is_none() {
        return Err(AppError::NotFound(USER_NOT_FOUND.to_string()));
    }

    let url = staged
        .upload(state.objects.as_ref(), RESUME_PREFIX, state.upload_timeout())
        .await?;
    if !state.store.set_user_resume(&actor.user_id, &url).await? {
        return Err(AppError::NotFound(USER_NOT_FOUND.to_string()));
    }

    info!("User {} updated resume", actor.user_id);
    Ok(Json(json!({ "success": true, "message": "Resume Updated" })))
}
