use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::{Authenticated, CompanyActor};
use crate::errors::AppError;
use crate::jobs::service::{self, PostJobRequest};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct JobIdRequest {
    pub id: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StatusChangeRequest {
    pub id: String,
    pub status: String,
}

fn required(value: &str) -> Result<&str, AppError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::Validation("Missing Details".to_string()));
    }
    Ok(value)
}

/// POST /api/company/post-job
pub async fn handle_post_job(
    State(state): State<AppState>,
    Authenticated(CompanyActor(company)): Authenticated<CompanyActor>,
    body: Result<Json<PostJobRequest>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let Json(req) = body?;
    let job = service::post_job(state.store.as_ref(), company.id, req).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Job added successfully",
        "newJob": job,
    })))
}

/// GET /api/company/applicants
pub async fn handle_applicants(
    State(state): State<AppState>,
    Authenticated(CompanyActor(company)): Authenticated<CompanyActor>,
) -> Result<Json<Value>, AppError> {
    let applications = service::list_company_applicants(state.store.as_ref(), company.id).await?;
    Ok(Json(json!({ "success": true, "applications": applications })))
}

/// GET /api/company/list-job
pub async fn handle_list_jobs(
    State(state): State<AppState>,
    Authenticated(CompanyActor(company)): Authenticated<CompanyActor>,
) -> Result<Json<Value>, AppError> {
    let jobs = service::list_company_jobs(state.store.as_ref(), company.id).await?;
    Ok(Json(json!({ "success": true, "jobsData": jobs })))
}

/// POST /api/company/change-status
pub async fn handle_change_status(
    State(state): State<AppState>,
    Authenticated(CompanyActor(company)): Authenticated<CompanyActor>,
    body: Result<Json<StatusChangeRequest>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let Json(req) = body?;
    service::change_application_status(
        state.store.as_ref(),
        state.config.ownership_policy,
        company.id,
        required(&req.id)?,
        required(&req.status)?,
    )
    .await?;
    Ok(Json(json!({ "success": true, "message": "Status changed" })))
}

/// POST /api/company/change-visibility
pub async fn handle_change_visibility(
    State(state): State<AppState>,
    Authenticated(CompanyActor(company)): Authenticated<CompanyActor>,
    body: Result<Json<JobIdRequest>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let Json(req) = body?;
    let job = service::toggle_visibility(
        state.store.as_ref(),
        state.config.ownership_policy,
        company.id,
        required(&req.id)?,
    )
    .await?;
    Ok(Json(json!({ "success": true, "job": job })))
}

/// DELETE /api/company/delete-job?id=<job id>
pub async fn handle_delete_job(
    State(state): State<AppState>,
    Authenticated(CompanyActor(company)): Authenticated<CompanyActor>,
    query: Result<Query<JobIdRequest>, QueryRejection>,
) -> Result<Json<Value>, AppError> {
    let Query(req) = query?;
    let removed = service::delete_job(state.store.as_ref(), company.id, required(&req.id)?).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Job deleted successfully",
        "removedApplications": removed,
    })))
}
