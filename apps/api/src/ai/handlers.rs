use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::ai::run_task;
use crate::ai::tasks::{
    CandidateMatchTask, CandidateSummaryTask, JobDescriptionTask, ResumeScoreTask, SkillMatchTask,
};
use crate::auth::{Authenticated, CompanyActor};
use crate::errors::AppError;
use crate::jobs::service;
use crate::state::AppState;

/// POST /api/jobs/ai/analyze-resume
pub async fn handle_analyze_resume(
    State(state): State<AppState>,
    body: Result<Json<ResumeScoreTask>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let Json(task) = body?;
    let data = run_task(state.ai.as_ref(), &task, state.ai_timeout()).await?;
    Ok(Json(json!({ "success": true, "data": data })))
}

/// POST /api/jobs/ai/job-matching
pub async fn handle_job_matching(
    State(state): State<AppState>,
    body: Result<Json<SkillMatchTask>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let Json(task) = body?;
    let data = run_task(state.ai.as_ref(), &task, state.ai_timeout()).await?;
    Ok(Json(json!({ "success": true, "data": data })))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MatchCandidateRequest {
    pub resume_text: String,
    pub job_id: String,
}

/// POST /api/company/ai/match-candidate
///
/// Title and description come from the stored job, which must belong to the caller.
pub async fn handle_match_candidate(
    State(state): State<AppState>,
    Authenticated(CompanyActor(company)): Authenticated<CompanyActor>,
    body: Result<Json<MatchCandidateRequest>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let Json(req) = body?;
    if req.resume_text.trim().is_empty() || req.job_id.trim().is_empty() {
        return Err(AppError::Validation(
            "Resume text and job ID required".to_string(),
        ));
    }

    let job = service::owned_job(state.store.as_ref(), company.id, &req.job_id).await?;
    let task = CandidateMatchTask {
        resume_text: req.resume_text,
        job_title: job.title,
        job_description: job.description,
    };
    let data = run_task(state.ai.as_ref(), &task, state.ai_timeout()).await?;
    Ok(Json(json!({ "success": true, "data": data })))
}

/// POST /api/company/ai/generate-job-description
pub async fn handle_generate_job_description(
    State(state): State<AppState>,
    Authenticated(_company): Authenticated<CompanyActor>,
    body: Result<Json<JobDescriptionTask>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let Json(task) = body?;
    let data = run_task(state.ai.as_ref(), &task, state.ai_timeout()).await?;
    Ok(Json(json!({ "success": true, "data": data })))
}

/// POST /api/company/ai/candidate-summary
pub async fn handle_candidate_summary(
    State(state): State<AppState>,
    Authenticated(_company): Authenticated<CompanyActor>,
    body: Result<Json<CandidateSummaryTask>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let Json(task) = body?;
    let data = run_task(state.ai.as_ref(), &task, state.ai_timeout()).await?;
    Ok(Json(json!({ "success": true, "data": data })))
}
