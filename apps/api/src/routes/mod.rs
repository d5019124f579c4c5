pub mod health;

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::ai::handlers as ai;
use crate::company::{account, handlers as company};
use crate::jobs::handlers as jobs;
use crate::state::AppState;
use crate::users::{handlers as users, webhooks};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::banner_handler))
        .route("/health", get(health::health_handler))
        .route("/webhooks", post(webhooks::handle_identity_webhook))
        // Company (recruiter) API
        .route("/api/company/register", post(account::handle_register))
        .route("/api/company/login", post(account::handle_login))
        .route("/api/company/company", get(account::handle_get_company))
        .route("/api/company/post-job", post(company::handle_post_job))
        .route("/api/company/applicants", get(company::handle_applicants))
        .route("/api/company/list-job", get(company::handle_list_jobs))
        .route("/api/company/change-status", post(company::handle_change_status))
        .route(
            "/api/company/change-visibility",
            post(company::handle_change_visibility),
        )
        .route("/api/company/delete-job", delete(company::handle_delete_job))
        .route(
            "/api/company/ai/match-candidate",
            post(ai::handle_match_candidate),
        )
        .route(
            "/api/company/ai/generate-job-description",
            post(ai::handle_generate_job_description),
        )
        .route(
            "/api/company/ai/candidate-summary",
            post(ai::handle_candidate_summary),
        )
        // Public job board API
        .route("/api/jobs", get(jobs::handle_list_jobs))
        .route("/api/jobs/:id", get(jobs::handle_get_job))
        .route("/api/jobs/ai/analyze-resume", post(ai::handle_analyze_resume))
        .route("/api/jobs/ai/job-matching", post(ai::handle_job_matching))
        // User (job seeker) API
        .route("/api/users/user", get(users::handle_get_user))
        .route("/api/users/apply", post(users::handle_apply))
        .route("/api/users/applications", get(users::handle_applications))
        .route("/api/users/update-resume", post(users::handle_update_resume))
        .with_state(state)
}
