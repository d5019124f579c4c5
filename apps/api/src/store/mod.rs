//! Persistence boundary for companies, users, jobs and applications.
//!
//! `AppState` holds an `Arc<dyn JobBoardStore>`. Two backends exist:
//! `PgStore` (PostgreSQL via sqlx) and `MemoryStore` (local development and tests).

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::application::{Applicant, Application, NewApplication, UserApplication};
use crate::models::company::{Company, CompanyCredentials, NewCompany};
use crate::models::job::{CompanyJob, Job, JobListing, NewJob};
use crate::models::user::User;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A uniqueness constraint rejected the write.
    #[error("{0}")]
    Conflict(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait JobBoardStore: Send + Sync {
    // Companies
    async fn insert_company(&self, company: NewCompany) -> StoreResult<Company>;
    async fn find_company(&self, id: Uuid) -> StoreResult<Option<Company>>;
    async fn find_company_credentials(&self, email: &str)
        -> StoreResult<Option<CompanyCredentials>>;

    // Users
    async fn upsert_user(&self, user: User) -> StoreResult<User>;
    async fn find_user(&self, id: &str) -> StoreResult<Option<User>>;
    async fn set_user_resume(&self, id: &str, resume_url: &str) -> StoreResult<bool>;
    async fn delete_user(&self, id: &str) -> StoreResult<bool>;

    // Jobs
    async fn insert_job(&self, job: NewJob) -> StoreResult<Job>;
    async fn find_job(&self, id: Uuid) -> StoreResult<Option<Job>>;
    async fn find_job_listing(&self, id: Uuid) -> StoreResult<Option<JobListing>>;
    /// Visible jobs in insertion order.
    async fn list_visible_jobs(&self) -> StoreResult<Vec<JobListing>>;
    /// Jobs owned by `company_id`, each with its current application count.
    async fn list_company_jobs(&self, company_id: Uuid) -> StoreResult<Vec<CompanyJob>>;
    async fn set_job_visibility(&self, id: Uuid, visible: bool) -> StoreResult<Option<Job>>;
    /// Deletes the job and every application referencing it as one unit of work.
    /// Returns the number of applications removed, or `None` if the job did not exist.
    async fn delete_job_cascade(&self, id: Uuid) -> StoreResult<Option<u64>>;

    // Applications
    async fn insert_application(&self, application: NewApplication) -> StoreResult<Application>;
    async fn find_application(&self, id: Uuid) -> StoreResult<Option<Application>>;
    async fn find_user_application(
        &self,
        user_id: &str,
        job_id: Uuid,
    ) -> StoreResult<Option<Application>>;
    async fn count_job_applications(&self, job_id: Uuid) -> StoreResult<i64>;
    /// Applications submitted by `user_id`, in insertion order.
    async fn list_user_applications(&self, user_id: &str) -> StoreResult<Vec<UserApplication>>;
    /// Applications addressed to `company_id`, in insertion order.
    async fn list_company_applicants(&self, company_id: Uuid) -> StoreResult<Vec<Applicant>>;
    /// Returns `false` when no application has this id.
    async fn set_application_status(&self, id: Uuid, status: &str) -> StoreResult<bool>;
}
