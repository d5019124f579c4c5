use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::info;
use uuid::Uuid;

use crate::models::application::{
    Applicant, ApplicantProfile, Application, ApplicationStatus, CompanySummary, JobSummary,
    NewApplication, UserApplication,
};
use crate::models::company::{Company, CompanyCredentials, NewCompany};
use crate::models::job::{CompanyJob, Job, JobListing, NewJob};
use crate::models::user::User;
use crate::store::{JobBoardStore, StoreError, StoreResult};

const JOB_COLUMNS: &str = "j.id, j.title, j.description, j.location, j.category, j.level, \
    j.salary, j.visible, j.created_at, j.company_id";

/// PostgreSQL backend. Schema lives in `migrations/`.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("Database migrations applied");
        Ok(())
    }
}

/// Maps unique-constraint violations to `StoreError::Conflict`.
fn conflict_on_unique(err: sqlx::Error, message: impl FnOnce() -> String) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            return StoreError::Conflict(message());
        }
    }
    StoreError::Database(err)
}

#[derive(FromRow)]
struct JobListingRow {
    #[sqlx(flatten)]
    job: Job,
    company_name: String,
    company_email: String,
    company_image: String,
}

impl From<JobListingRow> for JobListing {
    fn from(row: JobListingRow) -> Self {
        let company = Company {
            id: row.job.company_id,
            name: row.company_name,
            email: row.company_email,
            image: row.company_image,
        };
        JobListing {
            job: row.job,
            company,
        }
    }
}

#[derive(FromRow)]
struct CompanyJobRow {
    #[sqlx(flatten)]
    job: Job,
    applicants: i64,
}

#[derive(FromRow)]
struct UserApplicationRow {
    id: Uuid,
    status: String,
    created_at: DateTime<Utc>,
    company_id: Uuid,
    company_name: String,
    company_email: String,
    company_image: String,
    job_id: Uuid,
    title: String,
    description: String,
    location: String,
    category: String,
    level: String,
    salary: f64,
}

impl From<UserApplicationRow> for UserApplication {
    fn from(row: UserApplicationRow) -> Self {
        UserApplication {
            id: row.id,
            status: row.status,
            created_at: row.created_at,
            company: CompanySummary {
                id: row.company_id,
                name: row.company_name,
                email: row.company_email,
                image: row.company_image,
            },
            job: JobSummary {
                id: row.job_id,
                title: row.title,
                description: Some(row.description),
                location: row.location,
                category: row.category,
                level: row.level,
                salary: row.salary,
            },
        }
    }
}

#[derive(FromRow)]
struct ApplicantRow {
    id: Uuid,
    status: String,
    created_at: DateTime<Utc>,
    user_id: String,
    user_name: String,
    user_image: String,
    user_resume: Option<String>,
    job_id: Uuid,
    title: String,
    location: String,
    category: String,
    level: String,
    salary: f64,
}

impl From<ApplicantRow> for Applicant {
    fn from(row: ApplicantRow) -> Self {
        Applicant {
            id: row.id,
            status: row.status,
            created_at: row.created_at,
            user: ApplicantProfile {
                id: row.user_id,
                name: row.user_name,
                image: row.user_image,
                resume: row.user_resume,
            },
            job: JobSummary {
                id: row.job_id,
                title: row.title,
                description: None,
                location: row.location,
                category: row.category,
                level: row.level,
                salary: row.salary,
            },
        }
    }
}

#[async_trait]
impl JobBoardStore for PgStore {
    async fn insert_company(&self, company: NewCompany) -> StoreResult<Company> {
        let email = company.email.clone();
        sqlx::query_as::<_, Company>(
            r#"
            INSERT INTO companies (id, name, email, image, password_hash)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, email, image
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&company.name)
        .bind(&company.email)
        .bind(&company.image)
        .bind(&company.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, || format!("Company with email {email} already exists")))
    }

    async fn find_company(&self, id: Uuid) -> StoreResult<Option<Company>> {
        Ok(sqlx::query_as::<_, Company>(
            "SELECT id, name, email, image FROM companies WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn find_company_credentials(
        &self,
        email: &str,
    ) -> StoreResult<Option<CompanyCredentials>> {
        Ok(sqlx::query_as::<_, CompanyCredentials>(
            "SELECT id, name, email, image, password_hash FROM companies WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn upsert_user(&self, user: User) -> StoreResult<User> {
        let email = user.email.clone();
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, name, email, image, resume)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE
                SET name = EXCLUDED.name,
                    email = EXCLUDED.email,
                    image = EXCLUDED.image,
                    resume = COALESCE(EXCLUDED.resume, users.resume)
            RETURNING id, name, email, image, resume
            "#,
        )
        .bind(&user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.image)
        .bind(&user.resume)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, || format!("User with email {email} already exists")))
    }

    async fn find_user(&self, id: &str) -> StoreResult<Option<User>> {
        Ok(sqlx::query_as::<_, User>(
            "SELECT id, name, email, image, resume FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn set_user_resume(&self, id: &str, resume_url: &str) -> StoreResult<bool> {
        let result = sqlx::query("UPDATE users SET resume = $1 WHERE id = $2")
            .bind(resume_url)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_user(&self, id: &str) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_job(&self, job: NewJob) -> StoreResult<Job> {
        Ok(sqlx::query_as::<_, Job>(
            r#"
            INSERT INTO jobs
                (id, company_id, title, description, location, category, level, salary, visible, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, TRUE, $9)
            RETURNING id, title, description, location, category, level,
                      salary, visible, created_at, company_id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(job.company_id)
        .bind(&job.title)
        .bind(&job.description)
        .bind(&job.location)
        .bind(&job.category)
        .bind(job.level.as_str())
        .bind(job.salary)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?)
    }

    async fn find_job(&self, id: Uuid) -> StoreResult<Option<Job>> {
        Ok(
            sqlx::query_as::<_, Job>(&format!("SELECT {JOB_COLUMNS} FROM jobs j WHERE j.id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn find_job_listing(&self, id: Uuid) -> StoreResult<Option<JobListing>> {
        let row = sqlx::query_as::<_, JobListingRow>(&format!(
            r#"
            SELECT {JOB_COLUMNS},
                   c.name AS company_name, c.email AS company_email, c.image AS company_image
            FROM jobs j
            JOIN companies c ON c.id = j.company_id
            WHERE j.id = $1
            "#
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(JobListing::from))
    }

    async fn list_visible_jobs(&self) -> StoreResult<Vec<JobListing>> {
        let rows = sqlx::query_as::<_, JobListingRow>(&format!(
            r#"
            SELECT {JOB_COLUMNS},
                   c.name AS company_name, c.email AS company_email, c.image AS company_image
            FROM jobs j
            JOIN companies c ON c.id = j.company_id
            WHERE j.visible
            ORDER BY j.created_at, j.id
            "#
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(JobListing::from).collect())
    }

    async fn list_company_jobs(&self, company_id: Uuid) -> StoreResult<Vec<CompanyJob>> {
        let rows = sqlx::query_as::<_, CompanyJobRow>(&format!(
            r#"
            SELECT {JOB_COLUMNS},
                   (SELECT COUNT(*) FROM job_applications a WHERE a.job_id = j.id) AS applicants
            FROM jobs j
            WHERE j.company_id = $1
            ORDER BY j.created_at, j.id
            "#
        ))
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|row| CompanyJob {
                job: row.job,
                applicants: row.applicants,
            })
            .collect())
    }

    async fn set_job_visibility(&self, id: Uuid, visible: bool) -> StoreResult<Option<Job>> {
        Ok(sqlx::query_as::<_, Job>(
            r#"
            UPDATE jobs SET visible = $1 WHERE id = $2
            RETURNING id, title, description, location, category, level,
                      salary, visible, created_at, company_id
            "#,
        )
        .bind(visible)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn delete_job_cascade(&self, id: Uuid) -> StoreResult<Option<u64>> {
        let mut tx = self.pool.begin().await?;

        let exists: Option<Uuid> = sqlx::query_scalar("SELECT id FROM jobs WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            return Ok(None);
        }

        let removed = sqlx::query("DELETE FROM job_applications WHERE job_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        sqlx::query("DELETE FROM jobs WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        info!("Deleted job {id} and {removed} application(s)");
        Ok(Some(removed))
    }

    async fn insert_application(&self, application: NewApplication) -> StoreResult<Application> {
        Ok(sqlx::query_as::<_, Application>(
            r#"
            INSERT INTO job_applications (id, user_id, company_id, job_id, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, user_id, company_id, job_id, status, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&application.user_id)
        .bind(application.company_id)
        .bind(application.job_id)
        .bind(ApplicationStatus::Pending.as_str())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?)
    }

    async fn find_application(&self, id: Uuid) -> StoreResult<Option<Application>> {
        Ok(sqlx::query_as::<_, Application>(
            "SELECT id, user_id, company_id, job_id, status, created_at FROM job_applications WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn find_user_application(
        &self,
        user_id: &str,
        job_id: Uuid,
    ) -> StoreResult<Option<Application>> {
        Ok(sqlx::query_as::<_, Application>(
            r#"
            SELECT id, user_id, company_id, job_id, status, created_at
            FROM job_applications
            WHERE user_id = $1 AND job_id = $2
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(job_id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn count_job_applications(&self, job_id: Uuid) -> StoreResult<i64> {
        Ok(
            sqlx::query_scalar("SELECT COUNT(*) FROM job_applications WHERE job_id = $1")
                .bind(job_id)
                .fetch_one(&self.pool)
                .await?,
        )
    }

    async fn list_user_applications(&self, user_id: &str) -> StoreResult<Vec<UserApplication>> {
        let rows = sqlx::query_as::<_, UserApplicationRow>(
            r#"
            SELECT a.id, a.status, a.created_at,
                   c.id AS company_id, c.name AS company_name,
                   c.email AS company_email, c.image AS company_image,
                   j.id AS job_id, j.title, j.description, j.location,
                   j.category, j.level, j.salary
            FROM job_applications a
            JOIN jobs j ON j.id = a.job_id
            JOIN companies c ON c.id = a.company_id
            WHERE a.user_id = $1
            ORDER BY a.created_at, a.id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(UserApplication::from).collect())
    }

    async fn list_company_applicants(&self, company_id: Uuid) -> StoreResult<Vec<Applicant>> {
        let rows = sqlx::query_as::<_, ApplicantRow>(
            r#"
            SELECT a.id, a.status, a.created_at,
                   u.id AS user_id, u.name AS user_name,
                   u.image AS user_image, u.resume AS user_resume,
                   j.id AS job_id, j.title, j.location, j.category, j.level, j.salary
            FROM job_applications a
            JOIN jobs j ON j.id = a.job_id
            JOIN users u ON u.id = a.user_id
            WHERE a.company_id = $1
            ORDER BY a.created_at, a.id
            "#,
        )
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Applicant::from).collect())
    }

    async fn set_application_status(&self, id: Uuid, status: &str) -> StoreResult<bool> {
        let result = sqlx::query("UPDATE job_applications SET status = $1 WHERE id = $2")
            .bind(status)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
