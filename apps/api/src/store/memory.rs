//! In-memory backend. Records are kept in insertion order so listings are deterministic.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::application::{
    Applicant, ApplicantProfile, Application, ApplicationStatus, CompanySummary, JobSummary,
    NewApplication, UserApplication,
};
use crate::models::company::{Company, CompanyCredentials, NewCompany};
use crate::models::job::{CompanyJob, Job, JobListing, NewJob};
use crate::models::user::User;
use crate::store::{JobBoardStore, StoreError, StoreResult};

#[derive(Default)]
struct Tables {
    companies: Vec<CompanyCredentials>,
    users: Vec<User>,
    jobs: Vec<Job>,
    applications: Vec<Application>,
}

impl Tables {
    fn company(&self, id: Uuid) -> Option<&Company> {
        self.companies
            .iter()
            .map(|c| &c.company)
            .find(|c| c.id == id)
    }

    fn job(&self, id: Uuid) -> Option<&Job> {
        self.jobs.iter().find(|j| j.id == id)
    }

    fn listing(&self, job: &Job) -> Option<JobListing> {
        self.company(job.company_id).map(|company| JobListing {
            job: job.clone(),
            company: company.clone(),
        })
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn summarize(job: &Job, with_description: bool) -> JobSummary {
    JobSummary {
        id: job.id,
        title: job.title.clone(),
        description: with_description.then(|| job.description.clone()),
        location: job.location.clone(),
        category: job.category.clone(),
        level: job.level.clone(),
        salary: job.salary,
    }
}

#[async_trait]
impl JobBoardStore for MemoryStore {
    async fn insert_company(&self, company: NewCompany) -> StoreResult<Company> {
        let mut tables = self.tables.write().await;
        if tables
            .companies
            .iter()
            .any(|c| c.company.email == company.email)
        {
            return Err(StoreError::Conflict(format!(
                "Company with email {} already exists",
                company.email
            )));
        }
        let created = Company {
            id: Uuid::new_v4(),
            name: company.name,
            email: company.email,
            image: company.image,
        };
        tables.companies.push(CompanyCredentials {
            company: created.clone(),
            password_hash: company.password_hash,
        });
        Ok(created)
    }

    async fn find_company(&self, id: Uuid) -> StoreResult<Option<Company>> {
        Ok(self.tables.read().await.company(id).cloned())
    }

    async fn find_company_credentials(
        &self,
        email: &str,
    ) -> StoreResult<Option<CompanyCredentials>> {
        let tables = self.tables.read().await;
        Ok(tables
            .companies
            .iter()
            .find(|c| c.company.email == email)
            .cloned())
    }

    async fn upsert_user(&self, user: User) -> StoreResult<User> {
        let mut tables = self.tables.write().await;
        if tables
            .users
            .iter()
            .any(|u| u.email == user.email && u.id != user.id)
        {
            return Err(StoreError::Conflict(format!(
                "User with email {} already exists",
                user.email
            )));
        }
        match tables.users.iter_mut().find(|u| u.id == user.id) {
            Some(existing) => {
                existing.name = user.name;
                existing.email = user.email;
                existing.image = user.image;
                if user.resume.is_some() {
                    existing.resume = user.resume;
                }
                Ok(existing.clone())
            }
            None => {
                tables.users.push(user.clone());
                Ok(user)
            }
        }
    }

    async fn find_user(&self, id: &str) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn set_user_resume(&self, id: &str, resume_url: &str) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        Ok(match tables.users.iter_mut().find(|u| u.id == id) {
            Some(user) => {
                user.resume = Some(resume_url.to_string());
                true
            }
            None => false,
        })
    }

    async fn delete_user(&self, id: &str) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.users.len();
        tables.users.retain(|u| u.id != id);
        Ok(tables.users.len() != before)
    }

    async fn insert_job(&self, job: NewJob) -> StoreResult<Job> {
        let created = Job {
            id: Uuid::new_v4(),
            title: job.title,
            description: job.description,
            location: job.location,
            category: job.category,
            level: job.level.to_string(),
            salary: job.salary,
            visible: true,
            created_at: Utc::now(),
            company_id: job.company_id,
        };
        self.tables.write().await.jobs.push(created.clone());
        Ok(created)
    }

    async fn find_job(&self, id: Uuid) -> StoreResult<Option<Job>> {
        Ok(self.tables.read().await.job(id).cloned())
    }

    async fn find_job_listing(&self, id: Uuid) -> StoreResult<Option<JobListing>> {
        let tables = self.tables.read().await;
        Ok(tables.job(id).and_then(|job| tables.listing(job)))
    }

    async fn list_visible_jobs(&self) -> StoreResult<Vec<JobListing>> {
        let tables = self.tables.read().await;
        Ok(tables
            .jobs
            .iter()
            .filter(|j| j.visible)
            .filter_map(|j| tables.listing(j))
            .collect())
    }

    async fn list_company_jobs(&self, company_id: Uuid) -> StoreResult<Vec<CompanyJob>> {
        let tables = self.tables.read().await;
        Ok(tables
            .jobs
            .iter()
            .filter(|j| j.company_id == company_id)
            .map(|j| CompanyJob {
                job: j.clone(),
                applicants: tables
                    .applications
                    .iter()
                    .filter(|a| a.job_id == j.id)
                    .count() as i64,
            })
            .collect())
    }

    async fn set_job_visibility(&self, id: Uuid, visible: bool) -> StoreResult<Option<Job>> {
        let mut tables = self.tables.write().await;
        Ok(tables.jobs.iter_mut().find(|j| j.id == id).map(|job| {
            job.visible = visible;
            job.clone()
        }))
    }

    async fn delete_job_cascade(&self, id: Uuid) -> StoreResult<Option<u64>> {
        // Both removals happen under one write guard.
        let mut tables = self.tables.write().await;
        let Some(index) = tables.jobs.iter().position(|j| j.id == id) else {
            return Ok(None);
        };
        tables.jobs.remove(index);
        let before = tables.applications.len();
        tables.applications.retain(|a| a.job_id != id);
        Ok(Some((before - tables.applications.len()) as u64))
    }

    async fn insert_application(&self, application: NewApplication) -> StoreResult<Application> {
        let created = Application {
            id: Uuid::new_v4(),
            user_id: application.user_id,
            company_id: application.company_id,
            job_id: application.job_id,
            status: ApplicationStatus::Pending.to_string(),
            created_at: Utc::now(),
        };
        self.tables
            .write()
            .await
            .applications
            .push(created.clone());
        Ok(created)
    }

    async fn find_application(&self, id: Uuid) -> StoreResult<Option<Application>> {
        let tables = self.tables.read().await;
        Ok(tables.applications.iter().find(|a| a.id == id).cloned())
    }

    async fn find_user_application(
        &self,
        user_id: &str,
        job_id: Uuid,
    ) -> StoreResult<Option<Application>> {
        let tables = self.tables.read().await;
        Ok(tables
            .applications
            .iter()
            .find(|a| a.user_id == user_id && a.job_id == job_id)
            .cloned())
    }

    async fn count_job_applications(&self, job_id: Uuid) -> StoreResult<i64> {
        let tables = self.tables.read().await;
        Ok(tables
            .applications
            .iter()
            .filter(|a| a.job_id == job_id)
            .count() as i64)
    }

    async fn list_user_applications(&self, user_id: &str) -> StoreResult<Vec<UserApplication>> {
        let tables = self.tables.read().await;
        Ok(tables
            .applications
            .iter()
            .filter(|a| a.user_id == user_id)
            .filter_map(|a| {
                let job = tables.job(a.job_id)?;
                let company = tables.company(a.company_id)?;
                Some(UserApplication {
                    id: a.id,
                    status: a.status.clone(),
                    created_at: a.created_at,
                    company: CompanySummary {
                        id: company.id,
                        name: company.name.clone(),
                        email: company.email.clone(),
                        image: company.image.clone(),
                    },
                    job: summarize(job, true),
                })
            })
            .collect())
    }

    async fn list_company_applicants(&self, company_id: Uuid) -> StoreResult<Vec<Applicant>> {
        let tables = self.tables.read().await;
        Ok(tables
            .applications
            .iter()
            .filter(|a| a.company_id == company_id)
            .filter_map(|a| {
                let job = tables.job(a.job_id)?;
                let user = tables.users.iter().find(|u| u.id == a.user_id)?;
                Some(Applicant {
                    id: a.id,
                    status: a.status.clone(),
                    created_at: a.created_at,
                    user: ApplicantProfile {
                        id: user.id.clone(),
                        name: user.name.clone(),
                        image: user.image.clone(),
                        resume: user.resume.clone(),
                    },
                    job: summarize(job, false),
                })
            })
            .collect())
    }

    async fn set_application_status(&self, id: Uuid, status: &str) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        Ok(match tables.applications.iter_mut().find(|a| a.id == id) {
            Some(application) => {
                application.status = status.to_string();
                true
            }
            None => false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::job::JobLevel;

    async fn seed_company(store: &MemoryStore, email: &str) -> Company {
        store
            .insert_company(NewCompany {
                name: "Acme".into(),
                email: email.into(),
                image: "https://cdn.example/acme.png".into(),
                password_hash: "hash".into(),
            })
            .await
            .unwrap()
    }

    fn new_job(company_id: Uuid, title: &str) -> NewJob {
        NewJob {
            company_id,
            title: title.into(),
            description: "desc".into(),
            location: "Remote".into(),
            category: "Programming".into(),
            level: JobLevel::Intermediate,
            salary: 50000.0,
        }
    }

    #[tokio::test]
    async fn test_duplicate_company_email_conflicts() {
        let store = MemoryStore::new();
        seed_company(&store, "hr@acme.io").await;
        let err = store
            .insert_company(NewCompany {
                name: "Other".into(),
                email: "hr@acme.io".into(),
                image: String::new(),
                password_hash: String::new(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_cascade_delete_removes_only_matching_applications() {
        let store = MemoryStore::new();
        let company = seed_company(&store, "hr@acme.io").await;
        let doomed = store.insert_job(new_job(company.id, "A")).await.unwrap();
        let kept = store.insert_job(new_job(company.id, "B")).await.unwrap();
        for (user, job) in [("u1", doomed.id), ("u2", doomed.id), ("u1", kept.id)] {
            store
                .insert_application(NewApplication {
                    user_id: user.into(),
                    company_id: company.id,
                    job_id: job,
                })
                .await
                .unwrap();
        }

        assert_eq!(store.delete_job_cascade(doomed.id).await.unwrap(), Some(2));
        assert_eq!(store.count_job_applications(doomed.id).await.unwrap(), 0);
        assert_eq!(store.count_job_applications(kept.id).await.unwrap(), 1);
        assert_eq!(store.delete_job_cascade(doomed.id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_upsert_user_keeps_resume_when_event_has_none() {
        let store = MemoryStore::new();
        let user = User {
            id: "user_1".into(),
            name: "Ada".into(),
            email: "ada@example.com".into(),
            image: "img".into(),
            resume: None,
        };
        store.upsert_user(user.clone()).await.unwrap();
        assert!(store.set_user_resume("user_1", "https://cdn/cv.pdf").await.unwrap());

        let updated = store
            .upsert_user(User {
                name: "Ada L.".into(),
                ..user
            })
            .await
            .unwrap();
        assert_eq!(updated.name, "Ada L.");
        assert_eq!(updated.resume.as_deref(), Some("https://cdn/cv.pdf"));
    }
}
