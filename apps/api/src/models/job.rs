use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::company::Company;

/// Seniority a job is aimed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobLevel {
    Beginner,
    Intermediate,
    Senior,
}

impl JobLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobLevel::Beginner => "Beginner",
            JobLevel::Intermediate => "Intermediate",
            JobLevel::Senior => "Senior",
        }
    }
}

impl fmt::Display for JobLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Beginner" | "Beginner level" => Ok(JobLevel::Beginner),
            "Intermediate" | "Intermediate level" => Ok(JobLevel::Intermediate),
            "Senior" | "Senior level" => Ok(JobLevel::Senior),
            other => Err(format!(
                "Invalid level '{other}', expected Beginner, Intermediate or Senior"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub title: String,
    /// Rich-text (HTML) description.
    pub description: String,
    pub location: String,
    pub category: String,
    pub level: String,
    pub salary: f64,
    pub visible: bool,
    #[serde(rename = "date", with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    pub company_id: Uuid,
}

#[derive(Debug, Clone)]
pub struct NewJob {
    pub company_id: Uuid,
    pub title: String,
    pub description: String,
    pub location: String,
    pub category: String,
    pub level: JobLevel,
    pub salary: f64,
}

/// A job joined with the public fields of its owning company.
#[derive(Debug, Clone, Serialize)]
pub struct JobListing {
    #[serde(flatten)]
    pub job: Job,
    pub company: Company,
}

/// A job as seen by its owner, with the number of applications it received.
#[derive(Debug, Clone, Serialize)]
pub struct CompanyJob {
    #[serde(flatten)]
    pub job: Job,
    pub applicants: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_level_accepts_form_labels() {
        assert_eq!("Senior level".parse::<JobLevel>().unwrap(), JobLevel::Senior);
        assert_eq!("Beginner".parse::<JobLevel>().unwrap(), JobLevel::Beginner);
        assert!("Principal".parse::<JobLevel>().is_err());
    }

    #[test]
    fn test_job_serializes_with_wire_names() {
        let job = Job {
            id: Uuid::nil(),
            title: "Backend Dev".into(),
            description: "<p>Rust</p>".into(),
            location: "Remote".into(),
            category: "Programming".into(),
            level: "Senior".into(),
            salary: 90000.0,
            visible: true,
            created_at: DateTime::from_timestamp_millis(1_700_000_000_000).unwrap(),
            company_id: Uuid::nil(),
        };
        let value = serde_json::to_value(&job).unwrap();
        assert_eq!(value["_id"], Uuid::nil().to_string());
        assert_eq!(value["companyId"], Uuid::nil().to_string());
        assert_eq!(value["date"], 1_700_000_000_000_i64);
        assert!(value.get("created_at").is_none());
    }
}
