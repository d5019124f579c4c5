//! The five AI gateway tasks: their inputs, prompts and output shapes.
//!
//! Output structs select the named fields from the model's JSON. Fields the model
//! omits stay `None` and are left out of the response; extra fields are dropped.

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use crate::ai::prompts::{
    CANDIDATE_MATCH_PROMPT, CANDIDATE_SUMMARY_PROMPT, JOB_DESCRIPTION_PROMPT,
    RESUME_SCORE_PROMPT, SKILL_MATCH_PROMPT,
};
use crate::ai::{fill_template, AiTask};
use crate::errors::AppError;
use crate::llm_client::prompts::JSON_FORMAT_INSTRUCTION;

fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

// ── Resume quality score ────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResumeScoreTask {
    pub resume_text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeScore {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strengths: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weaknesses: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ats_score: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

impl AiTask for ResumeScoreTask {
    type Output = ResumeScore;
    const NAME: &'static str = "resume_score";

    fn validate(&self) -> Result<(), AppError> {
        if is_blank(&self.resume_text) {
            return Err(AppError::Validation("Resume text required".to_string()));
        }
        Ok(())
    }

    fn prompt(&self) -> String {
        fill_template(
            RESUME_SCORE_PROMPT,
            &[
                ("resume_text", self.resume_text.as_str()),
                ("format_instruction", JSON_FORMAT_INSTRUCTION),
            ],
        )
    }
}

// ── Skill-to-job matching ───────────────────────────────────────────────────

/// Skills arrive either as a list or as one comma-separated string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CandidateSkills {
    List(Vec<String>),
    Text(String),
}

impl Default for CandidateSkills {
    fn default() -> Self {
        CandidateSkills::Text(String::new())
    }
}

impl CandidateSkills {
    pub fn is_empty(&self) -> bool {
        match self {
            CandidateSkills::List(items) => items.iter().all(|s| is_blank(s)),
            CandidateSkills::Text(text) => is_blank(text),
        }
    }

    pub fn joined(&self) -> String {
        match self {
            CandidateSkills::List(items) => items.join(", "),
            CandidateSkills::Text(text) => text.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SkillMatchTask {
    pub candidate_skills: CandidateSkills,
    pub job_description: String,
    pub job_title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillMatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_percentage: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_skills: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub missing_skills: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strengths: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gaps: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendations: Option<Vec<String>>,
}

impl AiTask for SkillMatchTask {
    type Output = SkillMatch;
    const NAME: &'static str = "skill_match";

    fn validate(&self) -> Result<(), AppError> {
        if self.candidate_skills.is_empty() || is_blank(&self.job_description) {
            return Err(AppError::Validation(
                "Candidate skills and job description required".to_string(),
            ));
        }
        Ok(())
    }

    fn prompt(&self) -> String {
        let title = if is_blank(&self.job_title) {
            "Not specified"
        } else {
            self.job_title.as_str()
        };
        fill_template(
            SKILL_MATCH_PROMPT,
            &[
                ("candidate_skills", self.candidate_skills.joined().as_str()),
                ("job_title", title),
                ("job_description", self.job_description.as_str()),
                ("format_instruction", JSON_FORMAT_INSTRUCTION),
            ],
        )
    }
}

// ── Resume-to-job matching (recruiter) ──────────────────────────────────────

/// Built by the handler once the job has been loaded and ownership checked.
#[derive(Debug, Clone)]
pub struct CandidateMatchTask {
    pub resume_text: String,
    pub job_title: String,
    pub job_description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateMatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_percentage: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_strengths: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_concerns: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
}

impl AiTask for CandidateMatchTask {
    type Output = CandidateMatch;
    const NAME: &'static str = "candidate_match";

    fn validate(&self) -> Result<(), AppError> {
        if is_blank(&self.resume_text) || is_blank(&self.job_description) {
            return Err(AppError::Validation(
                "Resume text and job description required".to_string(),
            ));
        }
        Ok(())
    }

    fn prompt(&self) -> String {
        fill_template(
            CANDIDATE_MATCH_PROMPT,
            &[
                ("job_title", self.job_title.as_str()),
                ("job_description", self.job_description.as_str()),
                ("resume_text", self.resume_text.as_str()),
                ("format_instruction", JSON_FORMAT_INSTRUCTION),
            ],
        )
    }
}

// ── Job description generation (recruiter) ──────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JobDescriptionTask {
    pub job_title: String,
    pub requirements: String,
    pub skills: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDescriptionDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_requirements: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_skills: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tips: Option<Vec<String>>,
}

impl AiTask for JobDescriptionTask {
    type Output = JobDescriptionDraft;
    const NAME: &'static str = "job_description";

    fn validate(&self) -> Result<(), AppError> {
        if is_blank(&self.job_title) {
            return Err(AppError::Validation("Job title required".to_string()));
        }
        Ok(())
    }

    fn prompt(&self) -> String {
        let or_none = |s: &str| {
            if is_blank(s) {
                "None provided".to_string()
            } else {
                s.to_string()
            }
        };
        fill_template(
            JOB_DESCRIPTION_PROMPT,
            &[
                ("job_title", self.job_title.as_str()),
                ("requirements", or_none(&self.requirements).as_str()),
                ("skills", or_none(&self.skills).as_str()),
                ("format_instruction", JSON_FORMAT_INSTRUCTION),
            ],
        )
    }
}

// ── Candidate summary (recruiter) ───────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CandidateSummaryTask {
    pub resume_text: String,
    pub candidate_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_skills: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub education: Option<String>,
    /// Models answer with a number or a phrase such as "5+"; both pass through.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub years_of_experience: Option<Value>,
}

impl AiTask for CandidateSummaryTask {
    type Output = CandidateSummary;
    const NAME: &'static str = "candidate_summary";

    fn validate(&self) -> Result<(), AppError> {
        if is_blank(&self.resume_text) {
            return Err(AppError::Validation("Resume text required".to_string()));
        }
        Ok(())
    }

    fn prompt(&self) -> String {
        let name = if is_blank(&self.candidate_name) {
            "Not specified"
        } else {
            self.candidate_name.as_str()
        };
        fill_template(
            CANDIDATE_SUMMARY_PROMPT,
            &[
                ("candidate_name", name),
                ("resume_text", self.resume_text.as_str()),
                ("format_instruction", JSON_FORMAT_INSTRUCTION),
            ],
        )
    }
}
