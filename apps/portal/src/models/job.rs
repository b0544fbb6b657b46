use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::errors::AppError;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for JobId {
    fn from(s: &str) -> Self {
        JobId(s.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Drafted,
    Active,
    Closed,
}

impl JobStatus {
    /// Lifecycle only moves forward: drafted → active → closed.
    pub fn can_transition_to(self, next: JobStatus) -> bool {
        matches!(
            (self, next),
            (JobStatus::Drafted, JobStatus::Active) | (JobStatus::Active, JobStatus::Closed)
        )
    }
}

/// A job listing as served by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    #[serde(alias = "_id")]
    pub id: JobId,
    pub title: String,
    /// Rich text (HTML) as authored by the client organization.
    #[serde(default)]
    pub description: String,
    pub organization: String,
    pub location: String,
    pub salary_min: u64,
    pub salary_max: u64,
    pub experience_min: u32,
    pub experience_max: u32,
    pub job_type: String,
    #[serde(default)]
    pub logo_url: Option<String>,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub posted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub closes_at: Option<DateTime<Utc>>,
}

impl Job {
    /// Label of the experience bucket this job falls in, e.g. `"1-3 years"`.
    pub fn experience_bucket(&self) -> String {
        experience_label(self.experience_min, self.experience_max)
    }

    /// Checks the bounds invariants on a job received over the wire.
    pub fn check_invariants(&self) -> Result<(), String> {
        check_bounds(
            self.salary_min,
            self.salary_max,
            self.experience_min,
            self.experience_max,
        )?;
        if let (Some(posted), Some(closes)) = (self.posted_at, self.closes_at) {
            if closes < posted {
                return Err(format!("job {}: post window closes before it opens", self.id));
            }
        }
        Ok(())
    }
}

pub fn experience_label(min: u32, max: u32) -> String {
    format!("{min}-{max} years")
}

/// Inverse of `experience_label`.
pub fn parse_experience_label(label: &str) -> Option<(u32, u32)> {
    let (min, max) = label.strip_suffix(" years")?.split_once('-')?;
    Some((min.parse().ok()?, max.parse().ok()?))
}

fn check_bounds(salary_min: u64, salary_max: u64, exp_min: u32, exp_max: u32) -> Result<(), String> {
    if salary_max < salary_min {
        return Err(format!(
            "salary max ({salary_max}) is below salary min ({salary_min})"
        ));
    }
    if exp_max < exp_min {
        return Err(format!(
            "experience max ({exp_max}) is below experience min ({exp_min})"
        ));
    }
    Ok(())
}

/// Editable form of a job, submitted by client organizations and recruiters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct JobDraft {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1))]
    pub description: String,
    #[validate(length(min = 1))]
    pub location: String,
    pub salary_min: u64,
    pub salary_max: u64,
    pub experience_min: u32,
    pub experience_max: u32,
    #[validate(length(min = 1))]
    pub job_type: String,
    #[validate(url)]
    pub logo_url: Option<String>,
    pub posted_at: Option<DateTime<Utc>>,
    pub closes_at: Option<DateTime<Utc>>,
}

impl JobDraft {
    /// Field checks plus the cross-field invariants. Runs before any
    /// network call.
    pub fn check(&self) -> Result<(), AppError> {
        self.validate()
            .map_err(|e| AppError::validation(crate::models::describe_validation(&e)))?;
        check_bounds(
            self.salary_min,
            self.salary_max,
            self.experience_min,
            self.experience_max,
        )
        .map_err(AppError::Validation)?;
        if let (Some(posted), Some(closes)) = (self.posted_at, self.closes_at) {
            if closes <= posted {
                return Err(AppError::validation("Closing date must be after the posting date"));
            }
        }
        Ok(())
    }
}

impl From<&Job> for JobDraft {
    fn from(job: &Job) -> Self {
        JobDraft {
            title: job.title.clone(),
            description: job.description.clone(),
            location: job.location.clone(),
            salary_min: job.salary_min,
            salary_max: job.salary_max,
            experience_min: job.experience_min,
            experience_max: job.experience_max,
            job_type: job.job_type.clone(),
            logo_url: job.logo_url.clone(),
            posted_at: job.posted_at,
            closes_at: job.closes_at,
        }
    }
}
