use serde::{Deserialize, Serialize};

use crate::models::Job;

/// Lowest selectable salary. The upper bound comes from the job set.
pub const SALARY_FLOOR: u64 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryRange {
    pub min: u64,
    pub max: u64,
}

impl SalaryRange {
    pub fn new(min: u64, max: u64) -> Self {
        Self { min, max }
    }

    /// Default bounds for a job set: `[SALARY_FLOOR, highest salary_max]`.
    pub fn observed(jobs: &[Job]) -> Self {
        let max = jobs
            .iter()
            .map(|j| j.salary_max)
            .max()
            .unwrap_or(SALARY_FLOOR)
            .max(SALARY_FLOOR);
        Self {
            min: SALARY_FLOOR,
            max,
        }
    }

    /// Clamps both ends into `bounds`, keeping `min <= max`.
    pub fn clamp_to(self, bounds: SalaryRange) -> Self {
        let hi = bounds.max.max(bounds.min);
        let min = self.min.clamp(bounds.min, hi);
        let max = self.max.clamp(min, hi);
        Self { min, max }
    }

    /// Inclusive overlap with a job's salary bounds.
    pub fn overlaps(&self, job: &Job) -> bool {
        job.salary_max >= self.min && job.salary_min <= self.max
    }
}

/// Transient, UI-only filter selections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    pub query: String,
    pub job_type: Option<String>,
    pub salary: SalaryRange,
    pub experience: Option<String>,
}

impl FilterState {
    /// No restriction other than the salary bounds of the job set.
    pub fn unfiltered(bounds: SalaryRange) -> Self {
        Self {
            query: String::new(),
            job_type: None,
            salary: bounds,
            experience: None,
        }
    }

    /// Single-job check. Filtering a list should build one `matcher` and
    /// reuse it.
    pub fn matches(&self, job: &Job) -> bool {
        self.matcher().matches(job)
    }

    /// Resolves the query and the bucket label once, so per-job checks
    /// only compare.
    pub fn matcher(&self) -> Matcher<'_> {
        Matcher {
            needle: self.query.trim().to_lowercase(),
            job_type: self.job_type.as_deref(),
            salary: self.salary,
            experience: self
                .experience
                .as_deref()
                .map(crate::models::job::parse_experience_label),
        }
    }
}

/// A `FilterState` prepared for checking many jobs.
#[derive(Debug, Clone)]
pub struct Matcher<'a> {
    needle: String,
    job_type: Option<&'a str>,
    salary: SalaryRange,
    /// `Some(None)` is a label no job can carry.
    experience: Option<Option<(u32, u32)>>,
}

impl Matcher<'_> {
    pub fn matches(&self, job: &Job) -> bool {
        self.matches_query(job)
            && self.job_type.map_or(true, |t| job.job_type == t)
            && self.salary.overlaps(job)
            && self
                .experience
                .map_or(true, |bucket| bucket == Some((job.experience_min, job.experience_max)))
    }

    fn matches_query(&self, job: &Job) -> bool {
        if self.needle.is_empty() {
            return true;
        }
        [&job.title, &job.organization, &job.location]
            .iter()
            .any(|field| field.to_lowercase().contains(&self.needle))
    }
}

/// Sorted, deduplicated job types present in `jobs`.
pub fn job_types(jobs: &[Job]) -> Vec<String> {
    let mut types: Vec<String> = jobs.iter().map(|j| j.job_type.clone()).collect();
    types.sort();
    types.dedup();
    types
}

/// Experience buckets present in `jobs`, ordered by their bounds.
pub fn experience_buckets(jobs: &[Job]) -> Vec<String> {
    let mut bounds: Vec<(u32, u32)> = jobs
        .iter()
        .map(|j| (j.experience_min, j.experience_max))
        .collect();
    bounds.sort_unstable();
    bounds.dedup();
    bounds
        .into_iter()
        .map(|(min, max)| crate::models::job::experience_label(min, max))
        .collect()
}
