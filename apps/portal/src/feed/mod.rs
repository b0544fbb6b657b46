//! Job feed: listings merged with the candidate's saved/applied records,
//! filtered and paginated for display.

use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, info};

pub mod filter;
pub mod pagination;

use crate::api_client::JobsApi;
use crate::auth::session::SessionStore;
use crate::errors::AppError;
use crate::models::{CandidateJobRelation, Job, JobId, Role};
use filter::{FilterState, SalaryRange};
use pagination::Pager;

/// Membership sets built once per relation-list change.
#[derive(Debug, Clone, Default)]
pub struct RelationIndex {
    saved: HashSet<JobId>,
    applied: HashSet<JobId>,
}

impl RelationIndex {
    pub fn from_relations(relations: &[CandidateJobRelation]) -> Self {
        let mut index = Self::default();
        for rel in relations {
            if rel.saved {
                index.saved.insert(rel.job_id.clone());
            }
            if rel.applied {
                index.applied.insert(rel.job_id.clone());
            }
        }
        index
    }

    pub fn is_saved(&self, id: &JobId) -> bool {
        self.saved.contains(id)
    }

    pub fn is_applied(&self, id: &JobId) -> bool {
        self.applied.contains(id)
    }

    pub fn set_saved(&mut self, id: &JobId, saved: bool) {
        if saved {
            self.saved.insert(id.clone());
        } else {
            self.saved.remove(id);
        }
    }

    pub fn mark_applied(&mut self, id: &JobId) {
        self.applied.insert(id.clone());
    }
}

/// A job decorated with the candidate's relation flags.
#[derive(Debug, Clone, Serialize)]
pub struct FeedItem<'a> {
    pub job: &'a Job,
    pub bookmarked: bool,
    pub applied: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedPage<'a> {
    pub items: Vec<FeedItem<'a>>,
    pub page: usize,
    pub total_pages: usize,
    pub total_items: usize,
}

/// Everything a feed refresh pulls from the backend.
#[derive(Debug, Clone, Default)]
pub struct FeedSnapshot {
    pub jobs: Vec<Job>,
    /// Empty unless a candidate is signed in.
    pub relations: Vec<CandidateJobRelation>,
}

/// Loads jobs and, for a signed-in candidate, their relation records.
pub async fn fetch_snapshot(
    api: &dyn JobsApi,
    session: &SessionStore,
) -> Result<FeedSnapshot, AppError> {
    let jobs = api.list_jobs().await?;
    let is_candidate = session
        .current()
        .is_some_and(|s| s.role == Role::Candidate);
    let relations = if is_candidate {
        api.relations().await?
    } else {
        Vec::new()
    };
    info!(
        "Feed snapshot: {} jobs, {} relations",
        jobs.len(),
        relations.len()
    );
    Ok(FeedSnapshot { jobs, relations })
}

#[derive(Debug, Clone)]
pub struct JobFeed {
    jobs: Vec<Job>,
    relations: RelationIndex,
    bounds: SalaryRange,
    filter: FilterState,
    pager: Pager,
}

impl JobFeed {
    pub fn new(page_size: usize) -> Self {
        let bounds = SalaryRange::observed(&[]);
        Self {
            jobs: Vec::new(),
            relations: RelationIndex::default(),
            bounds,
            filter: FilterState::unfiltered(bounds),
            pager: Pager::new(page_size),
        }
    }

    pub fn apply_snapshot(&mut self, snapshot: FeedSnapshot) {
        self.set_jobs(snapshot.jobs);
        self.set_relations(&snapshot.relations);
    }

    /// Replaces the job list. Salary bounds and the salary filter return to
    /// `[SALARY_FLOOR, observed max]`; the other filters are kept.
    pub fn set_jobs(&mut self, jobs: Vec<Job>) {
        self.bounds = SalaryRange::observed(&jobs);
        self.filter.salary = self.bounds;
        self.jobs = jobs;
        self.pager.reset();
        debug!(bounds = ?self.bounds, "job list replaced ({} jobs)", self.jobs.len());
    }

    pub fn set_relations(&mut self, relations: &[CandidateJobRelation]) {
        self.relations = RelationIndex::from_relations(relations);
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn job(&self, id: &JobId) -> Option<&Job> {
        self.jobs.iter().find(|j| j.id == *id)
    }

    pub fn relations(&self) -> &RelationIndex {
        &self.relations
    }

    pub fn relations_mut(&mut self) -> &mut RelationIndex {
        &mut self.relations
    }

    pub fn is_bookmarked(&self, id: &JobId) -> bool {
        self.relations.is_saved(id)
    }

    pub fn salary_bounds(&self) -> SalaryRange {
        self.bounds
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.filter.query = query.into();
        self.pager.reset();
    }

    pub fn set_job_type(&mut self, job_type: Option<String>) {
        self.filter.job_type = job_type;
        self.pager.reset();
    }

    /// Sets the salary filter, clamped to the current bounds.
    pub fn set_salary_range(&mut self, range: SalaryRange) {
        self.filter.salary = range.clamp_to(self.bounds);
        self.pager.reset();
    }

    pub fn set_experience(&mut self, bucket: Option<String>) {
        self.filter.experience = bucket;
        self.pager.reset();
    }

    pub fn set_filter(&mut self, filter: FilterState) {
        let salary = filter.salary.clamp_to(self.bounds);
        self.filter = FilterState { salary, ..filter };
        self.pager.reset();
    }

    pub fn reset_filters(&mut self) {
        self.filter = FilterState::unfiltered(self.bounds);
        self.pager.reset();
    }

    pub fn filtered(&self) -> Vec<FeedItem<'_>> {
        let matcher = self.filter.matcher();
        self.jobs
            .iter()
            .filter(|job| matcher.matches(job))
            .map(|job| self.decorate(job))
            .collect()
    }

    pub fn current_page(&self) -> usize {
        self.pager.page()
    }

    pub fn set_page(&mut self, page: usize) -> usize {
        let count = self.filtered_count();
        self.pager.set_page(page, count)
    }

    pub fn page(&self) -> FeedPage<'_> {
        let filtered = self.filtered();
        let total_items = filtered.len();
        let window = self.pager.window(total_items);
        FeedPage {
            items: filtered
                .into_iter()
                .skip(window.start)
                .take(window.len())
                .collect(),
            page: self.pager.page(),
            total_pages: self.pager.total_pages(total_items),
            total_items,
        }
    }

    pub fn job_types(&self) -> Vec<String> {
        filter::job_types(&self.jobs)
    }

    pub fn experience_buckets(&self) -> Vec<String> {
        filter::experience_buckets(&self.jobs)
    }

    fn filtered_count(&self) -> usize {
        let matcher = self.filter.matcher();
        self.jobs.iter().filter(|j| matcher.matches(j)).count()
    }

    fn decorate<'a>(&self, job: &'a Job) -> FeedItem<'a> {
        FeedItem {
            job,
            bookmarked: self.relations.is_saved(&job.id),
            applied: self.relations.is_applied(&job.id),
        }
    }
}
