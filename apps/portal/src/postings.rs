//! Job listing management for client organizations and recruiters.

use std::sync::Arc;

use tracing::info;

use crate::api_client::PostingsApi;
use crate::auth::{self, session::SessionStore};
use crate::errors::AppError;
use crate::models::{Job, JobDraft, JobStatus, Role};
use crate::notifications::{Notification, Notifications};

const POSTING_ROLES: &[Role] = &[Role::Client, Role::Recruiter];

pub struct Postings {
    api: Arc<dyn PostingsApi>,
    session: Arc<SessionStore>,
    notifications: Arc<Notifications>,
}

impl Postings {
    pub fn new(
        api: Arc<dyn PostingsApi>,
        session: Arc<SessionStore>,
        notifications: Arc<Notifications>,
    ) -> Self {
        Self {
            api,
            session,
            notifications,
        }
    }

    pub async fn list_own(&self) -> Result<Vec<Job>, AppError> {
        self.guard()?;
        self.api
            .own_jobs()
            .await
            .map_err(|e| e.notify(&self.notifications))
    }

    /// Creates the listing as a draft; `publish` makes it visible.
    pub async fn create(&self, draft: &JobDraft) -> Result<Job, AppError> {
        self.guard()?;
        draft.check().map_err(|e| e.notify(&self.notifications))?;
        let job = self
            .api
            .create_job(draft)
            .await
            .map_err(|e| e.notify(&self.notifications))?;
        info!(job_id = %job.id, "job drafted: {}", job.title);
        self.notifications
            .push(Notification::success("Job saved as draft"));
        Ok(job)
    }

    pub async fn update(&self, job: &Job, draft: &JobDraft) -> Result<Job, AppError> {
        self.guard()?;
        if job.status == JobStatus::Closed {
            return Err(
                AppError::validation("Closed jobs can no longer be edited").notify(&self.notifications)
            );
        }
        draft.check().map_err(|e| e.notify(&self.notifications))?;
        let updated = self
            .api
            .update_job(&job.id, draft)
            .await
            .map_err(|e| e.notify(&self.notifications))?;
        self.notifications.push(Notification::success("Job updated"));
        Ok(updated)
    }

    pub async fn publish(&self, job: &Job) -> Result<Job, AppError> {
        self.transition(job, JobStatus::Active, "Job published").await
    }

    pub async fn close(&self, job: &Job) -> Result<Job, AppError> {
        self.transition(job, JobStatus::Closed, "Job closed").await
    }

    async fn transition(&self, job: &Job, next: JobStatus, done: &str) -> Result<Job, AppError> {
        self.guard()?;
        if !job.status.can_transition_to(next) {
            return Err(AppError::validation(format!(
                "A {:?} job cannot become {:?}",
                job.status, next
            ))
            .notify(&self.notifications));
        }
        let updated = self
            .api
            .set_job_status(&job.id, next)
            .await
            .map_err(|e| e.notify(&self.notifications))?;
        info!(job_id = %job.id, from = ?job.status, to = ?updated.status, "job status changed");
        self.notifications.push(Notification::success(done));
        Ok(updated)
    }

    fn guard(&self) -> Result<(), AppError> {
        auth::require_role(&self.session, &self.notifications, POSTING_ROLES).map(|_| ())
    }
}
