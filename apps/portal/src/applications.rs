use std::sync::{Arc, Mutex, PoisonError};

use tracing::info;

use crate::api_client::JobsApi;
use crate::auth::{self, session::SessionStore};
use crate::errors::AppError;
use crate::feed::JobFeed;
use crate::models::{CandidateJobRelation, JobId, JobStatus, Role};
use crate::notifications::{Notification, Notifications};

/// Candidate job applications. Applying needs a candidate session, so every
/// `applied` flag the backend records was set by an authenticated candidate.
pub struct Applications {
    api: Arc<dyn JobsApi>,
    session: Arc<SessionStore>,
    feed: Arc<Mutex<JobFeed>>,
    notifications: Arc<Notifications>,
}

impl Applications {
    pub fn new(
        api: Arc<dyn JobsApi>,
        session: Arc<SessionStore>,
        feed: Arc<Mutex<JobFeed>>,
        notifications: Arc<Notifications>,
    ) -> Self {
        Self {
            api,
            session,
            feed,
            notifications,
        }
    }

    pub async fn apply(&self, job_id: &JobId) -> Result<CandidateJobRelation, AppError> {
        let candidate = auth::require_role(&self.session, &self.notifications, &[Role::Candidate])?;
        self.check_open(job_id)
            .map_err(|e| e.notify(&self.notifications))?;

        let relation = self
            .api
            .apply(job_id)
            .await
            .map_err(|e| e.notify(&self.notifications))?;
        if !relation.applied || relation.job_id != *job_id {
            return Err(AppError::parse(
                format!("/candidate/jobs/{job_id}/apply"),
                "relation does not record the application",
            )
            .notify(&self.notifications));
        }

        self.feed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .relations_mut()
            .mark_applied(job_id);
        info!(%job_id, candidate = %candidate.user_id, "application submitted");
        self.notifications
            .push(Notification::success("Application submitted"));
        Ok(relation)
    }

    fn check_open(&self, job_id: &JobId) -> Result<(), AppError> {
        let feed = self.feed.lock().unwrap_or_else(PoisonError::into_inner);
        if feed.relations().is_applied(job_id) {
            return Err(AppError::validation("You have already applied to this job"));
        }
        match feed.job(job_id) {
            Some(job) if job.status != JobStatus::Active => Err(AppError::validation(
                "This job is no longer accepting applications",
            )),
            _ => Ok(()),
        }
    }
}
