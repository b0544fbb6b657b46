//! Admin console actions: client approval, account removal, job approval and
//! staff management. Every action needs an admin session.

use std::sync::Arc;

use tracing::{info, warn};
use validator::Validate;

use crate::api_client::AdminApi;
use crate::auth::{self, session::SessionStore};
use crate::errors::AppError;
use crate::models::account::{
    ApprovalStatus, CandidateAccount, ClientOrganization, NewStaff, StaffAccount,
};
use crate::models::{describe_validation, Job, JobId, Role};
use crate::notifications::{Notification, Notifications};

pub struct AdminConsole {
    api: Arc<dyn AdminApi>,
    session: Arc<SessionStore>,
    notifications: Arc<Notifications>,
}

impl AdminConsole {
    pub fn new(
        api: Arc<dyn AdminApi>,
        session: Arc<SessionStore>,
        notifications: Arc<Notifications>,
    ) -> Self {
        Self {
            api,
            session,
            notifications,
        }
    }

    /// Client organizations awaiting a decision.
    pub async fn pending_clients(&self) -> Result<Vec<ClientOrganization>, AppError> {
        self.guard()?;
        self.api
            .clients(Some(ApprovalStatus::Pending))
            .await
            .map_err(|e| e.notify(&self.notifications))
    }

    pub async fn approve_client(&self, id: &str) -> Result<ClientOrganization, AppError> {
        self.decide_client(id, true).await
    }

    pub async fn reject_client(&self, id: &str) -> Result<ClientOrganization, AppError> {
        self.decide_client(id, false).await
    }

    async fn decide_client(&self, id: &str, approved: bool) -> Result<ClientOrganization, AppError> {
        self.guard()?;
        let client = self
            .api
            .set_client_approval(id, approved)
            .await
            .map_err(|e| e.notify(&self.notifications))?;
        info!(client_id = id, approval = ?client.approval, "client decision recorded");
        let message = if approved {
            format!("{} approved", client.name)
        } else {
            format!("{} rejected", client.name)
        };
        self.notifications.push(Notification::success(message));
        Ok(client)
    }

    pub async fn delete_client(&self, id: &str) -> Result<(), AppError> {
        self.guard()?;
        self.api
            .delete_client(id)
            .await
            .map_err(|e| e.notify(&self.notifications))?;
        warn!(client_id = id, "client organization deleted");
        self.notifications
            .push(Notification::success("Client organization deleted"));
        Ok(())
    }

    pub async fn candidates(&self) -> Result<Vec<CandidateAccount>, AppError> {
        self.guard()?;
        self.api
            .candidates()
            .await
            .map_err(|e| e.notify(&self.notifications))
    }

    pub async fn delete_candidate(&self, id: &str) -> Result<(), AppError> {
        self.guard()?;
        self.api
            .delete_candidate(id)
            .await
            .map_err(|e| e.notify(&self.notifications))?;
        warn!(candidate_id = id, "candidate account deleted");
        self.notifications
            .push(Notification::success("Candidate deleted"));
        Ok(())
    }

    pub async fn approve_job(&self, id: &JobId) -> Result<Job, AppError> {
        self.guard()?;
        let job = self
            .api
            .set_job_approval(id, true)
            .await
            .map_err(|e| e.notify(&self.notifications))?;
        info!(job_id = %id, "job approved");
        self.notifications
            .push(Notification::success(format!("{} approved", job.title)));
        Ok(job)
    }

    /// Creates a recruiter or admin account. Candidates and clients
    /// register themselves.
    pub async fn create_staff(&self, staff: &NewStaff) -> Result<StaffAccount, AppError> {
        self.guard()?;
        check_staff(staff).map_err(|e| e.notify(&self.notifications))?;
        let account = self
            .api
            .create_staff(staff)
            .await
            .map_err(|e| e.notify(&self.notifications))?;
        info!(role = %account.role, "staff account created for {}", account.email);
        self.notifications
            .push(Notification::success(format!("{} account created", account.role)));
        Ok(account)
    }

    pub async fn delete_staff(&self, id: &str) -> Result<(), AppError> {
        self.guard()?;
        let me = self.session.current().map(|s| s.user_id);
        if me.as_deref() == Some(id) {
            return Err(AppError::validation("You cannot delete your own account")
                .notify(&self.notifications));
        }
        self.api
            .delete_staff(id)
            .await
            .map_err(|e| e.notify(&self.notifications))?;
        warn!(staff_id = id, "staff account deleted");
        self.notifications
            .push(Notification::success("Staff account deleted"));
        Ok(())
    }

    fn guard(&self) -> Result<(), AppError> {
        auth::require_role(&self.session, &self.notifications, &[Role::Admin]).map(|_| ())
    }
}

fn check_staff(staff: &NewStaff) -> Result<(), AppError> {
    staff
        .validate()
        .map_err(|e| AppError::validation(describe_validation(&e)))?;
    match staff.role {
        Role::Recruiter | Role::Admin => Ok(()),
        other => Err(AppError::validation(format!(
            "Staff accounts cannot have the {other} role"
        ))),
    }
}
