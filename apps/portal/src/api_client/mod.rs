//! API client: the single point of entry for all backend calls in the portal.
//!
//! No other module talks HTTP. Handlers depend on the traits below so they
//! can run against in-process fakes; `ApiClient` is the reqwest-backed
//! implementation of all of them.

use std::sync::Arc;

use anyhow::anyhow;
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::auth::session::SessionStore;
use crate::errors::AppError;
use crate::models::account::{
    ApprovalStatus, CandidateAccount, ClientOrganization, NewStaff, StaffAccount,
};
use crate::models::{AuthSession, CandidateJobRelation, Job, JobDraft, JobId, JobStatus, Role};

pub mod wire;

use wire::{
    check_jobs, decode_envelope, error_message, ApprovalBody, EmailBody, LoginBody, OtpBody,
    PasswordUpdateBody, ResetEmailBody, ResetToken, StatusBody,
};

#[async_trait]
pub trait JobsApi: Send + Sync {
    async fn list_jobs(&self) -> Result<Vec<Job>, AppError>;
    async fn job_detail(&self, id: &JobId) -> Result<Job, AppError>;
    /// Saved/applied records of the signed-in candidate.
    async fn relations(&self) -> Result<Vec<CandidateJobRelation>, AppError>;
    async fn save_job(&self, id: &JobId) -> Result<(), AppError>;
    async fn unsave_job(&self, id: &JobId) -> Result<(), AppError>;
    async fn apply(&self, id: &JobId) -> Result<CandidateJobRelation, AppError>;
}

#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn send_otp(&self, email: &str) -> Result<(), AppError>;
    async fn verify_otp(&self, email: &str, code: &str) -> Result<AuthSession, AppError>;
    async fn login(&self, email: &str, password: &str, role: Role)
        -> Result<AuthSession, AppError>;
    async fn send_reset_code(&self, email: &str, role: Role) -> Result<(), AppError>;
    /// Exchanges a reset code for a short-lived reset token.
    async fn verify_reset_code(&self, email: &str, code: &str, role: Role)
        -> Result<String, AppError>;
    async fn update_password(
        &self,
        email: &str,
        reset_token: &str,
        password: &str,
        role: Role,
    ) -> Result<(), AppError>;
}

#[async_trait]
pub trait PostingsApi: Send + Sync {
    async fn own_jobs(&self) -> Result<Vec<Job>, AppError>;
    async fn create_job(&self, draft: &JobDraft) -> Result<Job, AppError>;
    async fn update_job(&self, id: &JobId, draft: &JobDraft) -> Result<Job, AppError>;
    async fn set_job_status(&self, id: &JobId, status: JobStatus) -> Result<Job, AppError>;
}

#[async_trait]
pub trait AdminApi: Send + Sync {
    async fn clients(&self, approval: Option<ApprovalStatus>)
        -> Result<Vec<ClientOrganization>, AppError>;
    async fn set_client_approval(&self, id: &str, approved: bool)
        -> Result<ClientOrganization, AppError>;
    async fn delete_client(&self, id: &str) -> Result<(), AppError>;
    async fn candidates(&self) -> Result<Vec<CandidateAccount>, AppError>;
    async fn delete_candidate(&self, id: &str) -> Result<(), AppError>;
    async fn set_job_approval(&self, id: &JobId, approved: bool) -> Result<Job, AppError>;
    async fn create_staff(&self, staff: &NewStaff) -> Result<StaffAccount, AppError>;
    async fn delete_staff(&self, id: &str) -> Result<(), AppError>;
}

/// reqwest-backed client for the job-board REST API.
/// Authenticated calls read the bearer token from the session store at
/// request time, so a login or logout takes effect on the next call.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    session: Arc<SessionStore>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, session: Arc<SessionStore>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session,
        }
    }

    /// Appends `path` to the base URL one segment at a time, so ids are
    /// percent-encoded and can never reach another route.
    fn url(&self, path: &[&str]) -> Result<Url, AppError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| anyhow!("invalid API url {}: {e}", self.base_url))?;
        url.path_segments_mut()
            .map_err(|_| anyhow!("API url {} cannot take a path", self.base_url))?
            .pop_if_empty()
            .extend(path);
        Ok(url)
    }

    fn public(&self, method: Method, path: &[&str]) -> Result<RequestBuilder, AppError> {
        Ok(self.client.request(method, self.url(path)?))
    }

    fn authed(&self, method: Method, path: &[&str]) -> Result<RequestBuilder, AppError> {
        let token = self.session.token().ok_or_else(|| {
            AppError::unauthorized(format!("{} requires a session", endpoint(path)))
        })?;
        Ok(self.public(method, path)?.bearer_auth(token))
    }

    /// Sends the request and decodes the `data` member of the response
    /// envelope.
    async fn fetch<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        path: &[&str],
    ) -> Result<T, AppError> {
        let body = self.execute(request, path).await?;
        decode_envelope(&endpoint(path), &body)
    }

    async fn fetch_jobs(&self, request: RequestBuilder, path: &[&str]) -> Result<Vec<Job>, AppError> {
        let jobs: Vec<Job> = self.fetch(request, path).await?;
        check_jobs(&endpoint(path), &jobs)?;
        Ok(jobs)
    }

    async fn fetch_job(&self, request: RequestBuilder, path: &[&str]) -> Result<Job, AppError> {
        let job: Job = self.fetch(request, path).await?;
        check_jobs(&endpoint(path), std::slice::from_ref(&job))?;
        Ok(job)
    }

    /// Sends the request, accepting any 2xx body.
    async fn submit(&self, request: RequestBuilder, path: &[&str]) -> Result<(), AppError> {
        self.execute(request, path).await.map(|_| ())
    }

    async fn execute(&self, request: RequestBuilder, path: &[&str]) -> Result<String, AppError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(AppError::Remote {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        debug!("{} -> {status} ({} bytes)", endpoint(path), body.len());
        Ok(body)
    }
}

/// Endpoint label used in logs and parse errors, e.g. `/jobs/J1`.
fn endpoint(path: &[&str]) -> String {
    format!("/{}", path.join("/"))
}

#[async_trait]
impl JobsApi for ApiClient {
    async fn list_jobs(&self) -> Result<Vec<Job>, AppError> {
        let path = ["jobs"];
        self.fetch_jobs(self.public(Method::GET, &path)?, &path).await
    }

    async fn job_detail(&self, id: &JobId) -> Result<Job, AppError> {
        let path = ["jobs", id.as_str()];
        self.fetch_job(self.public(Method::GET, &path)?, &path).await
    }

    async fn relations(&self) -> Result<Vec<CandidateJobRelation>, AppError> {
        let path = ["candidate", "relations"];
        self.fetch(self.authed(Method::GET, &path)?, &path).await
    }

    async fn save_job(&self, id: &JobId) -> Result<(), AppError> {
        let path = ["candidate", "jobs", id.as_str(), "save"];
        self.submit(self.authed(Method::POST, &path)?, &path).await
    }

    async fn unsave_job(&self, id: &JobId) -> Result<(), AppError> {
        let path = ["candidate", "jobs", id.as_str(), "save"];
        self.submit(self.authed(Method::DELETE, &path)?, &path).await
    }

    async fn apply(&self, id: &JobId) -> Result<CandidateJobRelation, AppError> {
        let path = ["candidate", "jobs", id.as_str(), "apply"];
        self.fetch(self.authed(Method::POST, &path)?, &path).await
    }
}

#[async_trait]
impl AuthApi for ApiClient {
    async fn send_otp(&self, email: &str) -> Result<(), AppError> {
        let path = ["candidate", "otp", "send"];
        let request = self.public(Method::POST, &path)?.json(&EmailBody { email });
        self.submit(request, &path).await
    }

    async fn verify_otp(&self, email: &str, code: &str) -> Result<AuthSession, AppError> {
        let path = ["candidate", "otp", "verify"];
        let request = self.public(Method::POST, &path)?.json(&OtpBody {
            email,
            otp: code,
            role: None,
        });
        self.fetch(request, &path).await
    }

    async fn login(
        &self,
        email: &str,
        password: &str,
        role: Role,
    ) -> Result<AuthSession, AppError> {
        let path = ["auth", "login"];
        let request = self.public(Method::POST, &path)?.json(&LoginBody {
            email,
            password,
            role,
        });
        self.fetch(request, &path).await
    }

    async fn send_reset_code(&self, email: &str, role: Role) -> Result<(), AppError> {
        let path = ["auth", "password-reset", "send"];
        let request = self
            .public(Method::POST, &path)?
            .json(&ResetEmailBody { email, role });
        self.submit(request, &path).await
    }

    async fn verify_reset_code(
        &self,
        email: &str,
        code: &str,
        role: Role,
    ) -> Result<String, AppError> {
        let path = ["auth", "password-reset", "verify"];
        let request = self.public(Method::POST, &path)?.json(&OtpBody {
            email,
            otp: code,
            role: Some(role),
        });
        let token: ResetToken = self.fetch(request, &path).await?;
        Ok(token.reset_token)
    }

    async fn update_password(
        &self,
        email: &str,
        reset_token: &str,
        password: &str,
        role: Role,
    ) -> Result<(), AppError> {
        let path = ["auth", "password-reset", "update"];
        let request = self.public(Method::POST, &path)?.json(&PasswordUpdateBody {
            email,
            reset_token,
            password,
            role,
        });
        self.submit(request, &path).await
    }
}

#[async_trait]
impl PostingsApi for ApiClient {
    async fn own_jobs(&self) -> Result<Vec<Job>, AppError> {
        let path = ["client", "jobs"];
        self.fetch_jobs(self.authed(Method::GET, &path)?, &path).await
    }

    async fn create_job(&self, draft: &JobDraft) -> Result<Job, AppError> {
        let path = ["client", "jobs"];
        let request = self.authed(Method::POST, &path)?.json(draft);
        self.fetch_job(request, &path).await
    }

    async fn update_job(&self, id: &JobId, draft: &JobDraft) -> Result<Job, AppError> {
        let path = ["client", "jobs", id.as_str()];
        let request = self.authed(Method::PUT, &path)?.json(draft);
        self.fetch_job(request, &path).await
    }

    async fn set_job_status(&self, id: &JobId, status: JobStatus) -> Result<Job, AppError> {
        let path = ["client", "jobs", id.as_str(), "status"];
        let request = self
            .authed(Method::PATCH, &path)?
            .json(&StatusBody { status });
        self.fetch_job(request, &path).await
    }
}

#[async_trait]
impl AdminApi for ApiClient {
    async fn clients(
        &self,
        approval: Option<ApprovalStatus>,
    ) -> Result<Vec<ClientOrganization>, AppError> {
        let path = ["admin", "clients"];
        let mut request = self.authed(Method::GET, &path)?;
        if let Some(approval) = approval {
            request = request.query(&[("approval", approval)]);
        }
        self.fetch(request, &path).await
    }

    async fn set_client_approval(
        &self,
        id: &str,
        approved: bool,
    ) -> Result<ClientOrganization, AppError> {
        let path = ["admin", "clients", id, "approval"];
        let request = self
            .authed(Method::PATCH, &path)?
            .json(&ApprovalBody { approved });
        self.fetch(request, &path).await
    }

    async fn delete_client(&self, id: &str) -> Result<(), AppError> {
        let path = ["admin", "clients", id];
        self.submit(self.authed(Method::DELETE, &path)?, &path).await
    }

    async fn candidates(&self) -> Result<Vec<CandidateAccount>, AppError> {
        let path = ["admin", "candidates"];
        self.fetch(self.authed(Method::GET, &path)?, &path).await
    }

    async fn delete_candidate(&self, id: &str) -> Result<(), AppError> {
        let path = ["admin", "candidates", id];
        self.submit(self.authed(Method::DELETE, &path)?, &path).await
    }

    async fn set_job_approval(&self, id: &JobId, approved: bool) -> Result<Job, AppError> {
        let path = ["admin", "jobs", id.as_str(), "approval"];
        let request = self
            .authed(Method::PATCH, &path)?
            .json(&ApprovalBody { approved });
        self.fetch_job(request, &path).await
    }

    async fn create_staff(&self, staff: &NewStaff) -> Result<StaffAccount, AppError> {
        let path = ["admin", "staff"];
        let request = self.authed(Method::POST, &path)?.json(staff);
        self.fetch(request, &path).await
    }

    async fn delete_staff(&self, id: &str) -> Result<(), AppError> {
        let path = ["admin", "staff", id];
        self.submit(self.authed(Method::DELETE, &path)?, &path).await
    }
}
