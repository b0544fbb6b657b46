use std::sync::{Arc, Mutex, PoisonError};

use crate::admin::AdminConsole;
use crate::api_client::{AdminApi, ApiClient, AuthApi, JobsApi, PostingsApi};
use crate::applications::Applications;
use crate::auth::otp_flow::{FlowKind, OtpAuthFlow};
use crate::auth::session::SessionStore;
use crate::bookmarks::BookmarkSync;
use crate::config::Config;
use crate::errors::AppError;
use crate::feed::{fetch_snapshot, JobFeed};
use crate::notifications::Notifications;
use crate::postings::Postings;

/// Route the user should be sent to after an operation completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation(pub String);

/// Shared portal state handed to every screen.
/// One `ApiClient` backs all four API seams unless a test swaps them out.
#[derive(Clone)]
pub struct AppContext {
    pub config: Config,
    pub session: Arc<SessionStore>,
    pub notifications: Arc<Notifications>,
    pub feed: Arc<Mutex<JobFeed>>,
    pub jobs: Arc<dyn JobsApi>,
    pub auth: Arc<dyn AuthApi>,
    pub postings: Arc<dyn PostingsApi>,
    pub admin: Arc<dyn AdminApi>,
}

impl AppContext {
    /// Restores any persisted session and points every API seam at
    /// `config.api_url`.
    pub fn connect(config: Config) -> Self {
        let session = Arc::new(SessionStore::init(config.session_file.clone()));
        let client = Arc::new(ApiClient::new(config.api_url.clone(), session.clone()));
        Self {
            feed: Arc::new(Mutex::new(JobFeed::new(config.page_size))),
            notifications: Arc::new(Notifications::default()),
            jobs: client.clone(),
            auth: client.clone(),
            postings: client.clone(),
            admin: client,
            session,
            config,
        }
    }

    /// Reloads jobs (and candidate relations) into the shared feed.
    pub async fn refresh_feed(&self) -> Result<usize, AppError> {
        let snapshot = fetch_snapshot(self.jobs.as_ref(), &self.session)
            .await
            .map_err(|e| e.notify(&self.notifications))?;
        let mut feed = self.feed.lock().unwrap_or_else(PoisonError::into_inner);
        feed.apply_snapshot(snapshot);
        Ok(feed.jobs().len())
    }

    pub fn login_flow(&self, redirect: Option<String>) -> OtpAuthFlow {
        self.otp_flow(FlowKind::Login, redirect)
    }

    pub fn otp_flow(&self, kind: FlowKind, redirect: Option<String>) -> OtpAuthFlow {
        OtpAuthFlow::open(
            kind,
            redirect,
            self.auth.clone(),
            self.session.clone(),
            self.notifications.clone(),
        )
    }

    pub fn bookmarks(&self) -> BookmarkSync {
        BookmarkSync::new(
            self.jobs.clone(),
            self.feed.clone(),
            self.notifications.clone(),
        )
    }

    pub fn applications(&self) -> Applications {
        Applications::new(
            self.jobs.clone(),
            self.session.clone(),
            self.feed.clone(),
            self.notifications.clone(),
        )
    }

    pub fn postings(&self) -> Postings {
        Postings::new(
            self.postings.clone(),
            self.session.clone(),
            self.notifications.clone(),
        )
    }

    pub fn admin(&self) -> AdminConsole {
        AdminConsole::new(
            self.admin.clone(),
            self.session.clone(),
            self.notifications.clone(),
        )
    }
}
