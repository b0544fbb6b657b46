//! OTP authentication flow for candidate login and password reset.
//!
//! ```text
//! CollectIdentifier --email--> OtpSent --code--> SessionEstablished      (login)
//!                               OtpSent --code--> ResetPassword --pw--> PasswordUpdated  (reset)
//!                     OtpSent --resend--> OtpSent
//! ```
//!
//! Failed submissions leave the step unchanged. Cancelling before a terminal
//! step drops every transient input without telling the backend.

use std::sync::Arc;

use tracing::{debug, info};
use validator::Validate;

use crate::api_client::AuthApi;
use crate::auth::session::SessionStore;
use crate::errors::AppError;
use crate::models::{describe_validation, Role};
use crate::notifications::{Notification, Notifications};
use crate::state::Navigation;

/// `CodeInput` repeats this as a literal because the validator derive only
/// accepts literals; keep the two in step.
pub const OTP_LENGTH: usize = 5;
pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const DEFAULT_LANDING: &str = "/jobs";
pub const LOGIN_PAGE: &str = "/login";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowKind {
    Login,
    /// Reset for an account of the given role.
    PasswordReset(Role),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpStep {
    CollectIdentifier,
    OtpSent,
    ResetPassword,
    SessionEstablished,
    PasswordUpdated,
    /// Cancelled before completion.
    Closed,
}

impl OtpStep {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            OtpStep::SessionEstablished | OtpStep::PasswordUpdated | OtpStep::Closed
        )
    }
}

#[derive(Debug, Validate)]
struct IdentifierInput {
    #[validate(email)]
    email: String,
}

#[derive(Debug, Validate)]
struct CodeInput {
    #[validate(length(equal = 5))]
    code: String,
}

#[derive(Debug, Validate)]
struct PasswordInput {
    #[validate(length(min = 8))]
    password: String,
}

pub struct OtpAuthFlow {
    kind: FlowKind,
    step: OtpStep,
    email: String,
    reset_token: Option<String>,
    redirect: Option<String>,
    field_error: Option<String>,
    auth: Arc<dyn AuthApi>,
    session: Arc<SessionStore>,
    notifications: Arc<Notifications>,
}

impl OtpAuthFlow {
    /// Opens the flow. `redirect` is where a successful login lands; without
    /// one it lands on `DEFAULT_LANDING`.
    pub fn open(
        kind: FlowKind,
        redirect: Option<String>,
        auth: Arc<dyn AuthApi>,
        session: Arc<SessionStore>,
        notifications: Arc<Notifications>,
    ) -> Self {
        debug!(?kind, ?redirect, "OTP flow opened");
        Self {
            kind,
            step: OtpStep::CollectIdentifier,
            email: String::new(),
            reset_token: None,
            redirect,
            field_error: None,
            auth,
            session,
            notifications,
        }
    }

    pub fn kind(&self) -> FlowKind {
        self.kind
    }

    pub fn step(&self) -> OtpStep {
        self.step
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    /// The last field-level validation message, cleared on the next
    /// successful submission.
    pub fn field_error(&self) -> Option<&str> {
        self.field_error.as_deref()
    }

    pub async fn submit_identifier(&mut self, email: &str) -> Result<(), AppError> {
        self.expect_step(OtpStep::CollectIdentifier)?;
        let email = email.trim();
        self.check(
            &IdentifierInput {
                email: email.to_string(),
            },
            "Enter a valid email address",
        )?;

        self.send_code(email).await?;
        self.email = email.to_string();
        self.step = OtpStep::OtpSent;
        Ok(())
    }

    pub async fn resend(&mut self) -> Result<(), AppError> {
        self.expect_step(OtpStep::OtpSent)?;
        let email = self.email.clone();
        self.check(
            &IdentifierInput {
                email: email.clone(),
            },
            "Enter a valid email address",
        )?;
        self.send_code(&email).await
    }

    /// Verifies the code. Login ends here with a navigation target; a reset
    /// moves on to `ResetPassword` and returns `None`.
    pub async fn submit_code(&mut self, code: &str) -> Result<Option<Navigation>, AppError> {
        self.expect_step(OtpStep::OtpSent)?;
        let code = code.trim();
        self.check(
            &CodeInput {
                code: code.to_string(),
            },
            &format!("Enter the {OTP_LENGTH}-digit code"),
        )?;

        match self.kind {
            FlowKind::Login => {
                let session = self
                    .auth
                    .verify_otp(&self.email, code)
                    .await
                    .map_err(|e| e.notify(&self.notifications))?;
                if session.role != Role::Candidate {
                    self.session.clear();
                    return Err(AppError::unauthorized(format!(
                        "OTP login answered with a {} session",
                        session.role
                    ))
                    .notify(&self.notifications));
                }
                let name = session.display_name();
                self.session
                    .establish(session)
                    .map_err(|e| e.notify(&self.notifications))?;

                info!("Candidate {} signed in", self.email);
                self.notifications
                    .push(Notification::success(format!("Welcome, {name}")));
                self.step = OtpStep::SessionEstablished;
                let target = self
                    .redirect
                    .take()
                    .unwrap_or_else(|| DEFAULT_LANDING.to_string());
                self.discard_inputs();
                Ok(Some(Navigation(target)))
            }
            FlowKind::PasswordReset(role) => {
                let token = self
                    .auth
                    .verify_reset_code(&self.email, code, role)
                    .await
                    .map_err(|e| e.notify(&self.notifications))?;
                self.reset_token = Some(token);
                self.step = OtpStep::ResetPassword;
                Ok(None)
            }
        }
    }

    pub async fn submit_new_password(
        &mut self,
        password: &str,
        confirmation: &str,
    ) -> Result<Navigation, AppError> {
        self.expect_step(OtpStep::ResetPassword)?;
        let FlowKind::PasswordReset(role) = self.kind else {
            return Err(AppError::validation("Password reset is not in progress"));
        };
        self.check(
            &PasswordInput {
                password: password.to_string(),
            },
            &format!("Password must be at least {MIN_PASSWORD_LENGTH} characters"),
        )?;
        if password != confirmation {
            return Err(self.field(AppError::validation("Passwords do not match")));
        }
        let token = self
            .reset_token
            .clone()
            .ok_or_else(|| AppError::validation("Verify the code first"))?;

        self.auth
            .update_password(&self.email, &token, password, role)
            .await
            .map_err(|e| e.notify(&self.notifications))?;

        info!("Password updated for {}", self.email);
        self.notifications.push(Notification::success(
            "Password updated. Sign in with your new password",
        ));
        self.step = OtpStep::PasswordUpdated;
        self.discard_inputs();
        Ok(Navigation(LOGIN_PAGE.to_string()))
    }

    /// Closes the flow. No-op once terminal.
    pub fn cancel(&mut self) {
        if self.step.is_terminal() {
            return;
        }
        debug!(step = ?self.step, "OTP flow cancelled");
        self.discard_inputs();
        self.redirect = None;
        self.step = OtpStep::Closed;
    }

    async fn send_code(&self, email: &str) -> Result<(), AppError> {
        let sent = match self.kind {
            FlowKind::Login => self.auth.send_otp(email).await,
            FlowKind::PasswordReset(role) => self.auth.send_reset_code(email, role).await,
        };
        sent.map_err(|e| e.notify(&self.notifications))?;
        self.notifications
            .push(Notification::info(format!("A code was sent to {email}")));
        Ok(())
    }

    fn expect_step(&self, expected: OtpStep) -> Result<(), AppError> {
        if self.step == expected {
            Ok(())
        } else {
            Err(AppError::validation(format!(
                "Not expected at step {:?}",
                self.step
            )))
        }
    }

    fn check<T: Validate>(&mut self, input: &T, message: &str) -> Result<(), AppError> {
        match input.validate() {
            Ok(()) => {
                self.field_error = None;
                Ok(())
            }
            Err(e) => {
                debug!("{}", describe_validation(&e));
                Err(self.field(AppError::validation(message)))
            }
        }
    }

    fn field(&mut self, err: AppError) -> AppError {
        self.field_error = Some(err.to_string());
        err
    }

    fn discard_inputs(&mut self) {
        self.email.clear();
        self.reset_token = None;
        self.field_error = None;
    }
}
