pub mod otp_flow;
pub mod session;

use tracing::info;
use validator::Validate;

use crate::api_client::AuthApi;
use crate::errors::AppError;
use crate::models::{AuthSession, Role};
use crate::notifications::{Notification, Notifications};
use crate::state::Navigation;
use session::SessionStore;

#[derive(Debug, Validate)]
struct PasswordLoginInput {
    #[validate(email)]
    email: String,
    #[validate(length(min = 1))]
    password: String,
}

/// Landing page for each role after sign-in.
pub fn landing_page(role: Role) -> &'static str {
    match role {
        Role::Candidate => otp_flow::DEFAULT_LANDING,
        Role::Client | Role::Recruiter => "/dashboard/jobs",
        Role::Admin => "/admin",
    }
}

/// Email + password sign-in for client, recruiter and admin accounts.
/// Candidates sign in through the OTP flow.
pub async fn password_login(
    auth: &dyn AuthApi,
    session: &SessionStore,
    notifications: &Notifications,
    email: &str,
    password: &str,
    role: Role,
    redirect: Option<String>,
) -> Result<Navigation, AppError> {
    if role == Role::Candidate {
        return Err(AppError::validation("Candidates sign in with a one-time code"));
    }
    let input = PasswordLoginInput {
        email: email.trim().to_string(),
        password: password.to_string(),
    };
    input
        .validate()
        .map_err(|_| AppError::validation("Enter your email and password"))?;

    let established = auth
        .login(&input.email, &input.password, role)
        .await
        .map_err(|e| e.notify(notifications))?;
    if established.role != role {
        return Err(AppError::unauthorized(format!(
            "expected a {role} account, got {}",
            established.role
        ))
        .notify(notifications));
    }

    let name = established.display_name();
    session
        .establish(established)
        .map_err(|e| e.notify(notifications))?;
    info!("{role} {} signed in", input.email);
    notifications.push(Notification::success(format!("Welcome, {name}")));

    Ok(Navigation(
        redirect.unwrap_or_else(|| landing_page(role).to_string()),
    ))
}

/// Role guard for page-level actions; a refusal is surfaced to the user.
pub fn require_role(
    session: &SessionStore,
    notifications: &Notifications,
    roles: &[Role],
) -> Result<AuthSession, AppError> {
    session
        .require_role(roles)
        .map_err(|e| e.notify(notifications))
}

pub fn logout(session: &SessionStore, notifications: &Notifications) -> Navigation {
    session.clear();
    notifications.push(Notification::info("Signed out"));
    Navigation(otp_flow::LOGIN_PAGE.to_string())
}
