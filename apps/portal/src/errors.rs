use thiserror::Error;

use crate::notifications::{Notification, Notifications};

/// Application-level error type.
/// Every failure a portal operation can produce; `notify` turns it into what
/// the user gets to see.
#[derive(Debug, Error)]
pub enum AppError {
    /// Local, field-level. Never reaches the network layer.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Backend answered with a non-2xx status.
    #[error("Remote error (status {status}): {message}")]
    Remote { status: u16, message: String },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered 2xx but the body did not match the expected schema.
    #[error("Malformed response from {endpoint}: {reason}")]
    Parse { endpoint: String, reason: String },

    /// Background reconciliation failure. Logged, never shown.
    #[error("Silent failure: {0}")]
    Silent(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn parse(endpoint: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Parse {
            endpoint: endpoint.into(),
            reason: reason.into(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, AppError::Validation(_))
    }

    /// Remote-class failures: everything that came back from (or failed on
    /// the way to) the backend.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            AppError::Remote { .. } | AppError::Http(_) | AppError::Parse { .. }
        )
    }

    /// Maps the error to a user-facing notification, or `None` for errors
    /// that are only logged.
    pub fn to_notification(&self) -> Option<Notification> {
        let message = match self {
            AppError::Validation(msg) => msg.clone(),
            AppError::Remote { status, message } => {
                tracing::warn!("Remote call rejected ({status}): {message}");
                if message.is_empty() {
                    "The server rejected the request".to_string()
                } else {
                    message.clone()
                }
            }
            AppError::Unauthorized(msg) => {
                tracing::warn!("Unauthorized: {msg}");
                "Please sign in to continue".to_string()
            }
            AppError::Http(e) => {
                tracing::error!("HTTP error: {e}");
                "Could not reach the server".to_string()
            }
            AppError::Parse { endpoint, reason } => {
                tracing::error!("Malformed response from {endpoint}: {reason}");
                "The server sent an unexpected response".to_string()
            }
            AppError::Silent(msg) => {
                tracing::warn!("Silent failure: {msg}");
                return None;
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                "Something went wrong".to_string()
            }
        };

        Some(Notification::error(message))
    }

    /// Surfaces the error on the notification channel and hands it back so
    /// call sites can keep propagating with `?`.
    pub fn notify(self, notifications: &Notifications) -> Self {
        if let Some(notification) = self.to_notification() {
            notifications.push(notification);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifications::Level;

    #[test]
    fn test_remote_error_uses_backend_message() {
        let err = AppError::Remote {
            status: 400,
            message: "Invalid OTP".to_string(),
        };
        let n = err.to_notification().unwrap();
        assert_eq!(n.level, Level::Error);
        assert_eq!(n.message, "Invalid OTP");
    }

    #[test]
    fn test_remote_error_without_message_gets_generic_text() {
        let err = AppError::Remote {
            status: 500,
            message: String::new(),
        };
        assert_eq!(
            err.to_notification().unwrap().message,
            "The server rejected the request"
        );
    }

    #[test]
    fn test_silent_error_is_not_surfaced() {
        let notifications = Notifications::default();
        let _ = AppError::Silent("revert failed".to_string()).notify(&notifications);
        assert!(notifications.drain().is_empty());
    }

    #[test]
    fn test_notify_pushes_and_returns_error() {
        let notifications = Notifications::default();
        let err = AppError::validation("Email is required").notify(&notifications);
        assert!(err.is_validation());
        assert_eq!(notifications.drain().len(), 1);
    }

    #[test]
    fn test_parse_is_remote_class() {
        assert!(AppError::parse("/jobs", "missing field `title`").is_remote());
        assert!(!AppError::validation("x").is_remote());
    }
}
