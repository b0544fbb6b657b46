//! Request bodies and response envelopes exchanged with the backend.
//!
//! Every response is decoded into a typed value here or rejected with a
//! tagged `AppError::Parse`; nothing past this module sees raw JSON.

use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::{Job, JobStatus, Role};

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: Option<T>,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetToken {
    pub reset_token: String,
}

#[derive(Debug, Serialize)]
pub struct EmailBody<'a> {
    pub email: &'a str,
}

#[derive(Debug, Serialize)]
pub struct OtpBody<'a> {
    pub email: &'a str,
    pub otp: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

#[derive(Debug, Serialize)]
pub struct LoginBody<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub role: Role,
}

#[derive(Debug, Serialize)]
pub struct ResetEmailBody<'a> {
    pub email: &'a str,
    pub role: Role,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordUpdateBody<'a> {
    pub email: &'a str,
    pub reset_token: &'a str,
    pub password: &'a str,
    pub role: Role,
}

#[derive(Debug, Serialize)]
pub struct StatusBody {
    pub status: JobStatus,
}

#[derive(Debug, Serialize)]
pub struct ApprovalBody {
    pub approved: bool,
}

/// Decodes `{ "data": T, ... }`. A missing or null `data` is a parse error.
pub fn decode_envelope<T: DeserializeOwned>(endpoint: &str, body: &str) -> Result<T, AppError> {
    let envelope: Envelope<T> =
        serde_json::from_str(body).map_err(|e| AppError::parse(endpoint, e.to_string()))?;
    envelope
        .data
        .ok_or_else(|| AppError::parse(endpoint, "response has no data"))
}

/// Pulls a human-readable message out of an error body, falling back to the
/// raw text.
pub fn error_message(body: &str) -> String {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    parsed
        .message
        .or(parsed.error)
        .unwrap_or_else(|| body.trim().to_string())
}

/// Rejects the whole payload if any job breaks the bounds invariants.
pub fn check_jobs(endpoint: &str, jobs: &[Job]) -> Result<(), AppError> {
    jobs.iter()
        .try_for_each(|job| job.check_invariants())
        .map_err(|reason| AppError::parse(endpoint, reason))
}
