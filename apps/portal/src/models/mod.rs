pub mod account;
pub mod job;
pub mod relation;
pub mod session;

pub use job::{Job, JobDraft, JobId, JobStatus};
pub use relation::CandidateJobRelation;
pub use session::{AuthSession, Role};

use validator::ValidationErrors;

/// Flattens validator output into one user-facing line, fields sorted.
pub fn describe_validation(errors: &ValidationErrors) -> String {
    let mut fields: Vec<String> = errors
        .field_errors()
        .keys()
        .map(|k| k.to_string())
        .collect();
    fields.sort();
    format!("Invalid {}", fields.join(", "))
}
