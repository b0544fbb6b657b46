use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::job::JobId;

/// Join record between a candidate and a job. Created lazily by the backend
/// on the first save or apply; `saved` and `applied` move independently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateJobRelation {
    pub candidate_id: String,
    pub job_id: JobId,
    #[serde(default)]
    pub saved: bool,
    #[serde(default)]
    pub applied: bool,
    #[serde(default)]
    pub saved_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub applied_at: Option<DateTime<Utc>>,
}
