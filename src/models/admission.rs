use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One scheduled or actual clinical encounter. Belongs to exactly one
/// patient via the non-owning `patient_id` reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Admission {
    pub id: String,
    pub patient_id: String,
    pub scheduled_start: DateTime<Utc>,
    pub scheduled_end: DateTime<Utc>,
    pub actual_start: Option<DateTime<Utc>>,
    pub actual_end: Option<DateTime<Utc>>,
    pub reason: Option<String>,
    // Post-encounter fields, populated by processes outside this workflow.
    pub transcript: Option<String>,
    pub soap_note: Option<String>,
    #[serde(default)]
    pub treatments: Vec<Treatment>,
    pub prior_auth_justification: Option<String>,
    #[serde(default)]
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Treatment {
    pub drug: String,
    pub status: String,
    pub rationale: String,
}
