use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::{AlertSeverity, AlertType};

/// Complex-case alert attached to a patient record. Raised by the alert
/// pipeline, carried here so directory snapshots keep the full record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplexCaseAlert {
    pub id: String,
    pub patient_id: String,
    pub msg: Option<String>,
    pub date: Option<String>,
    pub alert_type: Option<AlertType>,
    pub severity: AlertSeverity,
    #[serde(default)]
    pub triggering_factors: Vec<String>,
    #[serde(default)]
    pub suggested_actions: Vec<String>,
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub acknowledged: bool,
    pub acknowledged_at: Option<DateTime<Utc>>,
    pub confidence: Option<f64>,
    /// Scale of 1-5
    pub likelihood: Option<u8>,
    pub condition_type: Option<String>,
}
