use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnosis {
    pub patient_id: String,
    pub admission_id: String,
    pub code: Option<String>,
    pub description: Option<String>,
}
