use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabResult {
    pub patient_id: String,
    pub admission_id: String,
    pub name: String,
    pub value: LabValue,
    pub units: Option<String>,
    pub date_time: Option<DateTime<Utc>>,
    pub reference_range: Option<String>,
    pub flag: Option<String>,
}

/// Lab values come back either numeric or textual.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LabValue {
    Number(f64),
    Text(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lab_value_deserializes_untagged() {
        let n: LabValue = serde_json::from_str("5.8").unwrap();
        assert_eq!(n, LabValue::Number(5.8));

        let t: LabValue = serde_json::from_str("\"positive\"").unwrap();
        assert_eq!(t, LabValue::Text("positive".into()));
    }
}
