use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::alert::ComplexCaseAlert;

/// A patient known to the directory. `id` is assigned by the persistence
/// collaborator and is stable and unique across the directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    pub id: String,
    pub name: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub gender: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub primary_diagnosis: Option<String>,
    pub diagnosis: Option<String>,
    pub next_appointment: Option<String>,
    pub reason: Option<String>,
    #[serde(default)]
    pub alerts: Vec<ComplexCaseAlert>,
}

impl Patient {
    pub fn new(id: impl Into<String>, first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            first_name: first_name.into(),
            last_name: last_name.into(),
            gender: None,
            date_of_birth: None,
            primary_diagnosis: None,
            diagnosis: None,
            next_appointment: None,
            reason: None,
            alerts: Vec::new(),
        }
    }

    /// Label shown for the patient: full `name`, else "first last", else id.
    pub fn display_name(&self) -> String {
        if let Some(name) = self.name.as_deref() {
            if !name.is_empty() {
                return name.to_string();
            }
        }
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if full.is_empty() {
            self.id.clone()
        } else {
            full.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_prefers_full_name() {
        let mut p = Patient::new("p1", "Jane", "Doe");
        p.name = Some("Jane Q. Doe".into());
        assert_eq!(p.display_name(), "Jane Q. Doe");
    }

    #[test]
    fn display_name_falls_back_to_first_last() {
        let p = Patient::new("p1", "Jane", "Doe");
        assert_eq!(p.display_name(), "Jane Doe");
    }

    #[test]
    fn display_name_falls_back_to_id() {
        let p = Patient::new("p1", "", "");
        assert_eq!(p.display_name(), "p1");
    }

    #[test]
    fn empty_name_field_is_skipped() {
        let mut p = Patient::new("p1", "Jane", "");
        p.name = Some(String::new());
        assert_eq!(p.display_name(), "Jane");
    }
}
