//! Persistence collaborator surface: the trait the intake workflow drives,
//! wire payload types, and an in-memory reference implementation.
//!
//! The workflow never talks to storage directly; it is handed an
//! `Arc<dyn PatientDataService>` at construction. Payload fields carry the
//! wire encodings the collaborator contract expects: ISO-8601 for the
//! scheduled start, `YYYY-MM-DD` for the date of birth.

use std::str::FromStr;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config;
use crate::models::{Admission, Gender, Patient};

// ─── Errors ───────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("patient not found: {0}")]
    PatientNotFound(String),

    #[error("invalid {field} value: {value}")]
    InvalidField { field: &'static str, value: String },

    #[error("patient store unavailable: {0}")]
    Unavailable(String),
}

// ─── Wire payloads ────────────────────────────────────────────────────────────

/// Admission fields sent on creation. Unset fields are omitted from the
/// payload; the collaborator applies its own defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewAdmissionFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// ISO-8601 instant of the chosen date-time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_start: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,
}

/// Patient fields sent when the new-patient tab creates a record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPatientFields {
    pub first_name: String,
    pub last_name: String,
    pub gender: String,
    /// `YYYY-MM-DD` calendar date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
}

/// Result of a combined patient + admission creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedConsultation {
    pub patient: Patient,
    pub admission: Admission,
}

// ─── Collaborator trait ───────────────────────────────────────────────────────

/// Asynchronous persistence collaborator for patients and admissions.
///
/// `load_patient_data` populates the collaborator's internal store;
/// `get_all_patients` is a synchronous read of whatever is currently held.
#[async_trait]
pub trait PatientDataService: Send + Sync {
    async fn load_patient_data(&self) -> Result<(), ServiceError>;

    fn get_all_patients(&self) -> Vec<Patient>;

    async fn create_new_admission(
        &self,
        patient_id: &str,
        fields: NewAdmissionFields,
    ) -> Result<Admission, ServiceError>;

    async fn create_new_patient_with_admission(
        &self,
        patient: NewPatientFields,
        admission: NewAdmissionFields,
    ) -> Result<CreatedConsultation, ServiceError>;
}

// ─── In-memory reference implementation ───────────────────────────────────────

/// Reference collaborator holding an internal mutable store, seeded at
/// construction. `load_patient_data` pulls the seed into the store without
/// discarding records created since; creation ops mint v4 ids and apply the
/// documented defaults (scheduled start = now, visit length =
/// [`config::DEFAULT_VISIT_MINUTES`] when the payload leaves them unset).
pub struct InMemoryPatientService {
    seed: Vec<Patient>,
    store: RwLock<Store>,
}

#[derive(Default)]
struct Store {
    patients: Vec<Patient>,
    admissions: Vec<Admission>,
}

impl InMemoryPatientService {
    pub fn new(seed: Vec<Patient>) -> Self {
        Self {
            seed,
            store: RwLock::new(Store::default()),
        }
    }

    /// Admissions currently held for one patient, in creation order.
    pub fn admissions_for(&self, patient_id: &str) -> Vec<Admission> {
        self.store
            .read()
            .map(|s| {
                s.admissions
                    .iter()
                    .filter(|a| a.patient_id == patient_id)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    fn build_admission(
        patient_id: &str,
        fields: &NewAdmissionFields,
    ) -> Result<Admission, ServiceError> {
        let scheduled_start = match fields.scheduled_start.as_deref() {
            Some(raw) => DateTime::parse_from_rfc3339(raw)
                .map(|d| d.with_timezone(&Utc))
                .map_err(|_| ServiceError::InvalidField {
                    field: "scheduled_start",
                    value: raw.to_string(),
                })?,
            None => Utc::now(),
        };
        let minutes = fields
            .duration_minutes
            .unwrap_or(config::DEFAULT_VISIT_MINUTES);

        Ok(Admission {
            id: Uuid::new_v4().to_string(),
            patient_id: patient_id.to_string(),
            scheduled_start,
            scheduled_end: scheduled_start + Duration::minutes(i64::from(minutes)),
            actual_start: None,
            actual_end: None,
            reason: fields.reason.clone(),
            transcript: None,
            soap_note: None,
            treatments: Vec::new(),
            prior_auth_justification: None,
            is_deleted: false,
            deleted_at: None,
        })
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Store>, ServiceError> {
        self.store
            .write()
            .map_err(|_| ServiceError::Unavailable("patient store lock poisoned".into()))
    }
}

#[async_trait]
impl PatientDataService for InMemoryPatientService {
    async fn load_patient_data(&self) -> Result<(), ServiceError> {
        let mut store = self.write()?;
        for patient in &self.seed {
            if !store.patients.iter().any(|p| p.id == patient.id) {
                store.patients.push(patient.clone());
            }
        }
        tracing::debug!(count = store.patients.len(), "patient store loaded");
        Ok(())
    }

    fn get_all_patients(&self) -> Vec<Patient> {
        self.store
            .read()
            .map(|s| s.patients.clone())
            .unwrap_or_default()
    }

    async fn create_new_admission(
        &self,
        patient_id: &str,
        fields: NewAdmissionFields,
    ) -> Result<Admission, ServiceError> {
        let mut store = self.write()?;
        if !store.patients.iter().any(|p| p.id == patient_id) {
            return Err(ServiceError::PatientNotFound(patient_id.to_string()));
        }
        let admission = Self::build_admission(patient_id, &fields)?;
        store.admissions.push(admission.clone());
        Ok(admission)
    }

    async fn create_new_patient_with_admission(
        &self,
        patient: NewPatientFields,
        admission: NewAdmissionFields,
    ) -> Result<CreatedConsultation, ServiceError> {
        let gender = Gender::from_str(&patient.gender)?;
        let date_of_birth = patient
            .date_of_birth
            .as_deref()
            .map(|raw| {
                NaiveDate::parse_from_str(raw, config::DOB_FORMAT).map_err(|_| {
                    ServiceError::InvalidField {
                        field: "date_of_birth",
                        value: raw.to_string(),
                    }
                })
            })
            .transpose()?;

        let record = Patient {
            id: Uuid::new_v4().to_string(),
            name: None,
            first_name: patient.first_name,
            last_name: patient.last_name,
            gender: Some(gender.as_str().to_string()),
            date_of_birth,
            primary_diagnosis: None,
            diagnosis: None,
            next_appointment: None,
            reason: None,
            alerts: Vec::new(),
        };

        let mut store = self.write()?;
        let created = Self::build_admission(&record.id, &admission)?;
        store.patients.push(record.clone());
        store.admissions.push(created.clone());
        Ok(CreatedConsultation {
            patient: record,
            admission: created,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> InMemoryPatientService {
        InMemoryPatientService::new(vec![
            Patient::new("p1", "Maria", "Santos"),
            Patient::new("p2", "John", "Smith"),
        ])
    }

    #[tokio::test]
    async fn load_pulls_seed_into_store() {
        let svc = seeded();
        assert!(svc.get_all_patients().is_empty());

        svc.load_patient_data().await.unwrap();
        let all = svc.get_all_patients();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, "p1");
    }

    #[tokio::test]
    async fn load_preserves_created_records() {
        let svc = seeded();
        svc.load_patient_data().await.unwrap();

        let created = svc
            .create_new_patient_with_admission(
                NewPatientFields {
                    first_name: "Jane".into(),
                    last_name: "Doe".into(),
                    gender: "Female".into(),
                    date_of_birth: None,
                },
                NewAdmissionFields::default(),
            )
            .await
            .unwrap();

        svc.load_patient_data().await.unwrap();
        let all = svc.get_all_patients();
        assert_eq!(all.len(), 3);
        assert!(all.iter().any(|p| p.id == created.patient.id));
    }

    #[tokio::test]
    async fn admission_for_unknown_patient_is_rejected() {
        let svc = seeded();
        svc.load_patient_data().await.unwrap();

        let err = svc
            .create_new_admission("ghost", NewAdmissionFields::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::PatientNotFound(id) if id == "ghost"));
    }

    #[tokio::test]
    async fn admission_defaults_apply_when_fields_omitted() {
        let svc = seeded();
        svc.load_patient_data().await.unwrap();

        let admission = svc
            .create_new_admission("p1", NewAdmissionFields::default())
            .await
            .unwrap();
        assert_eq!(admission.patient_id, "p1");
        assert_eq!(
            admission.scheduled_end - admission.scheduled_start,
            Duration::minutes(i64::from(config::DEFAULT_VISIT_MINUTES))
        );
        assert!(admission.reason.is_none());
    }

    #[tokio::test]
    async fn admission_honors_scheduled_start_and_duration() {
        let svc = seeded();
        svc.load_patient_data().await.unwrap();

        let admission = svc
            .create_new_admission(
                "p1",
                NewAdmissionFields {
                    reason: Some("joint pain".into()),
                    scheduled_start: Some("2026-03-02T09:30:00.000Z".into()),
                    duration_minutes: Some(45),
                },
            )
            .await
            .unwrap();
        assert_eq!(admission.scheduled_start.to_rfc3339(), "2026-03-02T09:30:00+00:00");
        assert_eq!(
            admission.scheduled_end - admission.scheduled_start,
            Duration::minutes(45)
        );
        assert_eq!(admission.reason.as_deref(), Some("joint pain"));

        assert_eq!(svc.admissions_for("p1").len(), 1);
    }

    #[tokio::test]
    async fn malformed_scheduled_start_is_rejected() {
        let svc = seeded();
        svc.load_patient_data().await.unwrap();

        let err = svc
            .create_new_admission(
                "p1",
                NewAdmissionFields {
                    scheduled_start: Some("03/02/2026".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidField { field: "scheduled_start", .. }));
    }

    #[tokio::test]
    async fn new_patient_parses_dob_and_gender() {
        let svc = seeded();
        let created = svc
            .create_new_patient_with_admission(
                NewPatientFields {
                    first_name: "Jane".into(),
                    last_name: "Doe".into(),
                    gender: "Female".into(),
                    date_of_birth: Some("2021-05-03".into()),
                },
                NewAdmissionFields::default(),
            )
            .await
            .unwrap();

        assert_eq!(created.patient.gender.as_deref(), Some("Female"));
        assert_eq!(
            created.patient.date_of_birth,
            NaiveDate::from_ymd_opt(2021, 5, 3)
        );
        assert_eq!(created.admission.patient_id, created.patient.id);
    }

    #[tokio::test]
    async fn new_patient_with_unknown_gender_is_rejected() {
        let svc = seeded();
        let err = svc
            .create_new_patient_with_admission(
                NewPatientFields {
                    first_name: "Jane".into(),
                    last_name: "Doe".into(),
                    gender: "unknown".into(),
                    date_of_birth: None,
                },
                NewAdmissionFields::default(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidField { field: "Gender", .. }));
    }

    #[test]
    fn unset_admission_fields_are_omitted_from_the_payload() {
        let empty = serde_json::to_value(NewAdmissionFields::default()).unwrap();
        assert_eq!(empty, serde_json::json!({}));

        let full = serde_json::to_value(NewAdmissionFields {
            reason: Some("follow-up".into()),
            scheduled_start: Some("2026-03-02T09:30:00.000Z".into()),
            duration_minutes: Some(15),
        })
        .unwrap();
        assert_eq!(
            full,
            serde_json::json!({
                "reason": "follow-up",
                "scheduled_start": "2026-03-02T09:30:00.000Z",
                "duration_minutes": 15,
            })
        );
    }
}
