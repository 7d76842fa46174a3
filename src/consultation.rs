//! Consultation form state machine.
//!
//! Tracks the draft of a new consultation: tab selection (existing vs. new
//! patient), field values, validation errors, and the transient attention
//! cue raised when a submission is rejected. Both tabs' fields stay in
//! memory across tab switches, so switching loses nothing.
//!
//! Validation runs only at submission time. Shared fields (reason,
//! scheduled date-time, duration) are always optional.

use std::collections::HashMap;
use std::time::Instant;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::Serialize;

use crate::config;
use crate::models::enums::str_enum;
use crate::models::{Gender, Patient};
use crate::service::{NewAdmissionFields, NewPatientFields};

str_enum!(Tab {
    ExistingPatient => "existing",
    NewPatient => "new",
});

impl Default for Tab {
    fn default() -> Self {
        Tab::ExistingPatient
    }
}

str_enum!(Field {
    SelectedPatient => "selected_patient",
    FirstName => "first_name",
    LastName => "last_name",
    Gender => "gender",
});

/// Failing fields from a validation pass, keyed by field. Only failing
/// fields carry an entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldErrors(HashMap<Field, bool>);

impl FieldErrors {
    pub fn flag(&mut self, field: Field) {
        self.0.insert(field, true);
    }

    pub fn contains(&self, field: Field) -> bool {
        self.0.get(&field).copied().unwrap_or(false)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn fields(&self) -> Vec<Field> {
        self.0.keys().copied().collect()
    }
}

// ─── Form state ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct ConsultationForm {
    tab: Tab,
    // Existing-patient tab
    search_term: String,
    selected_patient: Option<Patient>,
    // New-patient tab
    first_name: String,
    last_name: String,
    gender: Option<Gender>,
    date_of_birth: Option<NaiveDate>,
    // Shared fields
    reason: String,
    scheduled: Option<DateTime<Utc>>,
    duration_minutes: Option<u32>,
    // Surfaced after a rejected submission
    errors: FieldErrors,
    attention: Option<Instant>,
}

impl ConsultationForm {
    pub fn tab(&self) -> Tab {
        self.tab
    }

    /// Switching tabs preserves every field of both tabs.
    pub fn set_tab(&mut self, tab: Tab) {
        self.tab = tab;
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
    }

    pub fn selected_patient(&self) -> Option<&Patient> {
        self.selected_patient.as_ref()
    }

    pub fn select_patient(&mut self, patient: Patient) {
        self.selected_patient = Some(patient);
    }

    /// Returns to the search state. The previous search term stays applied.
    pub fn clear_selected_patient(&mut self) {
        self.selected_patient = None;
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn set_first_name(&mut self, value: impl Into<String>) {
        self.first_name = value.into();
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn set_last_name(&mut self, value: impl Into<String>) {
        self.last_name = value.into();
    }

    pub fn gender(&self) -> Option<Gender> {
        self.gender
    }

    pub fn set_gender(&mut self, gender: Option<Gender>) {
        self.gender = gender;
    }

    pub fn date_of_birth(&self) -> Option<NaiveDate> {
        self.date_of_birth
    }

    pub fn set_date_of_birth(&mut self, dob: Option<NaiveDate>) {
        self.date_of_birth = dob;
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn set_reason(&mut self, reason: impl Into<String>) {
        self.reason = reason.into();
    }

    pub fn scheduled(&self) -> Option<DateTime<Utc>> {
        self.scheduled
    }

    pub fn set_scheduled(&mut self, at: Option<DateTime<Utc>>) {
        self.scheduled = at;
    }

    pub fn duration_minutes(&self) -> Option<u32> {
        self.duration_minutes
    }

    pub fn set_duration(&mut self, minutes: Option<u32>) {
        self.duration_minutes = minutes;
    }

    // ─── Validation ──────────────────────────────────────────────────────────

    /// Required-field check for the active tab. Shared fields are never
    /// required.
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::default();
        match self.tab {
            Tab::ExistingPatient => {
                if self.selected_patient.is_none() {
                    errors.flag(Field::SelectedPatient);
                }
            }
            Tab::NewPatient => {
                if self.first_name.trim().is_empty() {
                    errors.flag(Field::FirstName);
                }
                if self.last_name.trim().is_empty() {
                    errors.flag(Field::LastName);
                }
                if self.gender.is_none() {
                    errors.flag(Field::Gender);
                }
            }
        }
        errors
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub(crate) fn set_errors(&mut self, errors: FieldErrors) {
        self.errors = errors;
    }

    /// Raise the attention cue for the UI to render.
    pub(crate) fn raise_attention(&mut self) {
        self.attention = Some(Instant::now());
    }

    /// Whether the attention cue is still inside its bounded window.
    pub fn attention_active(&self) -> bool {
        self.attention
            .map(|raised| raised.elapsed() < config::ATTENTION_CUE)
            .unwrap_or(false)
    }

    // ─── Payload builders ────────────────────────────────────────────────────

    /// Admission payload for either tab. Empty reason, unset date, and
    /// zero/unset duration are elided so the collaborator applies defaults.
    pub fn admission_fields(&self) -> NewAdmissionFields {
        NewAdmissionFields {
            reason: (!self.reason.is_empty()).then(|| self.reason.clone()),
            scheduled_start: self
                .scheduled
                .map(|d| d.to_rfc3339_opts(SecondsFormat::Millis, true)),
            duration_minutes: self.duration_minutes.filter(|m| *m > 0),
        }
    }

    /// Patient payload for the new-patient tab. `None` until a gender is
    /// selected; names pass through as typed.
    pub fn new_patient_fields(&self) -> Option<NewPatientFields> {
        let gender = self.gender?;
        Some(NewPatientFields {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            gender: gender.as_str().to_string(),
            date_of_birth: self
                .date_of_birth
                .map(|d| d.format(config::DOB_FORMAT).to_string()),
        })
    }
}
