//! Submission orchestrator for the new-consultation workflow.
//!
//! `ConsultationIntake` owns the consultation draft and the patient
//! directory, drives the injected persistence collaborator, and surfaces
//! lifecycle events through an observer. Visibility follows the controlled
//! pattern: the surrounding application opens and closes the workflow and
//! is notified of every change.
//!
//! Each open starts a session with a fresh draft and a new generation
//! number. A submission captures the generation at entry; when the
//! collaborator call resolves after the workflow was dismissed, the result
//! is discarded instead of mutating a dead session. Closing never aborts an
//! in-flight call.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use serde::Serialize;

use crate::config;
use crate::consultation::{ConsultationForm, FieldErrors, Tab};
use crate::directory::PatientDirectory;
use crate::models::{Admission, Gender, Patient};
use crate::service::{CreatedConsultation, PatientDataService, ServiceError};

// ─── Observer surface ─────────────────────────────────────────────────────────

/// Callbacks surfaced to the embedding application.
///
/// `consultation_created` fires exactly once per successful submission,
/// before the visibility flips closed; `navigate` follows with the
/// patient-detail route.
pub trait IntakeObserver: Send + Sync {
    fn consultation_created(&self, _patient: &Patient, _admission: &Admission) {}

    fn open_changed(&self, _open: bool) {}

    fn navigate(&self, _route: &PatientRoute) {}
}

/// Observer that ignores every event.
pub struct NullObserver;

impl IntakeObserver for NullObserver {}

/// Patient-detail route addressed by the created records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatientRoute {
    pub patient_id: String,
    pub admission_id: String,
}

impl PatientRoute {
    pub fn path(&self) -> String {
        format!("/patients/{}?ad={}", self.patient_id, self.admission_id)
    }
}

impl fmt::Display for PatientRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

// ─── Submission outcome ───────────────────────────────────────────────────────

/// Result of one submission attempt.
#[derive(Debug)]
pub enum SubmitOutcome {
    /// Records persisted; the workflow closed and navigation was signalled.
    Created(CreatedConsultation),
    /// Required fields missing; the error set is retained on the form and
    /// the attention cue raised. No collaborator call was made.
    Invalid(FieldErrors),
    /// The collaborator rejected the creation. The draft stays editable and
    /// a generic notice is surfaced.
    Failed(ServiceError),
    /// The workflow was dismissed before the result arrived; nothing was
    /// applied.
    Discarded,
}

impl SubmitOutcome {
    pub fn is_created(&self) -> bool {
        matches!(self, SubmitOutcome::Created(_))
    }
}

// ─── Orchestrator ─────────────────────────────────────────────────────────────

#[derive(Default)]
struct IntakeState {
    open: bool,
    form: ConsultationForm,
    notice: Option<String>,
}

pub struct ConsultationIntake {
    service: Arc<dyn PatientDataService>,
    directory: PatientDirectory,
    observer: Arc<dyn IntakeObserver>,
    state: RwLock<IntakeState>,
    generation: AtomicU64,
}

impl ConsultationIntake {
    pub fn new(service: Arc<dyn PatientDataService>) -> Self {
        Self {
            directory: PatientDirectory::new(service.clone()),
            service,
            observer: Arc::new(NullObserver),
            state: RwLock::new(IntakeState::default()),
            generation: AtomicU64::new(0),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn IntakeObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn directory(&self) -> &PatientDirectory {
        &self.directory
    }

    // ─── Visibility ──────────────────────────────────────────────────────────

    /// Open the workflow: fresh draft, new session generation, directory
    /// load. A load failure is logged and leaves the directory empty; the
    /// workflow still opens.
    pub async fn open(&self) {
        {
            let Ok(mut st) = self.state.write() else { return };
            if st.open {
                return;
            }
            st.open = true;
            st.form = ConsultationForm::default();
            st.notice = None;
        }
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.observer.open_changed(true);

        if let Err(e) = self.directory.ensure_loaded().await {
            tracing::warn!("patient directory load failed: {e}");
        }
    }

    /// Close the workflow and discard the draft. An in-flight submission is
    /// not aborted; its late result will be discarded by the generation
    /// check.
    pub fn close(&self) {
        let was_open = {
            let Ok(mut st) = self.state.write() else { return };
            let was_open = st.open;
            st.open = false;
            st.form = ConsultationForm::default();
            st.notice = None;
            was_open
        };
        if was_open {
            self.observer.open_changed(false);
        }
    }

    /// Controlled-visibility entry point.
    pub async fn set_open(&self, open: bool) {
        if open {
            self.open().await;
        } else {
            self.close();
        }
    }

    pub fn is_open(&self) -> bool {
        self.state.read().map(|st| st.open).unwrap_or(false)
    }

    // ─── Draft access ────────────────────────────────────────────────────────

    fn with_form(&self, edit: impl FnOnce(&mut ConsultationForm)) {
        if let Ok(mut st) = self.state.write() {
            if !st.open {
                tracing::debug!("draft edit ignored: workflow is closed");
                return;
            }
            edit(&mut st.form);
        }
    }

    fn read_form<T>(&self, read: impl FnOnce(&ConsultationForm) -> T) -> Option<T> {
        self.state.read().ok().map(|st| read(&st.form))
    }

    pub fn tab(&self) -> Tab {
        self.read_form(|f| f.tab()).unwrap_or_default()
    }

    pub fn set_tab(&self, tab: Tab) {
        self.with_form(|f| f.set_tab(tab));
    }

    pub fn search_term(&self) -> String {
        self.read_form(|f| f.search_term().to_string())
            .unwrap_or_default()
    }

    pub fn set_search_term(&self, term: impl Into<String>) {
        let term = term.into();
        self.with_form(|f| f.set_search_term(term));
    }

    /// Directory entries matching the current search term.
    pub fn search_results(&self) -> Vec<Patient> {
        self.directory.search(&self.search_term())
    }

    pub fn selected_patient(&self) -> Option<Patient> {
        self.read_form(|f| f.selected_patient().cloned()).flatten()
    }

    pub fn select_patient(&self, patient: Patient) {
        self.with_form(|f| f.select_patient(patient));
    }

    pub fn clear_selected_patient(&self) {
        self.with_form(|f| f.clear_selected_patient());
    }

    pub fn set_first_name(&self, value: impl Into<String>) {
        let value = value.into();
        self.with_form(|f| f.set_first_name(value));
    }

    pub fn set_last_name(&self, value: impl Into<String>) {
        let value = value.into();
        self.with_form(|f| f.set_last_name(value));
    }

    pub fn set_gender(&self, gender: Option<Gender>) {
        self.with_form(|f| f.set_gender(gender));
    }

    pub fn set_date_of_birth(&self, dob: Option<chrono::NaiveDate>) {
        self.with_form(|f| f.set_date_of_birth(dob));
    }

    pub fn set_reason(&self, reason: impl Into<String>) {
        let reason = reason.into();
        self.with_form(|f| f.set_reason(reason));
    }

    pub fn set_scheduled(&self, at: Option<chrono::DateTime<chrono::Utc>>) {
        self.with_form(|f| f.set_scheduled(at));
    }

    pub fn set_duration(&self, minutes: Option<u32>) {
        self.with_form(|f| f.set_duration(minutes));
    }

    pub fn field_errors(&self) -> FieldErrors {
        self.read_form(|f| f.errors().clone()).unwrap_or_default()
    }

    pub fn attention_active(&self) -> bool {
        self.read_form(|f| f.attention_active()).unwrap_or(false)
    }

    /// Generic notice from the last rejected creation, cleared on open and
    /// close.
    pub fn failure_notice(&self) -> Option<String> {
        self.state.read().ok().and_then(|st| st.notice.clone())
    }

    // ─── Submission ──────────────────────────────────────────────────────────

    /// Validate the draft and hand it to the collaborator.
    ///
    /// Validation failures never reach the collaborator. A result arriving
    /// after the session ended is discarded.
    pub async fn submit(&self) -> SubmitOutcome {
        let token = self.generation.load(Ordering::SeqCst);

        let form = {
            let Ok(mut st) = self.state.write() else {
                return SubmitOutcome::Discarded;
            };
            if !st.open {
                return SubmitOutcome::Discarded;
            }
            let errors = st.form.validate();
            st.form.set_errors(errors.clone());
            if !errors.is_empty() {
                st.form.raise_attention();
                return SubmitOutcome::Invalid(errors);
            }
            st.form.clone()
        };

        let admission_fields = form.admission_fields();
        let result = match form.tab() {
            Tab::ExistingPatient => match form.selected_patient() {
                Some(patient) => self
                    .service
                    .create_new_admission(&patient.id, admission_fields)
                    .await
                    .map(|admission| CreatedConsultation {
                        patient: patient.clone(),
                        admission,
                    }),
                None => return SubmitOutcome::Discarded,
            },
            Tab::NewPatient => match form.new_patient_fields() {
                Some(fields) => {
                    self.service
                        .create_new_patient_with_admission(fields, admission_fields)
                        .await
                }
                None => return SubmitOutcome::Discarded,
            },
        };

        match result {
            Ok(created) => self.apply_created(token, form.tab(), created),
            Err(e) => self.apply_failure(token, e),
        }
    }

    fn session_ended(&self, token: u64) -> bool {
        self.generation.load(Ordering::SeqCst) != token || !self.is_open()
    }

    fn apply_created(
        &self,
        token: u64,
        tab: Tab,
        created: CreatedConsultation,
    ) -> SubmitOutcome {
        if self.session_ended(token) {
            tracing::debug!("consultation created after dismissal; result discarded");
            return SubmitOutcome::Discarded;
        }

        if tab == Tab::NewPatient {
            self.directory.insert(created.patient.clone());
        }

        tracing::info!(
            patient_id = %created.patient.id,
            admission_id = %created.admission.id,
            "consultation created"
        );
        self.observer
            .consultation_created(&created.patient, &created.admission);

        self.close();

        let route = PatientRoute {
            patient_id: created.patient.id.clone(),
            admission_id: created.admission.id.clone(),
        };
        self.observer.navigate(&route);

        SubmitOutcome::Created(created)
    }

    fn apply_failure(&self, token: u64, error: ServiceError) -> SubmitOutcome {
        if self.session_ended(token) {
            tracing::debug!("creation failed after dismissal: {error}");
            return SubmitOutcome::Discarded;
        }

        tracing::error!("failed to create consultation: {error}");
        if let Ok(mut st) = self.state.write() {
            st.notice = Some(config::FAILURE_NOTICE.to_string());
        }
        SubmitOutcome::Failed(error)
    }
}
