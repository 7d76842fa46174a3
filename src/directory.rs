//! Patient directory cache.
//!
//! In-memory snapshot of the known patients, loaded lazily through the
//! persistence collaborator at most once per workflow session. Search is a
//! case-insensitive substring match; a freshly created patient is appended
//! so in-session search reflects it without a refetch.

use std::sync::{Arc, RwLock};

use crate::models::Patient;
use crate::service::{PatientDataService, ServiceError};

pub struct PatientDirectory {
    service: Arc<dyn PatientDataService>,
    patients: RwLock<Vec<Patient>>,
    /// Single-flight gate: concurrent loads await the one in progress
    /// instead of re-triggering it.
    load_gate: tokio::sync::Mutex<()>,
}

impl PatientDirectory {
    pub fn new(service: Arc<dyn PatientDataService>) -> Self {
        Self {
            service,
            patients: RwLock::new(Vec::new()),
            load_gate: tokio::sync::Mutex::new(()),
        }
    }

    /// Load the directory if it is empty. The gate is emptiness, not
    /// freshness: a populated directory is never refetched here.
    pub async fn ensure_loaded(&self) -> Result<(), ServiceError> {
        if !self.is_empty() {
            return Ok(());
        }

        let _gate = self.load_gate.lock().await;
        if !self.is_empty() {
            // A concurrent caller finished the load while we waited.
            return Ok(());
        }

        self.service.load_patient_data().await?;
        let all = self.service.get_all_patients();
        tracing::debug!(count = all.len(), "patient directory loaded");
        if let Ok(mut patients) = self.patients.write() {
            *patients = all;
        }
        Ok(())
    }

    /// Case-insensitive substring search over name, first name, last name,
    /// and id. An empty term returns the full directory in insertion order.
    pub fn search(&self, term: &str) -> Vec<Patient> {
        let Ok(patients) = self.patients.read() else {
            return Vec::new();
        };
        if term.is_empty() {
            return patients.clone();
        }
        let needle = term.to_lowercase();
        patients
            .iter()
            .filter(|p| {
                p.name
                    .as_deref()
                    .is_some_and(|n| n.to_lowercase().contains(&needle))
                    || p.first_name.to_lowercase().contains(&needle)
                    || p.last_name.to_lowercase().contains(&needle)
                    || p.id.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect()
    }

    /// Append a freshly created patient. Ids are unique across the
    /// directory; a duplicate insert is dropped with a warning.
    pub fn insert(&self, patient: Patient) {
        if let Ok(mut patients) = self.patients.write() {
            if patients.iter().any(|p| p.id == patient.id) {
                tracing::warn!(id = %patient.id, "duplicate patient insert ignored");
                return;
            }
            patients.push(patient);
        }
    }

    /// Clear the directory so the next `ensure_loaded` refetches.
    pub fn invalidate(&self) {
        if let Ok(mut patients) = self.patients.write() {
            patients.clear();
        }
    }

    /// Full directory in insertion order.
    pub fn snapshot(&self) -> Vec<Patient> {
        self.patients
            .read()
            .map(|p| p.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.patients.read().map(|p| p.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::service::{CreatedConsultation, NewAdmissionFields, NewPatientFields};

    /// Counts loads so the single-flight property is observable.
    struct CountingService {
        patients: Vec<Patient>,
        loads: AtomicUsize,
        loaded: RwLock<bool>,
    }

    impl CountingService {
        fn new(patients: Vec<Patient>) -> Self {
            Self {
                patients,
                loads: AtomicUsize::new(0),
                loaded: RwLock::new(false),
            }
        }
    }

    #[async_trait]
    impl PatientDataService for CountingService {
        async fn load_patient_data(&self) -> Result<(), ServiceError> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            tokio::task::yield_now().await;
            *self.loaded.write().unwrap() = true;
            Ok(())
        }

        fn get_all_patients(&self) -> Vec<Patient> {
            if *self.loaded.read().unwrap() {
                self.patients.clone()
            } else {
                Vec::new()
            }
        }

        async fn create_new_admission(
            &self,
            _patient_id: &str,
            _fields: NewAdmissionFields,
        ) -> Result<crate::models::Admission, ServiceError> {
            unimplemented!("not exercised by directory tests")
        }

        async fn create_new_patient_with_admission(
            &self,
            _patient: NewPatientFields,
            _admission: NewAdmissionFields,
        ) -> Result<CreatedConsultation, ServiceError> {
            unimplemented!("not exercised by directory tests")
        }
    }

    fn people() -> Vec<Patient> {
        let mut maria = Patient::new("p-100", "Maria", "Santos");
        maria.name = Some("Maria Santos".into());
        vec![
            maria,
            Patient::new("p-200", "John", "Smith"),
            Patient::new("p-300", "Johanna", "Doe"),
        ]
    }

    fn directory() -> (Arc<CountingService>, PatientDirectory) {
        let service = Arc::new(CountingService::new(people()));
        let dir = PatientDirectory::new(service.clone());
        (service, dir)
    }

    #[tokio::test]
    async fn ensure_loaded_populates_once() {
        let (service, dir) = directory();

        dir.ensure_loaded().await.unwrap();
        dir.ensure_loaded().await.unwrap();

        assert_eq!(dir.len(), 3);
        assert_eq!(service.loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn concurrent_loads_are_single_flight() {
        let (service, dir) = directory();
        let dir = Arc::new(dir);

        let mut handles = Vec::new();
        for _ in 0..8 {
            let dir = dir.clone();
            handles.push(tokio::spawn(async move { dir.ensure_loaded().await }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(service.loads.load(Ordering::SeqCst), 1);
        assert_eq!(dir.len(), 3);
    }

    #[tokio::test]
    async fn empty_term_returns_full_directory_in_order() {
        let (_, dir) = directory();
        dir.ensure_loaded().await.unwrap();

        let all = dir.search("");
        let ids: Vec<&str> = all.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["p-100", "p-200", "p-300"]);

        let snapshot: Vec<String> = dir.snapshot().into_iter().map(|p| p.id).collect();
        assert_eq!(snapshot, ids);
    }

    #[tokio::test]
    async fn search_matches_all_name_fields_and_id() {
        let (_, dir) = directory();
        dir.ensure_loaded().await.unwrap();

        // last name, case-insensitive
        let by_last = dir.search("SANTOS");
        assert_eq!(by_last.len(), 1);
        assert_eq!(by_last[0].id, "p-100");

        // substring of first name matches both John and Johanna
        let by_first = dir.search("joh");
        assert_eq!(by_first.len(), 2);

        // id fragment
        let by_id = dir.search("p-300");
        assert_eq!(by_id.len(), 1);
        assert_eq!(by_id[0].first_name, "Johanna");

        assert!(dir.search("zzz").is_empty());
    }

    #[tokio::test]
    async fn insert_appends_and_deduplicates() {
        let (_, dir) = directory();
        dir.ensure_loaded().await.unwrap();

        dir.insert(Patient::new("p-400", "Jane", "Doe"));
        assert_eq!(dir.len(), 4);
        assert_eq!(dir.search("jane").len(), 1);

        dir.insert(Patient::new("p-400", "Jane", "Doe"));
        assert_eq!(dir.len(), 4);
    }

    #[tokio::test]
    async fn invalidate_forces_a_refetch() {
        let (service, dir) = directory();
        dir.ensure_loaded().await.unwrap();

        dir.invalidate();
        assert!(dir.is_empty());

        dir.ensure_loaded().await.unwrap();
        assert_eq!(dir.len(), 3);
        assert_eq!(service.loads.load(Ordering::SeqCst), 2);
    }
}
