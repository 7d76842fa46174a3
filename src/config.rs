use std::time::Duration;

/// Application-level constants
pub const APP_NAME: &str = "Foresight";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default tracing filter when `RUST_LOG` is unset.
pub fn default_log_filter() -> String {
    "foresight_lib=info".to_string()
}

/// How long the attention cue stays active after a rejected submission.
/// The UI renders it as a shake effect.
pub const ATTENTION_CUE: Duration = Duration::from_millis(600);

/// Consultation duration choices offered by the form, in minutes.
/// 5-minute steps from 5 up to 120.
pub fn duration_choices() -> Vec<u32> {
    (1..=24).map(|i| i * 5).collect()
}

/// Visit length applied by the reference collaborator when the form
/// leaves duration unset.
pub const DEFAULT_VISIT_MINUTES: u32 = 30;

/// Wire format for date of birth in creation payloads.
pub const DOB_FORMAT: &str = "%Y-%m-%d";

/// Generic notice surfaced when the persistence collaborator rejects a
/// creation. Field-level detail goes to the log, not the user.
pub const FAILURE_NOTICE: &str = "Could not start consultation.";
