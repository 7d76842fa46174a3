pub mod admission;
pub mod alert;
pub mod diagnosis;
pub mod enums;
pub mod lab;
pub mod patient;

pub use admission::{Admission, Treatment};
pub use alert::ComplexCaseAlert;
pub use diagnosis::Diagnosis;
pub use enums::{AlertSeverity, AlertType, Gender};
pub use lab::{LabResult, LabValue};
pub use patient::Patient;
