pub mod alert;
pub mod patient;

pub use alert::{AlertCounts, AlertSets};
pub use patient::PatientRecord;
