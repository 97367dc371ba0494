use thiserror::Error;

/// Failures raised by the scoring engine
///
/// Every failure is detected before any ranking is returned; the engine never
/// hands back a partially scored list.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("Dataset is empty")]
    EmptyDataset,

    #[error("Unsupported campus: {0}")]
    InvalidLocation(String),

    #[error("Degenerate range for {series}: every value equals {value}")]
    DegenerateRange { series: &'static str, value: f64 },

    #[error("Invalid {name} weight {value}: weights must be positive")]
    InvalidWeight { name: &'static str, value: f64 },

    #[error("Missing {field} for {subject}")]
    MissingField { field: &'static str, subject: String },

    #[error("Room count for {subject} must be positive (bed {bed}, bath {bath})")]
    InvalidRoomCount { subject: String, bed: f64, bath: f64 },

    #[error("Non-finite value in {series}")]
    NonFiniteValue { series: &'static str },
}
