use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("Invalid input: {field} - {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Computation failed: {0}")]
    Computation(String),
}

impl ScheduleError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        ScheduleError::InvalidInput {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn overflow(context: &str) -> Self {
        ScheduleError::Computation(format!("decimal overflow in {context}"))
    }

    /// HTTP-style status code reported at the request boundary.
    pub fn status(&self) -> u16 {
        match self {
            ScheduleError::InvalidInput { .. } => 400,
            ScheduleError::Computation(_) => 500,
        }
    }
}
