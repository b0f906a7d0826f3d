use crate::types::DayBlock;
use thiserror::Error;

/// Errors surfaced by an [`crate::backend::AppointmentBackend`]. The HTTP
/// layer maps these onto status codes (409 / 404 / 400 / 500).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Validation(String),
    #[error("Storage error: {0}")]
    Storage(String),
}

impl StoreError {
    pub fn blocked_day(block: &DayBlock) -> Self {
        let reason = block.reason.as_deref().unwrap_or("—");
        Self::Conflict(format!("Day {} is blocked. Reason: {reason}", block.date))
    }
}
