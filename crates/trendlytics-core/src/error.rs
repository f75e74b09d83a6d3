use chrono::NaiveDate;
use thiserror::Error;

/// Planning errors. Everything else the planner accepts and normalises.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("end_date {end} is before start_date {start}")]
    InvertedRange { start: NaiveDate, end: NaiveDate },
}

/// Errors surfaced by the trend operations in [`crate::analytics`].
#[derive(Debug, Error)]
pub enum TrendError {
    #[error(transparent)]
    Plan(#[from] CoreError),

    /// The storage collaborator failed. Details stay server-side.
    #[error("store error: {0}")]
    Store(anyhow::Error),
}
