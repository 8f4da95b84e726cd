use thiserror::Error;

/// Errors that can occur in the invoicing core.
///
/// Validation findings are not errors; validators return report values
/// (see [`super::validation`]) so callers can display them field by field.
/// This enum covers the cases where an operation cannot proceed at all.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BillingError {
    /// A record failed validation while being built or persisted.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Invoice number sequencing error.
    #[error("numbering error: {0}")]
    Numbering(String),

    /// The counter's backing store failed.
    #[error("counter store error: {0}")]
    CounterStore(String),
}
