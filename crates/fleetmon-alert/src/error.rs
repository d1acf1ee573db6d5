/// Errors surfaced by the alert engine.
///
/// Every failure here is a validation failure, recoverable by the caller
/// correcting its input; nothing in this crate panics on malformed input.
/// Transitions requested from a terminal state are deliberately *not*
/// errors — they are silent no-ops so the sweep stays idempotent.
///
/// # Examples
///
/// ```rust
/// use fleetmon_alert::error::AlertError;
///
/// let err = AlertError::InvalidInput("unknown severity: fatal".to_string());
/// assert!(err.to_string().contains("fatal"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum AlertError {
    /// An unrecognized source type or severity was supplied at the
    /// boundary. Never silently coerced.
    #[error("alert: invalid input: {0}")]
    InvalidInput(String),

    /// An operation referenced an alert id that does not exist.
    #[error("alert: alert '{0}' not found")]
    NotFound(String),
}

/// Convenience `Result` alias for engine operations.
pub type Result<T> = std::result::Result<T, AlertError>;
