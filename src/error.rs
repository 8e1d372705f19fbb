use thiserror::Error;
use tracing::{error, warn};

/// Error severity for status display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,    // transient feedback, nothing went wrong
    Warning, // recoverable, operation aborted
    Error,   // operation failed
}

/// Domain errors for bench bookkeeping and teleports.
///
/// None of these are fatal: every failure is handled by the component that
/// produced it and surfaced to the player as a transient notice.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BenchError {
    #[error("Could not resolve {what} '{name}'")]
    LookupFailure { what: &'static str, name: String },

    #[error("Timed out waiting for {stage} after {waited_ms}ms")]
    Timeout { stage: &'static str, waited_ms: u64 },

    #[error("Rejected: {0}")]
    Rejected(String),

    #[error("Persisted data anomaly: {0}")]
    PersistenceAnomaly(String),

    #[error("A teleport is already in progress")]
    Busy,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Persistence failed: {0}")]
    Persistence(String),
}

impl BenchError {
    pub fn lookup(what: &'static str, name: impl Into<String>) -> Self {
        Self::LookupFailure {
            what,
            name: name.into(),
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::LookupFailure { .. } => ErrorSeverity::Warning,
            Self::Timeout { .. } => ErrorSeverity::Warning,
            Self::Rejected(_) => ErrorSeverity::Info,
            Self::PersistenceAnomaly(_) => ErrorSeverity::Info,
            Self::Busy => ErrorSeverity::Info,
            Self::Config(_) => ErrorSeverity::Warning,
            Self::Persistence(_) => ErrorSeverity::Error,
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            Self::LookupFailure { what, .. } => format!("Teleport failed: {} not found", what),
            Self::Timeout { stage, .. } => format!("Teleport timed out ({})", stage),
            Self::Rejected(reason) => reason.clone(),
            Self::PersistenceAnomaly(_) => "Bench list was repaired".to_string(),
            Self::Busy => "Teleport already in progress".to_string(),
            Self::Config(msg) => format!("Configuration issue: {}", msg),
            Self::Persistence(msg) => format!("Could not save benches: {}", msg),
        }
    }
}

pub type Result<T> = std::result::Result<T, BenchError>;

/// Extension trait for silent error logging with caller location tracking.
/// Use when the operation is recoverable and the player doesn't need to know.
///
/// # Examples
///
/// ```ignore
/// use bench_teleport::error::ResultExt;
///
/// // Keep ticking if the autosave hook fails
/// host.request_autosave().warn_on_err();
/// ```
pub trait ResultExt<T> {
    /// Log error with caller location and return None. Use for recoverable failures.
    fn log_err(self) -> Option<T>;
    /// Log as warning with caller location and return None. Use for expected failures.
    fn warn_on_err(self) -> Option<T>;
}

impl<T, E: std::fmt::Debug> ResultExt<T> for std::result::Result<T, E> {
    #[track_caller]
    fn log_err(self) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(error) => {
                let caller = std::panic::Location::caller();
                error!(
                    error = ?error,
                    file = caller.file(),
                    line = caller.line(),
                    "Operation failed"
                );
                None
            }
        }
    }

    #[track_caller]
    fn warn_on_err(self) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(error) => {
                let caller = std::panic::Location::caller();
                warn!(
                    error = ?error,
                    file = caller.file(),
                    line = caller.line(),
                    "Operation had warning"
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_mapping() {
        assert_eq!(
            BenchError::Rejected("favorite".into()).severity(),
            ErrorSeverity::Info
        );
        assert_eq!(
            BenchError::Timeout {
                stage: "scene load",
                waited_ms: 15_000
            }
            .severity(),
            ErrorSeverity::Warning
        );
        assert_eq!(
            BenchError::Persistence("disk full".into()).severity(),
            ErrorSeverity::Error
        );
    }

    #[test]
    fn test_user_message_hides_internal_names() {
        let err = BenchError::lookup("marker", "RestBench (3)");
        assert_eq!(err.user_message(), "Teleport failed: marker not found");
        assert!(err.to_string().contains("RestBench (3)"));
    }

    #[test]
    fn test_result_ext_converts_to_option() {
        let ok: std::result::Result<u32, BenchError> = Ok(3);
        assert_eq!(ok.log_err(), Some(3));
        let err: std::result::Result<u32, BenchError> = Err(BenchError::Busy);
        assert_eq!(err.warn_on_err(), None);
    }
}
