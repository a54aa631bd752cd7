//! Error types for vigil.
//!
//! Vetoed transitions are not errors. A denied preview is reported through
//! [`TransitionOutcome::Vetoed`](crate::TransitionOutcome::Vetoed) and the
//! state-listener `*_vetoed` callbacks, never through this module.

use std::thread::ThreadId;

/// Listener state was touched from a thread other than the dispatch thread.
///
/// This is a programmer error. Registries panic with this error's message
/// via [`DispatchGuard::assert_access`](crate::DispatchGuard::assert_access);
/// [`DispatchGuard::check_access`](crate::DispatchGuard::check_access) hands
/// it back instead so the caller can post to the dispatch queue.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(
    "listener state accessed from thread \"{actual_name}\" ({actual:?}); \
     it is confined to the dispatch thread ({expected:?})"
)]
pub struct WrongThreadError {
    /// The thread the state is confined to.
    pub expected: ThreadId,
    /// The thread that attempted the access.
    pub actual: ThreadId,
    /// Name of the offending thread, or `<unnamed>`.
    pub actual_name: String,
}

impl WrongThreadError {
    /// Build an error describing an access from the current thread.
    pub fn from_current(expected: ThreadId) -> Self {
        let current = std::thread::current();
        Self {
            expected,
            actual: current.id(),
            actual_name: current.name().unwrap_or("<unnamed>").to_string(),
        }
    }
}

/// The main error type for vigil operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VigilError {
    /// State was accessed off the dispatch thread.
    #[error(transparent)]
    WrongThread(#[from] WrongThreadError),

    /// A setter was given an argument it cannot accept.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The operation is not valid in the host's current state.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// The host was constructed with a capability that forbids this change.
    #[error("Unsupported configuration: {0}")]
    UnsupportedConfiguration(String),

    /// The dispatch queue that would run a posted callback has been dropped.
    #[error("Dispatch queue has been dropped")]
    QueueClosed,
}

impl VigilError {
    /// Create an invalid-argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Create an invalid-state error.
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState(message.into())
    }

    /// Create an unsupported-configuration error.
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::UnsupportedConfiguration(message.into())
    }
}

/// A specialized Result type for vigil operations.
pub type Result<T> = std::result::Result<T, VigilError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrong_thread_message_names_both_threads() {
        let expected = std::thread::current().id();
        let err = std::thread::Builder::new()
            .name("worker-7".into())
            .spawn(move || WrongThreadError::from_current(expected))
            .unwrap()
            .join()
            .unwrap();

        assert_eq!(err.expected, expected);
        assert_ne!(err.actual, expected);
        assert_eq!(err.actual_name, "worker-7");
        let message = err.to_string();
        assert!(message.contains("worker-7"));
        assert!(message.contains("dispatch thread"));
    }

    #[test]
    fn test_wrong_thread_converts_into_vigil_error() {
        let err = WrongThreadError::from_current(std::thread::current().id());
        let wrapped: VigilError = err.clone().into();
        assert_eq!(wrapped, VigilError::WrongThread(err.clone()));
        assert_eq!(wrapped.to_string(), err.to_string());
    }

    #[test]
    fn test_constructors() {
        assert_eq!(
            VigilError::invalid_argument("index 4 out of range").to_string(),
            "Invalid argument: index 4 out of range"
        );
        assert_eq!(
            VigilError::unsupported("checkboxes are always toggle buttons").to_string(),
            "Unsupported configuration: checkboxes are always toggle buttons"
        );
        assert!(matches!(VigilError::invalid_state("x"), VigilError::InvalidState(_)));
    }
}
