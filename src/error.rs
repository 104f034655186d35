//! Error types for the submission gate
use std::fmt;
use std::time::Duration;

/// Boxed store error as it crosses the middleware seam.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Unified error for callers driving an action through the gate.
///
/// A throttled attempt and a broken state store are different situations and
/// must stay distinguishable end to end: the first is the policy working as
/// intended, the second is an infrastructure failure the caller may retry or
/// report.
#[derive(Debug)]
pub enum GateError<E> {
    /// The rate limit is currently exhausted
    Throttled {
        /// Time until the current window expires.
        retry_after: Duration,
    },
    /// Reading or writing the persisted throttle state failed
    Storage(BoxError),
    /// The gated operation itself failed
    Inner(E),
}

impl<E: fmt::Display> fmt::Display for GateError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Throttled { retry_after } => {
                write!(f, "submission throttled, try again in {:?}", retry_after)
            }
            Self::Storage(e) => write!(f, "throttle state store failed: {}", e),
            Self::Inner(e) => write!(f, "{}", e),
        }
    }
}

impl<E: std::error::Error + 'static> std::error::Error for GateError<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Storage(e) => Some(e.as_ref()),
            Self::Inner(e) => Some(e),
            _ => None,
        }
    }
}

impl<E> GateError<E> {
    /// Check if this error is a throttle denial
    pub fn is_throttled(&self) -> bool {
        matches!(self, Self::Throttled { .. })
    }

    /// Check if this error came from the state store
    pub fn is_storage(&self) -> bool {
        matches!(self, Self::Storage(_))
    }

    /// Check if this error wraps an inner error.
    pub fn is_inner(&self) -> bool {
        matches!(self, Self::Inner(_))
    }

    /// Get the inner error if this is an Inner variant
    pub fn into_inner(self) -> Option<E> {
        match self {
            Self::Inner(e) => Some(e),
            _ => None,
        }
    }

    /// Borrow the inner error if present.
    pub fn as_inner(&self) -> Option<&E> {
        match self {
            Self::Inner(e) => Some(e),
            _ => None,
        }
    }

    /// Access the retry hint if this is a throttle denial.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::Throttled { retry_after } => Some(*retry_after),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;
    use std::io;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct DummyError(&'static str);
    impl fmt::Display for DummyError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}", self.0)
        }
    }
    impl std::error::Error for DummyError {}

    #[test]
    fn throttled_display_mentions_retry() {
        let err: GateError<io::Error> =
            GateError::Throttled { retry_after: Duration::from_secs(300) };
        let msg = format!("{}", err);
        assert!(msg.contains("throttled"));
        assert!(msg.contains("300"));
    }

    #[test]
    fn storage_display_names_the_store() {
        let io_err = io::Error::new(io::ErrorKind::Other, "disk gone");
        let err: GateError<DummyError> = GateError::Storage(Box::new(io_err));
        let msg = format!("{}", err);
        assert!(msg.contains("state store"));
        assert!(msg.contains("disk gone"));
    }

    #[test]
    fn predicates_cover_all_variants() {
        let throttled: GateError<DummyError> =
            GateError::Throttled { retry_after: Duration::from_secs(1) };
        assert!(throttled.is_throttled());
        assert!(!throttled.is_storage());
        assert_eq!(throttled.retry_after(), Some(Duration::from_secs(1)));

        let storage: GateError<DummyError> =
            GateError::Storage(Box::new(DummyError("down")));
        assert!(storage.is_storage());
        assert!(storage.retry_after().is_none());

        let inner = GateError::Inner(DummyError("x"));
        assert!(inner.is_inner());
        assert_eq!(inner.as_inner().unwrap().0, "x");
        assert_eq!(inner.into_inner().unwrap().0, "x");
    }

    #[test]
    fn source_is_none_for_throttled() {
        let err: GateError<DummyError> =
            GateError::Throttled { retry_after: Duration::from_secs(1) };
        assert!(err.source().is_none());

        let inner = GateError::Inner(DummyError("x"));
        assert!(inner.source().is_some());
    }
}
