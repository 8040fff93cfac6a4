//! Failure values delivered to dispatch callbacks.

use std::any::Any;

/// Result of one dispatched call: a value or a failure, never both.
pub type Outcome<T> = Result<T, DispatchError>;

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("transport error: {0}")]
    Transport(#[from] ureq::Error),

    #[error("action panicked: {0}")]
    Panicked(String),

    #[error("{0}")]
    Failed(Box<dyn std::error::Error + Send + Sync>),

    #[error("failed to spawn dispatch thread: {0}")]
    Spawn(std::io::Error),
}

impl DispatchError {
    /// Wrap an arbitrary error reported by an action.
    pub fn failed(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Failed(err.into())
    }

    /// Normalize a caught panic payload.
    ///
    /// Error-shaped payloads are delivered as they are; string payloads become
    /// [`DispatchError::Panicked`] with the message verbatim.
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let payload = match payload.downcast::<DispatchError>() {
            Ok(err) => return *err,
            Err(payload) => payload,
        };
        let payload = match payload.downcast::<ureq::Error>() {
            Ok(err) => return Self::Transport(*err),
            Err(payload) => payload,
        };
        let payload = match payload.downcast::<Box<dyn std::error::Error + Send + Sync>>() {
            Ok(err) => return Self::Failed(*err),
            Err(payload) => payload,
        };
        let payload = match payload.downcast::<std::io::Error>() {
            Ok(err) => return Self::Failed(err),
            Err(payload) => payload,
        };

        Self::Panicked(panic_message(payload.as_ref()).to_string())
    }

    pub fn is_panic(&self) -> bool {
        matches!(self, Self::Panicked(_))
    }
}

/// Best-effort text of a panic payload, for logging.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic payload"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{AssertUnwindSafe, catch_unwind, panic_any};

    fn caught(f: impl FnOnce()) -> Box<dyn Any + Send> {
        catch_unwind(AssertUnwindSafe(f)).unwrap_err()
    }

    #[test]
    fn str_payload_becomes_panicked() {
        let err = DispatchError::from_panic(caught(|| panic!("boom")));
        assert!(err.is_panic());
        insta::assert_snapshot!(err.to_string(), @"action panicked: boom");
    }

    #[test]
    fn formatted_payload_becomes_panicked() {
        let code = 7;
        let err = DispatchError::from_panic(caught(|| panic!("bad code {code}")));
        insta::assert_snapshot!(err.to_string(), @"action panicked: bad code 7");
    }

    #[test]
    fn opaque_payload_is_described_generically() {
        let err = DispatchError::from_panic(caught(|| panic_any(42_u32)));
        insta::assert_snapshot!(err.to_string(), @"action panicked: unknown panic payload");
    }

    #[test]
    fn dispatch_error_payload_is_kept_as_is() {
        let err = DispatchError::from_panic(caught(|| {
            panic_any(DispatchError::Panicked("inner".to_string()))
        }));
        insta::assert_snapshot!(err.to_string(), @"action panicked: inner");
    }

    #[test]
    fn io_error_payload_is_kept_as_is() {
        let err = DispatchError::from_panic(caught(|| {
            panic_any(std::io::Error::other("disk on fire"))
        }));
        assert!(!err.is_panic());
        insta::assert_snapshot!(err.to_string(), @"disk on fire");
    }

    #[test]
    fn boxed_error_payload_is_kept_as_is() {
        let boxed: Box<dyn std::error::Error + Send + Sync> = "custom failure".into();
        let err = DispatchError::from_panic(caught(move || panic_any(boxed)));
        assert!(matches!(err, DispatchError::Failed(_)));
        insta::assert_snapshot!(err.to_string(), @"custom failure");
    }

    #[test]
    fn failed_display() {
        let err = DispatchError::failed("upstream said no");
        insta::assert_snapshot!(err.to_string(), @"upstream said no");

        let err = DispatchError::Spawn(std::io::Error::new(
            std::io::ErrorKind::WouldBlock,
            "too many threads",
        ));
        insta::assert_snapshot!(err.to_string(), @"failed to spawn dispatch thread: too many threads");
    }
}
