use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Errors that can occur during capture session operations.
///
/// Every variant maps onto one of the four [`AudioResult`] codes exposed by
/// the handle API.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AudioError {
    /// A required argument was missing or malformed.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The operation is not valid in the current lifecycle state.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// The native audio subsystem reported a failure.
    #[error("{operation} failed: {message}")]
    Platform {
        operation: &'static str,
        message: String,
    },

    /// The capture scratch buffer could not be allocated.
    #[error("failed to allocate {bytes}-byte capture buffer")]
    Allocation { bytes: usize },
}

impl AudioError {
    /// Build a platform error for a named native call.
    pub fn platform(operation: &'static str, cause: impl fmt::Display) -> Self {
        Self::Platform {
            operation,
            message: cause.to_string(),
        }
    }

    /// Result code reported through the handle API.
    pub fn code(&self) -> AudioResult {
        match self {
            Self::InvalidArgument(_) => AudioResult::InvalidArg,
            Self::InvalidState(_) => AudioResult::InvalidState,
            Self::Platform { .. } | Self::Allocation { .. } => AudioResult::Error,
        }
    }
}

/// Flat result codes returned by the handle API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AudioResult {
    Ok,
    InvalidArg,
    InvalidState,
    Error,
}

impl AudioResult {
    pub fn is_ok(self) -> bool {
        self == Self::Ok
    }
}

impl<T> From<Result<T, AudioError>> for AudioResult {
    fn from(result: Result<T, AudioError>) -> Self {
        match result {
            Ok(_) => Self::Ok,
            Err(e) => e.code(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_follow_taxonomy() {
        assert_eq!(AudioError::InvalidArgument("x".into()).code(), AudioResult::InvalidArg);
        assert_eq!(AudioError::InvalidState("x".into()).code(), AudioResult::InvalidState);
        assert_eq!(AudioError::platform("Start", "E_FAIL").code(), AudioResult::Error);
        assert_eq!(AudioError::Allocation { bytes: 0 }.code(), AudioResult::Error);
    }

    #[test]
    fn platform_message_names_operation() {
        let err = AudioError::platform("GetNextPacketSize", "device invalidated");
        assert_eq!(err.to_string(), "GetNextPacketSize failed: device invalidated");
    }

    #[test]
    fn result_conversion() {
        assert_eq!(AudioResult::from(Ok::<(), AudioError>(())), AudioResult::Ok);
        let failed: Result<(), AudioError> = Err(AudioError::InvalidState("running".into()));
        assert_eq!(AudioResult::from(failed), AudioResult::InvalidState);
    }
}
