//! Error types for the SCA authorisation module.
//!
//! [`ScaError`] is what callers of [`crate::ScaAuthorisationClient`] see.
//! [`BackendError`] and [`StoreError`] are reported by the collaborators the
//! core is wired with.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{AuthorisationId, ScaStatus};

/// Machine-actionable error code returned to the TPP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    FormatError,
    PsuCredentialsInvalid,
    ScaMethodUnknown,
    ScaInvalid,
    StatusInvalid,
    ResourceUnknown,
    Conflict,
    ServiceUnavailable,
    InternalServerError,
}

/// Errors that can be returned by the `ScaAuthorisationClient`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ScaError {
    /// The bank system is unreachable or failed internally. Safe to retry.
    #[error("technical error: {message}")]
    Technical { message: String },

    /// PSU id or password rejected. The authorisation is `FAILED` when the
    /// bank rejected the credentials; a PSU id that does not match the one
    /// bound to the authorisation leaves its status unchanged.
    #[error("PSU credentials invalid")]
    PsuCredentialsInvalid,

    /// The request or a backend result is malformed.
    #[error("format error: {message}")]
    Format { message: String },

    #[error("SCA method '{method_id}' is not offered for this authorisation")]
    ScaMethodUnknown { method_id: String },

    /// The authentication code was rejected.
    #[error("SCA authentication data invalid (attempts exhausted: {attempts_exhausted})")]
    ScaInvalid { attempts_exhausted: bool },

    /// The authorisation is in a status that does not accept this request.
    #[error("authorisation in status '{status}' does not accept this update")]
    StatusInvalid { status: ScaStatus },

    #[error("resource unknown: {message}")]
    ResourceUnknown { message: String },

    /// Another request updated the same authorisation first.
    #[error("authorisation {authorisation_id} was updated concurrently")]
    Conflict { authorisation_id: AuthorisationId },

    /// A defect in configuration or wiring. Details are logged, not exposed.
    #[error("internal error")]
    Internal,
}

impl ScaError {
    #[must_use]
    pub fn technical(message: impl Into<String>) -> Self {
        Self::Technical {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn format(message: impl Into<String>) -> Self {
        Self::Format {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn resource_unknown(message: impl Into<String>) -> Self {
        Self::ResourceUnknown {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Technical { .. } => ErrorCode::ServiceUnavailable,
            Self::PsuCredentialsInvalid => ErrorCode::PsuCredentialsInvalid,
            Self::Format { .. } => ErrorCode::FormatError,
            Self::ScaMethodUnknown { .. } => ErrorCode::ScaMethodUnknown,
            Self::ScaInvalid { .. } => ErrorCode::ScaInvalid,
            Self::StatusInvalid { .. } => ErrorCode::StatusInvalid,
            Self::ResourceUnknown { .. } => ErrorCode::ResourceUnknown,
            Self::Conflict { .. } => ErrorCode::Conflict,
            Self::Internal => ErrorCode::InternalServerError,
        }
    }

    /// Whether repeating the same call may succeed without any change on the
    /// caller's side (or, for `SCA_INVALID`, with a fresh code).
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Technical { .. } | Self::Conflict { .. } => true,
            Self::ScaInvalid { attempts_exhausted } => !attempts_exhausted,
            Self::PsuCredentialsInvalid
            | Self::Format { .. }
            | Self::ScaMethodUnknown { .. }
            | Self::StatusInvalid { .. }
            | Self::ResourceUnknown { .. }
            | Self::Internal => false,
        }
    }
}

/// Errors reported by an `AuthenticationBackend` or `BusinessObjectProvider`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BackendError {
    #[error("backend technical error: {0}")]
    Technical(String),

    #[error("PSU credentials invalid")]
    PsuCredentialsInvalid,

    #[error("SCA authentication data invalid (attempts exhausted: {attempts_exhausted})")]
    ScaInvalid { attempts_exhausted: bool },

    #[error("backend format error: {0}")]
    Format(String),

    #[error("backend resource unknown: {0}")]
    NotFound(String),
}

impl From<BackendError> for ScaError {
    fn from(e: BackendError) -> Self {
        match e {
            BackendError::Technical(message) => Self::Technical { message },
            BackendError::PsuCredentialsInvalid => Self::PsuCredentialsInvalid,
            BackendError::ScaInvalid { attempts_exhausted } => {
                Self::ScaInvalid { attempts_exhausted }
            }
            BackendError::Format(message) => Self::Format { message },
            BackendError::NotFound(message) => Self::ResourceUnknown { message },
        }
    }
}

/// Errors reported by an `AuthorisationStore`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("authorisation {0} not found")]
    NotFound(AuthorisationId),

    /// The stored status moved on since it was read.
    #[error("authorisation {id} expected in status '{expected}' but found '{actual}'")]
    Conflict {
        id: AuthorisationId,
        expected: ScaStatus,
        actual: ScaStatus,
    },

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn credentials_invalid_is_not_a_technical_error() {
        let e = ScaError::from(BackendError::PsuCredentialsInvalid);
        assert_eq!(e.code(), ErrorCode::PsuCredentialsInvalid);
        assert!(!e.is_retryable());
    }

    #[test]
    fn technical_errors_are_retryable() {
        let e = ScaError::from(BackendError::Technical("core banking down".to_owned()));
        assert_eq!(e.code(), ErrorCode::ServiceUnavailable);
        assert!(e.is_retryable());
    }

    #[test]
    fn exhausted_sca_attempts_are_final() {
        assert!(ScaError::ScaInvalid {
            attempts_exhausted: false
        }
        .is_retryable());
        assert!(!ScaError::ScaInvalid {
            attempts_exhausted: true
        }
        .is_retryable());
    }

    #[test]
    fn format_errors_are_not_retryable() {
        let e = ScaError::format("empty authentication code");
        assert_eq!(e.code(), ErrorCode::FormatError);
        assert!(!e.is_retryable());
    }
}
