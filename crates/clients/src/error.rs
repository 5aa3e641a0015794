//! Backend failure model.

use thiserror::Error;

/// Result type returned by every backend adapter method.
pub type BackendResult<T> = Result<T, BackendError>;

/// Status code carried by a typed backend error.
///
/// This is the closed set shared by all three backends.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Code {
    Cancelled,
    Unknown,
    InvalidArgument,
    DeadlineExceeded,
    NotFound,
    AlreadyExists,
    PermissionDenied,
    ResourceExhausted,
    FailedPrecondition,
    Aborted,
    OutOfRange,
    Unimplemented,
    Internal,
    Unavailable,
    DataLoss,
    Unauthenticated,
}

impl Code {
    pub const ALL: [Code; 16] = [
        Code::Cancelled,
        Code::Unknown,
        Code::InvalidArgument,
        Code::DeadlineExceeded,
        Code::NotFound,
        Code::AlreadyExists,
        Code::PermissionDenied,
        Code::ResourceExhausted,
        Code::FailedPrecondition,
        Code::Aborted,
        Code::OutOfRange,
        Code::Unimplemented,
        Code::Internal,
        Code::Unavailable,
        Code::DataLoss,
        Code::Unauthenticated,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Code::Cancelled => "cancelled",
            Code::Unknown => "unknown",
            Code::InvalidArgument => "invalid_argument",
            Code::DeadlineExceeded => "deadline_exceeded",
            Code::NotFound => "not_found",
            Code::AlreadyExists => "already_exists",
            Code::PermissionDenied => "permission_denied",
            Code::ResourceExhausted => "resource_exhausted",
            Code::FailedPrecondition => "failed_precondition",
            Code::Aborted => "aborted",
            Code::OutOfRange => "out_of_range",
            Code::Unimplemented => "unimplemented",
            Code::Internal => "internal",
            Code::Unavailable => "unavailable",
            Code::DataLoss => "data_loss",
            Code::Unauthenticated => "unauthenticated",
        }
    }

    /// Parse a wire code. Accepts `not_found` and `NOT_FOUND`; anything
    /// unrecognised becomes [`Code::Unknown`].
    pub fn parse(s: &str) -> Code {
        let lower = s.trim().to_ascii_lowercase();
        Code::ALL
            .into_iter()
            .find(|c| c.as_str() == lower)
            .unwrap_or(Code::Unknown)
    }
}

impl core::fmt::Display for Code {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure of a backend call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// The backend answered with a typed status.
    #[error("backend status {code}: {message}")]
    Status { code: Code, message: String },

    /// The request-scoped deadline elapsed before the backend answered.
    #[error("backend deadline exceeded")]
    DeadlineExceeded,

    /// Connection-level failure (refused, reset, TLS, ...).
    #[error("backend transport error: {0}")]
    Transport(String),

    /// The backend answered but the payload could not be decoded.
    #[error("malformed backend response: {0}")]
    Decode(String),
}

impl BackendError {
    pub fn status(code: Code, message: impl Into<String>) -> Self {
        Self::Status {
            code,
            message: message.into(),
        }
    }

    /// Typed status code, if the backend supplied one.
    pub fn code(&self) -> Option<Code> {
        match self {
            BackendError::Status { code, .. } => Some(*code),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            BackendError::DeadlineExceeded
        } else if err.is_decode() {
            BackendError::Decode(err.to_string())
        } else {
            BackendError::Transport(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_both_spellings() {
        assert_eq!(Code::parse("not_found"), Code::NotFound);
        assert_eq!(Code::parse("ALREADY_EXISTS"), Code::AlreadyExists);
        assert_eq!(Code::parse(" unauthenticated "), Code::Unauthenticated);
    }

    #[test]
    fn parse_falls_back_to_unknown() {
        assert_eq!(Code::parse("teapot"), Code::Unknown);
        assert_eq!(Code::parse(""), Code::Unknown);
    }

    #[test]
    fn every_code_round_trips() {
        for c in Code::ALL {
            assert_eq!(Code::parse(c.as_str()), c);
        }
    }

    #[test]
    fn only_status_errors_carry_a_code() {
        assert_eq!(
            BackendError::status(Code::NotFound, "gone").code(),
            Some(Code::NotFound)
        );
        assert_eq!(BackendError::DeadlineExceeded.code(), None);
        assert_eq!(BackendError::Transport("refused".into()).code(), None);
    }
}
