//! Error types for the version subsystem.
//!
//! Two tiers reach callers:
//! - [`VersionError::InvalidArgument`], raised before any remote call
//! - [`VersionError::Repository`], any failure of a remote step
//!
//! Collaborators report [`TransportError`]s. Those only become
//! [`RepositoryError`]s by passing through an [`ErrorTranslator`].

use std::fmt;

use thiserror::Error;

/// Result type alias for version operations.
pub type VersionResult<T> = Result<T, VersionError>;

/// Errors surfaced by version operations.
#[derive(Debug, Error)]
pub enum VersionError {
    /// A required handle or attribute was missing. Never retried.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A remote step failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl VersionError {
    pub(crate) fn missing(what: &str) -> Self {
        Self::InvalidArgument(format!("{what} must not be empty"))
    }

    /// Remote error category, if this is a repository failure.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::InvalidArgument(_) => None,
            Self::Repository(e) => Some(e.kind),
        }
    }
}

/// Failures reported by the repository handle and its collaborators.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Object (or repository) does not exist.
    #[error("object not found: {0}")]
    ObjectNotFound(String),

    /// Version series already has a private working copy.
    #[error("version series {0} is already checked out")]
    AlreadyCheckedOut(String),

    /// Server rejected the operation for the object's current state.
    #[error("constraint violation: {0}")]
    Constraint(String),

    /// Caller may not perform the operation.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// Transport failed to reach the repository.
    #[error("connection error: {0}")]
    Connection(String),

    /// Server answered with data the client cannot use.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// Upload content could not be read.
    #[error("content stream error: {0}")]
    Content(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Category of a repository failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    PermissionDenied,
    Unavailable,
    InvalidResponse,
    Content,
}

impl ErrorKind {
    /// Stable error code string for this kind.
    pub fn code(self) -> &'static str {
        match self {
            Self::NotFound => "NOT_FOUND",
            Self::Conflict => "CONFLICT",
            Self::PermissionDenied => "PERMISSION_DENIED",
            Self::Unavailable => "UNAVAILABLE",
            Self::InvalidResponse => "INVALID_RESPONSE",
            Self::Content => "CONTENT_ERROR",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A remote step failed.
///
/// Every remote failure has this shape regardless of which call produced
/// it; the underlying transport error is kept as the source.
#[derive(Debug, Error)]
#[error("{operation} failed ({kind}): {source}")]
pub struct RepositoryError {
    /// Remote operation that failed, e.g. `"checkIn"`.
    pub operation: &'static str,
    pub kind: ErrorKind,
    #[source]
    pub source: TransportError,
}

impl RepositoryError {
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }
}

/// Single point where transport failures become domain errors.
pub trait ErrorTranslator: Send + Sync {
    fn translate(&self, operation: &'static str, cause: TransportError) -> RepositoryError;
}

/// Maps each transport variant to a fixed [`ErrorKind`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultErrorTranslator;

impl ErrorTranslator for DefaultErrorTranslator {
    fn translate(&self, operation: &'static str, cause: TransportError) -> RepositoryError {
        let kind = match &cause {
            TransportError::ObjectNotFound(_) => ErrorKind::NotFound,
            TransportError::AlreadyCheckedOut(_) | TransportError::Constraint(_) => {
                ErrorKind::Conflict
            }
            TransportError::PermissionDenied(_) => ErrorKind::PermissionDenied,
            TransportError::Connection(_) => ErrorKind::Unavailable,
            TransportError::Malformed(_) | TransportError::Serialization(_) => {
                ErrorKind::InvalidResponse
            }
            TransportError::Content(_) => ErrorKind::Content,
        };
        RepositoryError {
            operation,
            kind,
            source: cause,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translator_maps_kinds() {
        let t = DefaultErrorTranslator;
        let cases = [
            (TransportError::ObjectNotFound("x".into()), ErrorKind::NotFound),
            (TransportError::AlreadyCheckedOut("s".into()), ErrorKind::Conflict),
            (TransportError::Constraint("c".into()), ErrorKind::Conflict),
            (TransportError::PermissionDenied("p".into()), ErrorKind::PermissionDenied),
            (TransportError::Connection("down".into()), ErrorKind::Unavailable),
            (TransportError::Malformed("m".into()), ErrorKind::InvalidResponse),
            (
                TransportError::Content(std::io::Error::other("eof")),
                ErrorKind::Content,
            ),
        ];
        for (cause, kind) in cases {
            assert_eq!(t.translate("getAllVersions", cause).kind, kind);
        }
    }

    #[test]
    fn repository_error_keeps_cause() {
        let err = DefaultErrorTranslator.translate(
            "checkOut",
            TransportError::AlreadyCheckedOut("series-1".into()),
        );
        assert_eq!(err.code(), "CONFLICT");
        let msg = err.to_string();
        assert!(msg.contains("checkOut"));
        assert!(msg.contains("series-1"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn version_error_kind() {
        assert_eq!(VersionError::missing("document id").kind(), None);
        let repo: VersionError = DefaultErrorTranslator
            .translate("checkIn", TransportError::Connection("reset".into()))
            .into();
        assert_eq!(repo.kind(), Some(ErrorKind::Unavailable));
    }
}
