//! Error types and result definitions for reconciliation operations.
//!
//! Provides an error system with classification and captured diagnostic
//! metadata. The [`SyncError`] type carries a static description, optional
//! dynamic detail (such as an HTTP status and response body), an optional
//! source error, and the location where it was created.

use std::borrow::Cow;
use std::error;
use std::fmt;
use std::panic::Location;
use std::sync::Arc;

/// Convenient result type for reconciliation operations using [`SyncError`]
/// as the error type.
pub type SyncResult<T> = Result<T, SyncError>;

/// Specific categories of errors that can occur during a reconciliation pass.
///
/// Error kinds are organized by functional area and failure mode. The
/// classification determines how a failure is handled: extraction and
/// authentication failures abort the pass, write failures are contained per
/// plan entry, and configuration errors terminate the process.
#[derive(PartialEq, Eq, Copy, Clone, Debug, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Connecting to the source database failed.
    SourceConnectionFailed,
    /// The extraction query failed to execute or decode.
    SourceQueryFailed,
    /// Obtaining or refreshing the bearer token failed.
    AuthFailed,
    /// A page fetch against the remote collection failed.
    DestinationFetchFailed,
    /// A create, update, or delete against the remote collection failed.
    DestinationWriteFailed,
    /// The remote collection returned an item that could not be interpreted.
    InvalidItem,
    /// Invalid or incomplete configuration.
    ConfigError,
    /// An uncategorized error.
    Unknown,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::SourceConnectionFailed => "source connection failed",
            ErrorKind::SourceQueryFailed => "source query failed",
            ErrorKind::AuthFailed => "authentication failed",
            ErrorKind::DestinationFetchFailed => "destination fetch failed",
            ErrorKind::DestinationWriteFailed => "destination write failed",
            ErrorKind::InvalidItem => "invalid destination item",
            ErrorKind::ConfigError => "configuration error",
            ErrorKind::Unknown => "unknown error",
        };

        f.write_str(name)
    }
}

/// Main error type for reconciliation operations.
#[derive(Debug, Clone)]
pub struct SyncError {
    kind: ErrorKind,
    description: Cow<'static, str>,
    detail: Option<String>,
    source: Option<Arc<dyn error::Error + Send + Sync>>,
    location: &'static Location<'static>,
}

impl SyncError {
    /// Creates a new error with a static description.
    #[track_caller]
    pub fn new(kind: ErrorKind, description: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind,
            description: description.into(),
            detail: None,
            source: None,
            location: Location::caller(),
        }
    }

    /// Creates a new error with a static description and dynamic detail.
    #[track_caller]
    pub fn with_detail(
        kind: ErrorKind,
        description: impl Into<Cow<'static, str>>,
        detail: String,
    ) -> Self {
        Self {
            kind,
            description: description.into(),
            detail: Some(detail),
            source: None,
            location: Location::caller(),
        }
    }

    /// Attaches a source error, preserving the underlying cause chain.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: error::Error + Send + Sync + 'static,
    {
        self.source = Some(Arc::new(source));
        self
    }

    /// Returns the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the dynamic detail attached to this error, if any.
    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    /// Returns the location where this error was created.
    pub fn location(&self) -> &'static Location<'static> {
        self.location
    }
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.description)?;

        if let Some(detail) = &self.detail {
            write!(f, " ({detail})")?;
        }

        Ok(())
    }
}

impl error::Error for SyncError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|source| source.as_ref() as &(dyn error::Error + 'static))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_kind_and_description() {
        let err = SyncError::new(ErrorKind::SourceQueryFailed, "query execution failed");
        assert_eq!(
            err.to_string(),
            "source query failed: query execution failed"
        );
    }

    #[test]
    fn test_display_includes_detail() {
        let err = SyncError::with_detail(
            ErrorKind::DestinationWriteFailed,
            "create rejected",
            "status 403: forbidden".to_string(),
        );
        assert_eq!(
            err.to_string(),
            "destination write failed: create rejected (status 403: forbidden)"
        );
    }

    #[test]
    fn test_source_chain_preserved() {
        let io_err = std::io::Error::other("boom");
        let err = SyncError::new(ErrorKind::Unknown, "wrapper").with_source(io_err);
        assert!(std::error::Error::source(&err).is_some());
    }
}
