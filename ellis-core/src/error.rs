//! Closed set of error kinds shared by the data model, the path
//! sublanguage, and every codec built on top of it.

use std::fmt;
use std::panic::Location;

/// The closed set of failure categories an Ellis operation can raise.
///
/// Neutral naming on purpose: nothing here describes *which* codec or
/// container produced the failure, only *what kind* of failure it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Wrong variant for the requested operation.
    TypeMismatch,
    /// Out-of-range index, malformed extension, or other bad argument.
    InvalidArgs,
    /// Path parse error or traversal mismatch.
    PathFail,
    /// Malformed wire input.
    ParseFail,
    /// Upstream stream could not deliver or accept bytes.
    Io,
    /// No registered format could decode/encode the requested file.
    TranslateFail,
    /// No format registered for a requested extension or name.
    NoSuch,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::TypeMismatch => "TYPE_MISMATCH",
            ErrorKind::InvalidArgs => "INVALID_ARGS",
            ErrorKind::PathFail => "PATH_FAIL",
            ErrorKind::ParseFail => "PARSE_FAIL",
            ErrorKind::Io => "IO",
            ErrorKind::TranslateFail => "TRANSLATE_FAIL",
            ErrorKind::NoSuch => "NO_SUCH",
        };
        f.write_str(s)
    }
}

/// An error carrying a kind, a free-form message, and the source-site
/// file/line where it was raised.
///
/// The call site is captured automatically via `#[track_caller]` on
/// [`Error::new`], rather than being threaded through by hand as the
/// original C++ source does.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{kind}: {message} ({file}:{line})")]
pub struct Error {
    kind: ErrorKind,
    message: String,
    file: &'static str,
    line: u32,
}

impl Error {
    #[track_caller]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        let loc = Location::caller();
        Error {
            kind,
            message: message.into(),
            file: loc.file(),
            line: loc.line(),
        }
    }

    #[track_caller]
    pub fn type_mismatch(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TypeMismatch, message)
    }

    #[track_caller]
    pub fn invalid_args(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidArgs, message)
    }

    #[track_caller]
    pub fn path_fail(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::PathFail, message)
    }

    #[track_caller]
    pub fn parse_fail(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ParseFail, message)
    }

    #[track_caller]
    pub fn io(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Io, message)
    }

    #[track_caller]
    pub fn translate_fail(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TranslateFail, message)
    }

    #[track_caller]
    pub fn no_such(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NoSuch, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn file(&self) -> &'static str {
        self.file
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    /// Human-readable summary suitable for logging: kind, message, and
    /// source site.
    pub fn summary(&self) -> String {
        format!("{self}")
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_includes_kind_and_message() {
        let e = Error::type_mismatch("expected Int64");
        assert_eq!(e.kind(), ErrorKind::TypeMismatch);
        assert!(e.summary().contains("TYPE_MISMATCH"));
        assert!(e.summary().contains("expected Int64"));
        assert!(e.summary().contains("error.rs"));
    }
}
