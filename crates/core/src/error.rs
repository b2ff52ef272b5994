//! crates/core/src/error.rs
//!
//! Error types for logger provisioning.

use std::io;

use thiserror::Error;

/// Result type for logger provisioning operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or reconfiguring a logger.
#[derive(Debug, Error)]
pub enum Error {
    /// The named configuration does not exist, names a reserved section, or
    /// is structurally malformed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// A caller-supplied argument is out of the accepted set, or two mutually
    /// exclusive arguments were combined.
    #[error("invalid option: {0}")]
    InvalidOption(String),
    /// An equivalent handler is already attached and neither `skip_duplicate`
    /// nor `allow_duplicate` was requested.
    #[error("{0}")]
    DuplicatedHandler(String),
    /// A reconfiguration referenced a logical handler key that is not
    /// registered on the facade.
    #[error("no handler named '{0}' is attached to this logger")]
    HandlerNotFound(String),
    /// A path-requiring handler kind was declared without a file path.
    #[error("the '{kind}' handler requires a file path, but none was given")]
    MissingPath {
        /// The handler kind that required the path.
        kind: &'static str,
    },
    /// I/O error while preparing a handler's backing resource.
    #[error("I/O error: {0}")]
    Io(
        #[from]
        #[source]
        io::Error,
    ),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::ErrorKind;

    #[test]
    fn io_error_from_std_io_error() {
        let io_err = io::Error::new(ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();

        assert!(matches!(err, Error::Io(_)));
        assert!(err.to_string().contains("I/O error"));
    }

    #[test]
    fn invalid_config_carries_message() {
        let err = Error::InvalidConfig("no section named 'web'".to_owned());

        assert!(err.to_string().starts_with("invalid configuration"));
        assert!(err.to_string().contains("'web'"));
    }

    #[test]
    fn handler_not_found_names_the_key() {
        let err = Error::HandlerNotFound("console".to_owned());

        assert_eq!(
            err.to_string(),
            "no handler named 'console' is attached to this logger"
        );
    }

    #[test]
    fn missing_path_names_the_kind() {
        let err = Error::MissingPath { kind: "file" };

        assert_eq!(
            err.to_string(),
            "the 'file' handler requires a file path, but none was given"
        );
    }

    #[test]
    fn error_source_for_io() {
        use std::error::Error as _;

        let io_err = io::Error::new(ErrorKind::PermissionDenied, "access denied");
        let err: Error = io_err.into();

        assert!(err.source().is_some());
    }
}
