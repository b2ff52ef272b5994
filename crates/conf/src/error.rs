//! crates/conf/src/error.rs
//!
//! Error type for the configuration-file layer. Parse problems carry the
//! offending line number; lookup problems carry the section name. The
//! [`From`] conversion into [`logrig_core::Error`] lets this crate serve as a
//! configuration source for the core without the core knowing about files.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Convenience alias for results produced by this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong reading, editing, or writing `logrig.ini`.
#[derive(Debug, Error)]
pub enum Error {
    /// The file exists but contains no sections at all.
    #[error("{} is not a valid config file", .path.display())]
    NotAConfig {
        /// The offending file.
        path: PathBuf,
    },

    /// A line could not be parsed.
    #[error("syntax error at line {line}: {message}")]
    Syntax {
        /// 1-based line number in the source text.
        line: usize,
        /// What was wrong with it.
        message: String,
    },

    /// A section header appeared twice.
    #[error("duplicate section '{0}'")]
    DuplicateSection(String),

    /// A key appeared twice within one section.
    #[error("duplicate key '{key}' in section '{section}'")]
    DuplicateKey {
        /// Section containing the repeated key.
        section: String,
        /// The repeated key.
        key: String,
    },

    /// A requested section does not exist.
    #[error("no section named '{0}' in the configuration")]
    MissingSection(String),

    /// The reserved color section was requested as a logger configuration.
    #[error("'{0}' is reserved for the color table and is not a logger configuration")]
    ReservedSection(String),

    /// A section that was supposed to be new already exists.
    #[error("'{name}' already exists in config file: {}", .path.display())]
    SectionExists {
        /// The colliding section name.
        name: String,
        /// The file it lives in.
        path: PathBuf,
    },

    /// No configuration file was found walking up from the start path.
    #[error(
        "no logrig.ini found searching upward from '{}'; run 'logrig init' in your project root",
        .start.display()
    )]
    NotFound {
        /// Where the search began.
        start: PathBuf,
    },

    /// A decoded value was rejected by the core.
    #[error(transparent)]
    Core(#[from] logrig_core::Error),

    /// Reading or writing the file failed.
    #[error("I/O error: {0}")]
    Io(
        #[from]
        #[source]
        io::Error,
    ),
}

impl From<Error> for logrig_core::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Core(inner) => inner,
            Error::Io(inner) => Self::Io(inner),
            other => Self::InvalidConfig(other.to_string()),
        }
    }
}
