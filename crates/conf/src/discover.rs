//! crates/conf/src/discover.rs
//!
//! Locates the nearest `logrig.ini` by walking from an explicit starting
//! point up through its ancestors. Callers always say where to start — a
//! source file, a module directory, the current directory — so lookup
//! behavior never depends on who happens to be calling.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::loader::ConfigFile;

/// The configuration file name searched for.
pub const FILE_NAME: &str = "logrig.ini";

/// Find the nearest configuration file at or above `start`.
///
/// A file path starts the search in its parent directory; a directory path
/// starts in the directory itself.
///
/// # Errors
///
/// Returns [`Error::NotFound`] when no ancestor directory holds a
/// `logrig.ini`, and [`Error::Io`] when `start` cannot be made absolute.
pub fn find_config(start: impl AsRef<Path>) -> Result<PathBuf> {
    let start = std::path::absolute(start.as_ref())?;
    let mut dir = if start.is_file() {
        start.parent()
    } else {
        Some(start.as_path())
    };

    while let Some(current) = dir {
        let candidate = current.join(FILE_NAME);
        if candidate.is_file() {
            tracing::debug!(path = %candidate.display(), "found configuration");
            return Ok(candidate);
        }
        dir = current.parent();
    }

    Err(Error::NotFound { start })
}

/// Find and load the nearest configuration file at or above `start`.
///
/// # Errors
///
/// Returns [`find_config`] errors plus anything [`ConfigFile::load`]
/// reports.
pub fn load_config(start: impl AsRef<Path>) -> Result<ConfigFile> {
    ConfigFile::load(find_config(start)?)
}
