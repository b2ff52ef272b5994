//! crates/core/src/level.rs
//!
//! Severity levels and the name/number resolution used by configurations.
//!
//! Severities form the usual ladder: `NOTSET` (0) through `CRITICAL` (50) in
//! steps of ten. Configurations may spell a level as a case-insensitive name
//! (`"info"`), a numeric string (`"20"`), or a bare number; [`resolve_level`]
//! collapses all three onto the canonical numeric value.

use std::borrow::Cow;

use crate::error::{Error, Result};

/// No severity configured; everything passes.
pub const NOTSET: u32 = 0;
/// Diagnostic detail.
pub const DEBUG: u32 = 10;
/// Routine information.
pub const INFO: u32 = 20;
/// Something unexpected, not yet an error.
pub const WARNING: u32 = 30;
/// An operation failed.
pub const ERROR: u32 = 40;
/// The process is in serious trouble.
pub const CRITICAL: u32 = 50;

/// A severity as it appears in configuration: a name or a number.
///
/// The spelling is preserved until [`LevelSpec::resolve`] is called, so error
/// messages can echo exactly what the configuration said.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LevelSpec {
    /// A severity name (`"debug"`) or numeric string (`"10"`).
    Named(String),
    /// A bare number.
    Numeric(i64),
}

impl LevelSpec {
    /// Resolve this spec to its canonical numeric severity.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOption`] for unknown names and for numbers
    /// outside the unsigned range.
    pub fn resolve(&self) -> Result<u32> {
        match self {
            Self::Named(name) => {
                if let Ok(number) = name.parse::<i64>() {
                    return numeric_level(number, name);
                }
                match name.to_ascii_lowercase().as_str() {
                    "notset" => Ok(NOTSET),
                    "debug" => Ok(DEBUG),
                    "info" => Ok(INFO),
                    "warning" => Ok(WARNING),
                    "error" => Ok(ERROR),
                    "critical" => Ok(CRITICAL),
                    _ => Err(Error::InvalidOption(format!(
                        "'{name}' is not a valid logging level"
                    ))),
                }
            }
            Self::Numeric(number) => numeric_level(*number, &number.to_string()),
        }
    }
}

impl From<&str> for LevelSpec {
    fn from(value: &str) -> Self {
        Self::Named(value.to_owned())
    }
}

impl From<String> for LevelSpec {
    fn from(value: String) -> Self {
        Self::Named(value)
    }
}

impl From<u32> for LevelSpec {
    fn from(value: u32) -> Self {
        Self::Numeric(i64::from(value))
    }
}

impl From<i64> for LevelSpec {
    fn from(value: i64) -> Self {
        Self::Numeric(value)
    }
}

fn numeric_level(number: i64, spelled: &str) -> Result<u32> {
    u32::try_from(number).map_err(|_| {
        Error::InvalidOption(format!("'{spelled}' is not a valid logging level"))
    })
}

/// Resolve a severity expressed as a name, numeric string, or number.
///
/// # Errors
///
/// Returns [`Error::InvalidOption`] naming the offending value.
pub fn resolve_level(spec: impl Into<LevelSpec>) -> Result<u32> {
    spec.into().resolve()
}

/// The canonical display name for a numeric severity.
///
/// Unregistered numbers render as `Level {n}`, mirroring the conventional
/// fallback so arbitrary custom severities still format.
#[must_use]
pub fn level_name(level: u32) -> Cow<'static, str> {
    match level {
        NOTSET => Cow::Borrowed("NOTSET"),
        DEBUG => Cow::Borrowed("DEBUG"),
        INFO => Cow::Borrowed("INFO"),
        WARNING => Cow::Borrowed("WARNING"),
        ERROR => Cow::Borrowed("ERROR"),
        CRITICAL => Cow::Borrowed("CRITICAL"),
        other => Cow::Owned(format!("Level {other}")),
    }
}
