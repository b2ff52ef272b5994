//! crates/core/src/config.rs
//!
//! # Overview
//!
//! The configuration model consumed by facade construction. A [`RawConfig`]
//! is one decoded INI section: an ordered list of keys, each holding a scalar
//! [`Value`] or a nested block. [`normalize`] turns that raw shape into a
//! [`LoggerConfig`] — master level/formatter plus an ordered list of
//! [`HandlerEntry`] values — while tolerating both historical layouts:
//!
//! - **current**: the handler key is a free logical name and the block
//!   carries an explicit `type` field;
//! - **legacy**: the handler key doubles as its type name (`FileHandler`)
//!   and no `type` field exists. Normalization synthesizes the field and
//!   emits one deprecation advisory per legacy entry.
//!
//! # Invariants
//!
//! - Declared handler order is preserved end to end; construction attaches
//!   handlers in exactly the order the section declared them.
//! - Handler keys are unique within one configuration.
//! - The master `level` key is required; `formatter` is optional.
//!
//! # Errors
//!
//! Structural problems (missing level, duplicate keys, scalar where a block
//! is required) surface as [`Error::InvalidConfig`]. Value problems inside
//! entries (bad level spellings, bad formatter options) surface later, when
//! the entry is actually used to build a handler.

use crate::error::{Error, Result};
use crate::format::FormatterSpec;
use crate::level::LevelSpec;

/// A decoded configuration value.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Value {
    /// A string scalar.
    Str(String),
    /// An integer scalar.
    Int(i64),
    /// A boolean scalar.
    Bool(bool),
    /// An explicit `None`.
    None,
    /// A nested block of key/value pairs, declared order preserved.
    Block(Vec<(String, Value)>),
}

impl Value {
    /// The string payload, if this is a string scalar.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Whether this is the explicit `None` value.
    #[must_use]
    pub const fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Render the scalar the way a configuration file would spell it.
    ///
    /// Blocks have no scalar spelling and render as `<block>`; they never
    /// participate in handler fingerprints.
    #[must_use]
    pub fn spelled(&self) -> String {
        match self {
            Self::Str(s) => s.clone(),
            Self::Int(i) => i.to_string(),
            Self::Bool(true) => "True".to_owned(),
            Self::Bool(false) => "False".to_owned(),
            Self::None => "None".to_owned(),
            Self::Block(_) => "<block>".to_owned(),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Str(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// One decoded INI section, before shape normalization.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RawConfig {
    /// The section's key/value pairs in declared order.
    pub entries: Vec<(String, Value)>,
}

impl RawConfig {
    /// An empty configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a key/value pair.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.entries.push((key.into(), value.into()));
    }
}

impl From<Vec<(String, Value)>> for RawConfig {
    fn from(entries: Vec<(String, Value)>) -> Self {
        Self { entries }
    }
}

/// One declared handler after normalization.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HandlerEntry {
    /// The logical handler key this entry registers under.
    pub key: String,
    /// The declared handler type name (for example `StreamHandler`).
    pub kind_name: String,
    /// Whether the handler is constructed at all; inactive entries are
    /// skipped without validation.
    pub active: bool,
    /// Per-handler severity override; `None` inherits the master level.
    pub level: Option<LevelSpec>,
    /// Per-handler formatter override; `None` inherits the master formatter.
    pub formatter: Option<FormatterSpec>,
    /// Remaining keys, forwarded verbatim to the handler factory.
    pub args: Vec<(String, Value)>,
}

/// A shape-normalized logging configuration.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LoggerConfig {
    /// Master severity, inherited by handlers without their own `level`.
    pub level: LevelSpec,
    /// Master formatter, inherited by handlers without their own
    /// `formatter`; `None` means the bare `{message}` template.
    pub formatter: Option<FormatterSpec>,
    /// Declared handlers, in declaration order.
    pub handlers: Vec<HandlerEntry>,
}

/// The result of shape normalization.
#[derive(Clone, Debug)]
pub struct Normalized {
    /// The normalized configuration.
    pub config: LoggerConfig,
    /// One advisory per legacy-shaped handler entry, in declaration order.
    pub advisories: Vec<String>,
}

/// Normalize a raw section into a [`LoggerConfig`], tolerating both the
/// legacy and the current handler layout.
///
/// Legacy entries (no `type` field) have the field synthesized from their
/// key and produce a deprecation advisory, which is also logged through the
/// diagnostics layer. Advisories are informational only; the returned
/// configuration is fully usable.
///
/// # Errors
///
/// Returns [`Error::InvalidConfig`] when the master `level` key is missing,
/// a handler key repeats, or a handler entry is not a block.
pub fn normalize(raw: &RawConfig) -> Result<Normalized> {
    let mut level = None;
    let mut formatter = None;
    let mut handlers: Vec<HandlerEntry> = Vec::new();
    let mut advisories = Vec::new();

    for (key, value) in &raw.entries {
        match key.as_str() {
            "level" => level = Some(level_spec(value)?),
            "formatter" => formatter = FormatterSpec::from_value(value)?,
            _ => {
                if handlers.iter().any(|entry| entry.key == *key) {
                    return Err(Error::InvalidConfig(format!(
                        "duplicate handler key '{key}'"
                    )));
                }
                handlers.push(handler_entry(key, value, &mut advisories)?);
            }
        }
    }

    let Some(level) = level else {
        return Err(Error::InvalidConfig(
            "the master 'level' key is missing".to_owned(),
        ));
    };

    for advisory in &advisories {
        tracing::warn!("{advisory}");
    }

    Ok(Normalized {
        config: LoggerConfig {
            level,
            formatter,
            handlers,
        },
        advisories,
    })
}

fn level_spec(value: &Value) -> Result<LevelSpec> {
    match value {
        Value::Str(s) => Ok(LevelSpec::Named(s.clone())),
        Value::Int(i) => Ok(LevelSpec::Numeric(*i)),
        other => Err(Error::InvalidConfig(format!(
            "'{}' is not a valid level value",
            other.spelled()
        ))),
    }
}

fn handler_entry(
    key: &str,
    value: &Value,
    advisories: &mut Vec<String>,
) -> Result<HandlerEntry> {
    let Value::Block(fields) = value else {
        return Err(Error::InvalidConfig(format!(
            "handler entry '{key}' must be a block of settings, got '{}'",
            value.spelled()
        )));
    };

    let mut kind_name = None;
    let mut active = false;
    let mut level = None;
    let mut formatter = None;
    let mut args = Vec::new();

    for (field, field_value) in fields {
        match field.as_str() {
            "type" => kind_name = Some(require_str(key, field, field_value)?),
            "active" => active = bool_value(key, field_value)?,
            "level" => level = Some(level_spec(field_value)?),
            "formatter" => formatter = FormatterSpec::from_value(field_value)?,
            _ => args.push((field.clone(), field_value.clone())),
        }
    }

    let kind_name = match kind_name {
        Some(name) => name,
        None => {
            // Legacy layout: the key doubles as the type name.
            advisories.push(format!(
                "handler '{key}' uses the legacy layout where the key names the \
                 type; add an explicit 'type' field or run 'logrig upgrade'"
            ));
            key.to_owned()
        }
    };

    Ok(HandlerEntry {
        key: key.to_owned(),
        kind_name,
        active,
        level,
        formatter,
        args,
    })
}

fn require_str(key: &str, field: &str, value: &Value) -> Result<String> {
    value.as_str().map(str::to_owned).ok_or_else(|| {
        Error::InvalidConfig(format!(
            "handler '{key}' has a non-string '{field}' value: '{}'",
            value.spelled()
        ))
    })
}

fn bool_value(key: &str, value: &Value) -> Result<bool> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::Str(s) if s.eq_ignore_ascii_case("true") => Ok(true),
        Value::Str(s) if s.eq_ignore_ascii_case("false") => Ok(false),
        other => Err(Error::InvalidConfig(format!(
            "handler '{key}' has a non-boolean 'active' value: '{}'",
            other.spelled()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream_block(active: bool) -> Value {
        Value::Block(vec![
            ("type".to_owned(), "StreamHandler".into()),
            ("active".to_owned(), active.into()),
        ])
    }

    #[test]
    fn current_shape_reads_type_field() {
        let mut raw = RawConfig::new();
        raw.push("level", "DEBUG");
        raw.push("console", stream_block(true));

        let normalized = normalize(&raw).unwrap();
        assert!(normalized.advisories.is_empty());

        let entry = &normalized.config.handlers[0];
        assert_eq!(entry.key, "console");
        assert_eq!(entry.kind_name, "StreamHandler");
        assert!(entry.active);
    }

    #[test]
    fn legacy_shape_synthesizes_type_and_advises_once() {
        let mut raw = RawConfig::new();
        raw.push("level", "DEBUG");
        raw.push(
            "FileHandler",
            Value::Block(vec![
                ("active".to_owned(), true.into()),
                ("filename".to_owned(), "out.log".into()),
            ]),
        );

        let normalized = normalize(&raw).unwrap();
        assert_eq!(normalized.advisories.len(), 1);
        assert!(normalized.advisories[0].contains("FileHandler"));

        let entry = &normalized.config.handlers[0];
        assert_eq!(entry.key, "FileHandler");
        assert_eq!(entry.kind_name, "FileHandler");
        assert_eq!(entry.args.len(), 1);
    }

    #[test]
    fn mixed_shapes_advise_per_legacy_entry() {
        let mut raw = RawConfig::new();
        raw.push("level", "DEBUG");
        raw.push("console", stream_block(true));
        raw.push(
            "NullHandler",
            Value::Block(vec![("active".to_owned(), false.into())]),
        );

        let normalized = normalize(&raw).unwrap();
        assert_eq!(normalized.advisories.len(), 1);
        assert_eq!(normalized.config.handlers.len(), 2);
    }

    #[test]
    fn declared_order_is_preserved() {
        let mut raw = RawConfig::new();
        raw.push("level", "DEBUG");
        raw.push("second", stream_block(true));
        raw.push("first", stream_block(false));

        let normalized = normalize(&raw).unwrap();
        let keys: Vec<_> = normalized
            .config
            .handlers
            .iter()
            .map(|entry| entry.key.as_str())
            .collect();
        assert_eq!(keys, ["second", "first"]);
    }

    #[test]
    fn missing_master_level_is_rejected() {
        let mut raw = RawConfig::new();
        raw.push("console", stream_block(true));

        let err = normalize(&raw).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
        assert!(err.to_string().contains("'level'"));
    }

    #[test]
    fn duplicate_handler_keys_are_rejected() {
        let mut raw = RawConfig::new();
        raw.push("level", "DEBUG");
        raw.push("console", stream_block(true));
        raw.push("console", stream_block(false));

        let err = normalize(&raw).unwrap_err();
        assert!(err.to_string().contains("duplicate handler key 'console'"));
    }

    #[test]
    fn scalar_handler_entries_are_rejected() {
        let mut raw = RawConfig::new();
        raw.push("level", "DEBUG");
        raw.push("console", "StreamHandler");

        let err = normalize(&raw).unwrap_err();
        assert!(err.to_string().contains("must be a block"));
    }

    #[test]
    fn missing_active_means_inactive() {
        let mut raw = RawConfig::new();
        raw.push("level", "DEBUG");
        raw.push(
            "console",
            Value::Block(vec![("type".to_owned(), "StreamHandler".into())]),
        );

        let normalized = normalize(&raw).unwrap();
        assert!(!normalized.config.handlers[0].active);
    }

    #[test]
    fn active_accepts_spelled_booleans() {
        let mut raw = RawConfig::new();
        raw.push("level", "DEBUG");
        raw.push(
            "console",
            Value::Block(vec![
                ("type".to_owned(), "StreamHandler".into()),
                ("active".to_owned(), "True".into()),
            ]),
        );

        let normalized = normalize(&raw).unwrap();
        assert!(normalized.config.handlers[0].active);
    }

    #[test]
    fn per_handler_overrides_are_captured() {
        let mut raw = RawConfig::new();
        raw.push("level", "DEBUG");
        raw.push(
            "console",
            Value::Block(vec![
                ("type".to_owned(), "StreamHandler".into()),
                ("active".to_owned(), true.into()),
                ("level".to_owned(), "ERROR".into()),
                ("formatter".to_owned(), "{message}".into()),
            ]),
        );

        let entry = normalize(&raw).unwrap().config.handlers.remove(0);
        assert_eq!(entry.level, Some(LevelSpec::Named("ERROR".to_owned())));
        assert!(entry.formatter.is_some());
    }

    #[test]
    fn spelled_round_trips_scalars() {
        assert_eq!(Value::Str("x".to_owned()).spelled(), "x");
        assert_eq!(Value::Int(8080).spelled(), "8080");
        assert_eq!(Value::Bool(true).spelled(), "True");
        assert_eq!(Value::None.spelled(), "None");
    }
}
