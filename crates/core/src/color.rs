//! crates/core/src/color.rs
//!
//! ANSI color support for console handlers.
//!
//! A color configuration maps severity names to a [`ColorSpec`]: either a
//! plain foreground color or a `{color, style, bg}` triple. Specs keep the
//! configured names as written; [`ColorSpec::compile`] validates them and
//! renders the SGR escape sequence, so a bad name only surfaces when a
//! console formatter is actually built from it.

use crate::config::Value;
use crate::error::{Error, Result};

/// The SGR reset sequence appended after every colorized line.
pub const RESET: &str = "\x1b[0m";

/// Foreground color names accepted in a color configuration.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Color {
    /// SGR 0; clears all attributes.
    Reset,
    /// SGR 30.
    Black,
    /// SGR 31.
    Red,
    /// SGR 32.
    Green,
    /// SGR 33.
    Yellow,
    /// SGR 34.
    Blue,
    /// SGR 35 (ANSI magenta); accepts both `purple` and `magenta`.
    Purple,
    /// SGR 36.
    Cyan,
    /// SGR 37.
    White,
}

impl Color {
    /// Parse a color name, case-insensitively.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "reset" => Some(Self::Reset),
            "black" => Some(Self::Black),
            "red" => Some(Self::Red),
            "green" => Some(Self::Green),
            "yellow" => Some(Self::Yellow),
            "blue" => Some(Self::Blue),
            "purple" | "magenta" => Some(Self::Purple),
            "cyan" => Some(Self::Cyan),
            "white" => Some(Self::White),
            _ => None,
        }
    }

    /// The SGR foreground code.
    #[must_use]
    pub const fn foreground(self) -> u8 {
        match self {
            Self::Reset => 0,
            Self::Black => 30,
            Self::Red => 31,
            Self::Green => 32,
            Self::Yellow => 33,
            Self::Blue => 34,
            Self::Purple => 35,
            Self::Cyan => 36,
            Self::White => 37,
        }
    }

    /// The SGR background code (foreground + 10).
    #[must_use]
    pub const fn background(self) -> u8 {
        self.foreground() + 10
    }
}

/// Text style names accepted in a color configuration.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Style {
    /// SGR 1.
    Bold,
    /// SGR 4.
    Underline,
}

impl Style {
    /// Parse a style name, case-insensitively.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "bold" => Some(Self::Bold),
            "underline" => Some(Self::Underline),
            _ => None,
        }
    }

    /// The SGR style code.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Bold => 1,
            Self::Underline => 4,
        }
    }
}

/// One severity's declared coloring, names kept as written.
///
/// A style without a color or background has no effect, matching the
/// documented behavior of the configuration format.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColorSpec {
    /// Foreground color name.
    pub color: Option<String>,
    /// Style name (`bold` or `underline`).
    pub style: Option<String>,
    /// Background color name.
    pub bg: Option<String>,
}

impl ColorSpec {
    /// A spec that only sets the foreground color.
    #[must_use]
    pub fn named(color: impl Into<String>) -> Self {
        Self {
            color: Some(color.into()),
            style: None,
            bg: None,
        }
    }

    /// Validate the configured names and render the SGR escape sequence.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOption`] for an unrecognized color or style
    /// name, or for `reset` used as a background.
    pub fn compile(&self) -> Result<String> {
        let mut parts: Vec<String> = Vec::with_capacity(3);

        let color = match &self.color {
            Some(name) => Some(
                Color::parse(name)
                    .ok_or_else(|| bad_name(name))?,
            ),
            None => None,
        };
        let style = match &self.style {
            Some(name) => Some(
                Style::parse(name)
                    .ok_or_else(|| bad_name(name))?,
            ),
            None => None,
        };
        let bg = match &self.bg {
            Some(name) => {
                let parsed = Color::parse(name).ok_or_else(|| bad_name(name))?;
                if parsed == Color::Reset {
                    return Err(Error::InvalidOption(
                        "'reset' is not a valid background color".to_owned(),
                    ));
                }
                Some(parsed)
            }
            None => None,
        };

        // A style participates only alongside a color or background.
        if color.is_some() || bg.is_some() {
            if let Some(style) = style {
                parts.push(style.code().to_string());
            }
            if let Some(color) = color {
                parts.push(color.foreground().to_string());
            }
            if let Some(bg) = bg {
                parts.push(bg.background().to_string());
            }
        }

        Ok(format!("\x1b[{}m", parts.join(";")))
    }
}

fn bad_name(name: &str) -> Error {
    Error::InvalidOption(format!("'{name}' is not a valid style or color"))
}

/// The severity-name → [`ColorSpec`] table from the reserved color section.
///
/// Lookups are case-insensitive on the severity name. Declared order is
/// preserved for round-tripping back to the file layer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColorConfig {
    entries: Vec<(String, ColorSpec)>,
}

impl ColorConfig {
    /// An empty color table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the spec for a severity name.
    pub fn insert(&mut self, severity: impl Into<String>, spec: ColorSpec) {
        let severity = severity.into();
        if let Some(slot) = self
            .entries
            .iter_mut()
            .find(|(name, _)| name.eq_ignore_ascii_case(&severity))
        {
            slot.1 = spec;
        } else {
            self.entries.push((severity, spec));
        }
    }

    /// Look up the spec for a severity name, case-insensitively.
    #[must_use]
    pub fn get(&self, severity: &str) -> Option<&ColorSpec> {
        self.entries
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(severity))
            .map(|(_, spec)| spec)
    }

    /// Iterate the declared entries in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ColorSpec)> {
        self.entries.iter().map(|(name, spec)| (name.as_str(), spec))
    }

    /// Whether the table has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Decode a color table from decoded section entries.
    ///
    /// A scalar value is a foreground color name (`None` means unstyled); a
    /// block may carry `color`, `style`, and `bg` keys. Name validity is
    /// deliberately not checked here — that happens in
    /// [`ColorSpec::compile`] when a console formatter is built.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] for structurally malformed entries,
    /// such as unknown block keys or non-string values.
    pub fn from_entries(entries: &[(String, Value)]) -> Result<Self> {
        let mut config = Self::new();
        for (severity, value) in entries {
            match value {
                Value::None => {}
                Value::Str(name) => {
                    config.insert(severity.clone(), ColorSpec::named(name.clone()));
                }
                Value::Block(fields) => {
                    let mut spec = ColorSpec::default();
                    for (field, field_value) in fields {
                        let slot = match field.as_str() {
                            "color" => &mut spec.color,
                            "style" => &mut spec.style,
                            "bg" => &mut spec.bg,
                            other => {
                                return Err(Error::InvalidConfig(format!(
                                    "unknown key '{other}' in the color entry for '{severity}'"
                                )));
                            }
                        };
                        *slot = match field_value {
                            Value::Str(name) => Some(name.clone()),
                            Value::None => None,
                            other => {
                                return Err(Error::InvalidConfig(format!(
                                    "color entry for '{severity}' has a non-string '{field}' value: {other:?}"
                                )));
                            }
                        };
                    }
                    config.insert(severity.clone(), spec);
                }
                other => {
                    return Err(Error::InvalidConfig(format!(
                        "color entry for '{severity}' must be a color name or a block, got {other:?}"
                    )));
                }
            }
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_color_renders_foreground_only() {
        let spec = ColorSpec::named("red");
        assert_eq!(spec.compile().unwrap(), "\x1b[31m");
    }

    #[test]
    fn style_and_color_render_joined() {
        let spec = ColorSpec {
            color: Some("blue".to_owned()),
            style: Some("bold".to_owned()),
            bg: None,
        };
        assert_eq!(spec.compile().unwrap(), "\x1b[1;34m");
    }

    #[test]
    fn background_renders_after_foreground() {
        let spec = ColorSpec {
            color: Some("black".to_owned()),
            style: None,
            bg: Some("white".to_owned()),
        };
        assert_eq!(spec.compile().unwrap(), "\x1b[30;47m");
    }

    #[test]
    fn style_alone_has_no_effect() {
        let spec = ColorSpec {
            color: None,
            style: Some("bold".to_owned()),
            bg: None,
        };
        assert_eq!(spec.compile().unwrap(), "\x1b[m");
    }

    #[test]
    fn names_are_case_insensitive() {
        let spec = ColorSpec {
            color: Some("PURPLE".to_owned()),
            style: Some("Bold".to_owned()),
            bg: None,
        };
        assert_eq!(spec.compile().unwrap(), "\x1b[1;35m");
    }

    #[test]
    fn magenta_aliases_purple() {
        assert_eq!(
            ColorSpec::named("magenta").compile().unwrap(),
            ColorSpec::named("purple").compile().unwrap()
        );
    }

    #[test]
    fn unknown_color_is_rejected() {
        let err = ColorSpec::named("crimson").compile().unwrap_err();
        assert!(matches!(err, Error::InvalidOption(_)));
        assert!(err.to_string().contains("'crimson'"));
    }

    #[test]
    fn unknown_style_is_rejected() {
        let spec = ColorSpec {
            color: Some("red".to_owned()),
            style: Some("blink".to_owned()),
            bg: None,
        };
        let err = spec.compile().unwrap_err();
        assert!(err.to_string().contains("'blink'"));
    }

    #[test]
    fn reset_background_is_rejected() {
        let spec = ColorSpec {
            color: Some("red".to_owned()),
            style: None,
            bg: Some("reset".to_owned()),
        };
        assert!(spec.compile().is_err());
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let mut config = ColorConfig::new();
        config.insert("CRITICAL", ColorSpec::named("purple"));

        assert!(config.get("critical").is_some());
        assert!(config.get("Critical").is_some());
        assert!(config.get("debug").is_none());
    }

    #[test]
    fn decodes_scalar_and_block_entries() {
        let entries = vec![
            ("ERROR".to_owned(), Value::Str("red".to_owned())),
            (
                "CRITICAL".to_owned(),
                Value::Block(vec![
                    ("color".to_owned(), Value::Str("purple".to_owned())),
                    ("style".to_owned(), Value::Str("bold".to_owned())),
                ]),
            ),
            ("INFO".to_owned(), Value::None),
        ];

        let config = ColorConfig::from_entries(&entries).unwrap();
        assert_eq!(config.get("error"), Some(&ColorSpec::named("red")));
        assert_eq!(
            config.get("critical").and_then(|s| s.style.as_deref()),
            Some("bold")
        );
        // A None entry means unstyled, same as absent.
        assert!(config.get("info").is_none());
    }

    #[test]
    fn rejects_unknown_block_keys() {
        let entries = vec![(
            "ERROR".to_owned(),
            Value::Block(vec![("tint".to_owned(), Value::Str("red".to_owned()))]),
        )];

        let err = ColorConfig::from_entries(&entries).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
        assert!(err.to_string().contains("'tint'"));
    }

    #[test]
    fn bad_names_survive_decoding_until_compile() {
        let entries = vec![("ERROR".to_owned(), Value::Str("crimson".to_owned()))];

        let config = ColorConfig::from_entries(&entries).unwrap();
        let spec = config.get("error").unwrap();
        assert!(spec.compile().is_err());
    }
}
