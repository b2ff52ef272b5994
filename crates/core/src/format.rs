//! crates/core/src/format.rs
//!
//! # Overview
//!
//! Record formatting. A formatter is declared either as a `'{'`-style
//! template string (`"{asctime} - {name} - {message}"`) or as a structured
//! block with `fmt` and `datefmt` options. [`RecordFormatter`] compiles the
//! declaration once — template segments, date directives, and (for console
//! targets) the per-severity color table — so formatting a record is a pure
//! assembly walk with no re-parsing.
//!
//! # Design
//!
//! The placeholder set is closed: `{asctime}`, `{name}`, `{levelname}`,
//! `{levelno}`, and `{message}`, with `{{`/`}}` escapes. `datefmt` accepts
//! the strftime directives `%Y %y %m %d %H %M %S %%`. Everything outside
//! those sets is rejected at construction, never at emit time.
//!
//! # Errors
//!
//! Construction returns [`Error::InvalidOption`] for unknown placeholders,
//! format-spec suffixes, unbalanced braces, unknown formatter options,
//! unsupported date directives, and invalid color names.

use time::OffsetDateTime;

use crate::color::{ColorConfig, RESET};
use crate::config::Value;
use crate::error::{Error, Result};
use crate::level::level_name;
use crate::record::Record;

/// The template used when no formatter is configured.
pub const DEFAULT_PATTERN: &str = "{message}";

/// A formatter as declared in configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FormatterSpec {
    /// A bare template string.
    Pattern(String),
    /// A structured declaration.
    Options {
        /// The template string; `None` means [`DEFAULT_PATTERN`].
        fmt: Option<String>,
        /// strftime-style date layout for `{asctime}`.
        datefmt: Option<String>,
    },
}

impl FormatterSpec {
    /// The template string this spec resolves to.
    #[must_use]
    pub fn pattern(&self) -> &str {
        match self {
            Self::Pattern(pattern) => pattern,
            Self::Options { fmt, .. } => fmt.as_deref().unwrap_or(DEFAULT_PATTERN),
        }
    }

    /// Decode a formatter declaration from a configuration value.
    ///
    /// `None` values decode to `Ok(None)`, meaning "inherit".
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOption`] for unknown option keys, non-string
    /// option values, a `style` other than `{`, or a non-decodable value.
    pub fn from_value(value: &Value) -> Result<Option<Self>> {
        match value {
            Value::None => Ok(None),
            Value::Str(pattern) => Ok(Some(Self::Pattern(pattern.clone()))),
            Value::Block(fields) => {
                let mut fmt = None;
                let mut datefmt = None;
                for (key, field_value) in fields {
                    match key.as_str() {
                        "fmt" => fmt = string_or_none(key, field_value)?,
                        "datefmt" => datefmt = string_or_none(key, field_value)?,
                        "style" => {
                            if field_value.as_str() != Some("{") {
                                return Err(Error::InvalidOption(
                                    "only '{' style format patterns are supported".to_owned(),
                                ));
                            }
                        }
                        other => {
                            return Err(Error::InvalidOption(format!(
                                "'{other}' is not a recognized formatter option"
                            )));
                        }
                    }
                }
                Ok(Some(Self::Options { fmt, datefmt }))
            }
            other => Err(Error::InvalidOption(format!(
                "'{}' is not a valid formatter value",
                other.spelled()
            ))),
        }
    }
}

impl From<&str> for FormatterSpec {
    fn from(pattern: &str) -> Self {
        Self::Pattern(pattern.to_owned())
    }
}

impl From<String> for FormatterSpec {
    fn from(pattern: String) -> Self {
        Self::Pattern(pattern)
    }
}

fn string_or_none(key: &str, value: &Value) -> Result<Option<String>> {
    match value {
        Value::Str(s) => Ok(Some(s.clone())),
        Value::None => Ok(None),
        other => Err(Error::InvalidOption(format!(
            "formatter option '{key}' must be a string, got '{}'",
            other.spelled()
        ))),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Field {
    Asctime,
    Name,
    Levelname,
    Levelno,
    Message,
}

#[derive(Clone, Debug)]
enum Segment {
    Literal(String),
    Field(Field),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum DateDirective {
    Year4,
    Year2,
    Month,
    Day,
    Hour,
    Minute,
    Second,
}

#[derive(Clone, Debug)]
enum DatePiece {
    Literal(String),
    Directive(DateDirective),
}

/// A compiled formatter, ready to render records.
#[derive(Clone, Debug)]
pub struct RecordFormatter {
    pattern: String,
    segments: Vec<Segment>,
    date: Option<Vec<DatePiece>>,
    colors: Vec<(String, String)>,
}

impl RecordFormatter {
    /// Compile a formatter declaration.
    ///
    /// `spec = None` compiles the bare [`DEFAULT_PATTERN`]. Passing a color
    /// table makes the formatter color-aware: the caller decides that based
    /// on whether the target handler is a console sink. Every color entry is
    /// validated here, so a bad color name fails the formatter, not a later
    /// emit.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOption`] as described in the module docs.
    pub fn new(spec: Option<&FormatterSpec>, colors: Option<&ColorConfig>) -> Result<Self> {
        let (pattern, datefmt) = match spec {
            None => (DEFAULT_PATTERN.to_owned(), None),
            Some(FormatterSpec::Pattern(pattern)) => (pattern.clone(), None),
            Some(FormatterSpec::Options { fmt, datefmt }) => (
                fmt.clone().unwrap_or_else(|| DEFAULT_PATTERN.to_owned()),
                datefmt.clone(),
            ),
        };

        let segments = parse_template(&pattern)?;
        let date = match datefmt {
            Some(layout) => Some(compile_datefmt(&layout)?),
            None => None,
        };

        let mut compiled_colors = Vec::new();
        if let Some(table) = colors {
            for (severity, spec) in table.iter() {
                compiled_colors.push((severity.to_owned(), spec.compile()?));
            }
        }

        Ok(Self {
            pattern,
            segments,
            date,
            colors: compiled_colors,
        })
    }

    /// The template string this formatter was compiled from.
    ///
    /// This is the formatter's contribution to a handler fingerprint.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Render one record to its formatted line (no trailing newline).
    #[must_use]
    pub fn format(&self, record: &Record<'_>) -> String {
        let mut line = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => line.push_str(text),
                Segment::Field(Field::Asctime) => line.push_str(&self.asctime(record.created)),
                Segment::Field(Field::Name) => line.push_str(record.name),
                Segment::Field(Field::Levelname) => {
                    line.push_str(&level_name(record.level));
                }
                Segment::Field(Field::Levelno) => {
                    line.push_str(&record.level.to_string());
                }
                Segment::Field(Field::Message) => line.push_str(record.message),
            }
        }

        match self.color_for(&level_name(record.level)) {
            Some(code) => format!("{code}{line}{RESET}"),
            None => line,
        }
    }

    fn color_for(&self, severity: &str) -> Option<&str> {
        self.colors
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(severity))
            .map(|(_, code)| code.as_str())
    }

    fn asctime(&self, created: OffsetDateTime) -> String {
        match &self.date {
            Some(pieces) => render_date(pieces, created),
            None => default_asctime(created),
        }
    }
}

fn default_asctime(ts: OffsetDateTime) -> String {
    format!(
        "{:04}-{:02}-{:02} {:02}:{:02}:{:02},{:03}",
        ts.year(),
        u8::from(ts.month()),
        ts.day(),
        ts.hour(),
        ts.minute(),
        ts.second(),
        ts.millisecond()
    )
}

fn render_date(pieces: &[DatePiece], ts: OffsetDateTime) -> String {
    let mut out = String::new();
    for piece in pieces {
        match piece {
            DatePiece::Literal(text) => out.push_str(text),
            DatePiece::Directive(directive) => {
                let rendered = match directive {
                    DateDirective::Year4 => format!("{:04}", ts.year()),
                    DateDirective::Year2 => format!("{:02}", ts.year().rem_euclid(100)),
                    DateDirective::Month => format!("{:02}", u8::from(ts.month())),
                    DateDirective::Day => format!("{:02}", ts.day()),
                    DateDirective::Hour => format!("{:02}", ts.hour()),
                    DateDirective::Minute => format!("{:02}", ts.minute()),
                    DateDirective::Second => format!("{:02}", ts.second()),
                };
                out.push_str(&rendered);
            }
        }
    }
    out
}

fn parse_template(pattern: &str) -> Result<Vec<Segment>> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut chars = pattern.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '{' => {
                if chars.peek() == Some(&'{') {
                    chars.next();
                    literal.push('{');
                    continue;
                }
                let mut field = String::new();
                let mut closed = false;
                for inner in chars.by_ref() {
                    if inner == '}' {
                        closed = true;
                        break;
                    }
                    field.push(inner);
                }
                if !closed {
                    return Err(Error::InvalidOption(format!(
                        "unterminated '{{' in format pattern '{pattern}'"
                    )));
                }
                if field.contains(':') {
                    return Err(Error::InvalidOption(format!(
                        "format specifiers are not supported: '{{{field}}}'"
                    )));
                }
                let resolved = match field.as_str() {
                    "asctime" => Field::Asctime,
                    "name" => Field::Name,
                    "levelname" => Field::Levelname,
                    "levelno" => Field::Levelno,
                    "message" => Field::Message,
                    other => {
                        return Err(Error::InvalidOption(format!(
                            "'{other}' is not a recognized format field"
                        )));
                    }
                };
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(Segment::Field(resolved));
            }
            '}' => {
                if chars.peek() == Some(&'}') {
                    chars.next();
                    literal.push('}');
                } else {
                    return Err(Error::InvalidOption(format!(
                        "single '}}' encountered in format pattern '{pattern}'"
                    )));
                }
            }
            other => literal.push(other),
        }
    }

    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    Ok(segments)
}

fn compile_datefmt(layout: &str) -> Result<Vec<DatePiece>> {
    let mut pieces = Vec::new();
    let mut literal = String::new();
    let mut chars = layout.chars();

    while let Some(ch) = chars.next() {
        if ch != '%' {
            literal.push(ch);
            continue;
        }
        let Some(directive) = chars.next() else {
            return Err(Error::InvalidOption(format!(
                "date layout '{layout}' ends with a bare '%'"
            )));
        };
        if directive == '%' {
            literal.push('%');
            continue;
        }
        let resolved = match directive {
            'Y' => DateDirective::Year4,
            'y' => DateDirective::Year2,
            'm' => DateDirective::Month,
            'd' => DateDirective::Day,
            'H' => DateDirective::Hour,
            'M' => DateDirective::Minute,
            'S' => DateDirective::Second,
            other => {
                return Err(Error::InvalidOption(format!(
                    "'%{other}' is not a supported date directive"
                )));
            }
        };
        if !literal.is_empty() {
            pieces.push(DatePiece::Literal(std::mem::take(&mut literal)));
        }
        pieces.push(DatePiece::Directive(resolved));
    }

    if !literal.is_empty() {
        pieces.push(DatePiece::Literal(literal));
    }
    Ok(pieces)
}
