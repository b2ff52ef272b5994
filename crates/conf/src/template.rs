//! crates/conf/src/template.rs
//!
//! Section templates written by the `init` and `add` commands. A fresh
//! logger section carries a console handler switched on, plus file and null
//! handlers switched off so the shape is there to edit. The color template
//! is the default severity palette for console output.

use logrig_core::Value;

use crate::error::Result;

/// Level spellings accepted by the command-line tools, checked
/// case-insensitively.
pub const ALLOWED_LEVELS: [&str; 12] = [
    "critical", "error", "warning", "info", "debug", "notset", "50", "40", "30",
    "20", "10", "0",
];

/// Placeholder log path written for the inactive file handler.
const PLACEHOLDER_LOG: &str = "mylogpath/foo.log";

/// Adjustments applied to a fresh logger section template.
#[derive(Clone, Debug, Default)]
pub struct TemplateOptions {
    level: Option<String>,
    formatter: Option<String>,
    filename: Option<String>,
}

impl TemplateOptions {
    /// Template defaults: `DEBUG`, no formatter, placeholder log path.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Master and handler severity; validated against [`ALLOWED_LEVELS`].
    #[must_use]
    pub fn level(mut self, level: impl Into<String>) -> Self {
        self.level = Some(level.into());
        self
    }

    /// Master formatter template.
    #[must_use]
    pub fn formatter(mut self, formatter: impl Into<String>) -> Self {
        self.formatter = Some(formatter.into());
        self
    }

    /// Path for the (initially inactive) file handler.
    #[must_use]
    pub fn filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// The configured file path, if any.
    #[must_use]
    pub fn log_path(&self) -> Option<&str> {
        self.filename.as_deref()
    }
}

/// Validate a level spelling against [`ALLOWED_LEVELS`].
///
/// # Errors
///
/// Returns [`InvalidOption`](logrig_core::Error::InvalidOption) for
/// anything else.
pub fn check_level(level: &str) -> Result<()> {
    let lowered = level.to_ascii_lowercase();
    if ALLOWED_LEVELS.contains(&lowered.as_str()) {
        return Ok(());
    }
    Err(logrig_core::Error::InvalidOption(format!(
        "'{level}' is not allowed, please specify one of: {}",
        ALLOWED_LEVELS.join(", ")
    ))
    .into())
}

/// Build the entries for a fresh logger section.
///
/// The stream handler starts active; the file handler is written inactive
/// with either the requested path or a placeholder; the null handler stays
/// at `NOTSET` regardless of the requested level.
///
/// # Errors
///
/// Returns an error for a level spelling outside [`ALLOWED_LEVELS`].
pub fn logger_template(options: &TemplateOptions) -> Result<Vec<(String, Value)>> {
    if let Some(level) = &options.level {
        check_level(level)?;
    }
    let level = options
        .level
        .as_deref()
        .unwrap_or("DEBUG")
        .to_ascii_uppercase();
    let formatter = options
        .formatter
        .as_ref()
        .map_or(Value::None, |f| Value::Str(f.clone()));
    let filename = options
        .filename
        .clone()
        .unwrap_or_else(|| PLACEHOLDER_LOG.to_owned());

    Ok(vec![
        ("level".to_owned(), Value::Str(level.clone())),
        ("formatter".to_owned(), formatter),
        (
            "stream".to_owned(),
            Value::Block(vec![
                ("type".to_owned(), Value::Str("StreamHandler".to_owned())),
                ("active".to_owned(), Value::Bool(true)),
                ("level".to_owned(), Value::Str(level.clone())),
            ]),
        ),
        (
            "file".to_owned(),
            Value::Block(vec![
                ("type".to_owned(), Value::Str("FileHandler".to_owned())),
                ("active".to_owned(), Value::Bool(false)),
                ("level".to_owned(), Value::Str(level)),
                ("filename".to_owned(), Value::Str(filename)),
            ]),
        ),
        (
            "null".to_owned(),
            Value::Block(vec![
                ("type".to_owned(), Value::Str("NullHandler".to_owned())),
                ("active".to_owned(), Value::Bool(false)),
                ("level".to_owned(), Value::Str("NOTSET".to_owned())),
            ]),
        ),
    ])
}

/// The default severity palette for the reserved color section.
#[must_use]
pub fn color_template() -> Vec<(String, Value)> {
    vec![
        (
            "CRITICAL".to_owned(),
            Value::Block(vec![
                ("color".to_owned(), Value::Str("PURPLE".to_owned())),
                ("style".to_owned(), Value::Str("BOLD".to_owned())),
            ]),
        ),
        ("ERROR".to_owned(), Value::Str("RED".to_owned())),
        ("WARNING".to_owned(), Value::Str("YELLOW".to_owned())),
        ("INFO".to_owned(), Value::None),
        ("DEBUG".to_owned(), Value::Str("GREEN".to_owned())),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block_field<'a>(entries: &'a [(String, Value)], key: &str, field: &str) -> &'a Value {
        let Some(Value::Block(fields)) = entries
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value)
        else {
            panic!("no '{key}' block");
        };
        &fields
            .iter()
            .find(|(name, _)| name == field)
            .unwrap_or_else(|| panic!("no '{field}' in '{key}'"))
            .1
    }

    #[test]
    fn defaults_produce_a_debug_console_setup() {
        let entries = logger_template(&TemplateOptions::new()).unwrap();

        assert_eq!(entries[0], ("level".to_owned(), Value::Str("DEBUG".to_owned())));
        assert_eq!(entries[1], ("formatter".to_owned(), Value::None));
        assert_eq!(block_field(&entries, "stream", "active"), &Value::Bool(true));
        assert_eq!(block_field(&entries, "file", "active"), &Value::Bool(false));
        assert_eq!(
            block_field(&entries, "file", "filename"),
            &Value::Str("mylogpath/foo.log".to_owned())
        );
        assert_eq!(
            block_field(&entries, "null", "level"),
            &Value::Str("NOTSET".to_owned())
        );
    }

    #[test]
    fn requested_level_reaches_every_handler_except_null() {
        let options = TemplateOptions::new().level("info");
        let entries = logger_template(&options).unwrap();

        assert_eq!(entries[0].1, Value::Str("INFO".to_owned()));
        assert_eq!(
            block_field(&entries, "stream", "level"),
            &Value::Str("INFO".to_owned())
        );
        assert_eq!(
            block_field(&entries, "file", "level"),
            &Value::Str("INFO".to_owned())
        );
        assert_eq!(
            block_field(&entries, "null", "level"),
            &Value::Str("NOTSET".to_owned())
        );
    }

    #[test]
    fn numeric_levels_are_accepted() {
        let options = TemplateOptions::new().level("20");
        let entries = logger_template(&options).unwrap();
        assert_eq!(entries[0].1, Value::Str("20".to_owned()));
    }

    #[test]
    fn unknown_levels_are_rejected_with_the_allowed_list() {
        let options = TemplateOptions::new().level("LOUD");
        let err = logger_template(&options).unwrap_err();

        let message = err.to_string();
        assert!(message.contains("'LOUD' is not allowed"));
        assert!(message.contains("critical"));
        assert!(message.contains("notset"));
    }

    #[test]
    fn formatter_and_filename_flow_into_the_template() {
        let options = TemplateOptions::new()
            .formatter("{name}: {message}")
            .filename("var/log/app.log");
        let entries = logger_template(&options).unwrap();

        assert_eq!(entries[1].1, Value::Str("{name}: {message}".to_owned()));
        assert_eq!(
            block_field(&entries, "file", "filename"),
            &Value::Str("var/log/app.log".to_owned())
        );
        // The file handler stays off even when a path was given.
        assert_eq!(block_field(&entries, "file", "active"), &Value::Bool(false));
    }

    #[test]
    fn the_color_template_styles_four_severities() {
        let entries = color_template();

        assert_eq!(entries.len(), 5);
        assert_eq!(
            block_field(&entries, "CRITICAL", "style"),
            &Value::Str("BOLD".to_owned())
        );
        assert_eq!(entries[3], ("INFO".to_owned(), Value::None));
    }
}
