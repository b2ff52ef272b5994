//! crates/conf/src/ini.rs
//!
//! # Overview
//! A minimal INI document model matching the dialect `logrig.ini` uses:
//! `[section]` headers, `key = value` entries (a `:` delimiter is accepted on
//! read), `#`/`;` comment lines, and multi-line values continued on indented
//! lines. Section and key case is preserved exactly; declaration order is
//! preserved for round-tripping.
//!
//! # Design
//! The model stores raw strings only. Handler sub-blocks arrive here as one
//! value whose first line is blank and whose remaining lines are
//! `key: value` pairs joined by newlines; decoding those into typed values is
//! the codec's job, not the document's.
//!
//! # Invariants
//! - Rendering a parsed document and re-parsing it yields an equal document.
//! - Duplicate section headers and duplicate keys within a section are parse
//!   errors, never silently merged.

use crate::error::{Error, Result};

/// One `[name]` section with its entries in declaration order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Section {
    /// Section name, case preserved.
    pub name: String,
    /// Raw key/value entries; multi-line values contain embedded newlines.
    pub entries: Vec<(String, String)>,
}

impl Section {
    /// An empty section.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    /// The raw value stored under `key`, if any.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }
}

/// A whole configuration file, sections in declaration order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Document {
    sections: Vec<Section>,
}

impl Document {
    /// An empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse INI text into a document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Syntax`] for unterminated headers, entries outside
    /// any section, continuation lines without an entry, and lines with no
    /// delimiter; [`Error::DuplicateSection`] and [`Error::DuplicateKey`]
    /// for repeats.
    pub fn parse(text: &str) -> Result<Self> {
        let mut document = Self::new();
        for (index, raw_line) in text.lines().enumerate() {
            let number = index + 1;
            let line = raw_line.trim_end();
            if line.trim().is_empty() {
                continue;
            }

            // Comments may be indented, so check before continuation handling.
            if matches!(line.trim_start().chars().next(), Some('#' | ';')) {
                continue;
            }

            if line.starts_with(char::is_whitespace) {
                // Continuation of the previous entry's value.
                let Some((_, value)) = document
                    .sections
                    .last_mut()
                    .and_then(|section| section.entries.last_mut())
                else {
                    return Err(Error::Syntax {
                        line: number,
                        message: "continuation line without a preceding entry".to_owned(),
                    });
                };
                value.push('\n');
                value.push_str(line.trim());
                continue;
            }

            if let Some(rest) = line.strip_prefix('[') {
                let Some(name) = rest.strip_suffix(']') else {
                    return Err(Error::Syntax {
                        line: number,
                        message: format!("unterminated section header '{line}'"),
                    });
                };
                let name = name.trim();
                if document.has_section(name) {
                    return Err(Error::DuplicateSection(name.to_owned()));
                }
                document.sections.push(Section::new(name));
                continue;
            }

            let Some((key, value)) = split_entry(line) else {
                return Err(Error::Syntax {
                    line: number,
                    message: format!("expected 'key = value', found '{line}'"),
                });
            };
            let Some(section) = document.sections.last_mut() else {
                return Err(Error::Syntax {
                    line: number,
                    message: format!("entry '{key}' appears before any section header"),
                });
            };
            if section.get(key).is_some() {
                return Err(Error::DuplicateKey {
                    section: section.name.clone(),
                    key: key.to_owned(),
                });
            }
            section.entries.push((key.to_owned(), value.to_owned()));
        }
        Ok(document)
    }

    /// Render the document back to INI text.
    ///
    /// Multi-line values are written as an empty first line followed by
    /// tab-indented continuation lines, the layout the decoder expects.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        for section in &self.sections {
            out.push('[');
            out.push_str(&section.name);
            out.push_str("]\n");
            for (key, value) in &section.entries {
                out.push_str(key);
                out.push_str(" = ");
                let mut lines = value.split('\n');
                if let Some(head) = lines.next() {
                    out.push_str(head);
                }
                for line in lines {
                    out.push_str("\n\t");
                    out.push_str(line);
                }
                out.push('\n');
            }
            out.push('\n');
        }
        out
    }

    /// Whether a section with this exact name exists.
    #[must_use]
    pub fn has_section(&self, name: &str) -> bool {
        self.sections.iter().any(|section| section.name == name)
    }

    /// The section with this exact name, if any.
    #[must_use]
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|section| section.name == name)
    }

    /// Mutable access to the section with this exact name.
    pub fn section_mut(&mut self, name: &str) -> Option<&mut Section> {
        self.sections.iter_mut().find(|section| section.name == name)
    }

    /// Append a section to the end of the document.
    pub fn push_section(&mut self, section: Section) {
        self.sections.push(section);
    }

    /// Remove the named section; reports whether anything was removed.
    pub fn remove_section(&mut self, name: &str) -> bool {
        let before = self.sections.len();
        self.sections.retain(|section| section.name != name);
        self.sections.len() != before
    }

    /// Section names in declaration order.
    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(|section| section.name.as_str())
    }

    /// Whether the document has no sections at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

/// Split a top-level entry line on its first `=` or `:` delimiter.
fn split_entry(line: &str) -> Option<(&str, &str)> {
    let delimiter = line.find(['=', ':'])?;
    let (key, rest) = line.split_at(delimiter);
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    Some((key, rest[1..].trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
[colors]
CRITICAL =
\tcolor: PURPLE
\tstyle: BOLD
ERROR = RED

[logrig]
level = DEBUG
formatter = None
stream =
\ttype: StreamHandler
\tactive: True
\tlevel: DEBUG
";

    #[test]
    fn parses_sections_entries_and_blocks() {
        let document = Document::parse(SAMPLE).unwrap();

        assert_eq!(document.section_names().collect::<Vec<_>>(), [
            "colors", "logrig"
        ]);
        let colors = document.section("colors").unwrap();
        assert_eq!(
            colors.get("CRITICAL"),
            Some("\ncolor: PURPLE\nstyle: BOLD")
        );
        assert_eq!(colors.get("ERROR"), Some("RED"));

        let logrig = document.section("logrig").unwrap();
        assert_eq!(logrig.get("level"), Some("DEBUG"));
        assert_eq!(
            logrig.get("stream"),
            Some("\ntype: StreamHandler\nactive: True\nlevel: DEBUG")
        );
    }

    #[test]
    fn render_and_reparse_round_trips() {
        let document = Document::parse(SAMPLE).unwrap();
        let rendered = document.render();
        let reparsed = Document::parse(&rendered).unwrap();
        assert_eq!(document, reparsed);
    }

    #[test]
    fn comments_and_blank_lines_are_skipped() {
        let text = "# top comment\n\n[only]\n; aside\n\t# indented too\nkey = value\n";
        let document = Document::parse(text).unwrap();
        assert_eq!(document.section("only").unwrap().get("key"), Some("value"));
    }

    #[test]
    fn colon_delimited_entries_parse_too() {
        let document = Document::parse("[s]\nkey: value\n").unwrap();
        assert_eq!(document.section("s").unwrap().get("key"), Some("value"));
    }

    #[test]
    fn section_and_key_case_is_preserved() {
        let document = Document::parse("[Main]\nFileHandler = x\n").unwrap();
        assert!(document.has_section("Main"));
        assert!(!document.has_section("main"));
        assert_eq!(document.section("Main").unwrap().get("FileHandler"), Some("x"));
    }

    #[test]
    fn orphan_entries_and_continuations_are_rejected() {
        let err = Document::parse("key = value\n").unwrap_err();
        assert!(matches!(err, Error::Syntax { line: 1, .. }));

        let err = Document::parse("\tdangling: line\n").unwrap_err();
        assert!(matches!(err, Error::Syntax { line: 1, .. }));
    }

    #[test]
    fn missing_delimiters_are_syntax_errors() {
        let err = Document::parse("[s]\njust some words\n").unwrap_err();
        assert!(matches!(err, Error::Syntax { line: 2, .. }));
    }

    #[test]
    fn duplicate_sections_and_keys_are_rejected() {
        let err = Document::parse("[s]\n[s]\n").unwrap_err();
        assert!(matches!(err, Error::DuplicateSection(name) if name == "s"));

        let err = Document::parse("[s]\nkey = 1\nkey = 2\n").unwrap_err();
        assert!(matches!(err, Error::DuplicateKey { key, .. } if key == "key"));
    }

    #[test]
    fn unterminated_headers_are_syntax_errors() {
        let err = Document::parse("[broken\n").unwrap_err();
        assert!(matches!(err, Error::Syntax { line: 1, .. }));
    }

    #[test]
    fn removal_reports_whether_a_section_existed() {
        let mut document = Document::parse("[a]\n[b]\n").unwrap();
        assert!(document.remove_section("a"));
        assert!(!document.remove_section("a"));
        assert_eq!(document.section_names().collect::<Vec<_>>(), ["b"]);
    }
}
