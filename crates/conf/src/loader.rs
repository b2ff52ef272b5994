//! crates/conf/src/loader.rs
//!
//! # Overview
//! [`ConfigFile`] couples a parsed [`Document`](crate::ini::Document) with
//! the path it came from and exposes the operations the rest of the stack
//! needs: reading logger sections as typed configurations, reading the
//! reserved color table, and editing sections for the command-line tools.
//!
//! # Design
//! The file is read once and edited in memory; [`ConfigFile::save`] writes
//! the whole document back. The `colors` section is reserved for the color
//! table and is never served as a logger configuration.
//!
//! # Errors
//! File-shape problems surface as [`Error`] variants here; content problems
//! inside a section surface later, from the core crate, when the decoded
//! configuration is actually used.

use std::fs;
use std::path::{Path, PathBuf};

use logrig_core::{ColorConfig, ConfigSource, RawConfig, Value};

use crate::codec::{decode_section, encode_section};
use crate::error::{Error, Result};
use crate::ini::Document;

/// The section name reserved for the color table.
pub const COLOR_SECTION: &str = "colors";

/// The master section every valid configuration file must carry.
pub const MASTER_SECTION: &str = "logrig";

/// A configuration file held in memory, with its origin path.
#[derive(Clone, Debug)]
pub struct ConfigFile {
    path: PathBuf,
    document: Document,
}

impl ConfigFile {
    /// Read and parse the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] when the file cannot be read,
    /// [`Error::NotAConfig`] when it parses to zero sections, and parse
    /// errors otherwise.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let text = fs::read_to_string(&path)?;
        let document = Document::parse(&text)?;
        if document.is_empty() {
            return Err(Error::NotAConfig { path });
        }
        Ok(Self { path, document })
    }

    /// An empty in-memory file that will be written to `path`.
    #[must_use]
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            document: Document::new(),
        }
    }

    /// The path this file was loaded from or will be saved to.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Section names in declaration order, the color table included.
    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.document.section_names()
    }

    /// Whether a section with this exact name exists.
    #[must_use]
    pub fn has_section(&self, name: &str) -> bool {
        self.document.has_section(name)
    }

    /// Decode the named logger section.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ReservedSection`] for the color table,
    /// [`Error::MissingSection`] when the name does not exist, and decode
    /// errors otherwise.
    pub fn logger_section(&self, name: &str) -> Result<RawConfig> {
        if name == COLOR_SECTION {
            return Err(Error::ReservedSection(name.to_owned()));
        }
        let section = self
            .document
            .section(name)
            .ok_or_else(|| Error::MissingSection(name.to_owned()))?;
        decode_section(section)
    }

    /// Decode the color table, or `Ok(None)` when the file has none.
    ///
    /// # Errors
    ///
    /// Returns decode errors for malformed color entries.
    pub fn colors(&self) -> Result<Option<ColorConfig>> {
        let Some(section) = self.document.section(COLOR_SECTION) else {
            return Ok(None);
        };
        let raw = decode_section(section)?;
        let config = ColorConfig::from_entries(&raw.entries).map_err(Error::from)?;
        Ok(Some(config))
    }

    /// Decode any section by name, the color table included.
    ///
    /// The upgrade tool uses this to walk every section regardless of role.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingSection`] when the name does not exist.
    pub fn raw_section(&self, name: &str) -> Result<RawConfig> {
        let section = self
            .document
            .section(name)
            .ok_or_else(|| Error::MissingSection(name.to_owned()))?;
        decode_section(section)
    }

    /// Replace the named section's entries, or append the section if new.
    ///
    /// # Errors
    ///
    /// Returns encode errors for values the file format cannot represent.
    pub fn set_section(&mut self, name: &str, entries: &[(String, Value)]) -> Result<()> {
        let encoded = encode_section(name, entries)?;
        match self.document.section_mut(name) {
            Some(section) => section.entries = encoded.entries,
            None => self.document.push_section(encoded),
        }
        Ok(())
    }

    /// Append a new section, refusing to touch an existing one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SectionExists`] when the name is already present.
    pub fn add_section(&mut self, name: &str, entries: &[(String, Value)]) -> Result<()> {
        if self.document.has_section(name) {
            return Err(Error::SectionExists {
                name: name.to_owned(),
                path: self.path.clone(),
            });
        }
        self.document.push_section(encode_section(name, entries)?);
        Ok(())
    }

    /// Remove the named section.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingSection`] when the name does not exist.
    pub fn remove_section(&mut self, name: &str) -> Result<()> {
        if self.document.remove_section(name) {
            Ok(())
        } else {
            Err(Error::MissingSection(name.to_owned()))
        }
    }

    /// Rename a section in place, keeping its position and entries.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingSection`] when `from` does not exist and
    /// [`Error::SectionExists`] when `to` already does.
    pub fn rename_section(&mut self, from: &str, to: &str) -> Result<()> {
        if self.document.has_section(to) {
            return Err(Error::SectionExists {
                name: to.to_owned(),
                path: self.path.clone(),
            });
        }
        let section = self
            .document
            .section_mut(from)
            .ok_or_else(|| Error::MissingSection(from.to_owned()))?;
        section.name = to.to_owned();
        Ok(())
    }

    /// Write the document back to its path.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] when the file cannot be written.
    pub fn save(&self) -> Result<()> {
        fs::write(&self.path, self.document.render())?;
        tracing::debug!(path = %self.path.display(), "wrote configuration");
        Ok(())
    }
}

impl ConfigSource for ConfigFile {
    fn logger_config(&self, name: &str) -> logrig_core::Result<RawConfig> {
        self.logger_section(name).map_err(Into::into)
    }

    fn color_config(&self) -> logrig_core::Result<Option<ColorConfig>> {
        self.colors().map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::TempDir;

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

    fn write_sample(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("logrig.ini");
        fs::write(&path, SAMPLE).unwrap();
        path
    }

    #[test]
    fn loads_and_serves_logger_sections() {
        let dir = TempDir::new().unwrap();
        let file = ConfigFile::load(write_sample(&dir)).unwrap();

        let raw = file.logger_section("logrig").unwrap();
        assert_eq!(raw.entries[0].0, "level");
        assert!(matches!(raw.entries[2].1, Value::Block(_)));
    }

    #[test]
    fn the_color_section_is_not_a_logger() {
        let dir = TempDir::new().unwrap();
        let file = ConfigFile::load(write_sample(&dir)).unwrap();

        let err = file.logger_section("colors").unwrap_err();
        assert!(matches!(err, Error::ReservedSection(_)));
        assert!(err.to_string().contains("color table"));
    }

    #[test]
    fn missing_sections_are_reported_by_name() {
        let dir = TempDir::new().unwrap();
        let file = ConfigFile::load(write_sample(&dir)).unwrap();

        let err = file.logger_section("ghost").unwrap_err();
        assert!(err.to_string().contains("'ghost'"));
    }

    #[test]
    fn colors_decode_to_a_table() {
        let dir = TempDir::new().unwrap();
        let file = ConfigFile::load(write_sample(&dir)).unwrap();

        let colors = file.colors().unwrap().unwrap();
        let critical = colors.get("critical").unwrap();
        assert_eq!(critical.color.as_deref(), Some("PURPLE"));
        assert_eq!(critical.style.as_deref(), Some("BOLD"));
        assert_eq!(
            colors.get("error").and_then(|s| s.color.as_deref()),
            Some("RED")
        );
    }

    #[test]
    fn files_without_colors_serve_none() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("logrig.ini");
        fs::write(&path, "[logrig]\nlevel = DEBUG\n").unwrap();

        let file = ConfigFile::load(&path).unwrap();
        assert!(file.colors().unwrap().is_none());
    }

    #[test]
    fn sectionless_files_are_not_configs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("logrig.ini");
        fs::write(&path, "# just a comment\n").unwrap();

        let err = ConfigFile::load(&path).unwrap_err();
        assert!(matches!(err, Error::NotAConfig { .. }));
        assert!(err.to_string().contains("not a valid config file"));
    }

    #[test]
    fn saved_edits_survive_a_reload() {
        let dir = TempDir::new().unwrap();
        let path = write_sample(&dir);

        let mut file = ConfigFile::load(&path).unwrap();
        file.add_section(
            "worker",
            &[
                ("level".to_owned(), Value::Str("INFO".to_owned())),
                (
                    "stream".to_owned(),
                    Value::Block(vec![
                        ("type".to_owned(), Value::Str("StreamHandler".to_owned())),
                        ("active".to_owned(), Value::Bool(true)),
                    ]),
                ),
            ],
        )
        .unwrap();
        file.save().unwrap();

        let reloaded = ConfigFile::load(&path).unwrap();
        let raw = reloaded.logger_section("worker").unwrap();
        assert_eq!(raw.entries.len(), 2);
        assert!(matches!(raw.entries[1].1, Value::Block(_)));
    }

    #[test]
    fn adding_an_existing_section_is_refused() {
        let dir = TempDir::new().unwrap();
        let mut file = ConfigFile::load(write_sample(&dir)).unwrap();

        let err = file.add_section("logrig", &[]).unwrap_err();
        assert!(matches!(err, Error::SectionExists { .. }));
        assert!(err.to_string().contains("'logrig' already exists"));
    }

    #[test]
    fn removal_requires_the_section_to_exist() {
        let dir = TempDir::new().unwrap();
        let mut file = ConfigFile::load(write_sample(&dir)).unwrap();

        assert!(file.remove_section("ghost").is_err());
        file.remove_section("colors").unwrap();
        assert!(!file.has_section("colors"));
    }

    #[test]
    fn renames_keep_position_and_entries() {
        let dir = TempDir::new().unwrap();
        let mut file = ConfigFile::load(write_sample(&dir)).unwrap();

        file.rename_section("logrig", "app").unwrap();
        assert_eq!(
            file.section_names().collect::<Vec<_>>(),
            ["colors", "app"]
        );
        assert!(file.logger_section("app").is_ok());

        assert!(file.rename_section("ghost", "other").is_err());
        assert!(file.rename_section("app", "colors").is_err());
    }

    #[test]
    fn serves_the_facade_as_a_config_source() {
        let dir = TempDir::new().unwrap();
        let file = ConfigFile::load(write_sample(&dir)).unwrap();
        let source: &dyn ConfigSource = &file;

        assert!(source.logger_config("logrig").is_ok());
        assert!(source.logger_config("colors").is_err());
        assert!(source.color_config().unwrap().is_some());
    }
}
