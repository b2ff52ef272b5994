//! crates/core/src/handler.rs
//!
//! # Overview
//! The closed handler catalog and the handler runtime object. A handler pairs
//! an output sink with an effective level and a compiled formatter; records
//! at or above the level are formatted and written, everything else is
//! dropped without formatting.
//!
//! # Design
//! Handler kinds form a closed enum rather than an open class lookup:
//! configuration names are parsed once into [`HandlerKind`] and unknown names
//! fail fast as configuration errors. Construction validates every argument
//! for the kind, resolves defaults, and opens the destination eagerly (except
//! sockets, which connect lazily). The resolved arguments are kept in
//! canonical, sorted form so two handlers built from differently-spelled but
//! equivalent configuration compare equal by [`Fingerprint`].
//!
//! # Invariants
//! - Path-based kinds report [`HandlerKind::requires_path`] and never build
//!   without a resolved file path; parent directories are created on demand.
//! - Fingerprint argument lists are sorted by key and use canonical key
//!   spellings, so fingerprint equality is order- and alias-insensitive.
//!
//! # Errors
//! Unknown kind names surface as [`Error::InvalidConfig`]; bad or unexpected
//! arguments as [`Error::InvalidOption`]; a missing file path as
//! [`Error::MissingPath`]; destination I/O failures as [`Error::Io`].

use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::config::Value;
use crate::error::{Error, Result};
use crate::format::RecordFormatter;
use crate::record::Record;

use self::sink::{FileSink, RotatingSink, Sink, SocketSink, StreamTarget};

pub mod sink;

/// The closed set of handler kinds.
///
/// Configuration refers to kinds by name, either bare (`stream`) or with the
/// `Handler` suffix (`StreamHandler`); both spellings are accepted
/// case-insensitively and map to the same kind.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HandlerKind {
    /// Writes to a console stream (stderr by default).
    Stream,
    /// Writes to a file opened at construction.
    File,
    /// Writes to a file that rolls to numbered backups at a size threshold.
    RotatingFile,
    /// Sends formatted lines over TCP, connecting lazily.
    Socket,
    /// Discards every record.
    Null,
}

impl HandlerKind {
    /// Parse a configured kind name. Returns `None` for names outside the
    /// catalog.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        let lowered = name.to_ascii_lowercase();
        let bare = lowered.strip_suffix("handler").unwrap_or(&lowered);
        match bare {
            "stream" => Some(Self::Stream),
            "file" => Some(Self::File),
            "rotatingfile" | "rotating_file" | "rotating-file" => Some(Self::RotatingFile),
            "socket" => Some(Self::Socket),
            "null" => Some(Self::Null),
            _ => None,
        }
    }

    /// The canonical lowercase token for this kind.
    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::Stream => "stream",
            Self::File => "file",
            Self::RotatingFile => "rotatingfile",
            Self::Socket => "socket",
            Self::Null => "null",
        }
    }

    /// The suffixed type name as written in configuration files.
    #[must_use]
    pub const fn type_name(self) -> &'static str {
        match self {
            Self::Stream => "StreamHandler",
            Self::File => "FileHandler",
            Self::RotatingFile => "RotatingFileHandler",
            Self::Socket => "SocketHandler",
            Self::Null => "NullHandler",
        }
    }

    /// Whether this kind writes to a file and therefore needs a path.
    #[must_use]
    pub const fn requires_path(self) -> bool {
        matches!(self, Self::File | Self::RotatingFile)
    }

    /// Whether this kind writes to a console stream.
    #[must_use]
    pub const fn is_console(self) -> bool {
        matches!(self, Self::Stream)
    }
}

impl fmt::Display for HandlerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Opaque identity of one attached handler, unique within the process.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

fn next_handler_id() -> HandlerId {
    static NEXT: AtomicU64 = AtomicU64::new(1);
    HandlerId(NEXT.fetch_add(1, Ordering::Relaxed))
}

/// The identity of a handler's configuration, used to detect duplicates.
///
/// Two handlers are configuration-equivalent when they agree on kind, format
/// pattern, effective level, and every resolved constructor argument. Kinds
/// compare exactly: a `file` handler and a `rotatingfile` handler are never
/// equivalent, whatever their arguments.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fingerprint {
    /// Handler kind.
    pub kind: HandlerKind,
    /// Format pattern text.
    pub pattern: String,
    /// Effective numeric level.
    pub level: u32,
    /// Resolved constructor arguments, sorted by canonical key.
    pub args: Vec<(String, String)>,
}

/// One attached output destination with its own level and formatter.
#[derive(Debug)]
pub struct Handler {
    id: HandlerId,
    kind: HandlerKind,
    level: u32,
    formatter: RecordFormatter,
    args: Vec<(String, String)>,
    sink: Sink,
}

impl Handler {
    /// Build a handler of the named kind.
    ///
    /// Arguments are validated for the kind: unknown keys and malformed
    /// values are rejected, defaults are resolved, and file destinations are
    /// opened (creating missing parent directories first).
    pub fn build(
        kind_name: &str,
        level: u32,
        formatter: RecordFormatter,
        args: &[(String, Value)],
    ) -> Result<Self> {
        let Some(kind) = HandlerKind::parse(kind_name) else {
            return Err(Error::InvalidConfig(format!(
                "'{kind_name}' is not a known handler type"
            )));
        };
        let mut resolved: Vec<(String, String)> = Vec::new();
        let sink = match kind {
            HandlerKind::Stream => {
                let mut target = StreamTarget::Stderr;
                for (key, value) in args {
                    match key.as_str() {
                        "stream" => target = stream_arg(value)?,
                        other => return Err(unexpected_arg(kind, other)),
                    }
                }
                resolved.push(("stream".to_owned(), target.as_str().to_owned()));
                Sink::Console(target)
            }
            HandlerKind::File => {
                let mut filename: Option<PathBuf> = None;
                let mut append = true;
                for (key, value) in args {
                    match key.as_str() {
                        "filename" => filename = path_arg(value)?,
                        "mode" => append = mode_arg(value)?,
                        other => return Err(unexpected_arg(kind, other)),
                    }
                }
                let path = prepare_path(kind, filename)?;
                resolved.push(("filename".to_owned(), path.display().to_string()));
                resolved.push(("mode".to_owned(), if append { "a" } else { "w" }.to_owned()));
                Sink::File(FileSink::open(&path, append)?)
            }
            HandlerKind::RotatingFile => {
                let mut filename: Option<PathBuf> = None;
                let mut max_bytes = 0u64;
                let mut backup_count = 0u32;
                for (key, value) in args {
                    match key.as_str() {
                        "filename" => filename = path_arg(value)?,
                        "maxBytes" | "max_bytes" => max_bytes = numeric_arg("max_bytes", value)?,
                        "backupCount" | "backup_count" => {
                            backup_count = u32::try_from(numeric_arg("backup_count", value)?)
                                .map_err(|_| {
                                    Error::InvalidOption(
                                        "handler argument 'backup_count' is out of range"
                                            .to_owned(),
                                    )
                                })?;
                        }
                        other => return Err(unexpected_arg(kind, other)),
                    }
                }
                let path = prepare_path(kind, filename)?;
                resolved.push(("backup_count".to_owned(), backup_count.to_string()));
                resolved.push(("filename".to_owned(), path.display().to_string()));
                resolved.push(("max_bytes".to_owned(), max_bytes.to_string()));
                Sink::Rotating(RotatingSink::open(&path, max_bytes, backup_count)?)
            }
            HandlerKind::Socket => {
                let mut host: Option<String> = None;
                let mut port: Option<u16> = None;
                for (key, value) in args {
                    match key.as_str() {
                        "host" => host = Some(host_arg(value)?),
                        "port" => port = Some(port_arg(value)?),
                        other => return Err(unexpected_arg(kind, other)),
                    }
                }
                let (Some(host), Some(port)) = (host, port) else {
                    return Err(Error::InvalidOption(
                        "the 'socket' handler requires both 'host' and 'port'".to_owned(),
                    ));
                };
                resolved.push(("host".to_owned(), host.clone()));
                resolved.push(("port".to_owned(), port.to_string()));
                Sink::Socket(SocketSink::new(host, port))
            }
            HandlerKind::Null => {
                if let Some((key, _)) = args.first() {
                    return Err(unexpected_arg(kind, key));
                }
                Sink::Null
            }
        };
        resolved.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(Self {
            id: next_handler_id(),
            kind,
            level,
            formatter,
            args: resolved,
            sink,
        })
    }

    pub(crate) const fn id(&self) -> HandlerId {
        self.id
    }

    /// The handler's kind.
    #[must_use]
    pub const fn kind(&self) -> HandlerKind {
        self.kind
    }

    /// The handler's effective numeric level.
    #[must_use]
    pub const fn level(&self) -> u32 {
        self.level
    }

    /// The handler's format pattern text.
    #[must_use]
    pub fn pattern(&self) -> &str {
        self.formatter.pattern()
    }

    pub(crate) fn set_level(&mut self, level: u32) {
        self.level = level;
    }

    pub(crate) fn set_formatter(&mut self, formatter: RecordFormatter) {
        self.formatter = formatter;
    }

    /// The configuration identity used for duplicate detection.
    #[must_use]
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint {
            kind: self.kind,
            pattern: self.formatter.pattern().to_owned(),
            level: self.level,
            args: self.args.clone(),
        }
    }

    pub(crate) fn emit(&mut self, record: &Record<'_>) {
        if record.level < self.level {
            return;
        }
        let line = self.formatter.format(record);
        self.sink.write_line(&line);
    }
}

/// Whether an equivalently-configured handler is already attached.
#[must_use]
pub fn handler_exists(candidate: &Handler, attached: &[Handler]) -> bool {
    let fingerprint = candidate.fingerprint();
    attached
        .iter()
        .any(|handler| handler.fingerprint() == fingerprint)
}

fn unexpected_arg(kind: HandlerKind, key: &str) -> Error {
    Error::InvalidOption(format!(
        "unexpected argument '{key}' for the '{kind}' handler"
    ))
}

fn stream_arg(value: &Value) -> Result<StreamTarget> {
    let name = value.as_str().ok_or_else(|| {
        Error::InvalidOption("handler argument 'stream' must be a string".to_owned())
    })?;
    StreamTarget::parse(name).ok_or_else(|| {
        Error::InvalidOption(format!("'{name}' is not a valid stream; use stdout or stderr"))
    })
}

fn path_arg(value: &Value) -> Result<Option<PathBuf>> {
    match value {
        Value::None => Ok(None),
        Value::Str(path) => Ok(Some(PathBuf::from(path))),
        _ => Err(Error::InvalidOption(
            "handler argument 'filename' must be a string".to_owned(),
        )),
    }
}

fn mode_arg(value: &Value) -> Result<bool> {
    match value.as_str() {
        Some("a") => Ok(true),
        Some("w") => Ok(false),
        _ => Err(Error::InvalidOption(
            "handler argument 'mode' must be 'a' or 'w'".to_owned(),
        )),
    }
}

fn numeric_arg(key: &str, value: &Value) -> Result<u64> {
    let parsed = match value {
        Value::Int(number) => u64::try_from(*number).ok(),
        Value::Str(text) => text.parse().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| {
        Error::InvalidOption(format!(
            "handler argument '{key}' must be a non-negative integer"
        ))
    })
}

fn host_arg(value: &Value) -> Result<String> {
    value.as_str().map(str::to_owned).ok_or_else(|| {
        Error::InvalidOption("handler argument 'host' must be a string".to_owned())
    })
}

fn port_arg(value: &Value) -> Result<u16> {
    let parsed = match value {
        Value::Int(number) => u16::try_from(*number).ok(),
        Value::Str(text) => text.parse().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| Error::InvalidOption("handler argument 'port' must be a port number".to_owned()))
}

/// Resolve a configured path to an absolute one and make sure its parent
/// directory exists.
fn prepare_path(kind: HandlerKind, filename: Option<PathBuf>) -> Result<PathBuf> {
    let path = filename.ok_or(Error::MissingPath { kind: kind.token() })?;
    let path = std::path::absolute(&path).unwrap_or(path);
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(path)
}
