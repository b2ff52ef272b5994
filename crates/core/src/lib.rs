#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! crates/core/src/lib.rs
//!
//! # Overview
//!
//! `logrig-core` turns a declarative logging configuration — one named section
//! of a `logrig.ini` file, decoded into a [`config::RawConfig`] — into a live,
//! named [`facade::LoggerFacade`]: a logger with a deterministic set of
//! attached, deduplicated output handlers. The facade supports live
//! reconfiguration (adding handlers, overriding a single handler, replacing
//! the whole configuration) without ever leaking duplicate sinks.
//!
//! # Design
//!
//! Construction flows leaf to root: [`level`] resolves severity names,
//! [`format`] compiles `'{'`-style templates (optionally color-aware via
//! [`color`]), [`handler`] owns the closed catalog of handler kinds and their
//! sinks, and [`facade`] ties them to a shared named-logger state obtained
//! from an injectable [`registry::Registry`]. Handler identity is a
//! [`handler::Fingerprint`] — kind, formatter pattern, level, and every
//! primitive constructor argument — so re-applying a configuration never
//! attaches the same sink twice.
//!
//! # Invariants
//!
//! - A facade's logical-key bookkeeping stays in lock-step with the handlers
//!   attached to its shared logger state.
//! - Configuration errors abort facade construction entirely; no partially
//!   wired facade is ever returned.
//! - At most one facade is the authoritative owner of a registry name at a
//!   time; renaming removes the old entry instead of sharing it.
//!
//! # Errors
//!
//! All fallible operations return [`error::Error`], which carries the
//! offending name, value, or path in its message. Emit-time sink I/O is the
//! one deliberate exception: a logger that cannot write drops the record
//! rather than failing the logging call site.
//!
//! # Examples
//!
//! ```rust
//! use logrig_core::config::{RawConfig, Value};
//! use logrig_core::facade::LoggerFacade;
//!
//! # fn main() -> logrig_core::Result<()> {
//! let mut raw = RawConfig::new();
//! raw.push("level", "DEBUG");
//! raw.push("formatter", "{name} - {message}");
//! raw.push(
//!     "console",
//!     Value::Block(vec![
//!         ("type".to_owned(), "StreamHandler".into()),
//!         ("active".to_owned(), true.into()),
//!     ]),
//! );
//!
//! let logger = LoggerFacade::new("svc", raw, None)?;
//! logger.info("ready");
//! # Ok(())
//! # }
//! ```
//!
//! # See also
//!
//! - `logrig-conf` for reading and writing the `logrig.ini` file these
//!   configurations come from.

pub mod color;
pub mod config;
pub mod error;
pub mod facade;
pub mod format;
pub mod handler;
pub mod level;
pub mod record;
pub mod registry;

pub use color::{Color, ColorConfig, ColorSpec, Style};
pub use config::{LoggerConfig, Normalized, RawConfig, Value, normalize};
pub use error::{Error, Result};
pub use facade::{ConfigSource, HandlerRequest, HandlerView, LoggerFacade, ResetOptions};
pub use format::{FormatterSpec, RecordFormatter};
pub use handler::{Fingerprint, HandlerKind};
pub use level::{LevelSpec, level_name, resolve_level};
pub use record::Record;
pub use registry::{Registry, SharedLogger};
