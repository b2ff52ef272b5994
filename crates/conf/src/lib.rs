#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! crates/conf/src/lib.rs
//!
//! # Overview
//!
//! `logrig-conf` is the file layer under `logrig-core`: it reads and writes
//! `logrig.ini`, decodes sections into the core crate's configuration model,
//! and implements the editing operations the command-line tools perform —
//! creating a file from templates, adding and removing logger sections, and
//! upgrading legacy-layout files in place.
//!
//! # Design
//!
//! [`ini`] models the file as ordered sections of raw strings; [`codec`]
//! converts those strings to and from typed [`Value`](logrig_core::Value)s;
//! [`loader::ConfigFile`] combines both behind the operations callers use
//! and implements [`ConfigSource`](logrig_core::ConfigSource) so a facade
//! can be built straight from a file. [`discover`] finds the nearest file
//! from an explicit starting path; [`template`] and [`upgrade`] back the
//! `init`, `add`, and `upgrade` commands.
//!
//! # Errors
//!
//! File-shape problems are [`error::Error`] variants carrying the path or
//! section name; content problems inside a section surface from
//! `logrig-core` once the decoded configuration is used. The conversion
//! into [`logrig_core::Error`] keeps facade-facing signatures uniform.
//!
//! # Examples
//!
//! ```no_run
//! use logrig_conf::{discover, loader::ConfigFile};
//! use logrig_core::facade::LoggerFacade;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let file = ConfigFile::load(discover::find_config(".")?)?;
//! let logger = LoggerFacade::from_source("svc", "logrig", &file)?;
//! logger.info("configured from disk");
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod discover;
pub mod error;
pub mod ini;
pub mod loader;
pub mod template;
pub mod upgrade;

pub use discover::{FILE_NAME, find_config, load_config};
pub use error::{Error, Result};
pub use loader::{COLOR_SECTION, ConfigFile, MASTER_SECTION};
pub use template::{TemplateOptions, color_template, logger_template};
pub use upgrade::upgrade_config;
