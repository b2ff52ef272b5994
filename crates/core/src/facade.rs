//! crates/core/src/facade.rs
//!
//! # Overview
//! [`LoggerFacade`] is the construction entry point and the live handle for a
//! configured logger. Building one normalizes the declared configuration,
//! resolves the master level and formatter, constructs every active handler
//! entry in declared order, and attaches the results to the shared state
//! registered under the logger name. The facade then supports live
//! reconfiguration: adding a handler, overriding a single handler's level or
//! formatter, moving the master level/formatter, or swapping the whole
//! configuration.
//!
//! # Design
//! The facade owns its configuration and a bookkeeping list mapping each
//! logical handler key to the identity of the attached handler. All mutating
//! operations take `&mut self`, so per-facade mutual exclusion is enforced by
//! ownership; the underlying logger state is additionally lock-protected
//! because facades for the same name share it. Emission and enable/disable
//! form a small closed forwarded surface — there is no open-ended
//! delegation, so an unsupported operation is a compile error at the call
//! site instead of a runtime fallback.
//!
//! # Invariants
//! - `handlers` bookkeeping stays in lock-step with the handlers attached to
//!   the shared state: construction records exactly the attached (or
//!   equivalently pre-existing) handler per active entry, and removal paths
//!   drop both sides together.
//! - Construction is all-or-nothing: every handler is built before any is
//!   attached, so a configuration error never leaves a partial attachment
//!   from that attempt.
//! - Replacing the configuration removes the old registry entry before
//!   re-registering, so a stale name never resurrects the previous handler
//!   set.
//!
//! # Errors
//! Operations surface [`Error`](crate::error::Error) variants matching the
//! failure: unknown sections and handler kinds as `InvalidConfig`, bad caller
//! arguments as `InvalidOption`, equivalent-handler collisions as
//! `DuplicatedHandler`, unknown logical keys as `HandlerNotFound`, and
//! missing file paths as `MissingPath`.

use std::sync::Arc;

use crate::color::ColorConfig;
use crate::config::{HandlerEntry, LoggerConfig, RawConfig, Value, normalize};
use crate::error::{Error, Result};
use crate::format::{FormatterSpec, RecordFormatter};
use crate::handler::{Fingerprint, Handler, HandlerId, HandlerKind};
use crate::level::{CRITICAL, DEBUG, ERROR, INFO, LevelSpec, WARNING, resolve_level};
use crate::record::Record;
use crate::registry::{self, Registry, SharedLogger};

/// External provider of persisted logging configuration.
///
/// Implemented by the configuration-file layer; the facade itself never
/// discovers configuration locations — callers pass a source explicitly
/// wherever one is needed.
pub trait ConfigSource {
    /// Load the named logger section as a raw configuration mapping.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] when `name` does not exist or names
    /// the reserved color section.
    fn logger_config(&self, name: &str) -> Result<RawConfig>;

    /// Load the color table, or `Ok(None)` when none is defined.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] when the color section cannot be
    /// decoded.
    fn color_config(&self) -> Result<Option<ColorConfig>>;
}

/// Options for [`LoggerFacade::add_handler`].
#[derive(Debug, Default)]
pub struct HandlerRequest {
    level: Option<LevelSpec>,
    formatter: Option<FormatterSpec>,
    args: Vec<(String, Value)>,
    allow_duplicate: bool,
    skip_duplicate: bool,
}

impl HandlerRequest {
    /// Start an empty request: master level and formatter, no arguments.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Give the handler its own level instead of the master level.
    #[must_use]
    pub fn level(mut self, level: impl Into<LevelSpec>) -> Self {
        self.level = Some(level.into());
        self
    }

    /// Give the handler its own formatter instead of the master formatter.
    #[must_use]
    pub fn formatter(mut self, formatter: impl Into<FormatterSpec>) -> Self {
        self.formatter = Some(formatter.into());
        self
    }

    /// Add a constructor argument (e.g. `filename`, `host`, `port`).
    #[must_use]
    pub fn arg(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.args.push((key.into(), value.into()));
        self
    }

    /// Attach even when an equivalently configured handler already exists.
    #[must_use]
    pub const fn allow_duplicate(mut self) -> Self {
        self.allow_duplicate = true;
        self
    }

    /// Quietly attach nothing when an equivalently configured handler
    /// already exists.
    #[must_use]
    pub const fn skip_duplicate(mut self) -> Self {
        self.skip_duplicate = true;
        self
    }
}

/// Options for [`LoggerFacade::reset_config`].
///
/// Exactly one of [`config`](Self::config) or
/// [`config_name`](Self::config_name) must be given; resolving a name
/// additionally needs a [`source`](Self::source).
#[derive(Default)]
pub struct ResetOptions<'a> {
    config: Option<RawConfig>,
    config_name: Option<String>,
    source: Option<&'a dyn ConfigSource>,
    name: Option<String>,
}

impl<'a> ResetOptions<'a> {
    /// Start an empty set of options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the configuration with a ready mapping.
    #[must_use]
    pub fn config(mut self, config: RawConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Replace the configuration by loading the named section from
    /// [`source`](Self::source).
    #[must_use]
    pub fn config_name(mut self, name: impl Into<String>) -> Self {
        self.config_name = Some(name.into());
        self
    }

    /// Where to resolve [`config_name`](Self::config_name).
    #[must_use]
    pub fn source(mut self, source: &'a dyn ConfigSource) -> Self {
        self.source = Some(source);
        self
    }

    /// Also rename the logger; the old name is dropped from the registry.
    #[must_use]
    pub fn rename(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// A snapshot of one attached handler, keyed by its logical name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HandlerView {
    /// The logical key the handler is registered under on this facade.
    pub key: String,
    /// Handler kind.
    pub kind: HandlerKind,
    /// Effective numeric level.
    pub level: u32,
    /// Format pattern text.
    pub pattern: String,
}

struct Parts {
    state: SharedLogger,
    handles: Vec<(String, HandlerId)>,
    master_level: u32,
}

/// A configured, named logger.
///
/// Construction wires every active handler entry declared in the
/// configuration; afterwards the facade emits records through the closed set
/// of severity operations ([`debug`](Self::debug) through
/// [`critical`](Self::critical)) and supports live reconfiguration. Facades
/// built for the same name against the same [`Registry`] share one underlying
/// logger state, so handlers attached by one are seen by all.
#[derive(Debug)]
pub struct LoggerFacade {
    name: String,
    config: LoggerConfig,
    colors: Option<ColorConfig>,
    registry: Arc<Registry>,
    state: SharedLogger,
    handlers: Vec<(String, HandlerId)>,
    master_level: u32,
}

impl LoggerFacade {
    /// Build a logger from a raw configuration mapping, registered in the
    /// process-wide default registry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] for malformed configuration shapes
    /// and unknown handler kinds, [`Error::InvalidOption`] for bad levels,
    /// formatters, colors, or handler arguments, [`Error::MissingPath`] when
    /// a file-backed handler lacks its path, and [`Error::Io`] when a file
    /// destination cannot be opened.
    pub fn new(name: &str, config: RawConfig, colors: Option<ColorConfig>) -> Result<Self> {
        Self::with_registry(name, config, colors, Registry::global())
    }

    /// Build a logger registered in an explicitly supplied registry.
    ///
    /// # Errors
    ///
    /// As for [`new`](Self::new).
    pub fn with_registry(
        name: &str,
        config: RawConfig,
        colors: Option<ColorConfig>,
        registry: Arc<Registry>,
    ) -> Result<Self> {
        let normalized = normalize(&config)?;
        let parts = Self::construct(&registry, name, &normalized.config, colors.as_ref())?;
        Ok(Self {
            name: name.to_owned(),
            config: normalized.config,
            colors,
            registry,
            state: parts.state,
            handlers: parts.handles,
            master_level: parts.master_level,
        })
    }

    /// Build a logger by loading the named section (and the color table)
    /// from a configuration source.
    ///
    /// # Errors
    ///
    /// As for [`new`](Self::new), plus whatever the source reports while
    /// loading.
    pub fn from_source(name: &str, section: &str, source: &dyn ConfigSource) -> Result<Self> {
        let config = source.logger_config(section)?;
        let colors = source.color_config()?;
        Self::new(name, config, colors)
    }

    fn construct(
        registry: &Registry,
        name: &str,
        config: &LoggerConfig,
        colors: Option<&ColorConfig>,
    ) -> Result<Parts> {
        let master_level = resolve_level(config.level.clone())?;

        // Build everything before attaching anything, so a bad entry cannot
        // leave a partial attachment behind.
        let mut built: Vec<(String, Handler)> = Vec::with_capacity(config.handlers.len());
        for entry in &config.handlers {
            if !entry.active {
                tracing::debug!(logger = name, key = %entry.key, "skipping inactive handler");
                continue;
            }
            let handler = Self::build_entry(entry, master_level, config.formatter.as_ref(), colors)?;
            built.push((entry.key.clone(), handler));
        }

        let state = registry.obtain(name);
        let mut guard = registry::lock(&state);
        guard.set_level(master_level);
        let mut handles = Vec::with_capacity(built.len());
        for (key, handler) in built {
            // Re-applying a configuration to an already-wired name reuses
            // the equivalent attached handler instead of doubling it.
            let id = match guard.find_equivalent(&handler) {
                Some(existing) => existing,
                None => guard.attach(handler),
            };
            handles.push((key, id));
        }
        drop(guard);

        tracing::debug!(logger = name, handlers = handles.len(), "configured logger");
        Ok(Parts {
            state,
            handles,
            master_level,
        })
    }

    fn build_entry(
        entry: &HandlerEntry,
        master_level: u32,
        master_formatter: Option<&FormatterSpec>,
        colors: Option<&ColorConfig>,
    ) -> Result<Handler> {
        let level = match &entry.level {
            Some(spec) => resolve_level(spec.clone())?,
            None => master_level,
        };
        let spec = entry.formatter.as_ref().or(master_formatter);
        let console = HandlerKind::parse(&entry.kind_name).is_some_and(HandlerKind::is_console);
        let palette = if console { colors } else { None };
        let formatter = RecordFormatter::new(spec, palette)?;
        Handler::build(&entry.kind_name, level, formatter, &entry.args)
    }

    /// The logger name this facade owns.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The master numeric level currently in effect.
    #[must_use]
    pub const fn master_level(&self) -> u32 {
        self.master_level
    }

    /// The master formatter declaration, if one is configured.
    #[must_use]
    pub fn master_formatter(&self) -> Option<&FormatterSpec> {
        self.config.formatter.as_ref()
    }

    /// Snapshots of the attached handlers, in logical-key order.
    #[must_use]
    pub fn handlers(&self) -> Vec<HandlerView> {
        let state = registry::lock(&self.state);
        self.handlers
            .iter()
            .filter_map(|(key, id)| {
                state
                    .handlers()
                    .iter()
                    .find(|handler| handler.id() == *id)
                    .map(|handler| HandlerView {
                        key: key.clone(),
                        kind: handler.kind(),
                        level: handler.level(),
                        pattern: handler.pattern().to_owned(),
                    })
            })
            .collect()
    }

    /// The configuration identity of each attached handler, keyed by its
    /// logical name.
    #[must_use]
    pub fn fingerprints(&self) -> Vec<(String, Fingerprint)> {
        let state = registry::lock(&self.state);
        self.handlers
            .iter()
            .filter_map(|(key, id)| {
                state
                    .handlers()
                    .iter()
                    .find(|handler| handler.id() == *id)
                    .map(|handler| (key.clone(), handler.fingerprint()))
            })
            .collect()
    }

    /// Attach one more handler under a new logical key.
    ///
    /// The key must be unused on this facade; that collision is fatal no
    /// matter which duplicate-handling flag is set. When an equivalently
    /// configured handler is already attached, the request's
    /// [`skip_duplicate`](HandlerRequest::skip_duplicate) flag turns the call
    /// into a quiet no-op and [`allow_duplicate`](HandlerRequest::allow_duplicate)
    /// attaches a second copy anyway.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOption`] for a reused key or bad arguments,
    /// [`Error::DuplicatedHandler`] when an equivalent handler exists and
    /// neither flag was set, and construction errors as for
    /// [`new`](Self::new).
    pub fn add_handler(&mut self, key: &str, kind: &str, request: HandlerRequest) -> Result<()> {
        if self.handlers.iter().any(|(existing, _)| existing == key) {
            return Err(Error::InvalidOption(format!(
                "a handler named '{key}' is already attached to this logger; pick a different name"
            )));
        }

        let level = match request.level {
            Some(spec) => resolve_level(spec)?,
            None => self.master_level,
        };
        let console = HandlerKind::parse(kind).is_some_and(HandlerKind::is_console);
        let spec = request.formatter.as_ref().or(self.config.formatter.as_ref());
        let palette = if console { self.colors.as_ref() } else { None };
        let formatter = RecordFormatter::new(spec, palette)?;
        let handler = Handler::build(kind, level, formatter, &request.args)?;

        let mut state = registry::lock(&self.state);
        if state.find_equivalent(&handler).is_some() {
            if request.skip_duplicate {
                tracing::debug!(
                    logger = %self.name,
                    key,
                    "skipping duplicate handler"
                );
                return Ok(());
            }
            if !request.allow_duplicate {
                return Err(Error::DuplicatedHandler(format!(
                    "the '{}' handler with the exact same configuration already exists, \
                     use allow_duplicate to attach it anyway",
                    handler.kind()
                )));
            }
        }
        let id = state.attach(handler);
        drop(state);
        self.handlers.push((key.to_owned(), id));
        tracing::debug!(logger = %self.name, key, kind, "attached handler");
        Ok(())
    }

    /// Override the level and/or formatter of one attached handler in place.
    ///
    /// The handler keeps exactly the values given here until the master
    /// level or formatter is moved again; propagation from a later master
    /// change still applies when the handler's declared entry carries no
    /// override of its own.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOption`] when neither `level` nor `formatter`
    /// is given (or a given value is invalid) and [`Error::HandlerNotFound`]
    /// for an unknown key.
    pub fn reconfig_handler(
        &mut self,
        key: &str,
        level: Option<LevelSpec>,
        formatter: Option<FormatterSpec>,
    ) -> Result<()> {
        if level.is_none() && formatter.is_none() {
            return Err(Error::InvalidOption(
                "set at least one of 'level' or 'formatter' for reconfiguration".to_owned(),
            ));
        }
        let Some(id) = self.handler_id(key) else {
            return Err(Error::HandlerNotFound(key.to_owned()));
        };
        let resolved = match level {
            Some(spec) => Some(resolve_level(spec)?),
            None => None,
        };

        let mut state = registry::lock(&self.state);
        let Some(handler) = state.handler_mut(id) else {
            return Err(Error::HandlerNotFound(key.to_owned()));
        };
        if let Some(level) = resolved {
            handler.set_level(level);
        }
        if let Some(spec) = formatter {
            let palette = if handler.kind().is_console() {
                self.colors.as_ref()
            } else {
                None
            };
            handler.set_formatter(RecordFormatter::new(Some(&spec), palette)?);
        }
        tracing::debug!(logger = %self.name, key, "reconfigured handler");
        Ok(())
    }

    /// Move the master level and re-propagate it.
    ///
    /// Every attached handler whose declared entry has no level override of
    /// its own takes the new level, including handlers whose level was since
    /// changed through [`reconfig_handler`](Self::reconfig_handler); handlers
    /// with a declared override, and handlers added at runtime, are left
    /// untouched.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOption`] for an unknown level name.
    pub fn set_master_level(&mut self, level: impl Into<LevelSpec>) -> Result<()> {
        let spec = level.into();
        let resolved = resolve_level(spec.clone())?;
        self.master_level = resolved;
        self.config.level = spec;

        let mut state = registry::lock(&self.state);
        state.set_level(resolved);
        for entry in &self.config.handlers {
            if entry.level.is_some() {
                continue;
            }
            let Some(id) = Self::lookup_key(&self.handlers, &entry.key) else {
                continue;
            };
            if let Some(handler) = state.handler_mut(id) {
                handler.set_level(resolved);
            }
        }
        Ok(())
    }

    /// Move the master formatter and re-propagate it.
    ///
    /// Propagation follows the same rule as [`set_master_level`](Self::set_master_level):
    /// only handlers whose declared entry has no formatter override take the
    /// new formatter, color-aware on console handlers when a color table is
    /// configured.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOption`] for a malformed template or a bad
    /// color name.
    pub fn set_master_formatter(&mut self, formatter: impl Into<FormatterSpec>) -> Result<()> {
        let spec = formatter.into();
        // Compile both flavors up front so a bad template fails before any
        // handler is touched.
        let plain = RecordFormatter::new(Some(&spec), None)?;
        let colored = match &self.colors {
            Some(colors) => Some(RecordFormatter::new(Some(&spec), Some(colors))?),
            None => None,
        };

        let mut state = registry::lock(&self.state);
        for entry in &self.config.handlers {
            if entry.formatter.is_some() {
                continue;
            }
            let Some(id) = Self::lookup_key(&self.handlers, &entry.key) else {
                continue;
            };
            if let Some(handler) = state.handler_mut(id) {
                let formatter = match (&colored, handler.kind().is_console()) {
                    (Some(colored), true) => colored.clone(),
                    _ => plain.clone(),
                };
                handler.set_formatter(formatter);
            }
        }
        drop(state);
        self.config.formatter = Some(spec);
        Ok(())
    }

    /// Replace the whole configuration, optionally renaming the logger.
    ///
    /// Every handler attached by this facade is detached and forgotten, the
    /// current name's registry entry is removed so it cannot resurrect the
    /// old handler set, and construction re-runs against the new
    /// configuration. A construction failure at that point leaves the facade
    /// with zero handlers; the error reports why.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOption`] unless exactly one of `config` and
    /// `config_name` is given (with a source to resolve the latter), plus
    /// construction errors as for [`new`](Self::new).
    pub fn reset_config(&mut self, options: ResetOptions<'_>) -> Result<()> {
        let ResetOptions {
            config,
            config_name,
            source,
            name,
        } = options;
        let raw = match (config, config_name) {
            (Some(_), Some(_)) => {
                return Err(Error::InvalidOption(
                    "pass only one of 'config' or 'config_name', not both".to_owned(),
                ));
            }
            (None, None) => {
                return Err(Error::InvalidOption(
                    "one of 'config' or 'config_name' is required".to_owned(),
                ));
            }
            (Some(raw), None) => raw,
            (None, Some(section)) => {
                let Some(source) = source else {
                    return Err(Error::InvalidOption(
                        "a configuration source is required to resolve 'config_name'".to_owned(),
                    ));
                };
                source.logger_config(&section)?
            }
        };
        let normalized = normalize(&raw)?;

        {
            let mut state = registry::lock(&self.state);
            for (_, id) in self.handlers.drain(..) {
                state.detach(id);
            }
        }
        self.registry.remove(&self.name);
        if let Some(new_name) = name {
            tracing::debug!(from = %self.name, to = %new_name, "renaming logger");
            self.name = new_name;
        }

        let parts = Self::construct(
            &self.registry,
            &self.name,
            &normalized.config,
            self.colors.as_ref(),
        )?;
        self.state = parts.state;
        self.handlers = parts.handles;
        self.master_level = parts.master_level;
        self.config = normalized.config;
        Ok(())
    }

    fn handler_id(&self, key: &str) -> Option<HandlerId> {
        Self::lookup_key(&self.handlers, key)
    }

    fn lookup_key(handles: &[(String, HandlerId)], key: &str) -> Option<HandlerId> {
        handles
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, id)| *id)
    }

    /// Emit a debug-severity record.
    pub fn debug(&self, message: &str) {
        self.emit(DEBUG, message);
    }

    /// Emit an info-severity record.
    pub fn info(&self, message: &str) {
        self.emit(INFO, message);
    }

    /// Emit a warning-severity record.
    pub fn warning(&self, message: &str) {
        self.emit(WARNING, message);
    }

    /// Emit an error-severity record.
    pub fn error(&self, message: &str) {
        self.emit(ERROR, message);
    }

    /// Emit a critical-severity record.
    pub fn critical(&self, message: &str) {
        self.emit(CRITICAL, message);
    }

    /// Resume emission after [`disable`](Self::disable).
    pub fn enable(&self) {
        registry::lock(&self.state).set_disabled(false);
    }

    /// Suppress all emission until [`enable`](Self::enable) is called.
    pub fn disable(&self) {
        registry::lock(&self.state).set_disabled(true);
    }

    fn emit(&self, level: u32, message: &str) {
        let record = Record::new(&self.name, level, message);
        registry::lock(&self.state).log(&record);
    }
}
