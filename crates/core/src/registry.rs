//! crates/core/src/registry.rs
//!
//! # Overview
//! The logger repository. Logger state is stored once per name in a
//! [`Registry`] and shared between every facade constructed for that name,
//! so reconfiguring one facade is observed by all of them. A process-wide
//! default registry is available through [`Registry::global`], and an
//! isolated registry can be injected anywhere a facade is built, which keeps
//! tests hermetic.
//!
//! # Design
//! [`SharedLogger`] is an `Arc<Mutex<LoggerState>>`; the registry itself is a
//! mutex-guarded name map. Locks are held only for the duration of one
//! operation and poisoned locks are recovered rather than propagated, since
//! logger state stays consistent after a panicking writer.

use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use rustc_hash::FxHashMap;

use crate::handler::{Handler, HandlerId};
use crate::level::NOTSET;
use crate::record::Record;

/// Shared, lock-protected state of one named logger.
pub type SharedLogger = Arc<Mutex<LoggerState>>;

pub(crate) fn lock(logger: &SharedLogger) -> MutexGuard<'_, LoggerState> {
    logger.lock().unwrap_or_else(PoisonError::into_inner)
}

/// The live state behind a logger name: master level, enablement, and the
/// attached handlers.
#[derive(Debug)]
pub struct LoggerState {
    name: String,
    level: u32,
    disabled: bool,
    handlers: Vec<Handler>,
}

impl LoggerState {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            level: NOTSET,
            disabled: false,
            handlers: Vec::new(),
        }
    }

    /// The logger name this state belongs to.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The master level currently in effect.
    #[must_use]
    pub const fn level(&self) -> u32 {
        self.level
    }

    pub(crate) fn set_level(&mut self, level: u32) {
        self.level = level;
    }

    /// Whether emission is currently suppressed.
    #[must_use]
    pub const fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub(crate) fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    /// How many handlers are attached.
    #[must_use]
    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    pub(crate) fn handlers(&self) -> &[Handler] {
        &self.handlers
    }

    pub(crate) fn attach(&mut self, handler: Handler) -> HandlerId {
        let id = handler.id();
        self.handlers.push(handler);
        id
    }

    pub(crate) fn detach(&mut self, id: HandlerId) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|handler| handler.id() != id);
        self.handlers.len() != before
    }

    pub(crate) fn handler_mut(&mut self, id: HandlerId) -> Option<&mut Handler> {
        self.handlers.iter_mut().find(|handler| handler.id() == id)
    }

    pub(crate) fn find_equivalent(&self, candidate: &Handler) -> Option<HandlerId> {
        let fingerprint = candidate.fingerprint();
        self.handlers
            .iter()
            .find(|handler| handler.fingerprint() == fingerprint)
            .map(Handler::id)
    }

    pub(crate) fn log(&mut self, record: &Record<'_>) {
        if self.disabled || record.level < self.level {
            return;
        }
        for handler in &mut self.handlers {
            handler.emit(record);
        }
    }
}

/// A name-to-logger repository.
///
/// Facades default to the process-wide registry from [`Registry::global`];
/// passing a dedicated registry isolates a facade (and everything that shares
/// its logger name) from the rest of the process.
#[derive(Debug, Default)]
pub struct Registry {
    inner: Mutex<FxHashMap<String, SharedLogger>>,
}

impl Registry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide default registry.
    #[must_use]
    pub fn global() -> Arc<Self> {
        static GLOBAL: OnceLock<Arc<Registry>> = OnceLock::new();
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(Self::new())))
    }

    /// Look up the logger registered under `name`.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<SharedLogger> {
        let map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        map.get(name).map(Arc::clone)
    }

    /// Register `logger` under `name`, replacing any previous entry.
    pub fn register(&self, name: impl Into<String>, logger: SharedLogger) {
        let mut map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        map.insert(name.into(), logger);
    }

    /// Remove and return the logger registered under `name`.
    pub fn remove(&self, name: &str) -> Option<SharedLogger> {
        let mut map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        map.remove(name)
    }

    /// Fetch the logger for `name`, creating and registering a fresh one if
    /// the name is unknown.
    #[must_use]
    pub fn obtain(&self, name: &str) -> SharedLogger {
        let mut map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(
            map.entry(name.to_owned())
                .or_insert_with(|| Arc::new(Mutex::new(LoggerState::new(name)))),
        )
    }
}
