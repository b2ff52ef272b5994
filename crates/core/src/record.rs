//! crates/core/src/record.rs
//!
//! The in-flight log record handed to handlers.

use time::OffsetDateTime;

/// One log event on its way through a logger's handlers.
///
/// Records borrow their payload; nothing is cloned until a handler actually
/// formats the line.
#[derive(Clone, Copy, Debug)]
pub struct Record<'a> {
    /// The emitting logger's name.
    pub name: &'a str,
    /// Numeric severity of the event.
    pub level: u32,
    /// The caller's message, verbatim.
    pub message: &'a str,
    /// When the record was created.
    pub created: OffsetDateTime,
}

impl<'a> Record<'a> {
    /// Build a record timestamped now.
    ///
    /// Local time is preferred; when the local UTC offset cannot be
    /// determined the timestamp falls back to UTC.
    #[must_use]
    pub fn new(name: &'a str, level: u32, message: &'a str) -> Self {
        Self {
            name,
            level,
            message,
            created: OffsetDateTime::now_local()
                .unwrap_or_else(|_| OffsetDateTime::now_utc()),
        }
    }
}
