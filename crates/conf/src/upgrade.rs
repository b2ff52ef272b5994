//! crates/conf/src/upgrade.rs
//!
//! Rewrites legacy-layout configuration files in place. The legacy layout
//! named each handler after its type (`FileHandler = ...`); the current
//! layout uses a free logical key plus an explicit `type` field. Upgrading
//! derives the new key by stripping `Handler` from the old one and
//! lowercasing the rest, then records the old key as the `type`.
//!
//! The reserved color section is left untouched; its keys are severity
//! names, not handler types.

use logrig_core::Value;

use crate::error::Result;
use crate::loader::{COLOR_SECTION, ConfigFile};

/// Upgrade every logger section of `file` in memory.
///
/// Returns the number of handler entries that were re-keyed; the caller
/// decides when to [`save`](ConfigFile::save).
///
/// # Errors
///
/// Returns decode errors for sections the file layer cannot read back.
pub fn upgrade_config(file: &mut ConfigFile) -> Result<usize> {
    let names: Vec<String> = file.section_names().map(str::to_owned).collect();
    let mut renamed = 0;

    for name in names {
        if name == COLOR_SECTION {
            continue;
        }
        let raw = file.raw_section(&name)?;
        let (entries, count) = upgrade_entries(&raw.entries);
        if count > 0 {
            tracing::debug!(section = %name, entries = count, "re-keyed legacy handlers");
            file.set_section(&name, &entries)?;
            renamed += count;
        }
    }

    Ok(renamed)
}

/// Upgrade one section's entries, returning the new entries and how many
/// handler blocks were re-keyed.
#[must_use]
pub fn upgrade_entries(entries: &[(String, Value)]) -> (Vec<(String, Value)>, usize) {
    let mut out: Vec<(String, Value)> = Vec::with_capacity(entries.len());
    let mut renamed = 0;

    for (key, value) in entries {
        match value {
            Value::Block(fields) if !has_type(fields) => {
                let new_key = key.replace("Handler", "").to_lowercase();
                let mut fields = fields.clone();
                fields.push(("type".to_owned(), Value::Str(key.clone())));
                upsert(&mut out, new_key, Value::Block(fields));
                renamed += 1;
            }
            other => upsert(&mut out, key.clone(), other.clone()),
        }
    }

    (out, renamed)
}

fn has_type(fields: &[(String, Value)]) -> bool {
    fields.iter().any(|(field, _)| field == "type")
}

/// Keep the position of a key's first appearance, the value of its last.
fn upsert(entries: &mut Vec<(String, Value)>, key: String, value: Value) {
    if let Some(slot) = entries.iter_mut().find(|(name, _)| *name == key) {
        slot.1 = value;
    } else {
        entries.push((key, value));
    }
}
