//! crates/conf/src/codec.rs
//!
//! Conversions between the raw strings the INI layer stores and the typed
//! [`Value`] model the core crate consumes.
//!
//! The encoding is the historical one: scalars are spelled as-is with
//! `True`/`False`/`None` capitalized, and a handler block is a value whose
//! first line is blank and whose remaining lines are `key: value` pairs.
//! Scalar decoding recognizes the three keywords and unsigned integers;
//! everything else stays a string.

use logrig_core::{RawConfig, Value};

use crate::error::Result;
use crate::ini::Section;

/// Decode one raw INI value into a [`Value`].
///
/// Values starting with a newline are blocks; `key` only feeds error
/// messages.
///
/// # Errors
///
/// Returns an error when a block line has no `:` delimiter.
pub fn decode_value(key: &str, raw: &str) -> Result<Value> {
    if let Some(body) = raw.strip_prefix('\n') {
        let mut fields = Vec::new();
        for line in body.lines() {
            if line.trim().is_empty() {
                continue;
            }
            let Some((field, value)) = line.split_once(':') else {
                return Err(logrig_core::Error::InvalidConfig(format!(
                    "line '{line}' in the '{key}' block is not a 'key: value' pair"
                ))
                .into());
            };
            fields.push((field.trim().to_owned(), decode_scalar(value.trim())));
        }
        return Ok(Value::Block(fields));
    }
    Ok(decode_scalar(raw))
}

/// Decode a scalar spelling into a [`Value`].
#[must_use]
pub fn decode_scalar(raw: &str) -> Value {
    match raw {
        "True" => Value::Bool(true),
        "False" => Value::Bool(false),
        "None" => Value::None,
        digits
            if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) =>
        {
            digits
                .parse::<i64>()
                .map_or_else(|_| Value::Str(raw.to_owned()), Value::Int)
        }
        other => Value::Str(other.to_owned()),
    }
}

/// Spell a [`Value`] the way the file stores it.
///
/// # Errors
///
/// Returns an error for a block nested inside another block; the file
/// format only supports one level of nesting.
pub fn encode_value(key: &str, value: &Value) -> Result<String> {
    match value {
        Value::Block(fields) => {
            let mut out = String::new();
            for (field, field_value) in fields {
                if matches!(field_value, Value::Block(_)) {
                    return Err(logrig_core::Error::InvalidConfig(format!(
                        "the '{field}' field of the '{key}' block is itself a \
                         block; blocks cannot nest"
                    ))
                    .into());
                }
                out.push('\n');
                out.push_str(field);
                out.push_str(": ");
                out.push_str(&field_value.spelled());
            }
            Ok(out)
        }
        scalar => Ok(scalar.spelled()),
    }
}

/// Decode a whole section into a [`RawConfig`], declared order preserved.
///
/// # Errors
///
/// Returns an error when any value fails [`decode_value`].
pub fn decode_section(section: &Section) -> Result<RawConfig> {
    let mut raw = RawConfig::new();
    for (key, value) in &section.entries {
        raw.push(key.clone(), decode_value(key, value)?);
    }
    Ok(raw)
}

/// Encode typed entries into a [`Section`] ready for rendering.
///
/// # Errors
///
/// Returns an error when any value fails [`encode_value`].
pub fn encode_section(name: &str, entries: &[(String, Value)]) -> Result<Section> {
    let mut section = Section::new(name);
    for (key, value) in entries {
        section
            .entries
            .push((key.clone(), encode_value(key, value)?));
    }
    Ok(section)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalars_decode_keywords_and_integers() {
        assert_eq!(decode_scalar("True"), Value::Bool(true));
        assert_eq!(decode_scalar("False"), Value::Bool(false));
        assert_eq!(decode_scalar("None"), Value::None);
        assert_eq!(decode_scalar("20"), Value::Int(20));
        assert_eq!(decode_scalar("DEBUG"), Value::Str("DEBUG".to_owned()));
        // Lowercase spellings are plain strings, matching the file format.
        assert_eq!(decode_scalar("true"), Value::Str("true".to_owned()));
        assert_eq!(decode_scalar(""), Value::Str(String::new()));
    }

    #[test]
    fn negative_numbers_stay_strings() {
        assert_eq!(decode_scalar("-5"), Value::Str("-5".to_owned()));
    }

    #[test]
    fn blocks_decode_line_by_line() {
        let raw = "\ntype: StreamHandler\nactive: True\nlevel: DEBUG";
        let value = decode_value("stream", raw).unwrap();

        assert_eq!(
            value,
            Value::Block(vec![
                ("type".to_owned(), Value::Str("StreamHandler".to_owned())),
                ("active".to_owned(), Value::Bool(true)),
                ("level".to_owned(), Value::Str("DEBUG".to_owned())),
            ])
        );
    }

    #[test]
    fn block_values_may_contain_colons() {
        let raw = "\nformatter: {asctime}: {message}";
        let value = decode_value("stream", raw).unwrap();

        assert_eq!(
            value,
            Value::Block(vec![(
                "formatter".to_owned(),
                Value::Str("{asctime}: {message}".to_owned())
            )])
        );
    }

    #[test]
    fn block_lines_without_a_colon_are_rejected() {
        let err = decode_value("stream", "\nno delimiter here").unwrap_err();
        assert!(err.to_string().contains("'stream'"));
    }

    #[test]
    fn encoding_round_trips_scalars_and_blocks() {
        let block = Value::Block(vec![
            ("type".to_owned(), Value::Str("FileHandler".to_owned())),
            ("active".to_owned(), Value::Bool(false)),
            ("filename".to_owned(), Value::Str("out.log".to_owned())),
        ]);

        let encoded = encode_value("file", &block).unwrap();
        assert_eq!(
            encoded,
            "\ntype: FileHandler\nactive: False\nfilename: out.log"
        );
        assert_eq!(decode_value("file", &encoded).unwrap(), block);

        assert_eq!(encode_value("level", &Value::None).unwrap(), "None");
        assert_eq!(encode_value("level", &Value::Int(10)).unwrap(), "10");
    }

    #[test]
    fn nested_blocks_cannot_be_encoded() {
        let nested = Value::Block(vec![(
            "inner".to_owned(),
            Value::Block(Vec::new()),
        )]);

        let err = encode_value("outer", &nested).unwrap_err();
        assert!(err.to_string().contains("cannot nest"));
    }

    #[test]
    fn sections_decode_into_raw_configs_in_order() {
        let mut section = Section::new("logrig");
        section.entries.push(("level".to_owned(), "DEBUG".to_owned()));
        section.entries.push((
            "stream".to_owned(),
            "\ntype: StreamHandler\nactive: True".to_owned(),
        ));

        let raw = decode_section(&section).unwrap();
        assert_eq!(raw.entries[0], ("level".to_owned(), Value::Str("DEBUG".to_owned())));
        assert!(matches!(raw.entries[1].1, Value::Block(_)));
    }
}
