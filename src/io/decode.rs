//! Line decoder for the `"<temperature>,<light>"` serial protocol.
//!
//! One record per newline-terminated line, two comma-separated floats, no
//! framing or checksum. Anything else is a [`DecodeError`], which callers
//! treat as "skip this line and keep reading".

use thiserror::Error;

use crate::domain::Sample;

/// Why a line could not be turned into a [`Sample`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("empty line")]
    Empty,
    #[error("expected 2 comma-separated fields, got {0}")]
    FieldCount(usize),
    #[error("{field} is not a number: {value:?}")]
    NotANumber { field: &'static str, value: String },
    #[error("{field} is not finite: {value:?}")]
    NonFinite { field: &'static str, value: String },
}

/// Decode a single text line into a [`Sample`].
pub fn decode_line(line: &str) -> Result<Sample, DecodeError> {
    let line = line.trim();
    if line.is_empty() {
        return Err(DecodeError::Empty);
    }

    let fields: Vec<&str> = line.split(',').collect();
    let [temperature, light] = fields.as_slice() else {
        return Err(DecodeError::FieldCount(fields.len()));
    };

    Ok(Sample {
        temperature: parse_field("temperature", temperature)?,
        light: parse_field("light", light)?,
    })
}

/// Decode raw line bytes as UTF-8, dropping invalid sequences.
pub fn decode_bytes(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw)
        .chars()
        .filter(|&c| c != char::REPLACEMENT_CHARACTER)
        .collect()
}

fn parse_field(field: &'static str, raw: &str) -> Result<f64, DecodeError> {
    let raw = raw.trim();
    let v = raw.parse::<f64>().map_err(|_| DecodeError::NotANumber {
        field,
        value: raw.to_string(),
    })?;
    if v.is_finite() {
        Ok(v)
    } else {
        Err(DecodeError::NonFinite {
            field,
            value: raw.to_string(),
        })
    }
}
