//! JSON codec for event records.
//!
//! One JSON object per event; streams are newline-delimited. Blank lines and
//! lines starting with `#` are skipped so hand-written replay files can carry
//! comments.

use std::io::BufRead;

use crate::core::{Error, Result};
use crate::event::{EventKind, EventRecord};

/// Decode a single JSON event record.
///
/// Text that is not JSON is a `Decode` error. A JSON object whose fields have
/// the wrong shape is a `MalformedEvent` for its kind, unless the kind itself
/// is unknown.
pub fn decode_record(line: &str) -> Result<EventRecord> {
    let value: serde_json::Value = serde_json::from_str(line.trim())?;
    let kind = value
        .get("type")
        .and_then(|t| t.as_str())
        .map(str::to_string);

    serde_json::from_value(value).map_err(|e| match kind {
        Some(kind) => match kind.parse::<EventKind>() {
            Ok(_) => Error::malformed(kind, e.to_string()),
            Err(unknown) => unknown,
        },
        None => Error::malformed("?", e.to_string()),
    })
}

/// Iterate an NDJSON stream, yielding `(line_number, record)`; line numbers
/// are 1-based.
pub fn decode_stream<R: BufRead>(reader: R) -> impl Iterator<Item = (usize, Result<EventRecord>)> {
    reader
        .lines()
        .enumerate()
        .filter_map(|(idx, line)| {
            let line_no = idx + 1;
            match line {
                Err(e) => Some((line_no, Err(e.into()))),
                Ok(text) => {
                    let text = text.trim();
                    if text.is_empty() || text.starts_with('#') {
                        None
                    } else {
                        Some((line_no, decode_record(text)))
                    }
                }
            }
        })
}
