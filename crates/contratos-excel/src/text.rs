/// Delimited-text loading (`.csv`, `.txt`, `.tsv`).
///
/// Municipal portals export with `;` as often as `,`, and older exports are
/// Windows-1252 rather than UTF-8. The delimiter is sniffed from the first
/// lines; bytes that are not valid UTF-8 are decoded as Windows-1252.
/// Every field becomes [`CellValue::Text`] or [`CellValue::Empty`].
use std::borrow::Cow;

use contratos_core::{CellValue, RawSheet};
use csv::ReaderBuilder;
use encoding_rs::{UTF_8, WINDOWS_1252};
use tracing::debug;

use crate::error::LoadError;

/// Candidate delimiters, in tie-break order.
const DELIMITERS: [u8; 4] = [b';', b',', b'\t', b'|'];

/// Lines inspected when sniffing the delimiter.
const SNIFF_LINES: usize = 10;

/// Decodes file bytes as UTF-8 (BOM stripped), falling back to Windows-1252.
pub fn decode_text(bytes: &[u8]) -> Cow<'_, str> {
    let (text, _, had_errors) = UTF_8.decode(bytes);
    if !had_errors {
        return text;
    }
    debug!("input is not UTF-8; decoding as Windows-1252");
    let (text, _, _) = WINDOWS_1252.decode(bytes);
    text
}

/// Picks the delimiter that splits the first lines most consistently.
///
/// Each candidate is scored by its mean count per line (outside quotes)
/// divided by one plus the standard deviation. A candidate absent from
/// every line scores zero; if all score zero the result is `,`.
pub fn sniff_delimiter(text: &str) -> u8 {
    let lines: Vec<&str> = text
        .lines()
        .filter(|l| !l.trim().is_empty())
        .take(SNIFF_LINES)
        .collect();
    if lines.is_empty() {
        return b',';
    }
    let mut best = (b',', 0.0_f64);
    for delimiter in DELIMITERS {
        let counts: Vec<f64> = lines
            .iter()
            .map(|l| count_unquoted(l, delimiter) as f64)
            .collect();
        let n = counts.len() as f64;
        let mean = counts.iter().sum::<f64>() / n;
        let variance = counts.iter().map(|c| (c - mean).powi(2)).sum::<f64>() / n;
        let score = mean / (1.0 + variance.sqrt());
        if score > best.1 {
            best = (delimiter, score);
        }
    }
    best.0
}

fn count_unquoted(line: &str, delimiter: u8) -> usize {
    let mut in_quotes = false;
    let mut count = 0;
    for b in line.bytes() {
        if b == b'"' {
            in_quotes = !in_quotes;
        } else if b == delimiter && !in_quotes {
            count += 1;
        }
    }
    count
}

/// Parses delimited text into rows. Ragged rows are kept as they are.
///
/// # Errors
///
/// Returns [`LoadError::Csv`] when the reader hits malformed input.
pub fn parse_delimited(text: &str) -> Result<RawSheet, LoadError> {
    let delimiter = sniff_delimiter(text);
    debug!(delimiter = %char::from(delimiter).escape_default(), "delimiter sniffed");
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for (record_idx, result) in reader.records().enumerate() {
        let record = result.map_err(|e| LoadError::Csv {
            record: record_idx,
            detail: e.to_string(),
        })?;
        rows.push(record.iter().map(field_to_cell).collect());
    }
    Ok(rows)
}

fn field_to_cell(field: &str) -> CellValue {
    let trimmed = field.trim();
    if trimmed.is_empty() {
        CellValue::Empty
    } else {
        CellValue::Text(trimmed.to_owned())
    }
}
