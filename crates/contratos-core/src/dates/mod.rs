/// Date handling: per-column format detection, per-cell parsing, and the
/// single Excel epoch conversion both of them share.
///
/// The token patterns live here so that the detector and the parser agree on
/// what an ISO, month/year or `a/b/year` token looks like.
pub mod detect;
pub mod parse;
pub mod serial;

use std::sync::LazyLock;

use regex::Regex;

use crate::normalize::compile_regex;

pub use detect::{DateFormatStrategy, MAX_DETECTION_SAMPLES, detect_format};
pub use parse::{DateParseError, DateParseOptions, expand_two_digit_year, parse_date};
pub use serial::{MAX_YEAR, MIN_YEAR, date_to_serial, serial_to_date};

/// `YYYY-MM-DD` or `YYYY/MM/DD`, optionally followed by a time part.
pub(crate) static ISO_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_regex(r"^(\d{4})[-/](\d{1,2})[-/](\d{1,2})(?:[T\s].*)?$"));

/// `MM/YYYY`, `MM-YYYY` or `MM/YY`.
pub(crate) static MONTH_YEAR_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_regex(r"^(\d{1,2})[/\-](\d{4}|\d{2})$"));

/// `a/b/year` with `/`, `-` or `.` separators and a 2- or 4-digit year.
pub(crate) static TRIPLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile_regex(r"^(\d{1,2})[/\-.](\d{1,2})[/\-.](\d{4}|\d{2})(?:[T\s].*)?$")
});

/// Leading `data:`, `dt.` or `date -` label.
static LABEL_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_regex(r"(?i)^\s*(?:data|dt|date)\b\s*[:.\-]?\s*"));

/// Strips a leading date label and any parentheses from a raw cell string.
pub(crate) fn clean_date_text(raw: &str) -> String {
    let without_label = LABEL_PREFIX_RE.replace(raw.trim(), "");
    without_label
        .chars()
        .filter(|c| *c != '(' && *c != ')')
        .collect::<String>()
        .trim()
        .to_owned()
}

/// Parses a regex capture group known to hold only ASCII digits.
pub(crate) fn capture_u32(caps: &regex::Captures<'_>, idx: usize) -> Option<u32> {
    caps.get(idx).and_then(|m| m.as_str().parse::<u32>().ok())
}
