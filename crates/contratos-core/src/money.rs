/// Monetary value parsing for Brazilian and international notations.
///
/// Separator rules:
///
/// - Both `,` and `.` present: the one appearing last is the decimal point.
/// - Only `,`: a single comma followed by at most two digits is decimal,
///   otherwise commas group thousands.
/// - Only `.`: a single dot followed by exactly three digits groups thousands
///   (`10.000`), more than one dot always groups thousands, anything else is
///   decimal (`12.5`).
///
/// Multiplier words `mil`/`k` and `milhão`/`milhões`/`mi` scale the result.
/// Unparseable input gives `0.0`; the result is never negative.
use std::sync::LazyLock;

use regex::Regex;

use crate::cell::CellValue;
use crate::normalize::{compile_regex, fold_accents};

/// First number-like token, with an optional leading minus.
static NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| compile_regex(r"(-?)(\d[\d.,]*\d|\d)"));

/// A multiplier word directly after a digit (`10 mil`, `2k`, `1,5 milhão`).
static MULTIPLIER_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_regex(r"\d\s*(milhoes|milhao|mil|mi|mm|k)\b"));

/// Parses a monetary cell into a non-negative amount.
pub fn parse_value(value: &CellValue) -> f64 {
    match value {
        CellValue::Number(n) if n.is_finite() => n.max(0.0),
        CellValue::Text(s) => parse_value_text(s),
        CellValue::Number(_) | CellValue::Date(_) | CellValue::Empty => 0.0,
    }
}

/// Parses monetary text such as `"R$ 1.234,56"` or `"US$ 2,5 mi"`.
pub fn parse_value_text(raw: &str) -> f64 {
    let folded = fold_accents(raw.trim());
    if folded.is_empty() {
        return 0.0;
    }
    let Some(caps) = NUMBER_RE.captures(&folded) else {
        return 0.0;
    };
    if caps.get(1).is_some_and(|m| !m.as_str().is_empty()) {
        return 0.0;
    }
    let Some(token) = caps.get(2).map(|m| m.as_str()) else {
        return 0.0;
    };
    let Some(base) = parse_number_token(token) else {
        return 0.0;
    };
    let amount = base * multiplier(&folded);
    if amount.is_finite() { amount.max(0.0) } else { 0.0 }
}

fn multiplier(folded: &str) -> f64 {
    match MULTIPLIER_RE
        .captures(folded)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
    {
        Some("milhoes" | "milhao" | "mi" | "mm") => 1_000_000.0,
        Some("mil" | "k") => 1_000.0,
        Some(_) | None => 1.0,
    }
}

/// Resolves thousands/decimal separators in a digit token like `1.234,56`.
fn parse_number_token(token: &str) -> Option<f64> {
    let last_comma = token.rfind(',');
    let last_dot = token.rfind('.');
    let canonical = match (last_comma, last_dot) {
        (Some(c), Some(d)) if c > d => token.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => token.replace(',', ""),
        (Some(c), None) => {
            let decimals = token.len() - c - 1;
            if token.matches(',').count() == 1 && decimals <= 2 {
                token.replace(',', ".")
            } else {
                token.replace(',', "")
            }
        }
        (None, Some(d)) => {
            let decimals = token.len() - d - 1;
            if token.matches('.').count() > 1 || decimals == 3 {
                token.replace('.', "")
            } else {
                token.to_owned()
            }
        }
        (None, None) => token.to_owned(),
    };
    canonical.parse::<f64>().ok()
}
