/// Single-cell date parsing.
///
/// Rules, first match wins:
///
/// 1. [`CellValue::Date`] passes through (year bound still applies).
/// 2. Numbers in `[1, 100000)` are Excel serials in the configured epoch.
/// 3. Text, after stripping a `data:` label and parentheses, is tried as ISO,
///    then month/year, then `a/b/year`.
/// 4. Anything else goes through a fallback that understands Portuguese month
///    names and a handful of common textual layouts.
///
/// Every constructed date is checked for calendar validity (no roll-over of
/// 31/02 into March) and for the `[1900, 2100]` year window. Failures are
/// reported as [`DateParseError`] and never abort a batch.
use std::fmt;
use std::sync::LazyLock;

use chrono::{Datelike as _, Months, NaiveDate};
use regex::Regex;

use crate::cell::CellValue;
use crate::dates::detect::DateFormatStrategy;
use crate::dates::serial::{MAX_YEAR, MIN_YEAR, serial_to_date};
use crate::dates::{ISO_RE, MONTH_YEAR_RE, TRIPLE_RE, capture_u32, clean_date_text};
use crate::enums::{DateAssumption, DateRole, DayMonthOrder};
use crate::normalize::{compile_regex, normalize};

/// Two-digit years more than this far past the reference year go to the previous century.
const TWO_DIGIT_YEAR_WINDOW: i32 = 20;

const SERIAL_RANGE: std::ops::Range<f64> = 1.0..100_000.0;

/// Why a cell did not produce a date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateParseError {
    /// The cell was blank.
    Blank,
    /// A date was built but its year lies outside `[1900, 2100]`.
    OutOfRange {
        /// The offending year.
        year: i32,
    },
    /// The components do not form a real calendar date (e.g. 31/02).
    InvalidCalendarDate {
        /// Year component.
        year: i32,
        /// Month component.
        month: u32,
        /// Day component.
        day: u32,
    },
    /// No known layout matched.
    Unrecognized {
        /// The raw cell text.
        value: String,
    },
}

impl fmt::Display for DateParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Blank => f.write_str("blank cell"),
            Self::OutOfRange { year } => {
                write!(f, "year {year} outside {MIN_YEAR}..={MAX_YEAR}")
            }
            Self::InvalidCalendarDate { year, month, day } => {
                write!(f, "{year:04}-{month:02}-{day:02} is not a calendar date")
            }
            Self::Unrecognized { value } => write!(f, "unrecognized date {value:?}"),
        }
    }
}

impl std::error::Error for DateParseError {}

/// Context for parsing one cell.
#[derive(Debug, Clone, Copy)]
pub struct DateParseOptions<'a> {
    /// Forced day/month reading, or [`DateAssumption::Auto`].
    pub assume: DateAssumption,
    /// Start or end column; decides which day a month/year cell lands on.
    pub role: DateRole,
    /// Whether numeric serials use the 1904 epoch.
    pub date1904: bool,
    /// The column's detected strategy, if any.
    pub strategy: Option<&'a DateFormatStrategy>,
    /// Order used when nothing else decides an `a/b/year` token.
    pub bias: DayMonthOrder,
    /// Anchor year for expanding two-digit years.
    pub reference_year: i32,
}

impl Default for DateParseOptions<'_> {
    fn default() -> Self {
        Self {
            assume: DateAssumption::Auto,
            role: DateRole::Start,
            date1904: false,
            strategy: None,
            bias: DayMonthOrder::DayFirst,
            reference_year: chrono::Local::now().year(),
        }
    }
}

/// Expands a two-digit year using a sliding window around `reference_year`.
///
/// With reference year 2024, `24` becomes 2024, `44` becomes 2044 and `45`
/// becomes 1945.
pub fn expand_two_digit_year(yy: u32, reference_year: i32) -> i32 {
    let century = reference_year.div_euclid(100) * 100;
    let candidate = century + yy as i32;
    if candidate > reference_year + TWO_DIGIT_YEAR_WINDOW {
        candidate - 100
    } else {
        candidate
    }
}

/// Parses one cell into a calendar date.
///
/// # Errors
///
/// Returns [`DateParseError`] when the cell is blank, matches no layout, or
/// yields an invalid or out-of-range date. Callers treat this as missing data.
pub fn parse_date(value: &CellValue, opts: &DateParseOptions<'_>) -> Result<NaiveDate, DateParseError> {
    match value {
        CellValue::Empty => Err(DateParseError::Blank),
        CellValue::Date(d) => check_year(*d),
        CellValue::Number(n) => {
            if !n.is_finite() {
                return Err(DateParseError::Blank);
            }
            if SERIAL_RANGE.contains(n) {
                return serial_to_date(*n, opts.date1904).ok_or(DateParseError::OutOfRange {
                    year: approximate_serial_year(*n, opts.date1904),
                });
            }
            parse_text(&value.to_text(), opts)
        }
        CellValue::Text(s) => {
            if s.trim().is_empty() {
                return Err(DateParseError::Blank);
            }
            parse_text(s, opts)
        }
    }
}

fn approximate_serial_year(serial: f64, date1904: bool) -> i32 {
    let base = if date1904 { 1904.0 } else { 1900.0 };
    (base + serial / 365.25).floor() as i32
}

fn parse_text(raw: &str, opts: &DateParseOptions<'_>) -> Result<NaiveDate, DateParseError> {
    let text = clean_date_text(raw);

    if let Some(caps) = ISO_RE.captures(&text) {
        let (y, m, d) = triple(&caps, 1, 2, 3)?;
        return build(y as i32, m, d);
    }

    if let Some(caps) = MONTH_YEAR_RE.captures(&text) {
        let month = capture_u32(&caps, 1).ok_or_else(|| unrecognized(raw))?;
        let year = year_from(&caps, 2, opts.reference_year).ok_or_else(|| unrecognized(raw))?;
        return month_year_date(year, month, opts.role);
    }

    if let Some(caps) = TRIPLE_RE.captures(&text) {
        let a = capture_u32(&caps, 1).ok_or_else(|| unrecognized(raw))?;
        let b = capture_u32(&caps, 2).ok_or_else(|| unrecognized(raw))?;
        let year = year_from(&caps, 3, opts.reference_year).ok_or_else(|| unrecognized(raw))?;
        let (day, month) = match resolve_order(a, b, opts) {
            DayMonthOrder::DayFirst => (a, b),
            DayMonthOrder::MonthFirst => (b, a),
        };
        return build(year, month, day);
    }

    parse_fallback(&text, opts).ok_or_else(|| unrecognized(raw))
}

fn unrecognized(raw: &str) -> DateParseError {
    DateParseError::Unrecognized {
        value: raw.trim().to_owned(),
    }
}

fn triple(
    caps: &regex::Captures<'_>,
    yi: usize,
    mi: usize,
    di: usize,
) -> Result<(u32, u32, u32), DateParseError> {
    match (
        capture_u32(caps, yi),
        capture_u32(caps, mi),
        capture_u32(caps, di),
    ) {
        (Some(y), Some(m), Some(d)) => Ok((y, m, d)),
        (None, _, _) | (_, None, _) | (_, _, None) => Err(DateParseError::Unrecognized {
            value: caps.get(0).map_or_else(String::new, |m| m.as_str().to_owned()),
        }),
    }
}

fn year_from(caps: &regex::Captures<'_>, idx: usize, reference_year: i32) -> Option<i32> {
    let m = caps.get(idx)?;
    let n = m.as_str().parse::<u32>().ok()?;
    if m.as_str().len() == 2 {
        Some(expand_two_digit_year(n, reference_year))
    } else {
        Some(n as i32)
    }
}

/// Decides how to read `a/b/year`.
fn resolve_order(a: u32, b: u32, opts: &DateParseOptions<'_>) -> DayMonthOrder {
    match opts.assume {
        DateAssumption::DayFirst => return DayMonthOrder::DayFirst,
        DateAssumption::MonthFirst => return DayMonthOrder::MonthFirst,
        DateAssumption::Auto => {}
    }
    if let Some(order) = opts
        .strategy
        .filter(|s| s.is_reliable())
        .and_then(|s| s.format.day_month_order())
    {
        return order;
    }
    if a > 12 {
        DayMonthOrder::DayFirst
    } else if b > 12 {
        DayMonthOrder::MonthFirst
    } else {
        opts.bias
    }
}

/// Builds a date and rejects roll-over and out-of-window years.
fn build(year: i32, month: u32, day: u32) -> Result<NaiveDate, DateParseError> {
    let date = NaiveDate::from_ymd_opt(year, month, day)
        .ok_or(DateParseError::InvalidCalendarDate { year, month, day })?;
    check_year(date)
}

fn check_year(date: NaiveDate) -> Result<NaiveDate, DateParseError> {
    if (MIN_YEAR..=MAX_YEAR).contains(&date.year()) {
        Ok(date)
    } else {
        Err(DateParseError::OutOfRange { year: date.year() })
    }
}

/// First day of the month for a start column, last day for an end column.
fn month_year_date(year: i32, month: u32, role: DateRole) -> Result<NaiveDate, DateParseError> {
    let first = build(year, month, 1)?;
    match role {
        DateRole::Start => Ok(first),
        DateRole::End => first
            .checked_add_months(Months::new(1))
            .and_then(|d| d.pred_opt())
            .ok_or(DateParseError::OutOfRange { year })
            .and_then(check_year),
    }
}

// ---------------------------------------------------------------------------
// Fallback layouts
// ---------------------------------------------------------------------------

/// `15 de janeiro de 2024`, `15 janeiro 2024`
static DAY_MONTH_NAME_YEAR_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_regex(r"^(\d{1,2}) (?:de )?([a-z]+) (?:de )?(\d{4})$"));

/// `janeiro de 2024`, `jan 2024`, `jan 24`
static MONTH_NAME_YEAR_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_regex(r"^([a-z]+) (?:de )?(\d{4}|\d{2})$"));

/// `20240115`
static COMPACT_RE: LazyLock<Regex> = LazyLock::new(|| compile_regex(r"^(\d{4})(\d{2})(\d{2})$"));

const MONTH_NAMES: &[(&str, u32)] = &[
    ("janeiro", 1),
    ("fevereiro", 2),
    ("marco", 3),
    ("abril", 4),
    ("maio", 5),
    ("junho", 6),
    ("julho", 7),
    ("agosto", 8),
    ("setembro", 9),
    ("outubro", 10),
    ("novembro", 11),
    ("dezembro", 12),
    ("january", 1),
    ("february", 2),
    ("march", 3),
    ("april", 4),
    ("may", 5),
    ("june", 6),
    ("july", 7),
    ("august", 8),
    ("september", 9),
    ("october", 10),
    ("november", 11),
    ("december", 12),
];

const MONTH_ABBREVIATIONS: &[(&str, u32)] = &[
    ("jan", 1),
    ("fev", 2),
    ("feb", 2),
    ("mar", 3),
    ("abr", 4),
    ("apr", 4),
    ("mai", 5),
    ("jun", 6),
    ("jul", 7),
    ("ago", 8),
    ("aug", 8),
    ("set", 9),
    ("sep", 9),
    ("out", 10),
    ("oct", 10),
    ("nov", 11),
    ("dez", 12),
    ("dec", 12),
];

fn month_from_name(name: &str) -> Option<u32> {
    MONTH_NAMES
        .iter()
        .chain(MONTH_ABBREVIATIONS)
        .find(|(n, _)| *n == name)
        .map(|(_, m)| *m)
}

/// Chrono layouts tried last, after the named-month forms.
const CHRONO_LAYOUTS: &[&str] = &["%d %b %Y", "%d %B %Y", "%B %d, %Y", "%b %d, %Y", "%d-%b-%Y"];

fn parse_fallback(text: &str, opts: &DateParseOptions<'_>) -> Option<NaiveDate> {
    let norm = normalize(text);

    if let Some(caps) = COMPACT_RE.captures(&norm) {
        let (y, m, d) = triple(&caps, 1, 2, 3).ok()?;
        return build(y as i32, m, d).ok();
    }

    if let Some(caps) = DAY_MONTH_NAME_YEAR_RE.captures(&norm) {
        let day = capture_u32(&caps, 1)?;
        let month = caps.get(2).and_then(|m| month_from_name(m.as_str()))?;
        let year = capture_u32(&caps, 3)? as i32;
        return build(year, month, day).ok();
    }

    if let Some(caps) = MONTH_NAME_YEAR_RE.captures(&norm) {
        let month = caps.get(1).and_then(|m| month_from_name(m.as_str()))?;
        let year = year_from(&caps, 2, opts.reference_year)?;
        return month_year_date(year, month, opts.role).ok();
    }

    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(text.trim()) {
        return check_year(dt.date_naive()).ok();
    }
    CHRONO_LAYOUTS
        .iter()
        .find_map(|layout| NaiveDate::parse_from_str(text.trim(), layout).ok())
        .and_then(|d| check_year(d).ok())
}
