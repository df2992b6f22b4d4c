/// Statistical date-format detection for one column.
///
/// [`detect_format`] looks at the first [`MAX_DETECTION_SAMPLES`] non-empty
/// values and decides, in this order:
///
/// 1. Excel serials, when at least half the samples are numbers in `(1, 100000)`.
/// 2. ISO `YYYY-MM-DD`, when more than half the samples match it.
/// 3. `MM/YYYY`, when more than half the samples match it.
/// 4. Two-digit-year `a/b/yy`, when more than 70% of the samples use it.
/// 5. Four-digit-year `a/b/yyyy` otherwise.
///
/// For `a/b/year` tokens a number above 12 settles day versus month outright.
/// Tokens where both numbers are at most 12 add a weighted vote (0.7 for the
/// configured bias, 0.3 for the other order). When no token was decisive the
/// strategy is marked [`DateFormatStrategy::ambiguous`]; when every decisive
/// token agrees, the confidence rises by 0.1 (0.05 for two-digit years).
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cell::CellValue;
use crate::dates::{ISO_RE, MONTH_YEAR_RE, TRIPLE_RE, capture_u32, clean_date_text};
use crate::enums::{DateFormat, DayMonthOrder};

/// Maximum number of non-empty values inspected per column.
pub const MAX_DETECTION_SAMPLES: usize = 10;

/// Number of sample values kept on the strategy for display.
const KEPT_SAMPLES: usize = 5;

/// Exclusive bounds of the numeric range treated as Excel serials.
const SERIAL_LOWER: f64 = 1.0;
const SERIAL_UPPER: f64 = 100_000.0;

const PRIOR_WEIGHT: f64 = 0.7;

/// Added when every decisive token agrees on the order; lifts a clean column
/// above the parser's trust threshold.
const UNANIMOUS_BONUS: f64 = 0.1;

/// The inferred encoding of a date column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateFormatStrategy {
    /// The winning format.
    pub format: DateFormat,
    /// Confidence in `0.0..=1.0`.
    pub confidence: f64,
    /// Up to five of the raw values the decision was based on.
    pub samples: Vec<String>,
    /// `true` when the day/month order came from the locale prior alone.
    pub ambiguous: bool,
}

impl DateFormatStrategy {
    /// The zero-confidence default returned for columns with no values.
    pub fn unknown() -> Self {
        Self {
            format: DateFormat::DdMmYyyy,
            confidence: 0.0,
            samples: Vec::new(),
            ambiguous: true,
        }
    }

    /// Whether the parser may trust this strategy's day/month order outright.
    pub fn is_reliable(&self) -> bool {
        self.confidence > 0.8
    }

    /// Short label like `"DD/MM/YYYY (80%)"` used in provenance notes.
    pub fn describe(&self) -> String {
        format!(
            "{} ({:.0}%){}",
            self.format,
            self.confidence * 100.0,
            if self.ambiguous {
                ", dia/mês presumido"
            } else {
                ""
            }
        )
    }
}

impl Default for DateFormatStrategy {
    fn default() -> Self {
        Self::unknown()
    }
}

#[derive(Default)]
struct Tally {
    iso: usize,
    month_year: usize,
    triple: usize,
    two_digit_year: usize,
    decisive_day: usize,
    decisive_month: usize,
    day_votes: f64,
    month_votes: f64,
}

impl Tally {
    fn observe(&mut self, text: &str, bias: DayMonthOrder) {
        if ISO_RE.is_match(text) {
            self.iso += 1;
            return;
        }
        if let Some(caps) = MONTH_YEAR_RE.captures(text) {
            if capture_u32(&caps, 1).is_some_and(|m| (1..=12).contains(&m)) {
                self.month_year += 1;
            }
            return;
        }
        let Some(caps) = TRIPLE_RE.captures(text) else {
            return;
        };
        let (Some(a), Some(b)) = (capture_u32(&caps, 1), capture_u32(&caps, 2)) else {
            return;
        };
        if a > 12 && b > 12 {
            return;
        }
        self.triple += 1;
        if caps.get(3).is_some_and(|m| m.as_str().len() == 2) {
            self.two_digit_year += 1;
        }
        if a > 12 {
            self.decisive_day += 1;
            self.day_votes += 1.0;
        } else if b > 12 {
            self.decisive_month += 1;
            self.month_votes += 1.0;
        } else {
            match bias {
                DayMonthOrder::DayFirst => {
                    self.day_votes += PRIOR_WEIGHT;
                    self.month_votes += 1.0 - PRIOR_WEIGHT;
                }
                DayMonthOrder::MonthFirst => {
                    self.month_votes += PRIOR_WEIGHT;
                    self.day_votes += 1.0 - PRIOR_WEIGHT;
                }
            }
        }
    }

    fn decisive(&self) -> usize {
        self.decisive_day + self.decisive_month
    }

    /// Decisive tokens exist and all of them agree with `order`.
    fn unanimous(&self, order: DayMonthOrder) -> bool {
        match order {
            DayMonthOrder::DayFirst => self.decisive_day > 0 && self.decisive_month == 0,
            DayMonthOrder::MonthFirst => self.decisive_month > 0 && self.decisive_day == 0,
        }
    }

    fn order(&self, bias: DayMonthOrder) -> DayMonthOrder {
        if self.day_votes > self.month_votes {
            DayMonthOrder::DayFirst
        } else if self.month_votes > self.day_votes {
            DayMonthOrder::MonthFirst
        } else {
            bias
        }
    }
}

fn is_serial_candidate(cell: &CellValue) -> bool {
    cell.as_number()
        .is_some_and(|n| n > SERIAL_LOWER && n < SERIAL_UPPER)
}

/// Infers the most likely date encoding of a column from its raw values.
///
/// Blank values are skipped; only the first [`MAX_DETECTION_SAMPLES`]
/// non-blank values are considered. A column with no values yields
/// [`DateFormatStrategy::unknown`].
///
/// For four-digit-year `DD/MM` and `MM/DD` columns the base 0.8 (plus 0.1
/// when every decisive date agrees on the order) is scaled by the share of
/// sampled values that have the day/month/year shape, so a column that is
/// half free text reports about half the confidence.
pub fn detect_format<'a>(
    values: impl IntoIterator<Item = &'a CellValue>,
    bias: DayMonthOrder,
) -> DateFormatStrategy {
    let samples: Vec<&CellValue> = values
        .into_iter()
        .filter(|v| !v.is_blank())
        .take(MAX_DETECTION_SAMPLES)
        .collect();
    if samples.is_empty() {
        return DateFormatStrategy::unknown();
    }
    let n = samples.len() as f64;
    let kept: Vec<String> = samples
        .iter()
        .take(KEPT_SAMPLES)
        .map(|v| v.to_text())
        .collect();

    let serials = samples.iter().filter(|v| is_serial_candidate(v)).count();
    if serials as f64 / n >= 0.5 {
        debug!(serials, total = samples.len(), "column looks like Excel serial dates");
        return DateFormatStrategy {
            format: DateFormat::ExcelSerial,
            confidence: 0.9,
            samples: kept,
            ambiguous: false,
        };
    }

    let mut tally = Tally::default();
    for value in &samples {
        match value {
            CellValue::Date(_) => tally.iso += 1,
            CellValue::Text(_) | CellValue::Number(_) | CellValue::Empty => {
                tally.observe(&clean_date_text(&value.to_text()), bias);
            }
        }
    }

    let strategy = |format: DateFormat, confidence: f64, ambiguous: bool| DateFormatStrategy {
        format,
        confidence,
        samples: kept.clone(),
        ambiguous,
    };

    if tally.iso as f64 / n > 0.5 {
        return strategy(DateFormat::YyyyMmDd, 0.95, false);
    }
    if tally.month_year as f64 / n > 0.5 {
        return strategy(DateFormat::MmYyyy, 0.9, false);
    }

    let order = tally.order(bias);
    let ambiguous = tally.decisive() == 0;
    let bonus = if tally.unanimous(order) {
        UNANIMOUS_BONUS
    } else {
        0.0
    };
    if tally.two_digit_year as f64 / n > 0.7 {
        let format = match order {
            DayMonthOrder::DayFirst => DateFormat::DdMmYy,
            DayMonthOrder::MonthFirst => DateFormat::MmDdYy,
        };
        return strategy(format, 0.85 + bonus / 2.0, ambiguous);
    }

    let format = match order {
        DayMonthOrder::DayFirst => DateFormat::DdMmYyyy,
        DayMonthOrder::MonthFirst => DateFormat::MmDdYyyy,
    };
    let confidence = (0.8 + bonus) * (tally.triple as f64 / n);
    debug!(
        format = %format,
        confidence,
        decisive = tally.decisive(),
        "day/month order inferred"
    );
    strategy(format, confidence, ambiguous)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;

    fn texts(values: &[&str]) -> Vec<CellValue> {
        values.iter().map(|s| CellValue::from(*s)).collect()
    }

    #[test]
    fn brazilian_dates_with_day_above_twelve() {
        let values = texts(&["15/01/2024", "20/03/2024", "05/12/2024"]);
        let s = detect_format(&values, DayMonthOrder::DayFirst);
        assert_eq!(s.format, DateFormat::DdMmYyyy);
        assert!(s.confidence >= 0.8, "confidence {}", s.confidence);
        assert!(!s.ambiguous);
    }

    #[test]
    fn iso_dates() {
        let values = texts(&["2024-01-15", "2024-03-20"]);
        let s = detect_format(&values, DayMonthOrder::DayFirst);
        assert_eq!(s.format, DateFormat::YyyyMmDd);
        assert!(s.confidence >= 0.9);
    }

    #[test]
    fn us_dates_with_month_first_evidence() {
        let values = texts(&["01/15/2024", "03/20/2024", "12/05/2024"]);
        let s = detect_format(&values, DayMonthOrder::DayFirst);
        assert_eq!(s.format, DateFormat::MmDdYyyy);
        assert!(!s.ambiguous);
    }

    #[test]
    fn ambiguous_dates_follow_the_bias() {
        let values = texts(&["01/02/2024", "03/04/2024"]);
        let day = detect_format(&values, DayMonthOrder::DayFirst);
        assert_eq!(day.format, DateFormat::DdMmYyyy);
        assert!(day.ambiguous);
        let month = detect_format(&values, DayMonthOrder::MonthFirst);
        assert_eq!(month.format, DateFormat::MmDdYyyy);
        assert!(month.ambiguous);
    }

    #[test]
    fn two_digit_years() {
        let values = texts(&["15/01/24", "20/03/24", "05/12/24", "01/01/24"]);
        let s = detect_format(&values, DayMonthOrder::DayFirst);
        assert_eq!(s.format, DateFormat::DdMmYy);
        assert!((s.confidence - 0.9).abs() < 1e-9, "confidence {}", s.confidence);

        let ambiguous = detect_format(&texts(&["01/02/24", "03/04/24"]), DayMonthOrder::DayFirst);
        assert_eq!(ambiguous.format, DateFormat::DdMmYy);
        assert!((ambiguous.confidence - 0.85).abs() < 1e-9);
    }

    #[test]
    fn unanimous_evidence_is_reliable_and_mixed_evidence_is_not() {
        let clean = detect_format(
            &texts(&["12/31/2024", "03/04/2025"]),
            DayMonthOrder::DayFirst,
        );
        assert_eq!(clean.format, DateFormat::MmDdYyyy);
        assert!(clean.is_reliable(), "confidence {}", clean.confidence);

        let mixed = detect_format(
            &texts(&["31/12/2024", "12/31/2024", "25/01/2024"]),
            DayMonthOrder::DayFirst,
        );
        assert_eq!(mixed.format, DateFormat::DdMmYyyy);
        assert!(!mixed.is_reliable());
    }

    #[test]
    fn month_year_columns() {
        let values = texts(&["01/2024", "02/2024", "03/2024"]);
        let s = detect_format(&values, DayMonthOrder::DayFirst);
        assert_eq!(s.format, DateFormat::MmYyyy);
        assert!((s.confidence - 0.9).abs() < f64::EPSILON);
    }

    #[test]
    fn excel_serials_take_priority() {
        let values = vec![
            CellValue::Number(45292.0),
            CellValue::Number(45300.0),
            CellValue::from("2024-01-15"),
        ];
        let s = detect_format(&values, DayMonthOrder::DayFirst);
        assert_eq!(s.format, DateFormat::ExcelSerial);
        assert!((s.confidence - 0.9).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_column_is_unknown() {
        let values = vec![CellValue::Empty, CellValue::from("  ")];
        let s = detect_format(&values, DayMonthOrder::DayFirst);
        assert_eq!(s, DateFormatStrategy::unknown());
        assert!(s.confidence.abs() < f64::EPSILON);
    }

    #[test]
    fn non_date_text_scores_low() {
        let values = texts(&["Limpeza urbana", "Merenda escolar", "Transporte"]);
        let s = detect_format(&values, DayMonthOrder::DayFirst);
        assert!(s.confidence < 0.7, "confidence {}", s.confidence);
    }

    #[test]
    fn native_date_cells_count_as_iso() {
        let d = chrono::NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date");
        let values = vec![CellValue::Date(d), CellValue::Date(d)];
        let s = detect_format(&values, DayMonthOrder::DayFirst);
        assert_eq!(s.format, DateFormat::YyyyMmDd);
    }

    #[test]
    fn only_the_first_ten_samples_count() {
        let mut values = texts(&["2024-01-01"; 10]);
        values.extend(texts(&["01/02/2024"; 30]));
        let s = detect_format(&values, DayMonthOrder::DayFirst);
        assert_eq!(s.format, DateFormat::YyyyMmDd);
        assert!(s.samples.len() <= 5);
    }

    #[test]
    fn describe_mentions_presumed_order() {
        let values = texts(&["01/02/2024"]);
        let s = detect_format(&values, DayMonthOrder::DayFirst);
        assert!(s.describe().contains("presumido"), "{}", s.describe());
    }
}
