/// Column analysis: header-to-field matching plus content classification.
///
/// For every non-blank header [`analyze_columns`] does two independent things:
///
/// - scores the normalized header against the synonym dictionary
///   ([`crate::synonyms`]), weighted by the field's tier;
/// - samples the column's values and classifies them as
///   date / number / text / mixed / empty.
///
/// The two are then cross-checked: a date field whose content is confidently
/// dates gets a +0.1 boost, capped at 0.98.
use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cell::{CellValue, cell_at};
use crate::config::ExtractionConfig;
use crate::dates::{
    DateFormatStrategy, DateParseOptions, MONTH_YEAR_RE, clean_date_text, detect_format,
    parse_date,
};
use crate::enums::DataType;
use crate::normalize::{compile_regex, contains_words, normalize};
use crate::synonyms::{ContractField, score_header};

/// Values kept on each analysis for display.
const KEPT_SAMPLES: usize = 5;

const DATE_RATIO: f64 = 0.7;
const NUMBER_RATIO: f64 = 0.8;
const TEXT_RATIO: f64 = 0.6;

/// Minimum strategy confidence for the date cross-check boost.
const DATE_BOOST_MIN_CONFIDENCE: f64 = 0.7;
const DATE_BOOST: f64 = 0.1;
const MAX_CONFIDENCE: f64 = 0.98;

/// Header words that allow bare numbers and `MM/YYYY` tokens to count as dates.
const DATE_HEADER_WORDS: &[&str] = &[
    "data",
    "dt",
    "date",
    "inicio",
    "termino",
    "fim",
    "vigencia",
    "assinatura",
    "vencimento",
    "validade",
];

/// Money-ish or plain numeric text: `R$ 1.234,56`, `1,234.56`, `10 mil`.
static NUMERIC_TEXT_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile_regex(r"(?i)^(?:r\$|us\$|\$)?\s*-?\d[\d.,\s]*(?:mil|milh[aãoõ]o|milh[oõ]es|mi|k)?\s*$")
});

static CURRENCY_RE: LazyLock<Regex> = LazyLock::new(|| compile_regex(r"(?i)^\s*(?:r\$|us\$)"));

static CNPJ_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_regex(r"^\d{2}\.?\d{3}\.?\d{3}/?\d{4}-?\d{2}$"));

/// `001/2024`, `12/2024-SEMED`
static CONTRACT_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_regex(r"^\d{1,6}/\d{4}(?:[-/ ]?[A-Za-z]+)?$"));

/// Analysis of one header column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnAnalysis {
    /// Zero-based column index.
    pub index: usize,
    /// Header text as it appears in the sheet.
    pub header: String,
    pub data_type: DataType,
    /// Matched field, if the header scored at least the configured minimum.
    pub field: Option<ContractField>,
    /// Field-match confidence in `0.0..=1.0`; zero when `field` is `None`.
    pub confidence: f64,
    /// Up to five non-blank raw values.
    pub samples: Vec<String>,
    /// Blank cells among the data rows.
    pub empty_count: usize,
    /// Number of data rows.
    pub total_count: usize,
    /// Present for date-typed columns and columns matched to a date field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_strategy: Option<DateFormatStrategy>,
    /// Recognized value shape such as `"currency"` or a date format label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

impl ColumnAnalysis {
    /// Share of blank cells among the data rows; zero for a column with no rows.
    pub fn empty_ratio(&self) -> f64 {
        if self.total_count == 0 {
            0.0
        } else {
            self.empty_count as f64 / self.total_count as f64
        }
    }

    /// Whether the column holds dates by content or by field.
    pub fn is_date_column(&self) -> bool {
        self.data_type == DataType::Date || self.field.is_some_and(ContractField::is_date_field)
    }
}

/// Returns `true` when a normalized header names a date.
pub fn header_suggests_date(normalized_header: &str) -> bool {
    DATE_HEADER_WORDS
        .iter()
        .any(|w| contains_words(normalized_header, w))
}

/// Analyzes every non-blank header column, in column order.
///
/// `rows` are the data rows only; rows may be ragged.
pub fn analyze_columns(
    headers: &[CellValue],
    rows: &[Vec<CellValue>],
    config: &ExtractionConfig,
) -> Vec<ColumnAnalysis> {
    headers
        .iter()
        .enumerate()
        .filter(|(_, h)| !h.is_blank())
        .map(|(index, h)| analyze_column(index, &h.to_text(), rows, config))
        .collect()
}

fn analyze_column(
    index: usize,
    header: &str,
    rows: &[Vec<CellValue>],
    config: &ExtractionConfig,
) -> ColumnAnalysis {
    let norm_header = normalize(header);
    let column: Vec<&CellValue> = rows.iter().map(|r| cell_at(r, index)).collect();
    let total_count = column.len();
    let empty_count = column.iter().filter(|c| c.is_blank()).count();
    let sample: Vec<&CellValue> = column
        .iter()
        .copied()
        .filter(|c| !c.is_blank())
        .take(config.sample_size.max(1))
        .collect();

    let date_header = header_suggests_date(&norm_header);
    let data_type = classify(&sample, date_header, config);

    let (mut field, mut confidence) = match score_header(&norm_header) {
        Some((f, score)) if score >= config.min_field_confidence => (Some(f), score),
        Some(_) | None => (None, 0.0),
    };

    let wants_strategy =
        data_type == DataType::Date || field.is_some_and(ContractField::is_date_field);
    let date_strategy =
        wants_strategy.then(|| detect_format(sample.iter().copied(), config.day_month_bias));

    if let (Some(f), Some(strategy)) = (field, date_strategy.as_ref()) {
        if f.is_date_field()
            && data_type == DataType::Date
            && strategy.confidence >= DATE_BOOST_MIN_CONFIDENCE
        {
            confidence = (confidence + DATE_BOOST).min(MAX_CONFIDENCE);
        }
    }
    if field.is_none() {
        confidence = 0.0;
    }
    if confidence <= 0.0 {
        field = None;
    }

    let pattern = match date_strategy.as_ref().filter(|_| data_type == DataType::Date) {
        Some(s) => Some(s.format.as_str().to_owned()),
        None => value_pattern(&sample),
    };

    debug!(
        column = index,
        header,
        data_type = %data_type,
        field = field.map(ContractField::as_str),
        confidence,
        "column analyzed"
    );

    ColumnAnalysis {
        index,
        header: header.to_owned(),
        data_type,
        field,
        confidence,
        samples: sample.iter().take(KEPT_SAMPLES).map(|c| c.to_text()).collect(),
        empty_count,
        total_count,
        date_strategy,
        pattern,
    }
}

/// Classifies a sample by majority vote.
fn classify(sample: &[&CellValue], date_header: bool, config: &ExtractionConfig) -> DataType {
    if sample.is_empty() {
        return DataType::Empty;
    }
    let opts = DateParseOptions {
        date1904: config.date1904,
        bias: config.day_month_bias,
        reference_year: config.effective_reference_year(),
        ..DateParseOptions::default()
    };
    let mut dates = 0usize;
    let mut numbers = 0usize;
    let mut texts = 0usize;
    for cell in sample {
        if counts_as_date(cell, date_header, &opts) {
            dates += 1;
            continue;
        }
        match cell {
            CellValue::Number(_) => numbers += 1,
            CellValue::Text(s) if NUMERIC_TEXT_RE.is_match(s.trim()) => numbers += 1,
            CellValue::Text(s) if s.chars().any(char::is_alphabetic) => texts += 1,
            CellValue::Text(_) | CellValue::Date(_) | CellValue::Empty => {}
        }
    }
    let n = sample.len() as f64;
    if dates as f64 / n >= DATE_RATIO {
        DataType::Date
    } else if numbers as f64 / n >= NUMBER_RATIO {
        DataType::Number
    } else if texts as f64 / n >= TEXT_RATIO {
        DataType::Text
    } else {
        DataType::Mixed
    }
}

/// Bare numbers and `MM/YYYY` tokens only count as dates under a date-like header.
fn counts_as_date(cell: &CellValue, date_header: bool, opts: &DateParseOptions<'_>) -> bool {
    match cell {
        CellValue::Date(_) => true,
        CellValue::Number(_) => date_header && parse_date(cell, opts).is_ok(),
        CellValue::Text(s) => {
            if !date_header && MONTH_YEAR_RE.is_match(&clean_date_text(s)) {
                return false;
            }
            parse_date(cell, opts).is_ok()
        }
        CellValue::Empty => false,
    }
}

/// Recognizes a dominant value shape in non-date columns.
fn value_pattern(sample: &[&CellValue]) -> Option<String> {
    let texts: Vec<String> = sample.iter().filter_map(|c| c.as_text()).map(str::to_owned).collect();
    if texts.is_empty() {
        return None;
    }
    let share = |re: &Regex| {
        texts.iter().filter(|t| re.is_match(t)).count() as f64 / texts.len() as f64
    };
    [
        (&*CURRENCY_RE, "currency"),
        (&*CNPJ_RE, "cnpj"),
        (&*CONTRACT_NUMBER_RE, "contract_number"),
    ]
    .into_iter()
    .find(|(re, _)| share(*re) >= TEXT_RATIO)
    .map(|(_, label)| label.to_owned())
}

/// Picks the best column per field: highest confidence, ties to the leftmost.
pub fn best_columns(analyses: &[ColumnAnalysis]) -> BTreeMap<ContractField, &ColumnAnalysis> {
    let mut best: BTreeMap<ContractField, &ColumnAnalysis> = BTreeMap::new();
    for analysis in analyses {
        let Some(field) = analysis.field else {
            continue;
        };
        let better = best
            .get(&field)
            .is_none_or(|current| analysis.confidence > current.confidence);
        if better {
            best.insert(field, analysis);
        }
    }
    best
}
