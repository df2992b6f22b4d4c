/// Sheet-level and row-level diagnostics.
///
/// [`validate`] cross-checks a sheet's [`ColumnAnalysis`] list against the
/// required and recommended field sets and produces a [`ValidationReport`].
/// Only required-field gaps make a sheet invalid; everything else is a
/// warning or a suggestion.
///
/// [`validate_rows`] inspects the extracted records themselves and returns a
/// [`RowIssue`] for every row a reviewer should look at. Row issues never
/// affect [`ValidationReport::is_valid`].
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::columns::ColumnAnalysis;
use crate::config::{DEFAULT_REQUIRED_FIELD_CONFIDENCE, ExtractionConfig};
use crate::enums::DateRole;
use crate::record::StructuredContractRecord;
use crate::synonyms::{ContractField, RECOMMENDED_FIELDS, REQUIRED_FIELDS};

#[cfg(test)]
mod tests;

/// Mapped columns emptier than this ratio get a warning.
const MAX_EMPTY_RATIO: f64 = 0.8;

/// Date strategies below this confidence get a warning.
const MIN_DATE_CONFIDENCE: f64 = 0.7;

/// Rows whose provenance confidence falls below this get a [`RowIssueKind::LowConfidence`].
pub const LOW_ROW_CONFIDENCE: f64 = 0.5;

// ---------------------------------------------------------------------------
// Sheet report
// ---------------------------------------------------------------------------

/// Outcome of validating one sheet's column mapping.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    /// `true` iff `missing_fields` is empty.
    pub is_valid: bool,
    pub warnings: Vec<String>,
    pub suggestions: Vec<String>,
    /// Names of required fields with no confidently mapped column.
    pub missing_fields: Vec<String>,
}

/// Validates a column mapping with the default thresholds.
pub fn validate(analyses: &[ColumnAnalysis]) -> ValidationReport {
    validate_with(analyses, &ExtractionConfig::default())
}

/// Validates a column mapping using `config.required_field_confidence`.
pub fn validate_with(analyses: &[ColumnAnalysis], config: &ExtractionConfig) -> ValidationReport {
    let threshold = if config.required_field_confidence.is_finite() {
        config.required_field_confidence
    } else {
        DEFAULT_REQUIRED_FIELD_CONFIDENCE
    };
    let is_mapped = |field: ContractField| {
        analyses
            .iter()
            .any(|a| a.field == Some(field) && a.confidence > threshold)
    };

    let mut report = ValidationReport::default();

    for field in REQUIRED_FIELDS {
        if !is_mapped(field) {
            report.missing_fields.push(field.as_str().to_owned());
            report.warnings.push(format!(
                "Campo obrigatório \"{field}\" não foi identificado em nenhuma coluna"
            ));
        }
    }
    for field in RECOMMENDED_FIELDS {
        if !is_mapped(field) {
            report.suggestions.push(format!(
                "Adicione uma coluna para \"{field}\" para melhorar a extração"
            ));
        }
    }

    for analysis in analyses {
        if let Some(field) = analysis.field {
            if analysis.empty_ratio() > MAX_EMPTY_RATIO {
                report.warnings.push(format!(
                    "Coluna \"{}\" ({field}) está {:.0}% vazia",
                    analysis.header,
                    analysis.empty_ratio() * 100.0
                ));
            }
        }
        if !analysis.is_date_column() {
            continue;
        }
        let Some(strategy) = analysis.date_strategy.as_ref() else {
            continue;
        };
        if strategy.confidence < MIN_DATE_CONFIDENCE {
            report.warnings.push(format!(
                "Formato de data incerto na coluna \"{}\": {}",
                analysis.header,
                strategy.describe()
            ));
        } else if strategy.ambiguous && strategy.format.day_month_order().is_some() {
            report.warnings.push(format!(
                "Ordem dia/mês presumida na coluna \"{}\" ({}); nenhum valor tem dia acima de 12",
                analysis.header, strategy.format
            ));
        }
    }

    report.is_valid = report.missing_fields.is_empty();
    report
}

// ---------------------------------------------------------------------------
// Row issues
// ---------------------------------------------------------------------------

/// How much attention a row issue deserves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Data is likely wrong or missing.
    Warning,
    /// Worth a look; often legitimate.
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warning => f.write_str("Warning"),
            Self::Info => f.write_str("Info"),
        }
    }
}

/// What is wrong with a row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RowIssueKind {
    /// A required field holds its placeholder default.
    DefaultedField { field: ContractField },
    /// A vigência date could not be determined.
    MissingDate { role: DateRole },
    /// `dataTermino` precedes `dataInicio`.
    EndBeforeStart,
    /// `valor` is zero.
    ZeroValue,
    /// The row's provenance confidence is below [`LOW_ROW_CONFIDENCE`].
    LowConfidence { confidence: f64 },
}

impl RowIssueKind {
    /// Severity of this kind of issue.
    pub fn severity(self) -> Severity {
        match self {
            Self::DefaultedField { .. } | Self::EndBeforeStart | Self::LowConfidence { .. } => {
                Severity::Warning
            }
            Self::MissingDate { .. } | Self::ZeroValue => Severity::Info,
        }
    }
}

/// A finding about one extracted row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowIssue {
    /// 1-based spreadsheet row.
    pub row_number: usize,
    /// The record's contract number, for display.
    pub numero: String,
    #[serde(flatten)]
    pub kind: RowIssueKind,
    pub severity: Severity,
    /// Portuguese explanation for the reviewing user.
    pub message: String,
}

impl RowIssue {
    fn new(record: &StructuredContractRecord, kind: RowIssueKind) -> Self {
        let message = match kind {
            RowIssueKind::DefaultedField { field } => {
                format!("Campo \"{field}\" não encontrado; valor padrão utilizado")
            }
            RowIssueKind::MissingDate { role } => {
                format!("Data \"{role}\" ausente ou ilegível")
            }
            RowIssueKind::EndBeforeStart => {
                "Data de término anterior à data de início".to_owned()
            }
            RowIssueKind::ZeroValue => "Valor do contrato igual a zero".to_owned(),
            RowIssueKind::LowConfidence { confidence } => {
                format!("Confiança baixa na extração ({:.0}%)", confidence * 100.0)
            }
        };
        Self {
            row_number: record.provenance.row_number,
            numero: record.numero.clone(),
            kind,
            severity: kind.severity(),
            message,
        }
    }
}

impl fmt::Display for RowIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level_char = match self.severity {
            Severity::Warning => 'W',
            Severity::Info => 'I',
        };
        write!(
            f,
            "[{level_char}] linha {} ({}): {}",
            self.row_number, self.numero, self.message
        )
    }
}

/// Flags rows with placeholder required fields, missing or inverted dates,
/// zero value, or low extraction confidence. Issues come out in row order.
pub fn validate_rows(records: &[StructuredContractRecord]) -> Vec<RowIssue> {
    let mut issues = Vec::new();
    for record in records {
        for field in REQUIRED_FIELDS {
            if record.is_defaulted(field) {
                issues.push(RowIssue::new(record, RowIssueKind::DefaultedField { field }));
            }
        }
        match (record.data_inicio, record.data_termino) {
            (Some(start), Some(end)) if end < start => {
                issues.push(RowIssue::new(record, RowIssueKind::EndBeforeStart));
            }
            (start, end) => {
                if start.is_none() {
                    issues.push(RowIssue::new(
                        record,
                        RowIssueKind::MissingDate {
                            role: DateRole::Start,
                        },
                    ));
                }
                if end.is_none() {
                    issues.push(RowIssue::new(
                        record,
                        RowIssueKind::MissingDate { role: DateRole::End },
                    ));
                }
            }
        }
        if record.valor <= 0.0 {
            issues.push(RowIssue::new(record, RowIssueKind::ZeroValue));
        }
        if record.provenance.confidence < LOW_ROW_CONFIDENCE {
            issues.push(RowIssue::new(
                record,
                RowIssueKind::LowConfidence {
                    confidence: record.provenance.confidence,
                },
            ));
        }
    }
    issues
}
