#![allow(clippy::expect_used)]

use chrono::NaiveDate;

use super::*;
use crate::dates::DateFormatStrategy;
use crate::enums::{ContractStatus, DataType, DateFormat, Modalidade};
use crate::record::{Provenance, StructuredContractRecord};

fn column(index: usize, header: &str, field: ContractField, confidence: f64) -> ColumnAnalysis {
    ColumnAnalysis {
        index,
        header: header.to_owned(),
        data_type: DataType::Text,
        field: Some(field),
        confidence,
        samples: vec![],
        empty_count: 0,
        total_count: 10,
        date_strategy: None,
        pattern: None,
    }
}

fn full_mapping() -> Vec<ColumnAnalysis> {
    vec![
        column(0, "Número", ContractField::Numero, 1.0),
        column(1, "Objeto", ContractField::Objeto, 1.0),
        column(2, "Contratante", ContractField::Contratante, 1.0),
        column(3, "Contratada", ContractField::Contratada, 1.0),
        column(4, "Valor", ContractField::Valor, 1.0),
        column(5, "Data Início", ContractField::DataInicio, 0.9),
        column(6, "Data Fim", ContractField::DataTermino, 0.9),
    ]
}

fn without(field: ContractField) -> Vec<ColumnAnalysis> {
    full_mapping()
        .into_iter()
        .filter(|a| a.field != Some(field))
        .collect()
}

#[test]
fn complete_mapping_is_valid_and_quiet() {
    let report = validate(&full_mapping());
    assert!(report.is_valid);
    assert!(report.warnings.is_empty(), "{:?}", report.warnings);
    assert!(report.suggestions.is_empty());
    assert!(report.missing_fields.is_empty());
}

#[test]
fn missing_required_field_fails_validation() {
    let report = validate(&without(ContractField::Contratante));
    assert!(!report.is_valid);
    assert_eq!(report.missing_fields, vec!["contratante".to_owned()]);
    assert!(report.warnings.iter().any(|w| w.contains("contratante")));
}

#[test]
fn missing_recommended_field_only_suggests() {
    let report = validate(&without(ContractField::Valor));
    assert!(report.is_valid);
    assert!(report.missing_fields.is_empty());
    assert_eq!(report.suggestions.len(), 1);
    assert!(report.suggestions[0].contains("valor"));
}

#[test]
fn low_confidence_mapping_counts_as_missing() {
    let mut analyses = full_mapping();
    analyses[0].confidence = 0.7;
    let report = validate(&analyses);
    assert_eq!(report.missing_fields, vec!["numero".to_owned()]);
}

#[test]
fn configured_threshold_is_respected() {
    let mut analyses = full_mapping();
    analyses[0].confidence = 0.6;
    let config = ExtractionConfig {
        required_field_confidence: 0.5,
        ..ExtractionConfig::default()
    };
    assert!(validate_with(&analyses, &config).is_valid);
}

#[test]
fn mostly_empty_column_warns() {
    let mut analyses = full_mapping();
    analyses[1].empty_count = 9;
    let report = validate(&analyses);
    assert!(report.is_valid);
    assert!(
        report.warnings.iter().any(|w| w.contains("Objeto") && w.contains("90%")),
        "{:?}",
        report.warnings
    );
}

#[test]
fn uncertain_date_format_warns() {
    let mut analyses = full_mapping();
    analyses[5].data_type = DataType::Date;
    analyses[5].date_strategy = Some(DateFormatStrategy {
        format: DateFormat::DdMmYyyy,
        confidence: 0.4,
        samples: vec![],
        ambiguous: false,
    });
    let report = validate(&analyses);
    assert!(
        report
            .warnings
            .iter()
            .any(|w| w.contains("incerto") && w.contains("Data Início")),
        "{:?}",
        report.warnings
    );
}

#[test]
fn presumed_day_month_order_warns() {
    let mut analyses = full_mapping();
    analyses[6].date_strategy = Some(DateFormatStrategy {
        format: DateFormat::DdMmYyyy,
        confidence: 0.8,
        samples: vec![],
        ambiguous: true,
    });
    let report = validate(&analyses);
    assert!(report.warnings.iter().any(|w| w.contains("presumida")));
}

// ---------------------------------------------------------------------------
// Row issues
// ---------------------------------------------------------------------------

fn ymd(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(y, m, d)
}

fn record() -> StructuredContractRecord {
    StructuredContractRecord {
        numero: "001/2024".to_owned(),
        objeto: "Limpeza".to_owned(),
        contratante: "Prefeitura".to_owned(),
        contratada: "ACME".to_owned(),
        valor: 100.0,
        data_inicio: ymd(2024, 1, 1),
        data_termino: ymd(2024, 12, 31),
        prazo_execucao: None,
        prazo_unidade: None,
        modalidade: Modalidade::Pregao,
        status: ContractStatus::Vigente,
        observacoes: String::new(),
        aditivos: vec![],
        pagamentos: vec![],
        documentos: vec![],
        provenance: Provenance {
            row_number: 2,
            confidence: 0.9,
            ..Provenance::default()
        },
    }
}

#[test]
fn clean_row_has_no_issues() {
    assert!(validate_rows(&[record()]).is_empty());
}

#[test]
fn row_problems_are_flagged() {
    let mut r = record();
    r.provenance.defaulted_fields = vec![ContractField::Contratada, ContractField::Modalidade];
    r.data_termino = None;
    r.valor = 0.0;
    r.provenance.confidence = 0.3;
    let kinds: Vec<RowIssueKind> = validate_rows(&[r]).into_iter().map(|i| i.kind).collect();
    assert_eq!(
        kinds,
        vec![
            RowIssueKind::DefaultedField {
                field: ContractField::Contratada
            },
            RowIssueKind::MissingDate { role: DateRole::End },
            RowIssueKind::ZeroValue,
            RowIssueKind::LowConfidence { confidence: 0.3 },
        ]
    );
}

#[test]
fn inverted_dates_are_flagged_once() {
    let mut r = record();
    r.data_inicio = ymd(2024, 6, 1);
    r.data_termino = ymd(2024, 1, 1);
    let issues = validate_rows(&[r]);
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].kind, RowIssueKind::EndBeforeStart);
    assert_eq!(issues[0].severity, Severity::Warning);
    assert_eq!(issues[0].row_number, 2);
}

#[test]
fn row_issue_display_and_json() {
    let mut r = record();
    r.valor = 0.0;
    let issue = validate_rows(&[r]).into_iter().next().expect("one issue");
    assert_eq!(
        issue.to_string(),
        "[I] linha 2 (001/2024): Valor do contrato igual a zero"
    );
    let value = serde_json::to_value(&issue).expect("serialize");
    assert_eq!(value["kind"], "zero_value");
    assert_eq!(value["severity"], "info");
    assert_eq!(value["rowNumber"], 2);
}
