/// Record extraction: turns a raw sheet into [`StructuredContractRecord`]s.
///
/// # Pipeline
///
/// 1. Sheets with fewer than two rows, or with no usable headers, give no records.
/// 2. [`analyze_columns`] runs once over the header row; [`best_columns`]
///    picks one column per field.
/// 3. The start and end date columns are chosen separately by a combined
///    header and content score, falling back to the analyzer's mapping.
/// 4. Every non-blank data row becomes one record. Unmapped or unparseable
///    fields take their defaults. When both dates resolve, the date-derived
///    period replaces any prazo read from text.
/// 5. `observacoes` names the file, sheet, row and date strategies used.
///
/// [`extract_sheet`] additionally validates the mapping and the rows and
/// returns the [`ExtractionTrace`]. Nothing here performs I/O.
use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info, trace, warn};

use crate::cell::{CellValue, SheetInput, cell_at, row_is_blank};
use crate::columns::{ColumnAnalysis, analyze_columns, best_columns};
use crate::config::ExtractionConfig;
use crate::dates::{DateFormatStrategy, DateParseError, DateParseOptions, parse_date};
use crate::enums::{ContractStatus, DataType, DateAssumption, DateRole, Modalidade};
use crate::money::parse_value;
use crate::normalize::normalize;
use crate::prazo::{Prazo, parse_prazo_cell, period_between, scan_prazo};
use crate::record::{
    CONTRATADA_PLACEHOLDER, CONTRATANTE_PLACEHOLDER, OBJETO_PLACEHOLDER, Provenance,
    StructuredContractRecord, default_numero,
};
use crate::synonyms::{ContractField, field_score};
use crate::trace::{ExtractionTrace, TraceEvent};
use crate::validation::{RowIssue, ValidationReport, validate_rows, validate_with};

/// Weight of the header score when ranking date columns; content gets the rest.
const DATE_HEADER_WEIGHT: f64 = 0.6;

/// Minimum combined score for a column to be picked as a date source.
const MIN_DATE_COLUMN_SCORE: f64 = 0.4;

/// Fields averaged into a row's provenance confidence.
const CONFIDENCE_FIELDS: [ContractField; 7] = [
    ContractField::Numero,
    ContractField::Objeto,
    ContractField::Contratante,
    ContractField::Contratada,
    ContractField::Valor,
    ContractField::DataInicio,
    ContractField::DataTermino,
];

// ---------------------------------------------------------------------------
// Public entry points
// ---------------------------------------------------------------------------

/// Everything produced for one sheet.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetExtraction {
    pub sheet_name: String,
    pub records: Vec<StructuredContractRecord>,
    pub analyses: Vec<ColumnAnalysis>,
    pub report: ValidationReport,
    pub row_issues: Vec<RowIssue>,
    pub trace: ExtractionTrace,
}

/// Extracts records from one sheet's rows (row 0 is the header).
///
/// Runs the same pipeline as [`extract_sheet`] and keeps only the records;
/// call [`extract_sheet`] to get the report, row issues and trace as well.
pub fn extract(
    rows: &[Vec<CellValue>],
    sheet_name: &str,
    file_name: &str,
    config: &ExtractionConfig,
) -> Vec<StructuredContractRecord> {
    run_sheet(rows, sheet_name, file_name, config).records
}

/// Runs analysis, extraction and validation over one sheet.
pub fn extract_sheet(
    sheet: &SheetInput,
    file_name: &str,
    config: &ExtractionConfig,
) -> SheetExtraction {
    run_sheet(&sheet.rows, &sheet.name, file_name, config)
}

fn run_sheet(
    rows: &[Vec<CellValue>],
    sheet_name: &str,
    file_name: &str,
    config: &ExtractionConfig,
) -> SheetExtraction {
    let mut trace = ExtractionTrace::new();
    let (analyses, records) = match rows.split_first() {
        Some((headers, data)) if !data.is_empty() => {
            let analyses = analyze_columns(headers, data, config);
            let records = extract_with(&analyses, data, sheet_name, file_name, config, &mut trace);
            (analyses, records)
        }
        Some(_) | None => (Vec::new(), Vec::new()),
    };
    let report = validate_with(&analyses, config);
    let row_issues = validate_rows(&records);
    info!(
        sheet = sheet_name,
        records = records.len(),
        valid = report.is_valid,
        row_issues = row_issues.len(),
        trace_events = trace.len(),
        "sheet extracted"
    );
    SheetExtraction {
        sheet_name: sheet_name.to_owned(),
        records,
        analyses,
        report,
        row_issues,
        trace,
    }
}

/// Runs [`extract_sheet`] over every sheet with at least a header and one data row.
pub fn extract_workbook(
    sheets: &[SheetInput],
    file_name: &str,
    config: &ExtractionConfig,
) -> Vec<SheetExtraction> {
    sheets
        .iter()
        .filter(|s| {
            let usable = s.rows.len() >= 2;
            if !usable {
                debug!(sheet = %s.name, rows = s.rows.len(), "sheet skipped: too few rows");
            }
            usable
        })
        .map(|s| extract_sheet(s, file_name, config))
        .collect()
}

// ---------------------------------------------------------------------------
// Date column selection
// ---------------------------------------------------------------------------

/// A column chosen to supply one end of the vigência.
#[derive(Debug, Clone)]
struct DateColumn<'a> {
    analysis: &'a ColumnAnalysis,
    /// Header score for this role, used to resolve conflicts between roles.
    header_score: f64,
}

impl DateColumn<'_> {
    fn strategy(&self) -> Option<&DateFormatStrategy> {
        self.analysis.date_strategy.as_ref()
    }
}

fn role_field(role: DateRole) -> ContractField {
    match role {
        DateRole::Start => ContractField::DataInicio,
        DateRole::End => ContractField::DataTermino,
    }
}

fn content_score(analysis: &ColumnAnalysis) -> f64 {
    match analysis.date_strategy.as_ref() {
        Some(s) if analysis.data_type == DataType::Date => s.confidence,
        Some(_) | None => 0.0,
    }
}

/// Best column for `role` by `0.6 × header + 0.4 × content`.
fn select_date_column(analyses: &[ColumnAnalysis], role: DateRole) -> Option<DateColumn<'_>> {
    let field = role_field(role);
    let mut best: Option<(DateColumn<'_>, f64)> = None;
    for analysis in analyses {
        let header_score = field_score(&normalize(&analysis.header), field);
        if header_score <= 0.0 {
            continue;
        }
        let combined =
            DATE_HEADER_WEIGHT * header_score + (1.0 - DATE_HEADER_WEIGHT) * content_score(analysis);
        if combined < MIN_DATE_COLUMN_SCORE {
            continue;
        }
        if best.as_ref().is_none_or(|(_, s)| combined > *s) {
            best = Some((
                DateColumn {
                    analysis,
                    header_score,
                },
                combined,
            ));
        }
    }
    best.map(|(c, _)| c)
}

/// Picks the start and end date columns, never the same column for both.
fn select_date_columns<'a>(
    analyses: &'a [ColumnAnalysis],
    mapped: &BTreeMap<ContractField, &'a ColumnAnalysis>,
) -> (Option<DateColumn<'a>>, Option<DateColumn<'a>>) {
    let pick = |role: DateRole| {
        select_date_column(analyses, role).or_else(|| {
            mapped.get(&role_field(role)).map(|a| DateColumn {
                analysis: *a,
                header_score: a.confidence,
            })
        })
    };
    let mut start = pick(DateRole::Start);
    let mut end = pick(DateRole::End);
    let keep_start = match (&start, &end) {
        (Some(s), Some(e)) if s.analysis.index == e.analysis.index => {
            Some(s.header_score >= e.header_score)
        }
        (Some(_) | None, Some(_) | None) => None,
    };
    match keep_start {
        Some(true) => end = None,
        Some(false) => start = None,
        None => {}
    }
    (start, end)
}

// ---------------------------------------------------------------------------
// Row extraction
// ---------------------------------------------------------------------------

struct SheetContext<'a> {
    sheet_name: &'a str,
    file_name: &'a str,
    config: &'a ExtractionConfig,
    reference_year: i32,
    mapped: BTreeMap<ContractField, &'a ColumnAnalysis>,
    start: Option<DateColumn<'a>>,
    end: Option<DateColumn<'a>>,
    date_notes: Vec<String>,
}

fn extract_with(
    analyses: &[ColumnAnalysis],
    data: &[Vec<CellValue>],
    sheet_name: &str,
    file_name: &str,
    config: &ExtractionConfig,
    trace: &mut ExtractionTrace,
) -> Vec<StructuredContractRecord> {
    if analyses.is_empty() {
        warn!(sheet = sheet_name, "no usable headers; nothing extracted");
        return Vec::new();
    }
    let mapped = best_columns(analyses);
    for (field, analysis) in &mapped {
        trace.push(TraceEvent::ColumnMapped {
            column: analysis.index,
            header: analysis.header.clone(),
            field: *field,
            confidence: analysis.confidence,
        });
    }
    let (start, end) = select_date_columns(analyses, &mapped);

    let mut date_notes = Vec::new();
    for (role, column) in [(DateRole::Start, &start), (DateRole::End, &end)] {
        let Some(column) = column else {
            continue;
        };
        let Some(strategy) = column.strategy() else {
            continue;
        };
        trace.push(TraceEvent::DateColumnSelected {
            role,
            column: column.analysis.index,
            header: column.analysis.header.clone(),
            format: strategy.format,
            confidence: strategy.confidence,
        });
        date_notes.push(format!("{role}: {}", strategy.describe()));
        if strategy.ambiguous && strategy.format.day_month_order().is_some() {
            warn!(
                column = column.analysis.index,
                header = %column.analysis.header,
                format = %strategy.format,
                "day/month order assumed from locale bias"
            );
            trace.push(TraceEvent::AmbiguousDayMonth {
                column: column.analysis.index,
                header: column.analysis.header.clone(),
                assumed: config.day_month_bias,
            });
        }
    }

    let ctx = SheetContext {
        sheet_name,
        file_name,
        config,
        reference_year: config.effective_reference_year(),
        mapped,
        start,
        end,
        date_notes,
    };

    let mut records = Vec::new();
    for (offset, row) in data.iter().enumerate() {
        // Header is spreadsheet row 1.
        let row_number = offset + 2;
        if row_is_blank(row) {
            trace.push(TraceEvent::RowSkipped { row: row_number });
            continue;
        }
        records.push(extract_row(&ctx, row, row_number, trace));
    }
    records
}

/// Confidence-weighted text of a mapped field, or `None` when unmapped or blank.
fn mapped_text(
    ctx: &SheetContext<'_>,
    row: &[CellValue],
    field: ContractField,
) -> Option<(String, f64)> {
    let analysis = ctx.mapped.get(&field)?;
    let text = cell_at(row, analysis.index).to_text();
    (!text.is_empty()).then_some((text, analysis.confidence))
}

fn parse_row_date(
    ctx: &SheetContext<'_>,
    row: &[CellValue],
    row_number: usize,
    role: DateRole,
    trace: &mut ExtractionTrace,
) -> Option<(NaiveDate, f64)> {
    let column = match role {
        DateRole::Start => ctx.start.as_ref(),
        DateRole::End => ctx.end.as_ref(),
    }?;
    let cell = cell_at(row, column.analysis.index);
    let opts = DateParseOptions {
        assume: DateAssumption::Auto,
        role,
        date1904: ctx.config.date1904,
        strategy: column.strategy(),
        bias: ctx.config.day_month_bias,
        reference_year: ctx.reference_year,
    };
    match parse_date(cell, &opts) {
        Ok(date) => Some((date, column.header_score.max(column.analysis.confidence))),
        Err(DateParseError::Blank) => None,
        Err(err) => {
            trace.push(TraceEvent::CellUnparsed {
                row: row_number,
                column: column.analysis.index,
                field: role_field(role),
                value: cell.to_text(),
                reason: err.to_string(),
            });
            None
        }
    }
}

fn extract_row(
    ctx: &SheetContext<'_>,
    row: &[CellValue],
    row_number: usize,
    trace: &mut ExtractionTrace,
) -> StructuredContractRecord {
    trace!(row = row_number, "extracting row");
    let mut defaulted = Vec::new();
    let mut confidences: BTreeMap<ContractField, f64> = BTreeMap::new();

    let mut text_field = |field: ContractField, default: &dyn Fn() -> String| -> String {
        if let Some((text, confidence)) = mapped_text(ctx, row, field) {
            confidences.insert(field, confidence);
            text
        } else {
            defaulted.push(field);
            default()
        }
    };
    let numero = text_field(ContractField::Numero, &|| {
        default_numero(ctx.sheet_name, row_number)
    });
    let objeto = text_field(ContractField::Objeto, &|| OBJETO_PLACEHOLDER.to_owned());
    let contratante = text_field(ContractField::Contratante, &|| {
        CONTRATANTE_PLACEHOLDER.to_owned()
    });
    let contratada = text_field(ContractField::Contratada, &|| {
        CONTRATADA_PLACEHOLDER.to_owned()
    });

    let valor = match ctx.mapped.get(&ContractField::Valor) {
        Some(analysis) => {
            let cell = cell_at(row, analysis.index);
            let valor = parse_value(cell);
            if valor > 0.0 {
                confidences.insert(ContractField::Valor, analysis.confidence);
            } else if !cell.is_blank() && !cell.to_text().chars().any(|c| c.is_ascii_digit()) {
                trace.push(TraceEvent::CellUnparsed {
                    row: row_number,
                    column: analysis.index,
                    field: ContractField::Valor,
                    value: cell.to_text(),
                    reason: "no numeric amount".to_owned(),
                });
            }
            valor
        }
        None => {
            defaulted.push(ContractField::Valor);
            0.0
        }
    };

    let modalidade = match mapped_text(ctx, row, ContractField::Modalidade) {
        Some((text, _)) => Modalidade::from_text(&text).unwrap_or_else(|| {
            defaulted.push(ContractField::Modalidade);
            Modalidade::default()
        }),
        None => {
            defaulted.push(ContractField::Modalidade);
            Modalidade::default()
        }
    };
    let status = match mapped_text(ctx, row, ContractField::Status) {
        Some((text, _)) => ContractStatus::from_text(&text).unwrap_or_else(|| {
            defaulted.push(ContractField::Status);
            ContractStatus::default()
        }),
        None => {
            defaulted.push(ContractField::Status);
            ContractStatus::default()
        }
    };

    let data_inicio = parse_row_date(ctx, row, row_number, DateRole::Start, trace);
    let data_termino = parse_row_date(ctx, row, row_number, DateRole::End, trace);
    for (field, parsed) in [
        (ContractField::DataInicio, data_inicio),
        (ContractField::DataTermino, data_termino),
    ] {
        match parsed {
            Some((_, confidence)) => {
                confidences.insert(field, confidence);
            }
            None => defaulted.push(field),
        }
    }
    let data_inicio = data_inicio.map(|(d, _)| d);
    let data_termino = data_termino.map(|(d, _)| d);

    let text_prazo = ctx
        .mapped
        .get(&ContractField::Prazo)
        .and_then(|a| parse_prazo_cell(cell_at(row, a.index)))
        .or_else(|| {
            if defaulted.contains(&ContractField::Objeto) {
                None
            } else {
                scan_prazo(&objeto)
            }
        });
    let prazo = resolve_prazo(text_prazo, data_inicio, data_termino, row_number, trace);

    let confidence = CONFIDENCE_FIELDS
        .iter()
        .map(|f| confidences.get(f).copied().unwrap_or(0.0))
        .sum::<f64>()
        / CONFIDENCE_FIELDS.len() as f64;

    let observacoes = provenance_note(ctx, row_number);
    let mut record = StructuredContractRecord {
        numero,
        objeto,
        contratante,
        contratada,
        valor,
        data_inicio,
        data_termino,
        prazo_execucao: None,
        prazo_unidade: None,
        modalidade,
        status,
        observacoes,
        aditivos: Vec::new(),
        pagamentos: Vec::new(),
        documentos: Vec::new(),
        provenance: Provenance {
            file_name: ctx.file_name.to_owned(),
            sheet_name: ctx.sheet_name.to_owned(),
            row_number,
            confidence,
            date_strategies: ctx.date_notes.clone(),
            defaulted_fields: defaulted,
        },
    };
    record.set_prazo(prazo);
    record
}

/// The date-derived period wins whenever both dates are known.
fn resolve_prazo(
    text_prazo: Option<Prazo>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    row_number: usize,
    trace: &mut ExtractionTrace,
) -> Option<Prazo> {
    let (Some(start), Some(end)) = (start, end) else {
        return text_prazo;
    };
    let derived = period_between(start, end)?;
    if let Some(parsed) = text_prazo {
        if parsed != derived {
            trace.push(TraceEvent::PrazoOverridden {
                row: row_number,
                parsed,
                derived,
            });
        }
    }
    Some(derived)
}

fn provenance_note(ctx: &SheetContext<'_>, row_number: usize) -> String {
    let dates = if ctx.date_notes.is_empty() {
        "nenhuma coluna de data identificada".to_owned()
    } else {
        ctx.date_notes.join("; ")
    };
    format!(
        "Importado automaticamente de \"{}\", aba \"{}\", linha {row_number}. Datas: {dates}.",
        ctx.file_name, ctx.sheet_name
    )
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;
    use crate::cell::text_sheet;
    use crate::enums::{DateFormat, DayMonthOrder, PrazoUnidade};

    fn config() -> ExtractionConfig {
        ExtractionConfig::default().with_reference_year(2024)
    }

    fn ymd(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    fn sheet(rows: &[&[&str]]) -> SheetInput {
        SheetInput::new("Contratos", text_sheet(rows))
    }

    #[test]
    fn end_to_end_single_record() {
        let rows = text_sheet(&[
            &["Numero", "Objeto", "Contratada", "Valor", "Data Inicio", "Data Fim"],
            &[
                "001/2024",
                "Limpeza",
                "ACME Ltda",
                "R$ 10.000,00",
                "01/01/2024",
                "01/07/2024",
            ],
            &["", "", "", "", "", ""],
        ]);
        let records = extract(&rows, "Plan1", "contratos.xlsx", &config());
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.numero, "001/2024");
        assert!((r.valor - 10_000.0).abs() < 1e-9);
        assert_eq!(r.data_inicio, ymd(2024, 1, 1));
        assert_eq!(r.data_termino, ymd(2024, 7, 1));
        assert_eq!(r.prazo_execucao, Some(6));
        assert_eq!(r.prazo_unidade, Some(PrazoUnidade::Meses));
        assert_eq!(r.contratante, CONTRATANTE_PLACEHOLDER);
        assert!(r.observacoes.contains("Plan1"));
        assert!(r.observacoes.contains("linha 2"));
        assert!(r.observacoes.contains("contratos.xlsx"));
    }

    #[test]
    fn period_of_400_days_is_months() {
        let rows = text_sheet(&[
            &["Numero", "Data Inicio", "Data Fim"],
            &["1", "2024-01-01", "2025-02-04"],
        ]);
        let records = extract(&rows, "S", "f.xlsx", &config());
        assert_eq!(records[0].prazo_unidade, Some(PrazoUnidade::Meses));
        assert_eq!(records[0].prazo_execucao, Some(13));
    }

    #[test]
    fn plain_extract_matches_sheet_extraction() {
        let input = sheet(&[
            &["Numero", "Prazo", "Data Inicio", "Data Fim"],
            &["1", "12 meses", "01/01/2024", "01/07/2024"],
            &["", "", "", ""],
            &["2", "90 dias", "31/02/2024", ""],
        ]);
        let full = extract_sheet(&input, "f.xlsx", &config());
        let records = extract(&input.rows, &input.name, "f.xlsx", &config());
        assert_eq!(records, full.records);
        assert!(!full.trace.is_empty());
    }

    #[test]
    fn do_contrato_headers_map_to_their_own_fields() {
        let rows = text_sheet(&[
            &["Objeto", "Fornecedor do Contrato", "Data de Assinatura do Contrato"],
            &["Limpeza urbana", "ACME LTDA", "15/01/2024"],
        ]);
        let records = extract(&rows, "S", "f", &config());
        let r = &records[0];
        assert_eq!(r.contratada, "ACME LTDA");
        assert_eq!(r.numero, "S-LINHA-2");
        assert_eq!(r.data_inicio, ymd(2024, 1, 15));
        assert!(r.is_defaulted(ContractField::Numero));
    }

    #[test]
    fn too_few_rows_give_nothing() {
        let header_only = text_sheet(&[&["Numero", "Objeto"]]);
        assert!(extract(&header_only, "S", "f", &config()).is_empty());
        assert!(extract(&[], "S", "f", &config()).is_empty());
    }

    #[test]
    fn blank_headers_give_nothing() {
        let rows = text_sheet(&[&["", ""], &["a", "b"]]);
        assert!(extract(&rows, "S", "f", &config()).is_empty());
    }

    #[test]
    fn unmapped_fields_take_defaults() {
        let rows = text_sheet(&[&["Coluna X"], &["qualquer coisa"]]);
        let records = extract(&rows, "Aba1", "f.csv", &config());
        let r = &records[0];
        assert_eq!(r.numero, "Aba1-LINHA-2");
        assert_eq!(r.objeto, OBJETO_PLACEHOLDER);
        assert_eq!(r.contratada, CONTRATADA_PLACEHOLDER);
        assert!(r.valor.abs() < f64::EPSILON);
        assert_eq!(r.modalidade, Modalidade::Pregao);
        assert_eq!(r.status, ContractStatus::Vigente);
        assert_eq!(r.data_inicio, None);
        assert!(r.observacoes.contains("nenhuma coluna de data"));
        assert!(r.provenance.confidence.abs() < f64::EPSILON);
        assert!(r.is_defaulted(ContractField::Numero));
    }

    #[test]
    fn enumerations_are_recognized() {
        let rows = text_sheet(&[
            &["Numero", "Modalidade", "Situação"],
            &["1", "Tomada de Preços", "Encerrado"],
            &["2", "???", "Cancelado"],
        ]);
        let records = extract(&rows, "S", "f", &config());
        assert_eq!(records[0].modalidade, Modalidade::TomadaPrecos);
        assert_eq!(records[0].status, ContractStatus::Encerrado);
        assert_eq!(records[1].modalidade, Modalidade::Pregao);
        assert!(records[1].is_defaulted(ContractField::Modalidade));
        assert_eq!(records[1].status, ContractStatus::Rescindido);
    }

    #[test]
    fn date_derived_period_overrides_prazo_column() {
        let input = sheet(&[
            &["Numero", "Prazo", "Data Inicio", "Data Fim"],
            &["1", "12 meses", "01/01/2024", "01/07/2024"],
            &["2", "90 dias", "", ""],
        ]);
        let out = extract_sheet(&input, "f.xlsx", &config());
        assert_eq!(
            out.records[0].prazo(),
            Some(Prazo::new(6, PrazoUnidade::Meses))
        );
        assert_eq!(
            out.records[1].prazo(),
            Some(Prazo::new(90, PrazoUnidade::Dias))
        );
        assert!(out.trace.iter().any(|e| matches!(
            e,
            TraceEvent::PrazoOverridden { row: 2, parsed, .. } if parsed.valor == 12
        )));
    }

    #[test]
    fn prazo_is_scanned_from_objeto() {
        let rows = text_sheet(&[
            &["Numero", "Objeto"],
            &["1", "Coleta de lixo, prazo de 24 meses"],
        ]);
        let records = extract(&rows, "S", "f", &config());
        assert_eq!(records[0].prazo(), Some(Prazo::new(24, PrazoUnidade::Meses)));
    }

    #[test]
    fn inverted_dates_keep_dates_but_no_period() {
        let input = sheet(&[
            &["Numero", "Data Inicio", "Data Fim"],
            &["1", "01/07/2024", "01/01/2024"],
        ]);
        let out = extract_sheet(&input, "f", &config());
        let r = &out.records[0];
        assert_eq!(r.data_inicio, ymd(2024, 7, 1));
        assert_eq!(r.prazo(), None);
        assert!(
            out.row_issues
                .iter()
                .any(|i| i.kind == crate::validation::RowIssueKind::EndBeforeStart)
        );
    }

    #[test]
    fn unparseable_dates_are_traced_not_fatal() {
        let input = sheet(&[
            &["Numero", "Data Inicio"],
            &["1", "15/01/2024"],
            &["2", "31/02/2024"],
            &["3", "a definir"],
        ]);
        let out = extract_sheet(&input, "f", &config());
        assert_eq!(out.records.len(), 3);
        assert_eq!(out.records[0].data_inicio, ymd(2024, 1, 15));
        assert_eq!(out.records[1].data_inicio, None);
        let unparsed: Vec<usize> = out
            .trace
            .iter()
            .filter_map(|e| match e {
                TraceEvent::CellUnparsed { row, .. } => Some(*row),
                TraceEvent::ColumnMapped { .. }
                | TraceEvent::DateColumnSelected { .. }
                | TraceEvent::AmbiguousDayMonth { .. }
                | TraceEvent::RowSkipped { .. }
                | TraceEvent::PrazoOverridden { .. } => None,
            })
            .collect();
        assert_eq!(unparsed, vec![3, 4]);
    }

    #[test]
    fn month_first_columns_are_detected_and_parsed() {
        let rows = text_sheet(&[
            &["Numero", "Data Inicio", "Data Fim"],
            &["1", "01/15/2024", "12/31/2024"],
            &["2", "03/20/2024", "03/04/2025"],
        ]);
        let records = extract(&rows, "S", "f", &config());
        assert_eq!(records[0].data_inicio, ymd(2024, 1, 15));
        assert_eq!(records[1].data_termino, ymd(2025, 3, 4));
    }

    #[test]
    fn ambiguous_columns_are_traced_and_follow_bias() {
        let rows = text_sheet(&[&["Numero", "Data Inicio"], &["1", "03/04/2024"]]);
        let input = SheetInput::new("S", rows);

        let day_first = extract_sheet(&input, "f", &config());
        assert_eq!(day_first.records[0].data_inicio, ymd(2024, 4, 3));
        assert!(day_first.trace.iter().any(|e| matches!(
            e,
            TraceEvent::AmbiguousDayMonth {
                assumed: DayMonthOrder::DayFirst,
                ..
            }
        )));
        assert!(day_first.records[0].observacoes.contains("presumido"));

        let month_first = extract_sheet(
            &input,
            "f",
            &config().with_day_month_bias(DayMonthOrder::MonthFirst),
        );
        assert_eq!(month_first.records[0].data_inicio, ymd(2024, 3, 4));
    }

    #[test]
    fn excel_serials_respect_epoch() {
        let rows = vec![
            vec![CellValue::from("Numero"), CellValue::from("Data Assinatura")],
            vec![CellValue::from("1"), CellValue::Number(45292.0)],
        ];
        let r1900 = extract(&rows, "S", "f", &config());
        assert_eq!(r1900[0].data_inicio, ymd(2024, 1, 1));
        let r1904 = extract(&rows, "S", "f", &config().with_date1904(true));
        assert_eq!(r1904[0].data_inicio, ymd(2028, 1, 2));
    }

    #[test]
    fn best_date_column_wins_over_weaker_header() {
        let input = sheet(&[
            &["Numero", "Data Assinatura", "Data Início", "Data Término"],
            &["1", "10/12/2023", "15/01/2024", "31/12/2024"],
        ]);
        let out = extract_sheet(&input, "f", &config());
        assert_eq!(out.records[0].data_inicio, ymd(2024, 1, 15));
        let selected: Vec<(DateRole, usize)> = out
            .trace
            .iter()
            .filter_map(|e| match e {
                TraceEvent::DateColumnSelected { role, column, .. } => Some((*role, *column)),
                TraceEvent::ColumnMapped { .. }
                | TraceEvent::AmbiguousDayMonth { .. }
                | TraceEvent::RowSkipped { .. }
                | TraceEvent::CellUnparsed { .. }
                | TraceEvent::PrazoOverridden { .. } => None,
            })
            .collect();
        assert_eq!(selected, vec![(DateRole::Start, 2), (DateRole::End, 3)]);
    }

    #[test]
    fn blank_rows_are_skipped_and_traced() {
        let input = sheet(&[&["Numero"], &["1"], &[""], &["3"]]);
        let out = extract_sheet(&input, "f", &config());
        assert_eq!(out.records.len(), 2);
        assert_eq!(out.records[1].provenance.row_number, 4);
        assert!(out.trace.iter().any(|e| *e == TraceEvent::RowSkipped { row: 3 }));
    }

    #[test]
    fn sheet_extraction_validates_mapping() {
        let input = sheet(&[
            &["Numero", "Objeto", "Contratada", "Valor"],
            &["1", "Limpeza", "ACME", "100"],
        ]);
        let out = extract_sheet(&input, "f", &config());
        assert!(!out.report.is_valid);
        assert_eq!(out.report.missing_fields, vec!["contratante".to_owned()]);
        assert_eq!(out.analyses.len(), 4);
    }

    #[test]
    fn workbook_skips_short_sheets() {
        let sheets = vec![
            sheet(&[&["Numero"], &["1"]]),
            SheetInput::new("Vazia", vec![]),
            SheetInput::new("SoCabecalho", text_sheet(&[&["Numero"]])),
        ];
        let out = extract_workbook(&sheets, "f", &config());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].sheet_name, "Contratos");
    }

    #[test]
    fn native_date_cells_pass_through() {
        let rows = vec![
            vec![CellValue::from("Numero"), CellValue::from("Início")],
            vec![
                CellValue::from("1"),
                CellValue::Date(NaiveDate::from_ymd_opt(2023, 5, 10).expect("valid date")),
            ],
        ];
        let records = extract(&rows, "S", "f", &config());
        assert_eq!(records[0].data_inicio, ymd(2023, 5, 10));
        let out = extract_sheet(&SheetInput::new("S", rows), "f", &config());
        assert_eq!(
            out.analyses[1].date_strategy.as_ref().map(|s| s.format),
            Some(DateFormat::YyyyMmDd)
        );
    }
}
