/// Structured record of the decisions made during one extraction pass.
///
/// The extractor pushes a [`TraceEvent`] for every inference a reviewer may
/// want to audit. Events are also mirrored to `tracing` at debug level, so the
/// CLI can show them with `--verbose` while tests assert on the list directly.
use std::fmt;

use serde::Serialize;

use crate::enums::{DateFormat, DateRole, DayMonthOrder};
use crate::prazo::Prazo;
use crate::synonyms::ContractField;

/// One inference or degradation observed while extracting a sheet.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TraceEvent {
    /// A column was chosen as the source of a field.
    ColumnMapped {
        column: usize,
        header: String,
        field: ContractField,
        confidence: f64,
    },
    /// A column was chosen as the start or end date source.
    DateColumnSelected {
        role: DateRole,
        column: usize,
        header: String,
        format: DateFormat,
        confidence: f64,
    },
    /// A date column's day/month order rested on the locale prior alone.
    AmbiguousDayMonth {
        column: usize,
        header: String,
        assumed: DayMonthOrder,
    },
    /// A fully blank data row was skipped.
    RowSkipped { row: usize },
    /// A non-blank cell could not be parsed and the field fell back to its default.
    CellUnparsed {
        row: usize,
        column: usize,
        field: ContractField,
        value: String,
        reason: String,
    },
    /// A prazo read from text disagreed with the date-derived period and was replaced.
    PrazoOverridden {
        row: usize,
        parsed: Prazo,
        derived: Prazo,
    },
}

impl fmt::Display for TraceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ColumnMapped {
                column,
                header,
                field,
                confidence,
            } => write!(
                f,
                "column {column} {header:?} -> {field} ({:.0}%)",
                confidence * 100.0
            ),
            Self::DateColumnSelected {
                role,
                column,
                header,
                format,
                confidence,
            } => write!(
                f,
                "{role} from column {column} {header:?} as {format} ({:.0}%)",
                confidence * 100.0
            ),
            Self::AmbiguousDayMonth {
                column,
                header,
                assumed,
            } => {
                let order = match assumed {
                    DayMonthOrder::DayFirst => "day-first",
                    DayMonthOrder::MonthFirst => "month-first",
                };
                write!(f, "column {column} {header:?}: no decisive date, assumed {order}")
            }
            Self::RowSkipped { row } => write!(f, "row {row}: blank, skipped"),
            Self::CellUnparsed {
                row,
                column,
                field,
                value,
                reason,
            } => write!(
                f,
                "row {row}, column {column}: {field} value {value:?} not parsed ({reason})"
            ),
            Self::PrazoOverridden {
                row,
                parsed,
                derived,
            } => write!(
                f,
                "row {row}: prazo {parsed} replaced by {derived} derived from dates"
            ),
        }
    }
}

/// Ordered list of [`TraceEvent`]s for one sheet.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ExtractionTrace {
    events: Vec<TraceEvent>,
}

impl ExtractionTrace {
    /// Creates an empty trace.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an event and mirrors it to `tracing`.
    pub fn push(&mut self, event: TraceEvent) {
        tracing::debug!(%event, "extraction");
        self.events.push(event);
    }

    /// All events in the order they were recorded.
    pub fn events(&self) -> &[TraceEvent] {
        &self.events
    }

    /// Number of recorded events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// `true` when nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Iterates over the events.
    pub fn iter(&self) -> std::slice::Iter<'_, TraceEvent> {
        self.events.iter()
    }
}

impl<'a> IntoIterator for &'a ExtractionTrace {
    type Item = &'a TraceEvent;
    type IntoIter = std::slice::Iter<'a, TraceEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}
