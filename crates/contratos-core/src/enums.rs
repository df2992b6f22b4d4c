/// Closed enumerations shared across the extraction engine.
///
/// Contract enums (`Modalidade`, `ContractStatus`, `PrazoUnidade`) serialize to
/// the lowercase identifiers the consuming application stores. Each offers a
/// lenient `from_text` that matches normalized cell text.
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::normalize::normalize;

/// Content classification of a sampled column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    /// At least 70% of values parse as dates.
    Date,
    /// At least 60% of values are free text.
    Text,
    /// At least 80% of values look numeric.
    Number,
    /// No category reaches its threshold.
    Mixed,
    /// Every sampled value is blank.
    Empty,
}

impl DataType {
    /// Returns the lowercase name used in serialized output.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Text => "text",
            Self::Number => "number",
            Self::Mixed => "mixed",
            Self::Empty => "empty",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Date encodings the format detector can infer for a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DateFormat {
    /// `15/01/2024`
    #[serde(rename = "DD/MM/YYYY")]
    DdMmYyyy,
    /// `01/15/2024`
    #[serde(rename = "MM/DD/YYYY")]
    MmDdYyyy,
    /// `2024-01-15` (also `2024/01/15`)
    #[serde(rename = "YYYY-MM-DD")]
    YyyyMmDd,
    /// `01/2024` or `01/24`
    #[serde(rename = "MM/YYYY")]
    MmYyyy,
    /// `15/01/24`
    #[serde(rename = "DD/MM/YY")]
    DdMmYy,
    /// `01/15/24`
    #[serde(rename = "MM/DD/YY")]
    MmDdYy,
    /// Excel day-count serial numbers.
    #[serde(rename = "EXCEL_SERIAL")]
    ExcelSerial,
}

impl DateFormat {
    /// Returns the conventional pattern label, e.g. `"DD/MM/YYYY"`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DdMmYyyy => "DD/MM/YYYY",
            Self::MmDdYyyy => "MM/DD/YYYY",
            Self::YyyyMmDd => "YYYY-MM-DD",
            Self::MmYyyy => "MM/YYYY",
            Self::DdMmYy => "DD/MM/YY",
            Self::MmDdYy => "MM/DD/YY",
            Self::ExcelSerial => "EXCEL_SERIAL",
        }
    }

    /// Day/month order implied by this format, if it carries one.
    pub fn day_month_order(self) -> Option<DayMonthOrder> {
        match self {
            Self::DdMmYyyy | Self::DdMmYy => Some(DayMonthOrder::DayFirst),
            Self::MmDdYyyy | Self::MmDdYy => Some(DayMonthOrder::MonthFirst),
            Self::YyyyMmDd | Self::MmYyyy | Self::ExcelSerial => None,
        }
    }
}

impl fmt::Display for DateFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Order of the two leading numbers in an `a/b/year` date token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayMonthOrder {
    /// `dd/mm`, the Brazilian convention.
    #[default]
    DayFirst,
    /// `mm/dd`
    MonthFirst,
}

/// How the date parser should read an ambiguous `a/b/year` token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateAssumption {
    /// Always read as `dd/mm/yyyy`.
    DayFirst,
    /// Always read as `mm/dd/yyyy`.
    MonthFirst,
    /// Use the column strategy, then unambiguous digits, then the locale bias.
    #[default]
    Auto,
}

/// Which end of the contract period a date column represents.
///
/// Month/year cells resolve to the first day of the month for a start column
/// and to the last day of the month for an end column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateRole {
    /// Start of the vigência.
    #[default]
    Start,
    /// End of the vigência.
    End,
}

impl DateRole {
    /// Returns the record field this role fills, e.g. `"dataInicio"`.
    pub fn field_name(self) -> &'static str {
        match self {
            Self::Start => "dataInicio",
            Self::End => "dataTermino",
        }
    }
}

impl fmt::Display for DateRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_name())
    }
}

/// Procurement method (modalidade de licitação).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modalidade {
    /// Pregão (default when nothing else matches).
    #[default]
    Pregao,
    /// Concorrência.
    Concorrencia,
    /// Tomada de preços.
    TomadaPrecos,
    /// Convite.
    Convite,
    /// Concurso.
    Concurso,
    /// Leilão.
    Leilao,
}

impl Modalidade {
    /// Returns the stored identifier, e.g. `"tomada_precos"`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pregao => "pregao",
            Self::Concorrencia => "concorrencia",
            Self::TomadaPrecos => "tomada_precos",
            Self::Convite => "convite",
            Self::Concurso => "concurso",
            Self::Leilao => "leilao",
        }
    }

    /// Recognizes a modalidade in free text such as `"Pregão Eletrônico nº 12/2024"`.
    pub fn from_text(text: &str) -> Option<Self> {
        let norm = normalize(text);
        if norm.is_empty() {
            return None;
        }
        if norm.contains("pregao") {
            Some(Self::Pregao)
        } else if norm.contains("concorrencia") {
            Some(Self::Concorrencia)
        } else if norm.contains("tomada") {
            Some(Self::TomadaPrecos)
        } else if norm.contains("convite") {
            Some(Self::Convite)
        } else if norm.contains("concurso") {
            Some(Self::Concurso)
        } else if norm.contains("leilao") {
            Some(Self::Leilao)
        } else {
            None
        }
    }
}

impl fmt::Display for Modalidade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle status of a contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractStatus {
    /// In force (default).
    #[default]
    Vigente,
    /// Temporarily suspended.
    Suspenso,
    /// Ended at term.
    Encerrado,
    /// Terminated early.
    Rescindido,
}

impl ContractStatus {
    /// Returns the stored identifier, e.g. `"vigente"`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Vigente => "vigente",
            Self::Suspenso => "suspenso",
            Self::Encerrado => "encerrado",
            Self::Rescindido => "rescindido",
        }
    }

    /// Recognizes a status word such as `"Ativo"`, `"Encerrado"` or `"Cancelado"`.
    pub fn from_text(text: &str) -> Option<Self> {
        let norm = normalize(text);
        if norm.is_empty() {
            return None;
        }
        let has = |stems: &[&str]| stems.iter().any(|s| norm.contains(s));
        if has(&["rescind", "cancelad", "anulad", "distrat"]) {
            Some(Self::Rescindido)
        } else if has(&["suspen", "paralisad"]) {
            Some(Self::Suspenso)
        } else if has(&[
            "encerrad", "finalizad", "concluid", "expirad", "vencid", "extint", "inativ",
        ]) {
            Some(Self::Encerrado)
        } else if has(&["vigente", "ativo", "em execucao", "em andamento", "vigor"]) {
            Some(Self::Vigente)
        } else {
            None
        }
    }
}

impl fmt::Display for ContractStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unit of the execution period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrazoUnidade {
    /// Days.
    Dias,
    /// Months.
    Meses,
    /// Years.
    Anos,
}

impl PrazoUnidade {
    /// Returns the stored identifier, e.g. `"meses"`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dias => "dias",
            Self::Meses => "meses",
            Self::Anos => "anos",
        }
    }

    /// Recognizes singular and plural unit words (`"dia"`, `"mês"`, `"anos"`).
    pub fn from_text(text: &str) -> Option<Self> {
        match normalize(text).as_str() {
            "dia" | "dias" | "d" => Some(Self::Dias),
            "mes" | "meses" | "m" => Some(Self::Meses),
            "ano" | "anos" | "a" => Some(Self::Anos),
            _ => None,
        }
    }
}

impl fmt::Display for PrazoUnidade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
