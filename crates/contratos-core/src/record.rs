/// The extraction output unit and its provenance metadata.
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::enums::{ContractStatus, Modalidade, PrazoUnidade};
use crate::prazo::Prazo;
use crate::synonyms::ContractField;

/// Objeto used when the sheet has no recognizable objeto column or the cell is blank.
pub const OBJETO_PLACEHOLDER: &str = "Objeto não identificado na planilha";

/// Contratante used when none could be extracted.
pub const CONTRATANTE_PLACEHOLDER: &str = "Contratante não identificado";

/// Contratada used when none could be extracted.
pub const CONTRATADA_PLACEHOLDER: &str = "Contratada não identificada";

/// Builds the default contract number for a row: `"<sheet>-LINHA-<row>"`.
pub fn default_numero(sheet_name: &str, row_number: usize) -> String {
    format!("{sheet_name}-LINHA-{row_number}")
}

/// Where a record came from and how much of it was inferred.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Provenance {
    /// Source file name as given by the caller.
    pub file_name: String,
    /// Source sheet name.
    pub sheet_name: String,
    /// 1-based spreadsheet row (the header is row 1).
    pub row_number: usize,
    /// Mean confidence of the core fields actually read from the row.
    pub confidence: f64,
    /// Human-readable date strategy per date field, e.g. `"dataInicio: DD/MM/YYYY (80%)"`.
    pub date_strategies: Vec<String>,
    /// Fields that hold a default rather than a value read from the sheet.
    pub defaulted_fields: Vec<ContractField>,
}

/// One contract extracted from a spreadsheet row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredContractRecord {
    pub numero: String,
    pub objeto: String,
    pub contratante: String,
    pub contratada: String,
    /// Never negative.
    pub valor: f64,
    #[serde(default, with = "crate::serde_helpers::date_or_empty")]
    pub data_inicio: Option<NaiveDate>,
    #[serde(default, with = "crate::serde_helpers::date_or_empty")]
    pub data_termino: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prazo_execucao: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prazo_unidade: Option<PrazoUnidade>,
    pub modalidade: Modalidade,
    pub status: ContractStatus,
    /// Provenance note for the reviewing user.
    pub observacoes: String,
    /// Filled by the addendum subsystem; always empty here.
    #[serde(default)]
    pub aditivos: Vec<serde_json::Value>,
    #[serde(default)]
    pub pagamentos: Vec<serde_json::Value>,
    #[serde(default)]
    pub documentos: Vec<serde_json::Value>,
    #[serde(default)]
    pub provenance: Provenance,
}

impl StructuredContractRecord {
    /// Returns the execution period if both parts are set.
    pub fn prazo(&self) -> Option<Prazo> {
        Some(Prazo::new(self.prazo_execucao?, self.prazo_unidade?))
    }

    /// Sets or clears the execution period.
    pub fn set_prazo(&mut self, prazo: Option<Prazo>) {
        self.prazo_execucao = prazo.map(|p| p.valor);
        self.prazo_unidade = prazo.map(|p| p.unidade);
    }

    /// `true` when `field` holds a default rather than a value from the sheet.
    pub fn is_defaulted(&self, field: ContractField) -> bool {
        self.provenance.defaulted_fields.contains(&field)
    }
}
