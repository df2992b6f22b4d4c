/// Contract fields and the header-synonym dictionary used to recognize them.
///
/// Synonyms are stored already normalized (see [`crate::normalize::normalize`]).
/// [`score_header`] matches a normalized header against every field and
/// returns the best `(field, score)` pair, the score already weighted by the
/// field's priority tier.
use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::normalize::contains_words;

/// A target field of the structured contract record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ContractField {
    /// Contract number.
    Numero,
    /// Subject-matter description.
    Objeto,
    /// Contracting authority.
    Contratante,
    /// Contracted supplier.
    Contratada,
    /// Total contract value.
    Valor,
    /// Start of the vigência.
    DataInicio,
    /// End of the vigência.
    DataTermino,
    /// Procurement method.
    Modalidade,
    /// Lifecycle status.
    Status,
    /// Execution period as free text (`"12 meses"`).
    Prazo,
}

/// Fields that must be mapped for a sheet to validate.
pub const REQUIRED_FIELDS: [ContractField; 4] = [
    ContractField::Numero,
    ContractField::Objeto,
    ContractField::Contratante,
    ContractField::Contratada,
];

/// Fields whose absence only produces a suggestion.
pub const RECOMMENDED_FIELDS: [ContractField; 3] = [
    ContractField::DataInicio,
    ContractField::DataTermino,
    ContractField::Valor,
];

impl ContractField {
    /// Every field, in dictionary order. Ties in header scoring go to the earlier field.
    pub const ALL: [Self; 10] = [
        Self::Numero,
        Self::Objeto,
        Self::Contratante,
        Self::Contratada,
        Self::Valor,
        Self::DataInicio,
        Self::DataTermino,
        Self::Modalidade,
        Self::Status,
        Self::Prazo,
    ];

    /// Returns the camelCase record key, e.g. `"dataInicio"`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Numero => "numero",
            Self::Objeto => "objeto",
            Self::Contratante => "contratante",
            Self::Contratada => "contratada",
            Self::Valor => "valor",
            Self::DataInicio => "dataInicio",
            Self::DataTermino => "dataTermino",
            Self::Modalidade => "modalidade",
            Self::Status => "status",
            Self::Prazo => "prazo",
        }
    }

    /// `true` for the two vigência date fields.
    pub fn is_date_field(self) -> bool {
        matches!(self, Self::DataInicio | Self::DataTermino)
    }

    /// Score multiplier for this field's priority tier.
    pub fn tier_weight(self) -> f64 {
        match self {
            Self::Numero | Self::Objeto | Self::Contratante | Self::Contratada | Self::Valor => 1.0,
            Self::DataInicio
            | Self::DataTermino
            | Self::Modalidade
            | Self::Status
            | Self::Prazo => 0.9,
        }
    }

    /// Normalized header synonyms for this field.
    pub fn synonyms(self) -> &'static [&'static str] {
        match self {
            Self::Numero => &[
                "numero",
                "numero do contrato",
                "numero contrato",
                "n contrato",
                "no contrato",
                "n do contrato",
                "contrato",
                "contrato n",
                "num contrato",
                "nr contrato",
                "codigo",
                "processo",
            ],
            Self::Objeto => &[
                "objeto",
                "objeto do contrato",
                "descricao",
                "descricao do objeto",
                "servico",
                "servicos",
                "finalidade",
                "especificacao",
            ],
            Self::Contratante => &[
                "contratante",
                "orgao",
                "orgao contratante",
                "secretaria",
                "prefeitura",
                "unidade gestora",
                "entidade",
            ],
            Self::Contratada => &[
                "contratada",
                "contratado",
                "fornecedor",
                "empresa",
                "razao social",
                "credor",
                "prestador",
            ],
            Self::Valor => &[
                "valor",
                "valor total",
                "valor global",
                "valor do contrato",
                "valor contratado",
                "preco",
                "montante",
                "vl total",
            ],
            Self::DataInicio => &[
                "data inicio",
                "data de inicio",
                "inicio",
                "inicio vigencia",
                "inicio da vigencia",
                "data assinatura",
                "data da assinatura",
                "assinatura",
                "data inicial",
                "dt inicio",
                "vigencia inicial",
            ],
            Self::DataTermino => &[
                "data fim",
                "data termino",
                "data de termino",
                "data final",
                "termino",
                "fim",
                "fim vigencia",
                "fim da vigencia",
                "termino vigencia",
                "vencimento",
                "data vencimento",
                "dt fim",
                "vigencia final",
                "validade",
            ],
            Self::Modalidade => &[
                "modalidade",
                "modalidade licitacao",
                "modalidade de licitacao",
                "tipo licitacao",
                "tipo de licitacao",
                "forma contratacao",
                "licitacao",
            ],
            Self::Status => &["status", "situacao", "estado", "situacao do contrato"],
            Self::Prazo => &[
                "prazo",
                "prazo de execucao",
                "prazo execucao",
                "prazo de vigencia",
                "duracao",
                "vigencia meses",
                "vigencia do contrato",
            ],
        }
    }
}

impl fmt::Display for ContractField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Synonyms that only count on an exact header match.
///
/// Portal exports qualify almost every column with "do Contrato"
/// ("Fornecedor do Contrato", "Prazo do Contrato"), so a bare "contrato"
/// must not claim those headers for `numero`.
const EXACT_ONLY: [&str; 1] = ["contrato"];

/// Raw (unweighted) similarity between a normalized header and one synonym.
///
/// | Relation                                 | Score            |
/// |------------------------------------------|------------------|
/// | equal                                    | 1.0              |
/// | synonym appears as whole words in header | 0.85             |
/// | header appears as whole words in synonym | 0.7              |
/// | token Jaccard ≥ 0.5                      | 0.6 × Jaccard    |
/// | otherwise                                | 0.0              |
///
/// Synonyms in [`EXACT_ONLY`] score 1.0 on equality and 0.0 otherwise.
pub fn synonym_similarity(header: &str, synonym: &str) -> f64 {
    if header.is_empty() || synonym.is_empty() {
        return 0.0;
    }
    if header == synonym {
        return 1.0;
    }
    if EXACT_ONLY.contains(&synonym) {
        return 0.0;
    }
    if contains_words(header, synonym) {
        return 0.85;
    }
    if contains_words(synonym, header) {
        return 0.7;
    }
    let a: BTreeSet<&str> = header.split(' ').collect();
    let b: BTreeSet<&str> = synonym.split(' ').collect();
    let inter = a.intersection(&b).count();
    let union = a.union(&b).count();
    if union == 0 {
        return 0.0;
    }
    let jaccard = inter as f64 / union as f64;
    if jaccard >= 0.5 { 0.6 * jaccard } else { 0.0 }
}

/// Best tier-weighted score of `header` against one field's synonyms.
pub fn field_score(header: &str, field: ContractField) -> f64 {
    field
        .synonyms()
        .iter()
        .map(|s| synonym_similarity(header, s))
        .fold(0.0, f64::max)
        * field.tier_weight()
}

/// Best-matching field for a normalized header, or `None` if nothing scores above zero.
pub fn score_header(header: &str) -> Option<(ContractField, f64)> {
    let mut best: Option<(ContractField, f64)> = None;
    for field in ContractField::ALL {
        let score = field_score(header, field);
        if score <= 0.0 {
            continue;
        }
        if best.is_none_or(|(_, s)| score > s) {
            best = Some((field, score));
        }
    }
    best
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;
    use crate::normalize::normalize;

    fn best(header: &str) -> Option<ContractField> {
        score_header(&normalize(header)).map(|(f, _)| f)
    }

    #[test]
    fn exact_synonyms_score_full_tier_weight() {
        let (field, score) = score_header("numero").expect("numero matches");
        assert_eq!(field, ContractField::Numero);
        assert!((score - 1.0).abs() < f64::EPSILON);
        let (field, score) = score_header("data inicio").expect("data inicio matches");
        assert_eq!(field, ContractField::DataInicio);
        assert!((score - 0.9).abs() < 1e-9);
    }

    #[test]
    fn common_headers_map_to_expected_fields() {
        assert_eq!(best("Número do Contrato"), Some(ContractField::Numero));
        assert_eq!(best("Objeto"), Some(ContractField::Objeto));
        assert_eq!(best("Órgão Contratante"), Some(ContractField::Contratante));
        assert_eq!(best("Razão Social"), Some(ContractField::Contratada));
        assert_eq!(best("Valor Total (R$)"), Some(ContractField::Valor));
        assert_eq!(best("Data Início"), Some(ContractField::DataInicio));
        assert_eq!(best("Data Fim"), Some(ContractField::DataTermino));
        assert_eq!(best("Término da Vigência"), Some(ContractField::DataTermino));
        assert_eq!(best("Situação"), Some(ContractField::Status));
        assert_eq!(best("Modalidade de Licitação"), Some(ContractField::Modalidade));
        assert_eq!(best("Prazo de Execução"), Some(ContractField::Prazo));
        assert_eq!(best("Observações internas"), None);
        assert_eq!(best("Contrato"), Some(ContractField::Numero));
    }

    #[test]
    fn do_contrato_qualifier_does_not_claim_numero() {
        assert_eq!(best("Fornecedor do Contrato"), Some(ContractField::Contratada));
        assert_eq!(
            best("Data de Assinatura do Contrato"),
            Some(ContractField::DataInicio)
        );
        assert_eq!(best("Prazo do Contrato"), Some(ContractField::Prazo));
        assert_eq!(best("Vigência do Contrato"), Some(ContractField::Prazo));
        assert_eq!(best("Modalidade do Contrato"), Some(ContractField::Modalidade));
        assert!(synonym_similarity("fornecedor do contrato", "contrato").abs() < f64::EPSILON);
    }

    #[test]
    fn similarity_relations() {
        assert!((synonym_similarity("valor total rs", "valor total") - 0.85).abs() < 1e-9);
        assert!((synonym_similarity("orgao", "orgao contratante") - 0.7).abs() < 1e-9);
        let j = synonym_similarity("termino data", "data termino");
        assert!((j - 0.6).abs() < 1e-9, "{j}");
        assert!(synonym_similarity("", "valor").abs() < f64::EPSILON);
    }

    #[test]
    fn substrings_inside_words_do_not_match() {
        // "fim" must not match inside "afim"
        assert!(synonym_similarity("afim", "fim").abs() < f64::EPSILON);
    }

    #[test]
    fn date_fields_flagged() {
        assert!(ContractField::DataInicio.is_date_field());
        assert!(!ContractField::Valor.is_date_field());
    }
}
