/// Text normalization shared by every fuzzy match in the engine.
///
/// `"Número"`, `"numero"` and `"NÚMERO "` all normalize to `"numero"`.
use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Compiles a pattern literal used by one of the crate's `LazyLock` statics.
///
/// All patterns are compile-time literals, so `Regex::new` never returns `Err`
/// for them. A bad pattern degrades to `"a^"`, which never matches.
#[allow(clippy::unreachable)]
pub(crate) fn compile_regex(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|_| {
        // Never reached: "a^" is always a valid pattern.
        Regex::new("a^").unwrap_or_else(|_| unreachable!("regex engine broken"))
    })
}

/// Matches runs of non-word characters.
static NON_WORD_RE: LazyLock<Regex> = LazyLock::new(|| compile_regex(r"[^\w]+"));

/// Lower-cases, strips diacritics, replaces punctuation with spaces and
/// collapses whitespace. Total: empty input gives an empty string.
pub fn normalize(text: &str) -> String {
    let stripped = fold_accents(text);
    let spaced = NON_WORD_RE.replace_all(&stripped, " ");
    spaced
        .replace('_', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Lower-cases and strips combining diacritics, keeping punctuation intact.
///
/// Compatibility forms fold too, so the ordinal in `"Nº"` becomes `"no"`.
/// Some of them decompose to capitals, hence the second lower-casing.
pub fn fold_accents(text: &str) -> String {
    text.to_lowercase()
        .nfkd()
        .filter(|c| !('\u{0300}'..='\u{036f}').contains(c))
        .collect::<String>()
        .to_lowercase()
}

/// Returns `true` when `needle` appears in `haystack` as a whole-word sequence.
///
/// Both arguments must already be normalized.
pub fn contains_words(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    format!(" {haystack} ").contains(&format!(" {needle} "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accents_and_case_are_folded() {
        assert_eq!(normalize("Número"), "numero");
        assert_eq!(normalize("NÚMERO "), "numero");
        assert_eq!(normalize("numero"), "numero");
        assert_eq!(normalize("Término da Vigência"), "termino da vigencia");
    }

    #[test]
    fn punctuation_becomes_single_spaces() {
        assert_eq!(normalize("Data:  Início (prevista)"), "data inicio prevista");
        assert_eq!(normalize("valor_total"), "valor total");
        assert_eq!(normalize("R$ 1.234,56"), "r 1 234 56");
    }

    #[test]
    fn empty_and_symbol_only_inputs() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("  --- ** "), "");
    }

    #[test]
    fn cedilla_is_stripped() {
        assert_eq!(normalize("Licitação"), "licitacao");
    }

    #[test]
    fn ordinal_indicators_fold_to_letters() {
        assert_eq!(normalize("Nº Contrato"), "no contrato");
        assert_eq!(normalize("1ª Parcela"), "1a parcela");
    }

    #[test]
    fn invalid_pattern_never_matches() {
        let re = compile_regex("(unclosed");
        assert!(!re.is_match("(unclosed"));
        assert!(!re.is_match(""));
    }

    #[test]
    fn whole_word_containment() {
        assert!(contains_words("data fim vigencia", "fim"));
        assert!(contains_words("data fim vigencia", "data fim"));
        assert!(!contains_words("contratante", "contrata"));
        assert!(!contains_words("anything", ""));
    }
}
