/// Execution period (`prazoExecucao` + `prazoUnidade`).
///
/// Two sources exist. [`period_between`] derives the period from the vigência
/// dates and always wins. [`parse_prazo_cell`] and [`scan_prazo`] read it from
/// free text (`"12 meses"`, `"prazo de 90 dias"`) and only fill the record when
/// the dates are not both known.
use std::fmt;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::cell::CellValue;
use crate::enums::PrazoUnidade;
use crate::normalize::{compile_regex, normalize};

/// Periods up to this many days are reported in days.
const MAX_DAYS: i64 = 90;

/// Periods up to this many days are reported in months; longer ones in years.
const MAX_MONTH_DAYS: i64 = 730;

const DAYS_PER_MONTH: f64 = 365.25 / 12.0;
const DAYS_PER_YEAR: f64 = 365.25;

/// `12 meses`, `90 (noventa) dias`, `2 anos`
static AMOUNT_UNIT_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_regex(r"\b(\d{1,5}) (?:[a-z]+ )?(dias?|mes|meses|anos?)\b"));

/// `prazo de execucao de 12 meses`, `prazo 180 dias`
static PRAZO_MENTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile_regex(
        r"\bprazo (?:de )?(?:(?:execucao|vigencia|entrega) )?(?:de |e )?(\d{1,5}) (?:[a-z]+ )?(dias?|mes|meses|anos?)\b",
    )
});

static BARE_NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| compile_regex(r"^\d{1,5}$"));

/// A period magnitude with its unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Prazo {
    /// Whole number of units.
    pub valor: u32,
    /// Unit of `valor`.
    pub unidade: PrazoUnidade,
}

impl Prazo {
    /// Creates a period.
    pub fn new(valor: u32, unidade: PrazoUnidade) -> Self {
        Self { valor, unidade }
    }
}

impl fmt::Display for Prazo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.valor, self.unidade)
    }
}

/// Derives the period between two dates.
///
/// Up to 90 days the period is in days, up to 730 days it is rounded to whole
/// months, beyond that to whole years. Returns `None` when `end` precedes `start`.
pub fn period_between(start: NaiveDate, end: NaiveDate) -> Option<Prazo> {
    let days = end.signed_duration_since(start).num_days();
    if days < 0 {
        return None;
    }
    let (valor, unidade) = if days <= MAX_DAYS {
        (days as f64, PrazoUnidade::Dias)
    } else if days <= MAX_MONTH_DAYS {
        ((days as f64 / DAYS_PER_MONTH).round(), PrazoUnidade::Meses)
    } else {
        ((days as f64 / DAYS_PER_YEAR).round(), PrazoUnidade::Anos)
    };
    u32::try_from(valor as i64)
        .ok()
        .map(|v| Prazo::new(v, unidade))
}

/// Reads a prazo column cell. Bare numbers are days.
pub fn parse_prazo_cell(cell: &CellValue) -> Option<Prazo> {
    match cell {
        CellValue::Number(n) if n.is_finite() && *n >= 0.0 && n.fract() == 0.0 => {
            u32::try_from(*n as i64)
                .ok()
                .map(|v| Prazo::new(v, PrazoUnidade::Dias))
        }
        CellValue::Text(s) => {
            let norm = normalize(s);
            if BARE_NUMBER_RE.is_match(&norm) {
                return norm
                    .parse::<u32>()
                    .ok()
                    .map(|v| Prazo::new(v, PrazoUnidade::Dias));
            }
            amount_and_unit(&AMOUNT_UNIT_RE, &norm)
        }
        CellValue::Number(_) | CellValue::Date(_) | CellValue::Empty => None,
    }
}

/// Looks for a `prazo de N <unidade>` mention inside free text such as an objeto.
pub fn scan_prazo(text: &str) -> Option<Prazo> {
    amount_and_unit(&PRAZO_MENTION_RE, &normalize(text))
}

fn amount_and_unit(re: &Regex, norm: &str) -> Option<Prazo> {
    let caps = re.captures(norm)?;
    let valor = caps.get(1)?.as_str().parse::<u32>().ok()?;
    let unidade = PrazoUnidade::from_text(caps.get(2)?.as_str())?;
    Some(Prazo::new(valor, unidade))
}
