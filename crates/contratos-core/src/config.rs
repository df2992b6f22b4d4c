/// Tunable parameters for one extraction pass.
///
/// [`ExtractionConfig`] deserializes from any serde format with every key
/// optional, so a TOML file only needs to name what it overrides:
///
/// ```toml
/// day_month_bias = "month_first"
/// reference_year = 2024
/// ```
use chrono::Datelike as _;
use serde::{Deserialize, Serialize};

use crate::enums::DayMonthOrder;

/// Default minimum header score for a column to receive a field at all.
pub const DEFAULT_MIN_FIELD_CONFIDENCE: f64 = 0.5;

/// Default score above which a field counts as mapped during validation.
pub const DEFAULT_REQUIRED_FIELD_CONFIDENCE: f64 = 0.7;

/// Default number of non-empty values sampled per column.
pub const DEFAULT_SAMPLE_SIZE: usize = 50;

/// Extraction settings. All fields have sensible defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Whether numeric date serials use the Mac 1904 epoch.
    pub date1904: bool,
    /// Prior used when neither number in `a/b/year` exceeds 12.
    pub day_month_bias: DayMonthOrder,
    /// Year anchoring the two-digit-year window. `None` means the current year.
    pub reference_year: Option<i32>,
    /// Minimum header score for a column to be assigned a field.
    pub min_field_confidence: f64,
    /// Score above which a required field counts as mapped.
    pub required_field_confidence: f64,
    /// Maximum non-empty values sampled per column for type classification.
    pub sample_size: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            date1904: false,
            day_month_bias: DayMonthOrder::DayFirst,
            reference_year: None,
            min_field_confidence: DEFAULT_MIN_FIELD_CONFIDENCE,
            required_field_confidence: DEFAULT_REQUIRED_FIELD_CONFIDENCE,
            sample_size: DEFAULT_SAMPLE_SIZE,
        }
    }
}

impl ExtractionConfig {
    /// Returns the configured reference year, falling back to the local clock.
    pub fn effective_reference_year(&self) -> i32 {
        self.reference_year
            .unwrap_or_else(|| chrono::Local::now().year())
    }

    /// Returns a copy with `date1904` set.
    #[must_use]
    pub fn with_date1904(mut self, date1904: bool) -> Self {
        self.date1904 = date1904;
        self
    }

    /// Returns a copy with a fixed reference year.
    #[must_use]
    pub fn with_reference_year(mut self, year: i32) -> Self {
        self.reference_year = Some(year);
        self
    }

    /// Returns a copy with the given day/month bias.
    #[must_use]
    pub fn with_day_month_bias(mut self, bias: DayMonthOrder) -> Self {
        self.day_month_bias = bias;
        self
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;

    #[test]
    fn empty_toml_gives_defaults() {
        let cfg: ExtractionConfig = toml::from_str("").expect("parse empty config");
        assert_eq!(cfg, ExtractionConfig::default());
    }

    #[test]
    fn partial_toml_overrides_named_keys() {
        let cfg: ExtractionConfig = toml::from_str(
            "day_month_bias = \"month_first\"\nreference_year = 2024\ndate1904 = true\n",
        )
        .expect("parse config");
        assert_eq!(cfg.day_month_bias, DayMonthOrder::MonthFirst);
        assert_eq!(cfg.effective_reference_year(), 2024);
        assert!(cfg.date1904);
        assert_eq!(cfg.sample_size, DEFAULT_SAMPLE_SIZE);
    }

    #[test]
    fn builder_helpers_set_fields() {
        let cfg = ExtractionConfig::default()
            .with_date1904(true)
            .with_reference_year(2030)
            .with_day_month_bias(DayMonthOrder::MonthFirst);
        assert!(cfg.date1904);
        assert_eq!(cfg.reference_year, Some(2030));
        assert_eq!(cfg.day_month_bias, DayMonthOrder::MonthFirst);
    }
}
