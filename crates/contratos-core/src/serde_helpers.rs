/// Serde helpers shared across the record model.
///
/// The primary export is [`date_or_empty`], which encodes an unknown date as
/// the empty-string sentinel consumers of the record expect instead of `null`.
use chrono::NaiveDate;

/// `Option<NaiveDate>` as `"YYYY-MM-DD"` or `""`.
///
/// | Rust             | JSON            |
/// |------------------|-----------------|
/// | `None`           | `""`            |
/// | `Some(date)`     | `"2024-01-15"`  |
///
/// On input, `null` and `""` both read as `None`. Use with
/// `#[serde(with = "crate::serde_helpers::date_or_empty")]`.
pub mod date_or_empty {
    use super::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d";

    /// Serializes a missing date as `""`.
    pub fn serialize<S>(date: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match date {
            Some(d) => serializer.collect_str(&d.format(FORMAT)),
            None => serializer.serialize_str(""),
        }
    }

    /// Reads `""`, `null` or an ISO date.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => NaiveDate::parse_from_str(s, FORMAT)
                .map(Some)
                .map_err(serde::de::Error::custom),
        }
    }
}
