//! Property-based checks for the cell-level parsers.
//!
//! `proptest`-generated dates, serials and free text exercise the total
//! functions of the engine: none of them may panic, and the date paths must
//! agree with each other.
#![allow(clippy::expect_used)]

use chrono::{Datelike as _, Days, NaiveDate};
use proptest::prelude::*;

use contratos_core::dates::{MAX_YEAR, MIN_YEAR};
use contratos_core::{
    CellValue, DateParseOptions, PrazoUnidade, date_to_serial, normalize, parse_date,
    parse_value, period_between, serial_to_date,
};

fn options() -> DateParseOptions<'static> {
    DateParseOptions {
        reference_year: 2024,
        ..DateParseOptions::default()
    }
}

fn arb_date() -> impl Strategy<Value = NaiveDate> {
    (MIN_YEAR..=MAX_YEAR, 1u32..=12, 1u32..=28).prop_map(|(y, m, d)| {
        NaiveDate::from_ymd_opt(y, m, d).expect("day 28 exists in every month")
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn iso_text_parses_to_the_same_date(date in arb_date()) {
        let text = CellValue::from(date.format("%Y-%m-%d").to_string());
        prop_assert_eq!(parse_date(&text, &options()), Ok(date));
    }

    #[test]
    fn brazilian_text_with_day_above_twelve_is_day_first(date in arb_date()) {
        prop_assume!(date.day() > 12);
        let text = CellValue::from(date.format("%d/%m/%Y").to_string());
        prop_assert_eq!(parse_date(&text, &options()), Ok(date));
    }

    #[test]
    fn serials_stay_in_the_supported_year_range(serial in 1u32..=73_415) {
        let date = serial_to_date(f64::from(serial), false).expect("serial in range");
        prop_assert!((MIN_YEAR..=MAX_YEAR).contains(&date.year()));
    }

    #[test]
    fn serials_after_the_phantom_day_round_trip(serial in 61u32..=73_415) {
        let date = serial_to_date(f64::from(serial), false).expect("serial in range");
        prop_assert_eq!(date_to_serial(date, false), Some(f64::from(serial)));
    }

    #[test]
    fn epochs_differ_by_1462_days(serial in 61u32..=70_000) {
        let d1900 = serial_to_date(f64::from(serial), false).expect("1900 serial");
        let d1904 = serial_to_date(f64::from(serial), true).expect("1904 serial");
        prop_assert_eq!(d1900.checked_add_days(Days::new(1462)), Some(d1904));
    }

    #[test]
    fn normalize_is_idempotent(text in "[a-zA-ZÀ-ÿ0-9 ,./_()-]{0,40}") {
        let once = normalize(&text);
        prop_assert_eq!(normalize(&once), once.clone());
        prop_assert!(!once.starts_with(' ') && !once.ends_with(' '));
    }

    #[test]
    fn parse_value_is_total_and_non_negative(text in "\\PC{0,30}") {
        let v = parse_value(&CellValue::from(text));
        prop_assert!(v.is_finite());
        prop_assert!(v >= 0.0);
    }

    #[test]
    fn period_unit_follows_the_day_count(start in arb_date(), days in 0u64..5_000) {
        let Some(end) = start.checked_add_days(Days::new(days)) else {
            return Ok(());
        };
        let prazo = period_between(start, end).expect("end is not before start");
        let expected = if days <= 90 {
            PrazoUnidade::Dias
        } else if days <= 730 {
            PrazoUnidade::Meses
        } else {
            PrazoUnidade::Anos
        };
        prop_assert_eq!(prazo.unidade, expected);
        prop_assert!(period_between(end, start).is_none() || days == 0);
    }
}
