/// Excel serial-date conversion for both workbook epochs.
///
/// This is the only place day counts become calendar dates; the detector, the
/// parser and the start/end column paths all call through here.
///
/// 1900 system: serial 1 is 1900-01-01. Excel also counts a phantom
/// 1900-02-29 as serial 60; that serial resolves to 1900-03-01, and every
/// serial above 60 is shifted back one day so that 61 is also 1900-03-01 and
/// 45292 is 2024-01-01.
///
/// 1904 system: serial 0 is 1904-01-01 with no phantom day.
use chrono::{Datelike as _, Days, NaiveDate};

/// Earliest year accepted from any date source.
pub const MIN_YEAR: i32 = 1900;

/// Latest year accepted from any date source.
pub const MAX_YEAR: i32 = 2100;

/// Serial of the phantom 1900-02-29 in the 1900 system.
const PHANTOM_LEAP_SERIAL: i64 = 60;

fn epoch(date1904: bool) -> Option<NaiveDate> {
    if date1904 {
        NaiveDate::from_ymd_opt(1904, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(1899, 12, 31)
    }
}

/// Converts an Excel serial to a calendar date, ignoring any time fraction.
///
/// Returns `None` for non-finite or negative serials, for serial 0 in the
/// 1900 system, and for results outside [`MIN_YEAR`]..=[`MAX_YEAR`].
pub fn serial_to_date(serial: f64, date1904: bool) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 0.0 || serial >= 1e7 {
        return None;
    }
    let days = serial.floor() as i64;
    let offset = if date1904 {
        days
    } else if days < 1 {
        return None;
    } else if days > PHANTOM_LEAP_SERIAL {
        days - 1
    } else {
        days
    };
    let date = epoch(date1904)?.checked_add_days(Days::new(u64::try_from(offset).ok()?))?;
    if (MIN_YEAR..=MAX_YEAR).contains(&date.year()) {
        Some(date)
    } else {
        None
    }
}

/// Converts a calendar date back to its Excel serial.
///
/// Dates before the epoch give `None`. In the 1900 system 1900-03-01 maps to
/// 61, the serial Excel itself writes for that day.
pub fn date_to_serial(date: NaiveDate, date1904: bool) -> Option<f64> {
    let base = epoch(date1904)?;
    let offset = date.signed_duration_since(base).num_days();
    if date1904 {
        return (offset >= 0).then_some(offset as f64);
    }
    if offset < 1 {
        return None;
    }
    let serial = if offset >= PHANTOM_LEAP_SERIAL {
        offset + 1
    } else {
        offset
    };
    Some(serial as f64)
}
