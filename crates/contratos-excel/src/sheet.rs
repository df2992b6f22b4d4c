/// Conversion from `calamine` cells to the engine's [`CellValue`].
///
/// This is the only place `calamine::Data` is inspected. Typed date cells
/// become [`CellValue::Date`]; every other numeric cell stays a number so the
/// extractor can decide from the column header whether it is a serial date.
use calamine::{Data, Range};
use contratos_core::{CellValue, RawSheet};

/// Converts one `calamine` cell.
pub fn cell_from_data(cell: &Data) -> CellValue {
    match cell {
        Data::Empty | Data::Error(_) => CellValue::Empty,
        Data::String(s) => {
            if s.trim().is_empty() {
                CellValue::Empty
            } else {
                CellValue::Text(s.clone())
            }
        }
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Text(b.to_string()),
        Data::DateTime(dt) => {
            if dt.is_datetime() {
                match dt.as_datetime() {
                    Some(ndt) => CellValue::Date(ndt.date()),
                    None => CellValue::Number(dt.as_f64()),
                }
            } else {
                CellValue::Number(dt.as_f64())
            }
        }
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
    }
}

/// Converts a worksheet range into rows, header first.
///
/// The range starts at the first used cell, so a sheet whose table begins on
/// row 3 yields that row as its header.
pub fn range_to_rows(range: &Range<Data>) -> RawSheet {
    range
        .rows()
        .map(|row| row.iter().map(cell_from_data).collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_cells_map_to_engine_values() {
        assert_eq!(cell_from_data(&Data::Empty), CellValue::Empty);
        assert_eq!(cell_from_data(&Data::Float(45_292.0)), CellValue::Number(45_292.0));
        assert_eq!(cell_from_data(&Data::Int(7)), CellValue::Number(7.0));
        assert_eq!(
            cell_from_data(&Data::String("Pregão".to_owned())),
            CellValue::Text("Pregão".to_owned())
        );
        assert_eq!(cell_from_data(&Data::String("   ".to_owned())), CellValue::Empty);
        assert_eq!(
            cell_from_data(&Data::Error(calamine::CellErrorType::Ref)),
            CellValue::Empty
        );
    }

    #[test]
    fn iso_datetime_strings_stay_text() {
        let cell = Data::DateTimeIso("2024-01-15T00:00:00".to_owned());
        assert_eq!(
            cell_from_data(&cell),
            CellValue::Text("2024-01-15T00:00:00".to_owned())
        );
    }

    #[test]
    fn ranges_keep_row_order_and_width() {
        let mut range: Range<Data> = Range::new((0, 0), (1, 1));
        range.set_value((0, 0), Data::String("Número".to_owned()));
        range.set_value((0, 1), Data::String("Valor".to_owned()));
        range.set_value((1, 0), Data::String("001/2024".to_owned()));
        range.set_value((1, 1), Data::Float(1500.0));
        let rows = range_to_rows(&range);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][0], CellValue::from("Número"));
        assert_eq!(rows[1][1], CellValue::Number(1500.0));
    }
}
