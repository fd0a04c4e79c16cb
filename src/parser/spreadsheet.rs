use crate::parser::error::ParseError;
use crate::types::raw_table::RawTable;
use calamine::{open_workbook_auto_from_rs, Data, ExcelDateTime, Reader};
use chrono::NaiveTime;
use log::debug;
use std::io::Cursor;

/// Reads the first worksheet of a real spreadsheet (xls, xlsx, ods), using its
/// first non-empty row as labels.
pub(crate) fn parse_spreadsheet(bytes: &[u8]) -> Result<RawTable, ParseError> {
    let mut workbook =
        open_workbook_auto_from_rs(Cursor::new(bytes.to_vec())).map_err(ParseError::Spreadsheet)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(ParseError::EmptySpreadsheet)?
        .map_err(ParseError::Spreadsheet)?;

    let mut rows = range
        .rows()
        .map(|row| row.iter().map(cell_to_string).collect::<Vec<_>>())
        .skip_while(|cells| cells.iter().all(|c| c.is_empty()));

    let header = rows.next().ok_or(ParseError::EmptySpreadsheet)?;
    let mut table = RawTable::new(header);
    if table.width() == 0 {
        return Err(ParseError::EmptySpreadsheet);
    }

    let mut skipped = 0usize;
    for cells in rows {
        if cells.iter().all(|c| c.is_empty()) {
            continue;
        }
        if !table.push_row(cells) {
            skipped += 1;
        }
    }
    debug!(
        "Read spreadsheet with {} columns, {} rows ({} skipped)",
        table.width(),
        table.height(),
        skipped
    );
    Ok(table)
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::DateTime(value) => datetime_to_string(value),
        other => other.to_string(),
    }
}

/// Date cells as `YYYY-MM-DD`, time cells as `HH:MM:SS`, both when the
/// serial carries a date and a time of day.
fn datetime_to_string(value: &ExcelDateTime) -> String {
    let Some(datetime) = value.as_datetime() else {
        return value.as_f64().to_string();
    };
    if value.as_f64() < 1.0 {
        datetime.format("%H:%M:%S").to_string()
    } else if datetime.time() == NaiveTime::MIN {
        datetime.format("%Y-%m-%d").to_string()
    } else {
        datetime.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}
