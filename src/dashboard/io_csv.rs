// Primitives for reading CSV exports.

use log::debug;
use snafu::prelude::*;

use crate::dashboard::{
    config_reader::SourceSettings,
    io_common::{CellValue, SheetData},
    *,
};

pub fn read_csv_sheet(path: &str, source: &SourceSettings) -> DashResult<SheetData> {
    let header_row = source.header_row_index()?;
    let rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .context(CsvOpenSnafu { path })?;
    let mut records = rdr.into_records();
    // The index starts at 1 to respect most conventions in the excel world
    for _ in 1..header_row {
        _ = records.next();
    }

    let header = match records.next() {
        Some(line_r) => line_r.context(CsvLineParseSnafu {})?,
        None => return EmptySheetSnafu { path }.fail(),
    };
    let headers: Vec<String> = header.iter().map(|s| s.trim().to_string()).collect();
    debug!("read_csv_sheet: header: {:?}", headers);

    let mut rows: Vec<Vec<CellValue>> = Vec::new();
    for line_r in records {
        let line = line_r.context(CsvLineParseSnafu {})?;
        let cells: Vec<CellValue> = line
            .iter()
            .map(|s| {
                if s.trim().is_empty() {
                    CellValue::Empty
                } else {
                    CellValue::Text(s.to_string())
                }
            })
            .collect();
        rows.push(cells);
    }
    Ok(SheetData { headers, rows })
}
