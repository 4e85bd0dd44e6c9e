// Reading survey responses from Excel workbooks, as exported by the online
// form tools.

use calamine::{open_workbook, DataType, Reader, Xlsx};
use log::debug;
use snafu::prelude::*;

use crate::dashboard::{
    config_reader::SourceSettings,
    io_common::{CellValue, SheetData},
    *,
};

/// The names of the worksheets in a workbook, in file order.
pub fn list_worksheets(path: &str) -> DashResult<Vec<String>> {
    let workbook: Xlsx<_> =
        open_workbook(path).context(OpeningExcelSnafu { path })?;
    Ok(workbook.sheet_names().to_vec())
}

pub fn read_xlsx_sheet(path: &str, source: &SourceSettings) -> DashResult<SheetData> {
    let wrange = get_range(path, source)?;
    let header_row = source.header_row_index()?;

    let mut iter = wrange.rows();
    // The index starts at 1 to respect most conventions in the excel world
    for _ in 1..header_row {
        _ = iter.next();
    }
    let header = iter.next().context(EmptySheetSnafu { path })?;
    debug!("read_xlsx_sheet: header: {:?}", header);
    let headers: Vec<String> = header.iter().map(cell_text).collect();

    let mut rows: Vec<Vec<CellValue>> = Vec::new();
    for (idx, row) in iter.enumerate() {
        let lineno = (header_row + idx + 1) as u64;
        let mut cells: Vec<CellValue> = Vec::with_capacity(row.len());
        for cell in row.iter() {
            cells.push(convert_cell(cell, lineno)?);
        }
        rows.push(cells);
    }
    Ok(SheetData { headers, rows })
}

fn cell_text(cell: &DataType) -> String {
    match cell {
        DataType::String(s) => s.trim().to_string(),
        DataType::Float(f) => format!("{}", f),
        DataType::Int(i) => format!("{}", i),
        _ => String::new(),
    }
}

fn convert_cell(cell: &DataType, lineno: u64) -> DashResult<CellValue> {
    match cell {
        DataType::String(s) => Ok(CellValue::Text(s.clone())),
        DataType::Float(f) => Ok(CellValue::Number(*f)),
        DataType::Int(i) => Ok(CellValue::Number(*i as f64)),
        DataType::Bool(b) => Ok(CellValue::Number(if *b { 1.0 } else { 0.0 })),
        DataType::Empty => Ok(CellValue::Empty),
        x => Err(DashboardError::WrongCellType {
            lineno,
            content: format!("{:?}", x),
        }),
    }
}

fn get_range(path: &str, source: &SourceSettings) -> DashResult<calamine::Range<DataType>> {
    let worksheet_name_o = source.excel_worksheet_name.clone();
    debug!(
        "read_xlsx_sheet: path: {:?} worksheet: {:?}",
        &path, &worksheet_name_o
    );
    let mut workbook: Xlsx<_> =
        open_workbook(path).context(OpeningExcelSnafu { path })?;

    // A worksheet name was provided, use it.
    if let Some(worksheet_name) = worksheet_name_o {
        let wrange = workbook
            .worksheet_range(&worksheet_name)
            .context(MissingWorksheetSnafu {
                name: worksheet_name.clone(),
                path,
            })?
            .context(OpeningExcelSnafu { path })?;
        Ok(wrange)
    } else {
        let all_worksheets = workbook.worksheets();
        match all_worksheets.as_slice() {
            [] => EmptySheetSnafu { path }.fail(),
            [(worksheet_name, wrange)] => {
                debug!(
                    "read_xlsx_sheet: path: {:?} worksheet: {:?}",
                    &path, &worksheet_name
                );
                Ok(wrange.clone())
            }
            _ => {
                whatever!(
                    "Workbook {} has several worksheets, the worksheet name must be provided",
                    path
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture(name: &str) -> String {
        format!("{}/tests/data/{}", env!("CARGO_MANIFEST_DIR"), name)
    }

    fn source(header_row: usize, worksheet: Option<&str>) -> SourceSettings {
        let mut s = SourceSettings::with_header_row("xlsx", header_row);
        s.excel_worksheet_name = worksheet.map(|n| n.to_string());
        s
    }

    #[test]
    fn named_worksheet_with_banner_row() {
        // The fixture stores the question texts in row 2, below a banner row.
        let sheet = read_xlsx_sheet(
            &fixture("responses.xlsx"),
            &source(2, Some("Responses")),
        )
        .unwrap();
        let headers: Vec<&str> = sheet.headers.iter().map(String::as_str).collect();
        assert_eq!(
            headers,
            vec![
                "Department",
                "Recommend",
                "Overall",
                "Expectations: pay",
                "Satisfaction: pay"
            ]
        );
        assert_eq!(sheet.rows.len(), 2);
        assert_eq!(sheet.rows[0][0].as_text(), Some("Sales"));
        assert_eq!(sheet.rows[0][1], CellValue::Number(9.0));
        assert_eq!(sheet.rows[1][1].as_text(), Some("Detractor"));
        assert_eq!(sheet.rows[1][4], CellValue::Number(4.0));
    }

    #[test]
    fn missing_worksheet_is_reported() {
        let err = read_xlsx_sheet(&fixture("responses.xlsx"), &source(2, Some("Results")))
            .unwrap_err();
        match err {
            DashboardError::MissingWorksheet { name, .. } => assert_eq!(name, "Results"),
            x => panic!("unexpected error {:?}", x),
        }
    }

    #[test]
    fn single_worksheet_needs_no_name() {
        let sheet = read_xlsx_sheet(&fixture("single.xlsx"), &source(1, None)).unwrap();
        let headers: Vec<&str> = sheet.headers.iter().map(String::as_str).collect();
        assert_eq!(headers, vec!["Recommend", "Overall"]);
        assert_eq!(
            sheet.rows,
            vec![vec![CellValue::Number(10.0), CellValue::Number(5.0)]]
        );
    }

    #[test]
    fn several_worksheets_require_a_name() {
        assert!(read_xlsx_sheet(&fixture("responses.xlsx"), &source(2, None)).is_err());
    }

    #[test]
    fn worksheets_are_listed_in_file_order() {
        let names = list_worksheets(&fixture("responses.xlsx")).unwrap();
        assert_eq!(names, vec!["Notes".to_string(), "Responses".to_string()]);
    }
}
