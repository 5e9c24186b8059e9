use std::path::Path;

use calamine::{open_workbook, Data, ExcelDateTime, ExcelDateTimeType, Reader, Xlsx};
use rust_xlsxwriter::{Format, Workbook};

use crate::domain::dataset::{CellValue, Dataset};
use crate::domain::error::{AppError, Result};

/// Read the first worksheet; the first row holds the headers.
pub fn read_xlsx(path: &Path) -> Result<(Vec<String>, Vec<Vec<CellValue>>)> {
    let mut workbook: Xlsx<_> = open_workbook(path).map_err(|e| {
        AppError::SpreadsheetError(format!(
            "Failed to open Excel file {}: {}",
            path.display(),
            e
        ))
    })?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| AppError::SpreadsheetError("No worksheet found".to_string()))?
        .map_err(|e| {
            AppError::SpreadsheetError(format!(
                "Failed to read Excel range {}: {}",
                path.display(),
                e
            ))
        })?;

    let mut rows = range.rows();
    let headers = match rows.next() {
        Some(header_row) => header_row
            .iter()
            .map(|cell| to_cell_value(cell).as_text().unwrap_or_default())
            .collect(),
        None => Vec::new(),
    };

    let body = rows
        .map(|row| row.iter().map(to_cell_value).collect())
        .collect();

    Ok((headers, body))
}

/// Write headers and output rows to a single-sheet workbook.
pub fn write_xlsx(path: &Path, dataset: &Dataset) -> Result<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    let date_format = Format::new().set_num_format("yyyy-mm-dd");
    let datetime_format = Format::new().set_num_format("yyyy-mm-dd hh:mm:ss");
    let duration_format = Format::new().set_num_format("[h]:mm:ss");

    for (col, header) in dataset.headers().iter().enumerate() {
        worksheet.write_string(0, column_number(col)?, header)?;
    }

    for (index, cells) in dataset.output_rows().enumerate() {
        let row = row_number(index + 1)?;
        for (col, cell) in cells.iter().enumerate() {
            let col = column_number(col)?;
            match cell {
                CellValue::Empty => {}
                CellValue::Text(text) => {
                    worksheet.write_string(row, col, text)?;
                }
                CellValue::Number(number) => {
                    worksheet.write_number(row, col, *number)?;
                }
                CellValue::Bool(value) => {
                    worksheet.write_boolean(row, col, *value)?;
                }
                CellValue::Date(serial) => {
                    let format = if serial.fract() == 0.0 {
                        &date_format
                    } else {
                        &datetime_format
                    };
                    worksheet.write_number_with_format(row, col, *serial, format)?;
                }
                CellValue::Duration(days) => {
                    worksheet.write_number_with_format(row, col, *days, &duration_format)?;
                }
            }
        }
    }

    workbook.save(path)?;
    Ok(())
}

fn to_cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(text) => CellValue::Text(text.clone()),
        Data::Float(number) => CellValue::Number(*number),
        Data::Int(number) => CellValue::Number(*number as f64),
        Data::Bool(value) => CellValue::Bool(*value),
        Data::DateTime(value) => date_time_value(value),
        // ISO 8601 cells (`t="d"`) keep their text
        Data::DateTimeIso(text) | Data::DurationIso(text) => CellValue::Text(text.clone()),
        Data::Error(error) => CellValue::Text(error.to_string()),
    }
}

/// Days between the 1900 and 1904 date systems
const EPOCH_1904_OFFSET: f64 = 1462.0;

/// Dates are rebased onto the 1900 system the writer uses.
fn date_time_value(value: &ExcelDateTime) -> CellValue {
    let serial = value.as_f64();
    let is = |kind, is_1904| *value == ExcelDateTime::new(serial, kind, is_1904);

    if is(ExcelDateTimeType::TimeDelta, false) || is(ExcelDateTimeType::TimeDelta, true) {
        CellValue::Duration(serial)
    } else if is(ExcelDateTimeType::DateTime, true) {
        CellValue::Date(serial + EPOCH_1904_OFFSET)
    } else {
        CellValue::Date(serial)
    }
}

fn row_number(index: usize) -> Result<u32> {
    u32::try_from(index)
        .map_err(|_| AppError::SpreadsheetError(format!("Row {} out of range", index)))
}

fn column_number(index: usize) -> Result<u16> {
    u16::try_from(index)
        .map_err(|_| AppError::SpreadsheetError(format!("Column {} out of range", index)))
}
