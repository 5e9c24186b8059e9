// ============================================================
// SPREADSHEET INFRASTRUCTURE LAYER
// ============================================================
// Load a dataset from .xlsx/.csv and write it back in the same format

mod csv_table;
mod xlsx;

use std::path::Path;

use tracing::debug;

use crate::domain::dataset::{ColumnNames, Dataset};
use crate::domain::error::{AppError, Result};

pub use csv_table::{CsvParser, CsvTable};

/// File format of a dataset, with the layout details needed to write it back
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpreadsheetFormat {
    Xlsx,
    Csv { delimiter: u8, bom: bool },
}

impl SpreadsheetFormat {
    /// Format implied by the file extension (CSV layout is refined on read)
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());

        match extension.as_deref() {
            Some("xlsx") => Ok(SpreadsheetFormat::Xlsx),
            Some("csv") => Ok(SpreadsheetFormat::Csv {
                delimiter: b',',
                bom: false,
            }),
            _ => Err(AppError::ValidationError(format!(
                "Unsupported file type (expected .xlsx or .csv): {}",
                path.display()
            ))),
        }
    }
}

/// Read the dataset at `path`, adding the classification column if missing.
pub fn read_dataset(path: &Path, columns: &ColumnNames) -> Result<(Dataset, SpreadsheetFormat)> {
    let (headers, rows, format) = match SpreadsheetFormat::from_path(path)? {
        SpreadsheetFormat::Xlsx => {
            let (headers, rows) = xlsx::read_xlsx(path)?;
            (headers, rows, SpreadsheetFormat::Xlsx)
        }
        SpreadsheetFormat::Csv { .. } => {
            let table = CsvParser::new().parse_file(path)?;
            let format = SpreadsheetFormat::Csv {
                delimiter: table.delimiter,
                bom: table.bom,
            };
            (table.headers, table.rows, format)
        }
    };

    debug!(
        path = %path.display(),
        columns = headers.len(),
        rows = rows.len(),
        "Read spreadsheet"
    );

    Ok((Dataset::from_table(headers, rows, &columns.classification), format))
}

pub fn write_dataset(path: &Path, dataset: &Dataset, format: SpreadsheetFormat) -> Result<()> {
    match format {
        SpreadsheetFormat::Xlsx => xlsx::write_xlsx(path, dataset),
        SpreadsheetFormat::Csv { delimiter, bom } => {
            csv_table::write_csv(path, dataset, delimiter, bom)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::dataset::CellValue;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            SpreadsheetFormat::from_path(Path::new("a/flota.XLSX")).unwrap(),
            SpreadsheetFormat::Xlsx
        );
        assert!(matches!(
            SpreadsheetFormat::from_path(Path::new("flota.csv")),
            Ok(SpreadsheetFormat::Csv { .. })
        ));
        assert!(matches!(
            SpreadsheetFormat::from_path(Path::new("flota.ods")),
            Err(AppError::ValidationError(_))
        ));
        assert!(SpreadsheetFormat::from_path(Path::new("flota")).is_err());
    }

    #[test]
    fn test_csv_round_trip_appends_classification_column() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("flota.csv");
        let output = dir.path().join("flota-inferido.csv");
        std::fs::write(
            &input,
            "anio;Marca;Modelo;color\n2020;Toyota;RAV4;rojo\n2015;Fiat;Palio;\n",
        )
        .unwrap();

        let columns = ColumnNames::default();
        let (dataset, format) = read_dataset(&input, &columns).unwrap();
        assert_eq!(
            format,
            SpreadsheetFormat::Csv {
                delimiter: b';',
                bom: false
            }
        );
        write_dataset(&output, &dataset, format).unwrap();

        let written = std::fs::read_to_string(&output).unwrap();
        assert_eq!(
            written,
            "anio;Marca;Modelo;color;tipo_vehiculo\n2020;Toyota;RAV4;rojo;\n2015;Fiat;Palio;;\n"
        );

        let (reread, _) = read_dataset(&output, &columns).unwrap();
        assert_eq!(reread.len(), dataset.len());
        assert_eq!(
            reread.value(0, "color"),
            Some(&CellValue::Text("rojo".to_string()))
        );
    }
}
