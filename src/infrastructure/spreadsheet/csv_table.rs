// ============================================================
// CSV TABLES
// ============================================================
// Read and write delimited files with encoding and delimiter detection

use std::fs::File;
use std::io::Write;
use std::path::Path;

use csv::{ReaderBuilder, Trim, WriterBuilder};

use crate::domain::dataset::{CellValue, Dataset};
use crate::domain::error::{AppError, Result};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Raw CSV content plus the layout needed to write it back the same way
#[derive(Debug, Clone, PartialEq)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
    pub delimiter: u8,
    pub bom: bool,
}

/// CSV reader with encoding and delimiter detection. Field values are kept
/// byte for byte, surrounding whitespace included.
#[derive(Debug, Default)]
pub struct CsvParser;

impl CsvParser {
    pub fn new() -> Self {
        Self
    }

    pub fn parse_file(&self, path: &Path) -> Result<CsvTable> {
        let bytes = std::fs::read(path).map_err(|e| {
            AppError::IoError(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let bom = bytes.starts_with(UTF8_BOM);
        let content = decode(&bytes);
        let mut table = self.parse_content(&content)?;
        table.bom = bom;
        Ok(table)
    }

    pub fn parse_content(&self, content: &str) -> Result<CsvTable> {
        let delimiter = Self::detect_delimiter(content);

        let mut reader = ReaderBuilder::new()
            .delimiter(delimiter)
            .trim(Trim::None)
            .flexible(true)
            .from_reader(content.as_bytes());

        let headers = reader
            .headers()
            .map_err(|e| AppError::ParseError(format!("Failed to read CSV headers: {}", e)))?
            .iter()
            .map(|h| h.to_string())
            .collect();

        let mut rows = Vec::new();
        for (index, result) in reader.records().enumerate() {
            let record = result.map_err(|e| {
                AppError::ParseError(format!("Failed to parse CSV row {}: {}", index + 1, e))
            })?;

            // Numeric-looking cells stay text so they are written back verbatim
            let cells = record
                .iter()
                .map(|value| {
                    if value.is_empty() {
                        CellValue::Empty
                    } else {
                        CellValue::Text(value.to_string())
                    }
                })
                .collect();
            rows.push(cells);
        }

        Ok(CsvTable {
            headers,
            rows,
            delimiter,
            bom: false,
        })
    }

    /// Detect delimiter from content (comma, semicolon, tab, pipe)
    pub fn detect_delimiter(content: &str) -> u8 {
        let candidates = [b',', b';', b'\t', b'|'];
        let sample_lines: Vec<_> = content.lines().take(10).collect();

        let mut best_delimiter = b',';
        let mut best_score = 0.0f32;

        if sample_lines.is_empty() {
            return best_delimiter;
        }

        for &delimiter in &candidates {
            let field_counts: Vec<usize> = sample_lines
                .iter()
                .map(|line| line.bytes().filter(|&b| b == delimiter).count())
                .collect();

            // Score by consistency (low standard deviation) and frequency
            let avg = field_counts.iter().sum::<usize>() as f32 / field_counts.len() as f32;
            let variance = field_counts
                .iter()
                .map(|&x| (x as f32 - avg).powi(2))
                .sum::<f32>()
                / field_counts.len() as f32;

            let score = avg / (1.0 + variance.sqrt());

            if score > best_score {
                best_score = score;
                best_delimiter = delimiter;
            }
        }

        best_delimiter
    }
}

/// Write a dataset as CSV, always UTF-8
pub fn write_csv(path: &Path, dataset: &Dataset, delimiter: u8, bom: bool) -> Result<()> {
    let mut file = File::create(path)?;
    if bom {
        file.write_all(UTF8_BOM)?;
    }

    let mut writer = WriterBuilder::new().delimiter(delimiter).from_writer(file);
    writer.write_record(dataset.headers())?;
    for cells in dataset.output_rows() {
        writer.write_record(cells.iter().map(|cell| cell.to_string()))?;
    }
    writer.flush()?;
    Ok(())
}

/// UTF-8 when valid (BOM stripped), otherwise Windows-1252 as produced by
/// legacy spreadsheet exports.
fn decode(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(content) => content.to_string(),
        Err(_) => {
            let (content, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
            content.into_owned()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_csv() {
        let content = "anio,Marca,Modelo\n2020,Toyota,RAV4\n2018, Ford ,Ka";
        let table = CsvParser::new().parse_content(content).unwrap();

        assert_eq!(table.headers, vec!["anio", "Marca", "Modelo"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0][0], CellValue::Text("2020".to_string()));
        assert_eq!(table.rows[1][1], CellValue::Text(" Ford ".to_string()));
        assert_eq!(table.delimiter, b',');
    }

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(CsvParser::detect_delimiter("a,b,c\nd,e,f"), b',');
        assert_eq!(CsvParser::detect_delimiter("a;b;c\nd;e;f"), b';');
        assert_eq!(CsvParser::detect_delimiter(""), b',');
    }

    #[test]
    fn test_empty_fields_are_empty_cells() {
        let table = CsvParser::new()
            .parse_content("anio;Marca;Modelo;tipo_vehiculo\n2020;Fiat;Uno;\n")
            .unwrap();
        assert_eq!(table.delimiter, b';');
        assert_eq!(table.rows[0][3], CellValue::Empty);
    }

    #[test]
    fn test_untouched_columns_keep_whitespace_on_write() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("flota.csv");
        let output = dir.path().join("flota-inferido.csv");
        std::fs::write(&input, "anio, Marca ,Modelo,notas\n2020,Toyota,RAV4,  ver patente  \n").unwrap();

        let table = CsvParser::new().parse_file(&input).unwrap();
        assert_eq!(table.headers[1], " Marca ");
        assert_eq!(table.rows[0][3], CellValue::Text("  ver patente  ".to_string()));

        let dataset = Dataset::from_table(table.headers, table.rows, "tipo_vehiculo");
        write_csv(&output, &dataset, table.delimiter, table.bom).unwrap();

        assert_eq!(
            std::fs::read_to_string(&output).unwrap(),
            "anio, Marca ,Modelo,notas,tipo_vehiculo\n2020,Toyota,RAV4,  ver patente  ,\n"
        );
    }

    #[test]
    fn test_windows_1252_fallback() {
        // "Sedán" encoded as Windows-1252
        let bytes = b"Sed\xE1n";
        assert_eq!(decode(bytes), "Sedán");
        assert_eq!(decode("Coupé".as_bytes()), "Coupé");
        assert_eq!(decode(b"\xEF\xBB\xBFanio"), "anio");
    }

    #[test]
    fn test_write_keeps_delimiter_and_bom() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let dataset = Dataset::from_table(
            vec!["anio".to_string(), "Marca".to_string()],
            vec![vec![
                CellValue::Text("2020".to_string()),
                CellValue::Text("Citroën".to_string()),
            ]],
            "tipo_vehiculo",
        );

        write_csv(&path, &dataset, b';', true).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(UTF8_BOM));
        let table = CsvParser::new().parse_file(&path).unwrap();
        assert!(table.bom);
        assert_eq!(table.delimiter, b';');
        assert_eq!(table.headers, vec!["anio", "Marca", "tipo_vehiculo"]);
        assert_eq!(table.rows[0][1], CellValue::Text("Citroën".to_string()));
    }
}
