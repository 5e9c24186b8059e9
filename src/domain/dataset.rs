// ============================================================
// DATASET TYPES
// ============================================================
// In-memory table loaded from a spreadsheet, with per-row classification

use serde::{Deserialize, Serialize};
use std::fmt;

use super::vehicle::{Classification, VehicleQuery};

/// A single cell as read from the input file.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    /// Spreadsheet date or date-time, as its serial day number
    Date(f64),
    /// Spreadsheet time span, as a fraction of days
    Duration(f64),
}

impl CellValue {
    /// Whether the cell holds nothing meaningful (blank or whitespace only)
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(text) => text.trim().is_empty(),
            CellValue::Number(n) | CellValue::Date(n) | CellValue::Duration(n) => n.is_nan(),
            CellValue::Bool(_) => false,
        }
    }

    /// Trimmed text form, `None` for empty cells
    pub fn as_text(&self) -> Option<String> {
        if self.is_empty() {
            return None;
        }
        Some(self.to_string().trim().to_string())
    }

    /// Integer year, accepting `2020`, `2020.0` and `" 2020 "`
    pub fn as_year(&self) -> Option<i32> {
        let number = match self {
            CellValue::Number(n) => *n,
            CellValue::Text(text) => {
                let trimmed = text.trim();
                match trimmed.parse::<i32>() {
                    Ok(year) => return Some(year),
                    Err(_) => trimmed.parse::<f64>().ok()?,
                }
            }
            CellValue::Empty
            | CellValue::Bool(_)
            | CellValue::Date(_)
            | CellValue::Duration(_) => return None,
        };

        if number.fract() != 0.0 || number < i32::MIN as f64 || number > i32::MAX as f64 {
            return None;
        }
        Some(number as i32)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(text) => f.write_str(text),
            CellValue::Number(n) | CellValue::Date(n) | CellValue::Duration(n)
                if n.fract() == 0.0 && n.abs() < 1e15 =>
            {
                write!(f, "{}", *n as i64)
            }
            CellValue::Number(n) | CellValue::Date(n) | CellValue::Duration(n) => {
                write!(f, "{}", n)
            }
            CellValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

/// Column names the classifier reads from and writes to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnNames {
    pub year: String,
    pub make: String,
    pub model: String,
    pub classification: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            year: "anio".to_string(),
            make: "Marca".to_string(),
            model: "Modelo".to_string(),
            classification: "tipo_vehiculo".to_string(),
        }
    }
}

/// One data row. `cells` is always as wide as the dataset's headers.
/// `changed` marks rows classified during this run.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    cells: Vec<CellValue>,
    classification: Classification,
    changed: bool,
}

impl Row {
    pub fn cells(&self) -> &[CellValue] {
        &self.cells
    }

    pub fn classification(&self) -> &Classification {
        &self.classification
    }
}

/// Ordered rows plus headers, owned by one batch run.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    headers: Vec<String>,
    rows: Vec<Row>,
    classification_column: usize,
}

impl Dataset {
    /// Build a dataset from raw rows, adding the classification column when
    /// the headers lack it. Short rows are padded with empty cells; rows wider
    /// than the header get unnamed columns so no cell is dropped.
    pub fn from_table(
        mut headers: Vec<String>,
        raw_rows: Vec<Vec<CellValue>>,
        classification_column: &str,
    ) -> Self {
        let widest = raw_rows.iter().map(Vec::len).max().unwrap_or(0);
        if widest > headers.len() {
            headers.resize(widest, String::new());
        }

        let classification_index = match headers
            .iter()
            .position(|h| h.trim() == classification_column)
        {
            Some(index) => index,
            None => {
                headers.push(classification_column.to_string());
                headers.len() - 1
            }
        };

        let width = headers.len();
        let rows = raw_rows
            .into_iter()
            .map(|mut cells| {
                cells.resize(width, CellValue::Empty);
                let classification = match cells[classification_index].as_text() {
                    Some(label) => Classification::Classified(label),
                    None => Classification::Unset,
                };
                Row {
                    cells,
                    classification,
                    changed: false,
                }
            })
            .collect();

        Self {
            headers,
            rows,
            classification_column: classification_index,
        }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Header lookup, ignoring whitespace around header names
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h.trim() == name)
    }

    pub fn classification_column(&self) -> usize {
        self.classification_column
    }

    pub fn value(&self, row: usize, column: &str) -> Option<&CellValue> {
        let index = self.column_index(column)?;
        self.rows.get(row).map(|r| &r.cells[index])
    }

    pub fn set_classification(&mut self, row: usize, classification: Classification) {
        if let Some(target) = self.rows.get_mut(row) {
            target.changed = matches!(classification, Classification::Classified(_));
            target.classification = classification;
        }
    }

    /// Build the oracle query for a row, `None` when the year is not an
    /// integer or make/model are blank.
    pub fn query_for(&self, row: usize, columns: &ColumnNames) -> Option<VehicleQuery> {
        let year = self.value(row, &columns.year)?.as_year()?;
        let make = self.value(row, &columns.make)?.as_text()?;
        let model = self.value(row, &columns.model)?.as_text()?;
        Some(VehicleQuery { year, make, model })
    }

    /// Rows as they should be persisted. Only rows classified during this
    /// run get a new classification cell; every other cell is written back
    /// exactly as it was read.
    pub fn output_rows(&self) -> impl Iterator<Item = Vec<CellValue>> + '_ {
        self.rows.iter().map(move |row| {
            let mut cells = row.cells.clone();
            if row.changed {
                if let Some(label) = row.classification.label() {
                    cells[self.classification_column] = CellValue::Text(label.to_string());
                }
            }
            cells
        })
    }
}
