use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;
use fusion_model::SourceLayout;
use tracing::debug;

use crate::error::{IngestError, Result};

/// A delimited export held as text. Every cell is a string so identifiers
/// keep their leading zeros.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl SourceTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Cell at (`row`, `col`), empty when out of range.
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|values| values.get(col))
            .map_or("", String::as_str)
    }

    /// Every value of a column, or `None` when the column is absent.
    pub fn column(&self, name: &str) -> Option<Vec<&str>> {
        let idx = self.column_index(name)?;
        Some((0..self.rows.len()).map(|row| self.cell(row, idx)).collect())
    }

    /// Replaces a column's values, appending the column when absent.
    /// `values` is padded or cut to the table height.
    pub fn set_column(&mut self, name: &str, mut values: Vec<String>) {
        values.resize(self.rows.len(), String::new());
        match self.column_index(name) {
            Some(idx) => {
                for (row, value) in self.rows.iter_mut().zip(values) {
                    if let Some(cell) = row.get_mut(idx) {
                        *cell = value;
                    }
                }
            }
            None => {
                self.headers.push(name.to_string());
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row.push(value);
                }
            }
        }
    }

    /// Keeps the rows for which `keep` returns true.
    pub fn retain_rows(&mut self, mut keep: impl FnMut(&[String]) -> bool) {
        self.rows.retain(|row| keep(row));
    }

    /// Consumes the table into named columns, in header order.
    pub fn into_columns(self) -> Vec<(String, Vec<String>)> {
        let mut columns: Vec<(String, Vec<String>)> = self
            .headers
            .into_iter()
            .map(|name| (name, Vec::with_capacity(self.rows.len())))
            .collect();
        for row in self.rows {
            for (idx, value) in row.into_iter().enumerate() {
                if let Some((_, values)) = columns.get_mut(idx) {
                    values.push(value);
                }
            }
        }
        columns
    }
}

fn normalize_header(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('\u{feff}');
    trimmed.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn normalize_cell(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').to_string()
}

/// Reads delimited text whose first non-blank row is the header.
///
/// Blank rows are skipped, short rows are padded with empty cells and
/// cells beyond the header width are dropped.
pub fn parse_source_table(reader: impl Read, delimiter: u8, path: &Path) -> Result<SourceTable> {
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let parse_error = |e: csv::Error| IngestError::CsvParse {
        path: path.to_path_buf(),
        message: e.to_string(),
    };
    let is_blank = |record: &csv::StringRecord| record.iter().all(|value| value.trim().is_empty());

    let mut records = reader.records();
    let headers: Vec<String> = loop {
        match records.next() {
            None => {
                return Err(IngestError::EmptyTable {
                    path: path.to_path_buf(),
                });
            }
            Some(record) => {
                let record = record.map_err(parse_error)?;
                if !is_blank(&record) {
                    break record.iter().map(normalize_header).collect();
                }
            }
        }
    };

    let mut rows = Vec::new();
    for record in records {
        let record = record.map_err(parse_error)?;
        if is_blank(&record) {
            continue;
        }
        let row = (0..headers.len())
            .map(|idx| record.get(idx).map(normalize_cell).unwrap_or_default())
            .collect();
        rows.push(row);
    }

    Ok(SourceTable { headers, rows })
}

pub fn read_source_table(path: &Path, delimiter: u8) -> Result<SourceTable> {
    if !path.is_file() {
        return Err(IngestError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let file = File::open(path).map_err(|e| IngestError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    let table = parse_source_table(file, delimiter, path)?;
    debug!(
        path = %path.display(),
        columns = table.headers.len(),
        row_count = table.height(),
        "loaded export table"
    );
    Ok(table)
}

/// Loads an export with the delimiter its source layout declares.
pub fn read_export(path: &Path, layout: &SourceLayout) -> Result<SourceTable> {
    let delimiter = layout.delimiter_byte().ok_or_else(|| IngestError::CsvParse {
        path: path.to_path_buf(),
        message: format!("unsupported delimiter {:?}", layout.delimiter),
    })?;
    read_source_table(path, delimiter)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str, delimiter: u8) -> Result<SourceTable> {
        parse_source_table(text.as_bytes(), delimiter, Path::new("inline"))
    }

    #[test]
    fn strips_bom_and_normalizes_headers() {
        let table = parse("\u{feff}Specimen  Barcode, Run ID \nA,1\n", b',').unwrap();
        assert_eq!(table.headers, vec!["Specimen Barcode", "Run ID"]);
        assert_eq!(table.rows, vec![vec!["A".to_string(), "1".to_string()]]);
    }

    #[test]
    fn keeps_leading_zeros_and_pads_rows() {
        let table = parse("A\tB\tC\n000574\t01\n\n\t\t\n", b'\t').unwrap();
        assert_eq!(table.height(), 1);
        assert_eq!(table.rows[0], vec!["000574", "01", ""]);
    }

    #[test]
    fn drops_cells_beyond_header() {
        let table = parse("A,B\n1,2,3\n", b',').unwrap();
        assert_eq!(table.rows[0], vec!["1", "2"]);
    }

    #[test]
    fn empty_input_is_error() {
        let err = parse("\n  \n", b',').unwrap_err();
        assert!(matches!(err, IngestError::EmptyTable { .. }));
    }

    #[test]
    fn set_column_replaces_or_appends() {
        let mut table = parse("A,B\n1,2\n3,4\n", b',').unwrap();
        table.set_column("B", vec!["x".to_string(), "y".to_string()]);
        table.set_column("C", vec!["only".to_string()]);
        assert_eq!(table.headers, vec!["A", "B", "C"]);
        assert_eq!(table.rows[0], vec!["1", "x", "only"]);
        assert_eq!(table.rows[1], vec!["3", "y", ""]);

        let columns = table.into_columns();
        assert_eq!(columns[2], ("C".to_string(), vec!["only".to_string(), String::new()]));
    }

    #[test]
    fn column_access() {
        let table = parse("A,B\n1,2\n3,4\n", b',').unwrap();
        assert_eq!(table.column("B"), Some(vec!["2", "4"]));
        assert_eq!(table.column("C"), None);
        assert_eq!(table.cell(5, 0), "");
        assert!(table.has_column("A"));
    }
}
