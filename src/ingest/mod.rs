// src/ingest/mod.rs

pub mod delimited;
pub mod excel;

use crate::table::{Header, Table};
use anyhow::{bail, Context, Result};
use std::path::Path;

/// Read one input statement, dispatching on the file extension:
/// spreadsheets go through calamine, everything else through the CSV
/// reader. `header_rows` > 1 ingests stacked header rows as multi-level
/// labels. A missing input file is the one fatal error of a run.
pub fn read_table(path: &Path, header_rows: usize) -> Result<Table> {
    if !path.exists() {
        bail!("input file not found: {}", path.display());
    }
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "xlsx" | "xlsm" | "xls" => excel::read_workbook(path, header_rows)
            .with_context(|| format!("reading spreadsheet {}", path.display())),
        _ => delimited::read_csv(path, header_rows)
            .with_context(|| format!("reading delimited file {}", path.display())),
    }
}

/// Combine stacked label rows into per-column headers. Empty cells in upper
/// label rows inherit the previous column's value (spreadsheet merged-cell
/// convention); columns keep only their non-empty levels.
pub(crate) fn stack_headers(label_rows: &[Vec<String>], width: usize) -> Vec<Header> {
    let mut filled: Vec<Vec<String>> = Vec::with_capacity(label_rows.len());
    for (depth, row) in label_rows.iter().enumerate() {
        let mut out = Vec::with_capacity(width);
        let mut last = String::new();
        for col in 0..width {
            let cell = row.get(col).map(String::as_str).unwrap_or("").trim();
            // only non-leaf rows carry values across merged cells
            if !cell.is_empty() {
                last = cell.to_string();
            } else if depth + 1 == label_rows.len() {
                last = String::new();
            }
            out.push(last.clone());
        }
        filled.push(out);
    }

    (0..width)
        .map(|col| {
            let levels: Vec<String> = filled
                .iter()
                .map(|row| row[col].clone())
                .filter(|s| !s.is_empty())
                .collect();
            if levels.is_empty() {
                Header::new("")
            } else {
                Header::multi(levels)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn missing_input_is_fatal() {
        let err = read_table(&PathBuf::from("/no/such/statement.xlsx"), 1).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn single_header_row_keeps_blank_labels_blank() {
        let rows = vec![vec!["A".to_string(), String::new()]];
        let headers = stack_headers(&rows, 2);
        assert_eq!(headers[0].name(), "A");
        assert_eq!(headers[1].name(), "");
    }

    #[test]
    fn merged_upper_labels_carry_across_columns() {
        let rows = vec![
            vec!["2024".to_string(), String::new()],
            vec!["Debit".to_string(), "Credit".to_string()],
        ];
        let headers = stack_headers(&rows, 2);
        assert_eq!(headers[0].name(), "2024_Debit");
        assert_eq!(headers[1].name(), "2024_Credit");
    }
}
