// src/ingest/excel.rs

use crate::table::{Cell, Table};
use crate::transform::dates::DATE_FORMAT;
use anyhow::{bail, Context, Result};
use calamine::{open_workbook_auto, Data, DataType as _, Reader};
use std::path::Path;

/// Read the first worksheet of a spreadsheet wholesale into a table.
/// The first `header_rows` rows are column labels; datetime cells are
/// rendered in the canonical `DD-MM-YYYY` form so the date steps see them
/// as already-parsed text.
pub fn read_workbook(path: &Path, header_rows: usize) -> Result<Table> {
    let mut workbook =
        open_workbook_auto(path).with_context(|| format!("opening workbook {}", path.display()))?;
    let range = workbook
        .worksheet_range_at(0)
        .context("workbook has no worksheets")?
        .with_context(|| format!("reading first worksheet of {}", path.display()))?;

    let mut rows = range.rows();
    let header_rows = header_rows.max(1);
    let mut label_rows: Vec<Vec<String>> = Vec::with_capacity(header_rows);
    for _ in 0..header_rows {
        match rows.next() {
            Some(row) => label_rows.push(
                row.iter()
                    .map(|c| c.as_string().unwrap_or_default().trim().to_string())
                    .collect(),
            ),
            None => bail!("{} has no header row", path.display()),
        }
    }

    let width = label_rows.iter().map(Vec::len).max().unwrap_or(0);
    let mut table = Table::new(super::stack_headers(&label_rows, width));

    for row in rows {
        let mut cells: Vec<Cell> = row.iter().take(width).map(convert_cell).collect();
        cells.resize(width, Cell::Null);
        if cells.iter().all(Cell::is_null) {
            continue; // trailing blank spreadsheet rows
        }
        table.rows.push(cells);
    }

    Ok(table)
}

fn convert_cell(cell: &Data) -> Cell {
    if cell.is_empty() {
        Cell::Null
    } else if cell.is_datetime() {
        match cell.as_datetime() {
            Some(dt) => Cell::Text(dt.date().format(DATE_FORMAT).to_string()),
            None => Cell::Null,
        }
    } else if cell.is_int() {
        cell.get_int().map_or(Cell::Null, Cell::Int)
    } else if cell.is_float() {
        cell.get_float().map_or(Cell::Null, Cell::Number)
    } else if cell.is_bool() {
        cell.get_bool()
            .map_or(Cell::Null, |b| Cell::Text(b.to_string()))
    } else {
        match cell.as_string() {
            Some(s) if !s.trim().is_empty() => Cell::Text(s.trim().to_string()),
            _ => Cell::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_cells_convert() {
        assert_eq!(convert_cell(&Data::Empty), Cell::Null);
        assert_eq!(
            convert_cell(&Data::String(" Dr ".to_string())),
            Cell::Text("Dr".to_string())
        );
        assert_eq!(convert_cell(&Data::Int(7)), Cell::Int(7));
        assert_eq!(convert_cell(&Data::Float(12.5)), Cell::Number(12.5));
        assert_eq!(
            convert_cell(&Data::Bool(true)),
            Cell::Text("true".to_string())
        );
    }

    #[test]
    fn blank_string_cells_are_null() {
        assert_eq!(convert_cell(&Data::String("   ".to_string())), Cell::Null);
    }
}
