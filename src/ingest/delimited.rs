// src/ingest/delimited.rs

use crate::table::{Cell, Table};
use anyhow::{bail, Context, Result};
use csv::{ReaderBuilder, WriterBuilder};
use std::path::Path;

/// Read a delimited file wholesale into a table. The first `header_rows`
/// records are column labels (stacked labels become multi-level headers);
/// empty fields become nulls, everything else stays text for the
/// transformer's coercion steps.
pub fn read_csv(path: &Path, header_rows: usize) -> Result<Table> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;

    let mut records = rdr.records();
    let mut label_rows: Vec<Vec<String>> = Vec::with_capacity(header_rows);
    for _ in 0..header_rows.max(1) {
        match records.next() {
            Some(record) => {
                let record =
                    record.with_context(|| format!("parsing header in {}", path.display()))?;
                label_rows.push(record.iter().map(|s| s.trim().to_string()).collect());
            }
            None => bail!("{} has no header row", path.display()),
        }
    }

    let width = label_rows.iter().map(Vec::len).max().unwrap_or(0);
    let mut table = Table::new(super::stack_headers(&label_rows, width));

    for (idx, record) in records.enumerate() {
        let record =
            record.with_context(|| format!("CSV parse error in {} at record {}", path.display(), idx))?;
        let mut row: Vec<Cell> = record
            .iter()
            .take(width)
            .map(|field| {
                let field = field.trim();
                if field.is_empty() {
                    Cell::Null
                } else {
                    Cell::Text(field.to_string())
                }
            })
            .collect();
        row.resize(width, Cell::Null);
        table.rows.push(row);
    }

    Ok(table)
}

/// Serialize the cleaned table: one header record, one record per row,
/// nulls as empty fields.
pub fn write_csv(table: &Table, path: &Path) -> Result<()> {
    let mut wtr = WriterBuilder::new()
        .from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;

    let labels: Vec<String> = table.headers.iter().map(|h| h.name()).collect();
    wtr.write_record(&labels)
        .with_context(|| format!("writing header to {}", path.display()))?;

    for row in &table.rows {
        let fields: Vec<String> = row.iter().map(Cell::render).collect();
        wtr.write_record(&fields)
            .with_context(|| format!("writing row to {}", path.display()))?;
    }
    wtr.flush()
        .with_context(|| format!("flushing {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn reads_headers_and_null_cells() -> Result<()> {
        let mut f = NamedTempFile::new()?;
        writeln!(f, "Sl No, Tran Date ,Amt")?;
        writeln!(f, "1,01-01-2024,100")?;
        writeln!(f, "2,,")?;
        let t = read_csv(f.path(), 1)?;
        assert_eq!(
            t.headers.iter().map(|h| h.name()).collect::<Vec<_>>(),
            vec!["Sl No", "Tran Date", "Amt"]
        );
        assert_eq!(t.rows.len(), 2);
        assert_eq!(t.rows[1][1], Cell::Null);
        assert_eq!(t.rows[0][2], Cell::Text("100".to_string()));
        Ok(())
    }

    #[test]
    fn short_records_pad_with_nulls() -> Result<()> {
        let mut f = NamedTempFile::new()?;
        writeln!(f, "A,B,C")?;
        writeln!(f, "1,2")?;
        let t = read_csv(f.path(), 1)?;
        assert_eq!(t.rows[0][2], Cell::Null);
        Ok(())
    }

    #[test]
    fn stacked_headers_become_multi_level() -> Result<()> {
        let mut f = NamedTempFile::new()?;
        writeln!(f, "2024,,Meta")?;
        writeln!(f, "Debit,Credit,Sl No")?;
        let t = read_csv(f.path(), 2)?;
        let names: Vec<String> = t.headers.iter().map(|h| h.name()).collect();
        assert_eq!(names, vec!["2024_Debit", "2024_Credit", "Meta_Sl No"]);
        Ok(())
    }

    #[test]
    fn empty_file_is_an_error() -> Result<()> {
        let f = NamedTempFile::new()?;
        assert!(read_csv(f.path(), 1).is_err());
        Ok(())
    }

    #[test]
    fn write_round_trips_nulls_as_empty_fields() -> Result<()> {
        let mut t = Table::from_labels(&["Serial Number", "Amount"]);
        t.push_row(vec![Cell::Int(1), Cell::Number(12.5)]);
        t.push_row(vec![Cell::Int(2), Cell::Null]);
        let f = NamedTempFile::new()?;
        write_csv(&t, f.path())?;
        let text = std::fs::read_to_string(f.path())?;
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Serial Number,Amount");
        assert_eq!(lines[1], "1,12.5");
        assert_eq!(lines[2], "2,");
        Ok(())
    }
}
