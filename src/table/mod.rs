// src/table/mod.rs

use std::collections::BTreeMap;
use std::fmt;

/// One scalar value in a table cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Text(String),
    Int(i64),
    Number(f64),
}

impl Cell {
    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    /// Numeric view of the cell. `Text` is parsed; `Null` has no value.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Null => None,
            Cell::Int(i) => Some(*i as f64),
            Cell::Number(f) => Some(*f),
            Cell::Text(s) => s.trim().replace(',', "").parse().ok(),
        }
    }

    /// Text view of the cell, rendering numbers the way they serialize.
    pub fn render(&self) -> String {
        match self {
            Cell::Null => String::new(),
            Cell::Text(s) => s.clone(),
            Cell::Int(i) => i.to_string(),
            Cell::Number(f) => f.to_string(),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}

/// A column label. Stacked header rows in the source file produce more than
/// one level; `name()` is the single-level view used everywhere downstream.
#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    pub levels: Vec<String>,
}

impl Header {
    pub fn new(label: impl Into<String>) -> Self {
        Header {
            levels: vec![label.into()],
        }
    }

    pub fn multi(levels: Vec<String>) -> Self {
        Header { levels }
    }

    /// Single-level label: multi-level labels join with `_`.
    pub fn name(&self) -> String {
        if self.levels.len() == 1 {
            self.levels[0].clone()
        } else {
            self.levels.join("_")
        }
    }

    pub fn is_flat(&self) -> bool {
        self.levels.len() <= 1
    }
}

/// An owned, row-major record set. Columns are not fixed at ingestion; the
/// transformer reshapes headers and rows in place.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub headers: Vec<Header>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(headers: Vec<Header>) -> Self {
        Table {
            headers,
            rows: Vec::new(),
        }
    }

    pub fn from_labels(labels: &[&str]) -> Self {
        Table::new(labels.iter().map(|l| Header::new(*l)).collect())
    }

    pub fn push_row(&mut self, row: Vec<Cell>) {
        debug_assert_eq!(row.len(), self.headers.len());
        self.rows.push(row);
    }

    /// Index of the column whose flattened name equals `label`.
    pub fn column(&self, label: &str) -> Option<usize> {
        self.headers.iter().position(|h| h.name() == label)
    }

    pub fn has_column(&self, label: &str) -> bool {
        self.column(label).is_some()
    }

    /// Append a new column filled with `fill`.
    pub fn add_column(&mut self, label: &str, fill: Cell) {
        self.headers.push(Header::new(label));
        for row in &mut self.rows {
            row.push(fill.clone());
        }
    }

    /// Remove a column by flattened name. No-op if absent.
    pub fn drop_column(&mut self, label: &str) {
        if let Some(idx) = self.column(label) {
            self.headers.remove(idx);
            for row in &mut self.rows {
                row.remove(idx);
            }
        }
    }

    /// Apply a column-name mapping keyed by lower-cased/trimmed raw name.
    /// Hits replace the header with the mapped single-level label; misses
    /// keep the header as-is (trimmed when flat).
    pub fn rename_columns(&mut self, mapping: &BTreeMap<String, String>) {
        for header in &mut self.headers {
            let key = header.name().trim().to_lowercase();
            if let Some(canonical) = mapping.get(&key) {
                header.levels = vec![canonical.clone()];
            } else if header.is_flat() {
                header.levels[0] = header.levels[0].trim().to_string();
            }
        }
    }

    /// Mutate every cell of one column.
    pub fn map_column(&mut self, idx: usize, mut f: impl FnMut(&Cell) -> Cell) {
        for row in &mut self.rows {
            row[idx] = f(&row[idx]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_lookup_uses_flattened_name() {
        let mut t = Table::new(vec![
            Header::new("Amount"),
            Header::multi(vec!["2024".into(), "Debit".into()]),
        ]);
        t.push_row(vec![Cell::Number(1.0), Cell::Null]);
        assert_eq!(t.column("Amount"), Some(0));
        assert_eq!(t.column("2024_Debit"), Some(1));
        assert!(!t.has_column("Debit"));
    }

    #[test]
    fn drop_column_removes_cells() {
        let mut t = Table::from_labels(&["A", "B"]);
        t.push_row(vec![Cell::Int(1), Cell::Int(2)]);
        t.drop_column("A");
        assert_eq!(t.headers.len(), 1);
        assert_eq!(t.rows[0], vec![Cell::Int(2)]);
    }

    #[test]
    fn rename_matches_case_insensitively() {
        let mut mapping = BTreeMap::new();
        mapping.insert("tran date".to_string(), "Transaction Date".to_string());
        let mut t = Table::from_labels(&[" Tran Date ", "Memo"]);
        t.rename_columns(&mapping);
        assert_eq!(t.headers[0].name(), "Transaction Date");
        assert_eq!(t.headers[1].name(), "Memo");
    }

    #[test]
    fn text_cells_parse_as_numbers() {
        assert_eq!(Cell::Text("1,234.5".into()).as_f64(), Some(1234.5));
        assert_eq!(Cell::Text("n/a".into()).as_f64(), None);
        assert_eq!(Cell::Null.as_f64(), None);
    }
}
