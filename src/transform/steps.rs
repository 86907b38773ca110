// src/transform/steps.rs
//
// The fifteen cleanup transformations, in their fixed pipeline order. Each
// takes the table the previous step produced and returns a new table; an
// error makes the runner skip the step and carry the input forward.

use crate::mapper::Canonical;
use crate::table::{Cell, Table};
use crate::transform::dates::{self, DEFAULT_DATE};
use anyhow::{bail, Result};
use once_cell::sync::Lazy;
use regex::Regex;

const DOLLAR_MULTIPLIER: f64 = 80.0;
const THOUSANDS_MULTIPLIER: f64 = 1000.0;

static DOLLAR_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$").unwrap());
static THOUSANDS_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"1000s").unwrap());

fn serial() -> &'static str {
    Canonical::SerialNumber.label()
}
fn date() -> &'static str {
    Canonical::TransactionDate.label()
}
fn indicator() -> &'static str {
    Canonical::DebitCredit.label()
}
fn amount() -> &'static str {
    Canonical::Amount.label()
}
fn debit() -> &'static str {
    Canonical::Debit.label()
}
fn credit() -> &'static str {
    Canonical::Credit.label()
}

/// 1. Join multi-level header labels into single-level names.
pub fn flatten_headers(t: &Table) -> Result<Table> {
    let mut t = t.clone();
    for header in &mut t.headers {
        if !header.is_flat() {
            header.levels = vec![header.name().trim().to_string()];
        }
    }
    Ok(t)
}

/// 2. Coerce canonical columns to their types: serial → integer with
/// forward-fill, date → `DD-MM-YYYY` text (unparsable → null), monetary
/// columns → numeric with 0 default. Pipe-delimited date cells are left for
/// the split step.
pub fn coerce_types(t: &Table) -> Result<Table> {
    let mut t = t.clone();

    if let Some(idx) = t.column(serial()) {
        let mut last: Option<i64> = None;
        for row in &mut t.rows {
            match row[idx].as_f64() {
                Some(v) => {
                    let v = v as i64;
                    row[idx] = Cell::Int(v);
                    last = Some(v);
                }
                None => match last {
                    Some(v) => row[idx] = Cell::Int(v),
                    None => bail!("serial number column starts with an unparsable value"),
                },
            }
        }
    }

    if let Some(idx) = t.column(date()) {
        t.map_column(idx, |cell| match cell {
            Cell::Text(s) if s.contains('|') => cell.clone(),
            Cell::Text(s) => match dates::reformat(s, false) {
                Some(d) => Cell::Text(d),
                None => Cell::Null,
            },
            _ => Cell::Null,
        });
    }

    for label in [debit(), credit(), amount()] {
        if let Some(idx) = t.column(label) {
            t.map_column(idx, |cell| Cell::Number(cell.as_f64().unwrap_or(0.0)));
        }
    }

    Ok(t)
}

/// 3. When no unified Amount exists but Debit/Credit do, synthesize Amount
/// as their sum (and drop them); otherwise coerce the existing Amount.
pub fn direct_amount(t: &Table) -> Result<Table> {
    let mut t = t.clone();
    if !t.has_column(amount()) && t.has_column(debit()) && t.has_column(credit()) {
        sum_debit_credit(&mut t);
    } else if let Some(idx) = t.column(amount()) {
        t.map_column(idx, |cell| Cell::Number(cell.as_f64().unwrap_or(0.0)));
    }
    Ok(t)
}

/// 4. Explode pipe-delimited date cells into one row per date value.
pub fn split_dates(t: &Table) -> Result<Table> {
    let Some(idx) = t.column(date()) else {
        return Ok(t.clone());
    };
    let mut out = Table::new(t.headers.clone());
    for row in &t.rows {
        match &row[idx] {
            Cell::Text(s) if s.contains('|') => {
                for part in s.split('|') {
                    let mut copy = row.clone();
                    copy[idx] = Cell::Text(part.trim().to_string());
                    out.rows.push(copy);
                }
            }
            _ => out.rows.push(row.clone()),
        }
    }
    Ok(out)
}

/// 5. Propagate the last non-null value downward across every column.
pub fn forward_fill(t: &Table) -> Result<Table> {
    let mut t = t.clone();
    for col in 0..t.headers.len() {
        let mut last: Option<Cell> = None;
        for row in &mut t.rows {
            if row[col].is_null() {
                if let Some(v) = &last {
                    row[col] = v.clone();
                }
            } else {
                last = Some(row[col].clone());
            }
        }
    }
    Ok(t)
}

/// 6. Column-specific defaults for still-missing values.
pub fn missing_defaults(t: &Table) -> Result<Table> {
    let mut t = t.clone();
    if let Some(idx) = t.column(date()) {
        let mut last: Option<Cell> = None;
        for row in &mut t.rows {
            if row[idx].is_null() {
                if let Some(v) = &last {
                    row[idx] = v.clone();
                }
            } else {
                last = Some(row[idx].clone());
            }
        }
    }
    if let Some(idx) = t.column(indicator()) {
        t.map_column(idx, |cell| match cell {
            Cell::Null => Cell::Text("Unknown".to_string()),
            other => other.clone(),
        });
    }
    if let Some(idx) = t.column(amount()) {
        t.map_column(idx, |cell| match cell {
            Cell::Null => Cell::Number(0.0),
            other => other.clone(),
        });
    }
    Ok(t)
}

/// 7. Re-parse dates with the day-first convention and re-render.
pub fn format_dates(t: &Table) -> Result<Table> {
    let mut t = t.clone();
    if let Some(idx) = t.column(date()) {
        t.map_column(idx, |cell| match cell {
            Cell::Text(s) => match dates::reformat(s, true) {
                Some(d) => Cell::Text(d),
                None => Cell::Null,
            },
            _ => Cell::Null,
        });
    }
    Ok(t)
}

/// 8. With both Debit and Credit present, Amount = |Credit - Debit|.
pub fn calculate_amount(t: &Table) -> Result<Table> {
    let mut t = t.clone();
    let (Some(d), Some(c)) = (t.column(debit()), t.column(credit())) else {
        return Ok(t);
    };
    if !t.has_column(amount()) {
        t.add_column(amount(), Cell::Null);
    }
    let a = t.column(amount()).expect("amount column just ensured");
    for row in &mut t.rows {
        let dv = row[d].as_f64().unwrap_or(0.0);
        let cv = row[c].as_f64().unwrap_or(0.0);
        row[a] = Cell::Number((cv - dv).abs());
    }
    Ok(t)
}

/// 9. Merge Debit/Credit into Amount as their sum and drop both columns.
pub fn merge_debit_credit(t: &Table) -> Result<Table> {
    let mut t = t.clone();
    if t.has_column(debit()) && t.has_column(credit()) {
        sum_debit_credit(&mut t);
    }
    Ok(t)
}

fn sum_debit_credit(t: &mut Table) {
    let d = t.column(debit()).expect("debit column present");
    let c = t.column(credit()).expect("credit column present");
    if !t.has_column(amount()) {
        t.add_column(amount(), Cell::Null);
    }
    let a = t.column(amount()).expect("amount column just ensured");
    for row in &mut t.rows {
        let dv = row[d].as_f64().unwrap_or(0.0);
        let cv = row[c].as_f64().unwrap_or(0.0);
        row[a] = Cell::Number(dv + cv);
    }
    t.drop_column(debit());
    t.drop_column(credit());
}

/// 10. Fill the cells every earlier step left empty.
pub fn fill_empty(t: &Table) -> Result<Table> {
    let mut t = t.clone();
    for (label, fill) in [
        (indicator(), Cell::Text("Unknown".to_string())),
        (amount(), Cell::Number(0.0)),
        (date(), Cell::Text(DEFAULT_DATE.to_string())),
    ] {
        if let Some(idx) = t.column(label) {
            t.map_column(idx, |cell| {
                if cell.is_null() {
                    fill.clone()
                } else {
                    cell.clone()
                }
            });
        }
    }
    Ok(t)
}

/// 11. Known misspellings of the indicator values.
pub fn correct_spelling(t: &Table) -> Result<Table> {
    replace_indicator(t, &[("Debbit", "Debit"), ("Creditt", "Credit")])
}

/// 12. Indicator abbreviations.
pub fn normalize_indicator(t: &Table) -> Result<Table> {
    replace_indicator(t, &[("Dr", "Debit"), ("Cr", "Credit")])
}

fn replace_indicator(t: &Table, pairs: &[(&str, &str)]) -> Result<Table> {
    let mut t = t.clone();
    if let Some(idx) = t.column(indicator()) {
        t.map_column(idx, |cell| match cell {
            Cell::Text(s) => match pairs.iter().find(|(from, _)| *from == s.as_str()) {
                Some((_, to)) => Cell::Text((*to).to_string()),
                None => cell.clone(),
            },
            _ => cell.clone(),
        });
    }
    Ok(t)
}

/// 13. Scale Amount when a header carries a currency marker. Mapped headers
/// lose their marker text during renaming, so in practice this only fires
/// for unrecognized marker-bearing columns still present at this point.
pub fn scale_currency(t: &Table) -> Result<Table> {
    let mut t = t.clone();
    let Some(idx) = t.column(amount()) else {
        return Ok(t);
    };
    let names: Vec<String> = t.headers.iter().map(|h| h.name()).collect();
    let factor = if names.iter().any(|n| DOLLAR_MARKER.is_match(n)) {
        Some(DOLLAR_MULTIPLIER)
    } else if names.iter().any(|n| THOUSANDS_MARKER.is_match(n)) {
        Some(THOUSANDS_MULTIPLIER)
    } else {
        None
    };
    if let Some(factor) = factor {
        t.map_column(idx, |cell| {
            Cell::Number(cell.as_f64().unwrap_or(0.0) * factor)
        });
    }
    Ok(t)
}

/// 14. Drop rows whose Amount is negative (or not a number).
pub fn drop_negative_amounts(t: &Table) -> Result<Table> {
    let mut t = t.clone();
    if let Some(idx) = t.column(amount()) {
        t.rows
            .retain(|row| row[idx].as_f64().is_some_and(|v| v >= 0.0));
    }
    Ok(t)
}

/// 15. Retain exactly the canonical output columns, creating missing ones.
pub fn project_schema(t: &Table) -> Result<Table> {
    let mut t = t.clone();
    let retained = [serial(), date(), indicator(), amount()];
    for label in retained {
        if !t.has_column(label) {
            t.add_column(label, Cell::Null);
        }
    }
    let indices: Vec<usize> = retained
        .iter()
        .map(|l| t.column(l).expect("retained column just ensured"))
        .collect();

    let mut out = Table::from_labels(&retained);
    for row in &t.rows {
        out.rows.push(indices.iter().map(|&i| row[i].clone()).collect());
    }
    Ok(out)
}
