pub mod ingest;
pub mod mapper;
pub mod suggest;
pub mod table;
pub mod transform;

#[cfg(test)]
mod tests {
    use crate::ingest::{self, delimited};
    use crate::mapper::{self, SynonymTable};
    use crate::suggest::NoSuggestions;
    use crate::transform;
    use anyhow::Result;
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// Whole run: messy statement in, canonical CSV out.
    #[test]
    fn end_to_end_cleans_a_messy_statement() -> Result<()> {
        let mut input = NamedTempFile::with_suffix(".csv")?;
        writeln!(input, "sl no,Tran Date,Dr/Cr,Debit_INR,Credit_INR,Branch Code")?;
        writeln!(input, "1,01-01-2024,Dr,100,0,BR-1")?;
        writeln!(input, "2,02-01-2024,Creditt,0,50,BR-2")?;
        writeln!(input, "3,not a date,,0,25,BR-3")?;

        let mut table = ingest::read_table(input.path(), 1)?;
        let synonyms = SynonymTable::builtin();
        let mapping = mapper::build_mapping(&table.headers, &synonyms, &NoSuggestions);
        table.rename_columns(&mapping);

        let (table, reports) = transform::run_pipeline(table);
        assert!(reports
            .iter()
            .all(|r| r.outcome == transform::StepOutcome::Applied));

        let output = NamedTempFile::with_suffix(".csv")?;
        delimited::write_csv(&table, output.path())?;

        let text = std::fs::read_to_string(output.path())?;
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Serial Number,Transaction Date,Debit/Credit,Amount");
        assert_eq!(lines[1], "1,01-01-2024,Debit,100");
        assert_eq!(lines[2], "2,02-01-2024,Credit,50");
        // row 3: date and indicator forward-filled from row 2, spelling fixed
        assert_eq!(lines[3], "3,02-01-2024,Credit,25");
        Ok(())
    }
}
