// src/mapper/synonyms.rs

use anyhow::{bail, Context, Result};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::path::Path;

/// Canonical column categories, in match-priority order: when a raw header
/// matches more than one group, the first-enumerated category wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Canonical {
    TransactionDate,
    DebitCredit,
    SerialNumber,
    Amount,
    Debit,
    Credit,
}

impl Canonical {
    pub const ALL: [Canonical; 6] = [
        Canonical::TransactionDate,
        Canonical::DebitCredit,
        Canonical::SerialNumber,
        Canonical::Amount,
        Canonical::Debit,
        Canonical::Credit,
    ];

    /// Formatted column name used in the cleaned output.
    pub fn label(self) -> &'static str {
        match self {
            Canonical::TransactionDate => "Transaction Date",
            Canonical::DebitCredit => "Debit/Credit",
            Canonical::SerialNumber => "Serial Number",
            Canonical::Amount => "Amount",
            Canonical::Debit => "Debit",
            Canonical::Credit => "Credit",
        }
    }

    /// Key used in the synonym-override YAML file.
    pub fn key(self) -> &'static str {
        match self {
            Canonical::TransactionDate => "transaction_date",
            Canonical::DebitCredit => "debit_credit",
            Canonical::SerialNumber => "serial_number",
            Canonical::Amount => "amount",
            Canonical::Debit => "debit",
            Canonical::Credit => "credit",
        }
    }

    fn from_key(key: &str) -> Option<Canonical> {
        Canonical::ALL.into_iter().find(|c| c.key() == key)
    }
}

static BUILTIN: Lazy<Vec<(Canonical, Vec<String>)>> = Lazy::new(|| {
    let groups: [(Canonical, &[&str]); 6] = [
        (
            Canonical::TransactionDate,
            &["tran date", "date", "transaction date", "trans date", "value date"],
        ),
        (
            Canonical::DebitCredit,
            &["dr/cr", "debit/credit", "transaction type", "type"],
        ),
        (Canonical::SerialNumber, &["sl no", "serial no", "sr no", "id"]),
        (
            Canonical::Amount,
            &["amt", "amount", "transaction amount", "value"],
        ),
        (Canonical::Debit, &["dr", "debit", "debit_inr", "debit amount"]),
        (Canonical::Credit, &["cr", "credit", "credit_inr", "credit amount"]),
    ];
    groups
        .into_iter()
        .map(|(c, syns)| (c, syns.iter().map(|s| s.to_string()).collect()))
        .collect()
});

/// The known header variants per canonical category. Immutable once built.
#[derive(Debug, Clone)]
pub struct SynonymTable {
    groups: Vec<(Canonical, Vec<String>)>,
}

impl SynonymTable {
    pub fn builtin() -> Self {
        SynonymTable {
            groups: BUILTIN.clone(),
        }
    }

    /// Built-in table extended with extra synonyms from a YAML file mapping
    /// category keys to lists of raw header variants, e.g.
    /// `transaction_date: ["posting date"]`.
    pub fn with_overrides(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading synonym overrides {}", path.display()))?;
        let extra: HashMap<String, Vec<String>> = serde_yaml::from_str(&text)
            .with_context(|| format!("parsing synonym overrides {}", path.display()))?;

        let mut table = SynonymTable::builtin();
        for (key, variants) in extra {
            let Some(canonical) = Canonical::from_key(&key) else {
                bail!("unknown synonym category {:?} in {}", key, path.display());
            };
            let group = table
                .groups
                .iter_mut()
                .find(|(c, _)| *c == canonical)
                .expect("all categories present in builtin table");
            for v in variants {
                let v = v.trim().to_lowercase();
                if !group.1.contains(&v) {
                    group.1.push(v);
                }
            }
        }
        Ok(table)
    }

    /// Iterate groups in match-priority order.
    pub fn groups(&self) -> impl Iterator<Item = (Canonical, &[String])> + '_ {
        self.groups.iter().map(|(c, v)| (*c, v.as_slice()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn builtin_has_all_categories_in_priority_order() {
        let table = SynonymTable::builtin();
        let order: Vec<Canonical> = table.groups().map(|(c, _)| c).collect();
        assert_eq!(order, Canonical::ALL.to_vec());
    }

    #[test]
    fn overrides_extend_a_group() -> Result<()> {
        let mut f = NamedTempFile::new()?;
        writeln!(f, "transaction_date: [\"posting date\"]")?;
        let table = SynonymTable::with_overrides(f.path())?;
        let (_, dates) = table
            .groups()
            .find(|(c, _)| *c == Canonical::TransactionDate)
            .unwrap();
        assert!(dates.contains(&"posting date".to_string()));
        assert!(dates.contains(&"tran date".to_string()));
        Ok(())
    }

    #[test]
    fn unknown_category_is_rejected() -> Result<()> {
        let mut f = NamedTempFile::new()?;
        writeln!(f, "balance: [\"bal\"]")?;
        assert!(SynonymTable::with_overrides(f.path()).is_err());
        Ok(())
    }
}
