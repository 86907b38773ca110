// src/transform/mod.rs
//
// Straight-line fold over the table: a fixed ordered list of stateless
// steps, each isolated so one failure skips that step and carries the
// previous table forward unchanged.

pub mod dates;
pub mod steps;

use crate::table::Table;
use anyhow::Result;
use tracing::{info, warn};

pub type Step = fn(&Table) -> Result<Table>;

/// The pipeline, in execution order. Order is load-bearing: splitting
/// multi-date cells must precede forward-fill, and the Debit/Credit merge
/// must precede schema projection.
pub const STEPS: &[(&str, Step)] = &[
    ("flatten_headers", steps::flatten_headers),
    ("coerce_types", steps::coerce_types),
    ("direct_amount", steps::direct_amount),
    ("split_dates", steps::split_dates),
    ("forward_fill", steps::forward_fill),
    ("missing_defaults", steps::missing_defaults),
    ("format_dates", steps::format_dates),
    ("calculate_amount", steps::calculate_amount),
    ("merge_debit_credit", steps::merge_debit_credit),
    ("fill_empty", steps::fill_empty),
    ("correct_spelling", steps::correct_spelling),
    ("normalize_indicator", steps::normalize_indicator),
    ("scale_currency", steps::scale_currency),
    ("drop_negative_amounts", steps::drop_negative_amounts),
    ("project_schema", steps::project_schema),
];

#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    Applied,
    Skipped(String),
}

#[derive(Debug, Clone)]
pub struct StepReport {
    pub name: &'static str,
    pub outcome: StepOutcome,
}

/// Run every step in order. A failing step is reported as skipped and the
/// table is left exactly as the prior step produced it; there is no
/// rollback and no retry.
pub fn run_pipeline(mut table: Table) -> (Table, Vec<StepReport>) {
    let mut reports = Vec::with_capacity(STEPS.len());
    for &(name, step) in STEPS {
        match step(&table) {
            Ok(next) => {
                info!(step = name, rows = next.rows.len(), "step applied");
                table = next;
                reports.push(StepReport {
                    name,
                    outcome: StepOutcome::Applied,
                });
            }
            Err(err) => {
                warn!(step = name, error = %err, "step skipped");
                reports.push(StepReport {
                    name,
                    outcome: StepOutcome::Skipped(err.to_string()),
                });
            }
        }
    }
    (table, reports)
}
