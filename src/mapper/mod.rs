// src/mapper/mod.rs
//
// Maps arbitrary source column headers onto the canonical statement schema:
// exact synonym lookup first, then string-similarity scoring, then a
// generative single-word suggestion as the last resort. Unrecognized headers
// keep their original name and are dropped later by schema projection.

pub mod similarity;
pub mod synonyms;

pub use synonyms::{Canonical, SynonymTable};

use crate::suggest::Suggest;
use crate::table::Header;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Minimum similarity ratio for a fuzzy synonym hit.
pub const MATCH_THRESHOLD: f64 = 0.6;

/// Exact-then-fuzzy match of one raw header against the synonym table.
/// Returns `None` when nothing clears the threshold.
pub fn local_match(table: &SynonymTable, raw: &str) -> Option<Canonical> {
    let needle = raw.trim().to_lowercase();

    for (canonical, variants) in table.groups() {
        if variants.iter().any(|v| *v == needle) {
            return Some(canonical);
        }
    }

    let mut best: Option<(Canonical, f64)> = None;
    for (canonical, variants) in table.groups() {
        for variant in variants {
            let r = similarity::ratio(&needle, variant);
            if r >= MATCH_THRESHOLD && best.map_or(true, |(_, b)| r > b) {
                best = Some((canonical, r));
            }
        }
    }
    best.map(|(c, _)| c)
}

/// Build the complete column-name mapping for one set of raw headers.
///
/// Keys are lower-cased/trimmed raw names; values are canonical labels, or
/// the raw name verbatim when neither the synonym table nor the suggestion
/// provider can place it. Empty input yields an empty mapping.
pub fn build_mapping(
    headers: &[Header],
    table: &SynonymTable,
    suggester: &dyn Suggest,
) -> BTreeMap<String, String> {
    let mut mapping = BTreeMap::new();

    for header in headers {
        let raw = header.name();
        let key = raw.trim().to_lowercase();
        if key.is_empty() {
            continue;
        }

        let mapped = match local_match(table, &raw) {
            Some(canonical) => canonical.label().to_string(),
            None => match escalate(table, suggester, &raw) {
                Some(canonical) => canonical.label().to_string(),
                None => raw.trim().to_string(),
            },
        };

        debug!(raw = %raw, mapped = %mapped, "column mapped");
        mapping.insert(key, mapped);
    }

    mapping
}

/// Ask the suggestion provider for a label and re-validate it locally.
/// The provider is unreliable by contract; any failure means no match.
fn escalate(table: &SynonymTable, suggester: &dyn Suggest, raw: &str) -> Option<Canonical> {
    match suggester.suggest_label(raw) {
        Ok(suggestion) => {
            let hit = local_match(table, &suggestion);
            debug!(raw = %raw, suggestion = %suggestion, matched = hit.is_some(), "suggestion validated");
            hit
        }
        Err(err) => {
            warn!(raw = %raw, error = %err, "suggestion provider failed; keeping original name");
            None
        }
    }
}
