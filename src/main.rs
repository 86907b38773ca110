use anyhow::{Context, Result};
use ledgerclean::{
    ingest::{self, delimited},
    mapper::{self, SynonymTable},
    suggest::{GeminiSuggester, NoSuggestions, Suggest},
    transform::{self, StepOutcome},
};
use std::{env, path::PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

struct Config {
    input: PathBuf,
    output: PathBuf,
    header_rows: usize,
    synonyms: Option<PathBuf>,
    api_key: Option<String>,
}

impl Config {
    fn from_env() -> Result<Self> {
        let input = PathBuf::from(env::var("INPUT_PATH").unwrap_or_else(|_| "input.xlsx".into()));
        let output = PathBuf::from(env::var("OUTPUT_PATH").unwrap_or_else(|_| "output.csv".into()));
        let header_rows = match env::var("HEADER_ROWS") {
            Ok(v) => v
                .parse::<usize>()
                .with_context(|| format!("HEADER_ROWS must be a positive integer, got {:?}", v))?,
            Err(_) => 1,
        };
        let synonyms = env::var("SYNONYMS_PATH").ok().map(PathBuf::from);
        let api_key = env::var("GEMINI_API_KEY").ok().filter(|k| !k.is_empty());
        Ok(Config {
            input,
            output,
            header_rows,
            synonyms,
            api_key,
        })
    }
}

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,ledgerclean=info"));
    fmt::Subscriber::builder().with_env_filter(env_filter).init();

    let config = Config::from_env()?;
    info!(input = %config.input.display(), output = %config.output.display(), "startup");

    // ─── 2) synonym table + suggestion provider ──────────────────────
    let synonyms = match &config.synonyms {
        Some(path) => SynonymTable::with_overrides(path)?,
        None => SynonymTable::builtin(),
    };
    let suggester: Box<dyn Suggest> = match config.api_key {
        Some(key) => Box::new(GeminiSuggester::new(key)?),
        None => {
            info!("no suggestion API key configured; unmatched columns keep their names");
            Box::new(NoSuggestions)
        }
    };

    // ─── 3) read the statement ───────────────────────────────────────
    let mut table = ingest::read_table(&config.input, config.header_rows)?;
    info!(
        columns = table.headers.len(),
        rows = table.rows.len(),
        "statement loaded"
    );

    // ─── 4) map + rename columns ─────────────────────────────────────
    let mapping = mapper::build_mapping(&table.headers, &synonyms, suggester.as_ref());
    info!(mapped = mapping.len(), "column mapping built");
    table.rename_columns(&mapping);

    // ─── 5) run the cleanup pipeline ─────────────────────────────────
    let (table, reports) = transform::run_pipeline(table);
    for report in &reports {
        if let StepOutcome::Skipped(reason) = &report.outcome {
            warn!(step = report.name, reason = %reason, "step was skipped");
        }
    }

    // ─── 6) write the cleaned table ──────────────────────────────────
    delimited::write_csv(&table, &config.output)
        .with_context(|| format!("writing {}", config.output.display()))?;
    info!(rows = table.rows.len(), output = %config.output.display(), "done");
    Ok(())
}
