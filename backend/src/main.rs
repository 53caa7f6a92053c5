//! Starterfeed CLI - Format a new starter extract for the HR interface
//!
//! ```bash
//! starterfeed starters.csv interface.csv run.log
//! starterfeed starters.csv interface.csv run.log --mapping mappings/new_starter.json
//! starterfeed starters.csv interface.csv run.log --transaction-ids counter -v
//! ```
//!
//! Exactly three positional arguments are accepted. Anything else prints the
//! usage to stderr and exits with status 1 before any file is opened.

use clap::Parser;
use starterfeed::{
    init_logging, BatchDriver, BatchOptions, CsvError, CsvFormat, LineEnding, LogConfig,
    MappingTable, PipelineError, TransactionIdPolicy, TransformRegistry, UsageError,
};
use std::path::{Path, PathBuf};
use tracing::error;

#[derive(Parser)]
#[command(name = "starterfeed")]
#[command(about = "Convert a new starter CSV extract into HR interface records", long_about = None)]
struct Cli {
    /// New starter extract (CSV)
    input: PathBuf,

    /// Interface file to write (created or truncated)
    output: PathBuf,

    /// Run diagnostics log
    log_file: PathBuf,

    /// Mapping definition (JSON); the built-in new starter layout if omitted
    #[arg(short, long, env = "STARTERFEED_MAPPING")]
    mapping: Option<PathBuf>,

    /// Transaction id written in position 2 of every record
    #[arg(long, value_enum, env = "STARTERFEED_TRANSACTION_IDS", default_value = "empty")]
    transaction_ids: TransactionIdPolicy,

    /// Field delimiter for input and output
    #[arg(short, long, default_value = ",")]
    delimiter: char,

    /// Skip the first line of the input
    #[arg(long)]
    has_headers: bool,

    /// Output line terminator
    #[arg(long, value_enum, default_value = "crlf")]
    line_ending: LineEnding,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if !e.use_stderr() => {
            // --help / --version
            let _ = e.print();
            return;
        }
        Err(e) => {
            eprint!("{}", UsageError(e.render().to_string()));
            std::process::exit(1);
        }
    };

    if let Err(e) = run(&cli) {
        error!(error = %e, "Run aborted");
        eprintln!("❌ Error: {}", e);
        if output_incomplete(&*e) {
            eprintln!("   {} is incomplete and must not be loaded.", cli.output.display());
        }
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let format = CsvFormat {
        delimiter: delimiter_byte(cli.delimiter)?,
        has_headers: cli.has_headers,
        line_ending: cli.line_ending,
    };

    init_logging(&LogConfig::from_verbosity(&cli.log_file, cli.verbose))?;

    let registry = TransformRegistry::new();
    let table = load_table(cli.mapping.as_deref(), &registry)?;

    eprintln!("📄 Processing: {}", cli.input.display());
    eprintln!("   Record types: {}", table.len());

    let options = BatchOptions {
        format,
        transaction_ids: cli.transaction_ids,
    };
    let summary = BatchDriver::new(&table, options).run_files(&cli.input, &cli.output)?;

    eprintln!("✅ {} rows → {} records", summary.rows, summary.records);
    eprintln!("💾 Output written to: {}", cli.output.display());
    Ok(())
}

fn load_table(
    mapping: Option<&Path>,
    registry: &TransformRegistry,
) -> Result<MappingTable, Box<dyn std::error::Error>> {
    let table = match mapping {
        Some(path) => {
            tracing::info!(mapping = %path.display(), "Loading mapping file");
            MappingTable::from_file(path, registry)?
        }
        None => {
            tracing::info!("Using built-in new starter mapping");
            MappingTable::reference(registry)?
        }
    };
    Ok(table)
}

/// Whether the run failed after the output file was created.
fn output_incomplete(error: &(dyn std::error::Error + 'static)) -> bool {
    match error.downcast_ref::<PipelineError>() {
        Some(PipelineError::Row { .. }) => true,
        Some(PipelineError::Csv(CsvError::Open { .. })) => false,
        Some(PipelineError::Csv(_)) => true,
        _ => false,
    }
}

fn delimiter_byte(delimiter: char) -> Result<u8, UsageError> {
    if delimiter.is_ascii() {
        Ok(delimiter as u8)
    } else {
        Err(UsageError(format!(
            "delimiter must be a single ASCII character, got '{}'",
            delimiter
        )))
    }
}
