//! `schema-lint`: checks that a schema script declares tables before they are referenced.

use clap::Parser;
use schema_lint::report::{TextReport, to_json};
use schema_lint::{CheckConfig, Expectations, ExtractConfig, LoadError, SourceFile, check};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;

#[derive(Parser)]
#[command(name = "schema-lint")]
#[command(author, version, about = "Check declaration order in SQL schema scripts", long_about = None)]
struct Cli {
    /// Schema script to check
    #[arg(default_value = "my.sql")]
    schema: PathBuf,

    /// JSON manifest of components the schema must provide
    #[arg(long, value_name = "MANIFEST")]
    expect: Option<PathBuf>,

    /// Output format
    #[arg(long, default_value = "text")]
    format: OutputFormat,

    /// Count only `FOREIGN KEY (...) REFERENCES` clauses as dependencies
    #[arg(long)]
    fk_clause_only: bool,

    /// Skip the structural lints
    #[arg(long)]
    no_lint: bool,

    /// Raise log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(passed) => ExitCode::from(if passed { 0 } else { 1 }),
        Err(err) => {
            let code = err.exit_code();
            eprintln!("{:?}", miette::Report::new(err));
            ExitCode::from(code)
        }
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "schema_lint=debug",
        _ => "schema_lint=trace",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

fn run(cli: &Cli) -> Result<bool, LoadError> {
    let document = schema_lint::error::read_schema(&cli.schema)?;
    debug!(path = %cli.schema.display(), bytes = document.len(), "loaded schema");

    let mut config = CheckConfig::default()
        .with_extract_config(ExtractConfig::new().with_foreign_key_clause_only(cli.fk_clause_only))
        .with_lint(!cli.no_lint);
    if let Some(path) = &cli.expect {
        config = config.with_expectations(Expectations::load(path)?);
    }

    let outcome = check(&document, &config);
    match cli.format {
        OutputFormat::Text => {
            let source = SourceFile::with_name(document, cli.schema.display().to_string());
            let report = TextReport::new(&outcome, &source);
            if std::io::stdout().is_terminal() {
                print!("{}", report.colored());
            } else {
                print!("{report}");
            }
        }
        OutputFormat::Json => println!("{}", to_json(&outcome)?),
    }
    Ok(outcome.passed)
}
