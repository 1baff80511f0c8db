use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, warn};

use rulecheck::{DEFAULT_ROOT, RuleEngine, RulecheckError};

/// Check a file or directory against the rule sets of a configuration
/// document.
#[derive(Debug, Parser)]
#[command(name = "rulecheck", version, about)]
struct Cli {
    /// JSON configuration document with variables and rule sets.
    #[arg(short, long)]
    config: PathBuf,

    /// Rule set to start from.
    #[arg(short, long, default_value = DEFAULT_ROOT)]
    root: String,

    /// Write the issue export to this file.
    #[arg(long)]
    issues: Option<PathBuf>,

    /// Write the rule type reference to this file.
    #[arg(long)]
    export_types: Option<PathBuf>,

    /// Raise log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Path handed to the root rule set.
    input: PathBuf,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(2)
        }
    }
}

/// Returns whether the run finished without problems.
fn run(cli: &Cli) -> Result<bool, RulecheckError> {
    let mut engine = RuleEngine::with_builtins()?;

    let load = engine.load_file(&cli.config)?;
    if !load.is_clean() {
        warn!(
            dropped = load.dropped.len(),
            ignored = load.ignored.len(),
            "configuration loaded with errors"
        );
    }
    debug!(loaded = load.loaded.len(), disabled = load.disabled.len(), "configuration loaded");

    if let Some(path) = &cli.export_types {
        engine.export_rule_types(path)?;
    }

    let report = engine.test(&cli.input, &cli.root);
    println!("{report}");
    for issue in report.issues() {
        println!("{issue}");
    }

    if let Some(path) = &cli.issues {
        report.export_to_file(path)?;
    }

    Ok(report.problem_count() == 0)
}

fn init_logging(verbose: u8) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();
}
