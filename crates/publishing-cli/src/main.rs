use std::path::PathBuf;

use clap::Parser;
use publishing_cli::cli::{execute, CliCommand, CliConfig};
use publishing_core::store::SaveOutcome;
use publishing_core::tracing_setup::init_tracing;
use publishing_core::{AppStore, Persistence};

#[derive(Parser)]
#[command(name = "publishing-os")]
#[command(about = "Track self-published books from draft to marketing")]
#[command(version)]
struct Cli {
    /// Pretty-print JSON output
    #[arg(long, short)]
    pretty: bool,

    /// Directory the document is stored in (overrides dataDir from config)
    #[arg(long, short = 'd')]
    data_dir: Option<PathBuf>,

    /// Path to JSON config file (contains dataDir, demoUrl, exportDir)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<CliCommand>,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_tracing("warn") {
        eprintln!("Warning: logging disabled: {:#}", e);
    }

    let config = load_config(&cli);

    let Some(command) = cli.command else {
        eprintln!("No command specified. Use --help for usage.");
        std::process::exit(1);
    };

    let core_config = config.core_config(cli.data_dir.as_deref());
    tracing::debug!(data_dir = %core_config.data_dir.display(), "opening store");
    let mut store = AppStore::open(Persistence::from_config(&core_config));

    let output = match execute(&mut store, command, &config) {
        Ok(output) => output,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    if store.last_save() == SaveOutcome::Failed {
        eprintln!("Warning: changes could not be saved to {}", core_config.data_dir.display());
    }

    match output.render(cli.pretty) {
        Ok(text) => println!("{}", text),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Load configuration from the `--config` file, or defaults without one
fn load_config(cli: &Cli) -> CliConfig {
    match cli.config.as_deref() {
        Some(path) => match CliConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error: {:#}", e);
                std::process::exit(1);
            }
        },
        None => CliConfig::default(),
    }
}
