mod commands;
mod settings;
mod ui;

use clap::{Parser, Subcommand};
use settings::Overrides;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "metrics-bridge")]
#[command(about = "Republishes Data Lake and Data Warehouse metrics for Prometheus", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable quiet mode (errors only)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve /metrics and refresh it from the source store until interrupted
    Serve {
        /// Path to config file (YAML, TOML, or JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        #[command(flatten)]
        overrides: Overrides,
    },

    /// Run a single refresh cycle and print the exposition text
    Once {
        /// Path to config file (YAML, TOML, or JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        #[command(flatten)]
        overrides: Overrides,
    },

    /// Check that both source tables are reachable
    Check {
        /// Path to config file (YAML, TOML, or JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        #[command(flatten)]
        overrides: Overrides,
    },

    /// Validate a config file
    Validate {
        /// Path to config file
        config_file: PathBuf,

        #[command(flatten)]
        overrides: Overrides,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let guard = init_logging(&cli);

    let result = match cli.command {
        Commands::Serve { config, overrides } => commands::serve::execute(config, overrides).await,
        Commands::Once { config, overrides } => commands::once::execute(config, overrides).await,
        Commands::Check { config, overrides } => commands::check::execute(config, overrides).await,
        Commands::Validate {
            config_file,
            overrides,
        } => commands::validate::execute(config_file, overrides).await,
    };

    let code = match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    };

    // Flush buffered log lines before the process exits.
    drop(guard);
    code
}

fn init_logging(cli: &Cli) -> WorkerGuard {
    let log_level = if cli.verbose {
        Level::DEBUG
    } else if cli.quiet {
        Level::ERROR
    } else {
        Level::INFO
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_string()));

    // stdout is reserved for command output
    let (writer, guard) = tracing_appender::non_blocking(std::io::stderr());

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_target(false);

    if cli.log_json {
        builder.json().init();
    } else {
        builder.init();
    }

    guard
}
