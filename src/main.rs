//! Echonode - Maelstrom line-protocol node endpoint
//!
//! Reads one JSON request envelope per stdin line and writes one JSON
//! reply envelope per stdout line. Diagnostics go to stderr.

mod config;
mod node;
mod protocol;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use config::Config;
use node::{Dispatcher, Runner};

/// Echonode - line-delimited JSON protocol node
#[derive(Parser)]
#[command(name = "echonode")]
#[command(author = "Echonode Contributors")]
#[command(version = "0.1.0")]
#[command(about = "Node endpoint for the Maelstrom line-delimited JSON protocol", long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the node loop on stdin/stdout
    Run {
        /// Reject non-init requests until the node is initialized
        #[arg(long)]
        strict_init: bool,

        /// Terminate on the first protocol error (reference harness behavior)
        #[arg(long)]
        fail_fast: bool,
    },

    /// Show current configuration
    Config {
        /// Generate sample configuration
        #[arg(long)]
        generate: bool,

        /// Output path for generated config
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show protocol information
    Info,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = if let Some(config_path) = &cli.config {
        Config::load(config_path)?
    } else {
        Config::load_default().unwrap_or_default()
    };

    // Initialize logging. Stdout carries the protocol stream, so all
    // diagnostics are pinned to stderr.
    let filter = if cli.verbose || config.general.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match cli.command {
        Commands::Run {
            strict_init,
            fail_fast,
        } => {
            run_node(config, strict_init, fail_fast).await?;
        }
        Commands::Config { generate, output } => {
            if generate {
                let sample = config::generate_sample_config();
                if let Some(path) = output {
                    std::fs::write(&path, &sample)?;
                    println!("Configuration written to: {}", path.display());
                } else {
                    println!("{}", sample);
                }
            } else {
                println!("{}", toml::to_string_pretty(&config)?);
            }
        }
        Commands::Info => {
            print_protocol_info();
        }
    }

    Ok(())
}

/// Run the node loop over stdin/stdout
async fn run_node(config: Config, strict_init: bool, fail_fast: bool) -> anyhow::Result<()> {
    let mut options = config.node_options();
    if strict_init {
        options.strict_init = true;
    }
    if fail_fast {
        options.fail_fast = true;
    }

    tracing::info!(
        "Starting node loop (strict_init: {}, fail_fast: {})",
        options.strict_init,
        options.fail_fast
    );

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();

    let mut runner = Runner::new(options);
    runner.run(stdin, stdout).await?;

    tracing::info!("Input exhausted, node stopped");
    Ok(())
}

/// Print protocol information
fn print_protocol_info() {
    let dispatcher = Dispatcher::with_builtin_handlers();

    println!("Echonode Protocol Information");
    println!("=============================\n");

    println!("Supported message types:");
    for msg_type in dispatcher.message_types() {
        println!("  - {}", msg_type);
    }

    println!(
        "\nReserved body fields: {}, {}, {}",
        protocol::FIELD_TYPE,
        protocol::FIELD_MSG_ID,
        protocol::FIELD_IN_REPLY_TO
    );
    println!("Max line length: {} bytes", protocol::MAX_LINE_BYTES);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        // Test that CLI parsing works
        let cli = Cli::try_parse_from(["echonode", "info"]);
        assert!(cli.is_ok());
    }

    #[test]
    fn test_cli_run_flags() {
        let cli = Cli::try_parse_from(["echonode", "run", "--strict-init"]).unwrap();
        match cli.command {
            Commands::Run {
                strict_init,
                fail_fast,
            } => {
                assert!(strict_init);
                assert!(!fail_fast);
            }
            _ => panic!("expected run command"),
        }
    }
}
