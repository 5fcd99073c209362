//! The aql command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;
mod console;
mod render;

#[derive(Parser)]
#[command(name = "aql", version, about = "Personality assessment and module quiz scoring")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Take an assessment interactively or from an answer sheet
    Take {
        /// Path to a step bank .toml (default: config `default_bank`, then built-in)
        #[arg(long)]
        bank: Option<PathBuf>,

        /// Answer sheet .toml for a non-interactive run
        #[arg(long)]
        answers: Option<PathBuf>,

        /// Output format: table, json
        #[arg(long, default_value = "table")]
        format: String,

        /// Save a JSON report to this directory
        #[arg(long)]
        output: Option<PathBuf>,

        /// Save a JSON report to the configured output directory
        #[arg(long)]
        save: bool,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate step bank TOML files
    Validate {
        /// Path to step bank file or directory
        #[arg(long)]
        bank: PathBuf,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Grade a module quiz attempt
    Grade {
        /// Path to module quiz .toml
        #[arg(long)]
        quiz: PathBuf,

        /// Selections .toml (question id = option id)
        #[arg(long)]
        answers: PathBuf,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Show a saved assessment report
    Show {
        /// Report JSON
        #[arg(long)]
        report: PathBuf,

        /// Output format: table, json, markdown
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Create starter config and step bank
    Init,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("aql=info")),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Take {
            bank,
            answers,
            format,
            output,
            save,
            config,
        } => commands::take::execute(bank, answers, format, output, save, config),
        Commands::Validate { bank, config } => commands::validate::execute(bank, config),
        Commands::Grade {
            quiz,
            answers,
            format,
            config,
        } => commands::grade::execute(quiz, answers, format, config),
        Commands::Show { report, format } => commands::show::execute(report, format),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
