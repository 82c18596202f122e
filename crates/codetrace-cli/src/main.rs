//! codetrace CLI - command-line interface for the codetrace static
//! analysis engine.
//!
//! This is the main entry point for users interacting with codetrace.
//! It provides commands for indexing a project and running queries
//! against the resulting call graph and taint summaries.

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod reporter;

#[derive(Parser)]
#[command(name = "codetrace")]
#[command(author = "codetrace contributors")]
#[command(version)]
#[command(about = "Multi-language static analysis for Java and Python", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Index a project and build the call graph, taint summaries, and
    /// query index
    Index {
        /// Path to analyze (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Source language to parse
        #[arg(short, long, default_value = "python")]
        lang: String,

        /// Output file for the analysis summary JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Run a filter-expression query over an indexed project
    Query {
        /// Path to analyze (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Source language to parse
        #[arg(short, long, default_value = "python")]
        lang: String,

        /// Filter expression, e.g. "m.parameterCount > 2"
        expression: String,
    },

    /// Show index status and statistics without persisting anything
    Status {
        /// Path to analyze (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Source language to parse
        #[arg(short, long, default_value = "python")]
        lang: String,
    },
}

fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(tracing_subscriber::EnvFilter::new(filter))
        .init();

    let result = match cli.command {
        Commands::Index { path, lang, output } => {
            commands::index(&path, &lang, output.as_deref())
        }
        Commands::Query {
            path,
            lang,
            expression,
        } => commands::query(&path, &lang, &expression),
        Commands::Status { path, lang } => commands::status(&path, &lang),
    };

    if let Err(e) = result {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}
