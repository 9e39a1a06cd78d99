//! regdiff command-line interface.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "regdiff", version, about = "Compare numbered-clause regulatory PDFs")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract the clause tree from a single document
    Extract {
        /// Path to the PDF document
        path: PathBuf,
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
    /// Compare two documents clause by clause
    Compare {
        /// The baseline document
        base: PathBuf,
        /// The document compared against the baseline
        compared: PathBuf,
        /// Which diff granularity the text output renders
        #[arg(long, value_enum, default_value = "word")]
        granularity: Granularity,
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Granularity {
    Word,
    Sentence,
    Paragraph,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Extract { path, format } => commands::extract::run(&path, format),
        Commands::Compare {
            base,
            compared,
            granularity,
            format,
        } => commands::compare::run(&base, &compared, granularity, format),
    }
}
