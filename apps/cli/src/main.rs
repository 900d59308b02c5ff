//! Offline lab result checker.
//!
//! Classifies the OBX results of HL7 v2 message files against a reference
//! table CSV and prints them as JSON.

use anyhow::Context;
use clap::{Parser, Subcommand};
use ferrum_labs::{ClassifiedObservation, ReferenceRangeIndex};
use serde::Serialize;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Parser)]
#[command(name = "ferrum-labs", version, about = "Check HL7 lab results against reference ranges")]
struct Cli {
    /// Log filter, e.g. `debug` or `ferrum_labs=debug` (overridden by RUST_LOG)
    #[arg(long, global = true, default_value = "warn")]
    log: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Classify the observations of one or more messages
    Classify {
        /// Reference table CSV
        #[arg(short, long)]
        reference: PathBuf,

        /// HL7 message files
        #[arg(required = true)]
        messages: Vec<PathBuf>,

        /// Only print abnormal results
        #[arg(long)]
        abnormal_only: bool,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },
    /// Load a reference table and report its size
    CheckTable {
        /// Reference table CSV
        path: PathBuf,
    },
}

#[derive(Debug, Serialize)]
struct Report<'a> {
    file: &'a Path,
    results: Vec<ClassifiedObservation>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log);

    match cli.command {
        Command::Classify {
            reference,
            messages,
            abnormal_only,
            pretty,
        } => {
            let index = load_index(&reference)?;
            let stdout = io::stdout();
            let mut out = stdout.lock();
            for path in &messages {
                let report = classify_file(path, &index, abnormal_only)?;
                if pretty {
                    serde_json::to_writer_pretty(&mut out, &report)?;
                } else {
                    serde_json::to_writer(&mut out, &report)?;
                }
                writeln!(out)?;
            }
        }
        Command::CheckTable { path } => {
            let index = load_index(&path)?;
            println!(
                "{}: {} rows, {} (code, units) keys",
                path.display(),
                index.len(),
                index.key_count()
            );
        }
    }

    Ok(())
}

fn init_logging(filter: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();
}

fn load_index(path: &Path) -> anyhow::Result<ReferenceRangeIndex> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open reference table {}", path.display()))?;
    ReferenceRangeIndex::from_csv(file)
        .with_context(|| format!("Failed to read reference table {}", path.display()))
}

fn classify_file<'a>(
    path: &'a Path,
    index: &ReferenceRangeIndex,
    abnormal_only: bool,
) -> anyhow::Result<Report<'a>> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let mut results = ferrum_labs::analyze_bytes(&bytes, index)
        .with_context(|| format!("Failed to parse ORU file {}", path.display()))?;
    if abnormal_only {
        results.retain(|r| r.is_abnormal);
    }
    tracing::debug!(file = %path.display(), results = results.len(), "Classified message");
    Ok(Report { file: path, results })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn classify_requires_a_message() {
        assert!(Cli::try_parse_from(["ferrum-labs", "classify", "-r", "t.csv"]).is_err());
        let cli =
            Cli::try_parse_from(["ferrum-labs", "classify", "-r", "t.csv", "a.hl7", "b.hl7"])
                .unwrap();
        match cli.command {
            Command::Classify { messages, .. } => assert_eq!(messages.len(), 2),
            other => panic!("unexpected command {other:?}"),
        }
    }
}
