use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use interunit_engine::{
    AccountMapping, EngineOptions, FileData, ManualConfirmation, MatchEngine, ReconOutcome,
};

/// Reconcile interunit loan ledgers exported from Tally.
#[derive(Parser)]
#[command(name = "interunit", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Match two ledger exports and write a reconciliation report.
    Run {
        /// First ledger export (JSON sheet dump).
        #[arg(long)]
        file1: PathBuf,
        /// Second ledger export (JSON sheet dump).
        #[arg(long)]
        file2: PathBuf,
        /// Interunit account map (TOML).
        #[arg(long)]
        mapping: Option<PathBuf>,
        /// Confirmed manual matches from a previous run (JSON).
        #[arg(long)]
        manual: Option<PathBuf>,
        /// Where to write the report.
        #[arg(long, default_value = "report.json")]
        out: PathBuf,
        /// Drop blocks that never saw an "Entered By :" terminator.
        #[arg(long)]
        drop_unterminated: bool,
    },
    /// Check a previously written report for internal consistency.
    Verify {
        #[arg(long, default_value = "report.json")]
        report: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    match Cli::parse().command {
        Command::Run { file1, file2, mapping, manual, out, drop_unterminated } => {
            run(file1, file2, mapping, manual, out, drop_unterminated)
        }
        Command::Verify { report } => verify(report),
    }
}

fn run(
    file1: PathBuf,
    file2: PathBuf,
    mapping: Option<PathBuf>,
    manual: Option<PathBuf>,
    out: PathBuf,
    drop_unterminated: bool,
) -> anyhow::Result<()> {
    let options = EngineOptions { drop_unterminated, ..EngineOptions::default() };

    let mapping = match mapping {
        Some(path) => AccountMapping::from_path(&path)
            .with_context(|| format!("loading mapping {}", path.display()))?,
        None => AccountMapping::from_toml("")?,
    };

    let confirmed: Vec<ManualConfirmation> = match manual {
        Some(path) => {
            let text = fs::read_to_string(&path)
                .with_context(|| format!("reading {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("parsing {}", path.display()))?
        }
        None => Vec::new(),
    };

    let f1 = FileData::load(&file1, &options)
        .with_context(|| format!("loading {}", file1.display()))?;
    let f2 = FileData::load(&file2, &options)
        .with_context(|| format!("loading {}", file2.display()))?;

    let outcome = MatchEngine::new(mapping, options).run(&f1, &f2, &confirmed)?;

    let problems = interunit_engine::report::verify_against(&outcome, &f1, &f2);
    if problems.is_empty() {
        tracing::debug!("report cross-check clean");
    } else {
        for problem in &problems {
            tracing::error!("report inconsistency: {problem}");
        }
        anyhow::bail!("{} report inconsistency(ies) found, refusing to write", problems.len());
    }

    fs::write(&out, serde_json::to_string_pretty(&outcome)?)
        .with_context(|| format!("writing {}", out.display()))?;

    println!("Matched pairs:");
    for (strategy, count) in &outcome.counts {
        println!("  {strategy:<14} {count}");
    }
    println!("Manual candidates: {}", outcome.manual_candidates.len());
    println!(
        "Unmatched blocks:  {} (file 1), {} (file 2)",
        outcome.unmatched_file1.len(),
        outcome.unmatched_file2.len()
    );
    println!("Report written to {}", out.display());
    Ok(())
}

fn verify(report: PathBuf) -> anyhow::Result<()> {
    let text = fs::read_to_string(&report)
        .with_context(|| format!("reading {}", report.display()))?;
    let outcome: ReconOutcome = serde_json::from_str(&text)
        .with_context(|| format!("parsing {}", report.display()))?;

    let problems = interunit_engine::report::verify_outcome(&outcome);
    if problems.is_empty() {
        println!(
            "{}: {} matches, report is consistent",
            report.display(),
            outcome.matches.len()
        );
        Ok(())
    } else {
        for problem in &problems {
            eprintln!("problem: {problem}");
        }
        anyhow::bail!("{} consistency problem(s) found", problems.len())
    }
}
