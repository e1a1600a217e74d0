mod commands;
mod logging;
mod prompt;
mod reporter;

use std::fs::File;
use std::process;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use colored::*;
use commands::{Cli, Commands};
use dotenv::dotenv;
use prompt::prompt_confirm;
use reporter::CliReporter;
use tracing::{error, info, warn};
use untitled_folder::rename::{dry_run, RenameStatus};
use untitled_folder::{AppConfig, RenameEngine, RenameProposal, TransactionError};

fn main() {
    dotenv().ok();

    let config = match untitled_folder::config::load_configuration() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{} {}", "Error loading configuration:".red(), err);
            process::exit(1);
        }
    };

    let _guard = logging::init_logger(&config);

    let args = Cli::parse();

    let outcome = match args.command {
        Some(Commands::Scan(roots)) => run_scan(config, roots.roots),
        Some(Commands::Propose(roots)) => run_propose(config, roots.roots),
        Some(Commands::DryRun { roots, csv }) => run_dry_run(config, roots.roots, csv),
        Some(Commands::Apply { roots, yes }) => run_apply(config, roots.roots, yes),
        Some(Commands::PrintConfig) => {
            println!("Configuration: {:?}", config);
            Ok(())
        }
        None => {
            let _ = Cli::command().print_long_help();
            Ok(())
        }
    };

    if let Err(err) = outcome {
        error!("Error: {:#}", err);
        process::exit(1);
    }
}

fn run_scan(config: AppConfig, roots: Vec<String>) -> Result<()> {
    let engine = RenameEngine::new(config).with_roots(roots);
    let reporter = CliReporter::new();
    let result = engine.scan(&reporter).context("scan failed")?;

    for entry in &result.entries {
        let kind = if entry.is_dir { "dir " } else { "file" };
        println!("{} {}", kind.dimmed(), entry.path.display());
    }
    info!(
        "{} untitled entries under {} root(s) in {}",
        format!("{}", result.entries.len()).yellow(),
        result.roots.len(),
        format!("{:.2}s", result.scan_duration.as_secs_f64()).green(),
    );
    Ok(())
}

fn scan_and_propose(
    engine: &RenameEngine,
    reporter: &CliReporter,
) -> Result<Vec<RenameProposal>> {
    let result = engine.scan(reporter).context("scan failed")?;
    Ok(engine.propose(&result.entries, reporter))
}

fn run_propose(config: AppConfig, roots: Vec<String>) -> Result<()> {
    let engine = RenameEngine::new(config).with_roots(roots);
    let reporter = CliReporter::new();
    let proposals = scan_and_propose(&engine, &reporter)?;

    for proposal in &proposals {
        println!(
            "{} -> {} {}",
            proposal.original_path().display(),
            proposal.new_name().cyan(),
            format!("({}, {:.2})", proposal.category(), proposal.confidence()).dimmed(),
        );
    }
    info!("{} proposals", format!("{}", proposals.len()).cyan());
    Ok(())
}

fn run_dry_run(
    config: AppConfig,
    roots: Vec<String>,
    csv: Option<std::path::PathBuf>,
) -> Result<()> {
    let engine = RenameEngine::new(config).with_roots(roots);
    let reporter = CliReporter::new();
    let proposals = scan_and_propose(&engine, &reporter)?;

    let results = engine.dry_run(&proposals);
    println!("{}", dry_run::report(&results));

    if let Some(path) = csv {
        let file = File::create(&path)
            .with_context(|| format!("cannot create {}", path.display()))?;
        dry_run::write_csv(&results, file)
            .with_context(|| format!("cannot write {}", path.display()))?;
        info!("Dry run results written to {}", path.display());
    }

    let failing = results.iter().filter(|r| !r.would_succeed()).count();
    if failing > 0 {
        warn!("{} of {} renames would fail", format!("{}", failing).red(), results.len());
    }
    Ok(())
}

fn run_apply(config: AppConfig, roots: Vec<String>, yes: bool) -> Result<()> {
    let engine = RenameEngine::new(config).with_roots(roots);
    let reporter = CliReporter::new();
    let proposals = scan_and_propose(&engine, &reporter)?;

    if proposals.is_empty() {
        info!("Nothing to rename");
        return Ok(());
    }

    let simulated = engine.dry_run(&proposals);
    println!("{}", dry_run::report(&simulated));
    let failing = simulated.iter().filter(|r| !r.would_succeed()).count();

    if !yes {
        let question = confirmation_question(proposals.len(), failing);
        if !prompt_confirm(&question, Some(false))? {
            info!("Aborted, nothing renamed");
            return Ok(());
        }
    } else if failing > 0 {
        warn!("{} of {} renames would fail", format!("{}", failing).red(), proposals.len());
    }

    match engine.apply(&proposals, &reporter) {
        Ok(results) => {
            for result in &results {
                println!(
                    "{} {} -> {}",
                    "renamed".green(),
                    result.original_path.display(),
                    result.target_path.display()
                );
            }
            Ok(())
        }
        Err(err) => {
            reporter.finish_bar();
            print_failed_batch(&err);
            let outcome = err.outcome();
            Err(err).context(outcome)
        }
    }
}

fn confirmation_question(total: usize, failing: usize) -> String {
    if failing > 0 {
        format!(
            "{} of {} renames would fail and the batch would be rolled back. Rename anyway?",
            failing, total
        )
    } else {
        format!("Rename {} entries?", total)
    }
}

fn print_failed_batch(err: &TransactionError) {
    for result in err.results() {
        let status = match result.status {
            RenameStatus::Renamed => "renamed".green(),
            RenameStatus::RolledBack => "rolled back".yellow(),
            RenameStatus::Failed => "failed".red(),
            RenameStatus::Stranded => "STRANDED".red().bold(),
        };
        println!(
            "{} {} -> {}",
            status,
            result.original_path.display(),
            result.target_path.display()
        );
    }
    if err.is_rollback_failure() {
        error!(
            "{}",
            "Rollback did not complete; entries marked STRANDED are still at their new names"
                .red()
                .bold()
        );
    }
}
