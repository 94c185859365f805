use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use pipeline::{
    AutoConfirm, CancelToken, Confirm, RunConfig, RunReport, run_catalog_import,
    run_similarity_update,
};
use store::{JsonlStore, MovieStore};

/// ReelSim - content-based movie similarity pipeline
#[derive(Parser)]
#[command(name = "reel-sim")]
#[command(about = "Recompute pairwise movie similarities from collected metadata", long_about = None)]
struct Cli {
    /// Path to the store directory (movies.jsonl, catalog.jsonl, similarities.jsonl)
    #[arg(short, long, default_value = "data")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Recompute and persist all movie similarity pairs
    Update {
        /// Cap the number of candidate movies (hottest first)
        #[arg(long)]
        limit: Option<usize>,

        /// Minimum similarity for a pair to be kept
        #[arg(long, default_value = "0.15")]
        min_similarity: f32,

        /// Minimum ratings count for a movie to enter the computation
        #[arg(long, default_value = "10")]
        min_ratings: u32,

        /// Maximum similarity records to store (0 = unlimited)
        #[arg(long, default_value = "10000")]
        max_records: u64,

        /// Similarity records per bulk insert
        #[arg(long, default_value = "1000")]
        batch_size: usize,

        /// Skip the catalog import step before computing
        #[arg(long)]
        no_import: bool,

        /// Skip the confirmation prompt before deleting existing pairs
        #[arg(long)]
        no_prompt: bool,
    },

    /// Import source movies into the catalog without computing similarities
    Import {
        /// Cap the number of movies to import (hottest first)
        #[arg(long)]
        limit: Option<usize>,

        /// Minimum ratings count for a movie to be imported
        #[arg(long, default_value = "0")]
        min_ratings: u32,
    },

    /// Show record counts for the store
    Stats,
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut store = JsonlStore::open(&cli.data_dir)
        .with_context(|| format!("Failed to open store at {}", cli.data_dir.display()))?;

    match cli.command {
        Commands::Update {
            limit,
            min_similarity,
            min_ratings,
            max_records,
            batch_size,
            no_import,
            no_prompt,
        } => {
            let config = RunConfig {
                limit,
                min_similarity,
                min_ratings,
                max_records: Some(max_records),
                batch_size,
                force_import: !no_import,
            };
            handle_update(&mut store, &config, no_prompt)
        }
        Commands::Import { limit, min_ratings } => handle_import(&mut store, min_ratings, limit),
        Commands::Stats => handle_stats(&store),
    }
}

/// Handle the 'update' command
fn handle_update(store: &mut JsonlStore, config: &RunConfig, no_prompt: bool) -> Result<()> {
    let cancel = CancelToken::new();
    {
        let cancel = cancel.clone();
        ctrlc::set_handler(move || {
            eprintln!("Interrupt received, finishing the current batch...");
            cancel.cancel();
        })
        .context("Failed to install Ctrl-C handler")?;
    }

    let mut confirm: Box<dyn Confirm> = if no_prompt {
        Box::new(AutoConfirm)
    } else {
        Box::new(StdinConfirm)
    };

    let report = run_similarity_update(store, config, confirm.as_mut(), &cancel)
        .context("Similarity update failed")?;
    print_report(&report);
    Ok(())
}

/// Handle the 'import' command
fn handle_import(store: &mut JsonlStore, min_ratings: u32, limit: Option<usize>) -> Result<()> {
    let created =
        run_catalog_import(store, min_ratings, limit).context("Catalog import failed")?;
    println!(
        "{} Imported {} new catalog movies ({} total)",
        "✓".green(),
        created,
        store.catalog_len()
    );
    Ok(())
}

/// Handle the 'stats' command
fn handle_stats(store: &JsonlStore) -> Result<()> {
    println!("{}", "Store contents:".bold().blue());
    println!("{}Source movies: {}", "• ".green(), store.source_len());
    println!("{}Catalog movies: {}", "• ".green(), store.catalog_len());
    println!(
        "{}Similarity pairs: {}",
        "• ".green(),
        store.count_similarity_pairs()?
    );
    Ok(())
}

/// Interactive confirmation on stdin for destructive reruns.
struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm_delete(&mut self, existing_pairs: u64) -> bool {
        println!(
            "{}",
            format!(
                "The store already holds {existing_pairs} similarity pairs; continuing will delete all of them!"
            )
            .yellow()
        );
        print!("Delete existing data and recompute? (y/n): ");
        let _ = io::stdout().flush();

        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
    }
}

/// Print the run summary, whatever the termination path.
fn print_report(report: &RunReport) {
    if report.aborted {
        println!("{}", "Operation cancelled, existing data untouched".yellow());
        return;
    }

    println!("{}", "Similarity update summary:".bold().blue());
    println!("{}Candidates loaded: {}", "• ".green(), report.candidates_loaded);
    println!("{}Movies scored: {}", "• ".green(), report.movies_kept);
    println!("{}Catalog movies imported: {}", "• ".green(), report.imported);
    println!("{}Pairs considered: {}", "• ".cyan(), report.pairs_considered);
    println!("{}Pairs accepted: {}", "• ".cyan(), report.pairs_accepted);
    if report.pairs_dropped > 0 {
        println!("{}Pairs dropped: {}", "• ".red(), report.pairs_dropped);
    }
    println!(
        "{}Pairs written: {} ({} batches)",
        "• ".cyan(),
        report.pairs_written,
        report.batches
    );
    if report.capped {
        println!("{}", "Record cap reached; remaining pairs were not stored".yellow());
    }
    if report.cancelled {
        println!("{}", "Run interrupted; counts above reflect what was persisted".yellow());
    }
    println!("{} Done in {:?}", "✓".green(), report.elapsed);
}
