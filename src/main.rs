use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use config::{interval_from_secs, Config};
use history::{Entry, HistoryStore};
use monitor::Monitor;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use tokio::sync::watch;
use utils::clipboard::Clipboard;

mod config;
mod history;
mod monitor;
mod render;
mod utils;

#[derive(Parser)]
#[command(name = "cliplog", version, about = "Clipboard history manager")]
struct Cli {
    /// Directory holding history and configuration
    #[arg(long, global = true, env = "CLIPLOG_DIR")]
    data_dir: Option<PathBuf>,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start monitoring the clipboard
    Start {
        /// Check interval in seconds (overrides the config file)
        #[arg(long)]
        interval: Option<f64>,
    },

    /// List clipboard history, newest first
    List {
        /// Limit number of entries
        #[arg(long)]
        limit: Option<usize>,
        /// Only show entries from the last N days
        #[arg(long)]
        days: Option<u32>,
    },

    /// Search history (case-insensitive)
    Search {
        /// Text to look for
        query: String,
        /// Limit results
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Show one entry by its index
    Get {
        /// Entry index as shown by list/search
        index: u64,
        /// Copy the entry back to the clipboard
        #[arg(long)]
        copy: bool,
    },

    /// Clear history
    Clear {
        /// Only clear entries older than N days
        #[arg(long)]
        days: Option<u32>,
        /// Do not ask before clearing everything
        #[arg(short, long)]
        yes: bool,
    },

    /// Show statistics
    Stats,
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let dir = match cli.data_dir {
        Some(dir) => dir,
        None => Config::default_dir().context("Could not determine the home directory")?,
    };
    let config = Config::load(&dir)?;
    log::debug!("Using data directory {} with {:?}", dir.display(), config);

    match cli.command {
        Commands::Start { interval } => start(&dir, &config, interval),
        Commands::List { limit, days } => {
            let store = open_store(&dir)?;
            let entries: Vec<&Entry> = store.list(limit, days).collect();
            if store.is_empty() {
                println!("No clipboard history.");
            } else if entries.is_empty() {
                println!("No clipboard history entries found.");
            } else {
                print!(
                    "{}",
                    render::entry_list("Clipboard History", &entries, render::LIST_PREVIEW_WIDTH)
                );
            }
            Ok(())
        }
        Commands::Search { query, limit } => {
            let store = open_store(&dir)?;
            let matches: Vec<&Entry> = store.search(&query, limit)?.collect();
            if matches.is_empty() {
                println!("No entries found matching '{query}'");
            } else {
                print!(
                    "{}",
                    render::entry_list("Matching entries", &matches, render::SEARCH_PREVIEW_WIDTH)
                );
            }
            Ok(())
        }
        Commands::Get { index, copy } => {
            let store = open_store(&dir)?;
            let entry = store.get(index)?;
            print!("{}", render::entry_detail(entry));
            if copy {
                Clipboard::new().set_text(&entry.content)?;
                println!("Copied to clipboard!");
            }
            Ok(())
        }
        Commands::Clear { days, yes } => {
            let mut store = open_store(&dir)?;
            match days {
                Some(days) => {
                    let removed = store.clear(Some(days))?;
                    println!("Removed {removed} entries older than {days} days.");
                }
                None => {
                    if !yes && !confirm("Clear all clipboard history? (yes/no): ")? {
                        println!("Cancelled.");
                        return Ok(());
                    }
                    let removed = store.clear(None)?;
                    println!("Clipboard history cleared ({removed} entries removed).");
                }
            }
            Ok(())
        }
        Commands::Stats => {
            let store = open_store(&dir)?;
            print!("{}", render::stats(&store.stats()));
            Ok(())
        }
    }
}

fn open_store(dir: &Path) -> Result<HistoryStore> {
    Ok(HistoryStore::open(Config::history_path(dir))?)
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{prompt}");
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(answer.trim().eq_ignore_ascii_case("yes"))
}

fn start(dir: &Path, config: &Config, interval: Option<f64>) -> Result<()> {
    let interval = match interval {
        Some(secs) => interval_from_secs(secs).context("Invalid --interval")?,
        None => config.poll_interval()?,
    };

    let mut store = open_store(dir)?;
    if let Some(days) = config.retention_days {
        let removed = store.clear(Some(days))?;
        if removed > 0 {
            println!("Removed {removed} entries older than {days} days.");
        }
    }

    println!("Monitoring clipboard... Press Ctrl+C to stop.");
    println!(
        "History file: {} ({} entries)",
        store.path().display(),
        store.len()
    );
    println!();

    let monitor = Monitor::new(Clipboard::new(), store, config.max_size_bytes(), interval);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start the async runtime")?;

    let captured = runtime.block_on(async move {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                log::error!("Cannot listen for Ctrl+C: {e}");
                std::future::pending::<()>().await;
            }
            let _ = shutdown_tx.send(true);
        });
        // Let the signal handler install before the first poll
        tokio::task::yield_now().await;

        monitor
            .run(shutdown_rx, |entry| println!("{}", render::capture_line(entry)))
            .await
    })?;

    println!("\nMonitoring stopped. {captured} entries captured.");
    Ok(())
}
