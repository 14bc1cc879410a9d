//! Command-line front end.
//!
//! ```text
//! srt-hunter --config srt.json
//! srt-hunter --print-dates
//! ```
//!
//! Progress narration goes to stdout with a wall-clock stamp; `tracing`
//! output goes to stderr. Ctrl+C requests a cooperative stop.

// ============================================================================
// Imports
// ============================================================================

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use srt_hunter::booking::TravelDate;
use srt_hunter::driver::BrowserKind;
use srt_hunter::{Config, Progress, SrtParser, StopSignal, runner};

// ============================================================================
// Constants
// ============================================================================

/// Days offered by `--print-dates`, matching the site's booking horizon.
const BOOKING_HORIZON_DAYS: u32 = 30;

// ============================================================================
// CLI
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "srt-hunter", about = "Watches SRT for a seat and books it", version)]
struct Cli {
    /// Configuration file (JSON).
    #[arg(long, short, default_value = "srt.json")]
    config: PathBuf,

    /// Browser engine, overriding the configuration file.
    #[arg(long, value_enum)]
    browser: Option<BrowserKind>,

    /// Run the browser without a window.
    #[arg(long)]
    headless: bool,

    /// Log driver steps to stderr.
    #[arg(long, short)]
    verbose: bool,

    /// Log everything, including every poll iteration.
    #[arg(long)]
    debug: bool,

    /// Print the date labels the search form accepts, then exit.
    #[arg(long)]
    print_dates: bool,
}

// ============================================================================
// Functions
// ============================================================================

fn init_logging(cli: &Cli) {
    let level = if cli.debug {
        "debug"
    } else if cli.verbose {
        "info"
    } else {
        "warn"
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("srt_hunter={level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn print_dates() {
    let today = Local::now().date_naive();
    for date in TravelDate::upcoming(today, BOOKING_HORIZON_DAYS) {
        println!("{date}");
    }
}

async fn hunt(cli: Cli) -> Result<bool> {
    let mut config = Config::load(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    if let Some(kind) = cli.browser {
        config.browser.kind = kind;
    }
    config.browser.headless |= cli.headless;

    let parser = SrtParser::new().context("building page parser")?;

    let progress = Progress::new();
    let mut lines = progress.subscribe();
    let printer = tokio::spawn(async move {
        while let Some(line) = lines.recv().await {
            println!("[{}] {line}", Local::now().format("%H:%M:%S"));
        }
    });

    let stop = StopSignal::new();
    let on_interrupt = stop.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.stop();
        }
    });

    let outcome = runner::run_with_browser(&config, &parser, &progress, &stop).await;

    drop(progress);
    let _ = printer.await;

    if let Some(receipt) = &outcome.receipt {
        println!("{receipt}");
    }
    Ok(outcome.success)
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(&cli);

    if cli.print_dates {
        print_dates();
        return Ok(ExitCode::SUCCESS);
    }

    let success = hunt(cli).await?;
    Ok(if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
