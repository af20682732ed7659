//! Expiry CLI: expiry-cycle mean-reversion backtests over minute data.
//!
//! Commands:
//! - `backtest`: every instrument in a data folder (plus optional synthetic
//!   ones), from a TOML config and/or flags
//! - `single`: one CSV file, printing each evaluated signal

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing::info;

use expiry_runner::data_loader::symbol_from_path;
use expiry_runner::{
    discover_instruments, format_report, format_summary, load_minute_bars, run_bars, run_batch,
    save_artifacts, BacktestConfig, InstrumentSource,
};

#[derive(Parser)]
#[command(
    name = "expiry",
    about = "Expiry-cycle mean-reversion signal backtester"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Backtest every instrument in a data folder.
    Backtest {
        /// Path to a TOML config file. Flags below override its values.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Folder of <NAME>_minute.csv files.
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Start date (YYYY-MM-DD). Defaults to 2021-01-01.
        #[arg(long)]
        start: Option<String>,

        /// End date (YYYY-MM-DD). Defaults to 2023-12-31.
        #[arg(long)]
        end: Option<String>,

        /// Session interval, e.g. 15min, 1h, 1D.
        #[arg(long)]
        interval: Option<String>,

        /// Worker threads (1 = sequential, 0 = all cores).
        #[arg(long)]
        threads: Option<usize>,

        /// Output directory for signals.csv and summary.json.
        #[arg(long, default_value = "results")]
        output_dir: PathBuf,

        /// Add synthetic instruments with these symbols.
        #[arg(long, num_args = 1..)]
        synthetic: Vec<String>,
    },
    /// Backtest a single minute-bar CSV file.
    Single {
        /// Path to the CSV file.
        #[arg(long)]
        file: PathBuf,

        /// Start date (YYYY-MM-DD). Defaults to the first bar.
        #[arg(long)]
        start: Option<String>,

        /// End date (YYYY-MM-DD). Defaults to the last bar.
        #[arg(long)]
        end: Option<String>,

        /// Session interval, e.g. 15min, 1h, 1D.
        #[arg(long, default_value = "1D")]
        interval: String,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Backtest {
            config,
            data_dir,
            start,
            end,
            interval,
            threads,
            output_dir,
            synthetic,
        } => run_backtest_cmd(
            config, data_dir, start, end, interval, threads, output_dir, synthetic,
        ),
        Commands::Single {
            file,
            start,
            end,
            interval,
        } => run_single_cmd(&file, start, end, interval),
    }
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("invalid date '{s}' (expected YYYY-MM-DD)"))
}

#[allow(clippy::too_many_arguments)]
fn run_backtest_cmd(
    config_path: Option<PathBuf>,
    data_dir: Option<PathBuf>,
    start: Option<String>,
    end: Option<String>,
    interval: Option<String>,
    threads: Option<usize>,
    output_dir: PathBuf,
    synthetic: Vec<String>,
) -> Result<()> {
    let mut config = match config_path {
        Some(path) => BacktestConfig::from_file(&path)?,
        None => BacktestConfig::new(parse_date("2021-01-01")?, parse_date("2023-12-31")?, "data"),
    };
    if let Some(dir) = data_dir {
        config.backtest.data_dir = dir;
    }
    if let Some(s) = start {
        config.backtest.start_date = parse_date(&s)?;
    }
    if let Some(e) = end {
        config.backtest.end_date = parse_date(&e)?;
    }
    if let Some(i) = interval {
        config.session.interval = i;
    }
    if let Some(t) = threads {
        config.backtest.threads = t;
    }
    config.validate()?;

    let mut instruments = if config.backtest.data_dir.is_dir() {
        match discover_instruments(&config.backtest.data_dir) {
            Ok(found) => found,
            Err(e) if !synthetic.is_empty() => {
                info!(error = %e, "no CSV instruments, running synthetic only");
                Vec::new()
            }
            Err(e) => return Err(e.into()),
        }
    } else if synthetic.is_empty() {
        bail!(
            "data directory {} does not exist (use --synthetic for synthetic data)",
            config.backtest.data_dir.display()
        );
    } else {
        Vec::new()
    };
    instruments.extend(synthetic.into_iter().map(InstrumentSource::synthetic));

    println!(
        "Backtesting {} instruments, {} to {}",
        instruments.len(),
        config.backtest.start_date,
        config.backtest.end_date
    );

    let report = run_batch(&instruments, &config)?;

    println!("{}", format_report(&report));
    println!("Total signals: {}", report.signals.len());

    let run_dir = save_artifacts(&report, &output_dir)?;
    println!("Artifacts saved to: {}", run_dir.display());

    Ok(())
}

fn run_single_cmd(
    file: &Path,
    start: Option<String>,
    end: Option<String>,
    interval: String,
) -> Result<()> {
    let symbol = symbol_from_path(file).unwrap_or_else(|| "UNKNOWN".to_string());
    let from = start.as_deref().map(parse_date).transpose()?;
    let to = end.as_deref().map(parse_date).transpose()?;

    let bars = load_minute_bars(
        file,
        from.unwrap_or(NaiveDate::MIN),
        to.unwrap_or(NaiveDate::MAX),
    )?;
    let (Some(first), Some(last)) = (bars.first(), bars.last()) else {
        bail!("{} has no bars in the requested range", file.display());
    };
    let start_date = from.unwrap_or_else(|| first.date());
    let end_date = to.unwrap_or_else(|| last.date());

    let data_dir = file.parent().unwrap_or(Path::new("."));
    let mut config = BacktestConfig::new(start_date, end_date, data_dir);
    config.session.interval = interval;
    config.validate()?;
    let params = config.to_strategy_params()?;

    let run = run_bars(&symbol, &bars, start_date, end_date, false, &params)?;

    println!(
        "{symbol}: {} minute bars, {} sessions, {} cycles",
        run.outcome.minute_bars, run.outcome.session_bars, run.outcome.cycles
    );
    println!(
        "\n{:<20} {:<12} {:<6} {:>12} {:>12} {:>8}",
        "datetime", "expiry", "signal", "reference", "expiry_close", "success"
    );
    for ev in &run.outcome.evaluated {
        println!(
            "{:<20} {:<12} {:<6} {:>12.2} {:>12} {:>8}",
            ev.signal.datetime.format("%Y-%m-%d %H:%M"),
            ev.signal.expiry,
            ev.signal.signal_type,
            ev.signal.reference_price,
            ev.expiry_close
                .map(|c| format!("{c:.2}"))
                .unwrap_or_else(|| "-".into()),
            ev.success.map(|s| s.to_string()).unwrap_or_else(|| "-".into()),
        );
    }
    println!("\n{}", format_summary(&run.outcome.summary));

    Ok(())
}
