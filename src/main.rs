use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use balancebook::app::{self, ReportContext};
use balancebook::chart::JsonChartRenderer;
use balancebook::clock::SystemClock;
use balancebook::config::{default_config_path, ResolvedConfig};
use balancebook::ledger::{CsvLedger, LedgerError, LedgerStore};
use balancebook::models::{LedgerRow, SummaryRow};
use balancebook::notify::StdoutNotifier;
use balancebook::oracle::{CachedOracle, YahooQuoteSource};

#[derive(Parser)]
#[command(name = "balancebook")]
#[command(about = "Personal balance sheet tracker")]
struct Cli {
    /// Path to config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run one full reporting cycle now
    Run,
    /// Print the current report without appending to the ledger
    Report,
    /// Undo the most recent ledger snapshot
    Revert,
    /// Run a cycle every day at the configured time
    Schedule,
    /// Show current configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config_path = cli.config.unwrap_or_else(default_config_path);
    let config = ResolvedConfig::load_or_default(&config_path)?;

    let oracle = CachedOracle::new(
        YahooQuoteSource::new().with_fx_symbol(config.fx_symbol.clone()),
    );
    let ledger: CsvLedger<LedgerRow> = CsvLedger::new(&config.ledger_file);
    let legacy_ledger: Option<CsvLedger<SummaryRow>> = config
        .legacy_ledger_file
        .as_ref()
        .map(CsvLedger::new);
    let renderer = JsonChartRenderer;
    let notifier = StdoutNotifier::new(config.mail.clone());

    let ctx = ReportContext {
        config: &config,
        oracle: &oracle,
        ledger: &ledger,
        legacy_ledger: legacy_ledger
            .as_ref()
            .map(|store| store as &dyn LedgerStore<SummaryRow>),
        renderer: &renderer,
        notifier: &notifier,
    };

    match cli.command {
        Command::Run => {
            let outcome = app::run_cycle(&ctx).await?;
            info!(
                rows = outcome.rows_appended,
                timestamp = %outcome.appended_at,
                "reporting cycle finished"
            );
        }
        Command::Report => {
            let report = app::render_current_report(&ctx).await?;
            println!("{report}");
        }
        Command::Revert => match ctx.ledger.revert_last() {
            Ok(removed) => println!("Removed {removed} row(s) from the last snapshot"),
            Err(LedgerError::NothingToRevert) => {
                println!("Ledger is empty; nothing to revert")
            }
            Err(err) => return Err(err.into()),
        },
        Command::Schedule => {
            app::run_scheduled(&ctx, &SystemClock).await?;
        }
        Command::Config => {
            println!("Config file: {}", config_path.display());
            println!("Data directory: {}", config.data_dir.display());
            println!("Portfolio file: {}", config.portfolio_file.display());
            println!("Ledger file: {}", config.ledger_file.display());
            println!("Chart file: {}", config.chart_file.display());
            println!(
                "Schedule: daily at {} (poll every {:?})",
                config.schedule_at, config.poll_interval
            );
        }
    }

    Ok(())
}
