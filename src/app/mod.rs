//! One reporting cycle, wired through the collaborator seams: value the
//! portfolio, append the snapshot, regenerate the chart, render the report,
//! deliver it. Valuation and persistence failures abort the cycle; delivery
//! failures are logged and swallowed because the durable side effects have
//! already happened by then.

mod schedule;

pub use schedule::run_scheduled;

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use tracing::{info, warn};

use crate::aggregate::{build_series, merge_summary_history, snapshot_rows};
use crate::chart::{ChartData, ChartRenderer};
use crate::config::ResolvedConfig;
use crate::ledger::LedgerStore;
use crate::models::{LedgerRow, Portfolio, PortfolioDefinition, SummaryRow};
use crate::notify::Notifier;
use crate::oracle::PriceOracle;
use crate::report::render_report;
use crate::valuation::resolve_portfolio;

/// How many recent ledger rows the report shows.
pub const REPORT_TAIL_ROWS: usize = 10;

pub struct ReportContext<'a> {
    pub config: &'a ResolvedConfig,
    pub oracle: &'a dyn PriceOracle,
    pub ledger: &'a dyn LedgerStore<LedgerRow>,
    /// Summary-format history from the older tool, read-only; its net values
    /// backfill the chart's net-equity line.
    pub legacy_ledger: Option<&'a dyn LedgerStore<SummaryRow>>,
    pub renderer: &'a dyn ChartRenderer,
    pub notifier: &'a dyn Notifier,
}

#[derive(Debug)]
pub struct CycleOutcome {
    pub appended_at: NaiveDateTime,
    pub rows_appended: usize,
    pub report: String,
}

async fn value_portfolio(ctx: &ReportContext<'_>) -> Result<Portfolio> {
    let definition = PortfolioDefinition::load(&ctx.config.portfolio_file)?;
    resolve_portfolio(
        &definition,
        &ctx.config.primary_group,
        &ctx.config.secondary_group,
        ctx.oracle,
    )
    .await
    .context("portfolio valuation failed")
}

/// Runs one full reporting cycle.
pub async fn run_cycle(ctx: &ReportContext<'_>) -> Result<CycleOutcome> {
    let portfolio = value_portfolio(ctx).await?;
    let fx_rate = ctx.oracle.fx_rate().await.context("FX rate lookup failed")?;

    let rows = snapshot_rows(&portfolio);
    let rows_appended = rows.len();
    let appended_at = ctx.ledger.append(rows)?;
    info!(rows = rows_appended, timestamp = %appended_at, "ledger snapshot appended");

    // Chart and report read the full history back, including the new rows.
    let history = ctx.ledger.load()?;
    let mut series = build_series(&history, &portfolio.primary.name);
    if let Some(legacy) = ctx.legacy_ledger {
        merge_summary_history(&mut series, &legacy.load()?);
    }
    let chart = ChartData::from_series(&series, &portfolio.secondary.name);

    let mut images = Vec::new();
    match ctx.renderer.render(&chart, &ctx.config.chart_file) {
        Ok(()) => {
            if ctx.config.chart_file.exists() {
                images.push(ctx.config.chart_file.clone());
            }
        }
        Err(err) => warn!(error = %err, "chart rendering failed"),
    }

    let tail = ctx.ledger.tail(REPORT_TAIL_ROWS)?;
    let report = render_report(&portfolio, fx_rate, &ctx.config.investment_categories, &tail);

    if let Err(err) = ctx.notifier.send(&report, &images).await {
        warn!(error = %err, "report delivery failed; ledger and chart are already persisted");
    }

    Ok(CycleOutcome {
        appended_at,
        rows_appended,
        report,
    })
}

/// Renders the report from live prices and existing history without
/// appending a snapshot.
pub async fn render_current_report(ctx: &ReportContext<'_>) -> Result<String> {
    let portfolio = value_portfolio(ctx).await?;
    let fx_rate = ctx.oracle.fx_rate().await.context("FX rate lookup failed")?;
    let tail = ctx.ledger.tail(REPORT_TAIL_ROWS)?;
    Ok(render_report(
        &portfolio,
        fx_rate,
        &ctx.config.investment_categories,
        &tail,
    ))
}
