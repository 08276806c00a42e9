//! Reductions over the current portfolio and over the historical ledger:
//! group totals, the investment subtotal, ordered category totals, and the
//! per-category / net-equity time series the chart and report are built from.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;

use crate::models::{HoldingGroup, LedgerRow, Portfolio, SummaryRow};

pub fn group_total(group: &HoldingGroup) -> Decimal {
    group.holdings.iter().map(|h| h.value()).sum()
}

pub fn net_value(portfolio: &Portfolio) -> Decimal {
    group_total(&portfolio.primary) - group_total(&portfolio.secondary)
}

/// True when the category text contains any alias substring. Case-sensitive
/// and un-anchored: "Long-term Investments" matches alias "Investment".
pub fn is_investment_category(category: &str, aliases: &[String]) -> bool {
    aliases.iter().any(|alias| category.contains(alias.as_str()))
}

/// Sum of values over the group's investment-like holdings.
pub fn investment_value(group: &HoldingGroup, aliases: &[String]) -> Decimal {
    group
        .holdings
        .iter()
        .filter(|h| is_investment_category(&h.holding.category, aliases))
        .map(|h| h.value())
        .sum()
}

/// Per-category totals in first-seen order.
pub fn category_totals(group: &HoldingGroup) -> Vec<(String, Decimal)> {
    let mut totals: Vec<(String, Decimal)> = Vec::new();
    for holding in &group.holdings {
        let category = holding.holding.category.as_str();
        match totals.iter_mut().find(|(name, _)| name == category) {
            Some((_, total)) => *total += holding.value(),
            None => totals.push((category.to_string(), holding.value())),
        }
    }
    totals
}

/// One category's history, timestamp to summed book value.
#[derive(Debug, Clone, PartialEq)]
pub struct CategorySeries {
    pub category: String,
    pub points: BTreeMap<NaiveDateTime, Decimal>,
}

/// Everything the chart needs, rebuilt from the full ledger each cycle.
#[derive(Debug, Clone, Default)]
pub struct LedgerSeries {
    /// Categories in first-seen ledger order.
    pub categories: Vec<CategorySeries>,
    /// Net equity per timestamp: + primary-group rows, - everything else.
    pub net_equity: BTreeMap<NaiveDateTime, Decimal>,
}

/// Single pass over category-aware ledger rows. Values for a duplicate
/// (category, timestamp) pair accumulate; they are never overwritten.
pub fn build_series(rows: &[LedgerRow], primary_group: &str) -> LedgerSeries {
    let mut series = LedgerSeries::default();

    for row in rows {
        let idx = match series
            .categories
            .iter()
            .position(|entry| entry.category == row.category)
        {
            Some(idx) => idx,
            None => {
                series.categories.push(CategorySeries {
                    category: row.category.clone(),
                    points: BTreeMap::new(),
                });
                series.categories.len() - 1
            }
        };
        let points = &mut series.categories[idx].points;
        *points.entry(row.timestamp).or_insert(Decimal::ZERO) += row.value;

        // Case-insensitive: historical files carry `Assets` while definition
        // keys and older rows may be lowercase.
        let signed = if row.group.eq_ignore_ascii_case(primary_group) {
            row.value
        } else {
            -row.value
        };
        *series.net_equity.entry(row.timestamp).or_insert(Decimal::ZERO) += signed;
    }

    series
}

/// Folds rows from a legacy two-group ledger into the net-equity series.
/// Net value is a stored column there rather than a sum over holdings.
/// Timestamps already present win: a snapshot re-recorded in the
/// category-aware format supersedes its legacy counterpart.
pub fn merge_summary_history(series: &mut LedgerSeries, rows: &[SummaryRow]) {
    for row in rows {
        series
            .net_equity
            .entry(row.timestamp)
            .or_insert(row.net_value);
    }
}

/// The rows one reporting cycle appends: every holding of both groups,
/// stamped by the store.
pub fn snapshot_rows(portfolio: &Portfolio) -> Vec<LedgerRow> {
    portfolio
        .primary
        .holdings
        .iter()
        .map(|h| LedgerRow::from_holding(&portfolio.primary.name, h))
        .chain(
            portfolio
                .secondary
                .holdings
                .iter()
                .map(|h| LedgerRow::from_holding(&portfolio.secondary.name, h)),
        )
        .collect()
}
