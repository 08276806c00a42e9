//! Fixed-width text report: one table per group with a Total row, then the
//! FX rate, per-category totals with their share of net value, the
//! investment subtotal, net value, and the most recent ledger rows.

use rust_decimal::Decimal;

use crate::aggregate::{category_totals, group_total, investment_value, net_value};
use crate::format::format_fixed;
use crate::models::{LedgerRow, Portfolio};

const SEPARATOR_WIDTH: usize = 70;
const LABEL_WIDTH: usize = 26;

fn separator() -> String {
    "-".repeat(SEPARATOR_WIDTH)
}

fn table_header() -> String {
    format!(
        "{:<12} {:<26} {:>12} {:>12} {:>14}",
        "Ticker", "Fullname", "Positions", "Share Price", "Book Value"
    )
}

fn table_row(symbol: &str, name: &str, quantity: Decimal, price: Decimal, value: Decimal) -> String {
    format!(
        "{:<12} {:<26} {:>12} {:>12} {:>14}",
        symbol,
        name,
        format_fixed(quantity, 2),
        format_fixed(price, 2),
        format_fixed(value, 2)
    )
}

fn total_row(total: Decimal) -> String {
    format!(
        "{:<12} {:<26} {:>12} {:>12} {:>14}",
        "Total",
        "",
        "",
        "",
        format_fixed(total, 2)
    )
}

/// Percent of net value, or `n/a` when net value is zero and the share is
/// undefined.
fn percent_of_net(value: Decimal, net: Decimal) -> String {
    if net.is_zero() {
        "(n/a)".to_string()
    } else {
        format!("({}%)", format_fixed(value / net * Decimal::ONE_HUNDRED, 2))
    }
}

fn summary_line(label: &str, value: &str) -> String {
    format!("{:<width$}: {}", label, value, width = LABEL_WIDTH)
}

/// Renders the full report text for one valued portfolio plus the recent
/// history tail.
pub fn render_report(
    portfolio: &Portfolio,
    fx_rate: Decimal,
    investment_aliases: &[String],
    history_tail: &[LedgerRow],
) -> String {
    let mut out = String::new();

    for group in [&portfolio.primary, &portfolio.secondary] {
        out.push_str(&format!("{}:\n", group.name));
        out.push_str(&table_header());
        out.push('\n');
        for holding in &group.holdings {
            out.push_str(&table_row(
                &holding.holding.symbol,
                &holding.holding.name,
                holding.holding.quantity,
                holding.unit_price,
                holding.value(),
            ));
            out.push('\n');
        }
        out.push_str(&total_row(group_total(group)));
        out.push('\n');
        out.push_str(&separator());
        out.push('\n');
    }

    let net = net_value(portfolio);
    let investment = investment_value(&portfolio.primary, investment_aliases);

    out.push_str(&summary_line("USD/CNY Rate", &format_fixed(fx_rate, 4)));
    out.push('\n');
    for (category, total) in category_totals(&portfolio.primary) {
        let value = format!(
            "{:<10} {}",
            format_fixed(total, 2),
            percent_of_net(total, net)
        );
        out.push_str(&summary_line(&category, &value));
        out.push('\n');
    }
    let investment_text = format!(
        "{:<10} {}",
        format_fixed(investment, 2),
        percent_of_net(investment, net)
    );
    out.push_str(&summary_line("Investment Value", &investment_text));
    out.push('\n');
    out.push_str(&summary_line("Net Value", &format_fixed(net, 2)));
    out.push('\n');
    out.push_str(&separator());
    out.push('\n');

    if !history_tail.is_empty() {
        out.push_str(&format!("Last {} ledger rows:\n", history_tail.len()));
        out.push_str(&format!(
            "{:<20} {:<12} {:<12} {:>12} {:>12} {:>14}  {}\n",
            "Datetime", "Type", "Ticker", "Positions", "Share Price", "Book Value", "Category"
        ));
        for row in history_tail {
            out.push_str(&format!(
                "{:<20} {:<12} {:<12} {:>12} {:>12} {:>14}  {}\n",
                row.timestamp.format(crate::models::ts_format::FORMAT),
                row.group,
                row.symbol,
                format_fixed(row.quantity, 2),
                format_fixed(row.unit_price, 2),
                format_fixed(row.value, 2),
                row.category
            ));
        }
        out.push_str(&separator());
        out.push('\n');
    }

    out
}
