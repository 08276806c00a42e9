//! Turns the static portfolio definition into resolved, native-currency
//! holdings using a price oracle. Fail-fast: the first symbol that cannot be
//! priced aborts the whole pass, so a cycle never appends a partial snapshot.

use tracing::debug;

use crate::models::{
    group_label, Currency, Holding, HoldingGroup, Portfolio, PortfolioDefinition, ResolvedHolding,
};
use crate::oracle::{PriceOracle, QuoteError};

/// Resolves one holding's unit price.
///
/// A stated (nonzero) price is used verbatim and is never currency-converted,
/// even when the holding is marked USD; only live-fetched prices go through
/// the FX rate. Callers relying on that asymmetry: stated prices are entered
/// in the native currency by convention.
pub async fn resolve(holding: Holding, oracle: &dyn PriceOracle) -> Result<ResolvedHolding, QuoteError> {
    if !holding.stated_unit_price.is_zero() {
        return Ok(ResolvedHolding {
            unit_price: holding.stated_unit_price,
            holding,
        });
    }

    let mut unit_price = oracle.price(&holding.symbol).await?;
    if holding.currency == Currency::Usd {
        unit_price *= oracle.fx_rate().await?;
    }
    debug!(symbol = %holding.symbol, %unit_price, "resolved live price");

    Ok(ResolvedHolding {
        unit_price,
        holding,
    })
}

/// Resolves a named definition group. The group's display name is the
/// capitalized label the ledger and report use, not the definition key.
pub async fn resolve_group(
    name: &str,
    holdings: &[Holding],
    oracle: &dyn PriceOracle,
) -> Result<HoldingGroup, QuoteError> {
    let mut resolved = Vec::with_capacity(holdings.len());
    for holding in holdings {
        resolved.push(resolve(holding.clone(), oracle).await?);
    }
    Ok(HoldingGroup {
        name: group_label(name),
        holdings: resolved,
    })
}

/// Values the whole definition: both named groups, definition order kept.
pub async fn resolve_portfolio(
    definition: &PortfolioDefinition,
    primary_group: &str,
    secondary_group: &str,
    oracle: &dyn PriceOracle,
) -> Result<Portfolio, QuoteError> {
    let primary = resolve_group(primary_group, definition.group(primary_group), oracle).await?;
    let secondary =
        resolve_group(secondary_group, definition.group(secondary_group), oracle).await?;
    Ok(Portfolio { primary, secondary })
}
