use std::collections::HashMap;

use rust_decimal::Decimal;
use tokio::sync::Mutex;

use super::{PriceOracle, QuoteError};

/// Per-run memoization of quotes, keyed by symbol.
///
/// Every holding priced in USD needs the same FX rate; without this each one
/// would refetch it. The cache holds prices sampled once per run, so the
/// observable values are unchanged. Failed lookups are not cached: the first
/// error aborts the cycle anyway.
pub struct CachedOracle<O> {
    inner: O,
    prices: Mutex<HashMap<String, Decimal>>,
}

impl<O> CachedOracle<O> {
    pub fn new(inner: O) -> Self {
        Self {
            inner,
            prices: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait::async_trait]
impl<O: PriceOracle> PriceOracle for CachedOracle<O> {
    async fn price(&self, symbol: &str) -> Result<Decimal, QuoteError> {
        let mut prices = self.prices.lock().await;
        if let Some(price) = prices.get(symbol) {
            return Ok(*price);
        }
        let price = self.inner.price(symbol).await?;
        prices.insert(symbol.to_string(), price);
        Ok(price)
    }

    fn fx_symbol(&self) -> &str {
        self.inner.fx_symbol()
    }
}
