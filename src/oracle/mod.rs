mod cache;
mod yahoo;

pub use cache::CachedOracle;
pub use yahoo::YahooQuoteSource;

use std::collections::HashMap;

use rust_decimal::Decimal;
use thiserror::Error;

/// Yahoo's pseudo-symbol for the USD/CNY exchange rate.
pub const DEFAULT_FX_SYMBOL: &str = "CNY=X";

/// A quote could not be obtained. Valuation is fail-fast: one failed quote
/// aborts the whole cycle, so there is no partial ledger append.
#[derive(Debug, Error)]
pub enum QuoteError {
    /// The upstream feed answered but had no usable price for the symbol
    /// (delisted ticker, empty session, error payload).
    #[error("no quote data for {symbol}")]
    Unavailable { symbol: String },

    #[error("quote request for {symbol} failed")]
    Transport {
        symbol: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Live price source keyed by ticker symbol. One reserved pseudo-symbol
/// carries the native/foreign exchange rate.
#[async_trait::async_trait]
pub trait PriceOracle: Send + Sync {
    async fn price(&self, symbol: &str) -> Result<Decimal, QuoteError>;

    fn fx_symbol(&self) -> &str {
        DEFAULT_FX_SYMBOL
    }

    async fn fx_rate(&self) -> Result<Decimal, QuoteError> {
        let symbol = self.fx_symbol().to_string();
        self.price(&symbol).await
    }
}

/// Table-backed oracle for tests.
#[derive(Debug, Clone, Default)]
pub struct FixedOracle {
    prices: HashMap<String, Decimal>,
}

impl FixedOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_price(mut self, symbol: impl Into<String>, price: Decimal) -> Self {
        self.prices.insert(symbol.into(), price);
        self
    }

    pub fn with_fx_rate(self, rate: Decimal) -> Self {
        self.with_price(DEFAULT_FX_SYMBOL, rate)
    }
}

#[async_trait::async_trait]
impl PriceOracle for FixedOracle {
    async fn price(&self, symbol: &str) -> Result<Decimal, QuoteError> {
        self.prices
            .get(symbol)
            .copied()
            .ok_or_else(|| QuoteError::Unavailable {
                symbol: symbol.to_string(),
            })
    }
}
