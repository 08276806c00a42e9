//! Live quotes from the Yahoo Finance chart endpoint.
//!
//! One request per symbol, latest daily close. The same endpoint serves the
//! USD/CNY rate through the `CNY=X` pseudo-symbol.

use std::time::Duration;

use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::debug;

use super::{PriceOracle, QuoteError, DEFAULT_FX_SYMBOL};

const YAHOO_BASE_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

/// Yahoo rejects requests without a browser-ish user agent.
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Upstream enforces no timeout of its own; cap each quote request here.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartEnvelope,
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartApiError>,
}

#[derive(Debug, Deserialize)]
struct ChartApiError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    #[serde(rename = "regularMarketPrice")]
    regular_market_price: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteBlock>,
}

#[derive(Debug, Deserialize)]
struct QuoteBlock {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

/// Quote source backed by Yahoo Finance. No API key required.
#[derive(Debug, Clone)]
pub struct YahooQuoteSource {
    client: Client,
    base_url: String,
    fx_symbol: String,
}

impl YahooQuoteSource {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            base_url: YAHOO_BASE_URL.to_string(),
            fx_symbol: DEFAULT_FX_SYMBOL.to_string(),
        }
    }

    /// Overrides the endpoint, mainly for tests against a mock server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_fx_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.fx_symbol = symbol.into();
        self
    }

    fn unavailable(symbol: &str) -> QuoteError {
        QuoteError::Unavailable {
            symbol: symbol.to_string(),
        }
    }

    fn transport(symbol: &str, source: reqwest::Error) -> QuoteError {
        QuoteError::Transport {
            symbol: symbol.to_string(),
            source,
        }
    }

    /// The latest close for the most recent session, falling back to the
    /// meta quote when the close series is all nulls.
    fn extract_price(symbol: &str, response: ChartResponse) -> Result<Decimal, QuoteError> {
        if let Some(error) = response.chart.error {
            debug!(
                symbol,
                code = %error.code,
                description = %error.description,
                "yahoo returned an error payload"
            );
            return Err(Self::unavailable(symbol));
        }

        let result = response
            .chart
            .result
            .and_then(|mut results| {
                if results.is_empty() {
                    None
                } else {
                    Some(results.remove(0))
                }
            })
            .ok_or_else(|| Self::unavailable(symbol))?;

        let close = result
            .indicators
            .quote
            .iter()
            .flat_map(|block| block.close.iter())
            .rev()
            .find_map(|close| *close)
            .or(result.meta.regular_market_price)
            .ok_or_else(|| Self::unavailable(symbol))?;

        Decimal::try_from(close).map_err(|_| Self::unavailable(symbol))
    }
}

impl Default for YahooQuoteSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl PriceOracle for YahooQuoteSource {
    async fn price(&self, symbol: &str) -> Result<Decimal, QuoteError> {
        let url = format!("{}/{}?interval=1d&range=1d", self.base_url, symbol);
        debug!(symbol, %url, "fetching quote");

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|err| Self::transport(symbol, err))?
            .error_for_status()
            .map_err(|err| Self::transport(symbol, err))?
            .json::<ChartResponse>()
            .await
            .map_err(|err| Self::transport(symbol, err))?;

        Self::extract_price(symbol, response)
    }

    fn fx_symbol(&self) -> &str {
        &self.fx_symbol
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn response(body: &str) -> ChartResponse {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn extract_price_takes_last_non_null_close() {
        let body = r#"{
            "chart": {
                "result": [{
                    "meta": {"regularMarketPrice": 99.0},
                    "indicators": {"quote": [{"close": [10.0, null, 12.5]}]}
                }],
                "error": null
            }
        }"#;
        let price = YahooQuoteSource::extract_price("X", response(body)).unwrap();
        assert_eq!(price, dec!(12.5));
    }

    #[test]
    fn extract_price_falls_back_to_meta_quote() {
        let body = r#"{
            "chart": {
                "result": [{
                    "meta": {"regularMarketPrice": 7.12},
                    "indicators": {"quote": [{"close": [null]}]}
                }],
                "error": null
            }
        }"#;
        let price = YahooQuoteSource::extract_price("CNY=X", response(body)).unwrap();
        assert_eq!(price, dec!(7.12));
    }

    #[test]
    fn extract_price_maps_error_payload_to_unavailable() {
        let body = r#"{
            "chart": {
                "result": null,
                "error": {"code": "Not Found", "description": "No data found"}
            }
        }"#;
        let err = YahooQuoteSource::extract_price("GONE", response(body)).unwrap_err();
        assert!(matches!(err, QuoteError::Unavailable { symbol } if symbol == "GONE"));
    }

    #[test]
    fn extract_price_with_no_data_at_all_is_unavailable() {
        let body = r#"{
            "chart": {
                "result": [{
                    "meta": {},
                    "indicators": {"quote": []}
                }],
                "error": null
            }
        }"#;
        let err = YahooQuoteSource::extract_price("EMPTY", response(body)).unwrap_err();
        assert!(matches!(err, QuoteError::Unavailable { .. }));
    }
}
