use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Currency a holding's price is quoted in.
///
/// CNY is the ledger's native reporting currency; USD prices fetched live
/// are normalized into it with the USD/CNY rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Currency {
    #[serde(rename = "CNY")]
    Cny,
    #[serde(rename = "USD")]
    Usd,
}

impl Currency {
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Cny => "CNY",
            Currency::Usd => "USD",
        }
    }
}

/// One line item of the portfolio definition file.
///
/// Field names follow the definition file's JSON keys. A stated unit price of
/// zero means "fetch the live quote for `symbol`".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    #[serde(rename = "ticker symbol")]
    pub symbol: String,
    #[serde(rename = "fullname")]
    pub name: String,
    #[serde(rename = "positions")]
    pub quantity: Decimal,
    #[serde(rename = "share price")]
    pub stated_unit_price: Decimal,
    #[serde(rename = "currency unit")]
    pub currency: Currency,
    #[serde(rename = "category")]
    pub category: String,
}

/// A holding whose unit price has been resolved, once, at load time.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedHolding {
    pub holding: Holding,
    /// Price per unit in the native currency. Equal to the stated price when
    /// one was given; otherwise the live quote (FX-normalized for USD).
    pub unit_price: Decimal,
}

impl ResolvedHolding {
    pub fn value(&self) -> Decimal {
        self.holding.quantity * self.unit_price
    }
}
