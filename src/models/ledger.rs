use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::ResolvedHolding;

/// Timestamp (de)serialization for ledger files: `YYYY-MM-DD HH:MM:SS`,
/// second precision, no timezone.
pub mod ts_format {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn serialize<S>(ts: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&ts.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&value, FORMAT).map_err(serde::de::Error::custom)
    }
}

/// A row type that can live in a ledger store. The store assigns the
/// wall-clock timestamp on append; rows within one append share it.
pub trait LedgerRecord: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    fn timestamp(&self) -> NaiveDateTime;
    fn set_timestamp(&mut self, timestamp: NaiveDateTime);
}

/// One holding's valuation at one snapshot: the category-aware ledger format,
/// one physical row per holding per reporting cycle.
///
/// Serde names match the CSV header so existing ledger files stay readable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerRow {
    #[serde(rename = "Datetime", with = "ts_format")]
    pub timestamp: NaiveDateTime,
    /// Group the holding belongs to, e.g. "Assets" or "Liabilities".
    #[serde(rename = "Type")]
    pub group: String,
    #[serde(rename = "Ticker")]
    pub symbol: String,
    #[serde(rename = "Fullname")]
    pub name: String,
    #[serde(rename = "Positions")]
    pub quantity: Decimal,
    #[serde(rename = "Share Price")]
    pub unit_price: Decimal,
    #[serde(rename = "Book Value")]
    pub value: Decimal,
    #[serde(rename = "Category")]
    pub category: String,
}

impl LedgerRow {
    /// Builds an unstamped row; the store overwrites the timestamp on append.
    pub fn from_holding(group: &str, resolved: &ResolvedHolding) -> Self {
        Self {
            timestamp: NaiveDateTime::default(),
            group: group.to_string(),
            symbol: resolved.holding.symbol.clone(),
            name: resolved.holding.name.clone(),
            quantity: resolved.holding.quantity,
            unit_price: resolved.unit_price,
            value: resolved.value(),
            category: resolved.holding.category.clone(),
        }
    }
}

impl LedgerRecord for LedgerRow {
    fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }

    fn set_timestamp(&mut self, timestamp: NaiveDateTime) {
        self.timestamp = timestamp;
    }
}

/// The legacy two-group ledger format: one row per snapshot holding the group
/// totals. Read-only, for history produced by the older tool;
/// `investment_ratio` is the stored fraction of net value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    #[serde(rename = "Datetime", with = "ts_format")]
    pub timestamp: NaiveDateTime,
    #[serde(rename = "Income")]
    pub income: Decimal,
    #[serde(rename = "Outcome")]
    pub outcome: Decimal,
    #[serde(rename = "Investment")]
    pub investment: Decimal,
    #[serde(rename = "Investment %")]
    pub investment_ratio: Decimal,
    #[serde(rename = "Net Value")]
    pub net_value: Decimal,
}

impl LedgerRecord for SummaryRow {
    fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }

    fn set_timestamp(&mut self, timestamp: NaiveDateTime) {
        self.timestamp = timestamp;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Currency, Holding};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    #[test]
    fn timestamp_format_round_trips() {
        let ts = NaiveDate::from_ymd_opt(2024, 6, 3)
            .unwrap()
            .and_hms_opt(20, 0, 5)
            .unwrap();
        let row = LedgerRow {
            timestamp: ts,
            group: "Assets".into(),
            symbol: "X".into(),
            name: "X".into(),
            quantity: dec!(1),
            unit_price: dec!(2),
            value: dec!(2),
            category: "Cash".into(),
        };

        let json = serde_json::to_string(&row).unwrap();
        assert!(json.contains("\"2024-06-03 20:00:05\""));
        let back: LedgerRow = serde_json::from_str(&json).unwrap();
        assert_eq!(back.timestamp, ts);
    }

    #[test]
    fn from_holding_copies_valuation_fields() {
        let resolved = ResolvedHolding {
            holding: Holding {
                symbol: "0700.HK".into(),
                name: "Tencent Holdings".into(),
                quantity: dec!(100),
                stated_unit_price: Decimal::ZERO,
                currency: Currency::Cny,
                category: "Investment".into(),
            },
            unit_price: dec!(300),
        };

        let row = LedgerRow::from_holding("Assets", &resolved);
        assert_eq!(row.group, "Assets");
        assert_eq!(row.value, dec!(30000));
        assert_eq!(row.category, "Investment");
    }
}
