use std::collections::HashMap;
use std::path::Path;

use anyhow::{bail, Context, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Holding, ResolvedHolding};

/// The static portfolio definition file: named groups of holdings, e.g.
/// `assets`/`liabilities` or `income`/`outcome`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PortfolioDefinition {
    pub groups: HashMap<String, Vec<Holding>>,
}

impl PortfolioDefinition {
    /// Read and validate a definition file. Quantities and stated prices must
    /// be non-negative.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read portfolio file: {}", path.display()))?;
        let definition: PortfolioDefinition = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse portfolio file: {}", path.display()))?;
        definition.validate()?;
        Ok(definition)
    }

    fn validate(&self) -> Result<()> {
        for (group, holdings) in &self.groups {
            for holding in holdings {
                if holding.quantity < Decimal::ZERO {
                    bail!(
                        "negative quantity for {} in group {group}",
                        holding.symbol
                    );
                }
                if holding.stated_unit_price < Decimal::ZERO {
                    bail!(
                        "negative stated price for {} in group {group}",
                        holding.symbol
                    );
                }
            }
        }
        Ok(())
    }

    pub fn group(&self, name: &str) -> &[Holding] {
        self.groups.get(name).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Display and ledger label for a definition group key: first letter
/// uppercased. The historical CSV files carry `Assets`/`Liabilities` in the
/// `Type` column while the definition file keys are lowercase.
pub fn group_label(key: &str) -> String {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// One resolved group of the portfolio, in definition-file order.
#[derive(Debug, Clone)]
pub struct HoldingGroup {
    pub name: String,
    pub holdings: Vec<ResolvedHolding>,
}

/// A fully valued portfolio for one reporting run. Immutable once built;
/// net value is primary minus secondary.
#[derive(Debug, Clone)]
pub struct Portfolio {
    pub primary: HoldingGroup,
    pub secondary: HoldingGroup,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, "{content}").unwrap();
        path
    }

    #[test]
    fn load_reads_named_groups() -> Result<()> {
        let dir = TempDir::new()?;
        let path = write_file(
            &dir,
            "balancesheet.json",
            r#"{
                "assets": [{
                    "ticker symbol": "CASH",
                    "fullname": "Cash",
                    "positions": 1,
                    "share price": 1000,
                    "currency unit": "CNY",
                    "category": "Cash"
                }],
                "liabilities": []
            }"#,
        );

        let definition = PortfolioDefinition::load(&path)?;
        assert_eq!(definition.group("assets").len(), 1);
        assert!(definition.group("liabilities").is_empty());
        assert!(definition.group("missing").is_empty());
        Ok(())
    }

    #[test]
    fn load_rejects_negative_quantity() -> Result<()> {
        let dir = TempDir::new()?;
        let path = write_file(
            &dir,
            "balancesheet.json",
            r#"{
                "assets": [{
                    "ticker symbol": "CASH",
                    "fullname": "Cash",
                    "positions": -1,
                    "share price": 1,
                    "currency unit": "CNY",
                    "category": "Cash"
                }]
            }"#,
        );

        let err = PortfolioDefinition::load(&path).unwrap_err();
        assert!(err.to_string().contains("negative quantity"));
        Ok(())
    }

    #[test]
    fn group_label_uppercases_the_first_letter() {
        assert_eq!(group_label("assets"), "Assets");
        assert_eq!(group_label("liabilities"), "Liabilities");
        assert_eq!(group_label("Assets"), "Assets");
        assert_eq!(group_label(""), "");
    }
}
