//! Investment scheme catalog
//!
//! Reference data the heuristic scheme classifier scores against.
//! Loaded once, read-only afterwards.

use crate::error::AdvisorError;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::info;

const BUNDLED_CATALOG: &str = include_str!("../data/investment_schemes.json");

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InvestmentScheme {
    pub scheme_name: String,
    /// Minimum yearly investment
    pub min_investment: f64,
    /// `None` means no upper limit
    #[serde(default)]
    pub max_investment: Option<f64>,
    #[serde(default)]
    pub age_min: u32,
    #[serde(default)]
    pub age_max: Option<u32>,
    pub risk_level: String,
    pub liquidity: String,
}

impl InvestmentScheme {
    pub fn admits_age(&self, age: f64) -> bool {
        age >= f64::from(self.age_min) && self.age_max.map_or(true, |max| age <= f64::from(max))
    }

    pub fn admits_amount(&self, amount: f64) -> bool {
        amount >= self.min_investment && self.max_investment.map_or(true, |max| amount <= max)
    }
}

#[derive(Debug, Clone, Default)]
pub struct InvestmentCatalog {
    schemes: Vec<InvestmentScheme>,
}

impl InvestmentCatalog {
    pub fn new(schemes: Vec<InvestmentScheme>) -> Result<Self> {
        let mut names = HashSet::with_capacity(schemes.len());

        for scheme in &schemes {
            let name = scheme.scheme_name.trim();
            if name.is_empty() {
                return Err(AdvisorError::RuleTable(
                    "investment catalog: empty scheme_name".to_string(),
                ));
            }
            if !names.insert(name.to_lowercase()) {
                return Err(AdvisorError::RuleTable(format!(
                    "investment catalog: duplicate scheme '{}'",
                    name
                )));
            }
            if !scheme.min_investment.is_finite() || scheme.min_investment < 0.0 {
                return Err(AdvisorError::RuleTable(format!(
                    "investment catalog: '{}' has invalid min_investment",
                    name
                )));
            }
            if scheme
                .max_investment
                .is_some_and(|max| !max.is_finite() || max < scheme.min_investment)
            {
                return Err(AdvisorError::RuleTable(format!(
                    "investment catalog: '{}' max_investment below min_investment",
                    name
                )));
            }
            if scheme.age_max.is_some_and(|max| max < scheme.age_min) {
                return Err(AdvisorError::RuleTable(format!(
                    "investment catalog: '{}' age_max below age_min",
                    name
                )));
            }
        }

        Ok(Self { schemes })
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let schemes: Vec<InvestmentScheme> = serde_json::from_str(json)?;
        Self::new(schemes)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let catalog = Self::from_json_str(&std::fs::read_to_string(path)?)?;

        info!(
            path = %path.display(),
            scheme_count = catalog.schemes.len(),
            "Investment catalog loaded"
        );

        Ok(catalog)
    }

    pub fn bundled() -> Result<Self> {
        Self::from_json_str(BUNDLED_CATALOG)
    }

    pub fn schemes(&self) -> &[InvestmentScheme] {
        &self.schemes
    }
}
