//! Classifier collaborators
//!
//! The engine never embeds a statistical model. It depends on two
//! capability shapes:
//! - `LabelPredictor`: features -> single class label (tax regime)
//! - `DistributionPredictor`: features -> labels with probabilities (investment schemes)
//!
//! Trained models plug in behind these traits. The heuristic implementations
//! below keep the service usable when no trained model is deployed.

use crate::catalog::{InvestmentCatalog, InvestmentScheme};
use crate::error::AdvisorError;
use crate::tax::{CAP_80C, CAP_80D, CAP_HOME_LOAN_INTEREST, NEW_REBATE_THRESHOLD, OLD_STANDARD_DEDUCTION};
use crate::Result;
use serde::Serialize;
use std::sync::Arc;

/// Feature order expected by regime classifiers
pub const TAX_FEATURES: [&str; 10] = [
    "age",
    "annual_income",
    "is_salaried",
    "investment_80c",
    "investment_80d",
    "home_loan_interest",
    "education_loan_interest",
    "donations_80g",
    "other_deductions",
    "standard_deduction",
];

/// Feature order expected by investment scheme classifiers
pub const WEALTH_FEATURES: [&str; 5] = [
    "user_age",
    "investment_amount",
    "years_to_invest",
    "risk_level",
    "liquidity",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Numeric(f64),
    Categorical(String),
}

/// Ordered, named feature vector handed to a classifier
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FeatureVector {
    features: Vec<(&'static str, FeatureValue)>,
}

impl FeatureVector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_numeric(mut self, name: &'static str, value: f64) -> Self {
        self.features.push((name, FeatureValue::Numeric(value)));
        self
    }

    pub fn with_categorical(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.features
            .push((name, FeatureValue::Categorical(value.into())));
        self
    }

    pub fn get(&self, name: &str) -> Option<&FeatureValue> {
        self.features
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v)
    }

    pub fn numeric(&self, name: &str) -> Result<f64> {
        match self.get(name) {
            Some(FeatureValue::Numeric(v)) => Ok(*v),
            Some(FeatureValue::Categorical(_)) => Err(AdvisorError::Classifier(format!(
                "feature '{}' is categorical, expected numeric",
                name
            ))),
            None => Err(AdvisorError::Classifier(format!("missing feature '{}'", name))),
        }
    }

    pub fn categorical(&self, name: &str) -> Result<&str> {
        match self.get(name) {
            Some(FeatureValue::Categorical(v)) => Ok(v.as_str()),
            Some(FeatureValue::Numeric(_)) => Err(AdvisorError::Classifier(format!(
                "feature '{}' is numeric, expected categorical",
                name
            ))),
            None => Err(AdvisorError::Classifier(format!("missing feature '{}'", name))),
        }
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.features.iter().map(|(n, _)| *n).collect()
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// Probability distribution over class labels (parallel arrays)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Distribution {
    labels: Vec<String>,
    probabilities: Vec<f64>,
}

impl Distribution {
    pub fn new(labels: Vec<String>, probabilities: Vec<f64>) -> Result<Self> {
        if labels.len() != probabilities.len() {
            return Err(AdvisorError::Classifier(format!(
                "{} labels but {} probabilities",
                labels.len(),
                probabilities.len()
            )));
        }
        Ok(Self {
            labels,
            probabilities,
        })
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn probabilities(&self) -> &[f64] {
        &self.probabilities
    }

    /// Label/probability pairs in the classifier's native label order
    pub fn pairs(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.labels
            .iter()
            .map(String::as_str)
            .zip(self.probabilities.iter().copied())
    }
}

/// Single-label prediction capability
pub trait LabelPredictor: Send + Sync {
    fn name(&self) -> &'static str;
    fn predict(&self, features: &FeatureVector) -> Result<String>;
}

/// Probability-distribution prediction capability
pub trait DistributionPredictor: Send + Sync {
    fn name(&self) -> &'static str;
    fn predict_distribution(&self, features: &FeatureVector) -> Result<Distribution>;
}

//
// ========== Regime heuristic ==========
//

/// Share of gross income the old-regime deductions must reach before the
/// old regime tends to win above the rebate zone.
const OLD_REGIME_DEDUCTION_SHARE: f64 = 0.35;

/// Rule-of-thumb regime classifier.
///
/// Label "1" (old regime) when the income sits above the new-regime rebate
/// zone and the capped old-regime deductions cover a large enough share of it.
pub struct DeductionHeuristicClassifier;

impl LabelPredictor for DeductionHeuristicClassifier {
    fn name(&self) -> &'static str {
        "deduction_heuristic"
    }

    fn predict(&self, features: &FeatureVector) -> Result<String> {
        let income = features.numeric("annual_income")?;
        let new_standard = features.numeric("standard_deduction")?;

        let old_deductions = OLD_STANDARD_DEDUCTION
            + features.numeric("investment_80c")?.min(CAP_80C)
            + features.numeric("investment_80d")?.min(CAP_80D)
            + features
                .numeric("home_loan_interest")?
                .min(CAP_HOME_LOAN_INTEREST)
            + features.numeric("education_loan_interest")?
            + features.numeric("donations_80g")?
            + features.numeric("other_deductions")?;

        let above_rebate_zone = income - new_standard > NEW_REBATE_THRESHOLD;
        let deductions_pay_off = old_deductions >= income * OLD_REGIME_DEDUCTION_SHARE;

        let label = if above_rebate_zone && deductions_pay_off { "1" } else { "0" };
        Ok(label.to_string())
    }
}

//
// ========== Catalog heuristic ==========
//

/// Score of any scheme whose age and amount bands both admit the applicant
const ELIGIBLE_SCORE: f64 = 3.0;
const RISK_MATCH_SCORE: f64 = 2.0;
const LIQUIDITY_MATCH_SCORE: f64 = 1.0;
/// Weight kept by schemes the applicant cannot enter (age or amount out of band)
const INELIGIBLE_WEIGHT: f64 = 0.1;

/// Scores every catalog scheme against the features and normalises the
/// scores into a distribution, in catalog order.
pub struct CatalogClassifier {
    catalog: Arc<InvestmentCatalog>,
}

impl CatalogClassifier {
    pub fn new(catalog: Arc<InvestmentCatalog>) -> Self {
        Self { catalog }
    }

    fn score(scheme: &InvestmentScheme, age: f64, amount: f64, risk: &str, liquidity: &str) -> f64 {
        if !scheme.admits_age(age) || !scheme.admits_amount(amount) {
            return INELIGIBLE_WEIGHT;
        }

        let mut score = ELIGIBLE_SCORE;
        if scheme.risk_level.trim().eq_ignore_ascii_case(risk.trim()) {
            score += RISK_MATCH_SCORE;
        }
        if scheme.liquidity.trim().eq_ignore_ascii_case(liquidity.trim()) {
            score += LIQUIDITY_MATCH_SCORE;
        }
        score
    }
}

impl DistributionPredictor for CatalogClassifier {
    fn name(&self) -> &'static str {
        "catalog_heuristic"
    }

    fn predict_distribution(&self, features: &FeatureVector) -> Result<Distribution> {
        let schemes = self.catalog.schemes();
        if schemes.is_empty() {
            return Err(AdvisorError::Classifier(
                "investment catalog is empty".to_string(),
            ));
        }

        let age = features.numeric("user_age")?;
        let amount = features.numeric("investment_amount")?;
        let risk = features.categorical("risk_level")?;
        let liquidity = features.categorical("liquidity")?;

        let scores: Vec<f64> = schemes
            .iter()
            .map(|scheme| Self::score(scheme, age, amount, risk, liquidity))
            .collect();
        let total: f64 = scores.iter().sum();

        let labels = schemes.iter().map(|s| s.scheme_name.clone()).collect();
        let probabilities = scores.iter().map(|s| s / total).collect();

        Distribution::new(labels, probabilities)
    }
}
