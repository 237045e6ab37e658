//! Core data models for the advisor engine

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

//
// ================= Eligibility =================
//

/// Applicant profile evaluated against the scheme rule table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserProfile {
    pub age: u32,
    pub annual_income: u64,
    pub state: String,
    pub gender: String,
    pub caste: String,
    pub employment_type: String,
    pub disability_status: String,
    pub education_level: String,
}

/// A categorical rule field, parsed once when the rule table is loaded.
///
/// `Any` matches every applicant value. `OneOf` holds trimmed, lower-cased
/// tokens; an empty token is a category of its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Criterion {
    Any,
    OneOf(BTreeSet<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    Central,
    /// Restricted to one state; the name is kept as written in the table.
    State(String),
}

/// One validated row of the scheme rule table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemeRule {
    pub scheme_id: String,
    pub scheme_name: String,
    pub scope: Scope,
    pub age_min: u32,
    pub age_max: u32,
    pub income_min: u64,
    pub income_max: u64,
    pub genders: Criterion,
    pub castes: Criterion,
    pub employments: Criterion,
    pub education_levels: Criterion,
    pub disability: Criterion,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EligibleScheme {
    pub scheme_id: String,
    pub scheme_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EligibilityResult {
    pub eligible_schemes: Vec<EligibleScheme>,
    pub count: usize,
}

impl From<Vec<EligibleScheme>> for EligibilityResult {
    fn from(eligible_schemes: Vec<EligibleScheme>) -> Self {
        let count = eligible_schemes.len();
        Self {
            eligible_schemes,
            count,
        }
    }
}

//
// ================= Tax =================
//

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaxpayerProfile {
    pub age: u32,
    pub annual_income: f64,
    pub is_salaried: bool,
    #[serde(default)]
    pub investment_80c: f64,
    #[serde(default)]
    pub investment_80d: f64,
    #[serde(default)]
    pub home_loan_interest: f64,
    #[serde(default)]
    pub education_loan_interest: f64,
    #[serde(default)]
    pub donations_80g: f64,
    #[serde(default)]
    pub other_deductions: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Regime {
    #[serde(rename = "Old Regime")]
    Old,
    #[serde(rename = "New Regime")]
    New,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaxRegimeResult {
    pub taxable_income_old: f64,
    pub tax_old: f64,
    pub taxable_income_new: f64,
    pub tax_new: f64,
    pub recommended_regime: Regime,
    pub tax_saving: f64,
    /// Classifier opinion, reported alongside but never overriding the
    /// deterministic recommendation.
    pub ml_recommendation: Option<Regime>,
    pub notes: Vec<String>,
}

//
// ================= Wealth =================
//

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WealthPlanInput {
    pub user_age: u32,
    pub retirement_age: u32,
    pub current_savings: f64,
    pub monthly_investment: f64,
    /// Annual return, percent.
    pub expected_return: f64,
    pub risk_tolerance: String,
    pub liquidity: String,
    /// Yearly increase of the contribution, percent.
    #[serde(default)]
    pub annual_step_up: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ProjectionRow {
    pub year: u32,
    pub opening_capital: f64,
    pub annual_investment: f64,
    pub interest_earned: f64,
    pub closing_capital: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SchemeRecommendation {
    pub scheme_name: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WealthProjection {
    pub corpus: f64,
    pub inflation_adjusted_corpus: f64,
    pub horizon_years: u32,
    pub total_invested: f64,
    pub rows: Vec<ProjectionRow>,
    pub recommendations: Vec<SchemeRecommendation>,
}

impl fmt::Display for Regime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Regime::Old => "Old Regime",
            Regime::New => "New Regime",
        };
        write!(f, "{}", s)
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Central => write!(f, "central"),
            Scope::State(state) => write!(f, "state ({})", state),
        }
    }
}
