//! Boundary validation for advisor inputs
//!
//! Every input is checked once, before any component runs.
//! Components assume validated input and never fail on it.

use crate::eligibility::rules::DEFAULT_AGE_MAX;
use crate::error::AdvisorError;
use crate::models::{TaxpayerProfile, WealthPlanInput};
use crate::Result;
use std::fmt;
use tracing::debug;

/// Oldest age a plan may start or end at; also bounds the projection horizon
pub const MAX_AGE: u32 = DEFAULT_AGE_MAX;

/// Ceiling for any rupee amount; keeps every projection finite
pub const MAX_AMOUNT: f64 = 1e15;

/// Ceiling for annual return and step-up rates, percent
pub const MAX_RATE_PERCENT: f64 = 100.0;

/// A single violated constraint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub field: &'static str,
    pub constraint: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.constraint)
    }
}

/// Trait for inputs checked at the request boundary
pub trait Validate {
    /// Name used in logs and error messages
    fn subject(&self) -> &'static str;

    fn violations(&self) -> Vec<Violation>;

    /// Collect every violation and fail with all of them at once.
    fn validate(&self) -> Result<()> {
        let violations = self.violations();

        debug!(
            subject = self.subject(),
            violation_count = violations.len(),
            "Input validated"
        );

        if violations.is_empty() {
            return Ok(());
        }

        let details = violations
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");

        Err(AdvisorError::Validation(format!(
            "{}: {}",
            self.subject(),
            details
        )))
    }
}

fn check_amount(field: &'static str, value: f64, out: &mut Vec<Violation>) {
    if !value.is_finite() {
        out.push(Violation {
            field,
            constraint: "must be a finite number".to_string(),
        });
    } else if value < 0.0 {
        out.push(Violation {
            field,
            constraint: format!("must be non-negative (got {})", value),
        });
    } else if value > MAX_AMOUNT {
        out.push(Violation {
            field,
            constraint: format!("must be at most {:e} (got {:e})", MAX_AMOUNT, value),
        });
    }
}

fn check_rate(field: &'static str, value: f64, out: &mut Vec<Violation>) {
    if !value.is_finite() {
        out.push(Violation {
            field,
            constraint: "must be a finite number".to_string(),
        });
    } else if value <= -100.0 || value > MAX_RATE_PERCENT {
        out.push(Violation {
            field,
            constraint: format!(
                "must be greater than -100 and at most {} percent (got {})",
                MAX_RATE_PERCENT, value
            ),
        });
    }
}

fn check_age(field: &'static str, value: u32, out: &mut Vec<Violation>) {
    if value > MAX_AGE {
        out.push(Violation {
            field,
            constraint: format!("must be at most {} (got {})", MAX_AGE, value),
        });
    }
}

impl Validate for TaxpayerProfile {
    fn subject(&self) -> &'static str {
        "taxpayer profile"
    }

    fn violations(&self) -> Vec<Violation> {
        let mut out = Vec::new();
        check_amount("annual_income", self.annual_income, &mut out);
        check_amount("investment_80c", self.investment_80c, &mut out);
        check_amount("investment_80d", self.investment_80d, &mut out);
        check_amount("home_loan_interest", self.home_loan_interest, &mut out);
        check_amount(
            "education_loan_interest",
            self.education_loan_interest,
            &mut out,
        );
        check_amount("donations_80g", self.donations_80g, &mut out);
        check_amount("other_deductions", self.other_deductions, &mut out);
        out
    }
}

impl Validate for WealthPlanInput {
    fn subject(&self) -> &'static str {
        "wealth plan"
    }

    // retirement_age <= user_age is a defined zero-year plan, not a violation
    fn violations(&self) -> Vec<Violation> {
        let mut out = Vec::new();
        check_age("user_age", self.user_age, &mut out);
        check_age("retirement_age", self.retirement_age, &mut out);
        check_amount("current_savings", self.current_savings, &mut out);
        check_amount("monthly_investment", self.monthly_investment, &mut out);
        check_rate("expected_return", self.expected_return, &mut out);
        check_rate("annual_step_up", self.annual_step_up, &mut out);
        out
    }
}

//
// ================= Tests =================
//
