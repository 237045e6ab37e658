//! Eligibility matcher
//!
//! Evaluates an applicant profile against every scheme rule.
//! Eligibility is boolean: a rule matches only if every predicate passes,
//! and the result keeps the rule table's order.

use crate::models::{EligibleScheme, SchemeRule, Scope, UserProfile};
use std::fmt;
use tracing::{debug, info};

pub mod rules;

pub use rules::{RawSchemeRule, RuleTable};

/// The first predicate a rule failed for a profile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    State,
    Age,
    Income,
    Gender,
    Caste,
    Employment,
    Disability,
    Education,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Rejection::State => "state mismatch",
            Rejection::Age => "age out of range",
            Rejection::Income => "income out of range",
            Rejection::Gender => "gender not allowed",
            Rejection::Caste => "caste not allowed",
            Rejection::Employment => "employment type not allowed",
            Rejection::Disability => "disability status not allowed",
            Rejection::Education => "education level not allowed",
        };
        write!(f, "{}", s)
    }
}

/// State is a hard veto: a state-scoped rule admits only applicants from
/// that state, or applicants whose state is the literal `Any`.
fn state_admits(rule: &SchemeRule, profile: &UserProfile) -> bool {
    match &rule.scope {
        Scope::Central => true,
        Scope::State(state) => {
            let applicant = profile.state.trim();
            applicant.eq_ignore_ascii_case("any") || applicant.eq_ignore_ascii_case(state.trim())
        }
    }
}

/// Check one rule, reporting the first failed predicate.
pub fn evaluate(profile: &UserProfile, rule: &SchemeRule) -> Option<Rejection> {
    if !state_admits(rule, profile) {
        return Some(Rejection::State);
    }
    if !(rule.age_min..=rule.age_max).contains(&profile.age) {
        return Some(Rejection::Age);
    }
    if !(rule.income_min..=rule.income_max).contains(&profile.annual_income) {
        return Some(Rejection::Income);
    }
    if !rule.genders.admits(&profile.gender) {
        return Some(Rejection::Gender);
    }
    if !rule.castes.admits(&profile.caste) {
        return Some(Rejection::Caste);
    }
    if !rule.employments.admits(&profile.employment_type) {
        return Some(Rejection::Employment);
    }
    if !rule.disability.admits(&profile.disability_status) {
        return Some(Rejection::Disability);
    }
    if !rule.education_levels.admits(&profile.education_level) {
        return Some(Rejection::Education);
    }
    None
}

pub fn is_eligible(profile: &UserProfile, rule: &SchemeRule) -> bool {
    evaluate(profile, rule).is_none()
}

/// Return every scheme whose rule admits the profile, in table order.
pub fn match_schemes(profile: &UserProfile, rules: &[SchemeRule]) -> Vec<EligibleScheme> {
    let matched: Vec<EligibleScheme> = rules
        .iter()
        .filter(|rule| match evaluate(profile, rule) {
            None => true,
            Some(reason) => {
                debug!(scheme_id = %rule.scheme_id, %reason, "Scheme rejected");
                false
            }
        })
        .map(|rule| EligibleScheme {
            scheme_id: rule.scheme_id.clone(),
            scheme_name: rule.scheme_name.clone(),
        })
        .collect();

    info!(
        rule_count = rules.len(),
        matched = matched.len(),
        "Eligibility evaluated"
    );

    matched
}

//
// ================= Tests =================
//
