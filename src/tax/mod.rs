//! Tax regime comparator
//!
//! Computes liability under the old regime (FY 2024-25 rules, full
//! deductions) and the new regime (FY 2025-26 rules, standard deduction
//! only), then recommends the cheaper one.
//!
//! Taxable income is clamped at zero before slabs are applied. Rebates are
//! applied before the 4% cess.

use crate::classifier::{FeatureVector, LabelPredictor};
use crate::format::format_inr;
use crate::models::{Regime, TaxRegimeResult, TaxpayerProfile};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

pub const OLD_STANDARD_DEDUCTION: f64 = 50_000.0;
pub const NEW_STANDARD_DEDUCTION: f64 = 75_000.0;
pub const CAP_80C: f64 = 150_000.0;
pub const CAP_80D: f64 = 50_000.0;
pub const CAP_HOME_LOAN_INTEREST: f64 = 200_000.0;
pub const CESS_RATE: f64 = 0.04;

pub const OLD_REBATE_THRESHOLD: f64 = 500_000.0;
pub const OLD_REBATE_CAP: f64 = 12_500.0;
pub const NEW_REBATE_THRESHOLD: f64 = 1_200_000.0;
pub const NEW_REBATE_CAP: f64 = 60_000.0;

/// One progressive band: `rate` applies to income in `(lower, upper]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Slab {
    pub lower: f64,
    pub upper: f64,
    pub rate: f64,
}

const fn slab(lower: f64, upper: f64, rate: f64) -> Slab {
    Slab { lower, upper, rate }
}

pub const OLD_SLABS: [Slab; 4] = [
    slab(0.0, 250_000.0, 0.0),
    slab(250_000.0, 500_000.0, 0.05),
    slab(500_000.0, 1_000_000.0, 0.20),
    slab(1_000_000.0, f64::INFINITY, 0.30),
];

pub const NEW_SLABS: [Slab; 7] = [
    slab(0.0, 400_000.0, 0.0),
    slab(400_000.0, 800_000.0, 0.05),
    slab(800_000.0, 1_200_000.0, 0.10),
    slab(1_200_000.0, 1_600_000.0, 0.15),
    slab(1_600_000.0, 2_000_000.0, 0.20),
    slab(2_000_000.0, 2_400_000.0, 0.25),
    slab(2_400_000.0, f64::INFINITY, 0.30),
];

/// How the new-regime rebate behaves inside the rebate zone.
///
/// On the current slab schedule the two coincide: slab tax at the
/// 12,00,000 threshold is exactly 60,000. Marginal relief above the
/// threshold is not modelled by either.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RebatePolicy {
    /// Tax is zero outright when taxable income is within the zone.
    #[default]
    NilTaxZone,
    /// Rebate of at most `NEW_REBATE_CAP` within the zone.
    Capped,
}

/// Step-by-step breakdown of one regime's liability
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RegimeBreakdown {
    pub taxable_income: f64,
    pub slab_tax: f64,
    pub rebate: f64,
    pub cess: f64,
    pub total_tax: f64,
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Progressive tax over the given slab schedule.
pub fn tax_from_slabs(taxable: f64, slabs: &[Slab]) -> f64 {
    slabs
        .iter()
        .take_while(|s| taxable > s.lower)
        .map(|s| (taxable.min(s.upper) - s.lower) * s.rate)
        .sum()
}

fn finish(taxable_income: f64, slab_tax: f64, rebate: f64) -> RegimeBreakdown {
    let after_rebate = (slab_tax - rebate).max(0.0);
    let cess = after_rebate * CESS_RATE;
    RegimeBreakdown {
        taxable_income,
        slab_tax,
        rebate,
        cess,
        total_tax: after_rebate + cess,
    }
}

/// Capped old-regime deductions, excluding the standard deduction.
fn old_regime_deductions(profile: &TaxpayerProfile) -> f64 {
    profile.investment_80c.min(CAP_80C)
        + profile.investment_80d.min(CAP_80D)
        + profile.home_loan_interest.min(CAP_HOME_LOAN_INTEREST)
        + profile.education_loan_interest
        + profile.donations_80g
        + profile.other_deductions
}

pub fn old_regime(profile: &TaxpayerProfile) -> RegimeBreakdown {
    let taxable =
        (profile.annual_income - OLD_STANDARD_DEDUCTION - old_regime_deductions(profile)).max(0.0);
    let slab_tax = tax_from_slabs(taxable, &OLD_SLABS);

    let rebate = if taxable <= OLD_REBATE_THRESHOLD {
        OLD_REBATE_CAP.min(slab_tax)
    } else {
        0.0
    };

    finish(taxable, slab_tax, rebate)
}

pub fn new_regime_standard_deduction(profile: &TaxpayerProfile) -> f64 {
    if profile.is_salaried {
        NEW_STANDARD_DEDUCTION
    } else {
        0.0
    }
}

/// New regime ignores every deduction except the salaried standard deduction.
pub fn new_regime(profile: &TaxpayerProfile, policy: RebatePolicy) -> RegimeBreakdown {
    let taxable = (profile.annual_income - new_regime_standard_deduction(profile)).max(0.0);
    let slab_tax = tax_from_slabs(taxable, &NEW_SLABS);

    let rebate = if taxable <= NEW_REBATE_THRESHOLD {
        match policy {
            RebatePolicy::NilTaxZone => slab_tax,
            RebatePolicy::Capped => NEW_REBATE_CAP.min(slab_tax),
        }
    } else {
        0.0
    };

    finish(taxable, slab_tax, rebate)
}

fn cap_note(section: &str, claimed: f64, cap: f64, notes: &mut Vec<String>) {
    if claimed > cap {
        notes.push(format!(
            "Section {} claim of {} capped at {}.",
            section,
            format_inr(claimed),
            format_inr(cap)
        ));
    }
}

fn build_notes(
    profile: &TaxpayerProfile,
    old: &RegimeBreakdown,
    new: &RegimeBreakdown,
    policy: RebatePolicy,
) -> Vec<String> {
    let mut notes = vec![format!(
        "Old Regime (FY 2024-25 rules): standard deduction of {} applied.",
        format_inr(OLD_STANDARD_DEDUCTION)
    )];

    cap_note("80C", profile.investment_80c, CAP_80C, &mut notes);
    cap_note("80D", profile.investment_80d, CAP_80D, &mut notes);
    cap_note("24(b) home loan interest", profile.home_loan_interest, CAP_HOME_LOAN_INTEREST, &mut notes);

    if profile.education_loan_interest > 0.0 {
        notes.push(format!(
            "Section 80E education loan interest of {} is deducted under the Old Regime only.",
            format_inr(profile.education_loan_interest)
        ));
    }
    if profile.donations_80g > 0.0 || profile.other_deductions > 0.0 {
        notes.push(format!(
            "Section 80G donations and other deductions ({}) are deducted under the Old Regime only.",
            format_inr(profile.donations_80g + profile.other_deductions)
        ));
    }
    if old.taxable_income == 0.0 && profile.annual_income > 0.0 {
        notes.push("Old Regime deductions cover the whole income; taxable income is nil.".to_string());
    }
    if old.rebate > 0.0 {
        notes.push(format!(
            "Section 87A rebate of {} applied under the Old Regime (taxable income up to {}).",
            format_inr(old.rebate),
            format_inr(OLD_REBATE_THRESHOLD)
        ));
    }

    if profile.is_salaried {
        notes.push(format!(
            "New Regime (FY 2025-26 rules): standard deduction of {} applied for salaried income; no other deductions allowed.",
            format_inr(NEW_STANDARD_DEDUCTION)
        ));
    } else {
        notes.push(
            "New Regime (FY 2025-26 rules): no standard deduction for non-salaried income; no other deductions allowed."
                .to_string(),
        );
    }

    if new.taxable_income <= NEW_REBATE_THRESHOLD {
        match policy {
            RebatePolicy::NilTaxZone => notes.push(format!(
                "New Regime taxable income is within the {} rebate zone; tax is nil.",
                format_inr(NEW_REBATE_THRESHOLD)
            )),
            RebatePolicy::Capped if new.rebate > 0.0 => notes.push(format!(
                "Section 87A rebate of {} (capped at {}) applied under the New Regime.",
                format_inr(new.rebate),
                format_inr(NEW_REBATE_CAP)
            )),
            RebatePolicy::Capped => {}
        }
    }

    notes.push(format!(
        "Health and education cess of {:.0}% added to tax after rebate.",
        CESS_RATE * 100.0
    ));

    notes
}

/// Deterministic comparison of both regimes.
pub fn compare(profile: &TaxpayerProfile, policy: RebatePolicy) -> TaxRegimeResult {
    let old = old_regime(profile);
    let new = new_regime(profile, policy);

    let tax_old = round2(old.total_tax);
    let tax_new = round2(new.total_tax);

    let recommended_regime = if tax_old < tax_new {
        Regime::Old
    } else {
        Regime::New
    };

    debug!(?old, ?new, "Regime breakdowns computed");
    info!(
        tax_old,
        tax_new,
        recommended = %recommended_regime,
        "Tax regimes compared"
    );

    TaxRegimeResult {
        taxable_income_old: round2(old.taxable_income),
        tax_old,
        taxable_income_new: round2(new.taxable_income),
        tax_new,
        recommended_regime,
        tax_saving: round2((tax_old - tax_new).abs()),
        ml_recommendation: None,
        notes: build_notes(profile, &old, &new, policy),
    }
}

/// Features in the order regime classifiers were trained on
pub fn regime_features(profile: &TaxpayerProfile) -> FeatureVector {
    FeatureVector::new()
        .with_numeric("age", f64::from(profile.age))
        .with_numeric("annual_income", profile.annual_income)
        .with_numeric("is_salaried", if profile.is_salaried { 1.0 } else { 0.0 })
        .with_numeric("investment_80c", profile.investment_80c)
        .with_numeric("investment_80d", profile.investment_80d)
        .with_numeric("home_loan_interest", profile.home_loan_interest)
        .with_numeric("education_loan_interest", profile.education_loan_interest)
        .with_numeric("donations_80g", profile.donations_80g)
        .with_numeric("other_deductions", profile.other_deductions)
        .with_numeric("standard_deduction", new_regime_standard_deduction(profile))
}

/// Classifier label "1" is the old regime, "0" the new one.
pub fn regime_from_label(label: &str) -> Option<Regime> {
    match label.trim() {
        "1" => Some(Regime::Old),
        "0" => Some(Regime::New),
        _ => None,
    }
}

/// Ask the classifier for its opinion. Failures only cost the side channel.
pub fn classify_regime(
    profile: &TaxpayerProfile,
    classifier: &dyn LabelPredictor,
) -> Option<Regime> {
    match classifier.predict(&regime_features(profile)) {
        Ok(label) => {
            let regime = regime_from_label(&label);
            if regime.is_none() {
                warn!(classifier = classifier.name(), %label, "Unrecognised regime label ignored");
            }
            regime
        }
        Err(e) => {
            warn!(classifier = classifier.name(), error = %e, "Regime classifier failed");
            None
        }
    }
}

/// Comparison plus the classifier side channel, when one is available.
pub fn compare_with_classifier(
    profile: &TaxpayerProfile,
    policy: RebatePolicy,
    classifier: Option<&dyn LabelPredictor>,
) -> TaxRegimeResult {
    let mut result = compare(profile, policy);
    result.ml_recommendation = classifier.and_then(|c| classify_regime(profile, c));
    result
}

//
// ================= Tests =================
//
