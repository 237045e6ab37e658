//! Wealth projector
//!
//! Year-by-year SIP simulation with an optional annual step-up, an inflation
//! adjusted corpus, and scheme recommendations ranked from a classifier
//! distribution.

use crate::classifier::{Distribution, DistributionPredictor, FeatureVector};
use crate::models::{ProjectionRow, SchemeRecommendation, WealthPlanInput, WealthProjection};
use std::cmp::Ordering;
use tracing::{debug, info, warn};

/// Fixed annual inflation assumption, percent
pub const INFLATION_RATE_PERCENT: f64 = 4.0;

pub const DEFAULT_TOP_N: usize = 5;

/// Years until retirement; zero when retirement is not in the future.
pub fn horizon(plan: &WealthPlanInput) -> u32 {
    plan.retirement_age.saturating_sub(plan.user_age)
}

/// Run the simulation, one row per year.
///
/// Interest accrues on the opening balance; the full year's contribution is
/// added at year end and stepped up only after the row is recorded.
pub fn simulate(plan: &WealthPlanInput) -> Vec<ProjectionRow> {
    let years = horizon(plan);
    let rate = plan.expected_return / 100.0;
    let step_up = 1.0 + plan.annual_step_up / 100.0;

    let mut corpus = plan.current_savings;
    let mut annual_investment = plan.monthly_investment * 12.0;
    let mut rows = Vec::with_capacity(years as usize);

    for year in 1..=years {
        let interest = corpus * rate;
        let row = ProjectionRow {
            year,
            opening_capital: corpus,
            annual_investment,
            interest_earned: interest,
            closing_capital: corpus + interest + annual_investment,
        };
        debug!(year, closing = row.closing_capital, "Projection year");

        corpus = row.closing_capital;
        annual_investment *= step_up;
        rows.push(row);
    }

    rows
}

/// Present value of `corpus` after `years` of inflation.
pub fn inflation_adjust(corpus: f64, years: u32) -> f64 {
    if years == 0 {
        return corpus;
    }
    let years = i32::try_from(years).unwrap_or(i32::MAX);
    corpus / (1.0 + INFLATION_RATE_PERCENT / 100.0).powi(years)
}

/// Features in the order scheme classifiers were trained on
pub fn wealth_features(plan: &WealthPlanInput) -> FeatureVector {
    FeatureVector::new()
        .with_numeric("user_age", f64::from(plan.user_age))
        .with_numeric("investment_amount", plan.monthly_investment * 12.0)
        .with_numeric("years_to_invest", f64::from(horizon(plan)))
        .with_categorical("risk_level", plan.risk_tolerance.as_str())
        .with_categorical("liquidity", plan.liquidity.as_str())
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// Top `top_n` labels by probability, highest first.
///
/// The sort is stable, so ties keep the classifier's label order.
/// Non-finite probabilities are dropped.
pub fn rank_recommendations(distribution: &Distribution, top_n: usize) -> Vec<SchemeRecommendation> {
    let mut ranked: Vec<(&str, f64)> = distribution
        .pairs()
        .filter(|(label, p)| {
            if p.is_finite() {
                true
            } else {
                warn!(%label, "Dropping recommendation with non-finite probability");
                false
            }
        })
        .collect();

    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

    ranked
        .into_iter()
        .take(top_n)
        .map(|(label, p)| SchemeRecommendation {
            scheme_name: label.to_string(),
            confidence: round4(p),
        })
        .collect()
}

fn recommend(
    plan: &WealthPlanInput,
    top_n: usize,
    classifier: Option<&dyn DistributionPredictor>,
) -> Vec<SchemeRecommendation> {
    let Some(classifier) = classifier else {
        warn!("No scheme classifier available, returning projection without recommendations");
        return Vec::new();
    };

    match classifier.predict_distribution(&wealth_features(plan)) {
        Ok(distribution) => rank_recommendations(&distribution, top_n),
        Err(e) => {
            warn!(
                classifier = classifier.name(),
                error = %e,
                "Scheme classifier failed, returning projection without recommendations"
            );
            Vec::new()
        }
    }
}

/// Deterministic projection plus ranked recommendations.
///
/// A missing or failing classifier only empties `recommendations`.
pub fn project(
    plan: &WealthPlanInput,
    top_n: usize,
    classifier: Option<&dyn DistributionPredictor>,
) -> WealthProjection {
    let horizon_years = horizon(plan);
    let rows = simulate(plan);

    let corpus = rows
        .last()
        .map(|row| row.closing_capital)
        .unwrap_or(plan.current_savings);
    let total_invested =
        plan.current_savings + rows.iter().map(|row| row.annual_investment).sum::<f64>();

    let recommendations = recommend(plan, top_n, classifier);

    info!(
        horizon_years,
        corpus,
        recommendations = recommendations.len(),
        "Wealth projected"
    );

    WealthProjection {
        corpus,
        inflation_adjusted_corpus: inflation_adjust(corpus, horizon_years),
        horizon_years,
        total_invested,
        rows,
        recommendations,
    }
}

//
// ================= Tests =================
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::InvestmentCatalog;
    use crate::classifier::{CatalogClassifier, WEALTH_FEATURES};
    use crate::error::AdvisorError;
    use crate::Result;
    use proptest::prelude::*;
    use std::sync::Arc;

    fn plan(user_age: u32, retirement_age: u32) -> WealthPlanInput {
        WealthPlanInput {
            user_age,
            retirement_age,
            current_savings: 0.0,
            monthly_investment: 1_000.0,
            expected_return: 10.0,
            risk_tolerance: "Moderate".to_string(),
            liquidity: "Low".to_string(),
            annual_step_up: 0.0,
        }
    }

    struct Fixed(Vec<(&'static str, f64)>);

    impl DistributionPredictor for Fixed {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn predict_distribution(&self, _features: &FeatureVector) -> Result<Distribution> {
            Distribution::new(
                self.0.iter().map(|(l, _)| l.to_string()).collect(),
                self.0.iter().map(|(_, p)| *p).collect(),
            )
        }
    }

    struct Unavailable;

    impl DistributionPredictor for Unavailable {
        fn name(&self) -> &'static str {
            "unavailable"
        }

        fn predict_distribution(&self, _features: &FeatureVector) -> Result<Distribution> {
            Err(AdvisorError::DataUnavailable("model not loaded".to_string()))
        }
    }

    #[test]
    fn test_two_year_projection() {
        let result = project(&plan(30, 32), DEFAULT_TOP_N, None);

        assert_eq!(result.horizon_years, 2);
        assert_eq!(
            result.rows,
            vec![
                ProjectionRow {
                    year: 1,
                    opening_capital: 0.0,
                    annual_investment: 12_000.0,
                    interest_earned: 0.0,
                    closing_capital: 12_000.0,
                },
                ProjectionRow {
                    year: 2,
                    opening_capital: 12_000.0,
                    annual_investment: 12_000.0,
                    interest_earned: 1_200.0,
                    closing_capital: 25_200.0,
                },
            ]
        );
        assert_eq!(result.corpus, 25_200.0);
        assert_eq!(result.total_invested, 24_000.0);
        assert!((result.inflation_adjusted_corpus - 25_200.0 / 1.0816).abs() < 1e-9);
        assert!(result.recommendations.is_empty());
    }

    #[test]
    fn test_degenerate_horizon() {
        for (age, retirement) in [(60, 60), (65, 60)] {
            let mut p = plan(age, retirement);
            p.current_savings = 250_000.0;

            let result = project(&p, DEFAULT_TOP_N, None);
            assert_eq!(result.horizon_years, 0);
            assert!(result.rows.is_empty());
            assert_eq!(result.corpus, 250_000.0);
            assert_eq!(result.inflation_adjusted_corpus, 250_000.0);
            assert_eq!(result.total_invested, 250_000.0);
        }
    }

    #[test]
    fn test_step_up_applies_after_row() {
        let mut p = plan(30, 33);
        p.annual_step_up = 10.0;
        p.expected_return = 0.0;

        let rows = simulate(&p);
        assert_eq!(rows[0].annual_investment, 12_000.0);
        assert!((rows[1].annual_investment - 13_200.0).abs() < 1e-9);
        assert!((rows[2].annual_investment - 14_520.0).abs() < 1e-9);
    }

    #[test]
    fn test_ranking_takes_top_n_descending() {
        let classifier = Fixed(vec![
            ("PPF", 0.10),
            ("ELSS", 0.30),
            ("NPS", 0.05),
            ("FD", 0.25),
            ("SGB", 0.123456),
            ("NSC", 0.166544),
        ]);

        let result = project(&plan(30, 50), 3, Some(&classifier));
        let names: Vec<_> = result
            .recommendations
            .iter()
            .map(|r| r.scheme_name.as_str())
            .collect();
        assert_eq!(names, vec!["ELSS", "FD", "NSC"]);
        assert_eq!(result.recommendations[2].confidence, 0.1665);
    }

    #[test]
    fn test_ranking_ties_keep_label_order() {
        let dist = Distribution::new(
            vec!["B".into(), "A".into(), "C".into()],
            vec![0.25, 0.25, 0.5],
        )
        .unwrap();

        let names: Vec<_> = rank_recommendations(&dist, 5)
            .into_iter()
            .map(|r| r.scheme_name)
            .collect();
        assert_eq!(names, vec!["C", "B", "A"]);
    }

    #[test]
    fn test_ranking_drops_non_finite() {
        let dist = Distribution::new(
            vec!["A".into(), "B".into(), "C".into()],
            vec![f64::NAN, 0.4, f64::INFINITY],
        )
        .unwrap();

        let ranked = rank_recommendations(&dist, 5);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].scheme_name, "B");
    }

    #[test]
    fn test_failed_classifier_degrades() {
        let result = project(&plan(30, 32), DEFAULT_TOP_N, Some(&Unavailable));
        assert!(result.recommendations.is_empty());
        assert_eq!(result.corpus, 25_200.0);
    }

    #[test]
    fn test_catalog_classifier_recommendations() {
        let catalog = Arc::new(InvestmentCatalog::bundled().unwrap());
        let classifier = CatalogClassifier::new(catalog);

        let result = project(&plan(30, 60), DEFAULT_TOP_N, Some(&classifier));
        assert_eq!(result.recommendations.len(), DEFAULT_TOP_N);
        assert!(result
            .recommendations
            .windows(2)
            .all(|w| w[0].confidence >= w[1].confidence));
    }

    #[test]
    fn test_wealth_features_order() {
        let features = wealth_features(&plan(30, 60));
        assert_eq!(features.names(), WEALTH_FEATURES.to_vec());
        assert_eq!(features.numeric("investment_amount").unwrap(), 12_000.0);
        assert_eq!(features.numeric("years_to_invest").unwrap(), 30.0);
        assert_eq!(features.categorical("risk_level").unwrap(), "Moderate");
    }

    #[test]
    fn test_idempotent() {
        let classifier = CatalogClassifier::new(Arc::new(InvestmentCatalog::bundled().unwrap()));
        let mut p = plan(25, 58);
        p.current_savings = 100_000.0;
        p.annual_step_up = 5.0;
        assert_eq!(
            project(&p, DEFAULT_TOP_N, Some(&classifier)),
            project(&p, DEFAULT_TOP_N, Some(&classifier))
        );
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_rows_conserve_and_chain(
            user_age in 18u32..70,
            years in 0u32..50,
            savings in 0u32..5_000_000,
            monthly in 0u32..200_000,
            rate in 0u32..2_000,
            step_up in 0u32..2_500,
        ) {
            let p = WealthPlanInput {
                user_age,
                retirement_age: user_age + years,
                current_savings: f64::from(savings),
                monthly_investment: f64::from(monthly),
                expected_return: f64::from(rate) / 100.0,
                risk_tolerance: "High".to_string(),
                liquidity: "Medium".to_string(),
                annual_step_up: f64::from(step_up) / 100.0,
            };
            let rows = simulate(&p);
            prop_assert_eq!(rows.len(), years as usize);

            for row in &rows {
                prop_assert_eq!(
                    row.closing_capital,
                    row.opening_capital + row.interest_earned + row.annual_investment
                );
            }
            for pair in rows.windows(2) {
                prop_assert_eq!(pair[0].closing_capital, pair[1].opening_capital);
                prop_assert_eq!(
                    pair[1].annual_investment,
                    pair[0].annual_investment * (1.0 + p.annual_step_up / 100.0)
                );
            }
        }
    }
}
