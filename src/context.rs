//! Read-only advisor context
//!
//! Holds the reference data and collaborators every request reads: the
//! scheme rule table, the classifiers, and the tax/wealth settings. Built
//! once at startup and shared behind an `Arc`; nothing in it is mutated
//! after construction.

use crate::catalog::InvestmentCatalog;
use crate::classifier::{
    CatalogClassifier, DeductionHeuristicClassifier, DistributionPredictor, LabelPredictor,
};
use crate::config::AdvisorConfig;
use crate::eligibility::{self, RuleTable};
use crate::error::AdvisorError;
use crate::models::{
    EligibilityResult, TaxRegimeResult, TaxpayerProfile, UserProfile, WealthPlanInput,
    WealthProjection,
};
use crate::tax::{self, RebatePolicy};
use crate::validation::Validate;
use crate::wealth::{self, DEFAULT_TOP_N};
use crate::Result;
use std::sync::Arc;
use tracing::info;

pub struct AdvisorContext {
    rules: Option<Arc<RuleTable>>,
    regime_classifier: Option<Arc<dyn LabelPredictor>>,
    scheme_classifier: Option<Arc<dyn DistributionPredictor>>,
    rebate_policy: RebatePolicy,
    top_n: usize,
}

impl Default for AdvisorContext {
    fn default() -> Self {
        Self {
            rules: None,
            regime_classifier: None,
            scheme_classifier: None,
            rebate_policy: RebatePolicy::default(),
            top_n: DEFAULT_TOP_N,
        }
    }
}

impl AdvisorContext {
    /// Empty context: no rule table and no classifiers.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rules(mut self, rules: Arc<RuleTable>) -> Self {
        self.rules = Some(rules);
        self
    }

    pub fn with_regime_classifier(mut self, classifier: Arc<dyn LabelPredictor>) -> Self {
        self.regime_classifier = Some(classifier);
        self
    }

    pub fn with_scheme_classifier(mut self, classifier: Arc<dyn DistributionPredictor>) -> Self {
        self.scheme_classifier = Some(classifier);
        self
    }

    pub fn with_rebate_policy(mut self, policy: RebatePolicy) -> Self {
        self.rebate_policy = policy;
        self
    }

    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    /// Load reference data named by the config, falling back to the bundled tables.
    pub fn from_config(config: &AdvisorConfig) -> Result<Self> {
        let rules = match &config.rules_path {
            Some(path) => RuleTable::load(path)?,
            None => RuleTable::bundled()?,
        };

        let mut context = Self::new()
            .with_rules(Arc::new(rules))
            .with_rebate_policy(config.rebate_policy)
            .with_top_n(config.top_n);

        if config.classifiers_enabled {
            let catalog = match &config.catalog_path {
                Some(path) => InvestmentCatalog::load(path)?,
                None => InvestmentCatalog::bundled()?,
            };
            context = context
                .with_regime_classifier(Arc::new(DeductionHeuristicClassifier))
                .with_scheme_classifier(Arc::new(CatalogClassifier::new(Arc::new(catalog))));
        }

        info!(
            rule_count = context.rules.as_ref().map_or(0, |r| r.len()),
            classifiers = config.classifiers_enabled,
            rebate_policy = ?context.rebate_policy,
            top_n = context.top_n,
            "Advisor context initialized"
        );

        Ok(context)
    }

    pub fn rules(&self) -> Option<&RuleTable> {
        self.rules.as_deref()
    }

    pub fn rebate_policy(&self) -> RebatePolicy {
        self.rebate_policy
    }

    pub fn top_n(&self) -> usize {
        self.top_n
    }

    /// The rule table is mandatory: without it the request fails.
    pub fn eligible_schemes(&self, profile: &UserProfile) -> Result<EligibilityResult> {
        let rules = self
            .rules
            .as_ref()
            .ok_or_else(|| AdvisorError::DataUnavailable("scheme rule table not loaded".to_string()))?;

        Ok(eligibility::match_schemes(profile, rules.rules()).into())
    }

    pub fn compare_tax(&self, profile: &TaxpayerProfile) -> Result<TaxRegimeResult> {
        profile.validate()?;

        Ok(tax::compare_with_classifier(
            profile,
            self.rebate_policy,
            self.regime_classifier.as_deref(),
        ))
    }

    /// `top_n` overrides the configured count for this request.
    pub fn project_wealth(
        &self,
        plan: &WealthPlanInput,
        top_n: Option<usize>,
    ) -> Result<WealthProjection> {
        plan.validate()?;

        Ok(wealth::project(
            plan,
            top_n.unwrap_or(self.top_n),
            self.scheme_classifier.as_deref(),
        ))
    }
}
