//! Scheme rule table loading
//!
//! Raw tabular rows are coerced and validated exactly once, at load time.
//! Requests only ever see a validated, read-only `RuleTable`.

use crate::error::AdvisorError;
use crate::models::{Criterion, SchemeRule, Scope};
use crate::Result;
use serde::Deserialize;
use serde_json::Value;
use std::collections::{BTreeSet, HashSet};
use std::path::Path;
use tracing::info;

pub const DEFAULT_AGE_MIN: u32 = 0;
pub const DEFAULT_AGE_MAX: u32 = 120;
pub const DEFAULT_INCOME_MIN: u64 = 0;
/// Sentinel for "no upper income limit"
pub const DEFAULT_INCOME_MAX: u64 = u64::MAX;

const WILDCARD: &str = "any";

const BUNDLED_RULES: &str = include_str!("../../data/scheme_rules.json");

/// One row of the rule table as it appears on disk
#[derive(Debug, Clone, Deserialize)]
pub struct RawSchemeRule {
    pub scheme_id: String,
    pub scheme_name: String,
    pub scope: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub age_min: Value,
    #[serde(default)]
    pub age_max: Value,
    #[serde(default)]
    pub annual_income_min: Value,
    #[serde(default)]
    pub annual_income_max: Value,
    pub allowed_genders: String,
    pub allowed_castes: String,
    pub allowed_employments: String,
    pub disability_allowed: String,
    pub education_levels: String,
}

impl Criterion {
    /// Parse a rule cell: the literal `Any` or a comma-separated value set.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case(WILDCARD) {
            return Criterion::Any;
        }

        let values: BTreeSet<String> = trimmed
            .split(',')
            .map(|token| token.trim().to_lowercase())
            .collect();

        Criterion::OneOf(values)
    }

    /// Whether an applicant value satisfies this criterion.
    pub fn admits(&self, value: &str) -> bool {
        match self {
            Criterion::Any => true,
            Criterion::OneOf(values) => values.contains(&value.trim().to_lowercase()),
        }
    }
}

fn is_wildcard_state(state: &str) -> bool {
    state.is_empty() || state.eq_ignore_ascii_case("all") || state.eq_ignore_ascii_case(WILDCARD)
}

fn parse_scope(scheme_id: &str, scope: &str, state: &str) -> Result<Scope> {
    let state = state.trim();

    match scope.trim().to_lowercase().as_str() {
        "central" | "all" => Ok(Scope::Central),
        "state" if is_wildcard_state(state) => Err(AdvisorError::RuleTable(format!(
            "scheme {}: state-scoped rule needs a concrete state (got '{}')",
            scheme_id, state
        ))),
        "state" => Ok(Scope::State(state.to_string())),
        other => Err(AdvisorError::RuleTable(format!(
            "scheme {}: unknown scope '{}'",
            scheme_id, other
        ))),
    }
}

/// Coerce a numeric cell. Blank, null and `Any` cells take the default;
/// fractional values truncate toward zero.
fn coerce_bound(scheme_id: &str, column: &str, value: &Value, default: u64) -> Result<u64> {
    let invalid = |detail: String| {
        AdvisorError::RuleTable(format!("scheme {}: column {} {}", scheme_id, column, detail))
    };

    let number = match value {
        Value::Null => return Ok(default),
        Value::Number(n) => {
            if let Some(v) = n.as_u64() {
                return Ok(v);
            }
            n.as_f64()
                .ok_or_else(|| invalid(format!("is not a number: {}", n)))?
        }
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() || s.eq_ignore_ascii_case(WILDCARD) {
                return Ok(default);
            }
            if let Ok(v) = s.parse::<u64>() {
                return Ok(v);
            }
            s.parse::<f64>()
                .map_err(|_| invalid(format!("is not numeric: '{}'", s)))?
        }
        other => return Err(invalid(format!("has unsupported value {}", other))),
    };

    if !number.is_finite() || number < 0.0 {
        return Err(invalid(format!("must be a non-negative number (got {})", number)));
    }

    Ok(number.trunc() as u64)
}

fn coerce_age(scheme_id: &str, column: &str, value: &Value, default: u32) -> Result<u32> {
    let raw = coerce_bound(scheme_id, column, value, u64::from(default))?;
    u32::try_from(raw).map_err(|_| {
        AdvisorError::RuleTable(format!(
            "scheme {}: column {} out of range ({})",
            scheme_id, column, raw
        ))
    })
}

impl TryFrom<RawSchemeRule> for SchemeRule {
    type Error = AdvisorError;

    fn try_from(raw: RawSchemeRule) -> Result<Self> {
        let id = raw.scheme_id.trim().to_string();

        Ok(SchemeRule {
            scope: parse_scope(&id, &raw.scope, &raw.state)?,
            age_min: coerce_age(&id, "age_min", &raw.age_min, DEFAULT_AGE_MIN)?,
            age_max: coerce_age(&id, "age_max", &raw.age_max, DEFAULT_AGE_MAX)?,
            income_min: coerce_bound(
                &id,
                "annual_income_min",
                &raw.annual_income_min,
                DEFAULT_INCOME_MIN,
            )?,
            income_max: coerce_bound(
                &id,
                "annual_income_max",
                &raw.annual_income_max,
                DEFAULT_INCOME_MAX,
            )?,
            genders: Criterion::parse(&raw.allowed_genders),
            castes: Criterion::parse(&raw.allowed_castes),
            employments: Criterion::parse(&raw.allowed_employments),
            education_levels: Criterion::parse(&raw.education_levels),
            disability: Criterion::parse(&raw.disability_allowed),
            scheme_name: raw.scheme_name.trim().to_string(),
            scheme_id: id,
        })
    }
}

/// Validated, read-only scheme rule table
#[derive(Debug, Clone, Default)]
pub struct RuleTable {
    rules: Vec<SchemeRule>,
}

impl RuleTable {
    /// Build a table, enforcing the row invariants.
    pub fn from_rules(rules: Vec<SchemeRule>) -> Result<Self> {
        Self::check_invariants(&rules)?;
        Ok(Self { rules })
    }

    fn check_invariants(rules: &[SchemeRule]) -> Result<()> {
        let mut seen = HashSet::with_capacity(rules.len());

        for rule in rules {
            if rule.scheme_id.is_empty() {
                return Err(AdvisorError::RuleTable("empty scheme_id".to_string()));
            }
            if !seen.insert(rule.scheme_id.as_str()) {
                return Err(AdvisorError::RuleTable(format!(
                    "duplicate scheme_id {}",
                    rule.scheme_id
                )));
            }
            if rule.age_min > rule.age_max {
                return Err(AdvisorError::RuleTable(format!(
                    "scheme {}: age_min {} exceeds age_max {}",
                    rule.scheme_id, rule.age_min, rule.age_max
                )));
            }
            if rule.income_min > rule.income_max {
                return Err(AdvisorError::RuleTable(format!(
                    "scheme {}: annual_income_min {} exceeds annual_income_max {}",
                    rule.scheme_id, rule.income_min, rule.income_max
                )));
            }
            if let Scope::State(state) = &rule.scope {
                if is_wildcard_state(state.trim()) {
                    return Err(AdvisorError::RuleTable(format!(
                        "scheme {}: state-scoped rule needs a concrete state",
                        rule.scheme_id
                    )));
                }
            }
        }

        Ok(())
    }

    pub fn from_raw(rows: Vec<RawSchemeRule>) -> Result<Self> {
        let rules = rows
            .into_iter()
            .map(SchemeRule::try_from)
            .collect::<Result<Vec<_>>>()?;
        Self::from_rules(rules)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let rows: Vec<RawSchemeRule> = serde_json::from_str(json)?;
        Self::from_raw(rows)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let table = Self::from_json_str(&json)?;

        info!(
            path = %path.display(),
            rule_count = table.len(),
            "Scheme rule table loaded"
        );

        Ok(table)
    }

    /// The rule table shipped with the crate
    pub fn bundled() -> Result<Self> {
        Self::from_json_str(BUNDLED_RULES)
    }

    pub fn rules(&self) -> &[SchemeRule] {
        &self.rules
    }

    pub fn get(&self, scheme_id: &str) -> Option<&SchemeRule> {
        self.rules.iter().find(|rule| rule.scheme_id == scheme_id)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(overrides: Value) -> RawSchemeRule {
        let mut base = json!({
            "scheme_id": "T001",
            "scheme_name": "Test Scheme",
            "scope": "central",
            "state": "ALL",
            "age_min": 18,
            "age_max": 60,
            "annual_income_min": 0,
            "annual_income_max": 300000,
            "allowed_genders": "Any",
            "allowed_castes": "Any",
            "allowed_employments": "Any",
            "disability_allowed": "Any",
            "education_levels": "Any"
        });
        if let (Some(base), Some(extra)) = (base.as_object_mut(), overrides.as_object()) {
            for (k, v) in extra {
                base.insert(k.clone(), v.clone());
            }
        }
        serde_json::from_value(base).unwrap()
    }

    #[test]
    fn test_criterion_parsing() {
        assert_eq!(Criterion::parse(" any "), Criterion::Any);
        assert_eq!(Criterion::parse("ANY"), Criterion::Any);

        let parsed = Criterion::parse("SC, ST ,obc");
        assert!(parsed.admits("sc"));
        assert!(parsed.admits(" St "));
        assert!(parsed.admits("OBC"));
        assert!(!parsed.admits("General"));
    }

    #[test]
    fn test_empty_value_is_its_own_category() {
        let parsed = Criterion::parse("");
        assert_ne!(parsed, Criterion::Any);
        assert!(parsed.admits("  "));
        assert!(!parsed.admits("Male"));
    }

    #[test]
    fn test_numeric_defaults() {
        let rule = SchemeRule::try_from(raw(json!({
            "age_min": null,
            "age_max": "Any",
            "annual_income_min": "",
            "annual_income_max": null
        })))
        .unwrap();

        assert_eq!(rule.age_min, DEFAULT_AGE_MIN);
        assert_eq!(rule.age_max, DEFAULT_AGE_MAX);
        assert_eq!(rule.income_min, DEFAULT_INCOME_MIN);
        assert_eq!(rule.income_max, DEFAULT_INCOME_MAX);
    }

    #[test]
    fn test_missing_numeric_columns_take_defaults() {
        let row: RawSchemeRule = serde_json::from_value(json!({
            "scheme_id": "T002",
            "scheme_name": "Sparse",
            "scope": "central",
            "allowed_genders": "Any",
            "allowed_castes": "Any",
            "allowed_employments": "Any",
            "disability_allowed": "Any",
            "education_levels": "Any"
        }))
        .unwrap();

        let rule = SchemeRule::try_from(row).unwrap();
        assert_eq!((rule.age_min, rule.age_max), (0, 120));
        assert_eq!(rule.income_max, u64::MAX);
    }

    #[test]
    fn test_numeric_strings_and_fractions_coerced() {
        let rule = SchemeRule::try_from(raw(json!({
            "age_min": " 21 ",
            "age_max": 59.9,
            "annual_income_max": "250000.75"
        })))
        .unwrap();

        assert_eq!(rule.age_min, 21);
        assert_eq!(rule.age_max, 59);
        assert_eq!(rule.income_max, 250_000);
    }

    #[test]
    fn test_malformed_bound_is_load_error() {
        let err = SchemeRule::try_from(raw(json!({ "age_max": "sixty" }))).unwrap_err();
        assert!(matches!(err, AdvisorError::RuleTable(_)));
        assert!(err.to_string().contains("age_max"));

        let err = SchemeRule::try_from(raw(json!({ "annual_income_min": -5 }))).unwrap_err();
        assert!(matches!(err, AdvisorError::RuleTable(_)));
    }

    #[test]
    fn test_scope_parsing() {
        let rule = SchemeRule::try_from(raw(json!({
            "scope": "State",
            "state": " Kerala "
        })))
        .unwrap();
        assert_eq!(rule.scope, Scope::State("Kerala".to_string()));

        let rule = SchemeRule::try_from(raw(json!({
            "scope": "ALL",
            "state": "Kerala"
        })))
        .unwrap();
        assert_eq!(rule.scope, Scope::Central);

        for state in ["", "ALL", "Any"] {
            let err = SchemeRule::try_from(raw(json!({ "scope": "state", "state": state })));
            assert!(err.is_err(), "state '{}' should be rejected", state);
        }

        assert!(SchemeRule::try_from(raw(json!({ "scope": "district" }))).is_err());
    }

    #[test]
    fn test_table_invariants() {
        let inverted = raw(json!({ "age_min": 70, "age_max": 60 }));
        assert!(RuleTable::from_raw(vec![inverted]).is_err());

        let inverted_income = raw(json!({
            "annual_income_min": 500000,
            "annual_income_max": 100000
        }));
        assert!(RuleTable::from_raw(vec![inverted_income]).is_err());

        let duplicate = RuleTable::from_raw(vec![raw(json!({})), raw(json!({}))]);
        let err = duplicate.unwrap_err();
        assert!(err.to_string().contains("duplicate scheme_id T001"));
    }

    #[test]
    fn test_bundled_table_loads_in_order() {
        let table = RuleTable::bundled().unwrap();
        assert!(!table.is_empty());
        assert_eq!(table.rules()[0].scheme_id, "S001");

        let state_rule = table.get("S007").unwrap();
        assert_eq!(state_rule.scope, Scope::State("Andhra Pradesh".to_string()));
        assert_eq!(state_rule.age_max, DEFAULT_AGE_MAX);
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("rules-{}.json", std::process::id()));
        std::fs::write(
            &path,
            serde_json::to_string(&json!([{
                "scheme_id": "F001",
                "scheme_name": "From File",
                "scope": "central",
                "allowed_genders": "Any",
                "allowed_castes": "Any",
                "allowed_employments": "Any",
                "disability_allowed": "Any",
                "education_levels": "Any"
            }]))
            .unwrap(),
        )
        .unwrap();

        let table = RuleTable::load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(table.len(), 1);
        assert!(table.get("F001").is_some());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = RuleTable::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, AdvisorError::IoError(_)));
    }
}
