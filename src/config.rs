//! Environment configuration
//!
//! Read once at startup, after `dotenv`. Unset variables take defaults;
//! set but unparsable ones are configuration errors.

use crate::error::AdvisorError;
use crate::tax::RebatePolicy;
use crate::wealth::DEFAULT_TOP_N;
use crate::Result;
use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone, PartialEq)]
pub struct AdvisorConfig {
    pub port: u16,
    /// Scheme rule table; the bundled table when unset
    pub rules_path: Option<PathBuf>,
    /// Investment catalog; the bundled catalog when unset
    pub catalog_path: Option<PathBuf>,
    pub top_n: usize,
    pub rebate_policy: RebatePolicy,
    pub classifiers_enabled: bool,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            rules_path: None,
            catalog_path: None,
            top_n: DEFAULT_TOP_N,
            rebate_policy: RebatePolicy::default(),
            classifiers_enabled: true,
        }
    }
}

impl AdvisorConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup, so tests need not touch the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut config = Self::default();

        if let Some(port) = get("PORT").or_else(|| get("API_PORT")) {
            config.port = port
                .parse()
                .map_err(|_| AdvisorError::Config(format!("invalid port '{}'", port)))?;
        }

        config.rules_path = get("ADVISOR_RULES_PATH").map(PathBuf::from);
        config.catalog_path = get("ADVISOR_CATALOG_PATH").map(PathBuf::from);

        if let Some(top_n) = get("ADVISOR_TOP_N") {
            config.top_n = top_n
                .parse()
                .map_err(|_| AdvisorError::Config(format!("invalid ADVISOR_TOP_N '{}'", top_n)))?;
        }

        if let Some(policy) = get("ADVISOR_NEW_REGIME_REBATE") {
            config.rebate_policy = parse_rebate_policy(&policy)?;
        }

        if let Some(flag) = get("ADVISOR_DISABLE_CLASSIFIERS") {
            config.classifiers_enabled = !parse_flag("ADVISOR_DISABLE_CLASSIFIERS", &flag)?;
        }

        Ok(config)
    }
}

fn parse_rebate_policy(value: &str) -> Result<RebatePolicy> {
    match value.to_lowercase().as_str() {
        "nil" | "zero" => Ok(RebatePolicy::NilTaxZone),
        "capped" | "cap" => Ok(RebatePolicy::Capped),
        other => Err(AdvisorError::Config(format!(
            "invalid ADVISOR_NEW_REGIME_REBATE '{}', expected 'nil' or 'capped'",
            other
        ))),
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool> {
    match value.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(AdvisorError::Config(format!(
            "invalid {} '{}', expected true or false",
            key, other
        ))),
    }
}
