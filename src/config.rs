// ⚙️ Configuration - environment driven, with defaults for every value

use crate::outreach::{OutreachTemplate, DEFAULT_AGENCY_NAME, DEFAULT_AGENCY_SITE};
use crate::selection::{clamp_budget, DEFAULT_MONTHLY_BUDGET};
use anyhow::{anyhow, Result};
use std::path::PathBuf;

pub const DEFAULT_APP_ID: &str = "websharx-ms";
pub const DEFAULT_STATE_DB: &str = "market-scout.db";
pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// tracing filter directive (MARKET_SCOUT_LOG)
    pub log_level: String,
    /// Append logs here instead of stderr (MARKET_SCOUT_LOG_FILE)
    pub log_file: Option<PathBuf>,
    /// SQLite file holding the welcome flag (MARKET_SCOUT_STATE_DB)
    pub state_db: PathBuf,
    /// Fixture directory overriding the embedded dataset (MARKET_SCOUT_DATA_DIR)
    pub data_dir: Option<PathBuf>,
    /// Prefix of the `<app-id>-visited` key (MARKET_SCOUT_APP_ID)
    pub app_id: String,
    /// Starting monthly budget, already clamped (MARKET_SCOUT_BUDGET)
    pub initial_budget: f64,
    pub agency_name: String,
    pub agency_site: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            log_file: None,
            state_db: PathBuf::from(DEFAULT_STATE_DB),
            data_dir: None,
            app_id: DEFAULT_APP_ID.to_string(),
            initial_budget: DEFAULT_MONTHLY_BUDGET,
            agency_name: DEFAULT_AGENCY_NAME.to_string(),
            agency_site: DEFAULT_AGENCY_SITE.to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; empty values count as unset
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Config::default();

        let initial_budget = match var("MARKET_SCOUT_BUDGET") {
            Some(raw) => {
                let value = raw.trim().parse::<f64>().map_err(|_| {
                    anyhow!("MARKET_SCOUT_BUDGET must be a number, got {:?}", raw)
                })?;
                clamp_budget(value)
            }
            None => defaults.initial_budget,
        };

        Ok(Config {
            log_level: var("MARKET_SCOUT_LOG").unwrap_or(defaults.log_level),
            log_file: var("MARKET_SCOUT_LOG_FILE").map(PathBuf::from),
            state_db: var("MARKET_SCOUT_STATE_DB")
                .map(PathBuf::from)
                .unwrap_or(defaults.state_db),
            data_dir: var("MARKET_SCOUT_DATA_DIR").map(PathBuf::from),
            app_id: var("MARKET_SCOUT_APP_ID").unwrap_or(defaults.app_id),
            initial_budget,
            agency_name: var("MARKET_SCOUT_AGENCY").unwrap_or(defaults.agency_name),
            agency_site: var("MARKET_SCOUT_AGENCY_SITE").unwrap_or(defaults.agency_site),
        })
    }

    pub fn outreach_template(&self) -> OutreachTemplate {
        OutreachTemplate::new(self.agency_name.clone(), self.agency_site.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.app_id, "websharx-ms");
        assert_eq!(config.initial_budget, 5000.0);
        assert_eq!(config.state_db, PathBuf::from("market-scout.db"));
        assert!(config.data_dir.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("MARKET_SCOUT_LOG", "debug"),
            ("MARKET_SCOUT_APP_ID", "demo"),
            ("MARKET_SCOUT_BUDGET", " 12500 "),
            ("MARKET_SCOUT_DATA_DIR", "/tmp/fixtures"),
            ("MARKET_SCOUT_AGENCY", "Acme"),
        ])
        .unwrap();

        assert_eq!(config.log_level, "debug");
        assert_eq!(config.app_id, "demo");
        assert_eq!(config.initial_budget, 12500.0);
        assert_eq!(config.data_dir, Some(PathBuf::from("/tmp/fixtures")));
        assert_eq!(config.outreach_template().agency_name, "Acme");
        assert_eq!(config.outreach_template().agency_site, "websharx.ca");
    }

    #[test]
    fn test_negative_budget_is_clamped() {
        let config = config_from(&[("MARKET_SCOUT_BUDGET", "-500")]).unwrap();
        assert_eq!(config.initial_budget, 0.0);
    }

    #[test]
    fn test_non_numeric_budget_is_an_error() {
        let err = config_from(&[("MARKET_SCOUT_BUDGET", "lots")]).unwrap_err();
        assert!(err.to_string().contains("MARKET_SCOUT_BUDGET"));
    }

    #[test]
    fn test_empty_values_fall_back_to_defaults() {
        let config = config_from(&[("MARKET_SCOUT_APP_ID", "  ")]).unwrap();
        assert_eq!(config.app_id, "websharx-ms");
    }
}
