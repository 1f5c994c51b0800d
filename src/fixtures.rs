// 📦 Fixtures - the static sample dataset
//
// The dataset ships inside the binary (`data/*.json`) and can be swapped for a
// directory with the same four files. It is loaded once at startup and never
// mutated afterwards.

use crate::data_quality::{DataQualityEngine, QualityReport};
use crate::entities::{AdPlan, AdPlanRegistry, Market, MarketRegistry, Prospect, ProspectRegistry};
use crate::repository::RepositoryLog;
use anyhow::{bail, Context, Result};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

pub const MARKETS_FILE: &str = "markets.json";
pub const PROSPECTS_FILE: &str = "prospects.json";
pub const AD_PLANS_FILE: &str = "ad_plans.json";
pub const REPOSITORY_FILE: &str = "repository.json";

const EMBEDDED_MARKETS: &str = include_str!("../data/markets.json");
const EMBEDDED_PROSPECTS: &str = include_str!("../data/prospects.json");
const EMBEDDED_AD_PLANS: &str = include_str!("../data/ad_plans.json");
const EMBEDDED_REPOSITORY: &str = include_str!("../data/repository.json");

#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub markets: MarketRegistry,
    pub prospects: ProspectRegistry,
    pub ad_plans: AdPlanRegistry,
    pub repository: RepositoryLog,
}

impl Dataset {
    pub fn new(
        markets: Vec<Market>,
        prospects: Vec<Prospect>,
        ad_plans: Vec<AdPlan>,
        repository: RepositoryLog,
    ) -> Self {
        Dataset {
            markets: MarketRegistry::new(markets),
            prospects: ProspectRegistry::new(prospects),
            ad_plans: AdPlanRegistry::new(ad_plans),
            repository,
        }
    }

    /// Dataset compiled into the binary
    pub fn embedded() -> Result<Self> {
        let dataset = Dataset::new(
            parse(EMBEDDED_MARKETS, MARKETS_FILE)?,
            parse(EMBEDDED_PROSPECTS, PROSPECTS_FILE)?,
            parse(EMBEDDED_AD_PLANS, AD_PLANS_FILE)?,
            parse(EMBEDDED_REPOSITORY, REPOSITORY_FILE)?,
        );
        debug!("Loaded embedded dataset");
        Ok(dataset)
    }

    /// Load the four fixture files from a directory
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            bail!("Fixture directory not found: {:?}", dir);
        }

        let dataset = Dataset::new(
            read_json(&dir.join(MARKETS_FILE))?,
            read_json(&dir.join(PROSPECTS_FILE))?,
            read_json(&dir.join(AD_PLANS_FILE))?,
            read_json(&dir.join(REPOSITORY_FILE))?,
        );
        info!(dir = %dir.display(), "Loaded dataset from directory");
        Ok(dataset)
    }

    /// Directory override if given, embedded fixtures otherwise
    pub fn load(data_dir: Option<&Path>) -> Result<Self> {
        let dataset = match data_dir {
            Some(dir) => Dataset::from_dir(dir)?,
            None => Dataset::embedded()?,
        };
        info!(
            markets = dataset.markets.count(),
            prospects = dataset.prospects.count(),
            ad_plans = dataset.ad_plans.count(),
            "Dataset ready"
        );
        Ok(dataset)
    }

    pub fn validate(&self) -> QualityReport {
        DataQualityEngine::new().validate_dataset(self)
    }

    /// Fail when the fixtures break a critical invariant
    pub fn validate_strict(&self) -> Result<QualityReport> {
        let report = self.validate();
        if report.has_critical_issues() {
            let details: Vec<String> = report
                .critical_issues()
                .map(|i| format!("{}: {}", i.field, i.issue))
                .collect();
            bail!("Fixture validation failed: {}", details.join("; "));
        }
        Ok(report)
    }
}

fn parse<T: DeserializeOwned>(content: &str, name: &str) -> Result<T> {
    serde_json::from_str(content).with_context(|| format!("Failed to parse fixture {}", name))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read fixture file: {:?}", path))?;
    parse(&content, &path.display().to_string())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Grade;

    #[test]
    fn test_embedded_dataset_loads() {
        let dataset = Dataset::embedded().unwrap();

        assert_eq!(dataset.markets.count(), 9);
        assert_eq!(dataset.prospects.count(), 18);
        assert_eq!(dataset.ad_plans.count(), 9);
        assert_eq!(dataset.repository.outreach.len(), 12);
        assert_eq!(dataset.repository.campaigns.len(), 4);
    }

    #[test]
    fn test_embedded_dataset_is_consistent() {
        let dataset = Dataset::embedded().unwrap();
        let report = dataset.validate_strict().unwrap();
        assert!(!report.has_critical_issues(), "{}", report.summary());

        for market in dataset.markets.all() {
            assert_eq!(market.grade, Grade::from_score(market.opportunity_score));
        }
        for prospect in dataset.prospects.all() {
            assert!(dataset.markets.find_by_id(&prospect.market_id).is_some());
        }
    }

    #[test]
    fn test_from_dir_round_trips_embedded_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(MARKETS_FILE), EMBEDDED_MARKETS).unwrap();
        fs::write(dir.path().join(PROSPECTS_FILE), EMBEDDED_PROSPECTS).unwrap();
        fs::write(dir.path().join(AD_PLANS_FILE), EMBEDDED_AD_PLANS).unwrap();
        fs::write(dir.path().join(REPOSITORY_FILE), EMBEDDED_REPOSITORY).unwrap();

        let dataset = Dataset::load(Some(dir.path())).unwrap();
        assert_eq!(dataset.markets.count(), 9);
        assert!(dataset.prospects.find_by_id("p9").is_some());
    }

    #[test]
    fn test_from_dir_missing_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(MARKETS_FILE), "[]").unwrap();

        let err = Dataset::from_dir(dir.path()).unwrap_err();
        assert!(format!("{:#}", err).contains(PROSPECTS_FILE));
    }

    #[test]
    fn test_from_dir_rejects_missing_directory() {
        assert!(Dataset::from_dir("/definitely/not/a/fixture/dir").is_err());
    }
}
