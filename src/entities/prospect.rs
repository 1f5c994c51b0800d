// 👥 Prospect Entity - businesses surfaced for a market in Phase 2
//
// Every prospect belongs to exactly one market through `market_id`.
// `digital_score` is inverted: lower means a bigger opportunity.

use serde::{Deserialize, Serialize};

/// Match score at or above which a prospect counts as a high match
pub const HIGH_MATCH_THRESHOLD: u8 = 85;

// ============================================================================
// PIPELINE STATUS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineStatus {
    New,
    Contacted,
    Qualified,
    Proposal,
    Closed,
}

impl PipelineStatus {
    pub const ALL: [PipelineStatus; 5] = [
        PipelineStatus::New,
        PipelineStatus::Contacted,
        PipelineStatus::Qualified,
        PipelineStatus::Proposal,
        PipelineStatus::Closed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStatus::New => "new",
            PipelineStatus::Contacted => "contacted",
            PipelineStatus::Qualified => "qualified",
            PipelineStatus::Proposal => "proposal",
            PipelineStatus::Closed => "closed",
        }
    }
}

/// One row of the "ideal client" benchmark comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterionMatch {
    pub label: String,
    #[serde(rename = "match")]
    pub matched: bool,
}

// ============================================================================
// PROSPECT ENTITY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prospect {
    pub id: String,
    pub company: String,
    pub industry: String,
    pub location: String,

    /// Foreign key into the market fixtures
    pub market_id: String,

    /// Digital maturity (0-100, lower = more opportunity)
    pub digital_score: u8,

    /// Similarity to the ideal-client benchmark (0-100)
    pub match_score: u8,

    #[serde(default)]
    pub suggested_services: Vec<String>,
    pub status: PipelineStatus,
    #[serde(default)]
    pub website: String,
    #[serde(default)]
    pub employees: String,
    #[serde(default)]
    pub revenue: String,
    #[serde(default)]
    pub digital_gaps: Vec<String>,
    #[serde(default)]
    pub recommended_services: Vec<String>,
    pub estimated_project_value: u32,
    pub contact_name: String,
    #[serde(default)]
    pub contact_title: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub selection_criteria: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bss_match: Vec<CriterionMatch>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_confidence: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_confidence_reason: Option<String>,
}

impl Prospect {
    /// Token before the first space of the contact name
    pub fn first_name(&self) -> &str {
        self.contact_name.split(' ').next().unwrap_or("")
    }

    pub fn is_high_match(&self) -> bool {
        self.match_score >= HIGH_MATCH_THRESHOLD
    }

    /// Benchmark criteria met, out of those listed
    pub fn benchmark_hits(&self) -> (usize, usize) {
        let hits = self.bss_match.iter().filter(|c| c.matched).count();
        (hits, self.bss_match.len())
    }
}

// ============================================================================
// PROSPECT REGISTRY
// ============================================================================

/// Read-only registry over the prospect fixtures, in fixture order.
#[derive(Debug, Clone, Default)]
pub struct ProspectRegistry {
    prospects: Vec<Prospect>,
}

impl ProspectRegistry {
    pub fn new(prospects: Vec<Prospect>) -> Self {
        ProspectRegistry { prospects }
    }

    pub fn all(&self) -> &[Prospect] {
        &self.prospects
    }

    pub fn count(&self) -> usize {
        self.prospects.len()
    }

    pub fn find_by_id(&self, id: &str) -> Option<&Prospect> {
        self.prospects.iter().find(|p| p.id == id)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
pub(crate) fn sample_prospect(id: &str, market_id: &str, match_score: u8) -> Prospect {
    Prospect {
        id: id.to_string(),
        company: format!("{} Co", id),
        industry: "Healthcare".to_string(),
        location: "Houston, TX".to_string(),
        market_id: market_id.to_string(),
        digital_score: 30,
        match_score,
        suggested_services: vec!["SEO".to_string()],
        status: PipelineStatus::New,
        website: format!("{}.example.com", id),
        employees: "50".to_string(),
        revenue: "$5M".to_string(),
        digital_gaps: vec!["No SEO".to_string()],
        recommended_services: vec!["SEO".to_string()],
        estimated_project_value: 10_000,
        contact_name: "Avery Lee".to_string(),
        contact_title: "Owner".to_string(),
        selection_criteria: vec![],
        bss_match: vec![],
        ai_confidence: None,
        ai_confidence_reason: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_name() {
        let mut prospect = sample_prospect("p1", "houston", 90);
        prospect.contact_name = "Dana Shapiro".to_string();
        assert_eq!(prospect.first_name(), "Dana");

        prospect.contact_name = "Dr. Michael Chen".to_string();
        assert_eq!(prospect.first_name(), "Dr.");

        prospect.contact_name = "Cher".to_string();
        assert_eq!(prospect.first_name(), "Cher");

        prospect.contact_name = String::new();
        assert_eq!(prospect.first_name(), "");
    }

    #[test]
    fn test_status_serde_is_lowercase() {
        let json = serde_json::to_string(&PipelineStatus::Qualified).unwrap();
        assert_eq!(json, "\"qualified\"");

        let parsed: PipelineStatus = serde_json::from_str("\"proposal\"").unwrap();
        assert_eq!(parsed, PipelineStatus::Proposal);

        assert!(serde_json::from_str::<PipelineStatus>("\"won\"").is_err());
    }

    #[test]
    fn test_prospect_optional_fields_default() {
        let json = r#"{
            "id": "p9", "company": "Cowtown Logistics", "industry": "Logistics",
            "location": "Fort Worth, TX", "marketId": "fort-worth",
            "digitalScore": 31, "matchScore": 78, "status": "contacted",
            "estimatedProjectValue": 26000, "contactName": "Dana Shapiro",
            "bssMatch": [{"label": "Multi-location", "match": true}, {"label": "Budget", "match": false}]
        }"#;

        let prospect: Prospect = serde_json::from_str(json).unwrap();
        assert_eq!(prospect.market_id, "fort-worth");
        assert!(prospect.digital_gaps.is_empty());
        assert!(prospect.ai_confidence.is_none());
        assert_eq!(prospect.benchmark_hits(), (1, 2));
    }

    #[test]
    fn test_high_match_threshold() {
        assert!(sample_prospect("a", "m", 85).is_high_match());
        assert!(!sample_prospect("b", "m", 84).is_high_match());
    }

    #[test]
    fn test_registry_queries() {
        let registry = ProspectRegistry::new(vec![
            sample_prospect("p1", "houston", 90),
            sample_prospect("p2", "houston", 80),
            sample_prospect("p3", "dallas", 70),
        ]);

        assert_eq!(registry.count(), 3);
        assert_eq!(registry.find_by_id("p2").unwrap().match_score, 80);
        assert!(registry.find_by_id("p404").is_none());
    }
}
