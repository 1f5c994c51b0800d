// 🔎 Prospect Availability - market selection -> prospects
//
// Pure filters over the prospect fixtures. Output always keeps fixture order
// and is recomputed on every read.

use crate::entities::Prospect;
use std::collections::{BTreeSet, HashSet};

/// Prospects whose market is selected, in fixture order
pub fn available_prospects<'a>(
    prospects: &'a [Prospect],
    selected_markets: &BTreeSet<String>,
) -> Vec<&'a Prospect> {
    prospects
        .iter()
        .filter(|p| selected_markets.contains(&p.market_id))
        .collect()
}

/// Prospects whose id is selected, in fixture order.
/// Includes selections orphaned by a later market deselection.
pub fn selected_prospects<'a>(
    prospects: &'a [Prospect],
    selected_ids: &BTreeSet<String>,
) -> Vec<&'a Prospect> {
    prospects
        .iter()
        .filter(|p| selected_ids.contains(&p.id))
        .collect()
}

/// Selected prospect ids that no longer show up as available
pub fn orphaned_selections<'a>(
    prospects: &'a [Prospect],
    selected_markets: &BTreeSet<String>,
    selected_ids: &BTreeSet<String>,
) -> Vec<&'a Prospect> {
    selected_prospects(prospects, selected_ids)
        .into_iter()
        .filter(|p| !selected_markets.contains(&p.market_id))
        .collect()
}

/// Sorted, de-duplicated industries
pub fn industries(prospects: &[&Prospect]) -> Vec<String> {
    prospects
        .iter()
        .map(|p| p.industry.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

// ============================================================================
// TOOLBAR FILTER
// ============================================================================

/// Search box + industry dropdown + minimum match score.
/// Empty / zero values mean "no filter".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProspectFilter {
    pub search: String,
    pub industry: Option<String>,
    pub min_match: u8,
}

impl ProspectFilter {
    pub fn is_active(&self) -> bool {
        !self.search.is_empty() || self.industry.is_some() || self.min_match > 0
    }

    pub fn clear(&mut self) {
        *self = ProspectFilter::default();
    }

    pub fn matches(&self, prospect: &Prospect) -> bool {
        if !self.search.is_empty()
            && !prospect
                .company
                .to_lowercase()
                .contains(&self.search.to_lowercase())
        {
            return false;
        }
        if let Some(industry) = &self.industry {
            if &prospect.industry != industry {
                return false;
            }
        }
        if self.min_match > 0 && prospect.match_score < self.min_match {
            return false;
        }
        true
    }

    pub fn apply<'a>(&self, prospects: &[&'a Prospect]) -> Vec<&'a Prospect> {
        prospects.iter().copied().filter(|p| self.matches(p)).collect()
    }
}

// ============================================================================
// SUMMARY (Phase 2 KPI cards)
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProspectSummary {
    pub found: usize,
    pub total_value: u64,
    pub avg_match: u32,
    pub high_match: usize,
    pub industries: usize,
}

pub fn summarize(prospects: &[&Prospect]) -> ProspectSummary {
    let total_value = prospects
        .iter()
        .map(|p| p.estimated_project_value as u64)
        .sum();
    let match_sum: u32 = prospects.iter().map(|p| p.match_score as u32).sum();
    let denominator = prospects.len().max(1) as f64;
    let distinct: HashSet<&str> = prospects.iter().map(|p| p.industry.as_str()).collect();

    ProspectSummary {
        found: prospects.len(),
        total_value,
        avg_match: (match_sum as f64 / denominator).round() as u32,
        high_match: prospects.iter().filter(|p| p.is_high_match()).count(),
        industries: distinct.len(),
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::prospect::sample_prospect;

    fn fixture() -> Vec<Prospect> {
        let mut legal = sample_prospect("p2", "houston", 80);
        legal.industry = "Legal".to_string();
        legal.company = "Lone Star Legal Group".to_string();
        vec![
            sample_prospect("p1", "houston", 94),
            legal,
            sample_prospect("p3", "dallas", 86),
            sample_prospect("p4", "austin", 70),
            sample_prospect("p5", "houston", 60),
        ]
    }

    fn ids(prospects: &[&Prospect]) -> Vec<String> {
        prospects.iter().map(|p| p.id.clone()).collect()
    }

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_available_prospects_filter_and_order() {
        let prospects = fixture();
        let available = available_prospects(&prospects, &set(&["houston", "dallas"]));
        assert_eq!(ids(&available), vec!["p1", "p2", "p3", "p5"]);

        for p in &available {
            assert!(["houston", "dallas"].contains(&p.market_id.as_str()));
        }
    }

    #[test]
    fn test_available_prospects_empty_selection() {
        let prospects = fixture();
        assert!(available_prospects(&prospects, &BTreeSet::new()).is_empty());
    }

    #[test]
    fn test_unknown_market_ids_filter_out() {
        let prospects = fixture();
        assert!(available_prospects(&prospects, &set(&["atlantis"])).is_empty());
    }

    #[test]
    fn test_selected_prospects_include_orphans() {
        let prospects = fixture();
        let selected_ids = set(&["p3", "p1"]);
        let markets = set(&["houston"]);

        assert_eq!(ids(&selected_prospects(&prospects, &selected_ids)), vec!["p1", "p3"]);
        assert_eq!(
            ids(&orphaned_selections(&prospects, &markets, &selected_ids)),
            vec!["p3"]
        );
    }

    #[test]
    fn test_toolbar_filter() {
        let prospects = fixture();
        let available = available_prospects(&prospects, &set(&["houston", "dallas"]));

        let search = ProspectFilter {
            search: "lone STAR".to_string(),
            ..Default::default()
        };
        assert_eq!(ids(&search.apply(&available)), vec!["p2"]);

        let by_industry = ProspectFilter {
            industry: Some("Healthcare".to_string()),
            ..Default::default()
        };
        assert_eq!(ids(&by_industry.apply(&available)), vec!["p1", "p3", "p5"]);

        let by_match = ProspectFilter {
            min_match: 85,
            ..Default::default()
        };
        assert_eq!(ids(&by_match.apply(&available)), vec!["p1", "p3"]);

        let mut filter = by_match.clone();
        assert!(filter.is_active());
        filter.clear();
        assert!(!filter.is_active());
        assert_eq!(filter.apply(&available).len(), 4);
    }

    #[test]
    fn test_industries_sorted_unique() {
        let prospects = fixture();
        let all: Vec<&Prospect> = prospects.iter().collect();
        assert_eq!(industries(&all), vec!["Healthcare".to_string(), "Legal".to_string()]);
    }

    #[test]
    fn test_summary() {
        let prospects = fixture();
        let houston = available_prospects(&prospects, &set(&["houston"]));
        let summary = summarize(&houston);

        assert_eq!(summary.found, 3);
        assert_eq!(summary.total_value, 30_000);
        assert_eq!(summary.avg_match, 78); // (94 + 80 + 60) / 3 = 78
        assert_eq!(summary.high_match, 1);
        assert_eq!(summary.industries, 2);
    }

    #[test]
    fn test_summary_empty() {
        let summary = summarize(&[]);
        assert_eq!(summary, ProspectSummary::default());
    }
}
