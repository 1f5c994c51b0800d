// 🗺️ Market Entity - scored metro areas for Phase 1
//
// A market is a fixture record: identity (`id`) plus a set of authored scores.
// The letter grade is a bucketing of the opportunity score and has to stay in
// step with it whenever the fixtures are edited (see `data_quality`).

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// ============================================================================
// GRADE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
}

impl Grade {
    /// Bucket an opportunity score: >=80 A, >=70 B, >=60 C, else D
    pub fn from_score(score: u8) -> Self {
        match score {
            80..=u8::MAX => Grade::A,
            70..=79 => Grade::B,
            60..=69 => Grade::C,
            _ => Grade::D,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
        }
    }

    pub fn is_top_tier(&self) -> bool {
        matches!(self, Grade::A | Grade::B)
    }
}

/// Display tier used for map markers and score badges.
/// Uses the same cut points as `Grade`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreTier {
    Excellent,
    Good,
    Fair,
    Weak,
}

impl ScoreTier {
    pub fn from_score(score: u8) -> Self {
        match Grade::from_score(score) {
            Grade::A => ScoreTier::Excellent,
            Grade::B => ScoreTier::Good,
            Grade::C => ScoreTier::Fair,
            Grade::D => ScoreTier::Weak,
        }
    }
}

// ============================================================================
// MARKET ENTITY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Market {
    /// Stable identifier, referenced by prospects and ad plans
    pub id: String,

    pub name: String,
    pub state: String,
    pub lat: f64,
    pub lng: f64,

    /// Overall opportunity score (0-100)
    pub opportunity_score: u8,
    pub grade: Grade,

    // Sub-scores (0-100)
    pub business_density: u8,
    pub digital_maturity_gap: u8,
    pub agency_competition: u8,
    pub business_growth_rate: u8,

    pub total_businesses: u32,
    pub businesses_needing_services: u32,
    pub avg_digital_spend: u32,

    #[serde(default)]
    pub pros: Vec<String>,
    #[serde(default)]
    pub cons: Vec<String>,
    #[serde(default)]
    pub ai_summary: String,
    #[serde(default)]
    pub top_verticals: Vec<String>,
}

impl Market {
    /// "Houston, TX"
    pub fn display_name(&self) -> String {
        format!("{}, {}", self.name, self.state)
    }

    /// Grade the score says this market should have
    pub fn expected_grade(&self) -> Grade {
        Grade::from_score(self.opportunity_score)
    }

    pub fn grade_is_consistent(&self) -> bool {
        self.grade == self.expected_grade()
    }

    pub fn tier(&self) -> ScoreTier {
        ScoreTier::from_score(self.opportunity_score)
    }

    /// Share of businesses flagged as needing services, in percent
    pub fn service_need_ratio(&self) -> f64 {
        if self.total_businesses == 0 {
            0.0
        } else {
            self.businesses_needing_services as f64 / self.total_businesses as f64 * 100.0
        }
    }
}

// ============================================================================
// MARKET OVERVIEW (Phase 1 KPI cards)
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct MarketOverview {
    pub markets_analysed: usize,
    pub top_market: Option<Market>,
    pub average_score: u32,
    pub top_tier_count: usize,
}

// ============================================================================
// MARKET REGISTRY
// ============================================================================

/// Read-only registry over the market fixtures, in fixture order.
#[derive(Debug, Clone, Default)]
pub struct MarketRegistry {
    markets: Vec<Market>,
}

impl MarketRegistry {
    pub fn new(markets: Vec<Market>) -> Self {
        MarketRegistry { markets }
    }

    pub fn all(&self) -> &[Market] {
        &self.markets
    }

    pub fn count(&self) -> usize {
        self.markets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markets.is_empty()
    }

    pub fn find_by_id(&self, id: &str) -> Option<&Market> {
        self.markets.iter().find(|m| m.id == id)
    }

    /// Markets by opportunity score, highest first. Ties keep fixture order.
    pub fn ranked(&self) -> Vec<&Market> {
        let mut ranked: Vec<&Market> = self.markets.iter().collect();
        ranked.sort_by(|a, b| b.opportunity_score.cmp(&a.opportunity_score));
        ranked
    }

    /// Comma-joined names of the markets whose ids are in `ids`, fixture order
    pub fn names_for(&self, ids: &BTreeSet<String>) -> String {
        self.markets
            .iter()
            .filter(|m| ids.contains(&m.id))
            .map(|m| m.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn overview(&self) -> MarketOverview {
        // A later market wins a tie, same as a strict-greater left fold
        let top_market = self
            .markets
            .iter()
            .fold(None::<&Market>, |best, m| match best {
                Some(b) if b.opportunity_score > m.opportunity_score => Some(b),
                _ => Some(m),
            })
            .cloned();

        let average_score = if self.markets.is_empty() {
            0
        } else {
            let sum: u32 = self.markets.iter().map(|m| m.opportunity_score as u32).sum();
            (sum as f64 / self.markets.len() as f64).round() as u32
        };

        MarketOverview {
            markets_analysed: self.markets.len(),
            top_market,
            average_score,
            top_tier_count: self.markets.iter().filter(|m| m.grade.is_top_tier()).count(),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
pub(crate) fn sample_market(id: &str, score: u8) -> Market {
    Market {
        id: id.to_string(),
        name: id.to_string(),
        state: "TX".to_string(),
        lat: 30.0,
        lng: -97.0,
        opportunity_score: score,
        grade: Grade::from_score(score),
        business_density: 50,
        digital_maturity_gap: 50,
        agency_competition: 50,
        business_growth_rate: 50,
        total_businesses: 1000,
        businesses_needing_services: 250,
        avg_digital_spend: 3000,
        pros: vec![],
        cons: vec![],
        ai_summary: String::new(),
        top_verticals: vec!["Healthcare".to_string()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grade_buckets() {
        assert_eq!(Grade::from_score(100), Grade::A);
        assert_eq!(Grade::from_score(80), Grade::A);
        assert_eq!(Grade::from_score(79), Grade::B);
        assert_eq!(Grade::from_score(70), Grade::B);
        assert_eq!(Grade::from_score(69), Grade::C);
        assert_eq!(Grade::from_score(60), Grade::C);
        assert_eq!(Grade::from_score(59), Grade::D);
        assert_eq!(Grade::from_score(0), Grade::D);
    }

    #[test]
    fn test_grade_is_monotonic() {
        let mut previous = Grade::from_score(0);
        for score in 1..=100u8 {
            let grade = Grade::from_score(score);
            // A < B < C < D in enum order, so a higher score never yields a later variant
            assert!(grade <= previous, "score {} regressed", score);
            previous = grade;
        }
    }

    #[test]
    fn test_grade_consistency_check() {
        let mut market = sample_market("houston", 88);
        assert!(market.grade_is_consistent());

        market.opportunity_score = 65;
        assert!(!market.grade_is_consistent());
        assert_eq!(market.expected_grade(), Grade::C);
    }

    #[test]
    fn test_market_deserializes_from_fixture_shape() {
        let json = r#"{
            "id": "austin", "name": "Austin", "state": "TX",
            "lat": 30.2672, "lng": -97.7431,
            "opportunityScore": 71, "grade": "B",
            "businessDensity": 78, "digitalMaturityGap": 58,
            "agencyCompetition": 44, "businessGrowthRate": 88,
            "totalBusinesses": 64500, "businessesNeedingServices": 19800,
            "avgDigitalSpend": 5200,
            "pros": ["Fast growth"], "cons": [], "aiSummary": "Growing.",
            "topVerticals": ["Restaurants"]
        }"#;

        let market: Market = serde_json::from_str(json).unwrap();
        assert_eq!(market.id, "austin");
        assert_eq!(market.grade, Grade::B);
        assert_eq!(market.display_name(), "Austin, TX");
        assert!(market.grade_is_consistent());
    }

    #[test]
    fn test_registry_ranked_and_lookup() {
        let registry = MarketRegistry::new(vec![
            sample_market("a", 64),
            sample_market("b", 88),
            sample_market("c", 71),
        ]);

        let ranked: Vec<&str> = registry.ranked().iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ranked, vec!["b", "c", "a"]);

        assert_eq!(registry.find_by_id("c").unwrap().opportunity_score, 71);
        assert!(registry.find_by_id("zzz").is_none());
    }

    #[test]
    fn test_overview() {
        let registry = MarketRegistry::new(vec![
            sample_market("a", 64),
            sample_market("b", 88),
            sample_market("c", 71),
        ]);

        let overview = registry.overview();
        assert_eq!(overview.markets_analysed, 3);
        assert_eq!(overview.top_market.unwrap().id, "b");
        assert_eq!(overview.average_score, 74); // 223 / 3 = 74.33
        assert_eq!(overview.top_tier_count, 2);
    }

    #[test]
    fn test_overview_tie_prefers_later_market() {
        let registry = MarketRegistry::new(vec![sample_market("first", 80), sample_market("second", 80)]);
        assert_eq!(registry.overview().top_market.unwrap().id, "second");
    }

    #[test]
    fn test_overview_empty_registry() {
        let overview = MarketRegistry::default().overview();
        assert_eq!(overview.markets_analysed, 0);
        assert!(overview.top_market.is_none());
        assert_eq!(overview.average_score, 0);
    }

    #[test]
    fn test_names_for_keeps_fixture_order() {
        let registry = MarketRegistry::new(vec![
            sample_market("houston", 88),
            sample_market("dallas", 85),
        ]);
        let ids: BTreeSet<String> = ["dallas".to_string(), "houston".to_string()].into();
        assert_eq!(registry.names_for(&ids), "houston, dallas");
    }
}
