// 📣 Ad Plan Entity - per-market advertising weights and channel mix
//
// `budget_allocation` is a weight in percentage points authored per market.
// Weights across the whole fixture set are not required to sum to 100; the
// allocation engine renormalizes over whatever subset is selected.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelRecommendation {
    pub channel: String,
    /// Share of the market budget, in percent
    pub allocation: f64,
    pub estimated_cpl: f64,
    /// Static lead figure from the fixture (not used for dynamic plans)
    pub estimated_leads: u32,
    pub priority: Priority,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdPlan {
    pub market_id: String,
    pub market_name: String,
    pub budget_allocation: f64,
    pub cost_per_lead: f64,
    pub estimated_leads: u32,
    #[serde(default)]
    pub channels: Vec<ChannelRecommendation>,
    pub roi_projection: f64,
}

impl AdPlan {
    /// Market name up to the first comma ("Houston, TX" -> "Houston")
    pub fn short_name(&self) -> &str {
        self.market_name.split(',').next().unwrap_or("")
    }

    pub fn channel_allocation_total(&self) -> f64 {
        self.channels.iter().map(|c| c.allocation).sum()
    }
}

// ============================================================================
// AD PLAN REGISTRY
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct AdPlanRegistry {
    plans: Vec<AdPlan>,
}

impl AdPlanRegistry {
    pub fn new(plans: Vec<AdPlan>) -> Self {
        AdPlanRegistry { plans }
    }

    pub fn all(&self) -> &[AdPlan] {
        &self.plans
    }

    pub fn count(&self) -> usize {
        self.plans.len()
    }
}

/// Plans whose market is in `market_ids`, fixture order
pub fn relevant_plans<'a>(plans: &'a [AdPlan], market_ids: &BTreeSet<String>) -> Vec<&'a AdPlan> {
    plans
        .iter()
        .filter(|p| market_ids.contains(&p.market_id))
        .collect()
}

#[cfg(test)]
pub(crate) fn sample_plan(market_id: &str, weight: f64, cpl: f64, roi: f64) -> AdPlan {
    AdPlan {
        market_id: market_id.to_string(),
        market_name: format!("{}, TX", market_id),
        budget_allocation: weight,
        cost_per_lead: cpl,
        estimated_leads: 10,
        channels: vec![
            ChannelRecommendation {
                channel: "Google Search Ads".to_string(),
                allocation: 60.0,
                estimated_cpl: cpl,
                estimated_leads: 6,
                priority: Priority::High,
            },
            ChannelRecommendation {
                channel: "Meta Ads".to_string(),
                allocation: 40.0,
                estimated_cpl: cpl * 2.0,
                estimated_leads: 2,
                priority: Priority::Medium,
            },
        ],
        roi_projection: roi,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_name() {
        let mut plan = sample_plan("houston", 20.0, 100.0, 300.0);
        plan.market_name = "Houston, TX".to_string();
        assert_eq!(plan.short_name(), "Houston");

        plan.market_name = "Remote".to_string();
        assert_eq!(plan.short_name(), "Remote");
    }

    #[test]
    fn test_priority_serde() {
        let ch: ChannelRecommendation = serde_json::from_str(
            r#"{"channel":"LinkedIn Ads","allocation":30,"estimatedCpl":180,"estimatedLeads":9,"priority":"high"}"#,
        )
        .unwrap();
        assert_eq!(ch.priority, Priority::High);
        assert_eq!(ch.allocation, 30.0);
    }

    #[test]
    fn test_relevant_preserves_fixture_order() {
        let plans = vec![
            sample_plan("houston", 22.0, 145.0, 340.0),
            sample_plan("dallas", 18.0, 160.0, 310.0),
            sample_plan("austin", 9.0, 175.0, 240.0),
        ];

        let ids: BTreeSet<String> =
            ["austin".to_string(), "houston".to_string(), "chicago".to_string()].into();
        let relevant: Vec<&str> = relevant_plans(&plans, &ids)
            .iter()
            .map(|p| p.market_id.as_str())
            .collect();
        assert_eq!(relevant, vec!["houston", "austin"]);
        assert!(relevant_plans(&plans, &BTreeSet::new()).is_empty());
    }

    #[test]
    fn test_channel_allocation_total() {
        let plan = sample_plan("houston", 22.0, 145.0, 340.0);
        assert_eq!(plan.channel_allocation_total(), 100.0);
    }
}
