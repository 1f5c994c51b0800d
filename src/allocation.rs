// 💰 Budget Allocation - monthly budget -> per-market and per-channel plan
//
// The static `budget_allocation` weights are renormalized over the plans of
// the selected markets only, so the selected subset always splits the whole
// budget (unless every selected weight is zero). Lead estimates are derived
// from the reallocated budgets, never from the static lead figures.

use crate::entities::{relevant_plans, AdPlan, Priority};
use crate::selection::clamp_budget;
use serde::Serialize;
use std::collections::BTreeSet;

/// Number of ROI cards shown under the charts
pub const ROI_CARD_LIMIT: usize = 4;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelAllocation {
    pub channel: String,
    pub allocation: f64,
    pub estimated_cpl: f64,
    pub priority: Priority,
    /// Share of the market's dynamic budget
    pub budget: f64,
    pub leads: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketAllocation {
    pub market_id: String,
    pub market_name: String,
    /// Static weight from the fixture
    pub weight: f64,
    pub cost_per_lead: f64,
    pub roi_projection: f64,
    pub dynamic_pct: u32,
    pub dynamic_budget: u64,
    pub dynamic_leads: u64,
    pub channels: Vec<ChannelAllocation>,
}

impl MarketAllocation {
    pub fn short_name(&self) -> &str {
        self.market_name.split(',').next().unwrap_or("")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopRoi {
    pub market_id: String,
    pub market_name: String,
    pub roi_projection: f64,
}

impl TopRoi {
    fn from_plan(plan: &AdPlan) -> Self {
        TopRoi {
            market_id: plan.market_id.clone(),
            market_name: plan.market_name.clone(),
            roi_projection: plan.roi_projection,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AllocationPlan {
    pub monthly_budget: f64,
    pub total_weight: f64,
    pub markets: Vec<MarketAllocation>,
    pub total_leads: u64,
    /// Simple mean of the static CPLs, not spend-weighted
    pub avg_cpl: u64,
    pub top_roi: Option<TopRoi>,
    /// Budget left after the rounded market budgets (all of it when every weight is 0)
    pub unallocated: f64,
}

impl AllocationPlan {
    /// True when no selected market has an ad plan
    pub fn is_empty(&self) -> bool {
        self.markets.is_empty()
    }

    pub fn allocated_budget(&self) -> u64 {
        self.markets.iter().map(|m| m.dynamic_budget).sum()
    }

    /// (short name, leads) bars for the leads-by-market chart
    pub fn lead_bars(&self) -> Vec<(String, u64)> {
        self.markets
            .iter()
            .map(|m| (m.short_name().to_string(), m.dynamic_leads))
            .collect()
    }

    pub fn roi_cards(&self) -> &[MarketAllocation] {
        &self.markets[..self.markets.len().min(ROI_CARD_LIMIT)]
    }

    /// Flattened (market, channel) rows for the channel table
    pub fn channel_rows(&self) -> impl Iterator<Item = (&MarketAllocation, &ChannelAllocation)> {
        self.markets
            .iter()
            .flat_map(|m| m.channels.iter().map(move |c| (m, c)))
    }
}

/// Round a non-negative quantity; anything negative or non-finite counts as 0
fn round_count(value: f64) -> u64 {
    if value.is_finite() && value > 0.0 {
        value.round() as u64
    } else {
        0
    }
}

/// value / divisor, with a zero or negative divisor yielding 0
fn per_unit(value: f64, divisor: f64) -> f64 {
    if divisor > 0.0 {
        value / divisor
    } else {
        0.0
    }
}

/// Reallocate `monthly_budget` across the ad plans of the selected markets.
///
/// Pure: identical inputs always give identical output.
pub fn compute_ad_allocation(
    plans: &[AdPlan],
    monthly_budget: f64,
    market_ids: &BTreeSet<String>,
) -> AllocationPlan {
    let monthly_budget = clamp_budget(monthly_budget);
    let relevant = relevant_plans(plans, market_ids);

    let total_weight: f64 = relevant.iter().map(|p| p.budget_allocation).sum();

    let markets: Vec<MarketAllocation> = relevant
        .iter()
        .map(|plan| {
            let pct = if total_weight > 0.0 {
                plan.budget_allocation / total_weight * 100.0
            } else {
                0.0
            };
            let dynamic_budget = round_count(monthly_budget * pct / 100.0);
            let dynamic_leads = round_count(per_unit(dynamic_budget as f64, plan.cost_per_lead));

            let channels = plan
                .channels
                .iter()
                .map(|ch| {
                    let budget = dynamic_budget as f64 * ch.allocation / 100.0;
                    ChannelAllocation {
                        channel: ch.channel.clone(),
                        allocation: ch.allocation,
                        estimated_cpl: ch.estimated_cpl,
                        priority: ch.priority,
                        budget,
                        leads: round_count(per_unit(budget, ch.estimated_cpl)),
                    }
                })
                .collect();

            MarketAllocation {
                market_id: plan.market_id.clone(),
                market_name: plan.market_name.clone(),
                weight: plan.budget_allocation,
                cost_per_lead: plan.cost_per_lead,
                roi_projection: plan.roi_projection,
                dynamic_pct: round_count(pct) as u32,
                dynamic_budget,
                dynamic_leads,
                channels,
            }
        })
        .collect();

    let total_leads = markets.iter().map(|m| m.dynamic_leads).sum();
    let allocated: u64 = markets.iter().map(|m| m.dynamic_budget).sum();

    AllocationPlan {
        monthly_budget,
        total_weight,
        total_leads,
        avg_cpl: mean_cpl(&relevant),
        top_roi: top_roi(&relevant),
        unallocated: monthly_budget - allocated as f64,
        markets,
    }
}

fn mean_cpl(plans: &[&AdPlan]) -> u64 {
    if plans.is_empty() {
        return 0;
    }
    let sum: f64 = plans.iter().map(|p| p.cost_per_lead).sum();
    round_count(sum / plans.len() as f64)
}

/// Highest static ROI; on a tie the later plan wins
fn top_roi(plans: &[&AdPlan]) -> Option<TopRoi> {
    plans
        .iter()
        .copied()
        .reduce(|a, b| if a.roi_projection > b.roi_projection { a } else { b })
        .map(TopRoi::from_plan)
}

// ============================================================================
// STATIC PORTFOLIO OVERVIEW
// ============================================================================

/// The fixture figures as authored, without reallocation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StaticOverview {
    pub monthly_budget: f64,
    pub total_leads: u64,
    pub avg_cpl: u64,
    pub top_roi: Option<TopRoi>,
    /// (market name, budget from the static weight)
    pub budgets: Vec<(String, f64)>,
}

pub fn static_overview(plans: &[AdPlan], total_monthly_budget: f64) -> StaticOverview {
    let all: Vec<&AdPlan> = plans.iter().collect();
    let monthly_budget = clamp_budget(total_monthly_budget);

    StaticOverview {
        monthly_budget,
        total_leads: plans.iter().map(|p| p.estimated_leads as u64).sum(),
        avg_cpl: mean_cpl(&all),
        top_roi: top_roi(&all),
        budgets: plans
            .iter()
            .map(|p| {
                (
                    p.market_name.clone(),
                    monthly_budget * p.budget_allocation / 100.0,
                )
            })
            .collect(),
    }
}

// ============================================================================
// TESTS
// ============================================================================
