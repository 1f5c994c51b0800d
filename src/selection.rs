// 🎯 Selection State - the only mutable data in a session
//
// Holds the selected market ids, the selected prospect ids and the monthly
// budget. Every operation is total: toggles flip membership, the budget is
// clamped, nothing ever fails.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

pub const DEFAULT_MONTHLY_BUDGET: f64 = 5000.0;

/// Quick-pick budgets offered next to the budget field
pub const BUDGET_PRESETS: [f64; 4] = [2500.0, 5000.0, 10000.0, 25000.0];

/// Clamp a raw budget: negatives become 0 and non-finite input is coerced to 0
pub fn clamp_budget(value: f64) -> f64 {
    if value.is_finite() {
        value.max(0.0)
    } else {
        0.0
    }
}

/// Parse a budget typed by the user; anything non-numeric becomes 0
pub fn parse_budget(input: &str) -> f64 {
    clamp_budget(input.trim().parse::<f64>().unwrap_or(0.0))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionState {
    selected_markets: BTreeSet<String>,
    selected_prospects: BTreeSet<String>,
    monthly_budget: f64,
}

impl Default for SelectionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionState {
    pub fn new() -> Self {
        Self::with_budget(DEFAULT_MONTHLY_BUDGET)
    }

    pub fn with_budget(budget: f64) -> Self {
        SelectionState {
            selected_markets: BTreeSet::new(),
            selected_prospects: BTreeSet::new(),
            monthly_budget: clamp_budget(budget),
        }
    }

    /// Flip membership of a market id. Returns whether it is now selected.
    pub fn toggle_market(&mut self, id: &str) -> bool {
        let selected = toggle(&mut self.selected_markets, id);
        debug!(market = id, selected, "Toggled market");
        selected
    }

    /// Flip membership of a prospect id. Returns whether it is now selected.
    ///
    /// Not constrained to prospects of selected markets: deselecting a market
    /// leaves its prospects selected (orphaned) until toggled off.
    pub fn toggle_prospect(&mut self, id: &str) -> bool {
        let selected = toggle(&mut self.selected_prospects, id);
        debug!(prospect = id, selected, "Toggled prospect");
        selected
    }

    pub fn set_budget(&mut self, value: f64) {
        self.monthly_budget = clamp_budget(value);
        debug!(budget = self.monthly_budget, "Set monthly budget");
    }

    pub fn selected_markets(&self) -> &BTreeSet<String> {
        &self.selected_markets
    }

    pub fn selected_prospects(&self) -> &BTreeSet<String> {
        &self.selected_prospects
    }

    pub fn monthly_budget(&self) -> f64 {
        self.monthly_budget
    }

    pub fn is_market_selected(&self, id: &str) -> bool {
        self.selected_markets.contains(id)
    }

    pub fn is_prospect_selected(&self, id: &str) -> bool {
        self.selected_prospects.contains(id)
    }

    pub fn market_count(&self) -> usize {
        self.selected_markets.len()
    }

    pub fn prospect_count(&self) -> usize {
        self.selected_prospects.len()
    }
}

fn toggle(set: &mut BTreeSet<String>, id: &str) -> bool {
    if set.remove(id) {
        false
    } else {
        set.insert(id.to_string());
        true
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let state = SelectionState::new();
        assert_eq!(state.market_count(), 0);
        assert_eq!(state.prospect_count(), 0);
        assert_eq!(state.monthly_budget(), DEFAULT_MONTHLY_BUDGET);
    }

    #[test]
    fn test_toggle_market_is_its_own_inverse() {
        let mut state = SelectionState::new();
        state.toggle_market("dallas");
        let before = state.selected_markets().clone();

        assert!(state.toggle_market("houston"));
        assert!(state.is_market_selected("houston"));
        assert!(!state.toggle_market("houston"));

        assert_eq!(state.selected_markets(), &before);
    }

    #[test]
    fn test_toggle_prospect() {
        let mut state = SelectionState::new();
        assert!(state.toggle_prospect("p1"));
        assert!(state.toggle_prospect("p2"));
        assert!(!state.toggle_prospect("p1"));

        assert!(!state.is_prospect_selected("p1"));
        assert!(state.is_prospect_selected("p2"));
    }

    #[test]
    fn test_prospect_survives_market_deselection() {
        let mut state = SelectionState::new();
        state.toggle_market("houston");
        state.toggle_prospect("p1");
        state.toggle_market("houston");

        assert_eq!(state.market_count(), 0);
        assert!(state.is_prospect_selected("p1"));
    }

    #[test]
    fn test_negative_budget_clamps_to_zero() {
        let mut state = SelectionState::new();
        state.set_budget(-500.0);
        assert_eq!(state.monthly_budget(), 0.0);

        state.set_budget(12_500.0);
        assert_eq!(state.monthly_budget(), 12_500.0);
    }

    #[test]
    fn test_non_finite_budget_coerces_to_zero() {
        let mut state = SelectionState::new();
        state.set_budget(f64::NAN);
        assert_eq!(state.monthly_budget(), 0.0);

        state.set_budget(f64::INFINITY);
        assert_eq!(state.monthly_budget(), 0.0);
    }

    #[test]
    fn test_parse_budget() {
        assert_eq!(parse_budget("2500"), 2500.0);
        assert_eq!(parse_budget(" 7500.5 "), 7500.5);
        assert_eq!(parse_budget("-10"), 0.0);
        assert_eq!(parse_budget("ten thousand"), 0.0);
        assert_eq!(parse_budget(""), 0.0);
    }
}
