// 🧭 Navigation - phase state machine
//
// Home -> Phase 1 (markets) -> Phase 2 (prospects) -> Phase 3 (campaign),
// plus a Repository page reachable from anywhere. Every transition is an
// explicit user action and every page can be reached from every other page;
// the guards below only decide whether a page shows its normal view or an
// empty-state prompt.

use crate::selection::SelectionState;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Page {
    #[default]
    #[serde(rename = "home")]
    Home,
    #[serde(rename = "phase-1")]
    Markets,
    #[serde(rename = "phase-2")]
    Prospects,
    #[serde(rename = "phase-3")]
    Campaign,
    #[serde(rename = "repository")]
    Repository,
}

impl Page {
    pub const ALL: [Page; 5] = [
        Page::Home,
        Page::Markets,
        Page::Prospects,
        Page::Campaign,
        Page::Repository,
    ];

    pub const PHASES: [Page; 3] = [Page::Markets, Page::Prospects, Page::Campaign];

    /// Cyclic order used for tab-style navigation
    pub fn next(&self) -> Self {
        match self {
            Page::Home => Page::Markets,
            Page::Markets => Page::Prospects,
            Page::Prospects => Page::Campaign,
            Page::Campaign => Page::Repository,
            Page::Repository => Page::Home,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            Page::Home => Page::Repository,
            Page::Markets => Page::Home,
            Page::Prospects => Page::Markets,
            Page::Campaign => Page::Prospects,
            Page::Repository => Page::Campaign,
        }
    }

    /// Target of a phase page's "Next" button
    pub fn next_phase(&self) -> Option<Self> {
        match self {
            Page::Home => Some(Page::Markets),
            Page::Markets => Some(Page::Prospects),
            Page::Prospects => Some(Page::Campaign),
            Page::Campaign | Page::Repository => None,
        }
    }

    /// Target of a phase page's "Back" button
    pub fn previous_phase(&self) -> Option<Self> {
        match self {
            Page::Prospects => Some(Page::Markets),
            Page::Campaign => Some(Page::Prospects),
            Page::Home | Page::Markets | Page::Repository => None,
        }
    }

    pub fn id(&self) -> &'static str {
        match self {
            Page::Home => "home",
            Page::Markets => "phase-1",
            Page::Prospects => "phase-2",
            Page::Campaign => "phase-3",
            Page::Repository => "repository",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Page::Home => "Home",
            Page::Markets => "Market Scout",
            Page::Prospects => "Prospects",
            Page::Campaign => "Campaign",
            Page::Repository => "Repository",
        }
    }

    /// Label in the phase stepper
    pub fn step_label(&self) -> Option<&'static str> {
        match self {
            Page::Markets => Some("Scout Markets"),
            Page::Prospects => Some("Find Prospects"),
            Page::Campaign => Some("Plan Campaign"),
            Page::Home | Page::Repository => None,
        }
    }

    pub fn phase_number(&self) -> Option<usize> {
        Page::PHASES.iter().position(|p| p == self).map(|i| i + 1)
    }

    pub fn is_phase(&self) -> bool {
        self.phase_number().is_some()
    }

    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim().to_lowercase();
        Page::ALL.into_iter().find(|p| {
            p.id() == s
                || p.title().to_lowercase() == s
                || p.phase_number().map(|n| n.to_string()) == Some(s.clone())
        })
    }
}

// ============================================================================
// PHASE STEPPER
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepState {
    Active,
    Completed,
    Upcoming,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseStep {
    pub page: Page,
    pub number: usize,
    pub label: &'static str,
    pub state: StepState,
    pub badge: Option<String>,
}

/// Counts shown as badges on the stepper
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepCounts {
    pub selected_markets: usize,
    pub available_prospects: usize,
    pub selected_prospects: usize,
}

pub const STEP_DONE_BADGE: &str = "✓";

/// Stepper for the current page; `None` outside the three phases
pub fn phase_stepper(current: Page, counts: StepCounts) -> Option<Vec<PhaseStep>> {
    let current_idx = current.phase_number()?;

    let steps = Page::PHASES
        .iter()
        .map(|page| {
            let number = page.phase_number().unwrap_or_default();
            let state = if number == current_idx {
                StepState::Active
            } else if number < current_idx {
                StepState::Completed
            } else {
                StepState::Upcoming
            };

            let badge = match page {
                Page::Markets if counts.selected_markets > 0 => {
                    Some(counts.selected_markets.to_string())
                }
                Page::Prospects if counts.available_prospects > 0 => {
                    Some(counts.available_prospects.to_string())
                }
                Page::Campaign if counts.selected_prospects > 0 => Some(STEP_DONE_BADGE.to_string()),
                _ => None,
            };

            PhaseStep {
                page: *page,
                number,
                label: page.step_label().unwrap_or_default(),
                state,
                badge,
            }
        })
        .collect();

    Some(steps)
}

// ============================================================================
// GUARDS (empty states)
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageView {
    Ready,
    /// Prompt pointing back to Phase 1
    NoMarketsSelected,
    /// Prompt pointing back to Phase 2
    NoProspectsSelected,
}

impl PageView {
    pub fn is_ready(&self) -> bool {
        *self == PageView::Ready
    }

    pub fn prompt(&self) -> Option<(&'static str, &'static str)> {
        match self {
            PageView::Ready => None,
            PageView::NoMarketsSelected => Some((
                "No Markets Selected",
                "Start from Phase 1 to select markets, then Phase 2 to identify prospects.",
            )),
            PageView::NoProspectsSelected => Some((
                "No Prospects Selected",
                "Go to Phase 2 and select prospects to generate personalised outreach messages.",
            )),
        }
    }

    /// Page the empty-state button leads back to
    pub fn back_target(&self) -> Option<Page> {
        match self {
            PageView::Ready => None,
            PageView::NoMarketsSelected => Some(Page::Markets),
            PageView::NoProspectsSelected => Some(Page::Prospects),
        }
    }
}

/// Phase 3 sub-views
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CampaignTab {
    #[default]
    AdSpend,
    Outreach,
}

impl CampaignTab {
    pub fn toggle(&self) -> Self {
        match self {
            CampaignTab::AdSpend => CampaignTab::Outreach,
            CampaignTab::Outreach => CampaignTab::AdSpend,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            CampaignTab::AdSpend => "3A. Ad Spend Allocation",
            CampaignTab::Outreach => "3B. Direct Outreach",
        }
    }
}

/// Phase 2 needs at least one selected market
pub fn prospects_view(selection: &SelectionState) -> PageView {
    if selection.market_count() == 0 {
        PageView::NoMarketsSelected
    } else {
        PageView::Ready
    }
}

/// The outreach sub-view needs at least one selected prospect
pub fn outreach_view(selection: &SelectionState) -> PageView {
    if selection.prospect_count() == 0 {
        PageView::NoProspectsSelected
    } else {
        PageView::Ready
    }
}

/// Phase 3 by tab: ad spend renders for any market subset, empty included
pub fn campaign_view(selection: &SelectionState, tab: CampaignTab) -> PageView {
    match tab {
        CampaignTab::AdSpend => PageView::Ready,
        CampaignTab::Outreach => outreach_view(selection),
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_page_is_home() {
        assert_eq!(Page::default(), Page::Home);
    }

    #[test]
    fn test_cyclic_navigation_round_trips() {
        for page in Page::ALL {
            assert_eq!(page.next().previous(), page);
            assert_eq!(page.previous().next(), page);
        }
    }

    #[test]
    fn test_phase_flow_buttons() {
        assert_eq!(Page::Markets.next_phase(), Some(Page::Prospects));
        assert_eq!(Page::Prospects.next_phase(), Some(Page::Campaign));
        assert_eq!(Page::Campaign.next_phase(), None);
        assert_eq!(Page::Campaign.previous_phase(), Some(Page::Prospects));
        assert_eq!(Page::Prospects.previous_phase(), Some(Page::Markets));
        assert_eq!(Page::Repository.previous_phase(), None);
    }

    #[test]
    fn test_parse_page() {
        assert_eq!(Page::parse("phase-2"), Some(Page::Prospects));
        assert_eq!(Page::parse("Repository"), Some(Page::Repository));
        assert_eq!(Page::parse("3"), Some(Page::Campaign));
        assert_eq!(Page::parse("checkout"), None);
    }

    #[test]
    fn test_page_serde_uses_ids() {
        assert_eq!(serde_json::to_string(&Page::Campaign).unwrap(), "\"phase-3\"");
    }

    #[test]
    fn test_stepper_states_and_badges() {
        let steps = phase_stepper(
            Page::Prospects,
            StepCounts {
                selected_markets: 2,
                available_prospects: 5,
                selected_prospects: 0,
            },
        )
        .unwrap();

        assert_eq!(steps.len(), 3);
        assert_eq!(steps[0].state, StepState::Completed);
        assert_eq!(steps[1].state, StepState::Active);
        assert_eq!(steps[2].state, StepState::Upcoming);

        assert_eq!(steps[0].badge.as_deref(), Some("2"));
        assert_eq!(steps[1].badge.as_deref(), Some("5"));
        assert_eq!(steps[2].badge, None);
    }

    #[test]
    fn test_stepper_check_badge() {
        let steps = phase_stepper(
            Page::Campaign,
            StepCounts {
                selected_markets: 1,
                available_prospects: 2,
                selected_prospects: 1,
            },
        )
        .unwrap();
        assert_eq!(steps[2].badge.as_deref(), Some(STEP_DONE_BADGE));
    }

    #[test]
    fn test_stepper_hidden_outside_phases() {
        assert!(phase_stepper(Page::Home, StepCounts::default()).is_none());
        assert!(phase_stepper(Page::Repository, StepCounts::default()).is_none());
    }

    #[test]
    fn test_guards() {
        let mut selection = SelectionState::new();
        assert_eq!(prospects_view(&selection), PageView::NoMarketsSelected);
        assert_eq!(campaign_view(&selection, CampaignTab::AdSpend), PageView::Ready);
        assert_eq!(
            campaign_view(&selection, CampaignTab::Outreach),
            PageView::NoProspectsSelected
        );
        assert_eq!(outreach_view(&selection), PageView::NoProspectsSelected);
        assert_eq!(PageView::NoMarketsSelected.back_target(), Some(Page::Markets));

        selection.toggle_market("houston");
        assert!(prospects_view(&selection).is_ready());
        assert_eq!(outreach_view(&selection), PageView::NoProspectsSelected);

        selection.toggle_prospect("p1");
        assert!(outreach_view(&selection).is_ready());
    }
}
