// 🧭 Pipeline Controller - owns one session of the three-phase pipeline
//
// The controller is the only owner of the selection state. Presentation code
// reads derived views from it and feeds user intent back as `Command`s.
// Derived views are recomputed on every call; nothing is cached.

use crate::allocation::{compute_ad_allocation, AllocationPlan};
use crate::availability::{self, ProspectFilter, ProspectSummary};
use crate::entities::Prospect;
use crate::fixtures::Dataset;
use crate::navigation::{self, CampaignTab, Page, PageView, PhaseStep, StepCounts};
use crate::outreach::OutreachTemplate;
use crate::selection::SelectionState;
use std::collections::BTreeSet;
use tracing::{debug, info};
use uuid::Uuid;

/// User intent, consumed synchronously by [`PipelineController::dispatch`]
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    ToggleMarket(String),
    ToggleProspect(String),
    SetBudget(f64),
    Navigate(Page),
}

#[derive(Debug, Clone)]
pub struct PipelineController {
    session_id: String,
    dataset: Dataset,
    selection: SelectionState,
    page: Page,
    campaign_tab: CampaignTab,
    prospect_filter: ProspectFilter,
    template: OutreachTemplate,
}

impl PipelineController {
    pub fn new(dataset: Dataset) -> Self {
        let session_id = Uuid::new_v4().to_string();
        info!(
            session = %session_id,
            markets = dataset.markets.count(),
            prospects = dataset.prospects.count(),
            "Session started"
        );

        PipelineController {
            session_id,
            dataset,
            selection: SelectionState::new(),
            page: Page::default(),
            campaign_tab: CampaignTab::default(),
            prospect_filter: ProspectFilter::default(),
            template: OutreachTemplate::default(),
        }
    }

    pub fn with_budget(mut self, budget: f64) -> Self {
        self.selection.set_budget(budget);
        self
    }

    pub fn with_template(mut self, template: OutreachTemplate) -> Self {
        self.template = template;
        self
    }

    // ------------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------------

    /// Apply one command. Total: unknown ids are stored and simply never match.
    pub fn dispatch(&mut self, command: Command) {
        debug!(session = %self.session_id, ?command, "Dispatch");
        match command {
            Command::ToggleMarket(id) => {
                self.selection.toggle_market(&id);
            }
            Command::ToggleProspect(id) => {
                self.selection.toggle_prospect(&id);
            }
            Command::SetBudget(value) => self.selection.set_budget(value),
            Command::Navigate(page) => self.navigate(page),
        }
    }

    pub fn toggle_market(&mut self, id: &str) {
        self.dispatch(Command::ToggleMarket(id.to_string()));
    }

    pub fn toggle_prospect(&mut self, id: &str) {
        self.dispatch(Command::ToggleProspect(id.to_string()));
    }

    pub fn set_budget(&mut self, value: f64) {
        self.dispatch(Command::SetBudget(value));
    }

    fn navigate(&mut self, page: Page) {
        if page != self.page {
            info!(from = self.page.id(), to = page.id(), "Navigate");
        }
        self.page = page;
    }

    pub fn set_campaign_tab(&mut self, tab: CampaignTab) {
        self.campaign_tab = tab;
    }

    pub fn prospect_filter_mut(&mut self) -> &mut ProspectFilter {
        &mut self.prospect_filter
    }

    // ------------------------------------------------------------------------
    // State
    // ------------------------------------------------------------------------

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn page(&self) -> Page {
        self.page
    }

    pub fn campaign_tab(&self) -> CampaignTab {
        self.campaign_tab
    }

    pub fn prospect_filter(&self) -> &ProspectFilter {
        &self.prospect_filter
    }

    pub fn template(&self) -> &OutreachTemplate {
        &self.template
    }

    // ------------------------------------------------------------------------
    // Derived views
    // ------------------------------------------------------------------------

    pub fn available_prospects(&self) -> Vec<&Prospect> {
        availability::available_prospects(
            self.dataset.prospects.all(),
            self.selection.selected_markets(),
        )
    }

    /// Available prospects narrowed by the toolbar filter
    pub fn filtered_prospects(&self) -> Vec<&Prospect> {
        self.prospect_filter.apply(&self.available_prospects())
    }

    pub fn prospect_summary(&self) -> ProspectSummary {
        availability::summarize(&self.filtered_prospects())
    }

    pub fn industries(&self) -> Vec<String> {
        availability::industries(&self.available_prospects())
    }

    pub fn selected_prospects(&self) -> Vec<&Prospect> {
        availability::selected_prospects(
            self.dataset.prospects.all(),
            self.selection.selected_prospects(),
        )
    }

    pub fn orphaned_prospects(&self) -> Vec<&Prospect> {
        availability::orphaned_selections(
            self.dataset.prospects.all(),
            self.selection.selected_markets(),
            self.selection.selected_prospects(),
        )
    }

    /// Allocation for an arbitrary budget and market set
    pub fn compute_ad_allocation(&self, budget: f64, market_ids: &BTreeSet<String>) -> AllocationPlan {
        compute_ad_allocation(self.dataset.ad_plans.all(), budget, market_ids)
    }

    /// Allocation for the current budget and selected markets
    pub fn ad_allocation(&self) -> AllocationPlan {
        self.compute_ad_allocation(
            self.selection.monthly_budget(),
            self.selection.selected_markets(),
        )
    }

    pub fn format_outreach_email(&self, prospect: &Prospect) -> String {
        self.template.render(prospect)
    }

    /// One rendered email per selected prospect, fixture order
    pub fn outreach_messages(&self) -> Vec<(&Prospect, String)> {
        self.selected_prospects()
            .into_iter()
            .map(|p| (p, self.template.render(p)))
            .collect()
    }

    pub fn selected_market_names(&self) -> String {
        self.dataset
            .markets
            .names_for(self.selection.selected_markets())
    }

    pub fn step_counts(&self) -> StepCounts {
        StepCounts {
            selected_markets: self.selection.market_count(),
            available_prospects: self.available_prospects().len(),
            selected_prospects: self.selection.prospect_count(),
        }
    }

    pub fn stepper(&self) -> Option<Vec<PhaseStep>> {
        navigation::phase_stepper(self.page, self.step_counts())
    }

    /// Guard for the current page
    pub fn page_view(&self) -> PageView {
        match self.page {
            Page::Prospects => navigation::prospects_view(&self.selection),
            Page::Campaign => navigation::campaign_view(&self.selection, self.campaign_tab),
            _ => PageView::Ready,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
