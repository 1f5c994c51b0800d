// Market Scout - Core Library
// Exposes all modules for use in the CLI, the TUI and tests

pub mod entities;       // Market, Prospect, AdPlan + registries
pub mod fixtures;       // Embedded sample dataset
pub mod data_quality;   // Fixture integrity checks
pub mod repository;     // Outreach / campaign history
pub mod selection;      // Selection state container
pub mod navigation;     // Phase state machine + guards
pub mod availability;   // Market -> prospect derivation
pub mod allocation;     // Budget allocation derivation
pub mod outreach;       // Outreach email formatter
pub mod controller;     // Pipeline controller + command dispatch
pub mod store;          // Key/value persistence + welcome flag
pub mod export;         // CSV export
pub mod config;         // Environment configuration

// Re-export commonly used types
pub use entities::{
    AdPlan, AdPlanRegistry, ChannelRecommendation, CriterionMatch, Grade, Market,
    MarketOverview, MarketRegistry, PipelineStatus, Priority, Prospect, ProspectRegistry,
    ScoreTier,
};
pub use fixtures::Dataset;
pub use data_quality::{DataQualityEngine, QualityIssue, QualityReport, Severity, ValidationResult};
pub use repository::{
    CampaignEntry, CampaignStats, CampaignStatus, OutreachChannel, OutreachEntry, OutreachFilter,
    OutreachStats, OutreachStatus, RepositoryLog,
};
pub use selection::{SelectionState, BUDGET_PRESETS, DEFAULT_MONTHLY_BUDGET};
pub use navigation::{CampaignTab, Page, PageView, PhaseStep, StepCounts, StepState};
pub use availability::{available_prospects, selected_prospects, ProspectFilter, ProspectSummary};
pub use allocation::{
    compute_ad_allocation, static_overview, AllocationPlan, ChannelAllocation, MarketAllocation,
    StaticOverview, TopRoi,
};
pub use outreach::{format_outreach_email, OutreachTemplate};
pub use controller::{Command, PipelineController};
pub use store::{KeyValueStore, MemoryStore, SqliteStore, WelcomeFlag};
pub use config::Config;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
