// Entity Models - immutable fixture records
//
// Each entity has:
// - A stable string identity used as the foreign key between fixtures
// - Typed fields deserialized straight from the JSON fixture files
// - A read-only registry for lookups, kept in fixture order

pub mod market;
pub mod prospect;
pub mod ad_plan;

pub use market::{Grade, Market, MarketOverview, MarketRegistry, ScoreTier};
pub use prospect::{CriterionMatch, PipelineStatus, Prospect, ProspectRegistry, HIGH_MATCH_THRESHOLD};
pub use ad_plan::{relevant_plans, AdPlan, AdPlanRegistry, ChannelRecommendation, Priority};
