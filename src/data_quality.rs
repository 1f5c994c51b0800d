// ✅ Data Quality Engine - fixture invariants
//
// The fixtures are hand-authored, so nothing stops an edit from breaking a
// cross-record invariant. Every rule produces a ValidationResult; failures
// also produce a QualityIssue with a recommendation.

use crate::entities::{AdPlan, Grade, Market, Prospect};
use crate::fixtures::Dataset;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Tolerance for channel allocations summing to 100
const CHANNEL_TOTAL_TOLERANCE: f64 = 0.5;

// ============================================================================
// VALIDATION RESULT
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub passed: bool,
    pub rule_name: String,
    pub field: String,
    pub message: String,
    pub severity: Severity,
}

impl ValidationResult {
    pub fn pass(rule_name: &str, field: &str, message: &str) -> Self {
        ValidationResult {
            passed: true,
            rule_name: rule_name.to_string(),
            field: field.to_string(),
            message: message.to_string(),
            severity: Severity::Info,
        }
    }

    pub fn fail(rule_name: &str, field: &str, message: &str, severity: Severity) -> Self {
        ValidationResult {
            passed: false,
            rule_name: rule_name.to_string(),
            field: field.to_string(),
            message: message.to_string(),
            severity,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Critical, // Breaks a derivation or a cross-record invariant
    Warning,  // Derivations still work but numbers look off
    Info,
}

// ============================================================================
// QUALITY REPORT
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityIssue {
    pub severity: Severity,
    pub field: String,
    pub issue: String,
    pub recommendation: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QualityReport {
    pub overall_quality: f64,
    pub validations: Vec<ValidationResult>,
    pub issues: Vec<QualityIssue>,
    pub passed_count: usize,
    pub failed_count: usize,
}

impl QualityReport {
    pub fn summary(&self) -> String {
        format!(
            "Quality: {:.1}%, Checks: {} passed / {} failed, Issues: {} ({} critical)",
            self.overall_quality * 100.0,
            self.passed_count,
            self.failed_count,
            self.issues.len(),
            self.critical_issues().count()
        )
    }

    pub fn has_critical_issues(&self) -> bool {
        self.issues.iter().any(|i| i.severity == Severity::Critical)
    }

    pub fn critical_issues(&self) -> impl Iterator<Item = &QualityIssue> {
        self.issues.iter().filter(|i| i.severity == Severity::Critical)
    }

    fn record(&mut self, result: ValidationResult, recommendation: &str) {
        if !result.passed {
            self.issues.push(QualityIssue {
                severity: result.severity,
                field: result.field.clone(),
                issue: result.message.clone(),
                recommendation: recommendation.to_string(),
            });
        }
        self.validations.push(result);
    }

    fn finish(mut self) -> Self {
        self.passed_count = self.validations.iter().filter(|v| v.passed).count();
        self.failed_count = self.validations.len() - self.passed_count;
        self.overall_quality = if self.validations.is_empty() {
            1.0
        } else {
            self.passed_count as f64 / self.validations.len() as f64
        };
        self
    }
}

// ============================================================================
// DATA QUALITY ENGINE
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct DataQualityEngine;

impl DataQualityEngine {
    pub fn new() -> Self {
        DataQualityEngine
    }

    pub fn validate_dataset(&self, dataset: &Dataset) -> QualityReport {
        let mut report = QualityReport::default();
        let market_ids: HashSet<&str> = dataset.markets.all().iter().map(|m| m.id.as_str()).collect();

        // Rule 1: identifiers are unique per fixture table
        report.record(
            self.validate_unique_ids("markets", dataset.markets.all().iter().map(|m| m.id.as_str())),
            "Give every market a distinct id",
        );
        report.record(
            self.validate_unique_ids("prospects", dataset.prospects.all().iter().map(|p| p.id.as_str())),
            "Give every prospect a distinct id",
        );
        report.record(
            self.validate_unique_ids("ad_plans", dataset.ad_plans.all().iter().map(|p| p.market_id.as_str())),
            "Keep at most one ad plan per market",
        );

        for market in dataset.markets.all() {
            // Rule 2: grade follows the opportunity score
            report.record(
                self.validate_grade(market),
                "Recompute the grade from opportunityScore (>=80 A, >=70 B, >=60 C, else D)",
            );
            // Rule 3: scores stay on the 0-100 scale
            report.record(self.validate_market_scores(market), "Clamp scores to 0-100");
        }

        for prospect in dataset.prospects.all() {
            // Rule 4: every prospect points at an existing market
            report.record(
                self.validate_foreign_key("prospect", &prospect.id, &prospect.market_id, &market_ids),
                "Point marketId at an existing market",
            );
            report.record(self.validate_prospect_scores(prospect), "Clamp scores to 0-100");
        }

        for plan in dataset.ad_plans.all() {
            // Rule 5: ad plans point at existing markets
            report.record(
                self.validate_foreign_key("ad_plan", &plan.market_id, &plan.market_id, &market_ids),
                "Point marketId at an existing market",
            );
            // Rule 6: numbers used as divisors and weights
            report.record(
                self.validate_plan_numbers(plan),
                "Use a positive cost per lead and a non-negative weight",
            );
            // Rule 7: channel mix adds up
            report.record(
                self.validate_channel_mix(plan),
                "Make channel allocations sum to 100",
            );
        }

        report.finish()
    }

    fn validate_unique_ids<'a, I>(&self, table: &str, ids: I) -> ValidationResult
    where
        I: Iterator<Item = &'a str>,
    {
        let mut seen = HashSet::new();
        let duplicates: Vec<&str> = ids.filter(|id| !seen.insert(*id)).collect();

        if duplicates.is_empty() {
            ValidationResult::pass("unique_ids", table, "All ids are unique")
        } else {
            ValidationResult::fail(
                "unique_ids",
                table,
                &format!("Duplicate ids: {}", duplicates.join(", ")),
                Severity::Critical,
            )
        }
    }

    fn validate_grade(&self, market: &Market) -> ValidationResult {
        let expected = Grade::from_score(market.opportunity_score);
        let field = format!("markets.{}.grade", market.id);

        if market.grade == expected {
            ValidationResult::pass("grade_bucket", &field, "Grade matches score")
        } else {
            ValidationResult::fail(
                "grade_bucket",
                &field,
                &format!(
                    "Grade {} does not match score {} (expected {})",
                    market.grade.as_str(),
                    market.opportunity_score,
                    expected.as_str()
                ),
                Severity::Critical,
            )
        }
    }

    fn validate_market_scores(&self, market: &Market) -> ValidationResult {
        let field = format!("markets.{}.scores", market.id);
        let scores = [
            ("opportunityScore", market.opportunity_score),
            ("businessDensity", market.business_density),
            ("digitalMaturityGap", market.digital_maturity_gap),
            ("agencyCompetition", market.agency_competition),
            ("businessGrowthRate", market.business_growth_rate),
        ];
        validate_score_range(&field, &scores)
    }

    fn validate_prospect_scores(&self, prospect: &Prospect) -> ValidationResult {
        let field = format!("prospects.{}.scores", prospect.id);
        let mut scores = vec![
            ("digitalScore", prospect.digital_score),
            ("matchScore", prospect.match_score),
        ];
        if let Some(confidence) = prospect.ai_confidence {
            scores.push(("aiConfidence", confidence));
        }
        validate_score_range(&field, &scores)
    }

    fn validate_foreign_key(
        &self,
        table: &str,
        id: &str,
        market_id: &str,
        market_ids: &HashSet<&str>,
    ) -> ValidationResult {
        let field = format!("{}s.{}.marketId", table, id);
        if market_ids.contains(market_id) {
            ValidationResult::pass("market_fk", &field, "References an existing market")
        } else {
            ValidationResult::fail(
                "market_fk",
                &field,
                &format!("Unknown market '{}'", market_id),
                Severity::Critical,
            )
        }
    }

    fn validate_plan_numbers(&self, plan: &AdPlan) -> ValidationResult {
        let field = format!("ad_plans.{}", plan.market_id);

        if !(plan.budget_allocation >= 0.0) {
            return ValidationResult::fail(
                "plan_numbers",
                &field,
                &format!("Negative budget weight {}", plan.budget_allocation),
                Severity::Critical,
            );
        }
        if !(plan.cost_per_lead > 0.0) {
            return ValidationResult::fail(
                "plan_numbers",
                &field,
                "Cost per lead must be positive (zero yields zero leads)",
                Severity::Warning,
            );
        }
        if let Some(ch) = plan.channels.iter().find(|c| !(c.estimated_cpl > 0.0)) {
            return ValidationResult::fail(
                "plan_numbers",
                &field,
                &format!("Channel '{}' has a non-positive CPL", ch.channel),
                Severity::Warning,
            );
        }
        ValidationResult::pass("plan_numbers", &field, "Weights and CPLs are usable")
    }

    fn validate_channel_mix(&self, plan: &AdPlan) -> ValidationResult {
        let field = format!("ad_plans.{}.channels", plan.market_id);
        if plan.channels.is_empty() {
            return ValidationResult::pass("channel_mix", &field, "No channel breakdown");
        }

        let total = plan.channel_allocation_total();
        if (total - 100.0).abs() <= CHANNEL_TOTAL_TOLERANCE {
            ValidationResult::pass("channel_mix", &field, "Channel allocations sum to 100")
        } else {
            ValidationResult::fail(
                "channel_mix",
                &field,
                &format!("Channel allocations sum to {}", total),
                Severity::Warning,
            )
        }
    }
}

fn validate_score_range(field: &str, scores: &[(&str, u8)]) -> ValidationResult {
    let out_of_range: Vec<String> = scores
        .iter()
        .filter(|(_, v)| *v > 100)
        .map(|(name, v)| format!("{}={}", name, v))
        .collect();

    if out_of_range.is_empty() {
        ValidationResult::pass("score_range", field, "Scores within 0-100")
    } else {
        ValidationResult::fail(
            "score_range",
            field,
            &format!("Out of range: {}", out_of_range.join(", ")),
            Severity::Critical,
        )
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::ad_plan::sample_plan;
    use crate::entities::market::sample_market;
    use crate::entities::prospect::sample_prospect;
    use crate::repository::RepositoryLog;

    fn valid_dataset() -> Dataset {
        Dataset::new(
            vec![sample_market("houston", 88), sample_market("dallas", 72)],
            vec![
                sample_prospect("p1", "houston", 90),
                sample_prospect("p2", "dallas", 80),
            ],
            vec![
                sample_plan("houston", 60.0, 100.0, 300.0),
                sample_plan("dallas", 40.0, 200.0, 250.0),
            ],
            RepositoryLog::default(),
        )
    }

    #[test]
    fn test_valid_dataset_passes() {
        let report = DataQualityEngine::new().validate_dataset(&valid_dataset());
        assert!(!report.has_critical_issues(), "{}", report.summary());
        assert_eq!(report.failed_count, 0);
        assert_eq!(report.overall_quality, 1.0);
    }

    #[test]
    fn test_detects_inconsistent_grade() {
        let mut market = sample_market("houston", 88);
        market.grade = Grade::C;
        let dataset = Dataset::new(vec![market], vec![], vec![], RepositoryLog::default());

        let report = DataQualityEngine::new().validate_dataset(&dataset);
        assert!(report.has_critical_issues());
        assert!(report.issues.iter().any(|i| i.field == "markets.houston.grade"));
    }

    #[test]
    fn test_detects_dangling_market_reference() {
        let mut dataset = valid_dataset();
        dataset.prospects = crate::entities::ProspectRegistry::new(vec![sample_prospect("p9", "atlantis", 70)]);

        let report = DataQualityEngine::new().validate_dataset(&dataset);
        assert!(report.has_critical_issues());
        assert!(report.issues.iter().any(|i| i.issue.contains("atlantis")));
    }

    #[test]
    fn test_detects_duplicate_ids() {
        let dataset = Dataset::new(
            vec![sample_market("houston", 88), sample_market("houston", 88)],
            vec![],
            vec![],
            RepositoryLog::default(),
        );

        let report = DataQualityEngine::new().validate_dataset(&dataset);
        assert!(report.issues.iter().any(|i| i.issue.contains("Duplicate ids: houston")));
    }

    #[test]
    fn test_zero_cpl_is_a_warning() {
        let mut dataset = valid_dataset();
        let mut plan = sample_plan("houston", 60.0, 100.0, 300.0);
        plan.cost_per_lead = 0.0;
        dataset.ad_plans = crate::entities::AdPlanRegistry::new(vec![plan]);

        let report = DataQualityEngine::new().validate_dataset(&dataset);
        assert!(!report.has_critical_issues());
        assert!(report
            .issues
            .iter()
            .any(|i| i.severity == Severity::Warning && i.field == "ad_plans.houston"));
    }

    #[test]
    fn test_channel_mix_warning() {
        let mut dataset = valid_dataset();
        let mut plan = sample_plan("dallas", 40.0, 200.0, 250.0);
        plan.channels[0].allocation = 10.0;
        dataset.ad_plans = crate::entities::AdPlanRegistry::new(vec![plan]);

        let report = DataQualityEngine::new().validate_dataset(&dataset);
        let issue = report
            .issues
            .iter()
            .find(|i| i.field == "ad_plans.dallas.channels")
            .unwrap();
        assert_eq!(issue.severity, Severity::Warning);
    }

    #[test]
    fn test_out_of_range_score() {
        let dataset = Dataset::new(
            vec![],
            vec![sample_prospect("p1", "houston", 120)],
            vec![],
            RepositoryLog::default(),
        );

        let report = DataQualityEngine::new().validate_dataset(&dataset);
        assert!(report.issues.iter().any(|i| i.issue.contains("matchScore=120")));
    }
}
