// 🗄️ Repository - read-only history of outreach and campaigns
//
// These records describe what has already happened. They are independent of
// the live selection state and never change at runtime.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// ============================================================================
// OUTREACH LOG
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutreachChannel {
    LinkedIn,
    Email,
    Ad,
}

impl OutreachChannel {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutreachChannel::LinkedIn => "LinkedIn",
            OutreachChannel::Email => "Email",
            OutreachChannel::Ad => "Ad",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutreachStatus {
    Sent,
    Opened,
    Replied,
    #[serde(rename = "Meeting Booked")]
    MeetingBooked,
}

impl OutreachStatus {
    pub const ALL: [OutreachStatus; 4] = [
        OutreachStatus::Sent,
        OutreachStatus::Opened,
        OutreachStatus::Replied,
        OutreachStatus::MeetingBooked,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OutreachStatus::Sent => "Sent",
            OutreachStatus::Opened => "Opened",
            OutreachStatus::Replied => "Replied",
            OutreachStatus::MeetingBooked => "Meeting Booked",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
    }

    /// Each later status implies the earlier ones happened
    pub fn was_opened(&self) -> bool {
        !matches!(self, OutreachStatus::Sent)
    }

    pub fn got_reply(&self) -> bool {
        matches!(self, OutreachStatus::Replied | OutreachStatus::MeetingBooked)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutreachEntry {
    pub id: String,
    pub prospect_name: String,
    pub market: String,
    pub date_sent: NaiveDate,
    pub channel: OutreachChannel,
    pub message_preview: String,
    pub status: OutreachStatus,
}

// ============================================================================
// CAMPAIGN LOG
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CampaignStatus {
    Active,
    Paused,
    Completed,
}

impl CampaignStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CampaignStatus::Active => "Active",
            CampaignStatus::Paused => "Paused",
            CampaignStatus::Completed => "Completed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignEntry {
    pub id: String,
    pub campaign_name: String,
    pub markets_targeted: Vec<String>,
    pub budget: f64,
    pub spend_to_date: f64,
    pub leads_generated: u32,
    pub cost_per_lead: f64,
    pub status: CampaignStatus,
}

impl CampaignEntry {
    /// Spend as a percentage of budget
    pub fn spend_ratio(&self) -> f64 {
        if self.budget > 0.0 {
            self.spend_to_date / self.budget * 100.0
        } else {
            0.0
        }
    }
}

// ============================================================================
// STATS
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutreachStats {
    pub total_sent: usize,
    pub opened: usize,
    pub replied: usize,
    pub meetings: usize,
}

impl OutreachStats {
    /// round(opened / sent * 100), 0 for an empty log
    pub fn open_rate(&self) -> u32 {
        percent_of(self.opened, self.total_sent)
    }

    /// round(replied / sent * 100), 0 for an empty log
    pub fn reply_rate(&self) -> u32 {
        percent_of(self.replied, self.total_sent)
    }
}

fn percent_of(part: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (part as f64 / total as f64 * 100.0).round() as u32
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CampaignStats {
    pub total_budget: f64,
    pub total_spend: f64,
    pub total_leads: u32,
    /// round(total spend / total leads), 0 with no leads
    pub avg_cpl: u64,
}

/// Optional exact-match filters for the outreach log
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutreachFilter {
    pub market: Option<String>,
    pub status: Option<OutreachStatus>,
}

impl OutreachFilter {
    pub fn is_active(&self) -> bool {
        self.market.is_some() || self.status.is_some()
    }

    pub fn matches(&self, entry: &OutreachEntry) -> bool {
        if let Some(market) = &self.market {
            if &entry.market != market {
                return false;
            }
        }
        if let Some(status) = self.status {
            if entry.status != status {
                return false;
            }
        }
        true
    }
}

// ============================================================================
// REPOSITORY LOG
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RepositoryLog {
    #[serde(default)]
    pub outreach: Vec<OutreachEntry>,
    #[serde(default)]
    pub campaigns: Vec<CampaignEntry>,
}

impl RepositoryLog {
    pub fn outreach_stats(&self) -> OutreachStats {
        OutreachStats {
            total_sent: self.outreach.len(),
            opened: self.outreach.iter().filter(|o| o.status.was_opened()).count(),
            replied: self.outreach.iter().filter(|o| o.status.got_reply()).count(),
            meetings: self
                .outreach
                .iter()
                .filter(|o| o.status == OutreachStatus::MeetingBooked)
                .count(),
        }
    }

    pub fn campaign_stats(&self) -> CampaignStats {
        let total_budget = self.campaigns.iter().map(|c| c.budget).sum();
        let total_spend: f64 = self.campaigns.iter().map(|c| c.spend_to_date).sum();
        let total_leads: u32 = self.campaigns.iter().map(|c| c.leads_generated).sum();

        let avg_cpl = if total_leads > 0 {
            (total_spend / total_leads as f64).round() as u64
        } else {
            0
        };

        CampaignStats {
            total_budget,
            total_spend,
            total_leads,
            avg_cpl,
        }
    }

    /// Sorted, de-duplicated markets that appear in the outreach log
    pub fn outreach_markets(&self) -> Vec<String> {
        self.outreach
            .iter()
            .map(|o| o.market.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn filter_outreach(&self, filter: &OutreachFilter) -> Vec<&OutreachEntry> {
        self.outreach.iter().filter(|o| filter.matches(o)).collect()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, market: &str, status: OutreachStatus) -> OutreachEntry {
        OutreachEntry {
            id: id.to_string(),
            prospect_name: format!("Prospect {}", id),
            market: market.to_string(),
            date_sent: NaiveDate::from_ymd_opt(2026, 2, 10).unwrap(),
            channel: OutreachChannel::Email,
            message_preview: "Hi there".to_string(),
            status,
        }
    }

    fn campaign(id: &str, budget: f64, spend: f64, leads: u32) -> CampaignEntry {
        CampaignEntry {
            id: id.to_string(),
            campaign_name: format!("Campaign {}", id),
            markets_targeted: vec!["Houston".to_string()],
            budget,
            spend_to_date: spend,
            leads_generated: leads,
            cost_per_lead: if leads > 0 { spend / leads as f64 } else { 0.0 },
            status: CampaignStatus::Active,
        }
    }

    fn sample_log() -> RepositoryLog {
        RepositoryLog {
            outreach: vec![
                entry("o1", "Houston", OutreachStatus::MeetingBooked),
                entry("o2", "Houston", OutreachStatus::Replied),
                entry("o3", "Dallas", OutreachStatus::Opened),
                entry("o4", "Dallas", OutreachStatus::Sent),
                entry("o5", "Austin", OutreachStatus::Sent),
            ],
            campaigns: vec![
                campaign("c1", 8000.0, 5420.0, 34),
                campaign("c2", 4500.0, 4500.0, 18),
            ],
        }
    }

    #[test]
    fn test_outreach_funnel_stats() {
        let stats = sample_log().outreach_stats();
        assert_eq!(stats.total_sent, 5);
        assert_eq!(stats.opened, 3);
        assert_eq!(stats.replied, 2);
        assert_eq!(stats.meetings, 1);
        assert_eq!(stats.open_rate(), 60);
        assert_eq!(stats.reply_rate(), 40);
    }

    #[test]
    fn test_rates_round_and_handle_empty_log() {
        let stats = OutreachStats {
            total_sent: 3,
            opened: 2,
            replied: 1,
            meetings: 0,
        };
        assert_eq!(stats.open_rate(), 67);
        assert_eq!(stats.reply_rate(), 33);

        let empty = RepositoryLog::default().outreach_stats();
        assert_eq!(empty.total_sent, 0);
        assert_eq!(empty.open_rate(), 0);
        assert_eq!(empty.reply_rate(), 0);
    }

    #[test]
    fn test_campaign_stats() {
        let stats = sample_log().campaign_stats();
        assert_eq!(stats.total_budget, 12500.0);
        assert_eq!(stats.total_leads, 52);
        // (5420 + 4500) / 52 = 190.77
        assert_eq!(stats.avg_cpl, 191);
    }

    #[test]
    fn test_campaign_stats_without_leads() {
        let log = RepositoryLog {
            outreach: vec![],
            campaigns: vec![campaign("c1", 1000.0, 0.0, 0)],
        };
        assert_eq!(log.campaign_stats().avg_cpl, 0);
    }

    #[test]
    fn test_outreach_markets_sorted_unique() {
        assert_eq!(
            sample_log().outreach_markets(),
            vec!["Austin".to_string(), "Dallas".to_string(), "Houston".to_string()]
        );
    }

    #[test]
    fn test_filter_outreach() {
        let log = sample_log();

        let all = log.filter_outreach(&OutreachFilter::default());
        assert_eq!(all.len(), 5);

        let dallas = log.filter_outreach(&OutreachFilter {
            market: Some("Dallas".to_string()),
            status: None,
        });
        assert_eq!(dallas.len(), 2);

        let dallas_sent = log.filter_outreach(&OutreachFilter {
            market: Some("Dallas".to_string()),
            status: Some(OutreachStatus::Sent),
        });
        assert_eq!(dallas_sent.len(), 1);
        assert_eq!(dallas_sent[0].id, "o4");
    }

    #[test]
    fn test_status_parse_and_serde() {
        assert_eq!(OutreachStatus::parse("meeting booked"), Some(OutreachStatus::MeetingBooked));
        assert_eq!(OutreachStatus::parse("Opened"), Some(OutreachStatus::Opened));
        assert_eq!(OutreachStatus::parse("bounced"), None);

        let json = serde_json::to_string(&OutreachStatus::MeetingBooked).unwrap();
        assert_eq!(json, "\"Meeting Booked\"");
    }

    #[test]
    fn test_entry_deserializes_date() {
        let json = r#"{"id":"o1","prospectName":"Gulf Coast Family Medicine","market":"Houston",
            "dateSent":"2026-02-10","channel":"Email","messagePreview":"Hi","status":"Meeting Booked"}"#;
        let entry: OutreachEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.date_sent, NaiveDate::from_ymd_opt(2026, 2, 10).unwrap());
        assert_eq!(entry.status, OutreachStatus::MeetingBooked);
    }
}
