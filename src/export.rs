// 📤 CSV Export - allocation channel table and repository logs

use crate::allocation::AllocationPlan;
use crate::repository::{CampaignEntry, OutreachEntry, RepositoryLog};
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

pub const OUTREACH_CSV: &str = "outreach.csv";
pub const CAMPAIGNS_CSV: &str = "campaigns.csv";

/// One row per (market, channel)
#[derive(Debug, Serialize)]
struct AllocationRow<'a> {
    market_id: &'a str,
    market: &'a str,
    market_pct: u32,
    market_budget: u64,
    market_leads: u64,
    channel: &'a str,
    channel_pct: f64,
    channel_budget: f64,
    estimated_cpl: f64,
    channel_leads: u64,
    priority: &'a str,
}

#[derive(Debug, Serialize)]
struct OutreachRow<'a> {
    id: &'a str,
    prospect: &'a str,
    market: &'a str,
    date_sent: String,
    channel: &'a str,
    status: &'a str,
    message_preview: &'a str,
}

impl<'a> From<&'a OutreachEntry> for OutreachRow<'a> {
    fn from(entry: &'a OutreachEntry) -> Self {
        OutreachRow {
            id: &entry.id,
            prospect: &entry.prospect_name,
            market: &entry.market,
            date_sent: entry.date_sent.format("%Y-%m-%d").to_string(),
            channel: entry.channel.as_str(),
            status: entry.status.as_str(),
            message_preview: &entry.message_preview,
        }
    }
}

#[derive(Debug, Serialize)]
struct CampaignRow<'a> {
    id: &'a str,
    campaign: &'a str,
    markets: String,
    budget: f64,
    spend_to_date: f64,
    leads: u32,
    cost_per_lead: f64,
    status: &'a str,
}

impl<'a> From<&'a CampaignEntry> for CampaignRow<'a> {
    fn from(entry: &'a CampaignEntry) -> Self {
        CampaignRow {
            id: &entry.id,
            campaign: &entry.campaign_name,
            markets: entry.markets_targeted.join("; "),
            budget: entry.budget,
            spend_to_date: entry.spend_to_date,
            leads: entry.leads_generated,
            cost_per_lead: entry.cost_per_lead,
            status: entry.status.as_str(),
        }
    }
}

pub fn write_allocation_csv<W: Write>(plan: &AllocationPlan, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for (market, channel) in plan.channel_rows() {
        wtr.serialize(AllocationRow {
            market_id: &market.market_id,
            market: &market.market_name,
            market_pct: market.dynamic_pct,
            market_budget: market.dynamic_budget,
            market_leads: market.dynamic_leads,
            channel: &channel.channel,
            channel_pct: channel.allocation,
            channel_budget: channel.budget,
            estimated_cpl: channel.estimated_cpl,
            channel_leads: channel.leads,
            priority: channel.priority.as_str(),
        })
        .context("Failed to write allocation row")?;
    }
    wtr.flush().context("Failed to flush allocation CSV")?;
    Ok(())
}

pub fn write_outreach_csv<'a, W, I>(entries: I, writer: W) -> Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'a OutreachEntry>,
{
    let mut wtr = csv::Writer::from_writer(writer);
    for entry in entries {
        wtr.serialize(OutreachRow::from(entry))
            .with_context(|| format!("Failed to write outreach row {}", entry.id))?;
    }
    wtr.flush().context("Failed to flush outreach CSV")?;
    Ok(())
}

pub fn write_campaigns_csv<'a, W, I>(entries: I, writer: W) -> Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'a CampaignEntry>,
{
    let mut wtr = csv::Writer::from_writer(writer);
    for entry in entries {
        wtr.serialize(CampaignRow::from(entry))
            .with_context(|| format!("Failed to write campaign row {}", entry.id))?;
    }
    wtr.flush().context("Failed to flush campaign CSV")?;
    Ok(())
}

/// Write the channel table of `plan` to `path`
pub fn export_allocation(plan: &AllocationPlan, path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    write_allocation_csv(plan, file)?;
    info!(path = %path.display(), markets = plan.markets.len(), "Exported allocation");
    Ok(())
}

/// Write the given outreach entries and all campaigns into `dir`
pub fn export_repository<'a, I>(
    outreach: I,
    log: &RepositoryLog,
    dir: &Path,
) -> Result<(PathBuf, PathBuf)>
where
    I: IntoIterator<Item = &'a OutreachEntry>,
{
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory {}", dir.display()))?;

    let outreach_path = dir.join(OUTREACH_CSV);
    let file = File::create(&outreach_path)
        .with_context(|| format!("Failed to create {}", outreach_path.display()))?;
    write_outreach_csv(outreach, file)?;

    let campaigns_path = dir.join(CAMPAIGNS_CSV);
    let file = File::create(&campaigns_path)
        .with_context(|| format!("Failed to create {}", campaigns_path.display()))?;
    write_campaigns_csv(&log.campaigns, file)?;

    info!(dir = %dir.display(), "Exported repository logs");
    Ok((outreach_path, campaigns_path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocation::compute_ad_allocation;
    use crate::entities::ad_plan::sample_plan;
    use crate::fixtures::Dataset;
    use std::collections::BTreeSet;
    use tempfile::TempDir;

    #[test]
    fn test_allocation_csv_rows() {
        let plans = vec![sample_plan("m1", 60.0, 100.0, 250.0), sample_plan("m2", 40.0, 200.0, 310.0)];
        let ids: BTreeSet<String> = ["m1".to_string(), "m2".to_string()].into();
        let plan = compute_ad_allocation(&plans, 5000.0, &ids);

        let mut out = Vec::new();
        write_allocation_csv(&plan, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 5);
        assert!(lines[0].starts_with("market_id,market,market_pct,market_budget"));
        assert!(lines[1].starts_with("m1,\"m1, TX\",60,3000,30,Google Search Ads,60.0,1800.0,100.0,18,high"));
    }

    #[test]
    fn test_empty_allocation_writes_nothing() {
        let plan = compute_ad_allocation(&[], 5000.0, &BTreeSet::new());
        let mut out = Vec::new();
        write_allocation_csv(&plan, &mut out).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_repository_export() {
        let dataset = Dataset::embedded().unwrap();
        let dir = TempDir::new().unwrap();
        let log = &dataset.repository;

        let (outreach, campaigns) =
            export_repository(&log.outreach, log, &dir.path().join("logs")).unwrap();

        let outreach_text = fs::read_to_string(outreach).unwrap();
        assert_eq!(outreach_text.lines().count(), log.outreach.len() + 1);
        assert!(outreach_text.contains("Meeting Booked"));

        let campaigns_text = fs::read_to_string(campaigns).unwrap();
        assert_eq!(campaigns_text.lines().count(), log.campaigns.len() + 1);
    }
}
