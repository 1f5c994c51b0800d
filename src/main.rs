// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use market_scout::navigation::prospects_view;
use market_scout::{
    export, static_overview, Command, Config, Dataset, OutreachFilter, OutreachStatus,
    PipelineController, Severity, VERSION,
};

#[derive(Parser)]
#[command(name = "market-scout", version)]
#[command(about = "Scout markets, find prospects and plan a campaign over a sample dataset", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive three-phase pipeline (default)
    Tui,
    /// Ranked markets with overview KPIs
    Markets,
    /// Prospects available in the given markets
    Prospects {
        #[arg(long = "market", required = true)]
        markets: Vec<String>,
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        industry: Option<String>,
        #[arg(long, default_value_t = 0)]
        min_match: u8,
    },
    /// Split a monthly budget across the given markets
    Plan {
        #[arg(long = "market")]
        markets: Vec<String>,
        #[arg(long, allow_negative_numbers = true)]
        budget: Option<f64>,
        /// Write the channel table to this CSV file
        #[arg(long)]
        csv: Option<PathBuf>,
        /// Show the fixture figures without reallocation
        #[arg(long = "static")]
        static_view: bool,
    },
    /// Draft outreach emails for the given prospects
    Outreach {
        #[arg(long = "prospect", required = true)]
        prospects: Vec<String>,
    },
    /// Outreach and campaign history
    Repository {
        #[arg(long)]
        market: Option<String>,
        #[arg(long)]
        status: Option<String>,
        /// Export the logs as CSV into this directory
        #[arg(long)]
        csv_dir: Option<PathBuf>,
    },
    /// Check fixture integrity
    Validate,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?;
    let command = cli.command.unwrap_or(Commands::Tui);

    init_tracing(&config, matches!(command, Commands::Tui))?;
    info!(version = VERSION, "market-scout starting");

    let dataset = Dataset::load(config.data_dir.as_deref())?;

    match command {
        Commands::Tui => run_ui_mode(&config, dataset),
        Commands::Markets => run_markets(&dataset),
        Commands::Prospects {
            markets,
            search,
            industry,
            min_match,
        } => {
            let mut ctl = controller(&config, dataset);
            for id in &markets {
                ctl.dispatch(Command::ToggleMarket(id.clone()));
            }
            let filter = ctl.prospect_filter_mut();
            filter.search = search.unwrap_or_default();
            filter.industry = industry;
            filter.min_match = min_match;
            run_prospects(&ctl)
        }
        Commands::Plan {
            markets,
            budget,
            csv,
            static_view,
        } => {
            let mut ctl = controller(&config, dataset);
            for id in &markets {
                ctl.dispatch(Command::ToggleMarket(id.clone()));
            }
            if let Some(budget) = budget {
                ctl.dispatch(Command::SetBudget(budget));
            }
            if static_view {
                run_static_overview(&ctl)
            } else {
                run_plan(&ctl, csv)
            }
        }
        Commands::Outreach { prospects } => {
            let mut ctl = controller(&config, dataset);
            for id in &prospects {
                ctl.dispatch(Command::ToggleProspect(id.clone()));
            }
            run_outreach(&ctl, &prospects)
        }
        Commands::Repository {
            market,
            status,
            csv_dir,
        } => {
            let status = match status {
                Some(s) => match OutreachStatus::parse(&s) {
                    Some(status) => Some(status),
                    None => bail!("Unknown outreach status: {}", s),
                },
                None => None,
            };
            run_repository(&dataset, OutreachFilter { market, status }, csv_dir)
        }
        Commands::Validate => run_validate(&dataset),
    }
}

fn init_tracing(config: &Config, interactive: bool) -> Result<()> {
    // Log lines would corrupt the alternate screen
    let filter = if interactive && config.log_file.is_none() {
        EnvFilter::new("off")
    } else {
        EnvFilter::new(&config.log_level)
    };
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    match &config.log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file: {}", path.display()))?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        None => builder.with_writer(io::stderr).init(),
    }
    Ok(())
}

fn controller(config: &Config, dataset: Dataset) -> PipelineController {
    PipelineController::new(dataset)
        .with_budget(config.initial_budget)
        .with_template(config.outreach_template())
}

fn run_markets(dataset: &Dataset) -> Result<()> {
    let overview = dataset.markets.overview();

    println!("🗺️  Phase 1: Market Scout");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Markets analysed: {}", overview.markets_analysed);
    if let Some(top) = &overview.top_market {
        println!("Top market:       {} ({})", top.display_name(), top.opportunity_score);
    }
    println!("Average score:    {}", overview.average_score);
    println!("Grade A/B:        {}", overview.top_tier_count);
    println!();

    for market in dataset.markets.ranked() {
        println!(
            "  {:<14} {:<3} {:>3}  {}  density {:>3}  gap {:>3}  competition {:>3}  growth {:>3}",
            market.id,
            market.state,
            market.opportunity_score,
            market.grade.as_str(),
            market.business_density,
            market.digital_maturity_gap,
            market.agency_competition,
            market.business_growth_rate,
        );
    }
    Ok(())
}

fn run_prospects(ctl: &PipelineController) -> Result<()> {
    if let Some((title, body)) = prospects_view(ctl.selection()).prompt() {
        println!("{}\n{}", title, body);
        return Ok(());
    }

    let prospects = ctl.filtered_prospects();
    let summary = ctl.prospect_summary();

    println!("👥 Phase 2: Prospects in {}", ctl.selected_market_names());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!(
        "Found: {}  Pipeline value: ${}  Avg match: {}%  High match: {}",
        summary.found, summary.total_value, summary.avg_match, summary.high_match
    );
    println!("Industries: {}", ctl.industries().join(", "));
    println!();

    for p in prospects {
        println!(
            "  {:<4} {:<34} {:<20} match {:>3}%  digital {:>3}  ${:<7} {}",
            p.id,
            p.company,
            p.industry,
            p.match_score,
            p.digital_score,
            p.estimated_project_value,
            p.status.as_str(),
        );
    }
    Ok(())
}

fn run_plan(ctl: &PipelineController, csv: Option<PathBuf>) -> Result<()> {
    let plan = ctl.ad_allocation();

    println!("💰 Phase 3A: Ad Spend Allocation");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Monthly budget: ${}", plan.monthly_budget);
    println!("Estimated leads: {}", plan.total_leads);
    println!("Average CPL: ${}", plan.avg_cpl);
    match &plan.top_roi {
        Some(top) => println!("Top ROI: {} ({}%)", top.market_name, top.roi_projection),
        None => println!("Top ROI: -"),
    }
    if plan.unallocated != 0.0 {
        println!("Unallocated: ${}", plan.unallocated);
    }

    if plan.is_empty() {
        println!("\nNo ad plans for the selected markets.");
    }

    for market in &plan.markets {
        println!(
            "\n  {} - {}% - ${} - {} leads (CPL ${}, ROI {}%)",
            market.market_name,
            market.dynamic_pct,
            market.dynamic_budget,
            market.dynamic_leads,
            market.cost_per_lead,
            market.roi_projection,
        );
        for channel in &market.channels {
            println!(
                "      {:<24} {:>5}%  ${:>8.0}  {:>4} leads  [{}]",
                channel.channel,
                channel.allocation,
                channel.budget,
                channel.leads,
                channel.priority.as_str(),
            );
        }
    }

    if let Some(path) = csv {
        export::export_allocation(&plan, &path)?;
        println!("\n✓ Channel table written to {}", path.display());
    }
    Ok(())
}

fn run_static_overview(ctl: &PipelineController) -> Result<()> {
    let overview = static_overview(
        ctl.dataset().ad_plans.all(),
        ctl.selection().monthly_budget(),
    );

    println!("📊 Portfolio Overview (fixture figures)");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Total budget: ${}", overview.monthly_budget);
    println!("Estimated leads: {}", overview.total_leads);
    println!("Average CPL: ${}", overview.avg_cpl);
    if let Some(top) = &overview.top_roi {
        println!("Top ROI: {} ({}%)", top.market_name, top.roi_projection);
    }
    println!();
    for (name, budget) in &overview.budgets {
        println!("  {:<20} ${:.0}", name, budget);
    }
    Ok(())
}

fn run_outreach(ctl: &PipelineController, requested: &[String]) -> Result<()> {
    for id in requested {
        if ctl.dataset().prospects.find_by_id(id).is_none() {
            warn!(prospect = %id, "Unknown prospect id");
            eprintln!("⚠️  Unknown prospect: {}", id);
        }
    }

    for (prospect, email) in ctl.outreach_messages() {
        println!("━━━ {} ({}) ━━━", prospect.company, prospect.contact_name);
        println!("{}\n", email);
    }
    Ok(())
}

fn run_repository(
    dataset: &Dataset,
    filter: OutreachFilter,
    csv_dir: Option<PathBuf>,
) -> Result<()> {
    let log = &dataset.repository;
    let outreach = log.outreach_stats();
    let campaigns = log.campaign_stats();

    println!("🗄️  Repository");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!(
        "Outreach: {} sent, {} opened, {} replied, {} meetings",
        outreach.total_sent, outreach.opened, outreach.replied, outreach.meetings
    );
    println!(
        "Open rate: {}%  Reply rate: {}%",
        outreach.open_rate(),
        outreach.reply_rate()
    );
    println!(
        "Campaigns: ${} budget, ${} spent, {} leads, avg CPL ${}",
        campaigns.total_budget, campaigns.total_spend, campaigns.total_leads, campaigns.avg_cpl
    );
    println!();

    let entries = log.filter_outreach(&filter);
    for entry in &entries {
        println!(
            "  {}  {:<32} {:<14} {:<8} {}",
            entry.date_sent,
            entry.prospect_name,
            entry.market,
            entry.channel.as_str(),
            entry.status.as_str(),
        );
    }
    println!();
    for campaign in &log.campaigns {
        println!(
            "  {:<34} ${}/{}  {} leads  {}",
            campaign.campaign_name,
            campaign.spend_to_date,
            campaign.budget,
            campaign.leads_generated,
            campaign.status.as_str(),
        );
    }

    if let Some(dir) = csv_dir {
        let (outreach_path, campaigns_path) =
            export::export_repository(entries.iter().copied(), log, &dir)?;
        println!("\n✓ Wrote {} and {}", outreach_path.display(), campaigns_path.display());
    }
    Ok(())
}

fn run_validate(dataset: &Dataset) -> Result<()> {
    let report = dataset.validate();

    println!("🔍 Fixture Quality Report");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("{}", report.summary());
    for issue in &report.issues {
        let icon = match issue.severity {
            Severity::Critical => "❌",
            Severity::Warning => "⚠️ ",
            Severity::Info => "ℹ️ ",
        };
        println!("  {} {}: {} ({})", icon, issue.field, issue.issue, issue.recommendation);
    }

    if report.has_critical_issues() {
        std::process::exit(1);
    }
    println!("✅ Fixtures are consistent");
    Ok(())
}

#[cfg(feature = "tui")]
fn run_ui_mode(config: &Config, dataset: Dataset) -> Result<()> {
    use market_scout::store::{KeyValueStore, MemoryStore, SqliteStore, WelcomeFlag};

    dataset.validate_strict()?;

    // The welcome flag is optional: fall back to memory if the DB can't be opened
    let mut store: Box<dyn KeyValueStore> = match SqliteStore::open(&config.state_db) {
        Ok(store) => Box::new(store),
        Err(err) => {
            warn!(error = %err, "State database unavailable, welcome flag not persisted");
            Box::new(MemoryStore::default())
        }
    };
    let show_welcome = WelcomeFlag::new(&config.app_id).check_and_mark(store.as_mut())?;

    let mut app = ui::App::new(controller(config, dataset), show_welcome);
    ui::run_ui(&mut app)?;

    println!("\n✅ Session closed");
    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_config: &Config, _dataset: Dataset) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or use a subcommand: market-scout --help");
    std::process::exit(1);
}
