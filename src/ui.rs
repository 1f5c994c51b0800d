use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use market_scout::{
    navigation::{CampaignTab, Page, PageView, StepState},
    repository::{OutreachFilter, OutreachStatus},
    selection::{parse_budget, BUDGET_PRESETS},
    AllocationPlan, Command, PipelineController, PipelineStatus, Priority, ScoreTier,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{BarChart, Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap},
    Frame, Terminal,
};
use std::io;

/// Budget step for the +/- keys
const BUDGET_STEP: f64 = 500.0;

/// Minimum-match values cycled by the `m` key (0 = no filter)
const MIN_MATCH_STEPS: [u8; 5] = [0, 70, 80, 85, 90];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    /// Typing into the prospect search box
    Search,
    /// Typing a monthly budget
    Budget,
}

pub struct App {
    pub controller: PipelineController,
    pub state: TableState,
    pub input_mode: InputMode,
    pub input: String,
    pub repo_filter: OutreachFilter,
    pub show_welcome: bool,
    pub show_detail: bool,
}

impl App {
    pub fn new(controller: PipelineController, show_welcome: bool) -> Self {
        let mut app = Self {
            controller,
            state: TableState::default(),
            input_mode: InputMode::Normal,
            input: String::new(),
            repo_filter: OutreachFilter::default(),
            show_welcome,
            show_detail: false,
        };
        app.reset_cursor();
        app
    }

    pub fn page(&self) -> Page {
        self.controller.page()
    }

    /// Ids of the rows on the current page, in display order
    pub fn row_ids(&self) -> Vec<String> {
        let ctl = &self.controller;
        match ctl.page() {
            Page::Markets => ctl
                .dataset()
                .markets
                .ranked()
                .iter()
                .map(|m| m.id.clone())
                .collect(),
            Page::Prospects if ctl.page_view().is_ready() => ctl
                .filtered_prospects()
                .iter()
                .map(|p| p.id.clone())
                .collect(),
            Page::Campaign
                if ctl.page_view().is_ready() && ctl.campaign_tab() == CampaignTab::Outreach =>
            {
                ctl.selected_prospects().iter().map(|p| p.id.clone()).collect()
            }
            Page::Repository => ctl
                .dataset()
                .repository
                .filter_outreach(&self.repo_filter)
                .iter()
                .map(|o| o.id.clone())
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn highlighted_id(&self) -> Option<String> {
        let ids = self.row_ids();
        self.state.selected().and_then(|i| ids.get(i).cloned())
    }

    fn reset_cursor(&mut self) {
        if self.row_ids().is_empty() {
            self.state.select(None);
        } else {
            self.state.select(Some(0));
        }
    }

    /// Keep the cursor inside the list after it shrinks
    fn clamp_cursor(&mut self) {
        let len = self.row_ids().len();
        match self.state.selected() {
            _ if len == 0 => self.state.select(None),
            Some(i) if i >= len => self.state.select(Some(len - 1)),
            None => self.state.select(Some(0)),
            _ => {}
        }
    }

    pub fn navigate(&mut self, page: Page) {
        self.controller.dispatch(Command::Navigate(page));
        self.show_detail = false;
        self.reset_cursor();
    }

    pub fn next(&mut self) {
        let len = self.row_ids().len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.row_ids().len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }

    fn toggle_highlighted(&mut self) {
        let Some(id) = self.highlighted_id() else {
            return;
        };
        match self.page() {
            Page::Markets => self.controller.dispatch(Command::ToggleMarket(id)),
            Page::Prospects => self.controller.dispatch(Command::ToggleProspect(id)),
            _ => self.show_detail = !self.show_detail,
        }
    }

    fn set_budget(&mut self, value: f64) {
        self.controller.dispatch(Command::SetBudget(value));
    }

    /// Returns true when the app should quit
    pub fn handle_key(&mut self, code: KeyCode) -> bool {
        if self.show_welcome {
            self.show_welcome = false;
            return false;
        }

        match self.input_mode {
            InputMode::Search => {
                self.handle_search_key(code);
                return false;
            }
            InputMode::Budget => {
                self.handle_budget_key(code);
                return false;
            }
            InputMode::Normal => {}
        }

        match code {
            KeyCode::Char('q') => return true,
            KeyCode::Esc => {
                if !self.show_detail {
                    return true;
                }
                self.show_detail = false;
            }
            KeyCode::Tab => self.navigate(self.page().next()),
            KeyCode::BackTab => self.navigate(self.page().previous()),
            KeyCode::Char('n') => {
                if let Some(page) = self.page().next_phase() {
                    self.navigate(page);
                }
            }
            KeyCode::Char('b') => {
                let target = self.page().previous_phase().unwrap_or(Page::Home);
                self.navigate(target);
            }
            KeyCode::Char('r') => self.navigate(Page::Repository),
            KeyCode::Down | KeyCode::Char('j') => self.next(),
            KeyCode::Up | KeyCode::Char('k') => self.previous(),
            KeyCode::Enter if self.page() == Page::Home => self.navigate(Page::Markets),
            KeyCode::Enter if !self.controller.page_view().is_ready() => {
                if let Some(target) = self.controller.page_view().back_target() {
                    self.navigate(target);
                }
            }
            KeyCode::Enter | KeyCode::Char(' ') => self.toggle_highlighted(),
            other => self.handle_page_key(other),
        }
        false
    }

    fn handle_page_key(&mut self, code: KeyCode) {
        match (self.page(), code) {
            (Page::Prospects, KeyCode::Char('/')) => {
                self.input = self.controller.prospect_filter().search.clone();
                self.input_mode = InputMode::Search;
            }
            (Page::Prospects, KeyCode::Char('i')) => {
                let industries = self.controller.industries();
                let filter = self.controller.prospect_filter_mut();
                filter.industry = cycle(&industries, &filter.industry);
                self.clamp_cursor();
            }
            (Page::Prospects, KeyCode::Char('m')) => {
                let filter = self.controller.prospect_filter_mut();
                let idx = MIN_MATCH_STEPS
                    .iter()
                    .position(|m| *m == filter.min_match)
                    .map(|i| (i + 1) % MIN_MATCH_STEPS.len())
                    .unwrap_or(0);
                filter.min_match = MIN_MATCH_STEPS[idx];
                self.clamp_cursor();
            }
            (Page::Prospects, KeyCode::Char('c')) => {
                self.controller.prospect_filter_mut().clear();
                self.clamp_cursor();
            }
            (Page::Campaign, KeyCode::Char('t')) => {
                let tab = self.controller.campaign_tab().toggle();
                self.controller.set_campaign_tab(tab);
                self.show_detail = false;
                self.reset_cursor();
            }
            (Page::Campaign, KeyCode::Char('+') | KeyCode::Char('=')) => {
                let budget = self.controller.selection().monthly_budget();
                self.set_budget(budget + BUDGET_STEP);
            }
            (Page::Campaign, KeyCode::Char('-')) => {
                let budget = self.controller.selection().monthly_budget();
                self.set_budget(budget - BUDGET_STEP);
            }
            (Page::Campaign, KeyCode::Char(c @ '1'..='4')) => {
                let idx = c as usize - '1' as usize;
                if let Some(preset) = BUDGET_PRESETS.get(idx) {
                    self.set_budget(*preset);
                }
            }
            (Page::Campaign, KeyCode::Char('e')) => {
                self.input = format!("{}", self.controller.selection().monthly_budget());
                self.input_mode = InputMode::Budget;
            }
            (Page::Repository, KeyCode::Char('f')) => {
                let markets = self.controller.dataset().repository.outreach_markets();
                self.repo_filter.market = cycle(&markets, &self.repo_filter.market);
                self.clamp_cursor();
            }
            (Page::Repository, KeyCode::Char('s')) => {
                self.repo_filter.status = cycle(&OutreachStatus::ALL, &self.repo_filter.status);
                self.clamp_cursor();
            }
            (Page::Repository, KeyCode::Char('c')) => {
                self.repo_filter = OutreachFilter::default();
                self.clamp_cursor();
            }
            _ => {}
        }
    }

    fn handle_search_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Enter => self.input_mode = InputMode::Normal,
            KeyCode::Esc => {
                self.input.clear();
                self.input_mode = InputMode::Normal;
            }
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Char(c) => self.input.push(c),
            _ => return,
        }
        self.controller.prospect_filter_mut().search = self.input.clone();
        self.clamp_cursor();
    }

    fn handle_budget_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Enter => {
                let value = parse_budget(&self.input);
                self.set_budget(value);
                self.input.clear();
                self.input_mode = InputMode::Normal;
            }
            KeyCode::Esc => {
                self.input.clear();
                self.input_mode = InputMode::Normal;
            }
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Char(c) if c.is_ascii_digit() || c == '.' || c == '-' => self.input.push(c),
            _ => {}
        }
    }
}

/// Step through `options`; after the last one the filter switches off
fn cycle<T: Clone + PartialEq>(options: &[T], current: &Option<T>) -> Option<T> {
    match current {
        None => options.first().cloned(),
        Some(value) => options
            .iter()
            .position(|o| o == value)
            .and_then(|i| options.get(i + 1))
            .cloned(),
    }
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("Error: {:?}", err);
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if app.handle_key(key.code) {
                return Ok(());
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with navigation
            Constraint::Min(0),    // Content area
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);

    match app.page() {
        Page::Home => render_home(f, chunks[1]),
        Page::Markets => render_markets(f, chunks[1], app),
        Page::Prospects => render_prospects(f, chunks[1], app),
        Page::Campaign => render_campaign(f, chunks[1], app),
        Page::Repository => render_repository(f, chunks[1], app),
    }

    render_status_bar(f, chunks[2], app);

    if app.show_welcome {
        let area = f.size();
        render_welcome(f, area);
    }
}

// ============================================================================
// HEADER / STATUS BAR
// ============================================================================

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let current = app.page();
    let mut spans = vec![];

    match app.controller.stepper() {
        Some(steps) => {
            for (i, step) in steps.iter().enumerate() {
                if i > 0 {
                    spans.push(Span::raw(" ── "));
                }
                let style = match step.state {
                    StepState::Active => Style::default()
                        .fg(Color::Black)
                        .bg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                    StepState::Completed => Style::default().fg(Color::Green),
                    StepState::Upcoming => Style::default().fg(Color::DarkGray),
                };
                spans.push(Span::styled(format!(" {}. {} ", step.number, step.label), style));
                if let Some(badge) = &step.badge {
                    spans.push(Span::styled(format!("[{}]", badge), Style::default().fg(Color::Yellow)));
                }
            }
        }
        None => {
            for (i, page) in Page::ALL.iter().enumerate() {
                if i > 0 {
                    spans.push(Span::raw(" │ "));
                }
                let style = if *page == current {
                    Style::default()
                        .fg(Color::Black)
                        .bg(Color::Cyan)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::Gray)
                };
                spans.push(Span::styled(format!(" {} ", page.title()), style));
            }
        }
    }

    let header = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" 🌐 Market Scout "),
    );
    f.render_widget(header, area);
}

fn key_hint(spans: &mut Vec<Span<'static>>, key: &'static str, label: &'static str) {
    if !spans.is_empty() {
        spans.push(Span::raw(" | "));
    }
    spans.push(Span::styled(key, Style::default().fg(Color::Yellow)));
    spans.push(Span::raw(format!(" {}", label)));
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let mut spans: Vec<Span<'static>> = vec![];

    match app.input_mode {
        InputMode::Search => {
            spans.push(Span::styled(" Search: ", Style::default().fg(Color::Cyan)));
            spans.push(Span::raw(format!("{}▏", app.input)));
            key_hint(&mut spans, "Enter", "Done");
            key_hint(&mut spans, "Esc", "Clear");
        }
        InputMode::Budget => {
            spans.push(Span::styled(" Monthly budget: $", Style::default().fg(Color::Cyan)));
            spans.push(Span::raw(format!("{}▏", app.input)));
            key_hint(&mut spans, "Enter", "Apply");
            key_hint(&mut spans, "Esc", "Cancel");
        }
        InputMode::Normal => {
            match app.page() {
                Page::Home => key_hint(&mut spans, "Enter", "Start"),
                Page::Markets => {
                    key_hint(&mut spans, "Space", "Select market");
                    key_hint(&mut spans, "n", "Next");
                }
                Page::Prospects => {
                    key_hint(&mut spans, "Space", "Select");
                    key_hint(&mut spans, "/", "Search");
                    key_hint(&mut spans, "i", "Industry");
                    key_hint(&mut spans, "m", "Min match");
                    key_hint(&mut spans, "c", "Clear");
                }
                Page::Campaign => {
                    key_hint(&mut spans, "t", "Tab");
                    key_hint(&mut spans, "+/-", "Budget");
                    key_hint(&mut spans, "1-4", "Presets");
                    key_hint(&mut spans, "e", "Edit budget");
                }
                Page::Repository => {
                    key_hint(&mut spans, "f", "Market");
                    key_hint(&mut spans, "s", "Status");
                    key_hint(&mut spans, "Enter", "Preview");
                }
            }
            key_hint(&mut spans, "b", "Back");
            key_hint(&mut spans, "Tab", "Page");
            key_hint(&mut spans, "↑/↓", "Nav");
            spans.push(Span::raw(" | "));
            spans.push(Span::styled("q", Style::default().fg(Color::Red)));
            spans.push(Span::raw(" Quit"));
        }
    }

    let status_bar = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );
    f.render_widget(status_bar, area);
}

fn header_row(titles: &[&'static str]) -> Row<'static> {
    let cells = titles.iter().map(|h| {
        Cell::from(*h).style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
    });
    Row::new(cells).style(Style::default().bg(Color::DarkGray)).height(1)
}

fn bordered(title: String) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White))
        .title(title)
}

fn kpi_line(items: Vec<(&'static str, String)>) -> Line<'static> {
    let mut spans = vec![];
    for (label, value) in items {
        spans.push(Span::styled(format!("  {}: ", label), Style::default().fg(Color::Cyan)));
        spans.push(Span::styled(
            value,
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ));
    }
    Line::from(spans)
}

fn checkbox(selected: bool) -> Cell<'static> {
    if selected {
        Cell::from("[x]").style(Style::default().fg(Color::Green))
    } else {
        Cell::from("[ ]")
    }
}

// ============================================================================
// PAGES
// ============================================================================

fn render_home(f: &mut Frame, area: Rect) {
    let title = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    let content = vec![
        Line::from(""),
        Line::from(Span::styled("  Find markets. Find clients. Plan the campaign.", title)),
        Line::from(""),
        Line::from("  1. Scout Markets   - compare cities by opportunity score and pick targets"),
        Line::from("  2. Find Prospects  - businesses in the selected markets, ranked by match"),
        Line::from("  3. Plan Campaign   - split a monthly budget and draft outreach emails"),
        Line::from(""),
        Line::from(Span::styled(
            "  All figures come from a curated sample dataset.",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )),
        Line::from(""),
        Line::from(Span::styled("  Press Enter to start", Style::default().fg(Color::Yellow))),
    ];
    f.render_widget(Paragraph::new(content).block(bordered(" Home ".to_string())), area);
}

fn render_empty_state(f: &mut Frame, area: Rect, view: PageView) {
    let Some((title, body)) = view.prompt() else {
        return;
    };
    let back = view
        .back_target()
        .and_then(|p| p.phase_number())
        .map(|n| format!("  Press Enter to go to Phase {}", n))
        .unwrap_or_default();

    let content = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("  {}", title),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(format!("  {}", body)),
        Line::from(""),
        Line::from(Span::styled(back, Style::default().fg(Color::Cyan))),
    ];
    f.render_widget(
        Paragraph::new(content)
            .wrap(Wrap { trim: false })
            .block(bordered(format!(" {} ", title))),
        area,
    );
}

fn tier_color(tier: ScoreTier) -> Color {
    match tier {
        ScoreTier::Excellent => Color::Green,
        ScoreTier::Good => Color::Cyan,
        ScoreTier::Fair => Color::Yellow,
        ScoreTier::Weak => Color::Red,
    }
}

fn render_markets(f: &mut Frame, area: Rect, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    let overview = app.controller.dataset().markets.overview();
    let kpis = kpi_line(vec![
        ("Markets", overview.markets_analysed.to_string()),
        (
            "Top",
            overview
                .top_market
                .as_ref()
                .map(|m| m.display_name())
                .unwrap_or_else(|| "-".to_string()),
        ),
        ("Avg score", overview.average_score.to_string()),
        ("Grade A/B", overview.top_tier_count.to_string()),
        ("Selected", app.controller.selection().market_count().to_string()),
    ]);
    f.render_widget(Paragraph::new(kpis).block(bordered(" Overview ".to_string())), chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(chunks[1]);

    let ctl = &app.controller;
    let ranked = ctl.dataset().markets.ranked();
    let rows: Vec<Row> = ranked
        .iter()
        .map(|m| {
            Row::new(vec![
                checkbox(ctl.selection().is_market_selected(&m.id)),
                Cell::from(m.display_name()),
                Cell::from(m.opportunity_score.to_string()),
                Cell::from(m.grade.as_str()).style(Style::default().fg(tier_color(m.tier()))),
                Cell::from(m.business_density.to_string()),
                Cell::from(m.digital_maturity_gap.to_string()),
                Cell::from(m.agency_competition.to_string()),
                Cell::from(m.business_growth_rate.to_string()),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(4),
            Constraint::Length(18),
            Constraint::Length(6),
            Constraint::Length(6),
            Constraint::Length(8),
            Constraint::Length(6),
            Constraint::Length(8),
            Constraint::Length(7),
        ],
    )
    .header(header_row(&["", "Market", "Score", "Grade", "Density", "Gap", "Compet.", "Growth"]))
    .block(bordered(" 1. Scout Markets ".to_string()))
    .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
    .highlight_symbol("→ ");

    let detail = app
        .highlighted_id()
        .and_then(|id| app.controller.dataset().markets.find_by_id(&id).cloned());

    f.render_stateful_widget(table, body[0], &mut app.state);

    let content = match detail {
        Some(m) => {
            let mut lines = vec![
                Line::from(Span::styled(
                    format!("  {}  ({} / {})", m.display_name(), m.opportunity_score, m.grade.as_str()),
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                )),
                Line::from(""),
                Line::from(format!("  {}", m.ai_summary)),
                Line::from(""),
                Line::from(format!(
                    "  Businesses: {}  needing services: {} ({:.0}%)",
                    m.total_businesses,
                    m.businesses_needing_services,
                    m.service_need_ratio()
                )),
                Line::from(format!("  Avg digital spend: {}", format_money(m.avg_digital_spend as f64))),
                Line::from(format!("  Top verticals: {}", m.top_verticals.join(", "))),
                Line::from(""),
            ];
            lines.extend(m.pros.iter().map(|p| {
                Line::from(Span::styled(format!("  + {}", p), Style::default().fg(Color::Green)))
            }));
            lines.extend(m.cons.iter().map(|c| {
                Line::from(Span::styled(format!("  - {}", c), Style::default().fg(Color::Red)))
            }));
            lines
        }
        None => vec![Line::from("  No market highlighted")],
    };
    f.render_widget(
        Paragraph::new(content)
            .wrap(Wrap { trim: false })
            .block(bordered(" Market Details ".to_string())),
        body[1],
    );
}

fn status_color(status: PipelineStatus) -> Color {
    match status {
        PipelineStatus::New => Color::Cyan,
        PipelineStatus::Contacted => Color::Yellow,
        PipelineStatus::Qualified => Color::Magenta,
        PipelineStatus::Proposal => Color::Blue,
        PipelineStatus::Closed => Color::Green,
    }
}

fn render_prospects(f: &mut Frame, area: Rect, app: &mut App) {
    let view = app.controller.page_view();
    if !view.is_ready() {
        render_empty_state(f, area, view);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(0)])
        .split(area);

    let ctl = &app.controller;
    let summary = ctl.prospect_summary();
    let filter = ctl.prospect_filter();
    let header = vec![
        kpi_line(vec![
            ("Found", summary.found.to_string()),
            ("Pipeline value", format_money(summary.total_value as f64)),
            ("Avg match", format!("{}%", summary.avg_match)),
            ("High match", summary.high_match.to_string()),
            ("Selected", ctl.selection().prospect_count().to_string()),
        ]),
        Line::from(Span::styled(
            format!(
                "  Markets: {}   Search: \"{}\"   Industry: {}   Min match: {}",
                ctl.selected_market_names(),
                filter.search,
                filter.industry.as_deref().unwrap_or("All"),
                filter.min_match
            ),
            Style::default().fg(Color::DarkGray),
        )),
    ];
    f.render_widget(Paragraph::new(header).block(bordered(" Prospects ".to_string())), chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(62), Constraint::Percentage(38)])
        .split(chunks[1]);

    let prospects = ctl.filtered_prospects();
    let rows: Vec<Row> = prospects
        .iter()
        .map(|p| {
            let match_color = if p.is_high_match() { Color::Green } else { Color::White };
            Row::new(vec![
                checkbox(ctl.selection().is_prospect_selected(&p.id)),
                Cell::from(truncate(&p.company, 28)),
                Cell::from(truncate(&p.industry, 16)),
                Cell::from(truncate(&p.location, 16)),
                Cell::from(format!("{}%", p.match_score)).style(Style::default().fg(match_color)),
                Cell::from(p.digital_score.to_string()),
                Cell::from(format_money(p.estimated_project_value as f64)),
                Cell::from(p.status.as_str()).style(Style::default().fg(status_color(p.status))),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(4),
            Constraint::Length(28),
            Constraint::Length(16),
            Constraint::Length(16),
            Constraint::Length(6),
            Constraint::Length(7),
            Constraint::Length(9),
            Constraint::Length(10),
        ],
    )
    .header(header_row(&["", "Company", "Industry", "Location", "Match", "Digital", "Value", "Status"]))
    .block(bordered(" 2. Find Prospects ".to_string()))
    .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
    .highlight_symbol("→ ");

    let detail = app
        .highlighted_id()
        .and_then(|id| app.controller.dataset().prospects.find_by_id(&id).cloned());

    f.render_stateful_widget(table, body[0], &mut app.state);

    let content = match detail {
        Some(p) => {
            let (hits, total) = p.benchmark_hits();
            let mut lines = vec![
                Line::from(Span::styled(
                    format!("  {}", p.company),
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                )),
                Line::from(format!("  {} · {}", p.contact_name, p.contact_title)),
                Line::from(format!("  {} · {} employees · {}", p.website, p.employees, p.revenue)),
                Line::from(""),
                Line::from(Span::styled("  Digital gaps", Style::default().fg(Color::Yellow))),
            ];
            lines.extend(p.digital_gaps.iter().map(|g| Line::from(format!("   • {}", g))));
            lines.push(Line::from(Span::styled(
                "  Recommended services",
                Style::default().fg(Color::Yellow),
            )));
            lines.extend(p.recommended_services.iter().map(|s| Line::from(format!("   • {}", s))));
            if total > 0 {
                lines.push(Line::from(""));
                lines.push(Line::from(format!("  Benchmark: {}/{} criteria met", hits, total)));
            }
            if let Some(confidence) = p.ai_confidence {
                lines.push(Line::from(format!("  Confidence: {}%", confidence)));
            }
            lines
        }
        None => vec![Line::from("  No prospects match the current filters")],
    };
    f.render_widget(
        Paragraph::new(content)
            .wrap(Wrap { trim: false })
            .block(bordered(" Prospect Details ".to_string())),
        body[1],
    );
}

fn render_campaign(f: &mut Frame, area: Rect, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(area);

    let active = app.controller.campaign_tab();
    let tabs: Vec<Span> = [CampaignTab::AdSpend, CampaignTab::Outreach]
        .iter()
        .map(|tab| {
            let style = if *tab == active {
                Style::default().fg(Color::Black).bg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            Span::styled(format!(" {} ", tab.title()), style)
        })
        .collect();
    f.render_widget(Paragraph::new(Line::from(tabs)), chunks[0]);

    match active {
        CampaignTab::AdSpend => render_ad_spend(f, chunks[1], app),
        CampaignTab::Outreach => render_outreach(f, chunks[1], app),
    }
}

fn priority_color(priority: Priority) -> Color {
    match priority {
        Priority::High => Color::Green,
        Priority::Medium => Color::Yellow,
        Priority::Low => Color::DarkGray,
    }
}

fn render_ad_spend(f: &mut Frame, area: Rect, app: &App) {
    let plan = app.controller.ad_allocation();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(10),
            Constraint::Length(4),
            Constraint::Min(0),
        ])
        .split(area);

    let kpis = kpi_line(vec![
        ("Monthly budget", format_budget_k(plan.monthly_budget)),
        ("Est. leads", plan.total_leads.to_string()),
        ("Avg CPL", format_money(plan.avg_cpl as f64)),
        (
            "Top ROI",
            plan.top_roi
                .as_ref()
                .map(|t| format!("{} ({}%)", t.market_name, t.roi_projection))
                .unwrap_or_else(|| "-".to_string()),
        ),
        ("Unallocated", format_money(plan.unallocated)),
    ]);
    f.render_widget(Paragraph::new(kpis).block(bordered(" Campaign KPIs ".to_string())), chunks[0]);

    let middle = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(chunks[1]);

    let market_rows: Vec<Row> = plan
        .markets
        .iter()
        .map(|m| {
            Row::new(vec![
                Cell::from(m.short_name().to_string()),
                Cell::from(format!("{}%", m.dynamic_pct)),
                Cell::from(format_money(m.dynamic_budget as f64)),
                Cell::from(m.dynamic_leads.to_string()),
                Cell::from(format_money(m.cost_per_lead)),
                Cell::from(format!("{}%", m.roi_projection)),
            ])
        })
        .collect();
    let market_table = Table::new(
        market_rows,
        [
            Constraint::Length(14),
            Constraint::Length(6),
            Constraint::Length(10),
            Constraint::Length(7),
            Constraint::Length(7),
            Constraint::Length(7),
        ],
    )
    .header(header_row(&["Market", "Share", "Budget", "Leads", "CPL", "ROI"]))
    .block(bordered(" 3A. Allocation by Market ".to_string()));
    f.render_widget(market_table, middle[0]);

    let bars = plan.lead_bars();
    let bar_data: Vec<(&str, u64)> = bars.iter().map(|(name, leads)| (name.as_str(), *leads)).collect();
    let chart = BarChart::default()
        .block(bordered(" Leads by Market ".to_string()))
        .data(bar_data.as_slice())
        .bar_width(6)
        .bar_gap(1)
        .bar_style(Style::default().fg(Color::Cyan))
        .value_style(Style::default().fg(Color::Black).bg(Color::Cyan));
    f.render_widget(chart, middle[1]);

    render_roi_cards(f, chunks[2], &plan);

    let channel_rows: Vec<Row> = plan
        .channel_rows()
        .map(|(m, c)| {
            Row::new(vec![
                Cell::from(m.short_name().to_string()),
                Cell::from(c.channel.clone()),
                Cell::from(format!("{}%", c.allocation)),
                Cell::from(format_money(c.budget)),
                Cell::from(format_money(c.estimated_cpl)),
                Cell::from(c.leads.to_string()),
                Cell::from(c.priority.as_str()).style(Style::default().fg(priority_color(c.priority))),
            ])
        })
        .collect();
    let title = if plan.is_empty() {
        " Channel Breakdown (no ad plans for the selected markets) ".to_string()
    } else {
        " Channel Breakdown ".to_string()
    };
    let channel_table = Table::new(
        channel_rows,
        [
            Constraint::Length(14),
            Constraint::Length(22),
            Constraint::Length(6),
            Constraint::Length(9),
            Constraint::Length(7),
            Constraint::Length(6),
            Constraint::Length(8),
        ],
    )
    .header(header_row(&["Market", "Channel", "Share", "Budget", "CPL", "Leads", "Priority"]))
    .block(bordered(title));
    f.render_widget(channel_table, chunks[3]);
}

fn render_roi_cards(f: &mut Frame, area: Rect, plan: &AllocationPlan) {
    let cards = plan.roi_cards();
    if cards.is_empty() {
        f.render_widget(
            Paragraph::new("  Select markets in Phase 1 to project ROI")
                .style(Style::default().fg(Color::DarkGray))
                .block(bordered(" ROI Projection ".to_string())),
            area,
        );
        return;
    }

    let slots = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![Constraint::Ratio(1, cards.len() as u32); cards.len()])
        .split(area);
    for (card, slot) in cards.iter().zip(slots.iter()) {
        let lines = vec![
            Line::from(Span::styled(
                format!("{}%", card.roi_projection),
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            )),
            Line::from(format!(
                "{} · {} leads",
                format_money(card.dynamic_budget as f64),
                card.dynamic_leads
            )),
        ];
        f.render_widget(
            Paragraph::new(lines).block(bordered(format!(" {} ", card.short_name()))),
            *slot,
        );
    }
}

fn render_outreach(f: &mut Frame, area: Rect, app: &mut App) {
    let view = market_scout::navigation::outreach_view(app.controller.selection());
    if !view.is_ready() {
        render_empty_state(f, area, view);
        return;
    }

    let orphaned = app.controller.orphaned_prospects();
    let area = if orphaned.is_empty() {
        area
    } else {
        let split = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(0)])
            .split(area);
        let names: Vec<&str> = orphaned.iter().map(|p| p.company.as_str()).collect();
        f.render_widget(
            Paragraph::new(format!(
                "  ⚠ Outside the selected markets: {}",
                names.join(", ")
            ))
            .style(Style::default().fg(Color::Yellow)),
            split[0],
        );
        split[1]
    };

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(area);

    let messages = app.controller.outreach_messages();
    let rows: Vec<Row> = messages
        .iter()
        .map(|(p, _)| {
            Row::new(vec![
                Cell::from(truncate(&p.company, 26)),
                Cell::from(p.contact_name.clone()),
            ])
        })
        .collect();

    let email = app
        .state
        .selected()
        .and_then(|i| messages.get(i))
        .map(|(_, email)| email.clone())
        .unwrap_or_default();

    let table = Table::new(rows, [Constraint::Length(26), Constraint::Min(10)])
        .header(header_row(&["Company", "Contact"]))
        .block(bordered(format!(" 3B. Direct Outreach ({}) ", messages.len())))
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("→ ");
    f.render_stateful_widget(table, body[0], &mut app.state);

    f.render_widget(
        Paragraph::new(email)
            .wrap(Wrap { trim: false })
            .block(bordered(" Email Draft ".to_string())),
        body[1],
    );
}

fn render_repository(f: &mut Frame, area: Rect, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Percentage(55),
            Constraint::Min(0),
        ])
        .split(area);

    let log = &app.controller.dataset().repository;
    let outreach_stats = log.outreach_stats();
    let campaign_stats = log.campaign_stats();
    let header = vec![
        kpi_line(vec![
            ("Sent", outreach_stats.total_sent.to_string()),
            ("Opened", outreach_stats.opened.to_string()),
            ("Open rate", format!("{}%", outreach_stats.open_rate())),
            ("Replied", outreach_stats.replied.to_string()),
            ("Reply rate", format!("{}%", outreach_stats.reply_rate())),
            ("Meetings", outreach_stats.meetings.to_string()),
        ]),
        kpi_line(vec![
            ("Campaign budget", format_money(campaign_stats.total_budget)),
            ("Spend", format_money(campaign_stats.total_spend)),
            ("Leads", campaign_stats.total_leads.to_string()),
            ("Avg CPL", format_money(campaign_stats.avg_cpl as f64)),
        ]),
    ];
    f.render_widget(Paragraph::new(header).block(bordered(" Repository ".to_string())), chunks[0]);

    let entries = log.filter_outreach(&app.repo_filter);
    let rows: Vec<Row> = entries
        .iter()
        .map(|o| {
            Row::new(vec![
                Cell::from(o.date_sent.format("%Y-%m-%d").to_string()),
                Cell::from(truncate(&o.prospect_name, 28)),
                Cell::from(o.market.clone()),
                Cell::from(o.channel.as_str()),
                Cell::from(o.status.as_str()),
            ])
        })
        .collect();
    let preview = app
        .state
        .selected()
        .and_then(|i| entries.get(i))
        .map(|o| o.message_preview.clone());

    let filter_label = format!(
        " Outreach Log (market: {}, status: {}) ",
        app.repo_filter.market.as_deref().unwrap_or("all"),
        app.repo_filter.status.map(|s| s.as_str()).unwrap_or("all"),
    );
    let outreach_table = Table::new(
        rows,
        [
            Constraint::Length(11),
            Constraint::Length(28),
            Constraint::Length(14),
            Constraint::Length(9),
            Constraint::Length(15),
        ],
    )
    .header(header_row(&["Date", "Prospect", "Market", "Channel", "Status"]))
    .block(bordered(filter_label))
    .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
    .highlight_symbol("→ ");

    let campaign_rows: Vec<Row> = log
        .campaigns
        .iter()
        .map(|c| {
            Row::new(vec![
                Cell::from(truncate(&c.campaign_name, 30)),
                Cell::from(c.markets_targeted.join(", ")),
                Cell::from(format!("{} / {}", format_money(c.spend_to_date), format_money(c.budget))),
                Cell::from(format!("{:.0}%", c.spend_ratio())),
                Cell::from(c.leads_generated.to_string()),
                Cell::from(c.status.as_str()),
            ])
        })
        .collect();
    let campaign_table = Table::new(
        campaign_rows,
        [
            Constraint::Length(30),
            Constraint::Length(26),
            Constraint::Length(20),
            Constraint::Length(6),
            Constraint::Length(6),
            Constraint::Length(10),
        ],
    )
    .header(header_row(&["Campaign", "Markets", "Spend / Budget", "Used", "Leads", "Status"]))
    .block(bordered(" Campaign Log ".to_string()));

    if app.show_detail {
        let split = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(chunks[1]);
        f.render_stateful_widget(outreach_table, split[0], &mut app.state);
        f.render_widget(
            Paragraph::new(preview.unwrap_or_default())
                .wrap(Wrap { trim: false })
                .block(bordered(" Message Preview ".to_string())),
            split[1],
        );
    } else {
        f.render_stateful_widget(outreach_table, chunks[1], &mut app.state);
    }
    f.render_widget(campaign_table, chunks[2]);
}

fn render_welcome(f: &mut Frame, area: Rect) {
    let popup = centered_rect(60, 40, area);
    let content = vec![
        Line::from(""),
        Line::from(Span::styled(
            "  Welcome to Market Scout",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("  Pick target markets, review matching prospects, then plan"),
        Line::from("  the ad budget and outreach for the businesses you chose."),
        Line::from(""),
        Line::from(Span::styled("  Press any key to continue", Style::default().fg(Color::Yellow))),
    ];
    f.render_widget(Clear, popup);
    f.render_widget(
        Paragraph::new(content).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow))
                .title(" Welcome "),
        ),
        popup,
    );
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

// ============================================================================
// FORMATTING
// ============================================================================

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}

/// "$12,500" (rounded to whole dollars)
fn format_money(value: f64) -> String {
    let rounded = value.round() as i64;
    let digits = rounded.unsigned_abs().to_string();
    let mut grouped = String::new();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if rounded < 0 {
        format!("-${}", grouped)
    } else {
        format!("${}", grouped)
    }
}

/// "$5.0K"
fn format_budget_k(value: f64) -> String {
    format!("${:.1}K", value / 1000.0)
}
