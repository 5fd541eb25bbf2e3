//! Dashboard application logic for the terminal user interface.
//!
//! The `DashboardApp` holds one cached snapshot and recomputes the view from it
//! on every interaction. Only an explicit refresh goes back to the network.

use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{
        Bar, BarChart, BarGroup, Block, Borders, Cell, Clear, List, ListItem, ListState,
        Paragraph, Row, Table, TableState, Wrap,
    },
    Frame, Terminal,
};

use crate::aggregate::Table as ViewTable;
use crate::cmd::{join_selection, Context};
use crate::error::Result;
use crate::fields::{StatusLabel, Strategy};
use crate::filter::{Filters, ALL_PRODUCTS};
use crate::snapshot::{format_fetched_at, Snapshot};
use crate::tui::colors::{team_color, DARK_GREEN, DARK_PURPLE, DARK_RED, GOLD};
use crate::tui::enums::{Action, AppState, PickerKind};
use crate::tui::utils::centered_rect;
use crate::view::{compute_view, View};

/// Main application state for the dashboard.
pub struct DashboardApp {
    state: AppState,
    snapshot: Snapshot,
    strategy: Strategy,
    filters: Filters,
    view: View,
    table_state: TableState,
    picker_state: ListState,
    status_message: String,
    status_is_error: bool,
}

impl DashboardApp {
    /// Create a dashboard over a fetched snapshot.
    pub fn new(snapshot: Snapshot, strategy: Strategy) -> Self {
        let filters = Filters::default();
        let view = compute_view(&snapshot, strategy, &filters);
        let mut app = DashboardApp {
            state: AppState::Dashboard,
            snapshot,
            strategy,
            filters,
            view,
            table_state: TableState::default(),
            picker_state: ListState::default(),
            status_message: String::new(),
            status_is_error: false,
        };
        app.reset_selection();
        app
    }

    /// Recompute the view after any filter, strategy or data change.
    fn recompute(&mut self) {
        self.view = compute_view(&self.snapshot, self.strategy, &self.filters);
        self.reset_selection();
    }

    fn reset_selection(&mut self) {
        if self.view.table.is_empty() {
            self.table_state.select(None);
        } else {
            let keep = self.table_state.selected().unwrap_or(0);
            self.table_state.select(Some(keep.min(self.view.table.len() - 1)));
        }
    }

    /// Swap in a freshly fetched snapshot, dropping selections that no longer exist.
    pub fn replace_snapshot(&mut self, snapshot: Snapshot) {
        self.snapshot = snapshot;
        self.view = compute_view(&self.snapshot, self.strategy, &Filters::default());
        let options = self.view.options.clone();
        if let Some(p) = self.filters.active_product() {
            if !options.products.iter().any(|o| o == p) {
                self.filters.product = None;
            }
        }
        self.filters.buckets.retain(|b| options.buckets.contains(b));
        self.filters.teams.retain(|t| options.teams.contains(t));
        self.recompute();
    }

    fn set_status_message(&mut self, msg: String, is_error: bool) {
        self.status_message = msg;
        self.status_is_error = is_error;
    }

    fn clear_status_message(&mut self) {
        self.status_message.clear();
        self.status_is_error = false;
    }

    /// Step the product selector through "All" followed by every product.
    fn cycle_product(&mut self, forward: bool) {
        let choices = self.view.options.product_choices();
        let current = self.filters.product.as_deref().unwrap_or(ALL_PRODUCTS);
        let idx = choices.iter().position(|c| c == current).unwrap_or(0);
        let next = if forward {
            (idx + 1) % choices.len()
        } else {
            (idx + choices.len() - 1) % choices.len()
        };
        self.filters.product = if next == 0 { None } else { Some(choices[next].clone()) };
        self.recompute();
    }

    fn picker_values(&self, kind: PickerKind) -> &[String] {
        match kind {
            PickerKind::Bucket => &self.view.options.buckets,
            PickerKind::Team => &self.view.options.teams,
        }
    }

    fn picker_selection(&mut self, kind: PickerKind) -> &mut Vec<String> {
        match kind {
            PickerKind::Bucket => &mut self.filters.buckets,
            PickerKind::Team => &mut self.filters.teams,
        }
    }

    fn open_picker(&mut self, kind: PickerKind) {
        if self.picker_values(kind).is_empty() {
            self.set_status_message(format!("No {} to filter by", kind.title().to_lowercase()), false);
            return;
        }
        self.picker_state.select(Some(0));
        self.state = kind.state();
    }

    /// Toggle the highlighted picker value in or out of the filter.
    fn toggle_picker_value(&mut self, kind: PickerKind) {
        let Some(idx) = self.picker_state.selected() else { return };
        let Some(value) = self.picker_values(kind).get(idx).cloned() else { return };
        let selection = self.picker_selection(kind);
        if let Some(pos) = selection.iter().position(|v| *v == value) {
            selection.remove(pos);
        } else {
            selection.push(value);
        }
        self.recompute();
    }

    fn clear_filters(&mut self) {
        self.filters = Filters::default();
        self.recompute();
        self.set_status_message("Filters cleared".to_string(), false);
    }

    fn move_table_selection(&mut self, down: bool) {
        let len = self.view.table.len();
        if len == 0 {
            return;
        }
        let cur = self.table_state.selected().unwrap_or(0);
        let next = if down { (cur + 1).min(len - 1) } else { cur.saturating_sub(1) };
        self.table_state.select(Some(next));
    }

    fn move_picker_selection(&mut self, kind: PickerKind, down: bool) {
        let len = self.picker_values(kind).len();
        if len == 0 {
            return;
        }
        let cur = self.picker_state.selected().unwrap_or(0);
        let next = if down { (cur + 1).min(len - 1) } else { cur.saturating_sub(1) };
        self.picker_state.select(Some(next));
    }

    fn handle_dashboard_input(&mut self, key: KeyCode) -> Action {
        match key {
            KeyCode::Char('q') | KeyCode::Esc => return Action::Quit,
            KeyCode::Char('r') => return Action::Refresh,
            KeyCode::Char('s') => {
                self.strategy = self.strategy.toggled();
                self.table_state.select(Some(0));
                self.recompute();
                self.set_status_message(format!("{} view", self.strategy.name()), false);
            }
            KeyCode::Char('p') => self.cycle_product(true),
            KeyCode::Char('P') => self.cycle_product(false),
            KeyCode::Char('b') => self.open_picker(PickerKind::Bucket),
            KeyCode::Char('t') => self.open_picker(PickerKind::Team),
            KeyCode::Char('c') => self.clear_filters(),
            KeyCode::Char('h') | KeyCode::Char('?') => self.state = AppState::Help,
            KeyCode::Down | KeyCode::Char('j') => self.move_table_selection(true),
            KeyCode::Up | KeyCode::Char('k') => self.move_table_selection(false),
            _ => {}
        }
        Action::None
    }

    fn handle_picker_input(&mut self, kind: PickerKind, key: KeyCode) -> Action {
        match key {
            KeyCode::Down | KeyCode::Char('j') => self.move_picker_selection(kind, true),
            KeyCode::Up | KeyCode::Char('k') => self.move_picker_selection(kind, false),
            KeyCode::Char(' ') => self.toggle_picker_value(kind),
            KeyCode::Enter | KeyCode::Esc => self.state = AppState::Dashboard,
            _ => {}
        }
        Action::None
    }

    /// Apply a key press to the current screen.
    pub fn handle_key(&mut self, key: KeyCode) -> Action {
        self.clear_status_message();
        match self.state {
            AppState::Dashboard => self.handle_dashboard_input(key),
            AppState::BucketPicker => self.handle_picker_input(PickerKind::Bucket, key),
            AppState::TeamPicker => self.handle_picker_input(PickerKind::Team, key),
            AppState::Help => {
                self.state = AppState::Dashboard;
                Action::None
            }
        }
    }

    /// Render header with snapshot time and strategy.
    fn render_header(&self, f: &mut Frame, area: Rect) {
        let context_display = format!(
            "Strategy: {}  Plans: {}  Fetched: {}",
            self.strategy.name(),
            self.snapshot.plans.len(),
            format_fetched_at(self.snapshot.fetched_at_utc)
        );
        let header_text = vec![Line::from(vec![
            Span::styled("PRODUCT STATUS TRACKER", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("  "),
            Span::styled(
                context_display,
                Style::default().fg(Color::Cyan).add_modifier(Modifier::ITALIC),
            ),
        ])];
        let header = Paragraph::new(header_text)
            .block(Block::default().borders(Borders::ALL))
            .alignment(Alignment::Center);
        f.render_widget(header, area);
    }

    /// Render the three filter controls side by side.
    fn render_filters(&self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(34),
                Constraint::Percentage(33),
                Constraint::Percentage(33),
            ])
            .split(area);

        let product = self.filters.product.as_deref().unwrap_or(ALL_PRODUCTS);
        let controls = [
            ("Product [p/P]", product.to_string()),
            ("Buckets [b]", join_selection(&self.filters.buckets)),
            ("Teams [t]", join_selection(&self.filters.teams)),
        ];
        for (chunk, (title, value)) in chunks.iter().zip(controls) {
            let p = Paragraph::new(value)
                .block(Block::default().borders(Borders::ALL).title(title));
            f.render_widget(p, *chunk);
        }
    }

    fn status_style(label: &str) -> Style {
        if label == StatusLabel::InProgress.label() {
            Style::default().fg(GOLD)
        } else {
            Style::default().fg(Color::White)
        }
    }

    /// Render the filtered table for the active strategy.
    fn render_table(&mut self, f: &mut Frame, area: Rect) {
        let (headers, widths, rows): (Vec<&str>, Vec<Constraint>, Vec<Row>) = match &self.view.table {
            ViewTable::Flat(rows) => (
                vec!["Product", "Bucket", "Status", "Team", "Created", "Due"],
                vec![
                    Constraint::Min(20),
                    Constraint::Length(16),
                    Constraint::Length(16),
                    Constraint::Length(18),
                    Constraint::Length(11),
                    Constraint::Length(12),
                ],
                rows.iter()
                    .map(|r| {
                        Row::new(vec![
                            Cell::from(r.product.clone()),
                            Cell::from(r.bucket.clone()),
                            Cell::from(r.status.label()),
                            Cell::from(r.team.clone()),
                            Cell::from(r.created.clone().unwrap_or_default()),
                            Cell::from(r.due.clone()),
                        ])
                        .style(Self::status_style(r.status.label()))
                    })
                    .collect(),
            ),
            ViewTable::Grouped(rows) => (
                vec!["Product Name", "Buckets", "Statuses", "Team", "Links"],
                vec![
                    Constraint::Min(20),
                    Constraint::Percentage(25),
                    Constraint::Length(32),
                    Constraint::Percentage(20),
                    Constraint::Length(5),
                ],
                rows.iter()
                    .map(|r| {
                        let statuses = r.statuses_joined();
                        let style = Self::status_style(&statuses);
                        Row::new(vec![
                            Cell::from(r.product.clone()),
                            Cell::from(r.buckets_joined()),
                            Cell::from(statuses),
                            Cell::from(r.teams_joined()),
                            Cell::from(r.links.len().to_string()),
                        ])
                        .style(style)
                    })
                    .collect(),
            ),
        };

        let header = Row::new(
            headers
                .into_iter()
                .map(|h| Cell::from(h).style(Style::default().add_modifier(Modifier::BOLD))),
        )
        .style(Style::default().bg(DARK_GREEN).fg(Color::White))
        .height(1);

        let table = Table::new(rows, widths)
            .header(header)
            .block(Block::default().borders(Borders::ALL).title(format!(
                "Total Products: {}  Rows: {} - Press 'h' for help",
                self.view.summary.distinct_products,
                self.view.summary.row_count
            )))
            .row_highlight_style(Style::default().bg(Color::Gray).fg(Color::Black))
            .highlight_symbol(">> ");

        f.render_stateful_widget(table, area, &mut self.table_state);
    }

    /// Render team share as a horizontal bar chart, or a notice when empty.
    fn render_chart(&self, f: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title("Product Distribution by Team");

        if !self.view.summary.has_chart() {
            let p = Paragraph::new("No data to chart")
                .block(block)
                .alignment(Alignment::Center);
            f.render_widget(p, area);
            return;
        }

        let summary = &self.view.summary;
        let bars: Vec<Bar> = summary
            .ranked_teams()
            .into_iter()
            .enumerate()
            .map(|(rank, (team, count))| {
                Bar::default()
                    .label(Line::from(team.to_string()))
                    .value(count as u64)
                    .text_value(format!("{} ({:.0}%)", count, summary.share(count)))
                    .style(Style::default().fg(team_color(rank)))
            })
            .collect();

        let chart = BarChart::default()
            .block(block)
            .direction(Direction::Horizontal)
            .bar_width(1)
            .bar_gap(0)
            .data(BarGroup::default().bars(&bars));
        f.render_widget(chart, area);
    }

    fn render_picker(&mut self, f: &mut Frame, area: Rect, kind: PickerKind) {
        let area = centered_rect(50, 60, area);
        f.render_widget(Clear, area);

        let selected = match kind {
            PickerKind::Bucket => &self.filters.buckets,
            PickerKind::Team => &self.filters.teams,
        };
        let items: Vec<ListItem> = self
            .picker_values(kind)
            .iter()
            .map(|v| {
                let mark = if selected.contains(v) { "[x]" } else { "[ ]" };
                ListItem::new(format!("{} {}", mark, v))
            })
            .collect();

        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!("{} - Space toggle, Enter done", kind.title()))
                    .style(Style::default().bg(DARK_PURPLE)),
            )
            .highlight_style(Style::default().bg(Color::Gray).fg(Color::Black))
            .highlight_symbol(">> ");
        f.render_stateful_widget(list, area, &mut self.picker_state);
    }

    fn render_help(&self, f: &mut Frame, area: Rect) {
        let area = centered_rect(60, 60, area);
        f.render_widget(Clear, area);
        let text = vec![
            Line::from(Span::styled("Keys", Style::default().add_modifier(Modifier::BOLD))),
            Line::from(""),
            Line::from("s        Toggle flat / grouped view"),
            Line::from("p / P    Next / previous product"),
            Line::from("b        Pick buckets"),
            Line::from("t        Pick teams"),
            Line::from("c        Clear all filters"),
            Line::from("r        Refetch all plans"),
            Line::from("j/k ↑/↓  Move selection"),
            Line::from("q / Esc  Quit"),
            Line::from(""),
            Line::from("Press any key to return"),
        ];
        let p = Paragraph::new(text)
            .block(Block::default().borders(Borders::ALL).title("Help"))
            .wrap(Wrap { trim: true });
        f.render_widget(p, area);
    }

    /// Render the status bar at the bottom of the screen.
    fn render_status_bar(&self, f: &mut Frame, area: Rect) {
        let text = if !self.status_message.is_empty() {
            self.status_message.clone()
        } else {
            let filtered = if self.filters.is_empty() { "" } else { " (filtered)" };
            format!(
                "Rows: {}{} | s strategy | p product | b buckets | t teams | r refresh | q quit",
                self.view.table.len(),
                filtered
            )
        };
        let bg = if self.status_is_error { DARK_RED } else { DARK_GREEN };
        let status = Paragraph::new(text)
            .style(Style::default().bg(bg).fg(Color::White))
            .alignment(Alignment::Left);
        f.render_widget(status, area);
    }

    /// Main render function.
    fn render(&mut self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(f.area());

        self.render_header(f, chunks[0]);
        self.render_filters(f, chunks[1]);

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
            .split(chunks[2]);
        self.render_table(f, body[0]);
        self.render_chart(f, body[1]);

        match self.state {
            AppState::BucketPicker => self.render_picker(f, chunks[2], PickerKind::Bucket),
            AppState::TeamPicker => self.render_picker(f, chunks[2], PickerKind::Team),
            AppState::Help => self.render_help(f, chunks[2]),
            AppState::Dashboard => {}
        }

        self.render_status_bar(f, chunks[3]);
    }

    /// Main event loop. A refresh refetches through `ctx`; a failure keeps the old data.
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>, ctx: &Context) -> Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if !event::poll(Duration::from_millis(50))? {
                continue;
            }
            let Event::Key(key) = event::read()? else { continue };
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match self.handle_key(key.code) {
                Action::Quit => break,
                Action::Refresh => {
                    self.set_status_message("Fetching...".to_string(), false);
                    terminal.draw(|f| self.render(f))?;
                    match ctx.load_snapshot(true) {
                        Ok(snapshot) => {
                            self.replace_snapshot(snapshot);
                            self.set_status_message(
                                format!("Fetched {} plan(s)", self.snapshot.plans.len()),
                                false,
                            );
                        }
                        Err(e) => {
                            tracing::error!(error = %e, "refresh failed");
                            self.set_status_message(format!("Refresh failed: {}", e), true);
                        }
                    }
                }
                Action::None => {}
            }
        }
        Ok(())
    }
}
