//! Ratatui-based terminal dashboard.
//!
//! Four tabs (overview, spot prices, supply & demand, import flows) render the
//! same pipeline views the report subcommands print. Keys cycle the window,
//! frequency, dataset, country, and year parameters without leaving the
//! terminal; `r` re-reads the CSV files so a fresh `crude fetch` shows up
//! without a restart.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{Datelike, NaiveDate};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph},
    Terminal,
};

use crate::app::pipeline::{
    self, DashboardData, FlowsParams, OverviewParams, SpotParams, SupplyDemandParams,
};
use crate::config::{Rgb, Theme};
use crate::domain::{Dataset, DerivedSeries};
use crate::error::AppError;

mod chart;

use chart::{ChartSeries, LineChart};

/// Start the TUI.
///
/// Data is loaded before the terminal enters raw mode so a missing data
/// directory fails with a plain error message instead of a garbled screen.
pub fn run(data_dir: &Path, theme: Theme) -> Result<(), AppError> {
    let data = DashboardData::load(data_dir)?;

    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(data_dir.to_path_buf(), data, theme);
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(4, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(4, format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tab {
    Overview,
    Spot,
    Supply,
    Flows,
}

impl Tab {
    const ALL: [Tab; 4] = [Tab::Overview, Tab::Spot, Tab::Supply, Tab::Flows];

    fn title(self) -> &'static str {
        match self {
            Tab::Overview => "Overview",
            Tab::Spot => "Spot",
            Tab::Supply => "Supply & Demand",
            Tab::Flows => "Flows",
        }
    }

    fn next(self) -> Tab {
        let idx = Self::ALL.iter().position(|t| *t == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

struct App {
    data_dir: PathBuf,
    theme: Theme,
    data: DashboardData,
    tab: Tab,
    spot_params: SpotParams,
    supply_params: SupplyDemandParams,
    flows_params: FlowsParams,
    overview_params: OverviewParams,
    overview: pipeline::OverviewView,
    spot: Option<pipeline::SpotView>,
    supply: Option<pipeline::SupplyDemandView>,
    flows: pipeline::FlowsView,
    status: String,
}

impl App {
    fn new(data_dir: PathBuf, data: DashboardData, theme: Theme) -> Self {
        let spot_params = SpotParams::default();
        let supply_params = SupplyDemandParams::default();
        let flows_params = FlowsParams::default();
        let overview_params = OverviewParams::default();

        let overview = pipeline::overview_view(&data, &overview_params);
        let flows = pipeline::flows_view(&data, &flows_params);
        let spot = pipeline::spot_view(&data, &spot_params).ok();
        let supply = pipeline::supply_demand_view(&data, &supply_params).ok();
        let status = format!("Loaded data from {}", data_dir.display());

        Self {
            data_dir,
            theme,
            data,
            tab: Tab::Overview,
            spot_params,
            supply_params,
            flows_params,
            overview_params,
            overview,
            spot,
            supply,
            flows,
            status,
        }
    }

    fn event_loop<B: ratatui::backend::Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
    ) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(4, format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns true when the app should quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Tab => self.tab = self.tab.next(),
            KeyCode::Char('1') => self.tab = Tab::Overview,
            KeyCode::Char('2') => self.tab = Tab::Spot,
            KeyCode::Char('3') => self.tab = Tab::Supply,
            KeyCode::Char('4') => self.tab = Tab::Flows,
            KeyCode::Char('w') => match self.tab {
                Tab::Spot => {
                    self.spot_params.window = self.spot_params.window.next();
                    self.refresh_views();
                    self.status = format!("window: {}", self.spot_params.window.label());
                }
                Tab::Supply => {
                    self.supply_params.window = self.supply_params.window.next();
                    self.refresh_views();
                    self.status = format!("window: {}", self.supply_params.window.label());
                }
                _ => {}
            },
            KeyCode::Char('f') => {
                if self.tab == Tab::Spot {
                    self.spot_params.frequency = self.spot_params.frequency.next();
                    self.refresh_views();
                    self.status = format!("frequency: {}", self.spot_params.frequency.label());
                }
            }
            KeyCode::Char('m') => {
                if self.tab == Tab::Supply {
                    self.supply_params.dataset = next_dataset(self.supply_params.dataset);
                    self.refresh_views();
                    self.status =
                        format!("dataset: {}", self.supply_params.dataset.display_name());
                }
            }
            KeyCode::Char('c') => {
                if self.tab == Tab::Overview {
                    self.cycle_country();
                }
            }
            KeyCode::Char('y') => {
                if self.tab == Tab::Flows {
                    self.cycle_year();
                }
            }
            KeyCode::Char('+') => match self.tab {
                Tab::Spot => self.adjust_mean_window(1),
                Tab::Supply => self.adjust_trailing(3),
                _ => {}
            },
            KeyCode::Char('-') => match self.tab {
                Tab::Spot => self.adjust_mean_window(-1),
                Tab::Supply => self.adjust_trailing(-3),
                _ => {}
            },
            KeyCode::Char('r') => self.reload(),
            KeyCode::Char('d') => self.write_health(),
            _ => {}
        }
        false
    }

    /// Recompute all tab views from the current data and parameters.
    ///
    /// The fallible views keep their previous content on error; the status
    /// line carries the message instead of tearing the screen down.
    fn refresh_views(&mut self) {
        self.overview = pipeline::overview_view(&self.data, &self.overview_params);
        self.flows = pipeline::flows_view(&self.data, &self.flows_params);
        match pipeline::spot_view(&self.data, &self.spot_params) {
            Ok(view) => self.spot = Some(view),
            Err(err) => self.status = format!("Spot view failed: {err}"),
        }
        match pipeline::supply_demand_view(&self.data, &self.supply_params) {
            Ok(view) => self.supply = Some(view),
            Err(err) => self.status = format!("Supply view failed: {err}"),
        }
    }

    fn cycle_country(&mut self) {
        let countries = self.data.production.multi.entities();
        if countries.is_empty() {
            self.status = "No production data.".to_string();
            return;
        }
        let idx = countries
            .iter()
            .position(|c| *c == self.overview_params.country)
            .map(|i| (i + 1) % countries.len())
            .unwrap_or(0);
        self.overview_params.country = countries[idx].clone();
        self.refresh_views();
        self.status = format!("country: {}", self.overview_params.country);
    }

    fn cycle_year(&mut self) {
        let years = self.flows.years.clone();
        if years.is_empty() {
            self.status = "No import data.".to_string();
            return;
        }
        let idx = self
            .flows
            .year
            .and_then(|y| years.iter().position(|v| *v == y))
            .map(|i| (i + 1) % years.len())
            .unwrap_or(0);
        let year = years[idx];
        self.flows_params.year = Some(year);
        self.refresh_views();
        self.status = format!("year: {year}");
    }

    fn adjust_mean_window(&mut self, delta: i32) {
        let next = if delta >= 0 {
            self.spot_params.mean_window.saturating_add(5)
        } else {
            self.spot_params.mean_window.saturating_sub(5)
        };
        self.spot_params.mean_window = next.clamp(2, 120);
        self.refresh_views();
        self.status = format!("MA window: {}", self.spot_params.mean_window);
    }

    fn adjust_trailing(&mut self, delta: i64) {
        let months = i64::from(self.supply_params.trailing_months) + delta;
        self.supply_params.trailing_months = months.clamp(3, 120) as u32;
        self.refresh_views();
        self.status = format!("trailing months: {}", self.supply_params.trailing_months);
    }

    fn reload(&mut self) {
        match DashboardData::load(&self.data_dir) {
            Ok(data) => {
                self.data = data;
                self.refresh_views();
                self.status = format!("Reloaded data from {}", self.data_dir.display());
            }
            Err(err) => {
                self.status = format!("Reload failed: {err}");
            }
        }
    }

    fn write_health(&mut self) {
        match crate::debug::write_health_bundle(Path::new("debug"), &self.data) {
            Ok(path) => self.status = format!("Wrote health bundle: {}", path.display()),
            Err(err) => self.status = format!("Health write failed: {err}"),
        }
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5),
                Constraint::Min(0),
                Constraint::Length(3),
            ])
            .split(size);

        self.draw_header(frame, chunks[0]);
        match self.tab {
            Tab::Overview => self.draw_overview(frame, chunks[1]),
            Tab::Spot => self.draw_spot(frame, chunks[1]),
            Tab::Supply => self.draw_supply(frame, chunks[1]),
            Tab::Flows => self.draw_flows(frame, chunks[1]),
        }
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(vec![
            Span::styled(
                "crude",
                Style::default()
                    .fg(self.theme.primary.to_tui())
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" — EIA crude-oil market dashboard"),
        ]));

        let mut tabs: Vec<Span> = Vec::new();
        for (i, tab) in Tab::ALL.iter().enumerate() {
            if i > 0 {
                tabs.push(Span::raw("  "));
            }
            let label = format!("[{}] {}", i + 1, tab.title());
            let style = if *tab == self.tab {
                Style::default()
                    .fg(self.theme.accent1.to_tui())
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            tabs.push(Span::styled(label, style));
        }
        lines.push(Line::from(tabs));

        lines.push(Line::from(Span::styled(
            format!(
                "data: {} | row issues: {}",
                self.data_dir.display(),
                self.data.issue_count()
            ),
            Style::default().fg(Color::Gray),
        )));

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_overview(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(area);

        let supply_lines: Vec<Line> = self.overview.supply.iter().map(metric_line).collect();
        let left = Paragraph::new(Text::from(supply_lines)).block(
            Block::default()
                .title(format!("Supply & demand — {}", self.overview.country))
                .borders(Borders::ALL),
        );
        frame.render_widget(left, chunks[0]);

        let spot_lines: Vec<Line> = self.overview.spot.iter().map(metric_line).collect();
        let right = Paragraph::new(Text::from(spot_lines))
            .block(Block::default().title("Spot prices").borders(Borders::ALL));
        frame.render_widget(right, chunks[1]);
    }

    fn draw_spot(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(6)])
            .split(area);

        let title = Line::from(vec![
            Span::raw(format!(
                "Spot prices ($/bbl) — {} {} — ",
                self.spot_params.window.label(),
                self.spot_params.frequency.label()
            )),
            Span::styled("Brent", Style::default().fg(self.theme.accent1.to_tui())),
            Span::raw(" / "),
            Span::styled("WTI", Style::default().fg(self.theme.accent2.to_tui())),
            Span::raw(" / "),
            Span::styled(
                format!("MA{}", self.spot_params.mean_window),
                Style::default().fg(self.theme.primary.to_tui()),
            ),
        ]);
        let block = Block::default().title(title).borders(Borders::ALL);
        let inner = block.inner(chunks[0]);
        frame.render_widget(block, chunks[0]);
        frame.render_widget(Clear, inner);

        let Some(view) = &self.spot else {
            self.render_empty(frame, inner, "Spot view unavailable (see status).");
            let p = Paragraph::new("").block(Block::default().title("KPIs").borders(Borders::ALL));
            frame.render_widget(p, chunks[1]);
            return;
        };

        let series = spot_chart_series(view, &self.theme);
        match series_bounds(&series) {
            Some((x_bounds, y_bounds)) => {
                let widget = LineChart {
                    series: &series,
                    x_bounds,
                    y_bounds,
                    x_label: "date",
                    y_label: "$/bbl",
                    fmt_x: fmt_axis_date,
                    fmt_y: fmt_axis_value,
                    axis_color: self.theme.text.to_plotters(),
                };
                frame.render_widget(widget, inner);
            }
            None => self.render_empty(frame, inner, "No data in the selected window."),
        }

        let kpi_lines: Vec<Line> = view
            .kpis
            .iter()
            .map(|kpi| {
                Line::from(format!(
                    "{:<18} last {:>9}  chg {:>9}  high {:>9}  low {:>9}  vol {:>7}",
                    kpi.label,
                    fmt_value(kpi.last),
                    fmt_change(kpi.change),
                    fmt_value(kpi.high),
                    fmt_value(kpi.low),
                    fmt_value(kpi.vol),
                ))
            })
            .collect();
        let p = Paragraph::new(Text::from(kpi_lines))
            .block(Block::default().title("KPIs").borders(Borders::ALL));
        frame.render_widget(p, chunks[1]);
    }

    fn draw_supply(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(11)])
            .split(area);

        let Some(view) = &self.supply else {
            let block = Block::default()
                .title("Supply & demand")
                .borders(Borders::ALL);
            let inner = block.inner(chunks[0]);
            frame.render_widget(block, chunks[0]);
            self.render_empty(frame, inner, "Supply view unavailable (see status).");
            return;
        };

        let palette = self.palette();
        let entities = view.series.entities();
        let mut title_spans: Vec<Span> = vec![Span::raw(format!(
            "{} ({}) — {} — ",
            view.dataset.display_name(),
            view.dataset.unit(),
            self.supply_params.window.label()
        ))];
        for (i, entity) in entities.iter().enumerate() {
            if i > 0 {
                title_spans.push(Span::raw(" / "));
            }
            title_spans.push(Span::styled(
                entity.clone(),
                Style::default().fg(palette[i % palette.len()].to_tui()),
            ));
        }
        let block = Block::default()
            .title(Line::from(title_spans))
            .borders(Borders::ALL);
        let inner = block.inner(chunks[0]);
        frame.render_widget(block, chunks[0]);
        frame.render_widget(Clear, inner);

        let series = supply_chart_series(view, &palette);
        match series_bounds(&series) {
            Some((x_bounds, y_bounds)) => {
                let widget = LineChart {
                    series: &series,
                    x_bounds,
                    y_bounds,
                    x_label: "date",
                    y_label: view.dataset.unit(),
                    fmt_x: fmt_axis_date,
                    fmt_y: fmt_axis_value,
                    axis_color: self.theme.text.to_plotters(),
                };
                frame.render_widget(widget, inner);
            }
            None => self.render_empty(frame, inner, "No data in the selected window."),
        }

        let body = match &view.ranking {
            Some(ranking) => {
                let rows: Vec<(String, f64)> = ranking
                    .iter()
                    .take(8)
                    .map(|r| (r.entity.clone(), r.mean))
                    .collect();
                crate::report::format_bars(&rows, 30)
            }
            None => "No data in the trailing window.\n".to_string(),
        };
        let p = Paragraph::new(body).block(
            Block::default()
                .title(format!(
                    "Trailing {}-month mean ({})",
                    self.supply_params.trailing_months,
                    view.dataset.unit()
                ))
                .borders(Borders::ALL),
        );
        frame.render_widget(p, chunks[1]);
    }

    fn draw_flows(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(6), Constraint::Min(0)])
            .split(area);

        let view = &self.flows;
        let mut lines: Vec<Line> = Vec::new();
        match view.year {
            Some(year) => {
                let years: Vec<String> = view.years.iter().map(|y| y.to_string()).collect();
                lines.push(Line::from(format!(
                    "Year: {year} (available: {})",
                    years.join(", ")
                )));
                if let Some(top) = &view.top {
                    lines.push(Line::from(format!(
                        "Top origin   : {} ({:.0} million barrels)",
                        top.origin,
                        top.quantity / 1000.0
                    )));
                }
                if let Some(second) = &view.second {
                    lines.push(Line::from(format!(
                        "Second origin: {} ({:.0} million barrels)",
                        second.origin,
                        second.quantity / 1000.0
                    )));
                }
                lines.push(Line::from(format!(
                    "{} origins flow into {}",
                    view.graph.edges.len(),
                    crate::series::DEFAULT_DESTINATION
                )));
            }
            None => lines.push(Line::from("No import data.")),
        }
        let p = Paragraph::new(Text::from(lines))
            .block(Block::default().title("US import flows").borders(Borders::ALL));
        frame.render_widget(p, chunks[0]);

        let bars = if view.totals.is_empty() {
            "No shipments recorded for this selection.\n".to_string()
        } else {
            let rows: Vec<(String, f64)> = view
                .totals
                .iter()
                .take(12)
                .map(|t| (t.origin.clone(), t.quantity))
                .collect();
            crate::report::format_bars(&rows, 30)
        };
        let p = Paragraph::new(bars).block(
            Block::default()
                .title("Imports by origin (kbbl)")
                .borders(Borders::ALL),
        );
        frame.render_widget(p, chunks[1]);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let keys = match self.tab {
            Tab::Overview => "c country",
            Tab::Spot => "w window  f frequency  +/- MA",
            Tab::Supply => "w window  m dataset  +/- months",
            Tab::Flows => "y year",
        };
        let help = format!("Tab/1-4 tabs  {keys}  r reload  d health  q quit");
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(
                &self.status,
                Style::default().fg(self.theme.accent1.to_tui()),
            ),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn render_empty(&self, frame: &mut ratatui::Frame<'_>, area: Rect, message: &str) {
        let p = Paragraph::new(message.to_string()).style(Style::default().fg(Color::Yellow));
        frame.render_widget(p, area);
    }

    fn palette(&self) -> [Rgb; 4] {
        [
            self.theme.accent1,
            self.theme.accent2,
            self.theme.primary,
            self.theme.text,
        ]
    }
}

fn metric_line(kpi: &pipeline::MetricKpi) -> Line<'static> {
    Line::from(format!(
        "{:<24} {:>10} {:<6} {:>9}  {}",
        kpi.label,
        fmt_value(kpi.value),
        kpi.unit,
        fmt_change(kpi.change),
        fmt_period(kpi.period),
    ))
}

/// Supply tab cycles through the three supply/demand datasets only.
fn next_dataset(cur: Dataset) -> Dataset {
    match cur {
        Dataset::Production => Dataset::Consumption,
        Dataset::Consumption => Dataset::Stocks,
        Dataset::Stocks => Dataset::Production,
        Dataset::SpotPrices | Dataset::ImportFlows => Dataset::Production,
    }
}

/// Build chart series for the spot tab: both legs plus the Brent rolling mean.
fn spot_chart_series(view: &pipeline::SpotView, theme: &Theme) -> Vec<ChartSeries> {
    let mean_points: Vec<(f64, f64)> = view
        .brent
        .points
        .iter()
        .filter_map(|p| p.rolling_mean.map(|v| (day_number(p.period), v)))
        .collect();

    vec![
        ChartSeries {
            color: theme.accent1.to_plotters(),
            points: value_points(&view.brent),
        },
        ChartSeries {
            color: theme.accent2.to_plotters(),
            points: value_points(&view.wti),
        },
        ChartSeries {
            color: theme.primary.to_plotters(),
            points: mean_points,
        },
    ]
}

/// One colored line per country, in the alphabetical entity order.
fn supply_chart_series(view: &pipeline::SupplyDemandView, palette: &[Rgb]) -> Vec<ChartSeries> {
    let mut out = Vec::new();
    for (i, entity) in view.series.entities().iter().enumerate() {
        let Some(series) = view.series.get(entity) else {
            continue;
        };
        let points: Vec<(f64, f64)> = series
            .points
            .iter()
            .filter_map(|p| p.value.map(|v| (day_number(p.period), v)))
            .collect();
        out.push(ChartSeries {
            color: palette[i % palette.len()].to_plotters(),
            points,
        });
    }
    out
}

fn value_points(series: &DerivedSeries) -> Vec<(f64, f64)> {
    series
        .points
        .iter()
        .filter_map(|p| p.value.map(|v| (day_number(p.period), v)))
        .collect()
}

/// Joint bounds over all series, with a 5% vertical pad.
fn series_bounds(series: &[ChartSeries]) -> Option<([f64; 2], [f64; 2])> {
    let mut x_min = f64::INFINITY;
    let mut x_max = f64::NEG_INFINITY;
    let mut y_min = f64::INFINITY;
    let mut y_max = f64::NEG_INFINITY;
    for s in series {
        for &(x, y) in &s.points {
            x_min = x_min.min(x);
            x_max = x_max.max(x);
            y_min = y_min.min(y);
            y_max = y_max.max(y);
        }
    }
    if !(x_min.is_finite() && y_min.is_finite()) {
        return None;
    }
    if x_max <= x_min {
        // Single-date chart: give the mapping a nonzero span.
        x_max = x_min + 1.0;
    }
    let pad = ((y_max - y_min).abs() * 0.05).max(1e-9);
    Some(([x_min, x_max], [y_min - pad, y_max + pad]))
}

fn day_number(date: NaiveDate) -> f64 {
    f64::from(date.num_days_from_ce())
}

fn fmt_axis_date(v: f64) -> String {
    NaiveDate::from_num_days_from_ce_opt(v as i32)
        .map(|d| d.format("%Y-%m").to_string())
        .unwrap_or_default()
}

fn fmt_axis_value(v: f64) -> String {
    format!("{v:.1}")
}

fn fmt_value(v: Option<f64>) -> String {
    v.map(|x| format!("{x:.2}")).unwrap_or_else(|| "-".to_string())
}

fn fmt_change(v: Option<f64>) -> String {
    v.map(|x| format!("{x:+.2}%")).unwrap_or_else(|| "-".to_string())
}

fn fmt_period(d: Option<NaiveDate>) -> String {
    d.map(|x| x.to_string()).unwrap_or_else(|| "-".to_string())
}
