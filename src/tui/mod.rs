//! Ratatui-based terminal UI.
//!
//! The TUI starts on a port picker (unless the flags already name a source),
//! then shows the recolored leaf, the reading log and a growth trend. Readings
//! arrive from the reader thread over a bounded channel that the event loop
//! drains on every tick.

use std::collections::VecDeque;
use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Gauge, List, ListItem, ListState, Paragraph},
};
use tracing::{info, warn};

use crate::domain::{LinkConfig, LinkEvent, Reading, TuiConfig};
use crate::error::{AppError, EXIT_IO};
use crate::growth;
use crate::io::reader::ReaderHandle;
use crate::io::serial::{self, PortEntry};
use crate::io::source::Source;
use crate::leaf::{Enhancement, LeafImage, load_leaf};

mod leaf_widget;
mod plotters_chart;

use leaf_widget::LeafWidget;
use plotters_chart::GrowthTrendChart;

/// Readings kept for the log panel and the trend chart.
const LOG_CAPACITY: usize = 500;

/// How long the event loop waits for input before draining the channel again.
const TICK: Duration = Duration::from_millis(100);

/// Start the TUI.
pub fn run(config: TuiConfig) -> Result<(), AppError> {
    // The leaf is required; fail before touching the terminal so the error
    // is printed normally.
    let leaf = load_leaf(&config.leaf_path)?;
    info!(path = %config.leaf_path.display(), "leaf image ready");

    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(EXIT_IO, format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(config.link, leaf);
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode()
            .map_err(|e| AppError::new(EXIT_IO, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(EXIT_IO, format!("Failed to enter alternate screen: {e}")));
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

#[derive(Debug, Clone, PartialEq, Eq)]
enum Screen {
    Picker,
    Monitor,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum LinkState {
    Idle,
    Connected(Source),
    Lost { source: Source, reason: String },
}

struct App {
    link: LinkConfig,
    screen: Screen,
    ports: Vec<PortEntry>,
    selected_port: usize,
    reader: Option<ReaderHandle>,
    state: LinkState,
    log: VecDeque<Reading>,
    /// Total readings received this session (for trend x values).
    received: u64,
    /// Readings dropped by links that have since gone away.
    dropped: u64,
    base_leaf: LeafImage,
    shown_leaf: LeafImage,
    status: String,
}

impl App {
    fn new(link: LinkConfig, leaf: LeafImage) -> Self {
        let shown_leaf = leaf.clone();
        let mut app = Self {
            link,
            screen: Screen::Picker,
            ports: Vec::new(),
            selected_port: 0,
            reader: None,
            state: LinkState::Idle,
            log: VecDeque::with_capacity(LOG_CAPACITY),
            received: 0,
            dropped: 0,
            base_leaf: leaf,
            shown_leaf,
            status: String::new(),
        };

        match crate::app::resolve_source(&app.link) {
            Some(source) => app.connect(source),
            None => app.refresh_ports(),
        }
        app
    }

    fn event_loop<B: ratatui::backend::Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
    ) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if self.pump_events() {
                needs_redraw = true;
            }

            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(EXIT_IO, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(TICK)
                .map_err(|e| AppError::new(EXIT_IO, format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read()
                .map_err(|e| AppError::new(EXIT_IO, format!("Event read error: {e}")))?
            {
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

    /// Drain the reader channel. Returns whether anything changed.
    fn pump_events(&mut self) -> bool {
        let Some(reader) = &self.reader else {
            return false;
        };
        let events = reader.drain();
        if events.is_empty() {
            return false;
        }

        for event in events {
            match event {
                LinkEvent::Reading(reading) => self.push_reading(reading),
                LinkEvent::Disconnected { reason } => self.link_lost(reason),
            }
        }
        true
    }

    fn push_reading(&mut self, reading: Reading) {
        self.shown_leaf = Enhancement::for_growth(reading.growth).apply_image(&self.base_leaf);
        if self.log.len() == LOG_CAPACITY {
            self.log.pop_front();
        }
        self.log.push_back(reading);
        self.received += 1;
    }

    fn link_lost(&mut self, reason: String) {
        let source = match &self.state {
            LinkState::Connected(source) => source.clone(),
            _ => return,
        };
        warn!(%source, %reason, "link lost");
        self.status = format!("Link to {source} lost: {reason}. Press p to pick a port.");
        self.state = LinkState::Lost { source, reason };
        if let Some(reader) = self.reader.take() {
            self.dropped += reader.dropped();
        }
    }

    /// Dropped readings this session, including the live link's count.
    fn dropped_count(&self) -> u64 {
        self.dropped + self.reader.as_ref().map_or(0, |r| r.dropped())
    }

    fn handle_key(&mut self, code: KeyCode) -> bool {
        if code == KeyCode::Char('q') || code == KeyCode::Esc {
            return true;
        }
        match self.screen {
            Screen::Picker => self.handle_picker_key(code),
            Screen::Monitor => self.handle_monitor_key(code),
        }
        false
    }

    fn handle_picker_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Up => {
                self.selected_port = self.selected_port.saturating_sub(1);
            }
            KeyCode::Down => {
                if self.selected_port + 1 < self.ports.len() {
                    self.selected_port += 1;
                }
            }
            KeyCode::Char('r') => self.refresh_ports(),
            KeyCode::Char('s') => self.connect(Source::Simulated),
            KeyCode::Enter => match self.ports.get(self.selected_port) {
                Some(port) => {
                    let source = Source::Serial(port.name.clone());
                    self.connect(source);
                }
                None => {
                    self.status = "No serial port selected.".to_string();
                }
            },
            _ => {}
        }
    }

    fn handle_monitor_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('c') => {
                self.log.clear();
                self.status = "Log cleared.".to_string();
            }
            KeyCode::Char('p') => {
                if matches!(self.state, LinkState::Connected(_)) {
                    self.status = "Still connected; the link must drop before switching ports.".to_string();
                } else {
                    self.screen = Screen::Picker;
                    self.refresh_ports();
                }
            }
            _ => {}
        }
    }

    fn refresh_ports(&mut self) {
        match serial::available_ports() {
            Ok(ports) => {
                self.status = if ports.is_empty() {
                    "(no ports) Press r to refresh or s to simulate.".to_string()
                } else {
                    format!("{} port(s) found.", ports.len())
                };
                self.ports = ports;
            }
            Err(e) => {
                self.ports.clear();
                self.status = e.to_string();
            }
        }
        self.selected_port = self.selected_port.min(self.ports.len().saturating_sub(1));
    }

    fn connect(&mut self, source: Source) {
        match crate::app::connect(&source, &self.link) {
            Ok(reader) => {
                self.status = format!("Connected to {source}.");
                self.reader = Some(reader);
                self.state = LinkState::Connected(source);
                self.screen = Screen::Monitor;
            }
            Err(e) => {
                warn!(%source, error = %e, "connect failed");
                self.screen = Screen::Picker;
                if self.ports.is_empty() {
                    self.refresh_ports();
                }
                self.status = e.to_string();
            }
        }
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        match self.screen {
            Screen::Picker => self.draw_picker(frame, chunks[1]),
            Screen::Monitor => self.draw_monitor(frame, chunks[1]),
        }
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let (link_label, link_style) = match &self.state {
            LinkState::Idle => ("not connected".to_string(), Style::default().fg(Color::Gray)),
            LinkState::Connected(source) => (
                format!("{source} @ {} baud", self.link.baud),
                Style::default().fg(Color::Green),
            ),
            LinkState::Lost { source, .. } => (
                format!("{source} (disconnected)"),
                Style::default().fg(Color::Red),
            ),
        };

        let dropped = self.dropped_count();
        let lines = vec![
            Line::from(vec![
                Span::styled("leafmon", Style::default().fg(Color::Cyan)),
                Span::raw(" | growth index monitor | "),
                Span::styled(link_label, link_style),
            ]),
            Line::from(Span::styled(
                format!("readings: {} | dropped: {dropped}", self.received),
                Style::default().fg(Color::Gray),
            )),
        ];

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_picker(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let items: Vec<ListItem> = if self.ports.is_empty() {
            vec![ListItem::new("(no ports)")]
        } else {
            self.ports.iter().map(|p| ListItem::new(p.label())).collect()
        };

        let list = List::new(items)
            .block(Block::default().title("Serial port").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ListState::default();
        if !self.ports.is_empty() {
            state.select(Some(self.selected_port));
        }
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_monitor(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(area);

        self.draw_leaf(frame, columns[0]);

        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(columns[1]);
        self.draw_log(frame, right[0]);
        self.draw_trend(frame, right[1]);
    }

    fn draw_leaf(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Leaf").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(inner);

        frame.render_widget(LeafWidget { image: &self.shown_leaf }, rows[0]);

        let growth = self.log.back().map(|r| r.growth);
        let gauge = Gauge::default()
            .gauge_style(Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))
            .ratio(growth.map(growth::growth_fraction).unwrap_or(0.0))
            .label(match growth {
                Some(g) => format!("growth {g:.1}"),
                None => "growth -".to_string(),
            });
        frame.render_widget(gauge, rows[1]);
    }

    fn draw_log(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Log").borders(Borders::ALL);
        let visible = block.inner(area).height as usize;

        let lines: Vec<Line> = if self.log.is_empty() {
            vec![Line::from(Span::styled(
                "Waiting for data...",
                Style::default().fg(Color::Yellow),
            ))]
        } else {
            // Newest at the bottom, like an append-only text box scrolled to the end.
            let skip = self.log.len().saturating_sub(visible);
            self.log
                .iter()
                .skip(skip)
                .map(|r| Line::from(crate::report::format_log_entry(r)))
                .collect()
        };

        frame.render_widget(Paragraph::new(Text::from(lines)).block(block), area);
    }

    fn draw_trend(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Growth trend").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let points = trend_points(&self.log, self.received);
        frame.render_widget(GrowthTrendChart { points: &points }, inner);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = match self.screen {
            Screen::Picker => "↑/↓ select  Enter connect  r refresh  s simulate  q quit",
            Screen::Monitor => "c clear log  p pick port (after disconnect)  q quit",
        };
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

/// `(reading number, growth)` for the readings still in the log.
///
/// Reading numbers are 1-based over the whole session, so the x axis keeps
/// counting after old entries fall out of the log.
fn trend_points(log: &VecDeque<Reading>, received: u64) -> Vec<(f64, f64)> {
    let first = received.saturating_sub(log.len() as u64) + 1;
    log.iter()
        .enumerate()
        .map(|(i, r)| ((first + i as u64) as f64, r.growth))
        .collect()
}
