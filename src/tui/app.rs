//! Dashboard state and main event loop

use std::panic::AssertUnwindSafe;
use std::time::Duration;

use anyhow::Result;
use chrono::Local;
use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::{FutureExt, StreamExt};
use ratatui::DefaultTerminal;
use tokio::time::{self, Instant, MissedTickBehavior};

use super::backend::{Backend, BackendCommand, BackendResponse};
use super::board::{BoardKind, BoardState};
use super::log_pane::{LogBuffer, LogPane};
use super::search::SearchState;
use super::sidebar::SidebarState;
use super::ui;
use crate::api::Board;
use crate::config::Config;
use crate::models::{AirlineCode, AirportCode, Locale};

/// Redraw period while idle, so captured logs show up.
const FRAME_DURATION_MS: u64 = 250;

/// Rows moved by PgUp/PgDn.
const PAGE: usize = 10;

/// Board tabs, left to right.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    #[default]
    Arrivals,
    Departures,
    Schedule,
    Airline,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Arrivals, Tab::Departures, Tab::Schedule, Tab::Airline];

    pub fn title(self) -> &'static str {
        match self {
            Tab::Arrivals => "Arrivals",
            Tab::Departures => "Departures",
            Tab::Schedule => "Schedule",
            Tab::Airline => "Airline",
        }
    }

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|t| *t == self).unwrap_or(0)
    }

    fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    pub fn kind(self) -> BoardKind {
        match self {
            Tab::Arrivals => BoardKind::Arrivals,
            Tab::Departures => BoardKind::Departures,
            Tab::Schedule => BoardKind::Schedule,
            Tab::Airline => BoardKind::Airline,
        }
    }
}

/// Focused pane
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    #[default]
    Sidebar,
    Board,
    Search,
}

impl Focus {
    pub fn as_str(self) -> &'static str {
        match self {
            Focus::Sidebar => "airports",
            Focus::Board => "board",
            Focus::Search => "search",
        }
    }
}

/// Dashboard state
pub struct App {
    pub should_exit: bool,
    pub focus: Focus,
    pub tab: Tab,
    pub sidebar: SidebarState,
    pub board: BoardState,
    pub search: SearchState,
    /// Carrier searched on the Airline tab
    pub airline: Option<AirlineCode>,
    pub show_help: bool,
    pub logs: LogPane,
    pub locale: Locale,
    pub refresh_secs: u64,
    /// Status bar message and whether it is an error
    pub status: Option<(String, bool)>,
    /// Set once the backend can no longer serve requests
    backend_error: Option<String>,
    /// Sequence number of the newest request; older responses are stale
    seq: u64,
}

impl App {
    pub fn new(config: &Config, airport: Option<AirportCode>, logs: LogBuffer) -> Self {
        let initial = airport.or_else(|| config.display.default_airport.clone());
        let sidebar = SidebarState::new(config.display.locale, initial.as_ref());
        let focus = if sidebar.active.is_some() {
            Focus::Board
        } else {
            Focus::Sidebar
        };

        Self {
            should_exit: false,
            focus,
            tab: Tab::default(),
            sidebar,
            board: BoardState::default(),
            search: SearchState::default(),
            airline: None,
            show_help: false,
            logs: LogPane::new(logs),
            locale: config.display.locale,
            refresh_secs: config.display.refresh_interval().as_secs(),
            status: None,
            backend_error: None,
            seq: 0,
        }
    }

    pub fn airport(&self) -> Option<&AirportCode> {
        self.sidebar.active_airport().map(|a| &a.code)
    }

    /// Command that reloads the current view, if there is anything to load.
    ///
    /// Existing records stay on screen until the response arrives.
    pub fn reload(&mut self) -> Option<BackendCommand> {
        if self.backend_error.is_some() {
            return None;
        }
        let airport = self.airport()?.clone();
        let board = match self.tab {
            Tab::Arrivals => Board::Arrivals,
            Tab::Departures => Board::Departures,
            Tab::Schedule => Board::Schedule,
            Tab::Airline => {
                let airline = self.airline.clone()?;
                self.seq += 1;
                self.board.loading = true;
                return Some(BackendCommand::LoadAirline {
                    seq: self.seq,
                    airport,
                    airline,
                });
            }
        };
        self.seq += 1;
        self.board.loading = true;
        Some(BackendCommand::LoadBoard {
            seq: self.seq,
            airport,
            board,
        })
    }

    /// Switch the view and load it from scratch.
    fn show(&mut self, tab: Tab) -> Option<BackendCommand> {
        self.tab = tab;
        self.board.reset();
        self.status = self.backend_error.clone().map(|msg| (msg, true));
        self.reload()
    }

    pub fn handle_response(&mut self, response: BackendResponse) {
        match response {
            BackendResponse::Records { seq, result } => {
                if seq != self.seq {
                    tracing::debug!("Dropping stale response #{} (current #{})", seq, self.seq);
                    return;
                }
                match result {
                    Ok(records) => {
                        self.board
                            .set_records(records, Local::now().format("%H:%M:%S").to_string());
                        self.status = None;
                    }
                    Err(e) => {
                        tracing::error!("Failed to load {}: {}", self.tab.title(), e);
                        self.board.loading = false;
                        self.status = Some((format!("Failed to load {}: {}", self.tab.title(), e), true));
                    }
                }
            }
            BackendResponse::ClientError(msg) => {
                tracing::error!("API client unavailable: {}", msg);
                self.board.loading = false;
                self.status = Some((msg.clone(), true));
                self.backend_error = Some(msg);
            }
        }
    }

    /// The backend task has exited; nothing more will load.
    pub fn backend_stopped(&mut self) {
        self.board.loading = false;
        if self.backend_error.is_none() {
            let msg = "Backend stopped, restart to load flights".to_string();
            tracing::error!("{}", msg);
            self.status = Some((msg.clone(), true));
            self.backend_error = Some(msg);
        }
    }

    /// Apply a key press. Returns a command when the view must be (re)loaded.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<BackendCommand> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_exit = true;
            return None;
        }

        if self.show_help {
            self.show_help = false;
            return None;
        }

        if self.focus == Focus::Search {
            return self.handle_search_key(key);
        }

        match key.code {
            KeyCode::Char('q') => {
                self.should_exit = true;
                None
            }
            KeyCode::Char('?') => {
                self.show_help = true;
                None
            }
            KeyCode::Char('l') => {
                self.logs.toggle();
                None
            }
            KeyCode::Char('[') => {
                self.logs.scroll_up(PAGE);
                None
            }
            KeyCode::Char(']') => {
                self.logs.scroll_down(PAGE);
                None
            }
            KeyCode::Char('r') => self.reload(),
            KeyCode::Char('/') => {
                self.focus = Focus::Search;
                if self.tab != Tab::Airline {
                    return self.show(Tab::Airline);
                }
                None
            }
            KeyCode::Char(c @ '1'..='4') => {
                let tab = Tab::ALL[(c as usize) - ('1' as usize)];
                (tab != self.tab).then(|| self.show(tab)).flatten()
            }
            KeyCode::Left => self.show(self.tab.prev()),
            KeyCode::Right => self.show(self.tab.next()),
            KeyCode::Tab | KeyCode::BackTab => {
                self.focus = self.next_focus(key.code == KeyCode::BackTab);
                None
            }
            KeyCode::Up | KeyCode::Char('k') => {
                match self.focus {
                    Focus::Sidebar => self.sidebar.move_up(),
                    _ => self.board.scroll_up(1),
                }
                None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                match self.focus {
                    Focus::Sidebar => self.sidebar.move_down(),
                    _ => self.board.scroll_down(1),
                }
                None
            }
            KeyCode::PageUp => {
                self.board.scroll_up(PAGE);
                None
            }
            KeyCode::PageDown => {
                self.board.scroll_down(PAGE);
                None
            }
            KeyCode::Enter if self.focus == Focus::Sidebar => {
                let code = self.sidebar.activate()?.code.clone();
                tracing::info!("Selected airport {}", code);
                self.focus = Focus::Board;
                self.show(self.tab)
            }
            _ => None,
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent) -> Option<BackendCommand> {
        match key.code {
            KeyCode::Esc => {
                self.focus = Focus::Board;
                None
            }
            KeyCode::Enter => {
                let code = self.search.submit()?;
                match AirlineCode::new(&code) {
                    Ok(airline) => {
                        self.airline = Some(airline);
                        self.focus = Focus::Board;
                        self.show(Tab::Airline)
                    }
                    Err(e) => {
                        self.status = Some((e.to_string(), true));
                        None
                    }
                }
            }
            KeyCode::Backspace => {
                self.search.backspace();
                None
            }
            KeyCode::Left => {
                self.search.move_left();
                None
            }
            KeyCode::Right => {
                self.search.move_right();
                None
            }
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.search.clear();
                None
            }
            KeyCode::Char(c) => {
                self.search.insert_char(c);
                None
            }
            _ => None,
        }
    }

    fn next_focus(&self, backward: bool) -> Focus {
        let order: &[Focus] = if self.tab == Tab::Airline {
            &[Focus::Sidebar, Focus::Board, Focus::Search]
        } else {
            &[Focus::Sidebar, Focus::Board]
        };
        let at = order.iter().position(|f| *f == self.focus).unwrap_or(0);
        let step = if backward { order.len() - 1 } else { 1 };
        order[(at + step) % order.len()]
    }
}

/// Run the dashboard, restoring the terminal even if the loop panics.
pub async fn run(config: Config, airport: Option<AirportCode>, logs: LogBuffer) -> Result<()> {
    let mut terminal = ratatui::init();
    let result = AssertUnwindSafe(run_app(&mut terminal, config, airport, logs))
        .catch_unwind()
        .await;
    ratatui::restore();

    match result {
        Ok(r) => r,
        Err(e) => std::panic::resume_unwind(e),
    }
}

async fn run_app(
    terminal: &mut DefaultTerminal,
    config: Config,
    airport: Option<AirportCode>,
    logs: LogBuffer,
) -> Result<()> {
    let mut app = App::new(&config, airport, logs);
    let period = config.display.refresh_interval();
    let mut backend = Backend::start(config);
    let mut backend_alive = true;
    let mut events = EventStream::new();

    let mut refresh = time::interval_at(Instant::now() + period, period);
    refresh.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut frame = time::interval(Duration::from_millis(FRAME_DURATION_MS));

    if let Some(cmd) = app.reload() {
        backend.send(cmd);
    }

    while !app.should_exit {
        app.logs.refresh();
        terminal.draw(|f| ui::render(f, &app))?;

        tokio::select! {
            event = events.next() => match event {
                Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                    if let Some(cmd) = app.handle_key(key) {
                        backend.send(cmd);
                        // User-driven loads restart the auto-refresh period.
                        refresh.reset();
                    }
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e.into()),
                None => break,
            },
            response = backend.recv(), if backend_alive => match response {
                Some(response) => app.handle_response(response),
                None => {
                    backend_alive = false;
                    app.backend_stopped();
                }
            },
            _ = refresh.tick() => {
                if let Some(cmd) = app.reload() {
                    tracing::info!("Auto-refreshing {}", app.tab.title());
                    backend.send(cmd);
                }
            }
            _ = frame.tick() => {}
        }
    }

    Ok(())
}
