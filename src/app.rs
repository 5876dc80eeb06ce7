use crate::events::{DialogData, DialogKind};
use crate::models::{today_day_of_week, Airport, DerivedStats, Prediction};
use crossterm::event::{KeyCode, KeyEvent};

pub const STATS_ERROR: &str = "Could not load airports or stats.";
pub const PREDICTION_ERROR: &str = "Failed to fetch flight delay data.";
pub const DIALOG_ERROR: &str = "Failed to fetch data.";

/// Lifecycle of one panel's data. Every panel starts `Idle`, flips to
/// `Loading` when a request goes out and lands on `Loaded` or `Error`.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelState<T> {
    Idle,
    Loading,
    Loaded(T),
    Error(&'static str),
}

impl<T> Default for PanelState<T> {
    fn default() -> Self {
        PanelState::Idle
    }
}

/// Side effects a key press asks for. `handle_key` mutates local state and
/// hands one of these back for the session to dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Predict { day_of_week: u8, airport_id: i64 },
    OpenDialog(DialogKind),
    Refresh,
}

pub struct DialogState {
    pub kind: DialogKind,
    pub state: PanelState<DialogData>,
    pub scroll: usize,
}

pub struct App {
    pub airports: Vec<Airport>,
    pub airports_loading: bool,
    pub airports_error: bool,

    // Today's stats header
    pub stats: DerivedStats,
    pub stats_loading: bool,

    // Predictor panel inputs and result
    pub selected_day: u8, // 1 = Monday .. 7 = Sunday
    pub selected_airport: Option<usize>,
    pub prediction: PanelState<Prediction>,

    pub dialog: Option<DialogState>,
    pub tick_count: usize,
    pub should_quit: bool,
}

impl App {
    pub fn new() -> Self {
        Self {
            airports: Vec::new(),
            airports_loading: true,
            airports_error: false,
            stats: DerivedStats::default(),
            stats_loading: true,
            selected_day: today_day_of_week(),
            selected_airport: None,
            prediction: PanelState::Idle,
            dialog: None,
            tick_count: 0,
            should_quit: false,
        }
    }

    pub fn on_tick(&mut self) {
        self.tick_count += 1;
    }

    /// Installs a fresh airports list and drops a selection it invalidated.
    pub fn set_airports(&mut self, airports: Vec<Airport>) {
        self.airports = airports;
        self.airports_loading = false;
        self.airports_error = false;
        if let Some(index) = self.selected_airport {
            if index >= self.airports.len() {
                self.selected_airport = None;
            }
        }
    }

    /// Records a failed airports load. The list empties even when a previous
    /// session had filled it, so the error state never shows stale rows, and
    /// the predictor loses its selection along with it.
    pub fn set_airports_failed(&mut self) {
        self.airports.clear();
        self.airports_loading = false;
        self.airports_error = true;
        self.selected_airport = None;
        self.prediction = PanelState::Idle;
    }

    /// Puts the dashboard back into its loading shape ahead of a refresh.
    /// The airports list and the current selection stay visible meanwhile.
    pub fn begin_session_load(&mut self) {
        self.airports_loading = true;
        self.airports_error = false;
        self.stats_loading = true;
        self.stats = DerivedStats::default();
    }

    /// The predict request for the current (day, airport) selection, if an
    /// airport is selected.
    pub fn prediction_command(&self) -> Option<Command> {
        let index = self.selected_airport?;
        let airport = self.airports.get(index)?;
        Some(Command::Predict {
            day_of_week: self.selected_day,
            airport_id: airport.id,
        })
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Command> {
        if self.dialog.is_some() {
            return self.handle_dialog_key(key);
        }

        match key.code {
            KeyCode::Char('q') => {
                self.should_quit = true;
                None
            }
            KeyCode::Left => {
                self.selected_day = if self.selected_day <= 1 {
                    7
                } else {
                    self.selected_day - 1
                };
                self.prediction_command()
            }
            KeyCode::Right => {
                self.selected_day = if self.selected_day >= 7 {
                    1
                } else {
                    self.selected_day + 1
                };
                self.prediction_command()
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.select_next_airport();
                self.prediction_command()
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.select_prev_airport();
                self.prediction_command()
            }
            KeyCode::Char('r') => Some(Command::Refresh),
            KeyCode::Char('a') => self.open_dialog(DialogKind::Airports),
            KeyCode::Char('m') => self.open_dialog(DialogKind::MostDelayedRoutes),
            KeyCode::Char('b') => self.open_dialog(DialogKind::BestPerformers),
            KeyCode::Char('l') => self.open_dialog(DialogKind::AirlineDelays),
            _ => None,
        }
    }

    fn handle_dialog_key(&mut self, key: KeyEvent) -> Option<Command> {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => self.dialog = None,
            KeyCode::Down | KeyCode::Char('j') => self.scroll_dialog(1),
            KeyCode::Up | KeyCode::Char('k') => self.scroll_dialog(-1),
            _ => {}
        }
        None
    }

    fn open_dialog(&mut self, kind: DialogKind) -> Option<Command> {
        self.dialog = Some(DialogState {
            kind,
            state: PanelState::Loading,
            scroll: 0,
        });
        Some(Command::OpenDialog(kind))
    }

    fn select_next_airport(&mut self) {
        if self.airports.is_empty() {
            return;
        }
        self.selected_airport = Some(match self.selected_airport {
            Some(i) => (i + 1) % self.airports.len(),
            None => 0,
        });
    }

    fn select_prev_airport(&mut self) {
        if self.airports.is_empty() {
            return;
        }
        self.selected_airport = Some(match self.selected_airport {
            Some(i) => i.checked_sub(1).unwrap_or(self.airports.len() - 1),
            None => self.airports.len() - 1,
        });
    }

    fn scroll_dialog(&mut self, delta: isize) {
        if let Some(dialog) = self.dialog.as_mut() {
            if let PanelState::Loaded(data) = &dialog.state {
                let max = data.len().saturating_sub(1) as isize;
                let next = dialog.scroll as isize + delta;
                dialog.scroll = next.clamp(0, max) as usize;
            }
        }
    }
}
