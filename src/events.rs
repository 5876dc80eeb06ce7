//! Event types and the main event loop driver for the Groundhold TUI.
//!
//! This module defines the [`Event`] enum (keyboard input, ticks, and data
//! updates from background fetches) and the [`EventHandler`], which runs a
//! background task that polls crossterm for key events and emits periodic
//! [`Event::Tick`]s. The main loop in `main.rs` receives events via
//! [`EventHandler::next`]; fetch tasks spawned by the session send
//! [`Event::Data`] via a cloned [`EventHandler::tx`].

use crossterm::event::{self, Event as CrosstermEvent, KeyEvent};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

use crate::cache::PredictionKey;
use crate::models::{AirlineDelay, Airport, PerformerStat, Prediction, RouteStat, TodaysWinner};

/// Events processed by the application event loop.
pub enum Event {
    /// Periodic tick used for UI refresh and the loading spinner.
    Tick,
    /// User key press from the terminal.
    Input(KeyEvent),
    /// A background fetch finished. `generation` identifies the session load
    /// that issued the request; updates from a superseded generation are
    /// dropped before they can touch state.
    Data { generation: u64, update: DataUpdate },
}

/// Payload of one finished fetch.
pub enum DataUpdate {
    /// The `/airports` list arrived.
    Airports(Vec<Airport>),
    /// The `/airports` fetch failed; the stats header shows a combined error.
    AirportsFailed,
    /// Today's best performer (first row of `/best_performers`).
    BestPerformer(PerformerStat),
    /// The best performer's own prediction for today.
    TodaysWinner(TodaysWinner),
    /// The single most delayed route; its destination doubles as the
    /// busiest-airport card.
    MostDelayedRoute(RouteStat),
    /// The dashboard load task finished, successfully or not.
    StatsDone,
    /// A prediction came back for `key`.
    Prediction {
        key: PredictionKey,
        prediction: Prediction,
    },
    /// The prediction request for `key` failed.
    PredictionFailed { key: PredictionKey },
    /// Rows for an open dialog arrived.
    Dialog(DialogData),
    /// The fetch behind an open dialog failed.
    DialogFailed(DialogKind),
}

/// Which browse dialog is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogKind {
    Airports,
    MostDelayedRoutes,
    BestPerformers,
    AirlineDelays,
}

impl DialogKind {
    pub fn title(&self) -> &'static str {
        match self {
            DialogKind::Airports => "Airports",
            DialogKind::MostDelayedRoutes => "Most Delayed Routes",
            DialogKind::BestPerformers => "Best On-Time Performers",
            DialogKind::AirlineDelays => "Airline Delays",
        }
    }
}

/// Rows backing a browse dialog. Dialogs always refetch on open, so this is
/// rebuilt each time rather than cached.
#[derive(Debug, Clone, PartialEq)]
pub enum DialogData {
    Airports(Vec<Airport>),
    Routes(Vec<RouteStat>),
    Performers(Vec<PerformerStat>),
    Airlines(Vec<AirlineDelay>),
}

impl DialogData {
    pub fn kind(&self) -> DialogKind {
        match self {
            DialogData::Airports(_) => DialogKind::Airports,
            DialogData::Routes(_) => DialogKind::MostDelayedRoutes,
            DialogData::Performers(_) => DialogKind::BestPerformers,
            DialogData::Airlines(_) => DialogKind::AirlineDelays,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            DialogData::Airports(rows) => rows.len(),
            DialogData::Routes(rows) => rows.len(),
            DialogData::Performers(rows) => rows.len(),
            DialogData::Airlines(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Multiplexes terminal input and ticks into a single event stream.
///
/// Holds an unbounded channel: the sender ([`tx`](EventHandler::tx)) can be
/// cloned and given to other tasks (the session hands it to every fetch it
/// spawns), while the receiver is consumed by [`next`](EventHandler::next) in
/// the main loop. A background task polls crossterm with a timeout and sends
/// [`Event::Input`] on key press and [`Event::Tick`] at the configured
/// interval.
pub struct EventHandler {
    /// Sender for posting events from background tasks.
    pub tx: mpsc::UnboundedSender<Event>,
    rx: mpsc::UnboundedReceiver<Event>,
}

impl EventHandler {
    /// Creates a new event handler and spawns the input/tick task.
    ///
    /// The spawned task runs until the process exits. It polls crossterm with
    /// a timeout of `tick_rate_ms`; when a key is pressed it sends
    /// [`Event::Input`], and when the tick interval elapses it sends
    /// [`Event::Tick`].
    ///
    /// # Panics
    ///
    /// The background task may panic if crossterm `poll` or `read` fails (e.g.
    /// terminal disconnected). The main loop does not protect against this.
    pub fn new(tick_rate_ms: u64) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let event_tx = tx.clone();

        tokio::spawn(async move {
            let tick_rate = Duration::from_millis(tick_rate_ms);
            let mut last_tick = Instant::now();
            loop {
                let timeout = tick_rate
                    .checked_sub(last_tick.elapsed())
                    .unwrap_or(Duration::from_secs(0));
                if event::poll(timeout).expect("Poll failed") {
                    if let CrosstermEvent::Key(key) = event::read().expect("Read failed") {
                        event_tx.send(Event::Input(key)).ok();
                    }
                }
                if last_tick.elapsed() >= tick_rate {
                    event_tx.send(Event::Tick).ok();
                    last_tick = Instant::now();
                }
            }
        });

        Self { tx, rx }
    }

    /// Receives the next event from the channel.
    ///
    /// Returns `None` when all senders have been dropped (e.g. the input task
    /// exited).
    pub async fn next(&mut self) -> Option<Event> {
        self.rx.recv().await
    }
}
