//! Session controller: owns the API client, the prediction cache and every
//! background fetch spawned on their behalf. Results come back as
//! [`Event::Data`] stamped with the generation that issued them; a refresh
//! aborts outstanding tasks and bumps the generation so anything late gets
//! dropped before it can touch the [`App`].

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::api::DelayApi;
use crate::app::{App, Command, PanelState, DIALOG_ERROR, PREDICTION_ERROR};
use crate::cache::{PredictionCache, PredictionKey};
use crate::config::ApiConfig;
use crate::events::{DataUpdate, DialogData, DialogKind, Event};
use crate::models::{today_day_of_week, AirportIndex, TodaysWinner};

pub struct Session {
    api: Arc<DelayApi>,
    tx: UnboundedSender<Event>,
    cache: PredictionCache,
    pending: HashSet<PredictionKey>,
    generation: u64,
    tasks: Vec<JoinHandle<()>>,
    routes_top_n: usize,
    performers_top_n: usize,
}

impl Session {
    pub fn new(config: &ApiConfig, tx: UnboundedSender<Event>) -> Self {
        let api = DelayApi::new(
            config.base_url.clone(),
            Duration::from_secs(config.timeout_seconds),
        );
        Self {
            api: Arc::new(api),
            tx,
            cache: PredictionCache::new(),
            pending: HashSet::new(),
            generation: 0,
            tasks: Vec::new(),
            routes_top_n: config.routes_top_n,
            performers_top_n: config.performers_top_n,
        }
    }

    pub fn dispatch(&mut self, command: Command, app: &mut App) {
        match command {
            Command::Predict {
                day_of_week,
                airport_id,
            } => self.request_prediction(app, day_of_week, airport_id),
            Command::OpenDialog(kind) => self.open_dialog(kind),
            Command::Refresh => self.refresh(app),
        }
    }

    /// Kicks off the dashboard load: airports, the single most delayed route
    /// and today's best performer in parallel, then the winner's own
    /// prediction once the performer's name can be mapped to an airport id.
    /// Each branch fails on its own; only the winner depends on airports.
    pub fn load_dashboard(&mut self) {
        self.reap_tasks();
        let api = Arc::clone(&self.api);
        let tx = self.tx.clone();
        let generation = self.generation;

        let handle = tokio::spawn(async move {
            let send = |update: DataUpdate| {
                tx.send(Event::Data { generation, update }).ok();
            };
            let today = today_day_of_week();

            let (airports_result, routes_result, performers_result) = tokio::join!(
                api.airports(),
                api.most_delayed_routes(1),
                api.best_performers(1),
            );

            let index = match airports_result {
                Ok(airports) => {
                    let index = AirportIndex::new(&airports);
                    send(DataUpdate::Airports(airports));
                    Some(index)
                }
                Err(e) => {
                    warn!("Airports fetch failed: {}", e);
                    send(DataUpdate::AirportsFailed);
                    None
                }
            };

            match routes_result {
                Ok(routes) => {
                    if let Some(route) = routes.into_iter().next() {
                        send(DataUpdate::MostDelayedRoute(route));
                    }
                }
                Err(e) => warn!("Most delayed routes fetch failed: {}", e),
            }

            match performers_result {
                Ok(performers) => {
                    if let Some(performer) = performers.into_iter().next() {
                        let winner_id = index
                            .as_ref()
                            .and_then(|index| index.id_for_name(&performer.airport_name));
                        let winner_name = performer.airport_name.clone();
                        send(DataUpdate::BestPerformer(performer));

                        if let Some(airport_id) = winner_id {
                            match api.predict(today, airport_id).await {
                                Ok(prediction) => send(DataUpdate::TodaysWinner(TodaysWinner {
                                    airport_name: winner_name,
                                    prediction,
                                })),
                                Err(e) => warn!("Winner prediction failed: {}", e),
                            }
                        }
                    }
                }
                Err(e) => warn!("Best performers fetch failed: {}", e),
            }

            send(DataUpdate::StatsDone);
        });
        self.tasks.push(handle);
    }

    /// Serves the prediction from cache when the pair was fetched before;
    /// otherwise spawns a fetch, unless one for the same pair is already in
    /// flight.
    fn request_prediction(&mut self, app: &mut App, day_of_week: u8, airport_id: i64) {
        let key = PredictionKey::new(day_of_week, airport_id);

        if let Some(hit) = self.cache.get(&key) {
            debug!(
                "Prediction cache hit for day {} airport {}",
                key.day_of_week, key.airport_id
            );
            app.prediction = PanelState::Loaded(hit.clone());
            return;
        }

        app.prediction = PanelState::Loading;
        if self.pending.contains(&key) {
            return;
        }
        self.pending.insert(key);

        self.reap_tasks();
        let api = Arc::clone(&self.api);
        let tx = self.tx.clone();
        let generation = self.generation;

        let handle = tokio::spawn(async move {
            let update = match api.predict(key.day_of_week, key.airport_id).await {
                Ok(prediction) => DataUpdate::Prediction { key, prediction },
                Err(e) => {
                    warn!(
                        "Prediction fetch failed for day {} airport {}: {}",
                        key.day_of_week, key.airport_id, e
                    );
                    DataUpdate::PredictionFailed { key }
                }
            };
            tx.send(Event::Data { generation, update }).ok();
        });
        self.tasks.push(handle);
    }

    // Dialogs go straight to the network every time they open.
    fn open_dialog(&mut self, kind: DialogKind) {
        self.reap_tasks();
        let api = Arc::clone(&self.api);
        let tx = self.tx.clone();
        let generation = self.generation;
        let routes_top_n = self.routes_top_n;
        let performers_top_n = self.performers_top_n;

        let handle = tokio::spawn(async move {
            let result = match kind {
                DialogKind::Airports => api.airports().await.map(DialogData::Airports),
                DialogKind::MostDelayedRoutes => api
                    .most_delayed_routes(routes_top_n)
                    .await
                    .map(DialogData::Routes),
                DialogKind::BestPerformers => api
                    .best_performers(performers_top_n)
                    .await
                    .map(DialogData::Performers),
                DialogKind::AirlineDelays => api.airline_delays().await.map(DialogData::Airlines),
            };
            let update = match result {
                Ok(data) => DataUpdate::Dialog(data),
                Err(e) => {
                    warn!("Dialog fetch failed for {:?}: {}", kind, e);
                    DataUpdate::DialogFailed(kind)
                }
            };
            tx.send(Event::Data { generation, update }).ok();
        });
        self.tasks.push(handle);
    }

    /// Discards everything in flight along with the cache and reloads the
    /// dashboard. The current selection survives and its prediction is
    /// requested again through the fresh session.
    pub fn refresh(&mut self, app: &mut App) {
        info!("Refreshing session data");
        self.reset();
        app.begin_session_load();
        self.load_dashboard();

        match app.prediction_command() {
            Some(Command::Predict {
                day_of_week,
                airport_id,
            }) => self.request_prediction(app, day_of_week, airport_id),
            _ => app.prediction = PanelState::Idle,
        }
    }

    fn reset(&mut self) {
        for task in self.tasks.drain(..) {
            task.abort();
        }
        self.generation += 1;
        self.pending.clear();
        self.cache.clear();
    }

    fn reap_tasks(&mut self) {
        self.tasks.retain(|task| !task.is_finished());
    }

    /// Applies one finished fetch to the app. Updates stamped with a
    /// superseded generation are dropped wholesale: no cache write, no panel
    /// change.
    pub fn apply(&mut self, generation: u64, update: DataUpdate, app: &mut App) {
        if generation != self.generation {
            debug!(
                "Dropping update from superseded generation {} (current {})",
                generation, self.generation
            );
            return;
        }

        match update {
            DataUpdate::Airports(airports) => {
                info!("Loaded {} airports", airports.len());
                app.set_airports(airports);
            }
            DataUpdate::AirportsFailed => {
                app.set_airports_failed();
            }
            DataUpdate::BestPerformer(performer) => {
                app.stats.best_airport = Some(performer);
            }
            DataUpdate::TodaysWinner(winner) => {
                app.stats.todays_winner = Some(winner);
            }
            DataUpdate::MostDelayedRoute(route) => {
                app.stats.set_most_delayed_route(route);
            }
            DataUpdate::StatsDone => {
                app.stats_loading = false;
            }
            DataUpdate::Prediction { key, prediction } => {
                self.pending.remove(&key);
                self.cache.insert(key, prediction.clone());
                // Only the pair still on screen may repaint the panel.
                if selection_matches(app, key) {
                    app.prediction = PanelState::Loaded(prediction);
                }
            }
            DataUpdate::PredictionFailed { key } => {
                self.pending.remove(&key);
                if selection_matches(app, key) {
                    app.prediction = PanelState::Error(PREDICTION_ERROR);
                }
            }
            DataUpdate::Dialog(data) => {
                if let Some(dialog) = app.dialog.as_mut() {
                    if dialog.kind == data.kind() {
                        dialog.scroll = 0;
                        dialog.state = PanelState::Loaded(data);
                    }
                }
            }
            DataUpdate::DialogFailed(kind) => {
                if let Some(dialog) = app.dialog.as_mut() {
                    if dialog.kind == kind {
                        dialog.state = PanelState::Error(DIALOG_ERROR);
                    }
                }
            }
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

fn selection_matches(app: &App, key: PredictionKey) -> bool {
    app.selected_day == key.day_of_week
        && app
            .selected_airport
            .and_then(|i| app.airports.get(i))
            .map(|airport| airport.id == key.airport_id)
            .unwrap_or(false)
}
