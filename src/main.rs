use color_eyre::Result;
use groundhold_tui::{
    app::App,
    config::Config,
    events::{Event, EventHandler},
    logging,
    session::Session,
    ui,
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Instrumentation and safety
    let _log_guard = logging::initialize_logging();
    install_panic_hook();
    color_eyre::install()?;

    let config = Config::load();
    info!("Starting Groundhold TUI against {}", config.api.base_url);

    // Ready terminal and state
    let mut terminal = setup_terminal()?;
    let mut app = App::new();
    let mut events = EventHandler::new(config.ui.tick_rate_ms);

    // The session owns the API client, the prediction cache and every
    // background fetch; results come back through the event channel.
    let mut session = Session::new(&config.api, events.tx.clone());
    session.load_dashboard();

    // Main loop
    while !app.should_quit {
        terminal.draw(|f| ui::render(f, &app))?;

        if let Some(event) = events.next().await {
            match event {
                Event::Tick => app.on_tick(),
                Event::Input(key) => {
                    if let Some(command) = app.handle_key(key) {
                        session.dispatch(command, &mut app);
                    }
                }
                Event::Data { generation, update } => session.apply(generation, update, &mut app),
            }
        }
    }

    restore_terminal(terminal)?;
    Ok(())
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    crossterm::terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    crossterm::execute!(
        stdout,
        crossterm::terminal::EnterAlternateScreen,
        crossterm::cursor::Hide
    )?;
    Ok(Terminal::new(CrosstermBackend::new(stdout))?)
}

fn restore_terminal(mut terminal: Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    crossterm::terminal::disable_raw_mode()?;
    crossterm::execute!(
        terminal.backend_mut(),
        crossterm::terminal::LeaveAlternateScreen,
        crossterm::cursor::Show
    )?;
    Ok(())
}

fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        // Force terminal cleanup!
        crossterm::terminal::disable_raw_mode().ok();
        crossterm::execute!(
            std::io::stdout(),
            crossterm::terminal::LeaveAlternateScreen,
            crossterm::cursor::Show
        )
        .ok();
        original_hook(panic_info);
    }));
}
