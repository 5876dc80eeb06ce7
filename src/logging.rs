use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Sets up daily-rolling file logging under `logs/`. Stdout is off limits
/// while the terminal is in raw mode, so everything goes to the file. The
/// returned guard flushes the non-blocking writer; keep it alive for the
/// whole run.
pub fn initialize_logging() -> WorkerGuard {
    let _ = std::fs::create_dir_all("logs");

    let appender = tracing_appender::rolling::daily("logs", "groundhold.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .init();

    tracing::info!("Logging initialized");
    guard
}
