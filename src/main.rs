use tracing::info;

#[tokio::main]
async fn main() -> miette::Result<()> {
    // Initialize logging; the guard flushes the rolling file on exit
    let _log_guard = kuuluttaja::startup::init_logging()?;

    info!("Starting Google Calendar polling and announcement service");

    // Load configuration
    let config = kuuluttaja::startup::load_config()?;

    // Run the daemon
    kuuluttaja::startup::run_daemon(config).await
}
