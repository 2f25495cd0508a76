use crate::components::speech::AudioPlayer;
use crate::components::{AudioCues, GoogleCalendarClient, SpeechAnnouncer};
use crate::config::Config;
use crate::daemon::PollDaemon;
use crate::error::Error;
use crate::shutdown;
use std::env;
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Initialize logging with environment-based configuration.
///
/// With LOG_DIRECTORY set, output goes to a daily-rotating file in that
/// directory; otherwise it goes to stderr. The returned guard must stay
/// alive for the process lifetime or buffered lines are lost.
pub fn init_logging() -> miette::Result<Option<WorkerGuard>> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if let Ok(directory) = env::var("LOG_DIRECTORY") {
        let file_appender = tracing_appender::rolling::daily(&directory, "kuuluttaja.log");
        let (writer, guard) = tracing_appender::non_blocking(file_appender);

        let subscriber = FmtSubscriber::builder()
            .with_env_filter(filter)
            .with_writer(writer)
            .with_ansi(false)
            .finish();

        tracing::subscriber::set_global_default(subscriber)
            .map_err(|e| Error::Other(format!("Failed to set up logging: {}", e)))?;

        Ok(Some(guard))
    } else {
        let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();

        tracing::subscriber::set_global_default(subscriber)
            .map_err(|e| Error::Other(format!("Failed to set up logging: {}", e)))?;

        Ok(None)
    }
}

/// Load and initialize the application config
pub fn load_config() -> miette::Result<Arc<Config>> {
    match Config::load() {
        Ok(config) => Ok(Arc::new(config)),
        Err(e) => {
            error!("Failed to load configuration: {:?}", e);
            Err(e.into())
        }
    }
}

/// Wire up the collaborators and run the polling loop until a signal stops it
pub async fn run_daemon(config: Arc<Config>) -> miette::Result<()> {
    info!("Polling calendars: {:?}", config.calendar_ids);
    info!("Timezone: {}", config.timezone);

    let source = Arc::new(GoogleCalendarClient::new(Arc::clone(&config)));
    let player = Arc::new(AudioPlayer::new());
    let announcer = Arc::new(SpeechAnnouncer::new(&config, Arc::clone(&player)));
    let cues = Arc::new(AudioCues::new(&config, Arc::clone(&player)));

    let daemon = PollDaemon::new(Arc::clone(&config), source, announcer, cues)?;

    // Create shutdown channel
    let (shutdown_send, shutdown_recv) = oneshot::channel();

    // Spawn signal handler task
    tokio::spawn(async move {
        shutdown::handle_signals(shutdown_send).await;
    });

    // Run until the signal handler fires
    tokio::select! {
        _ = daemon.run() => Ok(()),
        _ = shutdown_recv => {
            info!("Received shutdown signal, stopping polling loop");
            Ok(())
        }
    }
}
