use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use kuuluttaja::components::google_calendar::models::{CalendarEvent, EventsPage};
use kuuluttaja::components::{AnnounceCues, Announcer, EventSource};
use kuuluttaja::config::Config;
use kuuluttaja::daemon::PollDaemon;
use kuuluttaja::error::{google_calendar_error, AppResult};
use std::sync::{Arc, Mutex};

fn test_config() -> Arc<Config> {
    Arc::new(Config {
        google_client_id: String::new(),
        google_client_secret: String::new(),
        calendar_ids: vec!["primary".to_string()],
        token_path: "google_token.json".to_string(),
        speech_api_key: String::new(),
        speech_region: "westeurope".to_string(),
        speech_voice: "fr-FR-DeniseNeural".to_string(),
        speech_language: "fr-FR".to_string(),
        reminder_minutes_default: 15,
        timezone: "UTC".to_string(),
        lookahead_days: 30,
        poll_interval_secs: 30,
        retry_backoff_secs: 30,
        repeat_phrase: "i repeat".to_string(),
        intro_cue_path: "audio_on.wav".to_string(),
        outro_cue_path: "audio_off.wav".to_string(),
        ir_enabled: false,
        ir_remote: "piremote".to_string(),
        ir_start_scancode: "0000000000004660".to_string(),
        ir_end_scancode: "0000000000022136".to_string(),
    })
}

/// Event source serving the same fixed list for every calendar
struct ScriptedSource {
    events: Vec<CalendarEvent>,
}

#[async_trait]
impl EventSource for ScriptedSource {
    async fn list_events(
        &self,
        _calendar_id: &str,
        _time_min: DateTime<Tz>,
        _time_max: DateTime<Tz>,
    ) -> AppResult<EventsPage> {
        Ok(EventsPage {
            items: self.events.clone(),
            default_reminder_minutes: None,
        })
    }
}

/// Event source that always fails, as on a network outage
struct FailingSource;

#[async_trait]
impl EventSource for FailingSource {
    async fn list_events(
        &self,
        _calendar_id: &str,
        _time_min: DateTime<Tz>,
        _time_max: DateTime<Tz>,
    ) -> AppResult<EventsPage> {
        Err(google_calendar_error("Failed to fetch events: connection refused"))
    }
}

struct RecordingAnnouncer {
    log: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl Announcer for RecordingAnnouncer {
    async fn speak(&self, text: &str) -> AppResult<()> {
        self.log.lock().unwrap().push(format!("speak:{}", text));
        Ok(())
    }
}

struct RecordingCues {
    log: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl AnnounceCues for RecordingCues {
    async fn begin_announcement(&self) -> AppResult<()> {
        self.log.lock().unwrap().push("begin".to_string());
        Ok(())
    }

    async fn end_announcement(&self) -> AppResult<()> {
        self.log.lock().unwrap().push("end".to_string());
        Ok(())
    }
}

/// Repeat-tagged event starting at the given instant, so the announcement
/// sequence does not hold the test until the minute rolls over
fn repeat_event(name: &str, start: DateTime<Tz>) -> CalendarEvent {
    CalendarEvent {
        id: name.to_string(),
        summary: Some(name.to_string()),
        description: Some("repeat".to_string()),
        start_date_time: Some(start.format("%Y-%m-%dT%H:%M:00+00:00").to_string()),
        ..Default::default()
    }
}

fn daemon_with(
    source: Arc<dyn EventSource>,
    log: &Arc<Mutex<Vec<String>>>,
) -> PollDaemon {
    PollDaemon::new(
        test_config(),
        source,
        Arc::new(RecordingAnnouncer {
            log: Arc::clone(log),
        }),
        Arc::new(RecordingCues {
            log: Arc::clone(log),
        }),
    )
    .unwrap()
}

#[tokio::test]
async fn test_due_event_is_spoken_twice_between_cues() {
    let now = Utc::now().with_timezone(&chrono_tz::UTC);

    // Two candidate minutes so the test cannot race the clock across a
    // minute boundary: exactly one of them matches the daemon's own "now"
    // plus the 15 minute fallback lead.
    let source = Arc::new(ScriptedSource {
        events: vec![
            repeat_event("event a", now + Duration::minutes(15)),
            repeat_event("event b", now + Duration::minutes(16)),
        ],
    });

    let log = Arc::new(Mutex::new(Vec::new()));
    let daemon = daemon_with(source, &log);

    daemon.run_cycle().await.unwrap();

    let log = log.lock().unwrap();
    assert_eq!(log.len(), 5, "unexpected sequence: {:?}", *log);
    assert_eq!(log[0], "begin");
    assert!(log[1].starts_with("speak:event "));
    assert_eq!(log[2], "speak:i repeat");
    assert_eq!(log[3], log[1]);
    assert_eq!(log[4], "end");
}

#[tokio::test]
async fn test_cycle_with_nothing_due_stays_silent() {
    let now = Utc::now().with_timezone(&chrono_tz::UTC);

    let source = Arc::new(ScriptedSource {
        events: vec![repeat_event("far away", now + Duration::minutes(200))],
    });

    let log = Arc::new(Mutex::new(Vec::new()));
    let daemon = daemon_with(source, &log);

    daemon.run_cycle().await.unwrap();

    assert!(log.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_source_failure_is_retryable() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let daemon = daemon_with(Arc::new(FailingSource), &log);

    let err = daemon.run_cycle().await.unwrap_err();
    assert!(err.is_retryable());
    assert!(log.lock().unwrap().is_empty());
}
