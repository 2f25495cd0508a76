use crate::error::{config_error, env_error, AppResult, Error};
use chrono_tz::Tz;
use dotenvy::dotenv;
use serde::Deserialize;
use std::env;
use std::fs;
use std::str::FromStr;

/// Phrase spoken between the two repetitions of the event name
pub const DEFAULT_REPEAT_PHRASE: &str = "je raipaite";

/// Reminder lead time used when neither the event nor the calendar supplies one
pub const DEFAULT_REMINDER_MINUTES: i64 = 15;

/// Optional TOML overlay for audio and IR settings
const CONFIG_FILE: &str = "kuuluttaja.toml";

/// Main configuration structure for the daemon
#[derive(Debug, Clone)]
pub struct Config {
    /// Google Calendar API client ID
    pub google_client_id: String,
    /// Google Calendar API client secret
    pub google_client_secret: String,
    /// Calendars to poll. The first is the main calendar the credentials
    /// were issued for; the rest must be shared with it.
    pub calendar_ids: Vec<String>,
    /// Where the OAuth token JSON is stored on disk
    pub token_path: String,
    /// Microsoft Cognitive Services speech subscription key
    pub speech_api_key: String,
    /// Azure region of the speech resource
    pub speech_region: String,
    /// Voice used for synthesis
    pub speech_voice: String,
    /// Language tag in the synthesis request
    pub speech_language: String,
    /// Fallback reminder lead time in minutes
    pub reminder_minutes_default: i64,
    /// Timezone all reminder comparisons happen in
    pub timezone: String,
    /// How many days ahead events are fetched
    pub lookahead_days: i64,
    /// Seconds between poll cycles
    pub poll_interval_secs: u64,
    /// Seconds to wait before retrying after a failed cycle
    pub retry_backoff_secs: u64,
    /// Phrase spoken between the two repetitions of the event name
    pub repeat_phrase: String,
    /// Jingle played before the spoken reminder
    pub intro_cue_path: String,
    /// Jingle played after the spoken reminder
    pub outro_cue_path: String,
    /// Whether irsend commands are issued around announcements
    pub ir_enabled: bool,
    /// LIRC remote name used in irsend commands
    pub ir_remote: String,
    /// Scancode simulated before an announcement
    pub ir_start_scancode: String,
    /// Scancode simulated after an announcement
    pub ir_end_scancode: String,
}

/// Shape of the optional kuuluttaja.toml overlay
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    #[serde(default)]
    announce: AnnounceSection,
    #[serde(default)]
    ir: IrSection,
}

#[derive(Debug, Default, Deserialize)]
struct AnnounceSection {
    repeat_phrase: Option<String>,
    intro_cue: Option<String>,
    outro_cue: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct IrSection {
    enabled: Option<bool>,
    remote: Option<String>,
    start_scancode: Option<String>,
    end_scancode: Option<String>,
}

impl Config {
    /// Load configuration from environment and config file
    pub fn load() -> AppResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        // Required environment variables
        let google_client_id =
            env::var("GOOGLE_CLIENT_ID").map_err(|_| env_error("GOOGLE_CLIENT_ID"))?;
        let google_client_secret =
            env::var("GOOGLE_CLIENT_SECRET").map_err(|_| env_error("GOOGLE_CLIENT_SECRET"))?;
        let speech_api_key =
            env::var("SPEECH_API_KEY").map_err(|_| env_error("SPEECH_API_KEY"))?;

        // Comma-separated calendar list
        let calendar_ids: Vec<String> = env::var("GOOGLE_CALENDAR_IDS")
            .map_err(|_| env_error("GOOGLE_CALENDAR_IDS"))?
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if calendar_ids.is_empty() {
            return Err(config_error("GOOGLE_CALENDAR_IDS contains no calendar ids"));
        }

        let token_path =
            env::var("GOOGLE_TOKEN_PATH").unwrap_or_else(|_| String::from("google_token.json"));

        // Speech synthesis settings
        let speech_region =
            env::var("SPEECH_REGION").unwrap_or_else(|_| String::from("westeurope"));
        let speech_voice =
            env::var("SPEECH_VOICE").unwrap_or_else(|_| String::from("fr-FR-DeniseNeural"));
        let speech_language =
            env::var("SPEECH_LANGUAGE").unwrap_or_else(|_| String::from("fr-FR"));

        // Loop timing and reminder defaults
        let reminder_minutes_default =
            env_or("REMINDER_MINUTES_DEFAULT", DEFAULT_REMINDER_MINUTES)?;
        let timezone = env::var("TIMEZONE").unwrap_or_else(|_| String::from("Europe/Paris"));
        let lookahead_days = env_or("LOOKAHEAD_DAYS", 30)?;
        let poll_interval_secs = env_or("POLL_INTERVAL_SECS", 30)?;
        let retry_backoff_secs = env_or("RETRY_BACKOFF_SECS", 30)?;

        // Load audio/IR overlay from file if it exists
        let file_config = match fs::read_to_string(CONFIG_FILE) {
            Ok(content) => toml::from_str::<FileConfig>(&content)
                .map_err(|e| config_error(&format!("Failed to parse {}: {}", CONFIG_FILE, e)))?,
            Err(_) => FileConfig::default(),
        };

        let announce = file_config.announce;
        let ir = file_config.ir;

        Ok(Config {
            google_client_id,
            google_client_secret,
            calendar_ids,
            token_path,
            speech_api_key,
            speech_region,
            speech_voice,
            speech_language,
            reminder_minutes_default,
            timezone,
            lookahead_days,
            poll_interval_secs,
            retry_backoff_secs,
            repeat_phrase: announce
                .repeat_phrase
                .unwrap_or_else(|| String::from(DEFAULT_REPEAT_PHRASE)),
            intro_cue_path: announce
                .intro_cue
                .unwrap_or_else(|| String::from("audio_on.wav")),
            outro_cue_path: announce
                .outro_cue
                .unwrap_or_else(|| String::from("audio_off.wav")),
            ir_enabled: ir.enabled.unwrap_or(true),
            ir_remote: ir.remote.unwrap_or_else(|| String::from("piremote")),
            ir_start_scancode: ir
                .start_scancode
                .unwrap_or_else(|| String::from("0000000000004660")),
            ir_end_scancode: ir
                .end_scancode
                .unwrap_or_else(|| String::from("0000000000022136")),
        })
    }

    /// Parse the configured timezone
    pub fn tz(&self) -> AppResult<Tz> {
        self.timezone
            .parse()
            .map_err(|_| config_error(&format!("Unknown timezone: {}", self.timezone)))
    }
}

/// Read an optional environment variable, failing on an unparseable value
fn env_or<T: FromStr>(name: &str, default: T) -> AppResult<T> {
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| Error::Environment(format!("Invalid value for {}: {}", name, raw))),
        Err(_) => Ok(default),
    }
}
