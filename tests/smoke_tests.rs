use kuuluttaja::config::{Config, DEFAULT_REMINDER_MINUTES, DEFAULT_REPEAT_PHRASE};
use kuuluttaja::error::{config_error, google_calendar_error, speech_error};
use kuuluttaja::reminder::normalize_for_speech;

/// Smoke test to verify that a config can be constructed
#[tokio::test]
async fn test_config_construction() {
    let config = Config {
        google_client_id: String::new(),
        google_client_secret: String::new(),
        calendar_ids: vec!["primary".to_string(), "family".to_string()],
        token_path: "google_token.json".to_string(),
        speech_api_key: String::new(),
        speech_region: "westeurope".to_string(),
        speech_voice: "fr-FR-DeniseNeural".to_string(),
        speech_language: "fr-FR".to_string(),
        reminder_minutes_default: DEFAULT_REMINDER_MINUTES,
        timezone: "Europe/Paris".to_string(),
        lookahead_days: 30,
        poll_interval_secs: 30,
        retry_backoff_secs: 30,
        repeat_phrase: DEFAULT_REPEAT_PHRASE.to_string(),
        intro_cue_path: "audio_on.wav".to_string(),
        outro_cue_path: "audio_off.wav".to_string(),
        ir_enabled: true,
        ir_remote: "piremote".to_string(),
        ir_start_scancode: "0000000000004660".to_string(),
        ir_end_scancode: "0000000000022136".to_string(),
    };

    assert_eq!(config.calendar_ids.len(), 2);
    assert_eq!(config.reminder_minutes_default, 15);
    assert!(config.tz().is_ok());
}

/// An unknown timezone must be rejected before the loop starts
#[tokio::test]
async fn test_unknown_timezone_is_rejected() {
    let config = Config {
        google_client_id: String::new(),
        google_client_secret: String::new(),
        calendar_ids: vec!["primary".to_string()],
        token_path: "google_token.json".to_string(),
        speech_api_key: String::new(),
        speech_region: "westeurope".to_string(),
        speech_voice: "fr-FR-DeniseNeural".to_string(),
        speech_language: "fr-FR".to_string(),
        reminder_minutes_default: DEFAULT_REMINDER_MINUTES,
        timezone: "Mars/Olympus_Mons".to_string(),
        lookahead_days: 30,
        poll_interval_secs: 30,
        retry_backoff_secs: 30,
        repeat_phrase: DEFAULT_REPEAT_PHRASE.to_string(),
        intro_cue_path: "audio_on.wav".to_string(),
        outro_cue_path: "audio_off.wav".to_string(),
        ir_enabled: false,
        ir_remote: "piremote".to_string(),
        ir_start_scancode: "0000000000004660".to_string(),
        ir_end_scancode: "0000000000022136".to_string(),
    };

    assert!(config.tz().is_err());
}

/// Only external failures should be retried by the loop
#[test]
fn test_error_retry_classification() {
    assert!(google_calendar_error("rate limited").is_retryable());
    assert!(speech_error("synthesis failed").is_retryable());
    assert!(!config_error("bad timezone").is_retryable());
}

/// The speech normalization used on every announced name
#[test]
fn test_speech_normalization() {
    assert_eq!(normalize_for_speech("Sauna Ilta"), "sauna ilta");
    assert_eq!(normalize_for_speech("Café"), "cafe");
}
