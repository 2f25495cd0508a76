use miette::Diagnostic;
use thiserror::Error;

/// Main error type for the application
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("HTTP error: {0}")]
    #[diagnostic(code(kuuluttaja::http))]
    Http(#[from] reqwest::Error),

    #[error("External error: {0}")]
    #[diagnostic(code(kuuluttaja::external))]
    External(#[from] Box<dyn std::error::Error + Send + Sync>),

    #[error("Environment error: {0}")]
    #[diagnostic(code(kuuluttaja::environment))]
    Environment(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(kuuluttaja::config))]
    Config(String),

    #[error("Google Calendar API error: {0}")]
    #[diagnostic(code(kuuluttaja::google_calendar))]
    GoogleCalendar(String),

    #[error("Speech synthesis error: {0}")]
    #[diagnostic(code(kuuluttaja::speech))]
    Speech(String),

    #[error("Audio playback error: {0}")]
    #[diagnostic(code(kuuluttaja::audio))]
    Audio(String),

    #[error("IR remote error: {0}")]
    #[diagnostic(code(kuuluttaja::ir_remote))]
    IrRemote(String),

    #[error(transparent)]
    #[diagnostic(code(kuuluttaja::io))]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(kuuluttaja::serialization))]
    Serialization(String),

    #[error("Other error: {0}")]
    #[diagnostic(code(kuuluttaja::other))]
    Other(String),
}

// Implement From for TOML deserialization errors
impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl Error {
    /// Whether the polling loop should treat this failure as transient and
    /// retry after a backoff. Everything else is a bug signal: still logged,
    /// never allowed to kill the loop.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::Http(_)
                | Error::GoogleCalendar(_)
                | Error::Speech(_)
                | Error::Audio(_)
                | Error::IrRemote(_)
        )
    }
}

/// Type alias for Result with our Error type
pub type AppResult<T> = Result<T, Error>;

/// Helper to create environment errors
pub fn env_error(var: &str) -> Error {
    Error::Environment(format!("Missing environment variable: {}", var))
}

/// Helper to create configuration errors
pub fn config_error(message: &str) -> Error {
    Error::Config(message.to_string())
}

/// Helper to create Google Calendar errors
pub fn google_calendar_error(message: &str) -> Error {
    Error::GoogleCalendar(message.to_string())
}

/// Helper to create speech synthesis errors
pub fn speech_error(message: &str) -> Error {
    Error::Speech(message.to_string())
}

/// Helper to create audio playback errors
pub fn audio_error(message: &str) -> Error {
    Error::Audio(message.to_string())
}

/// Helper to create IR remote errors
pub fn ir_error(message: &str) -> Error {
    Error::IrRemote(message.to_string())
}

/// Helper to create other errors
#[allow(dead_code)]
pub fn other_error(message: &str) -> Error {
    Error::Other(message.to_string())
}
