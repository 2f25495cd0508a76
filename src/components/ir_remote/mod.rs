use crate::config::Config;
use crate::error::{ir_error, AppResult};
use tokio::process::Command;
use tracing::debug;

/// Sends simulated LIRC commands to the audio controller so it can mute
/// ongoing music or power the amplifier around an announcement.
pub struct IrRemote {
    enabled: bool,
    remote: String,
}

impl IrRemote {
    pub fn new(config: &Config) -> Self {
        Self {
            enabled: config.ir_enabled,
            remote: config.ir_remote.clone(),
        }
    }

    /// Simulate a key press on the configured remote
    pub async fn simulate(&self, scancode: &str, key: &str) -> AppResult<()> {
        if !self.enabled {
            return Ok(());
        }

        // irsend simulate expects "<scancode> <repeat> <key> <remote>"
        let code_line = format!("{} 0 {} {}", scancode, key, self.remote);
        debug!("irsend simulate {}", code_line);

        let status = Command::new("irsend")
            .arg("simulate")
            .arg(&code_line)
            .status()
            .await
            .map_err(|e| ir_error(&format!("Failed to run irsend: {}", e)))?;

        if !status.success() {
            return Err(ir_error(&format!("irsend exited with {}", status)));
        }

        Ok(())
    }
}
