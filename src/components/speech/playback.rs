use crate::error::{audio_error, AppResult};
use rodio::{Decoder, OutputStreamBuilder, Sink};
use std::io::Cursor;
use std::path::Path;

/// Plays WAV audio on the default output device.
///
/// The cpal stream handle behind rodio's OutputStream is not Send, so the
/// device is opened, drained and dropped entirely inside a blocking task.
/// Announcements are rare enough that reopening per utterance is fine.
#[derive(Default)]
pub struct AudioPlayer;

impl AudioPlayer {
    pub fn new() -> Self {
        Self
    }

    /// Play a buffer of encoded audio, returning once playback has finished
    pub async fn play_wav(&self, bytes: Vec<u8>) -> AppResult<()> {
        tokio::task::spawn_blocking(move || play_blocking(bytes))
            .await
            .map_err(|e| audio_error(&format!("Playback task failed: {}", e)))?
    }

    /// Play an audio file from disk (the announcement jingles)
    pub async fn play_file(&self, path: &Path) -> AppResult<()> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| audio_error(&format!("Failed to read audio cue {}: {}", path.display(), e)))?;
        self.play_wav(bytes).await
    }
}

fn play_blocking(bytes: Vec<u8>) -> AppResult<()> {
    let stream = OutputStreamBuilder::open_default_stream()
        .map_err(|e| audio_error(&format!("Failed to open audio output: {}", e)))?;

    let source = Decoder::new(Cursor::new(bytes))
        .map_err(|e| audio_error(&format!("Failed to decode audio: {}", e)))?;

    let sink = Sink::connect_new(stream.mixer());
    sink.append(source);
    sink.sleep_until_end();

    Ok(())
}
