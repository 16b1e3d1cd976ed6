use anyhow::Result;
use async_trait::async_trait;

pub mod audio;
pub mod client;

pub use audio::*;
pub use client::*;

/// The speech-synthesis collaborator: one WAV blob per (text, voice)
/// pair. The core hands over turns in order and concatenates whatever
/// comes back; the waveform model behind the interface is out of scope.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Voice identifiers the synthesizer offers
    async fn voices(&self) -> Result<Vec<String>>;

    /// Synthesize one utterance as WAV bytes
    async fn synthesize(&self, text: &str, voice_id: &str) -> Result<Vec<u8>>;
}
