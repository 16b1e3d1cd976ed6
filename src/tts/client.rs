use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;

use super::SpeechSynthesizer;

/// Client for a Coqui-style TTS server.
///
/// The server exposes its speaker list at `/api/voices` and synthesizes
/// one utterance per `/api/tts` request, returning a WAV body.
pub struct TtsServerClient {
    client: Client,
    base_url: String,
}

impl TtsServerClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for TtsServerClient {
    async fn voices(&self) -> Result<Vec<String>> {
        let response = self
            .client
            .get(format!("{}/api/voices", self.base_url))
            .send()
            .await
            .context("Failed to request voice list from TTS server")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("TTS server error listing voices: {} - {}", status, body);
        }

        response
            .json()
            .await
            .context("Failed to parse TTS voice list")
    }

    async fn synthesize(&self, text: &str, voice_id: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(format!("{}/api/tts", self.base_url))
            .query(&[("text", text), ("speaker_id", voice_id)])
            .send()
            .await
            .context("Failed to send synthesis request to TTS server")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("TTS server error synthesizing: {} - {}", status, body);
        }

        let bytes = response
            .bytes()
            .await
            .context("Failed to read synthesized audio body")?;
        Ok(bytes.to_vec())
    }
}
