use super::speech_repository::{SpeechError, SpeechRepository};
use crate::infrastructure::config::{ConfigError, ElevenLabsConfig};
use async_trait::async_trait;
use reqwest::{header, Client, StatusCode, Url};
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Serialize)]
struct SpeechRequest<'a> {
    text: &'a str,
    model_id: &'a str,
    voice_settings: VoiceSettings,
}

#[derive(Debug, Serialize)]
struct VoiceSettings {
    stability: f32,
    similarity_boost: f32,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            stability: 0.5,
            similarity_boost: 0.75,
        }
    }
}

/// ElevenLabs implementation of the speech repository
pub struct ElevenLabsSpeechRepository {
    client: Client,
    api_key: String,
    base_url: Url,
    model_id: String,
}

impl ElevenLabsSpeechRepository {
    /// Fails before any network call when the API key is missing
    pub fn new(config: &ElevenLabsConfig) -> Result<Self, ConfigError> {
        if config.api_key.trim().is_empty() {
            return Err(ConfigError::MissingCredentials {
                provider: "ElevenLabs",
                missing: vec!["ELEVENLABS_API_KEY"],
            });
        }

        let base_url = Url::parse(&config.base_url)
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| ConfigError::Invalid {
                name: "ELEVENLABS_BASE_URL",
                value: config.base_url.clone(),
            })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url,
            model_id: config.model_id.clone(),
        })
    }

    /// `{base}/text-to-speech/{voice_id}` with the voice id as one encoded segment
    fn speech_url(&self, voice_id: &str) -> Result<Url, SpeechError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| SpeechError::Transport("Invalid ElevenLabs base URL".to_string()))?
            .pop_if_empty()
            .push("text-to-speech")
            .push(voice_id);
        Ok(url)
    }
}

#[async_trait]
impl SpeechRepository for ElevenLabsSpeechRepository {
    async fn synthesize(&self, text: &str, voice_id: &str) -> Result<Vec<u8>, SpeechError> {
        let start_time = std::time::Instant::now();
        let url = self.speech_url(voice_id)?;

        tracing::info!(
            voice_id = voice_id,
            model = %self.model_id,
            text_length = text.chars().count(),
            "Calling ElevenLabs text-to-speech"
        );

        let request = SpeechRequest {
            text,
            model_id: &self.model_id,
            voice_settings: VoiceSettings::default(),
        };

        let response = self
            .client
            .post(url)
            .header("xi-api-key", &self.api_key)
            .header(header::ACCEPT, "audio/mpeg")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, voice_id = voice_id, "ElevenLabs request failed");
                SpeechError::Transport(format!("Failed to connect to ElevenLabs: {}", e))
            })?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| {
            tracing::error!(error = %e, status = %status.as_u16(), "ElevenLabs response body unreadable");
            SpeechError::Transport(format!("Failed to connect to ElevenLabs: {}", e))
        })?;

        if !status.is_success() {
            let detail = parse_error_detail(status, &body);
            tracing::error!(
                status = %status.as_u16(),
                detail = %detail,
                voice_id = voice_id,
                "ElevenLabs API error"
            );
            return Err(SpeechError::Provider(detail));
        }

        if body.is_empty() {
            return Err(SpeechError::Provider(
                "ElevenLabs returned an empty audio body".to_string(),
            ));
        }

        tracing::info!(
            provider = "elevenlabs",
            voice_id = voice_id,
            latency_ms = start_time.elapsed().as_millis(),
            audio_size_bytes = body.len(),
            "Speech synthesized"
        );

        Ok(body.to_vec())
    }
}

/// Pull a readable detail out of an error body.
///
/// ElevenLabs sends either `{"detail": "..."}` or
/// `{"detail": {"status": "...", "message": "..."}}`; other services use
/// `{"message": "..."}`. Anything else falls back to the status line.
pub(crate) fn parse_error_detail(status: StatusCode, body: &[u8]) -> String {
    let status_line = format!(
        "HTTP {}: {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or("Unknown Status")
    );

    let Ok(value) = serde_json::from_slice::<serde_json::Value>(body) else {
        return status_line;
    };

    let detail = match value.get("detail") {
        Some(serde_json::Value::String(s)) => Some(s.clone()),
        Some(obj @ serde_json::Value::Object(_)) => obj
            .get("message")
            .and_then(|m| m.as_str())
            .map(str::to_string),
        _ => None,
    };

    detail
        .or_else(|| {
            value
                .get("message")
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(status_line)
}
