use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;
use thiserror::Error;
use tracing::instrument;

use crate::constants::{SPEECH_MODEL_ID, SPEECH_SIMILARITY_BOOST, SPEECH_STABILITY};
use crate::util::env::Env;

/// ElevenLabs text-to-speech. Synthesis is best-effort; every failure reads as "no audio".
#[derive(Debug, Clone)]
pub struct SpeechClient {
    client: reqwest::Client,
    api_base: String,
    voice_id: String,
    api_key: Option<String>,
}

impl SpeechClient {
    pub fn new(api_base: String, voice_id: String, api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base,
            voice_id,
            api_key,
        }
    }

    pub fn from_env(env: &Env) -> Self {
        if env.elevenlabs_api_key.is_none() {
            tracing::warn!("no text-to-speech api key configured; voice replies will be text only");
        }

        Self::new(
            env.speech_api_base.clone(),
            env.elevenlabs_voice_id.clone(),
            env.elevenlabs_api_key.clone(),
        )
    }

    /// Base64-encoded audio for `text`, or `None` when synthesis is unavailable.
    #[instrument(skip(self, text), fields(chars = text.len()))]
    pub async fn synthesize(&self, text: &str) -> Option<String> {
        match self.fetch_audio(text).await {
            Ok(audio) => Some(STANDARD.encode(audio)),
            Err(SpeechErr::NotConfigured) => None,
            Err(e) => {
                tracing::error!(error = %e, "speech synthesis failed");
                None
            }
        }
    }

    async fn fetch_audio(&self, text: &str) -> SpeechResult<Vec<u8>> {
        let api_key = self.api_key.as_deref().ok_or(SpeechErr::NotConfigured)?;

        let body = SpeechRequest {
            text,
            model_id: SPEECH_MODEL_ID,
            voice_settings: VoiceSettings {
                stability: SPEECH_STABILITY,
                similarity_boost: SPEECH_SIMILARITY_BOOST,
            },
        };

        let res = self
            .client
            .post(format!(
                "{}/text-to-speech/{}",
                self.api_base.trim_end_matches('/'),
                self.voice_id
            ))
            .header("xi-api-key", api_key)
            .json(&body)
            .send()
            .await?;

        // only a plain 200 carries audio
        if res.status() != 200 {
            return Err(SpeechErr::Status(res.status().as_u16()));
        }

        let audio = res.bytes().await?;
        tracing::debug!(audio_bytes = audio.len(), "synthesized speech");
        Ok(audio.to_vec())
    }
}

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

pub type SpeechResult<T> = core::result::Result<T, SpeechErr>;

#[derive(Debug, Error)]
pub enum SpeechErr {
    #[error("no text-to-speech api key configured")]
    NotConfigured,

    #[error("text-to-speech api returned {0}")]
    Status(u16),

    #[error(transparent)]
    ReqwestError(#[from] reqwest::Error),
}

#[cfg(test)]
mod test {
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn client(api_base: String, key: Option<&str>) -> SpeechClient {
        SpeechClient::new(api_base, String::from("voice-1"), key.map(String::from))
    }

    #[tokio::test]
    async fn test_synthesize_returns_base64_audio() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/text-to-speech/voice-1"))
            .and(header("xi-api-key", "el-key"))
            .and(body_partial_json(json!({
                "text": "Hello!",
                "model_id": "eleven_turbo_v2_5",
                "voice_settings": { "stability": 0.5, "similarity_boost": 0.75 }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"ID3audio".to_vec()))
            .expect(1)
            .mount(&server)
            .await;

        let audio = client(server.uri(), Some("el-key")).synthesize("Hello!").await;
        assert_eq!(audio, Some(STANDARD.encode(b"ID3audio")));
    }

    #[tokio::test]
    async fn test_non_200_means_no_audio() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;

        assert_eq!(client(server.uri(), Some("bad")).synthesize("hi").await, None);
    }

    #[tokio::test]
    async fn test_missing_key_skips_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        assert_eq!(client(server.uri(), None).synthesize("hi").await, None);
    }

    #[tokio::test]
    async fn test_unreachable_host_means_no_audio() {
        let client = client(String::from("http://127.0.0.1:1"), Some("el-key"));
        assert_eq!(client.synthesize("hi").await, None);
    }

    #[test]
    fn test_from_env_defaults() {
        let speech = SpeechClient::from_env(&Env::with_vars(&[]));
        assert_eq!(speech.voice_id, crate::constants::DEFAULT_VOICE_ID);
        assert_eq!(speech.api_base, crate::constants::ELEVENLABS_API_BASE);
        assert!(speech.api_key.is_none());
    }
}
