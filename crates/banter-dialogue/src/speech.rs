//! Speech synthesis via an ElevenLabs-style text-to-speech API.

use std::path::Path;

use reqwest::Client;
use serde::Serialize;
use tracing::{info, warn};

use banter_models::{ConversationTurn, SpeechSegment};

use crate::error::{DialogueError, DialogueResult};

/// Default voice pool, one entry per voice slot.
const DEFAULT_VOICE_IDS: [&str; 4] = [
    "IKne3meq5aSn9XLyUdCD", // Charlie - Australian male
    "CwhRBWXzGAHq8TQ4Fs17", // Roger - American male
    "FGY2WhTYpPnrIDTdsKH5", // Laura - American female
    "XB0fDUnXU5powFXDhCwa", // Charlotte - Swedish female
];

/// Resolve a speaker label to a voice slot.
///
/// Precedence, case-sensitive substring match:
/// label contains "A" or "1" -> slot 0; contains "B" or "2" -> slot 1;
/// anything else defaults to slot 0.
pub fn voice_slot(speaker: &str) -> usize {
    if speaker.contains('A') || speaker.contains('1') {
        0
    } else if speaker.contains('B') || speaker.contains('2') {
        1
    } else {
        0
    }
}

/// Configuration for the speech client.
#[derive(Debug, Clone)]
pub struct SpeechClientConfig {
    /// API key
    pub api_key: String,
    /// API base URL (no trailing slash)
    pub base_url: String,
    /// Voice IDs indexed by voice slot
    pub voice_ids: Vec<String>,
    /// TTS model identifier
    pub model_id: String,
}

impl SpeechClientConfig {
    /// Create config from environment variables.
    ///
    /// `SPEECH_VOICE_IDS` is a comma-separated slot list overriding the
    /// default voice pool.
    pub fn from_env() -> DialogueResult<Self> {
        let voice_ids = std::env::var("SPEECH_VOICE_IDS")
            .map(|s| {
                s.split(',')
                    .map(|v| v.trim().to_string())
                    .filter(|v| !v.is_empty())
                    .collect()
            })
            .unwrap_or_else(|_| DEFAULT_VOICE_IDS.iter().map(|v| v.to_string()).collect());

        Ok(Self {
            api_key: std::env::var("ELEVENLABS_API_KEY")
                .map_err(|_| DialogueError::MissingApiKey("ELEVENLABS_API_KEY"))?,
            base_url: std::env::var("ELEVENLABS_BASE_URL")
                .unwrap_or_else(|_| "https://api.elevenlabs.io".to_string()),
            voice_ids,
            model_id: std::env::var("ELEVENLABS_MODEL_ID")
                .unwrap_or_else(|_| "eleven_turbo_v2".to_string()),
        })
    }
}

#[derive(Debug, Serialize)]
struct TtsRequest<'a> {
    text: &'a str,
    model_id: &'a str,
    voice_settings: VoiceSettings,
}

#[derive(Debug, Serialize)]
struct VoiceSettings {
    stability: f32,
    similarity_boost: f32,
}

/// Client rendering conversation turns to audio artifacts.
pub struct SpeechClient {
    config: SpeechClientConfig,
    client: Client,
}

impl SpeechClient {
    /// Create a client from environment configuration.
    pub fn from_env() -> DialogueResult<Self> {
        Ok(Self::new(SpeechClientConfig::from_env()?))
    }

    /// Create a client with explicit configuration.
    pub fn new(config: SpeechClientConfig) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    /// Render each turn, in order, as `speech_{n}.mp3` under `out_dir`.
    ///
    /// Turns whose resolved voice slot has no configured voice are skipped
    /// with a warning. Any synthesis call failure is fatal for the whole
    /// job; artifacts already written are abandoned, not reused.
    pub async fn synthesize_turns(
        &self,
        turns: &[ConversationTurn],
        out_dir: impl AsRef<Path>,
    ) -> DialogueResult<Vec<SpeechSegment>> {
        let out_dir = out_dir.as_ref();
        let mut segments = Vec::with_capacity(turns.len());

        for (index, turn) in turns.iter().enumerate() {
            let slot = voice_slot(&turn.speaker);
            let Some(voice_id) = self.config.voice_ids.get(slot).filter(|v| !v.is_empty()) else {
                warn!(
                    speaker = %turn.speaker,
                    slot = slot,
                    "No voice configured for slot, skipping turn"
                );
                continue;
            };

            info!(
                turn = index + 1,
                total = turns.len(),
                speaker = %turn.speaker,
                voice_id = %voice_id,
                "Synthesizing speech"
            );

            let audio = self.synthesize(&turn.text, voice_id).await?;
            let audio_path = out_dir.join(format!("speech_{}.mp3", index));
            tokio::fs::write(&audio_path, &audio).await?;

            segments.push(SpeechSegment {
                turn_index: index,
                audio_path,
            });
        }

        Ok(segments)
    }

    /// One synthesis call for one turn.
    async fn synthesize(&self, text: &str, voice_id: &str) -> DialogueResult<Vec<u8>> {
        let response = self
            .client
            .post(format!(
                "{}/v1/text-to-speech/{}",
                self.config.base_url, voice_id
            ))
            .header("Accept", "audio/mpeg")
            .header("xi-api-key", &self.config.api_key)
            .json(&TtsRequest {
                text,
                model_id: &self.config.model_id,
                voice_settings: VoiceSettings {
                    stability: 0.5,
                    similarity_boost: 0.75,
                },
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(DialogueError::synthesis_failed(format!(
                "provider returned {}: {}",
                status, body
            )));
        }

        Ok(response.bytes().await?.to_vec())
    }

    /// Cheap connectivity check: list available voices.
    pub async fn check(&self) -> DialogueResult<()> {
        let response = self
            .client
            .get(format!("{}/v1/voices", self.config.base_url))
            .header("xi-api-key", &self.config.api_key)
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(DialogueError::Api {
                status: response.status().as_u16(),
                body: response.text().await.unwrap_or_default(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer, voice_ids: Vec<String>) -> SpeechClient {
        SpeechClient::new(SpeechClientConfig {
            api_key: "test-key".to_string(),
            base_url: server.uri(),
            voice_ids,
            model_id: "eleven_turbo_v2".to_string(),
        })
    }

    fn turn(speaker: &str, text: &str) -> ConversationTurn {
        ConversationTurn {
            speaker: speaker.to_string(),
            text: text.to_string(),
        }
    }

    #[test]
    fn test_voice_slot_resolution() {
        assert_eq!(voice_slot("Speaker A"), 0);
        assert_eq!(voice_slot("Speaker B"), 1);
        assert_eq!(voice_slot("1"), 0);
        assert_eq!(voice_slot("2"), 1);
        // No marker defaults to slot 0
        assert_eq!(voice_slot("C"), 0);
        assert_eq!(voice_slot("narrator"), 0);
    }

    #[tokio::test]
    async fn test_synthesize_turns_preserves_order() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/text-to-speech/voice-a"))
            .and(header("xi-api-key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"AAA".to_vec()))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/text-to-speech/voice-b"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"BBB".to_vec()))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let client = client_for(
            &server,
            vec!["voice-a".to_string(), "voice-b".to_string()],
        );

        let turns = vec![
            turn("Speaker A", "first"),
            turn("Speaker B", "second"),
            turn("Speaker A", "third"),
        ];
        let segments = client.synthesize_turns(&turns, dir.path()).await.unwrap();

        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0].turn_index, 0);
        assert_eq!(segments[2].turn_index, 2);
        assert!(segments[0].audio_path.ends_with("speech_0.mp3"));
        assert_eq!(std::fs::read(&segments[1].audio_path).unwrap(), b"BBB");
    }

    #[tokio::test]
    async fn test_unconfigured_slot_skips_turn() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/text-to-speech/voice-a"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"AAA".to_vec()))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        // Only slot 0 has a voice; Speaker B turns resolve to slot 1
        let client = client_for(&server, vec!["voice-a".to_string()]);

        let turns = vec![turn("Speaker A", "kept"), turn("Speaker B", "skipped")];
        let segments = client.synthesize_turns(&turns, dir.path()).await.unwrap();

        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].turn_index, 0);
    }

    #[tokio::test]
    async fn test_synthesis_failure_is_fatal() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let client = client_for(&server, vec!["voice-a".to_string()]);

        let err = client
            .synthesize_turns(&[turn("Speaker A", "text")], dir.path())
            .await
            .unwrap_err();
        assert!(matches!(err, DialogueError::SynthesisFailed(_)));
    }
}
