//! Conversation generation via an OpenAI-style chat completion API.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use banter_models::{ConversationTurn, JobConfig};

use crate::error::{DialogueError, DialogueResult};

/// The label pool speakers are drawn from. Sized to the maximum supported
/// agent count; a job uses the first `num_agents` labels.
const SPEAKER_LABEL_POOL: [&str; 4] = ["Speaker A", "Speaker B", "Speaker C", "Speaker D"];

/// Speaker labels for a conversation with `num_agents` agents.
pub fn speaker_labels(num_agents: u32) -> Vec<&'static str> {
    SPEAKER_LABEL_POOL
        .iter()
        .take(num_agents as usize)
        .copied()
        .collect()
}

/// Configuration for the conversation client.
#[derive(Debug, Clone)]
pub struct ConversationClientConfig {
    /// API key
    pub api_key: String,
    /// API base URL (no trailing slash)
    pub base_url: String,
    /// Chat model identifier
    pub model: String,
}

impl ConversationClientConfig {
    /// Create config from environment variables.
    pub fn from_env() -> DialogueResult<Self> {
        Ok(Self {
            api_key: std::env::var("OPENAI_API_KEY")
                .map_err(|_| DialogueError::MissingApiKey("OPENAI_API_KEY"))?,
            base_url: std::env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com".to_string()),
            model: std::env::var("OPENAI_MODEL")
                .unwrap_or_else(|_| "gpt-4-turbo-preview".to_string()),
        })
    }
}

/// Chat completion request.
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    response_format: ResponseFormat,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

/// Chat completion response (the parts we read).
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// The JSON document the model is asked to produce.
#[derive(Debug, Deserialize)]
struct ConversationDocument {
    conversations: Vec<ConversationTurn>,
}

/// Client for scripting the agent conversation.
///
/// One request, one response; no retry and no streaming. Any response
/// that is not a well-formed ordered list of turns is fatal for the job.
pub struct ConversationClient {
    config: ConversationClientConfig,
    client: Client,
}

impl ConversationClient {
    /// Create a client from environment configuration.
    pub fn from_env() -> DialogueResult<Self> {
        Ok(Self::new(ConversationClientConfig::from_env()?))
    }

    /// Create a client with explicit configuration.
    pub fn new(config: ConversationClientConfig) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    /// Generate the scripted conversation about a video.
    pub async fn generate(
        &self,
        video_title: &str,
        config: &JobConfig,
    ) -> DialogueResult<Vec<ConversationTurn>> {
        let labels = speaker_labels(config.num_agents);

        info!(
            title = %video_title,
            agents = config.num_agents,
            style = config.commentary_style.as_str(),
            "Generating conversation"
        );

        let system = format!(
            "You are a group of friends having a casual conversation about a video. \
             Respond with JSON: an object with a \"conversations\" array, each entry \
             having \"speaker\" and \"text\" fields. Only use these speaker names: {}.",
            labels.join(", ")
        );
        let user = format!(
            "Generate a natural conversation between {} people discussing a video titled \"{}\". \
             Each person has the following personality: {}. \
             The conversation should be {} in style and have a {} pace.",
            config.num_agents,
            video_title,
            config.personalities.join(", "),
            config.commentary_style.as_str(),
            config.conversation_speed.as_str(),
        );

        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            response_format: ResponseFormat {
                format_type: "json_object",
            },
            temperature: 0.7,
        };

        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(DialogueError::Api { status, body });
        }

        let chat: ChatResponse = response.json().await?;
        let content = chat
            .choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .ok_or_else(|| DialogueError::malformed("empty completion"))?;

        debug!("Conversation response: {}", content);

        let document: ConversationDocument = serde_json::from_str(content)
            .map_err(|e| DialogueError::malformed(format!("not a conversation document: {}", e)))?;

        validate_turns(&document.conversations, config.num_agents)?;
        Ok(document.conversations)
    }

    /// Cheap connectivity check: list available models.
    pub async fn check(&self) -> DialogueResult<()> {
        let response = self
            .client
            .get(format!("{}/v1/models", self.config.base_url))
            .bearer_auth(&self.config.api_key)
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

/// Validate the generated turn sequence.
///
/// The number of distinct speakers must not exceed the configured agent
/// count, and every turn needs non-empty text.
fn validate_turns(turns: &[ConversationTurn], num_agents: u32) -> DialogueResult<()> {
    if turns.is_empty() {
        return Err(DialogueError::malformed("no conversation turns"));
    }

    let mut speakers: Vec<&str> = turns.iter().map(|t| t.speaker.as_str()).collect();
    speakers.sort_unstable();
    speakers.dedup();
    if speakers.len() > num_agents as usize {
        return Err(DialogueError::malformed(format!(
            "{} distinct speakers for {} agents",
            speakers.len(),
            num_agents
        )));
    }

    if turns.iter().any(|t| t.text.trim().is_empty()) {
        return Err(DialogueError::malformed("turn with empty text"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use banter_models::{CommentaryStyle, ConversationSpeed};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn job_config() -> JobConfig {
        JobConfig {
            num_agents: 2,
            personalities: vec!["Sassy".to_string(), "Deadpan".to_string()],
            commentary_style: CommentaryStyle::Roast,
            clip_interval: 1.0,
            conversation_speed: ConversationSpeed::Medium,
            target_length: 15.0,
        }
    }

    fn client_for(server: &MockServer) -> ConversationClient {
        ConversationClient::new(ConversationClientConfig {
            api_key: "test-key".to_string(),
            base_url: server.uri(),
            model: "gpt-4-turbo-preview".to_string(),
        })
    }

    fn completion_body(content: &str) -> serde_json::Value {
        serde_json::json!({
            "choices": [{ "message": { "role": "assistant", "content": content } }]
        })
    }

    #[test]
    fn test_speaker_labels_sized_to_agents() {
        assert_eq!(speaker_labels(2), vec!["Speaker A", "Speaker B"]);
        assert_eq!(
            speaker_labels(4),
            vec!["Speaker A", "Speaker B", "Speaker C", "Speaker D"]
        );
    }

    #[tokio::test]
    async fn test_generate_parses_ordered_turns() {
        let server = MockServer::start().await;
        let content = r#"{"conversations":[
            {"speaker":"Speaker A","text":"Here we go."},
            {"speaker":"Speaker B","text":"Oh no."},
            {"speaker":"Speaker A","text":"Oh yes."}
        ]}"#;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body(content)))
            .mount(&server)
            .await;

        let turns = client_for(&server)
            .generate("A video", &job_config())
            .await
            .unwrap();

        assert_eq!(turns.len(), 3);
        assert_eq!(turns[0].speaker, "Speaker A");
        assert_eq!(turns[1].text, "Oh no.");
        assert_eq!(turns[2].speaker, "Speaker A");
    }

    #[tokio::test]
    async fn test_generate_rejects_malformed_document() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(completion_body("not even json")),
            )
            .mount(&server)
            .await;

        let err = client_for(&server)
            .generate("A video", &job_config())
            .await
            .unwrap_err();
        assert!(matches!(err, DialogueError::MalformedConversation(_)));
    }

    #[tokio::test]
    async fn test_generate_rejects_too_many_speakers() {
        let server = MockServer::start().await;
        let content = r#"{"conversations":[
            {"speaker":"Speaker A","text":"one"},
            {"speaker":"Speaker B","text":"two"},
            {"speaker":"Speaker C","text":"three"}
        ]}"#;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body(content)))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .generate("A video", &job_config())
            .await
            .unwrap_err();
        assert!(matches!(err, DialogueError::MalformedConversation(_)));
    }

    #[tokio::test]
    async fn test_generate_surfaces_api_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .generate("A video", &job_config())
            .await
            .unwrap_err();
        assert!(matches!(err, DialogueError::Api { status: 429, .. }));
    }
}
