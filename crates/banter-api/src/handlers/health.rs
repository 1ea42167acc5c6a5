//! Health and readiness handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Serialize;

use banter_dialogue::{ConversationClient, SpeechClient};

use crate::state::AppState;

/// Health response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: String,
}

/// Health check endpoint (liveness probe).
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

#[derive(Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub checks: ReadinessChecks,
}

#[derive(Serialize)]
pub struct ReadinessChecks {
    pub store: CheckStatus,
    pub ffmpeg: CheckStatus,
    pub ffprobe: CheckStatus,
    pub ytdlp: CheckStatus,
}

#[derive(Serialize)]
pub struct CheckStatus {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CheckStatus {
    fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            error: None,
        }
    }

    fn error(msg: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            error: Some(msg.into()),
        }
    }

    fn from_result<T, E: std::fmt::Display>(result: Result<T, E>) -> Self {
        match result {
            Ok(_) => Self::ok(),
            Err(e) => Self::error(e.to_string()),
        }
    }
}

/// Readiness check endpoint. Verifies the job store answers and the
/// external tools the pipeline shells out to are installed.
pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<ReadinessResponse>) {
    let checks = ReadinessChecks {
        store: CheckStatus::from_result(state.store.list_recent(1).await),
        ffmpeg: CheckStatus::from_result(banter_media::check_ffmpeg()),
        ffprobe: CheckStatus::from_result(banter_media::check_ffprobe()),
        ytdlp: CheckStatus::from_result(banter_media::check_ytdlp()),
    };

    let all_ok = [&checks.store, &checks.ffmpeg, &checks.ffprobe, &checks.ytdlp]
        .iter()
        .all(|c| c.status == "ok");

    let status = if all_ok { "ready" } else { "not_ready" };
    let code = if all_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        code,
        Json(ReadinessResponse {
            status: status.to_string(),
            checks,
        }),
    )
}

#[derive(Serialize)]
pub struct ProviderChecks {
    pub conversation: CheckStatus,
    pub speech: CheckStatus,
}

/// `GET /api/providers/check`: round-trip both AI providers.
///
/// Builds clients from the environment per request; misconfiguration
/// shows up here as an error check rather than a crashed server.
pub async fn check_providers() -> (StatusCode, Json<ProviderChecks>) {
    let conversation = match ConversationClient::from_env() {
        Ok(client) => CheckStatus::from_result(client.check().await),
        Err(e) => CheckStatus::error(e.to_string()),
    };
    let speech = match SpeechClient::from_env() {
        Ok(client) => CheckStatus::from_result(client.check().await),
        Err(e) => CheckStatus::error(e.to_string()),
    };

    let all_ok = conversation.status == "ok" && speech.status == "ok";
    let code = if all_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (code, Json(ProviderChecks { conversation, speech }))
}
