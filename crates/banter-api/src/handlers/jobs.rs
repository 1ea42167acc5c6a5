//! Job submission and status handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use banter_models::{clean_source_url, extract_video_id, Job, JobConfig, JobId, JobSubmission};
use banter_storage::public_url;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Request body for job submission.
#[derive(Debug, Deserialize)]
pub struct SubmitJobRequest {
    /// Source video URL
    pub url: String,
    /// Pipeline configuration
    pub config: JobConfig,
}

/// Response for job submission.
#[derive(Debug, Serialize)]
pub struct SubmitJobResponse {
    pub job_id: String,
    pub status: String,
}

/// A job as returned to clients.
#[derive(Debug, Serialize)]
pub struct JobResponse {
    pub id: String,
    pub source_url: String,
    pub source_id: String,
    pub status: String,
    pub config: JobConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub created_at: String,
}

impl JobResponse {
    fn from_job(job: Job, public_base_url: &str) -> Self {
        let output_url = job
            .output_path
            .as_deref()
            .map(|key| public_url(public_base_url, key));

        Self {
            id: job.id.to_string(),
            source_url: job.source_url,
            source_id: job.source_id,
            status: job.status.as_str().to_string(),
            config: job.config,
            output_path: job.output_path,
            output_url,
            error_message: job.error_message,
            created_at: job.created_at.to_rfc3339(),
        }
    }
}

/// `POST /api/jobs`: validate, enqueue, and kick off a dispatch.
pub async fn submit_job(
    State(state): State<AppState>,
    Json(req): Json<SubmitJobRequest>,
) -> ApiResult<(StatusCode, Json<SubmitJobResponse>)> {
    let source_url = clean_source_url(&req.url).to_string();
    let source_id =
        extract_video_id(&source_url).map_err(|e| ApiError::validation(e.to_string()))?;
    req.config
        .validate()
        .map_err(|e| ApiError::validation(e.to_string()))?;

    let job = state
        .store
        .enqueue(JobSubmission {
            source_url,
            source_id,
            config: req.config,
        })
        .await?;

    info!(job_id = %job.id, source_id = %job.source_id, "Job submitted");

    // Kick the dispatcher. The claimed job runs in the background; a
    // dispatch problem is a worker concern, not a submission failure.
    if let Err(e) = state.orchestrator.dispatch().await {
        error!(error = %e, "Dispatch after submission failed");
    }

    Ok((
        StatusCode::ACCEPTED,
        Json(SubmitJobResponse {
            job_id: job.id.to_string(),
            status: job.status.as_str().to_string(),
        }),
    ))
}

/// Response for an explicit dispatch request.
#[derive(Debug, Serialize)]
pub struct ProcessResponse {
    /// Id of the claimed job, absent when nothing was pending
    #[serde(skip_serializing_if = "Option::is_none")]
    pub claimed: Option<String>,
}

/// `POST /api/process`: claim the oldest pending job and start it.
pub async fn process_next(State(state): State<AppState>) -> ApiResult<Json<ProcessResponse>> {
    let claimed = state.orchestrator.dispatch().await.map_err(|e| match e {
        banter_worker::PipelineError::Store(e) => ApiError::Store(e),
        other => ApiError::internal(other.to_string()),
    })?;

    Ok(Json(ProcessResponse {
        claimed: claimed.map(|id| id.to_string()),
    }))
}

/// `GET /api/jobs/:id`: fetch one job.
pub async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<JobResponse>> {
    let job = state
        .store
        .get(&JobId::from_string(&id))
        .await?
        .ok_or_else(|| ApiError::not_found(format!("job {}", id)))?;

    Ok(Json(JobResponse::from_job(job, &state.public_base_url)))
}

/// `GET /api/jobs`: recent jobs, newest first.
///
/// Listing reads double as the stall sweep trigger, so a dead worker's
/// jobs flip to failed the next time anyone looks at the dashboard.
pub async fn list_jobs(State(state): State<AppState>) -> ApiResult<Json<Vec<JobResponse>>> {
    if let Err(e) = state.sweeper.sweep().await {
        error!(error = %e, "Stall sweep failed");
    }

    let jobs = state.store.list_recent(state.config.list_limit).await?;
    Ok(Json(
        jobs.into_iter()
            .map(|j| JobResponse::from_job(j, &state.public_base_url))
            .collect(),
    ))
}
