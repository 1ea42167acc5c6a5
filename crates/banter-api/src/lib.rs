//! HTTP API for the BanterClips pipeline.
//!
//! Exposes job submission and status over REST. Submissions are
//! validated, persisted as pending jobs, and handed to the dispatcher;
//! the pipeline itself runs out of band and the API only ever reads the
//! job record back.

pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod services;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use services::{StallSweeper, STALL_ERROR_MESSAGE};
pub use state::AppState;
