//! Job store for the BanterClips pipeline.
//!
//! This crate provides:
//! - The `JobStore` trait consumed by the orchestrator and the API
//! - A Redis-backed implementation with an atomic claim (a pending job can
//!   only be claimed while it is still pending, so concurrent dispatchers
//!   cannot double-claim)
//! - An in-process implementation for tests and local development

pub mod error;
pub mod memory;
pub mod redis_store;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryJobStore;
pub use redis_store::{RedisJobStore, RedisStoreConfig};
pub use store::JobStore;
