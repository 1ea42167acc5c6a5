//! S3-compatible object storage for published artifacts.
//!
//! This crate provides:
//! - `BucketClient`: a thin aws-sdk-s3 wrapper (works against Cloudflare
//!   R2 or any S3-compatible endpoint)
//! - `ObjectStore`: the trait the publisher is written against, so its
//!   retry behavior is testable without a real bucket
//! - `Publisher`: delete-settle-upload with bounded retries

pub mod client;
pub mod error;
pub mod publisher;

pub use client::{BucketClient, BucketConfig, ObjectStore};
pub use error::{StorageError, StorageResult};
pub use publisher::{public_url, Publisher, PublisherConfig};
