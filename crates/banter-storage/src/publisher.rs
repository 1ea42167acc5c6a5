//! Artifact publisher with bounded upload retries.
//!
//! Publishing an output replaces any previous object under the same key:
//! delete the old object (best effort), wait for the deletion to settle,
//! then upload with up to three attempts.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::client::ObjectStore;
use crate::error::{StorageError, StorageResult};

/// Retry and pacing knobs for the publisher.
#[derive(Debug, Clone)]
pub struct PublisherConfig {
    /// Pause after the pre-upload delete before the first upload attempt.
    pub settle_delay: Duration,
    /// Pause between failed upload attempts.
    pub retry_delay: Duration,
    /// Total upload attempts before giving up.
    pub max_attempts: u32,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_secs(2),
            retry_delay: Duration::from_secs(3),
            max_attempts: 3,
        }
    }
}

/// Publishes finished artifacts to object storage.
pub struct Publisher {
    store: Arc<dyn ObjectStore>,
    config: PublisherConfig,
}

impl Publisher {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self::with_config(store, PublisherConfig::default())
    }

    pub fn with_config(store: Arc<dyn ObjectStore>, config: PublisherConfig) -> Self {
        Self { store, config }
    }

    /// Upload a local file to `key`, replacing any existing object.
    ///
    /// The pre-upload delete is best effort. Upload failures are retried
    /// up to `max_attempts` times; the first success wins.
    pub async fn publish_file(
        &self,
        local_path: &Path,
        key: &str,
        content_type: &str,
    ) -> StorageResult<()> {
        let data = tokio::fs::read(local_path).await?;
        self.publish(data, key, content_type).await
    }

    /// Upload bytes to `key`, replacing any existing object.
    pub async fn publish(&self, data: Vec<u8>, key: &str, content_type: &str) -> StorageResult<()> {
        if let Err(e) = self.store.delete(key).await {
            warn!(key = %key, error = %e, "Pre-upload delete failed, continuing");
        }

        if !self.config.settle_delay.is_zero() {
            tokio::time::sleep(self.config.settle_delay).await;
        }

        let mut last_error = String::new();
        for attempt in 1..=self.config.max_attempts {
            match self.store.put(key, data.clone(), content_type).await {
                Ok(()) => {
                    info!(key = %key, attempt, "Upload succeeded");
                    return Ok(());
                }
                Err(e) => {
                    warn!(key = %key, attempt, error = %e, "Upload attempt failed");
                    last_error = e.to_string();
                    if attempt < self.config.max_attempts && !self.config.retry_delay.is_zero() {
                        tokio::time::sleep(self.config.retry_delay).await;
                    }
                }
            }
        }

        Err(StorageError::RetriesExhausted {
            attempts: self.config.max_attempts,
            last_error,
        })
    }
}

/// Join a public base URL and an object key into a fetchable URL.
pub fn public_url(base: &str, key: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), key.trim_start_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct FlakyStore {
        puts: AtomicU32,
        deletes: AtomicU32,
        succeed_on: u32,
    }

    impl FlakyStore {
        fn failing_always() -> Self {
            Self {
                puts: AtomicU32::new(0),
                deletes: AtomicU32::new(0),
                succeed_on: u32::MAX,
            }
        }

        fn succeeding_on(attempt: u32) -> Self {
            Self {
                puts: AtomicU32::new(0),
                deletes: AtomicU32::new(0),
                succeed_on: attempt,
            }
        }
    }

    #[async_trait]
    impl ObjectStore for FlakyStore {
        async fn put(&self, _key: &str, _data: Vec<u8>, _ct: &str) -> StorageResult<()> {
            let n = self.puts.fetch_add(1, Ordering::SeqCst) + 1;
            if n >= self.succeed_on {
                Ok(())
            } else {
                Err(StorageError::upload_failed("transient"))
            }
        }

        async fn delete(&self, _key: &str) -> StorageResult<()> {
            self.deletes.fetch_add(1, Ordering::SeqCst);
            Err(StorageError::delete_failed("no such object"))
        }
    }

    fn fast_config() -> PublisherConfig {
        PublisherConfig {
            settle_delay: Duration::ZERO,
            retry_delay: Duration::ZERO,
            max_attempts: 3,
        }
    }

    #[tokio::test]
    async fn gives_up_after_three_attempts() {
        let store = Arc::new(FlakyStore::failing_always());
        let publisher = Publisher::with_config(store.clone(), fast_config());

        let result = publisher.publish(vec![1, 2, 3], "a/output.mp4", "video/mp4").await;

        assert!(matches!(
            result,
            Err(StorageError::RetriesExhausted { attempts: 3, .. })
        ));
        assert_eq!(store.puts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn stops_retrying_on_first_success() {
        let store = Arc::new(FlakyStore::succeeding_on(2));
        let publisher = Publisher::with_config(store.clone(), fast_config());

        publisher
            .publish(vec![1], "a/output.mp4", "video/mp4")
            .await
            .unwrap();

        assert_eq!(store.puts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn delete_failure_does_not_abort_publish() {
        let store = Arc::new(FlakyStore::succeeding_on(1));
        let publisher = Publisher::with_config(store.clone(), fast_config());

        publisher
            .publish(vec![1], "a/output.mp4", "video/mp4")
            .await
            .unwrap();

        assert_eq!(store.deletes.load(Ordering::SeqCst), 1);
        assert_eq!(store.puts.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn public_url_joins_cleanly() {
        assert_eq!(
            public_url("https://cdn.example.com/", "/abc/output.mp4"),
            "https://cdn.example.com/abc/output.mp4"
        );
        assert_eq!(
            public_url("https://cdn.example.com", "abc/output.mp4"),
            "https://cdn.example.com/abc/output.mp4"
        );
    }
}
