//! Polling transport
//!
//! Issues `GET /api/status/{id}` on a fixed cadence. Stages that begin and end
//! between two polls are never seen; only the latest snapshot is reported.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::deploy::observation::StatusObservation;
use crate::errors::WatchError;
use crate::transport::{Cancellation, ObservationSource};

/// Polling options
#[derive(Debug, Clone)]
pub struct Options {
    /// Delay between consecutive status requests
    pub interval: Duration,

    /// Status requests before giving up
    pub max_attempts: u32,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            max_attempts: 30,
        }
    }
}

/// Point-in-time status lookup, implemented by the HTTP client
#[async_trait]
pub trait StatusFetcher: Send + Sync {
    async fn fetch_status(&self, deployment_id: &str) -> Result<StatusObservation, WatchError>;
}

/// Observation source backed by repeated status requests
pub struct PollingSource {
    fetcher: Arc<dyn StatusFetcher>,
    deployment_id: String,
    options: Options,
    cancel: Cancellation,
    attempts: u32,
    started_at: Option<Instant>,
    finished: bool,
}

impl PollingSource {
    pub fn new(
        fetcher: Arc<dyn StatusFetcher>,
        deployment_id: impl Into<String>,
        options: Options,
        cancel: Cancellation,
    ) -> Self {
        Self {
            fetcher,
            deployment_id: deployment_id.into(),
            options,
            cancel,
            attempts: 0,
            started_at: None,
            finished: false,
        }
    }

    /// Status requests issued so far
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    fn finish(&mut self) {
        self.finished = true;
    }
}

#[async_trait]
impl ObservationSource for PollingSource {
    async fn next(&mut self) -> Option<Result<StatusObservation, WatchError>> {
        if self.finished {
            return None;
        }
        if self.cancel.is_cancelled() {
            info!("Status polling cancelled");
            self.finish();
            return None;
        }

        let started_at = *self.started_at.get_or_insert_with(Instant::now);

        if self.attempts > 0 {
            let cancelled = tokio::select! {
                _ = self.cancel.cancelled() => true,
                _ = tokio::time::sleep(self.options.interval) => false,
            };
            if cancelled {
                info!("Status polling cancelled");
                self.finish();
                return None;
            }
        }

        if self.attempts >= self.options.max_attempts {
            self.finish();
            return Some(Err(WatchError::Timeout {
                elapsed: started_at.elapsed(),
                context: format!("a terminal status ({} polls)", self.attempts),
            }));
        }

        self.attempts += 1;
        debug!(
            "Polling status of {} (attempt {}/{})",
            self.deployment_id, self.attempts, self.options.max_attempts
        );

        let result = tokio::select! {
            _ = self.cancel.cancelled() => None,
            result = self.fetcher.fetch_status(&self.deployment_id) => Some(result),
        };

        match result {
            None => {
                info!("Status polling cancelled");
                self.finish();
                None
            }
            Some(Ok(observation)) => {
                if observation.stage.is_terminal() {
                    self.finish();
                }
                Some(Ok(observation))
            }
            Some(Err(e)) => {
                self.finish();
                Some(Err(e))
            }
        }
    }

    async fn close(&mut self) {
        self.finish();
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use backend_im_openapi::DeploymentStage;

    use super::*;
    use crate::transport::cancellation;

    struct ScriptedFetcher {
        responses: Mutex<VecDeque<Result<DeploymentStage, WatchError>>>,
        calls: Mutex<u32>,
    }

    impl ScriptedFetcher {
        fn new(responses: Vec<Result<DeploymentStage, WatchError>>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into()),
                calls: Mutex::new(0),
            })
        }

        fn calls(&self) -> u32 {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl StatusFetcher for ScriptedFetcher {
        async fn fetch_status(&self, deployment_id: &str) -> Result<StatusObservation, WatchError> {
            *self.calls.lock().unwrap() += 1;
            let next = self
                .responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Ok(DeploymentStage::Building));
            next.map(|stage| StatusObservation::new(deployment_id, stage))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_stops_after_terminal_stage() {
        let fetcher = ScriptedFetcher::new(vec![
            Ok(DeploymentStage::Queued),
            Ok(DeploymentStage::Complete),
            Ok(DeploymentStage::Building),
        ]);
        let mut source =
            PollingSource::new(fetcher.clone(), "dep", Options::default(), Cancellation::never());

        assert_eq!(
            source.next().await.unwrap().unwrap().stage,
            DeploymentStage::Queued
        );
        assert_eq!(
            source.next().await.unwrap().unwrap().stage,
            DeploymentStage::Complete
        );
        assert!(source.next().await.is_none());
        assert_eq!(fetcher.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_request_failure_ends_sequence() {
        let fetcher = ScriptedFetcher::new(vec![
            Ok(DeploymentStage::Queued),
            Err(WatchError::Transport("connection refused".to_string())),
        ]);
        let mut source =
            PollingSource::new(fetcher.clone(), "dep", Options::default(), Cancellation::never());

        assert!(source.next().await.unwrap().is_ok());
        assert_eq!(
            source.next().await.unwrap().unwrap_err(),
            WatchError::Transport("connection refused".to_string())
        );
        assert!(source.next().await.is_none());
        assert_eq!(fetcher.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_before_next_poll() {
        let fetcher = ScriptedFetcher::new(vec![]);
        let (handle, cancel) = cancellation();
        let mut source = PollingSource::new(fetcher.clone(), "dep", Options::default(), cancel);

        assert!(source.next().await.unwrap().is_ok());
        handle.cancel();
        assert!(source.next().await.is_none());
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_sleep() {
        let fetcher = ScriptedFetcher::new(vec![]);
        let (handle, cancel) = cancellation();
        let mut source = PollingSource::new(fetcher.clone(), "dep", Options::default(), cancel);
        assert!(source.next().await.unwrap().is_ok());

        let started = Instant::now();
        let canceller = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(300)).await;
            handle.cancel();
        });

        assert!(source.next().await.is_none());
        assert!(started.elapsed() < Duration::from_secs(1));
        assert_eq!(fetcher.calls(), 1);
        canceller.await.unwrap();
    }
}
