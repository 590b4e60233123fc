//! Shared test helpers
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use backend_im::deploy::StatusObservation;
use backend_im::errors::WatchError;
use backend_im::transport::polling::StatusFetcher;
use backend_im::transport::ObservationSource;
use backend_im_mock_api::driver::store::DeploymentStore;
use backend_im_mock_api::driver::{MockDriver, Schedule};
use backend_im_mock_api::server::serve::serve;
use backend_im_mock_api::server::state::MockState;
use tokio::sync::oneshot;

/// Replays a fixed list of observations and counts what was consumed
pub struct ScriptedSource {
    items: VecDeque<Result<StatusObservation, WatchError>>,
    pub consumed: usize,
    pub closed: bool,
}

impl ScriptedSource {
    pub fn new(items: Vec<Result<StatusObservation, WatchError>>) -> Self {
        Self {
            items: items.into(),
            consumed: 0,
            closed: false,
        }
    }

    pub fn remaining(&self) -> usize {
        self.items.len()
    }
}

#[async_trait]
impl ObservationSource for ScriptedSource {
    async fn next(&mut self) -> Option<Result<StatusObservation, WatchError>> {
        let item = self.items.pop_front()?;
        self.consumed += 1;
        Some(item)
    }

    async fn close(&mut self) {
        self.closed = true;
    }
}

/// Status lookups answered in-process by a mock driver
pub struct DriverFetcher(pub MockDriver);

#[async_trait]
impl StatusFetcher for DriverFetcher {
    async fn fetch_status(&self, deployment_id: &str) -> Result<StatusObservation, WatchError> {
        Ok(self.0.status(deployment_id).into())
    }
}

pub fn driver(schedule: Schedule) -> MockDriver {
    MockDriver::new(Arc::new(DeploymentStore::new()), schedule)
}

/// A schedule fast enough for real-time tests
pub fn fast_schedule() -> Schedule {
    Schedule {
        step: Duration::from_millis(40),
        cadence: Duration::from_millis(20),
        generate_delay: Duration::ZERO,
    }
}

/// A running mock server. Dropping it shuts the server down.
pub struct MockServer {
    pub base_url: String,
    pub driver: MockDriver,
    _shutdown: oneshot::Sender<()>,
}

pub async fn spawn_mock(schedule: Schedule) -> MockServer {
    let driver = driver(schedule);
    let state = Arc::new(MockState::new(driver.clone()));
    let (tx, rx) = oneshot::channel::<()>();
    let (addr, _handle) = serve("127.0.0.1:0", state, async move {
        let _ = rx.await;
    })
    .await
    .unwrap();

    MockServer {
        base_url: format!("http://{}", addr),
        driver,
        _shutdown: tx,
    }
}
