//! Per-deployment state of the mock service
//!
//! The store is owned by whoever constructs the driver, so independent drivers
//! (one per test, say) never share deployments.

use std::collections::HashMap;
use std::sync::Mutex;

use backend_im_openapi::StatusResponse;
use tokio::time::Instant;

/// Project reported for deployments the store has never seen
pub const DEFAULT_PROJECT_ID: &str = "user123-myproject";

/// Commit reported for deployments the store has never seen
pub const DEFAULT_COMMIT_HASH: &str = "a1b2c3d4e5f6";

/// What the store knows about one deployment
#[derive(Debug, Clone)]
pub struct DeploymentRecord {
    pub project_id: String,
    pub commit_hash: String,

    /// Start of the stage clock
    pub started_at: Instant,

    /// Memoized terminal status, returned unchanged once set
    pub terminal: Option<StatusResponse>,
}

impl DeploymentRecord {
    fn new(project_id: String, commit_hash: String) -> Self {
        Self {
            project_id,
            commit_hash,
            started_at: Instant::now(),
            terminal: None,
        }
    }
}

/// Deployment records keyed by deployment id
#[derive(Debug, Default)]
pub struct DeploymentStore {
    records: Mutex<HashMap<String, DeploymentRecord>>,
}

impl DeploymentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new deployment, starting its stage clock now
    pub fn register(&self, deployment_id: &str, project_id: &str, commit_hash: &str) {
        let mut records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        records.insert(
            deployment_id.to_string(),
            DeploymentRecord::new(project_id.to_string(), commit_hash.to_string()),
        );
    }

    /// Run `f` on the record for `deployment_id`, creating one with the
    /// default project and commit if the id is unknown. The lock is held for
    /// the whole call.
    pub fn with_record<T>(
        &self,
        deployment_id: &str,
        f: impl FnOnce(&mut DeploymentRecord) -> T,
    ) -> T {
        let mut records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        let record = records.entry(deployment_id.to_string()).or_insert_with(|| {
            DeploymentRecord::new(
                DEFAULT_PROJECT_ID.to_string(),
                DEFAULT_COMMIT_HASH.to_string(),
            )
        });
        f(record)
    }

    /// Snapshot of a record, without creating one
    pub fn get(&self, deployment_id: &str) -> Option<DeploymentRecord> {
        let records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        records.get(deployment_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
