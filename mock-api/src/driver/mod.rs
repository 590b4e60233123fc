//! Mock service driver
//!
//! Plays the remote side of a deployment. Polled status is a function of the
//! time since the deployment started; the stream replays every stage on a
//! fixed cadence regardless of that clock.

use std::sync::Arc;
use std::time::Duration;

use backend_im_openapi::{
    AuthTokenResponse, AuthVerifyResponse, CommitRequest, CommitResponse, DeployRequest,
    DeployResponse, DeploymentStage, DeploymentUpdate, FileMap, GenerateResponse, StatusResponse,
};
use futures::Stream;
use sha2::{Digest, Sha256};
use tracing::{debug, info};
use uuid::Uuid;

pub mod fixtures;
pub mod store;

use fixtures::{deployment_url, generated_files, stage_log};
use store::{DeploymentStore, DEFAULT_COMMIT_HASH, DEFAULT_PROJECT_ID};

/// Timing of the simulated deployment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    /// How long each polled stage lasts
    pub step: Duration,

    /// Delay between streamed frames
    pub cadence: Duration,

    /// Latency of `generate`
    pub generate_delay: Duration,
}

impl Default for Schedule {
    fn default() -> Self {
        Self {
            step: Duration::from_secs(3),
            cadence: Duration::from_secs(2),
            generate_delay: Duration::from_secs(2),
        }
    }
}

impl Schedule {
    /// Stage reported after `elapsed`. Complete once every non-terminal stage
    /// has had its step.
    pub fn stage_at(&self, elapsed: Duration) -> DeploymentStage {
        if self.step.is_zero() {
            return DeploymentStage::Complete;
        }
        let index = (elapsed.as_nanos() / self.step.as_nanos()) as usize;
        DeploymentStage::ALL
            .get(index)
            .copied()
            .unwrap_or(DeploymentStage::Complete)
    }
}

/// First 12 hex characters of SHA-256 over every `path + content`, in path order
pub fn commit_hash(files: &FileMap) -> String {
    let mut hasher = Sha256::new();
    for (path, content) in files {
        hasher.update(path.as_bytes());
        hasher.update(content.as_bytes());
    }
    let mut hash = hex::encode(hasher.finalize());
    hash.truncate(12);
    hash
}

/// Namespace and PVC name for a deployment
pub fn resource_name(project_id: &str, commit_hash: &str) -> String {
    format!("{}-{}", project_id, commit_hash)
}

/// The simulated remote service
#[derive(Debug, Clone)]
pub struct MockDriver {
    store: Arc<DeploymentStore>,
    schedule: Schedule,
}

impl MockDriver {
    pub fn new(store: Arc<DeploymentStore>, schedule: Schedule) -> Self {
        Self { store, schedule }
    }

    pub fn store(&self) -> &Arc<DeploymentStore> {
        &self.store
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    /// Accept an upload and start a deployment. `host` is the authority the
    /// client reached us on, used to advertise the stream endpoint.
    pub fn deploy(&self, request: &DeployRequest, host: Option<&str>) -> DeployResponse {
        let deployment_id = Uuid::new_v4().to_string();
        let commit_hash = commit_hash(&request.files);
        let project_id = if request.project_id.is_empty() {
            let suffix: String = Uuid::new_v4().to_string().chars().take(8).collect();
            format!("proj-{}", suffix)
        } else {
            request.project_id.clone()
        };

        self.store.register(&deployment_id, &project_id, &commit_hash);
        info!(
            "Deployment {} started for {} at {} ({} files)",
            deployment_id,
            project_id,
            commit_hash,
            request.files.len()
        );

        DeployResponse {
            websocket_url: host
                .map(|host| format!("ws://{}/ws?deploymentId={}", host, deployment_id)),
            deployment_id,
            project_id,
            commit_hash,
            status: DeploymentStage::Queued,
        }
    }

    /// Record a commit without deploying
    pub fn commit(&self, request: &CommitRequest) -> CommitResponse {
        let commit_hash = commit_hash(&request.files);
        info!("Committed {} as {}", request.project_id, commit_hash);
        CommitResponse {
            commit_hash,
            project_id: request.project_id.clone(),
            status: "committed".to_string(),
            message: request.message.clone(),
        }
    }

    /// Point-in-time status. An unknown id starts its clock on first request.
    /// Terminal results are memoized and returned unchanged afterwards.
    pub fn status(&self, deployment_id: &str) -> StatusResponse {
        self.store.with_record(deployment_id, |record| {
            if let Some(terminal) = &record.terminal {
                return terminal.clone();
            }

            let stage = self.schedule.stage_at(record.started_at.elapsed());
            let response = StatusResponse {
                id: deployment_id.to_string(),
                project_id: record.project_id.clone(),
                commit_hash: record.commit_hash.clone(),
                status: stage,
                url: (stage == DeploymentStage::Complete).then(|| deployment_url(deployment_id)),
                logs: vec![stage_log(stage).to_string()],
            };

            if stage.is_terminal() {
                debug!("Memoizing terminal status of {}", deployment_id);
                record.terminal = Some(response.clone());
            }
            response
        })
    }

    /// Every frame of the stream for `deployment_id`, in order
    pub fn stream_frames(&self, deployment_id: &str) -> Vec<DeploymentUpdate> {
        let (project_id, commit_hash) = match self.store.get(deployment_id) {
            Some(record) => (record.project_id, record.commit_hash),
            None => (
                DEFAULT_PROJECT_ID.to_string(),
                DEFAULT_COMMIT_HASH.to_string(),
            ),
        };
        let resource = resource_name(&project_id, &commit_hash);

        DeploymentStage::ALL
            .iter()
            .map(|&stage| DeploymentUpdate {
                deployment_id: deployment_id.to_string(),
                project_id: project_id.clone(),
                commit_hash: commit_hash.clone(),
                status: stage,
                namespace: (stage == DeploymentStage::CreatingNamespace).then(|| resource.clone()),
                pvc: (stage == DeploymentStage::CreatingPvc).then(|| resource.clone()),
                url: (stage == DeploymentStage::Complete).then(|| deployment_url(deployment_id)),
                logs: vec![stage_log(stage).to_string()],
            })
            .collect()
    }

    /// The stream frames paced by the cadence: the first immediately, then one
    /// per interval. The stream ends after `complete`.
    pub fn stream(&self, deployment_id: &str) -> impl Stream<Item = DeploymentUpdate> + Send + 'static {
        let cadence = self.schedule.cadence;
        let frames = self.stream_frames(deployment_id).into_iter().enumerate();

        futures::stream::unfold(frames, move |mut frames| async move {
            let (index, frame) = frames.next()?;
            if index > 0 {
                tokio::time::sleep(cadence).await;
            }
            Some((frame, frames))
        })
    }

    /// Canned project for `prompt`, after the configured latency
    pub async fn generate(&self, prompt: &str) -> GenerateResponse {
        tokio::time::sleep(self.schedule.generate_delay).await;
        info!("Generated project for prompt {:?}", prompt);
        GenerateResponse {
            files: generated_files(prompt),
        }
    }

    /// Exchange an OAuth code for a mock token
    pub fn auth_callback(&self, code: &str) -> AuthTokenResponse {
        debug!("Issuing token for code {}", code);
        AuthTokenResponse {
            access_token: format!("mock_token_{}", Uuid::new_v4()),
            token_type: "Bearer".to_string(),
            expires_in: 3600,
        }
    }

    /// Any presented token is valid
    pub fn verify(&self) -> AuthVerifyResponse {
        AuthVerifyResponse {
            valid: true,
            user_id: "user123".to_string(),
            email: "user@example.com".to_string(),
        }
    }
}
