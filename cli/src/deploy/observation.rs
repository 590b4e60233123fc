//! Status observations

use backend_im_openapi::{DeploymentStage, DeploymentUpdate, StatusResponse};

/// One reported snapshot of a deployment.
///
/// Observations carry no sequence number; their order is the order in which
/// a single transport session delivered them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusObservation {
    pub deployment_id: String,
    pub stage: DeploymentStage,
    pub logs: Vec<String>,
    pub url: Option<String>,
    pub namespace: Option<String>,
    pub pvc: Option<String>,
}

impl StatusObservation {
    /// A bare observation with no metadata
    pub fn new(deployment_id: impl Into<String>, stage: DeploymentStage) -> Self {
        Self {
            deployment_id: deployment_id.into(),
            stage,
            logs: Vec::new(),
            url: None,
            namespace: None,
            pvc: None,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = non_empty(Some(url.into()));
        self
    }

    pub fn with_log(mut self, line: impl Into<String>) -> Self {
        self.logs.push(line.into());
        self
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl From<StatusResponse> for StatusObservation {
    fn from(response: StatusResponse) -> Self {
        Self {
            deployment_id: response.id,
            stage: response.status,
            logs: response.logs,
            url: non_empty(response.url),
            namespace: None,
            pvc: None,
        }
    }
}

impl From<DeploymentUpdate> for StatusObservation {
    fn from(update: DeploymentUpdate) -> Self {
        Self {
            deployment_id: update.deployment_id,
            stage: update.status,
            logs: update.logs,
            url: non_empty(update.url),
            namespace: non_empty(update.namespace),
            pvc: non_empty(update.pvc),
        }
    }
}
