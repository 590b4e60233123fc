//! API models

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

mod stage;

pub use stage::DeploymentStage;

/// Project files keyed by relative path
pub type FileMap = BTreeMap<String, String>;

/// `POST /api/deploy` request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployRequest {
    pub files: FileMap,
    pub project_id: String,
}

/// `POST /api/deploy` response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployResponse {
    pub deployment_id: String,
    pub project_id: String,
    pub commit_hash: String,
    pub status: DeploymentStage,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub websocket_url: Option<String>,
}

/// `POST /api/commit` request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitRequest {
    pub files: FileMap,
    pub project_id: String,
    pub message: String,
}

/// `POST /api/commit` response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitResponse {
    pub commit_hash: String,
    pub project_id: String,
    pub status: String,
    pub message: String,
}

/// `GET /api/status/{deploymentId}` response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub id: String,
    pub project_id: String,
    pub commit_hash: String,
    pub status: DeploymentStage,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default)]
    pub logs: Vec<String>,
}

/// A frame pushed over `/ws?deploymentId={id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentUpdate {
    pub deployment_id: String,
    pub project_id: String,
    pub commit_hash: String,
    pub status: DeploymentStage,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pvc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default)]
    pub logs: Vec<String>,
}

/// `POST /api/generate` request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub prompt: String,
}

/// `POST /api/generate` response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub files: FileMap,
}

/// `GET /api/auth/verify` response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthVerifyResponse {
    pub valid: bool,
    pub user_id: String,
    pub email: String,
}

/// `GET /api/auth/callback` response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthTokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}
