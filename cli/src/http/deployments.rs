//! Deployment API client

use async_trait::async_trait;
use backend_im_openapi::{
    AuthVerifyResponse, CommitRequest, CommitResponse, DeployRequest, DeployResponse, FileMap,
    GenerateRequest, GenerateResponse, StatusResponse,
};

use crate::deploy::observation::StatusObservation;
use crate::errors::{CliError, WatchError};
use crate::http::client::HttpClient;
use crate::transport::polling::StatusFetcher;

impl HttpClient {
    /// Upload project files and start a deployment
    pub async fn deploy(&self, files: FileMap, project_id: &str) -> Result<DeployResponse, CliError> {
        let request = DeployRequest {
            files,
            project_id: project_id.to_string(),
        };
        self.post("/api/deploy", &request).await
    }

    /// Commit project files without deploying
    pub async fn commit(
        &self,
        files: FileMap,
        project_id: &str,
        message: &str,
    ) -> Result<CommitResponse, CliError> {
        let request = CommitRequest {
            files,
            project_id: project_id.to_string(),
            message: message.to_string(),
        };
        self.post("/api/commit", &request).await
    }

    /// Current status of a deployment
    pub async fn status(&self, deployment_id: &str) -> Result<StatusResponse, CliError> {
        let path = format!("/api/status/{}", deployment_id);
        self.get(&path).await
    }

    /// Generate project files from a prompt
    pub async fn generate(&self, prompt: &str) -> Result<FileMap, CliError> {
        let request = GenerateRequest {
            prompt: prompt.to_string(),
        };
        let response: GenerateResponse = self.post("/api/generate", &request).await?;
        Ok(response.files)
    }

    /// Check the attached token
    pub async fn verify_auth(&self) -> Result<AuthVerifyResponse, CliError> {
        self.get("/api/auth/verify").await
    }
}

#[async_trait]
impl StatusFetcher for HttpClient {
    async fn fetch_status(&self, deployment_id: &str) -> Result<StatusObservation, WatchError> {
        let response = self.status(deployment_id).await?;
        Ok(response.into())
    }
}
