//! Canned content served by the mock

use backend_im_openapi::{DeploymentStage, FileMap};

/// Log line attached to each stage
pub fn stage_log(stage: DeploymentStage) -> &'static str {
    match stage {
        DeploymentStage::Queued => "Deployment queued...",
        DeploymentStage::Committing => "Committing files to repository...",
        DeploymentStage::CreatingNamespace => "Creating Kubernetes namespace...",
        DeploymentStage::CreatingPvc => "Creating Persistent Volume Claim...",
        DeploymentStage::Building => "Building container image...",
        DeploymentStage::Deploying => "Deploying to Kubernetes cluster...",
        DeploymentStage::Complete => "Deployment complete!",
        DeploymentStage::Failed => "Deployment failed",
    }
}

/// Public URL of a finished deployment
pub fn deployment_url(deployment_id: &str) -> String {
    let host: String = deployment_id.chars().take(12).collect();
    format!("https://{}.backend.im", host)
}

/// A small FastAPI project mentioning `prompt`
pub fn generated_files(prompt: &str) -> FileMap {
    let mut files = FileMap::new();
    files.insert(
        "main.py".to_string(),
        format!(
            r#"from fastapi import FastAPI

app = FastAPI()

@app.get("/")
def read_root():
    return {{"message": "Generated from: {}"}}

@app.get("/health")
def health():
    return {{"status": "healthy"}}
"#,
            prompt.replace('"', "\\\"")
        ),
    );
    files.insert(
        "models.py".to_string(),
        r#"from sqlalchemy import Column, Integer, String
from database import Base

class User(Base):
    __tablename__ = "users"
    id = Column(Integer, primary_key=True)
    name = Column(String(50))
"#
        .to_string(),
    );
    files.insert(
        "requirements.txt".to_string(),
        "fastapi==0.104.1\nuvicorn==0.24.0\nsqlalchemy==2.0.23\n".to_string(),
    );
    files.insert(
        "schema.sql".to_string(),
        "CREATE TABLE users (id SERIAL PRIMARY KEY, name VARCHAR(50));\n".to_string(),
    );
    files
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deployment_url_uses_id_prefix() {
        assert_eq!(
            deployment_url("abc123def456-7890"),
            "https://abc123def456.backend.im"
        );
        assert_eq!(deployment_url("short"), "https://short.backend.im");
    }

    #[test]
    fn test_generated_files_mention_prompt() {
        let files = generated_files("todo api");
        assert_eq!(
            files.keys().collect::<Vec<_>>(),
            vec!["main.py", "models.py", "requirements.txt", "schema.sql"]
        );
        assert!(files["main.py"].contains("Generated from: todo api"));
    }
}
