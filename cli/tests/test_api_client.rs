//! HTTP client against the mock server

mod common;

use std::time::Duration;

use backend_im::authn::token::Token;
use backend_im::errors::{CliError, WatchError};
use backend_im::http::client::HttpClient;
use backend_im::transport::polling::StatusFetcher;
use backend_im_mock_api::driver::commit_hash;
use backend_im_openapi::{DeploymentStage, FileMap};

use common::{fast_schedule, spawn_mock};

fn authed(base_url: &str) -> HttpClient {
    HttpClient::new(base_url, Duration::from_secs(5))
        .unwrap()
        .with_token(Token::bearer("mock_token_test", 3600))
}

fn project() -> FileMap {
    let mut files = FileMap::new();
    files.insert("main.py".to_string(), "print('hello')\n".to_string());
    files
}

#[tokio::test]
async fn test_verify_with_token() {
    let server = spawn_mock(fast_schedule()).await;
    let verified = authed(&server.base_url).verify_auth().await.unwrap();
    assert!(verified.valid);
    assert_eq!(verified.user_id, "user123");
    assert_eq!(verified.email, "user@example.com");
}

#[tokio::test]
async fn test_verify_without_token_is_rejected() {
    let server = spawn_mock(fast_schedule()).await;
    let client = HttpClient::new(&server.base_url, Duration::from_secs(5)).unwrap();

    match client.verify_auth().await {
        Err(CliError::ApiError { status, body }) => {
            assert_eq!(status, 401);
            assert_eq!(body, "Missing authorization header");
        }
        other => panic!("expected 401, got {:?}", other),
    }
}

#[tokio::test]
async fn test_commit() {
    let server = spawn_mock(fast_schedule()).await;
    let files = project();
    let expected_hash = commit_hash(&files);

    let response = authed(&server.base_url)
        .commit(files, "user123-todo", "Update code from CLI")
        .await
        .unwrap();
    assert_eq!(response.commit_hash, expected_hash);
    assert_eq!(response.project_id, "user123-todo");
    assert_eq!(response.status, "committed");
    assert_eq!(response.message, "Update code from CLI");
}

#[tokio::test]
async fn test_deploy_then_status() {
    let server = spawn_mock(fast_schedule()).await;
    let client = authed(&server.base_url);

    let deployment = client.deploy(project(), "user123-todo").await.unwrap();
    assert_eq!(deployment.project_id, "user123-todo");
    assert_eq!(deployment.commit_hash, commit_hash(&project()));

    let status = client.status(&deployment.deployment_id).await.unwrap();
    assert_eq!(status.id, deployment.deployment_id);
    assert_eq!(status.project_id, "user123-todo");
    assert_eq!(status.commit_hash, deployment.commit_hash);

    let observation = client.fetch_status(&deployment.deployment_id).await.unwrap();
    assert_eq!(observation.deployment_id, deployment.deployment_id);
    assert!(observation.stage.ordinal() <= DeploymentStage::Complete.ordinal());
}

#[tokio::test]
async fn test_generate() {
    let server = spawn_mock(fast_schedule()).await;
    let files = authed(&server.base_url).generate("todo api").await.unwrap();
    assert!(files.contains_key("main.py"));
    assert!(files.contains_key("requirements.txt"));
    assert_eq!(files.len(), 4);
}

#[tokio::test]
async fn test_non_2xx_fetch_is_a_transport_error() {
    let server = spawn_mock(fast_schedule()).await;
    let client = HttpClient::new(&format!("{}/missing", server.base_url), Duration::from_secs(5))
        .unwrap();

    match client.fetch_status("dep").await {
        Err(WatchError::Transport(message)) => assert!(message.contains("404")),
        other => panic!("expected a transport error, got {:?}", other),
    }
}
