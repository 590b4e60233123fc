//! HTTP request handlers

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap};
use axum::Json;
use backend_im_openapi::{
    AuthTokenResponse, AuthVerifyResponse, CommitRequest, CommitResponse, DeployRequest,
    DeployResponse, GenerateRequest, GenerateResponse, StatusResponse,
};
use serde::Deserialize;
use tracing::debug;

use crate::errors::MockError;
use crate::server::state::MockState;

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, MockError> {
    match payload {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => {
            debug!("Rejected request body: {}", rejection);
            Err(MockError::BadRequest("Invalid request".to_string()))
        }
    }
}

/// `POST /api/generate`
pub async fn generate_handler(
    State(state): State<Arc<MockState>>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<GenerateResponse>, MockError> {
    let request = body(payload)?;
    Ok(Json(state.driver.generate(&request.prompt).await))
}

/// `POST /api/deploy`
pub async fn deploy_handler(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    payload: Result<Json<DeployRequest>, JsonRejection>,
) -> Result<Json<DeployResponse>, MockError> {
    let request = body(payload)?;
    let host = headers.get(header::HOST).and_then(|v| v.to_str().ok());
    Ok(Json(state.driver.deploy(&request, host)))
}

/// `POST /api/commit`
pub async fn commit_handler(
    State(state): State<Arc<MockState>>,
    payload: Result<Json<CommitRequest>, JsonRejection>,
) -> Result<Json<CommitResponse>, MockError> {
    let request = body(payload)?;
    Ok(Json(state.driver.commit(&request)))
}

/// `GET /api/status/{deploymentId}`
pub async fn status_handler(
    State(state): State<Arc<MockState>>,
    Path(deployment_id): Path<String>,
) -> Result<Json<StatusResponse>, MockError> {
    if deployment_id.trim().is_empty() {
        return Err(missing_deployment_id());
    }
    Ok(Json(state.driver.status(&deployment_id)))
}

/// `GET /api/status/` without an id
pub async fn status_without_id_handler() -> MockError {
    missing_deployment_id()
}

fn missing_deployment_id() -> MockError {
    MockError::BadRequest("Deployment ID required".to_string())
}

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
}

/// `GET /api/auth/callback?code=`
pub async fn auth_callback_handler(
    State(state): State<Arc<MockState>>,
    Query(params): Query<CallbackParams>,
) -> Result<Json<AuthTokenResponse>, MockError> {
    match params.code.filter(|code| !code.is_empty()) {
        Some(code) => Ok(Json(state.driver.auth_callback(&code))),
        None => Err(MockError::BadRequest(
            "Missing authorization code".to_string(),
        )),
    }
}

/// `GET /api/auth/verify`
pub async fn verify_handler(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
) -> Result<Json<AuthVerifyResponse>, MockError> {
    let authorized = headers
        .get(header::AUTHORIZATION)
        .is_some_and(|value| !value.is_empty());
    if !authorized {
        return Err(MockError::Unauthorized(
            "Missing authorization header".to_string(),
        ));
    }
    Ok(Json(state.driver.verify()))
}
