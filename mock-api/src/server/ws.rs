//! Deployment update stream

use std::sync::Arc;

use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::extract::ws::{close_code, CloseFrame, Message, Utf8Bytes, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use backend_im_openapi::DeploymentUpdate;
use futures::{Stream, StreamExt};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::errors::MockError;
use crate::server::state::MockState;

#[derive(Debug, Deserialize)]
pub struct StreamParams {
    #[serde(rename = "deploymentId")]
    pub deployment_id: Option<String>,
}

/// `GET /ws?deploymentId=`
pub async fn ws_handler(
    State(state): State<Arc<MockState>>,
    Query(params): Query<StreamParams>,
    upgrade: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Response {
    let Some(deployment_id) = params.deployment_id.filter(|id| !id.is_empty()) else {
        return MockError::BadRequest("deploymentId required".to_string()).into_response();
    };
    let upgrade = match upgrade {
        Ok(upgrade) => upgrade,
        Err(rejection) => return rejection.into_response(),
    };

    let updates = state.driver.stream(&deployment_id);
    upgrade.on_upgrade(move |socket| stream_updates(socket, deployment_id, updates))
}

enum Wakeup {
    Update(Option<DeploymentUpdate>),
    Incoming(Option<Result<Message, axum::Error>>),
}

async fn stream_updates(
    mut socket: WebSocket,
    deployment_id: String,
    updates: impl Stream<Item = DeploymentUpdate> + Send,
) {
    info!("Streaming updates for {}", deployment_id);
    let mut updates = std::pin::pin!(updates);

    loop {
        let wakeup = tokio::select! {
            update = updates.next() => Wakeup::Update(update),
            incoming = socket.recv() => Wakeup::Incoming(incoming),
        };

        match wakeup {
            Wakeup::Update(Some(update)) => {
                let text = match serde_json::to_string(&update) {
                    Ok(text) => text,
                    Err(e) => {
                        warn!("Failed to encode update for {}: {}", deployment_id, e);
                        return;
                    }
                };
                if let Err(e) = socket.send(Message::Text(text.into())).await {
                    debug!("Client of {} went away: {}", deployment_id, e);
                    return;
                }
            }
            Wakeup::Update(None) => break,
            Wakeup::Incoming(Some(Ok(Message::Close(_)))) | Wakeup::Incoming(None) => {
                debug!("Client closed the stream for {}", deployment_id);
                return;
            }
            Wakeup::Incoming(Some(Err(e))) => {
                debug!("Stream for {} failed: {}", deployment_id, e);
                return;
            }
            Wakeup::Incoming(Some(Ok(_))) => {}
        }
    }

    let close = Message::Close(Some(CloseFrame {
        code: close_code::NORMAL,
        reason: Utf8Bytes::from_static("deployment stream complete"),
    }));
    if let Err(e) = socket.send(close).await {
        debug!("Failed to close the stream for {}: {}", deployment_id, e);
    }
    info!("Finished streaming updates for {}", deployment_id);
}
