//! `deploy`

use std::path::Path;
use std::sync::Arc;

use backend_im_openapi::DeployResponse;
use tracing::info;

use crate::commands::CommandContext;
use crate::deploy::{watch, DeploymentResult};
use crate::errors::{CliError, WatchError};
use crate::http::client::HttpClient;
use crate::output;
use crate::project::files::collect_project_files;
use crate::transport::polling::PollingSource;
use crate::transport::streaming::{self, build_stream_url};
use crate::transport::ObservationSource;

/// How progress is observed after the upload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchMode {
    Stream,
    Poll,
}

/// Upload the project, start a deployment and watch it to completion
pub async fn deploy(
    ctx: &CommandContext,
    project_id: &str,
    dir: &Path,
    mode: WatchMode,
) -> Result<(), CliError> {
    let (client, response) = ctx.interruptible(start(ctx, project_id, dir)).await?;

    let mut source = match open_source(ctx, client, &response.deployment_id, mode).await {
        Ok(source) => source,
        Err(WatchError::Cancelled) => return Err(CliError::Interrupted),
        Err(e) => return Err(CliError::Incomplete(e)),
    };

    println!();
    let result = watch(&mut source, |event| output::progress(&event)).await;
    output::result(&result);
    outcome(result)
}

async fn start(
    ctx: &CommandContext,
    project_id: &str,
    dir: &Path,
) -> Result<(HttpClient, DeployResponse), CliError> {
    let client = ctx.authenticated_client().await?;

    output::step(format!("Reading files from {}", dir.display()));
    let files = collect_project_files(dir).await?;
    if files.is_empty() {
        return Err(CliError::ProjectError(format!(
            "no files found in {}",
            dir.display()
        )));
    }
    output::field("Files", files.len().to_string());
    output::field("Project", project_id);

    output::step("Deploying to Backend.im");
    let response = client.deploy(files, project_id).await?;
    output::success("Deployment started");
    output::field("Deployment", &response.deployment_id);
    output::field("Commit", &response.commit_hash);
    output::field("Status", response.status.as_str());
    if let Some(ws_url) = &response.websocket_url {
        info!("Server advertised stream at {}", ws_url);
    }

    Ok((client, response))
}

async fn open_source(
    ctx: &CommandContext,
    client: HttpClient,
    deployment_id: &str,
    mode: WatchMode,
) -> Result<Box<dyn ObservationSource>, WatchError> {
    match mode {
        WatchMode::Poll => {
            output::step("Waiting for the deployment to complete");
            Ok(Box::new(PollingSource::new(
                Arc::new(client),
                deployment_id,
                ctx.settings.polling_options(),
                ctx.cancel.clone(),
            )))
        }
        WatchMode::Stream => {
            let token = client
                .token()
                .cloned()
                .ok_or_else(|| WatchError::Transport("no access token".to_string()))?;
            let url = build_stream_url(client.base_url(), deployment_id)?;

            output::step("Streaming deployment updates");
            let source = streaming::connect(
                &url,
                &token,
                deployment_id,
                ctx.settings.streaming_options(),
                ctx.cancel.clone(),
            )
            .await?;
            Ok(Box::new(source))
        }
    }
}

/// Map a watch result to the command's outcome
pub fn outcome(result: DeploymentResult) -> Result<(), CliError> {
    match result {
        DeploymentResult::Success { .. } | DeploymentResult::MissingUrl => Ok(()),
        DeploymentResult::Failure { reason } => {
            Err(CliError::Watch(WatchError::RemoteFailure(reason)))
        }
        DeploymentResult::Unknown { reason } => Err(CliError::Incomplete(reason)),
    }
}
