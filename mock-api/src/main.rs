//! Mock Backend.im API - Entry Point

use std::sync::Arc;

use anyhow::Context;
use backend_im_mock_api::driver::store::DeploymentStore;
use backend_im_mock_api::driver::MockDriver;
use backend_im_mock_api::logs::{init_logging, LogOptions};
use backend_im_mock_api::options::MockOptions;
use backend_im_mock_api::server::serve::serve;
use backend_im_mock_api::server::state::MockState;
use clap::Parser;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let options = MockOptions::parse();

    init_logging(LogOptions {
        log_level: options.log_level.clone(),
        json_format: options.log_json,
    })
    .context("failed to initialize logging")?;

    info!("Running mock API with options: {:?}", options);
    let driver = MockDriver::new(Arc::new(DeploymentStore::new()), options.schedule());
    let state = Arc::new(MockState::new(driver));

    let (_, handle) = serve(&options.addr, state, await_shutdown_signal()).await?;
    handle.await.context("server task panicked")??;

    info!("Mock API stopped");
    Ok(())
}

async fn await_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm = match signal(SignalKind::terminate()) {
            Ok(sigterm) => sigterm,
            Err(e) => {
                tracing::warn!("Unable to listen for SIGTERM: {}", e);
                let _ = tokio::signal::ctrl_c().await;
                return;
            }
        };

        tokio::select! {
            _ = sigterm.recv() => info!("SIGTERM received, shutting down..."),
            _ = tokio::signal::ctrl_c() => info!("Ctrl+C received, shutting down..."),
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
        info!("Ctrl+C received, shutting down...");
    }
}
