//! Backend.im CLI - Entry Point

use std::process::ExitCode;

use backend_im::cli::{Cli, Commands};
use backend_im::commands::deploy::WatchMode;
use backend_im::commands::{self, resolve_project_id, CommandContext};
use backend_im::errors::CliError;
use backend_im::logs::{init_logging, LogOptions};
use backend_im::output;
use backend_im::storage::layout::StorageLayout;
use backend_im::storage::settings::Settings;
use backend_im::transport::{cancellation, CancelHandle};
use clap::Parser;
use tracing::{debug, info};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let layout = StorageLayout::default();
    let settings_result = Settings::load(&layout.settings_file()).await;

    let log_options = LogOptions {
        log_level: cli
            .log_level
            .or_else(|| settings_result.as_ref().ok().map(|s| s.log_level))
            .unwrap_or_default(),
        json_format: cli.log_json,
    };
    if let Err(e) = init_logging(log_options) {
        eprintln!("Failed to initialize logging: {e}");
    }

    let mut settings = match settings_result {
        Ok(settings) => settings,
        Err(e) => {
            output::error(e.to_string());
            return ExitCode::from(e.exit_code());
        }
    };
    // clap already folds the environment variable into the flag
    settings.resolve_api_url(cli.api_url.clone(), None);
    debug!("Using API at {}", settings.api_url);

    let (handle, cancel) = cancellation();
    tokio::spawn(cancel_on_ctrl_c(handle));

    let ctx = CommandContext {
        settings,
        layout,
        cancel,
    };

    match run(&ctx, cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if e.is_warning() {
                output::warning(e.to_string());
            } else {
                output::error(e.to_string());
            }
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run(ctx: &CommandContext, command: Commands) -> Result<(), CliError> {
    match command {
        Commands::Login => ctx.interruptible(commands::login::login(ctx)).await,
        Commands::Logout => ctx.interruptible(commands::login::logout(ctx)).await,
        Commands::Generate {
            prompt,
            project,
            output,
        } => {
            let generate = commands::generate::generate(ctx, &prompt, project.as_deref(), output);
            ctx.interruptible(generate).await
        }
        Commands::Commit {
            project_id,
            project,
            dir,
            message,
        } => {
            let project_id = resolve_project_id(project_id, project, "commit")?;
            ctx.interruptible(commands::commit::commit(ctx, &project_id, &dir, message))
                .await
        }
        Commands::Deploy {
            project_id,
            project,
            dir,
            poll,
        } => {
            // The watch observes the cancellation itself and closes its transport
            let project_id = resolve_project_id(project_id, project, "deploy")?;
            let mode = if poll { WatchMode::Poll } else { WatchMode::Stream };
            commands::deploy::deploy(ctx, &project_id, &dir, mode).await
        }
    }
}

/// The first Ctrl+C cancels the running command, a second one exits at once
async fn cancel_on_ctrl_c(handle: CancelHandle) {
    if tokio::signal::ctrl_c().await.is_err() {
        return;
    }
    info!("Ctrl+C received, stopping...");
    handle.cancel();

    if tokio::signal::ctrl_c().await.is_ok() {
        std::process::exit(130);
    }
}
