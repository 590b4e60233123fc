//! Subcommand implementations

use std::future::Future;

use crate::authn::token::load_token;
use crate::errors::CliError;
use crate::http::client::HttpClient;
use crate::storage::layout::StorageLayout;
use crate::storage::settings::Settings;
use crate::transport::Cancellation;

pub mod commit;
pub mod deploy;
pub mod generate;
pub mod login;

/// Message used when `commit` is run without `-m`
pub const DEFAULT_COMMIT_MESSAGE: &str = "Update code from CLI";

/// State shared by every subcommand
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub settings: Settings,
    pub layout: StorageLayout,
    pub cancel: Cancellation,
}

impl CommandContext {
    /// Client without credentials
    pub fn client(&self) -> Result<HttpClient, CliError> {
        HttpClient::new(&self.settings.api_url, self.settings.request_timeout())
    }

    /// Client carrying the stored token
    pub async fn authenticated_client(&self) -> Result<HttpClient, CliError> {
        let token = load_token(&self.layout).await?;
        Ok(self.client()?.with_token(token))
    }

    /// Run `fut` unless Ctrl+C arrives first
    pub async fn interruptible<T, F>(&self, fut: F) -> Result<T, CliError>
    where
        F: Future<Output = Result<T, CliError>>,
    {
        self.cancel
            .guard(fut)
            .await
            .unwrap_or(Err(CliError::Interrupted))
    }
}

/// Pick the project id from the positional argument or `--project`
pub fn resolve_project_id(
    positional: Option<String>,
    flag: Option<String>,
    command: &str,
) -> Result<String, CliError> {
    flag.or(positional)
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| {
            CliError::ProjectError(format!(
                "project ID is required (use: {} <project-id> or --project)",
                command
            ))
        })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::transport::cancellation;

    fn context(cancel: Cancellation) -> CommandContext {
        CommandContext {
            settings: Settings::default(),
            layout: StorageLayout::new("/nonexistent/.backend-im"),
            cancel,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_ctrl_c_interrupts_a_stalled_request() {
        let (handle, cancel) = cancellation();
        let ctx = context(cancel);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(1500)).await;
            handle.cancel();
        });

        let result: Result<(), CliError> = ctx
            .interruptible(async {
                tokio::time::sleep(Duration::from_secs(20)).await;
                Ok(())
            })
            .await;
        let err = result.unwrap_err();
        assert!(matches!(err, CliError::Interrupted));
        assert_eq!(err.exit_code(), 130);
    }

    #[tokio::test]
    async fn test_uninterrupted_result_passes_through() {
        let ctx = context(Cancellation::never());
        let result = ctx
            .interruptible(async { Err::<(), _>(CliError::AuthError("expired".to_string())) })
            .await;
        assert!(matches!(result, Err(CliError::AuthError(_))));
    }

    #[test]
    fn test_flag_wins_over_positional() {
        let id = resolve_project_id(Some("a".to_string()), Some("b".to_string()), "deploy");
        assert_eq!(id.unwrap(), "b");
    }

    #[test]
    fn test_missing_project_id() {
        let err = resolve_project_id(None, Some(" ".to_string()), "commit").unwrap_err();
        assert!(err.to_string().contains("commit <project-id>"));
    }
}
