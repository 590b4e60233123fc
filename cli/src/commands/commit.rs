//! `commit`

use std::path::Path;

use crate::commands::{CommandContext, DEFAULT_COMMIT_MESSAGE};
use crate::errors::CliError;
use crate::output;
use crate::project::files::collect_project_files;

/// Upload the project tree as a new commit
pub async fn commit(
    ctx: &CommandContext,
    project_id: &str,
    dir: &Path,
    message: Option<String>,
) -> Result<(), CliError> {
    let message = message
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_COMMIT_MESSAGE.to_string());
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
    output::field("Message", &message);

    output::step("Committing changes");
    let response = client.commit(files, project_id, &message).await?;

    output::success("Changes committed");
    output::field("Commit", &response.commit_hash);
    output::field("Status", &response.status);
    output::hint(format!(
        "run 'backend-im deploy {}' to deploy your changes",
        project_id
    ));
    Ok(())
}
