//! `generate`

use std::path::PathBuf;

use chrono::Utc;

use crate::commands::CommandContext;
use crate::errors::CliError;
use crate::output;
use crate::project::files::write_project_files;

/// Directory name used when `--output` is not given
pub fn default_output_dir() -> PathBuf {
    PathBuf::from(format!("backend-{}", Utc::now().timestamp()))
}

/// Generate code from `prompt` and write it below `output`
pub async fn generate(
    ctx: &CommandContext,
    prompt: &str,
    project_id: Option<&str>,
    output: Option<PathBuf>,
) -> Result<(), CliError> {
    let client = ctx.authenticated_client().await?;

    output::step(format!("Generating code from prompt: {}", prompt));
    if let Some(project_id) = project_id {
        output::field("Project", project_id);
    }

    let files = client.generate(prompt).await?;
    let output_dir = output.unwrap_or_else(default_output_dir);

    output::step(format!("Writing files to {}", output_dir.display()));
    write_project_files(&files, &output_dir).await?;

    output::success(format!(
        "Generated {} files in {}",
        files.len(),
        output_dir.display()
    ));
    output::hint("edit the files locally, then run 'backend-im commit <project-id>'");
    Ok(())
}
