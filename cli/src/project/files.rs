//! Reading and writing project files
//!
//! Uploads are keyed by `/`-separated paths relative to the project root, in
//! sorted order, so the same tree always produces the same request body.

use std::path::{Component, Path};

use backend_im_openapi::FileMap;
use ignore::overrides::OverrideBuilder;
use ignore::WalkBuilder;
use tracing::debug;

use crate::errors::CliError;
use crate::filesys::file::File;

/// Paths never uploaded, on top of hidden files and `.gitignore` entries
pub const EXCLUDED_PATTERNS: &[&str] = &[
    ".git/",
    "__pycache__/",
    "*.pyc",
    ".env",
    "node_modules/",
    ".backend-im/",
];

/// Collect the project files on the blocking pool
pub async fn collect_project_files(root: &Path) -> Result<FileMap, CliError> {
    let root = root.to_path_buf();
    tokio::task::spawn_blocking(move || read_project_files(&root))
        .await
        .map_err(|e| CliError::ProjectError(format!("file walk did not finish: {}", e)))?
}

/// Collect the files of the project rooted at `root`
pub fn read_project_files(root: &Path) -> Result<FileMap, CliError> {
    if !root.is_dir() {
        return Err(CliError::ProjectError(format!(
            "directory does not exist: {}",
            root.display()
        )));
    }

    let mut overrides = OverrideBuilder::new(root);
    for pattern in EXCLUDED_PATTERNS {
        overrides
            .add(&format!("!{}", pattern.trim_end_matches('/')))
            .map_err(|e| CliError::ProjectError(e.to_string()))?;
    }
    let overrides = overrides
        .build()
        .map_err(|e| CliError::ProjectError(e.to_string()))?;

    let walker = WalkBuilder::new(root)
        .hidden(true)
        .parents(false)
        .git_ignore(true)
        .git_exclude(false)
        .git_global(false)
        .require_git(false)
        .overrides(overrides)
        .sort_by_file_name(|a, b| a.cmp(b))
        .build();

    let mut files = FileMap::new();
    for entry in walker {
        let entry = entry.map_err(|e| CliError::ProjectError(e.to_string()))?;
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }

        let path = entry.path();
        let relative = path
            .strip_prefix(root)
            .map_err(|e| CliError::ProjectError(e.to_string()))?;
        let key = relative_key(relative);

        let bytes = std::fs::read(path)?;
        let content = String::from_utf8(bytes).map_err(|_| {
            CliError::ProjectError(format!("{} is not valid UTF-8", path.display()))
        })?;

        debug!("Collected {} ({} bytes)", key, content.len());
        files.insert(key, content);
    }

    Ok(files)
}

fn relative_key(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Write `files` below `root`, creating directories as needed.
///
/// Paths that are absolute or climb out of `root` are rejected.
pub async fn write_project_files(files: &FileMap, root: &Path) -> Result<(), CliError> {
    for (name, content) in files {
        let relative = Path::new(name);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            return Err(CliError::ProjectError(format!(
                "refusing to write outside the project: {}",
                name
            )));
        }

        File::new(root.join(relative)).write_string(content).await?;
    }
    Ok(())
}
