//! Utility functions

use serde::{Deserialize, Serialize};

/// Version information for the CLI
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionInfo {
    pub version: String,
    pub git_hash: String,
    pub build_date: String,
}

impl VersionInfo {
    /// One-line form used by `--version` and the User-Agent header
    pub fn long(&self) -> String {
        format!("{} ({} {})", self.version, self.git_hash, self.build_date)
    }
}

/// Get version information
pub fn version_info() -> VersionInfo {
    VersionInfo {
        version: env!("CARGO_PKG_VERSION").to_string(),
        git_hash: option_env!("GIT_HASH").unwrap_or("unknown").to_string(),
        build_date: option_env!("BUILD_DATE").unwrap_or("unknown").to_string(),
    }
}

/// User-Agent sent with every API request
pub fn user_agent() -> String {
    format!("backend-im/{}", version_info().version)
}
