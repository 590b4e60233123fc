//! Settings file management

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::CliError;
use crate::filesys::file::File;
use crate::logs::LogLevel;
use crate::transport::{polling, streaming};

/// Default API endpoint (the local mock server)
pub const DEFAULT_API_URL: &str = "http://localhost:8080";

/// Environment variable overriding the API endpoint
pub const API_URL_ENV: &str = "BACKEND_IM_API_URL";

/// CLI settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Base URL for the Backend.im API
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Seconds between status polls
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Status polls before giving up
    #[serde(default = "default_poll_max_attempts")]
    pub poll_max_attempts: u32,

    /// Seconds without any WebSocket traffic before giving up
    #[serde(default = "default_stream_idle_timeout")]
    pub stream_idle_timeout_secs: u64,

    /// Seconds between WebSocket liveness pings
    #[serde(default = "default_stream_ping_interval")]
    pub stream_ping_interval_secs: u64,

    /// Timeout for individual HTTP requests
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_poll_interval() -> u64 {
    1
}

fn default_poll_max_attempts() -> u32 {
    30
}

fn default_stream_idle_timeout() -> u64 {
    60
}

fn default_stream_ping_interval() -> u64 {
    30
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            log_level: LogLevel::default(),
            poll_interval_secs: default_poll_interval(),
            poll_max_attempts: default_poll_max_attempts(),
            stream_idle_timeout_secs: default_stream_idle_timeout(),
            stream_ping_interval_secs: default_stream_ping_interval(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl Settings {
    /// Load settings, falling back to defaults when the file is absent
    pub async fn load(file: &File) -> Result<Self, CliError> {
        match file.read_json_opt::<Settings>().await {
            Ok(Some(settings)) => Ok(settings),
            Ok(None) => {
                debug!("No settings file at {}, using defaults", file.path().display());
                Ok(Settings::default())
            }
            Err(e) => Err(CliError::ConfigError(format!(
                "Unable to read {}: {}",
                file.path().display(),
                e
            ))),
        }
    }

    /// Apply overrides: command-line flag, then environment, then file value
    pub fn resolve_api_url(&mut self, flag: Option<String>, env: Option<String>) {
        if let Some(url) = flag.or(env).filter(|url| !url.trim().is_empty()) {
            self.api_url = url;
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Options for the polling transport
    pub fn polling_options(&self) -> polling::Options {
        polling::Options {
            interval: Duration::from_secs(self.poll_interval_secs),
            max_attempts: self.poll_max_attempts,
        }
    }

    /// Options for the streaming transport
    pub fn streaming_options(&self) -> streaming::Options {
        streaming::Options {
            idle_timeout: Duration::from_secs(self.stream_idle_timeout_secs),
            ping_interval: Duration::from_secs(self.stream_ping_interval_secs),
            ..Default::default()
        }
    }
}
