//! Command-line interface definition

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::logs::LogLevel;
use crate::storage::settings::API_URL_ENV;

#[derive(Debug, Parser)]
#[command(name = "backend-im")]
#[command(about = "Deploy backend code to Backend.im")]
#[command(version)]
pub struct Cli {
    /// Backend.im API base URL
    #[arg(long, global = true, env = API_URL_ENV)]
    pub api_url: Option<String>,

    /// Diagnostic log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<LogLevel>,

    /// Emit diagnostic logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Log in to Backend.im
    Login,

    /// Forget the stored credentials
    Logout,

    /// Generate backend code from a prompt
    Generate {
        /// What to build
        prompt: String,

        /// Project the code belongs to
        #[arg(short, long)]
        project: Option<String>,

        /// Output directory (default: backend-<timestamp>)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Commit local changes without deploying
    Commit {
        /// Project ID
        project_id: Option<String>,

        /// Project ID, instead of the positional argument
        #[arg(short, long)]
        project: Option<String>,

        /// Project directory
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,

        /// Commit message
        #[arg(short, long)]
        message: Option<String>,
    },

    /// Deploy local code and follow its progress
    Deploy {
        /// Project ID
        project_id: Option<String>,

        /// Project ID, instead of the positional argument
        #[arg(short, long)]
        project: Option<String>,

        /// Project directory
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,

        /// Poll the status endpoint instead of streaming updates
        #[arg(long)]
        poll: bool,
    },
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_deploy() {
        let cli = Cli::try_parse_from([
            "backend-im",
            "--log-level",
            "debug",
            "deploy",
            "my-project",
            "--poll",
        ])
        .unwrap();
        assert_eq!(cli.log_level, Some(LogLevel::Debug));
        match cli.command {
            Commands::Deploy {
                project_id,
                dir,
                poll,
                ..
            } => {
                assert_eq!(project_id.as_deref(), Some("my-project"));
                assert_eq!(dir, PathBuf::from("."));
                assert!(poll);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
