//! User-facing output
//!
//! Everything the user is meant to read goes to stdout through these helpers;
//! diagnostics go through `tracing` to stderr.

use colored::Colorize;

use crate::deploy::{DeploymentResult, ProgressEvent};

pub fn step(message: impl AsRef<str>) {
    println!("{} {}", "=>".cyan().bold(), message.as_ref());
}

pub fn field(name: &str, value: impl AsRef<str>) {
    println!("   {:<14} {}", format!("{}:", name).dimmed(), value.as_ref());
}

pub fn success(message: impl AsRef<str>) {
    println!("{} {}", "ok".green().bold(), message.as_ref());
}

pub fn hint(message: impl AsRef<str>) {
    println!("{} {}", "hint:".yellow(), message.as_ref());
}

pub fn warning(message: impl AsRef<str>) {
    eprintln!("{} {}", "warning:".yellow().bold(), message.as_ref());
}

pub fn error(message: impl AsRef<str>) {
    eprintln!("{} {}", "error:".red().bold(), message.as_ref());
}

/// Render a progress event as it arrives
pub fn progress(event: &ProgressEvent) {
    match event {
        ProgressEvent::StageChanged {
            stage,
            namespace,
            pvc,
        } => {
            let mut line = format!("{} {}", "status:".bold(), stage.to_string().cyan());
            if let Some(namespace) = namespace {
                line.push_str(&format!(" (namespace: {})", namespace));
            }
            if let Some(pvc) = pvc {
                line.push_str(&format!(" (PVC: {})", pvc));
            }
            println!("{}", line);
        }
        ProgressEvent::Log(line) => println!("   {}", line.dimmed()),
    }
}

/// Render the final result of a watch. Failures and unknown outcomes are
/// reported by the caller through its error.
pub fn result(result: &DeploymentResult) {
    match result {
        DeploymentResult::Success { url } => {
            println!();
            success(format!("Deployment URL: {}", url.underline()));
        }
        DeploymentResult::MissingUrl => {
            println!();
            success("Deployment completed");
            warning("the deployment did not report a URL");
        }
        DeploymentResult::Failure { .. } | DeploymentResult::Unknown { .. } => {}
    }
}
