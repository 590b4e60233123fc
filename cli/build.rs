//! Build script for the backend-im CLI
//! Stamps the binary with the commit and build date shown by `--version`

use chrono::Utc;
use std::env;
use std::process::Command;

fn main() {
    // Container builds have no .git directory, so allow the hash to be passed in
    let git_hash = env::var("BACKEND_IM_GIT_HASH").ok().or_else(|| {
        Command::new("git")
            .args(["rev-parse", "--short", "HEAD"])
            .output()
            .ok()
            .filter(|output| output.status.success())
            .and_then(|output| String::from_utf8(output.stdout).ok())
            .map(|s| s.trim().to_string())
    });

    let build_date = Utc::now().format("%Y-%m-%d").to_string();

    println!(
        "cargo:rustc-env=GIT_HASH={}",
        git_hash.unwrap_or_else(|| "unknown".to_string())
    );
    println!("cargo:rustc-env=BUILD_DATE={}", build_date);

    println!("cargo:rerun-if-env-changed=BACKEND_IM_GIT_HASH");
    println!("cargo:rerun-if-changed=../.git/HEAD");
}
