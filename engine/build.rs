//! Build script for embedding the git commit hash at compile time
//!
//! The hash is printed in the startup banner and by `roleplay doctor`.
//! Builds outside a git checkout report `unknown`.

fn main() {
    let commit_hash = std::process::Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "unknown".to_string());
    println!("cargo:rustc-env=GIT_COMMIT_HASH={}", commit_hash);
    println!("cargo:rerun-if-changed=../.git/HEAD");
}
