// SPDX-License-Identifier: MPL-2.0

use std::process::Command;

fn main() {
    // Re-run build script if git HEAD changes
    println!("cargo::rerun-if-changed=.git/HEAD");
    println!("cargo::rerun-if-changed=.git/refs/tags");
    println!("cargo::rerun-if-env-changed=FLOWERCAM_VERSION");

    // Packagers can pin the version string
    let version = match std::env::var("FLOWERCAM_VERSION") {
        Ok(v) if !v.trim().is_empty() => v,
        _ => git_version().unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string()),
    };

    println!("cargo::rustc-env=GIT_VERSION={}", version);
}

/// `0.1.0-abcdef1` at a tag, `0.1.0-dirty-abcdef1` past one, `abcdef1` without tags
fn git_version() -> Option<String> {
    let output = Command::new("git")
        .args(["describe", "--tags", "--always", "--match", "v*"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }

    let described = String::from_utf8_lossy(&output.stdout).trim().to_string();
    let described = described.strip_prefix('v').unwrap_or(&described);
    let commit_hash = commit_hash()?;

    let parts: Vec<&str> = described.rsplitn(3, '-').collect();
    Some(match parts.as_slice() {
        [hash, _commits, base] => {
            format!("{}-dirty-{}", base, hash.strip_prefix('g').unwrap_or(hash))
        }
        _ if described == commit_hash => commit_hash,
        _ => format!("{}-{}", described, commit_hash),
    })
}

fn commit_hash() -> Option<String> {
    let output = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()?;

    output
        .status
        .success()
        .then(|| String::from_utf8_lossy(&output.stdout).trim().to_string())
}
