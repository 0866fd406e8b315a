//! Contract source watching.
//!
//! The watch loop observes the Solidity source tree and re-runs the deploy
//! entry point as a subprocess on every change event, logging its output and
//! any failure without altering its own state. Events are not debounced:
//! rapid consecutive saves may trigger overlapping deploy runs.

use std::path::Path;

use anyhow::{Context, Result};
use notify::{Event, RecursiveMode, Watcher};
use tokio::process::Command;
use tokio::sync::mpsc;

/// Watch `contracts_dir` recursively and re-deploy on changes. Never returns
/// on its own.
pub async fn watch(contracts_dir: &Path, config_path: Option<&Path>) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();

    let mut watcher =
        notify::recommended_watcher(move |res: Result<Event, notify::Error>| match res {
            Ok(event)
                if event.kind.is_create() || event.kind.is_modify() || event.kind.is_remove() =>
            {
                if let Err(e) = tx.send(event.paths) {
                    tracing::error!(err = ?e, "Failed to forward change event");
                }
            }
            Ok(event) => {
                tracing::trace!(event = ?event, "Ignored event emitted by file watcher");
            }
            Err(e) => {
                tracing::error!(err = ?e, "File watcher error");
            }
        })
        .context("Failed to create file watcher")?;

    watcher
        .watch(contracts_dir, RecursiveMode::Recursive)
        .context(format!(
            "Failed to watch contracts directory: {}",
            contracts_dir.display()
        ))?;
    tracing::info!(dir = %contracts_dir.display(), "Watching contracts...");

    // Deploy once up front so a fresh checkout converges without waiting for
    // the first edit.
    run_deploy(config_path).await;

    while let Some(paths) = rx.recv().await {
        for path in &paths {
            tracing::info!(path = %path.display(), "Source changed");
        }
        run_deploy(config_path).await;
    }

    anyhow::bail!("File watcher channel closed unexpectedly")
}

/// Re-invoke the deploy entry point of the current executable.
async fn run_deploy(config_path: Option<&Path>) {
    let exe = match std::env::current_exe() {
        Ok(exe) => exe,
        Err(e) => {
            tracing::error!(err = ?e, "Cannot locate the running executable");
            return;
        }
    };

    tracing::info!("Re-running deployment...");
    let mut cmd = Command::new(exe);
    cmd.arg("deploy");
    if let Some(config_path) = config_path {
        cmd.arg("--config").arg(config_path);
    }

    match cmd.output().await {
        Ok(output) => {
            let stdout = String::from_utf8_lossy(&output.stdout);
            if !stdout.is_empty() {
                println!("{stdout}");
            }
            let stderr = String::from_utf8_lossy(&output.stderr);
            if !stderr.is_empty() {
                eprintln!("{stderr}");
            }
            if !output.status.success() {
                tracing::error!(status = %output.status, "Deploy run failed");
            }
        }
        Err(e) => {
            tracing::error!(err = ?e, "Failed to spawn deploy run");
        }
    }
}
