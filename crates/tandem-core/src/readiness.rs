use crate::config::{BackendConfig, LaunchConfig};
use crate::process::ServiceProcess;
use anyhow::{Context, Result};
use colored::Colorize;
use std::time::{Duration, Instant};

/// Gate between the backend spawn and the frontend spawn.
///
/// With a health path configured, polls the backend's health URL until it
/// answers 2xx, failing after `ready_timeout_secs`. Without one, waits the
/// fixed startup delay. In both modes the backend process is checked every
/// tick: a backend that exits before the gate completes fails the launch,
/// and the frontend is never started.
pub fn wait_until_ready(
    backend: &mut ServiceProcess,
    cfg: &BackendConfig,
    launch: &LaunchConfig,
) -> Result<()> {
    match cfg.health_url() {
        Some(url) => poll_health(backend, &url, launch),
        None => fixed_delay(backend, launch),
    }
}

fn poll_health(backend: &mut ServiceProcess, url: &str, launch: &LaunchConfig) -> Result<()> {
    println!(
        "  {}",
        format!("waiting for backend at {}...", url).dimmed()
    );

    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_millis(launch.probe_timeout_ms))
        .build()
        .context("failed to create HTTP client for readiness probing")?;

    let deadline = Instant::now() + Duration::from_secs(launch.ready_timeout_secs);
    let tick = Duration::from_millis(launch.poll_interval_ms);

    loop {
        if let Some(status) = backend.try_wait()? {
            anyhow::bail!("backend exited ({}) before becoming ready", status);
        }

        if let Ok(resp) = client.get(url).send() {
            if resp.status().is_success() {
                return Ok(());
            }
        }

        if Instant::now() >= deadline {
            anyhow::bail!(
                "backend did not become ready at {} within {}s",
                url,
                launch.ready_timeout_secs
            );
        }
        std::thread::sleep(tick);
    }
}

fn fixed_delay(backend: &mut ServiceProcess, launch: &LaunchConfig) -> Result<()> {
    println!(
        "  {}",
        format!(
            "waiting {}s for the backend to start...",
            launch.startup_delay_secs
        )
        .dimmed()
    );

    let deadline = Instant::now() + Duration::from_secs(launch.startup_delay_secs);
    let tick = Duration::from_millis(launch.poll_interval_ms);

    loop {
        if let Some(status) = backend.try_wait()? {
            anyhow::bail!("backend exited ({}) during the startup delay", status);
        }
        let now = Instant::now();
        if now >= deadline {
            return Ok(());
        }
        std::thread::sleep(tick.min(deadline - now));
    }
}
