//! Integration tests for the Tandem launch pipeline.
//!
//! These tests exercise config loading, process spawning, the readiness
//! gate, and supervision end-to-end against real child processes. The
//! children are small `sh` scripts, so the whole file is unix-only; no
//! network or external tooling is required.

#![cfg(unix)]

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tandem_core::config::TandemConfig;
use tandem_core::process::ServiceProcess;
use tandem_core::supervisor::{supervise, ExitOutcome};
use tandem_core::{readiness, utils};

/// Helper: lay out a project directory with backend/frontend dirs and a
/// tandem.toml whose services run the given shell scripts.
fn setup_project(backend_script: &str, frontend_script: &str) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();

    std::fs::create_dir_all(dir.path().join("backend")).unwrap();
    std::fs::create_dir_all(dir.path().join("frontend")).unwrap();

    let config = format!(
        r#"[project]
name = "launch-test"

[backend]
dir = "backend"
command = "sh"
args = ["-c", {backend:?}]
port = 5204

[frontend]
dir = "frontend"
command = "sh"
args = ["-c", {frontend:?}]
port = 3000

[launch]
startup_delay_secs = 0
poll_interval_ms = 20
"#,
        backend = backend_script,
        frontend = frontend_script,
    );
    utils::write_file(&dir.path().join("tandem.toml"), &config).unwrap();
    dir
}

fn spawn_backend(cfg: &TandemConfig, project_dir: &Path) -> anyhow::Result<ServiceProcess> {
    ServiceProcess::spawn(
        "backend",
        &cfg.backend.command,
        &cfg.backend.args,
        &project_dir.join(&cfg.backend.dir),
    )
}

fn spawn_frontend(cfg: &TandemConfig, project_dir: &Path) -> anyhow::Result<ServiceProcess> {
    ServiceProcess::spawn(
        "frontend",
        &cfg.frontend.command,
        &cfg.frontend.args,
        &project_dir.join(&cfg.frontend.dir),
    )
}

// ==========================================================================
// Full launch flow
// ==========================================================================

#[test]
fn launch_interrupt_stops_both_services() {
    // Both services run indefinitely; an interrupt arrives shortly after
    // launch. Both handles must be terminated and the launch must end
    // cleanly with the Interrupted outcome.
    let dir = setup_project("touch backend-started; sleep 30", "touch frontend-started; sleep 30");
    let cfg = TandemConfig::load(dir.path()).unwrap();
    cfg.validate().unwrap();

    let mut backend = spawn_backend(&cfg, dir.path()).unwrap();
    readiness::wait_until_ready(&mut backend, &cfg.backend, &cfg.launch).unwrap();
    let mut frontend = spawn_frontend(&cfg, dir.path()).unwrap();

    let interrupted = Arc::new(AtomicBool::new(false));
    let flag = interrupted.clone();
    std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(200));
        flag.store(true, Ordering::SeqCst);
    });

    let outcome = supervise(
        &mut backend,
        &mut frontend,
        &interrupted,
        Duration::from_millis(cfg.launch.poll_interval_ms),
    )
    .unwrap();

    assert!(matches!(outcome, ExitOutcome::Interrupted));
    assert!(backend.terminate_requested());
    assert!(frontend.terminate_requested());

    // Each service ran in its own configured working directory
    assert!(dir.path().join("backend/backend-started").exists());
    assert!(dir.path().join("frontend/frontend-started").exists());
}

#[test]
fn backend_exit_is_observed_and_frontend_stopped() {
    let dir = setup_project("sleep 0.2", "sleep 30");
    let cfg = TandemConfig::load(dir.path()).unwrap();

    let mut backend = spawn_backend(&cfg, dir.path()).unwrap();
    readiness::wait_until_ready(&mut backend, &cfg.backend, &cfg.launch).unwrap();
    let mut frontend = spawn_frontend(&cfg, dir.path()).unwrap();

    let interrupted = AtomicBool::new(false);
    let outcome = supervise(
        &mut backend,
        &mut frontend,
        &interrupted,
        Duration::from_millis(cfg.launch.poll_interval_ms),
    )
    .unwrap();

    match outcome {
        ExitOutcome::BackendExited(status) => assert!(status.success()),
        other => panic!("expected BackendExited, got {:?}", other),
    }
    assert!(frontend.try_wait().unwrap().is_some());
}

// ==========================================================================
// Failure ordering: the frontend must never start
// ==========================================================================

#[test]
fn invalid_backend_command_fails_before_frontend_spawn() {
    let dir = setup_project("sleep 30", "touch frontend-started; sleep 30");
    let mut cfg = TandemConfig::load(dir.path()).unwrap();
    cfg.backend.command = "definitely-not-a-real-command".to_string();

    assert!(spawn_backend(&cfg, dir.path()).is_err());

    // The launch fails at the backend step; no frontend was ever spawned
    assert!(!dir.path().join("frontend/frontend-started").exists());
}

#[test]
fn backend_dying_during_gate_aborts_the_launch() {
    let dir = setup_project("exit 1", "touch frontend-started; sleep 30");
    let mut cfg = TandemConfig::load(dir.path()).unwrap();
    cfg.launch.startup_delay_secs = 5;

    let mut backend = spawn_backend(&cfg, dir.path()).unwrap();
    let err = readiness::wait_until_ready(&mut backend, &cfg.backend, &cfg.launch).unwrap_err();
    assert!(err.to_string().contains("during the startup delay"));

    assert!(!dir.path().join("frontend/frontend-started").exists());
}

// ==========================================================================
// Environment-layered config feeds the launch
// ==========================================================================

#[test]
fn env_override_changes_launch_parameters() {
    let dir = setup_project("sleep 30", "sleep 30");

    // Base config has active = development by default; point it at staging
    let base = std::fs::read_to_string(dir.path().join("tandem.toml")).unwrap();
    let base = format!("{base}\n[environment]\nactive = \"staging\"\n");
    std::fs::write(dir.path().join("tandem.toml"), base).unwrap();

    utils::write_file(
        &dir.path().join("tandem.staging.toml"),
        "[backend]\nport = 8080\n",
    )
    .unwrap();

    let cfg = TandemConfig::load_with_env(dir.path()).unwrap();
    assert_eq!(cfg.backend.port, 8080);
    assert_eq!(cfg.backend.url(), "http://localhost:8080");
    // Untouched sections survive the merge
    assert_eq!(cfg.frontend.port, 3000);
    assert_eq!(cfg.launch.poll_interval_ms, 20);

    let mut backend = spawn_backend(&cfg, dir.path()).unwrap();
    assert!(backend.try_wait().unwrap().is_none());
    backend.terminate().unwrap();
}
