use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tandem_core::config::TandemConfig;
use tandem_core::process::ServiceProcess;
use tandem_core::readiness;
use tandem_core::supervisor::{self, ExitOutcome};

pub fn run() -> Result<()> {
    let project_dir = Path::new(".");
    let config = TandemConfig::load_with_env(project_dir)
        .context("failed to load tandem.toml (run `tandem init` to create one)")?;
    config.validate()?;

    let interrupted = Arc::new(AtomicBool::new(false));
    let flag = interrupted.clone();
    ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst))
        .context("failed to set Ctrl-C handler")?;

    println!("{}", format!("Starting {}...", config.project.name).bold());

    println!(
        "  {} backend: {}",
        "start".green(),
        render_command(&config.backend.command, &config.backend.args)
    );
    let mut backend = ServiceProcess::spawn(
        "backend",
        &config.backend.command,
        &config.backend.args,
        &project_dir.join(&config.backend.dir),
    )?;

    // The frontend is only started once the backend passed the gate
    if let Err(e) = readiness::wait_until_ready(&mut backend, &config.backend, &config.launch) {
        backend.terminate()?;
        return Err(e);
    }

    println!(
        "  {} frontend: {}",
        "start".green(),
        render_command(&config.frontend.command, &config.frontend.args)
    );
    let mut frontend = match ServiceProcess::spawn(
        "frontend",
        &config.frontend.command,
        &config.frontend.args,
        &project_dir.join(&config.frontend.dir),
    ) {
        Ok(p) => p,
        Err(e) => {
            // Don't leave a running backend behind
            backend.terminate()?;
            return Err(e);
        }
    };

    println!();
    println!("{}", "Project started!".green().bold());
    println!("  Backend running at {}", config.backend.url());
    println!("  Frontend running at {}", config.frontend.url());
    println!();
    println!("{}", "Press Ctrl-C to stop both servers.".dimmed());

    let outcome = supervisor::supervise(
        &mut backend,
        &mut frontend,
        &interrupted,
        Duration::from_millis(config.launch.poll_interval_ms),
    )?;

    match outcome {
        ExitOutcome::Interrupted => {
            println!("{}", "Both servers stopped.".green());
            Ok(())
        }
        ExitOutcome::BackendExited(status) if status.success() => {
            println!("{}", "Backend finished; launch complete.".green());
            Ok(())
        }
        ExitOutcome::BackendExited(status) => {
            anyhow::bail!("backend exited with {}", status)
        }
        ExitOutcome::FrontendExited(status) if status.success() => {
            println!("{}", "Frontend finished; launch complete.".green());
            Ok(())
        }
        ExitOutcome::FrontendExited(status) => {
            anyhow::bail!("frontend exited with {}", status)
        }
    }
}

fn render_command(command: &str, args: &[String]) -> String {
    if args.is_empty() {
        command.to_string()
    } else {
        format!("{} {}", command, args.join(" "))
    }
}
