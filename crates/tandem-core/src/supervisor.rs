use crate::process::ServiceProcess;
use anyhow::Result;
use colored::Colorize;
use std::process::ExitStatus;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// How a supervised launch came to an end.
#[derive(Debug)]
pub enum ExitOutcome {
    /// The backend exited first; the frontend was shut down in response.
    BackendExited(ExitStatus),
    /// The frontend exited first; the backend was shut down in response.
    FrontendExited(ExitStatus),
    /// The user interrupted the launcher; both services were shut down.
    Interrupted,
}

/// Supervise both services until one exits or the interrupt flag is set.
///
/// A single polling loop watches both processes, so whichever exits first
/// is observed promptly and its peer receives exactly one termination
/// request. The interrupt flag is set from a Ctrl-C handler by the CLI;
/// the loop itself never touches signals.
pub fn supervise(
    backend: &mut ServiceProcess,
    frontend: &mut ServiceProcess,
    interrupted: &AtomicBool,
    poll_interval: Duration,
) -> Result<ExitOutcome> {
    loop {
        if interrupted.load(Ordering::SeqCst) {
            println!();
            println!("{}", "Stopping backend and frontend...".bold());
            backend.terminate()?;
            frontend.terminate()?;
            return Ok(ExitOutcome::Interrupted);
        }

        if let Some(status) = backend.try_wait()? {
            println!(
                "{}",
                format!("Backend exited ({}), stopping frontend...", status).yellow()
            );
            frontend.terminate()?;
            return Ok(ExitOutcome::BackendExited(status));
        }

        if let Some(status) = frontend.try_wait()? {
            println!(
                "{}",
                format!("Frontend exited ({}), stopping backend...", status).yellow()
            );
            backend.terminate()?;
            return Ok(ExitOutcome::FrontendExited(status));
        }

        std::thread::sleep(poll_interval);
    }
}
