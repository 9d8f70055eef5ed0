use anyhow::Result;
use colored::Colorize;
use std::path::Path;
use std::process::Command;

use tandem_core::config::TandemConfig;

struct CheckResult {
    passed: bool,
    message: String,
}

impl CheckResult {
    fn pass(message: impl Into<String>) -> Self {
        Self {
            passed: true,
            message: message.into(),
        }
    }

    fn fail(message: impl Into<String>) -> Self {
        Self {
            passed: false,
            message: message.into(),
        }
    }
}

fn check_config() -> (CheckResult, Option<TandemConfig>) {
    let path = Path::new("tandem.toml");
    if !path.exists() {
        return (
            CheckResult::fail("tandem.toml not found (run: tandem init)"),
            None,
        );
    }
    match TandemConfig::load_with_env(Path::new(".")) {
        Ok(config) => match config.validate() {
            Ok(()) => (
                CheckResult::pass("tandem.toml found and valid"),
                Some(config),
            ),
            Err(e) => (CheckResult::fail(format!("tandem.toml invalid: {}", e)), None),
        },
        Err(e) => (
            CheckResult::fail(format!("tandem.toml unreadable: {}", e)),
            None,
        ),
    }
}

fn check_service_dir(label: &str, dir: &Path) -> CheckResult {
    if dir.is_dir() {
        CheckResult::pass(format!("{} directory {} exists", label, dir.display()))
    } else {
        CheckResult::fail(format!("{} directory {} not found", label, dir.display()))
    }
}

fn check_command(label: &str, command: &str) -> CheckResult {
    match Command::new(command).arg("--version").output() {
        Ok(output) => {
            if output.status.success() {
                let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
                let short = version
                    .split_whitespace()
                    .next()
                    .unwrap_or(&version)
                    .to_string();
                CheckResult::pass(format!("{} command `{}` ({})", label, command, short))
            } else {
                CheckResult::pass(format!("{} command `{}` found", label, command))
            }
        }
        Err(_) => CheckResult::fail(format!(
            "{} command `{}` not found on PATH",
            label, command
        )),
    }
}

fn check_port(label: &str, port: u16) -> CheckResult {
    match std::net::TcpListener::bind(("127.0.0.1", port)) {
        Ok(_) => CheckResult::pass(format!("{} port {} is available", label, port)),
        Err(_) => CheckResult::fail(format!(
            "{} port {} is already in use",
            label, port
        )),
    }
}

pub fn run() -> Result<()> {
    println!("{}", "Tandem Doctor".bold());
    println!();

    // === Configuration ===
    println!("{}", "Configuration".bold().underline());
    let (config_check, config) = check_config();
    print_checks(std::slice::from_ref(&config_check));

    // === Services ===
    let mut service_checks = Vec::new();
    if let Some(config) = &config {
        service_checks.push(check_service_dir("Backend", &config.backend.dir));
        service_checks.push(check_service_dir("Frontend", &config.frontend.dir));
        service_checks.push(check_command("Backend", &config.backend.command));
        service_checks.push(check_command("Frontend", &config.frontend.command));
        service_checks.push(check_port("Backend", config.backend.port));
        service_checks.push(check_port("Frontend", config.frontend.port));

        println!();
        println!("{}", "Services".bold().underline());
        print_checks(&service_checks);
    }

    // === Summary ===
    let total = 1 + service_checks.len();
    let passed = usize::from(config_check.passed)
        + service_checks.iter().filter(|c| c.passed).count();
    let failed = total - passed;

    println!();
    let summary = format!("{}/{} checks passed", passed, total);
    if failed == 0 {
        println!("{}", summary.green().bold());
    } else {
        println!("{}", summary.yellow().bold());
        println!(
            "{}",
            format!("{} issue(s) found — see above for details", failed).yellow()
        );
    }

    Ok(())
}

fn print_checks(checks: &[CheckResult]) {
    for check in checks {
        if check.passed {
            println!("  {} {}", "\u{2713}".green(), check.message);
        } else {
            println!("  {} {}", "\u{2717}".red(), check.message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn free_port_passes() {
        // Bind to an ephemeral port, release it, then check it
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        assert!(check_port("Backend", port).passed);
    }

    #[test]
    fn occupied_port_fails() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        assert!(!check_port("Frontend", port).passed);
    }

    #[test]
    fn missing_dir_fails() {
        assert!(!check_service_dir("Backend", Path::new("/nonexistent/tandem-dir")).passed);
    }

    #[test]
    fn unknown_command_fails() {
        assert!(!check_command("Backend", "definitely-not-a-real-command").passed);
    }
}
