use anyhow::Result;
use colored::Colorize;
use dialoguer::Confirm;
use std::path::Path;

const STARTER_CONFIG: &str = r#"[project]
name = "my-app"

[backend]
dir = "backend"
command = "dotnet"
args = ["run"]
port = 5204
# Poll this path on the backend to decide readiness; when omitted,
# the frontend starts after a fixed delay instead.
# health_path = "/"

[frontend]
dir = "frontend"
command = "npm"
args = ["start"]
port = 3000

[launch]
# Used only when no health_path is configured
startup_delay_secs = 5
ready_timeout_secs = 30
"#;

pub fn run(force: bool) -> Result<()> {
    let path = Path::new("tandem.toml");
    if path.exists() && !force {
        let overwrite = Confirm::new()
            .with_prompt("tandem.toml already exists. Overwrite?")
            .default(false)
            .interact()?;
        if !overwrite {
            println!("{}", "Aborted.".yellow());
            return Ok(());
        }
    }

    tandem_core::utils::write_file(path, STARTER_CONFIG)?;
    println!("  {} tandem.toml", "create".green());
    println!();
    println!(
        "Edit the commands and ports for your project, then run {}.",
        "tandem start".bold()
    );
    Ok(())
}
