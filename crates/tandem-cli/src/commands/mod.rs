pub mod doctor;
pub mod init;
pub mod start;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "tandem",
    version,
    about = "Development stack launcher: start and supervise a backend + frontend pair"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the backend and frontend and supervise them until exit
    Start,
    /// Write a starter tandem.toml into the current directory
    Init {
        /// Overwrite an existing tandem.toml without asking
        #[arg(long)]
        force: bool,
    },
    /// Check project health and dependencies
    Doctor,
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Start => start::run(),
        Commands::Init { force } => init::run(force),
        Commands::Doctor => doctor::run(),
        Commands::Completions { shell } => {
            use clap::CommandFactory;
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "tandem", &mut std::io::stdout());
            Ok(())
        }
    }
}
