pub mod doctor;
pub mod up;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(
    name = "stackup",
    version,
    about = "Start the backend in the background, then the frontend in the foreground"
)]
pub struct Cli {
    /// Project root containing the backend and frontend directories
    #[arg(short = 'C', long, global = true, default_value = ".")]
    pub root: PathBuf,

    /// Show debug diagnostics on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Launch the backend detached and the frontend attached (default)
    Up,
    /// Check project layout, config and programs
    Doctor,
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}

pub fn run(cli: Cli) -> Result<ExitCode> {
    match cli.command.unwrap_or(Commands::Up) {
        Commands::Up => up::run(&cli.root),
        Commands::Doctor => {
            doctor::run(&cli.root)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Completions { shell } => {
            use clap::CommandFactory;
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "stackup", &mut std::io::stdout());
            Ok(ExitCode::SUCCESS)
        }
    }
}
