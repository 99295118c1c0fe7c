mod resolve;
mod watch;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "refscope",
    version,
    about = "Resolves the compiled package references of a .NET project",
    long_about = "Refscope reads a project manifest and its restore output (obj/project.assets.json) \
                  and lists the compile-time assemblies of every declared package, without running \
                  a build. In watch mode the list is kept current as the manifest changes."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve package references once and print them
    Resolve {
        /// Path to the project manifest (*.csproj)
        #[arg(value_name = "MANIFEST")]
        path: PathBuf,

        /// Print references as a JSON array
        #[arg(long)]
        json: bool,
    },
    /// Keep package references resolved while the manifest changes
    #[command(
        long_about = "Resolves the project, then watches the manifest. Every edit triggers a new \
                            resolution pass; renaming the manifest reloads the restore output for \
                            the new name, and deleting it stops the watcher."
    )]
    Watch {
        /// Path to the project manifest (*.csproj)
        #[arg(value_name = "MANIFEST")]
        path: PathBuf,

        /// Quiet period in milliseconds used to coalesce bursts of changes
        #[arg(long, value_name = "MS")]
        debounce_ms: Option<u64>,
    },
}

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Resolve writes its result to stdout, so logs only go to the file there.
    let to_stderr = matches!(cli.command, Commands::Watch { .. });
    let _guard = refscope_core::logging::init_logging("cli", to_stderr);

    match cli.command {
        Commands::Resolve { path, json } => resolve::run(path, json),
        Commands::Watch { path, debounce_ms } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(watch::run(path, debounce_ms))
        }
    }
}
