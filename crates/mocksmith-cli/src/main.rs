use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

/// Top-level CLI argument parser for the `mocksmith` command
#[derive(Parser)]
#[command(
    name = "mocksmith",
    about = "mocksmith: interface declarations to testify mocks",
    version
)]
struct Cli {
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands for the `mocksmith` CLI
#[derive(Subcommand)]
enum Commands {
    /// Generate mocks for declared interfaces
    Generate(commands::generate::GenerateArgs),
    /// Validate a declaration file
    Validate {
        /// Path to the declaration YAML or JSON file
        file: PathBuf,
    },
    /// List interfaces declared under a directory
    List {
        /// Directory containing declaration files
        #[arg(default_value = ".")]
        dir: PathBuf,
        /// Descend into subdirectories
        #[arg(long)]
        recursive: bool,
        /// Output format: text (default) or json
        #[arg(long, default_value = "text")]
        format: String,
    },
}

/// Dispatch a parsed CLI subcommand to its handler
fn run_command(cmd: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        Commands::Generate(args) => commands::generate::run(&args),
        Commands::Validate { file } => commands::validate::run(&file),
        Commands::List {
            dir,
            recursive,
            format,
        } => commands::list::run(&dir, recursive, &format),
    }
}

/// Logs go to stderr so `--print` output stays clean.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    // Fails only when a global subscriber is already set, which keeps it.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .ok();
}

/// Entry point: parse CLI arguments and run the selected subcommand
fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run_command(cli.command) {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
