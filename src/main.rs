//! # cbt CLI Entry Point
//!
//! This is the main executable for the `cbt` command-line tool. It parses
//! arguments with clap, builds the compiler registry from the settings file
//! and routes commands to the handlers in [`cbtool::commands`].
//!
//! ## Command Structure
//!
//! - **Compilers**: `compiler list|show|copy|remove|default|detect|set-path`
//! - **Build options**: `resolve`
//! - **Shell**: `completions`

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};
use colored::*;
use std::path::{Path, PathBuf};

use cbtool::commands;
use cbtool::commands::compiler::CompilerOp;
use cbtool::commands::resolve::ResolveArgs;
use cbtool::logging;
use cbtool::toolchain::{self, AutoDetector, CompilerRegistry};
use cbtool::ui;

#[cfg(windows)]
#[link(name = "kernel32")]
unsafe extern "system" {
    fn SetConsoleOutputCP(wCodePageID: u32) -> i32;
}

#[cfg(windows)]
fn enable_windows_utf8_console() {
    unsafe {
        SetConsoleOutputCP(65001);
    }
}

#[cfg(not(windows))]
fn enable_windows_utf8_console() {}

#[derive(Parser)]
#[command(name = "cbt")]
#[command(about = "Compiler registry and build-option resolver for C/C++ toolchains", version = env!("CARGO_PKG_VERSION"))]
#[command(propagate_version = true)]
struct Cli {
    /// Compiler settings file [default: $CBT_SETTINGS or ~/.cbt/compilers.toml]
    #[arg(long, global = true, value_name = "FILE")]
    settings: Option<PathBuf>,

    /// Increase diagnostic output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect and edit registered compilers
    Compiler {
        #[command(subcommand)]
        op: CompilerCommand,
    },
    /// Print the effective build options of a project or target
    Resolve {
        /// Project manifest [default: cbt.toml]
        #[arg(long, value_name = "FILE")]
        project: Option<PathBuf>,
        /// Build target inside the project
        #[arg(long)]
        target: Option<String>,
        /// Compiler id overriding the one the project selects
        #[arg(long)]
        compiler: Option<String>,
        /// Print machine-readable JSON
        #[arg(long)]
        json: bool,
    },
    /// Generate shell completions
    Completions {
        /// Shell to generate for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum CompilerCommand {
    /// List registered compilers (default marked with *)
    List,
    /// Show a compiler's settings and lineage
    Show { id: String },
    /// Create a user copy of a compiler
    Copy {
        id: String,
        /// Display name of the copy
        #[arg(long)]
        name: Option<String>,
    },
    /// Remove a compiler; its copies are relinked to its parent
    Remove {
        id: String,
        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Select the default compiler
    Default { id: String },
    /// Detect installed toolchains
    Detect,
    /// Set the installation directory of a compiler
    SetPath { id: String, path: PathBuf },
}

impl From<CompilerCommand> for CompilerOp {
    fn from(cmd: CompilerCommand) -> Self {
        match cmd {
            CompilerCommand::List => CompilerOp::List,
            CompilerCommand::Show { id } => CompilerOp::Show { id },
            CompilerCommand::Copy { id, name } => CompilerOp::Copy { id, name },
            CompilerCommand::Remove { id, yes } => CompilerOp::Remove { id, yes },
            CompilerCommand::Default { id } => CompilerOp::Default { id },
            CompilerCommand::Detect => CompilerOp::Detect,
            CompilerCommand::SetPath { id, path } => CompilerOp::SetPath { id, path },
        }
    }
}

fn detector() -> AutoDetector {
    let spinner = if console::Term::stdout().is_term() {
        ui::DetectionSpinner::new()
    } else {
        ui::DetectionSpinner::hidden()
    };
    AutoDetector::host().with_progress(spinner)
}

/// Build the registry from `settings`, persisting anything startup detection
/// added.
fn load_registry(settings: &Path, detector: &AutoDetector) -> Result<CompilerRegistry> {
    let (mut registry, outcome) = toolchain::open_registry(settings, detector)
        .with_context(|| format!("Failed to load compiler settings from {}", settings.display()))?;

    for id in &outcome.skipped {
        println!(
            "{} Skipped compiler '{}': its settings name no compiler family",
            "!".yellow(),
            id
        );
    }
    if outcome.detection.as_ref().is_some_and(|r| r.changed()) {
        registry
            .save_settings()
            .context("Failed to save detected compilers")?;
    }
    Ok(registry)
}

fn main() -> Result<()> {
    enable_windows_utf8_console();

    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = Cli::command();
        let bin_name = cmd.get_name().to_string();
        generate(*shell, &mut cmd, bin_name, &mut std::io::stdout());
        return Ok(());
    }

    let settings = cli.settings.clone().unwrap_or_else(toolchain::settings_path);
    log::debug!("Using compiler settings at {}", settings.display());
    let detector = detector();
    let mut registry = load_registry(&settings, &detector)?;

    match cli.command {
        Commands::Compiler { op } => {
            commands::compiler::handle_compiler_command(op.into(), &mut registry, &detector)
        }
        Commands::Resolve {
            project,
            target,
            compiler,
            json,
        } => commands::resolve::handle_resolve(
            ResolveArgs {
                project,
                target,
                compiler,
                json,
            },
            &registry,
        ),
        Commands::Completions { .. } => Ok(()),
    }
}
