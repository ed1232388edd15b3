//! CLI argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::installer::{SystemPackages, DEFAULT_PIP};

#[derive(Parser)]
#[command(name = "rocketdoo")]
#[command(author, version, about = "Scaffold and run Odoo development environments", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: SubCommand,

    /// Project directory
    #[arg(long, global = true, env = "ROCKETDOO_PROJECT_DIR", default_value = ".")]
    pub project_dir: PathBuf,

    /// Verbose output (debug logging)
    #[arg(long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum SubCommand {
    /// Create the project skeleton and an empty dependency manifest
    Scaffold,

    /// Run the setup wizard and generate the environment files
    Init {
        /// Read answers from a YAML file instead of prompting
        #[arg(long, value_name = "FILE")]
        answers: Option<PathBuf>,
    },

    /// Regenerate the environment files from rocketdoo.yml
    Render,

    /// Start the environment
    Up {
        /// Run in the background
        #[arg(short, long)]
        detach: bool,
    },

    /// Stop and remove the environment's containers
    Down {
        /// Also remove named volumes
        #[arg(short, long)]
        volumes: bool,
    },

    /// Build the development image
    Build {
        /// Image tag
        #[arg(short, long)]
        tag: Option<String>,
    },

    /// Show container status
    Status,

    /// Show container logs
    Logs {
        /// Container name (default: the project's Odoo container)
        container: Option<String>,

        /// Follow log output
        #[arg(short, long)]
        follow: bool,
    },

    /// Stop containers without removing them
    Stop,

    /// Pause containers
    Pause,

    /// Show the project's configuration and dependencies
    Info {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage external addon dependencies
    Deps {
        #[command(subcommand)]
        action: DepsCommand,
    },

    /// Install a dependency's Python requirements
    InstallDeps {
        /// Dependency directory (default: current directory)
        dir: Option<PathBuf>,

        /// Exit successfully even if installation fails
        #[arg(long)]
        force: bool,

        #[arg(long, value_enum, default_value_t = SystemPackages::Auto)]
        system_packages: SystemPackages,

        /// Package installer executable
        #[arg(long, default_value = DEFAULT_PIP)]
        pip: String,
    },
}

#[derive(Subcommand)]
pub enum DepsCommand {
    /// Declare a dependency and update addons_path
    Add {
        /// Repository URL
        repo: String,

        /// Branch, tag or commit to pin
        #[arg(short, long)]
        rev: String,

        /// Target directory (default: derived from the repository name)
        #[arg(long)]
        target: Option<String>,
    },

    /// Remove a dependency and update addons_path
    Remove {
        /// Target directory of the dependency
        target: String,
    },

    /// List declared dependencies
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Fetch every declared dependency
    Apply {
        /// Install each dependency's Python requirements after fetching
        #[arg(long)]
        install: bool,

        /// Do not fail on installation errors
        #[arg(long)]
        force: bool,

        #[arg(long, value_enum, default_value_t = SystemPackages::Auto)]
        system_packages: SystemPackages,

        /// Package installer executable
        #[arg(long, default_value = DEFAULT_PIP)]
        pip: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Recompute addons_path after editing gitman.yml by hand
    Sync,
}

impl SubCommand {
    /// Commands that commit project files and so must defer Ctrl+C
    pub fn writes_project(&self) -> bool {
        match self {
            SubCommand::Scaffold | SubCommand::Init { .. } | SubCommand::Render => true,
            SubCommand::Deps { action } => matches!(
                action,
                DepsCommand::Add { .. } | DepsCommand::Remove { .. } | DepsCommand::Sync
            ),
            _ => false,
        }
    }
}
