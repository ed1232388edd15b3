//! Rocketdoo - Odoo development environment scaffolding
//!
//! Rocketdoo interviews the user, renders a fixed set of environment files
//! (Dockerfile, compose file, Odoo configuration, editor debug settings) and
//! maintains a pinned manifest of external addon repositories that are
//! fetched, and have their Python requirements installed, inside the image.
//!
//! # Example
//!
//! ```no_run
//! use rocketdoo::config::ProjectPaths;
//! use rocketdoo::orchestrator::{InitOptions, Orchestrator};
//! use rocketdoo::answers::TerminalPrompter;
//!
//! let mut prompter = TerminalPrompter::stdio();
//! let report = Orchestrator::new(ProjectPaths::new("."))
//!     .init(&mut prompter, &InitOptions::default())
//!     .unwrap();
//! println!("{}", rocketdoo::orchestrator::next_steps(&report.answers));
//! ```

pub mod answers;
pub mod cli;
pub mod compose;
pub mod config;
pub mod error;
pub mod info;
pub mod installer;
pub mod interrupt;
pub mod manifest;
pub mod orchestrator;
pub mod output;
pub mod persist;
pub mod ports;
pub mod process;
pub mod ssh;
pub mod template;

pub use answers::{AnswerModel, Wizard};
pub use error::{Result, ScaffoldError};
pub use info::ProjectInfo;
pub use manifest::{Manifest, ManifestApplier, ManifestEntry};
pub use orchestrator::Orchestrator;
pub use output::{format_output, OutputFormat, Report};
pub use ports::PortRegistry;
