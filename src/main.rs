//! Rocketdoo CLI - scaffold and run Odoo development environments

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use rocketdoo::answers::{default_questions, AnswerModel, Prompter};
use rocketdoo::cli::{Args, DepsCommand, SubCommand};
use rocketdoo::compose::{self, ComposeAction};
use rocketdoo::config::{ProjectPaths, LOG_ENV};
use rocketdoo::installer::{self, Installer};
use rocketdoo::interrupt::{self, INTERRUPTED_EXIT_CODE};
use rocketdoo::manifest::{self, AddonsLayout, GitFetcher, Manifest, ManifestApplier};
use rocketdoo::orchestrator::{next_steps, InitOptions, Orchestrator};
use rocketdoo::process::SystemRunner;
use rocketdoo::{format_output, OutputFormat, ProjectInfo, Report, ScaffoldError};

fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    match run(args) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            if matches!(e.downcast_ref::<ScaffoldError>(), Some(ScaffoldError::Interrupted)) {
                eprintln!("Interrupted.");
                std::process::exit(INTERRUPTED_EXIT_CODE);
            }
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

fn init_tracing(verbose: bool) {
    let env_filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV)
            .or_else(|_| EnvFilter::try_new("warn"))
            .unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(env_filter)
        .init();
}

fn run(args: Args) -> anyhow::Result<i32> {
    let paths = ProjectPaths::new(&args.project_dir);
    if args.command.writes_project() {
        interrupt::install_handler()?;
    }

    match args.command {
        SubCommand::Scaffold => {
            Orchestrator::new(paths.clone()).scaffold()?;
            println!("Project skeleton created in {}", paths.root().display());
            Ok(0)
        }

        SubCommand::Init { answers } => {
            let options = InitOptions { answers_file: answers };
            let mut prompter = prompter()?;
            let report = Orchestrator::new(paths).init(prompter.as_mut(), &options)?;

            println!();
            for file in &report.files {
                println!("  created {}", file);
            }
            if report.dependencies_added > 0 {
                println!("  {} dependencies added to the manifest", report.dependencies_added);
            }
            for warning in &report.warnings {
                eprintln!("\nWarning: {}", warning);
            }
            println!("\n{}", next_steps(&report.answers));
            Ok(0)
        }

        SubCommand::Render => {
            let rendered = Orchestrator::new(paths).rerender()?;
            for file in rendered.paths() {
                println!("  rendered {}", file);
            }
            Ok(0)
        }

        SubCommand::Up { detach } => compose_action(ComposeAction::Up { detached: detach }, &paths),
        SubCommand::Down { volumes } => compose_action(ComposeAction::Down { volumes }, &paths),
        SubCommand::Build { tag } => compose_action(ComposeAction::Build { tag }, &paths),
        SubCommand::Status => compose_action(ComposeAction::Status, &paths),
        SubCommand::Stop => compose_action(ComposeAction::Stop, &paths),
        SubCommand::Pause => compose_action(ComposeAction::Pause, &paths),
        SubCommand::Logs { container, follow } => {
            let container = match container {
                Some(c) => c,
                None => {
                    let answers = load_answers(&paths)?;
                    let project = answers.text("project_name").unwrap_or_default();
                    format!("{}-odoo", project)
                }
            };
            compose_action(ComposeAction::Logs { container, follow }, &paths)
        }

        SubCommand::Info { json } => {
            let info = ProjectInfo::gather(&paths)?;
            println!("{}", format_output(&Report::Info(&info), &OutputFormat::from_flag(json)));
            Ok(0)
        }

        SubCommand::Deps { action } => run_deps(action, &paths),

        SubCommand::InstallDeps { dir, force, system_packages, pip } => {
            let dir = dir.unwrap_or_else(|| paths.root().to_path_buf());
            let name = dir
                .canonicalize()
                .ok()
                .and_then(|d| d.file_name().map(|n| n.to_string_lossy().to_string()))
                .unwrap_or_else(|| dir.display().to_string());

            let runner = SystemRunner;
            let installer = Installer::new(&runner, system_packages.probe()).with_pip(pip);
            let outcome = installer.install_named(&name, &dir);
            print!("{}", format_output(&Report::Install(&outcome), &OutputFormat::Human));
            installer::resolve(std::slice::from_ref(&outcome), force)?;
            Ok(0)
        }
    }
}

fn run_deps(action: DepsCommand, paths: &ProjectPaths) -> anyhow::Result<i32> {
    match action {
        DepsCommand::Add { repo, rev, target } => {
            let manifest = applier(paths)?.add_entry(&repo, &rev, target.as_deref())?;
            if let Some(entry) = manifest.sources.last() {
                println!("Added {} ({} @ {})", entry.name, entry.repo, entry.rev);
            }
            Ok(0)
        }

        DepsCommand::Remove { target } => {
            applier(paths)?.remove_entry(&target)?;
            println!("Removed {}", target);
            Ok(0)
        }

        DepsCommand::List { json } => {
            let manifest = Manifest::load(&paths.manifest())?;
            println!("{}", format_output(&Report::Dependencies(&manifest), &OutputFormat::from_flag(json)));
            Ok(0)
        }

        DepsCommand::Sync => {
            let manifest = applier(paths)?.sync()?;
            println!("addons_path updated ({} dependencies)", manifest.len());
            Ok(0)
        }

        DepsCommand::Apply { install, force, system_packages, pip, json } => {
            let manifest = Manifest::load(&paths.manifest())?;
            let runner = SystemRunner;
            let mut report = manifest::apply(&manifest, paths.root(), &GitFetcher::new(&runner));
            if install {
                let installer = Installer::new(&runner, system_packages.probe()).with_pip(pip);
                manifest::install_fetched(&mut report, &installer);
            }
            println!("{}", format_output(&Report::Apply(&report), &OutputFormat::from_flag(json)));
            report.into_result(force)?;
            Ok(0)
        }
    }
}

fn applier(paths: &ProjectPaths) -> anyhow::Result<ManifestApplier> {
    let answers = load_answers(paths)?;
    Ok(ManifestApplier::new(paths.clone(), AddonsLayout::for_answers(&answers)))
}

fn load_answers(paths: &ProjectPaths) -> anyhow::Result<AnswerModel> {
    AnswerModel::load(&paths.answers(), &default_questions())
        .with_context(|| format!("cannot load project answers from {}", paths.root().display()))
}

fn compose_action(action: ComposeAction, paths: &ProjectPaths) -> anyhow::Result<i32> {
    compose::run(&action, paths)
}

#[cfg(feature = "readline")]
fn prompter() -> anyhow::Result<Box<dyn Prompter>> {
    Ok(Box::new(rocketdoo::answers::ReadlinePrompter::new()?))
}

#[cfg(not(feature = "readline"))]
fn prompter() -> anyhow::Result<Box<dyn Prompter>> {
    Ok(Box::new(rocketdoo::answers::TerminalPrompter::stdio()))
}
