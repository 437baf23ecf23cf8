use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use nukebuild::{
    discover_projects, run_session, CleanEvent, Cleaner, Config, FailureKind, SessionEvent,
};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Remove the bin and obj directories of every project in a solution",
    long_about = None
)]
struct Args {
    /// Solution files, project files or directories (defaults to current directory)
    #[arg(default_values_t = vec![String::from(".")])]
    paths: Vec<String>,

    /// Print every file and directory removed, not only failures
    #[arg(long, short)]
    verbose: bool,

    /// Read settings from this TOML file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Passes over each bin/obj directory before giving up on it
    #[arg(long, value_name = "N")]
    max_passes: Option<u32>,
}

fn print_event(event: &CleanEvent) {
    match event {
        CleanEvent::Failed(failure) if failure.kind == FailureKind::PermissionDenied => {
            println!("{}", event.to_string().red().bold())
        }
        CleanEvent::Failed(_) => println!("{}", event.to_string().red()),
        _ => println!("{}", event),
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = Config::load(args.config.as_deref())?
        .with_flags(args.verbose, args.max_passes)
        .context("Invalid command-line settings")?;

    let inputs: Vec<PathBuf> = args.paths.iter().map(PathBuf::from).collect();
    let projects = discover_projects(&inputs)?;

    println!("{}", "--- Beginning Build Nuke ---".bold());

    // Spinner only when not listing every removal
    let progress = if config.verbose {
        ProgressBar::hidden()
    } else {
        let progress = ProgressBar::new_spinner();
        progress.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .context("Invalid progress template")?,
        );
        progress.enable_steady_tick(Duration::from_millis(100));
        progress
    };

    let cleaner = Cleaner::new(config.clean_options());
    let report = run_session(&projects, &cleaner, |event| match event {
        SessionEvent::ProjectStarted(project) => {
            if config.verbose {
                println!("Cleaning project {} ({})", project.name, project.dir.display());
            }
            progress.set_message(format!("Cleaning {}", project.name));
        }
        SessionEvent::Clean(_, event) => progress.suspend(|| print_event(&event)),
    });

    progress.finish_and_clear();

    println!("{}", "--- Build Nuke Completed ---".bold());
    print!("{}", report.summary.to_string().green());

    for notice in &report.notices {
        match notice.title() {
            Some(title) => eprintln!("{}: {}", title.yellow().bold(), notice.message()),
            None => eprintln!("{}", notice.message().yellow()),
        }
    }

    Ok(())
}
