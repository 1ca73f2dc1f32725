// ABOUTME: Command-line front end for managing the host roster and rebooting hosts over SSH
// ABOUTME: Parses arguments, calls the core operations and prints their results

mod app;
mod batch;
mod config;
mod error;
mod hosts;
mod logging;
mod ssh;

use anyhow::{Context, Result};
use app::App;
use batch::BatchReport;
use clap::{Parser, Subcommand};
use config::Config;
use error::StoreError;
use hosts::{HostCredential, HostSelector, LoadStatus};
use ssh::{RemoteSession, SshSession};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, warn};

#[derive(Parser)]
#[command(name = "fleetboot")]
#[command(version, about = "Keep a roster of remote machines and reboot them over SSH", long_about = None)]
struct Cli {
    /// Configuration file (defaults to the platform config directory)
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    /// Roster file, overriding the configured store path
    #[arg(long, value_name = "PATH", global = true)]
    store: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write the default configuration file
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    #[command(flatten)]
    Roster(RosterCommand),
}

/// Commands that work on the loaded roster.
#[derive(Subcommand)]
enum RosterCommand {
    /// Add a host to the roster
    Add {
        address: String,
        username: String,
        /// Login password, also used for sudo on the host
        #[arg(long, env = "FLEETBOOT_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Remove hosts by position or address
    Remove {
        #[arg(required = true, value_name = "SELECTOR")]
        selectors: Vec<HostSelector>,
    },

    /// List the roster
    List {
        #[arg(long)]
        show_passwords: bool,
    },

    /// Reboot the given hosts, or every host when none are given
    Reboot {
        #[arg(value_name = "SELECTOR")]
        selectors: Vec<HostSelector>,
    },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let command = match cli.command {
        Command::InitConfig { force } => return init_config(cli.config, force),
        Command::Roster(command) => command,
    };

    let mut config = Config::load_or_default(cli.config.as_deref())?;
    if let Some(store) = &cli.store {
        config.store.path = store.to_string_lossy().into_owned();
    }
    config.expand_paths()?;
    config.validate()?;
    logging::init_logging(&config.logging, cli.verbose)?;

    let (mut app, status) = App::open(&config, SshSession::new(config.ssh.port));
    match status {
        LoadStatus::Loaded(count) => debug!(hosts = count, "Roster ready"),
        LoadStatus::Missing => debug!("Starting with an empty roster"),
        LoadStatus::Corrupt(e) => {
            warn!("{e}");
            eprintln!("warning: {e}; starting with an empty roster");
        }
        LoadStatus::Unreadable(e) => {
            return Err(e)
                .context("Roster file exists but cannot be read; fix its permissions or move it");
        }
    }

    run(&mut app, command)
}

fn run<S: RemoteSession>(app: &mut App<S>, command: RosterCommand) -> Result<ExitCode> {
    match command {
        RosterCommand::Add {
            address,
            username,
            password,
        } => {
            app.add_host(&address, &username, &password)
                .context("Failed to add host")?;
            println!("Added {username}@{address}");
        }

        RosterCommand::Remove { selectors } => match app.remove_hosts(&selectors) {
            Ok(removed) => {
                for host in removed {
                    println!("Removed {host}");
                }
            }
            Err(StoreError::NotFound(what)) => {
                eprintln!("No host matches {what}");
                return Ok(ExitCode::FAILURE);
            }
            Err(e) => return Err(e).context("Failed to remove hosts"),
        },

        RosterCommand::List { show_passwords } => {
            print_hosts(app.list_hosts(), show_passwords);
            if app.store().is_empty() {
                println!("No hosts in {}", app.store().path().display());
            }
        }

        RosterCommand::Reboot { selectors } => {
            let subset = if selectors.is_empty() {
                None
            } else {
                Some(selectors.as_slice())
            };
            let report = app.reboot(subset);
            print_report(&report);
            if !report.all_succeeded() {
                return Ok(ExitCode::FAILURE);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn init_config(path: Option<PathBuf>, force: bool) -> Result<ExitCode> {
    let path = match path {
        Some(path) => path,
        None => Config::default_config_path()?,
    };

    if path.exists() && !force {
        eprintln!(
            "{} already exists, use --force to overwrite",
            path.display()
        );
        return Ok(ExitCode::FAILURE);
    }

    Config::save_default_config(&path)?;
    println!("Wrote {}", path.display());
    Ok(ExitCode::SUCCESS)
}

fn print_hosts(hosts: &[HostCredential], show_passwords: bool) {
    for (position, host) in hosts.iter().enumerate() {
        let password = if show_passwords {
            host.password.clone()
        } else {
            "*".repeat(8)
        };
        println!(
            "{position:>3}  {:<24} {:<16} {password}",
            host.address, host.username
        );
    }
}

fn print_report(report: &BatchReport) {
    if report.is_empty() {
        println!("No hosts to reboot");
        return;
    }

    for outcome in &report.outcomes {
        match &outcome.result {
            Ok(status) if status.success() => println!("ok      {}", outcome.host),
            Ok(status) => println!("failed  {}: {status}", outcome.host),
            Err(e) => println!("failed  {}: {} ({e})", outcome.host, e.kind()),
        }
    }
    println!(
        "{} of {} hosts rebooted, {} failed",
        report.succeeded(),
        report.len(),
        report.failed()
    );
}
