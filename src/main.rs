mod accounts;
mod batch;
mod check;
mod command_log;
mod common;
mod config;
mod directory;
mod error;
mod privileges;
mod provision;
mod report;
mod request;
mod secret;
#[cfg(test)]
mod testing;
mod ui;

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;

use crate::accounts::SystemAccounts;
use crate::command_log::CommandLogger;
use crate::config::ProvisionConfig;
use crate::directory::LdapSearch;
use crate::provision::Provisioner;
use crate::report::ConsoleReporter;
use crate::secret::BindSecret;
use crate::ui::prelude::*;

/// Create SFTP-only accounts from a user list, taking uid and display name
/// from LDAP
#[derive(Parser, Debug)]
#[command(name = "sftp-provision", author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (defaults to /etc/sftp-provision/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Show debug output and log every external command
    #[arg(short, long, global = true)]
    debug: bool,

    /// Output format for the transcript
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    output: OutputFormat,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Provision the accounts listed in FILE, one `user [: group ...]` per line
    Run {
        /// User list, or `-` to read standard input
        file: PathBuf,
        /// Look everything up but print the useradd calls instead of running them
        #[arg(long)]
        dry_run: bool,
        /// Restart through sudo when not running as root
        #[arg(long)]
        sudo: bool,
    },
    /// Verify configuration, bind secret, required tools and primary group
    Check,
}

fn main() {
    let cli = Cli::parse();

    let color = !cli.no_color && std::env::var_os("NO_COLOR").is_none();
    ui::init(cli.output, color);
    ui::set_debug_mode(cli.debug);

    let code = match &cli.command {
        Commands::Run {
            file,
            dry_run,
            sudo,
        } => match provision_from_file(cli.config.as_deref(), file, *dry_run, *sudo) {
            Ok(code) => code,
            Err(e) => {
                emit(
                    Level::Error,
                    "provision.startup_failed",
                    &format!("{} {:#}", char::from(NerdFont::CrossCircle), e),
                    None,
                );
                1
            }
        },
        Commands::Check => check::print_results(&check::run_checks(cli.config.as_deref())),
    };

    std::process::exit(code);
}

/// Run the whole batch. Returns the exit status for a completed or stopped
/// run; startup problems are errors.
fn provision_from_file(
    config_path: Option<&Path>,
    file: &Path,
    dry_run: bool,
    escalate: bool,
) -> Result<i32> {
    if !dry_run {
        privileges::ensure_root(escalate)?;
    }

    let config = ProvisionConfig::load(config_path)?;
    let secret = BindSecret::load(&config.ldap.secret_file)?;
    let input = read_input(file)?;

    emit(
        Level::Debug,
        "provision.config",
        &format!("{} Configuration: {:?}", char::from(NerdFont::Bug), config),
        serde_json::to_value(&config).ok(),
    );

    let logger = CommandLogger::from_environment()?;
    let directory = LdapSearch::new(&config.ldap, &secret, logger.clone());
    let accounts = SystemAccounts::new(logger);
    let mut provisioner = Provisioner::new(&config.account, directory, accounts).dry_run(dry_run);

    if let Err(e) = provisioner.check_primary_group() {
        if !dry_run {
            return Err(e);
        }
        emit(
            Level::Warn,
            "provision.primary_group_missing",
            &format!("{} {:#}", char::from(NerdFont::Warning), e),
            None,
        );
    }

    emit(
        Level::Info,
        "provision.start",
        &format!(
            "{} Provisioning accounts from {} using {}{}",
            char::from(NerdFont::Server),
            file.display(),
            config.ldap.uri,
            if dry_run { " (dry run)" } else { "" }
        ),
        Some(json!({
            "file": file.display().to_string(),
            "uri": config.ldap.uri,
            "dry_run": dry_run,
        })),
    );

    match batch::run(&input, &mut provisioner, &mut ConsoleReporter) {
        Ok(()) => {
            emit(
                Level::Success,
                "provision.done",
                &format!("{} Done", char::from(NerdFont::Check)),
                None,
            );
            Ok(0)
        }
        Err(err) => {
            report::report_failure(&err);
            Ok(err.source.exit_code())
        }
    }
}

fn read_input(file: &Path) -> Result<String> {
    if file == Path::new("-") {
        let mut input = String::new();
        std::io::stdin()
            .read_to_string(&mut input)
            .context("reading user list from standard input")?;
        return Ok(input);
    }
    std::fs::read_to_string(file)
        .with_context(|| format!("reading user list {}", file.display()))
}
