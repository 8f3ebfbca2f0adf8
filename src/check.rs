use std::fmt::Display;
use std::path::Path;

use colored::*;
use serde_json::json;

use crate::accounts::{AccountDatabase, SystemAccounts};
use crate::command_log::CommandLogger;
use crate::config::ProvisionConfig;
use crate::privileges;
use crate::secret::BindSecret;
use crate::ui::prelude::*;

/// External programs the provisioning run shells out to
pub const REQUIRED_TOOLS: &[&str] = &["ldapsearch", "getent", "id", "useradd"];

#[derive(Debug, Clone)]
pub enum CheckStatus {
    Pass(String),
    Fail(String),
    Warning(String),
}

impl CheckStatus {
    pub fn message(&self) -> &str {
        match self {
            CheckStatus::Pass(msg) | CheckStatus::Fail(msg) | CheckStatus::Warning(msg) => msg,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, CheckStatus::Fail(_))
    }

    fn color_status(&self) -> ColoredString {
        match self {
            CheckStatus::Pass(_) => "PASS".green(),
            CheckStatus::Fail(_) => "FAIL".red(),
            CheckStatus::Warning(_) => "WARN".yellow(),
        }
    }

    fn label(&self) -> &'static str {
        match self {
            CheckStatus::Pass(_) => "pass",
            CheckStatus::Fail(_) => "fail",
            CheckStatus::Warning(_) => "warn",
        }
    }
}

#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
}

impl Display for CheckResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} - {}",
            self.name.bold(),
            self.status.color_status(),
            self.status.message()
        )
    }
}

fn result(name: &str, status: CheckStatus) -> CheckResult {
    CheckResult {
        name: name.to_string(),
        status,
    }
}

/// Check that a run could start: configuration, credential, tools, groups.
pub fn run_checks(config_path: Option<&Path>) -> Vec<CheckResult> {
    let mut results = Vec::new();

    let config = match ProvisionConfig::load(config_path) {
        Ok(config) => {
            results.push(result(
                "Configuration",
                CheckStatus::Pass(format!("directory {}", config.ldap.uri)),
            ));
            config
        }
        Err(e) => {
            results.push(result("Configuration", CheckStatus::Fail(format!("{e:#}"))));
            return results;
        }
    };

    results.push(result(
        "Bind secret",
        match BindSecret::load(&config.ldap.secret_file) {
            Ok(_) => CheckStatus::Pass(format!("{} readable", config.ldap.secret_file.display())),
            Err(e) => CheckStatus::Fail(format!("{e:#}")),
        },
    ));

    results.extend(REQUIRED_TOOLS.iter().map(|tool| {
        result(
            &format!("Tool {tool}"),
            match which::which(tool) {
                Ok(path) => CheckStatus::Pass(path.display().to_string()),
                Err(_) => CheckStatus::Fail(format!("{tool} not found in PATH")),
            },
        )
    }));

    let accounts = SystemAccounts::new(CommandLogger::disabled());
    let group = &config.account.primary_group;
    results.push(result(
        "Primary group",
        match accounts.group_exists(group) {
            Ok(true) => CheckStatus::Pass(format!("{group} exists")),
            Ok(false) => CheckStatus::Fail(format!("{group} does not exist")),
            Err(e) => CheckStatus::Fail(format!("{e:#}")),
        },
    ));

    results.push(result(
        "Privileges",
        if privileges::is_root() {
            CheckStatus::Pass("running as root".to_string())
        } else {
            CheckStatus::Warning("not root; only --dry-run is possible".to_string())
        },
    ));

    results
}

/// Print results and return the process exit status.
pub fn print_results(results: &[CheckResult]) -> i32 {
    for check in results {
        let level = match check.status {
            CheckStatus::Pass(_) => Level::Success,
            CheckStatus::Fail(_) => Level::Error,
            CheckStatus::Warning(_) => Level::Warn,
        };
        emit(
            level,
            "check.result",
            &check.to_string(),
            Some(json!({
                "name": check.name,
                "status": check.status.label(),
                "message": check.status.message(),
            })),
        );
    }

    if results.iter().any(|check| check.status.is_failure()) {
        1
    } else {
        0
    }
}
