use serde_json::json;

use crate::accounts::AccountInfo;
use crate::batch::{BatchError, Reporter};
use crate::common::shell::render_command;
use crate::provision::ProvisionOutcome;
use crate::request::UserRequest;
use crate::ui::prelude::*;

/// Operator transcript on stdout/stderr.
#[derive(Debug, Default)]
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn entry_started(&mut self, line: usize, request: &UserRequest) {
        let groups = if request.supplementary_groups.is_empty() {
            String::new()
        } else {
            format!(" [{}]", request.supplementary_groups.join(" "))
        };
        emit(
            Level::Info,
            "provision.entry.start",
            &format!(
                "{} Working on {}{} (line {})",
                char::from(NerdFont::User),
                request.username,
                groups,
                line
            ),
            Some(json!({
                "line": line,
                "username": request.username,
                "groups": request.supplementary_groups,
            })),
        );
    }

    fn entry_finished(&mut self, line: usize, outcome: &ProvisionOutcome) {
        let data = serde_json::to_value(outcome)
            .ok()
            .map(|mut value| {
                value["line"] = json!(line);
                value
            });

        match outcome {
            ProvisionOutcome::Skipped { username, existing } => {
                emit(
                    Level::Warn,
                    "provision.entry.skipped",
                    &format!(
                        "{} Account {} already exists (uid {}, groups: {}); leaving it unchanged",
                        char::from(NerdFont::Warning),
                        username,
                        existing.uid,
                        existing.groups.join(" ")
                    ),
                    data,
                );
            }
            ProvisionOutcome::Created {
                username,
                uid,
                display_name,
                readback,
                ..
            } => {
                emit(
                    Level::Success,
                    "provision.entry.created",
                    &format!(
                        "{} Created {} ({}) with uid {}",
                        char::from(NerdFont::Check),
                        username,
                        display_name,
                        uid
                    ),
                    data,
                );
                match readback {
                    Some(info) => print_readback(info),
                    None => emit(
                        Level::Warn,
                        "provision.entry.readback_missing",
                        &format!(
                            "{} Could not read back the new entry for {}",
                            char::from(NerdFont::Warning),
                            username
                        ),
                        None,
                    ),
                }
            }
            ProvisionOutcome::Planned { spec } => {
                emit(
                    Level::Info,
                    "provision.entry.planned",
                    &format!(
                        "{} Dry run, would execute: {}",
                        char::from(NerdFont::Terminal),
                        render_command("useradd", &spec.useradd_args())
                    ),
                    data,
                );
            }
        }
    }
}

fn print_readback(info: &AccountInfo) {
    emit(
        Level::Info,
        "provision.entry.readback",
        &format!(
            "    {}:x:{}:{}:{}:{}:{}\n    groups: {}",
            info.username,
            info.uid,
            info.gid,
            info.gecos,
            info.home,
            info.shell,
            info.groups.join(" ")
        ),
        None,
    );
}

/// Error block for the failure that ended the run.
pub fn report_failure(err: &BatchError) {
    separator(false);
    emit(
        Level::Error,
        err.source.code(),
        &format!(
            "{} Provisioning stopped at line {} ({:?}): {}",
            char::from(NerdFont::CrossCircle),
            err.line,
            err.entry,
            err.source
        ),
        Some(json!({
            "line": err.line,
            "entry": err.entry,
            "exit_code": err.source.exit_code(),
            "diagnostics": err.source.diagnostics(),
        })),
    );
    if let Some(diagnostics) = err.source.diagnostics() {
        let indented = diagnostics
            .lines()
            .map(|line| format!("    {line}"))
            .collect::<Vec<_>>()
            .join("\n");
        emit(
            Level::Error,
            "provision.failed.diagnostics",
            &format!("  Directory response:\n{indented}"),
            None,
        );
    }
    emit(
        Level::Info,
        "provision.failed.hint",
        &format!(
            "{} Fix the entry and rerun; accounts created so far will be skipped.",
            char::from(NerdFont::Info)
        ),
        None,
    );
    separator(false);
}
