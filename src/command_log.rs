use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{OpenOptions, create_dir_all};
use std::io::Write;
use std::path::PathBuf;
use std::process::Output;

use crate::common::paths;

/// One executed external command, as stored in the debug log.
#[derive(Debug, Serialize, Deserialize)]
pub struct CommandLogEntry {
    pub timestamp: DateTime<Utc>,
    pub program: String,
    pub args: Vec<String>,
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
    pub success: bool,
}

/// Appends a JSON line per external command when debug mode is on.
///
/// Arguments must never carry the bind secret; callers pass it through a
/// temporary file instead.
#[derive(Debug, Clone)]
pub struct CommandLogger {
    log_file: Option<PathBuf>,
}

impl CommandLogger {
    /// Logger writing under the data directory if debug mode is enabled.
    pub fn from_environment() -> Result<Self> {
        if !crate::ui::is_debug_enabled() {
            return Ok(Self::disabled());
        }
        let log_dir = paths::command_logs_dir()?;
        Ok(Self::to_file(log_dir.join("commands.jsonl")))
    }

    pub fn disabled() -> Self {
        Self { log_file: None }
    }

    pub fn to_file(path: PathBuf) -> Self {
        Self {
            log_file: Some(path),
        }
    }

    pub fn log_command(&self, program: &str, args: &[String], output: &Output) -> Result<()> {
        let Some(log_file) = &self.log_file else {
            return Ok(());
        };

        if let Some(parent) = log_file.parent() {
            create_dir_all(parent).context("Failed to create command log directory")?;
        }

        let entry = CommandLogEntry {
            timestamp: Utc::now(),
            program: program.to_string(),
            args: args.to_vec(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            exit_code: output.status.code(),
            success: output.status.success(),
        };

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_file)
            .with_context(|| format!("Failed to open command log {}", log_file.display()))?;

        let json_line =
            serde_json::to_string(&entry).context("Failed to serialize command log entry")?;
        writeln!(file, "{json_line}").context("Failed to write command log entry")?;

        Ok(())
    }

    /// Log and swallow logging failures; a broken log must not stop a run.
    pub fn record(&self, program: &str, args: &[String], output: &Output) {
        if let Err(e) = self.log_command(program, args, output) {
            crate::ui::emit(
                crate::ui::Level::Warn,
                "command_log.write_failed",
                &format!("Warning: failed to log {program} command: {e}"),
                None,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::Command;

    #[test]
    fn disabled_logger_writes_nothing() {
        let output = Command::new("true").output().unwrap();
        CommandLogger::disabled()
            .log_command("true", &[], &output)
            .unwrap();
    }

    #[test]
    fn appends_one_json_line_per_command() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("commands.jsonl");
        let logger = CommandLogger::to_file(path.clone());

        let output = Command::new("echo").arg("hello").output().unwrap();
        logger
            .log_command("echo", &["hello".to_string()], &output)
            .unwrap();
        logger
            .log_command("echo", &["hello".to_string()], &output)
            .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let entries: Vec<CommandLogEntry> = content
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].program, "echo");
        assert_eq!(entries[0].stdout, "hello\n");
        assert!(entries[0].success);
        assert_eq!(entries[0].exit_code, Some(0));
    }
}
