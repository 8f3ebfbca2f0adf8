use std::process::Command;

use crate::command_log::CommandLogger;
use crate::config::LdapConfig;
use crate::error::ProvisionError;
use crate::secret::BindSecret;
use crate::ui::prelude::*;

use super::{DirectoryLookup, DirectoryRecord, ldif, record_from_entries};

/// Directory lookups through the OpenLDAP `ldapsearch` client.
#[derive(Debug)]
pub struct LdapSearch<'a> {
    config: &'a LdapConfig,
    secret: &'a BindSecret,
    logger: CommandLogger,
    program: String,
    leading_args: Vec<String>,
}

impl<'a> LdapSearch<'a> {
    pub fn new(config: &'a LdapConfig, secret: &'a BindSecret, logger: CommandLogger) -> Self {
        Self {
            config,
            secret,
            logger,
            program: "ldapsearch".to_string(),
            leading_args: Vec::new(),
        }
    }

    /// Run a different client, e.g. `sh fake-ldapsearch` in tests.
    pub fn with_client(mut self, program: impl Into<String>, leading_args: Vec<String>) -> Self {
        self.program = program.into();
        self.leading_args = leading_args;
        self
    }

    fn search_args(&self, username: &str, secret_path: &str) -> Vec<String> {
        let mut args = self.leading_args.clone();
        args.extend([
            "-LLL".to_string(),
            "-x".to_string(),
            "-o".to_string(),
            "ldif-wrap=no".to_string(),
            "-H".to_string(),
            self.config.uri.clone(),
            "-D".to_string(),
            self.config.bind_dn.clone(),
            "-y".to_string(),
            secret_path.to_string(),
            "-b".to_string(),
            self.config.base_dn.clone(),
            format!("(uid={username})"),
            "gecos".to_string(),
            "uidNumber".to_string(),
        ]);
        args
    }
}

impl DirectoryLookup for LdapSearch<'_> {
    fn lookup(&self, username: &str) -> Result<DirectoryRecord, ProvisionError> {
        let secret_file = self
            .secret
            .to_temp_file()
            .map_err(|e| ProvisionError::directory(format!("{e:#}"), ""))?;
        let secret_path = secret_file.path().to_string_lossy().to_string();
        let args = self.search_args(username, &secret_path);

        emit(
            Level::Debug,
            "directory.query",
            &format!(
                "{} Querying {} for uid={}",
                char::from(NerdFont::Search),
                self.config.uri,
                username
            ),
            None,
        );

        let output = Command::new(&self.program)
            .args(&args)
            .output()
            .map_err(|e| {
                ProvisionError::directory(format!("failed to run {}: {e}", self.program), "")
            })?;
        self.logger.record(&self.program, &args, &output);
        drop(secret_file);

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let status = match output.status.code() {
                Some(code) => format!("{} exited with code {code}", self.program),
                None => format!("{} terminated by signal", self.program),
            };
            return Err(ProvisionError::directory(
                status,
                format!("{}{}", stderr, stdout).trim().to_string(),
            ));
        }

        let entries = ldif::parse(&stdout);
        if let Some(entry) = entries.first() {
            emit(
                Level::Debug,
                "directory.match",
                &format!("{} Matched {}", char::from(NerdFont::Search), entry.dn),
                Some(serde_json::json!({ "dn": entry.dn, "entries": entries.len() })),
            );
        }
        record_from_entries(username, &entries)
    }
}
