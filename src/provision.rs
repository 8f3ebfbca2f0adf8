use serde::Serialize;

use crate::accounts::{AccountDatabase, AccountInfo, AccountSpec};
use crate::config::AccountPolicy;
use crate::directory::DirectoryLookup;
use crate::error::ProvisionError;
use crate::request::UserRequest;

/// Terminal, non-fatal result for one entry. Fatal results are errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ProvisionOutcome {
    Created {
        username: String,
        uid: u32,
        display_name: String,
        groups: Vec<String>,
        /// Database entry read after creation, for the operator only
        readback: Option<AccountInfo>,
    },
    Skipped {
        username: String,
        existing: AccountInfo,
    },
    /// Dry run: the account would have been created with this spec
    Planned { spec: AccountSpec },
}

/// Ensures an OS account exists for each validated request.
pub struct Provisioner<'a, D, A> {
    policy: &'a AccountPolicy,
    directory: D,
    accounts: A,
    dry_run: bool,
}

impl<'a, D, A> Provisioner<'a, D, A>
where
    D: DirectoryLookup,
    A: AccountDatabase,
{
    pub fn new(policy: &'a AccountPolicy, directory: D, accounts: A) -> Self {
        Self {
            policy,
            directory,
            accounts,
            dry_run: false,
        }
    }

    pub fn dry_run(mut self, enabled: bool) -> Self {
        self.dry_run = enabled;
        self
    }

    /// The configured primary group has to exist before anything is created.
    pub fn check_primary_group(&self) -> anyhow::Result<()> {
        let group = &self.policy.primary_group;
        if !self.accounts.group_exists(group)? {
            anyhow::bail!("primary group '{group}' does not exist");
        }
        Ok(())
    }

    /// Run the checks and side effects for one request.
    ///
    /// Groups are verified first, then an existing account short-circuits to
    /// `Skipped` without touching the directory.
    pub fn provision(&mut self, request: &UserRequest) -> Result<ProvisionOutcome, ProvisionError> {
        let username = request.username.as_str();

        for group in &request.supplementary_groups {
            let exists = self.accounts.group_exists(group).map_err(|e| {
                ProvisionError::create_failed(username, format!("checking group {group}: {e:#}"))
            })?;
            if !exists {
                return Err(ProvisionError::UnknownGroup(group.clone()));
            }
        }

        let existing = self
            .accounts
            .lookup_account(username)
            .map_err(|e| ProvisionError::create_failed(username, format!("{e:#}")))?;
        if let Some(existing) = existing {
            return Ok(ProvisionOutcome::Skipped {
                username: username.to_string(),
                existing,
            });
        }

        let record = self.directory.lookup(username)?;

        let spec = AccountSpec {
            username: username.to_string(),
            uid: record.uid,
            comment: record.display_name.clone(),
            primary_group: self.policy.primary_group.clone(),
            supplementary_groups: request.supplementary_groups.clone(),
            shell: self.policy.shell.clone(),
            home: self.policy.home.clone(),
        };

        if self.dry_run {
            return Ok(ProvisionOutcome::Planned { spec });
        }

        self.accounts
            .create_account(&spec)
            .map_err(|e| ProvisionError::create_failed(username, format!("{e:#}")))?;

        // Read-back is informational; a failed read does not undo the creation.
        let readback = self.accounts.lookup_account(username).ok().flatten();

        Ok(ProvisionOutcome::Created {
            username: record.username,
            uid: record.uid,
            display_name: record.display_name,
            groups: spec.supplementary_groups,
            readback,
        })
    }
}
