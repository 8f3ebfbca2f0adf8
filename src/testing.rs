//! In-memory directory and account databases for unit tests.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};

use anyhow::{Result, bail};

use crate::accounts::{AccountDatabase, AccountInfo, AccountSpec};
use crate::directory::{DirectoryLookup, DirectoryRecord};
use crate::error::ProvisionError;

#[derive(Debug, Default)]
pub struct FakeDirectory {
    pub records: BTreeMap<String, DirectoryRecord>,
    pub unavailable: bool,
    pub queries: RefCell<Vec<String>>,
}

impl FakeDirectory {
    pub fn with_user(mut self, username: &str, display_name: &str, uid: u32) -> Self {
        self.records.insert(
            username.to_string(),
            DirectoryRecord {
                username: username.to_string(),
                display_name: display_name.to_string(),
                uid,
            },
        );
        self
    }

    pub fn query_count(&self) -> usize {
        self.queries.borrow().len()
    }
}

impl DirectoryLookup for FakeDirectory {
    fn lookup(&self, username: &str) -> Result<DirectoryRecord, ProvisionError> {
        self.queries.borrow_mut().push(username.to_string());
        if self.unavailable {
            return Err(ProvisionError::directory(
                "ldapsearch exited with code 255",
                "ldap_sasl_bind(SIMPLE): Can't contact LDAP server (-1)",
            ));
        }
        self.records
            .get(username)
            .cloned()
            .ok_or_else(|| ProvisionError::UserNotFound(username.to_string()))
    }
}

#[derive(Debug, Default)]
pub struct FakeAccounts {
    pub groups: BTreeSet<String>,
    pub accounts: BTreeMap<String, AccountInfo>,
    pub created: Vec<AccountSpec>,
    pub fail_create: bool,
}

impl FakeAccounts {
    pub fn with_groups(mut self, groups: &[&str]) -> Self {
        self.groups.extend(groups.iter().map(|g| g.to_string()));
        self
    }

    pub fn with_account(mut self, username: &str, uid: u32) -> Self {
        self.accounts.insert(
            username.to_string(),
            AccountInfo {
                username: username.to_string(),
                uid,
                gid: 100,
                gecos: String::new(),
                home: "/srv/sftp".to_string(),
                shell: "/usr/sbin/nologin".to_string(),
                groups: vec!["sftponly".to_string()],
            },
        );
        self
    }
}

impl AccountDatabase for FakeAccounts {
    fn group_exists(&self, name: &str) -> Result<bool> {
        Ok(self.groups.contains(name))
    }

    fn lookup_account(&self, username: &str) -> Result<Option<AccountInfo>> {
        Ok(self.accounts.get(username).cloned())
    }

    fn create_account(&mut self, spec: &AccountSpec) -> Result<()> {
        if self.fail_create {
            bail!("useradd failed with status Some(9): user '{}' already exists", spec.username);
        }
        self.created.push(spec.clone());

        let mut groups = vec![spec.primary_group.clone()];
        groups.extend(spec.supplementary_groups.iter().cloned());
        self.accounts.insert(
            spec.username.clone(),
            AccountInfo {
                username: spec.username.clone(),
                uid: spec.uid,
                gid: 100,
                gecos: spec.comment.clone(),
                home: spec.home.to_string_lossy().to_string(),
                shell: spec.shell.to_string_lossy().to_string(),
                groups,
            },
        );
        Ok(())
    }
}
