//! OS account and group database access.

pub mod system;

pub use system::SystemAccounts;

use anyhow::Result;
use serde::Serialize;
use std::path::PathBuf;

/// Read/write access to the local account and group databases.
pub trait AccountDatabase {
    /// Whether a group with this name exists.
    fn group_exists(&self, name: &str) -> Result<bool>;

    /// The account named `username`, if present.
    fn lookup_account(&self, username: &str) -> Result<Option<AccountInfo>>;

    /// Create a new account. Fails if the underlying call reports an error.
    fn create_account(&mut self, spec: &AccountSpec) -> Result<()>;
}

impl<T: AccountDatabase + ?Sized> AccountDatabase for &mut T {
    fn group_exists(&self, name: &str) -> Result<bool> {
        (**self).group_exists(name)
    }

    fn lookup_account(&self, username: &str) -> Result<Option<AccountInfo>> {
        (**self).lookup_account(username)
    }

    fn create_account(&mut self, spec: &AccountSpec) -> Result<()> {
        (**self).create_account(spec)
    }
}

/// An account as read back from the passwd and group databases
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountInfo {
    pub username: String,
    pub uid: u32,
    pub gid: u32,
    pub gecos: String,
    pub home: String,
    pub shell: String,
    pub groups: Vec<String>,
}

/// Everything needed for one `useradd` call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountSpec {
    pub username: String,
    pub uid: u32,
    pub comment: String,
    pub primary_group: String,
    pub supplementary_groups: Vec<String>,
    pub shell: PathBuf,
    pub home: PathBuf,
}

impl AccountSpec {
    /// Arguments for `useradd`.
    ///
    /// `-G` is left out entirely when there are no supplementary groups; an
    /// empty `-G ""` is not the same request. `-M` keeps `useradd` from
    /// creating the home directory.
    pub fn useradd_args(&self) -> Vec<String> {
        let mut args = vec![
            "-u".to_string(),
            self.uid.to_string(),
            "-g".to_string(),
            self.primary_group.clone(),
        ];

        if !self.supplementary_groups.is_empty() {
            args.push("-G".to_string());
            args.push(self.supplementary_groups.join(","));
        }

        args.extend([
            "-s".to_string(),
            self.shell.to_string_lossy().to_string(),
            "-d".to_string(),
            self.home.to_string_lossy().to_string(),
            "-M".to_string(),
            "-c".to_string(),
            self.comment.clone(),
            self.username.clone(),
        ]);
        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(groups: &[&str]) -> AccountSpec {
        AccountSpec {
            username: "alice".into(),
            uid: 5001,
            comment: "Alice A.".into(),
            primary_group: "sftponly".into(),
            supplementary_groups: groups.iter().map(|g| g.to_string()).collect(),
            shell: PathBuf::from("/usr/sbin/nologin"),
            home: PathBuf::from("/srv/sftp"),
        }
    }

    #[test]
    fn joins_supplementary_groups_with_commas() {
        let args = spec(&["group1", "group2", "group3"]).useradd_args();
        let pos = args.iter().position(|a| a == "-G").unwrap();
        assert_eq!(args[pos + 1], "group1,group2,group3");
    }

    #[test]
    fn omits_group_option_without_groups() {
        let without = spec(&[]).useradd_args();
        let with = spec(&["sftp_admins"]).useradd_args();

        assert!(!without.iter().any(|a| a == "-G"));
        assert!(!without.iter().any(|a| a.is_empty()));
        assert_ne!(without, with);
        assert_eq!(with.len(), without.len() + 2);
    }

    #[test]
    fn carries_fixed_policy() {
        let args = spec(&[]).useradd_args();
        assert_eq!(
            args,
            vec![
                "-u",
                "5001",
                "-g",
                "sftponly",
                "-s",
                "/usr/sbin/nologin",
                "-d",
                "/srv/sftp",
                "-M",
                "-c",
                "Alice A.",
                "alice",
            ]
        );
    }
}
