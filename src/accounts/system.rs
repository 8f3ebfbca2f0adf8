use std::process::{Command, Stdio};

use anyhow::{Context, Result, bail};

use crate::command_log::CommandLogger;

use super::{AccountDatabase, AccountInfo, AccountSpec};

/// Account database backed by `getent`, `id` and `useradd`.
#[derive(Debug, Clone)]
pub struct SystemAccounts {
    logger: CommandLogger,
}

impl SystemAccounts {
    pub fn new(logger: CommandLogger) -> Self {
        Self { logger }
    }
}

impl AccountDatabase for SystemAccounts {
    fn group_exists(&self, name: &str) -> Result<bool> {
        let output = Command::new("getent")
            .arg("group")
            .arg(name)
            .stderr(Stdio::null())
            .output()
            .with_context(|| format!("checking group {name}"))?;
        if !output.status.success() {
            return Ok(false);
        }

        let entries = String::from_utf8_lossy(&output.stdout);
        Ok(entries.lines().any(|line| group_line_names(line, name)))
    }

    fn lookup_account(&self, username: &str) -> Result<Option<AccountInfo>> {
        let passwd = Command::new("getent")
            .arg("passwd")
            .arg(username)
            .output()
            .with_context(|| format!("querying passwd entry for {}", username))?;

        if !passwd.status.success() {
            return Ok(None);
        }

        let line = String::from_utf8(passwd.stdout).context("parsing passwd entry")?;
        let mut info = parse_passwd_line(line.trim())
            .with_context(|| format!("malformed passwd entry for {username}"))?;
        info.groups = get_user_groups(username);
        Ok(Some(info))
    }

    fn create_account(&mut self, spec: &AccountSpec) -> Result<()> {
        let args = spec.useradd_args();
        let output = Command::new("useradd")
            .args(&args)
            .output()
            .context("running useradd")?;
        self.logger.record("useradd", &args, &output);

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!(
                "useradd failed with status {:?}: {}",
                output.status.code(),
                stderr.trim()
            );
        }

        Ok(())
    }
}

/// Whether a `name:pw:gid:members` line describes the group called `name`.
/// `getent group` also resolves numeric GIDs, which must not count.
fn group_line_names(line: &str, name: &str) -> bool {
    line.split(':').next() == Some(name)
}

/// Parse one `name:pw:uid:gid:gecos:home:shell` line. Groups are left empty.
fn parse_passwd_line(line: &str) -> Result<AccountInfo> {
    let fields: Vec<&str> = line.split(':').collect();
    if fields.len() != 7 {
        bail!("expected 7 fields, found {}", fields.len());
    }

    Ok(AccountInfo {
        username: fields[0].to_string(),
        uid: fields[2].parse().context("parsing uid")?,
        gid: fields[3].parse().context("parsing gid")?,
        gecos: fields[4].to_string(),
        home: fields[5].to_string(),
        shell: fields[6].to_string(),
        groups: Vec::new(),
    })
}

/// Get all groups for a user
fn get_user_groups(username: &str) -> Vec<String> {
    Command::new("id")
        .arg("-nG")
        .arg(username)
        .output()
        .ok()
        .and_then(|output| {
            if output.status.success() {
                Some(
                    String::from_utf8_lossy(&output.stdout)
                        .split_whitespace()
                        .map(|s| s.to_string())
                        .collect::<Vec<_>>(),
                )
            } else {
                None
            }
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_passwd_line() {
        let info =
            parse_passwd_line("alice:x:5001:1100:Alice A.:/srv/sftp:/usr/sbin/nologin").unwrap();
        assert_eq!(info.username, "alice");
        assert_eq!(info.uid, 5001);
        assert_eq!(info.gid, 1100);
        assert_eq!(info.gecos, "Alice A.");
        assert_eq!(info.home, "/srv/sftp");
        assert_eq!(info.shell, "/usr/sbin/nologin");
    }

    #[test]
    fn keeps_empty_gecos() {
        let info = parse_passwd_line("bob:x:5002:1100::/srv/sftp:/bin/false").unwrap();
        assert_eq!(info.gecos, "");
    }

    #[test]
    fn group_line_matches_by_name() {
        assert!(group_line_names("sftponly:x:1100:", "sftponly"));
        assert!(group_line_names("web:x:1200:alice,bob", "web"));
    }

    #[test]
    fn group_line_resolved_by_gid_does_not_match() {
        assert!(!group_line_names("root:x:0:", "0"));
        assert!(!group_line_names("users:x:1000:", "1000"));
        assert!(!group_line_names("webadmins:x:1300:", "web"));
    }

    #[test]
    fn rejects_short_line() {
        assert!(parse_passwd_line("bob:x:5002").is_err());
    }

    #[test]
    fn rejects_non_numeric_uid() {
        assert!(parse_passwd_line("bob:x:abc:1:b:/h:/s").is_err());
    }
}
