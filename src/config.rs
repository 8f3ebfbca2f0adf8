use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::request::is_valid_group_name;

pub const DEFAULT_CONFIG_PATH: &str = "/etc/sftp-provision/config.toml";

fn default_uri() -> String {
    "ldaps://ldap.example.org".to_string()
}

fn default_bind_dn() -> String {
    "cn=readonly,dc=example,dc=org".to_string()
}

fn default_base_dn() -> String {
    "ou=people,dc=example,dc=org".to_string()
}

fn default_secret_file() -> PathBuf {
    PathBuf::from("/etc/sftp-provision/ldap.secret")
}

fn default_primary_group() -> String {
    "sftponly".to_string()
}

fn default_shell() -> PathBuf {
    PathBuf::from("/usr/sbin/nologin")
}

fn default_home() -> PathBuf {
    PathBuf::from("/srv/sftp")
}

/// Directory service connection settings
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LdapConfig {
    #[serde(default = "default_uri")]
    pub uri: String,
    #[serde(default = "default_bind_dn")]
    pub bind_dn: String,
    #[serde(default = "default_base_dn")]
    pub base_dn: String,
    #[serde(default = "default_secret_file")]
    pub secret_file: PathBuf,
}

impl Default for LdapConfig {
    fn default() -> Self {
        Self {
            uri: default_uri(),
            bind_dn: default_bind_dn(),
            base_dn: default_base_dn(),
            secret_file: default_secret_file(),
        }
    }
}

/// Fixed policy applied to every created account
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AccountPolicy {
    #[serde(default = "default_primary_group")]
    pub primary_group: String,
    #[serde(default = "default_shell")]
    pub shell: PathBuf,
    #[serde(default = "default_home")]
    pub home: PathBuf,
}

impl Default for AccountPolicy {
    fn default() -> Self {
        Self {
            primary_group: default_primary_group(),
            shell: default_shell(),
            home: default_home(),
        }
    }
}

/// Startup configuration, read once and then passed around by reference.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ProvisionConfig {
    #[serde(default)]
    pub ldap: LdapConfig,
    #[serde(default)]
    pub account: AccountPolicy,
}

impl ProvisionConfig {
    /// Load the configuration.
    ///
    /// An explicitly requested file must exist. Without one, the default
    /// path is used when present and built-in defaults otherwise.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => {
                let path = Path::new(DEFAULT_CONFIG_PATH);
                if path.exists() {
                    Self::from_file(path)?
                } else {
                    Self::default()
                }
            }
        };
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let s = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        toml::from_str(&s).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn validate(&self) -> Result<()> {
        let uri = self.ldap.uri.to_ascii_lowercase();
        if !["ldap://", "ldaps://", "ldapi://"]
            .iter()
            .any(|scheme| uri.starts_with(scheme))
        {
            bail!(
                "ldap.uri '{}' must start with ldap://, ldaps:// or ldapi://",
                self.ldap.uri
            );
        }
        if self.ldap.base_dn.trim().is_empty() {
            bail!("ldap.base_dn must not be empty");
        }
        if !self.account.shell.is_absolute() {
            bail!(
                "account.shell '{}' must be an absolute path",
                self.account.shell.display()
            );
        }
        if !self.account.home.is_absolute() {
            bail!(
                "account.home '{}' must be an absolute path",
                self.account.home.display()
            );
        }
        if !is_valid_group_name(&self.account.primary_group) {
            bail!(
                "account.primary_group '{}' is not a valid group name",
                self.account.primary_group
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn partial_file_falls_back_to_defaults() {
        let file = write_config(
            r#"
[ldap]
uri = "ldaps://ldap.corp.test"

[account]
primary_group = "sftp_users"
"#,
        );
        let config = ProvisionConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.ldap.uri, "ldaps://ldap.corp.test");
        assert_eq!(config.ldap.bind_dn, default_bind_dn());
        assert_eq!(config.account.primary_group, "sftp_users");
        assert_eq!(config.account.shell, default_shell());
        assert_eq!(config.account.home, default_home());
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(ProvisionConfig::load(Some(missing.as_path())).is_err());
    }

    #[test]
    fn rejects_unknown_uri_scheme() {
        let file = write_config("[ldap]\nuri = \"http://ldap.corp.test\"\n");
        let err = ProvisionConfig::load(Some(file.path())).unwrap_err();
        assert!(err.to_string().contains("ldap.uri"));
    }

    #[test]
    fn rejects_relative_home() {
        let file = write_config("[account]\nhome = \"srv/sftp\"\n");
        let err = ProvisionConfig::load(Some(file.path())).unwrap_err();
        assert!(err.to_string().contains("account.home"));
    }

    #[test]
    fn rejects_bad_primary_group() {
        let file = write_config("[account]\nprimary_group = \"-oops\"\n");
        assert!(ProvisionConfig::load(Some(file.path())).is_err());
    }

    #[test]
    fn defaults_are_valid() {
        assert!(ProvisionConfig::default().validate().is_ok());
    }
}
