use anyhow::{Context, Result, bail};
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

/// Bind credential for the directory service.
///
/// Held as raw bytes. Trailing line terminators are removed on load because
/// `ldapsearch -y` would otherwise send them as part of the password.
#[derive(Clone, PartialEq, Eq)]
pub struct BindSecret(Vec<u8>);

impl BindSecret {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read(path)
            .with_context(|| format!("reading bind secret {}", path.display()))?;
        let secret = Self::from_bytes(raw);
        if secret.0.is_empty() {
            bail!("bind secret file {} is empty", path.display());
        }
        Ok(secret)
    }

    pub fn from_bytes(mut raw: Vec<u8>) -> Self {
        while matches!(raw.last(), Some(b'\n' | b'\r')) {
            raw.pop();
        }
        Self(raw)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Write the secret to a private temporary file for `ldapsearch -y`.
    ///
    /// The file is created with mode 0600 and deleted when the handle drops.
    pub fn to_temp_file(&self) -> Result<NamedTempFile> {
        let mut file = tempfile::Builder::new()
            .prefix("sftp-provision-bind")
            .tempfile()
            .context("creating temporary bind secret file")?;
        file.write_all(self.as_bytes())
            .context("writing temporary bind secret file")?;
        file.flush().context("flushing temporary bind secret file")?;
        Ok(file)
    }
}

impl fmt::Debug for BindSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BindSecret(<redacted>)")
    }
}
