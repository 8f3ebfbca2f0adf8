use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Scratch directory holding a config file, a bind secret and user lists.
pub struct TestEnvironment {
    temp_dir: TempDir,
}

impl TestEnvironment {
    pub fn new() -> Result<Self> {
        let temp_dir = tempfile::tempdir()?;
        let env = Self { temp_dir };
        fs::write(env.secret_path(), "hunter2\n")?;
        env.write_config("")?;
        Ok(env)
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn config_path(&self) -> PathBuf {
        self.path().join("config.toml")
    }

    pub fn secret_path(&self) -> PathBuf {
        self.path().join("ldap.secret")
    }

    /// Write the config, pointing at this environment's secret. `extra` is
    /// appended to the `[ldap]` table.
    pub fn write_config(&self, extra: &str) -> Result<()> {
        let contents = format!(
            "[ldap]\nsecret_file = {:?}\n{}\n",
            self.secret_path().display().to_string(),
            extra
        );
        fs::write(self.config_path(), contents)?;
        Ok(())
    }

    pub fn write_users(&self, name: &str, contents: &str) -> Result<PathBuf> {
        let path = self.path().join(name);
        fs::write(&path, contents)?;
        Ok(path)
    }
}
