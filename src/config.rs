use anyhow::{Context, Result};
use std::path::PathBuf;

/// Storage configuration. The database path is chosen explicitly by the
/// operator (env var) or falls back to the platform data directory. There is
/// no alternate storage engine: if the configured database cannot be opened,
/// startup fails.
pub(crate) struct Config {
    pub(crate) db_path: PathBuf,
}

impl Config {
    pub(crate) fn from_env() -> Result<Self> {
        if let Ok(path) = std::env::var("FAMLEDGER_DB") {
            if path.trim().is_empty() {
                anyhow::bail!("FAMLEDGER_DB is set but empty");
            }
            return Ok(Self {
                db_path: PathBuf::from(path),
            });
        }

        let proj_dirs = directories::ProjectDirs::from("com", "famledger", "famledger")
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
        let data_dir = proj_dirs.data_dir();
        std::fs::create_dir_all(data_dir)
            .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;
        Ok(Self {
            db_path: data_dir.join("famledger.db"),
        })
    }
}
