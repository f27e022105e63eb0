use dirs::home_dir;
use std::{
    env, fs,
    path::{Path, PathBuf},
};

use crate::errors::Result;

const HOME_ENV: &str = "BUDGET_ENGINE_HOME";
const DEFAULT_DIR_NAME: &str = ".budget_engine";
const BUDGETS_DIR: &str = "budgets";
const CONFIG_FILE: &str = "config.json";

/// Resolves on-disk locations for budgets, the ledger snapshot, and configuration.
pub struct PathResolver;

impl PathResolver {
    /// Application data directory: `$BUDGET_ENGINE_HOME`, else `~/.budget_engine`.
    pub fn base_dir() -> PathBuf {
        if let Some(custom) = env::var_os(HOME_ENV) {
            return PathBuf::from(custom);
        }
        home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(DEFAULT_DIR_NAME)
    }

    pub fn resolve_base(root: Option<PathBuf>) -> PathBuf {
        root.unwrap_or_else(Self::base_dir)
    }

    pub fn budgets_dir_in(base: &Path) -> PathBuf {
        base.join(BUDGETS_DIR)
    }

    pub fn config_file_in(base: &Path) -> PathBuf {
        base.join(CONFIG_FILE)
    }
}

pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}
