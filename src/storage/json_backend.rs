use std::{
    fs::{self, File, OpenOptions},
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
    process, thread,
    time::{Duration, Instant},
};

use uuid::Uuid;

use super::BudgetStore;
use crate::{
    errors::{EngineError, Result},
    ledger::{budget::Budget, Ledger},
    utils::paths::{ensure_dir, PathResolver},
};

const BUDGET_EXTENSION: &str = "json";
const TMP_SUFFIX: &str = "tmp";
const LOCK_SUFFIX: &str = "lock";
const LEASE_TIMEOUT: Duration = Duration::from_secs(5);
const LEASE_POLL: Duration = Duration::from_millis(5);

/// Stores each budget as a pretty-printed JSON file under `<root>/budgets/`.
///
/// Saves hold a per-budget lease file (`<id>.json.lock`, created exclusively) for
/// the version check and the rename, so instances sharing a directory, in this
/// process or another, cannot both commit the same version.
#[derive(Debug, Clone)]
pub struct JsonStorage {
    root: PathBuf,
    budgets_dir: PathBuf,
}

impl JsonStorage {
    pub fn new(root: Option<PathBuf>) -> Result<Self> {
        let app_root = PathResolver::resolve_base(root);
        ensure_dir(&app_root)?;
        let budgets_dir = PathResolver::budgets_dir_in(&app_root);
        ensure_dir(&budgets_dir)?;
        Ok(Self {
            root: app_root,
            budgets_dir,
        })
    }

    pub fn new_default() -> Result<Self> {
        Self::new(None)
    }

    pub fn base_dir(&self) -> &Path {
        &self.root
    }

    pub fn budget_path(&self, id: Uuid) -> PathBuf {
        self.budgets_dir
            .join(format!("{}.{}", id.as_hyphenated(), BUDGET_EXTENSION))
    }

    fn read_budget(&self, path: &Path) -> Result<Budget> {
        let data = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }
}

impl BudgetStore for JsonStorage {
    fn load_budget(&self, id: Uuid) -> Result<Budget> {
        let path = self.budget_path(id);
        if !path.exists() {
            return Err(EngineError::BudgetNotFound(id));
        }
        self.read_budget(&path)
    }

    fn save_budget(&self, budget: &Budget) -> Result<Budget> {
        let path = self.budget_path(budget.id);
        let _lease = BudgetLease::acquire(&lock_path(&path), LEASE_TIMEOUT)?;
        if path.exists() {
            let existing = self.read_budget(&path)?;
            if existing.version != budget.version {
                return Err(EngineError::PersistenceConflict {
                    id: budget.id,
                    expected: budget.version,
                    found: existing.version,
                });
            }
        }
        let mut stored = budget.clone();
        stored.version += 1;
        let json = serde_json::to_string_pretty(&stored)?;
        let tmp = unique_tmp_path(&path);
        write_atomic(&tmp, &json)?;
        if let Err(err) = fs::rename(&tmp, &path) {
            let _ = fs::remove_file(&tmp);
            return Err(err.into());
        }
        Ok(stored)
    }

    fn list_budgets(&self, owner_id: Uuid) -> Result<Vec<Budget>> {
        let mut owned = Vec::new();
        for entry in fs::read_dir(&self.budgets_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(BUDGET_EXTENSION) {
                continue;
            }
            let budget = self.read_budget(&path)?;
            if budget.owner_id == owner_id {
                owned.push(budget);
            }
        }
        owned.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(owned)
    }
}

/// Exclusive per-budget lease. The lock file is removed when the lease drops.
#[derive(Debug)]
struct BudgetLease {
    path: PathBuf,
}

impl BudgetLease {
    fn acquire(path: &Path, timeout: Duration) -> Result<Self> {
        let started = Instant::now();
        loop {
            match OpenOptions::new().write(true).create_new(true).open(path) {
                Ok(_) => {
                    return Ok(Self {
                        path: path.to_path_buf(),
                    })
                }
                Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                    if started.elapsed() >= timeout {
                        return Err(EngineError::Storage(format!(
                            "timed out waiting for lease {}",
                            path.display()
                        )));
                    }
                    thread::sleep(LEASE_POLL);
                }
                Err(err) => return Err(err.into()),
            }
        }
    }
}

impl Drop for BudgetLease {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

fn lock_path(path: &Path) -> PathBuf {
    with_extra_extension(path, LOCK_SUFFIX)
}

/// Temp file private to one writer: `<file>.<pid>.<uuid>.tmp`.
fn unique_tmp_path(path: &Path) -> PathBuf {
    with_extra_extension(
        path,
        &format!("{}.{}.{}", process::id(), Uuid::new_v4().simple(), TMP_SUFFIX),
    )
}

fn with_extra_extension(path: &Path, suffix: &str) -> PathBuf {
    let mut extended = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, suffix),
        None => suffix.to_string(),
    };
    extended.set_extension(ext);
    extended
}

pub fn save_ledger_to_path(ledger: &Ledger, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(ledger)?;
    let tmp = tmp_path(path);
    write_atomic(&tmp, &json)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

pub fn load_ledger_from_path(path: &Path) -> Result<Ledger> {
    let data = fs::read_to_string(path)?;
    let ledger: Ledger = serde_json::from_str(&data)?;
    Ok(ledger)
}

pub(crate) fn tmp_path(path: &Path) -> PathBuf {
    with_extra_extension(path, TMP_SUFFIX)
}

pub(crate) fn write_atomic(path: &Path, data: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}
