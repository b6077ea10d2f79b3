use std::fs;
use std::path::{Path, PathBuf};

use enact_model::{Receipt, RunId};

use crate::error::ReceiptError;

/// A directory of signed receipts, one file per run, named `<runID>.json`.
///
/// Every lookup goes through [`RunId::parse`] before a path is ever built, so a caller-supplied
/// run ID string can never escape `root` via `..` or an absolute path: [`RunId`] only accepts
/// the strict `8-4-4-4-12` hex form, and nothing else concatenates into a filename here.
pub struct ReceiptStore {
    root: PathBuf,
}

impl ReceiptStore {
    /// Opens `root` as a receipt store, creating the directory if it does not already exist.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, ReceiptError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|source| ReceiptError::Directory { path: root.display().to_string(), source })?;
        Ok(Self { root })
    }

    /// Writes `receipt` to `<root>/<runID>.json`, overwriting any existing file for that run ID.
    pub fn persist(&self, receipt: &Receipt) -> Result<(), ReceiptError> {
        let path = self.path_for(&receipt.run_id);
        let body = serde_json::to_vec_pretty(receipt).expect("Receipt is always serializable");
        fs::write(&path, body).map_err(|source| ReceiptError::Write { run_id: receipt.run_id.to_string(), source })
    }

    /// Loads the receipt for `run_id`. `run_id` is parsed strictly before any path is touched,
    /// so this is safe to call with raw, untrusted input (a CLI argument, an HTTP path segment).
    pub fn load(&self, run_id: &str) -> Result<Receipt, ReceiptError> {
        let run_id = RunId::parse(run_id)?;
        self.load_parsed(run_id)
    }

    /// Loads the receipt for an already-validated [`RunId`].
    pub fn load_parsed(&self, run_id: RunId) -> Result<Receipt, ReceiptError> {
        let path = self.path_for(&run_id);
        self.guard_within_root(&path)?;
        let body = fs::read(&path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                ReceiptError::NotFound { run_id: run_id.to_string() }
            } else {
                ReceiptError::Read { run_id: run_id.to_string(), source }
            }
        })?;
        serde_json::from_slice(&body).map_err(|source| ReceiptError::Corrupt { run_id: run_id.to_string(), source })
    }

    /// Lists every run ID with a receipt in this store, in no particular order. Filenames that
    /// are not `<uuid>.json` (stray files someone dropped in the directory) are silently
    /// skipped rather than treated as an error.
    pub fn list(&self) -> Result<Vec<RunId>, ReceiptError> {
        let entries = fs::read_dir(&self.root)
            .map_err(|source| ReceiptError::Directory { path: self.root.display().to_string(), source })?;
        let mut ids = Vec::new();
        for entry in entries {
            let Ok(entry) = entry else { continue };
            let Some(stem) = entry.path().file_stem().and_then(|s| s.to_str()).map(str::to_string) else { continue };
            if entry.path().extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Ok(id) = RunId::parse(&stem) {
                ids.push(id);
            } else {
                log::warn!("ignoring non-receipt file in receipts directory: {}", entry.path().display());
            }
        }
        Ok(ids)
    }

    fn path_for(&self, run_id: &RunId) -> PathBuf {
        self.root.join(format!("{run_id}.json"))
    }

    /// Defense in depth: confirms the path we are about to touch is still inside `root` even
    /// though `RunId`'s own validation already makes this unreachable.
    fn guard_within_root(&self, path: &Path) -> Result<(), ReceiptError> {
        match path.parent() {
            Some(parent) if parent == self.root => Ok(()),
            _ => Err(ReceiptError::PathEscape),
        }
    }
}
