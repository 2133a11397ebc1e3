//! JSON file cache

use crate::storage::Store;
use crate::types::*;
use anyhow::{Context, Result};
use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

const LOG_TARGET: &str = "storage";

/// JSON cache: one file of issues, one file of pull requests
#[derive(Debug, Clone)]
pub struct JsonCache {
    issues_path: PathBuf,
    pulls_path: PathBuf,
}

impl JsonCache {
    pub fn new(issues_path: PathBuf, pulls_path: PathBuf) -> Self {
        JsonCache {
            issues_path,
            pulls_path,
        }
    }
}

/// Reads a cache file; `None` if it does not exist.
///
/// Accepts an array-wrapped document or newline-delimited records.
fn read_records<T: DeserializeOwned>(path: &Path) -> Result<Option<Vec<T>>> {
    let mut file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            log::debug!(target: LOG_TARGET, "No cache at {:?}", path);
            return Ok(None);
        }
        Err(e) => return Err(e).with_context(|| format!("Failed to open cache {:?}", path)),
    };
    FileExt::lock_shared(&file)
        .with_context(|| format!("Failed to lock cache {:?}", path))?;
    let mut text = String::new();
    let read = file.read_to_string(&mut text);
    FileExt::unlock(&file)?;
    read.with_context(|| format!("Failed to read cache {:?}", path))?;

    let records = if text.trim_start().starts_with('[') {
        serde_json::from_str(&text).with_context(|| format!("Failed to parse cache {:?}", path))?
    } else {
        serde_json::Deserializer::from_str(&text)
            .into_iter::<T>()
            .collect::<Result<Vec<T>, _>>()
            .with_context(|| format!("Failed to parse cache {:?}", path))?
    };
    Ok(Some(records))
}

/// Writes records as one JSON array while holding an exclusive lock.
/// The document is serialized before the file is touched, and the file is
/// only truncated once the lock is held.
fn write_records<T: Serialize>(path: &Path, records: &[T]) -> Result<()> {
    let mut document = serde_json::to_vec(records)?;
    document.push(b'\n');

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("Failed to create {:?}", parent))?;
    }
    let mut file: File = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)
        .with_context(|| format!("Failed to open cache {:?}", path))?;
    file.lock_exclusive()
        .with_context(|| format!("Failed to lock cache {:?}", path))?;

    let written = file
        .set_len(0)
        .and_then(|()| file.write_all(&document))
        .and_then(|()| file.sync_all());
    FileExt::unlock(&file)?;
    written.with_context(|| format!("Failed to write cache {:?}", path))?;

    log::debug!(target: LOG_TARGET, "Wrote {} records to {:?}", records.len(), path);
    Ok(())
}

impl Store for JsonCache {
    fn load_issues(&self) -> Result<Option<Vec<Issue>>> {
        read_records(&self.issues_path)
    }

    fn load_pulls(&self) -> Result<Option<Vec<PullRequest>>> {
        read_records(&self.pulls_path)
    }

    fn save_issues(&self, issues: &[Issue]) -> Result<()> {
        write_records(&self.issues_path, issues)
    }

    fn save_pulls(&self, pulls: &[PullRequest]) -> Result<()> {
        write_records(&self.pulls_path, pulls)
    }

    fn describe(&self) -> String {
        format!("{} and {}", self.issues_path.display(), self.pulls_path.display())
    }
}
