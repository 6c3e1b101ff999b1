//! Backup store: timestamped snapshots of the live `.zshrc`.
//!
//! Snapshots are plain copies named `.zshrc.backup.<unix-millis>` inside the
//! backup directory. They are never modified and never pruned; the store
//! only creates, lists and restores them.
//!
//! Copies go to a hidden temporary sibling first and are renamed into place,
//! so a failed copy never leaves a truncated snapshot or live file behind.
//! When the live file is a symlink (a dotfiles checkout), restores write to
//! the file it points at and the link stays in place.

use std::cell::Cell;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info};

use crate::error::{LazyZshError, Result};
use crate::paths::{Layout, SNAPSHOT_PREFIX};

/// A snapshot file and the creation time encoded in its name
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Snapshot {
    /// Milliseconds since the UNIX epoch, parsed from the file name
    pub timestamp: u128,
    pub path: PathBuf,
}

impl Snapshot {
    /// Parse a path following the snapshot naming convention
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?;
        let stamp = name.strip_prefix(SNAPSHOT_PREFIX)?;
        if stamp.is_empty() || !stamp.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        Some(Self {
            timestamp: stamp.parse().ok()?,
            path: path.to_path_buf(),
        })
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Result of [`BackupStore::create_snapshot`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotOutcome {
    Created(Snapshot),
    /// There is no live configuration file; not an error
    NothingToBackUp,
}

/// Manages the snapshot directory for one [`Layout`]
#[derive(Debug)]
pub struct BackupStore {
    live: PathBuf,
    dir: PathBuf,
    /// Last timestamp handed out by this store, so names are never reused
    last_issued: Cell<u128>,
}

impl BackupStore {
    pub fn new(layout: &Layout) -> Self {
        Self::with_paths(layout.zshrc(), layout.backup_dir())
    }

    /// Store for an explicit live file and snapshot directory
    pub fn with_paths(live: impl Into<PathBuf>, dir: impl Into<PathBuf>) -> Self {
        Self {
            live: live.into(),
            dir: dir.into(),
            last_issued: Cell::new(0),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn live_path(&self) -> &Path {
        &self.live
    }

    /// Create the backup directory (and parents) if missing. Idempotent.
    pub fn ensure_store_exists(&self) -> Result<&Path> {
        if self.dir.exists() && !self.dir.is_dir() {
            return Err(LazyZshError::Io(std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                format!("{} exists but is not a directory", self.dir.display()),
            )));
        }
        if !self.dir.is_dir() {
            fs::create_dir_all(&self.dir)?;
            info!("Backup folder created at: {}", self.dir.display());
        }
        Ok(&self.dir)
    }

    /// Copy the live file into the store under a fresh timestamped name.
    pub fn create_snapshot(&self) -> Result<SnapshotOutcome> {
        if !self.live.is_file() {
            info!("No {} to back up", self.live.display());
            return Ok(SnapshotOutcome::NothingToBackUp);
        }
        self.ensure_store_exists()?;

        let (timestamp, path) = self.next_snapshot_path();
        atomic_copy(&self.live, &path)?;
        info!("Backup created at: {}", path.display());

        Ok(SnapshotOutcome::Created(Snapshot { timestamp, path }))
    }

    /// Snapshots currently in the store, oldest first.
    ///
    /// A missing backup directory simply means there are no snapshots.
    pub fn list_snapshots(&self) -> Result<Vec<Snapshot>> {
        if !self.dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut snapshots = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if let Some(snapshot) = Snapshot::from_path(&entry.path()) {
                snapshots.push(snapshot);
            }
        }
        snapshots.sort();
        debug!("Found {} snapshot(s) in {}", snapshots.len(), self.dir.display());
        Ok(snapshots)
    }

    /// Overwrite the live file with a snapshot's content.
    ///
    /// The previous live content is not backed up here; callers that care
    /// call [`create_snapshot`](Self::create_snapshot) first.
    pub fn restore_snapshot(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            return Err(LazyZshError::NotFound(path.to_path_buf()));
        }
        if !path.is_file() || Snapshot::from_path(path).is_none() || !self.contains(path) {
            return Err(LazyZshError::InvalidSnapshot(path.to_path_buf()));
        }
        let target = self.live_target()?;
        atomic_copy(path, &target)?;
        info!("{} restored from backup: {}", self.live.display(), path.display());
        Ok(())
    }

    /// The file a restore writes to: the live path, or what it links to
    fn live_target(&self) -> Result<PathBuf> {
        match fs::symlink_metadata(&self.live) {
            Ok(meta) if meta.file_type().is_symlink() => {
                let target = match fs::canonicalize(&self.live) {
                    Ok(target) => target,
                    // Dangling link: recreate the file it names
                    Err(_) => {
                        let link = fs::read_link(&self.live)?;
                        match self.live.parent() {
                            Some(parent) => parent.join(link),
                            None => link,
                        }
                    }
                };
                debug!("{} links to {}", self.live.display(), target.display());
                Ok(target)
            }
            _ => Ok(self.live.clone()),
        }
    }

    /// Whether `path` sits directly inside the backup directory
    fn contains(&self, path: &Path) -> bool {
        let (Some(parent), Ok(dir)) = (path.parent(), self.dir.canonicalize()) else {
            return false;
        };
        parent.canonicalize().map(|p| p == dir).unwrap_or(false)
    }

    fn next_snapshot_path(&self) -> (u128, PathBuf) {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);
        let mut stamp = now.max(self.last_issued.get() + 1);
        let mut path = self.snapshot_path(stamp);
        while path.exists() {
            stamp += 1;
            path = self.snapshot_path(stamp);
        }
        self.last_issued.set(stamp);
        (stamp, path)
    }

    fn snapshot_path(&self, stamp: u128) -> PathBuf {
        self.dir.join(format!("{}{}", SNAPSHOT_PREFIX, stamp))
    }
}

/// Copy `from` to a temporary sibling of `to`, then rename over `to`.
fn atomic_copy(from: &Path, to: &Path) -> Result<()> {
    let parent = to.parent().unwrap_or_else(|| Path::new("."));
    let name = to
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp = parent.join(format!(".{}.lazyzsh-tmp", name));

    if let Err(e) = fs::copy(from, &tmp).and_then(|_| fs::rename(&tmp, to)) {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }
    Ok(())
}
