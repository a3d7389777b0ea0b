//! Filesystem vault.
//!
//! Provides [`FsVault`], a [`VaultStore`] rooted at a local directory.

use std::fs;
use std::path::{Path, PathBuf};

use crate::store::{
    normalize_path, parent_dir, sort_entries, Entry, EntryKind, VaultError, VaultStore,
    DEFAULT_IGNORED,
};

/// Vault backed by a directory on the local filesystem.
///
/// # Example
///
/// ```no_run
/// use vaultmark_vault::{FsVault, VaultStore};
///
/// let vault = FsVault::open("notes")?;
/// for entry in vault.list_dir("")? {
///     println!("{} ({:?})", entry.path, entry.kind);
/// }
/// # Ok::<(), vaultmark_vault::VaultError>(())
/// ```
#[derive(Debug, Clone)]
pub struct FsVault {
    root: PathBuf,
    ignored: Vec<String>,
}

impl FsVault {
    /// Create a vault rooted at `root` without checking it.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ignored: DEFAULT_IGNORED.iter().map(|s| (*s).to_owned()).collect(),
        }
    }

    /// Open an existing vault directory.
    ///
    /// # Errors
    ///
    /// [`VaultError::NotFound`] when `root` does not exist,
    /// [`VaultError::NotADirectory`] when it is not a directory.
    pub fn open(root: impl AsRef<Path>) -> Result<Self, VaultError> {
        let root = root.as_ref();
        let shown = root.display().to_string();
        let canonical = fs::canonicalize(root).map_err(|e| VaultError::io(&shown, e))?;
        if !canonical.is_dir() {
            return Err(VaultError::NotADirectory(shown));
        }
        tracing::debug!(root = %canonical.display(), "Opened vault");
        Ok(Self::new(canonical))
    }

    /// Replace the list of names hidden from listings.
    #[must_use]
    pub fn with_ignored(mut self, ignored: Vec<String>) -> Self {
        self.ignored = ignored;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn is_ignored(&self, name: &str) -> bool {
        name.is_empty() || self.ignored.iter().any(|ignored| ignored == name)
    }

    /// Normalize `path` and map it below the root.
    fn locate(&self, path: &str) -> Result<(String, PathBuf), VaultError> {
        let rel = normalize_path(path)?;
        let abs = if rel.is_empty() {
            self.root.clone()
        } else {
            self.root.join(&rel)
        };
        Ok((rel, abs))
    }

    fn metadata(rel: &str, abs: &Path) -> Result<fs::Metadata, VaultError> {
        fs::metadata(abs).map_err(|e| VaultError::io(rel, e))
    }

    /// Require the parent directory of `rel` to exist.
    fn require_parent(&self, rel: &str) -> Result<(), VaultError> {
        let parent = parent_dir(rel);
        let (_, abs) = self.locate(parent)?;
        match fs::metadata(&abs) {
            Ok(meta) if meta.is_dir() => Ok(()),
            Ok(_) => Err(VaultError::NotADirectory(parent.to_owned())),
            Err(e) => Err(VaultError::io(parent, e)),
        }
    }
}

impl VaultStore for FsVault {
    fn list_dir(&self, dir: &str) -> Result<Vec<Entry>, VaultError> {
        let (rel, abs) = self.locate(dir)?;
        if !Self::metadata(&rel, &abs)?.is_dir() {
            return Err(VaultError::NotADirectory(rel));
        }

        let mut entries = Vec::new();
        for item in fs::read_dir(&abs).map_err(|e| VaultError::io(&rel, e))? {
            let item = item.map_err(|e| VaultError::io(&rel, e))?;
            let name = item.file_name().to_string_lossy().into_owned();
            if self.is_ignored(&name) {
                continue;
            }
            match item.file_type() {
                Ok(t) if t.is_dir() => entries.push(Entry::dir(&rel, name)),
                Ok(t) if t.is_file() => entries.push(Entry::file(&rel, name)),
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(dir = %rel, name = %name, error = %e, "Failed to stat entry, skipping");
                }
            }
        }

        sort_entries(&mut entries);
        tracing::debug!(dir = %rel, count = entries.len(), "Listed directory");
        Ok(entries)
    }

    fn read_file(&self, path: &str) -> Result<String, VaultError> {
        let (rel, abs) = self.locate(path)?;
        if !Self::metadata(&rel, &abs)?.is_file() {
            return Err(VaultError::NotAFile(rel));
        }
        let content = fs::read_to_string(&abs).map_err(|e| VaultError::io(&rel, e))?;
        tracing::debug!(path = %rel, bytes = content.len(), "Read file");
        Ok(content)
    }

    fn write_file(&self, path: &str, content: &str) -> Result<(), VaultError> {
        let (rel, abs) = self.locate(path)?;
        if rel.is_empty() {
            return Err(VaultError::InvalidPath(path.to_owned()));
        }
        self.require_parent(&rel)?;
        if abs.is_dir() {
            return Err(VaultError::NotAFile(rel));
        }
        fs::write(&abs, content).map_err(|e| VaultError::io(&rel, e))?;
        tracing::debug!(path = %rel, bytes = content.len(), "Wrote file");
        Ok(())
    }

    fn mkdir(&self, path: &str) -> Result<(), VaultError> {
        let (rel, abs) = self.locate(path)?;
        if abs.is_file() {
            return Err(VaultError::AlreadyExists(rel));
        }
        fs::create_dir_all(&abs).map_err(|e| VaultError::io(&rel, e))?;
        tracing::debug!(path = %rel, "Created directory");
        Ok(())
    }

    fn delete_file(&self, path: &str) -> Result<(), VaultError> {
        let (rel, abs) = self.locate(path)?;
        if !Self::metadata(&rel, &abs)?.is_file() {
            return Err(VaultError::NotAFile(rel));
        }
        fs::remove_file(&abs).map_err(|e| VaultError::io(&rel, e))?;
        tracing::info!(path = %rel, "Deleted file");
        Ok(())
    }

    fn move_file(&self, from: &str, to: &str) -> Result<(), VaultError> {
        let (from_rel, from_abs) = self.locate(from)?;
        let (to_rel, to_abs) = self.locate(to)?;
        if from_rel == to_rel {
            return Ok(());
        }
        if to_rel.is_empty() {
            return Err(VaultError::InvalidPath(to.to_owned()));
        }
        if !Self::metadata(&from_rel, &from_abs)?.is_file() {
            return Err(VaultError::NotAFile(from_rel));
        }
        self.require_parent(&to_rel)?;
        if to_abs.exists() {
            return Err(VaultError::AlreadyExists(to_rel));
        }
        fs::rename(&from_abs, &to_abs).map_err(|e| VaultError::io(&from_rel, e))?;
        tracing::info!(from = %from_rel, to = %to_rel, "Moved file");
        Ok(())
    }

    fn entry_kind(&self, path: &str) -> Option<EntryKind> {
        let (_, abs) = self.locate(path).ok()?;
        let meta = fs::metadata(abs).ok()?;
        if meta.is_dir() {
            Some(EntryKind::Dir)
        } else if meta.is_file() {
            Some(EntryKind::File)
        } else {
            None
        }
    }
}
