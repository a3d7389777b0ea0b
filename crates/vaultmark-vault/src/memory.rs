//! In-memory vault.
//!
//! Provides [`MemoryVault`] for tests and demos that should not touch the
//! filesystem. It follows the same path rules and error semantics as
//! [`FsVault`](crate::FsVault).

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::store::{
    file_name, normalize_path, parent_dir, sort_entries, Entry, EntryKind, VaultError, VaultStore,
    DEFAULT_IGNORED,
};

#[derive(Debug)]
struct Tree {
    files: BTreeMap<String, String>,
    /// Every directory except the root.
    dirs: BTreeSet<String>,
}

impl Tree {
    fn kind(&self, rel: &str) -> Option<EntryKind> {
        if rel.is_empty() || self.dirs.contains(rel) {
            Some(EntryKind::Dir)
        } else if self.files.contains_key(rel) {
            Some(EntryKind::File)
        } else {
            None
        }
    }

    fn require_dir(&self, rel: &str) -> Result<(), VaultError> {
        match self.kind(rel) {
            Some(EntryKind::Dir) => Ok(()),
            Some(EntryKind::File) => Err(VaultError::NotADirectory(rel.to_owned())),
            None => Err(VaultError::NotFound(rel.to_owned())),
        }
    }

    /// Create `rel` and all of its ancestors.
    fn create_dirs(&mut self, rel: &str) -> Result<(), VaultError> {
        let mut current = String::new();
        for part in rel.split('/').filter(|p| !p.is_empty()) {
            if !current.is_empty() {
                current.push('/');
            }
            current.push_str(part);
            if self.files.contains_key(&current) {
                return Err(VaultError::AlreadyExists(current));
            }
            self.dirs.insert(current.clone());
        }
        Ok(())
    }
}

/// Vault kept entirely in memory.
///
/// # Example
///
/// ```rust
/// use vaultmark_vault::{MemoryVault, VaultStore};
///
/// let vault = MemoryVault::new().with_file("Notes/todo.md", "- [ ] write tests");
/// assert_eq!(vault.read_file("Notes/todo.md").unwrap(), "- [ ] write tests");
/// assert_eq!(vault.list_dir("").unwrap()[0].name, "Notes");
/// ```
#[derive(Debug)]
pub struct MemoryVault {
    tree: RwLock<Tree>,
    ignored: Vec<String>,
}

impl Default for MemoryVault {
    fn default() -> Self {
        Self {
            tree: RwLock::new(Tree {
                files: BTreeMap::new(),
                dirs: BTreeSet::new(),
            }),
            ignored: DEFAULT_IGNORED.iter().map(|s| (*s).to_owned()).collect(),
        }
    }
}

impl MemoryVault {
    /// Create an empty vault.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file, creating its parent folders.
    ///
    /// Invalid paths are ignored.
    #[must_use]
    pub fn with_file(self, path: &str, content: impl Into<String>) -> Self {
        if let Ok(rel) = normalize_path(path) {
            let mut tree = self.write();
            if tree.create_dirs(parent_dir(&rel)).is_ok() && !rel.is_empty() {
                tree.files.insert(rel, content.into());
            }
        }
        self
    }

    /// Add an empty folder, creating its parents.
    #[must_use]
    pub fn with_dir(self, path: &str) -> Self {
        if let Ok(rel) = normalize_path(path) {
            let _ = self.write().create_dirs(&rel);
        }
        self
    }

    /// Replace the list of names hidden from listings.
    #[must_use]
    pub fn with_ignored(mut self, ignored: Vec<String>) -> Self {
        self.ignored = ignored;
        self
    }

    /// Number of files in the vault.
    pub fn file_count(&self) -> usize {
        self.read().files.len()
    }

    fn read(&self) -> RwLockReadGuard<'_, Tree> {
        self.tree.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Tree> {
        self.tree.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_ignored(&self, name: &str) -> bool {
        self.ignored.iter().any(|ignored| ignored == name)
    }
}

/// Direct child name of `dir` for `path`, if `path` sits right below it.
fn child_name<'a>(dir: &str, path: &'a str) -> Option<&'a str> {
    (parent_dir(path) == dir).then(|| file_name(path))
}

impl VaultStore for MemoryVault {
    fn list_dir(&self, dir: &str) -> Result<Vec<Entry>, VaultError> {
        let rel = normalize_path(dir)?;
        let tree = self.read();
        tree.require_dir(&rel)?;

        let dirs = tree
            .dirs
            .iter()
            .filter_map(|d| child_name(&rel, d))
            .filter(|name| !self.is_ignored(name))
            .map(|name| Entry::dir(&rel, name));
        let files = tree
            .files
            .keys()
            .filter_map(|f| child_name(&rel, f))
            .filter(|name| !self.is_ignored(name))
            .map(|name| Entry::file(&rel, name));

        let mut entries: Vec<Entry> = dirs.chain(files).collect();
        sort_entries(&mut entries);
        Ok(entries)
    }

    fn read_file(&self, path: &str) -> Result<String, VaultError> {
        let rel = normalize_path(path)?;
        let tree = self.read();
        match tree.kind(&rel) {
            Some(EntryKind::File) => Ok(tree.files.get(&rel).cloned().unwrap_or_default()),
            Some(EntryKind::Dir) => Err(VaultError::NotAFile(rel)),
            None => Err(VaultError::NotFound(rel)),
        }
    }

    fn write_file(&self, path: &str, content: &str) -> Result<(), VaultError> {
        let rel = normalize_path(path)?;
        if rel.is_empty() {
            return Err(VaultError::InvalidPath(path.to_owned()));
        }
        let mut tree = self.write();
        tree.require_dir(parent_dir(&rel))?;
        if tree.kind(&rel) == Some(EntryKind::Dir) {
            return Err(VaultError::NotAFile(rel));
        }
        tree.files.insert(rel, content.to_owned());
        Ok(())
    }

    fn mkdir(&self, path: &str) -> Result<(), VaultError> {
        let rel = normalize_path(path)?;
        self.write().create_dirs(&rel)
    }

    fn delete_file(&self, path: &str) -> Result<(), VaultError> {
        let rel = normalize_path(path)?;
        let mut tree = self.write();
        match tree.kind(&rel) {
            Some(EntryKind::File) => {
                tree.files.remove(&rel);
                Ok(())
            }
            Some(EntryKind::Dir) => Err(VaultError::NotAFile(rel)),
            None => Err(VaultError::NotFound(rel)),
        }
    }

    fn move_file(&self, from: &str, to: &str) -> Result<(), VaultError> {
        let from_rel = normalize_path(from)?;
        let to_rel = normalize_path(to)?;
        if from_rel == to_rel {
            return Ok(());
        }
        if to_rel.is_empty() {
            return Err(VaultError::InvalidPath(to.to_owned()));
        }
        let mut tree = self.write();
        match tree.kind(&from_rel) {
            Some(EntryKind::File) => {}
            Some(EntryKind::Dir) => return Err(VaultError::NotAFile(from_rel)),
            None => return Err(VaultError::NotFound(from_rel)),
        }
        tree.require_dir(parent_dir(&to_rel))?;
        if tree.kind(&to_rel).is_some() {
            return Err(VaultError::AlreadyExists(to_rel));
        }
        if let Some(content) = tree.files.remove(&from_rel) {
            tree.files.insert(to_rel, content);
        }
        Ok(())
    }

    fn entry_kind(&self, path: &str) -> Option<EntryKind> {
        let rel = normalize_path(path).ok()?;
        self.read().kind(&rel)
    }
}
