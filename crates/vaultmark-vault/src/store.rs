//! Vault store trait, entry types and path rules.
//!
//! # Path Convention
//!
//! Every path handed to a [`VaultStore`] is vault-relative and uses `/` as
//! separator:
//! - `""` - vault root
//! - `"Daily"` - top-level folder
//! - `"Daily/2024-01-01.md"` - nested note
//!
//! Backslashes are accepted and converted, leading and trailing slashes are
//! ignored. Paths containing NUL bytes or `..` components are rejected with
//! [`VaultError::InvalidPath`].

use std::cmp::Ordering;

use serde::Serialize;

/// Names hidden from directory listings unless configured otherwise.
pub const DEFAULT_IGNORED: &[&str] = &[".obsidian", ".git", "node_modules", ".trash", ".DS_Store"];

/// Kind of a directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Dir,
}

/// One item of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    /// File or folder name.
    pub name: String,
    /// Vault-relative path.
    pub path: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
}

impl Entry {
    pub fn file(dir: &str, name: impl Into<String>) -> Self {
        Self::new(dir, name.into(), EntryKind::File)
    }

    pub fn dir(dir: &str, name: impl Into<String>) -> Self {
        Self::new(dir, name.into(), EntryKind::Dir)
    }

    fn new(dir: &str, name: String, kind: EntryKind) -> Self {
        Self {
            path: join_path(dir, &name),
            name,
            kind,
        }
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Dir
    }
}

/// Vault operation error.
#[derive(Debug, thiserror::Error)]
pub enum VaultError {
    /// Path does not exist.
    #[error("Not found: {0}")]
    NotFound(String),
    /// Path is malformed or escapes the vault.
    #[error("Invalid path: {0}")]
    InvalidPath(String),
    /// Destination already exists.
    #[error("Already exists: {0}")]
    AlreadyExists(String),
    /// Path exists but is not a file.
    #[error("Not a file: {0}")]
    NotAFile(String),
    /// Path exists but is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(String),
    /// Underlying I/O failure.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl VaultError {
    /// Map an I/O error to the matching semantic kind.
    pub fn io(path: &str, err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(path.to_owned()),
            std::io::ErrorKind::AlreadyExists => Self::AlreadyExists(path.to_owned()),
            _ => Self::Io {
                path: path.to_owned(),
                source: err,
            },
        }
    }
}

/// Storage backend for a note vault.
///
/// Implementations must uphold the path convention described in the module
/// docs and share the same error semantics, so callers can swap a
/// filesystem vault for an in-memory one.
pub trait VaultStore: Send + Sync {
    /// List a directory: folders first, then files, each sorted by name
    /// case-insensitively. Ignored names are skipped.
    ///
    /// # Errors
    ///
    /// [`VaultError::NotFound`] or [`VaultError::NotADirectory`] when `dir`
    /// is not a directory.
    fn list_dir(&self, dir: &str) -> Result<Vec<Entry>, VaultError>;

    /// Read a UTF-8 text file.
    ///
    /// # Errors
    ///
    /// [`VaultError::NotAFile`] when `path` is a directory.
    fn read_file(&self, path: &str) -> Result<String, VaultError>;

    /// Create or overwrite a file. The parent directory must exist.
    ///
    /// # Errors
    ///
    /// [`VaultError::NotFound`] when the parent directory is missing.
    fn write_file(&self, path: &str, content: &str) -> Result<(), VaultError>;

    /// Create a directory and all missing parents.
    ///
    /// # Errors
    ///
    /// [`VaultError::AlreadyExists`] when a file is in the way.
    fn mkdir(&self, path: &str) -> Result<(), VaultError>;

    /// Delete a file. Directories are never deleted.
    ///
    /// # Errors
    ///
    /// [`VaultError::NotAFile`] when `path` is a directory.
    fn delete_file(&self, path: &str) -> Result<(), VaultError>;

    /// Move or rename a file. Moving a path onto itself is a no-op.
    ///
    /// # Errors
    ///
    /// [`VaultError::AlreadyExists`] when `to` exists, [`VaultError::NotFound`]
    /// when the destination directory is missing.
    fn move_file(&self, from: &str, to: &str) -> Result<(), VaultError>;

    /// Kind of the entry at `path`, or `None` when nothing is there or the
    /// path is invalid.
    fn entry_kind(&self, path: &str) -> Option<EntryKind>;

    /// Check whether anything exists at `path`.
    fn exists(&self, path: &str) -> bool {
        self.entry_kind(path).is_some()
    }

    /// Check whether `path` is a regular file.
    fn is_file(&self, path: &str) -> bool {
        self.entry_kind(path) == Some(EntryKind::File)
    }
}

/// Normalize a vault-relative path.
///
/// ```rust
/// use vaultmark_vault::normalize_path;
///
/// assert_eq!(normalize_path("\\Notes//a.md/").unwrap(), "Notes/a.md");
/// assert_eq!(normalize_path("./").unwrap(), "");
/// assert!(normalize_path("Notes/../../etc").is_err());
/// ```
///
/// # Errors
///
/// [`VaultError::InvalidPath`] for NUL bytes and `..` components.
pub fn normalize_path(path: &str) -> Result<String, VaultError> {
    if path.contains('\0') {
        return Err(VaultError::InvalidPath(path.replace('\0', "\\0")));
    }
    let mut parts = Vec::new();
    for part in path.split(['/', '\\']) {
        match part {
            "" | "." => {}
            ".." => return Err(VaultError::InvalidPath(path.to_owned())),
            _ => parts.push(part),
        }
    }
    Ok(parts.join("/"))
}

/// Directory part of a normalized path (`""` for top-level entries).
pub fn parent_dir(path: &str) -> &str {
    path.rsplit_once('/').map_or("", |(dir, _)| dir)
}

/// Last component of a normalized path.
pub fn file_name(path: &str) -> &str {
    path.rsplit_once('/').map_or(path, |(_, name)| name)
}

pub fn join_path(dir: &str, name: &str) -> String {
    match (dir.is_empty(), name.is_empty()) {
        (true, _) => name.to_owned(),
        (_, true) => dir.to_owned(),
        _ => format!("{dir}/{name}"),
    }
}

/// Sort entries the way listings are presented: folders first, then by
/// case-insensitive name.
pub fn sort_entries(entries: &mut [Entry]) {
    entries.sort_by(|a, b| match (a.is_dir(), b.is_dir()) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => a
            .name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.name.cmp(&b.name)),
    });
}
