//! Wikilink resolution.
//!
//! Rendered wikilinks carry their target in a URL-encoded `data-wikilink`
//! attribute. Resolving one maps it back to a vault file: a bare name is
//! looked up next to the note that contains the link first, then anywhere
//! in the vault by file stem. Targets with a folder part must match exactly.

use std::collections::HashMap;

use percent_encoding::percent_decode_str;

use crate::store::{
    file_name, join_path, normalize_path, parent_dir, Entry, EntryKind, VaultError, VaultStore,
};

/// Decode a `data-wikilink` attribute value.
///
/// ```rust
/// use vaultmark_vault::decode_wikilink;
///
/// assert_eq!(decode_wikilink("Daily%20Log"), "Daily Log");
/// ```
pub fn decode_wikilink(attr: &str) -> String {
    percent_decode_str(attr).decode_utf8_lossy().into_owned()
}

/// Lower-cased file stem to note paths, built by walking the vault.
///
/// The index is built on first use and dropped by [`LinkIndex::invalidate`]
/// whenever the set of files may have changed.
#[derive(Debug, Default)]
pub struct LinkIndex {
    by_stem: Option<HashMap<String, Vec<String>>>,
}

impl LinkIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Walk `store` and build a fresh index.
    ///
    /// # Errors
    ///
    /// Returns the first listing error encountered.
    pub fn build(store: &dyn VaultStore) -> Result<Self, VaultError> {
        let mut by_stem = HashMap::new();
        walk(store, "", &mut by_stem)?;
        tracing::debug!(stems = by_stem.len(), "Built link index");
        Ok(Self {
            by_stem: Some(by_stem),
        })
    }

    pub fn is_built(&self) -> bool {
        self.by_stem.is_some()
    }

    /// Build the index if it is not built yet.
    ///
    /// # Errors
    ///
    /// Returns the first listing error encountered.
    pub fn ensure(&mut self, store: &dyn VaultStore) -> Result<(), VaultError> {
        if !self.is_built() {
            *self = Self::build(store)?;
        }
        Ok(())
    }

    pub fn invalidate(&mut self) {
        self.by_stem = None;
    }

    /// All notes whose stem matches `stem` case-insensitively, in walk order.
    pub fn get(&self, stem: &str) -> &[String] {
        self.by_stem
            .as_ref()
            .and_then(|map| map.get(&stem.to_lowercase()))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Number of distinct stems.
    pub fn len(&self) -> usize {
        self.by_stem.as_ref().map_or(0, HashMap::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn walk(
    store: &dyn VaultStore,
    dir: &str,
    by_stem: &mut HashMap<String, Vec<String>>,
) -> Result<(), VaultError> {
    for entry in store.list_dir(dir)? {
        match entry.kind {
            EntryKind::Dir => walk(store, &entry.path, by_stem)?,
            EntryKind::File => {
                if let Some(stem) = markdown_stem(&entry.name) {
                    by_stem
                        .entry(stem.to_lowercase())
                        .or_default()
                        .push(entry.path);
                }
            }
        }
    }
    Ok(())
}

/// Filter the vault tree by a case-insensitive substring of entry paths.
///
/// Returns matching entries in tree order (each folder directly followed by
/// what is kept below it). A folder is kept when its own path matches or
/// anything below it does. A blank query keeps everything.
///
/// ```rust
/// use vaultmark_vault::{search, MemoryVault};
///
/// let vault = MemoryVault::new()
///     .with_file("Projects/Roadmap.md", "")
///     .with_file("Inbox.md", "");
/// let paths: Vec<_> = search(&vault, "road")?.into_iter().map(|e| e.path).collect();
/// assert_eq!(paths, ["Projects", "Projects/Roadmap.md"]);
/// # Ok::<(), vaultmark_vault::VaultError>(())
/// ```
///
/// # Errors
///
/// Returns the first listing error encountered.
pub fn search(store: &dyn VaultStore, query: &str) -> Result<Vec<Entry>, VaultError> {
    let query = query.trim().to_lowercase();
    let mut found = Vec::new();
    search_dir(store, "", &query, &mut found)?;
    tracing::debug!(query = %query, matches = found.len(), "Searched vault");
    Ok(found)
}

/// Append the kept entries of `dir` to `found`; returns whether any were kept.
fn search_dir(
    store: &dyn VaultStore,
    dir: &str,
    query: &str,
    found: &mut Vec<Entry>,
) -> Result<bool, VaultError> {
    let mut kept_any = false;
    for entry in store.list_dir(dir)? {
        let hit = entry.path.to_lowercase().contains(query);
        match entry.kind {
            EntryKind::Dir => {
                let mark = found.len();
                let path = entry.path.clone();
                found.push(entry);
                let below = search_dir(store, &path, query, found)?;
                if hit || below {
                    kept_any = true;
                } else {
                    found.truncate(mark);
                }
            }
            EntryKind::File if hit => {
                found.push(entry);
                kept_any = true;
            }
            EntryKind::File => {}
        }
    }
    Ok(kept_any)
}

/// File name without a case-insensitive `.md` suffix, for Markdown files.
fn markdown_stem(name: &str) -> Option<&str> {
    let split = name.len().checked_sub(3)?;
    if !name.is_char_boundary(split) || !name[split..].eq_ignore_ascii_case(".md") {
        return None;
    }
    Some(&name[..split])
}

fn has_extension(path: &str) -> bool {
    let base = file_name(path);
    base.contains('.') && !base.starts_with('.')
}

/// Clean up a raw wikilink target: unify separators, drop leading slashes
/// and the `#heading` part, and add `.md` when no extension is given.
///
/// Returns `None` when nothing is left.
pub fn normalize_target(target: &str) -> Option<String> {
    let target = target.trim().replace('\\', "/");
    let target = target.trim_start_matches('/');
    let target = target.split('#').next().unwrap_or_default().trim();
    if target.is_empty() {
        return None;
    }
    if has_extension(target) {
        Some(target.to_owned())
    } else {
        Some(format!("{target}.md"))
    }
}

/// Resolve a wikilink target to a vault file.
///
/// `active_file` is the note containing the link; bare names are tried in
/// its folder first. The link index is built on demand.
///
/// # Errors
///
/// Only index construction can fail; an unresolvable target is `Ok(None)`.
pub fn resolve(
    store: &dyn VaultStore,
    index: &mut LinkIndex,
    target: &str,
    active_file: Option<&str>,
) -> Result<Option<String>, VaultError> {
    let Some(target) = normalize_target(target) else {
        return Ok(None);
    };

    if target.contains('/') {
        let found = normalize_path(&target)
            .ok()
            .filter(|path| store.is_file(path));
        return Ok(found);
    }

    let dir = active_file.map_or("", parent_dir);
    if let Ok(candidate) = normalize_path(&join_path(dir, &target)) {
        if store.is_file(&candidate) {
            return Ok(Some(candidate));
        }
    }

    let stem = markdown_stem(&target).unwrap_or(&target);
    index.ensure(store)?;
    let found = index.get(stem).first().cloned();
    if found.is_none() {
        tracing::debug!(target = %target, "Wikilink target not found");
    }
    Ok(found)
}
