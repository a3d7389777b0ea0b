//! Editor session.
//!
//! [`Session`] is the single owner of editor state: which note is open, the
//! edit buffer, whether it differs from what was last saved, whether the
//! editor or the preview is showing, when the next autosave is due and the
//! wikilink index. Every change goes through a method, and the store is
//! passed in per call so the session never holds on to it.
//!
//! Autosave is modelled with deadlines rather than timers: [`Session::edit`]
//! schedules one, and the host calls [`Session::tick`] to perform it once
//! it has passed.

use std::time::{Duration, Instant};

use crate::links::{decode_wikilink, resolve, LinkIndex};
use crate::store::{normalize_path, VaultError, VaultStore};

/// Default delay between the last edit and the autosave.
pub const DEFAULT_AUTOSAVE_DELAY: Duration = Duration::from_millis(1200);

/// Preview shown while no note is open.
pub const NO_FILE_PLACEHOLDER: &str = r#"<div class="muted">Select a file on the left…</div>"#;

/// Which pane is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Preview,
    Editor,
}

/// Session operation error.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Opening another note would drop unsaved edits.
    #[error("Unsaved changes in {0}")]
    UnsavedChanges(String),
    /// The operation needs an open note.
    #[error("No file is open")]
    NoActiveFile,
    /// A wikilink did not resolve to any note.
    #[error("Link not found: [[{0}]]")]
    LinkNotFound(String),
    #[error(transparent)]
    Vault(#[from] VaultError),
}

/// Editor state for one vault.
#[derive(Debug)]
pub struct Session {
    active_file: Option<String>,
    /// Content as last read or written.
    saved: String,
    buffer: String,
    dirty: bool,
    mode: ViewMode,
    autosave_delay: Duration,
    autosave_at: Option<Instant>,
    links: LinkIndex,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(DEFAULT_AUTOSAVE_DELAY)
    }
}

impl Session {
    pub fn new(autosave_delay: Duration) -> Self {
        Self {
            active_file: None,
            saved: String::new(),
            buffer: String::new(),
            dirty: false,
            mode: ViewMode::Preview,
            autosave_delay,
            autosave_at: None,
            links: LinkIndex::new(),
        }
    }

    pub fn active_file(&self) -> Option<&str> {
        self.active_file.as_deref()
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    /// When the pending autosave is due, if one is scheduled.
    pub fn autosave_deadline(&self) -> Option<Instant> {
        self.autosave_at
    }

    pub fn links(&self) -> &LinkIndex {
        &self.links
    }

    /// Open a note, replacing the buffer.
    ///
    /// # Errors
    ///
    /// [`SessionError::UnsavedChanges`] when the buffer is dirty and
    /// `discard_unsaved` is false; any read error from the store.
    pub fn open(
        &mut self,
        store: &dyn VaultStore,
        path: &str,
        discard_unsaved: bool,
    ) -> Result<(), SessionError> {
        if self.dirty && !discard_unsaved {
            let active = self.active_file.clone().unwrap_or_default();
            return Err(SessionError::UnsavedChanges(active));
        }
        let path = normalize_path(path)?;
        let content = store.read_file(&path)?;

        tracing::debug!(path = %path, "Opened note");
        self.active_file = Some(path);
        self.saved.clone_from(&content);
        self.buffer = content;
        self.dirty = false;
        self.mode = ViewMode::Preview;
        self.autosave_at = None;
        Ok(())
    }

    /// Replace the buffer with edited text.
    ///
    /// Ignored while no note is open. Schedules an autosave when the buffer
    /// differs from the saved content.
    pub fn edit(&mut self, text: &str, now: Instant) {
        if self.active_file.is_none() {
            return;
        }
        self.buffer = text.to_owned();
        self.dirty = self.buffer != self.saved;
        self.autosave_at = self.dirty.then(|| now + self.autosave_delay);
    }

    /// Write the buffer to the open note and show the preview.
    ///
    /// # Errors
    ///
    /// [`SessionError::NoActiveFile`] or any write error from the store.
    pub fn save(&mut self, store: &dyn VaultStore) -> Result<(), SessionError> {
        self.write_buffer(store)?;
        self.mode = ViewMode::Preview;
        Ok(())
    }

    /// Perform the scheduled autosave if its deadline has passed.
    ///
    /// Returns whether a save happened. The view mode is left alone so an
    /// autosave never pulls the user out of the editor.
    ///
    /// # Errors
    ///
    /// Any write error from the store; the autosave stays scheduled.
    pub fn tick(&mut self, store: &dyn VaultStore, now: Instant) -> Result<bool, SessionError> {
        match self.autosave_at {
            Some(due) if now >= due && self.dirty => {}
            _ => return Ok(false),
        }
        self.write_buffer(store)?;
        tracing::debug!("Autosaved");
        Ok(true)
    }

    fn write_buffer(&mut self, store: &dyn VaultStore) -> Result<(), SessionError> {
        let path = self.active_file.as_deref().ok_or(SessionError::NoActiveFile)?;
        store.write_file(path, &self.buffer)?;
        self.saved.clone_from(&self.buffer);
        self.dirty = false;
        self.autosave_at = None;
        Ok(())
    }

    /// Switch to the editor. Does nothing while no note is open.
    pub fn show_editor(&mut self) {
        if self.active_file.is_some() {
            self.mode = ViewMode::Editor;
        }
    }

    pub fn show_preview(&mut self) {
        self.mode = ViewMode::Preview;
    }

    /// HTML for the preview pane.
    pub fn preview_html(&self) -> String {
        if self.active_file.is_some() {
            vaultmark_core::render(&self.buffer)
        } else {
            NO_FILE_PLACEHOLDER.to_owned()
        }
    }

    /// Create an empty note and return its normalized path.
    ///
    /// The new note is not opened.
    ///
    /// # Errors
    ///
    /// Any error from the store.
    pub fn create_file(
        &mut self,
        store: &dyn VaultStore,
        path: &str,
    ) -> Result<String, SessionError> {
        let path = normalize_path(path)?;
        if store.exists(&path) {
            return Err(VaultError::AlreadyExists(path).into());
        }
        store.write_file(&path, "")?;
        self.links.invalidate();
        Ok(path)
    }

    /// Create a folder and its parents.
    ///
    /// # Errors
    ///
    /// Any error from the store.
    pub fn create_folder(&mut self, store: &dyn VaultStore, path: &str) -> Result<(), SessionError> {
        store.mkdir(path)?;
        self.links.invalidate();
        Ok(())
    }

    /// Move a note. When it is the open note the session follows it,
    /// keeping any unsaved edits.
    ///
    /// # Errors
    ///
    /// Any error from the store.
    pub fn move_file(
        &mut self,
        store: &dyn VaultStore,
        from: &str,
        to: &str,
    ) -> Result<(), SessionError> {
        let from = normalize_path(from)?;
        let to = normalize_path(to)?;
        store.move_file(&from, &to)?;
        self.links.invalidate();
        if self.active_file.as_deref() == Some(from.as_str()) {
            self.active_file = Some(to);
        }
        Ok(())
    }

    /// Delete a note. Deleting the open note closes it.
    ///
    /// # Errors
    ///
    /// Any error from the store.
    pub fn delete_file(&mut self, store: &dyn VaultStore, path: &str) -> Result<(), SessionError> {
        let path = normalize_path(path)?;
        store.delete_file(&path)?;
        self.links.invalidate();
        if self.active_file.as_deref() == Some(path.as_str()) {
            self.close();
        }
        Ok(())
    }

    /// Forget the open note and any unsaved edits.
    pub fn close(&mut self) {
        self.active_file = None;
        self.saved.clear();
        self.buffer.clear();
        self.dirty = false;
        self.mode = ViewMode::Preview;
        self.autosave_at = None;
    }

    /// Follow a rendered wikilink given its `data-wikilink` value, opening the
    /// note it points to. Returns the opened path.
    ///
    /// # Errors
    ///
    /// [`SessionError::LinkNotFound`] when nothing matches, or any error from
    /// [`Session::open`].
    pub fn follow_wikilink(
        &mut self,
        store: &dyn VaultStore,
        attr: &str,
    ) -> Result<String, SessionError> {
        let target = decode_wikilink(attr);
        let resolved = resolve(store, &mut self.links, &target, self.active_file.as_deref())?
            .ok_or_else(|| SessionError::LinkNotFound(target.clone()))?;
        self.open(store, &resolved, false)?;
        Ok(resolved)
    }
}
