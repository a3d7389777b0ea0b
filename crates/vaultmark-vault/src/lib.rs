//! Vault access for vaultmark.
//!
//! This crate sits between the renderer and whatever shows notes to a user:
//!
//! - [`VaultStore`] trait with the six file operations a note browser needs
//! - [`FsVault`] for a directory on disk, [`MemoryVault`] for tests and demos
//! - wikilink resolution ([`resolve`], [`LinkIndex`]) and path search ([`search`])
//! - [`Session`], the editor state holder with autosave deadlines
//! - [`Config`], loaded from `vaultmark.toml`
//!
//! # Example
//!
//! ```rust
//! use vaultmark_vault::{MemoryVault, Session};
//!
//! let vault = MemoryVault::new()
//!     .with_file("Home.md", "See [[Projects/Roadmap|the roadmap]].")
//!     .with_file("Projects/Roadmap.md", "# Roadmap");
//!
//! let mut session = Session::default();
//! session.open(&vault, "Home.md", false)?;
//! assert!(session.preview_html().contains("data-wikilink=\"Projects%2FRoadmap\""));
//!
//! let opened = session.follow_wikilink(&vault, "Projects%2FRoadmap")?;
//! assert_eq!(opened, "Projects/Roadmap.md");
//! assert_eq!(session.preview_html(), "<h1>Roadmap</h1>");
//! # Ok::<(), vaultmark_vault::SessionError>(())
//! ```

mod config;
mod fs;
mod links;
#[cfg(feature = "memory")]
mod memory;
mod session;
mod store;

pub use config::{CliSettings, Config, ConfigError, EditorConfig, VaultConfig, CONFIG_FILENAME};
pub use fs::FsVault;
pub use links::{decode_wikilink, normalize_target, resolve, search, LinkIndex};
#[cfg(feature = "memory")]
pub use memory::MemoryVault;
pub use session::{
    Session, SessionError, ViewMode, DEFAULT_AUTOSAVE_DELAY, NO_FILE_PLACEHOLDER,
};
pub use store::{
    file_name, join_path, normalize_path, parent_dir, sort_entries, Entry, EntryKind, VaultError,
    VaultStore, DEFAULT_IGNORED,
};
