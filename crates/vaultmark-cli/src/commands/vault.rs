//! Vault commands: listing, searching, reading and writing notes, file
//! management and wikilink resolution against a vault directory.

use std::io::Read;
use std::path::{Path, PathBuf};

use clap::Subcommand;
use vaultmark_vault::{
    decode_wikilink, normalize_path, resolve, search, CliSettings, Config, Entry, FsVault,
    LinkIndex, Session, VaultStore,
};

use super::print_json;
use crate::error::CliError;

#[derive(Subcommand)]
pub(crate) enum VaultCommand {
    /// List a vault folder.
    Ls {
        /// Folder relative to the vault root (default: the root).
        dir: Option<String>,
    },
    /// Find notes and folders whose path contains QUERY (case-insensitive).
    Find { query: String },
    /// Print a note.
    Cat { path: String },
    /// Render a note to HTML.
    Preview { path: String },
    /// Replace a note with the contents of stdin.
    Write { path: String },
    /// Create a folder and its parents.
    Mkdir { path: String },
    /// Delete a note.
    Rm { path: String },
    /// Move or rename a note.
    Mv { from: String, to: String },
    /// Resolve a wikilink target to a note path.
    Resolve {
        /// Link target as written inside `[[...]]`, or its encoded form.
        target: String,
        /// Note containing the link; its folder is searched first.
        #[arg(long)]
        from: Option<String>,
    },
}

/// Global options the vault commands need.
pub(crate) struct VaultOptions<'a> {
    pub vault: Option<PathBuf>,
    pub config: Option<&'a Path>,
    pub json: bool,
}

impl VaultCommand {
    pub(crate) fn execute(self, options: VaultOptions<'_>) -> Result<(), CliError> {
        let cli_settings = CliSettings {
            vault_root: options.vault,
        };
        let config = Config::load(options.config, Some(&cli_settings))?;
        let vault = FsVault::open(config.vault_root()?)?.with_ignored(config.vault.ignored.clone());
        tracing::debug!(root = %vault.root().display(), command = self.name(), "Running vault command");

        let json = options.json;
        match self {
            Self::Ls { dir } => {
                let dir = dir.unwrap_or_default();
                let entries = vault.list_dir(&dir)?;
                if json {
                    return print_json(&serde_json::json!({
                        "dir": normalize_path(&dir)?,
                        "entries": entries,
                    }));
                }
                print_entries(&entries);
                Ok(())
            }
            Self::Find { query } => {
                let entries = search(&vault, &query)?;
                if json {
                    return print_json(&serde_json::json!({
                        "query": query.trim(),
                        "entries": entries,
                    }));
                }
                print_entries(&entries);
                Ok(())
            }
            Self::Cat { path } => {
                let content = vault.read_file(&path)?;
                if json {
                    return print_json(&serde_json::json!({
                        "path": normalize_path(&path)?,
                        "content": content,
                    }));
                }
                print!("{content}");
                Ok(())
            }
            Self::Preview { path } => {
                let mut session = Session::new(config.editor.autosave_delay());
                session.open(&vault, &path, false)?;
                let html = session.preview_html();
                if json {
                    return print_json(&serde_json::json!({
                        "path": session.active_file(),
                        "html": html,
                    }));
                }
                println!("{html}");
                Ok(())
            }
            Self::Write { path } => {
                let mut content = String::new();
                std::io::stdin().read_to_string(&mut content)?;
                vault.write_file(&path, &content)?;
                done(json)
            }
            Self::Mkdir { path } => {
                vault.mkdir(&path)?;
                done(json)
            }
            Self::Rm { path } => {
                vault.delete_file(&path)?;
                done(json)
            }
            Self::Mv { from, to } => {
                vault.move_file(&from, &to)?;
                done(json)
            }
            Self::Resolve { target, from } => {
                let target = decode_wikilink(&target);
                let mut index = LinkIndex::new();
                let resolved = resolve(&vault, &mut index, &target, from.as_deref())?;
                if json {
                    return print_json(&serde_json::json!({
                        "target": target,
                        "path": resolved,
                    }));
                }
                let path = resolved.ok_or(CliError::Unresolved(target))?;
                println!("{path}");
                Ok(())
            }
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Ls { .. } => "ls",
            Self::Find { .. } => "find",
            Self::Cat { .. } => "cat",
            Self::Preview { .. } => "preview",
            Self::Write { .. } => "write",
            Self::Mkdir { .. } => "mkdir",
            Self::Rm { .. } => "rm",
            Self::Mv { .. } => "mv",
            Self::Resolve { .. } => "resolve",
        }
    }
}

fn print_entries(entries: &[Entry]) {
    for entry in entries {
        if entry.is_dir() {
            println!("{}/", entry.path);
        } else {
            println!("{}", entry.path);
        }
    }
}

/// Acknowledge a mutation. Text mode stays silent.
fn done(json: bool) -> Result<(), CliError> {
    if json {
        print_json(&serde_json::json!({"ok": true}))?;
    }
    Ok(())
}
