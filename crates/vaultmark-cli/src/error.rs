//! CLI error types.

use std::path::PathBuf;

use vaultmark_vault::{ConfigError, SessionError, VaultError};

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Vault(#[from] VaultError),

    #[error("{0}")]
    Session(#[from] SessionError),

    #[error("failed to read '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Json(#[from] serde_json::Error),

    /// `check` found problems; they have already been printed.
    #[error("{0} diagnostic(s) found")]
    Diagnostics(usize),

    #[error("link target not found: {0}")]
    Unresolved(String),
}
