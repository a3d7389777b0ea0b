//! Configuration for vaultmark.
//!
//! Parses `vaultmark.toml` with serde. The file is looked up in the current
//! directory unless a path is given explicitly, and command-line settings
//! are applied on top through [`CliSettings`].
//!
//! ```toml
//! [vault]
//! root = "notes"   # relative to the config file
//! ignored = [".obsidian", ".git"]
//!
//! [editor]
//! autosave_delay_ms = 1200
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::store::DEFAULT_IGNORED;

/// Configuration filename to search for.
pub const CONFIG_FILENAME: &str = "vaultmark.toml";

/// CLI settings that override configuration file values.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override the vault root.
    pub vault_root: Option<PathBuf>,
}

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub vault: VaultConfig,
    pub editor: EditorConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// `[vault]` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct VaultConfig {
    /// Vault directory.
    pub root: Option<PathBuf>,
    /// Names hidden from directory listings.
    pub ignored: Vec<String>,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            root: None,
            ignored: DEFAULT_IGNORED.iter().map(|s| (*s).to_owned()).collect(),
        }
    }
}

/// `[editor]` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub autosave_delay_ms: u64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            autosave_delay_ms: 1200,
        }
    }
}

impl EditorConfig {
    pub fn autosave_delay(&self) -> Duration {
        Duration::from_millis(self.autosave_delay_ms)
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// No vault root was configured anywhere.
    #[error("No vault configured: pass --vault, set OBSIDIAN_VAULT or add [vault] root to vaultmark.toml")]
    MissingVault,
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file. Otherwise uses
    /// `vaultmark.toml` in the current directory when present, and defaults
    /// when not.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    /// The configured vault root.
    ///
    /// # Errors
    ///
    /// [`ConfigError::MissingVault`] when neither the file nor the CLI set one.
    pub fn vault_root(&self) -> Result<&Path, ConfigError> {
        self.vault.root.as_deref().ok_or(ConfigError::MissingVault)
    }

    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(root) = &settings.vault_root {
            self.vault.root = Some(root.clone());
        }
    }

    fn discover_config() -> Option<PathBuf> {
        let candidate = std::env::current_dir().ok()?.join(CONFIG_FILENAME);
        candidate.is_file().then_some(candidate)
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());
        tracing::debug!(path = %path.display(), "Loaded configuration");

        Ok(config)
    }

    fn resolve_paths(&mut self, config_dir: &Path) {
        if let Some(root) = &self.vault.root {
            if root.is_relative() {
                self.vault.root = Some(config_dir.join(root));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.vault.root.is_none());
        assert_eq!(config.vault.ignored.len(), DEFAULT_IGNORED.len());
        assert_eq!(config.editor.autosave_delay(), Duration::from_millis(1200));
        assert!(matches!(config.vault_root(), Err(ConfigError::MissingVault)));
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.vault.root.is_none());
        assert_eq!(config.editor.autosave_delay_ms, 1200);
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[vault]
root = "notes"
ignored = [".git"]

[editor]
autosave_delay_ms = 500
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve_paths(Path::new("/project"));

        assert_eq!(config.vault.root, Some(PathBuf::from("/project/notes")));
        assert_eq!(config.vault.ignored, vec![".git".to_owned()]);
        assert_eq!(config.editor.autosave_delay(), Duration::from_millis(500));
    }

    #[test]
    fn test_absolute_root_is_kept() {
        let mut config: Config = toml::from_str("[vault]\nroot = \"/srv/vault\"").unwrap();
        config.resolve_paths(Path::new("/project"));
        assert_eq!(config.vault.root, Some(PathBuf::from("/srv/vault")));
    }

    #[test]
    fn test_apply_cli_settings_vault_root() {
        let mut config = Config::default();
        config.apply_cli_settings(&CliSettings {
            vault_root: Some(PathBuf::from("/cli/vault")),
        });
        assert_eq!(config.vault_root().unwrap(), Path::new("/cli/vault"));
    }

    #[test]
    fn test_apply_cli_settings_empty() {
        let mut config: Config = toml::from_str("[vault]\nroot = \"/file/vault\"").unwrap();
        config.apply_cli_settings(&CliSettings::default());
        assert_eq!(config.vault_root().unwrap(), Path::new("/file/vault"));
    }

    #[test]
    fn test_explicit_missing_file() {
        let err = Config::load(Some(Path::new("/nonexistent/vaultmark.toml")), None).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_load_from_file_resolves_root() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "[vault]\nroot = \"vault\"\n").unwrap();

        let config = Config::load(Some(&path), None).unwrap();
        assert_eq!(config.vault_root().unwrap(), dir.path().join("vault"));
        assert_eq!(config.config_path, Some(path));
    }
}
