//! vmark - render notes and manage a Markdown vault.
//!
//! Document commands work on a single file or stdin:
//! - `render`: print the HTML fragment
//! - `parse`: show the block structure
//! - `check`: report diagnostics
//! - `stats`: show document statistics
//!
//! Vault commands (`ls`, `find`, `cat`, `preview`, `write`, `mkdir`, `rm`, `mv`,
//! `resolve`) need a vault root from `--vault`, `OBSIDIAN_VAULT` or
//! `vaultmark.toml`.

mod commands;
mod error;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{DocumentCommand, VaultCommand, VaultOptions};

/// vmark - Markdown notes with wikilinks and tags.
#[derive(Parser)]
#[command(name = "vmark", version, about)]
struct Cli {
    /// Vault root directory (overrides config).
    #[arg(long, env = "OBSIDIAN_VAULT", global = true)]
    vault: Option<PathBuf>,

    /// Path to configuration file (default: ./vaultmark.toml when present).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output in JSON format.
    #[arg(short, long, global = true)]
    json: bool,

    /// Enable debug logging and detailed output.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(flatten)]
    Document(DocumentCommand),
    #[command(flatten)]
    Vault(VaultCommand),
}

fn main() {
    let cli = Cli::parse();

    // --verbose enables DEBUG level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Document(cmd) => cmd.execute(cli.json, cli.verbose),
        Commands::Vault(cmd) => cmd.execute(VaultOptions {
            vault: cli.vault,
            config: cli.config.as_deref(),
            json: cli.json,
        }),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_document_command() {
        let cli = Cli::try_parse_from(["vmark", "check", "note.md", "--json"]).unwrap();
        assert!(cli.json);
        assert!(matches!(
            cli.command,
            Commands::Document(DocumentCommand::Check { file: Some(_) })
        ));
    }

    #[test]
    fn test_parse_vault_command() {
        let cli = Cli::try_parse_from([
            "vmark", "--vault", "/notes", "resolve", "Daily Log", "--from", "Home.md",
        ])
        .unwrap();
        assert_eq!(cli.vault, Some(PathBuf::from("/notes")));
        assert!(matches!(
            cli.command,
            Commands::Vault(VaultCommand::Resolve { ref target, from: Some(_) }) if target == "Daily Log"
        ));
    }

    #[test]
    fn test_parse_find_command() {
        let cli = Cli::try_parse_from(["vmark", "find", "road", "-j"]).unwrap();
        assert!(cli.json);
        assert!(matches!(
            cli.command,
            Commands::Vault(VaultCommand::Find { ref query }) if query == "road"
        ));
    }

    #[test]
    fn test_ls_defaults_to_root() {
        let cli = Cli::try_parse_from(["vmark", "ls"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Vault(VaultCommand::Ls { dir: None })
        ));
    }
}
