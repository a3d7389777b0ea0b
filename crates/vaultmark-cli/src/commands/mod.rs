//! Subcommand implementations.

mod document;
mod vault;

use std::io::Read;
use std::path::Path;

pub(crate) use document::DocumentCommand;
pub(crate) use vault::{VaultCommand, VaultOptions};

use crate::error::CliError;

/// Read a Markdown source from `file`, or from stdin when no file is given.
fn read_input(file: Option<&Path>) -> Result<String, CliError> {
    match file {
        Some(path) => std::fs::read_to_string(path).map_err(|source| CliError::Read {
            path: path.to_path_buf(),
            source,
        }),
        None => {
            let mut input = String::new();
            std::io::stdin().read_to_string(&mut input)?;
            Ok(input)
        }
    }
}

fn print_json(value: &impl serde::Serialize) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
