//! Export Module
//!
//! Writes the collection, the leaderboard and token owner lists to CSV or
//! JSON. Files default to `<data dir>/exports/<kind>-<timestamp>.<ext>`.

mod csv_export;
mod json_export;

use std::fs;
use std::path::{Path, PathBuf};

use alloy_primitives::Address;
use anyhow::{Context, Result};
use chrono::Local;

use crate::config;
use crate::domain::models::{HolderSummary, TokenItem, TokenOwner};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

/// Get the export directory path, creating it if needed
pub fn export_dir() -> Result<PathBuf> {
    let dir = config::data_dir()
        .map(|dir| dir.join("exports"))
        .unwrap_or_else(|| PathBuf::from(".mintscope").join("exports"));
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

/// Generate a timestamped filename
pub fn generate_filename(prefix: &str, format: ExportFormat) -> String {
    let timestamp = Local::now().format("%Y-%m-%d-%H%M%S");
    format!("{}-{}.{}", prefix, timestamp, format.extension())
}

/// `out` when given, otherwise a fresh file in the export directory
pub fn resolve_path(out: Option<&Path>, prefix: &str, format: ExportFormat) -> Result<PathBuf> {
    match out {
        Some(path) => Ok(path.to_path_buf()),
        None => Ok(export_dir()?.join(generate_filename(prefix, format))),
    }
}

pub fn write_holders(path: &Path, format: ExportFormat, holders: &[&HolderSummary]) -> Result<usize> {
    match format {
        ExportFormat::Csv => csv_export::write_holders(path, holders),
        ExportFormat::Json => json_export::write_holders(path, holders),
    }
    .with_context(|| format!("export holders to {}", path.display()))
}

pub fn write_tokens(
    path: &Path,
    format: ExportFormat,
    contract: &Address,
    tokens: &[&TokenItem],
) -> Result<usize> {
    match format {
        ExportFormat::Csv => csv_export::write_tokens(path, contract, tokens),
        ExportFormat::Json => json_export::write_tokens(path, contract, tokens),
    }
    .with_context(|| format!("export tokens to {}", path.display()))
}

pub fn write_owners(path: &Path, format: ExportFormat, owners: &[&TokenOwner]) -> Result<usize> {
    match format {
        ExportFormat::Csv => csv_export::write_owners(path, owners),
        ExportFormat::Json => json_export::write_owners(path, owners),
    }
    .with_context(|| format!("export owners to {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_filename() {
        let name = generate_filename("holders", ExportFormat::Csv);
        assert!(name.starts_with("holders-"));
        assert!(name.ends_with(".csv"));
    }

    #[test]
    fn test_resolve_explicit_path() {
        let path = resolve_path(Some(Path::new("/tmp/x.json")), "tokens", ExportFormat::Json).unwrap();
        assert_eq!(path, PathBuf::from("/tmp/x.json"));
    }
}
