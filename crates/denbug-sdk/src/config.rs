use denbug_types::Snapshot;
use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::Denbug;
use crate::error::{Error, Result};

/// Comma or whitespace separated patterns applied by [`apply_env`].
pub const ENV_PATTERNS: &str = "DENBUG";

/// Overrides the default snapshot file location.
pub const ENV_CONFIG_PATH: &str = "DENBUG_CONFIG";

const DEFAULT_FILE_NAME: &str = "snapshot.toml";

/// On-disk snapshot encoding, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Toml,
    Json,
}

impl FileFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Ok(FileFormat::Toml),
            Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(FileFormat::Json),
            _ => Err(Error::Config(format!(
                "unsupported snapshot file (expected .toml or .json): {}",
                path.display()
            ))),
        }
    }
}

/// Resolve the snapshot file path based on priority:
/// 1. Explicit path (with tilde expansion)
/// 2. DENBUG_CONFIG environment variable (with tilde expansion)
/// 3. Platform config directory (`<config_dir>/denbug/snapshot.toml`)
/// 4. ~/.denbug/snapshot.toml
pub fn resolve_config_path(explicit: Option<&str>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(expand_tilde(path));
    }

    if let Ok(env_path) = std::env::var(ENV_CONFIG_PATH) {
        return Ok(expand_tilde(&env_path));
    }

    if let Some(config_dir) = dirs::config_dir() {
        return Ok(config_dir.join("denbug").join(DEFAULT_FILE_NAME));
    }

    if let Some(home) = dirs::home_dir() {
        return Ok(home.join(".denbug").join(DEFAULT_FILE_NAME));
    }

    Err(Error::Config(
        "Could not determine snapshot path: no home or config directory found".to_string(),
    ))
}

fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(stripped);
    }
    PathBuf::from(path)
}

/// Read a snapshot file as untyped data, ready for [`Denbug::load`].
pub fn load_file(path: &Path) -> Result<Value> {
    let format = FileFormat::from_path(path)?;
    let content = std::fs::read_to_string(path)?;

    let value = match format {
        FileFormat::Toml => toml::from_str::<Value>(&content)?,
        FileFormat::Json => serde_json::from_str::<Value>(&content)?,
    };
    Ok(value)
}

/// Write `snapshot`, creating parent directories as needed.
pub fn save_file(path: &Path, snapshot: &Snapshot) -> Result<()> {
    let format = FileFormat::from_path(path)?;

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }

    let content = match format {
        FileFormat::Toml => toml::to_string_pretty(snapshot)?,
        FileFormat::Json => serde_json::to_string_pretty(snapshot)?,
    };
    std::fs::write(path, content)?;
    Ok(())
}

/// Split a pattern list on commas and whitespace.
pub fn parse_patterns(raw: &str) -> Vec<String> {
    raw.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|pattern| !pattern.is_empty())
        .map(str::to_string)
        .collect()
}

/// Apply every pattern in `raw` in order. Returns how many were given.
pub fn apply_env_value(denbug: &Denbug, raw: &str) -> usize {
    let patterns = parse_patterns(raw);
    for pattern in &patterns {
        denbug.apply_pattern(pattern);
    }
    patterns.len()
}

/// Apply the `DENBUG` environment variable, if set.
pub fn apply_env(denbug: &Denbug) -> usize {
    match std::env::var(ENV_PATTERNS) {
        Ok(raw) => {
            let applied = apply_env_value(denbug, &raw);
            tracing::debug!(applied, "applied {} patterns", ENV_PATTERNS);
            applied
        }
        Err(_) => 0,
    }
}
