//! Configuration loading from environment variables.

use crate::constants::{
    DEFAULT_AUTO_SAVE_INTERVAL_MS, DEFAULT_MAX_DOCUMENT_SIZE, DEFAULT_PORT,
    DEFAULT_STATUS_DISPLAY_MS,
};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;

/// Runtime configuration shared by the server, the CLI, and autosave options.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub db_path: String,
    pub port: u16,
    pub max_document_size: usize,
    /// Debounce interval in milliseconds.
    pub auto_save_interval: u64,
    pub auto_save_enabled: bool,
    /// Blank drafts never overwrite stored content when set.
    pub skip_empty_drafts: bool,
    pub status_display_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

/// Parse a boolean-like environment flag value.
///
/// # Supported Values
/// - Truthy: `1`, `true`, `yes`, `on`
/// - Falsy: `0`, `false`, `no`, `off`, empty string
///
/// Matching is case-insensitive and ignores surrounding whitespace.
///
/// # Returns
/// `Some(bool)` when the value is recognized, otherwise `None`.
pub fn parse_env_flag(value: &str) -> Option<bool> {
    let normalized = value.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "" | "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Read a boolean flag from the environment.
///
/// Missing or unrecognized values are treated as `false`.
pub fn env_flag_enabled(name: &str) -> bool {
    flag_or(|key| env::var(key).ok(), name, false)
}

fn flag_or<F>(lookup: F, name: &str, default: bool) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .and_then(|value| parse_env_flag(&value))
        .unwrap_or(default)
}

fn parsed_or<T, F>(lookup: &F, name: &str, default: T) -> T
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .and_then(|raw| raw.trim().parse().ok())
        .unwrap_or(default)
}

fn resolve_home_dir<F>(lookup: &F) -> Option<PathBuf>
where
    F: Fn(&str) -> Option<String>,
{
    ["HOME", "USERPROFILE"]
        .into_iter()
        .filter_map(|key| lookup(key))
        .find(|value| !value.trim().is_empty())
        .map(PathBuf::from)
        .or_else(|| env::current_dir().ok())
}

fn expand_tilde<F>(path: String, lookup: &F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = resolve_home_dir(lookup) {
            return home.join(rest).to_string_lossy().to_string();
        }
    }
    path
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Returns
    /// A populated [`Config`] with defaults applied when env vars are missing.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    ///
    /// Recognized keys: `DB_PATH`, `PORT`, `MAX_DOCUMENT_SIZE`,
    /// `AUTO_SAVE_INTERVAL`, `AUTO_SAVE`, `SKIP_EMPTY_DRAFTS`, `STATUS_DISPLAY_MS`.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let db_path = lookup("DB_PATH")
            .filter(|path| !path.trim().is_empty())
            .map(|path| expand_tilde(path, &lookup))
            .unwrap_or_else(|| {
                let home = resolve_home_dir(&lookup).unwrap_or_else(|| PathBuf::from("."));
                home.join(".cache")
                    .join("draftkeeper")
                    .join("db")
                    .to_string_lossy()
                    .to_string()
            });

        Self {
            db_path,
            port: parsed_or(&lookup, "PORT", DEFAULT_PORT),
            max_document_size: parsed_or(&lookup, "MAX_DOCUMENT_SIZE", DEFAULT_MAX_DOCUMENT_SIZE),
            auto_save_interval: parsed_or(
                &lookup,
                "AUTO_SAVE_INTERVAL",
                DEFAULT_AUTO_SAVE_INTERVAL_MS,
            ),
            auto_save_enabled: flag_or(&lookup, "AUTO_SAVE", true),
            skip_empty_drafts: flag_or(&lookup, "SKIP_EMPTY_DRAFTS", true),
            status_display_ms: parsed_or(&lookup, "STATUS_DISPLAY_MS", DEFAULT_STATUS_DISPLAY_MS),
        }
    }
}
