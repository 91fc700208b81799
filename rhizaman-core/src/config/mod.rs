pub mod theme;

use crate::{
    constants::APP_NAME,
    discover::discover_repositories,
    git::Repository,
    paths::{expand_tilde, resolve_path},
};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

pub use theme::{NamedColor, ThemeColor, ThemeConfig};

fn config_dir() -> PathBuf {
    // Use ~/.config on both Linux and macOS (not ~/Library/Application Support)
    #[cfg(unix)]
    {
        if let Ok(xdg_config_home) = std::env::var("XDG_CONFIG_HOME")
            && !xdg_config_home.is_empty()
        {
            return PathBuf::from(xdg_config_home).join(APP_NAME);
        }
        dirs::home_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join(".config")
            .join(APP_NAME)
    }
    #[cfg(windows)]
    {
        dirs::config_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join(APP_NAME)
    }
}

pub fn config_file() -> PathBuf {
    config_dir().join("config.toml")
}

pub const DEFAULT_SEARCH_DEPTH: u16 = 1;
pub const DEFAULT_SETTLE_DELAY_MS: u64 = 500;
pub const DEFAULT_MESSAGE_TIMEOUT_MS: u64 = 2000;
pub const DEFAULT_BRANCH_PREFIX: &str = "rhiza-sync";
pub const DEFAULT_SYNC_TOOL: &str = "rhiza";
pub const DEFAULT_TOOL_WRAPPER: &str = "uvx";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Json,
}

impl ConfigFormat {
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Toml,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct RepositoryEntry {
    /// Display name; defaults to the directory name when empty.
    #[serde(default)]
    pub name: String,
    /// Working tree path. Supports `~`; relative paths resolve against the
    /// current directory.
    pub path: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(untagged)]
pub enum SearchDirEntry {
    Simple(String),
    Rich { path: String, depth: Option<u16> },
}

#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Repositories shown on the dashboard, in display order. For example:
    /// ```toml
    /// [[repositories]]
    /// name = "api"
    /// path = "~/dev/api"
    /// ```
    #[serde(default)]
    pub repositories: Vec<RepositoryEntry>,

    /// Directories scanned for additional repositories, appended after the
    /// explicit list:
    /// ```toml
    /// search_dirs = ["~/dev", { path = "~/work", depth = 2 }]
    /// ```
    #[serde(default)]
    pub search_dirs: Vec<SearchDirEntry>,

    /// Template sync workflow settings.
    #[serde(default)]
    pub sync: SyncConfig,

    /// Color theme configuration.
    #[serde(default)]
    pub theme: ThemeConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields, default)]
pub struct SyncConfig {
    /// Pause between the sync tool exiting and inspecting `git status`.
    pub settle_delay_ms: u64,
    /// Prefix of branches created for pull requests; a timestamp is appended.
    pub branch_prefix: String,
    /// Sync tool looked up on `PATH`.
    pub tool: String,
    /// Runner used as `<wrapper> <tool>` when the tool itself is not installed.
    pub tool_wrapper: String,
    /// How long success messages stay visible.
    pub message_timeout_ms: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: DEFAULT_SETTLE_DELAY_MS,
            branch_prefix: DEFAULT_BRANCH_PREFIX.to_string(),
            tool: DEFAULT_SYNC_TOOL.to_string(),
            tool_wrapper: DEFAULT_TOOL_WRAPPER.to_string(),
            message_timeout_ms: DEFAULT_MESSAGE_TIMEOUT_MS,
        }
    }
}

impl SyncConfig {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn message_timeout(&self) -> Duration {
        Duration::from_millis(self.message_timeout_ms)
    }
}

impl Config {
    pub fn resolved_search_dirs(&self) -> Vec<(PathBuf, u16)> {
        self.search_dirs
            .iter()
            .filter_map(|entry| {
                let (path_str, depth) = match entry {
                    SearchDirEntry::Simple(path) => (path.as_str(), DEFAULT_SEARCH_DEPTH),
                    SearchDirEntry::Rich { path, depth } => {
                        (path.as_str(), depth.unwrap_or(DEFAULT_SEARCH_DEPTH))
                    }
                };
                let resolved = expand_tilde(path_str)?;
                resolved.is_dir().then_some((resolved, depth))
            })
            .collect()
    }

    /// Explicit repositories followed by discovered ones, with relative paths
    /// anchored at `base`. An empty result is an error.
    pub fn resolved_repositories(&self, base: &Path) -> Result<Vec<Repository>> {
        let mut repos = Vec::with_capacity(self.repositories.len());
        for entry in &self.repositories {
            let path = resolve_path(&entry.path, base).with_context(|| {
                format!("failed to resolve path for {}: no home directory", entry.path)
            })?;
            let name = if entry.name.trim().is_empty() {
                path.file_name()
                    .map_or_else(|| entry.path.clone(), |n| n.to_string_lossy().to_string())
            } else {
                entry.name.clone()
            };
            repos.push(Repository { name, path });
        }

        let mut known: HashSet<PathBuf> = repos.iter().map(|r| r.path.clone()).collect();
        for repo in discover_repositories(&self.resolved_search_dirs()) {
            if known.insert(repo.path.clone()) {
                repos.push(repo);
            }
        }

        if repos.is_empty() {
            anyhow::bail!("No repositories configured");
        }
        Ok(repos)
    }
}

pub fn load_config_from_str(s: &str, format: ConfigFormat) -> Result<Config> {
    let config: Config = match format {
        ConfigFormat::Toml => toml::from_str(s)?,
        ConfigFormat::Json => serde_json::from_str(s)?,
    };
    Ok(config)
}

pub fn load_config(config_override: Option<&Path>) -> Result<Config> {
    let config_file = match config_override {
        Some(path) => path.to_path_buf(),
        None => config_file(),
    };
    if !config_file.exists() {
        anyhow::bail!("Config file not found at {}", config_file.display());
    }
    let contents = fs::read_to_string(&config_file)
        .with_context(|| format!("failed to read config file {}", config_file.display()))?;
    load_config_from_str(&contents, ConfigFormat::for_path(&config_file))
        .with_context(|| format!("failed to parse config file {}", config_file.display()))
}
