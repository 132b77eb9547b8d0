//! Configuration file management for tabi.
//!
//! Provides a TOML-based config file at `~/.config/tabi/config.toml` and a
//! resolution chain: CLI flag > env var > config file > default.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use tabi_core::planner::HttpPlannerConfig;
use tabi_core::resolve::TitleResolver;

pub const PLANNER_URL_ENV: &str = "TABI_PLANNER_URL";
pub const SESSION_ENV: &str = "TABI_SESSION";

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub planner: PlannerSection,
    #[serde(default)]
    pub session: SessionSection,
    #[serde(default)]
    pub matching: MatchingSection,
    #[serde(default)]
    pub snapshot: SnapshotSection,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PlannerSection {
    #[serde(default = "default_planner_url")]
    pub url: String,
    /// Whole-request timeout in seconds. Unset waits indefinitely.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

fn default_planner_url() -> String {
    HttpPlannerConfig::DEFAULT_URL.to_string()
}

impl Default for PlannerSection {
    fn default() -> Self {
        Self {
            url: default_planner_url(),
            timeout_secs: None,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct SessionSection {
    /// Session JSON file. Defaults to `session.json` next to the config.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MatchingSection {
    /// Fall back to substring title matching when nothing matches exactly.
    #[serde(default = "enabled")]
    pub substring_fallback: bool,
}

fn enabled() -> bool {
    true
}

impl Default for MatchingSection {
    fn default() -> Self {
        Self {
            substring_fallback: true,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct SnapshotSection {
    /// Send the bookmark tree to the planner along with the tabs.
    #[serde(default)]
    pub include_bookmarks: bool,
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the tabi config directory.
///
/// Always uses XDG layout: `$XDG_CONFIG_HOME/tabi` or `~/.config/tabi`.
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("tabi");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("tabi")
}

/// Return the path to the tabi config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Session file used when nothing else names one.
pub fn default_session_path() -> PathBuf {
    config_dir().join("session.json")
}

// -----------------------------------------------------------------------
// Read / write
// -----------------------------------------------------------------------

/// Load and parse a config file.
pub fn load_config_from(path: &Path) -> Result<ConfigFile> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&contents)
        .with_context(|| format!("failed to parse config file at {}", path.display()))?;
    Ok(config)
}

/// Load the config file if there is one. A file that exists but does not
/// parse is an error.
pub fn load_config() -> Result<Option<ConfigFile>> {
    let path = config_path();
    if !path.exists() {
        return Ok(None);
    }
    load_config_from(&path).map(Some)
}

/// Serialize and write the config file, creating parent dirs as needed.
/// Sets file permissions to 0600 on Unix.
pub fn save_config(config: &ConfigFile) -> Result<()> {
    let path = config_path();
    let dir = config_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create config directory {}", dir.display()))?;

    let contents = toml::to_string_pretty(config).context("failed to serialize config")?;
    std::fs::write(&path, &contents)
        .with_context(|| format!("failed to write config file at {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(&path, perms)
            .with_context(|| format!("failed to set permissions on {}", path.display()))?;
    }

    Ok(())
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

/// Fully resolved configuration, ready for use.
#[derive(Debug)]
pub struct TabiConfig {
    pub planner: HttpPlannerConfig,
    pub session_path: PathBuf,
    pub resolver: TitleResolver,
    pub include_bookmarks: bool,
}

impl TabiConfig {
    /// Resolve configuration using the chain: CLI flag > env var > config file > default.
    ///
    /// - Planner URL: `cli_planner_url` > `TABI_PLANNER_URL` > `planner.url` > `HttpPlannerConfig::DEFAULT_URL`
    /// - Session file: `cli_session` > `TABI_SESSION` > `session.path` > [`default_session_path`]
    pub fn resolve(cli_planner_url: Option<&str>, cli_session: Option<&Path>) -> Result<Self> {
        let file_config = load_config()?.unwrap_or_default();

        let planner_url = if let Some(url) = cli_planner_url {
            url.to_string()
        } else if let Ok(url) = std::env::var(PLANNER_URL_ENV) {
            url
        } else {
            file_config.planner.url.clone()
        };
        let planner = HttpPlannerConfig {
            base_url: planner_url,
            timeout: file_config.planner.timeout_secs.map(Duration::from_secs),
        };

        let session_path = if let Some(path) = cli_session {
            path.to_path_buf()
        } else if let Ok(path) = std::env::var(SESSION_ENV) {
            PathBuf::from(path)
        } else if let Some(path) = file_config.session.path {
            path
        } else {
            default_session_path()
        };

        Ok(Self {
            planner,
            session_path,
            resolver: TitleResolver::new(file_config.matching.substring_fallback),
            include_bookmarks: file_config.snapshot.include_bookmarks,
        })
    }
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------
