// Configuration loading and parsing (config/pelada.toml).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use crate::draw::partition::{
    BalanceMode, DrawRules, DEFAULT_MAX_TEAMS, DEFAULT_MIN_PLAYERS_PER_TEAM, DEFAULT_MIN_TEAMS,
    DEFAULT_PLAYERS_PER_TEAM_HINT, DEFAULT_TEAM_PREFIX,
};
use crate::draw::share::{ShareFormat, DEFAULT_SIGNATURE};

/// Shipped defaults, written to `config/pelada.toml` when it is missing.
pub const DEFAULT_CONFIG: &str = include_str!("../defaults/pelada.toml");

pub const CONFIG_DIR: &str = "config";
pub const CONFIG_FILE: &str = "pelada.toml";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub draw: DrawRules,
    pub share: ShareConfig,
}

impl Config {
    /// Share text format with the configured title and signature.
    pub fn share_format(&self) -> ShareFormat {
        ShareFormat {
            title: self.share.title.clone(),
            signature: self.share.signature.clone(),
            date: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ShareConfig {
    pub title: Option<String>,
    pub signature: String,
}

impl Default for ShareConfig {
    fn default() -> Self {
        ShareConfig {
            title: None,
            signature: DEFAULT_SIGNATURE.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// pelada.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire pelada.toml file. Every
/// section and key is optional and falls back to the built-in default.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    draw: DrawSection,
    share: ShareConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct DrawSection {
    min_teams: usize,
    max_teams: usize,
    min_players_per_team: usize,
    players_per_team_hint: usize,
    team_prefix: String,
    balance_mode: BalanceMode,
}

impl Default for DrawSection {
    fn default() -> Self {
        DrawSection {
            min_teams: DEFAULT_MIN_TEAMS,
            max_teams: DEFAULT_MAX_TEAMS,
            min_players_per_team: DEFAULT_MIN_PLAYERS_PER_TEAM,
            players_per_team_hint: DEFAULT_PLAYERS_PER_TEAM_HINT,
            team_prefix: DEFAULT_TEAM_PREFIX.to_string(),
            balance_mode: BalanceMode::default(),
        }
    }
}

impl From<DrawSection> for DrawRules {
    fn from(s: DrawSection) -> Self {
        DrawRules {
            min_teams: s.min_teams,
            max_teams: s.max_teams,
            min_players_per_team: s.min_players_per_team,
            players_per_team_hint: s.players_per_team_hint,
            team_prefix: s.team_prefix,
            balance_mode: s.balance_mode,
        }
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Parse and validate config text. `path` is only used for error messages.
pub fn parse_config(text: &str, path: &Path) -> Result<Config, ConfigError> {
    let file: ConfigFile = toml::from_str(text).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })?;

    let config = Config {
        draw: file.draw.into(),
        share: file.share,
    };

    validate(&config)?;

    Ok(config)
}

/// Load and validate a specific config file.
pub fn load_config_file(path: &Path) -> Result<Config, ConfigError> {
    let text = read_file(path)?;
    parse_config(&text, path)
}

/// Load and validate `config/pelada.toml` relative to `base_dir`.
/// Does not write defaults; pair with [`ensure_config_file`] for first-run
/// setup.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    load_config_file(&base_dir.join(CONFIG_DIR).join(CONFIG_FILE))
}

/// Write the shipped defaults to `config/pelada.toml` if it does not exist.
/// Returns the path written, or None when a config was already present.
pub fn ensure_config_file(base_dir: &Path) -> Result<Option<PathBuf>, ConfigError> {
    let config_dir = base_dir.join(CONFIG_DIR);
    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to create config directory: {e}"),
    })?;

    let target = config_dir.join(CONFIG_FILE);
    match std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&target)
    {
        Ok(mut dest) => {
            std::io::Write::write_all(&mut dest, DEFAULT_CONFIG.as_bytes()).map_err(|e| {
                ConfigError::DefaultsCopyError {
                    message: format!("failed to write {}: {e}", target.display()),
                }
            })?;
            info!("Wrote default config to {}", target.display());
            Ok(Some(target))
        }
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => Ok(None),
        Err(e) => Err(ConfigError::DefaultsCopyError {
            message: format!("failed to create {}: {e}", target.display()),
        }),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    let draw = &config.draw;

    let positive_fields: &[(&str, usize)] = &[
        ("draw.min_teams", draw.min_teams),
        ("draw.min_players_per_team", draw.min_players_per_team),
        ("draw.players_per_team_hint", draw.players_per_team_hint),
    ];
    for (name, val) in positive_fields {
        if *val == 0 {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: "must be greater than 0".into(),
            });
        }
    }

    if draw.max_teams < draw.min_teams {
        return Err(ConfigError::ValidationError {
            field: "draw.max_teams".into(),
            message: format!(
                "must be >= draw.min_teams ({}), got {}",
                draw.min_teams, draw.max_teams
            ),
        });
    }

    if config.share.signature.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "share.signature".into(),
            message: "must not be empty".into(),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
