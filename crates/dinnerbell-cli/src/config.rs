//! Configuration file management for dinnerbell.
//!
//! Provides a TOML-based config file at `~/.config/dinnerbell/config.toml`
//! and a resolution chain: CLI flag > env var > config file > default.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use dinnerbell_core::grocery::InstacartConfig;
use dinnerbell_core::oracle::AnthropicConfig;
use dinnerbell_core::recipes::MealieConfig;
use dinnerbell_db::config::DbConfig;

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub database: DatabaseSection,
    #[serde(default)]
    pub mealie: MealieSection,
    #[serde(default)]
    pub anthropic: AnthropicSection,
    #[serde(default)]
    pub instacart: InstacartSection,
}

#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseSection {
    pub url: String,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        Self {
            url: DbConfig::DEFAULT_URL.to_owned(),
        }
    }
}

#[derive(Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealieSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// API token from the Mealie user profile.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

#[derive(Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnthropicSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstacartSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retailer_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the dinnerbell config directory.
///
/// Always uses XDG layout: `$XDG_CONFIG_HOME/dinnerbell` or
/// `~/.config/dinnerbell`, never the macOS `Application Support` path.
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("dinnerbell");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("dinnerbell")
}

/// Return the path to the dinnerbell config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

// -----------------------------------------------------------------------
// Read / write
// -----------------------------------------------------------------------

/// Load and parse the config file at `path`.
pub fn load_config_from(path: &Path) -> Result<ConfigFile> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    toml::from_str(&contents).context("failed to parse config file")
}

/// Load the config file from its default location.
pub fn load_config() -> Result<ConfigFile> {
    load_config_from(&config_path())
}

/// Serialize and write `config` to `path`, creating parent dirs as needed.
/// Sets file permissions to 0600 on Unix; the file holds API credentials.
pub fn save_config_to(path: &Path, config: &ConfigFile) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create config directory {}", dir.display()))?;
    }

    let contents = toml::to_string_pretty(config).context("failed to serialize config")?;
    std::fs::write(path, &contents)
        .with_context(|| format!("failed to write config file at {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(path, perms)
            .with_context(|| format!("failed to set permissions on {}", path.display()))?;
    }

    Ok(())
}

pub fn save_config(config: &ConfigFile) -> Result<()> {
    save_config_to(&config_path(), config)
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

/// Env var > config file value. Empty env vars count as unset.
fn pick(env_var: &str, file_value: Option<&String>) -> Option<String> {
    std::env::var(env_var)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .or_else(|| file_value.cloned())
}

/// Fully resolved configuration, ready for use.
///
/// A service section is `None` when its credentials are missing; commands
/// that never call that service still run.
#[derive(Debug)]
pub struct DinnerbellConfig {
    pub db_config: DbConfig,
    pub mealie: Option<MealieConfig>,
    pub anthropic: Option<AnthropicConfig>,
    pub instacart: Option<InstacartConfig>,
}

impl DinnerbellConfig {
    /// Resolve against the config file in its default location, if any.
    pub fn resolve(cli_db_url: Option<&str>) -> Result<Self> {
        let file_config = load_config().ok();
        Self::resolve_from(cli_db_url, file_config.as_ref())
    }

    /// Resolve using the chain: CLI flag > env var > config file > default.
    ///
    /// - DB URL: `cli_db_url` > `DINNERBELL_DATABASE_URL` > `[database].url` > `DbConfig::DEFAULT_URL`
    /// - Mealie: `MEALIE_URL` / `MEALIE_TOKEN` > `[mealie]`; URL defaults to `MealieConfig::DEFAULT_URL`
    /// - Anthropic: `ANTHROPIC_API_KEY` / `ANTHROPIC_MODEL` > `[anthropic]`
    /// - Instacart: `INSTACART_*` > `[instacart]`; all of token, retailer and store are required
    pub fn resolve_from(cli_db_url: Option<&str>, file_config: Option<&ConfigFile>) -> Result<Self> {
        let defaults = ConfigFile::default();
        let file = file_config.unwrap_or(&defaults);

        let db_config = DbConfig::resolve(cli_db_url, Some(&file.database.url));

        let mealie = pick("MEALIE_TOKEN", file.mealie.token.as_ref()).map(|token| MealieConfig {
            base_url: pick("MEALIE_URL", file.mealie.url.as_ref())
                .unwrap_or_else(|| MealieConfig::DEFAULT_URL.to_owned()),
            token,
        });

        let anthropic = match pick("ANTHROPIC_API_KEY", file.anthropic.api_key.as_ref()) {
            Some(key) => {
                let mut cfg = AnthropicConfig::new(key);
                if let Some(model) = pick("ANTHROPIC_MODEL", file.anthropic.model.as_ref()) {
                    cfg.model = model;
                }
                if let Some(max_tokens) = file.anthropic.max_tokens {
                    cfg.max_tokens = max_tokens;
                }
                Some(cfg)
            }
            None => None,
        };

        let instacart = match (
            pick("INSTACART_ACCESS_TOKEN", file.instacart.access_token.as_ref()),
            pick("INSTACART_RETAILER_ID", file.instacart.retailer_id.as_ref()),
            pick("INSTACART_STORE_ID", file.instacart.store_id.as_ref()),
        ) {
            (Some(access_token), Some(retailer_id), Some(store_id)) => Some(InstacartConfig {
                access_token,
                retailer_id,
                store_id,
                base_url: pick("INSTACART_BASE_URL", file.instacart.base_url.as_ref())
                    .unwrap_or_else(|| InstacartConfig::DEFAULT_BASE_URL.to_owned()),
            }),
            _ => None,
        };

        Ok(Self {
            db_config,
            mealie,
            anthropic,
            instacart,
        })
    }
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------
