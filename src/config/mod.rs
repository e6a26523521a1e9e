//! Configuration system for repair-ai.
//!
//! Provides a layered configuration hierarchy:
//!
//! 1. **Built-in defaults**: hardcoded in [`schema::AppConfig::default()`]
//! 2. **User global config**: `~/.repair-ai/config.toml`
//! 3. **Project local config**: `.repair-ai.toml` in the current directory
//! 4. **Environment variables**: `REPAIR_AI_*` overrides (highest precedence)
//!
//! Malformed files are ignored so a broken config never keeps the client
//! from answering.
//!
//! # Usage
//!
//! ```rust,ignore
//! use repair_ai::config;
//!
//! let cfg = config::load();
//! let client = repair_ai::api::ApiClient::from_config(&cfg.api);
//! ```

pub mod schema;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

pub use schema::{AppConfig, Platform};

/// Directory holding config, persisted state and logs.
const APP_DIR: &str = ".repair-ai";

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load the fully resolved configuration.
///
/// Merges all layers in order: defaults → global TOML → project TOML → env
/// vars.
pub fn load() -> AppConfig {
    load_from(global_config_path(), project_config_path())
}

/// Layer the given global and project files over the defaults, then apply
/// env vars.
pub fn load_from(global: Option<PathBuf>, project: Option<PathBuf>) -> AppConfig {
    let mut config = AppConfig::default();

    if let Some(global) = load_toml_file(global) {
        config = global;
    }

    if let Some(project) = load_toml_file(project) {
        config = project;
    }

    apply_env_overrides(&mut config);

    config
}

/// Load a TOML config file from the given path (if it exists).
///
/// Each file is deserialized with `serde(default)`, so fields a file does not
/// set come back as built-in defaults and the later file replaces the earlier
/// one wholesale.
fn load_toml_file(path: Option<PathBuf>) -> Option<AppConfig> {
    let path = path?;
    let content = fs::read_to_string(&path).ok()?;
    toml::from_str(&content).ok()
}

// ---------------------------------------------------------------------------
// File paths
// ---------------------------------------------------------------------------

/// `~/.repair-ai`, or `None` when the home directory is unknown.
pub fn app_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(APP_DIR))
}

fn global_config_path() -> Option<PathBuf> {
    app_dir().map(|dir| dir.join("config.toml"))
}

fn project_config_path() -> Option<PathBuf> {
    std::env::current_dir()
        .ok()
        .map(|cwd| cwd.join(".repair-ai.toml"))
}

/// Return the path to the global config file for display/init purposes.
pub fn global_config_file() -> Option<PathBuf> {
    global_config_path()
}

/// Return the path to the project config file for display purposes.
pub fn project_config_file() -> Option<PathBuf> {
    project_config_path()
}

/// Expand a leading `~/` to the home directory.
pub fn expand_home(path: &str) -> Option<PathBuf> {
    match path.strip_prefix("~/") {
        Some(rest) => dirs::home_dir().map(|home| home.join(rest)),
        None => Some(PathBuf::from(path)),
    }
}

// ---------------------------------------------------------------------------
// Environment variable overrides
// ---------------------------------------------------------------------------

/// Apply environment variable overrides (highest precedence layer).
///
/// Supported variables:
/// - `REPAIR_AI_URL`: backend base URL
/// - `REPAIR_AI_TIMEOUT_MS`: request timeout
/// - `REPAIR_AI_PLATFORM`: `native` or `web`
/// - `REPAIR_AI_SPEECH`: speech enabled (`1`/`true`/`yes`/`on`)
/// - `REPAIR_AI_LOG`: request log enabled
/// - `REPAIR_AI_VERBOSE`: stderr diagnostics
fn apply_env_overrides(config: &mut AppConfig) {
    if let Ok(val) = std::env::var("REPAIR_AI_URL")
        && !val.is_empty()
    {
        config.api.base_url = val;
    }
    if let Ok(val) = std::env::var("REPAIR_AI_TIMEOUT_MS")
        && let Ok(ms) = val.parse::<u64>()
    {
        config.api.timeout_ms = Some(ms);
    }
    if let Ok(val) = std::env::var("REPAIR_AI_PLATFORM")
        && let Some(platform) = parse_platform(&val)
    {
        config.api.platform = platform;
    }
    if let Ok(val) = std::env::var("REPAIR_AI_SPEECH") {
        config.speech.enabled = is_truthy(&val);
    }
    if let Ok(val) = std::env::var("REPAIR_AI_LOG") {
        config.logging.enabled = is_truthy(&val);
    }
    if let Ok(val) = std::env::var("REPAIR_AI_VERBOSE") {
        config.logging.verbose = is_truthy(&val);
    }
}

/// Check if a string value represents a truthy boolean.
fn is_truthy(val: &str) -> bool {
    matches!(
        val.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Parse a platform string.
pub fn parse_platform(val: &str) -> Option<Platform> {
    match val.to_ascii_lowercase().as_str() {
        "native" | "ios" | "android" => Some(Platform::Native),
        "web" | "browser" => Some(Platform::Web),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Config init / set / reset
// ---------------------------------------------------------------------------

/// Write the default annotated config to `~/.repair-ai/config.toml`.
///
/// Returns an error if the file already exists and `force` is false.
pub fn init_config(force: bool) -> Result<PathBuf> {
    let path = global_config_path().context("could not determine home directory")?;

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create ~/.repair-ai/ directory")?;
    }

    fs::write(&path, AppConfig::default_toml()).context("failed to write config file")?;

    Ok(path)
}

/// Set a single config key to a value in the global config file.
///
/// Supports dotted keys like `api.platform`. The updated document must still
/// deserialize as an [`AppConfig`], otherwise nothing is written.
pub fn set_config_value(key: &str, value: &str) -> Result<()> {
    let path = global_config_path().context("could not determine home directory")?;

    let content = if path.exists() {
        fs::read_to_string(&path).context("failed to read config file")?
    } else {
        toml::to_string_pretty(&AppConfig::default())
            .context("failed to serialize default config")?
    };

    let mut root: toml::Value =
        toml::from_str(&content).context("failed to parse config as TOML value")?;
    set_toml_value(&mut root, key, value)?;

    let output = toml::to_string_pretty(&root).context("failed to serialize updated config")?;
    let _: AppConfig = toml::from_str(&output)
        .with_context(|| format!("invalid value '{value}' for '{key}'"))?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create config directory")?;
    }
    fs::write(&path, output).context("failed to write config file")?;

    Ok(())
}

/// Set a value in a TOML value tree using a dotted key path.
///
/// The existing value's type decides how `raw_value` is parsed. Keys that
/// are absent (such as an unset `api.timeout_ms`) are stored as integers when
/// they parse as one, otherwise as strings.
fn set_toml_value(root: &mut toml::Value, key: &str, raw_value: &str) -> Result<()> {
    let parts: Vec<&str> = key.split('.').collect();
    if parts.len() < 2 || parts.iter().any(|p| p.is_empty()) {
        anyhow::bail!("config key must look like 'section.field', got '{key}'");
    }

    let mut current = root;
    for &part in &parts[..parts.len() - 1] {
        current = current
            .get_mut(part)
            .with_context(|| format!("config key not found: section '{part}' in '{key}'"))?;
    }

    let leaf = parts[parts.len() - 1];
    let table = current.as_table_mut().with_context(|| {
        format!(
            "expected table at '{}'",
            key.rsplit_once('.').map(|(s, _)| s).unwrap_or("")
        )
    })?;

    let new_value = match table.get(leaf) {
        Some(toml::Value::Boolean(_)) => toml::Value::Boolean(is_truthy(raw_value)),
        Some(toml::Value::Integer(_)) => {
            let n: i64 = raw_value
                .parse()
                .with_context(|| format!("expected integer for '{key}', got '{raw_value}'"))?;
            toml::Value::Integer(n)
        }
        Some(toml::Value::Float(_)) => {
            let f: f64 = raw_value
                .parse()
                .with_context(|| format!("expected float for '{key}', got '{raw_value}'"))?;
            toml::Value::Float(f)
        }
        Some(_) => toml::Value::String(raw_value.to_string()),
        None => match raw_value.parse::<i64>() {
            Ok(n) => toml::Value::Integer(n),
            Err(_) => toml::Value::String(raw_value.to_string()),
        },
    };

    table.insert(leaf.to_string(), new_value);
    Ok(())
}

/// Reset the global config to defaults (overwrite the file).
pub fn reset_config() -> Result<PathBuf> {
    init_config(true)
}

/// Show the effective (fully resolved) config as TOML.
pub fn show_effective_config() -> Result<String> {
    let config = load();
    toml::to_string_pretty(&config).context("failed to serialize effective config")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
