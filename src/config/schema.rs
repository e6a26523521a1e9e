//! Configuration schema and defaults for repair-ai.
//!
//! Defines the TOML-serializable configuration structure with the sections
//! `[api]`, `[speech]` and `[logging]`.
//!
//! Every field has a built-in default. Users only need to set the values
//! they want to override.

use serde::{Deserialize, Serialize};

/// Default backend base URL.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level repair-ai configuration.
///
/// Maps directly to the `~/.repair-ai/config.toml` and `.repair-ai.toml`
/// file schemas. All sections and fields are optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub speech: SpeechConfig,
    pub logging: LoggingConfig,
}

// ---------------------------------------------------------------------------
// [api]
// ---------------------------------------------------------------------------

/// Runtime platform the client pretends to run on.
///
/// The backend is only reachable from native builds; on `web` the ask and
/// status operations answer with canned demo content instead of calling it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Platform {
    #[default]
    Native,
    Web,
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Native => write!(f, "native"),
            Self::Web => write!(f, "web"),
        }
    }
}

/// Backend connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Backend HTTP base URL.
    pub base_url: String,
    /// Per-request timeout in milliseconds. Unset means the transport
    /// default is used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
    /// `native` or `web`.
    pub platform: Platform,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_ms: None,
            platform: Platform::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// [speech]
// ---------------------------------------------------------------------------

/// Text-to-speech settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// Whether answers may be spoken at all.
    pub enabled: bool,
    /// Speaking rate multiplier (1.0 = engine default).
    pub rate: f32,
    /// Pitch multiplier (1.0 = engine default).
    pub pitch: f32,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            rate: 0.8,
            pitch: 1.0,
        }
    }
}

// ---------------------------------------------------------------------------
// [logging]
// ---------------------------------------------------------------------------

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Whether the request log is written.
    pub enabled: bool,
    /// Path to the request log file. `~` is expanded to the home directory.
    pub path: String,
    /// Print `[repair-ai]` diagnostics to stderr.
    pub verbose: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "~/.repair-ai/request-log.jsonl".to_string(),
            verbose: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Default TOML content
// ---------------------------------------------------------------------------

impl AppConfig {
    /// Generate the annotated default TOML config file content.
    ///
    /// Used by `repair-ai config init`.
    pub fn default_toml() -> String {
        r#"# repair-ai configuration
#
# Configuration hierarchy (highest precedence wins):
#   1. Environment variables (REPAIR_AI_*)
#   2. Project config (.repair-ai.toml in current directory)
#   3. User global config (~/.repair-ai/config.toml)
#   4. Built-in defaults

[api]
base_url = "http://localhost:8000"
# timeout_ms = 10000                  # Unset: transport default
platform = "native"                   # native | web (web = demo answers, no backend)

[speech]
enabled = true
rate = 0.8
pitch = 1.0

[logging]
enabled = true
path = "~/.repair-ai/request-log.jsonl"
verbose = false                       # Set true or REPAIR_AI_VERBOSE=1 for stderr diagnostics
"#
        .to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
