//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.prompts/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::conversation::ChatSequences;
use crate::core::history::DEFAULT_HISTORY_LIMIT;
use crate::inference::CompletionParameters;
use crate::inference::providers::lmstudio::DEFAULT_LMSTUDIO_BASE_URL;
use crate::inference::providers::openai::DEFAULT_OPENAI_BASE_URL;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct PromptsConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub parameters: ParametersConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub openai: OpenAiConfig,
    #[serde(default)]
    pub lmstudio: LmStudioConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    pub default_provider: Option<String>,
    pub default_model: Option<String>,
    pub prompt: Option<String>,
    pub prompt_file: Option<String>,
    pub history_limit: Option<usize>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ParametersConfig {
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
    pub frequency_penalty: Option<f32>,
    pub presence_penalty: Option<f32>,
    pub stop: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ChatConfig {
    pub restart_sequence: Option<String>,
    pub start_sequence: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct OpenAiConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct LmStudioConfig {
    pub base_url: Option<String>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_PROVIDER: &str = "openai";

const DEFAULT_PROMPT: &str = "The following is a conversation with an AI assistant. \
    The assistant is helpful, creative, clever, and very friendly.\n\
    \n\
    Person: Hello, who are you?\n\
    AI: I am an AI assistant. How can I help you today?";

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Clone)]
pub struct ResolvedConfig {
    pub provider: String,
    pub prompt: String,
    pub parameters: CompletionParameters,
    pub sequences: ChatSequences,
    pub history_limit: usize,
    pub api_key: Option<String>,
    pub openai_base_url: String,
    pub lmstudio_base_url: String,
}

impl fmt::Debug for ResolvedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedConfig")
            .field("provider", &self.provider)
            .field("prompt_len", &self.prompt.len())
            .field("parameters", &self.parameters)
            .field("sequences", &self.sequences)
            .field("history_limit", &self.history_limit)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("openai_base_url", &self.openai_base_url)
            .field("lmstudio_base_url", &self.lmstudio_base_url)
            .finish()
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns the `~/.prompts` directory.
pub fn config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".prompts"))
}

/// Returns the path to `~/.prompts/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Load config from `path`, or from `~/.prompts/config.toml` when `path` is None.
///
/// If the default file doesn't exist, generates a commented-out default and
/// returns `PromptsConfig::default()`. An explicit path that doesn't exist is
/// an I/O error. A malformed file returns `ConfigError::Parse`.
pub fn load_config(path: Option<&Path>) -> Result<PromptsConfig, ConfigError> {
    if let Some(explicit) = path {
        return read_config(explicit);
    }

    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(PromptsConfig::default());
        }
    };

    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(&path);
        return Ok(PromptsConfig::default());
    }

    read_config(&path)
}

fn read_config(path: &Path) -> Result<PromptsConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config = parse_config(&contents)?;
    info!("Loaded config from {}", path.display());
    Ok(config)
}

/// Parses config TOML. Split out so tests don't touch the filesystem.
pub fn parse_config(contents: &str) -> Result<PromptsConfig, ConfigError> {
    let config: PromptsConfig = toml::from_str(contents).map_err(ConfigError::Parse)?;
    debug!(
        "Config: provider={:?}, model={:?}, api_key_set={}",
        config.general.default_provider,
        config.general.default_model,
        config.openai.api_key.is_some()
    );
    Ok(config)
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) {
    let default_content = r#"# Prompts Configuration
# All settings are optional. Defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [general]
# default_provider = "openai"          # "openai" or "lmstudio"
# default_model = "gpt-3.5-turbo-instruct"
# prompt = "The following is a conversation with an AI assistant."
# prompt_file = "prompt.txt"           # Path relative to ~/.prompts/
# history_limit = 100                  # Undo steps to keep

# [parameters]
# max_tokens = 150
# temperature = 0.9
# top_p = 1.0
# frequency_penalty = 0.0
# presence_penalty = 0.6
# stop = []                            # Extra stop sequences (max 4 total)

# [chat]
# restart_sequence = "\nPerson: "      # Inserted before your input
# start_sequence = "\nAI:"             # Inserted before the completion

# [openai]
# api_key = "sk-..."                   # Or set OPENAI_API_KEY env var
# base_url = "https://api.openai.com/v1"

# [lmstudio]
# base_url = "http://localhost:1234/v1"
"#;

    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            warn!("Failed to create config directory: {}", e);
            return;
        }
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
///
/// `cli_provider` and `cli_model` are from CLI flags (None = not specified).
pub fn resolve(
    config: &PromptsConfig,
    cli_provider: Option<&str>,
    cli_model: Option<&str>,
) -> ResolvedConfig {
    // Provider: CLI → env → config → default
    let provider = cli_provider
        .map(|s| s.to_string())
        .or_else(|| std::env::var("PROMPTS_PROVIDER").ok())
        .or_else(|| config.general.default_provider.clone())
        .unwrap_or_else(|| DEFAULT_PROVIDER.to_string());

    let defaults = CompletionParameters::default();

    // Model: CLI → env → config → default
    let model = cli_model
        .map(|s| s.to_string())
        .or_else(|| std::env::var("PROMPTS_MODEL").ok())
        .or_else(|| config.general.default_model.clone())
        .unwrap_or(defaults.model);

    let p = &config.parameters;
    let parameters = CompletionParameters {
        model,
        max_tokens: p.max_tokens.unwrap_or(defaults.max_tokens),
        temperature: p.temperature.unwrap_or(defaults.temperature),
        top_p: p.top_p.unwrap_or(defaults.top_p),
        frequency_penalty: p.frequency_penalty.unwrap_or(defaults.frequency_penalty),
        presence_penalty: p.presence_penalty.unwrap_or(defaults.presence_penalty),
        stop: p.stop.clone().unwrap_or(defaults.stop),
    };

    let default_sequences = ChatSequences::default();
    let sequences = ChatSequences {
        restart: config
            .chat
            .restart_sequence
            .clone()
            .unwrap_or(default_sequences.restart),
        start: config
            .chat
            .start_sequence
            .clone()
            .unwrap_or(default_sequences.start),
    };

    // API key: env → config
    let api_key = std::env::var("OPENAI_API_KEY")
        .ok()
        .or_else(|| config.openai.api_key.clone())
        .filter(|k| !k.trim().is_empty());

    // OpenAI base URL: env → config → default
    let openai_base_url = std::env::var("OPENAI_BASE_URL")
        .ok()
        .or_else(|| config.openai.base_url.clone())
        .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string());

    // LM Studio base URL: env → config → default
    let lmstudio_base_url = std::env::var("LM_STUDIO_BASE_URL")
        .ok()
        .or_else(|| config.lmstudio.base_url.clone())
        .unwrap_or_else(|| DEFAULT_LMSTUDIO_BASE_URL.to_string());

    ResolvedConfig {
        provider,
        prompt: resolve_prompt(config),
        parameters,
        sequences,
        history_limit: config.general.history_limit.unwrap_or(DEFAULT_HISTORY_LIMIT),
        api_key,
        openai_base_url,
        lmstudio_base_url,
    }
}

/// Resolves the starting prompt: inline wins over file, both win over default.
fn resolve_prompt(config: &PromptsConfig) -> String {
    if let Some(ref prompt) = config.general.prompt {
        return prompt.clone();
    }

    // Try loading from prompt_file (relative to ~/.prompts/)
    if let Some(ref file) = config.general.prompt_file {
        if let Some(dir) = config_dir() {
            let prompt_path = dir.join(file);
            match fs::read_to_string(&prompt_path) {
                Ok(contents) => {
                    if !contents.trim().is_empty() {
                        info!("Loaded prompt from {}", prompt_path.display());
                        return contents;
                    }
                    warn!("Prompt file is empty: {}", prompt_path.display());
                }
                Err(e) => {
                    warn!("Failed to read prompt file {}: {}", prompt_path.display(), e);
                }
            }
        }
    }

    DEFAULT_PROMPT.to_string()
}
