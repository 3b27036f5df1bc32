//! Configuration parsing and validation for medrelay.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::path::Path;

/// Root configuration structure.
#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub provider: ProviderConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Address to listen on (e.g., "127.0.0.1:8080")
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

fn default_listen() -> String {
    "127.0.0.1:8080".to_string()
}

/// API key wrapper that redacts in Debug/Display/Serialize and zeroizes on drop.
///
/// The inner `SecretString` ensures the key value is:
/// - Zeroized in memory when dropped
/// - Never exposed via Debug or Display
/// - Only accessible via `.expose_secret()` (grep-auditable)
#[derive(Clone)]
pub struct ApiKey(SecretString);

impl ApiKey {
    /// Access the raw key value. Every call site is auditable via `grep expose_secret`.
    pub fn expose_secret(&self) -> &str {
        self.0.expose_secret()
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl std::fmt::Display for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl Serialize for ApiKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str("[REDACTED]")
    }
}

impl<'de> serde::Deserialize<'de> for ApiKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(|s| ApiKey(SecretString::from(s)))
    }
}

impl From<String> for ApiKey {
    fn from(s: String) -> Self {
        ApiKey(SecretString::from(s))
    }
}

impl From<&str> for ApiKey {
    fn from(s: &str) -> Self {
        ApiKey(SecretString::from(s))
    }
}

/// How the provider's API key was resolved.
#[derive(Debug, Clone, PartialEq)]
pub enum KeySource {
    /// Key was a literal string in config (no ${} references)
    Literal,
    /// Key contained ${VAR} references expanded from environment
    EnvExpanded,
    /// Key was auto-discovered from convention env var (holds var name)
    Convention(String),
    /// No key available
    None,
}

impl std::fmt::Display for KeySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeySource::Literal => write!(f, "config-literal"),
            KeySource::EnvExpanded => write!(f, "env-expanded"),
            KeySource::Convention(var) => write!(f, "convention ({})", var),
            KeySource::None => write!(f, "none"),
        }
    }
}

/// Completion provider configuration.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Short name for this provider (used in logs and convention key lookup)
    pub name: String,
    /// Base URL for the provider's API (e.g., "https://api.deepseek.com")
    pub url: String,
    /// API key sent as a bearer token
    pub api_key: Option<ApiKey>,
    /// Model identifier submitted with every completion request
    pub model: String,
    /// Total timeout for one provider call, in seconds
    pub timeout_secs: u64,
}

fn default_model() -> String {
    "deepseek-reasoner".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Configuration validation error: {0}")]
    Validation(String),

    #[error("Environment variable '{var}' not set for provider '{provider}': {message}")]
    EnvVar {
        var: String,
        provider: String,
        message: String,
    },
}

/// Raw provider config deserialized directly from TOML.
/// api_key is `Option<String>` so it may contain `${VAR}` references not yet expanded.
#[derive(Deserialize)]
struct RawProviderConfig {
    name: String,
    url: String,
    api_key: Option<String>,
    #[serde(default = "default_model")]
    model: String,
    #[serde(default = "default_timeout_secs")]
    timeout_secs: u64,
}

/// Raw configuration deserialized directly from TOML.
#[derive(Deserialize)]
struct RawConfig {
    #[serde(default)]
    server: ServerConfig,
    provider: RawProviderConfig,
}

/// Expand all `${VAR}` references in a string using a custom lookup function.
///
/// The closure-based design makes this testable without touching global env state.
/// Supports multiple `${VAR}` in one string.
/// Fails on first missing variable, unclosed `${`, or empty variable name.
fn expand_env_vars_with<F>(
    input: &str,
    provider_name: &str,
    lookup: F,
) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if !input.contains("${") {
        return Ok(input.to_string());
    }

    let mut result = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        result.push_str(&rest[..start]);
        let after = &rest[start + 2..];

        let end = after.find('}').ok_or_else(|| ConfigError::EnvVar {
            var: "<unclosed>".to_string(),
            provider: provider_name.to_string(),
            message: format!("Unclosed '${{' in config value: {}", input),
        })?;

        let var_name = &after[..end];
        if var_name.is_empty() {
            return Err(ConfigError::EnvVar {
                var: "".to_string(),
                provider: provider_name.to_string(),
                message: "Empty variable name in '${}' reference".to_string(),
            });
        }

        let value = lookup(var_name).ok_or_else(|| ConfigError::EnvVar {
            var: var_name.to_string(),
            provider: provider_name.to_string(),
            message: format!(
                "Environment variable '{}' is not set (referenced in provider '{}')",
                var_name, provider_name
            ),
        })?;

        result.push_str(&value);
        rest = &after[end + 1..];
    }

    result.push_str(rest);
    Ok(result)
}

/// Derive the convention-based env var name for a provider.
///
/// Transforms the provider name to `MEDRELAY_<UPPER_SNAKE_NAME>_API_KEY`:
/// - "deepseek" -> "MEDRELAY_DEEPSEEK_API_KEY"
/// - "my-gateway" -> "MEDRELAY_MY_GATEWAY_API_KEY"
pub fn convention_env_var_name(provider_name: &str) -> String {
    let upper_snake = provider_name.to_uppercase().replace(['-', ' '], "_");
    format!("MEDRELAY_{}_API_KEY", upper_snake)
}

/// Resolve the provider API key from raw config plus an env lookup.
///
/// - `${VAR}` references: expand via `lookup`, source = `EnvExpanded`
/// - literal string: wrap directly, source = `Literal`
/// - absent: try the convention var (`MEDRELAY_<NAME>_API_KEY`),
///   source = `Convention(var_name)` or `KeySource::None`
fn resolve_api_key<F>(
    raw_key: Option<&str>,
    provider_name: &str,
    lookup: F,
) -> Result<(Option<ApiKey>, KeySource), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match raw_key {
        Some(raw) if raw.contains("${") => {
            let expanded = expand_env_vars_with(raw, provider_name, &lookup)?;
            Ok((Some(ApiKey::from(expanded)), KeySource::EnvExpanded))
        }
        Some(raw) => Ok((Some(ApiKey::from(raw)), KeySource::Literal)),
        None => {
            let var_name = convention_env_var_name(provider_name);
            match lookup(&var_name) {
                Some(value) => Ok((Some(ApiKey::from(value)), KeySource::Convention(var_name))),
                None => Ok((None, KeySource::None)),
            }
        }
    }
}

impl Config {
    /// Load configuration from a TOML file with environment variable expansion.
    ///
    /// Returns the config and how the provider API key was resolved.
    pub fn from_file_with_env(path: impl AsRef<Path>) -> Result<(Self, KeySource), ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io {
            path: path.as_ref().display().to_string(),
            source: e,
        })?;

        Self::parse_str_with_env(&content)
    }

    /// Parse configuration from a TOML string, resolving secrets from the environment.
    pub fn parse_str_with_env(content: &str) -> Result<(Self, KeySource), ConfigError> {
        Self::parse_str_with(content, |name| std::env::var(name).ok())
    }

    /// Parse configuration with a custom env lookup (testable without global env state).
    fn parse_str_with<F>(content: &str, lookup: F) -> Result<(Self, KeySource), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw: RawConfig = toml::from_str(content)?;

        let (api_key, key_source) =
            resolve_api_key(raw.provider.api_key.as_deref(), &raw.provider.name, lookup)?;

        let config = Config {
            server: raw.server,
            provider: ProviderConfig {
                name: raw.provider.name,
                url: raw.provider.url,
                api_key,
                model: raw.provider.model,
                timeout_secs: raw.provider.timeout_secs,
            },
        };

        config.validate()?;
        Ok((config, key_source))
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.provider.url.is_empty() {
            return Err(ConfigError::Validation(format!(
                "Provider '{}' has empty URL",
                self.provider.name
            )));
        }

        if self.provider.model.is_empty() {
            return Err(ConfigError::Validation(format!(
                "Provider '{}' has empty model",
                self.provider.name
            )));
        }

        if self.provider.api_key.is_none() {
            return Err(ConfigError::Validation(format!(
                "No API key for provider '{}': set provider.api_key or {}",
                self.provider.name,
                convention_env_var_name(&self.provider.name)
            )));
        }

        Ok(())
    }
}
