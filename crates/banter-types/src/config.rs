//! Configuration types for Banter.
//!
//! `AppConfig` represents the `config.toml` in the data directory. Every
//! field has a default, so an empty or missing file yields a working setup.
//! The completion API key itself is never stored here; only the name of the
//! environment variable that holds it.

use serde::{Deserialize, Serialize};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub completion: CompletionConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Message Store location.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// sqlx connection URL. `None` means `{data_dir}/banter.db`.
    #[serde(default)]
    pub url: Option<String>,
}

/// External chat-completion service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionConfig {
    #[serde(default = "default_provider_name")]
    pub provider_name: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Transport timeout for a single completion call.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Name of the environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

fn default_provider_name() -> String {
    "groq".to_string()
}

fn default_base_url() -> String {
    "https://api.groq.com/openai/v1".to_string()
}

fn default_model() -> String {
    "llama3-8b-8192".to_string()
}

fn default_temperature() -> f64 {
    0.7
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_api_key_env() -> String {
    "GROQ_API_KEY".to_string()
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            provider_name: default_provider_name(),
            base_url: default_base_url(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
            api_key_env: default_api_key_env(),
        }
    }
}

/// History bounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Turns shown on the chat page.
    #[serde(default = "default_page_limit")]
    pub page_limit: i64,
    /// Prior turns included when building completion context.
    #[serde(default = "default_context_window")]
    pub context_window: usize,
}

fn default_page_limit() -> i64 {
    20
}

fn default_context_window() -> usize {
    5
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            page_limit: default_page_limit(),
            context_window: default_context_window(),
        }
    }
}

/// Browser session settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    /// Idle lifetime of server-side session state.
    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,
    /// Route every browser to the shared `"default"` conversation instead of
    /// issuing per-browser sessions.
    #[serde(default)]
    pub default_bucket: bool,
}

fn default_cookie_name() -> String {
    "banter_session".to_string()
}

fn default_idle_timeout_secs() -> u64 {
    14 * 24 * 60 * 60
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: default_cookie_name(),
            idle_timeout_secs: default_idle_timeout_secs(),
            default_bucket: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_config_default_values() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.completion.model, "llama3-8b-8192");
        assert_eq!(config.completion.api_key_env, "GROQ_API_KEY");
        assert_eq!(config.completion.max_tokens, 1024);
        assert_eq!(config.history.page_limit, 20);
        assert_eq!(config.history.context_window, 5);
        assert!(!config.session.default_bucket);
        assert!(config.database.url.is_none());
    }

    #[test]
    fn test_app_config_deserialize_empty() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert!((config.completion.temperature - 0.7).abs() < f64::EPSILON);
    }

    #[test]
    fn test_app_config_deserialize_partial_sections() {
        let toml_str = r#"
[server]
port = 9090

[completion]
model = "llama-3.1-8b-instant"
timeout_secs = 15

[session]
default_bucket = true
"#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.completion.model, "llama-3.1-8b-instant");
        assert_eq!(config.completion.timeout_secs, 15);
        assert_eq!(config.completion.base_url, "https://api.groq.com/openai/v1");
        assert!(config.session.default_bucket);
        assert_eq!(config.session.cookie_name, "banter_session");
    }
}
