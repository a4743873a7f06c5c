//! Configuration loader for Banter.
//!
//! Reads `config.toml` (from `{data_dir}/config.toml` unless a path is given
//! on the command line) into [`AppConfig`], then applies `BANTER_*`
//! environment overrides. Falls back to defaults when the file is missing or
//! malformed.

use std::path::{Path, PathBuf};

use banter_types::config::AppConfig;
use secrecy::SecretString;

use crate::sqlite::pool::default_database_url;

/// Resolve the data directory.
///
/// Uses `BANTER_DATA_DIR` if set, otherwise `~/.banter`.
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("BANTER_DATA_DIR") {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".banter");
    }

    // Last resort: current directory
    PathBuf::from(".banter")
}

/// Load configuration from `path`.
///
/// - If the file does not exist, returns [`AppConfig::default()`].
/// - If the file exists but fails to parse, logs a warning and returns the default.
/// - Otherwise returns the parsed config.
pub async fn load_config(path: &Path) -> AppConfig {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", path.display());
            return AppConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", path.display());
            return AppConfig::default();
        }
    };

    match toml::from_str::<AppConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!("Failed to parse {}: {err}, using defaults", path.display());
            AppConfig::default()
        }
    }
}

/// Apply `BANTER_HOST`, `BANTER_PORT`, `BANTER_DATABASE_URL` and
/// `BANTER_MODEL` on top of a loaded config.
///
/// `lookup` is usually `|key| std::env::var(key).ok()`.
pub fn apply_overrides<F>(mut config: AppConfig, lookup: F) -> AppConfig
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(host) = lookup("BANTER_HOST").filter(|v| !v.trim().is_empty()) {
        config.server.host = host;
    }
    if let Some(port) = lookup("BANTER_PORT") {
        match port.trim().parse::<u16>() {
            Ok(port) => config.server.port = port,
            Err(err) => tracing::warn!("Ignoring BANTER_PORT={port}: {err}"),
        }
    }
    if let Some(url) = lookup("BANTER_DATABASE_URL").filter(|v| !v.trim().is_empty()) {
        config.database.url = Some(url);
    }
    if let Some(model) = lookup("BANTER_MODEL").filter(|v| !v.trim().is_empty()) {
        config.completion.model = model;
    }
    config
}

/// Database URL from config, or `banter.db` inside the data directory.
pub fn database_url(config: &AppConfig, data_dir: &Path) -> String {
    config
        .database
        .url
        .clone()
        .unwrap_or_else(|| default_database_url(data_dir))
}

/// Read the completion API key from the named environment variable.
pub fn read_api_key(env_name: &str) -> Option<SecretString> {
    read_api_key_with(env_name, |key| std::env::var(key).ok())
}

/// Like [`read_api_key`], with an injectable lookup. Empty or whitespace-only
/// values count as absent.
pub fn read_api_key_with<F>(env_name: &str, lookup: F) -> Option<SecretString>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(env_name)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(SecretString::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[tokio::test]
    async fn load_config_missing_file_returns_default() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(&tmp.path().join("config.toml")).await;
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.completion.model, "llama3-8b-8192");
        assert!(config.database.url.is_none());
    }

    #[tokio::test]
    async fn load_config_valid_toml_returns_parsed() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        tokio::fs::write(
            &path,
            r#"
[server]
port = 9001

[completion]
model = "llama-3.1-8b-instant"

[session]
default_bucket = true
"#,
        )
        .await
        .unwrap();

        let config = load_config(&path).await;
        assert_eq!(config.server.port, 9001);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.completion.model, "llama-3.1-8b-instant");
        assert!(config.session.default_bucket);
        assert_eq!(config.history.context_window, 5);
    }

    #[tokio::test]
    async fn load_config_invalid_toml_returns_default() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        tokio::fs::write(&path, "this is not { valid toml !!!")
            .await
            .unwrap();

        let config = load_config(&path).await;
        assert_eq!(config.server.port, 8000);
    }

    #[test]
    fn apply_overrides_replaces_fields() {
        let config = apply_overrides(
            AppConfig::default(),
            env(&[
                ("BANTER_HOST", "0.0.0.0"),
                ("BANTER_PORT", "8080"),
                ("BANTER_DATABASE_URL", "sqlite::memory:"),
                ("BANTER_MODEL", "mixtral-8x7b-32768"),
            ]),
        );
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.database.url.as_deref(), Some("sqlite::memory:"));
        assert_eq!(config.completion.model, "mixtral-8x7b-32768");
    }

    #[test]
    fn apply_overrides_ignores_bad_port() {
        let config = apply_overrides(AppConfig::default(), env(&[("BANTER_PORT", "not-a-port")]));
        assert_eq!(config.server.port, 8000);
    }

    #[test]
    fn database_url_prefers_config() {
        let mut config = AppConfig::default();
        let dir = Path::new("/tmp/banter");
        assert!(database_url(&config, dir).ends_with("banter.db?mode=rwc"));

        config.database.url = Some("sqlite://elsewhere.db".to_string());
        assert_eq!(database_url(&config, dir), "sqlite://elsewhere.db");
    }

    #[test]
    fn read_api_key_treats_blank_as_absent() {
        assert!(read_api_key_with("GROQ_API_KEY", env(&[])).is_none());
        assert!(read_api_key_with("GROQ_API_KEY", env(&[("GROQ_API_KEY", "   ")])).is_none());

        let key = read_api_key_with("GROQ_API_KEY", env(&[("GROQ_API_KEY", " gsk_123 ")])).unwrap();
        assert_eq!(key.expose_secret(), "gsk_123");
    }
}
