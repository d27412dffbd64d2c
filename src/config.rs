use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use secrecy::SecretString;
use serde::Deserialize;

/// Default candidate models, tried in order until one answers.
fn default_models() -> Vec<String> {
    vec![
        "google/gemini-2.0-flash-exp:free".to_string(),
        "meta-llama/llama-4-maverick".to_string(),
        "deepseek/deepseek-chat-v3-0324".to_string(),
    ]
}

fn default_telegram_api_base() -> String {
    "https://api.telegram.org".to_string()
}

fn default_oracle_base_url() -> String {
    "https://openrouter.ai/api/v1".to_string()
}

/// Per-model attempt timeout. Bounds the fallback chain's worst case.
fn default_timeout_secs() -> u64 {
    20
}

fn default_referer() -> String {
    "https://granabot.app".to_string()
}

fn default_title() -> String {
    "Granabot".to_string()
}

/// Telegram Bot API settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    pub bot_token: Option<SecretString>,
    pub api_base: String,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            api_base: default_telegram_api_base(),
        }
    }
}

/// Classification oracle (OpenRouter-compatible chat-completion API).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OracleConfig {
    pub api_key: Option<SecretString>,
    pub base_url: String,
    /// Ordered fallback chain of model identifiers.
    pub models: Vec<String>,
    pub timeout_secs: u64,
    /// Attribution headers the API asks clients to send.
    pub referer: String,
    pub title: String,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_oracle_base_url(),
            models: default_models(),
            timeout_secs: default_timeout_secs(),
            referer: default_referer(),
            title: default_title(),
        }
    }
}

/// PostgREST-style persistence collaborator.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Base URL of the REST surface (e.g. `https://<project>.supabase.co/rest/v1`).
    pub base_url: Option<String>,
    pub service_key: Option<SecretString>,
}

/// Application configuration, built once at process start and passed by
/// reference into the pipeline constructors. Business logic never reads the
/// process environment.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub telegram: TelegramConfig,
    pub oracle: OracleConfig,
    pub store: StoreConfig,
}

/// Which collaborators are configured; reported by the diagnostic endpoint
/// without touching any of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct ConfigStatus {
    pub telegram: bool,
    pub oracle: bool,
    pub store: bool,
}

impl Config {
    /// Load config from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Load config from a file, or return default config if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn status(&self) -> ConfigStatus {
        ConfigStatus {
            telegram: self.telegram.bot_token.is_some(),
            oracle: self.oracle.api_key.is_some(),
            store: self.store.base_url.is_some() && self.store.service_key.is_some(),
        }
    }

    /// True when every collaborator has credentials and the pipeline can run.
    pub fn is_complete(&self) -> bool {
        let status = self.status();
        status.telegram && status.oracle && status.store
    }
}

/// Returns the default config file path.
///
/// Resolution order:
/// 1. `./granabot.toml` if it exists in current directory
/// 2. `~/.local/share/granabot/granabot.toml` (XDG data directory)
pub fn default_config_path() -> PathBuf {
    let local_config = PathBuf::from("granabot.toml");
    if local_config.exists() {
        return local_config;
    }

    if let Some(data_dir) = dirs::data_dir() {
        return data_dir.join("granabot").join("granabot.toml");
    }

    local_config
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn defaults_have_three_candidate_models_and_no_secrets() {
        let config = Config::default();
        assert_eq!(config.oracle.models.len(), 3);
        assert_eq!(config.oracle.timeout_secs, 20);
        assert!(config.telegram.bot_token.is_none());
        assert!(!config.is_complete());
    }

    #[test]
    fn load_full_config() -> Result<()> {
        let dir = TempDir::new()?;
        let config_path = dir.path().join("granabot.toml");

        let mut file = std::fs::File::create(&config_path)?;
        writeln!(file, "[telegram]")?;
        writeln!(file, "bot_token = \"123:abc\"")?;
        writeln!(file, "[oracle]")?;
        writeln!(file, "api_key = \"sk-or-xyz\"")?;
        writeln!(file, "models = [\"some/model\"]")?;
        writeln!(file, "timeout_secs = 5")?;
        writeln!(file, "[store]")?;
        writeln!(file, "base_url = \"https://db.example/rest/v1\"")?;
        writeln!(file, "service_key = \"service-role\"")?;

        let config = Config::load(&config_path)?;
        assert!(config.is_complete());
        assert_eq!(
            config.telegram.bot_token.unwrap().expose_secret(),
            "123:abc"
        );
        assert_eq!(config.oracle.models, vec!["some/model".to_string()]);
        assert_eq!(config.oracle.timeout_secs, 5);
        assert_eq!(
            config.store.base_url.as_deref(),
            Some("https://db.example/rest/v1")
        );

        Ok(())
    }

    #[test]
    fn partial_config_reports_missing_collaborators() -> Result<()> {
        let dir = TempDir::new()?;
        let config_path = dir.path().join("granabot.toml");

        let mut file = std::fs::File::create(&config_path)?;
        writeln!(file, "[telegram]")?;
        writeln!(file, "bot_token = \"123:abc\"")?;

        let config = Config::load(&config_path)?;
        let status = config.status();
        assert!(status.telegram);
        assert!(!status.oracle);
        assert!(!status.store);
        assert!(!config.is_complete());

        Ok(())
    }

    #[test]
    fn load_or_default_missing_file_gives_defaults() -> Result<()> {
        let dir = TempDir::new()?;
        let config = Config::load_or_default(&dir.path().join("missing.toml"))?;
        assert_eq!(config.oracle.base_url, "https://openrouter.ai/api/v1");
        assert_eq!(config.telegram.api_base, "https://api.telegram.org");
        Ok(())
    }
}
