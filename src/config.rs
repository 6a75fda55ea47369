//! Runtime configuration.
//!
//! Everything except secrets comes from an optional `config.yaml`; every
//! field has a built-in default so the daemon runs with no file at all.
//! Secrets are read from the environment, falling back to a `.env` file in
//! the working directory.

use crate::error::{AppError, AppResult};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_ENV: &str = "PODCAST_DIGEST_CONFIG";
const DEFAULT_CONFIG_FILE: &str = "config.yaml";

const DEFAULT_FEEDS: &[&str] = &[
    "https://feeds.buzzsprout.com/1705129.rss",
    "https://thisdayinai.libsyn.com/rss",
    "https://feeds.simplecast.com/w6CWz6jN",
    "https://feeds.buzzsprout.com/2023029.rss",
    "https://feeds.feedburner.com/twit/mlat",
    "https://feeds.simplecast.com/2nGuZx3N",
    "https://feeds.simplecast.com/4rOoJ6EJ",
    "https://feeds.simplecast.com/7gYrJt2Y",
    "https://feeds.redcircle.com/3b99e8d2-5b43-4d76-a502-18db2263c2e0",
    "https://feeds.simplecast.com/1T_k2WZo",
    "https://feeds.buzzsprout.com/2040639.rss",
    "https://api.pod.co/podcasts/gradient-dissent/feed",
    "https://feeds.buzzsprout.com/2084645.rss",
];

const DEFAULT_KEYWORDS: &[&str] = &[
    "ai",
    "artificial intelligence",
    "generative ai",
    "llm",
    "large language model",
    "gpt",
    "chatgpt",
    "claude",
    "gemini",
    "ethics",
    "robotics",
    "healthcare",
    "marketing",
    "computer vision",
    "nlp",
    "natural language processing",
    "machine learning",
    "deep learning",
    "neural networks",
    "ai safety",
    "responsible ai",
    "ai regulation",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub feeds: Vec<String>,
    pub keywords: Vec<String>,
    pub directory: DirectoryConfig,
    /// Where the dated CSV/JSON files land
    pub output_dir: PathBuf,
    pub schedule: ScheduleConfig,
    pub smtp: SmtpConfig,
    pub llm: LlmConfig,
    /// Pause after a feed fails before moving to the next one
    pub feed_failure_pause_ms: u64,
    pub log_file: PathBuf,
    /// File this config was read from; `None` for the built-in config
    #[serde(skip)]
    pub loaded_from: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            feeds: DEFAULT_FEEDS.iter().map(|s| s.to_string()).collect(),
            keywords: DEFAULT_KEYWORDS.iter().map(|s| s.to_string()).collect(),
            directory: DirectoryConfig::default(),
            output_dir: PathBuf::from("."),
            schedule: ScheduleConfig::default(),
            smtp: SmtpConfig::default(),
            llm: LlmConfig::default(),
            feed_failure_pause_ms: 1000,
            log_file: PathBuf::from("podcast_agent.log"),
            loaded_from: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectoryConfig {
    pub search_url: String,
    pub term: String,
    pub limit: u32,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            search_url: "https://itunes.apple.com/search".to_string(),
            term: "artificial intelligence".to_string(),
            limit: 50,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// First scheduled run, `YYYY-MM-DD HH:MM:SS` local time. Unset means
    /// the next 08:00.
    pub start_at: Option<String>,
    pub interval_hours: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            start_at: None,
            interval_hours: 24,
        }
    }
}

impl ScheduleConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_hours.max(1) * 3600)
    }

    pub fn start_at(&self) -> AppResult<Option<NaiveDateTime>> {
        self.start_at
            .as_deref()
            .map(parse_start_at)
            .transpose()
    }
}

fn parse_start_at(value: &str) -> AppResult<NaiveDateTime> {
    let value = value.trim();
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S"))
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M"))
        .map_err(|e| AppError::Config(format!("invalid schedule.start_at '{}': {}", value, e)))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: "smtp.gmail.com".to_string(),
            port: 587,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4".to_string(),
            max_tokens: 150,
        }
    }
}

impl Config {
    /// Load from an explicit path, `$PODCAST_DIGEST_CONFIG`, or `./config.yaml`
    /// in that order. A missing default file yields the built-in config; a
    /// missing explicit file is an error.
    pub fn load(path: Option<&Path>) -> AppResult<Self> {
        let explicit = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var(CONFIG_ENV).ok().map(PathBuf::from));

        let config_path = match explicit {
            Some(p) => p,
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !default.exists() {
                    return Ok(Self::default());
                }
                default
            }
        };

        let content = std::fs::read_to_string(&config_path).map_err(|e| {
            AppError::Config(format!("Failed to read {}: {}", config_path.display(), e))
        })?;
        let mut config = Self::from_yaml(&content)?;
        config.loaded_from = Some(config_path);
        Ok(config)
    }

    /// Call once logging is installed.
    pub fn log_summary(&self) {
        match &self.loaded_from {
            Some(path) => log::info!(
                "Loaded config from {}: {} feeds, {} keywords",
                path.display(),
                self.feeds.len(),
                self.keywords.len()
            ),
            None => log::info!(
                "No {} found, using built-in configuration",
                DEFAULT_CONFIG_FILE
            ),
        }
    }

    pub fn from_yaml(content: &str) -> AppResult<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        // Fail at startup rather than at the first scheduler tick
        config.schedule.start_at()?;
        Ok(config)
    }

    pub fn feed_failure_pause(&self) -> Duration {
        Duration::from_millis(self.feed_failure_pause_ms)
    }
}

/// Credentials that never live in `config.yaml`.
#[derive(Clone, Default)]
pub struct Secrets {
    pub email_user: Option<String>,
    pub email_pass: Option<String>,
    pub openai_api_key: Option<String>,
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secrets")
            .field("email_user", &self.email_user)
            .field("email_pass", &self.email_pass.as_ref().map(|_| "***"))
            .field("openai_api_key", &self.openai_api_key.as_ref().map(|_| "***"))
            .finish()
    }
}

impl Secrets {
    pub fn from_env() -> Self {
        let dir = Path::new(".");
        Self {
            email_user: env_value(dir, "EMAIL_USER"),
            email_pass: env_value(dir, "EMAIL_PASS"),
            openai_api_key: env_value(dir, "OPENAI_API_KEY"),
        }
    }
}

/// Read `key` from the process environment, then from `<dir>/.env`.
pub fn env_value(dir: &Path, key: &str) -> Option<String> {
    match std::env::var(key) {
        Ok(value) if !value.trim().is_empty() => Some(value),
        _ => load_env_value(dir, key),
    }
}

/// Load a value from the .env file by key name
pub fn load_env_value(dir: &Path, key: &str) -> Option<String> {
    let env_path = dir.join(".env");
    let prefix = format!("{}=", key);
    let content = std::fs::read_to_string(&env_path).ok()?;
    for line in content.lines() {
        let trimmed = line.trim();
        if let Some(rest) = trimmed.strip_prefix(&prefix) {
            let value = rest.trim().trim_matches('"').trim_matches('\'');
            if !value.is_empty() {
                return Some(value.to_string());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_match_builtin_lists() {
        let config = Config::default();
        assert_eq!(config.feeds.len(), 13);
        assert!(config.keywords.contains(&"large language model".to_string()));
        assert_eq!(config.directory.limit, 50);
        assert_eq!(config.schedule.interval(), Duration::from_secs(24 * 3600));
        assert_eq!(config.llm.max_tokens, 150);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = Config::from_yaml(
            r#"
feeds:
  - https://example.com/feed.xml
schedule:
  start_at: "2025-04-26 08:00:00"
smtp:
  port: 2525
"#,
        )
        .unwrap();

        assert_eq!(config.feeds, vec!["https://example.com/feed.xml".to_string()]);
        assert_eq!(config.keywords.len(), 22);
        assert_eq!(config.smtp.host, "smtp.gmail.com");
        assert_eq!(config.smtp.port, 2525);
        let start = config.schedule.start_at().unwrap().unwrap();
        assert_eq!(start.format("%Y-%m-%d %H:%M").to_string(), "2025-04-26 08:00");
    }

    #[test]
    fn test_load_remembers_source_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("digest.yaml");
        std::fs::write(&path, "keywords:\n  - robotics\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();

        assert_eq!(config.loaded_from.as_deref(), Some(path.as_path()));
        assert_eq!(config.keywords, vec!["robotics".to_string()]);
        assert_eq!(Config::default().loaded_from, None);
        assert_eq!(Config::from_yaml("feeds: []\n").unwrap().loaded_from, None);
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let temp = TempDir::new().unwrap();
        let result = Config::load(Some(&temp.path().join("absent.yaml")));
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_bad_start_at_rejected() {
        let result = Config::from_yaml("schedule:\n  start_at: tomorrow morning\n");
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_load_env_value_from_dotenv() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join(".env"),
            "EMAIL_USER=\"me@example.com\"\nEMPTY=\nOPENAI_API_KEY='sk-test'\n",
        )
        .unwrap();

        assert_eq!(
            load_env_value(temp.path(), "EMAIL_USER"),
            Some("me@example.com".to_string())
        );
        assert_eq!(
            load_env_value(temp.path(), "OPENAI_API_KEY"),
            Some("sk-test".to_string())
        );
        assert_eq!(load_env_value(temp.path(), "EMPTY"), None);
        assert_eq!(load_env_value(temp.path(), "MISSING"), None);
    }

    #[test]
    fn test_secrets_debug_redacts() {
        let secrets = Secrets {
            email_user: Some("me@example.com".to_string()),
            email_pass: Some("hunter2".to_string()),
            openai_api_key: None,
        };
        let printed = format!("{:?}", secrets);
        assert!(!printed.contains("hunter2"));
        assert!(printed.contains("me@example.com"));
    }
}
