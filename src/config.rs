use chrono_tz::Tz;
use cron::Schedule;
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use teloxide::types::ChatId;

use crate::bot::selection::RetentionPolicy;

/// Environment variable consulted when the config file has no token.
pub const TOKEN_ENV: &str = "TOKEN";

/// Errors that can occur when loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read the config file.
    ReadFile { path: PathBuf, source: std::io::Error },
    /// Failed to parse JSON.
    ParseJson { path: PathBuf, source: serde_json::Error },
    /// Invalid cron expression for the daily message.
    InvalidCron { expr: String, source: cron::error::Error },
    /// Validation error.
    Validation(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadFile { path, source } => {
                write!(f, "failed to read config file '{}': {}", path.display(), source)
            }
            Self::ParseJson { path, source } => {
                write!(f, "failed to parse config file '{}': {}", path.display(), source)
            }
            Self::InvalidCron { expr, source } => {
                write!(f, "invalid cron expression '{}': {}", expr, source)
            }
            Self::Validation(msg) => write!(f, "config validation error: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ReadFile { source, .. } => Some(source),
            Self::ParseJson { source, .. } => Some(source),
            Self::InvalidCron { source, .. } => Some(source),
            Self::Validation(_) => None,
        }
    }
}

#[derive(Deserialize)]
struct ConfigFile {
    /// Falls back to the TOKEN environment variable when empty.
    #[serde(default)]
    telegram_bot_token: String,
    #[serde(default = "default_bot_name")]
    bot_name: String,
    #[serde(default = "default_version")]
    version: String,
    /// Root of the content files. Defaults to current directory.
    content_dir: Option<String>,
    #[serde(default = "default_jokes_dir")]
    jokes_dir: String,
    #[serde(default = "default_trivia_file")]
    trivia_file: String,
    #[serde(default = "default_daily_messages_file")]
    daily_messages_file: String,
    #[serde(default = "default_meme_api_url")]
    meme_api_url: String,
    #[serde(default = "default_meme_timeout_secs")]
    meme_timeout_secs: u64,
    /// Idle conversations are forgotten after this many minutes (0 = never).
    #[serde(default = "default_session_idle_minutes")]
    session_idle_minutes: u64,
    #[serde(default)]
    seen_retention: RetentionPolicy,
    daily_message: Option<DailyMessageFile>,
    /// Directory for state files (logs). Defaults to current directory.
    data_dir: Option<String>,
}

#[derive(Deserialize)]
struct DailyMessageFile {
    chat_ids: Vec<i64>,
    /// 7-field cron: sec min hour day month dow year
    #[serde(default = "default_daily_cron")]
    cron: String,
    #[serde(default = "default_timezone")]
    timezone: String,
}

fn default_bot_name() -> String {
    "ChumelitoBot".to_string()
}

fn default_version() -> String {
    "vFinal-28Sep2025".to_string()
}

fn default_jokes_dir() -> String {
    "chistes".to_string()
}

fn default_trivia_file() -> String {
    "trivia.json".to_string()
}

fn default_daily_messages_file() -> String {
    "mensajes.json".to_string()
}

fn default_meme_api_url() -> String {
    "https://meme-api.com/gimme".to_string()
}

fn default_meme_timeout_secs() -> u64 {
    10
}

fn default_session_idle_minutes() -> u64 {
    24 * 60
}

fn default_daily_cron() -> String {
    "0 0 9 * * * *".to_string()
}

fn default_timezone() -> String {
    "America/Mexico_City".to_string()
}

/// Where the content files live.
#[derive(Debug, Clone)]
pub struct ContentPaths {
    /// One `<category>.json` per joke category.
    pub jokes_dir: PathBuf,
    pub trivia_file: PathBuf,
    pub daily_messages_file: PathBuf,
}

impl ContentPaths {
    /// Default file names under `root`.
    pub fn under<P: AsRef<Path>>(root: P) -> Self {
        let root = root.as_ref();
        Self {
            jokes_dir: root.join(default_jokes_dir()),
            trivia_file: root.join(default_trivia_file()),
            daily_messages_file: root.join(default_daily_messages_file()),
        }
    }
}

/// Scheduled message-of-the-day broadcast.
#[derive(Debug, Clone)]
pub struct DailyMessageConfig {
    pub chat_ids: Vec<ChatId>,
    pub schedule: Schedule,
    pub timezone: Tz,
}

pub struct Config {
    pub telegram_bot_token: String,
    /// Shown on the home screen.
    pub bot_name: String,
    pub version: String,
    pub content: ContentPaths,
    pub meme_api_url: String,
    pub meme_timeout: Duration,
    /// None disables idle eviction.
    pub session_idle_ttl: Option<Duration>,
    pub seen_retention: RetentionPolicy,
    pub daily_message: Option<DailyMessageConfig>,
    /// Directory for state files (logs).
    pub data_dir: PathBuf,
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Self::load_with_env_token(path, std::env::var(TOKEN_ENV).ok())
    }

    /// Like [`Config::load`], with the environment token passed explicitly.
    pub fn load_with_env_token<P: AsRef<Path>>(
        path: P,
        env_token: Option<String>,
    ) -> Result<Self, ConfigError> {
        let config_path = path.as_ref().to_path_buf();
        let content = std::fs::read_to_string(&config_path)
            .map_err(|e| ConfigError::ReadFile { path: config_path.clone(), source: e })?;
        let file: ConfigFile = serde_json::from_str(&content)
            .map_err(|e| ConfigError::ParseJson { path: config_path.clone(), source: e })?;

        let telegram_bot_token = if file.telegram_bot_token.is_empty() {
            env_token.unwrap_or_default()
        } else {
            file.telegram_bot_token
        };
        if telegram_bot_token.is_empty() {
            return Err(ConfigError::Validation(format!(
                "telegram_bot_token is required (or set {TOKEN_ENV})"
            )));
        }
        // Telegram tokens are formatted as {bot_id}:{secret} where bot_id is numeric
        let token_parts: Vec<&str> = telegram_bot_token.split(':').collect();
        if token_parts.len() != 2 || token_parts[0].parse::<u64>().is_err() || token_parts[1].is_empty() {
            return Err(ConfigError::Validation(
                "telegram_bot_token appears invalid (expected format: 123456789:ABCdefGHI...)".into()
            ));
        }

        if file.meme_timeout_secs == 0 {
            return Err(ConfigError::Validation("meme_timeout_secs must be greater than 0".into()));
        }
        if !file.meme_api_url.starts_with("http://") && !file.meme_api_url.starts_with("https://") {
            return Err(ConfigError::Validation(format!(
                "meme_api_url must be an http(s) URL, got '{}'",
                file.meme_api_url
            )));
        }

        let root = file
            .content_dir
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        let content = ContentPaths {
            jokes_dir: root.join(&file.jokes_dir),
            trivia_file: root.join(&file.trivia_file),
            daily_messages_file: root.join(&file.daily_messages_file),
        };

        let daily_message = file.daily_message.map(parse_daily_message).transpose()?;

        let session_idle_ttl = match file.session_idle_minutes {
            0 => None,
            minutes => {
                let secs = minutes.checked_mul(60).ok_or_else(|| {
                    ConfigError::Validation(format!("session_idle_minutes is too large: {minutes}"))
                })?;
                Some(Duration::from_secs(secs))
            }
        };

        let data_dir = file
            .data_dir
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));

        Ok(Self {
            telegram_bot_token,
            bot_name: file.bot_name,
            version: file.version,
            content,
            meme_api_url: file.meme_api_url,
            meme_timeout: Duration::from_secs(file.meme_timeout_secs),
            session_idle_ttl,
            seen_retention: file.seen_retention,
            daily_message,
            data_dir,
        })
    }
}

fn parse_daily_message(file: DailyMessageFile) -> Result<DailyMessageConfig, ConfigError> {
    if file.chat_ids.is_empty() {
        return Err(ConfigError::Validation(
            "daily_message.chat_ids must contain at least one chat".into(),
        ));
    }
    let schedule = Schedule::from_str(&file.cron)
        .map_err(|e| ConfigError::InvalidCron { expr: file.cron.clone(), source: e })?;
    let timezone: Tz = file
        .timezone
        .parse()
        .map_err(|_| ConfigError::Validation(format!("unknown timezone '{}'", file.timezone)))?;
    Ok(DailyMessageConfig {
        chat_ids: file.chat_ids.into_iter().map(ChatId).collect(),
        schedule,
        timezone,
    })
}
