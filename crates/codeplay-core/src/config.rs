//! Configuration types for the online compiler.
//!
//! The judge endpoint and its credentials are never compiled in: they come
//! from `codeplay.json` and can be overridden from the environment.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CodeplayError, Result};

/// The default config file name.
const CONFIG_FILE_NAME: &str = "codeplay.json";

/// Environment variable overriding the judge endpoint.
pub const ENV_JUDGE_URL: &str = "CODEPLAY_JUDGE_URL";

/// Environment variable overriding the judge API host header.
pub const ENV_JUDGE_HOST: &str = "CODEPLAY_JUDGE_HOST";

/// Environment variable carrying the judge API key.
pub const ENV_JUDGE_KEY: &str = "CODEPLAY_JUDGE_KEY";

/// Default judge submissions endpoint.
fn default_endpoint() -> String {
    "https://judge029.p.rapidapi.com/submissions".to_string()
}

/// Default value of the `x-rapidapi-host` header.
#[allow(clippy::unnecessary_wraps)]
fn default_api_host() -> Option<String> {
    Some("judge029.p.rapidapi.com".to_string())
}

/// Default connect timeout for the HTTP transport in seconds.
const fn default_connect_timeout() -> u64 {
    10
}

/// Default broadcast capacity for session events.
const fn default_event_capacity() -> usize {
    64
}

/// Default value for boolean options that default to true.
const fn default_true() -> bool {
    true
}

/// Main configuration for the online compiler.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Remote judge settings.
    #[serde(default)]
    pub judge: JudgeConfig,

    /// Session event settings.
    #[serde(default)]
    pub events: EventsConfig,
}

impl Config {
    /// Loads configuration from the current working directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but contains invalid JSON.
    pub fn load() -> Result<Self> {
        let current_dir = std::env::current_dir().map_err(|e| {
            CodeplayError::config_parse(
                "<current directory>",
                format!("cannot determine current directory: {e}"),
            )
        })?;
        Self::load_from_dir(&current_dir)
    }

    /// Loads `codeplay.json` from a specific directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but contains invalid JSON.
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        Self::load_from_file(&dir.join(CONFIG_FILE_NAME))
    }

    /// Loads configuration from a specific file path.
    ///
    /// If the file does not exist, returns default configuration.
    ///
    /// # Errors
    ///
    /// Returns `CodeplayError::ConfigParseError` if the file exists but is
    /// unreadable or not valid JSON, and `CodeplayError::ConfigValidationError`
    /// if the values are invalid.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let config = Self::default();
                config.validate()?;
                return Ok(config);
            }
            Err(e) => {
                return Err(CodeplayError::config_parse(
                    path,
                    format!("failed to read file: {e}"),
                ));
            }
        };

        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| CodeplayError::config_parse(path, e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Applies overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_overrides(|name| std::env::var(name).ok());
    }

    /// Applies overrides from a variable lookup.
    ///
    /// Empty values are ignored.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        if let Some(url) = get(ENV_JUDGE_URL) {
            self.judge.endpoint = url;
        }
        if let Some(host) = get(ENV_JUDGE_HOST) {
            self.judge.api_host = Some(host);
        }
        if let Some(key) = get(ENV_JUDGE_KEY) {
            self.judge.api_key = Some(key);
        }
    }

    /// Validates the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `CodeplayError::ConfigValidationError` if any check fails.
    pub fn validate(&self) -> Result<()> {
        let endpoint = self.judge.endpoint.trim();
        if endpoint.is_empty() {
            return Err(CodeplayError::config_validation(
                "judge.endpoint must not be empty",
                "Set judge.endpoint in your codeplay.json or CODEPLAY_JUDGE_URL",
            ));
        }

        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(CodeplayError::config_validation(
                format!("judge.endpoint '{endpoint}' is not an http(s) URL"),
                "Use a full URL such as https://judge.example.com/submissions for judge.endpoint",
            ));
        }

        if self.judge.connect_timeout_secs == 0 {
            return Err(CodeplayError::config_validation(
                "judge.connectTimeoutSecs must be greater than 0",
                "Set judge.connectTimeoutSecs to at least 1 second in your codeplay.json",
            ));
        }

        if !self.judge.wait {
            return Err(CodeplayError::config_validation(
                "judge.wait must be true",
                "Remove judge.wait from your codeplay.json; only wait-for-completion mode is supported",
            ));
        }

        if self.events.capacity == 0 {
            return Err(CodeplayError::config_validation(
                "events.capacity must be greater than 0",
                "Set events.capacity to at least 1 in your codeplay.json",
            ));
        }

        Ok(())
    }
}

/// Remote judge connection settings.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JudgeConfig {
    /// Submissions endpoint URL.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Value of the `x-rapidapi-host` header, if any.
    #[serde(default = "default_api_host")]
    pub api_host: Option<String>,

    /// Value of the `x-rapidapi-key` header, if any.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Transport connect timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Whether the judge should answer only once the run has finished.
    #[serde(default = "default_true")]
    pub wait: bool,
}

impl Default for JudgeConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            api_host: default_api_host(),
            api_key: None,
            connect_timeout_secs: default_connect_timeout(),
            wait: default_true(),
        }
    }
}

// Keeps the API key out of logs.
impl std::fmt::Debug for JudgeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JudgeConfig")
            .field("endpoint", &self.endpoint)
            .field("api_host", &self.api_host)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("wait", &self.wait)
            .finish()
    }
}

/// Session event settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventsConfig {
    /// Buffered events per subscriber before old ones are dropped.
    #[serde(default = "default_event_capacity")]
    pub capacity: usize,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            capacity: default_event_capacity(),
        }
    }
}
