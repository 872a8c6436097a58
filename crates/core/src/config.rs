//! Configuration management for DocuChat.
//!
//! Configuration is layered, later sources winning:
//! - Built-in defaults (Groq, `llama-3.1-8b-instant`, temperature 0.5)
//! - Config file (`.docuchat/config.yaml` in the workspace)
//! - Environment variables (a `.env` file is loaded first)
//! - Command-line flags
//!
//! The API key itself is never stored here; only the name of the
//! environment variable holding it. It is read at call time.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Providers the answer generator knows how to talk to.
pub const KNOWN_PROVIDERS: [&str; 2] = ["groq", "ollama"];

/// Default model for answer generation.
pub const DEFAULT_MODEL: &str = "llama-3.1-8b-instant";

/// Default sampling temperature.
pub const DEFAULT_TEMPERATURE: f32 = 0.5;

/// Environment variable holding the Groq API key.
pub const DEFAULT_API_KEY_ENV: &str = "GROQ_API_KEY";

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Workspace root (may contain .docuchat/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// LLM provider ("groq" or "ollama")
    pub provider: String,

    /// Model identifier
    pub model: String,

    /// Sampling temperature
    pub temperature: f32,

    /// Custom API endpoint (provider default when absent)
    pub endpoint: Option<String>,

    /// Name of the environment variable holding the API key
    pub api_key_env: String,

    /// Request timeout in seconds (no timeout when absent)
    pub timeout_secs: Option<u64>,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    /// Provider table from the config file
    pub llm: Option<LlmConfig>,
}

/// LLM section of config.yaml.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(rename = "activeProvider")]
    pub active_provider: String,

    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
}

/// Per-provider settings. Every field is optional; missing ones keep defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(rename = "apiKeyEnv", default)]
    pub api_key_env: Option<String>,

    #[serde(default)]
    pub model: Option<String>,

    #[serde(default)]
    pub endpoint: Option<String>,

    #[serde(default)]
    pub temperature: Option<f32>,

    /// Request timeout in seconds
    #[serde(default)]
    pub timeout: Option<u64>,
}

/// Full configuration file structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConfigFile {
    llm: Option<LlmConfig>,
    logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            provider: "groq".to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            endpoint: None,
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            timeout_secs: None,
            log_level: None,
            verbose: false,
            no_color: false,
            llm: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from `.env`, the config file and the environment.
    ///
    /// Explicit paths win over `DOCUCHAT_WORKSPACE` and `DOCUCHAT_CONFIG`.
    /// The config file is read from the resolved workspace, so both must
    /// be known before any YAML is merged.
    ///
    /// Environment variables:
    /// - `DOCUCHAT_WORKSPACE`: Override workspace path
    /// - `DOCUCHAT_CONFIG`: Path to config file
    /// - `DOCUCHAT_PROVIDER`: LLM provider
    /// - `DOCUCHAT_MODEL`: Model identifier
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// # Example
    /// ```no_run
    /// use docuchat_core::config::AppConfig;
    ///
    /// let config = AppConfig::load_from(None, None).expect("Failed to load config");
    /// println!("Model: {}", config.model);
    /// ```
    pub fn load_from(workspace: Option<PathBuf>, config_file: Option<PathBuf>) -> AppResult<Self> {
        // A missing .env is the normal case
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!("Loaded environment from {:?}", path);
        }

        let mut config = Self::default();

        if let Some(workspace) = workspace
            .or_else(|| std::env::var("DOCUCHAT_WORKSPACE").ok().map(PathBuf::from))
        {
            config.workspace = workspace;
        }

        config.config_file =
            config_file.or_else(|| std::env::var("DOCUCHAT_CONFIG").ok().map(PathBuf::from));

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = config
            .config_file
            .clone()
            .unwrap_or_else(|| config.docuchat_dir().join("config.yaml"));

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        } else if config.config_file.is_some() {
            return Err(AppError::Config(format!(
                "Config file not found: {:?}",
                config_path
            )));
        }

        if let Ok(provider) = std::env::var("DOCUCHAT_PROVIDER") {
            config.provider = provider;
        }

        if let Ok(model) = std::env::var("DOCUCHAT_MODEL") {
            config.model = model;
        }

        if let Ok(level) = std::env::var("RUST_LOG") {
            config.log_level = Some(level);
        }

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge a YAML configuration file into this config.
    pub fn merge_yaml(self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self;

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        if let Some(llm) = config_file.llm {
            result.provider = llm.active_provider.clone();
            if let Some(provider_config) = llm.providers.get(&llm.active_provider) {
                result.apply_provider(provider_config);
            }
            result.llm = Some(llm);
        }

        Ok(result)
    }

    fn apply_provider(&mut self, provider_config: &ProviderConfig) {
        if let Some(ref model) = provider_config.model {
            self.model = model.clone();
        }
        if let Some(ref env) = provider_config.api_key_env {
            self.api_key_env = env.clone();
        }
        if let Some(ref endpoint) = provider_config.endpoint {
            self.endpoint = Some(endpoint.clone());
        }
        if let Some(temperature) = provider_config.temperature {
            self.temperature = temperature;
        }
        if let Some(timeout) = provider_config.timeout {
            self.timeout_secs = Some(timeout);
        }
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// CLI flags take precedence over environment variables and the
    /// config file. Switching provider re-applies that provider's table
    /// from the config file, if present. Workspace and config file paths
    /// are not overrides; pass them to [`AppConfig::load_from`].
    pub fn with_overrides(
        mut self,
        provider: Option<String>,
        model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(provider) = provider {
            if provider != self.provider {
                let table = self
                    .llm
                    .as_ref()
                    .and_then(|llm| llm.providers.get(&provider))
                    .cloned();
                if let Some(table) = table {
                    self.apply_provider(&table);
                }
            }
            self.provider = provider;
        }

        if let Some(model) = model {
            self.model = model;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Get the path to the .docuchat directory.
    pub fn docuchat_dir(&self) -> PathBuf {
        self.workspace.join(".docuchat")
    }

    /// Read the API key from the environment.
    ///
    /// Returns `None` when the variable is unset or empty.
    pub fn resolve_api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }

    /// Validate configuration for the active provider.
    pub fn validate(&self) -> AppResult<()> {
        let provider = self.provider.to_lowercase();

        if !KNOWN_PROVIDERS.contains(&provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown provider: {}. Supported: {}",
                self.provider,
                KNOWN_PROVIDERS.join(", ")
            )));
        }

        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(AppError::Config(format!(
                "Temperature must be between 0.0 and 2.0, got {}",
                self.temperature
            )));
        }

        Ok(())
    }
}
