use anyhow::{anyhow, Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::translation::job::OutputOptions;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Target language code (ISO)
    #[serde(default = "default_target_language")]
    pub target_language: String,

    /// Processing switches
    #[serde(default)]
    pub options: JobOptions,

    /// Translation provider
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Glossary and translation memory files
    #[serde(default)]
    pub storage: StorageConfig,

    /// Interval between progress polls while a job runs
    #[serde(default = "default_progress_poll_ms")]
    pub progress_poll_ms: u64,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Also append log lines to this file
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

/// Switches applied to every job
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct JobOptions {
    // @field: Substitute glossary terms before translation
    #[serde(default = "default_true")]
    pub use_glossary: bool,

    // @field: Apply the correction table after translation
    #[serde(default = "default_true")]
    pub post_edit: bool,

    // @field: Also write the right-to-left display output
    #[serde(default = "default_true")]
    pub reorder: bool,

    // @field: Copy the input before processing
    #[serde(default = "default_true")]
    pub backup: bool,
}

impl Default for JobOptions {
    fn default() -> Self {
        Self {
            use_glossary: true,
            post_edit: true,
            reorder: true,
            backup: true,
        }
    }
}

impl JobOptions {
    /// Output-related part of the switches
    pub fn outputs(&self) -> OutputOptions {
        OutputOptions {
            reorder: self.reorder,
            backup: self.backup,
        }
    }
}

/// Translation provider type
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    // @provider: Local Ollama server
    #[default]
    Ollama,
    // @provider: LibreTranslate machine translation
    LibreTranslate,
}

impl ProviderKind {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Ollama => "Ollama",
            Self::LibreTranslate => "LibreTranslate",
        }
    }

    // @returns: Default service URL
    pub fn default_endpoint(&self) -> String {
        match self {
            Self::Ollama => "http://localhost:11434".to_string(),
            Self::LibreTranslate => "http://localhost:5000".to_string(),
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ollama => write!(f, "ollama"),
            Self::LibreTranslate => write!(f, "libretranslate"),
        }
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "libretranslate" | "libre" => Ok(Self::LibreTranslate),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Provider configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderConfig {
    // @field: Provider type identifier
    #[serde(default)]
    pub kind: ProviderKind,

    // @field: Service URL, empty for the provider default
    #[serde(default = "String::new")]
    pub endpoint: String,

    // @field: Model name (Ollama only)
    #[serde(default = "default_ollama_model")]
    pub model: String,

    // @field: API key (LibreTranslate only, optional)
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Timeout seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    // @field: Retry count for transient failures
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    // @field: Base backoff, doubled on each retry
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    // @field: Sampling temperature (Ollama only)
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            kind: ProviderKind::default(),
            endpoint: String::new(),
            model: default_ollama_model(),
            api_key: String::new(),
            timeout_secs: default_timeout_secs(),
            retry_count: default_retry_count(),
            retry_backoff_ms: default_retry_backoff_ms(),
            temperature: default_temperature(),
        }
    }
}

impl ProviderConfig {
    /// Configured endpoint or the provider's default
    pub fn effective_endpoint(&self) -> String {
        if self.endpoint.trim().is_empty() {
            self.kind.default_endpoint()
        } else {
            self.endpoint.clone()
        }
    }

    /// API key, if one is set
    pub fn api_key(&self) -> Option<String> {
        let key = self.api_key.trim();
        (!key.is_empty()).then(|| key.to_string())
    }
}

/// Locations of the persistent stores
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct StorageConfig {
    #[serde(default = "default_glossary_path")]
    pub glossary_path: PathBuf,

    #[serde(default = "default_memory_path")]
    pub memory_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            glossary_path: default_glossary_path(),
            memory_path: default_memory_path(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_target_language() -> String {
    "ar".to_string()
}

fn default_progress_poll_ms() -> u64 {
    100
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    1000 // doubled on each retry
}

fn default_temperature() -> f32 {
    0.3
}

fn default_true() -> bool {
    true
}

fn default_ollama_model() -> String {
    "llama3.2:3b".to_string()
}

fn default_glossary_path() -> PathBuf {
    PathBuf::from("terms.json")
}

fn default_memory_path() -> PathBuf {
    PathBuf::from("translation_memory.json")
}

impl Config {
    /// Load the configuration file, writing the defaults when it does not exist
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if path.exists() {
            let file = File::open(path)
                .with_context(|| format!("Failed to open config file: {}", path.display()))?;
            let reader = BufReader::new(file);
            return serde_json::from_reader(reader)
                .with_context(|| format!("Failed to parse config file: {}", path.display()));
        }

        warn!("Config file not found at '{}', creating default config.", path.display());
        let config = Config::default();
        config.save(path)?;
        Ok(config)
    }

    /// Write the configuration as pretty-printed JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let config_json = serde_json::to_string_pretty(self)
            .context("Failed to serialize config to JSON")?;
        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write config to file: {}", path.display()))
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        crate::language_utils::validate_language_code(&self.target_language)
            .context("Invalid target language")?;

        if self.progress_poll_ms == 0 {
            return Err(anyhow!("progress_poll_ms must be greater than zero"));
        }

        if self.provider.timeout_secs == 0 {
            return Err(anyhow!("Provider timeout must be greater than zero"));
        }

        if !(0.0..=2.0).contains(&self.provider.temperature) {
            return Err(anyhow!(
                "Temperature must be between 0.0 and 2.0, got {}",
                self.provider.temperature
            ));
        }

        let endpoint = self.provider.effective_endpoint();
        url::Url::parse(&endpoint)
            .with_context(|| format!("Invalid provider endpoint: {}", endpoint))?;

        if self.provider.kind == ProviderKind::Ollama && self.provider.model.trim().is_empty() {
            return Err(anyhow!("A model name is required for the Ollama provider"));
        }

        if self.storage.glossary_path == self.storage.memory_path {
            return Err(anyhow!("Glossary and translation memory must use different files"));
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            target_language: default_target_language(),
            options: JobOptions::default(),
            provider: ProviderConfig::default(),
            storage: StorageConfig::default(),
            progress_poll_ms: default_progress_poll_ms(),
            log_level: LogLevel::default(),
            log_file: None,
        }
    }
}
