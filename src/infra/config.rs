// src/infra/config.rs — Configuration loading (TOML)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::infra::errors::SupportError;
use crate::infra::paths;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub generator: GeneratorConfig,

    #[serde(default)]
    pub classifier: ClassifierConfig,

    #[serde(default)]
    pub ranking: RankingConfig,

    #[serde(default)]
    pub escalation: EscalationConfig,

    #[serde(default)]
    pub chat: ChatConfig,

    #[serde(default)]
    pub store: StoreConfig,
}

/// Text-generation backend (Ollama). Probed once at startup; when no endpoint
/// answers, the rule-based generator is used for the whole process lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub enabled: bool,
    /// Candidate base URLs, probed in order.
    pub endpoints: Vec<String>,
    pub model: String,
    pub timeout_secs: u64,
    pub probe_timeout_secs: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoints: vec![
                "http://localhost:11434".into(),
                "http://host.docker.internal:11434".into(),
                "http://ollama:11434".into(),
            ],
            model: "llama3.2".into(),
            timeout_secs: 10,
            probe_timeout_secs: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Stored tickets required before training on them instead of the preset corpus.
    pub min_training_tickets: usize,
    pub max_features: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            min_training_tickets: 10,
            max_features: 1000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    pub top_k: usize,
    /// Matches must score strictly above this cosine similarity.
    pub similarity_threshold: f32,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            top_k: 3,
            similarity_threshold: 0.3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EscalationConfig {
    /// Conversation length above which a ticket is escalated.
    pub max_exchanges: usize,
}

impl Default for EscalationConfig {
    fn default() -> Self {
        Self { max_exchanges: 5 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Session id for `chat` when `--session` is not given. Unset means a
    /// fresh id per run.
    pub default_session: Option<String>,
    /// Chat sessions idle longer than this are dropped from memory.
    pub session_idle_secs: u64,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            default_session: None,
            session_idle_secs: 1800,
        }
    }
}

impl ChatConfig {
    pub fn session_idle(&self) -> Duration {
        Duration::from_secs(self.session_idle_secs)
    }

    /// Pick the chat session id: an explicit one wins, then the configured
    /// default, then a fresh UUID.
    pub fn session_id(&self, explicit: Option<String>) -> String {
        explicit
            .or_else(|| self.default_session.clone())
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Overrides the default database location.
    pub path: Option<PathBuf>,
}

impl StoreConfig {
    pub fn db_path(&self) -> PathBuf {
        self.path.clone().unwrap_or_else(paths::db_path)
    }
}

impl Config {
    /// Load config from file, falling back to defaults.
    pub fn load() -> anyhow::Result<Self> {
        let path = paths::config_file_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path).map_err(SupportError::Io)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| SupportError::Config(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the agents cannot work with.
    pub fn validate(&self) -> Result<(), SupportError> {
        if self.ranking.top_k == 0 {
            return Err(SupportError::Config("ranking.top_k must be at least 1".into()));
        }
        if !(0.0..1.0).contains(&self.ranking.similarity_threshold) {
            return Err(SupportError::Config(
                "ranking.similarity_threshold must be in [0, 1)".into(),
            ));
        }
        if self.classifier.max_features == 0 {
            return Err(SupportError::Config(
                "classifier.max_features must be at least 1".into(),
            ));
        }
        if self.generator.enabled && self.generator.endpoints.is_empty() {
            return Err(SupportError::Config(
                "generator.endpoints is empty; set generator.enabled = false instead".into(),
            ));
        }
        Ok(())
    }
}
