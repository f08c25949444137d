// src/generator/mod.rs — Text generation capability
//
// One backend is chosen at startup: Ollama when an endpoint answers the
// probe, otherwise the rule-based generator. Call sites ask
// `Generation::is_generative()` and keep their own deterministic fallback.

pub mod ollama;
pub mod rules;

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::infra::config::GeneratorConfig;
use crate::infra::errors::SupportError;

#[async_trait]
pub trait TextGenerator: Send + Sync {
    fn id(&self) -> &str;

    /// Whether output comes from a language model (as opposed to canned rules).
    fn is_generative(&self) -> bool;

    async fn generate(&self, prompt: &str, system: Option<&str>) -> Result<String, SupportError>;
}

/// How long a backend is skipped after a retriable failure.
const COOLDOWN: Duration = Duration::from_secs(60);

/// Shared handle to the selected backend, with a call timeout.
#[derive(Clone)]
pub struct Generation {
    backend: Arc<dyn TextGenerator>,
    timeout: Duration,
    cooldown_start: Arc<Mutex<Option<Instant>>>,
}

impl Generation {
    pub fn new(backend: Arc<dyn TextGenerator>, timeout: Duration) -> Self {
        Self {
            backend,
            timeout,
            cooldown_start: Arc::new(Mutex::new(None)),
        }
    }

    pub fn rule_based() -> Self {
        Self::new(Arc::new(rules::RuleBasedGenerator), Duration::from_secs(1))
    }

    /// Probe the configured endpoints in order and keep the first that answers.
    pub async fn select(config: &GeneratorConfig) -> Self {
        if !config.enabled {
            tracing::info!("Text generation disabled, using rule-based replies");
            return Self::rule_based();
        }

        let probe_timeout = Duration::from_secs(config.probe_timeout_secs);
        for endpoint in &config.endpoints {
            let candidate = ollama::OllamaGenerator::new(endpoint.clone(), config.model.clone());
            if candidate.probe(probe_timeout).await {
                tracing::info!(url = %endpoint, model = %config.model, "Using Ollama for text generation");
                return Self::new(
                    Arc::new(candidate),
                    Duration::from_secs(config.timeout_secs),
                );
            }
        }

        tracing::warn!("No Ollama endpoint reachable, using rule-based replies");
        Self::rule_based()
    }

    pub fn id(&self) -> &str {
        self.backend.id()
    }

    pub fn is_generative(&self) -> bool {
        self.backend.is_generative()
    }

    fn is_cooling_down(&self) -> bool {
        match self.cooldown_start.lock() {
            Ok(guard) => guard.is_some_and(|start| start.elapsed() < COOLDOWN),
            Err(_) => false,
        }
    }

    fn mark_failed(&self) {
        if let Ok(mut guard) = self.cooldown_start.lock() {
            *guard = Some(Instant::now());
        }
    }

    /// Generated text, or `fallback()` when the backend is rule-based, cooling
    /// down, fails, times out or returns nothing.
    pub async fn generate_or_else<F>(&self, prompt: &str, system: Option<&str>, fallback: F) -> String
    where
        F: FnOnce() -> String,
    {
        if !self.is_generative() || self.is_cooling_down() {
            return fallback();
        }

        let result = match tokio::time::timeout(self.timeout, self.backend.generate(prompt, system)).await {
            Ok(result) => result,
            Err(_) => Err(SupportError::Timeout {
                provider: self.backend.id().to_string(),
                timeout_secs: self.timeout.as_secs(),
            }),
        };

        match result {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => {
                tracing::warn!(generator = %self.id(), "Empty generation, using fallback");
                fallback()
            }
            Err(e) => {
                if e.is_retriable() {
                    self.mark_failed();
                }
                tracing::warn!(generator = %self.id(), "Generation failed, using fallback: {e}");
                fallback()
            }
        }
    }

    /// Free-form reply with the canned rules as fallback.
    pub async fn respond(&self, prompt: &str, system: Option<&str>) -> String {
        self.generate_or_else(prompt, system, || rules::respond(prompt))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct ScriptedGenerator {
        reply: Result<&'static str, bool>,
        delay: Duration,
        calls: AtomicUsize,
    }

    impl ScriptedGenerator {
        fn ok(reply: &'static str) -> Self {
            Self {
                reply: Ok(reply),
                delay: Duration::ZERO,
                calls: AtomicUsize::new(0),
            }
        }

        fn failing(retriable: bool) -> Self {
            Self {
                reply: Err(retriable),
                delay: Duration::ZERO,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        fn id(&self) -> &str {
            "scripted"
        }

        fn is_generative(&self) -> bool {
            true
        }

        async fn generate(&self, _prompt: &str, _system: Option<&str>) -> Result<String, SupportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            match self.reply {
                Ok(text) => Ok(text.to_string()),
                Err(retriable) => Err(SupportError::Provider {
                    provider: "scripted".into(),
                    message: "boom".into(),
                    retriable,
                }),
            }
        }
    }

    #[tokio::test]
    async fn test_generated_text_used() {
        let g = Generation::new(Arc::new(ScriptedGenerator::ok("model says hi")), Duration::from_secs(1));
        assert!(g.is_generative());
        let out = g.generate_or_else("p", None, || "fallback".into()).await;
        assert_eq!(out, "model says hi");
    }

    #[tokio::test]
    async fn test_empty_output_falls_back() {
        let g = Generation::new(Arc::new(ScriptedGenerator::ok("   ")), Duration::from_secs(1));
        let out = g.generate_or_else("p", None, || "fallback".into()).await;
        assert_eq!(out, "fallback");
    }

    #[tokio::test]
    async fn test_timeout_falls_back() {
        let slow = ScriptedGenerator {
            delay: Duration::from_millis(500),
            ..ScriptedGenerator::ok("late")
        };
        let g = Generation::new(Arc::new(slow), Duration::from_millis(20));
        let out = g.generate_or_else("p", None, || "fallback".into()).await;
        assert_eq!(out, "fallback");
    }

    #[tokio::test]
    async fn test_retriable_failure_starts_cooldown() {
        let backend = Arc::new(ScriptedGenerator::failing(true));
        let g = Generation::new(backend.clone(), Duration::from_secs(1));
        assert_eq!(g.generate_or_else("p", None, || "a".into()).await, "a");
        assert_eq!(g.generate_or_else("p", None, || "b".into()).await, "b");
        // Second call skipped the backend.
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_permanent_failure_keeps_trying() {
        let backend = Arc::new(ScriptedGenerator::failing(false));
        let g = Generation::new(backend.clone(), Duration::from_secs(1));
        g.generate_or_else("p", None, String::new).await;
        g.generate_or_else("p", None, String::new).await;
        assert_eq!(backend.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_rule_based_never_calls_backend() {
        let g = Generation::rule_based();
        assert!(!g.is_generative());
        let out = g.generate_or_else("p", None, || "fallback".into()).await;
        assert_eq!(out, "fallback");
        assert!(g.respond("hello", None).await.starts_with("Hello!"));
    }

    #[tokio::test]
    async fn test_select_disabled_is_rule_based() {
        let config = GeneratorConfig {
            enabled: false,
            ..GeneratorConfig::default()
        };
        let g = Generation::select(&config).await;
        assert_eq!(g.id(), "rules");
    }
}
