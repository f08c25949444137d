// src/generator/ollama.rs — Ollama text generation over HTTP

use std::time::Duration;

use async_trait::async_trait;

use super::TextGenerator;
use crate::infra::errors::SupportError;

pub struct OllamaGenerator {
    base_url: String,
    model: String,
    client: reqwest::Client,
}

impl OllamaGenerator {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            client: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// True when the server answers `/api/version` within `timeout`.
    pub async fn probe(&self, timeout: Duration) -> bool {
        let result = self
            .client
            .get(format!("{}/api/version", self.base_url))
            .timeout(timeout)
            .send()
            .await;
        match result {
            Ok(resp) if resp.status().is_success() => true,
            Ok(resp) => {
                tracing::debug!(url = %self.base_url, status = %resp.status(), "Ollama probe rejected");
                false
            }
            Err(e) => {
                tracing::debug!(url = %self.base_url, "Ollama probe failed: {e}");
                false
            }
        }
    }
}

#[async_trait]
impl TextGenerator for OllamaGenerator {
    fn id(&self) -> &str {
        "ollama"
    }

    fn is_generative(&self) -> bool {
        true
    }

    async fn generate(&self, prompt: &str, system: Option<&str>) -> Result<String, SupportError> {
        let mut body = serde_json::json!({
            "model": self.model,
            "prompt": prompt,
            "stream": false,
        });
        if let Some(system) = system {
            body["system"] = serde_json::json!(system);
        }

        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| SupportError::Provider {
                provider: "ollama".into(),
                message: e.to_string(),
                retriable: e.is_timeout() || e.is_connect(),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response.text().await.unwrap_or_default();
            return Err(SupportError::Provider {
                provider: "ollama".into(),
                message: format!("HTTP {status}: {error_body}"),
                retriable: status.is_server_error(),
            });
        }

        let resp: serde_json::Value =
            response.json().await.map_err(|e| SupportError::Provider {
                provider: "ollama".into(),
                message: format!("Failed to parse response: {e}"),
                retriable: false,
            })?;

        Ok(resp["response"].as_str().unwrap_or("").trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let g = OllamaGenerator::new("http://localhost:11434/", "llama3.2");
        assert_eq!(g.base_url(), "http://localhost:11434");
        assert!(g.is_generative());
        assert_eq!(g.id(), "ollama");
    }

    #[tokio::test]
    async fn test_probe_unreachable_endpoint() {
        // Port 9 (discard) on localhost is closed in test environments.
        let g = OllamaGenerator::new("http://127.0.0.1:9", "llama3.2");
        assert!(!g.probe(Duration::from_millis(300)).await);
    }

    #[tokio::test]
    async fn test_generate_unreachable_is_retriable() {
        let g = OllamaGenerator::new("http://127.0.0.1:9", "llama3.2");
        let err = g.generate("hello", None).await.unwrap_err();
        assert!(err.is_retriable());
    }
}
