// src/generator/rules.rs — Rule-based text generator (no model required)

use async_trait::async_trait;

use super::TextGenerator;
use crate::infra::errors::SupportError;

const GREETING_WORDS: &[&str] = &["hello", "hi", "hey", "greetings"];

struct ReplyRule {
    matches: fn(&str, &[&str]) -> bool,
    reply: &'static str,
}

fn is_greeting(_text: &str, words: &[&str]) -> bool {
    words.iter().any(|w| GREETING_WORDS.contains(w))
}

fn asks_capabilities(text: &str, _words: &[&str]) -> bool {
    text.contains("what can you") || text.contains("help me with")
}

fn about_network(text: &str, _words: &[&str]) -> bool {
    ["network", "connection", "wifi"].iter().any(|k| text.contains(k))
}

fn about_install(text: &str, _words: &[&str]) -> bool {
    text.contains("install") || text.contains("download")
}

fn about_account(text: &str, _words: &[&str]) -> bool {
    ["account", "login", "password"].iter().any(|k| text.contains(k))
}

const REPLY_RULES: &[ReplyRule] = &[
    ReplyRule {
        matches: is_greeting,
        reply: "Hello! I'm your support assistant. How can I help you today?",
    },
    ReplyRule {
        matches: asks_capabilities,
        reply: "I can help with technical support issues, create tickets for you, and provide solutions for common problems.",
    },
    ReplyRule {
        matches: about_network,
        reply: "It sounds like you're having network connectivity issues. I'd recommend checking your network settings, restarting your router, and ensuring your device is within range of your WiFi signal.",
    },
    ReplyRule {
        matches: about_install,
        reply: "For installation issues, please try the following steps: 1) Make sure your system meets the minimum requirements, 2) Close any conflicting applications, 3) Try running the installer as administrator.",
    },
    ReplyRule {
        matches: about_account,
        reply: "For account issues, you can try to: 1) Reset your password, 2) Clear your browser cookies, 3) Ensure you're using the correct username or email address.",
    },
];

const DEFAULT_REPLY: &str = "I understand you need assistance. To help you better, could you provide more details about your issue? In the meantime, I've created a support ticket for you, and one of our agents will follow up soon.";

/// Canned reply for `prompt`, picked by the first matching keyword rule.
pub fn respond(prompt: &str) -> String {
    let text = prompt.to_lowercase();
    let words: Vec<&str> = text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();

    REPLY_RULES
        .iter()
        .find(|r| (r.matches)(&text, &words))
        .map_or(DEFAULT_REPLY, |r| r.reply)
        .to_string()
}

/// Deterministic generator used when no model endpoint is reachable.
#[derive(Debug, Default, Clone)]
pub struct RuleBasedGenerator;

#[async_trait]
impl TextGenerator for RuleBasedGenerator {
    fn id(&self) -> &str {
        "rules"
    }

    fn is_generative(&self) -> bool {
        false
    }

    async fn generate(&self, prompt: &str, _system: Option<&str>) -> Result<String, SupportError> {
        Ok(respond(prompt))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_greeting_matches_whole_words_only() {
        assert!(respond("Hi there").starts_with("Hello! I'm your support assistant"));
        // "this" contains "hi" but is not a greeting.
        assert!(respond("this thing").starts_with("I understand you need assistance"));
    }

    #[test]
    fn test_capabilities() {
        assert!(respond("What can you do?").starts_with("I can help with technical support"));
    }

    #[test]
    fn test_rule_order() {
        // Network is checked before account.
        assert!(respond("wifi password").contains("network connectivity issues"));
        assert!(respond("Cannot download the update").starts_with("For installation issues"));
        assert!(respond("locked out of my account").starts_with("For account issues"));
    }

    #[tokio::test]
    async fn test_generator_is_not_generative() {
        let g = RuleBasedGenerator;
        assert!(!g.is_generative());
        assert_eq!(g.id(), "rules");
        let out = g.generate("hello", None).await.unwrap();
        assert!(out.starts_with("Hello!"));
    }
}
