// src/triage/mod.rs — Ticket classification: category, sentiment, priority, routing

pub mod classifier;
pub mod priority;
pub mod sentiment;

use serde::Serialize;

use crate::core::types::{Priority, Sentiment, Team};
use crate::generator::Generation;
use crate::util::{ellipsize, truncate_chars};
use classifier::TicketClassifier;

const SUMMARY_SYSTEM_PROMPT: &str = "You are an AI assistant that summarizes customer support tickets. \
Create a concise 1-2 sentence summary that captures the main issue. \
Focus on the key problem and what the customer needs.";

const ACTIONS_SYSTEM_PROMPT: &str = "You are an AI assistant that extracts actionable steps from customer support tickets. \
List 1-3 specific actions that support agents need to take to resolve this issue. \
Format as a numbered list. Be specific and concise.";

const MAX_GENERATED_SUMMARY: usize = 200;
const MAX_FALLBACK_SUMMARY: usize = 150;

/// Everything derived from a ticket description at intake.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
    pub category: String,
    pub sentiment: Sentiment,
    pub priority: Priority,
    pub summary: String,
    pub actions: String,
    pub estimated_hours: f64,
    pub team: Team,
    /// 1-10, higher is more urgent.
    pub urgency: u8,
}

pub struct ClassifierAgent {
    classifier: TicketClassifier,
    generation: Generation,
}

impl ClassifierAgent {
    pub fn new(classifier: TicketClassifier, generation: Generation) -> Self {
        Self {
            classifier,
            generation,
        }
    }

    pub fn predict_category(&self, description: &str) -> String {
        self.classifier.predict_category(description)
    }

    pub async fn classify(&self, description: &str) -> Classification {
        self.classify_as(description, None).await
    }

    /// Classify, keeping `category_override` (when given) instead of the predicted category.
    pub async fn classify_as(
        &self,
        description: &str,
        category_override: Option<&str>,
    ) -> Classification {
        let category = match category_override {
            Some(c) => c.to_string(),
            None => self.classifier.predict_category(description),
        };
        let analysis = sentiment::analyze(description);
        let priority = priority::determine_priority(analysis.sentiment, description);

        let summary = self.summarize(description).await;
        let actions = self.extract_actions(description, &category).await;

        tracing::debug!(
            category = %category,
            sentiment = analysis.sentiment.as_str(),
            priority = priority.as_str(),
            "Classified ticket"
        );

        Classification {
            estimated_hours: priority::estimate_resolution_time(&category, description, priority),
            team: priority::assign_team(&category, description),
            urgency: priority::urgency_score(priority, analysis.sentiment),
            sentiment: analysis.sentiment,
            priority,
            summary,
            actions,
            category,
        }
    }

    pub async fn summarize(&self, description: &str) -> String {
        if description.is_empty() {
            return String::new();
        }
        let prompt = format!("Summarize this customer support ticket:\n\n{description}");
        let summary = self
            .generation
            .generate_or_else(&prompt, Some(SUMMARY_SYSTEM_PROMPT), || {
                fallback_summary(description)
            })
            .await;
        if self.generation.is_generative() {
            ellipsize(&summary, MAX_GENERATED_SUMMARY)
        } else {
            summary
        }
    }

    pub async fn extract_actions(&self, description: &str, category: &str) -> String {
        let prompt = format!(
            "Category: {category}\nDescription: {description}\n\nExtract the necessary actions to resolve this support ticket:"
        );
        self.generation
            .generate_or_else(&prompt, Some(ACTIONS_SYSTEM_PROMPT), || {
                fallback_actions(category).to_string()
            })
            .await
    }
}

/// First two sentences, or the first 150 characters of single-sentence text.
pub fn fallback_summary(description: &str) -> String {
    let parts: Vec<&str> = description.split('.').collect();
    if parts.len() > 1 {
        let sentences: Vec<&str> = parts
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .take(2)
            .collect();
        return format!("{}.", sentences.join(". "));
    }
    if description.chars().count() > MAX_FALLBACK_SUMMARY {
        format!("{}...", truncate_chars(description, MAX_FALLBACK_SUMMARY))
    } else {
        description.to_string()
    }
}

pub fn fallback_actions(category: &str) -> &'static str {
    let lowered = category.to_lowercase();
    if lowered.contains("network") {
        "1. Check network connectivity\n2. Verify router settings\n3. Test connection speed"
    } else if lowered.contains("software") {
        "1. Verify software version\n2. Check for updates\n3. Verify system requirements"
    } else if lowered.contains("account") {
        "1. Verify account credentials\n2. Check account permissions\n3. Reset account if needed"
    } else {
        "1. Gather more information\n2. Identify specific issue\n3. Provide solution steps"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::category;

    fn agent() -> ClassifierAgent {
        let mut c = TicketClassifier::new(1000);
        let (d, l) = classifier::preset_training_data();
        c.train(&d, &l).unwrap();
        ClassifierAgent::new(c, Generation::rule_based())
    }

    #[test]
    fn test_fallback_summary_two_sentences() {
        let s = fallback_summary("The app crashes. It happens on start. Every time.");
        assert_eq!(s, "The app crashes. It happens on start.");
    }

    #[test]
    fn test_fallback_summary_single_sentence() {
        assert_eq!(fallback_summary("No dots here"), "No dots here");
        let long = "a".repeat(160);
        let s = fallback_summary(&long);
        assert_eq!(s.len(), 153);
        assert!(s.ends_with("..."));
    }

    #[test]
    fn test_fallback_summary_trailing_period() {
        assert_eq!(fallback_summary("Router is down."), "Router is down.");
    }

    #[test]
    fn test_fallback_actions_by_category() {
        assert!(fallback_actions(category::NETWORK).starts_with("1. Check network"));
        assert!(fallback_actions(category::SOFTWARE).starts_with("1. Verify software"));
        assert!(fallback_actions(category::ACCOUNT).starts_with("1. Verify account"));
        assert!(fallback_actions(category::PAYMENT).starts_with("1. Gather more"));
    }

    #[tokio::test]
    async fn test_classify_with_rules() {
        let c = agent()
            .classify("Your API is rejecting our payment gateway integration. The SSL certificate is valid!")
            .await;
        assert_eq!(c.category, category::PAYMENT);
        assert_eq!(c.team, Team::Payment);
        assert_eq!(c.summary, "Your API is rejecting our payment gateway integration. The SSL certificate is valid!.");
        assert!(c.actions.starts_with("1. Gather more information"));
    }

    #[tokio::test]
    async fn test_classify_override_keeps_category() {
        let c = agent()
            .classify_as("urgent: nothing loads", Some(category::DEVICE))
            .await;
        assert_eq!(c.category, category::DEVICE);
        assert_eq!(c.priority, Priority::Critical);
        assert_eq!(c.estimated_hours, 1.3);
    }
}
