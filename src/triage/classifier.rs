// src/triage/classifier.rs — TF-IDF + multinomial naive Bayes ticket classifier

use std::collections::BTreeMap;

use crate::core::types::category;
use crate::infra::config::ClassifierConfig;
use crate::infra::errors::SupportError;
use crate::knowledge::tfidf::TfidfVectorizer;
use crate::store::Repository;

/// Laplace smoothing.
const ALPHA: f64 = 1.0;

/// One sample issue per canonical category, used when the store is too small
/// to train on.
const PRESET_CORPUS: &[(&str, &str)] = &[
    (
        category::SOFTWARE,
        "I've been trying to install the latest update for your design software for hours. It keeps failing at 75% with an 'unknown error.'",
    ),
    (
        category::NETWORK,
        "I'm having an issue where my app keeps saying 'no internet connection,' but my Wi-Fi is working fine. Other apps load normally.",
    ),
    (
        category::DEVICE,
        "Your smart home app crashes every time I try to connect my older thermostat model. It worked fine on my old phone!",
    ),
    (
        category::ACCOUNT,
        "My project data isn't syncing between my laptop and tablet. Changes on one device don't show up on the other.",
    ),
    (
        category::PAYMENT,
        "Your API is rejecting our payment gateway integration. Error: 'Invalid SSL certificate.' Our cert is valid and up-to-date!",
    ),
];

const VARIATIONS_PER_SAMPLE: usize = 3;

#[derive(Debug, Clone)]
struct NaiveBayesModel {
    vectorizer: TfidfVectorizer,
    /// Sorted class labels.
    classes: Vec<String>,
    class_log_prior: Vec<f64>,
    /// `[class][term]` log-probabilities.
    feature_log_prob: Vec<Vec<f64>>,
}

impl NaiveBayesModel {
    fn fit(
        descriptions: &[String],
        labels: &[String],
        max_features: usize,
    ) -> Result<Self, SupportError> {
        let vectorizer = TfidfVectorizer::fit(descriptions, Some(max_features))?;
        let n_terms = vectorizer.vocabulary_len();

        let mut per_class: BTreeMap<&str, (usize, Vec<f64>)> = BTreeMap::new();
        for (text, label) in descriptions.iter().zip(labels) {
            let entry = per_class
                .entry(label.as_str())
                .or_insert_with(|| (0, vec![0.0; n_terms]));
            entry.0 += 1;
            for (idx, w) in vectorizer.transform(text).entries {
                entry.1[idx] += f64::from(w);
            }
        }

        let n_docs = descriptions.len() as f64;
        let mut classes = Vec::with_capacity(per_class.len());
        let mut class_log_prior = Vec::with_capacity(per_class.len());
        let mut feature_log_prob = Vec::with_capacity(per_class.len());
        for (label, (count, feature_counts)) in per_class {
            let total: f64 = feature_counts.iter().sum::<f64>() + ALPHA * n_terms as f64;
            classes.push(label.to_string());
            class_log_prior.push((count as f64 / n_docs).ln());
            feature_log_prob.push(
                feature_counts
                    .iter()
                    .map(|c| ((c + ALPHA) / total).ln())
                    .collect(),
            );
        }

        Ok(Self {
            vectorizer,
            classes,
            class_log_prior,
            feature_log_prob,
        })
    }

    fn predict(&self, description: &str) -> Option<&str> {
        let x = self.vectorizer.transform(description);
        let mut best: Option<(usize, f64)> = None;
        for (c, prior) in self.class_log_prior.iter().enumerate() {
            let weights = self.feature_log_prob.get(c)?;
            let score = prior
                + x.entries
                    .iter()
                    .map(|(idx, w)| f64::from(*w) * weights.get(*idx).copied().unwrap_or(0.0))
                    .sum::<f64>();
            if !score.is_finite() {
                return None;
            }
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((c, score));
            }
        }
        best.and_then(|(c, _)| self.classes.get(c).map(String::as_str))
    }
}

/// Free-text issue classifier. Untrained, it answers "General Technical Issue".
#[derive(Debug, Clone)]
pub struct TicketClassifier {
    model: Option<NaiveBayesModel>,
    max_features: usize,
}

impl TicketClassifier {
    pub fn new(max_features: usize) -> Self {
        Self {
            model: None,
            max_features,
        }
    }

    pub fn is_trained(&self) -> bool {
        self.model.is_some()
    }

    /// Train on parallel lists. On error the previous model is kept.
    pub fn train(&mut self, descriptions: &[String], labels: &[String]) -> Result<(), SupportError> {
        if descriptions.is_empty() {
            return Err(SupportError::Classifier("no training samples".into()));
        }
        if descriptions.len() != labels.len() {
            return Err(SupportError::Classifier(format!(
                "{} descriptions but {} labels",
                descriptions.len(),
                labels.len()
            )));
        }

        let model = NaiveBayesModel::fit(descriptions, labels, self.max_features)?;
        tracing::info!(
            "Classifier trained on {} samples, {} categories",
            descriptions.len(),
            model.classes.len()
        );
        self.model = Some(model);
        Ok(())
    }

    /// Predicted category; never fails.
    pub fn predict_category(&self, description: &str) -> String {
        let Some(model) = &self.model else {
            return category::GENERAL_ISSUE.to_string();
        };
        match model.predict(description) {
            Some(label) => label.to_string(),
            None => {
                tracing::warn!("Classifier produced no usable score, using fallback category");
                category::GENERAL_ISSUE.to_string()
            }
        }
    }

    /// Train from stored tickets when there are enough of them, otherwise
    /// from the preset corpus.
    pub fn bootstrap(repo: &dyn Repository, config: &ClassifierConfig) -> Self {
        let mut classifier = Self::new(config.max_features);

        match repo.list_tickets() {
            Ok(tickets) if tickets.len() >= config.min_training_tickets => {
                let descriptions: Vec<String> =
                    tickets.iter().map(|t| t.description.clone()).collect();
                let labels: Vec<String> = tickets.iter().map(|t| t.category.clone()).collect();
                match classifier.train(&descriptions, &labels) {
                    Ok(()) => return classifier,
                    Err(e) => tracing::warn!("Training on stored tickets failed: {e}"),
                }
            }
            Ok(_) => {}
            Err(e) => tracing::error!("Could not load tickets for training: {e}"),
        }

        let (descriptions, labels) = preset_training_data();
        if let Err(e) = classifier.train(&descriptions, &labels) {
            tracing::error!("Training on preset corpus failed: {e}");
        }
        classifier
    }
}

/// Preset samples plus word-drop variations of each.
pub fn preset_training_data() -> (Vec<String>, Vec<String>) {
    let mut descriptions = Vec::new();
    let mut labels = Vec::new();

    for (label, text) in PRESET_CORPUS {
        descriptions.push(text.to_string());
        labels.push(label.to_string());

        let words: Vec<&str> = text.split_whitespace().collect();
        if words.len() <= 8 {
            continue;
        }
        for k in 0..VARIATIONS_PER_SAMPLE {
            let (drop_a, drop_b) = (2 * k + 1, words.len() - 1 - k);
            let variation: Vec<&str> = words
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != drop_a && *i != drop_b)
                .map(|(_, w)| *w)
                .collect();
            descriptions.push(variation.join(" "));
            labels.push(label.to_string());
        }
    }

    (descriptions, labels)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn preset_classifier() -> TicketClassifier {
        let mut c = TicketClassifier::new(1000);
        let (d, l) = preset_training_data();
        c.train(&d, &l).unwrap();
        c
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_untrained_returns_fallback() {
        let c = TicketClassifier::new(1000);
        assert!(!c.is_trained());
        assert_eq!(c.predict_category("anything"), category::GENERAL_ISSUE);
    }

    #[test]
    fn test_preset_data_has_variations() {
        let (d, l) = preset_training_data();
        assert_eq!(d.len(), 20);
        assert_eq!(d.len(), l.len());
        assert!(d[1].split_whitespace().count() < d[0].split_whitespace().count());
    }

    #[test]
    fn test_preset_classifier_recognises_categories() {
        let c = preset_classifier();
        assert_eq!(
            c.predict_category("The installer keeps failing with an unknown error during the update"),
            category::SOFTWARE
        );
        assert_eq!(
            c.predict_category("payment gateway rejects our SSL certificate"),
            category::PAYMENT
        );
        assert_eq!(
            c.predict_category("no internet connection but wi-fi is working"),
            category::NETWORK
        );
    }

    #[test]
    fn test_train_rejects_mismatched_input_and_keeps_model() {
        let mut c = preset_classifier();
        let err = c.train(&strings(&["one", "two"]), &strings(&["A"]));
        assert!(err.is_err());
        assert!(c.is_trained());
        assert!(c.train(&[], &[]).is_err());
    }

    #[test]
    fn test_train_tolerates_duplicates() {
        let mut c = TicketClassifier::new(1000);
        let d = strings(&["router down", "router down", "password reset"]);
        let l = strings(&["Net", "Net", "Acct"]);
        c.train(&d, &l).unwrap();
        assert_eq!(c.predict_category("my router is down"), "Net");
        assert_eq!(c.predict_category("password reset please"), "Acct");
    }

    #[test]
    fn test_unknown_vocabulary_uses_prior() {
        let mut c = TicketClassifier::new(1000);
        let d = strings(&["router down", "router slow", "password reset"]);
        let l = strings(&["Net", "Net", "Acct"]);
        c.train(&d, &l).unwrap();
        assert_eq!(c.predict_category("zzz qqq"), "Net");
    }
}
