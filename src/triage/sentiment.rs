// src/triage/sentiment.rs — Keyword sentiment scoring

use serde::Serialize;

use crate::core::types::Sentiment;

/// Keyword lexicon per non-neutral label, in tie-break order.
const LEXICONS: &[(Sentiment, &[&str])] = &[
    (
        Sentiment::Frustrated,
        &["frustrated", "annoying", "disappointing", "terrible", "awful", "useless"],
    ),
    (
        Sentiment::Confused,
        &["confused", "confusing", "unsure", "don't understand", "unclear", "lost"],
    ),
    (
        Sentiment::Anxious,
        &["anxious", "worried", "concerned", "nervous", "urgent", "critical"],
    ),
    (
        Sentiment::Annoyed,
        &["annoyed", "irritated", "bothered", "fed up", "tired of", "annoying"],
    ),
    (
        Sentiment::Urgent,
        &["urgent", "emergency", "immediately", "asap", "critical", "serious"],
    ),
    (
        Sentiment::Satisfied,
        &["satisfied", "happy", "pleased", "good", "great", "excellent"],
    ),
];

/// Score Neutral starts with, so a single keyword hit never beats it.
const NEUTRAL_BASELINE: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentimentAnalysis {
    pub sentiment: Sentiment,
    /// 0-100, share of the winning label in the total score.
    pub intensity: u8,
    pub confidence: f64,
}

/// Classify the emotional tone of `text`. Pure and deterministic.
pub fn analyze(text: &str) -> SentimentAnalysis {
    let lowered = text.to_lowercase();

    let mut best = (Sentiment::Neutral, NEUTRAL_BASELINE);
    let mut total = NEUTRAL_BASELINE;

    for (label, keywords) in LEXICONS {
        let score = keywords.iter().filter(|k| lowered.contains(*k)).count() as u32;
        total += score;
        if score > best.1 {
            best = (*label, score);
        }
    }

    let confidence = f64::from(best.1) / f64::from(total);
    SentimentAnalysis {
        sentiment: best.0,
        intensity: (confidence * 100.0).round().min(100.0) as u8,
        confidence,
    }
}
