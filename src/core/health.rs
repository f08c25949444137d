// src/core/health.rs — Conversation health scoring

use serde::Serialize;

use super::types::{ConversationMessage, Sender, Sentiment};
use crate::triage::sentiment;

const BASELINE: i32 = 70;
const FAST_RESPONSE_SECS: f64 = 30.0;
const SLOW_RESPONSE_SECS: f64 = 120.0;
const RECENT_USER_MESSAGES: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthMetrics {
    pub total_messages: usize,
    pub user_messages: usize,
    pub agent_messages: usize,
    /// Mean seconds between a user message and the agent reply that follows it.
    pub avg_response_secs: f64,
    /// Sentiment of the latest user message.
    pub user_sentiment: Sentiment,
    /// Sentiments of the last few user messages, oldest first.
    pub sentiment_timeline: Vec<Sentiment>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthReport {
    /// 0-100.
    pub score: u8,
    pub metrics: Option<HealthMetrics>,
    pub suggestions: Vec<String>,
}

pub fn analyze_conversation(history: &[ConversationMessage]) -> HealthReport {
    if history.is_empty() {
        return HealthReport {
            score: 0,
            metrics: None,
            suggestions: Vec::new(),
        };
    }

    let user: Vec<&ConversationMessage> =
        history.iter().filter(|m| m.sender == Sender::User).collect();
    let agent_messages = history.iter().filter(|m| m.sender == Sender::Agent).count();

    let response_times: Vec<f64> = history
        .windows(2)
        .filter(|w| w[0].sender == Sender::User && w[1].sender == Sender::Agent)
        .map(|w| (w[1].timestamp - w[0].timestamp).num_milliseconds() as f64 / 1000.0)
        .collect();
    let avg_response_secs = if response_times.is_empty() {
        0.0
    } else {
        response_times.iter().sum::<f64>() / response_times.len() as f64
    };

    let recent = &user[user.len().saturating_sub(RECENT_USER_MESSAGES)..];
    let sentiment_timeline: Vec<Sentiment> = recent
        .iter()
        .map(|m| sentiment::analyze(&m.message).sentiment)
        .collect();

    let metrics = HealthMetrics {
        total_messages: history.len(),
        user_messages: user.len(),
        agent_messages,
        avg_response_secs,
        user_sentiment: sentiment_timeline.last().copied().unwrap_or(Sentiment::Neutral),
        sentiment_timeline,
    };

    let score = health_score(&metrics);
    HealthReport {
        score,
        suggestions: suggestions(&metrics, score),
        metrics: Some(metrics),
    }
}

fn health_score(m: &HealthMetrics) -> u8 {
    let mut score = BASELINE;

    if m.avg_response_secs > 0.0 {
        if m.avg_response_secs < FAST_RESPONSE_SECS {
            score += 10;
        } else if m.avg_response_secs > SLOW_RESPONSE_SECS {
            score -= 10;
        }
    }

    if m.user_sentiment == Sentiment::Satisfied {
        score += 15;
    } else if m.user_sentiment.is_negative() {
        score -= 15;
    }

    if m.user_messages > 0 && m.agent_messages > 0 {
        let ratio = m.agent_messages as f64 / m.user_messages as f64;
        if (0.8..=1.2).contains(&ratio) {
            score += 5;
        } else if ratio < 0.5 {
            score -= 10;
        }
    }

    score.clamp(0, 100) as u8
}

fn suggestions(m: &HealthMetrics, score: u8) -> Vec<String> {
    let mut out = Vec::new();
    if score < 40 {
        out.push("Critical: Consider immediate supervisor review of this conversation");
    }
    if m.avg_response_secs > SLOW_RESPONSE_SECS {
        out.push("Improve response time - current average is too high");
    }
    if m.user_sentiment.is_negative() {
        out.push("Address customer's emotional state - they seem unhappy");
    }
    if m.user_messages > m.agent_messages * 2 {
        out.push("Increase engagement - customer is sending more messages than agent");
    }
    if out.is_empty() {
        out.push(if score > 80 {
            "Excellent conversation! Consider using as a training example"
        } else {
            "Conversation is adequate, but could be improved with more personalization"
        });
    }
    out.into_iter().map(String::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn msg(id: i64, sender: Sender, text: &str, secs: i64) -> ConversationMessage {
        ConversationMessage {
            id,
            ticket_id: "TECH_200".into(),
            sender,
            message: text.into(),
            timestamp: Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap() + Duration::seconds(secs),
        }
    }

    #[test]
    fn test_empty_conversation() {
        let r = analyze_conversation(&[]);
        assert_eq!(r.score, 0);
        assert!(r.metrics.is_none());
        assert!(r.suggestions.is_empty());
    }

    #[test]
    fn test_fast_balanced_happy_conversation() {
        let history = vec![
            msg(1, Sender::User, "My sync is stuck", 0),
            msg(2, Sender::Agent, "Try a full sync", 10),
            msg(3, Sender::User, "Great, happy now, excellent help", 60),
            msg(4, Sender::Agent, "Glad to help", 70),
        ];
        let r = analyze_conversation(&history);
        // 70 + 10 (fast) + 15 (satisfied) + 5 (balanced)
        assert_eq!(r.score, 100);
        assert_eq!(
            r.suggestions,
            vec!["Excellent conversation! Consider using as a training example"]
        );
        let m = r.metrics.unwrap();
        assert!((m.avg_response_secs - 10.0).abs() < 1e-9);
        assert_eq!(m.user_sentiment, Sentiment::Satisfied);
    }

    #[test]
    fn test_slow_unanswered_angry_conversation() {
        let history = vec![
            msg(1, Sender::User, "hello?", 0),
            msg(2, Sender::Agent, "Looking into it", 300),
            msg(3, Sender::User, "anyone?", 400),
            msg(4, Sender::User, "still waiting", 500),
            msg(5, Sender::User, "This is terrible, awful and useless", 600),
        ];
        let r = analyze_conversation(&history);
        // 70 - 10 (slow) - 15 (frustrated) - 10 (ratio 0.25)
        assert_eq!(r.score, 35);
        assert_eq!(r.suggestions.len(), 4);
        assert!(r.suggestions[0].starts_with("Critical"));
        let m = r.metrics.unwrap();
        assert_eq!(m.sentiment_timeline.len(), 3);
    }

    #[test]
    fn test_adequate_conversation() {
        let history = vec![
            msg(1, Sender::User, "Printer offline", 0),
            msg(2, Sender::Agent, "Check the cable", 60),
        ];
        let r = analyze_conversation(&history);
        assert_eq!(r.score, 75);
        assert_eq!(
            r.suggestions,
            vec!["Conversation is adequate, but could be improved with more personalization"]
        );
    }
}
