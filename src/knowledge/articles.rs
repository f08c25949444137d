// src/knowledge/articles.rs — Knowledge-base articles grown from resolved tickets

use std::collections::HashSet;

use chrono::Utc;

use crate::core::types::{ConversationMessage, KbEntry, ResolutionStatus, Sender, Ticket};

/// Lowest rating that turns a resolved ticket into an article.
pub const MIN_ARTICLE_RATING: u8 = 4;

/// Articles put in front of the other suggestions.
pub const MAX_SUGGESTED_ARTICLES: usize = 2;

/// Success rate reported for article suggestions.
pub const ARTICLE_SUCCESS_RATE: f64 = 0.9;

const TITLE_SUMMARY_CHARS: usize = 50;
const EXCERPT_CHARS: usize = 300;
const MAX_DESCRIPTION_TAGS: usize = 5;
const TAG_STOPWORDS: &[&str] = &["this", "that", "with", "have", "from"];

/// Lower-cased alphabetic runs of at least `min_len` letters.
fn alpha_words(text: &str, min_len: usize) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_ascii_alphabetic())
        .filter(move |w| w.len() >= min_len)
        .map(str::to_lowercase)
}

/// Build an article from a resolved ticket. `None` unless the ticket is
/// resolved with a resolution text and has an opening user message.
pub fn from_resolved_ticket(ticket: &Ticket, messages: &[ConversationMessage]) -> Option<KbEntry> {
    if ticket.resolution_status != ResolutionStatus::Resolved {
        return None;
    }
    let solution = ticket.resolution.as_deref().filter(|r| !r.trim().is_empty())?;
    let problem = messages
        .iter()
        .find(|m| m.sender == Sender::User)
        .map(|m| m.message.as_str())?;

    let summary: String = problem
        .lines()
        .next()
        .unwrap_or_default()
        .chars()
        .take(TITLE_SUMMARY_CHARS)
        .collect();
    let title = format!("{}: {summary}", ticket.category);
    let content = format!(
        "# {title}\n\n## Problem Description\n{problem}\n\n## Solution\n{solution}\n\n\
         ## Additional Information\n- Category: {}\n- Priority: {}\n- Resolution Time: {:.1} hours",
        ticket.category,
        ticket.priority.as_str(),
        ticket.estimated_resolution_hours
    );

    let mut seen = HashSet::new();
    let mut tags = vec![ticket.category.clone()];
    tags.extend(
        alpha_words(problem, 4)
            .filter(|w| !TAG_STOPWORDS.contains(&w.as_str()))
            .filter(|w| seen.insert(w.clone()))
            .take(MAX_DESCRIPTION_TAGS),
    );

    Some(KbEntry {
        id: None,
        title,
        content,
        category: ticket.category.clone(),
        tags,
        source_ticket_id: Some(ticket.ticket_id.clone()),
        created_at: Utc::now(),
    })
}

/// Keyword overlap of an article with an issue description. Title words
/// weigh three, tags two, content words one.
pub fn relevance(description: &str, entry: &KbEntry) -> usize {
    let words: HashSet<String> = alpha_words(description, 3).collect();
    let title: HashSet<String> = alpha_words(&entry.title, 3).collect();
    let content: HashSet<String> = alpha_words(&entry.content, 3).collect();
    let lowered = description.to_lowercase();
    let tag_hits = entry
        .tags
        .iter()
        .filter(|t| lowered.contains(&t.to_lowercase()))
        .count();

    words.intersection(&title).count() * 3 + words.intersection(&content).count() + tag_hits * 2
}

/// Up to `limit` articles sharing at least one keyword with the description,
/// best first. Ties keep the input order.
pub fn find_for_issue(description: &str, entries: Vec<KbEntry>, limit: usize) -> Vec<KbEntry> {
    let mut scored: Vec<(usize, KbEntry)> = entries
        .into_iter()
        .map(|e| (relevance(description, &e), e))
        .filter(|(score, _)| *score > 0)
        .collect();
    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored.into_iter().take(limit).map(|(_, e)| e).collect()
}

/// Suggestion text pointing at an article.
pub fn suggestion_text(entry: &KbEntry) -> String {
    let excerpt: String = entry.content.chars().take(EXCERPT_CHARS).collect();
    format!(
        "Based on our knowledge base: {}\n\n{excerpt}...\n\nYou can view the full solution in our knowledge base.",
        entry.title
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{category, Priority, Sentiment, Team, TicketStatus};

    fn resolved_ticket() -> Ticket {
        let now = Utc::now();
        Ticket {
            ticket_id: "TECH_300".into(),
            category: category::NETWORK.into(),
            sentiment: Sentiment::Neutral,
            priority: Priority::High,
            description: "Router drops the connection every evening".into(),
            status: TicketStatus::Closed,
            resolution: Some("Update the router firmware".into()),
            resolution_status: ResolutionStatus::Resolved,
            resolution_date: Some(now),
            summary: String::new(),
            extracted_actions: String::new(),
            estimated_resolution_hours: 6.0,
            team: Team::Network,
            created_at: now,
            updated_at: now,
        }
    }

    fn message(sender: Sender, text: &str) -> ConversationMessage {
        ConversationMessage {
            id: 1,
            ticket_id: "TECH_300".into(),
            sender,
            message: text.into(),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_article_from_resolved_ticket() {
        let messages = vec![
            message(Sender::User, "Router drops the connection every evening\nIt started Monday"),
            message(Sender::Agent, "Try a reboot"),
        ];
        let entry = from_resolved_ticket(&resolved_ticket(), &messages).unwrap();

        assert_eq!(
            entry.title,
            "Network Connectivity Issue: Router drops the connection every evening"
        );
        assert!(entry.content.contains("## Solution\nUpdate the router firmware"));
        assert!(entry.content.contains("- Priority: High"));
        assert_eq!(entry.source_ticket_id.as_deref(), Some("TECH_300"));
        assert_eq!(
            entry.tags,
            vec![category::NETWORK, "router", "drops", "connection", "every", "evening"]
        );
    }

    #[test]
    fn test_no_article_without_resolution() {
        let messages = vec![message(Sender::User, "Router drops")];
        let mut pending = resolved_ticket();
        pending.resolution_status = ResolutionStatus::Pending;
        assert!(from_resolved_ticket(&pending, &messages).is_none());

        let mut empty = resolved_ticket();
        empty.resolution = Some("  ".into());
        assert!(from_resolved_ticket(&empty, &messages).is_none());

        let agent_only = vec![message(Sender::Agent, "Hello")];
        assert!(from_resolved_ticket(&resolved_ticket(), &agent_only).is_none());
    }

    fn entry(title: &str, content: &str, tags: &[&str]) -> KbEntry {
        KbEntry {
            id: None,
            title: title.into(),
            content: content.into(),
            category: category::NETWORK.into(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            source_ticket_id: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_relevance_weights_title_over_content() {
        let e = entry("Router firmware", "Open the admin page", &["vpn"]);
        assert_eq!(relevance("router keeps rebooting", &e), 3);
        assert_eq!(relevance("cannot open admin", &e), 2);
        assert_eq!(relevance("vpn is slow", &e), 2);
        assert_eq!(relevance("printer jam", &e), 0);
    }

    #[test]
    fn test_find_for_issue_best_first_and_limited() {
        let entries = vec![
            entry("Printer jam", "Clear the tray", &[]),
            entry("Slow wifi", "Move closer to the router", &[]),
            entry("Router firmware", "Update the router", &[]),
            entry("Router reboot", "Power cycle", &[]),
        ];
        let found = find_for_issue("my router is slow", entries, MAX_SUGGESTED_ARTICLES);
        let titles: Vec<&str> = found.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["Slow wifi", "Router firmware"]);
    }

    #[test]
    fn test_suggestion_text_truncates_content() {
        let e = entry("Long", &"x".repeat(400), &[]);
        let text = suggestion_text(&e);
        assert!(text.starts_with("Based on our knowledge base: Long\n\n"));
        assert!(text.contains(&format!("{}...", "x".repeat(300))));
        assert!(!text.contains(&"x".repeat(301)));
    }
}
