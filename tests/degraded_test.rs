// tests/degraded_test.rs — Integration test: desk behaviour when persistence fails

use std::sync::Arc;

use chrono::{DateTime, Utc};

use ticketpilot::chat::session::ChatState;
use ticketpilot::core::desk::SupportDesk;
use ticketpilot::core::resolution::SolutionSource;
use ticketpilot::core::types::{
    category, ChatTurn, ConversationMessage, Feedback, KbEntry, Priority, ResolutionStatus,
    Sender, Sentiment, Solution, Team, Ticket, TicketStatus,
};
use ticketpilot::generator::Generation;
use ticketpilot::infra::config::Config;
use ticketpilot::store::Repository;

/// A repository whose every call fails, as with a locked or corrupt database.
struct FailingRepository;

fn unavailable<T>() -> anyhow::Result<T> {
    Err(anyhow::anyhow!("database is locked"))
}

impl Repository for FailingRepository {
    fn insert_ticket(&self, _ticket: &Ticket, _opening_message: &str) -> anyhow::Result<()> {
        unavailable()
    }
    fn get_ticket(&self, _ticket_id: &str) -> anyhow::Result<Option<Ticket>> {
        unavailable()
    }
    fn ticket_exists(&self, _ticket_id: &str) -> anyhow::Result<bool> {
        unavailable()
    }
    fn list_tickets(&self) -> anyhow::Result<Vec<Ticket>> {
        unavailable()
    }
    fn count_tickets(&self) -> anyhow::Result<usize> {
        unavailable()
    }
    fn resolve_ticket(
        &self,
        _ticket_id: &str,
        _resolution: &str,
        _resolved_at: DateTime<Utc>,
    ) -> anyhow::Result<bool> {
        unavailable()
    }
    fn escalate_ticket(&self, _ticket_id: &str, _system_message: &str) -> anyhow::Result<bool> {
        unavailable()
    }
    fn append_message(
        &self,
        _ticket_id: &str,
        _sender: Sender,
        _message: &str,
    ) -> anyhow::Result<ConversationMessage> {
        unavailable()
    }
    fn conversation(&self, _ticket_id: &str) -> anyhow::Result<Vec<ConversationMessage>> {
        unavailable()
    }
    fn solutions_for_category(&self, _category: &str) -> anyhow::Result<Vec<Solution>> {
        unavailable()
    }
    fn all_solutions(&self) -> anyhow::Result<Vec<Solution>> {
        unavailable()
    }
    fn count_solutions(&self) -> anyhow::Result<usize> {
        unavailable()
    }
    fn insert_solution(&self, _solution: &Solution) -> anyhow::Result<i64> {
        unavailable()
    }
    fn insert_solutions_if_empty(&self, _solutions: &[Solution]) -> anyhow::Result<usize> {
        unavailable()
    }
    fn revise_solution_by_text(
        &self,
        _solution_text: &str,
        _revise: &dyn Fn(&Solution) -> Solution,
    ) -> anyhow::Result<Option<Solution>> {
        unavailable()
    }
    fn insert_feedback(
        &self,
        _ticket_id: &str,
        _rating: u8,
        _comment: Option<&str>,
    ) -> anyhow::Result<Feedback> {
        unavailable()
    }
    fn feedback_for_ticket(&self, _ticket_id: &str) -> anyhow::Result<Vec<Feedback>> {
        unavailable()
    }
    fn insert_kb_entry(&self, _entry: &KbEntry) -> anyhow::Result<Option<i64>> {
        unavailable()
    }
    fn kb_entries_for_category(&self, _category: &str) -> anyhow::Result<Vec<KbEntry>> {
        unavailable()
    }
}

fn degraded_desk() -> SupportDesk {
    SupportDesk::new(
        &Config::default(),
        Arc::new(FailingRepository),
        Generation::rule_based(),
    )
}

fn detached_ticket() -> Ticket {
    let now = Utc::now();
    Ticket {
        ticket_id: "TECH_500".into(),
        category: category::NETWORK.into(),
        sentiment: Sentiment::Neutral,
        priority: Priority::Medium,
        description: "Wifi drops every hour".into(),
        status: TicketStatus::Open,
        resolution: None,
        resolution_status: ResolutionStatus::Pending,
        resolution_date: None,
        summary: String::new(),
        extracted_actions: String::new(),
        estimated_resolution_hours: 6.0,
        team: Team::Network,
        created_at: now,
        updated_at: now,
    }
}

#[tokio::test]
async fn test_classification_needs_no_storage() {
    let desk = degraded_desk();
    let c = desk
        .classify("My app keeps saying no internet connection")
        .await;
    assert_eq!(c.category, category::NETWORK);
    assert!(!c.summary.is_empty());
}

#[tokio::test]
async fn test_ticket_operations_report_failure() {
    let desk = degraded_desk();
    assert!(desk.create_ticket("Printer offline", None).await.is_none());
    assert!(desk.get_ticket("TECH_500").is_none());
    assert!(desk.list_tickets().is_empty());
    assert!(desk.stats().is_none());
    assert!(!desk.resolve_ticket("TECH_500", "Rebooted"));
    assert!(!desk.process_feedback("TECH_500", 5, None));
    assert!(desk.submit_feedback("TECH_500", 5, None).is_none());
    assert!(desk.conversation_health("TECH_500").is_none());
    assert!(desk
        .handle_ticket_message("TECH_500", Sender::User, "hello")
        .await
        .is_none());
    assert!(desk.seed_knowledge_base().is_err());
}

#[tokio::test]
async fn test_generated_solution_not_persisted() {
    let desk = degraded_desk();
    let suggestions = desk.suggest_solutions(&detached_ticket()).await;
    assert_eq!(suggestions.len(), 1);
    let s = &suggestions[0];
    assert_eq!(s.source, SolutionSource::Generated);
    assert!(s.solution.id.is_none());
    assert_eq!(s.solution.usage_count, 0);
    assert!(s.solution.solution_text.contains("network connectivity"));
}

#[tokio::test]
async fn test_chat_reports_ticket_failure() {
    let desk = degraded_desk();
    let mut history = Vec::new();
    for message in ["hello", "1", "Wifi drops every hour", "no"] {
        let reply = desk.respond_to_query(message, &history, "s").await;
        history.push(ChatTurn::user(message));
        history.push(ChatTurn::agent(reply.response));
    }

    let reply = desk.respond_to_query("none", &history, "s").await;
    assert!(reply.create_ticket);
    assert!(reply.ticket_id.is_none());
    assert_eq!(reply.state, ChatState::Closing);
    assert!(reply.response.starts_with("I'm sorry, there was an issue creating your ticket."));
}
