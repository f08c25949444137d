// src/core/escalation.rs — Human-escalation decision

use serde::Serialize;

use super::types::{ConversationMessage, Priority, Ticket};

const ESCALATION_KEYWORDS: &[&str] = &[
    "manager",
    "supervisor",
    "lawsuit",
    "legal",
    "compensation",
    "refund",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EscalationDecision {
    pub escalate: bool,
    pub reason: String,
}

impl EscalationDecision {
    fn yes(reason: impl Into<String>) -> Self {
        Self {
            escalate: true,
            reason: reason.into(),
        }
    }
}

pub struct EscalationAgent {
    max_exchanges: usize,
}

impl EscalationAgent {
    pub fn new(max_exchanges: usize) -> Self {
        Self { max_exchanges }
    }

    /// Checked in order: critical priority, a long conversation, then
    /// escalation keywords in the description.
    pub fn should_escalate(
        &self,
        ticket: &Ticket,
        history: &[ConversationMessage],
    ) -> EscalationDecision {
        if ticket.priority == Priority::Critical {
            return EscalationDecision::yes("Critical priority issue requires immediate attention");
        }

        if history.len() > self.max_exchanges {
            return EscalationDecision::yes("Multiple attempts to resolve without success");
        }

        let description = ticket.description.to_lowercase();
        if let Some(keyword) = ESCALATION_KEYWORDS
            .iter()
            .find(|k| description.contains(*k))
        {
            return EscalationDecision::yes(format!("Customer mentioned {keyword}"));
        }

        EscalationDecision {
            escalate: false,
            reason: "Automated handling is sufficient".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{
        category, ResolutionStatus, Sender, Sentiment, Team, TicketStatus,
    };
    use chrono::Utc;

    fn ticket(priority: Priority, description: &str) -> Ticket {
        let now = Utc::now();
        Ticket {
            ticket_id: "TECH_500".into(),
            category: category::ACCOUNT.into(),
            sentiment: Sentiment::Neutral,
            priority,
            description: description.into(),
            status: TicketStatus::Open,
            resolution: None,
            resolution_status: ResolutionStatus::Pending,
            resolution_date: None,
            summary: String::new(),
            extracted_actions: String::new(),
            estimated_resolution_hours: 1.0,
            team: Team::Account,
            created_at: now,
            updated_at: now,
        }
    }

    fn history(n: usize) -> Vec<ConversationMessage> {
        (0..n)
            .map(|i| ConversationMessage {
                id: i as i64,
                ticket_id: "TECH_500".into(),
                sender: Sender::User,
                message: format!("message {i}"),
                timestamp: Utc::now(),
            })
            .collect()
    }

    #[test]
    fn test_critical_escalates_without_history() {
        let d = EscalationAgent::new(5).should_escalate(&ticket(Priority::Critical, "x"), &[]);
        assert!(d.escalate);
        assert_eq!(d.reason, "Critical priority issue requires immediate attention");
    }

    #[test]
    fn test_long_history_escalates() {
        let agent = EscalationAgent::new(5);
        let d = agent.should_escalate(&ticket(Priority::Low, "sync issue"), &history(6));
        assert!(d.escalate);
        assert_eq!(d.reason, "Multiple attempts to resolve without success");

        let d = agent.should_escalate(&ticket(Priority::Low, "sync issue"), &history(5));
        assert!(!d.escalate);
    }

    #[test]
    fn test_short_history_no_trigger() {
        let d = EscalationAgent::new(5).should_escalate(&ticket(Priority::High, "sync issue"), &history(2));
        assert!(!d.escalate);
        assert_eq!(d.reason, "Automated handling is sufficient");
    }

    #[test]
    fn test_keyword_reports_first_declared() {
        let d = EscalationAgent::new(5).should_escalate(
            &ticket(Priority::Medium, "I want a REFUND or I'll talk to your manager"),
            &[],
        );
        assert!(d.escalate);
        assert_eq!(d.reason, "Customer mentioned manager");
    }
}
