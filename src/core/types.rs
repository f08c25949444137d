// src/core/types.rs — Core data types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Issue categories known to the classifier, the knowledge base and the chat menu.
pub mod category {
    pub const NETWORK: &str = "Network Connectivity Issue";
    pub const SOFTWARE: &str = "Software Installation Failure";
    pub const ACCOUNT: &str = "Account Synchronization Bug";
    pub const PAYMENT: &str = "Payment Gateway Integration Failure";
    pub const DEVICE: &str = "Device Compatibility Error";

    /// Returned by an untrained or failing classifier.
    pub const GENERAL_ISSUE: &str = "General Technical Issue";
    /// Sixth entry of the chat menu.
    pub const GENERAL_SUPPORT: &str = "General Technical Support";
    /// Category that the issue detector treats as "not a technical issue".
    pub const GENERAL_INQUIRY: &str = "General Inquiry";

    pub const CANONICAL: [&str; 5] = [NETWORK, SOFTWARE, ACCOUNT, PAYMENT, DEVICE];

    pub const CHAT_MENU: [&str; 6] = [NETWORK, SOFTWARE, ACCOUNT, PAYMENT, DEVICE, GENERAL_SUPPORT];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    Critical,
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Critical => "Critical",
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Critical" => Some(Priority::Critical),
            "High" => Some(Priority::High),
            "Medium" => Some(Priority::Medium),
            "Low" => Some(Priority::Low),
            _ => None,
        }
    }
}

/// Customer sentiment labels, in tie-break order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sentiment {
    Neutral,
    Frustrated,
    Confused,
    Anxious,
    Annoyed,
    Urgent,
    Satisfied,
}

impl Sentiment {
    pub const ALL: [Sentiment; 7] = [
        Sentiment::Neutral,
        Sentiment::Frustrated,
        Sentiment::Confused,
        Sentiment::Anxious,
        Sentiment::Annoyed,
        Sentiment::Urgent,
        Sentiment::Satisfied,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Neutral => "Neutral",
            Sentiment::Frustrated => "Frustrated",
            Sentiment::Confused => "Confused",
            Sentiment::Anxious => "Anxious",
            Sentiment::Annoyed => "Annoyed",
            Sentiment::Urgent => "Urgent",
            Sentiment::Satisfied => "Satisfied",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|v| v.as_str() == s)
    }

    /// Labels that indicate an unhappy customer.
    pub fn is_negative(&self) -> bool {
        matches!(
            self,
            Sentiment::Frustrated | Sentiment::Annoyed | Sentiment::Urgent
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TicketStatus {
    Open,
    Escalated,
    Closed,
}

impl TicketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Open => "Open",
            TicketStatus::Escalated => "Escalated",
            TicketStatus::Closed => "Closed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Open" => Some(TicketStatus::Open),
            "Escalated" => Some(TicketStatus::Escalated),
            "Closed" => Some(TicketStatus::Closed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResolutionStatus {
    Pending,
    Resolved,
}

impl ResolutionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolutionStatus::Pending => "Pending",
            ResolutionStatus::Resolved => "Resolved",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Pending" => Some(ResolutionStatus::Pending),
            "Resolved" => Some(ResolutionStatus::Resolved),
            _ => None,
        }
    }
}

/// Team a ticket is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Team {
    Payment,
    Network,
    Account,
    Software,
    TechSupport,
}

impl Team {
    pub fn as_str(&self) -> &'static str {
        match self {
            Team::Payment => "PAYMENT",
            Team::Network => "NETWORK",
            Team::Account => "ACCOUNT",
            Team::Software => "SOFTWARE",
            Team::TechSupport => "TECH_SUPPORT",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PAYMENT" => Some(Team::Payment),
            "NETWORK" => Some(Team::Network),
            "ACCOUNT" => Some(Team::Account),
            "SOFTWARE" => Some(Team::Software),
            "TECH_SUPPORT" => Some(Team::TechSupport),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Agent,
    System,
}

impl Sender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Agent => "agent",
            Sender::System => "system",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(Sender::User),
            "agent" => Some(Sender::Agent),
            "system" => Some(Sender::System),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    pub ticket_id: String,
    pub category: String,
    pub sentiment: Sentiment,
    pub priority: Priority,
    pub description: String,
    pub status: TicketStatus,
    pub resolution: Option<String>,
    pub resolution_status: ResolutionStatus,
    pub resolution_date: Option<DateTime<Utc>>,
    pub summary: String,
    pub extracted_actions: String,
    pub estimated_resolution_hours: f64,
    pub team: Team,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub id: i64,
    pub ticket_id: String,
    pub sender: Sender,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// A knowledge-base entry. `id` is `None` until the solution is persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    pub id: Option<i64>,
    pub category: String,
    pub solution_text: String,
    pub success_rate: f64,
    pub usage_count: i64,
}

impl Solution {
    pub fn new(category: &str, solution_text: &str, success_rate: f64, usage_count: i64) -> Self {
        Self {
            id: None,
            category: category.to_string(),
            solution_text: solution_text.to_string(),
            success_rate,
            usage_count,
        }
    }

    /// Fold one more rating (1-5) into the running success rate.
    pub fn with_rating(&self, rating: u8) -> Self {
        let count = self.usage_count as f64;
        let score = f64::from(rating) / 5.0;
        Self {
            success_rate: (self.success_rate * count + score) / (count + 1.0),
            usage_count: self.usage_count + 1,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    pub id: i64,
    pub ticket_id: String,
    pub rating: u8,
    pub comment: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Article distilled from a resolved, well-rated ticket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KbEntry {
    pub id: Option<i64>,
    pub title: String,
    pub content: String,
    pub category: String,
    pub tags: Vec<String>,
    pub source_ticket_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// One element of a caller-supplied chat history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub sender: Sender,
    pub message: String,
}

impl ChatTurn {
    pub fn user(message: impl Into<String>) -> Self {
        Self {
            sender: Sender::User,
            message: message.into(),
        }
    }

    pub fn agent(message: impl Into<String>) -> Self {
        Self {
            sender: Sender::Agent,
            message: message.into(),
        }
    }
}
