// src/chat/session.rs — Per-session conversation state

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatState {
    #[default]
    Greeting,
    CategorySelection,
    IssueDescription,
    SolutionProvided,
    FeedbackReceived,
    Closing,
    Closed,
}

impl ChatState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatState::Greeting => "greeting",
            ChatState::CategorySelection => "category_selection",
            ChatState::IssueDescription => "issue_description",
            ChatState::SolutionProvided => "solution_provided",
            ChatState::FeedbackReceived => "feedback_received",
            ChatState::Closing => "closing",
            ChatState::Closed => "closed",
        }
    }
}

/// Customer's answer to "did these steps resolve your issue?".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolutionOutcome {
    Resolved,
    Unresolved,
}

#[derive(Debug, Clone, Default)]
pub struct ConversationSession {
    pub state: ChatState,
    pub selected_category: Option<String>,
    pub issue_description: Option<String>,
    pub ticket_id: Option<String>,
    pub feedback: Option<SolutionOutcome>,
    pub solution_provided: bool,
    pub feedback_requested: bool,
    pub create_ticket: bool,
    pub conversation_ending: bool,
}

impl ConversationSession {
    /// Fresh record parked in `closing`, waiting for "anything else?".
    pub fn closing(ticket_id: Option<String>) -> Self {
        Self {
            state: ChatState::Closing,
            ticket_id,
            conversation_ending: true,
            ..Self::default()
        }
    }

    /// Forget the current issue but keep the ticket reference.
    pub fn clear_issue(&mut self) {
        self.selected_category = None;
        self.issue_description = None;
    }
}

/// In-memory session registry. Each session has its own async mutex, held
/// for a whole turn; different sessions never block each other.
#[derive(Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<String, SessionEntry>>,
}

struct SessionEntry {
    session: Arc<tokio::sync::Mutex<ConversationSession>>,
    last_seen: Instant,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle for `session_id`, created on first use.
    pub fn session(&self, session_id: &str) -> Arc<tokio::sync::Mutex<ConversationSession>> {
        let mut sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        let entry = sessions
            .entry(session_id.to_string())
            .or_insert_with(|| SessionEntry {
                session: Arc::default(),
                last_seen: Instant::now(),
            });
        entry.last_seen = Instant::now();
        Arc::clone(&entry.session)
    }

    /// Drop sessions untouched for longer than `max_idle`. Sessions in the
    /// middle of a turn are kept. Returns how many were removed.
    pub fn evict_idle(&self, max_idle: Duration) -> usize {
        let mut sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        let before = sessions.len();
        sessions.retain(|_, entry| {
            entry.last_seen.elapsed() <= max_idle || entry.session.try_lock().is_err()
        });
        before - sessions.len()
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current state of a session, if it exists and is not mid-turn.
    pub fn peek_state(&self, session_id: &str) -> Option<ChatState> {
        let handle = {
            let sessions = self.sessions.lock().ok()?;
            Arc::clone(&sessions.get(session_id)?.session)
        };
        let session = handle.try_lock().ok()?;
        Some(session.state)
    }
}
