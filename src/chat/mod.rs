// src/chat/mod.rs — Conversational intake: a per-session state machine

pub mod phrases;
pub mod session;
pub mod troubleshooting;

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::core::feedback::is_valid_rating;
use crate::core::intake::TicketIntake;
use crate::core::types::{category, ChatTurn};
use crate::generator::Generation;
use crate::triage::ClassifierAgent;
use session::{ChatState, ConversationSession, SessionStore, SolutionOutcome};

const ISSUE_DETECTION_MIN_WORDS: usize = 10;

const FREEFORM_SYSTEM_PROMPT: &str = "You are a helpful AI assistant for a technical support team. \
Be polite, professional and concise. If you don't know something, say so clearly. \
Ask clarifying questions when needed.";

const YOURE_WELCOME: &str =
    "You're welcome! I'm glad I could help. Is there anything else you need assistance with today?";
const FAREWELL: &str = "Thank you for using our AI support chat! Feel free to return anytime you need assistance. Have a great day!";
const ASK_RATING: &str = "Great! I'm glad the issue has been resolved. Is there anything else I can help you with? \
If you have a moment, please rate your experience (1-5 stars).";
const ASK_DETAILS: &str = "I'm sorry those steps didn't resolve your issue. I'll create a support ticket for you so our team can investigate further. \
Is there any additional information you'd like to add to your ticket? (If not, just type 'No additional info')";
const ASK_AGAIN: &str = "I'm not sure if your issue was resolved. Could you please let me know if the troubleshooting steps resolved your issue? \
Please click 'Yes, resolved' if fixed or 'No, still having issues' if you need more help.";
const THANKS_FOR_FEEDBACK: &str = "Thank you for your feedback! Have a great day!";
const TICKET_FAILED: &str = "I'm sorry, there was an issue creating your ticket. Please try again or contact our support team directly.";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatReply {
    pub response: String,
    /// Set when the turn decided a ticket is (or is about to be) created.
    pub create_ticket: bool,
    pub ticket_id: Option<String>,
    pub state: ChatState,
}

fn menu() -> String {
    category::CHAT_MENU
        .iter()
        .enumerate()
        .map(|(i, c)| format!("{}. {c}", i + 1))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Menu entry chosen by number or by name. Names match when the message
/// contains the category name, or when the name contains a message of at
/// least three characters.
pub fn match_category(message: &str) -> Option<&'static str> {
    let trimmed = message.trim();
    if let Ok(n) = trimmed.parse::<usize>() {
        return n
            .checked_sub(1)
            .and_then(|i| category::CHAT_MENU.get(i))
            .copied();
    }

    let input = trimmed.to_lowercase();
    category::CHAT_MENU.iter().copied().find(|c| {
        let name = c.to_lowercase();
        input.contains(&name) || (input.chars().count() >= 3 && name.contains(&input))
    })
}

pub struct ConversationStateMachine {
    classifier: Arc<ClassifierAgent>,
    intake: Arc<TicketIntake>,
    generation: Generation,
    sessions: Arc<SessionStore>,
    session_idle: Duration,
}

impl ConversationStateMachine {
    pub fn new(
        classifier: Arc<ClassifierAgent>,
        intake: Arc<TicketIntake>,
        generation: Generation,
        sessions: Arc<SessionStore>,
        session_idle: Duration,
    ) -> Self {
        Self {
            classifier,
            intake,
            generation,
            sessions,
            session_idle,
        }
    }

    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    /// Handle one user turn. `history` is the conversation so far as seen by
    /// the caller; an empty history starts a new conversation.
    pub async fn respond_to_query(
        &self,
        message: &str,
        history: &[ChatTurn],
        session_id: &str,
    ) -> ChatReply {
        let evicted = self.sessions.evict_idle(self.session_idle);
        if evicted > 0 {
            tracing::debug!(evicted, "Idle chat sessions dropped");
        }
        let handle = self.sessions.session(session_id);
        let mut session = handle.lock().await;
        let reply = self.turn(&mut session, message, history).await;
        tracing::debug!(
            session_id,
            state = reply.state.as_str(),
            create_ticket = reply.create_ticket,
            "Chat turn handled"
        );
        reply
    }

    async fn turn(
        &self,
        s: &mut ConversationSession,
        message: &str,
        history: &[ChatTurn],
    ) -> ChatReply {
        if s.conversation_ending {
            if phrases::is_thanks(message) || phrases::is_no_further_need(message) {
                // Over for the caller; the record stays parked in closing so a
                // later message restarts the conversation.
                return ChatReply {
                    state: ChatState::Closed,
                    ..reply(s, FAREWELL, false)
                };
            }
            s.conversation_ending = false;
            if phrases::wants_more_help(message) {
                s.clear_issue();
                s.state = ChatState::Greeting;
            }
        } else if s.state != ChatState::Greeting && phrases::is_thanks(message) {
            s.conversation_ending = true;
            s.state = ChatState::Closing;
            return reply(s, YOURE_WELCOME, false);
        }

        if history.is_empty() {
            s.state = ChatState::Greeting;
        }

        if s.state == ChatState::Closing {
            if self.is_technical_issue(message) {
                return self.start_from_description(s, message).await;
            }
            s.state = ChatState::Greeting;
        }

        match s.state {
            ChatState::Greeting => {
                if history.len() > 1
                    && message.chars().count() > 3
                    && self.is_technical_issue(message)
                {
                    return self.start_from_description(s, message).await;
                }
                greet(s)
            }
            ChatState::CategorySelection => select_category(s, message),
            ChatState::IssueDescription => self.describe_issue(s, message).await,
            ChatState::SolutionProvided => solution_feedback(s, message),
            ChatState::FeedbackReceived => self.conclude(s, message).await,
            ChatState::Closing | ChatState::Closed => {
                if self.is_technical_issue(message) {
                    *s = ConversationSession::default();
                    return greet(s);
                }
                let response = self
                    .generation
                    .respond(message, Some(FREEFORM_SYSTEM_PROMPT))
                    .await;
                reply(s, &response, false)
            }
        }
    }

    /// Keyword hit, or a long message the classifier can place.
    pub fn is_technical_issue(&self, message: &str) -> bool {
        if phrases::mentions_issue_keyword(message) {
            return true;
        }
        message.split_whitespace().count() > ISSUE_DETECTION_MIN_WORDS
            && self.classifier.predict_category(message) != category::GENERAL_INQUIRY
    }

    /// Skip the menu: classify the message and answer it as an issue description.
    async fn start_from_description(&self, s: &mut ConversationSession, message: &str) -> ChatReply {
        s.selected_category = Some(self.classifier.predict_category(message));
        s.conversation_ending = false;
        self.describe_issue(s, message).await
    }

    async fn describe_issue(&self, s: &mut ConversationSession, message: &str) -> ChatReply {
        s.issue_description = Some(message.to_string());
        let category = match s.selected_category.clone() {
            Some(c) => c,
            None => {
                let c = self.classifier.predict_category(message);
                s.selected_category = Some(c.clone());
                c
            }
        };

        let steps = self
            .generation
            .generate_or_else(
                &troubleshooting::prompt(&category, message),
                Some(troubleshooting::SYSTEM_PROMPT),
                || troubleshooting::fallback_steps(&category).to_string(),
            )
            .await;

        s.state = ChatState::SolutionProvided;
        s.solution_provided = true;
        let response = format!(
            "I'm sorry to hear you're experiencing this issue with {}. Let me help you troubleshoot:\n\n{steps}\n\nDid these steps resolve your issue? (Yes/No)",
            category.to_lowercase()
        );
        reply(s, &response, false)
    }

    async fn conclude(&self, s: &mut ConversationSession, message: &str) -> ChatReply {
        if s.feedback == Some(SolutionOutcome::Resolved) {
            let rating = phrases::rating_digits(message)
                .and_then(|r| u8::try_from(r).ok())
                .filter(|r| is_valid_rating(*r));
            let response = match rating {
                Some(r) => format!(
                    "Thank you for your feedback! We've recorded your rating of {r}/5. Have a great day!"
                ),
                _ => THANKS_FOR_FEEDBACK.to_string(),
            };
            *s = ConversationSession::closing(None);
            return reply(s, &response, false);
        }

        let mut description = s.issue_description.clone().unwrap_or_default();
        if !phrases::declines_additional_info(message) {
            description.push_str(&format!("\n\nAdditional information: {message}"));
        }

        let ticket = self
            .intake
            .create_ticket(&description, s.selected_category.as_deref())
            .await;

        let (response, ticket_id) = match ticket {
            Some(t) => (
                format!(
                    "I've created ticket #{} for you. Our support team will review your issue and respond as soon as possible. \
                     The estimated resolution time is {:.1} hours. You can check the status of your ticket on the Tickets page. \
                     Is there anything else I can help you with?",
                    t.ticket_id, t.estimated_resolution_hours
                ),
                Some(t.ticket_id),
            ),
            None => (TICKET_FAILED.to_string(), s.ticket_id.clone()),
        };

        *s = ConversationSession::closing(ticket_id);
        reply(s, &response, true)
    }
}

fn reply(s: &ConversationSession, response: &str, create_ticket: bool) -> ChatReply {
    ChatReply {
        response: response.to_string(),
        create_ticket,
        ticket_id: s.ticket_id.clone(),
        state: s.state,
    }
}

fn greet(s: &mut ConversationSession) -> ChatReply {
    s.state = ChatState::CategorySelection;
    let response = format!(
        "Hello! I'm your AI support assistant. How can I help you today?\n\n\
         Please select the category that best describes your issue:\n\n{}\n\n\
         Just type the number or name of the category that matches your issue.",
        menu()
    );
    reply(s, &response, false)
}

fn select_category(s: &mut ConversationSession, message: &str) -> ChatReply {
    match match_category(message) {
        Some(category) => {
            s.selected_category = Some(category.to_string());
            s.state = ChatState::IssueDescription;
            let response = format!(
                "You've selected: {category}. Please describe your issue in detail so I can help you better."
            );
            reply(s, &response, false)
        }
        None => {
            let response = format!(
                "I'm sorry, I couldn't understand your selection. Please choose one of the following options:\n\n{}\n\n\
                 Just type the number or name of the category.",
                menu()
            );
            reply(s, &response, false)
        }
    }
}

fn solution_feedback(s: &mut ConversationSession, message: &str) -> ChatReply {
    if phrases::is_not_resolved(message) {
        s.state = ChatState::FeedbackReceived;
        s.feedback = Some(SolutionOutcome::Unresolved);
        s.create_ticket = true;
        return reply(s, ASK_DETAILS, true);
    }
    if phrases::is_resolved(message) {
        s.state = ChatState::FeedbackReceived;
        s.feedback = Some(SolutionOutcome::Resolved);
        s.feedback_requested = true;
        return reply(s, ASK_RATING, false);
    }
    let create_ticket = s.create_ticket;
    reply(s, ASK_AGAIN, create_ticket)
}
