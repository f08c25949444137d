// src/core/desk.rs — SupportDesk: the application facade
//
// Owns one instance of every agent and hands out the operations callers
// need. Persistence failures are logged here and surface as `None`/`false`.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use serde::Serialize;

use super::escalation::{EscalationAgent, EscalationDecision};
use super::feedback::{is_valid_rating, FeedbackLoop};
use super::health::{analyze_conversation, HealthReport};
use super::intake::TicketIntake;
use super::resolution::{ResolutionAgent, SuggestedSolution};
use super::stats::{self, DeskStats};
use super::types::{ChatTurn, ConversationMessage, ResolutionStatus, Sender, Ticket, TicketStatus};
use crate::chat::session::SessionStore;
use crate::chat::{ChatReply, ConversationStateMachine};
use crate::generator::Generation;
use crate::infra::config::Config;
use crate::knowledge::articles::{self, MIN_ARTICLE_RATING};
use crate::knowledge::ranker::SimilarityRanker;
use crate::knowledge::seed;
use crate::store::Repository;
use crate::triage::classifier::TicketClassifier;
use crate::triage::{ClassifierAgent, Classification};

/// Outcome of posting a message to a ticket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TicketUpdate {
    /// The ticket as stored after the message was handled.
    pub ticket: Ticket,
    pub message: ConversationMessage,
    /// Set when the escalation check ran (user message on an open ticket).
    pub escalation: Option<EscalationDecision>,
    /// Best suggestion posted back as an agent message.
    pub agent_reply: Option<ConversationMessage>,
    pub suggestions: Vec<SuggestedSolution>,
}

/// What a stored rating changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FeedbackOutcome {
    /// The rating was folded into the resolving solution's statistics.
    pub solution_updated: bool,
    /// Article created from the ticket by this rating.
    pub kb_entry_id: Option<i64>,
}

pub struct SupportDesk {
    repo: Arc<dyn Repository>,
    classifier: Arc<ClassifierAgent>,
    resolution: ResolutionAgent,
    escalation: EscalationAgent,
    feedback: FeedbackLoop,
    intake: Arc<TicketIntake>,
    chat: ConversationStateMachine,
    generation: Generation,
}

impl SupportDesk {
    /// Probe for a generator backend, then build the desk around `repo`.
    pub async fn start(config: &Config, repo: Arc<dyn Repository>) -> Self {
        let generation = Generation::select(&config.generator).await;
        Self::new(config, repo, generation)
    }

    /// Build the desk with a classifier trained from the repository.
    pub fn new(config: &Config, repo: Arc<dyn Repository>, generation: Generation) -> Self {
        let started = Instant::now();
        let classifier = TicketClassifier::bootstrap(repo.as_ref(), &config.classifier);
        tracing::debug!(
            trained = classifier.is_trained(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Classifier ready"
        );
        Self::with_classifier(config, repo, generation, classifier)
    }

    pub fn with_classifier(
        config: &Config,
        repo: Arc<dyn Repository>,
        generation: Generation,
        classifier: TicketClassifier,
    ) -> Self {
        let classifier = Arc::new(ClassifierAgent::new(classifier, generation.clone()));
        let intake = Arc::new(TicketIntake::new(repo.clone(), classifier.clone()));
        let chat = ConversationStateMachine::new(
            classifier.clone(),
            intake.clone(),
            generation.clone(),
            Arc::new(SessionStore::new()),
            config.chat.session_idle(),
        );

        Self {
            resolution: ResolutionAgent::new(
                repo.clone(),
                SimilarityRanker::new(&config.ranking),
                generation.clone(),
            ),
            escalation: EscalationAgent::new(config.escalation.max_exchanges),
            feedback: FeedbackLoop::new(repo.clone()),
            repo,
            classifier,
            intake,
            chat,
            generation,
        }
    }

    /// Id of the text generator in use.
    pub fn generator_id(&self) -> &str {
        self.generation.id()
    }

    pub fn sessions(&self) -> &Arc<SessionStore> {
        self.chat.sessions()
    }

    // ─── Agent operations ───────────────────────────────────────

    pub async fn classify(&self, description: &str) -> Classification {
        self.classifier.classify(description).await
    }

    pub async fn suggest_solutions(&self, ticket: &Ticket) -> Vec<SuggestedSolution> {
        self.resolution.suggest_solutions(ticket).await
    }

    pub fn should_escalate(
        &self,
        ticket: &Ticket,
        history: &[ConversationMessage],
    ) -> EscalationDecision {
        self.escalation.should_escalate(ticket, history)
    }

    pub fn process_feedback(&self, ticket_id: &str, rating: u8, comment: Option<&str>) -> bool {
        self.feedback.process_feedback(ticket_id, rating, comment)
    }

    pub async fn respond_to_query(
        &self,
        message: &str,
        history: &[ChatTurn],
        session_id: &str,
    ) -> ChatReply {
        self.chat.respond_to_query(message, history, session_id).await
    }

    // ─── Ticket lifecycle ───────────────────────────────────────

    pub async fn create_ticket(
        &self,
        description: &str,
        category_override: Option<&str>,
    ) -> Option<Ticket> {
        self.intake.create_ticket(description, category_override).await
    }

    pub fn get_ticket(&self, ticket_id: &str) -> Option<Ticket> {
        match self.repo.get_ticket(ticket_id) {
            Ok(t) => t,
            Err(e) => {
                tracing::error!(ticket_id, "Failed to load ticket: {e}");
                None
            }
        }
    }

    pub fn list_tickets(&self) -> Vec<Ticket> {
        self.repo.list_tickets().unwrap_or_else(|e| {
            tracing::error!("Failed to list tickets: {e}");
            Vec::new()
        })
    }

    /// Messages of a ticket, `None` when the ticket is unknown.
    pub fn conversation(&self, ticket_id: &str) -> Option<Vec<ConversationMessage>> {
        self.get_ticket(ticket_id)?;
        match self.repo.conversation(ticket_id) {
            Ok(messages) => Some(messages),
            Err(e) => {
                tracing::error!(ticket_id, "Failed to load conversation: {e}");
                None
            }
        }
    }

    /// Append a message to a ticket. A user message on an open ticket is
    /// checked for escalation; when no escalation is needed the best
    /// suggested solution is posted as the agent's reply.
    pub async fn handle_ticket_message(
        &self,
        ticket_id: &str,
        sender: Sender,
        message: &str,
    ) -> Option<TicketUpdate> {
        let ticket = self.get_ticket(ticket_id)?;

        let posted = match self.repo.append_message(ticket_id, sender, message) {
            Ok(m) => m,
            Err(e) => {
                tracing::error!(ticket_id, "Failed to store message: {e}");
                return None;
            }
        };

        let mut update = TicketUpdate {
            ticket,
            message: posted,
            escalation: None,
            agent_reply: None,
            suggestions: Vec::new(),
        };

        if sender != Sender::User || update.ticket.status != TicketStatus::Open {
            return Some(update);
        }

        let history = match self.repo.conversation(ticket_id) {
            Ok(h) => h,
            Err(e) => {
                tracing::error!(ticket_id, "Failed to load conversation: {e}");
                return Some(update);
            }
        };

        let decision = self.escalation.should_escalate(&update.ticket, &history);
        if decision.escalate {
            let notice = format!(
                "This ticket has been escalated for human review. Reason: {}",
                decision.reason
            );
            match self.repo.escalate_ticket(ticket_id, &notice) {
                Ok(true) => {
                    tracing::info!(ticket_id, reason = %decision.reason, "Ticket escalated");
                }
                Ok(false) => {}
                Err(e) => tracing::error!(ticket_id, "Failed to escalate ticket: {e}"),
            }
        } else {
            update.suggestions = self.resolution.suggest_solutions(&update.ticket).await;
            if let Some(best) = update.suggestions.first() {
                match self.repo.append_message(
                    ticket_id,
                    Sender::Agent,
                    &best.solution.solution_text,
                ) {
                    Ok(m) => update.agent_reply = Some(m),
                    Err(e) => tracing::error!(ticket_id, "Failed to store agent reply: {e}"),
                }
            }
        }
        update.escalation = Some(decision);

        if let Some(refreshed) = self.get_ticket(ticket_id) {
            update.ticket = refreshed;
        }
        Some(update)
    }

    /// Record the resolution and close the ticket.
    pub fn resolve_ticket(&self, ticket_id: &str, resolution: &str) -> bool {
        match self.repo.resolve_ticket(ticket_id, resolution, Utc::now()) {
            Ok(resolved) => {
                if resolved {
                    tracing::info!(ticket_id, "Ticket resolved");
                }
                resolved
            }
            Err(e) => {
                tracing::error!(ticket_id, "Failed to resolve ticket: {e}");
                false
            }
        }
    }

    /// Store a rating for an existing ticket and fold it into the solution
    /// statistics. A resolved ticket rated 4 or 5 also becomes a
    /// knowledge-base article. `None` when the rating is out of range, the
    /// ticket is unknown or the record could not be stored.
    pub fn submit_feedback(
        &self,
        ticket_id: &str,
        rating: u8,
        comment: Option<&str>,
    ) -> Option<FeedbackOutcome> {
        if !is_valid_rating(rating) {
            return None;
        }
        let ticket = self.get_ticket(ticket_id)?;
        if let Err(e) = self.repo.insert_feedback(ticket_id, rating, comment) {
            tracing::error!(ticket_id, "Failed to store feedback: {e}");
            return None;
        }

        let solution_updated = self.feedback.process_feedback(ticket_id, rating, comment);
        let kb_entry_id = if ticket.resolution_status == ResolutionStatus::Resolved
            && rating >= MIN_ARTICLE_RATING
        {
            self.create_kb_entry(&ticket)
        } else {
            None
        };
        Some(FeedbackOutcome {
            solution_updated,
            kb_entry_id,
        })
    }

    fn create_kb_entry(&self, ticket: &Ticket) -> Option<i64> {
        let messages = match self.repo.conversation(&ticket.ticket_id) {
            Ok(m) => m,
            Err(e) => {
                tracing::error!(ticket_id = %ticket.ticket_id, "Failed to load conversation for article: {e}");
                return None;
            }
        };
        let entry = articles::from_resolved_ticket(ticket, &messages)?;
        match self.repo.insert_kb_entry(&entry) {
            Ok(Some(id)) => {
                tracing::info!(ticket_id = %ticket.ticket_id, kb_entry_id = id, title = %entry.title, "Knowledge-base article created");
                Some(id)
            }
            Ok(None) => {
                tracing::debug!(ticket_id = %ticket.ticket_id, "Ticket already has an article");
                None
            }
            Err(e) => {
                tracing::error!(ticket_id = %ticket.ticket_id, "Failed to store article: {e}");
                None
            }
        }
    }

    pub fn conversation_health(&self, ticket_id: &str) -> Option<HealthReport> {
        self.conversation(ticket_id)
            .map(|messages| analyze_conversation(&messages))
    }

    pub fn stats(&self) -> Option<DeskStats> {
        match self.repo.list_tickets() {
            Ok(tickets) => Some(stats::compute(&tickets)),
            Err(e) => {
                tracing::error!("Failed to load tickets for stats: {e}");
                None
            }
        }
    }

    /// Insert the built-in solution catalogue into an empty knowledge base.
    pub fn seed_knowledge_base(&self) -> anyhow::Result<usize> {
        seed::seed_solutions(self.repo.as_ref())
    }
}
