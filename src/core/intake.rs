// src/core/intake.rs — Ticket creation

use std::sync::Arc;

use chrono::Utc;

use super::types::{ResolutionStatus, Ticket, TicketStatus};
use crate::triage::ClassifierAgent;
use crate::store::Repository;

const ID_PREFIX: &str = "TECH_";
const ID_MIN: u16 = 100;
const ID_MAX: u16 = 999;
const RANDOM_ID_ATTEMPTS: usize = 32;

/// Random id in `TECH_100..=TECH_999`.
fn random_ticket_id() -> anyhow::Result<String> {
    let mut buf = [0u8; 2];
    getrandom::getrandom(&mut buf)
        .map_err(|e| anyhow::anyhow!("OS random source unavailable: {e}"))?;
    let n = ID_MIN + u16::from_le_bytes(buf) % (ID_MAX - ID_MIN + 1);
    Ok(format!("{ID_PREFIX}{n}"))
}

/// True for ids shaped like `TECH_` followed by three digits.
pub fn is_ticket_id(s: &str) -> bool {
    s.strip_prefix(ID_PREFIX)
        .is_some_and(|digits| digits.len() == 3 && digits.chars().all(|c| c.is_ascii_digit()))
}

pub struct TicketIntake {
    repo: Arc<dyn Repository>,
    classifier: Arc<ClassifierAgent>,
}

impl TicketIntake {
    pub fn new(repo: Arc<dyn Repository>, classifier: Arc<ClassifierAgent>) -> Self {
        Self { repo, classifier }
    }

    /// Random ids first; when those keep colliding, the lowest free id.
    fn allocate_id(&self) -> anyhow::Result<Option<String>> {
        for _ in 0..RANDOM_ID_ATTEMPTS {
            let id = random_ticket_id()?;
            if !self.repo.ticket_exists(&id)? {
                return Ok(Some(id));
            }
        }
        for n in ID_MIN..=ID_MAX {
            let id = format!("{ID_PREFIX}{n}");
            if !self.repo.ticket_exists(&id)? {
                return Ok(Some(id));
            }
        }
        Ok(None)
    }

    /// Classify `description`, then persist the ticket and its opening
    /// message. `None` when nothing could be stored.
    pub async fn create_ticket(
        &self,
        description: &str,
        category_override: Option<&str>,
    ) -> Option<Ticket> {
        let classification = self
            .classifier
            .classify_as(description, category_override)
            .await;

        let ticket_id = match self.allocate_id() {
            Ok(Some(id)) => id,
            Ok(None) => {
                tracing::error!("All ticket ids are in use");
                return None;
            }
            Err(e) => {
                tracing::error!("Failed to allocate ticket id: {e}");
                return None;
            }
        };

        let now = Utc::now();
        let ticket = Ticket {
            ticket_id,
            category: classification.category,
            sentiment: classification.sentiment,
            priority: classification.priority,
            description: description.to_string(),
            status: TicketStatus::Open,
            resolution: None,
            resolution_status: ResolutionStatus::Pending,
            resolution_date: None,
            summary: classification.summary,
            extracted_actions: classification.actions,
            estimated_resolution_hours: classification.estimated_hours,
            team: classification.team,
            created_at: now,
            updated_at: now,
        };

        match self.repo.insert_ticket(&ticket, description) {
            Ok(()) => {
                tracing::info!(
                    ticket_id = %ticket.ticket_id,
                    category = %ticket.category,
                    priority = ticket.priority.as_str(),
                    "Ticket created"
                );
                Some(ticket)
            }
            Err(e) => {
                tracing::error!("Failed to store ticket: {e}");
                None
            }
        }
    }
}
