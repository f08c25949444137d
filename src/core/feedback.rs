// src/core/feedback.rs — Rating-driven solution statistics

use std::sync::Arc;

use crate::store::Repository;

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

pub fn is_valid_rating(rating: u8) -> bool {
    (MIN_RATING..=MAX_RATING).contains(&rating)
}

/// Folds customer ratings into the success rate of the solution that
/// resolved a ticket.
pub struct FeedbackLoop {
    repo: Arc<dyn Repository>,
}

impl FeedbackLoop {
    pub fn new(repo: Arc<dyn Repository>) -> Self {
        Self { repo }
    }

    /// `true` when a solution's statistics were updated. The comment is kept
    /// with the feedback record, not here.
    pub fn process_feedback(&self, ticket_id: &str, rating: u8, _comment: Option<&str>) -> bool {
        if !is_valid_rating(rating) {
            tracing::debug!(ticket_id, rating, "Ignoring out-of-range rating");
            return false;
        }

        let ticket = match self.repo.get_ticket(ticket_id) {
            Ok(Some(t)) => t,
            Ok(None) => return false,
            Err(e) => {
                tracing::error!(ticket_id, "Failed to load ticket for feedback: {e}");
                return false;
            }
        };
        let Some(resolution) = ticket.resolution.as_deref() else {
            return false;
        };

        match self
            .repo
            .revise_solution_by_text(resolution, &|s| s.with_rating(rating))
        {
            Ok(Some(updated)) => {
                tracing::info!(
                    ticket_id,
                    solution_id = ?updated.id,
                    success_rate = updated.success_rate,
                    usage_count = updated.usage_count,
                    "Solution statistics updated"
                );
                true
            }
            Ok(None) => false,
            Err(e) => {
                tracing::error!(ticket_id, "Failed to update solution statistics: {e}");
                false
            }
        }
    }
}
