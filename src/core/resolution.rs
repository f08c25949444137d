// src/core/resolution.rs — Solution suggestions for a ticket

use std::sync::Arc;

use serde::Serialize;

use super::types::{Solution, Ticket};
use crate::generator::Generation;
use crate::knowledge::articles::{self, ARTICLE_SUCCESS_RATE, MAX_SUGGESTED_ARTICLES};
use crate::knowledge::ranker::SimilarityRanker;
use crate::store::Repository;

const SOLUTION_SYSTEM_PROMPT: &str = "You are an expert customer support agent. \
Provide a clear, step-by-step solution to the customer's technical issue. \
Be concise and practical.";

const GENERATED_SUCCESS_RATE: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SolutionSource {
    KnowledgeBase,
    Generated,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuggestedSolution {
    pub solution: Solution,
    pub source: SolutionSource,
    /// Cosine similarity for stored-solution matches.
    pub similarity: Option<f32>,
    /// Set when the suggestion points at a knowledge-base article.
    pub kb_entry_id: Option<i64>,
}

pub struct ResolutionAgent {
    repo: Arc<dyn Repository>,
    ranker: SimilarityRanker,
    generation: Generation,
}

impl ResolutionAgent {
    pub fn new(repo: Arc<dyn Repository>, ranker: SimilarityRanker, generation: Generation) -> Self {
        Self {
            repo,
            ranker,
            generation,
        }
    }

    /// Matching knowledge-base articles first, then the best stored
    /// solutions for the ticket's category, or one generated solution when
    /// none is similar enough.
    pub async fn suggest_solutions(&self, ticket: &Ticket) -> Vec<SuggestedSolution> {
        let mut suggestions = self.article_suggestions(ticket);
        suggestions.extend(self.solution_suggestions(ticket).await);
        suggestions
    }

    fn article_suggestions(&self, ticket: &Ticket) -> Vec<SuggestedSolution> {
        let entries = match self.repo.kb_entries_for_category(&ticket.category) {
            Ok(e) => e,
            Err(e) => {
                tracing::error!(category = %ticket.category, "Failed to load knowledge-base articles: {e}");
                return Vec::new();
            }
        };

        articles::find_for_issue(&ticket.description, entries, MAX_SUGGESTED_ARTICLES)
            .into_iter()
            .map(|entry| SuggestedSolution {
                solution: Solution::new(
                    &entry.category,
                    &articles::suggestion_text(&entry),
                    ARTICLE_SUCCESS_RATE,
                    0,
                ),
                source: SolutionSource::KnowledgeBase,
                similarity: None,
                kb_entry_id: entry.id,
            })
            .collect()
    }

    async fn solution_suggestions(&self, ticket: &Ticket) -> Vec<SuggestedSolution> {
        let candidates = match self.repo.solutions_for_category(&ticket.category) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(category = %ticket.category, "Failed to load solutions: {e}");
                Vec::new()
            }
        };

        if !candidates.is_empty() {
            match self
                .ranker
                .rank(self.repo.as_ref(), &ticket.description, &candidates)
            {
                Ok(ranked) if !ranked.is_empty() => {
                    return ranked
                        .into_iter()
                        .map(|r| SuggestedSolution {
                            solution: r.solution,
                            source: SolutionSource::KnowledgeBase,
                            similarity: Some(r.similarity),
                            kb_entry_id: None,
                        })
                        .collect();
                }
                Ok(_) => {
                    tracing::debug!(ticket_id = %ticket.ticket_id, "No similar stored solution");
                }
                Err(e) => tracing::warn!("Solution ranking failed: {e}"),
            }
        }

        vec![self.generate_solution(ticket).await]
    }

    async fn generate_solution(&self, ticket: &Ticket) -> SuggestedSolution {
        let prompt = format!(
            "Issue Category: {}\nCustomer's Issue: {}\n\nPlease provide a step-by-step solution to resolve this issue.",
            ticket.category, ticket.description
        );
        let text = self
            .generation
            .respond(&prompt, Some(SOLUTION_SYSTEM_PROMPT))
            .await;

        let mut solution = Solution::new(&ticket.category, &text, GENERATED_SUCCESS_RATE, 1);
        match self.repo.insert_solution(&solution) {
            Ok(id) => solution.id = Some(id),
            Err(e) => {
                tracing::error!(ticket_id = %ticket.ticket_id, "Failed to store generated solution: {e}");
                solution.usage_count = 0;
            }
        }

        SuggestedSolution {
            solution,
            source: SolutionSource::Generated,
            similarity: None,
            kb_entry_id: None,
        }
    }
}
