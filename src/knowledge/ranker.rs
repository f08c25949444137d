// src/knowledge/ranker.rs — Solution ranking by TF-IDF cosine similarity

use std::sync::{Arc, RwLock};

use anyhow::anyhow;

use super::tfidf::{cosine_similarity, TfidfVectorizer};
use crate::core::types::Solution;
use crate::infra::config::RankingConfig;
use crate::store::Repository;

#[derive(Debug, Clone, PartialEq)]
pub struct RankedSolution {
    pub solution: Solution,
    pub similarity: f32,
}

/// Ranks candidate solutions against an issue description.
///
/// The vector space is fitted once, on first use, over every stored solution
/// text. Readers share the fitted model through an `Arc`.
pub struct SimilarityRanker {
    model: RwLock<Option<Arc<TfidfVectorizer>>>,
    top_k: usize,
    threshold: f32,
}

impl SimilarityRanker {
    pub fn new(config: &RankingConfig) -> Self {
        Self {
            model: RwLock::new(None),
            top_k: config.top_k,
            threshold: config.similarity_threshold,
        }
    }

    pub fn is_fitted(&self) -> bool {
        self.model.read().map(|m| m.is_some()).unwrap_or(false)
    }

    fn fitted_model(&self, repo: &dyn Repository) -> anyhow::Result<Arc<TfidfVectorizer>> {
        {
            let guard = self
                .model
                .read()
                .map_err(|_| anyhow!("ranker model lock poisoned"))?;
            if let Some(model) = guard.as_ref() {
                return Ok(Arc::clone(model));
            }
        }

        let mut guard = self
            .model
            .write()
            .map_err(|_| anyhow!("ranker model lock poisoned"))?;
        // Another writer may have fitted while we waited.
        if let Some(model) = guard.as_ref() {
            return Ok(Arc::clone(model));
        }

        let corpus: Vec<String> = repo
            .all_solutions()?
            .into_iter()
            .map(|s| s.solution_text)
            .collect();
        let model = Arc::new(TfidfVectorizer::fit(&corpus, None)?);
        tracing::info!(
            "Fitted solution ranker on {} solutions ({} terms)",
            corpus.len(),
            model.vocabulary_len()
        );
        *guard = Some(Arc::clone(&model));
        Ok(model)
    }

    /// Up to `top_k` candidates, most similar first, each scoring strictly
    /// above the threshold. Ties keep candidate order.
    pub fn rank(
        &self,
        repo: &dyn Repository,
        description: &str,
        candidates: &[Solution],
    ) -> anyhow::Result<Vec<RankedSolution>> {
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let model = self.fitted_model(repo)?;
        let query = model.transform(description);

        let mut ranked: Vec<RankedSolution> = candidates
            .iter()
            .map(|s| RankedSolution {
                similarity: cosine_similarity(&query, &model.transform(&s.solution_text)),
                solution: s.clone(),
            })
            .collect();

        ranked.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        ranked.truncate(self.top_k);
        ranked.retain(|r| r.similarity > self.threshold);
        Ok(ranked)
    }
}
