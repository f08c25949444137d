// src/knowledge/tfidf.rs — TF-IDF vector space (shared by ranker and classifier)

use std::collections::HashMap;

use crate::infra::errors::SupportError;

/// Lower-cased word tokens of at least two characters.
///
/// Words are maximal runs of alphanumerics and underscores, so "don't" yields
/// "don" (the trailing "t" is too short).
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|w| w.chars().count() >= 2)
        .map(|w| w.to_lowercase())
        .collect()
}

/// Sparse vector: `(term index, weight)` pairs sorted by index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseVector {
    pub entries: Vec<(usize, f32)>,
}

impl SparseVector {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn dot(&self, other: &SparseVector) -> f32 {
        let (mut i, mut j) = (0, 0);
        let mut sum = 0.0;
        while i < self.entries.len() && j < other.entries.len() {
            let (a_idx, a_w) = self.entries[i];
            let (b_idx, b_w) = other.entries[j];
            match a_idx.cmp(&b_idx) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += a_w * b_w;
                    i += 1;
                    j += 1;
                }
            }
        }
        sum
    }

    pub fn norm(&self) -> f32 {
        self.entries.iter().map(|(_, w)| w * w).sum::<f32>().sqrt()
    }

    fn normalize(&mut self) {
        let norm = self.norm();
        if norm > 0.0 {
            for (_, w) in self.entries.iter_mut() {
                *w /= norm;
            }
        }
    }
}

/// Cosine similarity between two sparse vectors; 0.0 when either is empty.
pub fn cosine_similarity(a: &SparseVector, b: &SparseVector) -> f32 {
    let norm_a = a.norm();
    let norm_b = b.norm();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    a.dot(b) / (norm_a * norm_b)
}

/// Vocabulary and smoothed inverse document frequencies fitted on a corpus.
#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f32>,
}

impl TfidfVectorizer {
    /// Fit on `documents`, keeping at most `max_features` terms ranked by
    /// corpus frequency (ties broken alphabetically).
    pub fn fit<S: AsRef<str>>(
        documents: &[S],
        max_features: Option<usize>,
    ) -> Result<Self, SupportError> {
        if documents.is_empty() {
            return Err(SupportError::Classifier(
                "cannot fit TF-IDF on an empty corpus".into(),
            ));
        }

        let mut term_counts: HashMap<String, usize> = HashMap::new();
        let mut doc_freq: HashMap<String, usize> = HashMap::new();
        for doc in documents {
            let tokens = tokenize(doc.as_ref());
            let mut seen: Vec<&String> = Vec::new();
            for token in &tokens {
                *term_counts.entry(token.clone()).or_default() += 1;
                if !seen.contains(&token) {
                    seen.push(token);
                    *doc_freq.entry(token.clone()).or_default() += 1;
                }
            }
        }

        if term_counts.is_empty() {
            return Err(SupportError::Classifier(
                "corpus contains no usable terms".into(),
            ));
        }

        let mut terms: Vec<(String, usize)> = term_counts.into_iter().collect();
        terms.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        if let Some(max) = max_features {
            terms.truncate(max);
        }
        // Column order is alphabetical, independent of frequency.
        let mut kept: Vec<String> = terms.into_iter().map(|(t, _)| t).collect();
        kept.sort();

        let n_docs = documents.len() as f32;
        let idf = kept
            .iter()
            .map(|t| {
                let df = doc_freq.get(t).copied().unwrap_or(0) as f32;
                ((1.0 + n_docs) / (1.0 + df)).ln() + 1.0
            })
            .collect();
        let vocabulary = kept
            .into_iter()
            .enumerate()
            .map(|(i, t)| (t, i))
            .collect();

        Ok(Self { vocabulary, idf })
    }

    pub fn vocabulary_len(&self) -> usize {
        self.idf.len()
    }

    /// L2-normalised TF-IDF vector of `text`. Unknown terms are ignored.
    pub fn transform(&self, text: &str) -> SparseVector {
        let mut counts: HashMap<usize, f32> = HashMap::new();
        for token in tokenize(text) {
            if let Some(&idx) = self.vocabulary.get(&token) {
                *counts.entry(idx).or_default() += 1.0;
            }
        }

        let mut entries: Vec<(usize, f32)> = counts
            .into_iter()
            .map(|(idx, tf)| (idx, tf * self.idf[idx]))
            .collect();
        entries.sort_by_key(|(idx, _)| *idx);

        let mut v = SparseVector { entries };
        v.normalize();
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_drops_short_and_punctuation() {
        assert_eq!(
            tokenize("Wi-Fi isn't working: error_code 42!"),
            vec!["wi", "fi", "isn", "working", "error_code", "42"]
        );
    }

    #[test]
    fn test_fit_rejects_empty_corpus() {
        let docs: Vec<String> = vec![];
        assert!(TfidfVectorizer::fit(&docs, None).is_err());
        assert!(TfidfVectorizer::fit(&["a b c"], None).is_err());
    }

    #[test]
    fn test_transform_is_unit_length() {
        let v = TfidfVectorizer::fit(&["restart the router", "reset the password"], None).unwrap();
        let x = v.transform("restart router now");
        assert!((x.norm() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_unknown_terms_give_empty_vector() {
        let v = TfidfVectorizer::fit(&["restart the router"], None).unwrap();
        let x = v.transform("quantum flux capacitor");
        assert!(x.is_empty());
        assert_eq!(cosine_similarity(&x, &v.transform("router")), 0.0);
    }

    #[test]
    fn test_identical_texts_similarity_one() {
        let v = TfidfVectorizer::fit(&["clear app cache", "reinstall the app"], None).unwrap();
        let a = v.transform("clear app cache");
        let b = v.transform("clear app cache");
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_rare_terms_weigh_more() {
        let v = TfidfVectorizer::fit(&["app crash", "app freeze", "app sync"], None).unwrap();
        let x = v.transform("app crash");
        let app = x.entries.iter().find(|(i, _)| v.vocabulary["app"] == *i).unwrap().1;
        let crash = x.entries.iter().find(|(i, _)| v.vocabulary["crash"] == *i).unwrap().1;
        assert!(crash > app);
    }

    #[test]
    fn test_max_features_keeps_most_frequent() {
        let v = TfidfVectorizer::fit(&["alpha alpha beta", "alpha gamma"], Some(1)).unwrap();
        assert_eq!(v.vocabulary_len(), 1);
        assert!(v.vocabulary.contains_key("alpha"));
    }
}
