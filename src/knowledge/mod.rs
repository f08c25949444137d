// src/knowledge/mod.rs — Solution knowledge base: vector space, ranking, seed data, articles

pub mod articles;
pub mod ranker;
pub mod seed;
pub mod tfidf;
