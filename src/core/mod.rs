// src/core/mod.rs — Support desk core: domain types and agents

pub mod desk;
pub mod escalation;
pub mod feedback;
pub mod health;
pub mod intake;
pub mod resolution;
pub mod stats;
pub mod types;
