// src/lib.rs — Library root for ticketpilot

pub mod chat;
pub mod cli;
pub mod core;
pub mod generator;
pub mod infra;
pub mod knowledge;
pub mod store;
pub mod triage;
pub mod util;
