// src/store/mod.rs — Persistence interface and SQLite backend

pub mod schema;
pub mod sqlite;

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::Connection;

use crate::core::types::{ConversationMessage, Feedback, KbEntry, Sender, Solution, Ticket};

pub use sqlite::SqliteStore;

/// Everything the support core reads and writes.
///
/// Multi-row writes (`insert_ticket`, `escalate_ticket`,
/// `revise_solution_by_text`, `insert_solutions_if_empty`) are atomic.
pub trait Repository: Send + Sync {
    // -- Tickets --

    /// Persist a new ticket together with its opening user message.
    fn insert_ticket(&self, ticket: &Ticket, opening_message: &str) -> anyhow::Result<()>;
    fn get_ticket(&self, ticket_id: &str) -> anyhow::Result<Option<Ticket>>;
    fn ticket_exists(&self, ticket_id: &str) -> anyhow::Result<bool>;
    fn list_tickets(&self) -> anyhow::Result<Vec<Ticket>>;
    fn count_tickets(&self) -> anyhow::Result<usize>;
    /// Record a resolution and close the ticket. `false` when the ticket is unknown.
    fn resolve_ticket(
        &self,
        ticket_id: &str,
        resolution: &str,
        resolved_at: DateTime<Utc>,
    ) -> anyhow::Result<bool>;
    /// Mark a ticket escalated and append a system message explaining why.
    fn escalate_ticket(&self, ticket_id: &str, system_message: &str) -> anyhow::Result<bool>;

    // -- Conversations --

    fn append_message(
        &self,
        ticket_id: &str,
        sender: Sender,
        message: &str,
    ) -> anyhow::Result<ConversationMessage>;
    /// Messages of a ticket ordered by timestamp, then id.
    fn conversation(&self, ticket_id: &str) -> anyhow::Result<Vec<ConversationMessage>>;

    // -- Solutions --

    fn solutions_for_category(&self, category: &str) -> anyhow::Result<Vec<Solution>>;
    fn all_solutions(&self) -> anyhow::Result<Vec<Solution>>;
    fn count_solutions(&self) -> anyhow::Result<usize>;
    fn insert_solution(&self, solution: &Solution) -> anyhow::Result<i64>;
    /// Insert `solutions` only when the table is empty. Returns how many were inserted.
    fn insert_solutions_if_empty(&self, solutions: &[Solution]) -> anyhow::Result<usize>;
    /// Read-modify-write the first solution whose text equals `solution_text`.
    fn revise_solution_by_text(
        &self,
        solution_text: &str,
        revise: &dyn Fn(&Solution) -> Solution,
    ) -> anyhow::Result<Option<Solution>>;

    // -- Feedback --

    fn insert_feedback(
        &self,
        ticket_id: &str,
        rating: u8,
        comment: Option<&str>,
    ) -> anyhow::Result<Feedback>;
    fn feedback_for_ticket(&self, ticket_id: &str) -> anyhow::Result<Vec<Feedback>>;

    // -- Knowledge-base articles --

    /// Store an article. `None` when its source ticket already has one.
    fn insert_kb_entry(&self, entry: &KbEntry) -> anyhow::Result<Option<i64>>;
    /// Articles of a category, newest first.
    fn kb_entries_for_category(&self, category: &str) -> anyhow::Result<Vec<KbEntry>>;
}

/// Open (or create) the database at the given path.
pub fn open(path: &Path) -> anyhow::Result<SqliteStore> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let conn = Connection::open(path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;
    conn.execute_batch("PRAGMA foreign_keys=ON;")?;
    schema::run_migrations(&conn)?;
    Ok(SqliteStore::new(conn))
}

/// Create an in-memory database (for testing).
pub fn in_memory() -> anyhow::Result<SqliteStore> {
    let conn = Connection::open_in_memory()?;
    conn.execute_batch("PRAGMA foreign_keys=ON;")?;
    schema::run_migrations(&conn)?;
    Ok(SqliteStore::new(conn))
}
