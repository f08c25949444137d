// src/store/sqlite.rs — SQLite operations

use std::sync::{Mutex, MutexGuard};

use anyhow::anyhow;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::Repository;
use crate::core::types::{
    ConversationMessage, Feedback, KbEntry, Priority, ResolutionStatus, Sender, Sentiment,
    Solution, Team, Ticket, TicketStatus,
};

/// Fixed-width timestamps so lexical order matches time order.
fn format_ts(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_ts(s: &str) -> anyhow::Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(s)?.with_timezone(&Utc))
}

fn parse_label<T>(value: &str, parse: fn(&str) -> Option<T>, what: &str) -> anyhow::Result<T> {
    parse(value).ok_or_else(|| anyhow!("unknown {what} '{value}' in database"))
}

const TICKET_COLUMNS: &str = "ticket_id, category, sentiment, priority, description, status,
     resolution, resolution_status, resolution_date, summary, extracted_actions,
     estimated_resolution_hours, team, created_at, updated_at";

struct TicketRow {
    ticket_id: String,
    category: String,
    sentiment: String,
    priority: String,
    description: String,
    status: String,
    resolution: Option<String>,
    resolution_status: String,
    resolution_date: Option<String>,
    summary: String,
    extracted_actions: String,
    estimated_resolution_hours: f64,
    team: String,
    created_at: String,
    updated_at: String,
}

impl TicketRow {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            ticket_id: row.get(0)?,
            category: row.get(1)?,
            sentiment: row.get(2)?,
            priority: row.get(3)?,
            description: row.get(4)?,
            status: row.get(5)?,
            resolution: row.get(6)?,
            resolution_status: row.get(7)?,
            resolution_date: row.get(8)?,
            summary: row.get(9)?,
            extracted_actions: row.get(10)?,
            estimated_resolution_hours: row.get(11)?,
            team: row.get(12)?,
            created_at: row.get(13)?,
            updated_at: row.get(14)?,
        })
    }

    fn into_ticket(self) -> anyhow::Result<Ticket> {
        Ok(Ticket {
            sentiment: parse_label(&self.sentiment, Sentiment::parse, "sentiment")?,
            priority: parse_label(&self.priority, Priority::parse, "priority")?,
            status: parse_label(&self.status, TicketStatus::parse, "status")?,
            resolution_status: parse_label(
                &self.resolution_status,
                ResolutionStatus::parse,
                "resolution status",
            )?,
            team: parse_label(&self.team, Team::parse, "team")?,
            resolution_date: self.resolution_date.as_deref().map(parse_ts).transpose()?,
            created_at: parse_ts(&self.created_at)?,
            updated_at: parse_ts(&self.updated_at)?,
            ticket_id: self.ticket_id,
            category: self.category,
            description: self.description,
            resolution: self.resolution,
            summary: self.summary,
            extracted_actions: self.extracted_actions,
            estimated_resolution_hours: self.estimated_resolution_hours,
        })
    }
}

struct MessageRow {
    id: i64,
    ticket_id: String,
    sender: String,
    message: String,
    timestamp: String,
}

impl MessageRow {
    fn into_message(self) -> anyhow::Result<ConversationMessage> {
        Ok(ConversationMessage {
            id: self.id,
            sender: parse_label(&self.sender, Sender::parse, "sender")?,
            timestamp: parse_ts(&self.timestamp)?,
            ticket_id: self.ticket_id,
            message: self.message,
        })
    }
}

fn solution_from_row(row: &Row) -> rusqlite::Result<Solution> {
    Ok(Solution {
        id: Some(row.get(0)?),
        category: row.get(1)?,
        solution_text: row.get(2)?,
        success_rate: row.get(3)?,
        usage_count: row.get(4)?,
    })
}

struct KbEntryRow {
    id: i64,
    title: String,
    content: String,
    category: String,
    tags: String,
    source_ticket_id: Option<String>,
    created_at: String,
}

impl KbEntryRow {
    fn into_entry(self) -> anyhow::Result<KbEntry> {
        Ok(KbEntry {
            id: Some(self.id),
            tags: serde_json::from_str(&self.tags)?,
            created_at: parse_ts(&self.created_at)?,
            title: self.title,
            content: self.content,
            category: self.category,
            source_ticket_id: self.source_ticket_id,
        })
    }
}

fn insert_message(
    conn: &Connection,
    ticket_id: &str,
    sender: Sender,
    message: &str,
) -> anyhow::Result<ConversationMessage> {
    let now = Utc::now();
    conn.execute(
        "INSERT INTO conversations (ticket_id, sender, message, timestamp)
         VALUES (?1, ?2, ?3, ?4)",
        params![ticket_id, sender.as_str(), message, format_ts(&now)],
    )?;
    Ok(ConversationMessage {
        id: conn.last_insert_rowid(),
        ticket_id: ticket_id.to_string(),
        sender,
        message: message.to_string(),
        timestamp: now,
    })
}

fn insert_solution_row(conn: &Connection, solution: &Solution) -> anyhow::Result<i64> {
    conn.execute(
        "INSERT INTO solutions (category, solution_text, success_rate, usage_count)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            solution.category,
            solution.solution_text,
            solution.success_rate,
            solution.usage_count
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// SQLite-backed [`Repository`]. The connection is serialised behind a mutex.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    /// Direct access to the connection (tests and maintenance commands).
    pub fn conn(&self) -> anyhow::Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("store connection lock poisoned"))
    }
}

impl Repository for SqliteStore {
    // -- Tickets --

    fn insert_ticket(&self, ticket: &Ticket, opening_message: &str) -> anyhow::Result<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        tx.execute(
            &format!(
                "INSERT INTO tickets ({TICKET_COLUMNS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)"
            ),
            params![
                ticket.ticket_id,
                ticket.category,
                ticket.sentiment.as_str(),
                ticket.priority.as_str(),
                ticket.description,
                ticket.status.as_str(),
                ticket.resolution,
                ticket.resolution_status.as_str(),
                ticket.resolution_date.as_ref().map(format_ts),
                ticket.summary,
                ticket.extracted_actions,
                ticket.estimated_resolution_hours,
                ticket.team.as_str(),
                format_ts(&ticket.created_at),
                format_ts(&ticket.updated_at),
            ],
        )?;
        insert_message(&tx, &ticket.ticket_id, Sender::User, opening_message)?;
        tx.commit()?;
        Ok(())
    }

    fn get_ticket(&self, ticket_id: &str) -> anyhow::Result<Option<Ticket>> {
        let conn = self.conn()?;
        let row = conn
            .query_row(
                &format!("SELECT {TICKET_COLUMNS} FROM tickets WHERE ticket_id = ?1"),
                params![ticket_id],
                TicketRow::from_row,
            )
            .optional()?;
        row.map(TicketRow::into_ticket).transpose()
    }

    fn ticket_exists(&self, ticket_id: &str) -> anyhow::Result<bool> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM tickets WHERE ticket_id = ?1",
            params![ticket_id],
            |r| r.get(0),
        )?;
        Ok(count > 0)
    }

    fn list_tickets(&self) -> anyhow::Result<Vec<Ticket>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {TICKET_COLUMNS} FROM tickets ORDER BY created_at, ticket_id"
        ))?;
        let rows = stmt.query_map([], TicketRow::from_row)?;
        let mut tickets = Vec::new();
        for row in rows {
            tickets.push(row?.into_ticket()?);
        }
        Ok(tickets)
    }

    fn count_tickets(&self) -> anyhow::Result<usize> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM tickets", [], |r| r.get(0))?;
        Ok(count as usize)
    }

    fn resolve_ticket(
        &self,
        ticket_id: &str,
        resolution: &str,
        resolved_at: DateTime<Utc>,
    ) -> anyhow::Result<bool> {
        let conn = self.conn()?;
        let ts = format_ts(&resolved_at);
        let changed = conn.execute(
            "UPDATE tickets SET resolution = ?1, resolution_status = ?2, status = ?3,
             resolution_date = ?4, updated_at = ?4
             WHERE ticket_id = ?5",
            params![
                resolution,
                ResolutionStatus::Resolved.as_str(),
                TicketStatus::Closed.as_str(),
                ts,
                ticket_id
            ],
        )?;
        Ok(changed > 0)
    }

    fn escalate_ticket(&self, ticket_id: &str, system_message: &str) -> anyhow::Result<bool> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let changed = tx.execute(
            "UPDATE tickets SET status = ?1, updated_at = ?2 WHERE ticket_id = ?3",
            params![
                TicketStatus::Escalated.as_str(),
                format_ts(&Utc::now()),
                ticket_id
            ],
        )?;
        if changed == 0 {
            return Ok(false);
        }
        insert_message(&tx, ticket_id, Sender::System, system_message)?;
        tx.commit()?;
        Ok(true)
    }

    // -- Conversations --

    fn append_message(
        &self,
        ticket_id: &str,
        sender: Sender,
        message: &str,
    ) -> anyhow::Result<ConversationMessage> {
        let conn = self.conn()?;
        insert_message(&conn, ticket_id, sender, message)
    }

    fn conversation(&self, ticket_id: &str) -> anyhow::Result<Vec<ConversationMessage>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, ticket_id, sender, message, timestamp FROM conversations
             WHERE ticket_id = ?1 ORDER BY timestamp, id",
        )?;
        let rows = stmt.query_map(params![ticket_id], |row| {
            Ok(MessageRow {
                id: row.get(0)?,
                ticket_id: row.get(1)?,
                sender: row.get(2)?,
                message: row.get(3)?,
                timestamp: row.get(4)?,
            })
        })?;
        let mut messages = Vec::new();
        for row in rows {
            messages.push(row?.into_message()?);
        }
        Ok(messages)
    }

    // -- Solutions --

    fn solutions_for_category(&self, category: &str) -> anyhow::Result<Vec<Solution>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, category, solution_text, success_rate, usage_count FROM solutions
             WHERE category = ?1 ORDER BY id",
        )?;
        let rows = stmt.query_map(params![category], solution_from_row)?;
        let solutions = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(solutions)
    }

    fn all_solutions(&self) -> anyhow::Result<Vec<Solution>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, category, solution_text, success_rate, usage_count FROM solutions
             ORDER BY id",
        )?;
        let rows = stmt.query_map([], solution_from_row)?;
        let solutions = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(solutions)
    }

    fn count_solutions(&self) -> anyhow::Result<usize> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM solutions", [], |r| r.get(0))?;
        Ok(count as usize)
    }

    fn insert_solution(&self, solution: &Solution) -> anyhow::Result<i64> {
        let conn = self.conn()?;
        insert_solution_row(&conn, solution)
    }

    fn insert_solutions_if_empty(&self, solutions: &[Solution]) -> anyhow::Result<usize> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let existing: i64 = tx.query_row("SELECT COUNT(*) FROM solutions", [], |r| r.get(0))?;
        if existing > 0 {
            return Ok(0);
        }
        for solution in solutions {
            insert_solution_row(&tx, solution)?;
        }
        tx.commit()?;
        Ok(solutions.len())
    }

    fn revise_solution_by_text(
        &self,
        solution_text: &str,
        revise: &dyn Fn(&Solution) -> Solution,
    ) -> anyhow::Result<Option<Solution>> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let current = tx
            .query_row(
                "SELECT id, category, solution_text, success_rate, usage_count FROM solutions
                 WHERE solution_text = ?1 ORDER BY id LIMIT 1",
                params![solution_text],
                solution_from_row,
            )
            .optional()?;
        let Some(current) = current else {
            return Ok(None);
        };

        let revised = revise(&current);
        tx.execute(
            "UPDATE solutions SET success_rate = ?1, usage_count = ?2 WHERE id = ?3",
            params![revised.success_rate, revised.usage_count, current.id],
        )?;
        tx.commit()?;
        Ok(Some(Solution {
            id: current.id,
            ..revised
        }))
    }

    // -- Feedback --

    fn insert_feedback(
        &self,
        ticket_id: &str,
        rating: u8,
        comment: Option<&str>,
    ) -> anyhow::Result<Feedback> {
        let conn = self.conn()?;
        let now = Utc::now();
        conn.execute(
            "INSERT INTO feedback (ticket_id, rating, comment, timestamp)
             VALUES (?1, ?2, ?3, ?4)",
            params![ticket_id, rating, comment, format_ts(&now)],
        )?;
        Ok(Feedback {
            id: conn.last_insert_rowid(),
            ticket_id: ticket_id.to_string(),
            rating,
            comment: comment.map(str::to_string),
            timestamp: now,
        })
    }

    fn feedback_for_ticket(&self, ticket_id: &str) -> anyhow::Result<Vec<Feedback>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, ticket_id, rating, comment, timestamp FROM feedback
             WHERE ticket_id = ?1 ORDER BY id",
        )?;
        let rows = stmt.query_map(params![ticket_id], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, u8>(2)?,
                row.get::<_, Option<String>>(3)?,
                row.get::<_, String>(4)?,
            ))
        })?;
        let mut feedback = Vec::new();
        for row in rows {
            let (id, ticket_id, rating, comment, timestamp) = row?;
            feedback.push(Feedback {
                id,
                ticket_id,
                rating,
                comment,
                timestamp: parse_ts(&timestamp)?,
            });
        }
        Ok(feedback)
    }

    // -- Knowledge-base articles --

    fn insert_kb_entry(&self, entry: &KbEntry) -> anyhow::Result<Option<i64>> {
        let conn = self.conn()?;
        let inserted = conn.execute(
            "INSERT INTO kb_entries (title, content, category, tags, source_ticket_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(source_ticket_id) DO NOTHING",
            params![
                entry.title,
                entry.content,
                entry.category,
                serde_json::to_string(&entry.tags)?,
                entry.source_ticket_id,
                format_ts(&entry.created_at)
            ],
        )?;
        Ok((inserted > 0).then(|| conn.last_insert_rowid()))
    }

    fn kb_entries_for_category(&self, category: &str) -> anyhow::Result<Vec<KbEntry>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, title, content, category, tags, source_ticket_id, created_at
             FROM kb_entries WHERE category = ?1 ORDER BY id DESC",
        )?;
        let rows = stmt.query_map(params![category], |row| {
            Ok(KbEntryRow {
                id: row.get(0)?,
                title: row.get(1)?,
                content: row.get(2)?,
                category: row.get(3)?,
                tags: row.get(4)?,
                source_ticket_id: row.get(5)?,
                created_at: row.get(6)?,
            })
        })?;
        rows.map(|r| r?.into_entry()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::category;
    use crate::store::{in_memory, schema};

    fn sample_ticket(id: &str) -> Ticket {
        let now = Utc::now();
        Ticket {
            ticket_id: id.to_string(),
            category: category::NETWORK.to_string(),
            sentiment: Sentiment::Neutral,
            priority: Priority::Medium,
            description: "Wi-Fi drops every hour".into(),
            status: TicketStatus::Open,
            resolution: None,
            resolution_status: ResolutionStatus::Pending,
            resolution_date: None,
            summary: "Wi-Fi drops every hour".into(),
            extracted_actions: "1. Check router".into(),
            estimated_resolution_hours: 2.0,
            team: Team::Network,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_ticket_roundtrip_with_opening_message() {
        let store = in_memory().unwrap();
        let ticket = sample_ticket("TECH_101");
        store.insert_ticket(&ticket, "Wi-Fi drops every hour").unwrap();

        let loaded = store.get_ticket("TECH_101").unwrap().unwrap();
        assert_eq!(loaded.category, ticket.category);
        assert_eq!(loaded.team, Team::Network);
        assert_eq!(loaded.status, TicketStatus::Open);

        let messages = store.conversation("TECH_101").unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].sender, Sender::User);
    }

    #[test]
    fn test_duplicate_ticket_rolls_back() {
        let store = in_memory().unwrap();
        store.insert_ticket(&sample_ticket("TECH_102"), "first").unwrap();
        assert!(store.insert_ticket(&sample_ticket("TECH_102"), "second").is_err());
        // The failed insert left no stray message behind.
        assert_eq!(store.conversation("TECH_102").unwrap().len(), 1);
    }

    #[test]
    fn test_unknown_label_is_an_error() {
        let store = in_memory().unwrap();
        store.insert_ticket(&sample_ticket("TECH_103"), "x").unwrap();
        store
            .conn()
            .unwrap()
            .execute("UPDATE tickets SET priority = 'Blocker'", [])
            .unwrap();
        assert!(store.get_ticket("TECH_103").is_err());
    }

    #[test]
    fn test_message_order_follows_insertion() {
        let store = in_memory().unwrap();
        store.insert_ticket(&sample_ticket("TECH_104"), "first").unwrap();
        store.append_message("TECH_104", Sender::Agent, "second").unwrap();
        store.append_message("TECH_104", Sender::User, "third").unwrap();
        let texts: Vec<String> = store
            .conversation("TECH_104")
            .unwrap()
            .into_iter()
            .map(|m| m.message)
            .collect();
        assert_eq!(texts, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_fresh_schema_version() {
        let store = in_memory().unwrap();
        assert_eq!(schema::current_version(&store.conn().unwrap()).unwrap(), 2);
    }

    fn sample_entry(ticket_id: &str, title: &str) -> KbEntry {
        KbEntry {
            id: None,
            title: title.to_string(),
            content: "## Solution\nRestart the router".into(),
            category: category::NETWORK.to_string(),
            tags: vec![category::NETWORK.to_string(), "router".into()],
            source_ticket_id: Some(ticket_id.to_string()),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_kb_entries_one_per_ticket_newest_first() {
        let store = in_memory().unwrap();
        store.insert_ticket(&sample_ticket("TECH_105"), "first").unwrap();
        store.insert_ticket(&sample_ticket("TECH_106"), "second").unwrap();

        let first = store.insert_kb_entry(&sample_entry("TECH_105", "older")).unwrap();
        assert!(first.is_some());
        assert!(store
            .insert_kb_entry(&sample_entry("TECH_105", "duplicate"))
            .unwrap()
            .is_none());
        store.insert_kb_entry(&sample_entry("TECH_106", "newer")).unwrap();

        let entries = store.kb_entries_for_category(category::NETWORK).unwrap();
        let titles: Vec<&str> = entries.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["newer", "older"]);
        assert_eq!(entries[1].id, first);
        assert_eq!(entries[1].tags, vec![category::NETWORK, "router"]);
        assert!(store
            .kb_entries_for_category(category::SOFTWARE)
            .unwrap()
            .is_empty());
    }
}
