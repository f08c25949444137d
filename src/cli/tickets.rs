// src/cli/tickets.rs — Ticket subcommands and their terminal output

use crate::core::desk::SupportDesk;
use crate::core::types::{Sender, Ticket};
use crate::infra::errors::SupportError;
use crate::knowledge;
use crate::store::Repository;
use crate::util::ellipsize;

pub async fn classify(desk: &SupportDesk, text: &str) -> anyhow::Result<()> {
    let c = desk.classify(text).await;
    println!("  Category:   {}", c.category);
    println!("  Sentiment:  {}", c.sentiment.as_str());
    println!("  Priority:   {} (urgency {}/10)", c.priority.as_str(), c.urgency);
    println!("  Team:       {}", c.team.as_str());
    println!("  Estimate:   {:.1} hours", c.estimated_hours);
    println!("  Summary:    {}", c.summary);
    println!("  Actions:\n{}", indent(&c.actions));
    Ok(())
}

pub async fn open(desk: &SupportDesk, text: &str, category: Option<&str>) -> anyhow::Result<()> {
    let Some(ticket) = desk.create_ticket(text, category).await else {
        anyhow::bail!("could not create ticket");
    };
    print_ticket(&ticket);
    Ok(())
}

pub async fn message(desk: &SupportDesk, ticket_id: &str, text: &str) -> anyhow::Result<()> {
    let Some(update) = desk.handle_ticket_message(ticket_id, Sender::User, text).await else {
        return Err(not_found(ticket_id));
    };
    if let Some(decision) = update.escalation.as_ref().filter(|d| d.escalate) {
        println!("Escalated: {}", decision.reason);
    }
    if let Some(reply) = &update.agent_reply {
        println!("agent: {}", reply.message);
    }
    println!("Status: {}", update.ticket.status.as_str());
    Ok(())
}

pub fn resolve(desk: &SupportDesk, ticket_id: &str, text: &str) -> anyhow::Result<()> {
    if !desk.resolve_ticket(ticket_id, text) {
        return Err(not_found(ticket_id));
    }
    println!("Ticket {ticket_id} closed.");
    Ok(())
}

pub fn feedback(
    desk: &SupportDesk,
    ticket_id: &str,
    rating: u8,
    comment: Option<&str>,
) -> anyhow::Result<()> {
    let Some(outcome) = desk.submit_feedback(ticket_id, rating, comment) else {
        anyhow::bail!("feedback rejected (unknown ticket or rating outside 1-5)");
    };
    if outcome.solution_updated {
        println!("Feedback recorded; solution statistics updated.");
    } else {
        println!("Feedback recorded.");
    }
    if let Some(id) = outcome.kb_entry_id {
        println!("Knowledge-base article #{id} created from this ticket.");
    }
    Ok(())
}

pub fn health(desk: &SupportDesk, ticket_id: &str) -> anyhow::Result<()> {
    let Some(report) = desk.conversation_health(ticket_id) else {
        return Err(not_found(ticket_id));
    };
    println!("Health score: {}/100", report.score);
    if let Some(m) = &report.metrics {
        println!(
            "  {} messages ({} user, {} agent), avg response {:.0}s, customer {}",
            m.total_messages,
            m.user_messages,
            m.agent_messages,
            m.avg_response_secs,
            m.user_sentiment.as_str()
        );
    }
    for s in &report.suggestions {
        println!("  - {s}");
    }
    Ok(())
}

pub fn show(desk: &SupportDesk, ticket_id: &str) -> anyhow::Result<()> {
    let Some(ticket) = desk.get_ticket(ticket_id) else {
        return Err(not_found(ticket_id));
    };
    print_ticket(&ticket);
    println!();
    for m in desk.conversation(ticket_id).unwrap_or_default() {
        println!(
            "  [{}] {}: {}",
            m.timestamp.format("%Y-%m-%d %H:%M"),
            m.sender.as_str(),
            ellipsize(&m.message, 120)
        );
    }
    Ok(())
}

pub fn stats(desk: &SupportDesk) -> anyhow::Result<()> {
    let Some(stats) = desk.stats() else {
        anyhow::bail!("could not load tickets");
    };
    println!(
        "Tickets: {} total, {} open, {} escalated, {} closed",
        stats.total, stats.open, stats.escalated, stats.closed
    );
    if let Some(hours) = stats.avg_resolution_hours {
        println!("Average resolution: {hours} hours");
    }
    for (team, n) in &stats.open_by_team {
        println!("  {team:<10} {n} open");
    }
    for (category, n) in &stats.by_category {
        println!("  {category}: {n}");
    }
    Ok(())
}

pub fn seed(repo: &dyn Repository) -> anyhow::Result<()> {
    let inserted = knowledge::seed::seed_solutions(repo)?;
    if inserted == 0 {
        println!("Knowledge base already populated.");
    } else {
        println!("Seeded {inserted} solutions.");
    }
    Ok(())
}

fn print_ticket(t: &Ticket) {
    println!("Ticket #{}", t.ticket_id);
    println!("  Category:   {}", t.category);
    println!("  Priority:   {}", t.priority.as_str());
    println!("  Sentiment:  {}", t.sentiment.as_str());
    println!("  Team:       {}", t.team.as_str());
    println!("  Status:     {}", t.status.as_str());
    println!("  Estimate:   {:.1} hours", t.estimated_resolution_hours);
    println!("  Summary:    {}", t.summary);
    if let Some(resolution) = &t.resolution {
        println!("  Resolution: {resolution}");
    }
}

fn not_found(ticket_id: &str) -> anyhow::Error {
    SupportError::NotFound {
        kind: "Ticket",
        id: ticket_id.to_string(),
    }
    .into()
}

fn indent(text: &str) -> String {
    text.lines()
        .map(|l| format!("    {l}"))
        .collect::<Vec<_>>()
        .join("\n")
}
