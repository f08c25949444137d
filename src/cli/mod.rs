// src/cli/mod.rs — CLI definition (clap derive)

pub mod chat;
pub mod tickets;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "ticketpilot",
    about = "Support ticket triage and conversational intake",
    version
)]
pub struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Database file (overrides [store].path)
    #[arg(long, global = true)]
    pub db: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Interactive support chat
    Chat {
        /// Session id (a fresh one is generated when omitted)
        #[arg(long)]
        session: Option<String>,
    },
    /// Classify a description without storing anything
    Classify { text: Vec<String> },
    /// Open a ticket from a description
    Ticket {
        text: Vec<String>,
        /// Keep this category instead of the predicted one
        #[arg(long)]
        category: Option<String>,
    },
    /// Post a user message to a ticket
    Message { ticket_id: String, text: Vec<String> },
    /// Close a ticket with a resolution
    Resolve { ticket_id: String, text: Vec<String> },
    /// Rate how a ticket was resolved (1-5)
    Feedback {
        ticket_id: String,
        rating: u8,
        #[arg(long)]
        comment: Option<String>,
    },
    /// Conversation health of a ticket
    Health { ticket_id: String },
    /// Show a ticket and its conversation
    Show { ticket_id: String },
    /// Ticket counts and resolution times
    Stats,
    /// Load the built-in solution catalogue into an empty knowledge base
    Seed,
}

/// Join positional words back into one line of text.
pub fn joined(words: &[String]) -> anyhow::Result<String> {
    let text = words.join(" ");
    if text.trim().is_empty() {
        anyhow::bail!("text must not be empty");
    }
    Ok(text)
}
