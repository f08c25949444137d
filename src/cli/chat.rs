// src/cli/chat.rs — Interactive support chat

use crate::core::desk::SupportDesk;
use crate::core::types::ChatTurn;

/// Run the chat REPL until EOF or `quit`.
pub async fn run_chat(desk: &SupportDesk, session_id: &str) -> anyhow::Result<()> {
    eprintln!(
        "ticketpilot v{} | generator: {} | session: {}\n",
        env!("CARGO_PKG_VERSION"),
        desk.generator_id(),
        session_id,
    );

    let mut history: Vec<ChatTurn> = Vec::new();

    while let Some(input) = read_input() {
        let trimmed = input.trim();

        if trimmed == "quit" || trimmed == "exit" || trimmed == "/quit" {
            break;
        }
        if trimmed.is_empty() {
            continue;
        }

        let reply = desk.respond_to_query(trimmed, &history, session_id).await;
        println!("\n{}\n", reply.response);
        if reply.create_ticket {
            if let Some(id) = &reply.ticket_id {
                eprintln!("[ticket {id}]");
            }
        }

        history.push(ChatTurn::user(trimmed));
        history.push(ChatTurn::agent(reply.response));
    }

    Ok(())
}

fn read_input() -> Option<String> {
    use std::io::{self, BufRead, Write};

    print!("> ");
    io::stdout().flush().ok();

    let mut line = String::new();
    match io::stdin().lock().read_line(&mut line) {
        Ok(0) => None,
        Ok(_) => Some(line),
        Err(_) => None,
    }
}
