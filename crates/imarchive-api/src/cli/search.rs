//! `imarc search`: two-phase text search across every chat.

use anyhow::Result;
use console::style;

use crate::cli::message::message_table;
use crate::state::AppState;

pub async fn search(state: &AppState, term: &str, limit: Option<u32>, json: bool) -> Result<()> {
    let results = state.service.search_messages(term, limit).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    if results.is_empty() {
        println!();
        println!(
            "  {} No messages match {}",
            style("i").blue().bold(),
            style(format!("\"{term}\"")).yellow()
        );
        println!();
        return Ok(());
    }

    println!();
    println!("{}", message_table(&results, None));
    println!();
    println!(
        "  {} match{} for {}",
        style(results.len()).bold(),
        if results.len() == 1 { "" } else { "es" },
        style(format!("\"{term}\"")).yellow()
    );
    if let Some(first) = results.first() {
        println!(
            "  {} Jump to a result: {}",
            style("→").dim(),
            style(format!("imarc around {} {}", first.chat_id, first.id)).yellow()
        );
    }
    println!();

    Ok(())
}
