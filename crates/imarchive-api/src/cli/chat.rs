//! `imarc chats`: the conversation list.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use crate::cli::{format_relative_time, truncate};
use crate::state::AppState;

pub async fn list_chats(state: &AppState, limit: Option<u32>, json: bool) -> Result<()> {
    let chats = state.service.list_chats(limit).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&chats)?);
        return Ok(());
    }

    if chats.is_empty() {
        println!();
        println!(
            "  {} No conversations in {}",
            style("i").blue().bold(),
            style(state.database_path.display()).yellow()
        );
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("ID").fg(Color::White),
        Cell::new("Name").fg(Color::White),
        Cell::new("Type").fg(Color::White),
        Cell::new("Participants").fg(Color::White),
        Cell::new("Last Message").fg(Color::White),
    ]);

    for chat in &chats {
        let kind = if chat.is_group {
            Cell::new("group").fg(Color::Magenta)
        } else {
            Cell::new("direct").fg(Color::DarkGrey)
        };

        let last = match &chat.last_message_at {
            Some(dt) => format_relative_time(dt),
            None => "never".to_string(),
        };

        table.add_row(vec![
            Cell::new(chat.id).fg(Color::DarkGrey),
            Cell::new(truncate(&chat.display_name, 40)).fg(Color::Cyan),
            kind,
            Cell::new(truncate(&chat.participants.join(", "), 50)),
            Cell::new(last).fg(Color::DarkGrey),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    println!(
        "  {} conversation{}",
        style(chats.len()).bold(),
        if chats.len() == 1 { "" } else { "s" }
    );
    println!();

    Ok(())
}
