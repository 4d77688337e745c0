//! `imarc messages` and `imarc around`: reading a conversation.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use imarchive_core::decoder::{ATTACHMENT_SENTINEL, EMPTY_SENTINEL, RICH_TEXT_SENTINEL};
use imarchive_types::message::ProcessedMessage;

use crate::cli::truncate;
use crate::state::AppState;

const TEXT_WIDTH: usize = 80;

/// Render messages as a table. The row at `highlight` is marked as the target.
pub fn message_table(messages: &[ProcessedMessage], highlight: Option<usize>) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("ID").fg(Color::White),
        Cell::new("Date").fg(Color::White),
        Cell::new("From").fg(Color::White),
        Cell::new("Text").fg(Color::White),
    ]);

    for (idx, msg) in messages.iter().enumerate() {
        let mut date = msg.date.format("%Y-%m-%d %H:%M").to_string();
        if msg.date_estimated {
            date.push('?');
        }

        let sender = if msg.is_from_me {
            Cell::new(&msg.sender).fg(Color::Green)
        } else {
            Cell::new(&msg.sender).fg(Color::Cyan)
        };

        let mut body = truncate(&msg.text, TEXT_WIDTH);
        if msg.attachments.len() > 1 {
            body.push_str(&format!(" (+{} files)", msg.attachments.len()));
        }
        let text = match msg.text.as_str() {
            RICH_TEXT_SENTINEL | ATTACHMENT_SENTINEL | EMPTY_SENTINEL => {
                Cell::new(body).fg(Color::DarkGrey)
            }
            _ => Cell::new(body),
        };

        let id = if highlight == Some(idx) {
            Cell::new(format!("▶ {}", msg.id)).fg(Color::Yellow)
        } else {
            Cell::new(msg.id).fg(Color::DarkGrey)
        };

        table.add_row(vec![id, Cell::new(date).fg(Color::DarkGrey), sender, text]);
    }

    table
}

pub async fn show_messages(
    state: &AppState,
    chat_id: i64,
    limit: Option<u32>,
    offset: u32,
    json: bool,
) -> Result<()> {
    let page = state.service.get_messages(chat_id, limit, offset).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&page)?);
        return Ok(());
    }

    if page.messages.is_empty() {
        println!();
        println!(
            "  {} No messages in chat {} at offset {}",
            style("i").blue().bold(),
            style(chat_id).cyan(),
            offset
        );
        println!();
        return Ok(());
    }

    println!();
    println!("{}", message_table(&page.messages, None));
    println!();
    if page.has_more {
        let next = offset + page.messages.len() as u32;
        println!(
            "  {} Older messages: {}",
            style("…").dim(),
            style(format!("imarc messages {chat_id} --offset {next}")).yellow()
        );
        println!();
    }

    Ok(())
}

pub async fn show_around(
    state: &AppState,
    chat_id: i64,
    message_id: i64,
    width: Option<u32>,
    json: bool,
) -> Result<()> {
    let context = state
        .service
        .get_messages_around_message(chat_id, message_id, width)
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&context)?);
        return Ok(());
    }

    println!();
    if context.target_index.is_none() {
        println!(
            "  {} Message {} not found in chat {}; showing the latest messages",
            style("!").yellow().bold(),
            style(message_id).cyan(),
            style(chat_id).cyan()
        );
        println!();
    }
    if !context.messages.is_empty() {
        println!("{}", message_table(&context.messages, context.target_index));
        println!();
    }

    Ok(())
}
