//! `imarc schema`: tables and columns detected at open time.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use imarchive_infra::sqlite::schema::{OPTIONAL_TABLES, REQUIRED_TABLES};

use crate::state::AppState;

pub async fn show_schema(state: &AppState, json: bool) -> Result<()> {
    let schema = state.service.store().schema().await?;

    if json {
        let report = serde_json::json!({
            "database": state.database_path.display().to_string(),
            "schema": schema,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Table").fg(Color::White),
        Cell::new("Role").fg(Color::White),
        Cell::new("Columns").fg(Color::White),
    ]);

    for table_name in REQUIRED_TABLES.iter().chain(OPTIONAL_TABLES) {
        let role = if REQUIRED_TABLES.contains(table_name) {
            "required"
        } else {
            "optional"
        };
        let columns = schema
            .tables()
            .find(|(name, _)| name == table_name)
            .map(|(_, cols)| cols.iter().cloned().collect::<Vec<_>>().join(", "));

        match columns {
            Some(columns) => table.add_row(vec![
                Cell::new(table_name).fg(Color::Cyan),
                Cell::new(role),
                Cell::new(columns),
            ]),
            None => table.add_row(vec![
                Cell::new(table_name).fg(Color::DarkGrey),
                Cell::new(role),
                Cell::new("(absent)").fg(Color::DarkGrey),
            ]),
        };
    }

    println!();
    println!(
        "  {} {}",
        style("Database:").bold(),
        style(state.database_path.display()).cyan()
    );
    println!();
    println!("{table}");
    println!();

    Ok(())
}
