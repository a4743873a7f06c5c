//! Turn administration commands: list, sessions, clear.
//!
//! Rich tables via comfy-table, `--json` for scripting, and a dialoguer
//! confirmation before deleting.

use anyhow::Result;
use comfy_table::{presets, Cell, Color, ContentArrangement, Table};
use console::style;
use dialoguer::Confirm;

use banter_core::turn::repository::TurnRepository;
use banter_types::turn::{ChatTurn, SessionSummary, TurnFilter, TIMESTAMP_FORMAT};

use crate::state::AppState;

/// List turns newest-first, optionally filtered by session and search text.
///
/// # Examples
///
/// ```bash
/// banter turns list --session 3f2a... --limit 10
/// banter turns list --search rust --json
/// ```
pub async fn list_turns(state: &AppState, filter: TurnFilter, json: bool) -> Result<()> {
    let turns = state.chat_service.repo().list(&filter).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&turns)?);
        return Ok(());
    }

    if turns.is_empty() {
        println!();
        println!("  {} No chat turns found.", style("i").blue().bold());
        println!();
        return Ok(());
    }

    println!();
    println!("{}", turns_table(&turns));
    println!();
    println!("  {} turn(s)", turns.len());
    println!();
    Ok(())
}

fn turns_table(turns: &[ChatTurn]) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("ID").fg(Color::White),
        Cell::new("Timestamp").fg(Color::White),
        Cell::new("Session").fg(Color::White),
        Cell::new("User message").fg(Color::White),
        Cell::new("AI response").fg(Color::White),
    ]);

    for turn in turns {
        table.add_row(vec![
            Cell::new(turn.id).fg(Color::DarkGrey),
            Cell::new(turn.display_timestamp()),
            Cell::new(&turn.session_id).fg(Color::Cyan),
            Cell::new(turn.user_message_preview()),
            Cell::new(turn.ai_response_preview()),
        ]);
    }

    table
}

/// List sessions with their turn counts, most recently active first.
pub async fn list_sessions(state: &AppState, json: bool) -> Result<()> {
    let sessions = state.chat_service.repo().sessions().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&sessions)?);
        return Ok(());
    }

    if sessions.is_empty() {
        println!();
        println!("  {} No sessions yet.", style("i").blue().bold());
        println!();
        return Ok(());
    }

    println!();
    println!("{}", sessions_table(&sessions));
    println!();
    Ok(())
}

fn sessions_table(sessions: &[SessionSummary]) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("Session").fg(Color::White),
        Cell::new("Turns").fg(Color::White),
        Cell::new("Last activity").fg(Color::White),
    ]);

    for summary in sessions {
        table.add_row(vec![
            Cell::new(&summary.session_id).fg(Color::Cyan),
            Cell::new(summary.turn_count),
            Cell::new(summary.last_activity.format(TIMESTAMP_FORMAT)).fg(Color::DarkGrey),
        ]);
    }

    table
}

/// Delete every turn in a session after confirmation.
pub async fn clear_session(state: &AppState, session_id: &str, force: bool, json: bool) -> Result<()> {
    let count = state.chat_service.repo().count(session_id).await?;

    if count == 0 {
        if json {
            println!("{}", serde_json::json!({ "session_id": session_id, "deleted": 0 }));
        } else {
            println!("  Session '{}' has no turns.", style(session_id).cyan());
        }
        return Ok(());
    }

    if !force && !json {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Permanently delete {count} turn(s) from session '{}'?",
                style(session_id).red().bold()
            ))
            .default(false)
            .interact()?;

        if !confirmed {
            println!("  Cancelled.");
            return Ok(());
        }
    }

    let deleted = state.chat_service.clear(session_id).await?;

    if json {
        println!("{}", serde_json::json!({ "session_id": session_id, "deleted": deleted }));
    } else {
        println!(
            "  {} Cleared {deleted} turn(s) from '{}'",
            style("✓").green().bold(),
            style(session_id).cyan()
        );
    }
    Ok(())
}
