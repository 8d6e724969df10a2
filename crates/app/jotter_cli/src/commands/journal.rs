use chrono::{Local, Utc};
use jotter_core::models::journal::{JournalDraft, JournalEntry};
use jotter_core::session::guard::Access;
use jotter_core::stats::JournalStats;

use crate::Result;
use crate::app::App;
use crate::cli::JournalCommand;

pub async fn run(app: &App, command: &JournalCommand) -> Result<()> {
    app.require(Access::Authenticated).await?;

    match command {
        JournalCommand::List => {
            let entries = app.client.journal_entries().await?;
            if entries.is_empty() {
                println!("No journal entries yet.");
            }
            for entry in &entries {
                print_entry(entry);
            }
        }
        JournalCommand::Add { title, content } => {
            app.client
                .create_journal_entry(&draft(title, content))
                .await?;
            println!("Journal entry saved.");
        }
        JournalCommand::Edit { id, title, content } => {
            app.client
                .update_journal_entry(id, &draft(title, content))
                .await?;
            println!("Journal entry {id} updated.");
        }
        JournalCommand::Rm { id } => {
            app.client.delete_journal_entry(id).await?;
            println!("Journal entry {id} deleted.");
        }
        JournalCommand::Stats => {
            let entries = app.client.journal_entries().await?;
            let stats = JournalStats::compute(&entries, Utc::now());
            println!("Total entries:  {}", stats.total);
            println!("This week:      {}", stats.this_week);
            println!("This month:     {}", stats.this_month);
            println!("Avg per week:   {}", stats.avg_per_week_display());
        }
    }
    Ok(())
}

fn draft(title: &str, content: &str) -> JournalDraft {
    JournalDraft {
        title: title.to_string(),
        content: content.to_string(),
    }
}

fn print_entry(entry: &JournalEntry) {
    let date = entry
        .timestamp()
        .map(|d| d.with_timezone(&Local).format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "----------".to_string());
    let mood = entry
        .sentiment
        .as_ref()
        .map(|s| format!(" [{s}]"))
        .unwrap_or_default();
    println!("{date}  {}  {}{mood}", entry.id, entry.title);
    for line in entry.content.lines() {
        println!("    {line}");
    }
}
