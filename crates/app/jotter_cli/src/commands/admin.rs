use chrono::Local;
use jotter_core::models::journal::RoleChange;
use jotter_core::models::session::Role;
use jotter_core::session::guard::Access;
use jotter_core::stats::{AdminOverview, MoodSeries};

use crate::Result;
use crate::app::App;
use crate::cli::AdminCommand;

pub async fn run(app: &App, command: &AdminCommand) -> Result<()> {
    app.require(Access::Admin).await?;

    match command {
        AdminCommand::Users => {
            let users = app.client.all_users().await?;
            for user in &users {
                let roles: Vec<&str> = user.roles.iter().map(Role::as_str).collect();
                println!(
                    "{:<24} {:<12} {:<28} {} journals",
                    user.id.as_deref().unwrap_or("-"),
                    user.username,
                    user.email.as_deref().unwrap_or("-"),
                    user.journal_entry_list.len()
                );
                println!("    roles: {}", roles.join(", "));
            }
        }
        AdminCommand::Overview => {
            let users = app.client.all_users().await?;
            let overview = AdminOverview::compute(&users);
            println!("Users:    {}", overview.total_users);
            println!("Admins:   {}", overview.total_admins);
            println!("Journals: {}", overview.total_journals);
            if !overview.recent_journals.is_empty() {
                println!();
                println!("Recent journals:");
            }
            for authored in &overview.recent_journals {
                let date = authored
                    .entry
                    .timestamp()
                    .map(|d| d.with_timezone(&Local).format("%Y-%m-%d").to_string())
                    .unwrap_or_else(|| "----------".to_string());
                println!("  {date}  {:<12} {}", authored.username, authored.entry.title);
            }
        }
        AdminCommand::Moods => {
            let stats = app.client.weekly_mood_stats().await?;
            let series = MoodSeries::from_weekly(&stats);
            for day in &series.days {
                let counts: Vec<String> = day
                    .counts
                    .iter()
                    .filter(|(_, n)| *n > 0)
                    .map(|(sentiment, n)| format!("{sentiment} {n}"))
                    .collect();
                println!("{}  {:>3}  {}", day.date, day.total(), counts.join(", "));
            }
            let totals: Vec<String> = series
                .totals()
                .iter()
                .map(|(sentiment, n)| format!("{sentiment} {n}"))
                .collect();
            println!("Week: {}", totals.join(", "));
        }
        AdminCommand::SetRoles {
            username,
            roles,
            email,
        } => {
            let change = RoleChange {
                username: username.clone(),
                roles: roles
                    .iter()
                    .map(|r| Role::new(r.trim().to_uppercase()))
                    .collect(),
                email: email.clone(),
            };
            app.client.change_roles(&change).await?;
            println!("Roles updated for {username}.");
        }
        AdminCommand::DeleteUser { id } => {
            app.client.delete_user(id).await?;
            println!("User {id} deleted.");
        }
    }
    Ok(())
}
