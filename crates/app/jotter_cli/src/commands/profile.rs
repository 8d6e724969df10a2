use jotter_core::models::journal::{DailyQuote, ProfileUpdate};
use jotter_core::models::session::Identity;
use jotter_core::session::guard::Access;
use log::warn;

use crate::Result;
use crate::app::App;
use crate::cli::ProfileCommand;

pub async fn run(app: &App, command: &ProfileCommand) -> Result<()> {
    app.require(Access::Authenticated).await?;

    match command {
        ProfileCommand::Show => {
            let identity = app.client.refresh_identity().await?;
            print_profile(&identity);
        }
        ProfileCommand::Update {
            username,
            email,
            sentiment_analysis,
        } => {
            // Unset flags keep the server's current value.
            let current = app.client.current_user().await?;
            let update = ProfileUpdate {
                username: username.clone().unwrap_or(current.username),
                email: email.clone().or(current.email).unwrap_or_default(),
                sentiment_analysis: sentiment_analysis.unwrap_or(current.sentiment_analysis),
            };
            let identity = app.client.update_profile(&update).await?;
            println!("Profile updated.");
            print_profile(&identity);
        }
        ProfileCommand::Password { current, new } => {
            app.client.change_password(current, new).await?;
            println!("Password changed.");
        }
    }
    Ok(())
}

pub async fn quote(app: &App) -> Result<()> {
    app.require(Access::Authenticated).await?;

    let quote = match app.client.daily_quote().await {
        Ok(quote) => quote,
        Err(err) if err.is_session_rejected() => return Err(err.into()),
        Err(err) => {
            warn!("quote unavailable: {err}");
            DailyQuote::fallback()
        }
    };
    println!("\"{}\"", quote.quote);
    if !quote.author.is_empty() {
        println!("  - {}", quote.author);
    }
    Ok(())
}

fn print_profile(identity: &Identity) {
    println!("Username:           {}", identity.username);
    println!(
        "Email:              {}",
        identity.email.as_deref().unwrap_or("-")
    );
    println!(
        "Sentiment analysis: {}",
        if identity.sentiment_analysis { "on" } else { "off" }
    );
}
