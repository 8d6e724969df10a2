use chrono::Local;
use jotter_api_client::Credentials;
use jotter_core::auth::oauth::{google_authorization_url, parse_oauth_callback};
use jotter_core::auth::token::{expiration_time, time_until_expiry};
use jotter_core::models::session::{Role, SessionPhase};
use jotter_core::notify::banner::format_countdown;
use jotter_core::session::guard::{Access, landing_route};

use crate::Result;
use crate::app::App;
use crate::cli::CredentialArgs;

pub async fn login(app: &App, args: &CredentialArgs) -> Result<()> {
    let credentials = Credentials::new(args.username.as_str(), args.password.as_str());
    let role = app.client.sign_in(&credentials).await?;
    println!("Signed in as {} ({role}).", args.username.trim());
    println!("Home: {}", landing_route(&role));
    Ok(())
}

pub async fn signup(app: &App, args: &CredentialArgs) -> Result<()> {
    let credentials = Credentials::new(args.username.as_str(), args.password.as_str());
    app.client.sign_up(&credentials).await?;
    println!("Signup successful! Run `jotter login` to sign in.");
    Ok(())
}

pub fn logout(app: &App) -> Result<()> {
    app.store.logout()?;
    println!("Signed out.");
    Ok(())
}

pub fn status(app: &App) -> Result<()> {
    let session = app.store.snapshot();
    let (Some(identity), Some(role), Some(token)) =
        (session.identity(), session.role(), session.token())
    else {
        println!("Not signed in.");
        return Ok(());
    };

    println!("Signed in as {} ({role})", identity.username);
    let state = match session.phase() {
        SessionPhase::Validating => "stored, not yet confirmed",
        SessionPhase::Authenticated => "confirmed",
        SessionPhase::Unauthenticated => "signed out",
    };
    println!("Session: {state}");

    match expiration_time(token) {
        Some(expiry) => {
            let remaining = time_until_expiry(token);
            let when = expiry.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S");
            if remaining > 0 {
                println!("Token expires: {when} (in {})", format_countdown(remaining));
            } else {
                println!("Token expired: {when}");
            }
        }
        None => println!("Token expires: unreadable token"),
    }
    println!("Home: {}", landing_route(role));
    Ok(())
}

pub async fn validate(app: &App) -> Result<()> {
    if app.store.token().is_none() {
        println!("Not signed in.");
        return Ok(());
    }
    if app.manager.validate().await {
        println!("Session is valid.");
        Ok(())
    } else {
        Err(crate::Error::custom(
            "Your session has expired. Please login again.",
        ))
    }
}

pub async fn whoami(app: &App) -> Result<()> {
    app.require(Access::Authenticated).await?;
    let identity = app.client.refresh_identity().await?;
    println!("{}", identity.username);
    if let Some(email) = &identity.email {
        println!("Email: {email}");
    }
    let roles: Vec<&str> = identity.roles.iter().map(Role::as_str).collect();
    if !roles.is_empty() {
        println!("Roles: {}", roles.join(", "));
    }
    Ok(())
}

pub async fn switch_role(app: &App, role: &str) -> Result<()> {
    app.require(Access::Authenticated).await?;
    let role = Role::new(role.trim().to_uppercase());
    app.store.switch_role(role.clone())?;
    println!("Now acting as {role}.");
    println!("Home: {}", landing_route(&role));
    Ok(())
}

pub fn oauth_url(client_id: &str, redirect_uri: &str) -> Result<()> {
    println!("{}", google_authorization_url(client_id, redirect_uri)?);
    Ok(())
}

pub fn oauth_callback(app: &App, url: &str) -> Result<()> {
    let callback = parse_oauth_callback(url)?;
    let role = app.client.sign_in_with_callback(callback)?;
    println!("Signed in with Google ({role}).");
    println!("Home: {}", landing_route(&role));
    Ok(())
}
