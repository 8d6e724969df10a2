use jotter_core::notify::banner::{ExpiredBanner, ExpiryWarningBanner, format_countdown};
use jotter_core::session::guard::Access;
use log::info;

use crate::app::App;
use crate::{Error, Result};

/// Run the session monitor in the foreground until Ctrl-C or expiry.
pub async fn run(app: &App) -> Result<()> {
    let session = app.require(Access::Authenticated).await?;
    if let Some(identity) = session.identity() {
        println!("Watching session for {}. Press Ctrl-C to stop.", identity.username);
    }

    let mut expired = ExpiredBanner::mount(&app.store);
    let mut warning = ExpiryWarningBanner::mount(&app.store);
    let monitor = app.manager.spawn_monitor();

    let outcome = loop {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                info!("interrupted");
                break signal.map_err(Error::from);
            }
            open = warning.wait_open() => {
                if !open {
                    break Ok(());
                }
                if let (Some(message), Some(remaining)) = (warning.message(), warning.remaining_ms()) {
                    println!("{message} ({} left)", format_countdown(remaining));
                }
                warning.dismiss();
            }
            open = expired.wait_open() => {
                if !open {
                    break Ok(());
                }
                let message = expired.message().unwrap_or_default().to_string();
                expired.login_again();
                break Err(Error::custom(message));
            }
        }
    };

    monitor.stop().await;
    outcome
}
