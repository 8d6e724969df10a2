mod admin;
mod journal;
mod profile;
mod session;
mod watch;

use crate::Result;
use crate::app::App;
use crate::cli::Commands;

pub async fn run(app: &App, command: &Commands) -> Result<()> {
    match command {
        Commands::Login(args) => session::login(app, args).await,
        Commands::Signup(args) => session::signup(app, args).await,
        Commands::Logout => session::logout(app),
        Commands::Status => session::status(app),
        Commands::Validate => session::validate(app).await,
        Commands::Whoami => session::whoami(app).await,
        Commands::SwitchRole { role } => session::switch_role(app, role).await,
        Commands::OauthUrl {
            client_id,
            redirect_uri,
        } => session::oauth_url(client_id, redirect_uri),
        Commands::OauthCallback { url } => session::oauth_callback(app, url),
        Commands::Journal(command) => journal::run(app, command).await,
        Commands::Profile(command) => profile::run(app, command).await,
        Commands::Quote => profile::quote(app).await,
        Commands::Admin(command) => admin::run(app, command).await,
        Commands::Watch => watch::run(app).await,
    }
}
