use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Jotter journaling client.
#[derive(Parser, Debug)]
#[command(name = "jotter", version, about = "Jotter journaling client")]
pub struct Cli {
    /// REST API base URL (defaults to `JOTTER_API_BASE_URL` or http://localhost:8080).
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Directory holding the session file.
    #[arg(long, global = true, env = "JOTTER_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Log what the client is doing.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sign in with username and password.
    Login(CredentialArgs),

    /// Create an account.
    Signup(CredentialArgs),

    /// Sign out and forget the session.
    Logout,

    /// Show the stored session without contacting the server.
    Status,

    /// Check the session with the server.
    Validate,

    /// Fetch the signed-in profile.
    Whoami,

    /// Act as another role the account holds.
    SwitchRole {
        /// Role to switch to (e.g. USER, ADMIN).
        role: String,
    },

    /// Print the Google sign-in URL.
    OauthUrl {
        #[arg(long, env = "JOTTER_GOOGLE_CLIENT_ID")]
        client_id: String,

        #[arg(long, env = "JOTTER_GOOGLE_REDIRECT_URI")]
        redirect_uri: String,
    },

    /// Complete sign-in from an OAuth redirect URL or query string.
    OauthCallback {
        /// Redirect URL, or just its `?token=...&role=...` part.
        url: String,
    },

    /// Journal entries.
    #[command(subcommand)]
    Journal(JournalCommand),

    /// Profile settings.
    #[command(subcommand)]
    Profile(ProfileCommand),

    /// Today's quote.
    Quote,

    /// Admin console.
    #[command(subcommand)]
    Admin(AdminCommand),

    /// Keep the session checked and print expiry warnings until interrupted.
    Watch,
}

#[derive(Args, Debug)]
pub struct CredentialArgs {
    #[arg(short, long)]
    pub username: String,

    #[arg(short, long, env = "JOTTER_PASSWORD", hide_env_values = true)]
    pub password: String,
}

#[derive(Subcommand, Debug)]
pub enum JournalCommand {
    /// List entries, newest first.
    List,

    /// Write a new entry.
    Add {
        #[arg(short, long)]
        title: String,

        #[arg(short, long)]
        content: String,
    },

    /// Replace an entry's title and content.
    Edit {
        id: String,

        #[arg(short, long)]
        title: String,

        #[arg(short, long)]
        content: String,
    },

    /// Delete an entry.
    Rm { id: String },

    /// Writing statistics.
    Stats,
}

#[derive(Subcommand, Debug)]
pub enum ProfileCommand {
    /// Show the profile.
    Show,

    /// Update username, email and sentiment analysis.
    Update {
        #[arg(long)]
        username: Option<String>,

        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        sentiment_analysis: Option<bool>,
    },

    /// Change the password.
    Password {
        #[arg(long)]
        current: String,

        #[arg(long)]
        new: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum AdminCommand {
    /// List all users.
    Users,

    /// User, admin and journal counts, with the latest journals.
    Overview,

    /// Mood counts for the past week.
    Moods,

    /// Replace a user's roles.
    SetRoles {
        username: String,

        /// Roles to grant, e.g. `--role USER --role ADMIN`.
        #[arg(long = "role", required = true)]
        roles: Vec<String>,

        #[arg(long, default_value = "")]
        email: String,
    },

    /// Delete a user by id.
    DeleteUser { id: String },
}
