//! CLI argument definitions for the Userbase binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Userbase user administration client and development server
#[derive(Parser, Debug)]
#[command(name = "userbase")]
#[command(about = "Userbase: list, inspect and edit users of a REST backend")]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub client: ClientArgs,

    /// Print machine-readable JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List users, optionally one page at a time
    List(ListArgs),
    /// Print the raw record of one user
    Get(IdArgs),
    /// Create a user
    Add(AddArgs),
    /// Change fields of an existing user
    Update(UpdateArgs),
    /// Delete a user
    Delete(IdArgs),
    /// Run a development REST server backed by memory
    Serve(ServeArgs),
    /// Check health of a running Userbase server
    Health,
}

/// Connection settings shared by every client command
#[derive(clap::Args, Debug, Clone)]
pub struct ClientArgs {
    /// Base URL of the REST backend
    #[arg(
        long,
        global = true,
        default_value = "http://127.0.0.1:3000",
        env = "USERBASE_URL"
    )]
    pub url: String,

    /// Id of the authenticated user, recorded as owner of created users
    #[arg(long, global = true, env = "USERBASE_USER_ID")]
    pub user_id: Option<String>,

    /// Bearer token sent with every request
    #[arg(long, global = true, env = "USERBASE_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true, default_value_t = 10)]
    pub timeout: u64,
}

/// Arguments for the list command
#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// 1-based page number
    #[arg(long)]
    pub page: Option<u32>,

    /// Records per page
    #[arg(long)]
    pub per_page: Option<u32>,

    /// Field to sort by
    #[arg(long)]
    pub sort: Option<String>,
}

/// A command addressing one user by id
#[derive(clap::Args, Debug)]
pub struct IdArgs {
    /// User id
    pub id: String,
}

/// Arguments for the add command
#[derive(clap::Args, Debug)]
pub struct AddArgs {
    #[arg(long)]
    pub username: String,

    #[arg(long)]
    pub email: String,

    #[arg(long)]
    pub password: String,
}

/// Arguments for the update command
///
/// Only the fields given are changed.
#[derive(clap::Args, Debug)]
pub struct UpdateArgs {
    /// User id
    pub id: String,

    #[arg(long)]
    pub email: Option<String>,

    #[arg(long)]
    pub username: Option<String>,

    #[arg(long)]
    pub role: Option<String>,

    #[arg(long)]
    pub active: Option<bool>,

    #[arg(long)]
    pub verified: Option<bool>,
}

impl UpdateArgs {
    /// Whether any field change was requested.
    pub fn has_changes(&self) -> bool {
        self.email.is_some()
            || self.username.is_some()
            || self.role.is_some()
            || self.active.is_some()
            || self.verified.is_some()
    }
}

/// Arguments for the serve command
#[derive(clap::Args, Debug)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(short, long, default_value_t = 3000, env = "USERBASE_PORT")]
    pub port: u16,

    /// Bind address
    #[arg(long, default_value = "127.0.0.1", env = "USERBASE_HOST")]
    pub host: String,

    /// JSON file the store is loaded from on start and saved to on shutdown.
    /// Without it the store is ephemeral.
    #[arg(short = 'D', long, env = "USERBASE_DATA_FILE")]
    pub data_file: Option<PathBuf>,
}
