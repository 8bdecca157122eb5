//! CLI argument definitions using clap
//!
//! Commands:
//! - roomwarden [serve] [--config <path>] [--port <port>] ...
//! - roomwarden create-admin [--username <name>] [--password <pw>]
//! - roomwarden list-admins
//!
//! Running without a subcommand serves.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::Config;

/// Roomwarden - shared room board with reviewer-voted access requests
#[derive(Parser, Debug)]
#[command(name = "roomwarden")]
#[command(version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub serve: ServeArgs,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the HTTP server
    Serve(ServeArgs),

    /// Register an admin (prompts for missing fields)
    CreateAdmin {
        #[command(flatten)]
        store: StoreArgs,

        /// Admin username
        #[arg(long)]
        username: Option<String>,

        /// Admin password
        #[arg(long)]
        password: Option<String>,
    },

    /// Print registered admins as JSON
    ListAdmins {
        #[command(flatten)]
        store: StoreArgs,
    },
}

/// Config file and database location
#[derive(Args, Debug, Clone, Default)]
pub struct StoreArgs {
    /// Path to JSON configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// SQLite database file
    #[arg(long, env = "DB_PATH")]
    pub db_path: Option<PathBuf>,
}

impl StoreArgs {
    /// Apply overrides on top of file values
    pub fn apply(&self, config: &mut Config) {
        if let Some(db_path) = &self.db_path {
            config.db_path = db_path.clone();
        }
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct ServeArgs {
    #[command(flatten)]
    pub store: StoreArgs,

    /// Port to listen on
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// Session token signing secret
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: Option<String>,

    /// Display name of the room
    #[arg(long, env = "ROOM_NAME")]
    pub room_name: Option<String>,

    /// Directory with index.html and admin.html
    #[arg(long, env = "ROOMWARDEN_PUBLIC_DIR")]
    pub public_dir: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long)]
    pub log_level: Option<String>,
}

impl ServeArgs {
    /// Apply overrides on top of file values
    pub fn apply(&self, config: &mut Config) {
        self.store.apply(config);

        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(secret) = &self.jwt_secret {
            config.auth.jwt_secret = secret.clone();
        }
        if let Some(room_name) = &self.room_name {
            config.room_name = room_name.clone();
        }
        if let Some(public_dir) = &self.public_dir {
            config.server.public_dir = public_dir.clone();
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
    }
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    /// The command to run; bare invocation serves
    pub fn into_command(self) -> Command {
        self.command.unwrap_or(Command::Serve(self.serve))
    }
}
