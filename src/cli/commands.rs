//! CLI command implementations
//!
//! Every command resolves configuration the same way: defaults, then the
//! optional JSON file, then flags and environment variables.

use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::auth::{AdminSummary, Credentials, NewAdmin, ReviewerDirectory};
use crate::config::Config;
use crate::http_server::{AppState, HttpServer};
use crate::store::SqliteStore;

use super::args::{Cli, Command, ServeArgs, StoreArgs};
use super::errors::{CliError, CliResult};
use super::io::{prompt_line, prompt_password, write_json};

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    run_command(cli.into_command())
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Serve(args) => serve(&args),
        Command::CreateAdmin {
            store,
            username,
            password,
        } => create_admin(&store, username, password),
        Command::ListAdmins { store } => list_admins(&store),
    }
}

/// Start the HTTP server
///
/// 1. Resolve and validate configuration
/// 2. Install the tracing subscriber
/// 3. Open the database, creating the schema if needed
/// 4. Serve until ctrl-c
pub fn serve(args: &ServeArgs) -> CliResult<()> {
    let mut config = Config::load_or_default(args.store.config.as_deref())?;
    args.apply(&mut config);
    config.validate()?;

    init_logging(&config.log_level);

    if config.auth.uses_default_secret() {
        warn!("JWT_SECRET is not set; sessions are signed with the built-in development secret");
    }

    let store = Arc::new(open_store(&config)?);
    let state = Arc::new(AppState::new(store, &config));
    let server = HttpServer::new(state, config.server.clone());

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::serve_failed(format!("Failed to create tokio runtime: {}", e)))?;

    rt.block_on(async {
        server
            .start()
            .await
            .map_err(|e| CliError::serve_failed(format!("HTTP server failed: {}", e)))
    })
}

/// Register an admin directly in the database
///
/// Missing username or password are prompted for; the password prompt
/// does not echo.
pub fn create_admin(
    args: &StoreArgs,
    username: Option<String>,
    password: Option<String>,
) -> CliResult<()> {
    let config = resolve_store_config(args)?;

    let username = match username {
        Some(username) => username,
        None => prompt_line("Username")?,
    };
    let password = match password {
        Some(password) => password,
        None => prompt_password("Password")?,
    };

    let store = open_store(&config)?;
    let new_admin = NewAdmin::from_credentials(
        &Credentials::new(username, password),
        &config.auth.password_policy(),
    )?;
    let admin = store.add(&new_admin)?;

    write_json(&AdminSummary::from(&admin))
}

/// Print every registered admin
pub fn list_admins(args: &StoreArgs) -> CliResult<()> {
    let config = resolve_store_config(args)?;
    let store = open_store(&config)?;

    let admins: Vec<AdminSummary> = store.list()?.iter().map(AdminSummary::from).collect();
    write_json(&admins)
}

fn resolve_store_config(args: &StoreArgs) -> CliResult<Config> {
    let mut config = Config::load_or_default(args.config.as_deref())?;
    args.apply(&mut config);
    config.validate()?;
    Ok(config)
}

fn open_store(config: &Config) -> CliResult<SqliteStore> {
    let store = SqliteStore::open(&config.db_path)?;
    info!(path = %config.db_path.display(), "Database opened");
    Ok(store)
}

/// `RUST_LOG` wins over the configured level
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
