//! CLI module for roomwarden
//!
//! Provides command-line interface for:
//! - serve: Run the HTTP server (default)
//! - create-admin: Register an admin
//! - list-admins: Print registered admins

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command, ServeArgs, StoreArgs};
pub use commands::{create_admin, list_admins, run, run_command, serve};
pub use errors::{CliError, CliErrorCode, CliResult};
