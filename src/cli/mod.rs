//! CLI module
//!
//! Command-line front end for the Taskdeck API.
//!
//! # Commands
//!
//! - `login` / `register` / `logout` / `whoami` - Session management
//! - `task list|get|create|status|done|delete` - Task operations
//! - `user list|get|tasks` - User operations

mod commands;
mod config;
mod runner;

pub use commands::{Cli, Commands, OutputFormat, TaskCommands, UserCommands};
pub use config::{default_config_path, default_credentials_path, Profile, SERVER_ENV};
pub use runner::Runner;
