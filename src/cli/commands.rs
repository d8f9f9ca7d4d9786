//! CLI commands and argument parsing

use crate::types::{SortDirection, TaskPriority, TaskStatus};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Taskdeck command-line client
#[derive(Parser, Debug)]
#[command(name = "taskdeck")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Server base URL (overrides profile and TASKDECK_SERVER)
    #[arg(short, long, global = true)]
    pub server: Option<String>,

    /// Profile config file (YAML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, default_value = "pretty")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in and store session credentials
    Login {
        /// Account email
        #[arg(long)]
        email: String,

        /// Account password
        #[arg(long)]
        password: String,
    },

    /// Register a new account
    Register {
        /// Account email
        #[arg(long)]
        email: String,

        /// Account password
        #[arg(long)]
        password: String,

        /// Display name
        #[arg(long)]
        name: Option<String>,
    },

    /// Revoke the current session and clear stored credentials
    Logout,

    /// Show the authenticated account
    Whoami,

    /// Task operations
    #[command(subcommand)]
    Task(TaskCommands),

    /// User operations
    #[command(subcommand)]
    User(UserCommands),
}

/// Task subcommands
#[derive(Subcommand, Debug)]
pub enum TaskCommands {
    /// List tasks
    List {
        /// Only tasks in this state
        #[arg(long)]
        status: Option<TaskStatus>,

        /// Only tasks with this priority
        #[arg(long)]
        priority: Option<TaskPriority>,

        /// Only tasks assigned to this user id
        #[arg(long)]
        assignee: Option<String>,

        /// Free-text search
        #[arg(long)]
        search: Option<String>,

        /// Page number
        #[arg(long, default_value = "1")]
        page: u32,

        /// Page size
        #[arg(long, default_value = "20")]
        limit: u32,

        /// Field to sort by
        #[arg(long)]
        sort_by: Option<String>,

        /// Sort direction
        #[arg(long, default_value = "asc")]
        sort_direction: SortDirection,

        /// Only unfinished tasks past their deadline
        #[arg(long)]
        overdue: bool,
    },

    /// Show one task
    Get {
        /// Task id
        id: String,
    },

    /// Create a task
    Create {
        /// Task title
        title: String,

        /// Longer description
        #[arg(long)]
        description: Option<String>,

        /// Initial workflow state
        #[arg(long)]
        status: Option<TaskStatus>,

        /// Priority
        #[arg(long)]
        priority: Option<TaskPriority>,

        /// Due date (RFC 3339)
        #[arg(long)]
        deadline: Option<DateTime<Utc>>,

        /// User ids to assign (repeatable)
        #[arg(long = "assignee")]
        assignees: Vec<String>,
    },

    /// Move a task to a new workflow state
    Status {
        /// Task id
        id: String,

        /// New state
        status: TaskStatus,
    },

    /// Mark a task done
    Done {
        /// Task id
        id: String,
    },

    /// Delete a task
    Delete {
        /// Task id
        id: String,
    },
}

/// User subcommands
#[derive(Subcommand, Debug)]
pub enum UserCommands {
    /// List users
    List {
        /// Filter by name or email
        #[arg(long)]
        search: Option<String>,
    },

    /// Show one user
    Get {
        /// User id
        id: String,
    },

    /// Show the tasks assigned to a user
    Tasks {
        /// User id
        id: String,
    },
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Machine-readable JSON
    Json,
    /// Human-readable output
    Pretty,
}
