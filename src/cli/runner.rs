//! CLI runner - executes commands

use crate::api::{
    AuthApi, CreateTask, LoginRequest, RegisterRequest, Task, TaskApi, TaskFilters, UserApi,
};
use crate::cli::commands::{Cli, Commands, OutputFormat, TaskCommands, UserCommands};
use crate::cli::config::{default_credentials_path, Profile, SERVER_ENV};
use crate::credentials::FileCredentialStore;
use crate::error::{Error, Result};
use crate::http::{ApiClient, ApiClientConfig};
use crate::types::TaskStatus;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        let profile = match &self.cli.config {
            Some(path) => Profile::load(path)?,
            None => Profile::load_default()?,
        };
        let client = self.build_client(&profile)?;

        match &self.cli.command {
            Commands::Login { email, password } => {
                let auth = AuthApi::new(client);
                let response = auth
                    .login(&LoginRequest {
                        email: email.clone(),
                        password: password.clone(),
                    })
                    .await?;
                self.emit(&response.user, |user| {
                    println!("Logged in as {} ({})", user.email, user.role);
                })
            }

            Commands::Register {
                email,
                password,
                name,
            } => {
                let auth = AuthApi::new(client);
                let response = auth
                    .register(&RegisterRequest {
                        email: email.clone(),
                        password: password.clone(),
                        name: name.clone(),
                    })
                    .await?;
                self.emit(&response.user, |user| {
                    println!("Registered {} ({})", user.email, user.id);
                })
            }

            Commands::Logout => {
                AuthApi::new(client).logout().await?;
                println!("Logged out");
                Ok(())
            }

            Commands::Whoami => {
                let auth = AuthApi::new(client);
                match auth.current_user().await? {
                    Some(claims) => self.emit(&claims, |claims| {
                        println!("{} ({}, {})", claims.email, claims.user_id, claims.role);
                    }),
                    None => {
                        println!("Not logged in");
                        Ok(())
                    }
                }
            }

            Commands::Task(command) => self.run_task(client, command).await,
            Commands::User(command) => self.run_user(client, command).await,
        }
    }

    async fn run_task(&self, client: ApiClient, command: &TaskCommands) -> Result<()> {
        let tasks = TaskApi::new(client);

        match command {
            TaskCommands::List {
                status,
                priority,
                assignee,
                search,
                page,
                limit,
                sort_by,
                sort_direction,
                overdue,
            } => {
                let listing = if *overdue {
                    tasks.overdue().await?
                } else {
                    let mut filters = TaskFilters::new().page(*page, *limit);
                    filters.status = *status;
                    filters.priority = *priority;
                    filters.assignee_id = assignee.clone();
                    filters.search = search.clone();
                    if let Some(field) = sort_by {
                        filters = filters.sort(field.clone(), *sort_direction);
                    }
                    tasks.list(filters).await?
                };

                self.emit(&listing.tasks, |items| {
                    for task in items {
                        print_task_line(task);
                    }
                    let meta = &listing.pagination;
                    println!(
                        "page {}/{} ({} total)",
                        meta.page, meta.total_pages, meta.total
                    );
                })
            }

            TaskCommands::Get { id } => {
                let task = tasks.get(id).await?;
                self.emit(&task, print_task_detail)
            }

            TaskCommands::Create {
                title,
                description,
                status,
                priority,
                deadline,
                assignees,
            } => {
                let created = tasks
                    .create(&CreateTask {
                        title: title.clone(),
                        description: description.clone(),
                        status: *status,
                        priority: *priority,
                        deadline: *deadline,
                        assignee_ids: assignees.clone(),
                    })
                    .await?;
                self.emit(&created, |task| {
                    println!("Created task {}", task.id);
                })
            }

            TaskCommands::Status { id, status } => {
                let updated = tasks.set_status(id, *status).await?;
                self.emit(&updated, print_task_line)
            }

            TaskCommands::Done { id } => {
                let updated = tasks.set_status(id, TaskStatus::Done).await?;
                self.emit(&updated, print_task_line)
            }

            TaskCommands::Delete { id } => {
                tasks.delete(id).await?;
                println!("Deleted task {id}");
                Ok(())
            }
        }
    }

    async fn run_user(&self, client: ApiClient, command: &UserCommands) -> Result<()> {
        let users = UserApi::new(client);

        match command {
            UserCommands::List { search } => {
                let listing = match search {
                    Some(query) => users.search(query).await?,
                    None => users.list().await?,
                };
                self.emit(&listing, |items| {
                    for user in items {
                        println!(
                            "{}  {}  {}",
                            user.id,
                            user.email,
                            user.name.as_deref().unwrap_or("-")
                        );
                    }
                })
            }

            UserCommands::Get { id } => {
                let user = users.get(id).await?;
                self.emit(&user, |user| {
                    println!(
                        "{}  {}  {}  ({})",
                        user.id,
                        user.email,
                        user.name.as_deref().unwrap_or("-"),
                        user.role
                    );
                })
            }

            UserCommands::Tasks { id } => {
                let listing = users.tasks_of(id).await?;
                self.emit(&listing, |items| {
                    for task in items {
                        print_task_line(task);
                    }
                })
            }
        }
    }

    fn build_client(&self, profile: &Profile) -> Result<ApiClient> {
        let server = self
            .cli
            .server
            .clone()
            .or_else(|| std::env::var(SERVER_ENV).ok())
            .or_else(|| profile.server_url.clone())
            .ok_or_else(|| Error::missing_field("server_url"))?;

        let mut config = ApiClientConfig::new(server);
        if let Some(secs) = profile.timeout_secs {
            config.timeout = Duration::from_secs(secs);
        }

        let credentials_path = profile
            .credentials_path
            .clone()
            .or_else(default_credentials_path)
            .ok_or_else(|| Error::config("cannot determine credentials path"))?;
        let store = Arc::new(FileCredentialStore::open(credentials_path)?);

        ApiClient::with_config(config, store)
    }

    /// Print a value as JSON or hand it to the pretty printer
    fn emit<T: Serialize>(&self, value: &T, pretty: impl FnOnce(&T)) -> Result<()> {
        match self.cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(value)?);
            }
            OutputFormat::Pretty => pretty(value),
        }
        Ok(())
    }
}

fn print_task_line(task: &Task) {
    let deadline = task
        .deadline
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".to_string());
    println!(
        "{}  [{}]  ({})  {}  due {}",
        task.id, task.status, task.priority, task.title, deadline
    );
}

fn print_task_detail(task: &Task) {
    print_task_line(task);
    if let Some(description) = &task.description {
        println!("  {description}");
    }
    println!(
        "  author: {}",
        task.author.name.as_deref().unwrap_or(&task.author.email)
    );
    for assignee in &task.assignees {
        println!(
            "  assignee: {}",
            assignee.name.as_deref().unwrap_or(&assignee.email)
        );
    }
}
