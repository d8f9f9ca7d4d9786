//! # Taskdeck Client
//!
//! Rust client SDK and CLI for the Taskdeck task-management API.
//!
//! ## Features
//!
//! - **Authenticated HTTP client**: bearer token attachment with transparent,
//!   single-flight refresh on 401 and FIFO replay of queued requests
//! - **Durable credentials**: file-backed token storage that survives restarts
//! - **Typed API surface**: auth, task, and user endpoints with serde models
//! - **Session signaling**: broadcast event when a session becomes
//!   unrecoverable so the embedding app can route to login
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use taskdeck_client::api::{AuthApi, LoginRequest, TaskApi, TaskFilters};
//! use taskdeck_client::credentials::FileCredentialStore;
//! use taskdeck_client::http::{ApiClient, ApiClientConfig};
//! use taskdeck_client::Result;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let store = Arc::new(FileCredentialStore::open("credentials.json")?);
//!     let client = ApiClient::with_config(
//!         ApiClientConfig::new("https://api.taskdeck.example"),
//!         store,
//!     )?;
//!
//!     let auth = AuthApi::new(client.clone());
//!     auth.login(&LoginRequest {
//!         email: "alice@example.com".into(),
//!         password: "hunter2".into(),
//!     })
//!     .await?;
//!
//!     // Token refresh happens underneath when the access token expires
//!     let tasks = TaskApi::new(client);
//!     let page = tasks.list(TaskFilters::new().page(1, 20)).await?;
//!     println!("{} tasks", page.pagination.total);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Typed API Surface                        │
//! │     AuthApi            TaskApi             UserApi          │
//! └─────────────────────────────┬───────────────────────────────┘
//!                               │
//! ┌─────────────────────────────┴───────────────────────────────┐
//! │                        ApiClient                            │
//! │  bearer attach │ 401 → single-flight refresh │ FIFO replay  │
//! └──────┬──────────────────────┬──────────────────────┬────────┘
//!        │                      │                      │
//!   CredentialStore      RefreshCoordinator       SessionEvent
//!   (file / memory)      (flag + waiter queue)    (broadcast)
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_possible_truncation)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the client
pub mod error;

/// Common types and type aliases
pub mod types;

/// Credential storage
pub mod credentials;

/// Authenticated HTTP client with token refresh
pub mod http;

/// Typed API endpoints
pub mod api;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use credentials::{CredentialStore, FileCredentialStore, MemoryCredentialStore, TokenPair};
pub use http::{ApiClient, ApiClientConfig, RequestConfig, SessionEvent};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
