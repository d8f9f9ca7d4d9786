//! Typed API surface
//!
//! Thin, typed wrappers over [`ApiClient`](crate::http::ApiClient) for the
//! Taskdeck endpoints. These are the client's collaborators: they format
//! paths and payloads and decode responses; authentication and token
//! refresh happen underneath them in the HTTP layer.

mod auth;
mod tasks;
mod users;

pub use auth::{AccessClaims, AuthApi, AuthResponse, LoginRequest, RegisterRequest};
pub use tasks::{
    BulkCreateResult, CreateTask, Pagination, Task, TaskApi, TaskFilters, TasksPage, UpdateTask,
    UserRef,
};
pub use users::{UpdateUser, User, UserApi};
