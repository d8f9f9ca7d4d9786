//! User operations
//!
//! Profile and user management against the `/users` endpoints.

use super::tasks::Task;
use crate::error::Result;
use crate::http::{ApiClient, RequestConfig};
use serde::{Deserialize, Serialize};

/// A user account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// User id
    pub id: String,
    /// Account email
    pub email: String,
    /// Display name
    #[serde(default)]
    pub name: Option<String>,
    /// Account role
    pub role: String,
}

/// Payload for updating a user; unset fields are left untouched
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUser {
    /// New display name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New email
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// New password
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

/// User endpoints
#[derive(Debug, Clone)]
pub struct UserApi {
    client: ApiClient,
}

impl UserApi {
    /// Create the user API over a client
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Fetch the authenticated user's profile
    pub async fn profile(&self) -> Result<User> {
        self.client.get("/users/profile").await
    }

    /// List all users
    pub async fn list(&self) -> Result<Vec<User>> {
        self.client.get("/users").await
    }

    /// Fetch one user
    pub async fn get(&self, id: &str) -> Result<User> {
        self.client.get(&format!("/users/{id}")).await
    }

    /// List the tasks assigned to a user
    pub async fn tasks_of(&self, id: &str) -> Result<Vec<Task>> {
        self.client.get(&format!("/users/{id}/tasks")).await
    }

    /// Update a user
    pub async fn update(&self, id: &str, changes: &UpdateUser) -> Result<User> {
        self.client
            .put(&format!("/users/{id}"), serde_json::to_value(changes)?)
            .await
    }

    /// Delete a user
    pub async fn delete(&self, id: &str) -> Result<()> {
        self.client.delete(&format!("/users/{id}")).await
    }

    /// Update the authenticated user's own profile
    pub async fn update_profile(&self, changes: &UpdateUser) -> Result<User> {
        let profile = self.profile().await?;
        self.update(&profile.id, changes).await
    }

    /// Search users by name or email
    pub async fn search(&self, query: &str) -> Result<Vec<User>> {
        self.client
            .get_with_config("/users", RequestConfig::new().query("search", query))
            .await
    }
}
