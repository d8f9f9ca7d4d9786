//! Credential storage module
//!
//! Owns the access/refresh token pair for a session.
//!
//! # Overview
//!
//! The credentials module provides:
//! - `TokenPair` - The access/refresh credential pair
//! - `CredentialStore` - Storage seam consumed by the HTTP client
//! - `FileCredentialStore` - Durable file-backed storage with atomic writes
//! - `MemoryCredentialStore` - In-memory storage for tests and ephemeral use
//!
//! Tokens are either both present or both absent. Only the client's refresh
//! path writes the store during a session; everything else reads.

mod store;
mod types;

pub use store::{CredentialStore, FileCredentialStore, MemoryCredentialStore};
pub use types::TokenPair;
