//! HTTP client module
//!
//! Provides the authenticated API client with transparent token refresh.
//!
//! # Features
//!
//! - **Bearer attachment**: the stored access token rides every request
//! - **Single-flight refresh**: one 401-triggered refresh at a time, with
//!   queued requests replayed in FIFO order once it settles
//! - **Session signaling**: an unrecoverable refresh failure clears stored
//!   credentials and broadcasts [`SessionEvent::Invalidated`]

mod client;
mod refresh;
mod session;

pub use client::{ApiClient, ApiClientConfig, ApiClientConfigBuilder, RequestConfig};
pub use session::SessionEvent;

#[cfg(test)]
mod tests;
