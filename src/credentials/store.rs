//! Credential store implementations
//!
//! Provides file-based credential persistence with atomic writes, plus an
//! in-memory store for tests and ephemeral sessions.

use super::types::TokenPair;
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Storage seam for the session credential pair
///
/// The HTTP client reads tokens through this trait on every request and
/// writes through it only from the refresh path. Implementations must keep
/// the pair indivisible: `set_tokens` replaces both halves, `clear` removes
/// both.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Get the stored token pair, if any
    async fn tokens(&self) -> Result<Option<TokenPair>>;

    /// Replace the stored pair with a new one
    async fn set_tokens(&self, tokens: TokenPair) -> Result<()>;

    /// Remove the stored pair
    async fn clear(&self) -> Result<()>;

    /// Get the current access token, if any
    async fn access_token(&self) -> Result<Option<String>> {
        Ok(self.tokens().await?.map(|pair| pair.access_token))
    }

    /// Get the current refresh token, if any
    async fn refresh_token(&self) -> Result<Option<String>> {
        Ok(self.tokens().await?.map(|pair| pair.refresh_token))
    }
}

/// File-backed credential store
///
/// Persists the pair as JSON so a session survives process restarts. Writes
/// go to a temp file first and are renamed into place; a crash mid-write
/// leaves either the old pair or the new one, never a torn file.
#[derive(Debug)]
pub struct FileCredentialStore {
    /// Path to the credentials file
    path: PathBuf,
    /// Current pair (cached)
    cached: Arc<RwLock<Option<TokenPair>>>,
}

impl FileCredentialStore {
    /// Create a store at the given path, loading existing credentials if present
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let cached = if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            let pair = serde_json::from_str(&contents).map_err(|e| {
                Error::store(format!("failed to parse credentials file: {e}"))
            })?;
            Some(pair)
        } else {
            None
        };

        Ok(Self {
            path,
            cached: Arc::new(RwLock::new(cached)),
        })
    }

    /// Path this store persists to
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, pair: &TokenPair) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let contents = serde_json::to_string_pretty(pair)?;

        // Write to temp file first, then rename for atomicity
        let temp_path = self.path.with_extension("tmp");
        tokio::fs::write(&temp_path, &contents)
            .await
            .map_err(|e| Error::store(format!("failed to write credentials file: {e}")))?;

        tokio::fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| Error::store(format!("failed to rename credentials file: {e}")))?;

        Ok(())
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn tokens(&self) -> Result<Option<TokenPair>> {
        Ok(self.cached.read().await.clone())
    }

    async fn set_tokens(&self, tokens: TokenPair) -> Result<()> {
        let mut cached = self.cached.write().await;
        self.persist(&tokens).await?;
        *cached = Some(tokens);
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        let mut cached = self.cached.write().await;
        *cached = None;
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::store(format!(
                "failed to remove credentials file: {e}"
            ))),
        }
    }
}

/// In-memory credential store
///
/// No persistence; the pair dies with the process. Used by tests and by
/// callers that manage their own durability.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    cached: RwLock<Option<TokenPair>>,
}

impl MemoryCredentialStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with an existing pair
    pub fn with_tokens(tokens: TokenPair) -> Self {
        Self {
            cached: RwLock::new(Some(tokens)),
        }
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn tokens(&self) -> Result<Option<TokenPair>> {
        Ok(self.cached.read().await.clone())
    }

    async fn set_tokens(&self, tokens: TokenPair) -> Result<()> {
        *self.cached.write().await = Some(tokens);
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        *self.cached.write().await = None;
        Ok(())
    }
}
