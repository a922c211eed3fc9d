use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use keyring::Entry;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::StoreKind;

/// Keychain service name
const SERVICE_NAME: &str = "brewlog";

/// Keychain account the token is filed under
const TOKEN_ACCOUNT: &str = "access-token";

/// Token file name in the cache directory
const TOKEN_FILE: &str = "token.json";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Credential store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    fn unavailable(e: impl std::fmt::Display) -> Self {
        StoreError::Unavailable(e.to_string())
    }
}

/// Durable, per-device home of the bearer token.
///
/// `get` reports a missing token as `Ok(None)`. `delete` of a missing token
/// succeeds, so logging out twice is harmless.
#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn get(&self) -> Result<Option<String>, StoreError>;
    async fn set(&self, token: &str) -> Result<(), StoreError>;
    async fn delete(&self) -> Result<(), StoreError>;
}

/// Open the backend selected in the config.
pub fn open_store(kind: StoreKind, cache_dir: PathBuf) -> Arc<dyn TokenStore> {
    match kind {
        StoreKind::Keyring => Arc::new(KeyringStore::new(SERVICE_NAME, TOKEN_ACCOUNT)),
        StoreKind::File => Arc::new(FileStore::new(cache_dir.join(TOKEN_FILE))),
        StoreKind::Memory => Arc::new(MemoryStore::new()),
    }
}

// ============================================================================
// OS keychain
// ============================================================================

/// Token kept in the OS keychain. Keychain calls block, so they run on the
/// blocking pool.
pub struct KeyringStore {
    service: String,
    account: String,
}

impl KeyringStore {
    pub fn new(service: &str, account: &str) -> Self {
        Self {
            service: service.to_string(),
            account: account.to_string(),
        }
    }

    async fn with_entry<T, F>(&self, op: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(Entry) -> Result<T, keyring::Error> + Send + 'static,
    {
        let service = self.service.clone();
        let account = self.account.clone();
        tokio::task::spawn_blocking(move || {
            let entry = Entry::new(&service, &account).map_err(StoreError::unavailable)?;
            op(entry).map_err(StoreError::unavailable)
        })
        .await
        .map_err(StoreError::unavailable)?
    }
}

#[async_trait]
impl TokenStore for KeyringStore {
    async fn get(&self) -> Result<Option<String>, StoreError> {
        self.with_entry(|entry| match entry.get_password() {
            Ok(token) => Ok(Some(token)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e),
        })
        .await
    }

    async fn set(&self, token: &str) -> Result<(), StoreError> {
        let token = token.to_string();
        self.with_entry(move |entry| entry.set_password(&token)).await
    }

    async fn delete(&self) -> Result<(), StoreError> {
        self.with_entry(|entry| match entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e),
        })
        .await
    }
}

// ============================================================================
// JSON file
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
struct TokenFile {
    token: String,
    saved_at: DateTime<Utc>,
}

/// Token kept in a JSON file, for machines without a usable keychain.
///
/// Writes go to a sibling temp file that is renamed into place, so a reader
/// sees either the old token or the new one.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        self.path.with_extension("json.tmp")
    }
}

#[async_trait]
impl TokenStore for FileStore {
    async fn get(&self) -> Result<Option<String>, StoreError> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::unavailable(e)),
        };
        let file: TokenFile = serde_json::from_str(&contents).map_err(StoreError::unavailable)?;
        debug!(saved_at = %file.saved_at, "Token file read");
        Ok(Some(file.token))
    }

    async fn set(&self, token: &str) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(StoreError::unavailable)?;
        }
        let file = TokenFile {
            token: token.to_string(),
            saved_at: Utc::now(),
        };
        let contents = serde_json::to_string_pretty(&file).map_err(StoreError::unavailable)?;

        let temp = self.temp_path();
        tokio::fs::write(&temp, contents)
            .await
            .map_err(StoreError::unavailable)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tokio::fs::set_permissions(&temp, std::fs::Permissions::from_mode(0o600))
                .await
                .map_err(StoreError::unavailable)?;
        }

        tokio::fs::rename(&temp, &self.path)
            .await
            .map_err(StoreError::unavailable)
    }

    async fn delete(&self) -> Result<(), StoreError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::unavailable(e)),
        }
    }
}

// ============================================================================
// In memory
// ============================================================================

/// Process-local store. Used for `--ephemeral` sessions and in tests, where
/// `set_unavailable` simulates a broken backend.
#[derive(Default)]
pub struct MemoryStore {
    token: Mutex<Option<String>>,
    unavailable: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: &str) -> Self {
        Self {
            token: Mutex::new(Some(token.to_string())),
            unavailable: AtomicBool::new(false),
        }
    }

    /// Make every subsequent call fail until cleared.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Current contents, bypassing the availability switch.
    pub fn peek(&self) -> Option<String> {
        self.token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable("memory store switched off".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl TokenStore for MemoryStore {
    async fn get(&self) -> Result<Option<String>, StoreError> {
        self.check()?;
        Ok(self.peek())
    }

    async fn set(&self, token: &str) -> Result<(), StoreError> {
        self.check()?;
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = Some(token.to_string());
        Ok(())
    }

    async fn delete(&self) -> Result<(), StoreError> {
        self.check()?;
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
