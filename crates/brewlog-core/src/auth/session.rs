use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{watch, Mutex};
use tracing::{debug, error, info, warn};

use crate::api::{ApiClient, ApiError};

use super::credentials::{StoreError, TokenStore};

/// Shown when the backend rejects a login without saying why
const LOGIN_FAILED: &str = "Login failed";

/// Shown when the backend rejects a registration without saying why
const REGISTRATION_FAILED: &str = "Registration failed";

// ============================================================================
// Credential
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Bearer,
}

impl TokenKind {
    /// Parse the backend's `token_type`, which is case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("bearer") {
            Some(TokenKind::Bearer)
        } else {
            None
        }
    }
}

/// The bearer token proving who we are to the backend.
///
/// Never mutated in place; a new login builds a new one.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    token: String,
    kind: TokenKind,
}

impl Credential {
    pub fn bearer(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            kind: TokenKind::Bearer,
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    /// Value for the `Authorization` header
    pub fn authorization(&self) -> String {
        match self.kind {
            TokenKind::Bearer => format!("Bearer {}", self.token),
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("kind", &self.kind)
            .field("token", &"<redacted>")
            .finish()
    }
}

// ============================================================================
// Session state
// ============================================================================

/// Authentication status as seen by the rest of the client.
///
/// `is_authenticated` is derived from whether a credential is present; there
/// is no separate flag to fall out of step with it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    /// The durable store has not been read yet
    #[default]
    Restoring,
    Unauthenticated,
    Authenticated(Credential),
}

impl SessionState {
    pub fn from_credential(credential: Option<Credential>) -> Self {
        match credential {
            Some(c) => SessionState::Authenticated(c),
            None => SessionState::Unauthenticated,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, SessionState::Restoring)
    }

    pub fn is_authenticated(&self) -> bool {
        self.credential().is_some()
    }

    pub fn credential(&self) -> Option<&Credential> {
        match self {
            SessionState::Authenticated(c) => Some(c),
            _ => None,
        }
    }
}

struct Channels {
    state: watch::Sender<SessionState>,
    /// Last token the backend answered 401 to
    rejected: watch::Sender<Option<String>>,
}

/// Read side of the session, shared by the gateway, the routing guard and
/// the screens. Clones observe the same session.
///
/// Only `SessionStore` publishes through it.
#[derive(Clone)]
pub struct SessionHandle {
    inner: Arc<Channels>,
}

impl Default for SessionHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionHandle {
    pub fn new() -> Self {
        let (state, _) = watch::channel(SessionState::Restoring);
        let (rejected, _) = watch::channel(None);
        Self {
            inner: Arc::new(Channels { state, rejected }),
        }
    }

    pub fn state(&self) -> SessionState {
        self.inner.state.borrow().clone()
    }

    /// Credential as of this instant
    pub fn credential(&self) -> Option<Credential> {
        self.inner.state.borrow().credential().cloned()
    }

    pub fn is_loading(&self) -> bool {
        self.inner.state.borrow().is_loading()
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.state.borrow().is_authenticated()
    }

    /// Receiver woken on every state change
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.inner.state.subscribe()
    }

    /// Publish a new state. Subscribers are only woken if it differs from
    /// the current one.
    pub(crate) fn publish(&self, next: SessionState) -> bool {
        self.inner.state.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        })
    }

    /// Record that the backend refused `token`.
    pub(crate) fn report_rejected(&self, token: &str) {
        self.inner.rejected.send_replace(Some(token.to_string()));
    }

    pub(crate) fn rejected(&self) -> watch::Receiver<Option<String>> {
        self.inner.rejected.subscribe()
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Error, Debug)]
pub enum SessionError {
    /// The backend turned the credentials down. Carries the text to show the user.
    #[error("{0}")]
    Authentication(String),

    /// The durable store failed while the session was changing
    #[error(transparent)]
    StoreUnavailable(#[from] StoreError),

    #[error("Unable to reach the server: {0}")]
    Network(String),

    /// A newer login or logout started while this login was in flight
    #[error("Superseded by a newer session change")]
    Superseded,
}

impl SessionError {
    fn from_exchange(e: ApiError, fallback: &str) -> Self {
        match e {
            ApiError::NetworkError(e) => SessionError::Network(e.to_string()),
            other => SessionError::Authentication(
                other.detail().unwrap_or_else(|| fallback.to_string()),
            ),
        }
    }
}

// ============================================================================
// Session store
// ============================================================================

/// Owns the credential lifecycle: restore, login, register, logout.
///
/// Every mutation draws a ticket from `generation` when it starts. Commits
/// (durable write, then publish) happen under `commit`, and a login whose
/// ticket is no longer the latest is dropped instead of overwriting a newer
/// logout or login.
pub struct SessionStore {
    store: Arc<dyn TokenStore>,
    api: ApiClient,
    handle: SessionHandle,
    generation: AtomicU64,
    commit: Mutex<()>,
}

impl SessionStore {
    /// The store publishes through the session handle the gateway was built
    /// with, so the gateway always sees what the store commits.
    pub fn new(store: Arc<dyn TokenStore>, api: ApiClient) -> Self {
        let handle = api.session().clone();
        Self {
            store,
            api,
            handle,
            generation: AtomicU64::new(0),
            commit: Mutex::new(()),
        }
    }

    pub fn handle(&self) -> &SessionHandle {
        &self.handle
    }

    pub fn state(&self) -> SessionState {
        self.handle.state()
    }

    fn begin(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_latest(&self, ticket: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket
    }

    /// Load the credential from the durable store.
    ///
    /// A store that cannot be read counts as holding no credential.
    pub async fn restore(&self) -> SessionState {
        let _commit = self.commit.lock().await;

        let credential = match self.store.get().await {
            Ok(Some(token)) if !token.is_empty() => Some(Credential::bearer(token)),
            Ok(_) => None,
            Err(e) => {
                warn!(error = %e, "Credential store unreadable, starting logged out");
                None
            }
        };

        debug!(authenticated = credential.is_some(), "Session restored");
        self.handle.publish(SessionState::from_credential(credential));
        self.handle.state()
    }

    /// Exchange email and password for a credential, persist it, then publish it.
    pub async fn login(&self, email: &str, password: &str) -> Result<(), SessionError> {
        let ticket = self.begin();

        let response = self
            .api
            .login(email, password)
            .await
            .map_err(|e| SessionError::from_exchange(e, LOGIN_FAILED))?;

        if TokenKind::parse(&response.token_type).is_none() {
            warn!(token_type = %response.token_type, "Unsupported token type");
            return Err(SessionError::Authentication(format!(
                "Unsupported token type: {}",
                response.token_type
            )));
        }

        let _commit = self.commit.lock().await;
        if !self.is_latest(ticket) {
            debug!(ticket, "Discarding login superseded by a newer session change");
            return Err(SessionError::Superseded);
        }

        self.store.set(&response.access_token).await?;
        self.handle
            .publish(SessionState::Authenticated(Credential::bearer(response.access_token)));

        info!("Login successful");
        Ok(())
    }

    /// Create an account. Does not log in.
    pub async fn register(&self, email: &str, password: &str) -> Result<(), SessionError> {
        let user = self
            .api
            .register(email, password)
            .await
            .map_err(|e| SessionError::from_exchange(e, REGISTRATION_FAILED))?;

        info!(user_id = user.id, "Account registered");
        Ok(())
    }

    /// Forget the credential. Logging out while logged out does nothing.
    ///
    /// If the durable delete fails the in-memory credential is kept, so
    /// memory keeps matching what is on disk, and the failure is returned.
    pub async fn logout(&self) -> Result<(), SessionError> {
        self.begin();
        let _commit = self.commit.lock().await;

        self.store.delete().await?;
        if self.handle.publish(SessionState::Unauthenticated) {
            info!("Logged out");
        }
        Ok(())
    }

    /// Log out whenever the backend rejects the credential we currently hold.
    ///
    /// Rejections of a token that has since been replaced are ignored. Runs
    /// until the session is dropped; spawn it once per process.
    pub async fn expire_on_unauthorized(&self) {
        let mut rejected = self.handle.rejected();
        while rejected.changed().await.is_ok() {
            let token = rejected.borrow_and_update().clone();
            let Some(token) = token else {
                continue;
            };

            let is_current = self
                .handle
                .credential()
                .is_some_and(|c| c.token() == token);
            if !is_current {
                debug!("Ignoring rejection of a stale token");
                continue;
            }

            warn!("Backend rejected the current token, logging out");
            if let Err(e) = self.logout().await {
                error!(error = %e, "Failed to log out after token rejection");
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MemoryStore;

    fn offline_session(store: Arc<MemoryStore>) -> SessionStore {
        // Port 9 (discard) is never listening; these tests make no requests.
        let api = ApiClient::new("http://127.0.0.1:9", SessionHandle::new()).unwrap();
        SessionStore::new(store, api)
    }

    #[test]
    fn test_credential_debug_hides_token() {
        let credential = Credential::bearer("secret-token");
        let printed = format!("{:?}", credential);
        assert!(!printed.contains("secret-token"));
        assert!(printed.contains("redacted"));
    }

    #[test]
    fn test_credential_authorization() {
        assert_eq!(Credential::bearer("tok123").authorization(), "Bearer tok123");
    }

    #[test]
    fn test_token_kind_parse() {
        assert_eq!(TokenKind::parse("bearer"), Some(TokenKind::Bearer));
        assert_eq!(TokenKind::parse("Bearer"), Some(TokenKind::Bearer));
        assert_eq!(TokenKind::parse("mac"), None);
    }

    #[test]
    fn test_state_flags_follow_credential() {
        assert!(SessionState::Restoring.is_loading());
        assert!(!SessionState::Restoring.is_authenticated());
        assert!(!SessionState::Unauthenticated.is_loading());
        assert!(!SessionState::Unauthenticated.is_authenticated());

        let state = SessionState::from_credential(Some(Credential::bearer("t")));
        assert!(state.is_authenticated());
        assert!(!state.is_loading());
        assert_eq!(SessionState::from_credential(None), SessionState::Unauthenticated);
    }

    #[test]
    fn test_handle_starts_restoring() {
        let handle = SessionHandle::new();
        assert!(handle.is_loading());
        assert!(!handle.is_authenticated());
        assert_eq!(handle.credential(), None);
    }

    #[test]
    fn test_publish_same_state_does_not_notify() {
        let handle = SessionHandle::new();
        let mut rx = handle.subscribe();
        assert!(handle.publish(SessionState::Unauthenticated));
        assert!(rx.has_changed().unwrap());
        rx.borrow_and_update();

        assert!(!handle.publish(SessionState::Unauthenticated));
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn test_handle_clones_share_state() {
        let handle = SessionHandle::new();
        let other = handle.clone();
        handle.publish(SessionState::Authenticated(Credential::bearer("t")));
        assert!(other.is_authenticated());
    }

    #[tokio::test]
    async fn test_restore_reads_durable_token() {
        let store = Arc::new(MemoryStore::with_token("tok123"));
        let session = offline_session(store);
        let state = session.restore().await;
        assert_eq!(state, SessionState::Authenticated(Credential::bearer("tok123")));
    }

    #[tokio::test]
    async fn test_restore_empty_store() {
        let session = offline_session(Arc::new(MemoryStore::new()));
        assert_eq!(session.restore().await, SessionState::Unauthenticated);
    }

    #[tokio::test]
    async fn test_restore_unavailable_store_is_logged_out() {
        let store = Arc::new(MemoryStore::with_token("tok123"));
        store.set_unavailable(true);
        let session = offline_session(store);
        assert_eq!(session.restore().await, SessionState::Unauthenticated);
    }

    #[tokio::test]
    async fn test_restore_is_idempotent() {
        let store = Arc::new(MemoryStore::with_token("tok123"));
        let session = offline_session(store);
        let first = session.restore().await;
        let second = session.restore().await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_logout_when_logged_out_is_silent() {
        let session = offline_session(Arc::new(MemoryStore::new()));
        session.restore().await;
        let mut rx = session.handle().subscribe();
        rx.borrow_and_update();

        session.logout().await.unwrap();
        session.logout().await.unwrap();

        assert_eq!(session.state(), SessionState::Unauthenticated);
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_logout_clears_store_and_state() {
        let store = Arc::new(MemoryStore::with_token("tok123"));
        let session = offline_session(store.clone());
        session.restore().await;
        assert!(session.handle().is_authenticated());

        session.logout().await.unwrap();
        assert_eq!(store.peek(), None);
        assert_eq!(session.state(), SessionState::Unauthenticated);
    }

    #[tokio::test]
    async fn test_logout_store_failure_is_surfaced() {
        let store = Arc::new(MemoryStore::with_token("tok123"));
        let session = offline_session(store.clone());
        session.restore().await;

        store.set_unavailable(true);
        let result = session.logout().await;
        assert!(matches!(result, Err(SessionError::StoreUnavailable(_))));
        // Memory still agrees with the store
        assert!(session.handle().is_authenticated());
        assert_eq!(store.peek(), Some("tok123".to_string()));
    }

    #[tokio::test]
    async fn test_login_network_failure_keeps_state() {
        let store = Arc::new(MemoryStore::new());
        let session = offline_session(store.clone());
        session.restore().await;

        let result = session.login("a@b.com", "pw").await;
        assert!(matches!(result, Err(SessionError::Network(_))));
        assert_eq!(session.state(), SessionState::Unauthenticated);
        assert_eq!(store.peek(), None);
    }
}
