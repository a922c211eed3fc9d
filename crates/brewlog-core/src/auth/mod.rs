//! Authentication: the session lifecycle and where the credential lives.
//!
//! This module provides:
//! - `SessionStore`: restore, login, register and logout, publishing every
//!   change through a `SessionHandle`
//! - `TokenStore`: durable token storage, backed by the OS keychain, a JSON
//!   file, or memory
//!
//! The token is read back once at startup and replaced wholesale on each login.

pub mod credentials;
pub mod session;

pub use credentials::{open_store, FileStore, KeyringStore, MemoryStore, StoreError, TokenStore};
pub use session::{Credential, SessionError, SessionHandle, SessionState, SessionStore, TokenKind};
