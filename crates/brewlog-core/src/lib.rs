//! Core library for Brewlog, a coffee brewing journal.
//!
//! This crate holds everything the clients share:
//!
//! - `auth`: the `SessionStore` that owns the bearer credential, and the
//!   durable `TokenStore` backends it persists to
//! - `api`: the `ApiClient` gateway every backend call goes through
//! - `guard`: the `RoutingGuard` that keeps the visible screen in step with
//!   the session
//! - `models`: brewings, coffees, brands and ratings as the backend returns them
//! - `config`: on-disk configuration and directory locations

pub mod api;
pub mod auth;
pub mod config;
pub mod guard;
pub mod models;
pub mod utils;

pub use api::{ApiClient, ApiError};
pub use auth::{Credential, SessionError, SessionHandle, SessionState, SessionStore};
pub use config::Config;
pub use guard::{Area, GuardPhase, Route, RoutingGuard};
