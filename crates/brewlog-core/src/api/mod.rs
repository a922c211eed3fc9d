//! REST API client module for the brewing journal backend.
//!
//! This module provides the `ApiClient`, the single gateway every backend
//! call goes through, covering authentication, brewings, coffees and
//! coffee brands.
//!
//! The API uses bearer token authentication; tokens come from
//! `POST /auth/login` and are attached by the client on every request.

pub mod client;
pub mod error;

pub use client::{ApiClient, RegisteredUser, TokenResponse};
pub use error::ApiError;
