//! Admin client for a portfolio site's REST backend.
//!
//! [`auth`] keeps the login session and its tokens, [`api`] sends requests
//! with the bearer token and refreshes it once on a 401, and [`crud`] drives
//! list/form management of the content types in [`entities`].

pub mod api;
pub mod auth;
pub mod cli;
pub mod commands;
pub mod config;
pub mod crud;
pub mod entities;
pub mod jwt;
pub mod validation;

pub use api::{ApiClient, ApiError};
pub use auth::{AuthSession, Session};
pub use config::ClientConfig;
