//! Session and identity types.

use std::convert::Infallible;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::jwt::Claims;

/// Account type reported by the backend. Only `Admin` may use the admin area.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum UserType {
    #[default]
    User,
    Admin,
}

impl UserType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserType::User => "user",
            UserType::Admin => "admin",
        }
    }
}

/// Anything other than `"admin"` is a plain user.
impl FromStr for UserType {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "admin" => UserType::Admin,
            _ => UserType::User,
        })
    }
}

impl From<String> for UserType {
    fn from(s: String) -> Self {
        match s.parse() {
            Ok(t) => t,
            Err(never) => match never {},
        }
    }
}

impl From<UserType> for String {
    fn from(t: UserType) -> Self {
        t.as_str().to_string()
    }
}

/// Identity of the logged-in account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default)]
    pub email: String,
    pub user_type: UserType,
    #[serde(default, alias = "displayName")]
    pub name: Option<String>,
}

impl User {
    /// Build an identity from token claims. Requires a `userType` claim.
    pub fn from_claims(claims: &Claims) -> Option<Self> {
        Some(Self {
            email: claims.email.clone().unwrap_or_default(),
            user_type: claims.user_type?,
            name: claims.name.clone(),
        })
    }

    pub fn is_admin(&self) -> bool {
        self.user_type == UserType::Admin
    }
}

/// Snapshot of the current login state.
///
/// `is_authenticated` holds only while `access_token` is present and was
/// unexpired at the last check; `is_admin` only for an admin `user`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub user: Option<User>,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub is_authenticated: bool,
    pub is_admin: bool,
    pub is_loading: bool,
    pub last_error: Option<String>,
}

impl Session {
    /// Session at process start, before storage has been read.
    pub fn hydrating() -> Self {
        Self {
            is_loading: true,
            ..Self::default()
        }
    }

    /// Fully authenticated session for `user`.
    pub fn authenticated(user: User, access_token: String, refresh_token: Option<String>) -> Self {
        Self {
            is_admin: user.is_admin(),
            user: Some(user),
            access_token: Some(access_token),
            refresh_token,
            is_authenticated: true,
            is_loading: false,
            last_error: None,
        }
    }
}
