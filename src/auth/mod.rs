//! Client-side authentication.
//!
//! Dual-token scheme: a short-lived access token sent as a bearer header and
//! a long-lived refresh token exchanged for new access tokens. Both live in
//! a [`TokenStore`]; [`AuthSession`] is the only writer of the [`Session`]
//! that the [`RouteGuard`] reads.

mod errors;
mod guard;
mod state;
mod store;
mod types;

pub use errors::AuthError;
pub use guard::{GuardState, History, LOGIN_ROUTE, Navigator, RouteGuard};
pub use state::AuthSession;
pub use store::{
    ACCESS_TOKEN_KEY, AUTH_KEYS, FileTokenStore, MemoryTokenStore, REFRESH_TOKEN_KEY, TokenStore,
    USER_TYPE_KEY,
};
pub use types::{Session, User, UserType};
