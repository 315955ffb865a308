//! Route guard for the admin area.

use tracing::debug;

use super::types::Session;

/// Default route unauthenticated visitors are sent to.
pub const LOGIN_ROUTE: &str = "/login";

/// Outcome of evaluating the guard against a session snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    /// Session is still hydrating: show a placeholder, do not redirect yet.
    Checking,
    /// Authenticated admin: render the protected subtree.
    Authorized,
    /// Anyone else: replace the current route with the login route.
    Unauthorized,
}

/// Navigation side of the router.
pub trait Navigator {
    /// Replace the current history entry with `path`.
    fn replace(&mut self, path: &str);
}

/// Minimal history stack. `replace` overwrites the top entry, so a guarded
/// route left by a redirect cannot be reached again with `back`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct History {
    entries: Vec<String>,
}

impl History {
    pub fn new(start: &str) -> Self {
        Self {
            entries: vec![start.to_string()],
        }
    }

    pub fn push(&mut self, path: &str) {
        self.entries.push(path.to_string());
    }

    /// Go back one entry. Returns false when already at the first entry.
    pub fn back(&mut self) -> bool {
        if self.entries.len() > 1 {
            self.entries.pop();
            true
        } else {
            false
        }
    }

    pub fn current(&self) -> Option<&str> {
        self.entries.last().map(String::as_str)
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }
}

impl Navigator for History {
    fn replace(&mut self, path: &str) {
        match self.entries.last_mut() {
            Some(top) => *top = path.to_string(),
            None => self.entries.push(path.to_string()),
        }
    }
}

/// Gates protected routes on an authenticated admin session.
#[derive(Debug, Clone)]
pub struct RouteGuard {
    login_route: String,
}

impl Default for RouteGuard {
    fn default() -> Self {
        Self::new(LOGIN_ROUTE)
    }
}

impl RouteGuard {
    pub fn new(login_route: impl Into<String>) -> Self {
        Self {
            login_route: login_route.into(),
        }
    }

    pub fn login_route(&self) -> &str {
        &self.login_route
    }

    /// Pure evaluation, no navigation.
    pub fn evaluate(session: &Session) -> GuardState {
        if session.is_loading {
            GuardState::Checking
        } else if session.is_authenticated && session.is_admin {
            GuardState::Authorized
        } else {
            GuardState::Unauthorized
        }
    }

    /// Evaluate and, when unauthorized, redirect to the login route.
    pub fn check(&self, session: &Session, navigator: &mut dyn Navigator) -> GuardState {
        let state = Self::evaluate(session);
        if state == GuardState::Unauthorized {
            debug!(to = %self.login_route, "Guard redirecting to login");
            navigator.replace(&self.login_route);
        }
        state
    }

    /// Render through the guard: the placeholder while checking, the
    /// protected view when authorized, nothing (after redirecting) otherwise.
    pub fn render<T>(
        &self,
        session: &Session,
        navigator: &mut dyn Navigator,
        placeholder: impl FnOnce() -> T,
        protected: impl FnOnce() -> T,
    ) -> Option<T> {
        match self.check(session, navigator) {
            GuardState::Checking => Some(placeholder()),
            GuardState::Authorized => Some(protected()),
            GuardState::Unauthorized => None,
        }
    }
}
