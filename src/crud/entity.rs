//! The `Entity` trait implemented by every managed content type.

use std::fmt::{Debug, Display};
use std::str::FromStr;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::validation::ValidationErrors;

/// A record managed through the admin area.
///
/// The identity is server-assigned: `key()` is `None` on a draft that has
/// not been created yet.
pub trait Entity:
    Clone + PartialEq + Debug + Default + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// `id` or `slug`.
    type Key: Clone + PartialEq + Display + Debug + FromStr + Send + Sync;
    /// Typed single-field update.
    type Field: Debug + Send;

    /// Collection path under the API base, e.g. `projects`.
    const RESOURCE: &'static str;
    /// Human-readable singular name for log lines.
    const LABEL: &'static str;

    fn key(&self) -> Option<Self::Key>;

    fn apply(&mut self, field: Self::Field);

    /// Advisory client-side schema check. The server stays the authority.
    fn validate(&self) -> Result<(), ValidationErrors>;

    /// Hard-coded set shown when the list endpoint cannot be reached.
    /// Must not be empty.
    fn defaults() -> Vec<Self>;

    fn category(&self) -> Option<&str> {
        None
    }
}
