//! Field-level validation errors shared by client-side schemas and server
//! rejections.

use std::collections::BTreeMap;
use std::fmt;

use url::Url;

/// Validation failures keyed by field name, plus an optional form-level
/// message for errors that cannot be pinned to a single field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    fields: BTreeMap<String, String>,
    form: Option<String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Form-level error with no field attached.
    pub fn form_level(message: impl Into<String>) -> Self {
        Self {
            fields: BTreeMap::new(),
            form: Some(message.into()),
        }
    }

    /// Record an error on `field`. The first error per field wins.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields.entry(field.into()).or_insert_with(|| message.into());
    }

    pub fn set_form(&mut self, message: impl Into<String>) {
        self.form = Some(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.form.is_none()
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn form(&self) -> Option<&str> {
        self.form.as_deref()
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// `Ok(())` when nothing was recorded.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }

    // --- Schema rules ---

    pub fn require(&mut self, field: &str, value: &str) {
        if value.trim().is_empty() {
            self.add(field, "is required");
        }
    }

    pub fn max_len(&mut self, field: &str, value: &str, max: usize) {
        if value.chars().count() > max {
            self.add(field, format!("must be at most {} characters", max));
        }
    }

    pub fn check(&mut self, ok: bool, field: &str, message: &str) {
        if !ok {
            self.add(field, message);
        }
    }

    /// Absent or blank values pass; anything else must be an absolute
    /// http(s) URL.
    pub fn optional_url(&mut self, field: &str, value: Option<&str>) {
        let Some(value) = value.filter(|v| !v.trim().is_empty()) else {
            return;
        };
        match Url::parse(value) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            _ => self.add(field, "must be a valid http(s) URL"),
        }
    }

    pub fn email(&mut self, field: &str, value: &str) {
        let value = value.trim();
        if value.is_empty() {
            self.add(field, "is required");
            return;
        }
        let valid = match value.split_once('@') {
            Some((local, domain)) => {
                !local.is_empty()
                    && domain.contains('.')
                    && !domain.starts_with('.')
                    && !domain.ends_with('.')
                    && !value.contains(char::is_whitespace)
            }
            None => false,
        };
        if !valid {
            self.add(field, "must be a valid email address");
        }
    }

    /// Lower-case ASCII letters, digits, '-' and '_' only.
    pub fn slug(&mut self, field: &str, value: &str) {
        if value.is_empty() {
            self.add(field, "is required");
        } else if !value
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
        {
            self.add(field, "may only contain lower-case letters, digits, '-' and '_'");
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = Vec::new();
        if let Some(form) = &self.form {
            parts.push(form.clone());
        }
        for (field, message) in &self.fields {
            parts.push(format!("{} {}", field, message));
        }
        if parts.is_empty() {
            write!(f, "validation failed")
        } else {
            write!(f, "{}", parts.join("; "))
        }
    }
}

impl std::error::Error for ValidationErrors {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require() {
        let mut errors = ValidationErrors::new();
        errors.require("title", "   ");
        errors.require("slug", "ok");
        assert_eq!(errors.field("title"), Some("is required"));
        assert_eq!(errors.field("slug"), None);
        assert!(errors.into_result().is_err());
    }

    #[test]
    fn test_first_error_per_field_wins() {
        let mut errors = ValidationErrors::new();
        errors.require("title", "");
        errors.max_len("title", "", 0);
        errors.add("title", "second");
        assert_eq!(errors.field("title"), Some("is required"));
    }

    #[test]
    fn test_optional_url() {
        let mut errors = ValidationErrors::new();
        errors.optional_url("a", None);
        errors.optional_url("b", Some(""));
        errors.optional_url("c", Some("https://example.com/x"));
        errors.optional_url("d", Some("not a url"));
        errors.optional_url("e", Some("ftp://example.com"));
        assert_eq!(errors.fields().count(), 2);
        assert!(errors.field("d").is_some());
        assert!(errors.field("e").is_some());
    }

    #[test]
    fn test_email() {
        for good in ["a@b.co", "first.last@example.org"] {
            let mut errors = ValidationErrors::new();
            errors.email("email", good);
            assert!(errors.is_empty(), "{good} should be valid");
        }
        for bad in ["", "plain", "@example.com", "a@b", "a@.com", "a b@example.com"] {
            let mut errors = ValidationErrors::new();
            errors.email("email", bad);
            assert!(!errors.is_empty(), "{bad:?} should be invalid");
        }
    }

    #[test]
    fn test_slug_rule() {
        let mut errors = ValidationErrors::new();
        errors.slug("slug", "my-post_2");
        assert!(errors.is_empty());
        errors.slug("slug", "My Post");
        assert!(errors.field("slug").is_some());
    }

    #[test]
    fn test_display() {
        let mut errors = ValidationErrors::form_level("Title already taken");
        errors.add("price", "must not be negative");
        assert_eq!(
            errors.to_string(),
            "Title already taken; price must not be negative"
        );
    }
}
