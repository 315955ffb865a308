//! Endpoint paths and the public allow-list.

use reqwest::Method;

pub const LOGIN_PATH: &str = "auth/login";
pub const REFRESH_PATH: &str = "auth/refresh";
pub const CONTACT_PATH: &str = "contact";
pub const PRODUCT_ACCESS_PATH: &str = "product-access-requests";
pub const THEME_PATH: &str = "theme";

/// Content resources whose reads are public.
const PUBLIC_READ_RESOURCES: [&str; 6] = ["projects", "products", "skills", "blog", "about", "theme"];

/// One allow-list rule: a path prefix, optionally restricted to one method.
#[derive(Debug, Clone)]
struct Rule {
    method: Option<Method>,
    prefix: String,
}

/// Endpoints sent without an `Authorization` header.
#[derive(Debug, Clone)]
pub struct PublicEndpoints {
    rules: Vec<Rule>,
}

impl Default for PublicEndpoints {
    fn default() -> Self {
        let mut endpoints = Self::empty()
            .allow_any(LOGIN_PATH)
            .allow_any(REFRESH_PATH)
            .allow(Method::POST, CONTACT_PATH)
            .allow(Method::POST, PRODUCT_ACCESS_PATH);
        for resource in PUBLIC_READ_RESOURCES {
            endpoints = endpoints.allow(Method::GET, resource);
        }
        endpoints
    }
}

impl PublicEndpoints {
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Allow `method` on `prefix` and everything below it.
    pub fn allow(mut self, method: Method, prefix: &str) -> Self {
        self.rules.push(Rule {
            method: Some(method),
            prefix: normalize(prefix).to_string(),
        });
        self
    }

    /// Allow every method on `prefix` and everything below it.
    pub fn allow_any(mut self, prefix: &str) -> Self {
        self.rules.push(Rule {
            method: None,
            prefix: normalize(prefix).to_string(),
        });
        self
    }

    pub fn is_public(&self, method: &Method, path: &str) -> bool {
        let path = normalize(path);
        self.rules.iter().any(|rule| {
            let method_matches = rule.method.as_ref().is_none_or(|m| m == method);
            let path_matches = path == rule.prefix
                || path
                    .strip_prefix(rule.prefix.as_str())
                    .is_some_and(|rest| rest.starts_with('/'));
            method_matches && path_matches
        })
    }
}

/// Strip the query string and surrounding slashes.
fn normalize(path: &str) -> &str {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    path.trim_matches('/')
}

/// Path of one record of `resource`.
pub fn detail_path(resource: &str, key: impl std::fmt::Display) -> String {
    format!("{}/{}", resource.trim_end_matches('/'), key)
}
