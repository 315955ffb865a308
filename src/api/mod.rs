//! REST access to the portfolio backend.

mod client;
mod endpoints;
mod error;
mod refresh;

pub use client::ApiClient;
pub use endpoints::{
    CONTACT_PATH, LOGIN_PATH, PRODUCT_ACCESS_PATH, PublicEndpoints, REFRESH_PATH, THEME_PATH,
    detail_path,
};
pub use error::{ApiError, check_status};
pub use refresh::{HttpRefresh, RefreshStrategy};
pub use reqwest::Method;
