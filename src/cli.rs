//! CLI argument parsing and startup helpers.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::error;

use crate::api::ApiError;
use crate::auth::AuthError;
use crate::config::{
    ClientConfig, ConfigError, DEFAULT_API_URL, DEFAULT_TIMEOUT_SECS, default_credentials_path,
    parse_api_url,
};
use crate::crud::FallbackPolicy;

#[derive(clap::ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    Compact,
}

/// Content collections managed with list/show/create/update/delete.
#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resource {
    Projects,
    Products,
    Skills,
    Blog,
    About,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "folio", about = "Admin client for the portfolio backend")]
pub struct Args {
    /// Base URL of the REST API
    #[arg(long, env = "FOLIO_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Credentials file. Defaults to <config dir>/folio/credentials.json
    #[arg(long, env = "FOLIO_CREDENTIALS")]
    pub credentials: Option<PathBuf>,

    /// What list commands do when the backend is unreachable
    #[arg(long, value_enum, default_value = "fail-soft")]
    pub fallback: FallbackPolicy,

    /// Request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,

    /// Log output format
    #[arg(short, long, default_value = "pretty")]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Log in and store the tokens
    Login {
        email: String,
        /// Prefer the FOLIO_PASSWORD env var over passing this on the command line
        #[arg(long, env = "FOLIO_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the stored tokens
    Logout,
    /// Show the current session
    Status,
    /// List a collection
    List {
        resource: Resource,
        #[arg(long, default_value_t = 1)]
        page: usize,
        #[arg(long, default_value_t = 20)]
        per_page: usize,
        /// Only records in this category ("all" for every category)
        #[arg(long)]
        category: Option<String>,
    },
    /// Show one record
    Show { resource: Resource, key: String },
    /// Create a record from a JSON object
    Create {
        resource: Resource,
        #[arg(long)]
        data: String,
    },
    /// Merge a JSON object onto an existing record
    Update {
        resource: Resource,
        key: String,
        #[arg(long)]
        data: String,
    },
    /// Delete a record
    Delete {
        resource: Resource,
        key: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Site theme settings
    Theme {
        #[command(subcommand)]
        command: ThemeCommand,
    },
    /// Send a message through the public contact form
    Contact {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, default_value = "")]
        subject: String,
        message: String,
    },
    /// Ask for access to a product
    RequestAccess {
        product_id: i64,
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        message: Option<String>,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum ThemeCommand {
    Show,
    /// Merge a JSON object onto the current theme
    Set {
        #[arg(long)]
        data: String,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("admin login required (see {0})")]
    LoginRequired(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("aborted")]
    Aborted,
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Initialize logging based on the specified format.
pub fn init_logging(format: &LogFormat) {
    match format {
        LogFormat::Pretty => tracing_subscriber::fmt().with_writer(std::io::stderr).init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_writer(std::io::stderr)
            .init(),
        LogFormat::Compact => tracing_subscriber::fmt()
            .compact()
            .with_writer(std::io::stderr)
            .init(),
    }
}

/// Build the client config from parsed arguments.
/// Returns None and logs an error if validation fails.
pub fn build_config(args: &Args) -> Option<ClientConfig> {
    let api_url = match parse_api_url(&args.api_url) {
        Ok(url) => url,
        Err(e) => {
            error!(api_url = %args.api_url, error = %e, "Invalid API URL");
            return None;
        }
    };

    let Some(credentials_path) = args.credentials.clone().or_else(default_credentials_path) else {
        error!(error = %ConfigError::NoConfigDir, "Cannot locate credentials file");
        return None;
    };

    let mut config = ClientConfig::new(api_url, credentials_path);
    config.fallback = args.fallback;
    config.request_timeout = Duration::from_secs(args.timeout.max(1));
    Some(config)
}
