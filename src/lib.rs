//! site-mirror: a self-contained website mirroring engine
//!
//! This crate fetches a seed page, discovers the resources and same-site pages it
//! links to, downloads them under a concurrency ceiling with retry and backoff,
//! and rewrites in-page links so the mirror can be browsed offline.

pub mod config;
pub mod crawler;
pub mod output;
pub mod robots;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for site-mirror operations
///
/// Only run-level failures escape `Coordinator::run`; resource and page level
/// problems are absorbed where they happen and show up in the report instead.
#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Seed URL {url} is unreachable: {reason}")]
    SeedUnreachable { url: String, reason: String },

    #[error("Render error: {0}")]
    Render(#[from] crawler::RenderError),

    #[error("Failed to rewrite links in {url}: {message}")]
    Rewrite { url: String, message: String },

    #[error("Refusing to overwrite directory {path} with a file")]
    DirectoryConflict { path: String },

    #[error("Mirror run was interrupted")]
    Interrupted,

    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::PageState,
        to: state::PageState,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl MirrorError {
    /// Returns true if the error stems from the network rather than from the
    /// content of a response
    pub fn is_network(&self) -> bool {
        match self {
            Self::Reqwest(_) | Self::SeedUnreachable { .. } => true,
            Self::Render(e) => e.is_network(),
            _ => false,
        }
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid domain pattern: {0}")]
    InvalidPattern(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,
}

/// Result type alias for site-mirror operations
pub type Result<T> = std::result::Result<T, MirrorError>;

// Re-export commonly used types
pub use config::{Config, MirrorJob};
pub use crawler::{mirror_until, Coordinator};
pub use output::{MirrorReport, RunStatus};
pub use state::{PageState, VisitedSet};
pub use url::{extract_domain, parse_http_url};
