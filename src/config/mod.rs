//! Configuration module for site-mirror
//!
//! Operator input becomes an immutable [`MirrorJob`]; engine tuning comes from an
//! optional TOML file whose every table falls back to built-in defaults.
//!
//! # Example
//!
//! ```no_run
//! use site_mirror::config::{load_config, MirrorJob};
//! use std::path::Path;
//!
//! let config = load_config(Path::new("mirror.toml")).unwrap();
//! let job = MirrorJob::new("https://example.com", "sites", 30).unwrap();
//! println!("Mirroring {} with {} downloads in flight", job.host(), config.downloader.max_concurrent_downloads);
//! ```

mod job;
mod parser;
mod types;
mod validation;

pub use job::MirrorJob;
pub use types::{Config, CrawlerConfig, DownloaderConfig, FilterConfig, UserAgentConfig};

pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
