//! URL handling module for site-mirror
//!
//! This module provides http(s) URL validation, host extraction, and
//! deny-list domain matching.

mod domain;
mod matcher;
mod normalize;

pub use domain::{extract_domain, is_same_host};
pub use matcher::matches_domain;
pub use normalize::parse_http_url;
