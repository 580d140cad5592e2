//! Robots.txt handling module
//!
//! The mirror only consults robots.txt as advice: the result is logged and
//! reported, and the crawl proceeds either way.

mod parser;

pub use parser::ParsedRobots;

use reqwest::Client;
use url::Url;

/// What the site's robots.txt says about mirroring it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RobotsAdvice {
    /// No robots.txt (or it could not be fetched)
    Missing,
    /// robots.txt exists but disallows nothing
    NoRestrictions,
    /// robots.txt contains Disallow rules
    Restricted {
        /// Number of non-empty Disallow rules
        rules: usize,
        /// Whether the seed URL itself is allowed for our user agent
        seed_allowed: bool,
    },
}

impl RobotsAdvice {
    pub fn is_restricted(&self) -> bool {
        matches!(self, Self::Restricted { .. })
    }
}

/// Fetches `<site-root>/robots.txt` for `seed` and logs a caution if it
/// restricts crawling
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `seed` - The seed URL of the run
/// * `user_agent` - Product token matched against `User-agent` groups
///
/// Never fails and never blocks the crawl.
pub async fn check_robots(client: &Client, seed: &Url, user_agent: &str) -> RobotsAdvice {
    let robots = match fetch_robots(client, seed).await {
        Some(robots) => robots,
        None => {
            tracing::debug!("No robots.txt for {}", seed);
            return RobotsAdvice::Missing;
        }
    };

    let rules = robots.disallow_rules();
    if rules == 0 {
        tracing::info!("robots.txt for {} disallows nothing", seed);
        return RobotsAdvice::NoRestrictions;
    }

    let seed_allowed = is_allowed(&robots, seed.as_str(), user_agent);
    tracing::warn!(
        "robots.txt for {} has {} Disallow rule(s){}; mirroring anyway, please be considerate",
        seed,
        rules,
        if seed_allowed {
            ""
        } else {
            " and disallows the seed for this crawler"
        }
    );

    RobotsAdvice::Restricted {
        rules,
        seed_allowed,
    }
}

/// Fetches robots.txt for the site of `seed`
///
/// Returns `None` when the file is missing or unreachable.
pub async fn fetch_robots(client: &Client, seed: &Url) -> Option<ParsedRobots> {
    let url = seed.join("/robots.txt").ok()?;

    let response = match client.get(url.clone()).send().await {
        Ok(response) => response,
        Err(e) => {
            tracing::debug!("Failed to fetch {}: {}", url, e);
            return None;
        }
    };

    if !response.status().is_success() {
        return None;
    }

    match response.text().await {
        Ok(body) => Some(ParsedRobots::from_content(&body)),
        Err(e) => {
            tracing::debug!("Failed to read {}: {}", url, e);
            None
        }
    }
}

/// Checks if a URL is allowed by robots.txt
pub fn is_allowed(robots: &ParsedRobots, url: &str, user_agent: &str) -> bool {
    robots.is_allowed(url, user_agent)
}
