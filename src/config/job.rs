use crate::url::{extract_domain, parse_http_url};
use crate::{ConfigError, UrlError};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// A single mirroring run, built once from operator input
#[derive(Debug, Clone)]
pub struct MirrorJob {
    seed_url: Url,
    host: String,
    output_root: PathBuf,
    timeout: Duration,
    skip_sitemap: bool,
    skip_robots: bool,
}

impl MirrorJob {
    /// Creates a job for `seed`, validating that it is an http(s) URL with a host
    ///
    /// # Arguments
    ///
    /// * `seed` - The starting URL supplied by the operator
    /// * `output_root` - Directory under which `<host>/...` is written
    /// * `timeout_secs` - Per-page render timeout, must be positive
    pub fn new(
        seed: &str,
        output_root: impl Into<PathBuf>,
        timeout_secs: u64,
    ) -> Result<Self, ConfigError> {
        let seed_url = parse_http_url(seed).map_err(|e| match e {
            UrlError::InvalidScheme(_) => {
                ConfigError::InvalidUrl(format!("Seed URL '{}' must use http or https", seed))
            }
            UrlError::MissingDomain => {
                ConfigError::InvalidUrl(format!("Seed URL '{}' has no host", seed))
            }
            UrlError::Parse(e) => {
                ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", seed, e))
            }
        })?;

        let host = extract_domain(&seed_url).ok_or_else(|| {
            ConfigError::InvalidUrl(format!("Seed URL '{}' has no host", seed))
        })?;

        if timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "timeout must be at least 1 second".to_string(),
            ));
        }

        Ok(Self {
            seed_url,
            host,
            output_root: output_root.into(),
            timeout: Duration::from_secs(timeout_secs),
            skip_sitemap: false,
            skip_robots: false,
        })
    }

    /// Disables the sitemap frontier expansion
    pub fn skip_sitemap(mut self, skip: bool) -> Self {
        self.skip_sitemap = skip;
        self
    }

    /// Disables the advisory robots.txt check
    pub fn skip_robots(mut self, skip: bool) -> Self {
        self.skip_robots = skip;
        self
    }

    pub fn seed_url(&self) -> &Url {
        &self.seed_url
    }

    /// Lowercase host of the seed URL
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    /// The directory holding this job's mirror: `outputRoot/<host>`
    pub fn host_dir(&self) -> PathBuf {
        self.output_root.join(&self.host)
    }

    /// Per-page render timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn sitemap_skipped(&self) -> bool {
        self.skip_sitemap
    }

    pub fn robots_skipped(&self) -> bool {
        self.skip_robots
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_job() {
        let job = MirrorJob::new("https://Example.com/start", "sites", 30).unwrap();
        assert_eq!(job.host(), "example.com");
        assert_eq!(job.host_dir(), PathBuf::from("sites/example.com"));
        assert_eq!(job.timeout(), Duration::from_secs(30));
        assert!(!job.sitemap_skipped());
        assert!(!job.robots_skipped());
    }

    #[test]
    fn test_flags() {
        let job = MirrorJob::new("https://example.com", "out", 5)
            .unwrap()
            .skip_sitemap(true)
            .skip_robots(true);
        assert!(job.sitemap_skipped());
        assert!(job.robots_skipped());
    }

    #[test]
    fn test_rejects_bad_scheme() {
        let result = MirrorJob::new("ftp://example.com/", "out", 30);
        assert!(matches!(result, Err(ConfigError::InvalidUrl(_))));
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(MirrorJob::new("not a url", "out", 30).is_err());
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let result = MirrorJob::new("https://example.com", "out", 0);
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }
}
