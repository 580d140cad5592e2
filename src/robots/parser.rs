//! robots.txt contents and the two questions the mirror asks of them

use robotstxt::DefaultMatcher;

/// A fetched robots.txt file
#[derive(Debug, Clone, Default)]
pub struct ParsedRobots {
    body: String,
}

impl ParsedRobots {
    pub fn from_content(content: &str) -> Self {
        Self {
            body: content.to_string(),
        }
    }

    /// Whether `user_agent` may fetch `url` according to the file
    ///
    /// An empty file allows everything. Matching follows Google's robots.txt
    /// rules (longest match wins, `Allow` beats `Disallow` on ties).
    pub fn is_allowed(&self, url: &str, user_agent: &str) -> bool {
        if self.body.trim().is_empty() {
            return true;
        }
        DefaultMatcher::default().one_agent_allowed_by_robots(&self.body, user_agent, url)
    }

    /// Number of non-empty `Disallow` rules, for any user agent
    ///
    /// An empty `Disallow:` allows everything and is not counted.
    pub fn disallow_rules(&self) -> usize {
        self.body
            .lines()
            .map(|line| line.split('#').next().unwrap_or("").trim())
            .filter_map(|line| line.split_once(':'))
            .filter(|(key, value)| {
                key.trim().eq_ignore_ascii_case("disallow") && !value.trim().is_empty()
            })
            .count()
    }
}
