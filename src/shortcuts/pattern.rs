//! Site patterns for site-scoped shortcuts
//!
//! `*` is the only wildcard and matches any run of characters. Everything
//! else is literal. Patterns are anchored at both ends. A pattern with a
//! `/` is matched against the full URL, one with a `:` against `host:port`,
//! and any other against the URL host.

use std::fmt;

use regex::{Regex, RegexBuilder};

/// Errors that can occur when compiling a site pattern
#[derive(Debug, thiserror::Error)]
pub enum PatternError {
    #[error("site pattern is empty")]
    Empty,

    #[error("invalid site pattern '{pattern}': {source}")]
    Invalid {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Part of the URL a pattern is matched against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    Host,
    HostPort,
    FullUrl,
}

/// A compiled site pattern
#[derive(Clone)]
pub struct SitePattern {
    source: String,
    regex: Regex,
    target: Target,
}

impl SitePattern {
    /// Compile a wildcard pattern such as `*.example.com`
    pub fn compile(pattern: &str) -> Result<Self, PatternError> {
        let pattern = pattern.trim();
        if pattern.is_empty() {
            return Err(PatternError::Empty);
        }

        let body = pattern
            .split('*')
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(".*");

        let regex = RegexBuilder::new(&format!("^{body}$"))
            .case_insensitive(true)
            .build()
            .map_err(|source| PatternError::Invalid {
                pattern: pattern.to_string(),
                source,
            })?;

        Ok(Self {
            source: pattern.to_string(),
            regex,
            target: if pattern.contains('/') {
                Target::FullUrl
            } else if pattern.contains(':') {
                Target::HostPort
            } else {
                Target::Host
            },
        })
    }

    /// The pattern as written
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Test the pattern against a tab URL
    pub fn matches(&self, tab_url: &str) -> bool {
        if self.target == Target::FullUrl {
            return self.regex.is_match(tab_url);
        }
        let parsed = match url::Url::parse(tab_url) {
            Ok(parsed) => parsed,
            // Bare hosts without a scheme still match host patterns
            Err(_) => return self.regex.is_match(tab_url),
        };
        let Some(host) = parsed.host_str() else {
            return false;
        };
        match (self.target, parsed.port_or_known_default()) {
            (Target::HostPort, Some(port)) => self.regex.is_match(&format!("{host}:{port}")),
            _ => self.regex.is_match(host),
        }
    }
}

impl PartialEq for SitePattern {
    fn eq(&self, other: &Self) -> bool {
        self.source.eq_ignore_ascii_case(&other.source)
    }
}

impl Eq for SitePattern {}

impl fmt::Debug for SitePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SitePattern").field(&self.source).finish()
    }
}

impl fmt::Display for SitePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subdomain_wildcard() {
        let pattern = SitePattern::compile("*.example.com").unwrap();
        assert!(pattern.matches("https://mail.example.com/inbox"));
        assert!(!pattern.matches("https://example.org"));
    }

    #[test]
    fn test_dots_are_literal() {
        let pattern = SitePattern::compile("*.example.com").unwrap();
        assert!(!pattern.matches("https://mail.exampleXcom/"));
    }

    #[test]
    fn test_anchored_on_both_ends() {
        let pattern = SitePattern::compile("example.com").unwrap();
        assert!(pattern.matches("https://example.com/path"));
        assert!(!pattern.matches("https://notexample.com/"));
        assert!(!pattern.matches("https://example.com.evil.net/"));
    }

    #[test]
    fn test_full_url_pattern() {
        let pattern = SitePattern::compile("https://github.com/*/pulls").unwrap();
        assert!(pattern.matches("https://github.com/rust-lang/pulls"));
        assert!(!pattern.matches("https://github.com/rust-lang/issues"));
    }

    #[test]
    fn test_host_port_pattern() {
        let pattern = SitePattern::compile("localhost:3000").unwrap();
        assert!(pattern.matches("http://localhost:3000/app"));
        assert!(!pattern.matches("http://localhost:8080/app"));
        assert!(!pattern.matches("http://localhost/app"));

        let any_port = SitePattern::compile("localhost:*").unwrap();
        assert!(any_port.matches("http://user:pw@localhost:5173/"));
        assert!(SitePattern::compile("example.com:443").unwrap().matches("https://example.com/"));
    }

    #[test]
    fn test_case_insensitive() {
        let pattern = SitePattern::compile("*.Example.COM").unwrap();
        assert!(pattern.matches("https://Docs.example.com/"));
    }

    #[test]
    fn test_empty_pattern_rejected() {
        assert!(matches!(SitePattern::compile("  "), Err(PatternError::Empty)));
    }
}
