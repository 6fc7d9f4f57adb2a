//! Environment filter

use envsweep_cloud::Instance;
use regex::Regex;

/// Pattern used when an empty filter is explicitly allowed: matches any
/// identifier-shaped name or ID.
pub const MATCH_EVERYTHING: &str =
    "[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}";

/// Criterion selecting the resources of one environment
#[derive(Debug, Clone)]
pub enum EnvironmentFilter {
    /// Plain substring match
    Literal(String),
    /// Regular expression match
    Pattern(Regex),
}

impl EnvironmentFilter {
    pub fn literal(value: impl Into<String>) -> Self {
        EnvironmentFilter::Literal(value.into())
    }

    pub fn pattern(pattern: &str) -> Result<Self, regex::Error> {
        Ok(EnvironmentFilter::Pattern(Regex::new(pattern)?))
    }

    pub fn match_everything() -> Result<Self, regex::Error> {
        Self::pattern(MATCH_EVERYTHING)
    }

    /// Source text of the filter
    pub fn as_str(&self) -> &str {
        match self {
            EnvironmentFilter::Literal(value) => value,
            EnvironmentFilter::Pattern(regex) => regex.as_str(),
        }
    }

    /// Length in characters, as checked against the minimum filter length
    pub fn len(&self) -> usize {
        self.as_str().chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.as_str().trim().is_empty()
    }

    pub fn is_match(&self, text: &str) -> bool {
        match self {
            EnvironmentFilter::Literal(value) => text.contains(value.as_str()),
            EnvironmentFilter::Pattern(regex) => regex.is_match(text),
        }
    }

    /// An instance matches when its name or its ID matches
    pub fn matches(&self, instance: &Instance) -> bool {
        self.is_match(&instance.name) || self.is_match(&instance.id)
    }
}

impl std::fmt::Display for EnvironmentFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EnvironmentFilter::Literal(value) => write!(f, "{}", value),
            EnvironmentFilter::Pattern(regex) => write!(f, "/{}/", regex.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_matches_name_or_id() {
        let filter = EnvironmentFilter::literal("abcd1234");
        assert!(filter.matches(&Instance::new("srv-1", "abcd1234-master-0")));
        assert!(filter.matches(&Instance::new("abcd1234-0000", "bastion")));
        assert!(!filter.matches(&Instance::new("srv-2", "abcd123-master-0")));
    }

    #[test]
    fn test_pattern_filter() {
        let filter = EnvironmentFilter::pattern("^ocp-[a-z]+-worker").unwrap();
        assert!(filter.matches(&Instance::new("srv-1", "ocp-east-worker-1")));
        assert!(!filter.matches(&Instance::new("srv-2", "old-ocp-east-worker-1")));
        assert!(EnvironmentFilter::pattern("ocp-(").is_err());
    }

    #[test]
    fn test_match_everything_matches_identifiers() {
        let filter = EnvironmentFilter::match_everything().unwrap();
        assert!(filter.matches(&Instance::new(
            "7f1c0c1e-0000-4000-8000-000000000001",
            "anything"
        )));
        assert!(!filter.matches(&Instance::new("srv-1", "web")));
        assert!(filter.len() >= 8);
    }

    #[test]
    fn test_length_and_emptiness() {
        assert_eq!(EnvironmentFilter::literal("ab").len(), 2);
        assert!(EnvironmentFilter::literal("  ").is_empty());
        assert!(!EnvironmentFilter::literal("ab").is_empty());
    }
}
