//! Name filtering shared by the listing commands.

use regex::Regex;

/// Matches function or table names against a user pattern: substring by
/// default, regular expression with `--regex`, everything when absent.
#[derive(Debug, Clone)]
pub enum NameMatcher {
    Any,
    Substring(String),
    Pattern(Regex),
}

impl NameMatcher {
    pub fn new(pattern: Option<&str>, use_regex: bool) -> Result<Self, regex::Error> {
        match pattern {
            None | Some("") => Ok(NameMatcher::Any),
            Some(p) if use_regex => Ok(NameMatcher::Pattern(Regex::new(p)?)),
            Some(p) => Ok(NameMatcher::Substring(p.to_string())),
        }
    }

    pub fn matches(&self, name: &str) -> bool {
        match self {
            NameMatcher::Any => true,
            NameMatcher::Substring(needle) => name.contains(needle.as_str()),
            NameMatcher::Pattern(re) => re.is_match(name),
        }
    }
}
