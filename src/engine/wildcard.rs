//! Glob-style wildcard matching for MAC address patterns.
//!
//! A pattern is either a literal MAC address or contains `*`, which matches
//! zero or more arbitrary characters. Patterns are compiled once at rule-load
//! time; literal characters are escaped before regex assembly so `.` or `:`
//! in a pattern can never act as metacharacters.

use std::fmt;

use regex::Regex;

/// A compiled wildcard pattern, anchored at both ends, case-insensitive.
#[derive(Debug, Clone)]
pub struct WildcardPattern {
    raw: String,
    regex: Regex,
}

impl WildcardPattern {
    /// Compile `pattern` into an anchored case-insensitive matcher.
    pub fn compile(pattern: &str) -> Result<Self, regex::Error> {
        let mut expr = String::with_capacity(pattern.len() + 8);
        expr.push_str("(?i)^");
        for (i, literal) in pattern.split('*').enumerate() {
            if i > 0 {
                expr.push_str(".*");
            }
            expr.push_str(&regex::escape(literal));
        }
        expr.push('$');

        Ok(Self {
            raw: pattern.to_string(),
            regex: Regex::new(&expr)?,
        })
    }

    /// Check whether `value` matches the whole pattern.
    pub fn matches(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }

    /// The pattern text as written in the rule source.
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for WildcardPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
