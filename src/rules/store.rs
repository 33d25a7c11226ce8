//! Rule source loading and validation.
//!
//! The rule source is a UTF-8 text stream of tab-separated records. The first
//! line must be the exact header `enabled	mac_src	mac_dst	policy	switch`;
//! data records carry five fields each. Blank lines and `#` comments are
//! skipped, and malformed records are dropped with a warning without
//! aborting the load.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

use crate::telemetry::counters;

use super::rule::{Policy, Rule, SwitchScope};
use crate::engine::WildcardPattern;

/// Field names the header record must carry, in order.
pub const HEADER_FIELDS: [&str; 5] = ["enabled", "mac_src", "mac_dst", "policy", "switch"];

/// Errors that abort a rule-source load.
///
/// All of these are absorbed at the controller boundary: the process keeps
/// running against an empty store (default deny) and the failure is logged.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("rule source not found: {path}")]
    SourceNotFound { path: PathBuf },

    #[error("rule source header mismatch: expected [enabled, mac_src, mac_dst, policy, switch], found {found:?}")]
    HeaderMismatch { found: Vec<String> },

    #[error("failed to read rule source: {0}")]
    Io(#[from] io::Error),
}

/// An immutable, ordered rule list.
///
/// Built once per load; a reload produces a whole new store swapped in as one
/// `Arc`, so readers always observe a consistent snapshot.
#[derive(Debug, Clone, Default)]
pub struct RuleStore {
    rules: Vec<Rule>,
    skipped: usize,
}

impl RuleStore {
    /// A store with no rules: every candidate is denied.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load and validate the rule file at `path`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let path = path.as_ref();

        debug!(path = %path.display(), "loading firewall rules");

        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(LoadError::SourceNotFound {
                    path: path.to_path_buf(),
                });
            }
            Err(e) => return Err(LoadError::Io(e)),
        };

        Self::parse(&contents)
    }

    /// Parse a rule source. The header record is mandatory; data records that
    /// fail to parse are skipped and counted, not fatal.
    pub fn parse(source: &str) -> Result<Self, LoadError> {
        let mut lines = source.lines();

        let header = lines.next().unwrap_or_default();
        let fields: Vec<&str> = header.split('\t').map(str::trim).collect();
        if fields != HEADER_FIELDS {
            return Err(LoadError::HeaderMismatch {
                found: fields.into_iter().map(String::from).collect(),
            });
        }

        let mut rules = Vec::new();
        let mut skipped = 0usize;

        for (lineno, line) in lines.enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let fields: Vec<&str> = line.split('\t').map(str::trim).collect();
            if fields.len() != HEADER_FIELDS.len() {
                warn!(line = lineno + 2, fields = fields.len(), "malformed rule record, skipping");
                counters::rule_record_skipped();
                skipped += 1;
                continue;
            }

            let src = match WildcardPattern::compile(fields[1]) {
                Ok(pattern) => pattern,
                Err(e) => {
                    warn!(line = lineno + 2, error = %e, "malformed source MAC pattern, skipping");
                    counters::rule_record_skipped();
                    skipped += 1;
                    continue;
                }
            };
            let dst = match WildcardPattern::compile(fields[2]) {
                Ok(pattern) => pattern,
                Err(e) => {
                    warn!(line = lineno + 2, error = %e, "malformed destination MAC pattern, skipping");
                    counters::rule_record_skipped();
                    skipped += 1;
                    continue;
                }
            };

            rules.push(Rule {
                enabled: Rule::enabled_from_field(fields[0]),
                src,
                dst,
                policy: Policy::from_field(fields[3]),
                scope: SwitchScope::from_field(fields[4]),
            });
        }

        Ok(Self { rules, skipped })
    }

    /// The loaded rules, in source order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Number of loaded rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// True if the store holds no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Number of records dropped as malformed during the load.
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const HEADER: &str = "enabled\tmac_src\tmac_dst\tpolicy\tswitch";

    #[test]
    fn parse_minimal_source() {
        let source = format!("{HEADER}\nenable\t00:00:00:00:00:01\t*\tallow\t*\n");
        let store = RuleStore::parse(&source).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.skipped(), 0);
        assert!(store.rules()[0].enabled);
        assert_eq!(store.rules()[0].policy, Policy::Allow);
    }

    #[test]
    fn comments_and_blank_lines_skipped() {
        let source = format!(
            "{HEADER}\n\n# blocked lab hosts\nenable\t*\t*\tdeny\ts1\n   \n"
        );
        let store = RuleStore::parse(&source).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.skipped(), 0);
    }

    #[test]
    fn fields_are_trimmed() {
        let source = format!("{HEADER}\n enable \t 00:00:00:00:00:01 \t * \t allow \t s0,s1 \n");
        let store = RuleStore::parse(&source).unwrap();
        assert!(store.rules()[0].enabled);
        assert_eq!(store.rules()[0].src.as_str(), "00:00:00:00:00:01");
        assert!(store.rules()[0].scope.matches_label("s1"));
    }

    #[test]
    fn header_mismatch_rejected() {
        let source = "mac_src\tenabled\tmac_dst\tpolicy\tswitch\nenable\t*\t*\tallow\t*\n";
        let err = RuleStore::parse(source).unwrap_err();
        assert!(matches!(err, LoadError::HeaderMismatch { .. }));
    }

    #[test]
    fn empty_source_is_header_mismatch() {
        let err = RuleStore::parse("").unwrap_err();
        assert!(matches!(err, LoadError::HeaderMismatch { .. }));
    }

    #[test]
    fn malformed_record_skipped_load_continues() {
        let source = format!(
            "{HEADER}\nenable\t*\t*\tallow\nenable\t00:00:00:00:00:02\t*\tdeny\t*\n"
        );
        let store = RuleStore::parse(&source).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.skipped(), 1);
        assert_eq!(store.rules()[0].src.as_str(), "00:00:00:00:00:02");
    }

    #[test]
    fn load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = RuleStore::load(dir.path().join("absent.txt")).unwrap_err();
        assert!(matches!(err, LoadError::SourceNotFound { .. }));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.txt");
        std::fs::write(
            &path,
            format!("{HEADER}\nenable\t*\t00:00:00:00:00:09\tdeny\ts3\n"),
        )
        .unwrap();

        let store = RuleStore::load(&path).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.rules()[0].dst.as_str(), "00:00:00:00:00:09");
    }
}
