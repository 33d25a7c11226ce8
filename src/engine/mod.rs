//! First-match rule evaluation.
//!
//! Evaluation is a pure function over an immutable [`RuleStore`] snapshot:
//! rules are scanned in load order, disabled rules are skipped, and the first
//! rule whose switch scope and both MAC patterns match decides the verdict.
//! No enabled match means default deny.

mod wildcard;

pub use self::wildcard::WildcardPattern;

use std::fmt;

use crate::packet::MacAddress;
use crate::rules::{Policy, RuleStore};

/// Numeric identifier of an OpenFlow switch (its datapath id).
///
/// Displays as the switch label used in rule scopes: `s<id>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SwitchId(pub u64);

impl fmt::Display for SwitchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}

/// The first packet of an unknown flow, as seen by the controller.
///
/// Built per packet-in event and consumed immediately; never stored.
#[derive(Debug, Clone, Copy)]
pub struct FlowCandidate {
    pub src: MacAddress,
    pub dst: MacAddress,
    pub switch: SwitchId,
    pub in_port: u32,
}

/// Outcome of evaluating a candidate, with the deciding rule for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Admitted by the rule at the given index.
    Allow { rule: usize },
    /// Blocked by the rule at the given index, or by default deny (`None`).
    Deny { rule: Option<usize> },
}

impl Verdict {
    pub fn is_allow(&self) -> bool {
        matches!(self, Verdict::Allow { .. })
    }

    /// Index of the rule that decided the verdict, if any matched.
    pub fn rule(&self) -> Option<usize> {
        match self {
            Verdict::Allow { rule } => Some(*rule),
            Verdict::Deny { rule } => *rule,
        }
    }
}

/// Evaluate `candidate` against `store`, first enabled match wins.
///
/// Safe to call concurrently: it only reads the snapshot it is given, so an
/// in-flight evaluation is never affected by a concurrent rule reload.
pub fn evaluate(store: &RuleStore, candidate: &FlowCandidate) -> Verdict {
    let label = candidate.switch.to_string();
    let src = candidate.src.to_string();
    let dst = candidate.dst.to_string();

    for (idx, rule) in store.rules().iter().enumerate() {
        if !rule.enabled {
            continue;
        }
        if rule.scope.matches_label(&label)
            && rule.src.matches(&src)
            && rule.dst.matches(&dst)
        {
            return match rule.policy {
                Policy::Allow => Verdict::Allow { rule: idx },
                Policy::Deny => Verdict::Deny { rule: Some(idx) },
            };
        }
    }

    Verdict::Deny { rule: None }
}
