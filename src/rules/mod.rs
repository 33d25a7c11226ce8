mod rule;
mod store;
mod watcher;

pub use self::rule::{Policy, Rule, SwitchScope};
pub use self::store::{LoadError, RuleStore, HEADER_FIELDS};
pub use self::watcher::{ReloadEvent, RulesWatcher};
