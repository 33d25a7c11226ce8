mod loader;
mod types;

pub use self::types::{Config, RulesConfig, Settings, TelemetryConfig};
