//! Counter recording functions.
//!
//! Thin wrappers over the `metrics` facade so call sites stay one line and
//! metric names live in one place. Without an installed recorder these are
//! no-ops, which keeps the library usable from tests and embedders.

/// A rule snapshot finished loading.
pub fn rules_loaded(count: usize) {
    metrics::counter!("ofwalld.rules.loads").increment(1);
    metrics::gauge!("ofwalld.rules.active").set(count as f64);
}

/// A rule-source load failed outright (missing file, bad header).
pub fn rules_load_failed() {
    metrics::counter!("ofwalld.rules.load_failures").increment(1);
}

/// A single malformed record was dropped during a load.
pub fn rule_record_skipped() {
    metrics::counter!("ofwalld.rules.records_skipped").increment(1);
}

pub fn switch_connected() {
    metrics::counter!("ofwalld.switch.connects").increment(1);
}

pub fn switch_disconnected() {
    metrics::counter!("ofwalld.switch.disconnects").increment(1);
}

pub fn packet_allowed() {
    metrics::counter!("ofwalld.packets.allowed").increment(1);
}

pub fn packet_denied() {
    metrics::counter!("ofwalld.packets.denied").increment(1);
}

/// A packet-in payload could not be decoded.
pub fn decode_error() {
    metrics::counter!("ofwalld.packets.decode_errors").increment(1);
}

/// The transport could not install or transmit a directive.
pub fn directive_failed() {
    metrics::counter!("ofwalld.directives.failures").increment(1);
}
