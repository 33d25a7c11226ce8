//! ofwalld: an OpenFlow access-control controller.
//!
//! Switches send the controller the first packet of every flow that misses
//! their flow tables. The controller evaluates the packet's source MAC,
//! destination MAC and switch against an ordered rule file (first enabled
//! match wins, default deny) and installs a forward or drop flow entry so the
//! rest of the flow never leaves the switch.
//!
//! The crate is the controller core: rule loading and hot reload
//! ([`rules`]), first-match evaluation ([`engine`]), per-switch admission
//! orchestration ([`controller`]) and the server wiring ([`bootstrap`]).
//! Wire-protocol encoding lives in a transport frontend that feeds
//! [`bootstrap::SwitchEvent`]s in and consumes directives through
//! [`transport::FlowProgrammer`]; [`transport::MockFabric`] stands in for it
//! in tests and standalone runs.

pub mod bootstrap;
pub mod config;
pub mod controller;
pub mod engine;
pub mod packet;
pub mod rules;
pub mod telemetry;
pub mod transport;
