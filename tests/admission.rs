//! End-to-end admission flow over the in-memory switch fabric.

use std::sync::Arc;

use tokio::sync::watch;

use ofwalld::controller::{AdmissionController, FlowAction, TABLE_MISS_PRIORITY};
use ofwalld::engine::SwitchId;
use ofwalld::packet::ETHERTYPE_LLDP;
use ofwalld::rules::RuleStore;
use ofwalld::transport::{MockFabric, SwitchHandle};

const HEADER: &str = "enabled\tmac_src\tmac_dst\tpolicy\tswitch";

fn store(rows: &[&str]) -> Arc<RuleStore> {
    let source = format!("{HEADER}\n{}\n", rows.join("\n"));
    Arc::new(RuleStore::parse(&source).unwrap())
}

fn eth_frame(src: &str, dst: &str, ethertype: u16) -> Vec<u8> {
    let src: ofwalld::packet::MacAddress = src.parse().unwrap();
    let dst: ofwalld::packet::MacAddress = dst.parse().unwrap();

    let mut payload = Vec::new();
    payload.extend_from_slice(dst.as_bytes());
    payload.extend_from_slice(src.as_bytes());
    payload.extend_from_slice(&ethertype.to_be_bytes());
    payload.extend_from_slice(b"payload");
    payload
}

fn controller_with(
    rules: Arc<RuleStore>,
) -> (
    AdmissionController<MockFabric>,
    Arc<MockFabric>,
    watch::Sender<Arc<RuleStore>>,
) {
    let fabric = Arc::new(MockFabric::new());
    let (tx, rx) = watch::channel(rules);
    let controller = AdmissionController::new(fabric.clone(), rx);
    (controller, fabric, tx)
}

#[tokio::test]
async fn connect_installs_table_miss_exactly_once() {
    let (controller, fabric, _tx) = controller_with(store(&[]));
    let handle = SwitchHandle(10);

    controller.on_switch_connected(SwitchId(1), handle).await;

    let installed = fabric.installed_for(handle);
    assert_eq!(installed.len(), 1);
    assert_eq!(installed[0].action, FlowAction::Controller);
    assert_eq!(installed[0].priority, TABLE_MISS_PRIORITY);
    assert!(installed[0].matches.is_catch_all());
    assert_eq!(controller.session_count().await, 1);
}

#[tokio::test]
async fn admitted_flow_installs_forward_and_releases_packet() {
    let rules = store(&["enable\t00:00:00:00:00:01\t*\tallow\t*"]);
    let (controller, fabric, _tx) = controller_with(rules);
    let handle = SwitchHandle(10);

    controller.on_switch_connected(SwitchId(1), handle).await;
    let payload = eth_frame("00:00:00:00:00:01", "00:00:00:00:00:02", 0x0800);
    controller.on_packet_in(SwitchId(1), 4, &payload).await;

    let installed = fabric.installed_for(handle);
    assert_eq!(installed.len(), 2, "table-miss plus the forward flow");

    let flow = &installed[1];
    assert_eq!(flow.action, FlowAction::Forward);
    assert_eq!(flow.priority, 1);
    assert_eq!(flow.matches.in_port, Some(4));
    assert_eq!(flow.matches.src.unwrap().to_string(), "00:00:00:00:00:01");
    assert_eq!(flow.matches.dst.unwrap().to_string(), "00:00:00:00:00:02");

    // The packet that triggered the decision went back out.
    let transmissions = fabric.transmissions();
    assert_eq!(transmissions.len(), 1);
    assert_eq!(transmissions[0].in_port, 4);
    assert_eq!(transmissions[0].action, FlowAction::Forward);
    assert_eq!(transmissions[0].payload.as_deref(), Some(payload.as_slice()));
}

#[tokio::test]
async fn denied_flow_installs_drop_and_discards_packet() {
    let rules = store(&["enable\t00:00:00:00:00:01\t*\tallow\t*"]);
    let (controller, fabric, _tx) = controller_with(rules);
    let handle = SwitchHandle(10);

    controller.on_switch_connected(SwitchId(1), handle).await;
    let payload = eth_frame("00:00:00:00:00:09", "00:00:00:00:00:02", 0x0800);
    controller.on_packet_in(SwitchId(1), 4, &payload).await;

    let installed = fabric.installed_for(handle);
    assert_eq!(installed.len(), 2);
    assert_eq!(installed[1].action, FlowAction::Drop);
    assert_eq!(installed[1].priority, 1);

    // Denied packets are never retransmitted.
    assert!(fabric.transmissions().is_empty());
}

#[tokio::test]
async fn lldp_frames_are_ignored() {
    let rules = store(&["enable\t*\t*\tallow\t*"]);
    let (controller, fabric, _tx) = controller_with(rules);
    let handle = SwitchHandle(10);

    controller.on_switch_connected(SwitchId(1), handle).await;
    let before = fabric.emission_count();

    let payload = eth_frame("00:00:00:00:00:01", "01:80:c2:00:00:0e", ETHERTYPE_LLDP);
    controller.on_packet_in(SwitchId(1), 4, &payload).await;

    // No directive of any kind for discovery traffic.
    assert_eq!(fabric.emission_count(), before);
}

#[tokio::test]
async fn undecodable_payload_is_dropped_without_directive() {
    let rules = store(&["enable\t*\t*\tallow\t*"]);
    let (controller, fabric, _tx) = controller_with(rules);
    let handle = SwitchHandle(10);

    controller.on_switch_connected(SwitchId(1), handle).await;
    let before = fabric.emission_count();

    controller.on_packet_in(SwitchId(1), 4, &[0xde, 0xad]).await;

    assert_eq!(fabric.emission_count(), before);
}

#[tokio::test]
async fn packet_in_from_unknown_switch_is_dropped() {
    let rules = store(&["enable\t*\t*\tallow\t*"]);
    let (controller, fabric, _tx) = controller_with(rules);

    let payload = eth_frame("00:00:00:00:00:01", "00:00:00:00:00:02", 0x0800);
    controller.on_packet_in(SwitchId(9), 1, &payload).await;

    assert_eq!(fabric.emission_count(), 0);
}

#[tokio::test]
async fn disconnect_removes_session() {
    let (controller, fabric, _tx) = controller_with(store(&["enable\t*\t*\tallow\t*"]));
    let handle = SwitchHandle(10);

    controller.on_switch_connected(SwitchId(1), handle).await;
    assert!(controller.on_switch_disconnected(SwitchId(1)).await);
    assert_eq!(controller.session_count().await, 0);
    assert!(!controller.on_switch_disconnected(SwitchId(1)).await);

    // Packet-ins after disconnect are dropped like any unknown switch.
    let before = fabric.emission_count();
    let payload = eth_frame("00:00:00:00:00:01", "00:00:00:00:00:02", 0x0800);
    controller.on_packet_in(SwitchId(1), 1, &payload).await;
    assert_eq!(fabric.emission_count(), before);
}

#[tokio::test]
async fn failed_emission_is_not_retried() {
    let rules = store(&["enable\t*\t*\tallow\t*"]);
    let (controller, fabric, _tx) = controller_with(rules);
    let handle = SwitchHandle(10);

    controller.on_switch_connected(SwitchId(1), handle).await;

    fabric.fail_next_emission();
    let payload = eth_frame("00:00:00:00:00:01", "00:00:00:00:00:02", 0x0800);
    controller.on_packet_in(SwitchId(1), 4, &payload).await;

    // The forward install failed; no retry, no transmission.
    assert_eq!(fabric.installed_for(handle).len(), 1);
    assert!(fabric.transmissions().is_empty());

    // The next packet is unaffected.
    controller.on_packet_in(SwitchId(1), 4, &payload).await;
    assert_eq!(fabric.installed_for(handle).len(), 2);
    assert_eq!(fabric.transmissions().len(), 1);
}

#[tokio::test]
async fn rule_reload_applies_to_subsequent_packets() {
    let (controller, fabric, tx) = controller_with(store(&[]));
    let handle = SwitchHandle(10);

    controller.on_switch_connected(SwitchId(1), handle).await;
    let payload = eth_frame("00:00:00:00:00:01", "00:00:00:00:00:02", 0x0800);

    // Empty store: denied.
    controller.on_packet_in(SwitchId(1), 4, &payload).await;
    assert_eq!(fabric.installed_for(handle)[1].action, FlowAction::Drop);

    // Swap in an allow rule: next packet is admitted.
    tx.send(store(&["enable\t*\t*\tallow\t*"])).unwrap();
    controller.on_packet_in(SwitchId(1), 4, &payload).await;
    assert_eq!(fabric.installed_for(handle)[2].action, FlowAction::Forward);
}

#[tokio::test]
async fn held_snapshot_is_immune_to_reload() {
    use ofwalld::engine::{self, FlowCandidate};

    let (tx, rx) = watch::channel(store(&["enable\t*\t*\tallow\t*"]));

    // An in-flight evaluation holds one snapshot...
    let snapshot = rx.borrow().clone();

    // ...which a concurrent reload does not touch.
    tx.send(store(&["enable\t*\t*\tdeny\t*"])).unwrap();

    let candidate = FlowCandidate {
        src: "00:00:00:00:00:01".parse().unwrap(),
        dst: "00:00:00:00:00:02".parse().unwrap(),
        switch: SwitchId(0),
        in_port: 1,
    };

    assert!(engine::evaluate(&snapshot, &candidate).is_allow());
    assert!(!engine::evaluate(&rx.borrow(), &candidate).is_allow());
}
