use mstp::bpdu::{flags, Bpdu, BpduRole, RstBpdu};
use mstp::*;

mod common;
use common::*;

fn started(port_count: usize, msti_count: usize, config: BridgeConfig) -> Bridge<Recorder> {
    init_tracing();
    let mut bridge =
        Bridge::new(port_count, msti_count, mac(1), config, Recorder::default()).unwrap();
    bridge.start(0).unwrap();
    bridge
}

/// An RST BPDU sent by the designated port 1 of a bridge with priority
/// `priority` that claims to be the root.
fn designated_rst(priority: u16, extra_flags: u8) -> Vec<u8> {
    let id = BridgeId::new(priority, 0, mac(9));
    Bpdu::Rst(RstBpdu {
        flags: BpduRole::Designated.to_flags() | extra_flags,
        root_id: id,
        root_path_cost: 0,
        bridge_id: id,
        port_id: PortId::new(0x80, 1),
        message_age: 0,
        max_age: 20,
        hello_time: 2,
        forward_delay: 15,
    })
    .encode()
}

#[test]
fn new_rejects_bad_parameters() {
    assert_eq!(
        Bridge::new(0, 0, mac(1), BridgeConfig::default(), NoopCallbacks).unwrap_err(),
        BridgeError::InvalidPortCount(0)
    );
    assert_eq!(
        Bridge::new(4096, 0, mac(1), BridgeConfig::default(), NoopCallbacks).unwrap_err(),
        BridgeError::InvalidPortCount(4096)
    );
    assert_eq!(
        Bridge::new(2, 65, mac(1), BridgeConfig::default(), NoopCallbacks).unwrap_err(),
        BridgeError::InvalidMstiCount(65)
    );

    let config = BridgeConfig {
        hello_time: 0,
        ..Default::default()
    };
    assert!(matches!(
        Bridge::new(2, 0, mac(1), config, NoopCallbacks),
        Err(BridgeError::InvalidConfig(_))
    ));

    let config = BridgeConfig {
        max_age: 40,
        forward_delay: 4,
        ..Default::default()
    };
    assert!(matches!(
        Bridge::new(2, 0, mac(1), config, NoopCallbacks),
        Err(BridgeError::InvalidConfig(_))
    ));
}

#[test]
fn fresh_bridge_is_its_own_root() {
    let mut bridge = started(3, 1, BridgeConfig::default());
    bridge.enable_port(0, 100, true, 0).unwrap();
    bridge.enable_port(2, 100, true, 0).unwrap();

    assert!(bridge.is_started());
    assert_eq!(bridge.port_count(), 3);
    assert_eq!(bridge.msti_count(), 1);
    for tree in 0..2 {
        assert_eq!(bridge.port_role(0, tree).unwrap(), PortRole::Designated);
        assert_eq!(bridge.port_role(1, tree).unwrap(), PortRole::Disabled);
        assert_eq!(bridge.port_role(2, tree).unwrap(), PortRole::Designated);
        assert_eq!(bridge.root_port(tree).unwrap(), None);
    }

    let root = bridge.root_priority(CIST).unwrap();
    assert_eq!(root.root_id, bridge.bridge_id(CIST).unwrap());
    assert_eq!(root.regional_root_id, bridge.bridge_id(CIST).unwrap());
    assert_eq!(root.external_root_path_cost, 0);
    assert_eq!(root.internal_root_path_cost, 0);
    assert_eq!(bridge.root_priority_vector(CIST).unwrap(), root.to_bytes());

    let msti_root = bridge.root_priority(1).unwrap();
    assert_eq!(msti_root.regional_root_id, bridge.bridge_id(1).unwrap());
    assert_eq!(bridge.bridge_id(1).unwrap().sys_id_ext(), 1);

    assert_eq!(bridge.root_times(CIST).unwrap().max_age, 20);
    assert_eq!(bridge.topology_change_count(), 0);
    assert_eq!(bridge.last_topology_change(), None);
    assert!(!bridge.evaluate(0));
}

#[test]
fn unanswered_proposal_makes_an_edge_port() {
    let mut bridge = started(2, 0, BridgeConfig::default());
    bridge.enable_port(0, 100, true, 0).unwrap();
    assert!(bridge.port_sends_rstp(0).unwrap());

    for time in 1..=2 {
        bridge.one_second_tick(time);
    }
    assert!(!bridge.port_oper_edge(0).unwrap());
    assert_eq!(bridge.port_state(0, CIST).unwrap(), PortState::Discarding);
    assert!(!bridge.callbacks().is_forwarding(0, CIST));

    bridge.one_second_tick(3);
    assert!(bridge.port_oper_edge(0).unwrap());
    assert_eq!(bridge.port_state(0, CIST).unwrap(), PortState::Forwarding);
    assert!(bridge.port_learning(0, CIST).unwrap());
    assert!(bridge.callbacks().is_forwarding(0, CIST));
    assert_eq!(bridge.topology_change_count(), 0);
}

#[test]
fn admin_edge_port_forwards_at_once() {
    let mut bridge = started(2, 0, BridgeConfig::default());
    bridge.set_port_admin_edge(0, true, 0).unwrap();
    assert!(bridge.port_admin_edge(0).unwrap());
    bridge.enable_port(0, 1000, true, 0).unwrap();

    assert!(bridge.port_oper_edge(0).unwrap());
    assert!(bridge.port_forwarding(0, CIST).unwrap());
    assert!(bridge.callbacks().is_forwarding(0, CIST));
    assert_eq!(bridge.topology_change_count(), 0);

    // A BPDU proves there is a bridge behind the port.
    bridge.receive_bpdu(0, &designated_rst(0xf000, 0), 1).unwrap();
    assert!(!bridge.port_oper_edge(0).unwrap());
    assert_eq!(bridge.port_role(0, CIST).unwrap(), PortRole::Designated);
    assert!(bridge.port_forwarding(0, CIST).unwrap());
}

#[test]
fn superior_bpdu_selects_a_root_port() {
    let mut bridge = started(2, 0, BridgeConfig::default());
    bridge.enable_port(0, 100, true, 0).unwrap();
    bridge.enable_port(1, 100, true, 0).unwrap();
    bridge.callbacks_mut().take_sent();

    bridge
        .receive_bpdu(0, &designated_rst(0x1000, flags::PROPOSAL), 1)
        .unwrap();

    assert_eq!(bridge.port_role(0, CIST).unwrap(), PortRole::Root);
    assert_eq!(bridge.port_role(1, CIST).unwrap(), PortRole::Designated);
    assert_eq!(bridge.root_port(CIST).unwrap(), Some(0));
    assert!(bridge.port_forwarding(0, CIST).unwrap());

    let root = bridge.root_priority(CIST).unwrap();
    assert_eq!(root.root_id, BridgeId::new(0x1000, 0, mac(9)));
    assert_eq!(root.external_root_path_cost, 200_000);
    assert_eq!(bridge.root_times(CIST).unwrap().message_age, 1);

    let designated = bridge.port_designated_priority(1, CIST).unwrap();
    assert_eq!(designated.root_id, root.root_id);
    assert_eq!(designated.designated_bridge_id, bridge.bridge_id(CIST).unwrap());

    assert!(bridge
        .callbacks()
        .role_changes
        .contains(&(0, CIST, PortRole::Root)));

    // The proposal is answered with an agreement from the root port.
    let sent = bridge.callbacks_mut().take_sent();
    assert!(sent.iter().any(|(port, bytes)| {
        let bpdu = Bpdu::decode(bytes).unwrap();
        *port == 0
            && bpdu.cist_role() == Some(BpduRole::Root)
            && bpdu.cist_flags() & flags::AGREEMENT != 0
    }));
}

#[test]
fn root_information_ages_out() {
    let mut bridge = started(2, 0, BridgeConfig::default());
    bridge.enable_port(0, 100, true, 0).unwrap();
    bridge.receive_bpdu(0, &designated_rst(0x1000, 0), 0).unwrap();
    assert_eq!(bridge.root_port(CIST).unwrap(), Some(0));

    // Three hello times without a BPDU.
    for time in 1..=6 {
        bridge.one_second_tick(time);
    }
    assert_eq!(bridge.root_port(CIST).unwrap(), None);
    assert_eq!(bridge.port_role(0, CIST).unwrap(), PortRole::Designated);
    assert_eq!(
        bridge.root_priority(CIST).unwrap().root_id,
        bridge.bridge_id(CIST).unwrap()
    );
}

#[test]
fn disabling_a_port_stops_forwarding() {
    let mut bridge = started(2, 0, BridgeConfig::default());
    bridge.set_port_admin_edge(0, true, 0).unwrap();
    bridge.enable_port(0, 100, true, 0).unwrap();
    assert!(bridge.port_forwarding(0, CIST).unwrap());

    bridge.disable_port(0, 1).unwrap();
    assert!(!bridge.port_enabled(0).unwrap());
    assert_eq!(bridge.port_role(0, CIST).unwrap(), PortRole::Disabled);
    assert_eq!(bridge.port_state(0, CIST).unwrap(), PortState::Discarding);
    assert!(!bridge.callbacks().is_forwarding(0, CIST));
}

#[test]
fn invalid_indexes_and_values() {
    let mut bridge = started(2, 1, BridgeConfig::default());

    assert_eq!(bridge.port_role(2, CIST), Err(BridgeError::InvalidPort(2)));
    assert_eq!(bridge.port_role(0, 2), Err(BridgeError::InvalidTree(2)));
    assert_eq!(bridge.enable_port(7, 100, true, 0), Err(BridgeError::InvalidPort(7)));
    assert_eq!(
        bridge.receive_bpdu(2, &[0, 0, 0, 0x80], 0),
        Err(BridgeError::InvalidPort(2))
    );
    assert_eq!(
        bridge.set_bridge_priority(CIST, 0x8001, 0),
        Err(BridgeError::InvalidBridgePriority(0x8001))
    );
    assert_eq!(
        bridge.set_port_priority(0, CIST, 0x81, 0),
        Err(BridgeError::InvalidPortPriority(0x81))
    );
    assert!(matches!(
        bridge.set_port_path_cost(0, CIST, 200_000_001, 0),
        Err(BridgeError::InvalidConfig(_))
    ));
    assert_eq!(bridge.tree_index_for_vlan(0), Err(BridgeError::InvalidVlan(0)));
    assert_eq!(
        bridge.tree_index_for_vlan(4095),
        Err(BridgeError::InvalidVlan(4095))
    );
    assert_eq!(
        bridge.set_mst_config_name(&"x".repeat(33), 0),
        Err(BridgeError::InvalidConfigName)
    );

    // A malformed frame is dropped without complaint.
    bridge.enable_port(0, 100, true, 0).unwrap();
    assert_eq!(bridge.receive_bpdu(0, &[0x00, 0x01, 0x00, 0x00], 0), Ok(()));
    assert_eq!(bridge.port_role(0, CIST).unwrap(), PortRole::Designated);
}

#[test]
fn priorities() {
    let mut bridge = started(2, 1, BridgeConfig::default());
    bridge.enable_port(0, 100, true, 0).unwrap();

    bridge.set_bridge_priority(1, 0x1000, 0).unwrap();
    assert_eq!(bridge.bridge_priority(1).unwrap(), 0x1000);
    assert_eq!(bridge.bridge_priority(CIST).unwrap(), 0x8000);
    assert_eq!(bridge.root_priority(1).unwrap().regional_root_id.priority(), 0x1000);

    bridge.set_port_priority(0, CIST, 0x40, 0).unwrap();
    assert_eq!(bridge.port_priority(0, CIST).unwrap(), 0x40);
    assert_eq!(bridge.port_priority(0, 1).unwrap(), 0x80);
    let id = bridge.port_identifier(0, CIST).unwrap();
    assert_eq!(id.priority(), 0x40);
    assert_eq!(id.number(), 1);
    assert_eq!(
        bridge.port_designated_priority(0, CIST).unwrap().designated_port_id,
        id
    );
}

#[test]
fn path_costs() {
    let mut bridge = started(2, 1, BridgeConfig::default());
    bridge.enable_port(0, 1_000, true, 0).unwrap();
    assert_eq!(bridge.port_path_cost(0, CIST).unwrap(), 20_000);
    assert_eq!(bridge.port_external_path_cost(0).unwrap(), 20_000);

    bridge.set_port_path_cost(0, 1, 7, 0).unwrap();
    assert_eq!(bridge.port_path_cost(0, 1).unwrap(), 7);
    assert_eq!(bridge.port_path_cost(0, CIST).unwrap(), 20_000);

    bridge.set_port_path_cost(0, CIST, 5, 0).unwrap();
    assert_eq!(bridge.port_path_cost(0, CIST).unwrap(), 5);
    assert_eq!(bridge.port_external_path_cost(0).unwrap(), 5);

    bridge.set_port_path_cost(0, CIST, 0, 0).unwrap();
    assert_eq!(bridge.port_external_path_cost(0).unwrap(), 20_000);
}

#[test]
fn point_to_point() {
    let mut bridge = started(2, 0, BridgeConfig::default());
    bridge.enable_port(0, 100, false, 0).unwrap();
    assert_eq!(bridge.port_admin_point_to_point(0).unwrap(), AdminP2P::Auto);
    assert!(!bridge.port_oper_point_to_point(0).unwrap());

    bridge
        .set_port_admin_point_to_point(0, AdminP2P::ForceTrue, 0)
        .unwrap();
    assert!(bridge.port_oper_point_to_point(0).unwrap());

    bridge.set_port_auto_edge(0, false, 0).unwrap();
    assert!(!bridge.port_auto_edge(0).unwrap());
}

#[test]
fn mst_configuration() {
    let mut bridge = started(2, 2, BridgeConfig::default());
    assert_eq!(bridge.mst_config_name(), mac(1).to_string());
    assert_eq!(bridge.mst_config_revision(), 0);
    assert_eq!(bridge.mst_config_digest(), MstConfigTable::new().digest());

    bridge.set_mst_config_name("lab", 1).unwrap();
    assert_eq!(bridge.mst_config_name(), "lab");
    assert_eq!(bridge.callbacks().config_changes, 1);

    // Same name again: nothing changes.
    bridge.set_mst_config_name("lab", 2).unwrap();
    assert_eq!(bridge.callbacks().config_changes, 1);

    bridge.set_mst_config_revision(7, 3).unwrap();
    assert_eq!(bridge.mst_config_revision(), 7);
    assert_eq!(bridge.callbacks().config_changes, 2);

    let mut table = MstConfigTable::new();
    table.set(10, 1).unwrap();
    table.set(20, 2).unwrap();
    bridge.set_mst_config_table(&table, 4).unwrap();
    assert_eq!(bridge.callbacks().config_changes, 3);
    assert_eq!(bridge.mst_config_digest(), table.digest());
    assert_ne!(bridge.mst_config_digest(), MstConfigTable::new().digest());
    assert_eq!(bridge.mst_config_table(), &table);
    assert_eq!(bridge.tree_index_for_vlan(10).unwrap(), 1);
    assert_eq!(bridge.tree_index_for_vlan(20).unwrap(), 2);
    assert_eq!(bridge.tree_index_for_vlan(30).unwrap(), CIST);

    let mut too_big = MstConfigTable::new();
    too_big.set(10, 3).unwrap();
    assert_eq!(
        bridge.set_mst_config_table(&too_big, 5),
        Err(BridgeError::InvalidTree(3))
    );
    assert_eq!(bridge.callbacks().config_changes, 3);
    assert_eq!(bridge.mst_config_id().digest, table.digest());
}

#[test]
fn version_change_restarts_the_machines() {
    let mut bridge = started(2, 0, BridgeConfig::default());
    bridge.enable_port(0, 100, true, 0).unwrap();
    assert!(bridge.port_sends_rstp(0).unwrap());

    bridge.set_stp_version(StpVersion::LegacyStp, 1).unwrap();
    assert_eq!(bridge.stp_version(), StpVersion::LegacyStp);
    assert_eq!(bridge.callbacks().config_changes, 1);
    assert!(!bridge.port_sends_rstp(0).unwrap());
    assert_eq!(bridge.port_role(0, CIST).unwrap(), PortRole::Designated);

    bridge.set_stp_version(StpVersion::LegacyStp, 2).unwrap();
    assert_eq!(bridge.callbacks().config_changes, 1);
}

#[test]
fn rstp_bridge_sends_rst_bpdus() {
    let config = BridgeConfig {
        force_version: StpVersion::Rstp,
        ..Default::default()
    };
    let mut bridge = started(1, 0, config);
    bridge.enable_port(0, 100, true, 0).unwrap();

    let sent = bridge.callbacks_mut().take_sent();
    assert!(!sent.is_empty());
    for (_, bytes) in sent {
        assert!(matches!(Bpdu::decode(&bytes), Ok(Bpdu::Rst(_))));
    }
}

#[test]
fn legacy_bridge_uses_forward_delay() {
    let config = BridgeConfig {
        force_version: StpVersion::LegacyStp,
        ..Default::default()
    };
    let mut bridge = started(1, 0, config);
    bridge.enable_port(0, 100, true, 0).unwrap();
    assert!(!bridge.port_sends_rstp(0).unwrap());

    for time in 1..=10 {
        bridge.one_second_tick(time);
    }
    // No edge detection without RSTP, and no rapid transitions.
    assert!(!bridge.port_oper_edge(0).unwrap());
    assert_eq!(bridge.port_state(0, CIST).unwrap(), PortState::Discarding);

    for time in 11..=40 {
        bridge.one_second_tick(time);
    }
    assert_eq!(bridge.port_state(0, CIST).unwrap(), PortState::Forwarding);
    assert!(bridge.topology_change_count() >= 1);

    let recorder = bridge.callbacks();
    assert!(!recorder.flushes.is_empty());
    assert!(recorder
        .flushes
        .iter()
        .all(|&(_, _, flush)| flush == FlushFdbType::RapidAgeing));
    for (_, bytes) in &recorder.sent {
        let bpdu = Bpdu::decode(bytes).unwrap();
        assert!(bpdu.is_stp());
    }
}

#[test]
fn logging_reports_transitions() {
    let mut bridge = started(2, 0, BridgeConfig::default());
    assert!(!bridge.logging_enabled());
    bridge.enable_port(1, 100, true, 0).unwrap();
    assert!(bridge.callbacks().log.is_empty());

    bridge.set_logging_enabled(true);
    bridge.enable_port(0, 100, true, 1).unwrap();
    let log = &bridge.callbacks().log;
    assert!(log
        .iter()
        .any(|line| line == "PortInformation port 0 tree 0: DISABLED -> AGED"));
    assert!(log
        .iter()
        .any(|line| line == "PortRoleSelection tree 0: ROLE_SELECTION -> ROLE_SELECTION"));
}

#[test]
fn stopped_bridge_ignores_input() {
    let mut bridge = started(2, 0, BridgeConfig::default());
    bridge.enable_port(0, 100, true, 0).unwrap();

    bridge.stop(1).unwrap();
    assert!(!bridge.is_started());
    assert_eq!(bridge.stop(1), Err(BridgeError::NotStarted));

    bridge.receive_bpdu(0, &designated_rst(0x1000, 0), 2).unwrap();
    assert_eq!(bridge.root_port(CIST).unwrap(), None);
    for time in 3..10 {
        bridge.one_second_tick(time);
    }
    assert!(!bridge.port_oper_edge(0).unwrap());
    assert!(!bridge.evaluate(10));

    bridge.start(11).unwrap();
    assert!(bridge.is_started());
    assert_eq!(bridge.port_role(0, CIST).unwrap(), PortRole::Designated);
    bridge.receive_bpdu(0, &designated_rst(0x1000, 0), 12).unwrap();
    assert_eq!(bridge.root_port(CIST).unwrap(), Some(0));
}

#[test]
fn stop_takes_ports_out_of_forwarding() {
    let mut bridge = started(2, 0, BridgeConfig::default());
    bridge.set_port_admin_edge(0, true, 0).unwrap();
    bridge.enable_port(0, 1000, true, 0).unwrap();
    assert!(bridge.callbacks().is_forwarding(0, CIST));
    bridge.callbacks_mut().role_changes.clear();

    bridge.stop(1).unwrap();
    assert!(!bridge.callbacks().is_forwarding(0, CIST));
    assert_eq!(bridge.port_state(0, CIST).unwrap(), PortState::Discarding);
    assert_eq!(bridge.port_role(0, CIST).unwrap(), PortRole::Disabled);
    assert!(!bridge.callbacks().role_changes.is_empty());

    bridge.start(2).unwrap();
    assert!(bridge.callbacks().is_forwarding(0, CIST));
}

#[test]
fn own_bpdu_is_ignored() {
    let mut bridge = started(2, 0, BridgeConfig::default());
    bridge.enable_port(0, 100, true, 0).unwrap();
    let sent = bridge.callbacks_mut().take_sent();
    let (_, own) = &sent[0];

    bridge.receive_bpdu(0, own, 1).unwrap();
    assert!(bridge.callbacks().sent.is_empty());
    assert_eq!(bridge.port_role(0, CIST).unwrap(), PortRole::Designated);
    assert!(!bridge.evaluate(1));
}

#[test]
fn evaluate_settles() {
    let mut bridge = started(3, 2, BridgeConfig::default());
    bridge.enable_port(0, 100, true, 0).unwrap();
    bridge.enable_port(1, 10, false, 0).unwrap();
    bridge.receive_bpdu(1, &designated_rst(0x2000, flags::TC), 0).unwrap();
    for time in 1..5 {
        bridge.one_second_tick(time);
        assert!(!bridge.evaluate(time));
    }

    let callbacks = bridge.into_callbacks();
    assert!(!callbacks.sent.is_empty());
}
