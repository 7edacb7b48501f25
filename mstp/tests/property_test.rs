use mstp::bpdu::*;
use mstp::*;
use proptest::prelude::*;

mod common;
use common::*;

fn bridge_id() -> impl Strategy<Value = BridgeId> {
    (0u16..16, 0u16..4, 1u8..8).prop_map(|(prio, sys_id, last)| {
        BridgeId::new(prio << 12, sys_id, mac(last))
    })
}

fn priority_vector() -> impl Strategy<Value = PriorityVector> {
    (
        bridge_id(),
        0u32..3,
        bridge_id(),
        0u32..3,
        bridge_id(),
        0u16..4,
    )
        .prop_map(|(root, erpc, regional, irpc, designated, port)| PriorityVector {
            root_id: root,
            external_root_path_cost: erpc,
            regional_root_id: regional,
            internal_root_path_cost: irpc,
            designated_bridge_id: designated,
            designated_port_id: PortId::new(0x80, port),
            bridge_port_id: PortId::new(0x80, 1),
        })
}

fn rst_bpdu() -> impl Strategy<Value = RstBpdu> {
    (
        any::<u8>(),
        bridge_id(),
        any::<u32>(),
        bridge_id(),
        any::<u16>(),
        (0u16..256, 0u16..256, 0u16..256, 0u16..256),
    )
        .prop_map(
            |(flags, root_id, root_path_cost, bridge_id, port, (age, max_age, hello, fwd))| {
                RstBpdu {
                    flags,
                    root_id,
                    root_path_cost,
                    bridge_id,
                    port_id: PortId(port),
                    message_age: age,
                    max_age,
                    hello_time: hello,
                    forward_delay: fwd,
                }
            },
        )
}

fn config_bpdu() -> impl Strategy<Value = ConfigBpdu> {
    rst_bpdu().prop_map(|rst| ConfigBpdu {
        flags: rst.flags & flags::CONFIG_MASK,
        root_id: rst.root_id,
        root_path_cost: rst.root_path_cost,
        bridge_id: rst.bridge_id,
        port_id: rst.port_id,
        message_age: rst.message_age,
        max_age: rst.max_age,
        hello_time: rst.hello_time,
        forward_delay: rst.forward_delay,
    })
}

fn msti_config() -> impl Strategy<Value = MstiConfig> {
    (any::<u8>(), bridge_id(), any::<u32>(), 0u8..16, 0u8..16, any::<u8>()).prop_map(
        |(flags, regional_root_id, cost, bridge_prio, port_prio, hops)| MstiConfig {
            flags,
            regional_root_id,
            internal_root_path_cost: cost,
            bridge_priority: bridge_prio << 4,
            port_priority: port_prio << 4,
            remaining_hops: hops,
        },
    )
}

fn mst_bpdu() -> impl Strategy<Value = MstBpdu> {
    (
        rst_bpdu(),
        "[a-z0-9]{0,32}",
        any::<u16>(),
        any::<[u8; 16]>(),
        (any::<u32>(), bridge_id(), any::<u8>()),
        proptest::collection::vec(msti_config(), 0..8),
    )
        .prop_map(|(cist, name, revision, digest, (cost, bridge_id, hops), mstis)| {
            let mut config_id = MstConfigId::default();
            config_id.set_name(&name).unwrap();
            config_id.revision = revision;
            config_id.digest = digest;
            MstBpdu {
                cist,
                config_id,
                cist_internal_root_path_cost: cost,
                cist_bridge_id: bridge_id,
                cist_remaining_hops: hops,
                mstis,
            }
        })
}

/// An RST BPDU from a neighbour that claims to be the root.
fn neighbour_rst(priority: u16, flags: u8) -> Vec<u8> {
    let id = BridgeId::new(priority << 12, 0, mac(9));
    Bpdu::Rst(RstBpdu {
        flags: flags | BpduRole::Designated.to_flags(),
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

#[derive(Debug, Clone)]
enum Op {
    Enable(usize),
    Disable(usize),
    Tick,
    Garbage(usize, Vec<u8>),
    Neighbour(usize, u16, u8),
    BridgePriority(usize, u16),
    AdminEdge(usize, bool),
}

const PORTS: usize = 3;
const TREES: usize = 2;

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..PORTS).prop_map(Op::Enable),
        (0..PORTS).prop_map(Op::Disable),
        Just(Op::Tick),
        Just(Op::Tick),
        ((0..PORTS), proptest::collection::vec(any::<u8>(), 0..120))
            .prop_map(|(port, bytes)| Op::Garbage(port, bytes)),
        ((0..PORTS), 0u16..16, any::<u8>())
            .prop_map(|(port, prio, flags)| Op::Neighbour(port, prio, flags)),
        ((0..TREES), 0u16..16).prop_map(|(tree, prio)| Op::BridgePriority(tree, prio)),
        ((0..PORTS), any::<bool>()).prop_map(|(port, edge)| Op::AdminEdge(port, edge)),
    ]
}

fn check_invariants(bridge: &mut Bridge<Recorder>, time: u32) {
    assert!(!bridge.evaluate(time));
    for tree in 0..TREES {
        let mut roots = 0;
        for port in 0..PORTS {
            let role = bridge.port_role(port, tree).unwrap();
            let forwarding = bridge.port_forwarding(port, tree).unwrap();
            if forwarding {
                assert!(bridge.port_learning(port, tree).unwrap());
            }
            if !bridge.port_enabled(port).unwrap() {
                assert_eq!(role, PortRole::Disabled);
                assert!(!forwarding);
            }
            if role == PortRole::Root {
                roots += 1;
            }
            assert_eq!(bridge.callbacks().is_forwarding(port, tree), forwarding);
        }
        assert!(roots <= 1);
        assert_eq!(bridge.root_port(tree).unwrap().is_some(), roots == 1);
    }
}

proptest! {
    #[test]
    fn decode_never_panics(bytes in proptest::collection::vec(any::<u8>(), 0..200)) {
        let _ = Bpdu::decode(&bytes);
        let _ = BpduMessageGroup::group_parse(Cursor::new(&bytes[..]));
    }

    #[test]
    fn rst_bpdu_survives_encoding(rst in rst_bpdu()) {
        let bytes = Bpdu::Rst(rst).encode();
        prop_assert_eq!(bytes.len(), RST_BPDU_HEADER_LEN);
        prop_assert_eq!(Bpdu::decode(&bytes).unwrap(), Bpdu::Rst(rst));
    }

    #[test]
    fn config_bpdu_survives_encoding(config in config_bpdu()) {
        let bytes = Bpdu::Config(config).encode();
        prop_assert_eq!(Bpdu::decode(&bytes).unwrap(), Bpdu::Config(config));
    }

    #[test]
    fn mst_bpdu_survives_encoding(mst in mst_bpdu()) {
        let bpdu = Bpdu::Mst(mst);
        let bytes = bpdu.encode();
        prop_assert_eq!(bytes.len(), bpdu.encoded_len());
        prop_assert_eq!(Bpdu::decode(&bytes).unwrap(), bpdu);
    }

    #[test]
    fn priority_vectors_are_totally_ordered(a in priority_vector(), b in priority_vector()) {
        prop_assert!(a.is_better_or_same(&b) || b.is_better_or_same(&a));
        if a.is_better_or_same(&b) && b.is_better_or_same(&a) {
            prop_assert_eq!(a.cmp_designated(&b), core::cmp::Ordering::Equal);
        }
        if a.cmp_designated(&b) == core::cmp::Ordering::Less {
            prop_assert!(a.is_superior_to(&b));
        }
    }

    #[test]
    fn priority_vector_order_is_transitive(
        a in priority_vector(),
        b in priority_vector(),
        c in priority_vector(),
    ) {
        let mut sorted = [a, b, c];
        sorted.sort_by(|x, y| x.cmp_designated(y));
        let [low, mid, high] = sorted;
        prop_assert!(low.is_better_or_same(&mid));
        prop_assert!(mid.is_better_or_same(&high));
        prop_assert!(low.is_better_or_same(&high));
        if low.cmp_designated(&mid) == core::cmp::Ordering::Less {
            prop_assert!(!high.is_better_or_same(&low));
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn bridge_keeps_its_invariants(ops in proptest::collection::vec(op(), 1..40)) {
        init_tracing();
        let mut bridge =
            Bridge::new(PORTS, TREES - 1, mac(1), BridgeConfig::default(), Recorder::default())
                .unwrap();
        bridge.start(0).unwrap();
        let mut time = 0;

        for op in ops {
            match op {
                Op::Enable(port) => bridge.enable_port(port, 100, true, time).unwrap(),
                Op::Disable(port) => bridge.disable_port(port, time).unwrap(),
                Op::Tick => {
                    time += 1;
                    bridge.one_second_tick(time);
                }
                Op::Garbage(port, bytes) => bridge.receive_bpdu(port, &bytes, time).unwrap(),
                Op::Neighbour(port, prio, flags) => {
                    bridge.receive_bpdu(port, &neighbour_rst(prio, flags), time).unwrap()
                }
                Op::BridgePriority(tree, prio) => {
                    bridge.set_bridge_priority(tree, prio << 12, time).unwrap()
                }
                Op::AdminEdge(port, edge) => bridge.set_port_admin_edge(port, edge, time).unwrap(),
            }
            check_invariants(&mut bridge, time);
            bridge.callbacks_mut().take_sent();
        }
    }
}

/// Four bridges, every pair joined by one link.
const MESH_LINKS: [((usize, usize), (usize, usize)); 6] = [
    ((0, 0), (1, 0)),
    ((0, 1), (2, 0)),
    ((0, 2), (3, 0)),
    ((1, 1), (2, 1)),
    ((1, 2), (3, 1)),
    ((2, 2), (3, 2)),
];

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn mesh_settles_on_a_spanning_tree(priorities in proptest::collection::vec(0u16..16, 4)) {
        init_tracing();
        let mut net = Network::new();
        for (i, prio) in priorities.iter().enumerate() {
            let config = BridgeConfig {
                bridge_priority: prio << 12,
                ..Default::default()
            };
            net.add_bridge(i as u8 + 1, 3, 0, config);
        }
        for (a, b) in MESH_LINKS {
            net.connect(a, b);
        }
        net.run(60);

        let root = (0..4)
            .min_by_key(|&i| net.bridge(i).bridge_id(CIST).unwrap())
            .unwrap();
        let root_id = net.bridge(root).bridge_id(CIST).unwrap();
        for i in 0..4 {
            prop_assert_eq!(net.bridge(i).root_priority(CIST).unwrap().root_id, root_id);
            prop_assert_eq!(net.bridge(i).root_port(CIST).unwrap().is_none(), i == root);
        }

        // Exactly three links carry traffic and they reach every bridge.
        let active: Vec<_> = MESH_LINKS
            .iter()
            .filter(|(a, b)| net.forwarding(*a, CIST) && net.forwarding(*b, CIST))
            .collect();
        prop_assert_eq!(active.len(), 3);
        let mut reached = vec![root];
        while let Some((a, b)) = active.iter().find(|(a, b)| {
            reached.contains(&a.0) != reached.contains(&b.0)
        }) {
            reached.push(if reached.contains(&a.0) { b.0 } else { a.0 });
        }
        prop_assert_eq!(reached.len(), 4);

        // Links that do not carry traffic are blocked at one end only.
        for (a, b) in MESH_LINKS.iter().filter(|link| !active.contains(link)) {
            prop_assert!(net.forwarding(*a, CIST) != net.forwarding(*b, CIST));
        }
    }
}
