//! Procedures and derived variables shared by the state machines
//! (802.1Q-2011 §13.26 and §13.27).

use crate::bpdu::{flags, Bpdu, BpduRole, ConfigBpdu, MstBpdu, MstiConfig, RstBpdu};
use crate::bridge::{BridgeData, InfoIs, PortRole, RcvdInfo, CIST};
use crate::callbacks::{FlushFdbType, StpCallbacks};
use crate::vector::{add_path_cost, BridgeId, PortId, PriorityVector, Times};

// ---------------------------------------------------------------------------
// Derived timer parameters
// ---------------------------------------------------------------------------

/// HelloTime: the hello time of the CIST port times, never zero.
pub(crate) fn hello_time(data: &BridgeData, port: usize) -> u16 {
    data.port_tree(port, CIST).port_times.hello_time.max(1)
}

/// FwdDelay: the forward delay of the CIST designated times.
pub(crate) fn fwd_delay(data: &BridgeData, port: usize) -> u16 {
    data.port_tree(port, CIST).designated_times.forward_delay
}

/// MaxAge: the max age of the CIST designated times.
pub(crate) fn max_age(data: &BridgeData, port: usize) -> u16 {
    data.port_tree(port, CIST).designated_times.max_age
}

/// forwardDelay: how long a port spends discarding and learning.
pub(crate) fn forward_delay(data: &BridgeData, port: usize) -> u16 {
    if data.ports[port].send_rstp {
        hello_time(data, port)
    } else {
        fwd_delay(data, port)
    }
}

/// EdgeDelay: how long a port waits for a BPDU before it may become an
/// edge port.
pub(crate) fn edge_delay(data: &BridgeData, port: usize) -> u16 {
    if data.ports[port].oper_p2p {
        data.config.migrate_time
    } else {
        max_age(data, port)
    }
}

// ---------------------------------------------------------------------------
// Derived conditions
// ---------------------------------------------------------------------------

/// allSynced for `port` on `tree`.
pub(crate) fn all_synced(data: &BridgeData, port: usize, tree: usize) -> bool {
    let ready = data.ports.iter().all(|p| {
        let pt = &p.trees[tree];
        pt.selected && pt.role == pt.selected_role && !pt.updt_info
    });
    if !ready {
        return false;
    }

    let role = data.port_tree(port, tree).role;
    match role {
        PortRole::Root | PortRole::Alternate | PortRole::Master => data
            .ports
            .iter()
            .enumerate()
            .filter(|&(index, _)| index != port)
            .all(|(_, p)| p.trees[tree].synced),
        PortRole::Designated => data
            .ports
            .iter()
            .enumerate()
            .filter(|&(index, p)| index != port && p.trees[tree].role != PortRole::Root)
            .all(|(_, p)| p.trees[tree].synced),
        _ => false,
    }
}

/// reRooted: every other port's recent root timer has expired.
pub(crate) fn re_rooted(data: &BridgeData, port: usize, tree: usize) -> bool {
    data.ports
        .iter()
        .enumerate()
        .filter(|&(index, _)| index != port)
        .all(|(_, p)| p.trees[tree].timers.rr_while.is_expired())
}

/// allTransmitReady: every tree of the port has settled its role.
pub(crate) fn all_transmit_ready(data: &BridgeData, port: usize) -> bool {
    data.ports[port]
        .trees
        .iter()
        .all(|pt| pt.selected && !pt.updt_info)
}

pub(crate) fn rcvd_any_msg(data: &BridgeData, port: usize) -> bool {
    data.ports[port].trees.iter().any(|pt| pt.rcvd_msg)
}

/// rcvdXstMsg: a message for this tree is waiting. MSTI messages wait until
/// the CIST message of the same BPDU has been handled.
pub(crate) fn rcvd_xst_msg(data: &BridgeData, port: usize, tree: usize) -> bool {
    if tree == CIST {
        data.port_tree(port, CIST).rcvd_msg
    } else {
        !data.port_tree(port, CIST).rcvd_msg && data.port_tree(port, tree).rcvd_msg
    }
}

/// updtXstInfo: new information is to be recorded for this tree.
pub(crate) fn updt_xst_info(data: &BridgeData, port: usize, tree: usize) -> bool {
    if tree == CIST {
        data.port_tree(port, CIST).updt_info
    } else {
        data.port_tree(port, tree).updt_info || data.port_tree(port, CIST).updt_info
    }
}

pub(crate) fn cist_root_port(data: &BridgeData, port: usize) -> bool {
    data.port_tree(port, CIST).role == PortRole::Root
}

pub(crate) fn cist_designated_port(data: &BridgeData, port: usize) -> bool {
    data.port_tree(port, CIST).role == PortRole::Designated
}

/// mstiDesignatedOrTCpropagatingRootPort
pub(crate) fn msti_designated_or_tc_propagating_root_port(data: &BridgeData, port: usize) -> bool {
    data.ports[port].trees.iter().skip(1).any(|pt| {
        pt.role == PortRole::Designated
            || (pt.role == PortRole::Root && !pt.timers.tc_while.is_expired())
    })
}

/// mstiMasterPort
pub(crate) fn msti_master_port(data: &BridgeData, port: usize) -> bool {
    data.ports[port]
        .trees
        .iter()
        .skip(1)
        .any(|pt| pt.role == PortRole::Master)
}

/// Set newInfo for the CIST or newInfoMsti for an MSTI.
pub(crate) fn set_new_info_xst(data: &mut BridgeData, port: usize, tree: usize) {
    if tree == CIST {
        data.ports[port].new_info = true;
    } else {
        data.ports[port].new_info_msti = true;
    }
}

// ---------------------------------------------------------------------------
// Tree wide procedures
// ---------------------------------------------------------------------------

pub(crate) fn set_sync_tree(data: &mut BridgeData, tree: usize) {
    for p in data.ports.iter_mut() {
        p.trees[tree].sync = true;
    }
}

pub(crate) fn set_re_root_tree(data: &mut BridgeData, tree: usize) {
    for p in data.ports.iter_mut() {
        p.trees[tree].re_root = true;
    }
}

/// Ask every other port of the tree to propagate a topology change.
pub(crate) fn set_tc_prop_tree(data: &mut BridgeData, port: usize, tree: usize) {
    for (index, p) in data.ports.iter_mut().enumerate() {
        if index != port {
            p.trees[tree].tc_prop = true;
        }
    }
}

/// newTcWhile
pub(crate) fn new_tc_while(data: &mut BridgeData, port: usize, tree: usize) {
    if !data.port_tree(port, tree).timers.tc_while.is_expired() {
        return;
    }
    if data.ports[port].send_rstp {
        let value = hello_time(data, port) + 1;
        data.port_tree_mut(port, tree).timers.tc_while.set(value);
        set_new_info_xst(data, port, tree);
    } else {
        let times = data.trees[CIST].root_times;
        data.port_tree_mut(port, tree)
            .timers
            .tc_while
            .set(times.max_age + times.forward_delay);
    }
}

/// Flush the filtering database entries learned on `port` for `tree` and
/// clear fdbFlush.
pub(crate) fn flush_fdb(
    data: &mut BridgeData,
    callbacks: &mut dyn StpCallbacks,
    port: usize,
    tree: usize,
    timestamp: u32,
) {
    let flush_type = if data.rstp_version() {
        FlushFdbType::Immediate
    } else {
        FlushFdbType::RapidAgeing
    };
    callbacks.flush_fdb(port, tree, flush_type, timestamp);
    data.port_tree_mut(port, tree).fdb_flush = false;
}

// ---------------------------------------------------------------------------
// Receive side
// ---------------------------------------------------------------------------

/// updtBPDUVersion
pub(crate) fn updt_bpdu_version(data: &mut BridgeData, port: usize) {
    let p = &mut data.ports[port];
    match p.rx_bpdu {
        Some(ref bpdu) if bpdu.is_stp() => p.rcvd_stp = true,
        Some(_) => p.rcvd_rstp = true,
        None => {}
    }
}

/// fromSameRegion: the BPDU is an MST BPDU carrying our MST configuration
/// identifier, and we run MSTP.
pub(crate) fn from_same_region(data: &BridgeData, port: usize) -> bool {
    if !data.config.force_version.is_mstp() {
        return false;
    }
    match data.ports[port].rx_bpdu {
        Some(Bpdu::Mst(ref mst)) => mst.config_id == data.mst_config_id,
        _ => false,
    }
}

/// setRcvdMsgs
pub(crate) fn set_rcvd_msgs(data: &mut BridgeData, port: usize) {
    let msti_count = data.trees.len() - 1;
    let p = &mut data.ports[port];
    p.trees[CIST].rcvd_msg = true;

    match p.rx_bpdu {
        Some(Bpdu::Tcn) => {
            p.rcvd_tcn = true;
            for pt in p.trees.iter_mut().skip(1) {
                pt.rcvd_tc = true;
            }
        }
        Some(Bpdu::Mst(ref mst)) if p.rcvd_internal => {
            for msti in mst.mstis.iter() {
                let mstid = msti.mstid() as usize;
                if (1..=msti_count).contains(&mstid) {
                    p.trees[mstid].rcvd_msg = true;
                }
            }
        }
        _ => {}
    }
}

pub(crate) fn clear_all_rcvd_msgs(data: &mut BridgeData, port: usize) {
    for pt in data.ports[port].trees.iter_mut() {
        pt.rcvd_msg = false;
    }
}

/// The CIST message of the BPDU being processed.
fn cist_message(data: &BridgeData, port: usize) -> Option<(PriorityVector, Times, BpduRole)> {
    let p = &data.ports[port];
    let bpdu = p.rx_bpdu.as_ref()?;
    let role = bpdu.cist_role()?;
    let bridge_port_id = p.trees[CIST].port_id;

    let (root_id, cost, bridge_id, port_id) = match bpdu {
        Bpdu::Config(c) => (c.root_id, c.root_path_cost, c.bridge_id, c.port_id),
        Bpdu::Rst(r) => (r.root_id, r.root_path_cost, r.bridge_id, r.port_id),
        Bpdu::Mst(m) => (m.cist.root_id, m.cist.root_path_cost, m.cist.bridge_id, m.cist.port_id),
        Bpdu::Tcn => return None,
    };

    let mut priority = PriorityVector {
        root_id,
        external_root_path_cost: cost,
        regional_root_id: bridge_id,
        internal_root_path_cost: 0,
        designated_bridge_id: bridge_id,
        designated_port_id: port_id,
        bridge_port_id,
    };
    let mut times = bpdu.cist_times(data.config.max_hops)?;

    match bpdu {
        Bpdu::Mst(m) if p.rcvd_internal => {
            priority.internal_root_path_cost = m.cist_internal_root_path_cost;
            priority.designated_bridge_id = m.cist_bridge_id;
        }
        _ => times.remaining_hops = data.config.max_hops,
    }
    Some((priority, times, role))
}

/// The message for MSTI `tree` of the BPDU being processed. MSTI messages
/// are only looked at when they come from inside the region.
fn msti_message(
    data: &BridgeData,
    port: usize,
    tree: usize,
) -> Option<(PriorityVector, Times, BpduRole)> {
    let p = &data.ports[port];
    let mst = match p.rx_bpdu {
        Some(Bpdu::Mst(ref mst)) if p.rcvd_internal => mst,
        _ => return None,
    };
    let msti = mst.msti(tree as u16)?;

    let designated_bridge_id = BridgeId::new(
        (msti.bridge_priority as u16 & 0xf0) << 8,
        tree as u16,
        mst.cist_bridge_id.mac_addr(),
    );
    let designated_port_id =
        PortId(((msti.port_priority as u16 & 0xf0) << 8) | mst.cist.port_id.number());

    let priority = PriorityVector {
        root_id: BridgeId::default(),
        external_root_path_cost: 0,
        regional_root_id: msti.regional_root_id,
        internal_root_path_cost: msti.internal_root_path_cost,
        designated_bridge_id,
        designated_port_id,
        bridge_port_id: p.trees[tree].port_id,
    };
    let times = Times {
        message_age: mst.cist.message_age,
        max_age: mst.cist.max_age,
        forward_delay: mst.cist.forward_delay,
        hello_time: mst.cist.hello_time,
        remaining_hops: msti.remaining_hops,
    };
    Some((priority, times, BpduRole::from_flags(msti.flags)))
}

/// The flags of the message for `tree` of the BPDU being processed.
fn message_flags(data: &BridgeData, port: usize, tree: usize) -> u8 {
    match data.ports[port].rx_bpdu {
        Some(ref bpdu) if tree == CIST => bpdu.cist_flags(),
        Some(Bpdu::Mst(ref mst)) => mst.msti(tree as u16).map_or(0, |m| m.flags),
        _ => 0,
    }
}

/// The role carried by the message for `tree`, if it carries one.
fn message_role(data: &BridgeData, port: usize, tree: usize) -> Option<BpduRole> {
    if tree == CIST {
        data.ports[port].rx_bpdu.as_ref()?.cist_role()
    } else {
        msti_message(data, port, tree).map(|(_, _, role)| role)
    }
}

/// rcvInfo: record the message priority and times and classify the
/// message against the port's current information.
pub(crate) fn rcv_info(data: &mut BridgeData, port: usize, tree: usize) -> RcvdInfo {
    let message = if tree == CIST {
        cist_message(data, port)
    } else {
        msti_message(data, port, tree)
    };
    let Some((msg_priority, msg_times, role)) = message else {
        return RcvdInfo::Other;
    };

    let pt = data.port_tree_mut(port, tree);
    pt.msg_priority = msg_priority;
    pt.msg_times = msg_times;

    match role {
        BpduRole::Designated => {
            let same_vector = msg_priority.cmp_designated(&pt.port_priority).is_eq();
            if msg_priority.is_superior_to(&pt.port_priority)
                || (same_vector && msg_times != pt.port_times)
            {
                RcvdInfo::SuperiorDesignated
            } else if same_vector && msg_times == pt.port_times && pt.info_is == InfoIs::Received {
                RcvdInfo::RepeatedDesignated
            } else {
                RcvdInfo::InferiorDesignated
            }
        }
        BpduRole::Root | BpduRole::AlternateOrBackup
            if msg_priority.cmp_designated(&pt.designated_priority).is_ge() =>
        {
            RcvdInfo::InferiorRootAlternate
        }
        _ => RcvdInfo::Other,
    }
}

/// recordProposal
pub(crate) fn record_proposal(data: &mut BridgeData, port: usize, tree: usize) {
    let proposal = message_role(data, port, tree) == Some(BpduRole::Designated)
        && message_flags(data, port, tree) & flags::PROPOSAL != 0;
    if !proposal {
        return;
    }

    let p = &mut data.ports[port];
    p.trees[tree].proposed = true;
    if tree == CIST && !p.rcvd_internal {
        for pt in p.trees.iter_mut().skip(1) {
            pt.proposed = true;
        }
    }
}

/// recordAgreement
pub(crate) fn record_agreement(data: &mut BridgeData, port: usize, tree: usize) {
    let agreement = message_flags(data, port, tree) & flags::AGREEMENT != 0;

    if tree == CIST {
        let rstp = data.rstp_version();
        let p = &mut data.ports[port];
        let agreed = rstp && p.oper_p2p && agreement;
        let cist = &mut p.trees[CIST];
        cist.agreed = agreed;
        if agreed {
            cist.proposing = false;
        }
        if !p.rcvd_internal {
            let proposing = p.trees[CIST].proposing;
            for pt in p.trees.iter_mut().skip(1) {
                pt.agreed = agreed;
                pt.proposing = proposing;
            }
        }
        return;
    }

    // An MSTI agreement only counts when the CIST message agrees with the
    // CIST information already recorded for the port.
    let same_cist_root = cist_message(data, port).is_some_and(|(msg, _, _)| {
        let recorded = &data.port_tree(port, CIST).port_priority;
        msg.root_id == recorded.root_id
            && msg.external_root_path_cost == recorded.external_root_path_cost
            && msg.regional_root_id == recorded.regional_root_id
    });
    let p = &mut data.ports[port];
    let agreed = p.oper_p2p && same_cist_root && agreement;
    let pt = &mut p.trees[tree];
    pt.agreed = agreed;
    if agreed {
        pt.proposing = false;
    }
}

/// recordDispute
pub(crate) fn record_dispute(data: &mut BridgeData, port: usize, tree: usize) {
    if message_flags(data, port, tree) & flags::LEARNING == 0 {
        return;
    }
    let p = &mut data.ports[port];
    let external = tree == CIST && !p.rcvd_internal;
    for (index, pt) in p.trees.iter_mut().enumerate() {
        if index == tree || (external && index != CIST) {
            pt.disputed = true;
            pt.agreed = false;
        }
    }
}

/// recordMastered
pub(crate) fn record_mastered(data: &mut BridgeData, port: usize, tree: usize) {
    if tree == CIST {
        let p = &mut data.ports[port];
        if !p.rcvd_internal {
            for pt in p.trees.iter_mut().skip(1) {
                pt.mastered = false;
            }
        }
        return;
    }
    let master = message_flags(data, port, tree) & flags::MASTER != 0;
    let p = &mut data.ports[port];
    p.trees[tree].mastered = p.oper_p2p && master;
}

/// recordPriority
pub(crate) fn record_priority(data: &mut BridgeData, port: usize, tree: usize) {
    let pt = data.port_tree_mut(port, tree);
    pt.port_priority = pt.msg_priority;
}

/// recordTimes
pub(crate) fn record_times(data: &mut BridgeData, port: usize, tree: usize) {
    let pt = data.port_tree_mut(port, tree);
    pt.port_times = Times {
        hello_time: pt.msg_times.hello_time.max(1),
        ..pt.msg_times
    };
}

/// setTcFlags
pub(crate) fn set_tc_flags(data: &mut BridgeData, port: usize, tree: usize) {
    let msg_flags = message_flags(data, port, tree);
    let p = &mut data.ports[port];

    if tree == CIST {
        if msg_flags & flags::TCA != 0 {
            p.rcvd_tc_ack = true;
        }
        if msg_flags & flags::TC != 0 {
            p.trees[CIST].rcvd_tc = true;
            if !p.rcvd_internal {
                for pt in p.trees.iter_mut().skip(1) {
                    pt.rcvd_tc = true;
                }
            }
        }
    } else if msg_flags & flags::TC != 0 {
        p.trees[tree].rcvd_tc = true;
    }
}

/// updtRcvdInfoWhile: how long received information stays valid.
pub(crate) fn updt_rcvd_info_while(data: &mut BridgeData, port: usize, tree: usize) {
    let hello = hello_time(data, port);
    let internal = tree != CIST || data.ports[port].rcvd_internal;
    let times = data.port_tree(port, tree).port_times;

    let valid = if internal {
        times.remaining_hops > 1
    } else {
        times.message_age < times.max_age
    };
    let value = if valid { 3 * hello } else { 0 };
    data.port_tree_mut(port, tree).timers.rcvd_info_while.set(value);
}

/// betterorsameInfo
pub(crate) fn better_or_same_info(data: &BridgeData, port: usize, tree: usize, new_info_is: InfoIs) -> bool {
    let pt = data.port_tree(port, tree);
    match new_info_is {
        InfoIs::Received => {
            pt.info_is == InfoIs::Received && pt.msg_priority.is_better_or_same(&pt.port_priority)
        }
        InfoIs::Mine => {
            pt.info_is == InfoIs::Mine && pt.designated_priority.is_better_or_same(&pt.port_priority)
        }
        _ => false,
    }
}

// ---------------------------------------------------------------------------
// Role selection
// ---------------------------------------------------------------------------

pub(crate) fn clear_reselect_tree(data: &mut BridgeData, tree: usize) {
    for p in data.ports.iter_mut() {
        p.trees[tree].reselect = false;
    }
}

pub(crate) fn set_selected_tree(data: &mut BridgeData, tree: usize) {
    if data.ports.iter().any(|p| p.trees[tree].reselect) {
        return;
    }
    for p in data.ports.iter_mut() {
        p.trees[tree].selected = true;
    }
}

pub(crate) fn updt_roles_disabled_tree(data: &mut BridgeData, tree: usize) {
    for p in data.ports.iter_mut() {
        let pt = &mut p.trees[tree];
        pt.selected_role = PortRole::Disabled;
        pt.updt_info = false;
    }
}

/// updtRolesTree: compute the root priority vector, root port and root
/// times of the tree, then the designated information and selected role of
/// every port.
pub(crate) fn updt_roles_tree(data: &mut BridgeData, tree: usize) {
    let is_cist = tree == CIST;
    let mac = data.mac;
    let bridge_times = data.bridge_times();
    let cist_bridge_id = data.trees[CIST].bridge_id;
    let tree_bridge_id = data.trees[tree].bridge_id;

    let mut root_priority = data.trees[tree].bridge_priority();
    let mut root_port = None;

    for (index, p) in data.ports.iter().enumerate() {
        let pt = &p.trees[tree];
        if pt.info_is != InfoIs::Received {
            continue;
        }
        if !is_cist && !p.info_internal {
            continue;
        }
        // Information sent by this bridge never makes a root path.
        if pt.port_priority.designated_bridge_id.mac_addr() == mac {
            continue;
        }

        let recorded = pt.port_priority;
        let root_path = if is_cist && !p.info_internal {
            PriorityVector {
                external_root_path_cost: add_path_cost(
                    recorded.external_root_path_cost,
                    p.external_path_cost,
                ),
                regional_root_id: cist_bridge_id,
                internal_root_path_cost: 0,
                bridge_port_id: pt.port_id,
                ..recorded
            }
        } else {
            PriorityVector {
                internal_root_path_cost: add_path_cost(
                    recorded.internal_root_path_cost,
                    pt.internal_path_cost,
                ),
                bridge_port_id: pt.port_id,
                ..recorded
            }
        };

        if root_path < root_priority {
            root_priority = root_path;
            root_port = Some(index);
        }
    }

    let root_times = match root_port {
        None => bridge_times,
        Some(index) => {
            let p = &data.ports[index];
            let mut times = p.trees[tree].port_times;
            if is_cist && !p.info_internal {
                times.message_age = times.message_age.saturating_add(1);
                times.remaining_hops = data.config.max_hops;
            } else {
                times.remaining_hops = times.remaining_hops.saturating_sub(1);
            }
            times
        }
    };

    let t = &mut data.trees[tree];
    t.root_priority = root_priority;
    t.root_port_id = match root_port {
        Some(_) => root_priority.bridge_port_id,
        None => PortId::default(),
    };
    t.root_times = root_times;

    for (index, p) in data.ports.iter_mut().enumerate() {
        let info_internal = p.info_internal;
        let cist_info_is = p.trees[CIST].info_is;
        let cist_role = p.trees[CIST].selected_role;
        let pt = &mut p.trees[tree];

        pt.designated_priority = PriorityVector {
            designated_bridge_id: tree_bridge_id,
            designated_port_id: pt.port_id,
            bridge_port_id: pt.port_id,
            ..root_priority
        };
        pt.designated_times = Times {
            hello_time: bridge_times.hello_time,
            ..root_times
        };
        let differs =
            pt.port_priority != pt.designated_priority || pt.port_times != pt.designated_times;

        let boundary_role = if !is_cist && cist_info_is == InfoIs::Received && !info_internal {
            match cist_role {
                PortRole::Root => Some(PortRole::Master),
                PortRole::Alternate => Some(PortRole::Alternate),
                _ => None,
            }
        } else {
            None
        };

        let (role, updt_info) = match (pt.info_is, boundary_role) {
            (InfoIs::Disabled, _) => (PortRole::Disabled, false),
            (_, Some(role)) => (role, differs),
            (InfoIs::Mine, None) => (PortRole::Designated, differs),
            (InfoIs::Received, None) if root_port == Some(index) => (PortRole::Root, false),
            (InfoIs::Received, None)
                if pt
                    .designated_priority
                    .cmp_designated(&pt.port_priority)
                    .is_ge() =>
            {
                if pt.port_priority.designated_bridge_id.mac_addr() == mac {
                    (PortRole::Backup, false)
                } else {
                    (PortRole::Alternate, false)
                }
            }
            (InfoIs::Received, None) | (InfoIs::Aged, None) => (PortRole::Designated, true),
        };
        pt.selected_role = role;
        pt.updt_info = updt_info;
    }
}

// ---------------------------------------------------------------------------
// Transmit side
// ---------------------------------------------------------------------------

/// The master flag of the MSTI message for `tree`.
fn msti_master_flag(data: &BridgeData, port: usize, tree: usize) -> bool {
    let role = data.port_tree(port, tree).role;
    if role != PortRole::Root && role != PortRole::Designated {
        return false;
    }
    data.ports.iter().any(|p| {
        let pt = &p.trees[tree];
        pt.role == PortRole::Master
            || (pt.mastered && matches!(pt.role, PortRole::Root | PortRole::Designated))
    })
}

fn tree_flags(data: &BridgeData, port: usize, tree: usize) -> u8 {
    let pt = data.port_tree(port, tree);
    let mut value = pt.role.to_bpdu_role().to_flags();
    if !pt.timers.tc_while.is_expired() {
        value |= flags::TC;
    }
    if pt.proposing {
        value |= flags::PROPOSAL;
    }
    if pt.learning {
        value |= flags::LEARNING;
    }
    if pt.forwarding {
        value |= flags::FORWARDING;
    }
    if pt.agree {
        value |= flags::AGREEMENT;
    }
    value
}

fn send(callbacks: &mut dyn StpCallbacks, port: usize, bpdu: &Bpdu, timestamp: u32) {
    tracing::trace!(port, ?bpdu, "bpdu transmitted");
    callbacks.transmit(port, &bpdu.encode(), timestamp);
}

/// txConfig
pub(crate) fn tx_config(
    data: &BridgeData,
    callbacks: &mut dyn StpCallbacks,
    port: usize,
    timestamp: u32,
) {
    let p = &data.ports[port];
    let pt = &p.trees[CIST];
    let priority = pt.designated_priority;
    let times = pt.designated_times;

    let mut value = 0;
    if !pt.timers.tc_while.is_expired() {
        value |= flags::TC;
    }
    if p.tc_ack {
        value |= flags::TCA;
    }

    let bpdu = Bpdu::Config(ConfigBpdu {
        flags: value,
        root_id: priority.root_id,
        root_path_cost: priority.external_root_path_cost,
        bridge_id: priority.regional_root_id,
        port_id: priority.designated_port_id,
        message_age: times.message_age,
        max_age: times.max_age,
        hello_time: pt.port_times.hello_time.max(1),
        forward_delay: times.forward_delay,
    });
    send(callbacks, port, &bpdu, timestamp);
}

/// txTcn
pub(crate) fn tx_tcn(callbacks: &mut dyn StpCallbacks, port: usize, timestamp: u32) {
    send(callbacks, port, &Bpdu::Tcn, timestamp);
}

/// txRstp: an RST BPDU, or an MST BPDU when the bridge runs MSTP.
pub(crate) fn tx_rstp(
    data: &BridgeData,
    callbacks: &mut dyn StpCallbacks,
    port: usize,
    timestamp: u32,
) {
    let p = &data.ports[port];
    let cist = &p.trees[CIST];
    let priority = cist.designated_priority;
    let times = cist.designated_times;

    let rst = RstBpdu {
        flags: tree_flags(data, port, CIST),
        root_id: priority.root_id,
        root_path_cost: priority.external_root_path_cost,
        bridge_id: priority.regional_root_id,
        port_id: priority.designated_port_id,
        message_age: times.message_age,
        max_age: times.max_age,
        hello_time: cist.port_times.hello_time.max(1),
        forward_delay: times.forward_delay,
    };

    if !data.config.force_version.is_mstp() {
        send(callbacks, port, &Bpdu::Rst(rst), timestamp);
        return;
    }

    let mstis = (1..data.trees.len())
        .map(|tree| {
            let pt = &p.trees[tree];
            let mut value = tree_flags(data, port, tree);
            if msti_master_flag(data, port, tree) {
                value |= flags::MASTER;
            }
            MstiConfig {
                flags: value,
                regional_root_id: pt.designated_priority.regional_root_id,
                internal_root_path_cost: pt.designated_priority.internal_root_path_cost,
                bridge_priority: (data.trees[tree].bridge_id.priority() >> 8) as u8 & 0xf0,
                port_priority: pt.port_id.priority(),
                remaining_hops: pt.designated_times.remaining_hops,
            }
        })
        .collect();

    let bpdu = Bpdu::Mst(MstBpdu {
        cist: rst,
        config_id: data.mst_config_id,
        cist_internal_root_path_cost: priority.internal_root_path_cost,
        cist_bridge_id: priority.designated_bridge_id,
        cist_remaining_hops: times.remaining_hops,
        mstis,
    });
    send(callbacks, port, &bpdu, timestamp);
}
