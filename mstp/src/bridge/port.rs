use crate::bpdu::{Bpdu, BpduRole};
use crate::config::{AdminP2P, BridgeConfig};
use crate::sm::{
    bridge_detection, port_information, port_protocol_migration, port_receive,
    port_role_transitions, port_state_transition, port_transmit, topology_change,
};
use crate::timer::{PortTimers, PortTreeTimers};
use crate::vector::{PortId, PriorityVector, Times};

/// Largest path cost a port may be assigned.
pub(crate) const MAX_PATH_COST: u32 = 200_000_000;

/// The path cost 802.1Q recommends for a link speed (Table 13-4).
pub(crate) fn default_path_cost(speed_mbps: u32) -> u32 {
    if speed_mbps == 0 {
        return MAX_PATH_COST;
    }
    (20_000_000 / speed_mbps).clamp(1, MAX_PATH_COST)
}

/// The role of a port in the active topology of one tree.
#[derive(Debug, Hash, PartialEq, Eq, Clone, Copy, Default)]
pub enum PortRole {
    /// The port is disabled or not part of the tree.
    #[default]
    Disabled,
    /// The port towards the root.
    Root,
    /// The port serving the attached LAN.
    Designated,
    /// A blocked alternate path to the root.
    Alternate,
    /// A blocked backup for a designated port of this bridge on the same
    /// LAN.
    Backup,
    /// The port connecting an MSTI to the CIST root outside the region.
    Master,
}

impl PortRole {
    pub(crate) fn to_bpdu_role(self) -> BpduRole {
        match self {
            PortRole::Root => BpduRole::Root,
            PortRole::Designated => BpduRole::Designated,
            PortRole::Alternate | PortRole::Backup => BpduRole::AlternateOrBackup,
            PortRole::Master | PortRole::Disabled => BpduRole::MasterOrUnknown,
        }
    }
}

/// Where the port priority vector of a port came from (infoIs).
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub(crate) enum InfoIs {
    #[default]
    Disabled,
    Received,
    Mine,
    Aged,
}

/// Result of comparing a received message with the recorded information
/// (rcvdInfo).
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub(crate) enum RcvdInfo {
    SuperiorDesignated,
    RepeatedDesignated,
    InferiorDesignated,
    InferiorRootAlternate,
    #[default]
    Other,
}

/// Per port, per tree variables.
#[derive(Debug, Clone)]
pub(crate) struct PortTree {
    pub(crate) port_id: PortId,
    /// Administratively set internal path cost, 0 for the speed default.
    pub(crate) admin_internal_path_cost: u32,
    pub(crate) internal_path_cost: u32,

    pub(crate) role: PortRole,
    pub(crate) selected_role: PortRole,
    pub(crate) info_is: InfoIs,
    pub(crate) rcvd_info: RcvdInfo,

    pub(crate) port_priority: PriorityVector,
    pub(crate) port_times: Times,
    pub(crate) designated_priority: PriorityVector,
    pub(crate) designated_times: Times,
    pub(crate) msg_priority: PriorityVector,
    pub(crate) msg_times: Times,

    pub(crate) agree: bool,
    pub(crate) agreed: bool,
    pub(crate) disputed: bool,
    pub(crate) fdb_flush: bool,
    pub(crate) forward: bool,
    pub(crate) forwarding: bool,
    pub(crate) learn: bool,
    pub(crate) learning: bool,
    pub(crate) mastered: bool,
    pub(crate) proposed: bool,
    pub(crate) proposing: bool,
    pub(crate) rcvd_msg: bool,
    pub(crate) rcvd_tc: bool,
    pub(crate) re_root: bool,
    pub(crate) reselect: bool,
    pub(crate) selected: bool,
    pub(crate) sync: bool,
    pub(crate) synced: bool,
    pub(crate) tc_prop: bool,
    pub(crate) updt_info: bool,

    pub(crate) timers: PortTreeTimers,

    pub(crate) information: port_information::State,
    pub(crate) role_transitions: port_role_transitions::State,
    pub(crate) state_transition: port_state_transition::State,
    pub(crate) topology_change: topology_change::State,
}

impl PortTree {
    fn new(port_id: PortId, designated_times: Times) -> Self {
        Self {
            port_id,
            admin_internal_path_cost: 0,
            internal_path_cost: MAX_PATH_COST,
            role: PortRole::Disabled,
            selected_role: PortRole::Disabled,
            info_is: InfoIs::Disabled,
            rcvd_info: RcvdInfo::Other,
            port_priority: PriorityVector::default(),
            port_times: Times::default(),
            designated_priority: PriorityVector::default(),
            designated_times,
            msg_priority: PriorityVector::default(),
            msg_times: Times::default(),
            agree: false,
            agreed: false,
            disputed: false,
            fdb_flush: false,
            forward: false,
            forwarding: false,
            learn: false,
            learning: false,
            mastered: false,
            proposed: false,
            proposing: false,
            rcvd_msg: false,
            rcvd_tc: false,
            re_root: false,
            reselect: false,
            selected: false,
            sync: false,
            synced: false,
            tc_prop: false,
            updt_info: false,
            timers: PortTreeTimers::default(),
            information: port_information::State::Disabled,
            role_transitions: port_role_transitions::State::InitPort,
            state_transition: port_state_transition::State::Discarding,
            topology_change: topology_change::State::Inactive,
        }
    }
}

/// Per port variables, shared by all trees.
#[derive(Debug, Clone)]
pub(crate) struct Port {
    pub(crate) port_enabled: bool,
    pub(crate) admin_edge: bool,
    pub(crate) auto_edge: bool,
    pub(crate) oper_edge: bool,
    pub(crate) admin_p2p: AdminP2P,
    pub(crate) detected_p2p: bool,
    pub(crate) oper_p2p: bool,
    pub(crate) speed_mbps: u32,
    /// Administratively set external path cost, 0 for the speed default.
    pub(crate) admin_external_path_cost: u32,
    pub(crate) external_path_cost: u32,

    pub(crate) rcvd_bpdu: bool,
    pub(crate) rcvd_rstp: bool,
    pub(crate) rcvd_stp: bool,
    pub(crate) rcvd_tc_ack: bool,
    pub(crate) rcvd_tcn: bool,
    pub(crate) send_rstp: bool,
    pub(crate) tc_ack: bool,
    pub(crate) mcheck: bool,
    pub(crate) new_info: bool,
    pub(crate) new_info_msti: bool,
    pub(crate) info_internal: bool,
    pub(crate) rcvd_internal: bool,
    pub(crate) isolate: bool,
    pub(crate) enable_bpdu_rx: bool,
    pub(crate) enable_bpdu_tx: bool,
    pub(crate) tx_count: u32,

    pub(crate) timers: PortTimers,
    /// The BPDU being processed by the receive machine.
    pub(crate) rx_bpdu: Option<Bpdu>,

    pub(crate) receive: port_receive::State,
    pub(crate) migration: port_protocol_migration::State,
    pub(crate) detection: bridge_detection::State,
    pub(crate) transmit: port_transmit::State,

    pub(crate) trees: Vec<PortTree>,
}

impl Port {
    pub(crate) fn new(index: usize, tree_count: usize, config: &BridgeConfig, times: Times) -> Self {
        let port_id = PortId::new(config.port_priority, index as u16 + 1);
        Self {
            port_enabled: false,
            admin_edge: config.admin_edge,
            auto_edge: config.auto_edge,
            oper_edge: false,
            admin_p2p: AdminP2P::Auto,
            detected_p2p: false,
            oper_p2p: false,
            speed_mbps: 0,
            admin_external_path_cost: 0,
            external_path_cost: MAX_PATH_COST,
            rcvd_bpdu: false,
            rcvd_rstp: false,
            rcvd_stp: false,
            rcvd_tc_ack: false,
            rcvd_tcn: false,
            send_rstp: false,
            tc_ack: false,
            mcheck: false,
            new_info: false,
            new_info_msti: false,
            info_internal: false,
            rcvd_internal: false,
            isolate: false,
            enable_bpdu_rx: true,
            enable_bpdu_tx: true,
            tx_count: 0,
            timers: PortTimers::default(),
            rx_bpdu: None,
            receive: port_receive::State::Discard,
            migration: port_protocol_migration::State::CheckingRstp,
            detection: bridge_detection::State::NotEdge,
            transmit: port_transmit::State::TransmitInit,
            trees: (0..tree_count).map(|_| PortTree::new(port_id, times)).collect(),
        }
    }

    /// Recompute the operational path costs from the admin values and the
    /// link speed.
    pub(crate) fn update_path_costs(&mut self) {
        let speed_cost = default_path_cost(self.speed_mbps);
        self.external_path_cost = match self.admin_external_path_cost {
            0 => speed_cost,
            cost => cost,
        };
        for tree in self.trees.iter_mut() {
            tree.internal_path_cost = match tree.admin_internal_path_cost {
                0 => speed_cost,
                cost => cost,
            };
        }
    }

    pub(crate) fn update_oper_p2p(&mut self) {
        self.oper_p2p = self.admin_p2p.resolve(self.detected_p2p);
    }
}
