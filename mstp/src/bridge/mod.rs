//! The bridge: ports, trees and the entry points the host drives it with.

mod port;
mod tree;

pub use port::PortRole;
pub(crate) use port::{InfoIs, Port, PortTree, RcvdInfo, MAX_PATH_COST};
pub(crate) use tree::Tree;

use crate::bpdu::{Bpdu, MAX_MSTI_MSGS};
use crate::callbacks::StpCallbacks;
use crate::config::{AdminP2P, BridgeConfig, MstConfigId, MstConfigTable, StpVersion};
use crate::error::{BridgeError, Result};
use crate::sm;
use crate::vector::{BridgeId, EtherAddr, PortId, PriorityVector, Times, PRIORITY_VECTOR_LEN};

/// Index of the Common and Internal Spanning Tree.
pub const CIST: usize = 0;

/// Largest number of ports a bridge may have (12-bit port numbers).
const MAX_PORT_COUNT: usize = 0xfff;

/// Forwarding state of a port for one tree.
#[derive(Debug, Hash, PartialEq, Eq, Clone, Copy)]
pub enum PortState {
    /// Neither learning nor forwarding.
    Discarding,
    /// Learning addresses, not forwarding.
    Learning,
    /// Learning and forwarding.
    Forwarding,
}

/// Everything the state machines read and write.
#[derive(Debug)]
pub(crate) struct BridgeData {
    pub(crate) mac: EtherAddr,
    pub(crate) config: BridgeConfig,
    pub(crate) begin: bool,
    pub(crate) started: bool,
    pub(crate) logging_enabled: bool,
    pub(crate) mst_config_id: MstConfigId,
    pub(crate) mst_config_table: MstConfigTable,
    pub(crate) trees: Vec<Tree>,
    pub(crate) ports: Vec<Port>,
    /// Set by a port entering the DETECTED topology change state, reported
    /// once the bridge settles.
    pub(crate) tc_detected: bool,
    pub(crate) tc_count: u32,
    pub(crate) last_tc: Option<u32>,
}

impl BridgeData {
    pub(crate) fn new(
        mac: EtherAddr,
        config: BridgeConfig,
        port_count: usize,
        tree_count: usize,
    ) -> Self {
        let bridge_times = Times {
            message_age: 0,
            max_age: config.max_age,
            forward_delay: config.forward_delay,
            hello_time: config.hello_time,
            remaining_hops: config.max_hops,
        };
        let trees = (0..tree_count)
            .map(|tree| {
                Tree::new(
                    BridgeId::new(config.bridge_priority, tree as u16, mac),
                    bridge_times,
                )
            })
            .collect();
        let ports = (0..port_count)
            .map(|index| Port::new(index, tree_count, &config, bridge_times))
            .collect();

        Self {
            mac,
            config,
            begin: false,
            started: false,
            logging_enabled: false,
            mst_config_id: MstConfigId::with_bridge_address(mac),
            mst_config_table: MstConfigTable::new(),
            trees,
            ports,
            tc_detected: false,
            tc_count: 0,
            last_tc: None,
        }
    }

    /// BridgeTimes: the times this bridge advertises when it is the root.
    pub(crate) fn bridge_times(&self) -> Times {
        Times {
            message_age: 0,
            max_age: self.config.max_age,
            forward_delay: self.config.forward_delay,
            hello_time: self.config.hello_time,
            remaining_hops: self.config.max_hops,
        }
    }

    #[inline]
    pub(crate) fn rstp_version(&self) -> bool {
        self.config.force_version.is_rstp()
    }

    #[inline]
    pub(crate) fn stp_version(&self) -> bool {
        self.config.force_version.is_stp()
    }

    #[inline]
    pub(crate) fn port_tree(&self, port: usize, tree: usize) -> &PortTree {
        &self.ports[port].trees[tree]
    }

    #[inline]
    pub(crate) fn port_tree_mut(&mut self, port: usize, tree: usize) -> &mut PortTree {
        &mut self.ports[port].trees[tree]
    }
}

/// A spanning tree bridge.
///
/// The bridge owns all of its state and the host's callbacks. Every
/// mutating entry point runs the state machines until they settle before it
/// returns, so queries and callbacks always observe a consistent bridge.
///
/// Timestamps are opaque to the bridge; they are only handed back to the
/// callbacks and recorded for [`Bridge::last_topology_change`].
#[derive(Debug)]
pub struct Bridge<C: StpCallbacks> {
    data: BridgeData,
    callbacks: C,
}

impl<C: StpCallbacks> Bridge<C> {
    /// Create a stopped bridge with `port_count` ports, the CIST and
    /// `msti_count` MSTIs.
    pub fn new(
        port_count: usize,
        msti_count: usize,
        mac: EtherAddr,
        config: BridgeConfig,
        callbacks: C,
    ) -> Result<Self> {
        if port_count == 0 || port_count > MAX_PORT_COUNT {
            return Err(BridgeError::InvalidPortCount(port_count));
        }
        if msti_count > MAX_MSTI_MSGS {
            return Err(BridgeError::InvalidMstiCount(msti_count));
        }
        config.validate()?;

        tracing::debug!(%mac, port_count, msti_count, "bridge created");
        Ok(Self {
            data: BridgeData::new(mac, config, port_count, msti_count + 1),
            callbacks,
        })
    }

    /// The host callbacks.
    pub fn callbacks(&self) -> &C {
        &self.callbacks
    }

    /// Mutable access to the host callbacks.
    pub fn callbacks_mut(&mut self) -> &mut C {
        &mut self.callbacks
    }

    /// Consume the bridge, returning the host callbacks.
    pub fn into_callbacks(self) -> C {
        self.callbacks
    }

    fn check_port(&self, port: usize) -> Result<()> {
        if port >= self.data.ports.len() {
            return Err(BridgeError::InvalidPort(port));
        }
        Ok(())
    }

    fn check_tree(&self, tree: usize) -> Result<()> {
        if tree >= self.data.trees.len() {
            return Err(BridgeError::InvalidTree(tree));
        }
        Ok(())
    }

    /// Run the state machines until they settle.
    ///
    /// Entry points call this themselves; calling it again without new
    /// input changes nothing and returns `false`.
    pub fn evaluate(&mut self, timestamp: u32) -> bool {
        if !self.data.started {
            return false;
        }
        let changed = sm::run_state_machines(&mut self.data, &mut self.callbacks, timestamp);

        if self.data.tc_detected {
            self.data.tc_detected = false;
            self.data.tc_count += 1;
            self.data.last_tc = Some(timestamp);
            tracing::info!(
                mac = %self.data.mac,
                count = self.data.tc_count,
                "topology change detected"
            );
            self.callbacks.on_topology_change(timestamp);
        }
        changed
    }

    /// Force every machine back to its initial state, then let the bridge
    /// settle again.
    fn pulse_begin(&mut self, timestamp: u32) {
        self.data.begin = true;
        self.evaluate(timestamp);
        self.data.begin = false;
        self.evaluate(timestamp);
    }

    /// Start the bridge. Starting a started bridge does nothing.
    pub fn start(&mut self, timestamp: u32) -> Result<()> {
        if self.data.started {
            return Ok(());
        }
        tracing::info!(mac = %self.data.mac, "starting bridge");
        self.data.started = true;
        self.pulse_begin(timestamp);
        Ok(())
    }

    /// Stop running the state machines.
    ///
    /// A last evaluation with BEGIN asserted returns every machine to its
    /// initial state, so all ports stop learning and forwarding. Received
    /// BPDUs and ticks are ignored until the bridge is started again.
    pub fn stop(&mut self, timestamp: u32) -> Result<()> {
        if !self.data.started {
            return Err(BridgeError::NotStarted);
        }
        tracing::info!(mac = %self.data.mac, timestamp, "stopping bridge");
        self.data.begin = true;
        self.evaluate(timestamp);
        self.data.begin = false;
        self.data.started = false;
        Ok(())
    }

    /// Whether the state machines are running.
    pub fn is_started(&self) -> bool {
        self.data.started
    }

    /// The link of `port` came up.
    ///
    /// `speed_mbps` sets the default path costs and `detected_point_to_point`
    /// (full duplex) the operational point-to-point status when the admin
    /// setting is [`AdminP2P::Auto`].
    pub fn enable_port(
        &mut self,
        port: usize,
        speed_mbps: u32,
        detected_point_to_point: bool,
        timestamp: u32,
    ) -> Result<()> {
        self.check_port(port)?;
        let p = &mut self.data.ports[port];
        p.port_enabled = true;
        p.speed_mbps = speed_mbps;
        p.detected_p2p = detected_point_to_point;
        p.update_path_costs();
        p.update_oper_p2p();
        tracing::debug!(port, speed_mbps, oper_p2p = p.oper_p2p, "port enabled");
        self.evaluate(timestamp);
        Ok(())
    }

    /// The link of `port` went down.
    pub fn disable_port(&mut self, port: usize, timestamp: u32) -> Result<()> {
        self.check_port(port)?;
        self.data.ports[port].port_enabled = false;
        tracing::debug!(port, "port disabled");
        self.evaluate(timestamp);
        Ok(())
    }

    /// Hand a BPDU received on `port` to the bridge.
    ///
    /// `bytes` starts at the protocol identifier. Frames that do not decode,
    /// frames this bridge sent itself and frames arriving while the bridge
    /// is stopped or the port disabled are dropped.
    pub fn receive_bpdu(&mut self, port: usize, bytes: &[u8], timestamp: u32) -> Result<()> {
        self.check_port(port)?;
        if !self.data.started || !self.data.ports[port].port_enabled {
            tracing::debug!(port, "bpdu dropped, port not running");
            return Ok(());
        }

        let bpdu = match Bpdu::decode(bytes) {
            Ok(bpdu) => bpdu,
            Err(err) => {
                tracing::debug!(port, %err, "malformed bpdu dropped");
                return Ok(());
            }
        };

        if self.is_own_bpdu(port, &bpdu) {
            tracing::debug!(port, "looped back bpdu dropped");
            return Ok(());
        }

        tracing::trace!(port, ?bpdu, "bpdu received");
        let p = &mut self.data.ports[port];
        p.rx_bpdu = Some(bpdu);
        p.rcvd_bpdu = true;
        self.evaluate(timestamp);
        Ok(())
    }

    // A BPDU sent by this very port, looped back by the attached LAN.
    fn is_own_bpdu(&self, port: usize, bpdu: &Bpdu) -> bool {
        let (sender, sender_port) = match bpdu {
            Bpdu::Tcn => return false,
            Bpdu::Config(config) => (config.bridge_id, config.port_id),
            Bpdu::Rst(rst) => (rst.bridge_id, rst.port_id),
            Bpdu::Mst(mst) => (mst.cist_bridge_id, mst.cist.port_id),
        };
        sender.mac_addr() == self.data.mac && sender_port.number() as usize == port + 1
    }

    /// Advance every timer by one second.
    pub fn one_second_tick(&mut self, timestamp: u32) {
        if !self.data.started {
            return;
        }
        for port in self.data.ports.iter_mut() {
            port.timers.tick();
            port.tx_count = port.tx_count.saturating_sub(1);
            for tree in port.trees.iter_mut() {
                tree.timers.tick();
            }
        }
        self.evaluate(timestamp);
    }

    fn reselect(&mut self, port: usize, tree: usize) {
        let pt = self.data.port_tree_mut(port, tree);
        pt.reselect = true;
        pt.selected = false;
    }

    /// Set the bridge priority of `tree`, a multiple of 4096 not above
    /// 61440.
    pub fn set_bridge_priority(&mut self, tree: usize, priority: u16, timestamp: u32) -> Result<()> {
        self.check_tree(tree)?;
        if priority & 0x0fff != 0 {
            tracing::warn!(tree, priority, "invalid bridge priority");
            return Err(BridgeError::InvalidBridgePriority(priority));
        }
        self.data.trees[tree].bridge_id.set_priority(priority);
        tracing::debug!(tree, priority, "bridge priority changed");
        for port in 0..self.data.ports.len() {
            self.reselect(port, tree);
        }
        self.evaluate(timestamp);
        Ok(())
    }

    /// Set the priority of `port` on `tree`, a multiple of 16 not above 240.
    pub fn set_port_priority(
        &mut self,
        port: usize,
        tree: usize,
        priority: u8,
        timestamp: u32,
    ) -> Result<()> {
        self.check_port(port)?;
        self.check_tree(tree)?;
        if priority & 0x0f != 0 {
            tracing::warn!(port, tree, priority, "invalid port priority");
            return Err(BridgeError::InvalidPortPriority(priority));
        }
        self.data.port_tree_mut(port, tree).port_id.set_priority(priority);
        self.reselect(port, tree);
        self.evaluate(timestamp);
        Ok(())
    }

    /// Set the path cost of `port` on `tree`; 0 restores the cost derived
    /// from the link speed.
    ///
    /// On the CIST this sets both the external and the internal path cost.
    pub fn set_port_path_cost(
        &mut self,
        port: usize,
        tree: usize,
        cost: u32,
        timestamp: u32,
    ) -> Result<()> {
        self.check_port(port)?;
        self.check_tree(tree)?;
        if cost > MAX_PATH_COST {
            tracing::warn!(port, tree, cost, "invalid path cost");
            return Err(BridgeError::InvalidConfig(format!(
                "path cost {} above {}",
                cost, MAX_PATH_COST
            )));
        }
        let p = &mut self.data.ports[port];
        if tree == CIST {
            p.admin_external_path_cost = cost;
        }
        p.trees[tree].admin_internal_path_cost = cost;
        p.update_path_costs();
        self.reselect(port, tree);
        self.evaluate(timestamp);
        Ok(())
    }

    /// Declare `port` an edge port. An admin edge port starts out operEdge
    /// and skips the forward delay.
    pub fn set_port_admin_edge(&mut self, port: usize, admin_edge: bool, timestamp: u32) -> Result<()> {
        self.check_port(port)?;
        self.data.ports[port].admin_edge = admin_edge;
        self.evaluate(timestamp);
        Ok(())
    }

    /// Let `port` become operEdge when no BPDU arrives before its proposal
    /// times out.
    pub fn set_port_auto_edge(&mut self, port: usize, auto_edge: bool, timestamp: u32) -> Result<()> {
        self.check_port(port)?;
        self.data.ports[port].auto_edge = auto_edge;
        self.evaluate(timestamp);
        Ok(())
    }

    /// Override the point-to-point detection reported by
    /// [`Bridge::enable_port`].
    pub fn set_port_admin_point_to_point(
        &mut self,
        port: usize,
        admin_p2p: AdminP2P,
        timestamp: u32,
    ) -> Result<()> {
        self.check_port(port)?;
        let p = &mut self.data.ports[port];
        p.admin_p2p = admin_p2p;
        p.update_oper_p2p();
        self.evaluate(timestamp);
        Ok(())
    }

    /// Force `port` to re-check whether its neighbour speaks RSTP (mcheck).
    pub fn port_mcheck(&mut self, port: usize, timestamp: u32) -> Result<()> {
        self.check_port(port)?;
        if self.data.rstp_version() {
            self.data.ports[port].mcheck = true;
            self.evaluate(timestamp);
        }
        Ok(())
    }

    fn config_changed(&mut self, timestamp: u32) {
        self.callbacks.on_config_changed(timestamp);
        if self.data.started {
            self.pulse_begin(timestamp);
        }
    }

    /// Force the protocol the bridge runs. A change on a started bridge
    /// restarts every state machine.
    pub fn set_stp_version(&mut self, version: StpVersion, timestamp: u32) -> Result<()> {
        if self.data.config.force_version == version {
            return Ok(());
        }
        tracing::info!(?version, "protocol version changed");
        self.data.config.force_version = version;
        self.config_changed(timestamp);
        Ok(())
    }

    /// Set the MST configuration name, at most 32 printable ASCII bytes.
    pub fn set_mst_config_name(&mut self, name: &str, timestamp: u32) -> Result<()> {
        let mut id = self.data.mst_config_id;
        id.set_name(name)?;
        if id != self.data.mst_config_id {
            self.data.mst_config_id = id;
            tracing::debug!(name, "mst configuration name changed");
            self.config_changed(timestamp);
        }
        Ok(())
    }

    /// Set the revision level of the MST configuration identifier.
    pub fn set_mst_config_revision(&mut self, revision: u16, timestamp: u32) -> Result<()> {
        if self.data.mst_config_id.revision != revision {
            self.data.mst_config_id.revision = revision;
            tracing::debug!(revision, "mst configuration revision changed");
            self.config_changed(timestamp);
        }
        Ok(())
    }

    /// Replace the VLAN to MSTID table. Every MSTID the table uses must be
    /// one of this bridge's trees.
    pub fn set_mst_config_table(&mut self, table: &MstConfigTable, timestamp: u32) -> Result<()> {
        let max_mstid = table.max_mstid() as usize;
        if max_mstid >= self.data.trees.len() {
            tracing::warn!(max_mstid, "mst configuration table names an unknown tree");
            return Err(BridgeError::InvalidTree(max_mstid));
        }
        if *table == self.data.mst_config_table {
            return Ok(());
        }
        self.data.mst_config_table = table.clone();
        self.data.mst_config_id.digest = table.digest();
        tracing::debug!("mst configuration table changed");
        self.config_changed(timestamp);
        Ok(())
    }

    /// Enable or disable the [`StpCallbacks::debug_log`] trace of state
    /// transitions.
    pub fn set_logging_enabled(&mut self, enabled: bool) {
        self.data.logging_enabled = enabled;
    }

    /// Whether the state transition trace is enabled.
    pub fn logging_enabled(&self) -> bool {
        self.data.logging_enabled
    }

    /// The configuration the bridge was created with, as later modified.
    pub fn config(&self) -> &BridgeConfig {
        &self.data.config
    }

    /// The protocol version the bridge is forced to.
    pub fn stp_version(&self) -> StpVersion {
        self.data.config.force_version
    }

    /// The MAC address in every bridge identifier of this bridge.
    pub fn bridge_address(&self) -> EtherAddr {
        self.data.mac
    }

    /// Number of ports.
    pub fn port_count(&self) -> usize {
        self.data.ports.len()
    }

    /// Number of MSTIs, the CIST not included.
    pub fn msti_count(&self) -> usize {
        self.data.trees.len() - 1
    }

    /// The MST configuration identifier this bridge advertises.
    pub fn mst_config_id(&self) -> &MstConfigId {
        &self.data.mst_config_id
    }

    /// Name of the MST region.
    pub fn mst_config_name(&self) -> String {
        self.data.mst_config_id.name_str()
    }

    /// Revision level of the MST region.
    pub fn mst_config_revision(&self) -> u16 {
        self.data.mst_config_id.revision
    }

    /// HMAC-MD5 digest of the VLAN to MSTID table.
    pub fn mst_config_digest(&self) -> [u8; 16] {
        self.data.mst_config_id.digest
    }

    /// The VLAN to MSTID table.
    pub fn mst_config_table(&self) -> &MstConfigTable {
        &self.data.mst_config_table
    }

    /// The tree a VLAN is mapped to.
    pub fn tree_index_for_vlan(&self, vlan: u16) -> Result<usize> {
        if vlan == 0 || vlan >= 4095 {
            return Err(BridgeError::InvalidVlan(vlan));
        }
        Ok(self.data.mst_config_table.get(vlan) as usize)
    }

    /// The bridge identifier for `tree`. Its system id extension is the
    /// tree index.
    pub fn bridge_id(&self, tree: usize) -> Result<BridgeId> {
        self.check_tree(tree)?;
        Ok(self.data.trees[tree].bridge_id)
    }

    /// The priority part of [`bridge_id`](Self::bridge_id).
    pub fn bridge_priority(&self, tree: usize) -> Result<u16> {
        Ok(self.bridge_id(tree)?.priority())
    }

    /// The root priority vector of `tree`. MSTI vectors carry a zero root
    /// id and external root path cost.
    pub fn root_priority(&self, tree: usize) -> Result<PriorityVector> {
        self.check_tree(tree)?;
        Ok(self.data.trees[tree].root_priority)
    }

    /// The root priority vector of `tree` in transmission order: root id,
    /// external root path cost, regional root id, internal root path cost,
    /// designated bridge id, designated port id and receiving port id.
    pub fn root_priority_vector(&self, tree: usize) -> Result<[u8; PRIORITY_VECTOR_LEN]> {
        Ok(self.root_priority(tree)?.to_bytes())
    }

    /// The times in effect on `tree`: received from the root port, or this
    /// bridge's own when it is the root.
    pub fn root_times(&self, tree: usize) -> Result<Times> {
        self.check_tree(tree)?;
        Ok(self.data.trees[tree].root_times)
    }

    /// The root port of `tree`, `None` when this bridge is the root.
    pub fn root_port(&self, tree: usize) -> Result<Option<usize>> {
        self.check_tree(tree)?;
        let root_port_id = self.data.trees[tree].root_port_id;
        if root_port_id.number() == 0 {
            return Ok(None);
        }
        Ok(Some(root_port_id.number() as usize - 1))
    }

    fn port_tree(&self, port: usize, tree: usize) -> Result<&PortTree> {
        self.check_port(port)?;
        self.check_tree(tree)?;
        Ok(self.data.port_tree(port, tree))
    }

    /// The current role of `port` in `tree`.
    pub fn port_role(&self, port: usize, tree: usize) -> Result<PortRole> {
        Ok(self.port_tree(port, tree)?.role)
    }

    /// Whether `port` learns addresses for `tree`.
    pub fn port_learning(&self, port: usize, tree: usize) -> Result<bool> {
        Ok(self.port_tree(port, tree)?.learning)
    }

    /// Whether `port` forwards frames for `tree`.
    pub fn port_forwarding(&self, port: usize, tree: usize) -> Result<bool> {
        Ok(self.port_tree(port, tree)?.forwarding)
    }

    /// The forwarding state of `port` on `tree` as the host sees it.
    pub fn port_state(&self, port: usize, tree: usize) -> Result<PortState> {
        let pt = self.port_tree(port, tree)?;
        Ok(match (pt.learning, pt.forwarding) {
            (_, true) => PortState::Forwarding,
            (true, false) => PortState::Learning,
            (false, false) => PortState::Discarding,
        })
    }

    /// Port priority and port number as sent in BPDUs.
    pub fn port_identifier(&self, port: usize, tree: usize) -> Result<PortId> {
        Ok(self.port_tree(port, tree)?.port_id)
    }

    /// The priority part of [`port_identifier`](Self::port_identifier).
    pub fn port_priority(&self, port: usize, tree: usize) -> Result<u8> {
        Ok(self.port_tree(port, tree)?.port_id.priority())
    }

    /// The operational internal path cost of `port` on `tree`.
    pub fn port_path_cost(&self, port: usize, tree: usize) -> Result<u32> {
        Ok(self.port_tree(port, tree)?.internal_path_cost)
    }

    /// The operational external path cost of `port`.
    pub fn port_external_path_cost(&self, port: usize) -> Result<u32> {
        self.check_port(port)?;
        Ok(self.data.ports[port].external_path_cost)
    }

    /// The priority vector `port` sends, or would send, on `tree`.
    pub fn port_designated_priority(&self, port: usize, tree: usize) -> Result<PriorityVector> {
        Ok(self.port_tree(port, tree)?.designated_priority)
    }

    fn port(&self, port: usize) -> Result<&Port> {
        self.check_port(port)?;
        Ok(&self.data.ports[port])
    }

    /// Whether the link of `port` is up.
    pub fn port_enabled(&self, port: usize) -> Result<bool> {
        Ok(self.port(port)?.port_enabled)
    }

    /// The administrative edge setting of `port`.
    pub fn port_admin_edge(&self, port: usize) -> Result<bool> {
        Ok(self.port(port)?.admin_edge)
    }

    /// Whether `port` may become an edge port on its own.
    pub fn port_auto_edge(&self, port: usize) -> Result<bool> {
        Ok(self.port(port)?.auto_edge)
    }

    /// Whether `port` currently operates as an edge port.
    pub fn port_oper_edge(&self, port: usize) -> Result<bool> {
        Ok(self.port(port)?.oper_edge)
    }

    /// The administrative point-to-point setting of `port`.
    pub fn port_admin_point_to_point(&self, port: usize) -> Result<AdminP2P> {
        Ok(self.port(port)?.admin_p2p)
    }

    /// Whether `port` is treated as a point-to-point link.
    pub fn port_oper_point_to_point(&self, port: usize) -> Result<bool> {
        Ok(self.port(port)?.oper_p2p)
    }

    /// Whether `port` currently sends RST or MST BPDUs rather than Config
    /// and TCN BPDUs.
    pub fn port_sends_rstp(&self, port: usize) -> Result<bool> {
        Ok(self.port(port)?.send_rstp)
    }

    /// Whether Bridge Detection put `port` in the ISOLATED state.
    pub fn port_isolated(&self, port: usize) -> Result<bool> {
        Ok(self.port(port)?.isolate)
    }

    /// Number of topology changes this bridge detected since it was created.
    pub fn topology_change_count(&self) -> u32 {
        self.data.tc_count
    }

    /// Timestamp of the last detected topology change.
    pub fn last_topology_change(&self) -> Option<u32> {
        self.data.last_tc
    }
}
