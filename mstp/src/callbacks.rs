use crate::bridge::PortRole;

/// How the filtering database entries learned on a port should be removed.
#[derive(Debug, Hash, PartialEq, Eq, Clone, Copy)]
pub enum FlushFdbType {
    /// Remove the entries now (RSTP and MSTP).
    Immediate,
    /// Age the entries out using the forward delay as ageing time (legacy STP).
    RapidAgeing,
}

/// The services a [`Bridge`](crate::Bridge) needs from its host.
///
/// Callbacks are invoked synchronously from inside the bridge entry points,
/// after the bridge state they report has been updated. They only receive
/// indexes and data, never the bridge itself, so a callback cannot re-enter
/// the bridge that invoked it.
///
/// Every method but [`transmit`](StpCallbacks::transmit) has an empty
/// default body.
pub trait StpCallbacks {
    /// Send an encoded BPDU (without the LLC and MAC headers) out of `port`.
    fn transmit(&mut self, port: usize, bpdu: &[u8], timestamp: u32);

    /// Start or stop learning source addresses on `port` for the VLANs of
    /// `tree`.
    fn enable_learning(&mut self, port: usize, tree: usize, enable: bool, timestamp: u32) {
        let _ = (port, tree, enable, timestamp);
    }

    /// Start or stop forwarding frames through `port` for the VLANs of
    /// `tree`.
    fn enable_forwarding(&mut self, port: usize, tree: usize, enable: bool, timestamp: u32) {
        let _ = (port, tree, enable, timestamp);
    }

    /// Remove the filtering database entries learned on `port` for the VLANs
    /// of `tree`.
    fn flush_fdb(&mut self, port: usize, tree: usize, flush_type: FlushFdbType, timestamp: u32) {
        let _ = (port, tree, flush_type, timestamp);
    }

    /// A line of the state machine trace, emitted only while logging is
    /// enabled on the bridge. `port` and `tree` name the automaton instance
    /// the line is about.
    fn debug_log(&mut self, port: Option<usize>, tree: Option<usize>, text: &str) {
        let _ = (port, tree, text);
    }

    /// This bridge detected a topology change on one of its ports.
    fn on_topology_change(&mut self, timestamp: u32) {
        let _ = timestamp;
    }

    /// A neighbour notified a topology change on `port` for `tree`.
    fn on_notified_topology_change(&mut self, port: usize, tree: usize, timestamp: u32) {
        let _ = (port, tree, timestamp);
    }

    /// The role of `port` in `tree` is now `role`.
    fn on_port_role_changed(&mut self, port: usize, tree: usize, role: PortRole, timestamp: u32) {
        let _ = (port, tree, role, timestamp);
    }

    /// The MST configuration identifier or the protocol version changed.
    fn on_config_changed(&mut self, timestamp: u32) {
        let _ = timestamp;
    }
}

/// Callbacks that drop every BPDU and ignore every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopCallbacks;

impl StpCallbacks for NoopCallbacks {
    fn transmit(&mut self, _port: usize, _bpdu: &[u8], _timestamp: u32) {}
}
