//! The 802.1Q-2011 state machines and the driver that runs them to a fixed
//! point.
//!
//! Every machine splits into a pure `check_conditions`, which looks at the
//! bridge and returns the state to move to, and an `init_state` holding the
//! entry actions of each state. Entry actions are the only place bridge
//! variables change and callbacks are invoked.

pub(crate) mod bridge_detection;
pub(crate) mod port_information;
pub(crate) mod port_protocol_migration;
pub(crate) mod port_receive;
pub(crate) mod port_role_selection;
pub(crate) mod port_role_transitions;
pub(crate) mod port_state_transition;
pub(crate) mod port_transmit;
pub(crate) mod procedures;
pub(crate) mod topology_change;

use core::fmt::Debug;

use crate::bridge::{BridgeData, CIST};
use crate::callbacks::StpCallbacks;

/// Upper bound on the number of passes over all machines before a bridge
/// settles. Reaching it means two machines keep undoing each other.
const MAX_PASSES: usize = 1000;

/// What a machine instance is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Scope {
    Port,
    Tree,
    PortTree,
}

pub(crate) trait StateMachine {
    type State: Copy + Eq + Debug;

    const NAME: &'static str;
    const SCOPE: Scope;
    const STATE_COUNT: usize;
    /// The state BEGIN puts the machine in.
    const INITIAL: Self::State;

    fn state_name(state: Self::State) -> &'static str;

    fn state(data: &BridgeData, port: usize, tree: usize) -> Self::State;

    fn set_state(data: &mut BridgeData, port: usize, tree: usize, state: Self::State);

    /// The state to move to, or `None` when the machine stays where it is.
    fn check_conditions(
        data: &BridgeData,
        port: usize,
        tree: usize,
        state: Self::State,
    ) -> Option<Self::State>;

    fn init_state(
        data: &mut BridgeData,
        callbacks: &mut dyn StpCallbacks,
        port: usize,
        tree: usize,
        state: Self::State,
        timestamp: u32,
    );
}

/// Run one machine instance until it stops transitioning. Returns `true`
/// when at least one transition was made.
pub(crate) fn run_machine<M: StateMachine>(
    data: &mut BridgeData,
    callbacks: &mut dyn StpCallbacks,
    port: usize,
    tree: usize,
    timestamp: u32,
) -> bool {
    let limit = M::STATE_COUNT * M::STATE_COUNT;
    let mut transitions = 0;

    loop {
        let state = M::state(data, port, tree);
        let Some(next) = M::check_conditions(data, port, tree, state) else {
            break;
        };

        transitions += 1;
        assert!(
            transitions <= limit,
            "{} (port {}, tree {}) keeps transitioning, stuck at {}",
            M::NAME,
            port,
            tree,
            M::state_name(next)
        );

        log_transition::<M>(data, callbacks, port, tree, state, next);
        M::set_state(data, port, tree, next);
        M::init_state(data, callbacks, port, tree, next, timestamp);
    }

    transitions > 0
}

fn log_transition<M: StateMachine>(
    data: &BridgeData,
    callbacks: &mut dyn StpCallbacks,
    port: usize,
    tree: usize,
    from: M::State,
    to: M::State,
) {
    let (port, tree) = match M::SCOPE {
        Scope::Port => (Some(port), None),
        Scope::Tree => (None, Some(tree)),
        Scope::PortTree => (Some(port), Some(tree)),
    };
    tracing::trace!(
        machine = M::NAME,
        ?port,
        ?tree,
        "{} -> {}",
        M::state_name(from),
        M::state_name(to)
    );

    if data.logging_enabled {
        let mut text = String::from(M::NAME);
        if let Some(port) = port {
            text.push_str(&format!(" port {}", port));
        }
        if let Some(tree) = tree {
            text.push_str(&format!(" tree {}", tree));
        }
        text.push_str(&format!(": {} -> {}", M::state_name(from), M::state_name(to)));
        callbacks.debug_log(port, tree, &text);
    }
}

/// Enter the initial state of every instance of a machine, running its
/// entry actions.
fn begin_machine<M: StateMachine>(
    data: &mut BridgeData,
    callbacks: &mut dyn StpCallbacks,
    timestamp: u32,
) {
    let (ports, trees) = match M::SCOPE {
        Scope::Port => (data.ports.len(), 1),
        Scope::Tree => (1, data.trees.len()),
        Scope::PortTree => (data.ports.len(), data.trees.len()),
    };
    for tree in 0..trees {
        for port in 0..ports {
            M::set_state(data, port, tree, M::INITIAL);
            M::init_state(data, callbacks, port, tree, M::INITIAL, timestamp);
        }
    }
}

fn begin(data: &mut BridgeData, callbacks: &mut dyn StpCallbacks, timestamp: u32) {
    tracing::debug!("BEGIN");
    begin_machine::<port_receive::PortReceive>(data, callbacks, timestamp);
    begin_machine::<port_protocol_migration::PortProtocolMigration>(data, callbacks, timestamp);
    begin_machine::<bridge_detection::BridgeDetection>(data, callbacks, timestamp);
    begin_machine::<port_information::PortInformation>(data, callbacks, timestamp);
    begin_machine::<port_role_selection::PortRoleSelection>(data, callbacks, timestamp);
    begin_machine::<port_role_transitions::PortRoleTransitions>(data, callbacks, timestamp);
    begin_machine::<port_state_transition::PortStateTransition>(data, callbacks, timestamp);
    begin_machine::<topology_change::TopologyChange>(data, callbacks, timestamp);
    begin_machine::<port_transmit::PortTransmit>(data, callbacks, timestamp);
}

fn run_per_port<M: StateMachine>(
    data: &mut BridgeData,
    callbacks: &mut dyn StpCallbacks,
    timestamp: u32,
) -> bool {
    let mut changed = false;
    for port in 0..data.ports.len() {
        changed |= run_machine::<M>(data, callbacks, port, CIST, timestamp);
    }
    changed
}

fn run_per_port_tree<M: StateMachine>(
    data: &mut BridgeData,
    callbacks: &mut dyn StpCallbacks,
    timestamp: u32,
) -> bool {
    let mut changed = false;
    for tree in 0..data.trees.len() {
        for port in 0..data.ports.len() {
            changed |= run_machine::<M>(data, callbacks, port, tree, timestamp);
        }
    }
    changed
}

/// One pass over every machine instance of the bridge, in the order the
/// machines feed each other.
fn run_pass(data: &mut BridgeData, callbacks: &mut dyn StpCallbacks, timestamp: u32) -> bool {
    let mut changed = false;

    changed |= run_per_port::<port_receive::PortReceive>(data, callbacks, timestamp);
    changed |=
        run_per_port::<port_protocol_migration::PortProtocolMigration>(data, callbacks, timestamp);
    changed |= run_per_port::<bridge_detection::BridgeDetection>(data, callbacks, timestamp);
    changed |=
        run_per_port_tree::<port_information::PortInformation>(data, callbacks, timestamp);

    for tree in 0..data.trees.len() {
        changed |= run_machine::<port_role_selection::PortRoleSelection>(
            data, callbacks, 0, tree, timestamp,
        );
    }

    changed |=
        run_per_port_tree::<port_role_transitions::PortRoleTransitions>(data, callbacks, timestamp);
    changed |=
        run_per_port_tree::<port_state_transition::PortStateTransition>(data, callbacks, timestamp);
    changed |= run_per_port_tree::<topology_change::TopologyChange>(data, callbacks, timestamp);
    changed |= run_per_port::<port_transmit::PortTransmit>(data, callbacks, timestamp);

    changed
}

/// Run every machine of the bridge until none of them transitions.
///
/// While BEGIN is asserted every machine is first put back in its initial
/// state, where it stays until BEGIN is released. Returns `true` when
/// anything changed.
pub(crate) fn run_state_machines(
    data: &mut BridgeData,
    callbacks: &mut dyn StpCallbacks,
    timestamp: u32,
) -> bool {
    if data.begin {
        begin(data, callbacks, timestamp);
    }

    let mut passes = 0;
    while run_pass(data, callbacks, timestamp) {
        passes += 1;
        assert!(passes < MAX_PASSES, "bridge state machines do not settle");
    }
    data.begin || passes > 0
}
