//! Port Role Transitions state machine (802.1Q-2011 §13.34).
//!
//! Moves a port through the states of its selected role: the disabled,
//! master, root, designated and alternate/backup groups. Every transition
//! out of a state waits until role selection is done with the port
//! (`selected && !updtInfo`).

use super::procedures::{self, all_synced, forward_delay, fwd_delay, hello_time, max_age};
use super::{Scope, StateMachine};
use crate::bridge::{BridgeData, PortRole, PortTree, CIST};
use crate::callbacks::StpCallbacks;

sm_states! {
    pub(crate) enum State {
        InitPort => "INIT_PORT",
        DisablePort => "DISABLE_PORT",
        DisabledPort => "DISABLED_PORT",

        MasterPort => "MASTER_PORT",
        MasterProposed => "MASTER_PROPOSED",
        MasterAgreed => "MASTER_AGREED",
        MasterSynced => "MASTER_SYNCED",
        MasterRetired => "MASTER_RETIRED",
        MasterDiscard => "MASTER_DISCARD",
        MasterLearn => "MASTER_LEARN",
        MasterForward => "MASTER_FORWARD",

        RootPort => "ROOT_PORT",
        RootProposed => "ROOT_PROPOSED",
        RootAgreed => "ROOT_AGREED",
        RootSynced => "ROOT_SYNCED",
        Reroot => "REROOT",
        Rerooted => "REROOTED",
        RootLearn => "ROOT_LEARN",
        RootForward => "ROOT_FORWARD",

        DesignatedPort => "DESIGNATED_PORT",
        DesignatedPropose => "DESIGNATED_PROPOSE",
        DesignatedAgreed => "DESIGNATED_AGREED",
        DesignatedSynced => "DESIGNATED_SYNCED",
        DesignatedRetired => "DESIGNATED_RETIRED",
        DesignatedDiscard => "DESIGNATED_DISCARD",
        DesignatedLearn => "DESIGNATED_LEARN",
        DesignatedForward => "DESIGNATED_FORWARD",

        BlockPort => "BLOCK_PORT",
        AlternatePort => "ALTERNATE_PORT",
        AlternateProposed => "ALTERNATE_PROPOSED",
        AlternateAgreed => "ALTERNATE_AGREED",
        BackupPort => "BACKUP_PORT",
    }
}

#[derive(Debug)]
pub(crate) struct PortRoleTransitions;

impl StateMachine for PortRoleTransitions {
    type State = State;

    const NAME: &'static str = "PortRoleTransitions";
    const SCOPE: Scope = Scope::PortTree;
    const STATE_COUNT: usize = State::COUNT;
    const INITIAL: State = State::InitPort;

    fn state_name(state: State) -> &'static str {
        state.name()
    }

    fn state(data: &BridgeData, port: usize, tree: usize) -> State {
        data.port_tree(port, tree).role_transitions
    }

    fn set_state(data: &mut BridgeData, port: usize, tree: usize, state: State) {
        data.port_tree_mut(port, tree).role_transitions = state;
    }

    fn check_conditions(data: &BridgeData, port: usize, tree: usize, state: State) -> Option<State> {
        if data.begin {
            return (state != State::InitPort).then_some(State::InitPort);
        }
        if state == State::InitPort {
            return Some(State::DisablePort);
        }

        let pt = data.port_tree(port, tree);
        if !pt.selected || pt.updt_info {
            return None;
        }
        if pt.role != pt.selected_role {
            return Some(match pt.selected_role {
                PortRole::Disabled => State::DisablePort,
                PortRole::Master => State::MasterPort,
                PortRole::Root => State::RootPort,
                PortRole::Designated => State::DesignatedPort,
                PortRole::Alternate | PortRole::Backup => State::BlockPort,
            });
        }

        match state {
            State::InitPort => Some(State::DisablePort),
            State::DisablePort => (!pt.learning && !pt.forwarding).then_some(State::DisabledPort),
            State::DisabledPort => {
                let restart = pt.timers.fd_while != max_age(data, port)
                    || pt.sync
                    || pt.re_root
                    || !pt.synced;
                restart.then_some(State::DisabledPort)
            }

            State::MasterPort => master_port(data, port, tree),
            State::MasterProposed
            | State::MasterAgreed
            | State::MasterSynced
            | State::MasterRetired
            | State::MasterDiscard
            | State::MasterLearn
            | State::MasterForward => Some(State::MasterPort),

            State::RootPort => root_port(data, port, tree),
            State::RootProposed
            | State::RootAgreed
            | State::RootSynced
            | State::Reroot
            | State::Rerooted
            | State::RootLearn
            | State::RootForward => Some(State::RootPort),

            State::DesignatedPort => designated_port(data, port, tree),
            State::DesignatedPropose
            | State::DesignatedAgreed
            | State::DesignatedSynced
            | State::DesignatedRetired
            | State::DesignatedDiscard
            | State::DesignatedLearn
            | State::DesignatedForward => Some(State::DesignatedPort),

            State::BlockPort => (!pt.learning && !pt.forwarding).then_some(State::AlternatePort),
            State::AlternatePort => alternate_port(data, port, tree),
            State::AlternateProposed | State::AlternateAgreed | State::BackupPort => {
                Some(State::AlternatePort)
            }
        }
    }

    fn init_state(
        data: &mut BridgeData,
        callbacks: &mut dyn StpCallbacks,
        port: usize,
        tree: usize,
        state: State,
        timestamp: u32,
    ) {
        let old_role = data.port_tree(port, tree).role;
        let fwd_delay = fwd_delay(data, port);
        let max_age = max_age(data, port);
        let forward_delay = forward_delay(data, port);
        let send_rstp = data.ports[port].send_rstp;

        match state {
            State::InitPort => {
                let pt = data.port_tree_mut(port, tree);
                pt.role = PortRole::Disabled;
                pt.learn = false;
                pt.forward = false;
                pt.synced = false;
                pt.sync = true;
                pt.re_root = true;
                pt.timers.rr_while.set(fwd_delay);
                pt.timers.fd_while.set(max_age);
                pt.timers.rb_while.set(0);
            }
            State::DisablePort => {
                let pt = data.port_tree_mut(port, tree);
                pt.role = pt.selected_role;
                pt.learn = false;
                pt.forward = false;
            }
            State::DisabledPort => {
                let pt = data.port_tree_mut(port, tree);
                pt.timers.fd_while.set(max_age);
                pt.synced = true;
                pt.timers.rr_while.set(0);
                pt.sync = false;
                pt.re_root = false;
            }

            State::MasterPort => data.port_tree_mut(port, tree).role = PortRole::Master,
            State::RootPort => {
                let pt = data.port_tree_mut(port, tree);
                pt.role = PortRole::Root;
                pt.timers.rr_while.set(fwd_delay);
            }
            State::DesignatedPort => data.port_tree_mut(port, tree).role = PortRole::Designated,

            State::MasterProposed | State::RootProposed | State::AlternateProposed => {
                procedures::set_sync_tree(data, tree);
                data.port_tree_mut(port, tree).proposed = false;
            }
            State::MasterAgreed => {
                let pt = data.port_tree_mut(port, tree);
                pt.proposed = false;
                pt.sync = false;
                pt.agree = true;
            }
            State::RootAgreed | State::DesignatedAgreed => {
                let pt = data.port_tree_mut(port, tree);
                pt.proposed = false;
                pt.sync = false;
                pt.agree = true;
                procedures::set_new_info_xst(data, port, tree);
            }
            State::AlternateAgreed => {
                let pt = data.port_tree_mut(port, tree);
                pt.proposed = false;
                pt.agree = true;
                procedures::set_new_info_xst(data, port, tree);
            }
            State::MasterSynced | State::DesignatedSynced => {
                let pt = data.port_tree_mut(port, tree);
                pt.timers.rr_while.set(0);
                pt.synced = true;
                pt.sync = false;
            }
            State::RootSynced => {
                let pt = data.port_tree_mut(port, tree);
                pt.synced = true;
                pt.sync = false;
            }
            State::MasterRetired | State::DesignatedRetired | State::Rerooted => {
                data.port_tree_mut(port, tree).re_root = false;
            }
            State::Reroot => procedures::set_re_root_tree(data, tree),
            State::MasterDiscard | State::DesignatedDiscard => {
                let pt = data.port_tree_mut(port, tree);
                pt.learn = false;
                pt.forward = false;
                pt.disputed = false;
                pt.timers.fd_while.set(forward_delay);
            }
            State::MasterLearn | State::DesignatedLearn | State::RootLearn => {
                let pt = data.port_tree_mut(port, tree);
                pt.learn = true;
                pt.timers.fd_while.set(forward_delay);
            }
            State::MasterForward | State::DesignatedForward => {
                let pt = data.port_tree_mut(port, tree);
                pt.forward = true;
                pt.timers.fd_while.set(0);
                pt.agreed = send_rstp;
            }
            State::RootForward => {
                let pt = data.port_tree_mut(port, tree);
                pt.forward = true;
                pt.timers.fd_while.set(0);
            }
            State::DesignatedPropose => {
                data.port_tree_mut(port, tree).proposing = true;
                if tree == CIST {
                    let edge_delay = procedures::edge_delay(data, port);
                    data.ports[port].timers.edge_delay_while.set(edge_delay);
                }
                procedures::set_new_info_xst(data, port, tree);
            }

            State::BlockPort => {
                let pt = data.port_tree_mut(port, tree);
                pt.role = pt.selected_role;
                pt.learn = false;
                pt.forward = false;
            }
            State::AlternatePort => {
                let pt = data.port_tree_mut(port, tree);
                pt.timers.fd_while.set(forward_delay);
                pt.synced = true;
                pt.timers.rr_while.set(0);
                pt.sync = false;
                pt.re_root = false;
            }
            State::BackupPort => {
                let value = 2 * hello_time(data, port);
                data.port_tree_mut(port, tree).timers.rb_while.set(value);
            }
        }

        let role = data.port_tree(port, tree).role;
        if role != old_role {
            tracing::debug!(port, tree, ?old_role, ?role, "port role changed");
            callbacks.on_port_role_changed(port, tree, role, timestamp);
        }
    }
}

/// The synchronisation conditions Master and Designated ports share.
fn needs_synced(data: &BridgeData, port: usize, tree: usize) -> bool {
    let p = &data.ports[port];
    let pt = &p.trees[tree];
    (!pt.learning && !pt.forwarding && !pt.synced)
        || (pt.agreed && !pt.synced)
        || (p.oper_edge && !pt.synced)
        || (pt.sync && pt.synced)
}

/// MASTER_DISCARD: an edge port still discards when it becomes a Master.
fn master_needs_discard(pt: &PortTree) -> bool {
    ((pt.sync && !pt.synced) || (pt.re_root && !pt.timers.rr_while.is_expired()) || pt.disputed)
        && (pt.learn || pt.forward)
}

fn designated_needs_discard(data: &BridgeData, port: usize, tree: usize) -> bool {
    let p = &data.ports[port];
    master_needs_discard(&p.trees[tree]) && !p.oper_edge
}

fn master_port(data: &BridgeData, port: usize, tree: usize) -> Option<State> {
    let pt = data.port_tree(port, tree);
    let all_synced = all_synced(data, port, tree);
    let may_advance = pt.timers.fd_while.is_expired() || all_synced;

    if pt.proposed && !pt.agree {
        Some(State::MasterProposed)
    } else if (all_synced && !pt.agree) || (pt.proposed && pt.agree) {
        Some(State::MasterAgreed)
    } else if needs_synced(data, port, tree) {
        Some(State::MasterSynced)
    } else if pt.re_root && pt.timers.rr_while.is_expired() {
        Some(State::MasterRetired)
    } else if master_needs_discard(pt) {
        Some(State::MasterDiscard)
    } else if may_advance && !pt.learn {
        Some(State::MasterLearn)
    } else if may_advance && pt.learn && !pt.forward {
        Some(State::MasterForward)
    } else {
        None
    }
}

fn root_port(data: &BridgeData, port: usize, tree: usize) -> Option<State> {
    let pt = data.port_tree(port, tree);
    let all_synced = all_synced(data, port, tree);
    let may_advance = pt.timers.fd_while.is_expired()
        || (procedures::re_rooted(data, port, tree)
            && pt.timers.rb_while.is_expired()
            && data.rstp_version());

    if pt.proposed && !pt.agree {
        Some(State::RootProposed)
    } else if (all_synced && !pt.agree) || (pt.proposed && pt.agree) {
        Some(State::RootAgreed)
    } else if (pt.agreed && !pt.synced) || (pt.sync && pt.synced) {
        Some(State::RootSynced)
    } else if !pt.forward && !pt.re_root {
        Some(State::Reroot)
    } else if pt.timers.rr_while != fwd_delay(data, port) {
        Some(State::RootPort)
    } else if pt.re_root && pt.forward {
        Some(State::Rerooted)
    } else if may_advance && !pt.learn {
        Some(State::RootLearn)
    } else if may_advance && pt.learn && !pt.forward {
        Some(State::RootForward)
    } else {
        None
    }
}

fn designated_port(data: &BridgeData, port: usize, tree: usize) -> Option<State> {
    let p = &data.ports[port];
    let pt = &p.trees[tree];
    let may_advance = (pt.timers.fd_while.is_expired() || pt.agreed || p.oper_edge)
        && (pt.timers.rr_while.is_expired() || !pt.re_root)
        && !pt.sync
        && !p.isolate;

    if !pt.forward && !pt.agreed && !pt.proposing && !p.oper_edge {
        Some(State::DesignatedPropose)
    } else if all_synced(data, port, tree) && (pt.proposed || !pt.agree) {
        Some(State::DesignatedAgreed)
    } else if needs_synced(data, port, tree) {
        Some(State::DesignatedSynced)
    } else if pt.re_root && pt.timers.rr_while.is_expired() {
        Some(State::DesignatedRetired)
    } else if designated_needs_discard(data, port, tree) {
        Some(State::DesignatedDiscard)
    } else if may_advance && !pt.learn {
        Some(State::DesignatedLearn)
    } else if may_advance && pt.learn && !pt.forward {
        Some(State::DesignatedForward)
    } else {
        None
    }
}

fn alternate_port(data: &BridgeData, port: usize, tree: usize) -> Option<State> {
    let pt = data.port_tree(port, tree);
    let all_synced = all_synced(data, port, tree);

    if pt.proposed && !pt.agree {
        Some(State::AlternateProposed)
    } else if (all_synced && !pt.agree) || (pt.proposed && pt.agree) {
        Some(State::AlternateAgreed)
    } else if pt.timers.fd_while != forward_delay(data, port) || pt.sync || pt.re_root || !pt.synced
    {
        Some(State::AlternatePort)
    } else if pt.role == PortRole::Backup && pt.timers.rb_while != 2 * hello_time(data, port) {
        Some(State::BackupPort)
    } else {
        None
    }
}
