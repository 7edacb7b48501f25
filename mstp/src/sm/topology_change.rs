//! Topology Change state machine (802.1Q-2011 §13.36).

use super::{procedures, Scope, StateMachine};
use crate::bridge::{BridgeData, PortRole, CIST};
use crate::callbacks::StpCallbacks;

sm_states! {
    pub(crate) enum State {
        Inactive => "INACTIVE",
        Learning => "LEARNING",
        Detected => "DETECTED",
        Active => "ACTIVE",
        NotifiedTcn => "NOTIFIED_TCN",
        NotifiedTc => "NOTIFIED_TC",
        Propagating => "PROPAGATING",
        Acknowledged => "ACKNOWLEDGED",
    }
}

#[derive(Debug)]
pub(crate) struct TopologyChange;

/// Roles whose ports take part in topology change propagation.
fn propagates(role: PortRole) -> bool {
    matches!(role, PortRole::Root | PortRole::Designated | PortRole::Master)
}

impl StateMachine for TopologyChange {
    type State = State;

    const NAME: &'static str = "TopologyChange";
    const SCOPE: Scope = Scope::PortTree;
    const STATE_COUNT: usize = State::COUNT;
    const INITIAL: State = State::Inactive;

    fn state_name(state: State) -> &'static str {
        state.name()
    }

    fn state(data: &BridgeData, port: usize, tree: usize) -> State {
        data.port_tree(port, tree).topology_change
    }

    fn set_state(data: &mut BridgeData, port: usize, tree: usize, state: State) {
        data.port_tree_mut(port, tree).topology_change = state;
    }

    fn check_conditions(data: &BridgeData, port: usize, tree: usize, state: State) -> Option<State> {
        if data.begin {
            return (state != State::Inactive).then_some(State::Inactive);
        }

        let p = &data.ports[port];
        let pt = &p.trees[tree];
        let rcvd_tcn = tree == CIST && p.rcvd_tcn;
        let rcvd_tc_ack = tree == CIST && p.rcvd_tc_ack;
        let pending = pt.rcvd_tc || rcvd_tcn || rcvd_tc_ack || pt.tc_prop;

        match state {
            State::Inactive => (pt.learn && !pt.fdb_flush).then_some(State::Learning),
            State::Learning => {
                if propagates(pt.role) && pt.forward && !p.oper_edge {
                    Some(State::Detected)
                } else if !propagates(pt.role) && !(pt.learn || pt.learning) && !pending {
                    Some(State::Inactive)
                } else if pending {
                    Some(State::Learning)
                } else {
                    None
                }
            }
            State::Active => {
                if !propagates(pt.role) || p.oper_edge {
                    Some(State::Learning)
                } else if rcvd_tcn {
                    Some(State::NotifiedTcn)
                } else if pt.rcvd_tc {
                    Some(State::NotifiedTc)
                } else if pt.tc_prop && !p.oper_edge {
                    Some(State::Propagating)
                } else if rcvd_tc_ack {
                    Some(State::Acknowledged)
                } else {
                    None
                }
            }
            State::NotifiedTcn => Some(State::NotifiedTc),
            State::Detected | State::NotifiedTc | State::Propagating | State::Acknowledged => {
                Some(State::Active)
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
        match state {
            State::Inactive => {
                let pt = data.port_tree_mut(port, tree);
                pt.fdb_flush = true;
                pt.timers.tc_while.set(0);
                if tree == CIST {
                    data.ports[port].tc_ack = false;
                }
                procedures::flush_fdb(data, callbacks, port, tree, timestamp);
            }
            State::Learning => {
                let p = &mut data.ports[port];
                if tree == CIST {
                    p.rcvd_tcn = false;
                    p.rcvd_tc_ack = false;
                }
                let pt = &mut p.trees[tree];
                pt.rcvd_tc = false;
                pt.tc_prop = false;
            }
            State::Detected => {
                tracing::debug!(port, tree, "topology change detected on port");
                procedures::new_tc_while(data, port, tree);
                procedures::set_tc_prop_tree(data, port, tree);
                procedures::set_new_info_xst(data, port, tree);
                data.tc_detected = true;
            }
            State::Active => {}
            State::NotifiedTcn => procedures::new_tc_while(data, port, tree),
            State::NotifiedTc => {
                let p = &mut data.ports[port];
                if tree == CIST {
                    p.rcvd_tcn = false;
                }
                p.trees[tree].rcvd_tc = false;
                if tree == CIST && p.trees[CIST].role == PortRole::Designated {
                    p.tc_ack = true;
                }
                procedures::set_tc_prop_tree(data, port, tree);
                callbacks.on_notified_topology_change(port, tree, timestamp);
            }
            State::Propagating => {
                procedures::new_tc_while(data, port, tree);
                data.port_tree_mut(port, tree).fdb_flush = true;
                procedures::flush_fdb(data, callbacks, port, tree, timestamp);
                data.port_tree_mut(port, tree).tc_prop = false;
            }
            State::Acknowledged => {
                data.port_tree_mut(port, tree).timers.tc_while.set(0);
                data.ports[port].rcvd_tc_ack = false;
            }
        }
    }
}
