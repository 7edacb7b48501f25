//! Port Information state machine (802.1Q-2011 §13.31).
//!
//! Records the information received on a port, ages it out, and replaces
//! it with the bridge's own designated information when role selection
//! asks for it.

use super::procedures::{self, better_or_same_info};
use super::{Scope, StateMachine};
use crate::bridge::{BridgeData, InfoIs, RcvdInfo};
use crate::callbacks::StpCallbacks;

sm_states! {
    pub(crate) enum State {
        Disabled => "DISABLED",
        Aged => "AGED",
        Update => "UPDATE",
        Current => "CURRENT",
        Receive => "RECEIVE",
        SuperiorDesignated => "SUPERIOR_DESIGNATED",
        RepeatedDesignated => "REPEATED_DESIGNATED",
        InferiorDesignated => "INFERIOR_DESIGNATED",
        NotDesignated => "NOT_DESIGNATED",
        Other => "OTHER",
    }
}

#[derive(Debug)]
pub(crate) struct PortInformation;

impl StateMachine for PortInformation {
    type State = State;

    const NAME: &'static str = "PortInformation";
    const SCOPE: Scope = Scope::PortTree;
    const STATE_COUNT: usize = State::COUNT;
    const INITIAL: State = State::Disabled;

    fn state_name(state: State) -> &'static str {
        state.name()
    }

    fn state(data: &BridgeData, port: usize, tree: usize) -> State {
        data.port_tree(port, tree).information
    }

    fn set_state(data: &mut BridgeData, port: usize, tree: usize, state: State) {
        data.port_tree_mut(port, tree).information = state;
    }

    fn check_conditions(data: &BridgeData, port: usize, tree: usize, state: State) -> Option<State> {
        let p = &data.ports[port];
        let pt = &p.trees[tree];

        if data.begin {
            return (state != State::Disabled).then_some(State::Disabled);
        }
        if !p.port_enabled && pt.info_is != InfoIs::Disabled {
            return Some(State::Disabled);
        }

        match state {
            State::Disabled => {
                if pt.rcvd_msg {
                    Some(State::Disabled)
                } else if p.port_enabled {
                    Some(State::Aged)
                } else {
                    None
                }
            }
            State::Aged => (pt.selected && pt.updt_info).then_some(State::Update),
            State::Current => {
                let rcvd_xst_msg = procedures::rcvd_xst_msg(data, port, tree);
                if pt.selected && pt.updt_info {
                    Some(State::Update)
                } else if pt.info_is == InfoIs::Received
                    && pt.timers.rcvd_info_while.is_expired()
                    && !pt.updt_info
                    && !rcvd_xst_msg
                {
                    Some(State::Aged)
                } else if rcvd_xst_msg && !procedures::updt_xst_info(data, port, tree) {
                    Some(State::Receive)
                } else {
                    None
                }
            }
            State::Receive => Some(match pt.rcvd_info {
                RcvdInfo::SuperiorDesignated => State::SuperiorDesignated,
                RcvdInfo::RepeatedDesignated => State::RepeatedDesignated,
                RcvdInfo::InferiorDesignated => State::InferiorDesignated,
                RcvdInfo::InferiorRootAlternate => State::NotDesignated,
                RcvdInfo::Other => State::Other,
            }),
            State::Update
            | State::SuperiorDesignated
            | State::RepeatedDesignated
            | State::InferiorDesignated
            | State::NotDesignated
            | State::Other => Some(State::Current),
        }
    }

    fn init_state(
        data: &mut BridgeData,
        _callbacks: &mut dyn StpCallbacks,
        port: usize,
        tree: usize,
        state: State,
        _timestamp: u32,
    ) {
        match state {
            State::Disabled => {
                let pt = data.port_tree_mut(port, tree);
                pt.rcvd_msg = false;
                pt.proposing = false;
                pt.proposed = false;
                pt.agree = false;
                pt.agreed = false;
                pt.timers.rcvd_info_while.set(0);
                pt.info_is = InfoIs::Disabled;
                pt.reselect = true;
                pt.selected = false;
            }
            State::Aged => {
                let pt = data.port_tree_mut(port, tree);
                pt.info_is = InfoIs::Aged;
                pt.reselect = true;
                pt.selected = false;
            }
            State::Update => {
                let keep_agreed = better_or_same_info(data, port, tree, InfoIs::Mine);
                let pt = data.port_tree_mut(port, tree);
                pt.proposing = false;
                pt.proposed = false;
                pt.agreed = pt.agreed && keep_agreed;
                pt.synced = pt.synced && pt.agreed;
                pt.port_priority = pt.designated_priority;
                pt.port_times = pt.designated_times;
                pt.updt_info = false;
                pt.info_is = InfoIs::Mine;
                procedures::set_new_info_xst(data, port, tree);
            }
            State::Current => {}
            State::Receive => {
                let rcvd_info = procedures::rcv_info(data, port, tree);
                data.port_tree_mut(port, tree).rcvd_info = rcvd_info;
                procedures::record_mastered(data, port, tree);
            }
            State::SuperiorDesignated => {
                update_info_internal(data, port);
                let pt = data.port_tree_mut(port, tree);
                pt.agreed = false;
                pt.proposing = false;
                procedures::record_proposal(data, port, tree);
                procedures::set_tc_flags(data, port, tree);
                let keep_agree = better_or_same_info(data, port, tree, InfoIs::Received);
                let pt = data.port_tree_mut(port, tree);
                pt.agree = pt.agree && keep_agree;
                procedures::record_agreement(data, port, tree);
                let pt = data.port_tree_mut(port, tree);
                pt.synced = pt.synced && pt.agreed;
                procedures::record_priority(data, port, tree);
                procedures::record_times(data, port, tree);
                procedures::updt_rcvd_info_while(data, port, tree);
                let pt = data.port_tree_mut(port, tree);
                pt.info_is = InfoIs::Received;
                pt.reselect = true;
                pt.selected = false;
                pt.rcvd_msg = false;
            }
            State::RepeatedDesignated => {
                update_info_internal(data, port);
                procedures::record_proposal(data, port, tree);
                procedures::set_tc_flags(data, port, tree);
                procedures::record_agreement(data, port, tree);
                procedures::updt_rcvd_info_while(data, port, tree);
                data.port_tree_mut(port, tree).rcvd_msg = false;
            }
            State::InferiorDesignated => {
                procedures::record_dispute(data, port, tree);
                data.port_tree_mut(port, tree).rcvd_msg = false;
            }
            State::NotDesignated => {
                procedures::record_agreement(data, port, tree);
                procedures::set_tc_flags(data, port, tree);
                data.port_tree_mut(port, tree).rcvd_msg = false;
            }
            State::Other => {
                data.port_tree_mut(port, tree).rcvd_msg = false;
            }
        }
    }
}

/// infoInternal follows rcvdInternal. A port moving into or out of the
/// region has its MSTI roles reselected.
fn update_info_internal(data: &mut BridgeData, port: usize) {
    let p = &mut data.ports[port];
    if p.info_internal == p.rcvd_internal {
        return;
    }
    tracing::debug!(port, internal = p.rcvd_internal, "port region boundary changed");
    p.info_internal = p.rcvd_internal;
    for pt in p.trees.iter_mut().skip(1) {
        pt.reselect = true;
        pt.selected = false;
    }
}
