//! Bridge Detection state machine (802.1Q-2011 §13.30).
//!
//! Works out whether a port is an edge port, and isolates ports that should
//! have a neighbour but never heard one.

use super::{Scope, StateMachine};
use crate::bridge::{BridgeData, CIST};
use crate::callbacks::StpCallbacks;

sm_states! {
    pub(crate) enum State {
        Edge => "EDGE",
        NotEdge => "NOT_EDGE",
        Isolated => "ISOLATED",
    }
}

#[derive(Debug)]
pub(crate) struct BridgeDetection;

impl StateMachine for BridgeDetection {
    type State = State;

    const NAME: &'static str = "BridgeDetection";
    const SCOPE: Scope = Scope::Port;
    const STATE_COUNT: usize = State::COUNT;
    const INITIAL: State = State::NotEdge;

    fn state_name(state: State) -> &'static str {
        state.name()
    }

    fn state(data: &BridgeData, port: usize, _tree: usize) -> State {
        data.ports[port].detection
    }

    fn set_state(data: &mut BridgeData, port: usize, _tree: usize, state: State) {
        data.ports[port].detection = state;
    }

    fn check_conditions(data: &BridgeData, port: usize, _tree: usize, state: State) -> Option<State> {
        let p = &data.ports[port];

        if data.begin {
            let initial = if p.admin_edge { State::Edge } else { State::NotEdge };
            return (state != initial).then_some(initial);
        }

        // A designated port that kept proposing for EdgeDelay without hearing
        // anything back.
        let unanswered = p.timers.edge_delay_while.is_expired()
            && p.send_rstp
            && p.trees[CIST].proposing;

        match state {
            State::NotEdge => {
                if (!p.port_enabled && p.admin_edge) || (p.port_enabled && unanswered && p.auto_edge) {
                    Some(State::Edge)
                } else if unanswered && !p.admin_edge && !p.auto_edge && p.oper_p2p {
                    Some(State::Isolated)
                } else {
                    None
                }
            }
            State::Edge => {
                let leave = ((!p.port_enabled || !p.auto_edge) && !p.admin_edge)
                    || (p.port_enabled && !p.oper_edge);
                leave.then_some(State::NotEdge)
            }
            State::Isolated => {
                let leave = p.admin_edge || p.auto_edge || !p.isolate || !p.oper_p2p;
                leave.then_some(State::NotEdge)
            }
        }
    }

    fn init_state(
        data: &mut BridgeData,
        _callbacks: &mut dyn StpCallbacks,
        port: usize,
        _tree: usize,
        state: State,
        _timestamp: u32,
    ) {
        let p = &mut data.ports[port];
        match state {
            State::Edge => {
                p.oper_edge = true;
                p.isolate = false;
            }
            State::NotEdge => {
                p.oper_edge = false;
                p.isolate = false;
            }
            State::Isolated => {
                tracing::warn!(port, "no bpdu from point-to-point neighbour, port isolated");
                p.isolate = true;
                p.oper_edge = false;
            }
        }
    }
}

