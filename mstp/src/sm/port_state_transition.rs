//! Port State Transition state machine (802.1Q-2011 §13.35).
//!
//! Turns the learn and forward decisions into calls to the forwarding
//! plane and reports back through `learning` and `forwarding`.

use super::{Scope, StateMachine};
use crate::bridge::BridgeData;
use crate::callbacks::StpCallbacks;

sm_states! {
    pub(crate) enum State {
        Discarding => "DISCARDING",
        Learning => "LEARNING",
        Forwarding => "FORWARDING",
    }
}

#[derive(Debug)]
pub(crate) struct PortStateTransition;

impl StateMachine for PortStateTransition {
    type State = State;

    const NAME: &'static str = "PortStateTransition";
    const SCOPE: Scope = Scope::PortTree;
    const STATE_COUNT: usize = State::COUNT;
    const INITIAL: State = State::Discarding;

    fn state_name(state: State) -> &'static str {
        state.name()
    }

    fn state(data: &BridgeData, port: usize, tree: usize) -> State {
        data.port_tree(port, tree).state_transition
    }

    fn set_state(data: &mut BridgeData, port: usize, tree: usize, state: State) {
        data.port_tree_mut(port, tree).state_transition = state;
    }

    fn check_conditions(data: &BridgeData, port: usize, tree: usize, state: State) -> Option<State> {
        if data.begin {
            return (state != State::Discarding).then_some(State::Discarding);
        }

        let pt = data.port_tree(port, tree);
        match state {
            State::Discarding => pt.learn.then_some(State::Learning),
            State::Learning if pt.forward => Some(State::Forwarding),
            State::Learning => (!pt.learn).then_some(State::Discarding),
            State::Forwarding => (!pt.forward).then_some(State::Discarding),
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
        let pt = data.port_tree_mut(port, tree);
        match state {
            State::Discarding => {
                callbacks.enable_learning(port, tree, false, timestamp);
                pt.learning = false;
                callbacks.enable_forwarding(port, tree, false, timestamp);
                pt.forwarding = false;
            }
            State::Learning => {
                callbacks.enable_learning(port, tree, true, timestamp);
                pt.learning = true;
            }
            State::Forwarding => {
                tracing::debug!(port, tree, "port forwarding");
                callbacks.enable_forwarding(port, tree, true, timestamp);
                pt.forwarding = true;
            }
        }
    }
}
