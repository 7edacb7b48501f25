//! Port Role Selection state machine (802.1Q-2011 §13.32), one per tree.

use super::{procedures, Scope, StateMachine};
use crate::bridge::{BridgeData, PortRole, CIST};
use crate::callbacks::StpCallbacks;

sm_states! {
    pub(crate) enum State {
        InitTree => "INIT_TREE",
        RoleSelection => "ROLE_SELECTION",
    }
}

#[derive(Debug)]
pub(crate) struct PortRoleSelection;

impl StateMachine for PortRoleSelection {
    type State = State;

    const NAME: &'static str = "PortRoleSelection";
    const SCOPE: Scope = Scope::Tree;
    const STATE_COUNT: usize = State::COUNT;
    const INITIAL: State = State::InitTree;

    fn state_name(state: State) -> &'static str {
        state.name()
    }

    fn state(data: &BridgeData, _port: usize, tree: usize) -> State {
        data.trees[tree].role_selection
    }

    fn set_state(data: &mut BridgeData, _port: usize, tree: usize, state: State) {
        data.trees[tree].role_selection = state;
    }

    fn check_conditions(data: &BridgeData, _port: usize, tree: usize, state: State) -> Option<State> {
        if data.begin {
            return (state != State::InitTree).then_some(State::InitTree);
        }
        match state {
            State::InitTree => Some(State::RoleSelection),
            State::RoleSelection => data
                .ports
                .iter()
                .any(|p| p.trees[tree].reselect)
                .then_some(State::RoleSelection),
        }
    }

    fn init_state(
        data: &mut BridgeData,
        _callbacks: &mut dyn StpCallbacks,
        _port: usize,
        tree: usize,
        state: State,
        _timestamp: u32,
    ) {
        match state {
            State::InitTree => procedures::updt_roles_disabled_tree(data, tree),
            State::RoleSelection => {
                let previous: Vec<PortRole> = data
                    .ports
                    .iter()
                    .map(|p| p.trees[tree].selected_role)
                    .collect();

                procedures::clear_reselect_tree(data, tree);
                procedures::updt_roles_tree(data, tree);
                procedures::set_selected_tree(data, tree);

                if tree != CIST {
                    return;
                }
                // MSTI roles on boundary ports follow the CIST role.
                for (p, old) in data.ports.iter_mut().zip(previous) {
                    if p.trees[CIST].selected_role == old {
                        continue;
                    }
                    for pt in p.trees.iter_mut().skip(1) {
                        pt.reselect = true;
                        pt.selected = false;
                    }
                }
            }
        }
    }
}
