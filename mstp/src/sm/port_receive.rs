//! Port Receive state machine (802.1Q-2011 §13.28).

use super::{procedures, Scope, StateMachine};
use crate::bridge::BridgeData;
use crate::callbacks::StpCallbacks;

sm_states! {
    pub(crate) enum State {
        Discard => "DISCARD",
        Receive => "RECEIVE",
    }
}

#[derive(Debug)]
pub(crate) struct PortReceive;

impl StateMachine for PortReceive {
    type State = State;

    const NAME: &'static str = "PortReceive";
    const SCOPE: Scope = Scope::Port;
    const STATE_COUNT: usize = State::COUNT;
    const INITIAL: State = State::Discard;

    fn state_name(state: State) -> &'static str {
        state.name()
    }

    fn state(data: &BridgeData, port: usize, _tree: usize) -> State {
        data.ports[port].receive
    }

    fn set_state(data: &mut BridgeData, port: usize, _tree: usize, state: State) {
        data.ports[port].receive = state;
    }

    fn check_conditions(data: &BridgeData, port: usize, _tree: usize, state: State) -> Option<State> {
        let p = &data.ports[port];

        if data.begin {
            return (state != State::Discard).then_some(State::Discard);
        }
        if (p.rcvd_bpdu || p.timers.edge_delay_while != data.config.migrate_time) && !p.port_enabled {
            return Some(State::Discard);
        }

        match state {
            State::Discard if p.rcvd_bpdu && p.port_enabled && p.enable_bpdu_rx => Some(State::Receive),
            State::Receive
                if p.rcvd_bpdu && p.port_enabled && !procedures::rcvd_any_msg(data, port) =>
            {
                Some(State::Receive)
            }
            _ => None,
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
        let migrate_time = data.config.migrate_time;
        match state {
            State::Discard => {
                let p = &mut data.ports[port];
                p.rcvd_bpdu = false;
                p.rcvd_rstp = false;
                p.rcvd_stp = false;
                p.timers.edge_delay_while.set(migrate_time);
                procedures::clear_all_rcvd_msgs(data, port);
            }
            State::Receive => {
                procedures::updt_bpdu_version(data, port);
                data.ports[port].rcvd_internal = procedures::from_same_region(data, port);
                procedures::set_rcvd_msgs(data, port);

                let p = &mut data.ports[port];
                p.oper_edge = false;
                p.isolate = false;
                p.rcvd_bpdu = false;
                p.timers.edge_delay_while.set(migrate_time);
            }
        }
    }
}
