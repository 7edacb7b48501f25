//! Port Transmit state machine (802.1Q-2011 §13.33).
//!
//! Sends periodic hellos and new information, limited to TxHoldCount
//! BPDUs per second.

use super::procedures::{self, cist_designated_port, cist_root_port};
use super::{Scope, StateMachine};
use crate::bridge::{BridgeData, CIST};
use crate::callbacks::StpCallbacks;

sm_states! {
    pub(crate) enum State {
        TransmitInit => "TRANSMIT_INIT",
        Idle => "IDLE",
        TransmitPeriodic => "TRANSMIT_PERIODIC",
        TransmitConfig => "TRANSMIT_CONFIG",
        TransmitTcn => "TRANSMIT_TCN",
        TransmitRstp => "TRANSMIT_RSTP",
    }
}

#[derive(Debug)]
pub(crate) struct PortTransmit;

impl StateMachine for PortTransmit {
    type State = State;

    const NAME: &'static str = "PortTransmit";
    const SCOPE: Scope = Scope::Port;
    const STATE_COUNT: usize = State::COUNT;
    const INITIAL: State = State::TransmitInit;

    fn state_name(state: State) -> &'static str {
        state.name()
    }

    fn state(data: &BridgeData, port: usize, _tree: usize) -> State {
        data.ports[port].transmit
    }

    fn set_state(data: &mut BridgeData, port: usize, _tree: usize, state: State) {
        data.ports[port].transmit = state;
    }

    fn check_conditions(data: &BridgeData, port: usize, _tree: usize, state: State) -> Option<State> {
        let p = &data.ports[port];

        if data.begin || !p.port_enabled || !p.enable_bpdu_tx {
            return (state != State::TransmitInit).then_some(State::TransmitInit);
        }

        match state {
            State::Idle => {
                if !procedures::all_transmit_ready(data, port) {
                    return None;
                }
                let hello_due = p.timers.hello_when.is_expired();
                let may_send = !hello_due && p.tx_count < data.config.tx_hold_count;

                if hello_due {
                    Some(State::TransmitPeriodic)
                } else if may_send && !p.send_rstp && p.new_info && cist_designated_port(data, port) {
                    Some(State::TransmitConfig)
                } else if may_send && !p.send_rstp && p.new_info && cist_root_port(data, port) {
                    Some(State::TransmitTcn)
                } else if may_send
                    && p.send_rstp
                    && (p.new_info || (p.new_info_msti && !procedures::msti_master_port(data, port)))
                {
                    Some(State::TransmitRstp)
                } else {
                    None
                }
            }
            _ => Some(State::Idle),
        }
    }

    fn init_state(
        data: &mut BridgeData,
        callbacks: &mut dyn StpCallbacks,
        port: usize,
        _tree: usize,
        state: State,
        timestamp: u32,
    ) {
        match state {
            State::TransmitInit => {
                let p = &mut data.ports[port];
                p.new_info = true;
                p.new_info_msti = true;
                p.tx_count = 0;
            }
            State::Idle => {
                let hello = procedures::hello_time(data, port);
                data.ports[port].timers.hello_when.set(hello);
            }
            State::TransmitPeriodic => {
                let cist_tc_while = !data.port_tree(port, CIST).timers.tc_while.is_expired();
                let cist = cist_designated_port(data, port)
                    || (cist_root_port(data, port) && cist_tc_while);
                let msti = procedures::msti_designated_or_tc_propagating_root_port(data, port);
                let p = &mut data.ports[port];
                p.new_info = p.new_info || cist;
                p.new_info_msti = p.new_info_msti || msti;
            }
            State::TransmitConfig => {
                data.ports[port].new_info = false;
                procedures::tx_config(data, callbacks, port, timestamp);
                let p = &mut data.ports[port];
                p.tx_count += 1;
                p.tc_ack = false;
            }
            State::TransmitTcn => {
                data.ports[port].new_info = false;
                procedures::tx_tcn(callbacks, port, timestamp);
                data.ports[port].tx_count += 1;
            }
            State::TransmitRstp => {
                let p = &mut data.ports[port];
                p.new_info = false;
                p.new_info_msti = false;
                procedures::tx_rstp(data, callbacks, port, timestamp);
                let p = &mut data.ports[port];
                p.tx_count += 1;
                p.tc_ack = false;
            }
        }
    }
}
