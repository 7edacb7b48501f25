//! Port Protocol Migration state machine (802.1Q-2011 §13.29).
//!
//! Decides whether the port speaks RST/MST BPDUs or falls back to Config
//! and TCN BPDUs for a legacy neighbour.

use super::{Scope, StateMachine};
use crate::bridge::BridgeData;
use crate::callbacks::StpCallbacks;

sm_states! {
    pub(crate) enum State {
        CheckingRstp => "CHECKING_RSTP",
        SelectingStp => "SELECTING_STP",
        SendingRstp => "SENDING_RSTP",
        SendingStp => "SENDING_STP",
    }
}

#[derive(Debug)]
pub(crate) struct PortProtocolMigration;

impl StateMachine for PortProtocolMigration {
    type State = State;

    const NAME: &'static str = "PortProtocolMigration";
    const SCOPE: Scope = Scope::Port;
    const STATE_COUNT: usize = State::COUNT;
    const INITIAL: State = State::CheckingRstp;

    fn state_name(state: State) -> &'static str {
        state.name()
    }

    fn state(data: &BridgeData, port: usize, _tree: usize) -> State {
        data.ports[port].migration
    }

    fn set_state(data: &mut BridgeData, port: usize, _tree: usize, state: State) {
        data.ports[port].migration = state;
    }

    fn check_conditions(data: &BridgeData, port: usize, _tree: usize, state: State) -> Option<State> {
        if data.begin {
            return (state != State::CheckingRstp).then_some(State::CheckingRstp);
        }

        let p = &data.ports[port];
        let mdelay_while = p.timers.mdelay_while;
        let rstp_version = data.rstp_version();

        match state {
            State::CheckingRstp => {
                if mdelay_while != data.config.migrate_time && !p.port_enabled {
                    Some(State::CheckingRstp)
                } else if mdelay_while.is_expired() {
                    Some(if p.send_rstp {
                        State::SendingRstp
                    } else {
                        State::SendingStp
                    })
                } else {
                    None
                }
            }
            State::SelectingStp => {
                (mdelay_while.is_expired() || !p.port_enabled || p.mcheck).then_some(State::SendingStp)
            }
            State::SendingRstp | State::SendingStp => {
                if !p.port_enabled || p.mcheck || (rstp_version && !p.send_rstp && p.rcvd_rstp) {
                    Some(State::CheckingRstp)
                } else if state == State::SendingRstp && p.send_rstp && p.rcvd_stp {
                    Some(State::SelectingStp)
                } else {
                    None
                }
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
        let migrate_time = data.config.migrate_time;
        let rstp_version = data.rstp_version();
        let p = &mut data.ports[port];

        match state {
            State::CheckingRstp => {
                p.mcheck = false;
                p.send_rstp = rstp_version;
                p.timers.mdelay_while.set(migrate_time);
            }
            State::SelectingStp => {
                tracing::debug!(port, "legacy neighbour, sending config bpdus");
                p.send_rstp = false;
                p.timers.mdelay_while.set(migrate_time);
            }
            State::SendingRstp | State::SendingStp => {
                p.rcvd_rstp = false;
                p.rcvd_stp = false;
            }
        }
    }
}
