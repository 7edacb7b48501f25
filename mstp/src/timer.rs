//! One-second countdown timers.
//!
//! The bridge owns no clock. The host calls
//! [`Bridge::one_second_tick`](crate::Bridge::one_second_tick) once per
//! second and every running timer counts down by one until it stops at zero.

/// A countdown in whole seconds that stops at zero.
#[derive(Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Default)]
pub struct Timer(u16);

impl Timer {
    /// A timer with `seconds` left.
    #[inline]
    pub fn new(seconds: u16) -> Self {
        Self(seconds)
    }

    /// Seconds left.
    #[inline]
    pub fn get(&self) -> u16 {
        self.0
    }

    /// Restart the countdown.
    #[inline]
    pub fn set(&mut self, seconds: u16) {
        self.0 = seconds;
    }

    /// Whether the timer reached zero.
    #[inline]
    pub fn is_expired(&self) -> bool {
        self.0 == 0
    }

    /// Count down one second. Returns `true` when this tick made the timer
    /// expire.
    #[inline]
    pub fn tick(&mut self) -> bool {
        match self.0 {
            0 => false,
            1 => {
                self.0 = 0;
                true
            }
            _ => {
                self.0 -= 1;
                false
            }
        }
    }
}

impl PartialEq<u16> for Timer {
    fn eq(&self, other: &u16) -> bool {
        self.0 == *other
    }
}

/// The timers that run once per port (802.1Q-2011 §13.23).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PortTimers {
    /// Protocol migration delay.
    pub mdelay_while: Timer,
    /// Time to the next periodic transmission.
    pub hello_when: Timer,
    /// Time to wait for a BPDU before becoming an edge port.
    pub edge_delay_while: Timer,
}

impl PortTimers {
    /// Count every timer down by one second.
    pub fn tick(&mut self) {
        self.mdelay_while.tick();
        self.hello_when.tick();
        self.edge_delay_while.tick();
    }
}

/// The timers that run once per port and per tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PortTreeTimers {
    /// Forward delay in the discarding and learning states.
    pub fd_while: Timer,
    /// Recent root: a former root port may still be forwarding.
    pub rr_while: Timer,
    /// Recent backup.
    pub rb_while: Timer,
    /// Topology change notifications are being sent.
    pub tc_while: Timer,
    /// Age left of the received information.
    pub rcvd_info_while: Timer,
}

impl PortTreeTimers {
    /// Count every timer down by one second.
    pub fn tick(&mut self) {
        self.fd_while.tick();
        self.rr_while.tick();
        self.rb_while.tick();
        self.tc_while.tick();
        self.rcvd_info_while.tick();
    }
}
