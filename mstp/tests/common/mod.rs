#![allow(dead_code)]

use std::collections::HashMap;

use mstp::{
    Bridge, BridgeConfig, EtherAddr, FlushFdbType, PortRole, StpCallbacks,
};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("mstp=warn")),
        )
        .with_test_writer()
        .try_init();
}

pub fn mac(last: u8) -> EtherAddr {
    EtherAddr([0x02, 0x00, 0x00, 0x00, 0x00, last])
}

/// Callbacks that record everything the bridge asks for.
#[derive(Debug, Default)]
pub struct Recorder {
    pub sent: Vec<(usize, Vec<u8>)>,
    pub learning: HashMap<(usize, usize), bool>,
    pub forwarding: HashMap<(usize, usize), bool>,
    pub flushes: Vec<(usize, usize, FlushFdbType)>,
    pub log: Vec<String>,
    pub topology_changes: Vec<u32>,
    pub notified: Vec<(usize, usize)>,
    pub role_changes: Vec<(usize, usize, PortRole)>,
    pub config_changes: u32,
}

impl Recorder {
    pub fn take_sent(&mut self) -> Vec<(usize, Vec<u8>)> {
        std::mem::take(&mut self.sent)
    }

    pub fn is_forwarding(&self, port: usize, tree: usize) -> bool {
        self.forwarding.get(&(port, tree)).copied().unwrap_or(false)
    }
}

impl StpCallbacks for Recorder {
    fn transmit(&mut self, port: usize, bpdu: &[u8], _timestamp: u32) {
        self.sent.push((port, bpdu.to_vec()));
    }

    fn enable_learning(&mut self, port: usize, tree: usize, enable: bool, _timestamp: u32) {
        self.learning.insert((port, tree), enable);
    }

    fn enable_forwarding(&mut self, port: usize, tree: usize, enable: bool, _timestamp: u32) {
        self.forwarding.insert((port, tree), enable);
    }

    fn flush_fdb(&mut self, port: usize, tree: usize, flush_type: FlushFdbType, _timestamp: u32) {
        self.flushes.push((port, tree, flush_type));
    }

    fn debug_log(&mut self, _port: Option<usize>, _tree: Option<usize>, text: &str) {
        self.log.push(text.to_string());
    }

    fn on_topology_change(&mut self, timestamp: u32) {
        self.topology_changes.push(timestamp);
    }

    fn on_notified_topology_change(&mut self, port: usize, tree: usize, _timestamp: u32) {
        self.notified.push((port, tree));
    }

    fn on_port_role_changed(&mut self, port: usize, tree: usize, role: PortRole, _timestamp: u32) {
        self.role_changes.push((port, tree, role));
    }

    fn on_config_changed(&mut self, _timestamp: u32) {
        self.config_changes += 1;
    }
}

/// A (bridge, port) pair.
pub type Endpoint = (usize, usize);

/// Bridges joined by point-to-point links, with BPDUs carried between them
/// synchronously.
#[derive(Debug, Default)]
pub struct Network {
    pub bridges: Vec<Bridge<Recorder>>,
    links: Vec<(Endpoint, Endpoint)>,
    pub time: u32,
}

impl Network {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a started bridge and return its index.
    pub fn add_bridge(
        &mut self,
        mac_last: u8,
        port_count: usize,
        msti_count: usize,
        config: BridgeConfig,
    ) -> usize {
        let mut bridge =
            Bridge::new(port_count, msti_count, mac(mac_last), config, Recorder::default()).unwrap();
        bridge.start(self.time).unwrap();
        self.bridges.push(bridge);
        self.bridges.len() - 1
    }

    fn peer(&self, end: Endpoint) -> Option<Endpoint> {
        self.links.iter().find_map(|&(a, b)| {
            if a == end {
                Some(b)
            } else if b == end {
                Some(a)
            } else {
                None
            }
        })
    }

    /// Join two ports with a 100 Mb/s full duplex link and bring both up.
    pub fn connect(&mut self, a: Endpoint, b: Endpoint) {
        self.links.push((a, b));
        let time = self.time;
        self.bridges[a.0].enable_port(a.1, 100, true, time).unwrap();
        self.bridges[b.0].enable_port(b.1, 100, true, time).unwrap();
        self.deliver();
    }

    /// Take a link down on both sides.
    pub fn disconnect(&mut self, a: Endpoint, b: Endpoint) {
        self.links.retain(|&link| link != (a, b) && link != (b, a));
        let time = self.time;
        self.bridges[a.0].disable_port(a.1, time).unwrap();
        self.bridges[b.0].disable_port(b.1, time).unwrap();
        self.deliver();
    }

    /// Carry every pending BPDU to the other end of its link until the
    /// network is quiet. BPDUs sent on unconnected ports are lost.
    pub fn deliver(&mut self) {
        for _ in 0..10_000 {
            let mut frames = Vec::new();
            for (index, bridge) in self.bridges.iter_mut().enumerate() {
                for (port, bytes) in bridge.callbacks_mut().take_sent() {
                    frames.push(((index, port), bytes));
                }
            }
            if frames.is_empty() {
                return;
            }
            for (from, bytes) in frames {
                if let Some((bridge, port)) = self.peer(from) {
                    let time = self.time;
                    self.bridges[bridge]
                        .receive_bpdu(port, &bytes, time)
                        .unwrap();
                }
            }
        }
        panic!("network does not quiesce");
    }

    /// Let `seconds` seconds pass, delivering BPDUs after every tick.
    pub fn run(&mut self, seconds: u32) {
        for _ in 0..seconds {
            self.time += 1;
            let time = self.time;
            for bridge in self.bridges.iter_mut() {
                bridge.one_second_tick(time);
            }
            self.deliver();
        }
    }

    pub fn bridge(&self, index: usize) -> &Bridge<Recorder> {
        &self.bridges[index]
    }

    pub fn role(&self, (bridge, port): Endpoint, tree: usize) -> PortRole {
        self.bridges[bridge].port_role(port, tree).unwrap()
    }

    pub fn forwarding(&self, (bridge, port): Endpoint, tree: usize) -> bool {
        self.bridges[bridge].port_forwarding(port, tree).unwrap()
    }
}
