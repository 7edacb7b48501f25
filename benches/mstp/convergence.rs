use criterion::{black_box, criterion_group, criterion_main, Criterion};
use mstp::{Bridge, BridgeConfig, EtherAddr, StpCallbacks};

#[derive(Default)]
struct Outbox(Vec<(usize, Vec<u8>)>);

impl StpCallbacks for Outbox {
    fn transmit(&mut self, port: usize, bpdu: &[u8], _timestamp: u32) {
        self.0.push((port, bpdu.to_vec()));
    }
}

// Port 0 of every bridge faces the previous bridge, port 1 the next one.
fn ring(size: usize) -> Vec<Bridge<Outbox>> {
    let mut bridges: Vec<_> = (0..size)
        .map(|i| {
            let mac = EtherAddr([0x02, 0, 0, 0, 0, i as u8 + 1]);
            let mut bridge =
                Bridge::new(2, 0, mac, BridgeConfig::default(), Outbox::default()).unwrap();
            bridge.start(0).unwrap();
            bridge
        })
        .collect();
    for bridge in bridges.iter_mut() {
        bridge.enable_port(0, 1000, true, 0).unwrap();
        bridge.enable_port(1, 1000, true, 0).unwrap();
    }
    bridges
}

fn deliver(bridges: &mut [Bridge<Outbox>], timestamp: u32) {
    let size = bridges.len();
    loop {
        let mut frames = Vec::new();
        for (i, bridge) in bridges.iter_mut().enumerate() {
            for (port, bytes) in bridge.callbacks_mut().0.drain(..) {
                let peer = if port == 0 {
                    ((i + size - 1) % size, 1)
                } else {
                    ((i + 1) % size, 0)
                };
                frames.push((peer, bytes));
            }
        }
        if frames.is_empty() {
            return;
        }
        for ((bridge, port), bytes) in frames {
            bridges[bridge].receive_bpdu(port, &bytes, timestamp).unwrap();
        }
    }
}

fn converge(size: usize) -> usize {
    let mut bridges = ring(size);
    for t in 0..4 {
        deliver(&mut bridges, t);
        for bridge in bridges.iter_mut() {
            bridge.one_second_tick(t + 1);
        }
    }
    bridges
        .iter()
        .filter(|bridge| bridge.root_port(0).unwrap().is_none())
        .count()
}

pub fn b(c: &mut Criterion) {
    c.bench_function("ring_of_8_converge", |b| {
        b.iter(|| {
            assert!(converge(black_box(8)) == 1);
        })
    });
}

criterion_group!(benches, b);
criterion_main!(benches);
