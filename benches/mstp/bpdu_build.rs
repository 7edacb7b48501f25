use criterion::{black_box, criterion_group, criterion_main, Criterion};
use mstp::bpdu::*;
use mstp::{BridgeId, Buf, CursorMut, EtherAddr, MstConfigId, PortId};

fn cursor_build(buf: &mut [u8]) {
    let mut pkt = CursorMut::new(&mut buf[..RST_BPDU_HEADER_LEN]);
    pkt.advance(RST_BPDU_HEADER_LEN);

    let mut msg = RstBpduMessage::prepend_header(pkt, &RST_BPDU_HEADER_TEMPLATE);
    msg.set_flags(0x3d);
    msg.set_root_id(BridgeId::from_u64(0x6001000d65adf600));
    msg.set_root_path_cost(10);
    msg.set_bridge_id(BridgeId::from_u64(0x8001000bfd860f00));
    msg.set_port_id(PortId(0x8001));
    msg.set_message_age(1);
    msg.set_max_age(20);
    msg.set_hello_time(2);
    msg.set_forward_delay(15);
}

fn mst_bpdu(msti_count: usize) -> Bpdu {
    let mac = EtherAddr([0x00, 0x0c, 0x30, 0x5d, 0xd1, 0x00]);
    let cist = RstBpdu {
        flags: 0x7c,
        root_id: BridgeId::new(0x8000, 0, mac),
        bridge_id: BridgeId::new(0x8000, 0, mac),
        port_id: PortId::new(0x80, 5),
        max_age: 20,
        hello_time: 2,
        forward_delay: 15,
        ..Default::default()
    };
    let mstis = (1..=msti_count)
        .map(|mstid| MstiConfig {
            flags: 0x7c,
            regional_root_id: BridgeId::new(0x8000, mstid as u16, mac),
            bridge_priority: 0x80,
            port_priority: 0x80,
            remaining_hops: 20,
            ..Default::default()
        })
        .collect();
    Bpdu::Mst(MstBpdu {
        cist,
        config_id: MstConfigId::with_bridge_address(mac),
        cist_internal_root_path_cost: 0,
        cist_bridge_id: BridgeId::new(0x8000, 0, mac),
        cist_remaining_hops: 20,
        mstis,
    })
}

pub fn b(c: &mut Criterion) {
    c.bench_function("rst_cursor_build", |b| {
        let mut buf = [0; 64];
        b.iter(|| {
            cursor_build(black_box(&mut buf[..]));
        })
    });

    let bpdu = mst_bpdu(16);
    c.bench_function("mst_encode_16_mstis", |b| {
        b.iter(|| black_box(&bpdu).encode());
    });
}

criterion_group!(benches, b);
criterion_main!(benches);
