use criterion::{black_box, criterion_group, criterion_main, Criterion};
use mstp::bpdu::*;
use mstp::{BridgeId, Cursor, PortId};

static RST_BYTES: [u8; 36] = [
    0x00, 0x00, 0x02, 0x02, 0x3d, 0x60, 0x01, 0x00, 0x0d, 0x65, 0xad, 0xf6, 0x00, 0x00, 0x00, 0x00,
    0x0a, 0x80, 0x01, 0x00, 0x0b, 0xfd, 0x86, 0x0f, 0x00, 0x80, 0x01, 0x01, 0x00, 0x14, 0x00, 0x02,
    0x00, 0x0f, 0x00, 0x00,
];

fn cursor_parse(buf: &[u8]) {
    let Ok(msg) = RstBpduMessage::parse(Cursor::new(buf)) else {
        panic!();
    };
    assert!(msg.type_() == BpduType::RST);
    assert!(msg.root_id() == BridgeId::from_u64(0x6001000d65adf600));
    assert!(msg.root_path_cost() == 10);
    assert!(msg.port_id() == PortId(0x8001));
    assert!(msg.forward_delay() == 15);
}

fn group_parse(buf: &[u8]) {
    match BpduMessageGroup::group_parse(Cursor::new(buf)) {
        Ok(BpduMessageGroup::Rst(msg)) => assert!(msg.flags() == 0x3d),
        _ => panic!(),
    }
}

fn decode(buf: &[u8]) {
    let bpdu = Bpdu::decode(buf).unwrap();
    assert!(bpdu.cist_role() == Some(BpduRole::Designated));
}

pub fn b(c: &mut Criterion) {
    c.bench_function("rst_cursor_parse", |b| {
        b.iter(|| {
            cursor_parse(black_box(&RST_BYTES[..]));
        })
    });

    c.bench_function("rst_group_parse", |b| {
        b.iter(|| {
            group_parse(black_box(&RST_BYTES[..]));
        })
    });

    c.bench_function("rst_decode", |b| {
        b.iter(|| {
            decode(black_box(&RST_BYTES[..]));
        })
    });
}

criterion_group!(benches, b);
criterion_main!(benches);
