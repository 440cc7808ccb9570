use arduvision::{format::unpack, hex_parser::parse_hex_str, response::parser::line, RequestMode};
use criterion::{criterion_group, criterion_main, Criterion};
use manifest_dir_macros::exist_relative_path;

const STREAM_8PPB: &'static str = include_str!(exist_relative_path!("resources/test/stream_8ppb_example.txt"));

fn bench_unpacking_frames(c: &mut Criterion) {
    let (_, capture) = parse_hex_str(STREAM_8PPB).expect("Could not parse hex file");
    let (payload, _) = line(&capture).expect("Could not find acknowledgment");
    c.bench_function("8ppb frame", |b| b.iter(|| unpack(RequestMode::Stream8ppb, payload)));

    let raw: Vec<u8> = (0..60).flat_map(|_| [0x80; 160].into_iter().chain([b'\n'])).collect();
    c.bench_function("0ppb frame", |b| b.iter(|| unpack(RequestMode::Stream0ppb, &raw)));
}

criterion_group!(benches, bench_unpacking_frames);
criterion_main!(benches);
